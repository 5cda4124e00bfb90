//! Public DTOs for the selection engine: the request a caller hands in and
//! the result it persists as the simulation's question set. Keep this small
//! and stable so the surrounding application and the engine can evolve
//! independently.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::domain::{AllocationPreset, Candidate, Difficulty, DifficultyMix};

/// One selection invocation. Immutable for the duration of the run.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionRequest {
    /// Desired final set size.
    pub total_questions: u32,
    pub allocation_preset: AllocationPreset,
    /// Only meaningful for `SingleSubject`. When absent there, the planner
    /// falls back to proportional allocation.
    #[serde(default)]
    pub focus_subject_id: Option<String>,
    /// Only meaningful for `Custom`; zero entries are dropped by the
    /// planner. A `BTreeMap` so the normalization post-step always sees the
    /// same "first" entry for a given map.
    #[serde(default)]
    pub custom_distribution: BTreeMap<String, u32>,
    pub difficulty_mix: DifficultyMix,

    /// Prefer questions with low usage counts.
    #[serde(default)]
    pub avoid_recently_used: bool,
    /// Prefer recently created questions.
    #[serde(default)]
    pub prefer_recent_questions: bool,
    /// Spread the selection across as many distinct topics as the pool
    /// allows.
    #[serde(default)]
    pub maximize_topic_coverage: bool,

    /// When non-empty, candidates must carry at least one of these tags.
    #[serde(default)]
    pub tag_filter_ids: BTreeSet<String>,
    /// Hard exclusions, never selected.
    #[serde(default)]
    pub exclude_question_ids: BTreeSet<String>,
}

/// Denormalized display projection of a selected question.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionOut {
    pub id: String,
    pub subject_id: String,
    pub topic_id: Option<String>,
    pub difficulty: Difficulty,
    pub text: String,
    pub question_type: String,
    pub explanation: Option<String>,
}

/// Convert the internal candidate projection to the public DTO.
pub fn to_out(c: &Candidate) -> QuestionOut {
    QuestionOut {
        id: c.id.clone(),
        subject_id: c.subject_id.clone(),
        topic_id: c.topic_id.clone(),
        difficulty: c.difficulty,
        text: c.text.clone(),
        question_type: c.question_type.clone(),
        explanation: c.explanation.clone(),
    }
}

/// One entry of the final question set. `order` is 0-based and unique
/// within the result.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedQuestion {
    pub question_id: String,
    pub order: u32,
    pub question: QuestionOut,
}

/// Per-subject slice of the achieved distribution, with display passthrough.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectCount {
    pub subject_id: String,
    pub name: String,
    pub color: Option<String>,
    pub count: u32,
}

/// Counts per difficulty. Absent buckets stay at 0.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyCounts {
    pub easy: u32,
    pub medium: u32,
    pub hard: u32,
}

/// Achieved distribution of the final set. Re-derivable from `questions`
/// alone (plus subject display data), see `report::build_stats`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionStats {
    pub by_subject: Vec<SubjectCount>,
    pub by_difficulty: DifficultyCounts,
    /// Distinct topic ids observed; questions without a topic don't count.
    pub topics_covered: u32,
}

/// What `select` hands back: the ordered set plus the achieved-vs-requested
/// accounting. Created fresh per call; nothing is persisted by the engine.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionResult {
    pub questions: Vec<SelectedQuestion>,
    pub stats: DistributionStats,
    pub requested_total: u32,
    pub achieved_total: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_deserializes_with_minimal_fields() {
        let json = r#"{
            "totalQuestions": 20,
            "allocationPreset": "proportional",
            "difficultyMix": "balanced"
        }"#;
        let req: SelectionRequest = serde_json::from_str(json).expect("request");
        assert_eq!(req.total_questions, 20);
        assert_eq!(req.allocation_preset, AllocationPreset::Proportional);
        assert!(matches!(req.difficulty_mix, DifficultyMix::Preset(ref p) if p == "balanced"));
        assert!(!req.avoid_recently_used);
        assert!(req.tag_filter_ids.is_empty());
    }

    #[test]
    fn explicit_mix_deserializes_untagged() {
        let json = r#"{
            "totalQuestions": 5,
            "allocationPreset": "balanced",
            "difficultyMix": {"easy": 0.5, "medium": 0.3, "hard": 0.2}
        }"#;
        let req: SelectionRequest = serde_json::from_str(json).expect("request");
        match req.difficulty_mix {
            DifficultyMix::Explicit { easy, medium, hard } => {
                assert_eq!((easy, medium, hard), (0.5, 0.3, 0.2));
            }
            other => panic!("expected explicit mix, got {other:?}"),
        }
    }

    #[test]
    fn absent_warning_is_not_serialized() {
        let result = SelectionResult {
            questions: vec![],
            stats: DistributionStats {
                by_subject: vec![],
                by_difficulty: DifficultyCounts::default(),
                topics_covered: 0,
            },
            requested_total: 0,
            achieved_total: 0,
            warning: None,
        };
        let json = serde_json::to_value(&result).expect("json");
        assert!(json.get("warning").is_none());
        assert_eq!(json["achievedTotal"], 0);
    }
}
