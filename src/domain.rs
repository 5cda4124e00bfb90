//! Domain models used by the engine: difficulties, subjects, candidate
//! questions, and the allocation/mix policies a caller can pick from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Question difficulty, the axis every selection bucket is split along.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Stable iteration order for bucket loops and reports.
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];
}

/// How the requested total is spread across subjects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationPreset {
    /// Proportional to each subject's available pool size.
    Proportional,
    /// As even as possible across all subjects with available questions.
    Balanced,
    /// Everything goes to `focus_subject_id`.
    SingleSubject,
    /// The caller-supplied `custom_distribution` map, taken verbatim.
    Custom,
}

/// Requested Easy/Medium/Hard proportions: either a named preset or explicit
/// weights. Explicit weights are used as given; the caller owns their
/// validity (non-negative, summing to 1).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DifficultyMix {
    Explicit { easy: f64, medium: f64, hard: f64 },
    Preset(String),
}

/// Resolved mix weights. See `mix::resolve_mix`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MixWeights {
    pub easy: f64,
    pub medium: f64,
    pub hard: f64,
}

/// Subject as seen by the planner: identity, display passthrough, and how
/// many published questions survive the current filters. The count is
/// difficulty-blind.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SubjectSummary {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
    pub available_published: u64,
}

/// Candidate question projection returned by the repository for one
/// (subject, difficulty) query. Display fields pass through to the output
/// unmodified.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    pub subject_id: String,
    #[serde(default)]
    pub topic_id: Option<String>,
    pub difficulty: Difficulty,
    pub usage_count: u32,
    pub created_at: DateTime<Utc>,

    pub text: String,
    pub question_type: String,
    #[serde(default)]
    pub explanation: Option<String>,
}
