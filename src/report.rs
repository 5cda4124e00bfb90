//! Distribution reporting: a pure aggregation pass over the final selected
//! list. No selection logic lives here — the stats must be re-derivable from
//! `questions` alone, which is exactly what the tests do.

use std::collections::{BTreeSet, HashMap};

use crate::domain::{Difficulty, SubjectSummary};
use crate::protocol::{DifficultyCounts, DistributionStats, SelectedQuestion, SubjectCount};

/// Aggregate the final list into per-subject, per-difficulty, and
/// topic-coverage statistics. Subject display data (name/color) is passed
/// through from the summaries; a subject missing from `subjects` (possible
/// under a forced custom allocation) falls back to its id as the name.
pub fn build_stats(
    questions: &[SelectedQuestion],
    subjects: &[SubjectSummary],
) -> DistributionStats {
    let mut per_subject: HashMap<&str, u32> = HashMap::new();
    let mut by_difficulty = DifficultyCounts::default();
    let mut topics: BTreeSet<&str> = BTreeSet::new();

    for selected in questions {
        let q = &selected.question;
        *per_subject.entry(q.subject_id.as_str()).or_insert(0) += 1;
        match q.difficulty {
            Difficulty::Easy => by_difficulty.easy += 1,
            Difficulty::Medium => by_difficulty.medium += 1,
            Difficulty::Hard => by_difficulty.hard += 1,
        }
        if let Some(topic) = &q.topic_id {
            topics.insert(topic.as_str());
        }
    }

    // Subjects in repository order first, then any stragglers the summaries
    // don't know about (stable by id).
    let mut by_subject = Vec::new();
    for subject in subjects {
        if let Some(count) = per_subject.remove(subject.id.as_str()) {
            by_subject.push(SubjectCount {
                subject_id: subject.id.clone(),
                name: subject.name.clone(),
                color: subject.color.clone(),
                count,
            });
        }
    }
    let mut leftovers: Vec<(&str, u32)> = per_subject.into_iter().collect();
    leftovers.sort_unstable_by_key(|(id, _)| *id);
    for (id, count) in leftovers {
        by_subject.push(SubjectCount {
            subject_id: id.to_string(),
            name: id.to_string(),
            color: None,
            count,
        });
    }

    DistributionStats {
        by_subject,
        by_difficulty,
        topics_covered: topics.len() as u32,
    }
}

/// Human-readable shortfall note, present exactly when the engine achieved
/// less than was requested.
pub fn shortfall_warning(requested: u32, achieved: u32) -> Option<String> {
    (achieved < requested).then(|| {
        format!(
            "Requested {requested} questions but only {achieved} could be selected \
             under the current filters."
        )
    })
}
