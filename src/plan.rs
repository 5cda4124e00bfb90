//! Subject allocation planning: how many questions each subject contributes
//! to the requested total.
//!
//! The plan is a list, not a map — its order is the stable subject order the
//! repository reported, which is what makes "first entry" and "last active
//! subject" deterministic for the residual rules below.

use tracing::{debug, warn};

use crate::domain::{AllocationPreset, SubjectSummary};
use crate::protocol::SelectionRequest;

/// One subject's slice of the plan.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubjectAllocation {
    pub subject_id: String,
    pub count: u32,
}

/// Compute the subject → count allocation for the request.
///
/// After the preset-specific step, a non-empty plan is normalized so it sums
/// to at least `total_questions`: a rounding shortfall is added to the first
/// entry. Actual achievement may still fall short of the plan when the
/// repository runs dry; that is the selector's problem, not the planner's.
pub fn plan_distribution(
    request: &SelectionRequest,
    subjects: &[SubjectSummary],
) -> Vec<SubjectAllocation> {
    let total = request.total_questions;
    let mut plan = match request.allocation_preset {
        AllocationPreset::Proportional => proportional(total, subjects),
        AllocationPreset::Balanced => balanced(total, subjects),
        AllocationPreset::SingleSubject => match &request.focus_subject_id {
            Some(id) => vec![SubjectAllocation { subject_id: id.clone(), count: total }],
            None => {
                warn!(
                    target: "selection",
                    "single_subject allocation without a focus subject, falling back to proportional"
                );
                proportional(total, subjects)
            }
        },
        AllocationPreset::Custom => request
            .custom_distribution
            .iter()
            .filter(|(_, &count)| count > 0)
            .map(|(id, &count)| SubjectAllocation { subject_id: id.clone(), count })
            .collect(),
    };

    // Normalization post-step: rounding (or a short custom map) must not
    // leave the plan below the requested total.
    let allocated: u32 = plan.iter().map(|a| a.count).sum();
    if allocated < total {
        if let Some(first) = plan.first_mut() {
            first.count += total - allocated;
        }
    }

    debug!(
        target: "selection",
        preset = ?request.allocation_preset,
        total,
        subjects = plan.len(),
        planned = plan.iter().map(|a| a.count).sum::<u32>(),
        "distribution planned"
    );
    plan
}

/// Allocate proportionally to each active subject's pool size. The last
/// active subject absorbs the rounding residual; earlier allocations are
/// capped at the remaining budget so the residual can never go negative.
fn proportional(total: u32, subjects: &[SubjectSummary]) -> Vec<SubjectAllocation> {
    let active: Vec<&SubjectSummary> = subjects
        .iter()
        .filter(|s| s.available_published > 0)
        .collect();
    let total_available: u64 = active.iter().map(|s| s.available_published).sum();
    if total_available == 0 {
        return Vec::new();
    }

    let last = active.len() - 1;
    let mut remaining = total;
    let mut plan = Vec::with_capacity(active.len());
    for (i, subject) in active.iter().enumerate() {
        let count = if i == last {
            remaining
        } else {
            let share =
                total as f64 * subject.available_published as f64 / total_available as f64;
            (share.round() as u32).min(remaining)
        };
        remaining -= count;
        plan.push(SubjectAllocation { subject_id: subject.id.clone(), count });
    }
    plan
}

/// Split as evenly as possible: floor each, one extra to the first
/// `total mod active` subjects.
fn balanced(total: u32, subjects: &[SubjectSummary]) -> Vec<SubjectAllocation> {
    let active: Vec<&SubjectSummary> = subjects
        .iter()
        .filter(|s| s.available_published > 0)
        .collect();
    if active.is_empty() {
        return Vec::new();
    }

    let base = total / active.len() as u32;
    let extra = (total % active.len() as u32) as usize;
    active
        .iter()
        .enumerate()
        .map(|(i, s)| SubjectAllocation {
            subject_id: s.id.clone(),
            count: base + u32::from(i < extra),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::domain::{AllocationPreset, DifficultyMix};

    fn subject(id: &str, available: u64) -> SubjectSummary {
        SubjectSummary {
            id: id.into(),
            name: id.to_uppercase(),
            color: None,
            available_published: available,
        }
    }

    fn request(total: u32, preset: AllocationPreset) -> SelectionRequest {
        SelectionRequest {
            total_questions: total,
            allocation_preset: preset,
            focus_subject_id: None,
            custom_distribution: BTreeMap::new(),
            difficulty_mix: DifficultyMix::Preset("balanced".into()),
            avoid_recently_used: false,
            prefer_recent_questions: false,
            maximize_topic_coverage: false,
            tag_filter_ids: Default::default(),
            exclude_question_ids: Default::default(),
        }
    }

    fn counts(plan: &[SubjectAllocation]) -> Vec<(String, u32)> {
        plan.iter().map(|a| (a.subject_id.clone(), a.count)).collect()
    }

    #[test]
    fn balanced_splits_evenly_with_residual_up_front() {
        let subjects = [subject("a", 50), subject("b", 50)];
        let plan = plan_distribution(&request(10, AllocationPreset::Balanced), &subjects);
        assert_eq!(counts(&plan), vec![("a".into(), 5), ("b".into(), 5)]);

        let subjects = [subject("a", 50), subject("b", 50), subject("c", 50)];
        let plan = plan_distribution(&request(10, AllocationPreset::Balanced), &subjects);
        assert_eq!(
            counts(&plan),
            vec![("a".into(), 4), ("b".into(), 3), ("c".into(), 3)]
        );
    }

    #[test]
    fn balanced_skips_empty_subjects() {
        let subjects = [subject("a", 10), subject("b", 0), subject("c", 10)];
        let plan = plan_distribution(&request(6, AllocationPreset::Balanced), &subjects);
        assert_eq!(counts(&plan), vec![("a".into(), 3), ("c".into(), 3)]);
    }

    #[test]
    fn proportional_last_subject_absorbs_residual() {
        // 10 × 30/40 = 7.5 rounds to 8, the last pool takes what is left.
        let subjects = [subject("a", 30), subject("b", 10)];
        let plan = plan_distribution(&request(10, AllocationPreset::Proportional), &subjects);
        assert_eq!(counts(&plan), vec![("a".into(), 8), ("b".into(), 2)]);
    }

    #[test]
    fn proportional_is_empty_when_nothing_is_available() {
        let subjects = [subject("a", 0), subject("b", 0)];
        let plan = plan_distribution(&request(10, AllocationPreset::Proportional), &subjects);
        assert!(plan.is_empty());
    }

    #[test]
    fn proportional_sum_invariant_holds_under_rounding_pressure() {
        // Ten tiny pools each round 0.5 up; without the remaining-budget cap
        // the first nine would overshoot the total.
        let subjects: Vec<SubjectSummary> =
            (0..10).map(|i| subject(&format!("s{i}"), 1)).collect();
        let plan = plan_distribution(&request(5, AllocationPreset::Proportional), &subjects);
        assert_eq!(plan.iter().map(|a| a.count).sum::<u32>(), 5);

        for total in 0..40 {
            let plan =
                plan_distribution(&request(total, AllocationPreset::Proportional), &subjects);
            assert_eq!(plan.iter().map(|a| a.count).sum::<u32>(), total, "total {total}");
        }
    }

    #[test]
    fn single_subject_takes_everything() {
        let subjects = [subject("a", 10), subject("b", 10)];
        let mut req = request(12, AllocationPreset::SingleSubject);
        req.focus_subject_id = Some("b".into());
        let plan = plan_distribution(&req, &subjects);
        assert_eq!(counts(&plan), vec![("b".into(), 12)]);
    }

    #[test]
    fn single_subject_without_focus_falls_back_to_proportional() {
        // Documented fallback, not a validation error.
        let subjects = [subject("a", 10), subject("b", 10)];
        let plan = plan_distribution(&request(10, AllocationPreset::SingleSubject), &subjects);
        assert_eq!(counts(&plan), vec![("a".into(), 5), ("b".into(), 5)]);
    }

    #[test]
    fn custom_is_verbatim_minus_zero_entries() {
        let subjects = [subject("a", 10), subject("b", 10), subject("c", 10)];
        let mut req = request(12, AllocationPreset::Custom);
        req.custom_distribution =
            BTreeMap::from([("a".into(), 7), ("b".into(), 0), ("c".into(), 5)]);
        let plan = plan_distribution(&req, &subjects);
        assert_eq!(counts(&plan), vec![("a".into(), 7), ("c".into(), 5)]);
    }

    #[test]
    fn short_custom_map_is_topped_up_on_the_first_entry() {
        let subjects = [subject("a", 10), subject("b", 10)];
        let mut req = request(10, AllocationPreset::Custom);
        req.custom_distribution = BTreeMap::from([("a".into(), 3), ("b".into(), 4)]);
        let plan = plan_distribution(&req, &subjects);
        assert_eq!(counts(&plan), vec![("a".into(), 6), ("b".into(), 4)]);
    }
}
