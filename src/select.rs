//! The selection engine: per-bucket candidate drawing, topic interleaving,
//! gap filling, and final assembly.
//!
//! One `select` call is a self-contained computation — it reads from the
//! repository and the random source and owns nothing between invocations.
//! Buckets are drawn sequentially on purpose: each query must see the
//! exclusions accumulated by the ones before it, so no question appears
//! twice in a result.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::config::EngineConfig;
use crate::domain::{Candidate, Difficulty, MixWeights};
use crate::mix::{difficulty_targets, resolve_mix};
use crate::plan::{plan_distribution, SubjectAllocation};
use crate::protocol::{to_out, SelectedQuestion, SelectionRequest, SelectionResult};
use crate::repo::{BaseFilter, CandidateOrdering, CandidateQuery, QuestionRepository, RepoError};
use crate::report::{build_stats, shortfall_warning};
use crate::shuffle::fair_shuffle;

/// Failures surfaced by `select`. The engine itself degrades instead of
/// erroring; only repository failures pass through, unclassified.
#[derive(Debug, Error)]
pub enum SelectError {
    #[error(transparent)]
    Repository(#[from] RepoError),
}

/// Everything accumulated while buckets are drawn, threaded through the
/// bucket steps explicitly so the engine stays reentrant.
#[derive(Default)]
struct SelectionContext {
    picked: Vec<Candidate>,
    taken_ids: BTreeSet<String>,
}

impl SelectionContext {
    fn take(&mut self, candidates: Vec<Candidate>) {
        for c in candidates {
            self.taken_ids.insert(c.id.clone());
            self.picked.push(c);
        }
    }
}

pub struct SelectionEngine<R> {
    repo: R,
    config: EngineConfig,
}

impl<R: QuestionRepository> SelectionEngine<R> {
    pub fn new(repo: R) -> Self {
        Self::with_config(repo, EngineConfig::default())
    }

    pub fn with_config(repo: R, config: EngineConfig) -> Self {
        Self { repo, config }
    }

    /// Build a balanced question set for the request.
    ///
    /// Never fails for scarcity reasons: an exhausted pool shows up as
    /// `achieved_total < requested_total` plus a `warning`, not as an error.
    #[instrument(
        level = "info",
        skip(self, request),
        fields(total = request.total_questions, preset = ?request.allocation_preset)
    )]
    pub async fn select(
        &self,
        request: &SelectionRequest,
    ) -> Result<SelectionResult, SelectError> {
        let base_filter = BaseFilter {
            tag_filter_ids: request.tag_filter_ids.clone(),
            exclude_question_ids: request.exclude_question_ids.clone(),
        };

        let subjects = self.repo.subject_summaries(&base_filter).await?;
        let plan = plan_distribution(request, &subjects);
        let weights = resolve_mix(&request.difficulty_mix, &self.config);

        let mut ctx = SelectionContext::default();
        for allocation in &plan {
            if allocation.count == 0 {
                continue;
            }
            let targets = difficulty_targets(allocation.count, &weights);
            let before = ctx.picked.len();

            for difficulty in Difficulty::ALL {
                let target = targets.get(difficulty);
                if target > 0 {
                    self.fill_bucket(request, &base_filter, &mut ctx, allocation, difficulty, target)
                        .await?;
                }
            }

            let achieved = (ctx.picked.len() - before) as u32;
            if achieved < allocation.count {
                self.fill_gap(
                    request,
                    &base_filter,
                    &mut ctx,
                    allocation,
                    allocation.count - achieved,
                    &weights,
                )
                .await?;
            }
        }

        let mut picked = ctx.picked;
        fair_shuffle(&mut picked);
        let questions: Vec<SelectedQuestion> = picked
            .iter()
            .enumerate()
            .map(|(i, c)| SelectedQuestion {
                question_id: c.id.clone(),
                order: i as u32,
                question: to_out(c),
            })
            .collect();

        let achieved_total = questions.len() as u32;
        let stats = build_stats(&questions, &subjects);
        let warning = shortfall_warning(request.total_questions, achieved_total);
        match &warning {
            Some(w) => warn!(
                target: "selection",
                requested = request.total_questions,
                achieved = achieved_total,
                "{w}"
            ),
            None => info!(
                target: "selection",
                achieved = achieved_total,
                subjects = stats.by_subject.len(),
                topics = stats.topics_covered,
                "selection complete"
            ),
        }

        Ok(SelectionResult {
            questions,
            stats,
            requested_total: request.total_questions,
            achieved_total,
            warning,
        })
    }

    /// Draw one (subject, difficulty) bucket: over-fetch under the current
    /// exclusions, optionally interleave across topics, shuffle, truncate.
    async fn fill_bucket(
        &self,
        request: &SelectionRequest,
        base_filter: &BaseFilter,
        ctx: &mut SelectionContext,
        allocation: &SubjectAllocation,
        difficulty: Difficulty,
        target: u32,
    ) -> Result<(), SelectError> {
        let query = CandidateQuery {
            subject_id: allocation.subject_id.clone(),
            difficulty,
            filter: filter_with_taken(base_filter, &ctx.taken_ids),
            ordering: CandidateOrdering {
                usage_ascending: request.avoid_recently_used,
                newest_first: request.prefer_recent_questions,
                by_topic: request.maximize_topic_coverage,
            },
            limit: target as usize * self.config.overfetch(),
        };
        let mut pool = self.repo.candidates(&query).await?;

        if request.maximize_topic_coverage && pool.len() > target as usize {
            pool = round_robin_by_topic(pool, target as usize);
        }
        fair_shuffle(&mut pool);
        pool.truncate(target as usize);

        debug!(
            target: "selection",
            subject = %allocation.subject_id,
            difficulty = ?difficulty,
            want = target,
            got = pool.len(),
            "bucket drawn"
        );
        ctx.take(pool);
        Ok(())
    }

    /// Recover a subject's shortfall: re-derive Easy/Medium/Hard targets for
    /// the residual amount with the same reconciliation rule, then re-query
    /// each difficulty under the grown exclusion set. Ordering drops to the
    /// simpler preference and there is no topic interleaving — diversity is
    /// secondary once the pool is scarce. One pass only; what stays short
    /// stays short.
    async fn fill_gap(
        &self,
        request: &SelectionRequest,
        base_filter: &BaseFilter,
        ctx: &mut SelectionContext,
        allocation: &SubjectAllocation,
        residual: u32,
        weights: &MixWeights,
    ) -> Result<(), SelectError> {
        let targets = difficulty_targets(residual, weights);
        let ordering = if request.avoid_recently_used {
            CandidateOrdering { usage_ascending: true, ..Default::default() }
        } else {
            CandidateOrdering { newest_first: true, ..Default::default() }
        };

        debug!(
            target: "selection",
            subject = %allocation.subject_id,
            residual,
            "bucket shortfall, drawing from the remaining pool"
        );
        for difficulty in Difficulty::ALL {
            let want = targets.get(difficulty);
            if want == 0 {
                continue;
            }
            let query = CandidateQuery {
                subject_id: allocation.subject_id.clone(),
                difficulty,
                filter: filter_with_taken(base_filter, &ctx.taken_ids),
                ordering,
                limit: want as usize,
            };
            let extra = self.repo.candidates(&query).await?;
            ctx.take(extra);
        }
        Ok(())
    }
}

/// The run-wide filter plus everything taken so far. Exclusions only ever
/// grow within a run, which is what keeps the result duplicate-free.
fn filter_with_taken(base: &BaseFilter, taken: &BTreeSet<String>) -> BaseFilter {
    let mut filter = base.clone();
    filter
        .exclude_question_ids
        .extend(taken.iter().cloned());
    filter
}

/// Round-robin across topic groups: take one candidate per topic, cycling,
/// until `target` is reached or every group is dry. Spreads the bucket over
/// as many distinct topics as the fetched pool allows instead of clustering
/// on the most populous one. Within a group the fetched (preference) order
/// is kept; topicless candidates form their own group.
fn round_robin_by_topic(pool: Vec<Candidate>, target: usize) -> Vec<Candidate> {
    let mut groups: BTreeMap<Option<String>, VecDeque<Candidate>> = BTreeMap::new();
    for candidate in pool {
        groups
            .entry(candidate.topic_id.clone())
            .or_default()
            .push_back(candidate);
    }

    let mut out = Vec::with_capacity(target);
    'cycle: loop {
        let mut drew = false;
        for queue in groups.values_mut() {
            if let Some(candidate) = queue.pop_front() {
                out.push(candidate);
                drew = true;
                if out.len() == target {
                    break 'cycle;
                }
            }
        }
        if !drew {
            break;
        }
    }
    out
}
