//! The question repository seam — the engine's single external collaborator.
//!
//! The surrounding application implements `QuestionRepository` over its real
//! storage; the crate ships `memory::InMemoryQuestionBank` for tests and
//! seeding. Only published questions are visible through this interface.

use std::collections::BTreeSet;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{Candidate, Difficulty, SubjectSummary};

/// Opaque repository failure. The engine neither classifies nor retries
/// these; the caller owns retry/report policy.
#[derive(Debug, Error)]
#[error("question repository failure: {0}")]
pub struct RepoError(pub String);

/// Filters that apply to every query of one selection run.
#[derive(Clone, Debug, Default)]
pub struct BaseFilter {
    /// When non-empty, candidates must carry at least one of these tags.
    pub tag_filter_ids: BTreeSet<String>,
    /// Never returned: caller-supplied exclusions plus everything already
    /// taken earlier in the run.
    pub exclude_question_ids: BTreeSet<String>,
}

/// Requested ordering, applied before the limit. Ascending id is always the
/// final tiebreak so identical repository state yields identical pages.
#[derive(Clone, Copy, Debug, Default)]
pub struct CandidateOrdering {
    /// Least-used first (`avoid_recently_used`).
    pub usage_ascending: bool,
    /// Newest first (`prefer_recent_questions`).
    pub newest_first: bool,
    /// Topic-ascending grouping — a pre-pass for round-robin interleaving,
    /// not a final sort (`maximize_topic_coverage`).
    pub by_topic: bool,
}

/// One (subject, difficulty) bucket query.
#[derive(Clone, Debug)]
pub struct CandidateQuery {
    pub subject_id: String,
    pub difficulty: Difficulty,
    pub filter: BaseFilter,
    pub ordering: CandidateOrdering,
    /// Fetch cap; the selector over-fetches past its target to leave room
    /// for shuffling and diversity.
    pub limit: usize,
}

/// Read-only candidate source backing the engine.
#[async_trait]
pub trait QuestionRepository: Send + Sync {
    /// Per-subject availability under `filter`, difficulty-blind. The order
    /// of the returned summaries is the planner's stable subject order.
    async fn subject_summaries(
        &self,
        filter: &BaseFilter,
    ) -> Result<Vec<SubjectSummary>, RepoError>;

    /// Candidates for one bucket, ordered per `query.ordering` and capped at
    /// `query.limit`.
    async fn candidates(&self, query: &CandidateQuery) -> Result<Vec<Candidate>, RepoError>;
}
