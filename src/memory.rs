//! In-memory question bank: a complete `QuestionRepository` over `HashMap`
//! stores behind `tokio::sync::RwLock`.
//!
//! This is the repository the test-suite runs against, and host applications
//! can use it to seed demo data before a real storage adapter exists. It
//! implements filtering, availability counting, the composite ordering, and
//! limit semantics exactly as the trait requires.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::domain::{Candidate, SubjectSummary};
use crate::repo::{BaseFilter, CandidateOrdering, CandidateQuery, QuestionRepository, RepoError};

/// Subject registration: identity plus the display fields summaries pass
/// through.
#[derive(Clone, Debug)]
pub struct SubjectMeta {
    pub id: String,
    pub name: String,
    pub color: Option<String>,
}

/// Full stored form of a question: the candidate projection plus the
/// bank-side fields the filters run against.
#[derive(Clone, Debug)]
pub struct StoredQuestion {
    pub candidate: Candidate,
    pub tag_ids: BTreeSet<String>,
    pub published: bool,
}

#[derive(Clone, Default)]
pub struct InMemoryQuestionBank {
    subjects: Arc<RwLock<Vec<SubjectMeta>>>,
    by_id: Arc<RwLock<HashMap<String, StoredQuestion>>>,
}

impl InMemoryQuestionBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subject. Summaries come back in registration order, which
    /// is the stable order the planner sees.
    #[instrument(level = "debug", skip_all, fields(subject = %id))]
    pub async fn insert_subject(&self, id: &str, name: &str, color: Option<String>) {
        let mut subjects = self.subjects.write().await;
        subjects.push(SubjectMeta {
            id: id.to_string(),
            name: name.to_string(),
            color,
        });
    }

    /// Insert a question, assigning a fresh id when the stored one is empty.
    /// Returns the id actually stored under.
    #[instrument(level = "debug", skip(self, question))]
    pub async fn insert_question(&self, mut question: StoredQuestion) -> String {
        if question.candidate.id.is_empty() {
            question.candidate.id = Uuid::new_v4().to_string();
        }
        let id = question.candidate.id.clone();
        let mut by_id = self.by_id.write().await;
        by_id.insert(id.clone(), question);
        id
    }

    pub async fn question_count(&self) -> usize {
        self.by_id.read().await.len()
    }
}

fn passes_filter(q: &StoredQuestion, filter: &BaseFilter) -> bool {
    if !q.published {
        return false;
    }
    if filter.exclude_question_ids.contains(&q.candidate.id) {
        return false;
    }
    if !filter.tag_filter_ids.is_empty()
        && filter.tag_filter_ids.is_disjoint(&q.tag_ids)
    {
        return false;
    }
    true
}

/// Composite comparison per the requested ordering, id-ascending tiebreak.
fn compare(a: &Candidate, b: &Candidate, ordering: CandidateOrdering) -> Ordering {
    let mut ord = Ordering::Equal;
    if ordering.usage_ascending {
        ord = a.usage_count.cmp(&b.usage_count);
    }
    if ord == Ordering::Equal && ordering.newest_first {
        ord = b.created_at.cmp(&a.created_at);
    }
    if ord == Ordering::Equal && ordering.by_topic {
        ord = a.topic_id.cmp(&b.topic_id);
    }
    ord.then_with(|| a.id.cmp(&b.id))
}

#[async_trait]
impl QuestionRepository for InMemoryQuestionBank {
    async fn subject_summaries(
        &self,
        filter: &BaseFilter,
    ) -> Result<Vec<SubjectSummary>, RepoError> {
        let subjects = self.subjects.read().await;
        let by_id = self.by_id.read().await;

        let mut counts: HashMap<&str, u64> = HashMap::new();
        for q in by_id.values().filter(|q| passes_filter(q, filter)) {
            *counts.entry(q.candidate.subject_id.as_str()).or_insert(0) += 1;
        }

        Ok(subjects
            .iter()
            .map(|s| SubjectSummary {
                id: s.id.clone(),
                name: s.name.clone(),
                color: s.color.clone(),
                available_published: counts.get(s.id.as_str()).copied().unwrap_or(0),
            })
            .collect())
    }

    async fn candidates(&self, query: &CandidateQuery) -> Result<Vec<Candidate>, RepoError> {
        let by_id = self.by_id.read().await;
        let mut matches: Vec<&StoredQuestion> = by_id
            .values()
            .filter(|q| {
                q.candidate.subject_id == query.subject_id
                    && q.candidate.difficulty == query.difficulty
                    && passes_filter(q, &query.filter)
            })
            .collect();
        matches.sort_by(|a, b| compare(&a.candidate, &b.candidate, query.ordering));

        debug!(
            target: "examset",
            subject = %query.subject_id,
            difficulty = ?query.difficulty,
            matched = matches.len(),
            limit = query.limit,
            "candidate query served"
        );
        Ok(matches
            .into_iter()
            .take(query.limit)
            .map(|q| q.candidate.clone())
            .collect())
    }
}
