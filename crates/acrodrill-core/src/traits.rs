//! Collaborator traits: progress persistence and study coaching.
//!
//! The selection and scoring code never calls these; the flow in
//! [`crate::engine`] awaits them between learner actions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::Domain;
use crate::progress::{HistoryMap, ProgressMap, ProgressRecord, SwipeDirection};

// ---------------------------------------------------------------------------
// Progress store trait
// ---------------------------------------------------------------------------

/// Per-user progress and exam history persistence.
///
/// Each write is a read-modify-write of one user's records. Implementations
/// must not interleave two writes for the same user.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// Backend name for logs (e.g. "memory").
    fn name(&self) -> &str;

    /// Every progress record for `user`, keyed by item id.
    async fn load_progress(&self, user: &str) -> anyhow::Result<ProgressMap>;

    /// Apply a training swipe and return the updated record.
    async fn record_swipe(
        &self,
        user: &str,
        item_id: &str,
        direction: SwipeDirection,
        now: DateTime<Utc>,
    ) -> anyhow::Result<ProgressRecord>;

    /// Apply a scored drill answer and return the updated record.
    async fn record_test_answer(
        &self,
        user: &str,
        item_id: &str,
        correct: bool,
        now: DateTime<Utc>,
    ) -> anyhow::Result<ProgressRecord>;

    /// Every exam question history entry for `user`, keyed by question id.
    async fn load_history(&self, user: &str) -> anyhow::Result<HistoryMap>;

    /// Fold one exam's outcomes into the user's question history.
    async fn record_question_results(
        &self,
        user: &str,
        outcomes: &[QuestionOutcome],
        now: DateTime<Utc>,
    ) -> anyhow::Result<()>;
}

/// Whether one exam question was answered fully correctly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOutcome {
    pub question_id: String,
    pub correct: bool,
}

// ---------------------------------------------------------------------------
// Study coach trait
// ---------------------------------------------------------------------------

/// Text generator for re-explanations and post-exam study summaries.
///
/// Output is opaque display text.
#[async_trait]
pub trait StudyCoach: Send + Sync {
    fn name(&self) -> &str;

    /// Re-explain one item after a missed drill question.
    async fn explain(&self, request: &ExplainRequest) -> anyhow::Result<String>;

    /// Summarize the concepts behind a set of missed exam questions.
    async fn summarize(&self, request: &SummaryRequest) -> anyhow::Result<String>;
}

/// Request to re-explain an item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplainRequest {
    pub item_id: String,
    pub full_name: String,
    #[serde(default)]
    pub mnemonic: String,
    #[serde(default)]
    pub example: String,
    #[serde(default)]
    pub exam_tip: String,
}

/// A missed exam question as handed to the coach.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissedQuestion {
    pub id: String,
    pub domain: Domain,
    pub topic: String,
    pub stem: String,
    pub explanation: String,
}

/// Request to summarize missed exam questions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryRequest {
    pub missed: Vec<MissedQuestion>,
}
