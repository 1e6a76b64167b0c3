//! Study flow orchestrator.
//!
//! Wires the read-only catalogues, a [`ProgressStore`] and the pure
//! selection/scoring modules into the learner-facing operations. Store calls
//! are awaited one at a time; nothing here runs concurrently for one user.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rand::Rng;

use crate::config::AcrodrillConfig;
use crate::drill::{build_drill, DrillMode, DrillQuestion, DrillResponse};
use crate::model::{Category, Domain, ExamPreset, Item};
use crate::progress::{ProgressRecord, SwipeDirection};
use crate::report::ExamReport;
use crate::repository::{ItemRepository, QuestionBank};
use crate::selection::{
    fill_with_random, select_exam_questions, select_hard_mode, select_random, select_reinforcement,
};
use crate::session::{ExamSession, TrainingMode};
use crate::traits::{
    ExplainRequest, MissedQuestion, ProgressStore, QuestionOutcome, StudyCoach, SummaryRequest,
};

/// What to drill on.
#[derive(Debug, Clone, Default)]
pub struct DrillPlan {
    pub mode: DrillMode,
    pub count: usize,
    /// Restrict normal drills to one domain. Ignored in hard mode.
    pub domain: Option<Domain>,
    /// Restrict normal drills to one category. Ignored in hard mode.
    pub category: Option<Category>,
}

/// Result of answering one drill question.
#[derive(Debug, Clone)]
pub struct DrillFeedback {
    pub correct: bool,
    /// The item's progress after the answer was recorded.
    pub record: ProgressRecord,
}

/// The study engine.
pub struct StudyEngine {
    catalogue: Arc<ItemRepository>,
    bank: Arc<QuestionBank>,
    store: Arc<dyn ProgressStore>,
    config: AcrodrillConfig,
}

impl StudyEngine {
    pub fn new(
        catalogue: Arc<ItemRepository>,
        bank: Arc<QuestionBank>,
        store: Arc<dyn ProgressStore>,
        config: AcrodrillConfig,
    ) -> Self {
        Self {
            catalogue,
            bank,
            store,
            config,
        }
    }

    pub fn catalogue(&self) -> &ItemRepository {
        &self.catalogue
    }

    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    pub fn config(&self) -> &AcrodrillConfig {
        &self.config
    }

    pub fn store(&self) -> &dyn ProgressStore {
        self.store.as_ref()
    }

    fn item(&self, item_id: &str) -> Result<&Item> {
        self.catalogue
            .get(item_id)
            .with_context(|| format!("unknown item: {item_id}"))
    }

    // -----------------------------------------------------------------------
    // Training
    // -----------------------------------------------------------------------

    /// Plan a training deck of `count` items.
    ///
    /// Reinforcement decks are padded with random items when the priority
    /// buckets run short.
    pub async fn plan_training<R: Rng + ?Sized>(
        &self,
        user: &str,
        mode: TrainingMode,
        count: usize,
        rng: &mut R,
    ) -> Result<Vec<&Item>> {
        let deck = match mode {
            TrainingMode::Random => select_random(self.catalogue.iter(), count, rng),
            TrainingMode::Reinforcement => {
                let progress = self.store.load_progress(user).await?;
                let mut deck = select_reinforcement(self.catalogue.iter(), &progress, count, rng);
                let prioritized = deck.len();
                fill_with_random(&mut deck, self.catalogue.iter(), count, rng);
                tracing::debug!(
                    user,
                    prioritized,
                    padded = deck.len() - prioritized,
                    "training deck planned"
                );
                deck
            }
        };
        Ok(deck)
    }

    pub async fn record_swipe(
        &self,
        user: &str,
        item_id: &str,
        direction: SwipeDirection,
        now: DateTime<Utc>,
    ) -> Result<ProgressRecord> {
        let item = self.item(item_id)?;
        self.store.record_swipe(user, &item.id, direction, now).await
    }

    // -----------------------------------------------------------------------
    // Drills
    // -----------------------------------------------------------------------

    pub async fn plan_drill<R: Rng + ?Sized>(
        &self,
        user: &str,
        plan: &DrillPlan,
        rng: &mut R,
    ) -> Result<Vec<DrillQuestion>> {
        let items = match plan.mode {
            DrillMode::Hard => {
                let progress = self.store.load_progress(user).await?;
                let pool_size = self.config.hard_mode_count.max(plan.count);
                let mut items = select_hard_mode(self.catalogue.iter(), &progress, pool_size, rng);
                items.truncate(plan.count);
                items
            }
            DrillMode::Normal => {
                let candidates = self.catalogue.iter().filter(|item| {
                    plan.domain.map_or(true, |d| item.domain == d)
                        && plan.category.map_or(true, |c| item.category == c)
                });
                select_random(candidates, plan.count, rng)
            }
        };

        if items.len() < plan.count {
            tracing::debug!(
                user,
                requested = plan.count,
                available = items.len(),
                "drill under-filled"
            );
        }

        Ok(build_drill(
            &items,
            self.catalogue.items(),
            plan.mode,
            self.config.distractor_count,
            rng,
        ))
    }

    /// Check a drill response and record it against the question's item.
    pub async fn answer_drill(
        &self,
        user: &str,
        question: &DrillQuestion,
        response: &DrillResponse,
        now: DateTime<Utc>,
    ) -> Result<DrillFeedback> {
        let correct = question.check(response);
        let record = self
            .store
            .record_test_answer(user, &question.item_id, correct, now)
            .await?;
        Ok(DrillFeedback { correct, record })
    }

    /// Ask `coach` to re-explain an item, typically after a miss.
    pub async fn explain(&self, item_id: &str, coach: &dyn StudyCoach) -> Result<String> {
        let item = self.item(item_id)?;
        coach
            .explain(&ExplainRequest {
                item_id: item.id.clone(),
                full_name: item.full_name.clone(),
                mnemonic: item.mnemonic.clone(),
                example: item.example.clone(),
                exam_tip: item.exam_tip.clone(),
            })
            .await
            .with_context(|| format!("{} failed to explain {item_id}", coach.name()))
    }

    // -----------------------------------------------------------------------
    // Exams
    // -----------------------------------------------------------------------

    /// Select a paper for `preset` from the bank and the learner's history.
    pub async fn start_exam<R: Rng + ?Sized>(
        &self,
        user: &str,
        preset: ExamPreset,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> Result<ExamSession> {
        let history = self.store.load_history(user).await?;
        let config = preset.config();
        let paper: Vec<_> = select_exam_questions(&self.bank, &history, &config, rng)
            .into_iter()
            .cloned()
            .collect();

        tracing::info!(
            user,
            preset = %preset,
            questions = paper.len(),
            target = config.total_questions,
            "exam paper selected"
        );

        Ok(ExamSession::new(
            config,
            paper,
            self.bank.scoring().clone(),
            now,
        ))
    }

    /// Finalize an exam: record per-question outcomes and build the report.
    ///
    /// Missed and unanswered questions go to `coach` for a study summary. A
    /// failing coach leaves the summary empty rather than losing the report.
    pub async fn finish_exam(
        &self,
        user: &str,
        session: ExamSession,
        now: DateTime<Utc>,
        coach: Option<&dyn StudyCoach>,
    ) -> Result<ExamReport> {
        let outcomes: Vec<QuestionOutcome> = session
            .answers()
            .iter()
            .map(|a| QuestionOutcome {
                question_id: a.question_id.clone(),
                correct: a.correct,
            })
            .collect();

        let missed: Vec<MissedQuestion> = session
            .questions()
            .iter()
            .filter(|q| {
                !session
                    .answers()
                    .iter()
                    .any(|a| a.question_id == q.id && a.correct)
            })
            .map(|q| MissedQuestion {
                id: q.id.clone(),
                domain: q.domain,
                topic: q.topic.clone(),
                stem: q.stem.clone(),
                explanation: q.explanation.clone(),
            })
            .collect();

        if session.is_expired(now) {
            tracing::info!(user, session = %session.id, "exam time budget elapsed, finalizing");
        }

        self.store
            .record_question_results(user, &outcomes, now)
            .await
            .context("failed to record exam history")?;

        let mut report = session.finish(now, self.config.pass_threshold);

        if let Some(coach) = coach {
            if !missed.is_empty() {
                match coach.summarize(&SummaryRequest { missed }).await {
                    Ok(summary) => report.summary = Some(summary),
                    Err(e) => tracing::warn!("{} summary failed: {e:#}", coach.name()),
                }
            }
        }

        Ok(report)
    }
}
