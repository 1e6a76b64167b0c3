//! Session aggregation: exam results, the exam session lifecycle, and
//! drill/training tallies.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::drill::DrillMode;
use crate::model::{Answer, Category, Domain, ExamQuestion, Item, PresetConfig, QuestionType};
use crate::progress::SwipeDirection;
use crate::report::ExamReport;
use crate::scoring::{score_answer, ScoreResult, ScoringRules};

/// Default passing percentage, an approximation of a 750/900 scaled score.
pub const PASS_THRESHOLD: f64 = 83.3;

// ---------------------------------------------------------------------------
// Exam aggregation
// ---------------------------------------------------------------------------

/// One scored exam answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamAnswer {
    pub question_id: String,
    pub question_type: QuestionType,
    pub answer: Answer,
    pub points_earned: f64,
    pub points_possible: f64,
    pub correct: bool,
    pub domain: Domain,
}

/// Earned/possible points within one domain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DomainScore {
    pub earned: f64,
    pub possible: f64,
    /// 0 when nothing in the domain was worth any points.
    pub percentage: f64,
}

impl DomainScore {
    /// Domains with zero possible points are kept but should not be displayed
    /// as a score.
    pub fn is_scored(&self) -> bool {
        self.possible > 0.0
    }
}

/// Aggregate outcome of an exam.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExamResults {
    pub total_points_earned: f64,
    pub total_points_possible: f64,
    pub percentage: f64,
    pub passed: bool,
    pub domain_breakdown: BTreeMap<Domain, DomainScore>,
}

fn percent(earned: f64, possible: f64) -> f64 {
    if possible > 0.0 {
        earned / possible * 100.0
    } else {
        0.0
    }
}

/// Fold scored answers into totals and a per-domain breakdown.
pub fn calculate_exam_results(answers: &[ExamAnswer], pass_threshold: f64) -> ExamResults {
    let mut total_earned = 0.0;
    let mut total_possible = 0.0;
    let mut domains: BTreeMap<Domain, DomainScore> = BTreeMap::new();

    for a in answers {
        total_earned += a.points_earned;
        total_possible += a.points_possible;
        let entry = domains.entry(a.domain).or_default();
        entry.earned += a.points_earned;
        entry.possible += a.points_possible;
    }

    for score in domains.values_mut() {
        score.percentage = percent(score.earned, score.possible);
    }

    let percentage = percent(total_earned, total_possible);
    ExamResults {
        total_points_earned: total_earned,
        total_points_possible: total_possible,
        percentage,
        passed: percentage >= pass_threshold,
        domain_breakdown: domains,
    }
}

// ---------------------------------------------------------------------------
// Exam session
// ---------------------------------------------------------------------------

/// An in-progress exam. Owned by the flow driving it until [`ExamSession::finish`].
#[derive(Debug, Clone)]
pub struct ExamSession {
    pub id: Uuid,
    pub config: PresetConfig,
    pub started_at: DateTime<Utc>,
    paper: Vec<ExamQuestion>,
    rules: ScoringRules,
    answers: Vec<ExamAnswer>,
}

impl ExamSession {
    pub fn new(
        config: PresetConfig,
        paper: Vec<ExamQuestion>,
        rules: ScoringRules,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            config,
            started_at,
            paper,
            rules,
            answers: Vec::new(),
        }
    }

    /// Rebuild a session for a paper that was saved and is being graded later.
    pub fn resume(
        id: Uuid,
        config: PresetConfig,
        paper: Vec<ExamQuestion>,
        rules: ScoringRules,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            ..Self::new(config, paper, rules, started_at)
        }
    }

    pub fn questions(&self) -> &[ExamQuestion] {
        &self.paper
    }

    pub fn answers(&self) -> &[ExamAnswer] {
        &self.answers
    }

    /// Score and record an answer. A second answer to the same question
    /// replaces the first.
    ///
    /// Ids not on the paper score zero and are not recorded.
    pub fn record_answer(&mut self, question_id: &str, answer: Answer) -> ScoreResult {
        let Some(question) = self.paper.iter().find(|q| q.id == question_id) else {
            tracing::warn!(
                question = question_id,
                session = %self.id,
                "answer for a question not on this paper"
            );
            return ScoreResult::zero(0.0);
        };

        let score = score_answer(question, &answer, &self.rules);
        let record = ExamAnswer {
            question_id: question.id.clone(),
            question_type: question.question_type(),
            answer,
            points_earned: score.points_earned,
            points_possible: score.points_possible,
            correct: score.correct,
            domain: question.domain,
        };

        match self.answers.iter_mut().find(|a| a.question_id == question_id) {
            Some(existing) => *existing = record,
            None => self.answers.push(record),
        }
        score
    }

    pub fn is_complete(&self) -> bool {
        self.answers.len() >= self.paper.len()
    }

    pub fn time_limit(&self) -> Duration {
        Duration::minutes(i64::from(self.config.time_limit_minutes))
    }

    /// Time left before the budget runs out, never negative.
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        let left = self.started_at + self.time_limit() - now;
        left.max(Duration::zero())
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.started_at + self.time_limit()
    }

    /// Ids of paper questions that have no recorded answer.
    pub fn unanswered(&self) -> Vec<String> {
        let answered: HashSet<&str> = self
            .answers
            .iter()
            .map(|a| a.question_id.as_str())
            .collect();
        self.paper
            .iter()
            .filter(|q| !answered.contains(q.id.as_str()))
            .map(|q| q.id.clone())
            .collect()
    }

    /// Finalize with whatever answers are recorded.
    pub fn finish(self, completed_at: DateTime<Utc>, pass_threshold: f64) -> ExamReport {
        let results = calculate_exam_results(&self.answers, pass_threshold);
        let unanswered = self.unanswered();
        let time_used_seconds = (completed_at - self.started_at).num_seconds().max(0) as u64;

        ExamReport {
            id: self.id,
            preset: self.config.preset,
            total_questions: self.paper.len() as u32,
            time_limit_minutes: self.config.time_limit_minutes,
            started_at: self.started_at,
            completed_at,
            time_used_seconds,
            results,
            answers: self.answers,
            unanswered,
            summary: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Drill and training sessions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub correct: u32,
    pub total: u32,
}

impl Tally {
    fn add(&mut self, correct: bool) {
        self.total += 1;
        if correct {
            self.correct += 1;
        }
    }
}

/// Running totals for a short-form drill.
#[derive(Debug, Clone)]
pub struct DrillSession {
    pub mode: DrillMode,
    pub started_at: DateTime<Utc>,
    pub total_questions: u32,
    correct: u32,
    wrong: u32,
    missed: Vec<String>,
    domain_breakdown: BTreeMap<Domain, Tally>,
    category_breakdown: BTreeMap<Category, Tally>,
}

/// Finished drill, ready to persist or print.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrillSummary {
    pub mode: DrillMode,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub duration_seconds: u64,
    pub total_questions: u32,
    pub correct_answers: u32,
    pub wrong_answers: u32,
    /// Percentage of the planned questions answered correctly.
    pub score: f64,
    pub missed: Vec<String>,
    pub domain_breakdown: BTreeMap<Domain, Tally>,
    pub category_breakdown: BTreeMap<Category, Tally>,
}

impl DrillSession {
    pub fn new(mode: DrillMode, total_questions: u32, started_at: DateTime<Utc>) -> Self {
        Self {
            mode,
            started_at,
            total_questions,
            correct: 0,
            wrong: 0,
            missed: Vec::new(),
            domain_breakdown: BTreeMap::new(),
            category_breakdown: BTreeMap::new(),
        }
    }

    pub fn record(&mut self, item: &Item, correct: bool) {
        if correct {
            self.correct += 1;
        } else {
            self.wrong += 1;
            self.missed.push(item.id.clone());
        }
        self.domain_breakdown.entry(item.domain).or_default().add(correct);
        self.category_breakdown
            .entry(item.category)
            .or_default()
            .add(correct);
    }

    pub fn answered(&self) -> u32 {
        self.correct + self.wrong
    }

    pub fn finish(self, completed_at: DateTime<Utc>) -> DrillSummary {
        DrillSummary {
            mode: self.mode,
            started_at: self.started_at,
            completed_at,
            duration_seconds: (completed_at - self.started_at).num_seconds().max(0) as u64,
            total_questions: self.total_questions,
            correct_answers: self.correct,
            wrong_answers: self.wrong,
            score: percent(f64::from(self.correct), f64::from(self.total_questions)),
            missed: self.missed,
            domain_breakdown: self.domain_breakdown,
            category_breakdown: self.category_breakdown,
        }
    }
}

/// Training deck policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrainingMode {
    #[default]
    Random,
    Reinforcement,
}

impl fmt::Display for TrainingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrainingMode::Random => write!(f, "random"),
            TrainingMode::Reinforcement => write!(f, "reinforcement"),
        }
    }
}

impl FromStr for TrainingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "random" => Ok(TrainingMode::Random),
            "reinforcement" => Ok(TrainingMode::Reinforcement),
            other => Err(format!("unknown training mode: {other}")),
        }
    }
}

/// Swipe counts for one pass through a training deck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingSession {
    pub mode: TrainingMode,
    pub started_at: DateTime<Utc>,
    pub deck_size: u32,
    pub confident: u32,
    pub practice: u32,
}

impl TrainingSession {
    pub fn new(mode: TrainingMode, deck_size: u32, started_at: DateTime<Utc>) -> Self {
        Self {
            mode,
            started_at,
            deck_size,
            confident: 0,
            practice: 0,
        }
    }

    pub fn record(&mut self, direction: SwipeDirection) {
        match direction {
            SwipeDirection::Right => self.confident += 1,
            SwipeDirection::Left => self.practice += 1,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.confident + self.practice >= self.deck_size
    }
}
