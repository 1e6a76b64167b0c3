//! Partial-credit scoring for the four exam question shapes.
//!
//! Scoring is pure and total: a malformed or mismatched answer earns nothing
//! rather than failing, so a session can always be finalized.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::model::{Answer, ExamQuestion, QuestionKind};

/// Outcome of scoring one answer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub points_earned: f64,
    pub points_possible: f64,
    /// Fully correct; partial credit alone never sets this.
    pub correct: bool,
}

impl ScoreResult {
    pub fn zero(points_possible: f64) -> Self {
        Self {
            points_earned: 0.0,
            points_possible,
            correct: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// Rule for single-choice questions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceRule {
    #[serde(default = "one_point")]
    pub points: f64,
    #[serde(default)]
    pub partial: bool,
}

/// Rule for multi-choice questions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiChoiceRule {
    #[serde(default = "two_points")]
    pub points: f64,
    #[serde(default = "default_true")]
    pub partial: bool,
    #[serde(default = "one_point")]
    pub points_per_correct: f64,
}

/// Rule for sequence and zone questions. Each unit (position or item) is
/// worth `points / unit_count`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartialRule {
    #[serde(default = "three_points")]
    pub points: f64,
    #[serde(default = "default_true")]
    pub partial: bool,
}

fn one_point() -> f64 {
    1.0
}

fn two_points() -> f64 {
    2.0
}

fn three_points() -> f64 {
    3.0
}

fn default_true() -> bool {
    true
}

impl Default for ChoiceRule {
    fn default() -> Self {
        Self {
            points: 1.0,
            partial: false,
        }
    }
}

impl Default for MultiChoiceRule {
    fn default() -> Self {
        Self {
            points: 2.0,
            partial: true,
            points_per_correct: 1.0,
        }
    }
}

impl Default for PartialRule {
    fn default() -> Self {
        Self {
            points: 3.0,
            partial: true,
        }
    }
}

/// Scoring rules from a question bank's `meta.scoring` block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoringRules {
    #[serde(default)]
    pub mcq: ChoiceRule,
    #[serde(default)]
    pub msq: MultiChoiceRule,
    #[serde(default)]
    pub pbq_order: PartialRule,
    #[serde(default)]
    pub pbq_drag: PartialRule,
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

/// Points a question is worth under `rules`, independent of any answer.
pub fn possible_points(question: &ExamQuestion, rules: &ScoringRules) -> f64 {
    match &question.kind {
        QuestionKind::SingleChoice { .. } => rules.mcq.points,
        QuestionKind::MultiChoice {
            correct_answers, ..
        } => multi_choice_possible(correct_answers, &rules.msq),
        QuestionKind::OrderedSequence { .. } => rules.pbq_order.points,
        QuestionKind::ZoneAssignment { .. } => rules.pbq_drag.points,
    }
}

fn multi_choice_possible(correct: &[String], rule: &MultiChoiceRule) -> f64 {
    let distinct: HashSet<&str> = correct.iter().map(String::as_str).collect();
    (distinct.len() as f64 * rule.points_per_correct).min(rule.points)
}

/// Score `answer` against `question`.
pub fn score_answer(question: &ExamQuestion, answer: &Answer, rules: &ScoringRules) -> ScoreResult {
    match (&question.kind, answer) {
        (QuestionKind::SingleChoice { correct_answer, .. }, Answer::Choice(selected)) => {
            let correct = selected == correct_answer;
            ScoreResult {
                points_earned: if correct { rules.mcq.points } else { 0.0 },
                points_possible: rules.mcq.points,
                correct,
            }
        }
        (
            QuestionKind::MultiChoice {
                correct_answers, ..
            },
            Answer::Selection(selected),
        ) => score_multi_choice(correct_answers, selected, &rules.msq),
        (QuestionKind::OrderedSequence { correct_order, .. }, Answer::Selection(submitted)) => {
            let matches = correct_order
                .iter()
                .zip(submitted)
                .filter(|(want, got)| want == got)
                .count();
            partial_credit(
                matches,
                correct_order.len(),
                matches == correct_order.len(),
                &rules.pbq_order,
            )
        }
        (QuestionKind::ZoneAssignment { correct_mapping, .. }, Answer::Mapping(submitted)) => {
            let matches = correct_mapping
                .iter()
                .filter(|(item, zone)| submitted.get(*item) == Some(*zone))
                .count();
            partial_credit(
                matches,
                correct_mapping.len(),
                matches == correct_mapping.len(),
                &rules.pbq_drag,
            )
        }
        (kind, _) => {
            tracing::warn!(
                question = %question.id,
                kind = %kind.question_type(),
                "answer shape does not match question type, scoring as zero"
            );
            ScoreResult::zero(possible_points(question, rules))
        }
    }
}

fn score_multi_choice(
    correct: &[String],
    selected: &[String],
    rule: &MultiChoiceRule,
) -> ScoreResult {
    let expected: HashSet<&str> = correct.iter().map(String::as_str).collect();
    let chosen: HashSet<&str> = selected.iter().map(String::as_str).collect();
    let possible = multi_choice_possible(correct, rule);
    let hits = chosen.intersection(&expected).count();
    let exact = chosen == expected && !expected.is_empty();

    let earned = if rule.partial {
        (hits as f64 * rule.points_per_correct).min(possible)
    } else if exact {
        possible
    } else {
        0.0
    };

    ScoreResult {
        points_earned: earned,
        points_possible: possible,
        correct: exact,
    }
}

fn partial_credit(matches: usize, units: usize, complete: bool, rule: &PartialRule) -> ScoreResult {
    let complete = complete && units > 0;
    let earned = if complete {
        rule.points
    } else if rule.partial && units > 0 {
        (matches as f64 * rule.points / units as f64).min(rule.points)
    } else {
        0.0
    };
    ScoreResult {
        points_earned: earned,
        points_possible: rule.points,
        correct: complete,
    }
}
