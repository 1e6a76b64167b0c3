//! Per-learner progress counters and their update rules.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::mastery::{
    accuracy_rate, estimate_mastery, weakness_score, MasteryTier, NEUTRAL_WEAKNESS,
};

/// Item id to progress record, for one learner.
pub type ProgressMap = HashMap<String, ProgressRecord>;

/// Exam question id to history entry, for one learner.
pub type HistoryMap = HashMap<String, QuestionHistoryEntry>;

/// Training swipe: right means confident, left means needs practice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwipeDirection {
    Left,
    Right,
}

impl FromStr for SwipeDirection {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "left" | "practice" => Ok(SwipeDirection::Left),
            "right" | "confident" => Ok(SwipeDirection::Right),
            other => Err(ModelError::UnknownSwipe(other.to_string())),
        }
    }
}

/// Historical performance on one short-form item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub item_id: String,
    #[serde(default)]
    pub times_seen_in_training: u32,
    #[serde(default)]
    pub times_tested_correct: u32,
    #[serde(default)]
    pub times_tested_wrong: u32,
    #[serde(default)]
    pub confidence_swipes: u32,
    #[serde(default)]
    pub practice_swipes: u32,
    #[serde(default)]
    pub last_seen: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_tested: Option<DateTime<Utc>>,
    #[serde(default)]
    pub accuracy_rate: f64,
    #[serde(default = "neutral_weakness")]
    pub weakness_score: f64,
    #[serde(default)]
    pub mastery: MasteryTier,
    /// Consecutive correct test answers.
    #[serde(default)]
    pub streak: u32,
}

fn neutral_weakness() -> f64 {
    NEUTRAL_WEAKNESS
}

impl ProgressRecord {
    pub fn new(item_id: impl Into<String>) -> Self {
        Self {
            item_id: item_id.into(),
            times_seen_in_training: 0,
            times_tested_correct: 0,
            times_tested_wrong: 0,
            confidence_swipes: 0,
            practice_swipes: 0,
            last_seen: None,
            last_tested: None,
            accuracy_rate: 0.0,
            weakness_score: NEUTRAL_WEAKNESS,
            mastery: MasteryTier::Unseen,
            streak: 0,
        }
    }

    pub fn times_tested(&self) -> u32 {
        self.times_tested_correct + self.times_tested_wrong
    }

    /// Apply a training swipe. Test counters are left untouched.
    pub fn record_swipe(&mut self, direction: SwipeDirection, now: DateTime<Utc>) {
        self.times_seen_in_training += 1;
        match direction {
            SwipeDirection::Right => self.confidence_swipes += 1,
            SwipeDirection::Left => self.practice_swipes += 1,
        }
        self.last_seen = Some(now);
        self.refresh();
    }

    /// Apply a scored test answer.
    pub fn record_test_answer(&mut self, correct: bool, now: DateTime<Utc>) {
        if correct {
            self.times_tested_correct += 1;
            self.streak += 1;
        } else {
            self.times_tested_wrong += 1;
            self.streak = 0;
        }
        self.last_tested = Some(now);
        self.refresh();
    }

    /// Recompute accuracy, weakness and mastery from the counters.
    pub fn refresh(&mut self) {
        let (c, w) = (self.times_tested_correct, self.times_tested_wrong);
        self.accuracy_rate = accuracy_rate(c, w);
        self.weakness_score = weakness_score(c, w);
        self.mastery = estimate_mastery(c, w, self.accuracy_rate, self.streak);
    }
}

/// Mastery of an item, `Unseen` when no record exists.
pub fn mastery_of(progress: &ProgressMap, item_id: &str) -> MasteryTier {
    progress
        .get(item_id)
        .map(|p| p.mastery)
        .unwrap_or(MasteryTier::Unseen)
}

/// Historical performance on one exam question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionHistoryEntry {
    pub question_id: String,
    #[serde(default)]
    pub times_seen: u32,
    #[serde(default)]
    pub times_correct: u32,
    #[serde(default)]
    pub times_wrong: u32,
    #[serde(default)]
    pub last_seen: Option<DateTime<Utc>>,
}

impl QuestionHistoryEntry {
    pub fn new(question_id: impl Into<String>) -> Self {
        Self {
            question_id: question_id.into(),
            times_seen: 0,
            times_correct: 0,
            times_wrong: 0,
            last_seen: None,
        }
    }

    pub fn record(&mut self, correct: bool, now: DateTime<Utc>) {
        self.times_seen += 1;
        if correct {
            self.times_correct += 1;
        } else {
            self.times_wrong += 1;
        }
        self.last_seen = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_record_is_neutral() {
        let p = ProgressRecord::new("AES");
        assert_eq!(p.weakness_score, 0.5);
        assert_eq!(p.accuracy_rate, 0.0);
        assert_eq!(p.mastery, MasteryTier::Unseen);
    }

    #[test]
    fn test_answers_update_derived_fields() {
        let now = Utc::now();
        let mut p = ProgressRecord::new("AES");
        p.record_test_answer(true, now);
        p.record_test_answer(true, now);
        p.record_test_answer(false, now);
        assert_eq!(p.times_tested_correct, 2);
        assert_eq!(p.times_tested_wrong, 1);
        assert_eq!(p.streak, 0);
        assert!((p.accuracy_rate - 2.0 / 3.0).abs() < 1e-9);
        assert!((p.weakness_score - 1.0 / 3.0).abs() < 1e-9);
        assert_eq!(p.mastery, MasteryTier::Practicing);
        assert_eq!(p.last_tested, Some(now));
    }

    #[test]
    fn streak_unlocks_mastered() {
        let now = Utc::now();
        let mut p = ProgressRecord::new("TLS");
        for _ in 0..3 {
            p.record_test_answer(true, now);
        }
        assert_eq!(p.mastery, MasteryTier::Mastered);
        p.record_test_answer(false, now);
        assert_eq!(p.streak, 0);
        assert_eq!(p.mastery, MasteryTier::Practicing);
    }

    #[test]
    fn swipes_leave_test_counters_alone() {
        let now = Utc::now();
        let mut p = ProgressRecord::new("MFA");
        p.record_swipe(SwipeDirection::Right, now);
        p.record_swipe(SwipeDirection::Left, now);
        assert_eq!(p.times_seen_in_training, 2);
        assert_eq!(p.confidence_swipes, 1);
        assert_eq!(p.practice_swipes, 1);
        assert_eq!(p.times_tested(), 0);
        assert_eq!(p.weakness_score, 0.5);
        assert_eq!(p.mastery, MasteryTier::Unseen);
    }

    #[test]
    fn absent_records_use_prior() {
        let map = ProgressMap::new();
        assert_eq!(ProgressRecord::new("nope").weakness_score, 0.5);
        assert_eq!(mastery_of(&map, "nope"), MasteryTier::Unseen);
    }

    #[test]
    fn history_entry_counts() {
        let mut h = QuestionHistoryEntry::new("q1");
        h.record(false, Utc::now());
        h.record(true, Utc::now());
        assert_eq!((h.times_seen, h.times_correct, h.times_wrong), (2, 1, 1));
    }

    #[test]
    fn swipe_direction_parse() {
        assert_eq!("RIGHT".parse::<SwipeDirection>().unwrap(), SwipeDirection::Right);
        assert_eq!("practice".parse::<SwipeDirection>().unwrap(), SwipeDirection::Left);
        assert!("up".parse::<SwipeDirection>().is_err());
    }

    #[test]
    fn partial_json_record_defaults() {
        let p: ProgressRecord = serde_json::from_str(r#"{"item_id": "VPN"}"#).unwrap();
        assert_eq!(p.weakness_score, 0.5);
        assert_eq!(p.mastery, MasteryTier::Unseen);
    }
}
