//! Mastery tiers and weakness scores derived from test counters.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Weakness assumed for an item with no test history.
pub const NEUTRAL_WEAKNESS: f64 = 0.5;

/// Discrete learner-proficiency label.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum MasteryTier {
    #[default]
    Unseen,
    Learning,
    Practicing,
    Confident,
    Mastered,
}

impl MasteryTier {
    /// Confident and mastered items count as "strong" in overviews.
    pub fn is_strong(self) -> bool {
        matches!(self, MasteryTier::Confident | MasteryTier::Mastered)
    }
}

impl fmt::Display for MasteryTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MasteryTier::Unseen => "unseen",
            MasteryTier::Learning => "learning",
            MasteryTier::Practicing => "practicing",
            MasteryTier::Confident => "confident",
            MasteryTier::Mastered => "mastered",
        };
        f.write_str(s)
    }
}

/// Fraction of answers that were wrong, or [`NEUTRAL_WEAKNESS`] with no answers.
pub fn weakness_score(correct: u32, wrong: u32) -> f64 {
    let total = correct + wrong;
    if total == 0 {
        return NEUTRAL_WEAKNESS;
    }
    wrong as f64 / total as f64
}

/// Fraction of answers that were correct, or 0 with no answers.
pub fn accuracy_rate(correct: u32, wrong: u32) -> f64 {
    let total = correct + wrong;
    if total == 0 {
        return 0.0;
    }
    correct as f64 / total as f64
}

/// Map test counters to a mastery tier.
///
/// Rules are evaluated in order and the first match wins; the streak only
/// gates `Mastered`, never `Confident`.
pub fn estimate_mastery(correct: u32, wrong: u32, accuracy: f64, streak: u32) -> MasteryTier {
    if correct + wrong == 0 {
        return MasteryTier::Unseen;
    }
    if accuracy < 0.5 {
        return MasteryTier::Learning;
    }
    if accuracy < 0.8 {
        return MasteryTier::Practicing;
    }
    if accuracy >= 0.95 && streak >= 3 {
        return MasteryTier::Mastered;
    }
    MasteryTier::Confident
}
