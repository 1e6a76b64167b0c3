//! Short-form drill questions: six formats built around one catalogue item.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::distractors::{generate_distractors, SimilarityMode};
use crate::model::{Difficulty, Domain, Item};

/// How a drill question presents its item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionFormat {
    /// Acronym shown, pick the meaning.
    FullNameChoice,
    /// Meaning shown, pick the acronym.
    AcronymChoice,
    /// Judge an "ACRONYM = meaning" statement.
    TrueFalse,
    /// Match four acronyms to their meanings.
    MatchPairs,
    /// Type the acronym for a meaning.
    FillBlank,
    /// Pick the acronym that fits a usage example.
    Scenario,
}

use QuestionFormat::*;

const NORMAL_MIX: [QuestionFormat; 12] = [
    FullNameChoice,
    FullNameChoice,
    FullNameChoice,
    AcronymChoice,
    AcronymChoice,
    AcronymChoice,
    TrueFalse,
    TrueFalse,
    MatchPairs,
    MatchPairs,
    FillBlank,
    Scenario,
];

const HARD_MIX: [QuestionFormat; 12] = [
    FullNameChoice,
    AcronymChoice,
    TrueFalse,
    MatchPairs,
    MatchPairs,
    MatchPairs,
    FillBlank,
    FillBlank,
    FillBlank,
    Scenario,
    Scenario,
    Scenario,
];

/// Drill flavour. Hard drills favour matching, typing and scenarios.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrillMode {
    #[default]
    Normal,
    Hard,
}

impl DrillMode {
    pub fn format_mix(self) -> &'static [QuestionFormat] {
        match self {
            DrillMode::Normal => &NORMAL_MIX,
            DrillMode::Hard => &HARD_MIX,
        }
    }
}

impl fmt::Display for DrillMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrillMode::Normal => write!(f, "normal"),
            DrillMode::Hard => write!(f, "hard"),
        }
    }
}

impl FromStr for DrillMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "normal" => Ok(DrillMode::Normal),
            "hard" => Ok(DrillMode::Hard),
            other => Err(format!("unknown drill mode: {other}")),
        }
    }
}

/// Draw a format from the mode's weighted mix.
pub fn pick_format<R: Rng + ?Sized>(mode: DrillMode, rng: &mut R) -> QuestionFormat {
    mode.format_mix()
        .choose(rng)
        .copied()
        .unwrap_or(FullNameChoice)
}

/// Downgrade formats the item cannot support.
///
/// Typing is only asked for difficulty-1 items and scenarios need a usage
/// example; both fall back to a meaning choice.
pub fn effective_format(format: QuestionFormat, item: &Item) -> QuestionFormat {
    match format {
        FillBlank if item.difficulty != Difficulty::Easy => FullNameChoice,
        Scenario if item.example.trim().is_empty() => FullNameChoice,
        other => other,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchPair {
    pub left: String,
    pub right: String,
}

/// A generated drill question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrillQuestion {
    pub item_id: String,
    pub domain: Domain,
    pub format: QuestionFormat,
    pub prompt: String,
    /// Choices in display order; for match pairs, the shuffled right column.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pairs: Vec<MatchPair>,
    pub correct_answer: String,
}

/// A learner's reply to a drill question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DrillResponse {
    Text(String),
    Pairs(BTreeMap<String, String>),
}

impl DrillQuestion {
    /// Whether `response` answers this question correctly.
    pub fn check(&self, response: &DrillResponse) -> bool {
        match (self.format, response) {
            (MatchPairs, DrillResponse::Pairs(submitted)) => {
                submitted.len() == self.pairs.len()
                    && self
                        .pairs
                        .iter()
                        .all(|p| submitted.get(&p.left) == Some(&p.right))
            }
            (MatchPairs, DrillResponse::Text(_)) => false,
            (FillBlank, DrillResponse::Text(text)) => {
                text.trim().eq_ignore_ascii_case(self.correct_answer.trim())
            }
            (_, DrillResponse::Text(text)) => text.trim() == self.correct_answer,
            (_, DrillResponse::Pairs(_)) => false,
        }
    }
}

fn shuffled_options<R: Rng + ?Sized>(
    correct: String,
    others: impl IntoIterator<Item = String>,
    rng: &mut R,
) -> Vec<String> {
    let mut options: Vec<String> = std::iter::once(correct).chain(others).collect();
    options.shuffle(rng);
    options
}

/// Build a question of `format` for `item`, drawing wrong options from `catalogue`.
pub fn generate_question<R: Rng + ?Sized>(
    item: &Item,
    catalogue: &[Item],
    format: QuestionFormat,
    distractor_count: usize,
    rng: &mut R,
) -> DrillQuestion {
    let mut question = DrillQuestion {
        item_id: item.id.clone(),
        domain: item.domain,
        format,
        prompt: String::new(),
        options: Vec::new(),
        pairs: Vec::new(),
        correct_answer: String::new(),
    };

    match format {
        FullNameChoice => {
            let wrong = generate_distractors(
                item,
                catalogue,
                distractor_count,
                SimilarityMode::FullName,
                rng,
            );
            question.prompt = format!("What does {} stand for?", item.id);
            question.correct_answer = item.full_name.clone();
            question.options = shuffled_options(
                item.full_name.clone(),
                wrong.into_iter().map(|w| w.full_name.clone()),
                rng,
            );
        }
        AcronymChoice | Scenario => {
            let wrong = generate_distractors(
                item,
                catalogue,
                distractor_count,
                SimilarityMode::Acronym,
                rng,
            );
            question.prompt = if format == Scenario {
                format!("{}\n\nWhich acronym fits this scenario?", item.example.trim())
            } else {
                format!("Which acronym stands for \"{}\"?", item.full_name)
            };
            question.correct_answer = item.id.clone();
            question.options = shuffled_options(
                item.id.clone(),
                wrong.into_iter().map(|w| w.id.clone()),
                rng,
            );
        }
        TrueFalse => {
            let decoy = if rng.gen_bool(0.5) {
                generate_distractors(item, catalogue, 1, SimilarityMode::FullName, rng)
                    .into_iter()
                    .next()
            } else {
                None
            };
            match decoy {
                Some(wrong) => {
                    question.prompt = format!("{} = {}", item.id, wrong.full_name);
                    question.correct_answer = "false".into();
                }
                None => {
                    question.prompt = format!("{} = {}", item.id, item.full_name);
                    question.correct_answer = "true".into();
                }
            }
            question.options = vec!["true".into(), "false".into()];
        }
        MatchPairs => {
            let others = generate_distractors(item, catalogue, 3, SimilarityMode::Acronym, rng);
            let mut pairs: Vec<MatchPair> = std::iter::once(item)
                .chain(others)
                .map(|i| MatchPair {
                    left: i.id.clone(),
                    right: i.full_name.clone(),
                })
                .collect();
            pairs.shuffle(rng);
            let mut right: Vec<String> = pairs.iter().map(|p| p.right.clone()).collect();
            right.shuffle(rng);
            question.prompt = "Match each acronym to its meaning.".into();
            question.correct_answer = item.full_name.clone();
            question.options = right;
            question.pairs = pairs;
        }
        FillBlank => {
            question.prompt = format!("___ = {}", item.full_name);
            question.correct_answer = item.id.clone();
        }
    }

    question
}

/// Turn a selected item list into drill questions, one format draw per item.
pub fn build_drill<R: Rng + ?Sized>(
    items: &[&Item],
    catalogue: &[Item],
    mode: DrillMode,
    distractor_count: usize,
    rng: &mut R,
) -> Vec<DrillQuestion> {
    items
        .iter()
        .map(|item| {
            let format = effective_format(pick_format(mode, rng), item);
            generate_question(item, catalogue, format, distractor_count, rng)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Category;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn item(id: &str, name: &str, difficulty: Difficulty) -> Item {
        Item {
            id: id.into(),
            full_name: name.into(),
            phonetic: String::new(),
            domain: Domain::Architecture,
            category: Category::Protocol,
            difficulty,
            mnemonic: String::new(),
            example: format!("A team deploys {id} at the edge."),
            exam_tip: String::new(),
            confused_with: vec![],
        }
    }

    fn catalogue() -> Vec<Item> {
        vec![
            item("TLS", "Transport Layer Security", Difficulty::Easy),
            item("SSH", "Secure Shell", Difficulty::Easy),
            item("VPN", "Virtual Private Network", Difficulty::Easy),
            item("IPSec", "Internet Protocol Security", Difficulty::Medium),
            item("SFTP", "SSH File Transfer Protocol", Difficulty::Medium),
            item(
                "DNSSEC",
                "Domain Name System Security Extensions",
                Difficulty::Hard,
            ),
        ]
    }

    #[test]
    fn choice_questions_contain_answer_once() {
        let cat = catalogue();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for format in [FullNameChoice, AcronymChoice, Scenario] {
            let q = generate_question(&cat[0], &cat, format, 3, &mut rng);
            assert_eq!(q.options.len(), 4);
            assert_eq!(q.options.iter().filter(|o| **o == q.correct_answer).count(), 1);
            assert!(q.check(&DrillResponse::Text(q.correct_answer.clone())));
            assert!(!q.check(&DrillResponse::Text("nope".into())));
        }
    }

    #[test]
    fn true_false_is_consistent() {
        let cat = catalogue();
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        for _ in 0..20 {
            let q = generate_question(&cat[1], &cat, TrueFalse, 3, &mut rng);
            let stated_true = q.prompt == "SSH = Secure Shell";
            assert_eq!(q.correct_answer == "true", stated_true);
        }
    }

    #[test]
    fn match_pairs_check() {
        let cat = catalogue();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let q = generate_question(&cat[2], &cat, MatchPairs, 3, &mut rng);
        assert_eq!(q.pairs.len(), 4);
        let answer: BTreeMap<String, String> =
            q.pairs.iter().map(|p| (p.left.clone(), p.right.clone())).collect();
        assert!(q.check(&DrillResponse::Pairs(answer.clone())));
        let mut wrong = answer;
        let first = q.pairs[0].left.clone();
        wrong.insert(first, "Something else".into());
        assert!(!q.check(&DrillResponse::Pairs(wrong)));
    }

    #[test]
    fn fill_blank_case_insensitive() {
        let cat = catalogue();
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let q = generate_question(&cat[0], &cat, FillBlank, 3, &mut rng);
        assert!(q.options.is_empty());
        assert!(q.check(&DrillResponse::Text(" tls ".into())));
    }

    #[test]
    fn fill_blank_only_for_easy_items() {
        let cat = catalogue();
        assert_eq!(effective_format(FillBlank, &cat[0]), FillBlank);
        assert_eq!(effective_format(FillBlank, &cat[3]), FullNameChoice);
        let mut no_example = cat[0].clone();
        no_example.example.clear();
        assert_eq!(effective_format(Scenario, &no_example), FullNameChoice);
    }

    #[test]
    fn build_drill_one_question_per_item() {
        let cat = catalogue();
        let picked: Vec<&Item> = cat.iter().collect();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let drill = build_drill(&picked, &cat, DrillMode::Hard, 3, &mut rng);
        assert_eq!(drill.len(), cat.len());
        for (q, item) in drill.iter().zip(&cat) {
            assert_eq!(q.item_id, item.id);
            if item.difficulty != Difficulty::Easy {
                assert_ne!(q.format, FillBlank);
            }
        }
    }

    #[test]
    fn mixes_have_twelve_slots() {
        assert_eq!(DrillMode::Normal.format_mix().len(), 12);
        let hard = DrillMode::Hard.format_mix();
        assert_eq!(hard.iter().filter(|f| **f == Scenario).count(), 3);
    }
}
