//! Core data model types for acrodrill.
//!
//! Short-form catalogue items, long-form exam questions with their
//! type-specific payloads, learner answers, and the fixed exam presets.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// One of the five top-level exam domains.
///
/// Serialized as its number (1-5) in every data format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Domain {
    GeneralConcepts,
    Threats,
    Architecture,
    Operations,
    ProgramManagement,
}

impl Domain {
    /// All domains in numeric order.
    pub const ALL: [Domain; 5] = [
        Domain::GeneralConcepts,
        Domain::Threats,
        Domain::Architecture,
        Domain::Operations,
        Domain::ProgramManagement,
    ];

    pub fn number(self) -> u8 {
        match self {
            Domain::GeneralConcepts => 1,
            Domain::Threats => 2,
            Domain::Architecture => 3,
            Domain::Operations => 4,
            Domain::ProgramManagement => 5,
        }
    }

    /// Short human-readable label (e.g. "D2 Threats").
    pub fn label(self) -> &'static str {
        match self {
            Domain::GeneralConcepts => "D1 General",
            Domain::Threats => "D2 Threats",
            Domain::Architecture => "D3 Architecture",
            Domain::Operations => "D4 Operations",
            Domain::ProgramManagement => "D5 Program",
        }
    }
}

impl TryFrom<u8> for Domain {
    type Error = ModelError;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        match n {
            1 => Ok(Domain::GeneralConcepts),
            2 => Ok(Domain::Threats),
            3 => Ok(Domain::Architecture),
            4 => Ok(Domain::Operations),
            5 => Ok(Domain::ProgramManagement),
            other => Err(ModelError::InvalidDomain(other)),
        }
    }
}

impl From<Domain> for u8 {
    fn from(d: Domain) -> u8 {
        d.number()
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "D{}", self.number())
    }
}

impl FromStr for Domain {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.trim().trim_start_matches(['d', 'D']);
        let n: u8 = digits
            .parse()
            .map_err(|_| ModelError::InvalidDomain(0))?;
        Domain::try_from(n)
    }
}

/// Difficulty tier of an item or question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl TryFrom<u8> for Difficulty {
    type Error = ModelError;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        match n {
            1 => Ok(Difficulty::Easy),
            2 => Ok(Difficulty::Medium),
            3 => Ok(Difficulty::Hard),
            other => Err(ModelError::InvalidDifficulty(other)),
        }
    }
}

impl From<Difficulty> for u8 {
    fn from(d: Difficulty) -> u8 {
        match d {
            Difficulty::Easy => 1,
            Difficulty::Medium => 2,
            Difficulty::Hard => 3,
        }
    }
}

/// Category tag of a short-form item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Protocol,
    Tool,
    Attack,
    Crypto,
    Access,
    Business,
    Hardware,
    Standard,
    Role,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Category::Protocol => "protocol",
            Category::Tool => "tool",
            Category::Attack => "attack",
            Category::Crypto => "crypto",
            Category::Access => "access",
            Category::Business => "business",
            Category::Hardware => "hardware",
            Category::Standard => "standard",
            Category::Role => "role",
        };
        f.write_str(s)
    }
}

impl FromStr for Category {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let category = match s.trim().to_lowercase().as_str() {
            "protocol" => Category::Protocol,
            "tool" => Category::Tool,
            "attack" => Category::Attack,
            "crypto" => Category::Crypto,
            "access" => Category::Access,
            "business" => Category::Business,
            "hardware" => Category::Hardware,
            "standard" => Category::Standard,
            "role" => Category::Role,
            other => return Err(ModelError::UnknownCategory(other.to_string())),
        };
        Ok(category)
    }
}

/// A short-form learnable item: an abbreviation and its meaning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Unique short code (e.g. "AES").
    pub id: String,
    /// Canonical long-form meaning.
    pub full_name: String,
    /// Pronunciation guide.
    #[serde(default)]
    pub phonetic: String,
    pub domain: Domain,
    pub category: Category,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub mnemonic: String,
    /// A real-world usage example, also used as scenario text.
    #[serde(default)]
    pub example: String,
    #[serde(default)]
    pub exam_tip: String,
    /// Ids of items learners commonly mix this one up with.
    #[serde(default)]
    pub confused_with: Vec<String>,
}

impl Item {
    /// Whether this item explicitly lists `other_id` as confusable.
    pub fn lists_confusable(&self, other_id: &str) -> bool {
        self.confused_with.iter().any(|c| c == other_id)
    }
}

/// A labeled option of a choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceOption {
    pub id: String,
    pub text: String,
}

/// An item to be ordered or dragged in a performance-based question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PbqItem {
    pub id: String,
    pub text: String,
}

/// A drop zone of a zone-assignment question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    pub id: String,
    pub label: String,
}

/// Authoring flags carried by the question bank.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionFlags {
    #[serde(default)]
    pub scenario_based: bool,
    #[serde(default)]
    pub acronym_focus: bool,
    #[serde(default)]
    pub requires_elimination: bool,
}

/// The four exam question shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum QuestionKind {
    #[serde(rename = "mcq")]
    SingleChoice {
        options: Vec<ChoiceOption>,
        correct_answer: String,
    },
    #[serde(rename = "msq")]
    MultiChoice {
        options: Vec<ChoiceOption>,
        correct_answers: Vec<String>,
    },
    #[serde(rename = "pbq_order")]
    OrderedSequence {
        items: Vec<PbqItem>,
        correct_order: Vec<String>,
    },
    #[serde(rename = "pbq_drag")]
    ZoneAssignment {
        zones: Vec<Zone>,
        items: Vec<PbqItem>,
        correct_mapping: BTreeMap<String, String>,
    },
}

impl QuestionKind {
    pub fn question_type(&self) -> QuestionType {
        match self {
            QuestionKind::SingleChoice { .. } => QuestionType::Mcq,
            QuestionKind::MultiChoice { .. } => QuestionType::Msq,
            QuestionKind::OrderedSequence { .. } => QuestionType::PbqOrder,
            QuestionKind::ZoneAssignment { .. } => QuestionType::PbqDrag,
        }
    }

    /// Ordered-sequence and zone-assignment questions are performance-based.
    pub fn is_performance_based(&self) -> bool {
        self.question_type().is_performance_based()
    }
}

/// Tag-only view of [`QuestionKind`], used in answer records and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    Mcq,
    Msq,
    PbqOrder,
    PbqDrag,
}

impl QuestionType {
    pub fn is_performance_based(self) -> bool {
        matches!(self, QuestionType::PbqOrder | QuestionType::PbqDrag)
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionType::Mcq => write!(f, "mcq"),
            QuestionType::Msq => write!(f, "msq"),
            QuestionType::PbqOrder => write!(f, "pbq_order"),
            QuestionType::PbqDrag => write!(f, "pbq_drag"),
        }
    }
}

/// A long-form exam question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamQuestion {
    pub id: String,
    pub domain: Domain,
    #[serde(default)]
    pub subdomain: String,
    #[serde(default)]
    pub topic: String,
    pub difficulty: Difficulty,
    pub stem: String,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub flags: QuestionFlags,
    #[serde(flatten)]
    pub kind: QuestionKind,
}

impl ExamQuestion {
    pub fn question_type(&self) -> QuestionType {
        self.kind.question_type()
    }
}

/// A learner's submitted answer.
///
/// Mirrors the JSON answer contract: a single option id, a list of ids
/// (multi-choice selection or sequence order, interpreted by question type),
/// or an item-to-zone mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    Choice(String),
    Selection(Vec<String>),
    Mapping(BTreeMap<String, String>),
}

/// Exam length presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExamPreset {
    Quick,
    Standard,
    Full,
}

const QUICK_QUOTA: [u32; 5] = [5, 10, 8, 13, 9];
const STANDARD_QUOTA: [u32; 5] = [8, 14, 12, 18, 13];
const FULL_QUOTA: [u32; 5] = [11, 20, 16, 25, 18];

impl ExamPreset {
    pub const ALL: [ExamPreset; 3] = [ExamPreset::Quick, ExamPreset::Standard, ExamPreset::Full];

    /// The fixed question count, time budget and domain quota for this preset.
    pub fn config(self) -> PresetConfig {
        let (total_questions, quota, pbq_count) = match self {
            ExamPreset::Quick => (45, QUICK_QUOTA, 3),
            ExamPreset::Standard => (65, STANDARD_QUOTA, 4),
            ExamPreset::Full => (90, FULL_QUOTA, 5),
        };
        PresetConfig {
            preset: self,
            total_questions,
            time_limit_minutes: total_questions,
            domain_quota: Domain::ALL.into_iter().zip(quota).collect(),
            pbq_count,
        }
    }
}

impl fmt::Display for ExamPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExamPreset::Quick => write!(f, "quick"),
            ExamPreset::Standard => write!(f, "standard"),
            ExamPreset::Full => write!(f, "full"),
        }
    }
}

impl FromStr for ExamPreset {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "quick" => Ok(ExamPreset::Quick),
            "standard" => Ok(ExamPreset::Standard),
            "full" => Ok(ExamPreset::Full),
            other => Err(ModelError::UnknownPreset(other.to_string())),
        }
    }
}

/// Resolved preset table consumed by exam selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetConfig {
    pub preset: ExamPreset,
    pub total_questions: u32,
    pub time_limit_minutes: u32,
    /// Target question count per domain; sums to `total_questions`.
    pub domain_quota: BTreeMap<Domain, u32>,
    /// Performance-based questions drawn before the choice questions.
    pub pbq_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_number_roundtrip() {
        for d in Domain::ALL {
            assert_eq!(Domain::try_from(d.number()).unwrap(), d);
        }
        assert_eq!(Domain::try_from(0), Err(ModelError::InvalidDomain(0)));
        assert_eq!(Domain::try_from(6), Err(ModelError::InvalidDomain(6)));
        assert_eq!("d3".parse::<Domain>().unwrap(), Domain::Architecture);
        assert_eq!("4".parse::<Domain>().unwrap(), Domain::Operations);
        assert!("x".parse::<Domain>().is_err());
    }

    #[test]
    fn preset_quotas_sum_to_totals() {
        for preset in ExamPreset::ALL {
            let cfg = preset.config();
            let sum: u32 = cfg.domain_quota.values().sum();
            assert_eq!(sum, cfg.total_questions, "{preset}");
            assert_eq!(cfg.time_limit_minutes, cfg.total_questions);
        }
        assert_eq!(ExamPreset::Quick.config().pbq_count, 3);
        assert_eq!(ExamPreset::Full.config().domain_quota[&Domain::Operations], 25);
        assert_eq!("Standard".parse::<ExamPreset>().unwrap(), ExamPreset::Standard);
        assert!("marathon".parse::<ExamPreset>().is_err());
    }

    #[test]
    fn question_kind_tagged_json() {
        let json = r#"{
            "id": "q-1",
            "domain": 2,
            "subdomain": "2.1",
            "topic": "Phishing",
            "difficulty": 1,
            "stem": "Which attack...",
            "explanation": "Because...",
            "type": "msq",
            "options": [
                {"id": "a", "text": "A"},
                {"id": "b", "text": "B"},
                {"id": "c", "text": "C"}
            ],
            "correct_answers": ["a", "c"]
        }"#;
        let q: ExamQuestion = serde_json::from_str(json).unwrap();
        assert_eq!(q.domain, Domain::Threats);
        assert_eq!(q.question_type(), QuestionType::Msq);
        assert!(!q.kind.is_performance_based());
        assert!(!q.flags.scenario_based);
    }

    #[test]
    fn answer_shapes_untagged() {
        let a: Answer = serde_json::from_str(r#""b""#).unwrap();
        assert_eq!(a, Answer::Choice("b".into()));
        let a: Answer = serde_json::from_str(r#"["x", "y"]"#).unwrap();
        assert_eq!(a, Answer::Selection(vec!["x".into(), "y".into()]));
        let a: Answer = serde_json::from_str(r#"{"i1": "z1"}"#).unwrap();
        assert!(matches!(a, Answer::Mapping(m) if m["i1"] == "z1"));
    }

    #[test]
    fn category_parses_case_insensitively() {
        assert_eq!("Crypto".parse::<Category>().unwrap(), Category::Crypto);
        assert_eq!(" role ".parse::<Category>().unwrap(), Category::Role);
        assert_eq!(
            "gadget".parse::<Category>(),
            Err(ModelError::UnknownCategory("gadget".into()))
        );
    }

    #[test]
    fn item_rejects_out_of_range_domain() {
        let json = r#"{
            "id": "X", "full_name": "X", "domain": 7, "category": "tool", "difficulty": 1
        }"#;
        assert!(serde_json::from_str::<Item>(json).is_err());
    }
}
