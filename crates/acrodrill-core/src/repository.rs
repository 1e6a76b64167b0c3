//! Read-only, indexed catalogues: short-form items and the exam question bank.
//!
//! Both are loaded once and shared behind an `Arc` by the caller.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::model::{Domain, ExamQuestion, Item};
use crate::scoring::ScoringRules;

/// Short-form item catalogue, indexed by item id.
#[derive(Debug, Clone, Default)]
pub struct ItemRepository {
    pub name: String,
    items: Vec<Item>,
    index: HashMap<String, usize>,
    dropped: Vec<String>,
}

/// Keep the first entry per id. Returns the kept entries, their index and
/// the ids of the dropped later entries.
fn dedup_by_id<T>(
    entries: Vec<T>,
    id_of: impl Fn(&T) -> &str,
) -> (Vec<T>, HashMap<String, usize>, Vec<String>) {
    let mut kept = Vec::with_capacity(entries.len());
    let mut index = HashMap::with_capacity(entries.len());
    let mut dropped = Vec::new();
    for entry in entries {
        let id = id_of(&entry).to_string();
        if index.contains_key(&id) {
            tracing::warn!(id = %id, "duplicate id, keeping the first entry");
            dropped.push(id);
            continue;
        }
        index.insert(id, kept.len());
        kept.push(entry);
    }
    (kept, index, dropped)
}

impl ItemRepository {
    /// Build the repository. Later entries with an already-seen id are dropped.
    pub fn new(name: impl Into<String>, items: Vec<Item>) -> Self {
        let (items, index, dropped) = dedup_by_id(items, |item| item.id.as_str());
        Self {
            name: name.into(),
            items,
            index,
            dropped,
        }
    }

    /// Ids of entries dropped as duplicates at load time.
    pub fn duplicate_ids(&self) -> &[String] {
        &self.dropped
    }

    pub fn get(&self, id: &str) -> Option<&Item> {
        self.index.get(id).map(|&i| &self.items[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Item> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// The `meta` block of a question bank document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BankMeta {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub exam: String,
    #[serde(default)]
    pub generated_at: String,
    #[serde(default)]
    pub generator: String,
    #[serde(default)]
    pub total_questions: u32,
    /// Declared question count per domain, checked by validation.
    #[serde(default)]
    pub domain_counts: BTreeMap<Domain, u32>,
    #[serde(default)]
    pub scoring: ScoringRules,
}

/// Exam question bank, indexed by question id.
#[derive(Debug, Clone, Default)]
pub struct QuestionBank {
    pub meta: BankMeta,
    questions: Vec<ExamQuestion>,
    index: HashMap<String, usize>,
    dropped: Vec<String>,
}

impl QuestionBank {
    /// Build the bank. Later questions with an already-seen id are dropped.
    pub fn new(meta: BankMeta, questions: Vec<ExamQuestion>) -> Self {
        let (questions, index, dropped) = dedup_by_id(questions, |q| q.id.as_str());
        Self {
            meta,
            questions,
            index,
            dropped,
        }
    }

    /// Ids of questions dropped as duplicates at load time.
    pub fn duplicate_ids(&self) -> &[String] {
        &self.dropped
    }

    pub fn get(&self, id: &str) -> Option<&ExamQuestion> {
        self.index.get(id).map(|&i| &self.questions[i])
    }

    pub fn questions(&self) -> &[ExamQuestion] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn scoring(&self) -> &ScoringRules {
        &self.meta.scoring
    }

    /// Actual question count per domain.
    pub fn domain_counts(&self) -> BTreeMap<Domain, u32> {
        let mut counts = BTreeMap::new();
        for q in &self.questions {
            *counts.entry(q.domain).or_insert(0) += 1;
        }
        counts
    }
}
