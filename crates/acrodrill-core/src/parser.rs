//! Catalogue (TOML) and question bank (JSON) loading and validation.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{ExamQuestion, Item, QuestionKind};
use crate::repository::{BankMeta, ItemRepository, QuestionBank};

/// Intermediate TOML structure for catalogue files.
#[derive(Debug, Deserialize)]
struct TomlCatalogueFile {
    #[serde(default)]
    catalogue: TomlCatalogueHeader,
    #[serde(default)]
    items: Vec<Item>,
}

#[derive(Debug, Default, Deserialize)]
struct TomlCatalogueHeader {
    #[serde(default)]
    name: Option<String>,
}

/// Intermediate JSON structure for question bank files.
#[derive(Debug, Deserialize)]
struct JsonBankFile {
    #[serde(default)]
    meta: BankMeta,
    questions: Vec<ExamQuestion>,
}

/// Parse a single TOML catalogue file.
pub fn parse_catalogue(path: &Path) -> Result<ItemRepository> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read catalogue file: {}", path.display()))?;

    parse_catalogue_str(&content, path)
}

/// Parse a TOML string into a catalogue (useful for testing).
pub fn parse_catalogue_str(content: &str, source_path: &Path) -> Result<ItemRepository> {
    let parsed: TomlCatalogueFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let name = parsed.catalogue.name.unwrap_or_else(|| {
        source_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    });

    Ok(ItemRepository::new(name, parsed.items))
}

/// Recursively load all `.toml` catalogue files from a directory.
pub fn load_catalogue_directory(dir: &Path) -> Result<Vec<ItemRepository>> {
    let mut catalogues = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut paths: Vec<_> = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<_>>()?;
    paths.sort();

    for path in paths {
        if path.is_dir() {
            catalogues.extend(load_catalogue_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_catalogue(&path) {
                Ok(catalogue) => catalogues.push(catalogue),
                Err(e) => {
                    tracing::warn!("skipping {}: {e:#}", path.display());
                }
            }
        }
    }

    Ok(catalogues)
}

/// Load a catalogue from a file, or merge every catalogue under a directory.
pub fn load_catalogue(path: &Path) -> Result<ItemRepository> {
    if !path.is_dir() {
        return parse_catalogue(path);
    }
    let parts = load_catalogue_directory(path)?;
    if parts.is_empty() {
        anyhow::bail!("no catalogue files found in {}", path.display());
    }
    let name = parts
        .iter()
        .map(|c| c.name.as_str())
        .collect::<Vec<_>>()
        .join("+");
    let items = parts.into_iter().flat_map(|c| c.items().to_vec()).collect();
    Ok(ItemRepository::new(name, items))
}

/// Parse a JSON question bank file.
pub fn parse_question_bank(path: &Path) -> Result<QuestionBank> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read question bank: {}", path.display()))?;

    parse_question_bank_str(&content, path)
}

/// Parse a JSON string into a question bank (useful for testing).
pub fn parse_question_bank_str(content: &str, source_path: &Path) -> Result<QuestionBank> {
    let parsed: JsonBankFile = serde_json::from_str(content)
        .with_context(|| format!("failed to parse question bank JSON: {}", source_path.display()))?;
    Ok(QuestionBank::new(parsed.meta, parsed.questions))
}

/// A warning from catalogue or bank validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The item or question ID (if applicable).
    pub item_id: Option<String>,
    /// Warning message.
    pub message: String,
}

impl ValidationWarning {
    fn on(id: &str, message: impl Into<String>) -> Self {
        Self {
            item_id: Some(id.to_string()),
            message: message.into(),
        }
    }
}

/// Validate a catalogue for common issues.
pub fn validate_catalogue(catalogue: &ItemRepository) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    for id in catalogue.duplicate_ids() {
        warnings.push(ValidationWarning::on(id, format!("duplicate item ID: {id}")));
    }

    for item in catalogue.iter() {
        if item.full_name.trim().is_empty() {
            warnings.push(ValidationWarning::on(&item.id, "full_name is empty"));
        }
        for link in &item.confused_with {
            if link == &item.id {
                warnings.push(ValidationWarning::on(&item.id, "lists itself in confused_with"));
            } else if !catalogue.contains(link) {
                warnings.push(ValidationWarning::on(
                    &item.id,
                    format!("confused_with references unknown item: {link}"),
                ));
            }
        }
    }

    if catalogue.len() < 4 {
        warnings.push(ValidationWarning {
            item_id: None,
            message: format!(
                "catalogue has {} items; choice questions need at least 4",
                catalogue.len()
            ),
        });
    }

    warnings
}

fn validate_question(q: &ExamQuestion, warnings: &mut Vec<ValidationWarning>) {
    if q.stem.trim().is_empty() {
        warnings.push(ValidationWarning::on(&q.id, "stem is empty"));
    }

    match &q.kind {
        QuestionKind::SingleChoice {
            options,
            correct_answer,
        } => {
            if !options.iter().any(|o| &o.id == correct_answer) {
                warnings.push(ValidationWarning::on(
                    &q.id,
                    format!("correct_answer {correct_answer:?} is not an option"),
                ));
            }
        }
        QuestionKind::MultiChoice {
            options,
            correct_answers,
        } => {
            if correct_answers.len() < 2 {
                warnings.push(ValidationWarning::on(
                    &q.id,
                    "multi-choice needs at least 2 correct answers",
                ));
            }
            for id in correct_answers {
                if !options.iter().any(|o| &o.id == id) {
                    warnings.push(ValidationWarning::on(
                        &q.id,
                        format!("correct answer {id:?} is not an option"),
                    ));
                }
            }
        }
        QuestionKind::OrderedSequence {
            items,
            correct_order,
        } => {
            let item_ids: HashSet<&str> = items.iter().map(|i| i.id.as_str()).collect();
            let order_ids: HashSet<&str> = correct_order.iter().map(String::as_str).collect();
            if item_ids != order_ids || correct_order.len() != items.len() {
                warnings.push(ValidationWarning::on(
                    &q.id,
                    "correct_order does not match the item set",
                ));
            }
        }
        QuestionKind::ZoneAssignment {
            zones,
            items,
            correct_mapping,
        } => {
            let zone_ids: HashSet<&str> = zones.iter().map(|z| z.id.as_str()).collect();
            let item_ids: HashSet<&str> = items.iter().map(|i| i.id.as_str()).collect();
            for (item, zone) in correct_mapping {
                if !item_ids.contains(item.as_str()) {
                    warnings.push(ValidationWarning::on(
                        &q.id,
                        format!("mapping references unknown item: {item}"),
                    ));
                }
                if !zone_ids.contains(zone.as_str()) {
                    warnings.push(ValidationWarning::on(
                        &q.id,
                        format!("mapping references unknown zone: {zone}"),
                    ));
                }
            }
            for item in &item_ids {
                if !correct_mapping.contains_key(*item) {
                    warnings.push(ValidationWarning::on(&q.id, format!("item {item} has no zone")));
                }
            }
        }
    }
}

/// Validate a question bank for common issues.
pub fn validate_question_bank(bank: &QuestionBank) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    for id in bank.duplicate_ids() {
        warnings.push(ValidationWarning::on(id, format!("duplicate question ID: {id}")));
    }
    for q in bank.questions() {
        validate_question(q, &mut warnings);
    }

    let meta = &bank.meta;
    if meta.total_questions != 0 && meta.total_questions as usize != bank.len() {
        warnings.push(ValidationWarning {
            item_id: None,
            message: format!(
                "meta.total_questions is {} but the bank has {}",
                meta.total_questions,
                bank.len()
            ),
        });
    }
    if !meta.domain_counts.is_empty() {
        let actual = bank.domain_counts();
        for (domain, &declared) in &meta.domain_counts {
            let found = actual.get(domain).copied().unwrap_or(0);
            if found != declared {
                warnings.push(ValidationWarning {
                    item_id: None,
                    message: format!(
                        "meta.domain_counts[{domain}] is {declared} but the bank has {found}"
                    ),
                });
            }
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Domain, QuestionType};
    use std::path::PathBuf;

    const VALID_TOML: &str = r#"
[catalogue]
name = "Security basics"

[[items]]
id = "AES"
full_name = "Advanced Encryption Standard"
phonetic = "ay-ee-ess"
domain = 1
category = "crypto"
difficulty = 1
mnemonic = "Always Encrypt Secrets"
example = "Full-disk encryption uses AES-256."
exam_tip = "Symmetric block cipher."
confused_with = ["DES"]

[[items]]
id = "DES"
full_name = "Data Encryption Standard"
domain = 1
category = "crypto"
difficulty = 2
confused_with = ["AES"]
"#;

    const VALID_BANK: &str = r#"{
  "meta": {
    "version": "1.0",
    "exam": "SY0-701",
    "total_questions": 2,
    "domain_counts": {"2": 1, "4": 1},
    "scoring": {"mcq": {"points": 1, "partial": false}}
  },
  "questions": [
    {
      "id": "q1", "type": "mcq", "domain": 2, "subdomain": "2.2", "topic": "Phishing",
      "difficulty": 1, "stem": "Which is phishing?", "explanation": "Email lure.",
      "options": [{"id": "a", "text": "Email lure"}, {"id": "b", "text": "Port scan"}],
      "correct_answer": "a",
      "flags": {"scenario_based": true, "acronym_focus": false, "requires_elimination": false}
    },
    {
      "id": "q2", "type": "pbq_drag", "domain": 4, "subdomain": "4.1", "topic": "Controls",
      "difficulty": 2, "stem": "Map controls.", "explanation": "Types.",
      "zones": [{"id": "z1", "label": "Preventive"}, {"id": "z2", "label": "Detective"}],
      "items": [{"id": "i1", "text": "Firewall"}, {"id": "i2", "text": "IDS"}],
      "correct_mapping": {"i1": "z1", "i2": "z2"}
    }
  ]
}"#;

    #[test]
    fn parse_valid_toml() {
        let cat = parse_catalogue_str(VALID_TOML, &PathBuf::from("test.toml")).unwrap();
        assert_eq!(cat.name, "Security basics");
        assert_eq!(cat.len(), 2);
        let aes = cat.get("AES").unwrap();
        assert_eq!(aes.domain, Domain::GeneralConcepts);
        assert_eq!(aes.confused_with, vec!["DES"]);
        assert!(cat.get("DES").unwrap().mnemonic.is_empty());
    }

    #[test]
    fn catalogue_name_defaults_to_file_stem() {
        let toml = r#"
[[items]]
id = "X"
full_name = "Ex"
domain = 3
category = "tool"
difficulty = 3
"#;
        let cat = parse_catalogue_str(toml, &PathBuf::from("extra/tools.toml")).unwrap();
        assert_eq!(cat.name, "tools");
    }

    #[test]
    fn parse_rejects_bad_domain() {
        let toml = r#"
[[items]]
id = "X"
full_name = "Ex"
domain = 9
category = "tool"
difficulty = 1
"#;
        assert!(parse_catalogue_str(toml, &PathBuf::from("bad.toml")).is_err());
    }

    #[test]
    fn parse_malformed_toml() {
        let bad = "this is not [valid toml }{";
        assert!(parse_catalogue_str(bad, &PathBuf::from("bad.toml")).is_err());
    }

    #[test]
    fn validate_catalogue_links() {
        let toml = r#"
[[items]]
id = "A"
full_name = "Alpha"
domain = 1
category = "tool"
difficulty = 1
confused_with = ["A", "ZZZ"]

[[items]]
id = "A"
full_name = " "
domain = 1
category = "tool"
difficulty = 1
"#;
        let cat = parse_catalogue_str(toml, &PathBuf::from("t.toml")).unwrap();
        assert_eq!(cat.len(), 2);
        assert_eq!(cat.get("A").unwrap().full_name, "Alpha");
        let warnings = validate_catalogue(&cat);
        let messages: Vec<&str> = warnings.iter().map(|w| w.message.as_str()).collect();
        assert!(messages.iter().any(|m| m.contains("duplicate")));
        assert!(messages.iter().any(|m| m.contains("itself")));
        assert!(messages.iter().any(|m| m.contains("unknown item: ZZZ")));
        assert!(messages.iter().any(|m| m.contains("full_name is empty")));
    }

    #[test]
    fn parse_valid_bank() {
        let bank = parse_question_bank_str(VALID_BANK, &PathBuf::from("bank.json")).unwrap();
        assert_eq!(bank.len(), 2);
        assert_eq!(bank.meta.exam, "SY0-701");
        assert_eq!(bank.meta.domain_counts[&Domain::Threats], 1);
        assert_eq!(bank.get("q2").unwrap().question_type(), QuestionType::PbqDrag);
        assert!(bank.get("q1").unwrap().flags.scenario_based);
        assert_eq!(bank.scoring().pbq_drag.points, 3.0);
        assert!(validate_question_bank(&bank).is_empty());
    }

    #[test]
    fn validate_bank_problems() {
        let json = r#"{
  "meta": {"total_questions": 5},
  "questions": [
    {"id": "m", "type": "msq", "domain": 1, "difficulty": 1, "stem": "?",
     "options": [{"id": "a", "text": "A"}], "correct_answers": ["a", "x"]},
    {"id": "o", "type": "pbq_order", "domain": 1, "difficulty": 2, "stem": "?",
     "items": [{"id": "x", "text": "X"}, {"id": "y", "text": "Y"}], "correct_order": ["x"]},
    {"id": "c", "type": "mcq", "domain": 1, "difficulty": 2, "stem": "?",
     "options": [{"id": "a", "text": "A"}], "correct_answer": "b"},
    {"id": "o", "type": "mcq", "domain": 1, "difficulty": 2, "stem": "?",
     "options": [{"id": "a", "text": "A"}], "correct_answer": "a"}
  ]
}"#;
        let bank = parse_question_bank_str(json, &PathBuf::from("bank.json")).unwrap();
        assert_eq!(bank.len(), 3);
        let warnings = validate_question_bank(&bank);
        let messages: Vec<&str> = warnings.iter().map(|w| w.message.as_str()).collect();
        assert!(messages.iter().any(|m| m.contains("\"x\" is not an option")));
        assert!(messages.iter().any(|m| m.contains("correct_order")));
        assert!(messages.iter().any(|m| m.contains("duplicate question ID: o")));
        assert!(messages.iter().any(|m| m.contains("\"b\" is not an option")));
        assert!(messages.iter().any(|m| m.contains("total_questions")));
    }

    #[test]
    fn load_directory_merges() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.toml"), VALID_TOML).unwrap();
        std::fs::create_dir(dir.path().join("more")).unwrap();
        std::fs::write(
            dir.path().join("more").join("b.toml"),
            r#"
[[items]]
id = "XSS"
full_name = "Cross-Site Scripting"
domain = 2
category = "attack"
difficulty = 1
"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("broken.toml"), "nope = [").unwrap();

        let parts = load_catalogue_directory(dir.path()).unwrap();
        assert_eq!(parts.len(), 2);

        let merged = load_catalogue(dir.path()).unwrap();
        assert_eq!(merged.len(), 3);
        assert!(merged.get("XSS").is_some());
    }
}
