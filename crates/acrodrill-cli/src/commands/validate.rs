//! The `acrodrill validate` command.

use std::path::PathBuf;

use anyhow::Result;

use acrodrill_core::config::load_config_from;
use acrodrill_core::parser::{self, ValidationWarning};

fn print_warnings(warnings: &[ValidationWarning]) {
    for w in warnings {
        let prefix = w
            .item_id
            .as_ref()
            .map(|id| format!("  [{id}]"))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }
}

pub fn execute(
    config_path: Option<PathBuf>,
    catalogue: Option<PathBuf>,
    bank: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let catalogue_path = catalogue.unwrap_or(config.catalogue);
    let bank_path = bank.unwrap_or(config.question_bank);

    let catalogue = parser::load_catalogue(&catalogue_path)?;
    println!("Catalogue: {} ({} items)", catalogue.name, catalogue.len());
    let catalogue_warnings = parser::validate_catalogue(&catalogue);
    print_warnings(&catalogue_warnings);

    let bank = parser::parse_question_bank(&bank_path)?;
    let exam = if bank.meta.exam.is_empty() {
        bank_path.display().to_string()
    } else {
        bank.meta.exam.clone()
    };
    println!("Question bank: {exam} ({} questions)", bank.len());
    let bank_warnings = parser::validate_question_bank(&bank);
    print_warnings(&bank_warnings);

    let total_warnings = catalogue_warnings.len() + bank_warnings.len();
    if total_warnings == 0 {
        println!("All data valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
