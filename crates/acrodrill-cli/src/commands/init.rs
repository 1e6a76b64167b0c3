//! The `acrodrill init` command.

use std::path::Path;

use anyhow::Result;

fn write_if_missing(path: &str, content: &str) -> Result<()> {
    let path = Path::new(path);
    if path.exists() {
        println!("{} already exists, skipping.", path.display());
        return Ok(());
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    println!("Created {}", path.display());
    Ok(())
}

pub fn execute() -> Result<()> {
    write_if_missing("acrodrill.toml", SAMPLE_CONFIG)?;
    write_if_missing("data/catalogue.toml", SAMPLE_CATALOGUE)?;
    write_if_missing("data/question_bank.json", SAMPLE_BANK)?;

    println!("\nNext steps:");
    println!("  1. Run: acrodrill validate");
    println!("  2. Run: acrodrill train --mode random");
    println!("  3. Run: acrodrill exam --preset quick");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# acrodrill configuration

catalogue = "data/catalogue.toml"
question_bank = "data/question_bank.json"
store_dir = "./acrodrill-data"
output_dir = "./acrodrill-results"
default_user = "local"

# Fix the RNG for reproducible decks and papers.
# seed = 42

training_count = 20
drill_count = 35
hard_mode_count = 35
pass_threshold = 83.3
distractor_count = 3
"#;

const SAMPLE_CATALOGUE: &str = include_str!("../../../../data/catalogue.toml");
const SAMPLE_BANK: &str = include_str!("../../../../data/question_bank.json");
