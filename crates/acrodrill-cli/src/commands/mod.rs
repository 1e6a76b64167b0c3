pub mod compare;
pub mod drill;
pub mod exam;
pub mod grade;
pub mod init;
pub mod stats;
pub mod train;
pub mod validate;

use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use acrodrill_core::config::{load_config_from, AcrodrillConfig};
use acrodrill_core::engine::StudyEngine;
use acrodrill_core::parser;
use acrodrill_core::store::JsonFileStore;

/// Everything a study command needs: config, loaded data, store and RNG.
pub struct AppContext {
    pub engine: StudyEngine,
    pub rng: ChaCha8Rng,
    pub user: String,
}

impl AppContext {
    pub fn open(config_path: Option<PathBuf>, user: Option<String>) -> Result<Self> {
        let config = load_config_from(config_path.as_deref())?;
        Self::from_config(config, user)
    }

    pub fn from_config(config: AcrodrillConfig, user: Option<String>) -> Result<Self> {
        let catalogue = parser::load_catalogue(&config.catalogue)
            .with_context(|| format!("failed to load catalogue {}", config.catalogue.display()))?;
        let bank = parser::parse_question_bank(&config.question_bank)?;
        let store = JsonFileStore::new(&config.store_dir);

        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let user = user.unwrap_or_else(|| config.default_user.clone());

        tracing::debug!(
            items = catalogue.len(),
            questions = bank.len(),
            store = %store.root().display(),
            "data loaded"
        );

        Ok(Self {
            engine: StudyEngine::new(
                Arc::new(catalogue),
                Arc::new(bank),
                Arc::new(store),
                config,
            ),
            rng,
            user,
        })
    }
}

/// Read the next non-empty line from stdin. `None` on end of input.
pub fn read_answer(
    lines: &mut impl Iterator<Item = std::io::Result<String>>,
) -> Result<Option<String>> {
    for line in lines {
        let line = line.context("failed to read stdin")?;
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            return Ok(Some(trimmed.to_string()));
        }
    }
    Ok(None)
}

pub fn stdin_lines() -> impl Iterator<Item = std::io::Result<String>> {
    std::io::stdin().lock().lines()
}
