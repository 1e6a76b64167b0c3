//! acrodrill configuration: data paths, session sizes and the RNG seed.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::session::PASS_THRESHOLD;

/// Top-level acrodrill configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcrodrillConfig {
    /// Short-form item catalogue (TOML).
    #[serde(default = "default_catalogue")]
    pub catalogue: PathBuf,
    /// Exam question bank (JSON).
    #[serde(default = "default_question_bank")]
    pub question_bank: PathBuf,
    /// Root directory of the JSON progress store.
    #[serde(default = "default_store_dir")]
    pub store_dir: PathBuf,
    /// Where exam papers and reports are written.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Learner used when a command gets no `--user`.
    #[serde(default = "default_user")]
    pub default_user: String,
    /// Fixed RNG seed for reproducible sessions. Entropy when unset.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_training_count")]
    pub training_count: usize,
    #[serde(default = "default_drill_count")]
    pub drill_count: usize,
    /// Size of the weakness-weighted pool hard drills are cut from.
    #[serde(default = "default_hard_mode_count")]
    pub hard_mode_count: usize,
    #[serde(default = "default_pass_threshold")]
    pub pass_threshold: f64,
    /// Wrong options per choice question.
    #[serde(default = "default_distractor_count")]
    pub distractor_count: usize,
}

fn default_catalogue() -> PathBuf {
    PathBuf::from("data/catalogue.toml")
}
fn default_question_bank() -> PathBuf {
    PathBuf::from("data/question_bank.json")
}
fn default_store_dir() -> PathBuf {
    PathBuf::from("./acrodrill-data")
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./acrodrill-results")
}
fn default_user() -> String {
    "local".to_string()
}
fn default_training_count() -> usize {
    20
}
fn default_drill_count() -> usize {
    35
}
fn default_hard_mode_count() -> usize {
    35
}
fn default_pass_threshold() -> f64 {
    PASS_THRESHOLD
}
fn default_distractor_count() -> usize {
    3
}

impl Default for AcrodrillConfig {
    fn default() -> Self {
        Self {
            catalogue: default_catalogue(),
            question_bank: default_question_bank(),
            store_dir: default_store_dir(),
            output_dir: default_output_dir(),
            default_user: default_user(),
            seed: None,
            training_count: default_training_count(),
            drill_count: default_drill_count(),
            hard_mode_count: default_hard_mode_count(),
            pass_threshold: default_pass_threshold(),
            distractor_count: default_distractor_count(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

fn resolve_path(path: &Path) -> PathBuf {
    PathBuf::from(resolve_env_vars(&path.to_string_lossy()))
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `acrodrill.toml` in the current directory
/// 2. `~/.config/acrodrill/config.toml`
///
/// Environment variable overrides: `ACRODRILL_SEED`, `ACRODRILL_STORE_DIR`.
pub fn load_config() -> Result<AcrodrillConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<AcrodrillConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("acrodrill.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config");
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<AcrodrillConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => AcrodrillConfig::default(),
    };

    apply_overrides(&mut config, |key| std::env::var(key).ok())?;
    config.resolve_paths();
    Ok(config)
}

fn apply_overrides(
    config: &mut AcrodrillConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<()> {
    if let Some(seed) = lookup("ACRODRILL_SEED") {
        let seed = seed
            .trim()
            .parse::<u64>()
            .with_context(|| format!("ACRODRILL_SEED is not a number: {seed:?}"))?;
        config.seed = Some(seed);
    }
    if let Some(dir) = lookup("ACRODRILL_STORE_DIR") {
        config.store_dir = PathBuf::from(dir);
    }
    Ok(())
}

impl AcrodrillConfig {
    /// Expand `${VAR}` references in every path field.
    pub fn resolve_paths(&mut self) {
        self.catalogue = resolve_path(&self.catalogue);
        self.question_bank = resolve_path(&self.question_bank);
        self.store_dir = resolve_path(&self.store_dir);
        self.output_dir = resolve_path(&self.output_dir);
    }
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("acrodrill"))
}
