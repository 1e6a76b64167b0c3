//! The `acrodrill exam` command.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use comfy_table::{Cell, Table};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use acrodrill_core::model::{Domain, ExamPreset, ExamQuestion};
use acrodrill_core::session::ExamSession;

use super::AppContext;

/// A selected exam paper, saved so it can be answered offline and graded later.
#[derive(Debug, Serialize, Deserialize)]
pub struct ExamPaper {
    pub id: Uuid,
    pub preset: ExamPreset,
    pub user: String,
    pub started_at: DateTime<Utc>,
    pub questions: Vec<ExamQuestion>,
}

impl ExamPaper {
    pub fn from_session(session: &ExamSession, user: &str) -> Self {
        Self {
            id: session.id,
            preset: session.config.preset,
            user: user.to_string(),
            started_at: session.started_at,
            questions: session.questions().to_vec(),
        }
    }

    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write paper to {}", path.display()))
    }

    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read paper from {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse paper JSON: {}", path.display()))
    }
}

pub async fn execute(
    config_path: Option<PathBuf>,
    preset: String,
    user: Option<String>,
    output: PathBuf,
) -> Result<()> {
    let preset: ExamPreset = preset.parse()?;
    let mut ctx = AppContext::open(config_path, user)?;

    let session = ctx
        .engine
        .start_exam(&ctx.user, preset, &mut ctx.rng, Utc::now())
        .await?;
    let config = &session.config;

    let mut selected: BTreeMap<Domain, (u32, u32)> = BTreeMap::new();
    for q in session.questions() {
        let entry = selected.entry(q.domain).or_default();
        entry.0 += 1;
        if q.kind.is_performance_based() {
            entry.1 += 1;
        }
    }

    let mut table = Table::new();
    table.set_header(vec!["Domain", "Quota", "Selected", "PBQ"]);
    for (domain, quota) in &config.domain_quota {
        let (count, pbq) = selected.get(domain).copied().unwrap_or_default();
        table.add_row(vec![
            Cell::new(domain.label()),
            Cell::new(quota),
            Cell::new(count),
            Cell::new(pbq),
        ]);
    }

    println!(
        "Exam paper ({preset}): {} of {} questions, {} minutes",
        session.questions().len(),
        config.total_questions,
        config.time_limit_minutes
    );
    println!("{table}");

    if (session.questions().len() as u32) < config.total_questions {
        eprintln!("Warning: the question bank is too small to fill every domain quota.");
    }

    ExamPaper::from_session(&session, &ctx.user).save_json(&output)?;
    println!("Paper saved to: {}", output.display());
    println!(
        "Answer it, then run: acrodrill grade --paper {} --answers <answers.json>",
        output.display()
    );

    Ok(())
}
