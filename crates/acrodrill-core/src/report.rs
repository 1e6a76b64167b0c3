//! Exam report types with JSON persistence and per-domain comparison.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{Domain, ExamPreset};
use crate::session::{ExamAnswer, ExamResults};

/// A finalized exam.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamReport {
    /// Unique report identifier.
    pub id: Uuid,
    pub preset: ExamPreset,
    /// Questions on the paper, answered or not.
    pub total_questions: u32,
    pub time_limit_minutes: u32,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub time_used_seconds: u64,
    pub results: ExamResults,
    pub answers: Vec<ExamAnswer>,
    /// Paper questions left unanswered when the exam was finalized.
    #[serde(default)]
    pub unanswered: Vec<String>,
    /// Study summary text from a coach, if one was requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl ExamReport {
    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        tracing::info!(report = %self.id, path = %path.display(), "exam report saved");
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: ExamReport = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse report JSON: {}", path.display()))?;
        Ok(report)
    }

    /// File name used when saving into an output directory.
    pub fn file_name(&self) -> String {
        format!(
            "exam-{}-{}.json",
            self.completed_at.format("%Y%m%dT%H%M%S"),
            &self.id.simple().to_string()[..8]
        )
    }

    /// Compare this report against a baseline, per domain.
    ///
    /// `threshold` is in percentage points; smaller moves count as unchanged.
    pub fn compare(&self, baseline: &ExamReport, threshold: f64) -> ExamComparison {
        let scored = |report: &ExamReport| -> BTreeMap<Domain, f64> {
            report
                .results
                .domain_breakdown
                .iter()
                .filter(|(_, s)| s.is_scored())
                .map(|(&d, s)| (d, s.percentage))
                .collect()
        };

        let baseline_scores = scored(baseline);
        let current_scores = scored(self);

        let mut regressions = Vec::new();
        let mut improvements = Vec::new();
        let mut unchanged = 0usize;
        let mut new_domains = Vec::new();

        for (&domain, &current) in &current_scores {
            let Some(&before) = baseline_scores.get(&domain) else {
                new_domains.push(domain);
                continue;
            };
            let delta = current - before;
            let entry = DomainDelta {
                domain,
                baseline_percentage: before,
                current_percentage: current,
                delta,
            };
            if delta < -threshold {
                regressions.push(entry);
            } else if delta > threshold {
                improvements.push(entry);
            } else {
                unchanged += 1;
            }
        }

        let removed_domains = baseline_scores
            .keys()
            .filter(|d| !current_scores.contains_key(d))
            .copied()
            .collect();

        ExamComparison {
            baseline_id: baseline.id,
            current_id: self.id,
            overall_delta: self.results.percentage - baseline.results.percentage,
            baseline_passed: baseline.results.passed,
            current_passed: self.results.passed,
            regressions,
            improvements,
            unchanged,
            new_domains,
            removed_domains,
        }
    }
}

/// Load every `.json` report in a directory, skipping files that do not parse.
pub fn load_reports_directory(dir: &Path) -> Result<Vec<ExamReport>> {
    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut reports = Vec::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            match ExamReport::load_json(&path) {
                Ok(report) => reports.push(report),
                Err(e) => tracing::warn!("skipping {}: {e:#}", path.display()),
            }
        }
    }
    reports.sort_by_key(|r| r.completed_at);
    Ok(reports)
}

/// Result of comparing two exam reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamComparison {
    pub baseline_id: Uuid,
    pub current_id: Uuid,
    /// Overall percentage change, in points.
    pub overall_delta: f64,
    pub baseline_passed: bool,
    pub current_passed: bool,
    /// Domains whose percentage dropped by more than the threshold.
    pub regressions: Vec<DomainDelta>,
    /// Domains whose percentage rose by more than the threshold.
    pub improvements: Vec<DomainDelta>,
    pub unchanged: usize,
    /// Domains scored now but not in the baseline.
    pub new_domains: Vec<Domain>,
    /// Domains scored in the baseline but not now.
    pub removed_domains: Vec<Domain>,
}

/// Per-domain percentage change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainDelta {
    pub domain: Domain,
    pub baseline_percentage: f64,
    pub current_percentage: f64,
    pub delta: f64,
}

impl ExamComparison {
    /// Format the comparison as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!(
            "**Summary:** {} regressions, {} improvements, {} unchanged (overall {:+.1} pts)\n\n",
            self.regressions.len(),
            self.improvements.len(),
            self.unchanged,
            self.overall_delta
        ));

        if self.baseline_passed != self.current_passed {
            let verdict = if self.current_passed {
                "now passing"
            } else {
                "no longer passing"
            };
            md.push_str(&format!("**Result:** {verdict}\n\n"));
        }

        for (title, rows) in [
            ("Regressions", &self.regressions),
            ("Improvements", &self.improvements),
        ] {
            if rows.is_empty() {
                continue;
            }
            md.push_str(&format!("### {title}\n\n"));
            md.push_str("| Domain | Baseline | Current | Delta |\n");
            md.push_str("|--------|----------|---------|-------|\n");
            for r in rows {
                md.push_str(&format!(
                    "| {} | {:.1}% | {:.1}% | {:+.1} |\n",
                    r.domain.label(),
                    r.baseline_percentage,
                    r.current_percentage,
                    r.delta
                ));
            }
            md.push('\n');
        }

        md
    }

    /// Returns true if any domain regressed.
    pub fn has_regressions(&self) -> bool {
        !self.regressions.is_empty()
    }
}
