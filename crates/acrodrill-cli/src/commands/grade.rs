//! The `acrodrill grade` command.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use comfy_table::{Cell, Table};

use acrodrill_core::coach::OfflineCoach;
use acrodrill_core::model::Answer;
use acrodrill_core::report::ExamReport;
use acrodrill_core::session::ExamSession;
use acrodrill_core::traits::StudyCoach;

use super::exam::ExamPaper;
use super::AppContext;

pub async fn execute(
    config_path: Option<PathBuf>,
    paper_path: PathBuf,
    answers_path: PathBuf,
    user: Option<String>,
    summary: bool,
    output: Option<PathBuf>,
) -> Result<()> {
    let paper = ExamPaper::load_json(&paper_path)?;
    let content = std::fs::read_to_string(&answers_path)
        .with_context(|| format!("failed to read answers from {}", answers_path.display()))?;
    let answers: BTreeMap<String, Answer> = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse answers JSON: {}", answers_path.display()))?;

    let user = user.unwrap_or_else(|| paper.user.clone());
    let ctx = AppContext::open(config_path, Some(user))?;

    let retired = paper
        .questions
        .iter()
        .filter(|q| ctx.engine.bank().get(&q.id).is_none())
        .count();
    if retired > 0 {
        eprintln!("Warning: {retired} paper question(s) are no longer in the question bank.");
    }

    let mut session = ExamSession::resume(
        paper.id,
        paper.preset.config(),
        paper.questions,
        ctx.engine.bank().scoring().clone(),
        paper.started_at,
    );
    for (question_id, answer) in answers {
        session.record_answer(&question_id, answer);
    }

    let now = Utc::now();
    let completed_at = if session.is_expired(now) {
        eprintln!("Time budget elapsed; grading as of the deadline.");
        session.started_at + session.time_limit()
    } else {
        let left = session.remaining(now);
        println!(
            "Finished with {}m {}s to spare",
            left.num_minutes(),
            left.num_seconds() % 60
        );
        now
    };

    let coach = OfflineCoach::new();
    let coach_ref: Option<&dyn StudyCoach> = if summary { Some(&coach) } else { None };
    let report = ctx
        .engine
        .finish_exam(&ctx.user, session, completed_at, coach_ref)
        .await?;

    print_results(&report);

    let output_dir = output.unwrap_or_else(|| ctx.engine.config().output_dir.clone());
    let path = output_dir.join(report.file_name());
    report.save_json(&path)?;
    println!("Report saved to: {}", path.display());

    Ok(())
}

fn print_results(report: &ExamReport) {
    let results = &report.results;
    println!(
        "Score: {:.1}% ({:.1} / {:.1} points) - {}",
        results.percentage,
        results.total_points_earned,
        results.total_points_possible,
        if results.passed { "PASS" } else { "FAIL" }
    );
    println!(
        "Answered {} of {} questions in {}m {}s",
        report.answers.len(),
        report.total_questions,
        report.time_used_seconds / 60,
        report.time_used_seconds % 60
    );

    let mut table = Table::new();
    table.set_header(vec!["Domain", "Earned", "Possible", "Score"]);
    for (domain, score) in &results.domain_breakdown {
        let pct = if score.is_scored() {
            format!("{:.1}%", score.percentage)
        } else {
            "-".to_string()
        };
        table.add_row(vec![
            Cell::new(domain.label()),
            Cell::new(format!("{:.1}", score.earned)),
            Cell::new(format!("{:.1}", score.possible)),
            Cell::new(pct),
        ]);
    }
    println!("{table}");

    if !report.unanswered.is_empty() {
        println!("Unanswered: {}", report.unanswered.join(", "));
    }
    if let Some(summary) = &report.summary {
        println!("\n{summary}\n");
    }
}
