//! The `acrodrill stats` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use acrodrill_core::report::load_reports_directory;
use acrodrill_core::statistics::{compute_exam_history, compute_mastery_overview, MasteryStats};

use super::AppContext;

fn stats_row(label: &str, stats: &MasteryStats) -> Vec<Cell> {
    vec![
        Cell::new(label),
        Cell::new(stats.total),
        Cell::new(stats.seen),
        Cell::new(stats.tested),
        Cell::new(stats.mastered),
        Cell::new(format!("{:.1}%", stats.strong_percentage)),
    ]
}

pub async fn execute(
    config_path: Option<PathBuf>,
    user: Option<String>,
    reports: Option<PathBuf>,
    weakest: usize,
) -> Result<()> {
    let ctx = AppContext::open(config_path, user)?;
    let progress = ctx.engine.store().load_progress(&ctx.user).await?;
    let overview = compute_mastery_overview(ctx.engine.catalogue(), &progress, weakest);

    println!("Mastery for {}", ctx.user);
    let mut table = Table::new();
    table.set_header(vec![
        "Domain", "Items", "Seen", "Tested", "Mastered", "Strong",
    ]);
    for (domain, stats) in &overview.per_domain {
        table.add_row(stats_row(domain.label(), stats));
    }
    table.add_row(stats_row("All", &overview.overall));
    println!("{table}");

    if !overview.weakest.is_empty() {
        let mut table = Table::new();
        table.set_header(vec!["Acronym", "Meaning", "Weakness", "Tested"]);
        for w in &overview.weakest {
            table.add_row(vec![
                Cell::new(&w.item_id),
                Cell::new(&w.full_name),
                Cell::new(format!("{:.2}", w.weakness_score)),
                Cell::new(w.times_tested),
            ]);
        }
        println!("\nWeakest items");
        println!("{table}");
    }

    let reports_dir = reports.unwrap_or_else(|| ctx.engine.config().output_dir.clone());
    if !reports_dir.is_dir() {
        println!("\nNo exam reports in {}", reports_dir.display());
        return Ok(());
    }

    let history = compute_exam_history(&load_reports_directory(&reports_dir)?);
    if history.attempts == 0 {
        println!("\nNo exam reports in {}", reports_dir.display());
        return Ok(());
    }

    println!(
        "\nExams: {} attempts, {} passed ({:.1}%), average {:.1}%, best {:.1}%",
        history.attempts,
        history.passed,
        history.pass_rate,
        history.average_percentage,
        history.best_percentage
    );
    let mut table = Table::new();
    table.set_header(vec!["Domain", "Average"]);
    for (domain, avg) in &history.per_domain_average {
        table.add_row(vec![
            Cell::new(domain.label()),
            Cell::new(format!("{avg:.1}%")),
        ]);
    }
    println!("{table}");

    Ok(())
}
