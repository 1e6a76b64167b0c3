//! The `acrodrill compare` command.

use std::path::PathBuf;

use anyhow::Result;

use acrodrill_core::report::ExamReport;

pub fn execute(
    baseline_path: PathBuf,
    current_path: PathBuf,
    threshold: f64,
    fail_on_regression: bool,
    format: String,
) -> Result<()> {
    anyhow::ensure!(threshold >= 0.0, "threshold must not be negative");

    let baseline = ExamReport::load_json(&baseline_path)?;
    let current = ExamReport::load_json(&current_path)?;

    let report = current.compare(&baseline, threshold);

    match format.as_str() {
        "markdown" | "md" => {
            println!("{}", report.to_markdown());
        }
        "json" => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        _ => {
            println!(
                "Comparison: {} regressions, {} improvements, {} unchanged (overall {:+.1} pts)",
                report.regressions.len(),
                report.improvements.len(),
                report.unchanged,
                report.overall_delta
            );

            for (title, rows) in [
                ("Regressions", &report.regressions),
                ("Improvements", &report.improvements),
            ] {
                if rows.is_empty() {
                    continue;
                }
                println!("\n{title}:");
                for r in rows {
                    println!(
                        "  {} {:.1}% -> {:.1}% ({:+.1})",
                        r.domain.label(),
                        r.baseline_percentage,
                        r.current_percentage,
                        r.delta
                    );
                }
            }

            if !report.new_domains.is_empty() {
                println!("\n{} new domain(s)", report.new_domains.len());
            }
            if !report.removed_domains.is_empty() {
                println!("{} removed domain(s)", report.removed_domains.len());
            }
            if report.baseline_passed != report.current_passed {
                println!(
                    "\n{}",
                    if report.current_passed { "Now passing." } else { "No longer passing." }
                );
            }
        }
    }

    if fail_on_regression && report.has_regressions() {
        std::process::exit(1);
    }

    Ok(())
}
