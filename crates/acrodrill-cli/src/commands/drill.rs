//! The `acrodrill drill` command.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Result;
use chrono::Utc;
use comfy_table::{Cell, Table};

use acrodrill_core::coach::OfflineCoach;
use acrodrill_core::drill::{DrillMode, DrillQuestion, DrillResponse, QuestionFormat};
use acrodrill_core::engine::DrillPlan;
use acrodrill_core::model::{Category, Domain};
use acrodrill_core::session::{DrillSession, DrillSummary};

use super::{read_answer, stdin_lines, AppContext};

pub async fn execute(
    config_path: Option<PathBuf>,
    mode: String,
    count: Option<usize>,
    domain: Option<String>,
    category: Option<String>,
    user: Option<String>,
) -> Result<()> {
    let mode: DrillMode = mode.parse().map_err(anyhow::Error::msg)?;
    let domain = domain.map(|d| d.parse::<Domain>()).transpose()?;
    let category = category.map(|c| c.parse::<Category>()).transpose()?;

    let mut ctx = AppContext::open(config_path, user)?;
    let count = count.unwrap_or(ctx.engine.config().drill_count);
    anyhow::ensure!(count >= 1, "count must be at least 1");
    if mode == DrillMode::Hard && (domain.is_some() || category.is_some()) {
        eprintln!("Warning: --domain and --category are ignored in hard mode.");
    }

    let plan = DrillPlan {
        mode,
        count,
        domain,
        category,
    };
    let questions = ctx.engine.plan_drill(&ctx.user, &plan, &mut ctx.rng).await?;
    anyhow::ensure!(!questions.is_empty(), "no catalogue items match the drill filter");

    println!("Drill ({mode}, {} questions) for {}", questions.len(), ctx.user);

    let coach = OfflineCoach::new();
    let mut session = DrillSession::new(mode, questions.len() as u32, Utc::now());
    let mut lines = stdin_lines();

    for (i, question) in questions.iter().enumerate() {
        println!("\n[{}/{}] {}", i + 1, questions.len(), question.prompt);
        print_choices(question);

        let Some(input) = read_answer(&mut lines)? else {
            break;
        };
        let Some(response) = parse_response(question, &input) else {
            println!("Could not read that answer; counted as wrong.");
            let blank = DrillResponse::Text(String::new());
            record(&ctx, &mut session, question, &blank, &coach).await?;
            continue;
        };
        record(&ctx, &mut session, question, &response, &coach).await?;
    }

    print_summary(&session.finish(Utc::now()));
    Ok(())
}

async fn record(
    ctx: &AppContext,
    session: &mut DrillSession,
    question: &DrillQuestion,
    response: &DrillResponse,
    coach: &OfflineCoach,
) -> Result<()> {
    let feedback = ctx
        .engine
        .answer_drill(&ctx.user, question, response, Utc::now())
        .await?;

    if feedback.correct {
        println!("Correct! ({})", feedback.record.mastery);
    } else {
        println!("Wrong. Answer: {}", expected(question));
        println!("{}", ctx.engine.explain(&question.item_id, coach).await?);
    }

    if let Some(item) = ctx.engine.catalogue().get(&question.item_id) {
        session.record(item, feedback.correct);
    }
    Ok(())
}

fn expected(question: &DrillQuestion) -> String {
    if question.format == QuestionFormat::MatchPairs {
        question
            .pairs
            .iter()
            .map(|p| format!("{} = {}", p.left, p.right))
            .collect::<Vec<_>>()
            .join("; ")
    } else {
        question.correct_answer.clone()
    }
}

fn print_choices(question: &DrillQuestion) {
    match question.format {
        QuestionFormat::MatchPairs => {
            for (i, option) in question.options.iter().enumerate() {
                println!("  {}) {option}", i + 1);
            }
            let lefts: Vec<&str> = question.pairs.iter().map(|p| p.left.as_str()).collect();
            println!("Give the meaning number for {} (e.g. 2,4,1,3)", lefts.join(", "));
        }
        QuestionFormat::FillBlank => println!("Type the acronym:"),
        QuestionFormat::TrueFalse => println!("  true / false"),
        _ => {
            for (i, option) in question.options.iter().enumerate() {
                println!("  {}) {option}", i + 1);
            }
        }
    }
}

/// Turn a typed line into a response: option numbers select options,
/// anything else is taken literally.
fn parse_response(question: &DrillQuestion, input: &str) -> Option<DrillResponse> {
    let pick = |s: &str| -> Option<String> {
        let n: usize = s.trim().parse().ok()?;
        question.options.get(n.checked_sub(1)?).cloned()
    };

    match question.format {
        QuestionFormat::MatchPairs => {
            let picks: Vec<&str> = input.split(',').collect();
            if picks.len() != question.pairs.len() {
                return None;
            }
            let mut mapping = BTreeMap::new();
            for (pair, choice) in question.pairs.iter().zip(picks) {
                mapping.insert(pair.left.clone(), pick(choice)?);
            }
            Some(DrillResponse::Pairs(mapping))
        }
        QuestionFormat::TrueFalse => {
            let value = match input.to_lowercase().as_str() {
                "t" | "true" | "1" => "true",
                "f" | "false" | "2" => "false",
                _ => return None,
            };
            Some(DrillResponse::Text(value.to_string()))
        }
        QuestionFormat::FillBlank => Some(DrillResponse::Text(input.to_string())),
        _ => Some(DrillResponse::Text(pick(input).unwrap_or_else(|| input.to_string()))),
    }
}

fn print_summary(summary: &DrillSummary) {
    println!(
        "\nScore: {:.1}% ({}/{} correct, {} wrong, {}s)",
        summary.score,
        summary.correct_answers,
        summary.total_questions,
        summary.wrong_answers,
        summary.duration_seconds
    );

    let mut table = Table::new();
    table.set_header(vec!["Domain", "Correct", "Answered"]);
    for (domain, tally) in &summary.domain_breakdown {
        table.add_row(vec![
            Cell::new(domain.label()),
            Cell::new(tally.correct),
            Cell::new(tally.total),
        ]);
    }
    println!("{table}");

    if !summary.missed.is_empty() {
        println!("Review: {}", summary.missed.join(", "));
    }
}
