//! The `acrodrill train` command.

use std::path::PathBuf;

use anyhow::Result;
use chrono::Utc;
use comfy_table::{Cell, Table};

use acrodrill_core::model::Item;
use acrodrill_core::progress::{mastery_of, SwipeDirection};
use acrodrill_core::session::{TrainingMode, TrainingSession};

use super::{read_answer, stdin_lines, AppContext};

pub async fn execute(
    config_path: Option<PathBuf>,
    mode: String,
    count: Option<usize>,
    user: Option<String>,
    plan_only: bool,
) -> Result<()> {
    let mode: TrainingMode = mode.parse().map_err(anyhow::Error::msg)?;
    let mut ctx = AppContext::open(config_path, user)?;
    let count = count.unwrap_or(ctx.engine.config().training_count);
    anyhow::ensure!(count >= 1, "count must be at least 1");

    let deck: Vec<Item> = ctx
        .engine
        .plan_training(&ctx.user, mode, count, &mut ctx.rng)
        .await?
        .into_iter()
        .cloned()
        .collect();

    let progress = ctx.engine.store().load_progress(&ctx.user).await?;
    let mut table = Table::new();
    table.set_header(vec!["#", "Acronym", "Domain", "Category", "Mastery"]);
    for (i, item) in deck.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&item.id),
            Cell::new(item.domain.label()),
            Cell::new(item.category),
            Cell::new(mastery_of(&progress, &item.id)),
        ]);
    }
    println!("Training deck ({mode}, {} cards) for {}", deck.len(), ctx.user);
    println!("{table}");

    if plan_only {
        return Ok(());
    }

    let mut session = TrainingSession::new(mode, deck.len() as u32, Utc::now());
    let mut lines = stdin_lines();

    'deck: for (i, item) in deck.iter().enumerate() {
        println!("\n[{}/{}] {}", i + 1, deck.len(), item.id);
        if !item.phonetic.is_empty() {
            println!("  ({})", item.phonetic);
        }
        println!("  {}", item.full_name);
        if !item.mnemonic.is_empty() {
            println!("  Mnemonic: {}", item.mnemonic);
        }
        if !item.exam_tip.is_empty() {
            println!("  Exam tip: {}", item.exam_tip);
        }

        let direction = loop {
            println!("Swipe: l = practice, r = confident, q = quit");
            let Some(input) = read_answer(&mut lines)? else {
                break 'deck;
            };
            let input = match input.to_lowercase().as_str() {
                "q" | "quit" => break 'deck,
                "l" => "left".to_string(),
                "r" => "right".to_string(),
                other => other.to_string(),
            };
            match input.parse::<SwipeDirection>() {
                Ok(direction) => break direction,
                Err(e) => println!("{e}"),
            }
        };

        let record = ctx
            .engine
            .record_swipe(&ctx.user, &item.id, direction, Utc::now())
            .await?;
        session.record(direction);
        tracing::debug!(item = %item.id, seen = record.times_seen_in_training, "swipe recorded");
    }

    println!(
        "\nTraining {}: {} confident, {} practice (of {})",
        if session.is_complete() { "complete" } else { "stopped" },
        session.confident,
        session.practice,
        session.deck_size
    );

    Ok(())
}
