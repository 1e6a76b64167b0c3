//! Study coach prompts and an offline coach that needs no text generator.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;

use crate::model::Domain;
use crate::traits::{ExplainRequest, MissedQuestion, StudyCoach, SummaryRequest};

/// Word budget for exam summaries.
pub const SUMMARY_WORD_LIMIT: usize = 250;

/// Prompt asking a text generator to re-explain one item.
pub fn build_explain_prompt(request: &ExplainRequest) -> String {
    format!(
        "You are a Security+ study assistant.\n\
         Re-explain {} ({}) in exactly 2 short sentences: one defining what the letters mean, \
         one combining a quick example and its exam relevance.\n\
         No headers. No filler.",
        request.item_id, request.full_name
    )
}

fn group_by_domain(missed: &[MissedQuestion]) -> BTreeMap<Domain, Vec<&MissedQuestion>> {
    let mut grouped: BTreeMap<Domain, Vec<&MissedQuestion>> = BTreeMap::new();
    for q in missed {
        grouped.entry(q.domain).or_default().push(q);
    }
    grouped
}

/// Prompt asking a text generator for a grouped review sheet of missed questions.
pub fn build_summary_prompt(request: &SummaryRequest) -> String {
    let questions = request
        .missed
        .iter()
        .enumerate()
        .map(|(i, q)| {
            format!(
                "{}. [Domain {}: {}]\nQuestion: {}\nKey concept: {}",
                i + 1,
                q.domain.number(),
                q.topic,
                q.stem,
                q.explanation
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "You are a Security+ study coach. A student missed some exam questions. \
         Write a quick-review cheat sheet of the fundamental concepts they need to revisit, \
         not the answers and not detailed explanations.\n\n\
         Rules:\n\
         - Group by domain\n\
         - For each domain: one line stating the core concept, then 2-3 bullet points with \
         simple \"remember this\" fundamentals (1 sentence each, plain language)\n\
         - No introductions, no encouragement\n\
         - Use ## for domain headers\n\
         - Total response MUST be under {SUMMARY_WORD_LIMIT} words\n\n\
         Wrong questions:\n{questions}"
    )
}

fn first_sentence(text: &str) -> &str {
    let text = text.trim();
    match text.find(". ") {
        Some(end) => &text[..=end],
        None => text,
    }
}

fn truncate_words(text: &str, limit: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= limit {
        return text.to_string();
    }
    // Keep line structure for everything up to the cut.
    let mut kept = 0;
    let mut out = String::new();
    for line in text.lines() {
        let line_words: Vec<&str> = line.split_whitespace().collect();
        if kept + line_words.len() > limit {
            let room = limit - kept;
            if room > 0 {
                out.push_str(&line_words[..room].join(" "));
                out.push_str(" ...");
            }
            break;
        }
        kept += line_words.len();
        out.push_str(line);
        out.push('\n');
    }
    out.trim_end().to_string()
}

/// Composes explanations and summaries from catalogue and bank text alone.
#[derive(Debug, Default)]
pub struct OfflineCoach {
    call_count: AtomicU32,
}

impl OfflineCoach {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of explain/summarize calls served.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl StudyCoach for OfflineCoach {
    fn name(&self) -> &str {
        "offline"
    }

    async fn explain(&self, request: &ExplainRequest) -> anyhow::Result<String> {
        self.call_count.fetch_add(1, Ordering::Relaxed);

        let mut text = format!("{} stands for {}.", request.item_id, request.full_name);
        if !request.mnemonic.trim().is_empty() {
            let mnemonic = request.mnemonic.trim().trim_end_matches('.');
            text.push_str(&format!(" Remember it as: {mnemonic}."));
        }
        let relevance = if !request.exam_tip.trim().is_empty() {
            request.exam_tip.trim()
        } else {
            request.example.trim()
        };
        if !relevance.is_empty() {
            text.push(' ');
            text.push_str(first_sentence(relevance));
        }
        Ok(text)
    }

    async fn summarize(&self, request: &SummaryRequest) -> anyhow::Result<String> {
        self.call_count.fetch_add(1, Ordering::Relaxed);

        if request.missed.is_empty() {
            return Ok("Nothing missed. No review needed.".to_string());
        }

        let mut out = String::new();
        for (domain, questions) in group_by_domain(&request.missed) {
            out.push_str(&format!("## {}\n", domain.label()));
            let mut topics: Vec<&str> = questions
                .iter()
                .map(|q| q.topic.as_str())
                .filter(|t| !t.is_empty())
                .collect();
            topics.dedup();
            if !topics.is_empty() {
                out.push_str(&format!("Review: {}\n", topics.join(", ")));
            }
            for q in questions.iter().take(3) {
                let concept = first_sentence(&q.explanation);
                if !concept.is_empty() {
                    out.push_str(&format!("- {concept}\n"));
                }
            }
            out.push('\n');
        }
        Ok(truncate_words(out.trim_end(), SUMMARY_WORD_LIMIT))
    }
}
