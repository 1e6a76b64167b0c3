//! Similarity-ranked distractor generation for choice questions.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::model::Item;

/// The ranked pool is `count * POOL_FACTOR` wide before shuffling.
pub const POOL_FACTOR: usize = 4;

/// Which surface form the options will show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimilarityMode {
    /// Options are short codes; compare the codes themselves.
    Acronym,
    /// Options are long-form meanings; compare their words.
    FullName,
}

fn shared_prefix_len(a: &str, b: &str) -> u32 {
    a.chars()
        .zip(b.chars())
        .take_while(|(x, y)| x == y)
        .count() as u32
}

fn name_words(name: &str) -> HashSet<String> {
    name.split(|c: char| c.is_whitespace() || matches!(c, '-' | '/' | ','))
        .filter(|w| w.chars().count() > 2)
        .map(str::to_lowercase)
        .collect()
}

/// Score how plausible `candidate` is as a wrong option for `target`.
pub fn similarity(target: &Item, candidate: &Item, mode: SimilarityMode) -> u32 {
    let mut score = 0;
    if target.lists_confusable(&candidate.id) || candidate.lists_confusable(&target.id) {
        score += 20;
    }
    if target.category == candidate.category {
        score += 5;
    }
    if target.domain == candidate.domain {
        score += 2;
    }

    match mode {
        SimilarityMode::Acronym => {
            let a = target.id.to_uppercase();
            let b = candidate.id.to_uppercase();
            score += 3 * shared_prefix_len(&a, &b);
            let a_chars: HashSet<char> = a.chars().collect();
            let b_chars: HashSet<char> = b.chars().collect();
            score += a_chars.intersection(&b_chars).count() as u32;
        }
        SimilarityMode::FullName => {
            let a = name_words(&target.full_name);
            let b = name_words(&candidate.full_name);
            score += 4 * a.intersection(&b).count() as u32;
        }
    }
    score
}

/// Pick `count` distinct wrong options for `target` from `candidates`.
///
/// The top `count * POOL_FACTOR` candidates by similarity are shuffled and
/// the first `count` returned, so repeated questions vary their options.
/// Returns fewer only when there are not enough other items.
pub fn generate_distractors<'a, R: Rng + ?Sized>(
    target: &Item,
    candidates: impl IntoIterator<Item = &'a Item>,
    count: usize,
    mode: SimilarityMode,
    rng: &mut R,
) -> Vec<&'a Item> {
    let mut seen = HashSet::new();
    let mut ranked: Vec<(&Item, u32)> = Vec::new();
    for candidate in candidates {
        if candidate.id != target.id && seen.insert(candidate.id.as_str()) {
            ranked.push((candidate, similarity(target, candidate, mode)));
        }
    }
    // Stable, so equal scores keep catalogue order.
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(count.saturating_mul(POOL_FACTOR));

    let mut pool: Vec<&Item> = ranked.into_iter().map(|(c, _)| c).collect();
    pool.shuffle(rng);
    pool.truncate(count);
    pool
}
