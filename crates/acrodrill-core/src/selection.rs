//! Session selection policies.
//!
//! Four policies: uniform random and reinforcement for training decks,
//! weakness-weighted hard mode for drills, and quota-based exam papers.
//! Every policy returns fewer items than requested when its pools run dry;
//! none of them fail.

use std::collections::{BTreeMap, HashSet};

use rand::seq::SliceRandom;
use rand::Rng;

use crate::mastery::MasteryTier;
use crate::model::{Difficulty, Domain, ExamQuestion, Item, PresetConfig};
use crate::progress::{HistoryMap, ProgressMap};
use crate::repository::QuestionBank;
use crate::sampling::{shuffled, weighted_sample, WeightedPool};

/// Flat hard-mode weight for items without test history.
pub const UNSEEN_HARD_WEIGHT: u32 = 5;

// ---------------------------------------------------------------------------
// Training and drill policies
// ---------------------------------------------------------------------------

/// Uniformly shuffle the candidates and take the first `count`.
pub fn select_random<'a, R: Rng + ?Sized>(
    candidates: impl IntoIterator<Item = &'a Item>,
    count: usize,
    rng: &mut R,
) -> Vec<&'a Item> {
    let mut picked = shuffled(candidates, rng);
    picked.truncate(count);
    picked
}

/// Prioritize unseen items, then weak ones, then items still in `learning`.
///
/// Each bucket is shuffled independently. The result holds at most `count`
/// distinct items and may be shorter; see [`fill_with_random`].
pub fn select_reinforcement<'a, R: Rng + ?Sized>(
    candidates: impl IntoIterator<Item = &'a Item>,
    progress: &ProgressMap,
    count: usize,
    rng: &mut R,
) -> Vec<&'a Item> {
    let mut unseen = Vec::new();
    let mut weak = Vec::new();
    let mut learning = Vec::new();

    for item in candidates {
        let record = progress.get(&item.id);
        match record {
            None => unseen.push(item),
            Some(p) if p.times_seen_in_training == 0 => unseen.push(item),
            Some(p) if p.weakness_score >= 0.5 => weak.push(item),
            _ => {}
        }
        // Not exclusive with the buckets above; duplicates are dropped below.
        if let Some(p) = record {
            if p.mastery == MasteryTier::Learning && p.weakness_score < 0.5 {
                learning.push(item);
            }
        }
    }

    tracing::debug!(
        unseen = unseen.len(),
        weak = weak.len(),
        learning = learning.len(),
        "reinforcement buckets"
    );

    unseen.shuffle(rng);
    weak.shuffle(rng);
    learning.shuffle(rng);

    let mut seen = HashSet::new();
    let mut picked = Vec::with_capacity(count);
    for item in unseen.into_iter().chain(weak).chain(learning) {
        if picked.len() >= count {
            break;
        }
        if seen.insert(item.id.as_str()) {
            picked.push(item);
        }
    }
    picked
}

/// Pad `selected` up to `count` with random candidates not already in it.
pub fn fill_with_random<'a, R: Rng + ?Sized>(
    selected: &mut Vec<&'a Item>,
    candidates: impl IntoIterator<Item = &'a Item>,
    count: usize,
    rng: &mut R,
) {
    if selected.len() >= count {
        return;
    }
    let taken: HashSet<&str> = selected.iter().map(|item| item.id.as_str()).collect();
    let mut extras: Vec<&Item> = candidates
        .into_iter()
        .filter(|item| !taken.contains(item.id.as_str()))
        .collect();
    extras.shuffle(rng);
    let need = count - selected.len();
    selected.extend(extras.into_iter().take(need));
}

/// Sampling weight of an item in hard mode.
pub fn hard_mode_weight(progress: &ProgressMap, item_id: &str) -> u32 {
    match progress.get(item_id) {
        Some(p) if p.times_tested() > 0 => ((p.weakness_score * 10.0).round() as u32).max(1),
        _ => UNSEEN_HARD_WEIGHT,
    }
}

/// Weakness-weighted sampling without replacement.
///
/// Whenever an item is drawn, the candidates it lists as confusable are
/// pulled in immediately so confusable pairs share a session.
pub fn select_hard_mode<'a, R: Rng + ?Sized>(
    candidates: impl IntoIterator<Item = &'a Item>,
    progress: &ProgressMap,
    count: usize,
    rng: &mut R,
) -> Vec<&'a Item> {
    let mut pool = WeightedPool::new(
        candidates
            .into_iter()
            .map(|item| (item, hard_mode_weight(progress, &item.id))),
    );
    let mut picked: Vec<&Item> = Vec::with_capacity(count.min(pool.len()));

    while picked.len() < count {
        let Some(item) = pool.draw(rng) else {
            break;
        };
        picked.push(item);
        for linked in &item.confused_with {
            if picked.len() >= count {
                break;
            }
            if let Some(partner) = pool.take_where(|c| &c.id == linked) {
                picked.push(partner);
            }
        }
    }

    picked
}

// ---------------------------------------------------------------------------
// Exam papers
// ---------------------------------------------------------------------------

/// Share of the non-PBQ quota drawn from difficulty 1.
const EASY_SHARE: f64 = 0.40;
/// Share of the non-PBQ quota drawn from difficulty 3. Difficulty 2 takes the rest.
const HARD_SHARE: f64 = 0.16;

/// Distribute `pbq_total` performance-based slots across domains.
///
/// Domains are visited by descending quota (ties in domain order); each gets
/// `max(1, round(pbq_total * weight))` capped by what is left.
pub fn allocate_pbq(quota: &BTreeMap<Domain, u32>, pbq_total: u32) -> BTreeMap<Domain, u32> {
    let total_weight: u32 = quota.values().sum();
    let mut allocation: BTreeMap<Domain, u32> = quota.keys().map(|&d| (d, 0)).collect();
    if total_weight == 0 {
        return allocation;
    }

    let mut by_weight: Vec<(Domain, u32)> = quota.iter().map(|(&d, &q)| (d, q)).collect();
    by_weight.sort_by(|a, b| b.1.cmp(&a.1));

    let mut remaining = pbq_total;
    for (domain, weight) in by_weight {
        if remaining == 0 {
            break;
        }
        let share = (pbq_total as f64 * weight as f64 / total_weight as f64).round() as u32;
        let assign = share.max(1).min(remaining);
        allocation.insert(domain, assign);
        remaining -= assign;
    }
    allocation
}

/// Split a domain's remaining quota into (easy, medium, hard) counts.
pub fn split_by_difficulty(remaining: u32) -> (u32, u32, u32) {
    let easy = (remaining as f64 * EASY_SHARE).round() as u32;
    let hard = (remaining as f64 * HARD_SHARE).round() as u32;
    let medium = remaining.saturating_sub(easy + hard);
    (easy, medium, hard)
}

/// Exam-history weight: novel questions first, then previously missed ones.
pub fn history_weight(history: &HistoryMap, question_id: &str) -> u32 {
    match history.get(question_id) {
        None => 3,
        Some(h) if h.times_seen == 0 => 3,
        Some(h) if h.times_wrong > 0 => 2,
        Some(_) => 1,
    }
}

fn pick_weighted<'a, R: Rng + ?Sized>(
    pool: impl IntoIterator<Item = &'a ExamQuestion>,
    history: &HistoryMap,
    count: u32,
    rng: &mut R,
) -> Vec<&'a ExamQuestion> {
    let entries = pool.into_iter().map(|q| (q, history_weight(history, &q.id)));
    weighted_sample(entries, count as usize, rng)
}

/// Build an exam paper for `config` from `bank`.
///
/// PBQ slots are allocated first and always deducted from their domain's
/// quota, even when the domain has fewer PBQs than allocated. Short pools
/// under-fill; the deficit is not moved to other domains.
pub fn select_exam_questions<'a, R: Rng + ?Sized>(
    bank: &'a QuestionBank,
    history: &HistoryMap,
    config: &PresetConfig,
    rng: &mut R,
) -> Vec<&'a ExamQuestion> {
    let mut quota = config.domain_quota.clone();
    let pbq_allocation = allocate_pbq(&config.domain_quota, config.pbq_count);
    let mut selected: Vec<&ExamQuestion> = Vec::with_capacity(config.total_questions as usize);

    for (&domain, &count) in &pbq_allocation {
        if count == 0 {
            continue;
        }
        let pool = bank
            .questions()
            .iter()
            .filter(|q| q.domain == domain && q.kind.is_performance_based());
        let picked = pick_weighted(pool, history, count, rng);
        if picked.len() < count as usize {
            tracing::debug!(%domain, wanted = count, got = picked.len(), "PBQ pool under-filled");
        }
        selected.extend(picked);
        if let Some(q) = quota.get_mut(&domain) {
            *q = q.saturating_sub(count);
        }
    }

    for (&domain, &remaining) in &quota {
        if remaining == 0 {
            continue;
        }
        let (easy, medium, hard) = split_by_difficulty(remaining);
        for (difficulty, count) in [
            (Difficulty::Easy, easy),
            (Difficulty::Medium, medium),
            (Difficulty::Hard, hard),
        ] {
            if count == 0 {
                continue;
            }
            let pool = bank.questions().iter().filter(|q| {
                q.domain == domain && q.difficulty == difficulty && !q.kind.is_performance_based()
            });
            let picked = pick_weighted(pool, history, count, rng);
            if picked.len() < count as usize {
                tracing::debug!(
                    %domain,
                    ?difficulty,
                    wanted = count,
                    got = picked.len(),
                    "choice pool under-filled"
                );
            }
            selected.extend(picked);
        }
    }

    selected.shuffle(rng);
    selected
}
