//! Mastery overviews for one learner and aggregate exam-history statistics.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::mastery::MasteryTier;
use crate::model::Domain;
use crate::progress::ProgressMap;
use crate::report::ExamReport;
use crate::repository::ItemRepository;

/// Mastery counts for a set of items.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MasteryStats {
    pub total: usize,
    /// Items with at least one training swipe or test answer.
    pub seen: usize,
    pub tested: usize,
    /// Confident or mastered.
    pub strong: usize,
    pub mastered: usize,
    /// Share of `total` that is strong, in percent.
    pub strong_percentage: f64,
    pub tiers: BTreeMap<MasteryTier, usize>,
}

impl MasteryStats {
    fn add(&mut self, tier: MasteryTier, seen: bool, tested: bool) {
        self.total += 1;
        if seen {
            self.seen += 1;
        }
        if tested {
            self.tested += 1;
        }
        if tier.is_strong() {
            self.strong += 1;
        }
        if tier == MasteryTier::Mastered {
            self.mastered += 1;
        }
        *self.tiers.entry(tier).or_insert(0) += 1;
    }

    fn finish(&mut self) {
        self.strong_percentage = if self.total == 0 {
            0.0
        } else {
            self.strong as f64 / self.total as f64 * 100.0
        };
    }
}

/// A tested item and how weak it is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeakItem {
    pub item_id: String,
    pub full_name: String,
    pub weakness_score: f64,
    pub times_tested: u32,
}

/// One learner's standing across the catalogue.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MasteryOverview {
    pub overall: MasteryStats,
    pub per_domain: BTreeMap<Domain, MasteryStats>,
    /// Tested items ordered weakest first.
    pub weakest: Vec<WeakItem>,
}

/// Summarize `progress` against the catalogue. Progress for ids not in the
/// catalogue is ignored.
pub fn compute_mastery_overview(
    catalogue: &ItemRepository,
    progress: &ProgressMap,
    weakest_limit: usize,
) -> MasteryOverview {
    let mut overview = MasteryOverview::default();
    let mut weak = Vec::new();

    for item in catalogue.iter() {
        let record = progress.get(&item.id);
        let tier = record.map(|p| p.mastery).unwrap_or_default();
        let tested = record.is_some_and(|p| p.times_tested() > 0);
        let seen = tested || record.is_some_and(|p| p.times_seen_in_training > 0);

        overview.overall.add(tier, seen, tested);
        overview
            .per_domain
            .entry(item.domain)
            .or_default()
            .add(tier, seen, tested);

        if let Some(p) = record.filter(|_| tested) {
            weak.push(WeakItem {
                item_id: item.id.clone(),
                full_name: item.full_name.clone(),
                weakness_score: p.weakness_score,
                times_tested: p.times_tested(),
            });
        }
    }

    overview.overall.finish();
    for stats in overview.per_domain.values_mut() {
        stats.finish();
    }

    weak.sort_by(|a, b| {
        b.weakness_score
            .total_cmp(&a.weakness_score)
            .then(b.times_tested.cmp(&a.times_tested))
    });
    weak.truncate(weakest_limit);
    overview.weakest = weak;
    overview
}

/// Aggregates over a learner's past exams.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExamHistoryStats {
    pub attempts: usize,
    pub passed: usize,
    pub pass_rate: f64,
    pub average_percentage: f64,
    pub best_percentage: f64,
    pub latest_percentage: Option<f64>,
    /// Mean percentage per domain over the exams where the domain was scored.
    pub per_domain_average: BTreeMap<Domain, f64>,
}

/// Compute exam-history statistics. `reports` are expected oldest first.
pub fn compute_exam_history(reports: &[ExamReport]) -> ExamHistoryStats {
    if reports.is_empty() {
        return ExamHistoryStats::default();
    }

    let attempts = reports.len();
    let passed = reports.iter().filter(|r| r.results.passed).count();
    let percentages: Vec<f64> = reports.iter().map(|r| r.results.percentage).collect();

    let mut domain_sums: BTreeMap<Domain, (f64, usize)> = BTreeMap::new();
    for report in reports {
        for (&domain, score) in &report.results.domain_breakdown {
            if !score.is_scored() {
                continue;
            }
            let entry = domain_sums.entry(domain).or_insert((0.0, 0));
            entry.0 += score.percentage;
            entry.1 += 1;
        }
    }

    ExamHistoryStats {
        attempts,
        passed,
        pass_rate: passed as f64 / attempts as f64 * 100.0,
        average_percentage: percentages.iter().sum::<f64>() / attempts as f64,
        best_percentage: percentages.iter().copied().fold(0.0, f64::max),
        latest_percentage: percentages.last().copied(),
        per_domain_average: domain_sums
            .into_iter()
            .map(|(d, (sum, n))| (d, sum / n as f64))
            .collect(),
    }
}
