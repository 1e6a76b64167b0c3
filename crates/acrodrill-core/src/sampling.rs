//! Weighted sampling without replacement and unbiased shuffling.

use rand::seq::SliceRandom;
use rand::Rng;

/// A pool of weighted candidates that are removed as they are drawn.
#[derive(Debug, Clone)]
pub struct WeightedPool<T> {
    entries: Vec<(T, u32)>,
    total: u64,
}

impl<T> WeightedPool<T> {
    /// Build a pool. Zero weights are raised to 1 so every entry stays drawable.
    pub fn new(entries: impl IntoIterator<Item = (T, u32)>) -> Self {
        let entries: Vec<(T, u32)> = entries
            .into_iter()
            .map(|(value, weight)| (value, weight.max(1)))
            .collect();
        let total = entries.iter().map(|(_, w)| u64::from(*w)).sum();
        Self { entries, total }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Draw one entry with probability proportional to its weight.
    pub fn draw<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<T> {
        if self.entries.is_empty() {
            return None;
        }
        let mut target = rng.gen_range(0..self.total);
        let mut index = self.entries.len() - 1;
        for (i, (_, weight)) in self.entries.iter().enumerate() {
            let weight = u64::from(*weight);
            if target < weight {
                index = i;
                break;
            }
            target -= weight;
        }
        let (value, weight) = self.entries.swap_remove(index);
        self.total -= u64::from(weight);
        Some(value)
    }

    /// Remove the first entry matching `pred`, returning it.
    pub fn take_where(&mut self, mut pred: impl FnMut(&T) -> bool) -> Option<T> {
        let index = self.entries.iter().position(|(value, _)| pred(value))?;
        let (value, weight) = self.entries.swap_remove(index);
        self.total -= u64::from(weight);
        Some(value)
    }
}

/// Draw up to `count` distinct entries, weighted, without replacement.
pub fn weighted_sample<T, R: Rng + ?Sized>(
    entries: impl IntoIterator<Item = (T, u32)>,
    count: usize,
    rng: &mut R,
) -> Vec<T> {
    let mut pool = WeightedPool::new(entries);
    let mut picked = Vec::with_capacity(count.min(pool.len()));
    while picked.len() < count {
        match pool.draw(rng) {
            Some(value) => picked.push(value),
            None => break,
        }
    }
    picked
}

/// Fisher-Yates shuffle into a new vector.
pub fn shuffled<T, R: Rng + ?Sized>(items: impl IntoIterator<Item = T>, rng: &mut R) -> Vec<T> {
    let mut items: Vec<T> = items.into_iter().collect();
    items.shuffle(rng);
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashSet;

    #[test]
    fn sample_never_duplicates_or_overflows() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for count in [0, 1, 5, 10, 25] {
            let entries: Vec<(u32, u32)> = (0..10).map(|i| (i, i % 4)).collect();
            let picked = weighted_sample(entries, count, &mut rng);
            assert_eq!(picked.len(), count.min(10));
            let unique: HashSet<_> = picked.iter().collect();
            assert_eq!(unique.len(), picked.len());
        }
    }

    #[test]
    fn heavy_weights_dominate() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut heavy_first = 0;
        for _ in 0..500 {
            let picked = weighted_sample(vec![("light", 1), ("heavy", 50)], 1, &mut rng);
            if picked[0] == "heavy" {
                heavy_first += 1;
            }
        }
        assert!(heavy_first > 400, "heavy drawn first {heavy_first}/500");
    }

    #[test]
    fn take_where_removes_entry() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut pool = WeightedPool::new(vec![("a", 1), ("b", 1), ("c", 1)]);
        assert_eq!(pool.take_where(|v| *v == "b"), Some("b"));
        assert_eq!(pool.take_where(|v| *v == "b"), None);
        let mut rest = vec![pool.draw(&mut rng).unwrap(), pool.draw(&mut rng).unwrap()];
        rest.sort();
        assert_eq!(rest, vec!["a", "c"]);
        assert!(pool.draw(&mut rng).is_none());
    }

    #[test]
    fn shuffled_is_a_permutation() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut out = shuffled(0..50, &mut rng);
        out.sort_unstable();
        assert_eq!(out, (0..50).collect::<Vec<_>>());
    }
}
