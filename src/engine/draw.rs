//! Seeded sampling of a session's questions.

use rand::{SeedableRng, seq::SliceRandom};
use rand_chacha::ChaCha8Rng;

/// Generator behind every draw. A named algorithm, so a stored seed keeps
/// reproducing the same questions across rand releases and platforms.
pub type DrawRng = ChaCha8Rng;

/// Builds the generator for one draw: reproducible from `seed`, or seeded
/// from OS entropy when no seed is given.
pub fn rng_for(seed: Option<i64>) -> DrawRng {
    match seed {
        // Bit-for-bit reinterpretation keeps negative seeds distinct.
        Some(seed) => DrawRng::seed_from_u64(seed as u64),
        None => DrawRng::from_entropy(),
    }
}

/// Shuffles a copy of `all_ids` and keeps the first `count` entries.
///
/// `count` is clamped to the bank size. The returned order is the exam's
/// presentation order.
pub fn draw<T: Clone>(all_ids: &[T], count: usize, rng: &mut DrawRng) -> Vec<T> {
    let mut out = all_ids.to_vec();
    out.shuffle(rng);
    out.truncate(count.min(all_ids.len()));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn bank(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("q{}", i)).collect()
    }

    #[test]
    fn test_same_seed_same_draw() {
        let ids = bank(50);
        let first = draw(&ids, 20, &mut rng_for(Some(42)));
        let second = draw(&ids, 20, &mut rng_for(Some(42)));
        assert_eq!(first, second);
    }

    #[test]
    fn test_seeded_order_is_pinned() {
        // Stored seeds must keep reproducing these exact orders.
        assert_eq!(draw(&["Q1", "Q2"], 2, &mut rng_for(Some(42))), ["Q2", "Q1"]);
        assert_eq!(
            draw(&["Q1", "Q2", "Q3", "Q4"], 4, &mut rng_for(Some(7))),
            ["Q4", "Q1", "Q3", "Q2"]
        );
    }

    #[test]
    fn test_different_seeds_differ() {
        let ids = bank(50);
        let a = draw(&ids, 50, &mut rng_for(Some(1)));
        let b = draw(&ids, 50, &mut rng_for(Some(2)));
        assert_ne!(a, b);
    }

    #[test]
    fn test_count_is_clamped_to_bank() {
        let ids = bank(5);
        let drawn = draw(&ids, 80, &mut rng_for(Some(7)));
        assert_eq!(drawn.len(), 5);
    }

    #[test]
    fn test_draw_is_subset_without_repeats() {
        let ids = bank(30);
        for seed in 0..20 {
            let drawn = draw(&ids, 12, &mut rng_for(Some(seed)));
            assert_eq!(drawn.len(), 12);
            let unique: HashSet<_> = drawn.iter().collect();
            assert_eq!(unique.len(), drawn.len());
            assert!(drawn.iter().all(|id| ids.contains(id)));
        }
    }

    #[test]
    fn test_zero_count_and_empty_bank() {
        assert!(draw(&bank(3), 0, &mut rng_for(None)).is_empty());
        assert!(draw::<String>(&[], 10, &mut rng_for(None)).is_empty());
    }

    #[test]
    fn test_full_draw_is_permutation() {
        let ids = bank(10);
        let mut drawn = draw(&ids, 10, &mut rng_for(Some(-3)));
        drawn.sort();
        let mut expected = ids.clone();
        expected.sort();
        assert_eq!(drawn, expected);
    }
}
