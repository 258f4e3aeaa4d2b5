//! Random number helpers shared by the swarm engine.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Creates a deterministic RNG from a seed.
pub fn create_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Creates an RNG from `seed`, or from OS entropy when `None`.
pub fn rng_from_option(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => create_rng(seed),
        None => create_rng(rand::random()),
    }
}

/// Derives one independent child RNG per slot from `master`.
///
/// Seeds are drawn in slot order, so the children depend only on the
/// master's state and not on the order in which they are later used.
pub fn split_rngs<R: Rng>(master: &mut R, n: usize) -> Vec<StdRng> {
    (0..n).map(|_| create_rng(master.random())).collect()
}

/// Samples `amount` distinct indices from `0..length`, skipping `exclude`.
///
/// # Panics
/// Panics if `amount` exceeds the number of candidates (`length - 1` when
/// `exclude < length`).
pub fn sample_excluding<R: Rng>(
    rng: &mut R,
    length: usize,
    exclude: usize,
    amount: usize,
) -> Vec<usize> {
    if amount == 0 {
        return Vec::new();
    }
    let pool = if exclude < length { length - 1 } else { length };
    rand::seq::index::sample(rng, pool, amount)
        .into_iter()
        .map(|i| if exclude < length && i >= exclude { i + 1 } else { i })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_create_rng_deterministic() {
        let mut a = create_rng(7);
        let mut b = create_rng(7);
        for _ in 0..10 {
            assert_eq!(a.random::<u64>(), b.random::<u64>());
        }
    }

    #[test]
    fn test_split_rngs_deterministic() {
        let mut m1 = create_rng(3);
        let mut m2 = create_rng(3);
        let mut c1 = split_rngs(&mut m1, 4);
        let mut c2 = split_rngs(&mut m2, 4);
        for (a, b) in c1.iter_mut().zip(c2.iter_mut()) {
            assert_eq!(a.random::<u64>(), b.random::<u64>());
        }
    }

    #[test]
    fn test_sample_excluding_skips_self() {
        let mut rng = create_rng(42);
        for exclude in 0..10 {
            let picked = sample_excluding(&mut rng, 10, exclude, 9);
            let set: HashSet<usize> = picked.iter().copied().collect();
            assert_eq!(set.len(), 9);
            assert!(!set.contains(&exclude));
            assert!(picked.iter().all(|&i| i < 10));
        }
    }

    #[test]
    fn test_sample_excluding_zero_amount() {
        let mut rng = create_rng(1);
        assert!(sample_excluding(&mut rng, 5, 2, 0).is_empty());
    }
}
