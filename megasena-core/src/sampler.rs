use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::index;

use crate::error::{AnalysisError, AnalysisResult};
use crate::models::{Draw, PICK_COUNT, POOL_SIZE};

/// Worker count used when the host does not report its parallelism.
pub const FALLBACK_WORKERS: usize = 4;

/// Generator for a run: fixed seed when given, otherwise seeded from OS entropy.
///
/// `StdRng` is ChaCha12, so the unseeded path is a CSPRNG that cannot be
/// predicted from earlier output.
pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_rng(&mut rand::rng()),
    }
}

/// Picks 6 distinct numbers uniformly from 1..=60 (sampling without replacement).
pub fn sample_draw<R: Rng + ?Sized>(rng: &mut R) -> Draw {
    let picked = index::sample(rng, POOL_SIZE as usize, PICK_COUNT);
    let mut numbers = [0u8; PICK_COUNT];
    for (slot, idx) in numbers.iter_mut().zip(picked.iter()) {
        *slot = (idx + 1) as u8;
    }
    numbers.sort_unstable();
    Draw::from_sorted_unchecked(numbers)
}

pub fn sample_batch<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<Draw> {
    (0..count).map(|_| sample_draw(rng)).collect()
}

/// Splits `total` into `workers` shares of `total / workers`, the remainder
/// going to the last share.
pub fn partition(total: usize, workers: usize) -> AnalysisResult<Vec<usize>> {
    if workers == 0 {
        return Err(AnalysisError::InvalidConfig(
            "número de workers deve ser >= 1".into(),
        ));
    }
    let mut shares = vec![total / workers; workers];
    if let Some(last) = shares.last_mut() {
        *last += total % workers;
    }
    Ok(shares)
}

pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(FALLBACK_WORKERS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_valid(draw: &Draw) {
        let numbers = draw.numbers();
        assert_eq!(numbers.len(), 6);
        for &n in numbers {
            assert!((1..=60).contains(&n), "out of range: {}", n);
        }
        for w in numbers.windows(2) {
            assert!(w[0] < w[1], "not strictly increasing: {:?}", numbers);
        }
    }

    #[test]
    fn test_sample_draw_invariants() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..10_000 {
            assert_valid(&sample_draw(&mut rng));
        }
    }

    #[test]
    fn test_sample_draw_entropy_source() {
        let mut rng = seeded_rng(None);
        for _ in 0..1_000 {
            assert_valid(&sample_draw(&mut rng));
        }
    }

    #[test]
    fn test_sample_batch_count() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(sample_batch(250, &mut rng).len(), 250);
        assert!(sample_batch(0, &mut rng).is_empty());
    }

    #[test]
    fn test_seeded_rng_reproducible() {
        let a = sample_batch(20, &mut seeded_rng(Some(2024)));
        let b = sample_batch(20, &mut seeded_rng(Some(2024)));
        assert_eq!(a, b);
    }

    #[test]
    fn test_sample_draw_roughly_uniform() {
        let mut rng = StdRng::seed_from_u64(99);
        let mut counts = [0u32; 60];
        for draw in sample_batch(60_000, &mut rng) {
            for &n in draw.numbers() {
                counts[(n - 1) as usize] += 1;
            }
        }
        // 6000 expected per number
        for (i, &c) in counts.iter().enumerate() {
            assert!((5_500..=6_500).contains(&c), "number {} drawn {} times", i + 1, c);
        }
    }

    #[test]
    fn test_partition_exact_division() {
        assert_eq!(partition(100, 4).unwrap(), vec![25, 25, 25, 25]);
    }

    #[test]
    fn test_partition_remainder_on_last() {
        let shares = partition(1_000_003, 8).unwrap();
        assert_eq!(shares.len(), 8);
        assert_eq!(shares.iter().sum::<usize>(), 1_000_003);
        assert_eq!(shares[0], 125_000);
        assert_eq!(shares[7], 125_003);
    }

    #[test]
    fn test_partition_fewer_draws_than_workers() {
        let shares = partition(3, 5).unwrap();
        assert_eq!(shares, vec![0, 0, 0, 0, 3]);
    }

    #[test]
    fn test_partition_zero_workers() {
        assert!(partition(10, 0).is_err());
    }

    #[test]
    fn test_default_workers_positive() {
        assert!(default_workers() >= 1);
    }
}
