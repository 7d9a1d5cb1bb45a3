use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use crate::error::{AnalysisError, AnalysisResult};
use crate::models::Draw;
use crate::sampler::{partition, sample_batch, seeded_rng};

/// Simulated games, concatenated batch by batch in worker order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Simulation {
    draws: Vec<Draw>,
    batch_sizes: Vec<usize>,
}

impl Simulation {
    pub fn draws(&self) -> &[Draw] {
        &self.draws
    }

    pub fn batch_sizes(&self) -> &[usize] {
        &self.batch_sizes
    }

    pub fn len(&self) -> usize {
        self.draws.len()
    }

    pub fn is_empty(&self) -> bool {
        self.draws.is_empty()
    }

    /// The first `n` simulated games, clamped to what was generated.
    pub fn first(&self, n: usize) -> &[Draw] {
        &self.draws[..n.min(self.draws.len())]
    }

    pub fn sums(&self) -> Vec<u32> {
        self.draws.iter().map(Draw::sum).collect()
    }
}

/// Generates `total` games on a pool of `workers` threads.
///
/// Each worker owns its generator and its batch; with a seed, worker `i`
/// uses `seed + i` so a run can be replayed.
pub fn simulate(
    total: usize,
    workers: usize,
    seed: Option<u64>,
    show_progress: bool,
) -> AnalysisResult<Simulation> {
    let shares = partition(total, workers)?;
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .map_err(|e| AnalysisError::InvalidConfig(e.to_string()))?;

    let pb = if show_progress {
        ProgressBar::new(workers as u64)
    } else {
        ProgressBar::hidden()
    };
    if let Ok(style) = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} lotes",
    ) {
        pb.set_style(style.progress_chars("=> "));
    }

    let start = Instant::now();

    let batches: Vec<Vec<Draw>> = pool.install(|| {
        shares
            .par_iter()
            .enumerate()
            .map(|(i, &count)| {
                let mut rng = seeded_rng(seed.map(|s| s.wrapping_add(i as u64)));
                let batch = sample_batch(count, &mut rng);
                log::debug!("Lote {}/{} processado ({} jogos)", i + 1, workers, count);
                pb.inc(1);
                batch
            })
            .collect()
    });

    pb.finish_and_clear();
    log::info!(
        "{} jogos simulados em {:.2}s ({} workers)",
        total,
        start.elapsed().as_secs_f64(),
        workers
    );

    let batch_sizes = batches.iter().map(Vec::len).collect();
    let draws = batches.into_iter().flatten().collect();

    Ok(Simulation { draws, batch_sizes })
}
