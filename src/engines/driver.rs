//! Worker-pool plumbing shared by the Monte Carlo engines.
//!
//! A pool is built per pricing call and dropped with it; chunk splitting
//! keeps per-worker path counts within one of each other, and chunk seeds
//! give every worker an independent RNG stream derived from the engine
//! seed.

use std::sync::{Arc, Mutex};

use crate::core::PricingError;

/// Advisory progress callback receiving a monotone fraction in `[0, 1]`.
pub type ProgressSink = Arc<dyn Fn(f64) + Send + Sync>;

/// Splits `n_paths` into `n_chunks` counts differing by at most one.
pub(crate) fn split_paths(n_paths: usize, n_chunks: usize) -> Vec<usize> {
    let chunks = n_chunks.max(1);
    let base = n_paths / chunks;
    let rem = n_paths % chunks;
    (0..chunks)
        .map(|i| if i < rem { base + 1 } else { base })
        .filter(|&n| n > 0)
        .collect()
}

/// Derives an independent per-worker seed from the engine seed.
pub(crate) fn chunk_seed(seed: u64, chunk_index: usize) -> u64 {
    seed.wrapping_add((chunk_index as u64).wrapping_mul(6_364_136_223_846_793_005))
}

/// Builds the per-call worker pool.
pub(crate) fn build_pool(num_workers: usize) -> Result<rayon::ThreadPool, PricingError> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_workers)
        .build()
        .map_err(|e| PricingError::WorkerFailure(format!("failed to build worker pool: {e}")))
}

/// Monotone progress reporter over a known amount of work.
///
/// Workers report completed path counts; the sink sees the cumulative
/// fraction, serialized under a lock so reported values never decrease.
pub(crate) struct ProgressMeter {
    sink: Option<ProgressSink>,
    total: f64,
    completed: Mutex<f64>,
}

impl ProgressMeter {
    pub(crate) fn new(sink: Option<ProgressSink>, total_paths: usize) -> Self {
        Self {
            sink,
            total: total_paths.max(1) as f64,
            completed: Mutex::new(0.0),
        }
    }

    pub(crate) fn add(&self, paths: usize) {
        let Some(sink) = &self.sink else {
            return;
        };
        let mut completed = match self.completed.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *completed += paths as f64;
        sink((*completed / self.total).min(1.0));
    }
}
