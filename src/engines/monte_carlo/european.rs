//! Parallel terminal-payoff estimator for European contracts.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;

use crate::core::{ExerciseStyle, Instrument, PricingEngine, PricingError, PricingResult};
use crate::engines::driver::{self, ProgressMeter, ProgressSink};
use crate::engines::monte_carlo::PathGenerator;
use crate::instruments::OptionContract;
use crate::market::MarketData;

/// Mean-discounted-terminal-payoff Monte Carlo engine.
///
/// Paths are split into per-worker chunks differing by at most one; each
/// worker owns a path generator, a reusable path buffer, and an RNG seeded
/// from its chunk index, and returns partial payoff sums. The driver
/// reduces the sums, discounts with the curve factor at maturity, and
/// reports the Monte Carlo standard error. The same seed and worker count
/// reproduce the same price.
#[derive(Clone)]
pub struct EuropeanMonteCarloEngine {
    /// Number of Monte Carlo paths.
    pub num_paths: usize,
    /// Number of time steps per path.
    pub num_steps: usize,
    /// Worker pool size for this engine's pricing calls.
    pub num_workers: usize,
    /// Base RNG seed; worker streams are derived from it.
    pub seed: u64,
    progress: Option<ProgressSink>,
}

impl EuropeanMonteCarloEngine {
    /// Default number of time steps per path.
    pub const DEFAULT_NUM_STEPS: usize = 100;

    /// Creates an engine with the default step count.
    pub fn new(num_paths: usize, num_workers: usize, seed: u64) -> Self {
        Self {
            num_paths,
            num_steps: Self::DEFAULT_NUM_STEPS,
            num_workers,
            seed,
            progress: None,
        }
    }

    /// Overrides the per-path step count.
    ///
    /// Only the terminal price enters the estimator, so a smaller count
    /// trades path resolution for speed without changing the distribution
    /// of `S_T` when rates are flat.
    pub fn with_num_steps(mut self, num_steps: usize) -> Self {
        self.num_steps = num_steps;
        self
    }

    /// Attaches an advisory progress sink.
    pub fn with_progress(mut self, sink: ProgressSink) -> Self {
        self.progress = Some(sink);
        self
    }

    fn validate_parameters(&self) -> Result<(), PricingError> {
        if self.num_paths == 0 {
            return Err(PricingError::InvalidInput(
                "num_paths must be > 0".to_string(),
            ));
        }
        if self.num_workers == 0 {
            return Err(PricingError::InvalidInput(
                "num_workers must be > 0".to_string(),
            ));
        }
        if self.num_steps == 0 {
            return Err(PricingError::InvalidInput(
                "num_steps must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl std::fmt::Debug for EuropeanMonteCarloEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EuropeanMonteCarloEngine")
            .field("num_paths", &self.num_paths)
            .field("num_steps", &self.num_steps)
            .field("num_workers", &self.num_workers)
            .field("seed", &self.seed)
            .finish_non_exhaustive()
    }
}

impl PricingEngine<OptionContract> for EuropeanMonteCarloEngine {
    fn price(
        &self,
        instrument: &OptionContract,
        market: &MarketData,
    ) -> Result<PricingResult, PricingError> {
        instrument.validate()?;
        self.validate_parameters()?;

        if !matches!(instrument.exercise, ExerciseStyle::European) {
            return Err(PricingError::UnsupportedExercise(format!(
                "terminal-payoff estimator cannot price {} contracts",
                instrument.exercise.family()
            )));
        }

        let dt = instrument.maturity / self.num_steps as f64;
        let chunks = driver::split_paths(self.num_paths, self.num_workers);
        let pool = driver::build_pool(self.num_workers)?;
        let progress = ProgressMeter::new(self.progress.clone(), self.num_paths);

        tracing::debug!(
            instrument = instrument.instrument_type(),
            num_paths = self.num_paths,
            num_workers = self.num_workers,
            "starting European simulation"
        );

        let (payoff_sum, payoff_sum_sq) = pool.install(|| {
            chunks
                .par_iter()
                .enumerate()
                .map(|(worker, &chunk)| {
                    let mut rng = StdRng::seed_from_u64(driver::chunk_seed(self.seed, worker));
                    let generator = PathGenerator::new(market);
                    let mut path = vec![0.0_f64; self.num_steps + 1];

                    let mut sum = 0.0_f64;
                    let mut sum_sq = 0.0_f64;
                    for _ in 0..chunk {
                        generator.generate_into(&mut path, dt, &mut rng);
                        let payoff = instrument.payoff(path[self.num_steps]);
                        sum += payoff;
                        sum_sq += payoff * payoff;
                    }
                    progress.add(chunk);
                    (sum, sum_sq)
                })
                .reduce(|| (0.0, 0.0), |lhs, rhs| (lhs.0 + rhs.0, lhs.1 + rhs.1))
        });

        if !payoff_sum.is_finite() {
            return Err(PricingError::WorkerFailure(
                "terminal payoff sum is not finite; a simulated path overflowed".to_string(),
            ));
        }

        let n = self.num_paths as f64;
        let mean = payoff_sum / n;
        let discount = market.curve.discount(instrument.maturity);
        let variance = if self.num_paths > 1 {
            ((payoff_sum_sq - payoff_sum * payoff_sum / n) / (n - 1.0)).max(0.0)
        } else {
            0.0
        };

        let mut diagnostics = HashMap::new();
        diagnostics.insert("num_paths".to_string(), self.num_paths as f64);
        diagnostics.insert("num_steps".to_string(), self.num_steps as f64);
        diagnostics.insert("num_workers".to_string(), self.num_workers as f64);

        Ok(PricingResult {
            price: discount * mean,
            stderr: Some(discount * (variance / n).sqrt()),
            diagnostics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rates::RateCurve;

    fn flat_market(volatility: f64) -> MarketData {
        MarketData::builder()
            .rate_curve(RateCurve::new(vec![(1.0, 0.05)]).unwrap())
            .spot(100.0)
            .volatility(volatility)
            .build()
            .unwrap()
    }

    #[test]
    fn rejects_zero_paths_and_workers() {
        let market = flat_market(0.2);
        let option = OptionContract::european_call(100.0, 1.0);

        let no_paths = EuropeanMonteCarloEngine::new(0, 2, 1);
        assert!(matches!(
            no_paths.price(&option, &market),
            Err(PricingError::InvalidInput(_))
        ));

        let no_workers = EuropeanMonteCarloEngine::new(100, 0, 1);
        assert!(matches!(
            no_workers.price(&option, &market),
            Err(PricingError::InvalidInput(_))
        ));
    }

    #[test]
    fn rejects_early_exercise_families() {
        let market = flat_market(0.2);
        let engine = EuropeanMonteCarloEngine::new(100, 2, 1);

        let american = OptionContract::american_put(100.0, 1.0);
        assert!(matches!(
            engine.price(&american, &market),
            Err(PricingError::UnsupportedExercise(_))
        ));

        let bermudan = OptionContract::bermudan_call(100.0, 1.0, vec![0.5]);
        assert!(matches!(
            engine.price(&bermudan, &market),
            Err(PricingError::UnsupportedExercise(_))
        ));
    }

    #[test]
    fn same_seed_reproduces_the_same_price() {
        let market = flat_market(0.2);
        let option = OptionContract::european_call(100.0, 1.0);
        let engine = EuropeanMonteCarloEngine::new(20_000, 4, 1234);

        let first = engine.price(&option, &market).unwrap();
        let second = engine.price(&option, &market).unwrap();
        assert_eq!(first.price, second.price);
    }

    #[test]
    fn reports_progress_up_to_completion() {
        use std::sync::{Arc, Mutex};

        let market = flat_market(0.2);
        let option = OptionContract::european_call(100.0, 1.0);

        let reported = Arc::new(Mutex::new(Vec::new()));
        let sink: ProgressSink = {
            let reported = Arc::clone(&reported);
            Arc::new(move |fraction| reported.lock().unwrap().push(fraction))
        };

        let engine = EuropeanMonteCarloEngine::new(1_000, 4, 1).with_progress(sink);
        engine.price(&option, &market).unwrap();

        let reported = reported.lock().unwrap();
        assert!(!reported.is_empty());
        assert!(reported.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(*reported.last().unwrap(), 1.0);
    }
}
