//! Longstaff-Schwartz least-squares Monte Carlo for early-exercisable
//! contracts.
//!
//! Paths are generated in parallel into disjoint row ranges of a dense
//! price matrix; backward induction then runs on a single thread, fitting
//! continuation values on the basis `{1, S, S^2}` over the in-the-money
//! subset at each exercise step.

use std::collections::HashMap;

use nalgebra::{DMatrix, DVector};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;

use crate::core::{ExerciseStyle, PricingEngine, PricingError, PricingResult};
use crate::engines::driver::{self, ProgressMeter, ProgressSink};
use crate::engines::monte_carlo::PathGenerator;
use crate::instruments::OptionContract;
use crate::market::MarketData;

/// Longstaff-Schwartz engine for American and Bermudan contracts.
///
/// American contracts may exercise at every discrete step; Bermudan
/// contract dates snap to the nearest step, with duplicates collapsed.
/// The same seed and worker count reproduce the same price.
#[derive(Clone)]
pub struct LongstaffSchwartzEngine {
    /// Number of Monte Carlo paths.
    pub num_paths: usize,
    /// Number of time steps per path.
    pub num_steps: usize,
    /// Worker pool size for path generation.
    pub num_workers: usize,
    /// Base RNG seed; worker streams are derived from it.
    pub seed: u64,
    progress: Option<ProgressSink>,
}

impl LongstaffSchwartzEngine {
    /// Default number of time steps per path.
    pub const DEFAULT_NUM_STEPS: usize = 50;

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
    pub fn with_num_steps(mut self, num_steps: usize) -> Self {
        self.num_steps = num_steps;
        self
    }

    /// Attaches an advisory progress sink covering path generation.
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
        if self.num_steps < 2 {
            return Err(PricingError::InvalidInput(
                "num_steps must be >= 2 for backward induction".to_string(),
            ));
        }
        Ok(())
    }

    /// Builds the exercisable-step mask over `1..=num_steps`.
    fn exercise_steps(
        &self,
        instrument: &OptionContract,
        dt: f64,
    ) -> Result<Vec<bool>, PricingError> {
        let mut exercisable = vec![false; self.num_steps + 1];
        match &instrument.exercise {
            ExerciseStyle::European => {
                return Err(PricingError::UnsupportedExercise(
                    "European contracts are priced by the terminal-payoff estimator".to_string(),
                ));
            }
            ExerciseStyle::American => {
                for flag in exercisable.iter_mut().skip(1) {
                    *flag = true;
                }
            }
            ExerciseStyle::Bermudan { dates } => {
                for &date in dates {
                    let step = (date / dt).round() as usize;
                    if (1..=self.num_steps).contains(&step) {
                        exercisable[step] = true;
                    }
                }
            }
        }
        Ok(exercisable)
    }
}

impl std::fmt::Debug for LongstaffSchwartzEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LongstaffSchwartzEngine")
            .field("num_paths", &self.num_paths)
            .field("num_steps", &self.num_steps)
            .field("num_workers", &self.num_workers)
            .field("seed", &self.seed)
            .finish_non_exhaustive()
    }
}

impl PricingEngine<OptionContract> for LongstaffSchwartzEngine {
    fn price(
        &self,
        instrument: &OptionContract,
        market: &MarketData,
    ) -> Result<PricingResult, PricingError> {
        instrument.validate()?;
        self.validate_parameters()?;

        let n = self.num_paths;
        let m = self.num_steps;
        let row_len = m + 1;
        let dt = instrument.maturity / m as f64;
        let exercisable = self.exercise_steps(instrument, dt)?;

        // Phase 1: generate all paths into disjoint row ranges of one
        // dense row-major matrix. Each worker owns its slice, generator,
        // and RNG; the join below publishes the writes to this thread.
        let mut prices = vec![0.0_f64; n * row_len];
        let chunks = driver::split_paths(n, self.num_workers);
        let pool = driver::build_pool(self.num_workers)?;
        let progress = ProgressMeter::new(self.progress.clone(), n);

        tracing::debug!(
            num_paths = n,
            num_steps = m,
            num_workers = self.num_workers,
            family = instrument.exercise.family(),
            "starting least-squares Monte Carlo simulation"
        );

        let mut row_ranges: Vec<&mut [f64]> = Vec::with_capacity(chunks.len());
        let mut rest = prices.as_mut_slice();
        for &chunk in &chunks {
            let (head, tail) = rest.split_at_mut(chunk * row_len);
            row_ranges.push(head);
            rest = tail;
        }

        pool.install(|| {
            row_ranges
                .into_par_iter()
                .enumerate()
                .for_each(|(worker, range)| {
                    let rows = range.len() / row_len;
                    let mut rng = StdRng::seed_from_u64(driver::chunk_seed(self.seed, worker));
                    let generator = PathGenerator::new(market);
                    for row in range.chunks_exact_mut(row_len) {
                        generator.generate_into(row, dt, &mut rng);
                    }
                    progress.add(rows);
                });
        });
        drop(pool);

        if prices.iter().any(|price| !price.is_finite()) {
            return Err(PricingError::WorkerFailure(
                "simulated price matrix contains non-finite values".to_string(),
            ));
        }

        // Phase 2: terminal cash flows.
        let mut cash_flows = vec![0.0_f64; n * row_len];
        for i in 0..n {
            cash_flows[i * row_len + m] = instrument.payoff(prices[i * row_len + m]);
        }

        // Phase 3: backward induction on this thread.
        let mut itm_rows: Vec<usize> = Vec::new();
        for t in (1..m).rev() {
            let rate = market.curve.rate(t as f64 * dt);
            let discount = (-rate * dt).exp();

            if !exercisable[t] {
                for i in 0..n {
                    cash_flows[i * row_len + t] = cash_flows[i * row_len + t + 1] * discount;
                }
                continue;
            }

            itm_rows.clear();
            for i in 0..n {
                if instrument.payoff(prices[i * row_len + t]) > 0.0 {
                    itm_rows.push(i);
                }
            }

            if itm_rows.is_empty() {
                for i in 0..n {
                    cash_flows[i * row_len + t] = cash_flows[i * row_len + t + 1] * discount;
                }
                continue;
            }

            let beta =
                regress_continuation(&prices, &cash_flows, &itm_rows, t, row_len, discount);

            for i in 0..n {
                let spot = prices[i * row_len + t];
                let immediate = instrument.payoff(spot);
                if immediate > 0.0 {
                    let continuation = beta[0] + beta[1] * spot + beta[2] * spot * spot;
                    if immediate >= continuation {
                        cash_flows[i * row_len + t] = immediate;
                        for cell in &mut cash_flows[i * row_len + t + 1..i * row_len + m + 1] {
                            *cell = 0.0;
                        }
                        continue;
                    }
                }
                cash_flows[i * row_len + t] = cash_flows[i * row_len + t + 1] * discount;
            }
        }

        // Phase 4: one further step discount from the first step back to
        // valuation, at the flat-extrapolated short rate.
        let initial_discount = (-market.curve.rate(0.0) * dt).exp();
        let mut sum = 0.0_f64;
        let mut sum_sq = 0.0_f64;
        for i in 0..n {
            let value = cash_flows[i * row_len + 1] * initial_discount;
            sum += value;
            sum_sq += value * value;
        }

        let n_f = n as f64;
        let mean = sum / n_f;
        let variance = if n > 1 {
            ((sum_sq - sum * sum / n_f) / (n_f - 1.0)).max(0.0)
        } else {
            0.0
        };

        let mut diagnostics = HashMap::new();
        diagnostics.insert("num_paths".to_string(), n as f64);
        diagnostics.insert("num_steps".to_string(), m as f64);
        diagnostics.insert("num_workers".to_string(), self.num_workers as f64);
        diagnostics.insert(
            "num_exercise_steps".to_string(),
            exercisable.iter().filter(|&&flag| flag).count() as f64,
        );

        Ok(PricingResult {
            price: mean,
            stderr: Some((variance / n_f).sqrt()),
            diagnostics,
        })
    }
}

/// Fits the continuation value on `{1, S, S^2}` over the in-the-money rows.
///
/// The response is next-step cash flow discounted one step. A singular
/// normal system (constant spots, too few points) falls back to all-zero
/// coefficients; the decision rule then compares immediate payoff against
/// zero at this step.
fn regress_continuation(
    prices: &[f64],
    cash_flows: &[f64],
    itm_rows: &[usize],
    t: usize,
    row_len: usize,
    discount: f64,
) -> [f64; 3] {
    let mut x = DMatrix::<f64>::zeros(itm_rows.len(), 3);
    let mut y = DVector::<f64>::zeros(itm_rows.len());
    for (row, &i) in itm_rows.iter().enumerate() {
        let spot = prices[i * row_len + t];
        x[(row, 0)] = 1.0;
        x[(row, 1)] = spot;
        x[(row, 2)] = spot * spot;
        y[row] = cash_flows[i * row_len + t + 1] * discount;
    }

    let xtx = x.transpose() * &x;
    let xty = x.transpose() * &y;
    match xtx.lu().solve(&xty) {
        Some(beta) => [beta[0], beta[1], beta[2]],
        None => {
            tracing::debug!(
                step = t,
                in_the_money = itm_rows.len(),
                "continuation regression degenerate, using zero coefficients"
            );
            [0.0, 0.0, 0.0]
        }
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
    fn rejects_european_contracts() {
        let market = flat_market(0.2);
        let engine = LongstaffSchwartzEngine::new(1_000, 2, 1);
        let european = OptionContract::european_put(100.0, 1.0);
        assert!(matches!(
            engine.price(&european, &market),
            Err(PricingError::UnsupportedExercise(_))
        ));
    }

    #[test]
    fn rejects_degenerate_parameters() {
        let market = flat_market(0.2);
        let put = OptionContract::american_put(100.0, 1.0);

        assert!(matches!(
            LongstaffSchwartzEngine::new(0, 2, 1).price(&put, &market),
            Err(PricingError::InvalidInput(_))
        ));
        assert!(matches!(
            LongstaffSchwartzEngine::new(1_000, 0, 1).price(&put, &market),
            Err(PricingError::InvalidInput(_))
        ));
        assert!(matches!(
            LongstaffSchwartzEngine::new(1_000, 2, 1)
                .with_num_steps(1)
                .price(&put, &market),
            Err(PricingError::InvalidInput(_))
        ));
    }

    #[test]
    fn bermudan_dates_snap_to_nearest_steps_without_duplicates() {
        let engine = LongstaffSchwartzEngine::new(10, 1, 1).with_num_steps(10);
        let contract =
            OptionContract::bermudan_put(100.0, 1.0, vec![0.31, 0.29, 0.52, 0.94]);
        let dt = 1.0 / 10.0;

        let mask = engine.exercise_steps(&contract, dt).unwrap();
        let steps: Vec<usize> = (0..mask.len()).filter(|&s| mask[s]).collect();
        // 0.31 and 0.29 both snap to step 3.
        assert_eq!(steps, vec![3, 5, 9]);
    }

    #[test]
    fn american_mask_covers_every_step() {
        let engine = LongstaffSchwartzEngine::new(10, 1, 1).with_num_steps(5);
        let contract = OptionContract::american_put(100.0, 1.0);
        let mask = engine.exercise_steps(&contract, 0.2).unwrap();
        assert_eq!(mask, vec![false, true, true, true, true, true]);
    }

    #[test]
    fn same_seed_reproduces_the_same_price() {
        let market = flat_market(0.2);
        let put = OptionContract::american_put(100.0, 1.0);
        let engine = LongstaffSchwartzEngine::new(10_000, 4, 77);

        let first = engine.price(&put, &market).unwrap();
        let second = engine.price(&put, &market).unwrap();
        assert_eq!(first.price, second.price);
    }

    #[test]
    fn price_is_finite_and_non_negative() {
        let market = flat_market(0.4);
        let engine = LongstaffSchwartzEngine::new(5_000, 3, 9);

        for contract in [
            OptionContract::american_put(100.0, 1.0),
            OptionContract::american_call(100.0, 1.0),
            OptionContract::bermudan_put(100.0, 1.0, vec![0.25, 0.5, 0.75]),
        ] {
            let result = engine.price(&contract, &market).unwrap();
            assert!(result.price.is_finite());
            assert!(result.price >= 0.0);
        }
    }

    #[test]
    fn degenerate_regression_falls_back_to_zero_coefficients() {
        // Identical spots across rows make the design matrix rank one; a
        // power-of-two spot keeps the elimination exact so the normal
        // system is detected as singular rather than merely ill-conditioned.
        let row_len = 3;
        let prices = vec![128.0; 4 * row_len];
        let cash_flows = vec![1.0; 4 * row_len];
        let itm_rows = vec![0, 1, 2, 3];

        let beta = regress_continuation(&prices, &cash_flows, &itm_rows, 1, row_len, 0.5);
        assert_eq!(beta, [0.0, 0.0, 0.0]);
    }
}
