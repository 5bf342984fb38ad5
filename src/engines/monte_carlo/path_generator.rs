//! Euler-Maruyama discretisation of the Merton jump-diffusion SDE in
//! log-price.
//!
//! Each step adds a drift term, a Brownian increment, and a compound
//! Poisson sum of log-normal jump sizes:
//!
//! ```text
//! d ln S = theta_i dt + sigma sqrt(dt) Z + sum_{j=1..N} Y_j
//! theta_i = (r(t_i) | mu) - lambda gamma - sigma^2 / 2
//! Y_j ~ N(ln(1 + gamma) - sigma_J^2 / 2, sigma_J^2),  N ~ Poisson(lambda dt)
//! ```
//!
//! With `kappa = gamma` the compensator `lambda * gamma` makes the
//! discounted asset a martingale on the risk-neutral measure.

use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

use crate::market::MarketData;

/// Single-trajectory generator for the discretised jump-diffusion model.
///
/// One generator belongs to exactly one worker, paired with that worker's
/// RNG; neither is ever shared across threads. Overflow of the price state
/// is not guarded here; the driving engine rejects non-finite aggregates.
#[derive(Debug, Clone, Copy)]
pub struct PathGenerator<'a> {
    market: &'a MarketData,
    /// Mean log jump size `ln(1 + gamma) - sigma_J^2 / 2`.
    jump_log_mean: f64,
    /// State-independent drift adjustment `-lambda gamma - sigma^2 / 2`.
    drift_adjustment: f64,
}

impl<'a> PathGenerator<'a> {
    /// Creates a generator for the given market snapshot.
    pub fn new(market: &'a MarketData) -> Self {
        let jump_log_mean = (1.0 + market.jump_mean).ln()
            - 0.5 * market.jump_volatility * market.jump_volatility;
        let drift_adjustment = -market.jump_intensity * market.jump_mean
            - 0.5 * market.volatility * market.volatility;
        Self {
            market,
            jump_log_mean,
            drift_adjustment,
        }
    }

    /// Fills `path` with one simulated trajectory.
    ///
    /// `path[0]` is the spot; entry `i` holds the price at `i * dt` years.
    pub fn generate_into<R: Rng + ?Sized>(&self, path: &mut [f64], dt: f64, rng: &mut R) {
        let sqrt_dt = dt.sqrt();
        let lambda_dt = self.market.jump_intensity * dt;

        let mut price = self.market.spot;
        path[0] = price;

        for (i, slot) in path.iter_mut().enumerate().skip(1) {
            let t = i as f64 * dt;
            let base_drift = if self.market.risk_neutral {
                self.market.curve.rate(t)
            } else {
                self.market.drift
            };
            let theta = base_drift + self.drift_adjustment;

            let z: f64 = StandardNormal.sample(rng);
            let mut d_log_price = theta * dt + self.market.volatility * sqrt_dt * z;

            if lambda_dt > 0.0 {
                let jumps = sample_poisson(lambda_dt, rng);
                for _ in 0..jumps {
                    let zj: f64 = StandardNormal.sample(rng);
                    d_log_price += self.jump_log_mean + self.market.jump_volatility * zj;
                }
            }

            price *= d_log_price.exp();
            *slot = price;
        }
    }
}

/// Knuth's multiplicative Poisson sampler.
///
/// Expected iteration count grows linearly with `lambda_dt`, so this is
/// only suitable for the small per-step intensities the path generator
/// produces; non-positive intensities draw nothing.
pub(crate) fn sample_poisson<R: Rng + ?Sized>(lambda_dt: f64, rng: &mut R) -> u32 {
    if lambda_dt <= 0.0 {
        return 0;
    }
    let limit = (-lambda_dt).exp();
    let mut count = 0_u32;
    let mut product = 1.0_f64;
    loop {
        product *= rng.gen::<f64>();
        if product <= limit {
            return count;
        }
        count += 1;
    }
}
