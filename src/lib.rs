//! Monte Carlo pricing of single-asset equity options under a Merton-style
//! jump-diffusion model: geometric Brownian motion augmented by a compound
//! Poisson process with log-normal jump sizes.
//!
//! The crate covers three exercise families under one contract type:
//! European options are priced as the mean discounted terminal payoff,
//! while American and Bermudan options go through Longstaff-Schwartz
//! least-squares Monte Carlo with a quadratic continuation-value basis.
//! Both estimators split their paths across a worker pool sized per call,
//! with every worker owning its own path generator and seeded RNG.
//!
//! References used across modules:
//! - Merton (1976) for the jump-diffusion dynamics and drift compensator.
//! - Longstaff and Schwartz (2001) for regression-based early exercise.
//! - Glasserman (2004) for Monte Carlo estimators and error bars.
//!
//! Numerical considerations:
//! - Paths are advanced in log-space with an Euler-Maruyama step applied to
//!   `ln S`, so the update is multiplicative and stays positive.
//! - Per-step jump counts use Knuth's multiplicative Poisson sampler, which
//!   is intended for the small `lambda * dt` regime of equity jump models.
//! - Estimator standard error is reported alongside the price; confidence
//!   scales with the path count, not the step count.
//!
//! # Quick Start
//! Price a European call under flat rates with no jumps:
//! ```rust
//! use mertonmc::core::PricingEngine;
//! use mertonmc::engines::monte_carlo::EuropeanMonteCarloEngine;
//! use mertonmc::instruments::OptionContract;
//! use mertonmc::market::MarketData;
//! use mertonmc::rates::RateCurve;
//!
//! let curve = RateCurve::new(vec![(1.0, 0.05)]).unwrap();
//! let market = MarketData::builder()
//!     .rate_curve(curve)
//!     .spot(100.0)
//!     .volatility(0.2)
//!     .build()
//!     .unwrap();
//!
//! let option = OptionContract::european_call(100.0, 1.0);
//! let engine = EuropeanMonteCarloEngine::new(20_000, 2, 42);
//! let result = engine.price(&option, &market).unwrap();
//! assert!(result.price > 8.0 && result.price < 13.0);
//! ```
//!
//! Price an American put with the same market through the family dispatch:
//! ```rust
//! use mertonmc::engines;
//! use mertonmc::instruments::OptionContract;
//! use mertonmc::market::MarketData;
//! use mertonmc::rates::RateCurve;
//!
//! let curve = RateCurve::new(vec![(1.0, 0.05)]).unwrap();
//! let market = MarketData::builder()
//!     .rate_curve(curve)
//!     .spot(100.0)
//!     .volatility(0.2)
//!     .build()
//!     .unwrap();
//!
//! let put = OptionContract::american_put(100.0, 1.0);
//! let result = engines::price(&put, &market, 10_000, 2, 7).unwrap();
//! assert!(result.price.is_finite() && result.price >= 0.0);
//! ```

pub mod core;
pub mod engines;
pub mod instruments;
pub mod market;
pub mod rates;

/// Common imports for ergonomic usage.
pub mod prelude {
    pub use crate::core::*;
    pub use crate::engines::lsm::LongstaffSchwartzEngine;
    pub use crate::engines::monte_carlo::{EuropeanMonteCarloEngine, PathGenerator};
    pub use crate::engines::ProgressSink;
    pub use crate::instruments::OptionContract;
    pub use crate::market::{MarketData, MarketDataBuilder};
    pub use crate::rates::RateCurve;
}
