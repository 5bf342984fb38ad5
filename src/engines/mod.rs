//! Pricing engine implementations.

pub mod driver;
pub mod lsm;
pub mod monte_carlo;

pub use driver::ProgressSink;

use crate::core::{ExerciseStyle, PricingEngine, PricingError, PricingResult};
use crate::instruments::OptionContract;
use crate::market::MarketData;
use self::lsm::LongstaffSchwartzEngine;
use self::monte_carlo::EuropeanMonteCarloEngine;

/// Prices a contract with the engine matching its exercise family.
///
/// European contracts go to the terminal-payoff estimator with its default
/// step count; American and Bermudan contracts go to Longstaff-Schwartz.
///
/// # Errors
/// Surfaces the selected engine's construction and pricing errors
/// unchanged.
pub fn price(
    option: &OptionContract,
    market: &MarketData,
    num_paths: usize,
    num_workers: usize,
    seed: u64,
) -> Result<PricingResult, PricingError> {
    match option.exercise {
        ExerciseStyle::European => {
            EuropeanMonteCarloEngine::new(num_paths, num_workers, seed).price(option, market)
        }
        ExerciseStyle::American | ExerciseStyle::Bermudan { .. } => {
            LongstaffSchwartzEngine::new(num_paths, num_workers, seed).price(option, market)
        }
    }
}
