//! Core traits, common domain types, and library-wide result/error structures.

use std::collections::HashMap;

use crate::market::MarketData;

pub mod types;

pub use types::*;

/// Common trait implemented by every priceable instrument.
pub trait Instrument: std::fmt::Debug {
    /// Returns a short type identifier for diagnostics.
    fn instrument_type(&self) -> &str;
}

/// Pricing engine abstraction over an instrument type.
pub trait PricingEngine<I: Instrument> {
    /// Prices an instrument under the provided market state.
    fn price(&self, instrument: &I, market: &MarketData) -> Result<PricingResult, PricingError>;
}

/// Unified engine result payload.
#[derive(Debug, Clone)]
pub struct PricingResult {
    /// Present value.
    pub price: f64,
    /// Monte Carlo standard error of the price estimate.
    pub stderr: Option<f64>,
    /// Engine-specific scalar diagnostics.
    pub diagnostics: HashMap<String, f64>,
}

/// Engine and model errors surfaced by the API.
///
/// Construction-time violations surface synchronously from constructors and
/// builders; pricing-time failures surface after the worker pool has joined
/// and been torn down, with no partial result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PricingError {
    /// Input validation error.
    InvalidInput(String),
    /// A required component was not supplied to a builder.
    MissingInput(String),
    /// The engine does not price this exercise family.
    UnsupportedExercise(String),
    /// A simulation task failed (overflowed paths, pool setup failure).
    WorkerFailure(String),
}

impl std::fmt::Display for PricingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            Self::MissingInput(msg) => write!(f, "missing input: {msg}"),
            Self::UnsupportedExercise(msg) => write!(f, "unsupported exercise: {msg}"),
            Self::WorkerFailure(msg) => write!(f, "worker failure: {msg}"),
        }
    }
}

impl std::error::Error for PricingError {}
