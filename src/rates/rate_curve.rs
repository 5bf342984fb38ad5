//! Piecewise-linear zero-rate term structure with flat extrapolation.

use serde::{Deserialize, Serialize};

use crate::core::PricingError;

/// Zero-rate term structure keyed by maturity tenor in years.
///
/// Nodes are `(maturity, zero_rate)` pairs sorted by maturity at
/// construction and immutable afterwards. Queries left of the first node or
/// right of the last clamp to the endpoint rate; interior queries
/// interpolate linearly in rate against maturity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateCurve {
    nodes: Vec<(f64, f64)>,
}

impl RateCurve {
    /// Creates a curve from unsorted `(maturity, zero_rate)` nodes.
    ///
    /// # Errors
    /// Returns [`PricingError::InvalidInput`] when the node set is empty,
    /// any maturity is not strictly positive, or any rate is negative.
    pub fn new(mut nodes: Vec<(f64, f64)>) -> Result<Self, PricingError> {
        if nodes.is_empty() {
            return Err(PricingError::InvalidInput(
                "rate curve cannot be empty".to_string(),
            ));
        }
        for &(maturity, rate) in &nodes {
            if !(maturity > 0.0) {
                return Err(PricingError::InvalidInput(format!(
                    "rate curve maturity must be > 0, got {maturity}"
                )));
            }
            if !(rate >= 0.0) {
                return Err(PricingError::InvalidInput(format!(
                    "rate curve rate must be >= 0, got {rate}"
                )));
            }
        }
        nodes.sort_by(|a, b| a.0.total_cmp(&b.0));
        nodes.dedup_by(|a, b| a.0 == b.0);
        Ok(Self { nodes })
    }

    /// Returns the zero rate at `maturity`.
    ///
    /// Flat-extrapolates outside the node range and interpolates linearly
    /// between bracketing nodes inside it.
    pub fn rate(&self, maturity: f64) -> f64 {
        let (first_maturity, first_rate) = self.nodes[0];
        if maturity <= first_maturity {
            return first_rate;
        }
        for window in self.nodes.windows(2) {
            let (left_maturity, left_rate) = window[0];
            let (right_maturity, right_rate) = window[1];
            if maturity <= right_maturity {
                let weight = (maturity - left_maturity) / (right_maturity - left_maturity);
                return left_rate + weight * (right_rate - left_rate);
            }
        }
        self.nodes[self.nodes.len() - 1].1
    }

    /// Returns the continuously compounded discount factor `exp(-r(t) * t)`.
    pub fn discount(&self, maturity: f64) -> f64 {
        (-self.rate(maturity) * maturity).exp()
    }

    /// Read-only view of the sorted curve nodes.
    pub fn nodes(&self) -> &[(f64, f64)] {
        &self.nodes
    }
}
