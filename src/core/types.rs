use serde::{Deserialize, Serialize};

/// Plain-vanilla option side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptionType {
    /// Call option payoff profile.
    Call,
    /// Put option payoff profile.
    Put,
}

impl OptionType {
    /// Immediate payoff of this side at `spot` against `strike`.
    #[inline]
    pub fn payoff(self, spot: f64, strike: f64) -> f64 {
        match self {
            Self::Call => (spot - strike).max(0.0),
            Self::Put => (strike - spot).max(0.0),
        }
    }
}

/// Exercise rights for an option contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExerciseStyle {
    /// Exercise only at maturity.
    European,
    /// Exercise at any time up to maturity.
    American,
    /// Exercise at specific interior dates (in year fractions).
    Bermudan {
        /// Exercise dates, each strictly inside `(0, maturity)`.
        dates: Vec<f64>,
    },
}

impl ExerciseStyle {
    /// Returns a short family name for diagnostics and error messages.
    pub fn family(&self) -> &'static str {
        match self {
            Self::European => "European",
            Self::American => "American",
            Self::Bermudan { .. } => "Bermudan",
        }
    }
}
