//! Vanilla option contract covering the three exercise families.
//!
//! [`OptionContract`] stores side, strike, maturity, and exercise rights
//! ([`crate::core::ExerciseStyle`]: European/American/Bermudan). Validation
//! enforces a strictly positive strike and maturity and, for Bermudan
//! contracts, a non-empty exercise-date set strictly inside `(0, maturity)`.

use serde::{Deserialize, Serialize};

use crate::core::{ExerciseStyle, Instrument, OptionType, PricingError};

/// Vanilla option contract.
///
/// # Examples
/// ```
/// use mertonmc::core::{ExerciseStyle, OptionType};
/// use mertonmc::instruments::OptionContract;
///
/// let option = OptionContract {
///     option_type: OptionType::Call,
///     strike: 100.0,
///     maturity: 1.0,
///     exercise: ExerciseStyle::European,
/// };
/// assert!(option.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionContract {
    /// Call or put.
    pub option_type: OptionType,
    /// Strike level.
    pub strike: f64,
    /// Maturity in years.
    pub maturity: f64,
    /// Exercise rights.
    pub exercise: ExerciseStyle,
}

impl OptionContract {
    /// Builds a European call option.
    pub fn european_call(strike: f64, maturity: f64) -> Self {
        Self {
            option_type: OptionType::Call,
            strike,
            maturity,
            exercise: ExerciseStyle::European,
        }
    }

    /// Builds a European put option.
    pub fn european_put(strike: f64, maturity: f64) -> Self {
        Self {
            option_type: OptionType::Put,
            strike,
            maturity,
            exercise: ExerciseStyle::European,
        }
    }

    /// Builds an American call option.
    pub fn american_call(strike: f64, maturity: f64) -> Self {
        Self {
            option_type: OptionType::Call,
            strike,
            maturity,
            exercise: ExerciseStyle::American,
        }
    }

    /// Builds an American put option.
    pub fn american_put(strike: f64, maturity: f64) -> Self {
        Self {
            option_type: OptionType::Put,
            strike,
            maturity,
            exercise: ExerciseStyle::American,
        }
    }

    /// Builds a Bermudan call option with interior exercise dates.
    pub fn bermudan_call(strike: f64, maturity: f64, dates: Vec<f64>) -> Self {
        Self {
            option_type: OptionType::Call,
            strike,
            maturity,
            exercise: ExerciseStyle::Bermudan { dates },
        }
    }

    /// Builds a Bermudan put option with interior exercise dates.
    pub fn bermudan_put(strike: f64, maturity: f64, dates: Vec<f64>) -> Self {
        Self {
            option_type: OptionType::Put,
            strike,
            maturity,
            exercise: ExerciseStyle::Bermudan { dates },
        }
    }

    /// Immediate payoff of the contract at `spot`.
    #[inline]
    pub fn payoff(&self, spot: f64) -> f64 {
        self.option_type.payoff(spot, self.strike)
    }

    /// Validates contract fields.
    ///
    /// # Errors
    /// Returns [`PricingError::InvalidInput`] when:
    /// - `strike <= 0`
    /// - `maturity <= 0`
    /// - the Bermudan exercise-date set is empty or any date lies outside
    ///   the open interval `(0, maturity)`
    pub fn validate(&self) -> Result<(), PricingError> {
        if !(self.strike > 0.0) {
            return Err(PricingError::InvalidInput(format!(
                "strike must be > 0, got {}",
                self.strike
            )));
        }
        if !(self.maturity > 0.0) {
            return Err(PricingError::InvalidInput(format!(
                "maturity must be > 0, got {}",
                self.maturity
            )));
        }

        if let ExerciseStyle::Bermudan { dates } = &self.exercise {
            if dates.is_empty() {
                return Err(PricingError::InvalidInput(
                    "bermudan exercise dates cannot be empty".to_string(),
                ));
            }
            if dates.iter().any(|&d| !(d > 0.0) || d >= self.maturity) {
                return Err(PricingError::InvalidInput(format!(
                    "bermudan exercise dates must lie strictly inside (0, {})",
                    self.maturity
                )));
            }
        }

        Ok(())
    }
}

impl Instrument for OptionContract {
    fn instrument_type(&self) -> &str {
        "OptionContract"
    }
}
