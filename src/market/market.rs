//! Model-parameter bundle for the jump-diffusion dynamics.

use serde::{Deserialize, Serialize};

use crate::core::PricingError;
use crate::rates::RateCurve;

/// Immutable market snapshot used by all pricing engines.
///
/// Carries the diffusion and jump parameters of the Merton model together
/// with the zero-rate curve. Built once per pricing run through
/// [`MarketDataBuilder`] and shared read-only across workers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketData {
    /// Zero-rate term structure.
    pub curve: RateCurve,
    /// Diffusion volatility `sigma`.
    pub volatility: f64,
    /// Real-world drift `mu`, used when `risk_neutral` is false.
    pub drift: f64,
    /// Jump intensity `lambda` (expected jumps per year).
    pub jump_intensity: f64,
    /// Mean jump-size factor `gamma`, so `E[e^Y - 1] = gamma`.
    pub jump_mean: f64,
    /// Log jump-size volatility `sigma_J`.
    pub jump_volatility: f64,
    /// Initial spot price.
    pub spot: f64,
    /// Selects the pricing measure: the curve rate when true, `drift`
    /// otherwise.
    pub risk_neutral: bool,
}

impl MarketData {
    /// Starts a market data builder.
    #[inline]
    pub fn builder() -> MarketDataBuilder {
        MarketDataBuilder::default()
    }
}

/// Builder for [`MarketData`].
#[derive(Debug, Clone)]
pub struct MarketDataBuilder {
    curve: Option<RateCurve>,
    volatility: f64,
    drift: f64,
    jump_intensity: f64,
    jump_mean: f64,
    jump_volatility: f64,
    spot: Option<f64>,
    risk_neutral: bool,
}

impl MarketDataBuilder {
    /// Sets the zero-rate curve (required).
    pub fn rate_curve(mut self, curve: RateCurve) -> Self {
        self.curve = Some(curve);
        self
    }

    /// Sets the diffusion volatility `sigma`.
    #[inline]
    pub fn volatility(mut self, volatility: f64) -> Self {
        self.volatility = volatility;
        self
    }

    /// Sets the real-world drift `mu`.
    #[inline]
    pub fn drift(mut self, drift: f64) -> Self {
        self.drift = drift;
        self.risk_neutral = false;
        self
    }

    /// Sets the jump intensity `lambda`.
    #[inline]
    pub fn jump_intensity(mut self, jump_intensity: f64) -> Self {
        self.jump_intensity = jump_intensity;
        self
    }

    /// Sets the mean jump-size factor `gamma`.
    #[inline]
    pub fn jump_mean(mut self, jump_mean: f64) -> Self {
        self.jump_mean = jump_mean;
        self
    }

    /// Sets the log jump-size volatility `sigma_J`.
    #[inline]
    pub fn jump_volatility(mut self, jump_volatility: f64) -> Self {
        self.jump_volatility = jump_volatility;
        self
    }

    /// Sets the initial spot price (required).
    #[inline]
    pub fn spot(mut self, spot: f64) -> Self {
        self.spot = Some(spot);
        self
    }

    /// Selects the pricing measure explicitly.
    #[inline]
    pub fn risk_neutral(mut self, risk_neutral: bool) -> Self {
        self.risk_neutral = risk_neutral;
        self
    }

    /// Validates and builds a [`MarketData`].
    ///
    /// # Errors
    /// Returns [`PricingError::MissingInput`] when the spot or the rate
    /// curve was never supplied, and [`PricingError::InvalidInput`] when a
    /// parameter lies outside its domain (`sigma < 0`, `lambda < 0`,
    /// `gamma < 0`, `sigma_J < 0`, `spot <= 0`). The drift `mu` is
    /// unconstrained.
    pub fn build(self) -> Result<MarketData, PricingError> {
        let curve = self
            .curve
            .ok_or_else(|| PricingError::MissingInput("rate curve is required".to_string()))?;
        let spot = self
            .spot
            .ok_or_else(|| PricingError::MissingInput("spot price is required".to_string()))?;

        if !(spot > 0.0) {
            return Err(PricingError::InvalidInput(format!(
                "spot must be > 0, got {spot}"
            )));
        }
        if !(self.volatility >= 0.0) {
            return Err(PricingError::InvalidInput(format!(
                "volatility must be >= 0, got {}",
                self.volatility
            )));
        }
        if !(self.jump_intensity >= 0.0) {
            return Err(PricingError::InvalidInput(format!(
                "jump intensity must be >= 0, got {}",
                self.jump_intensity
            )));
        }
        if !(self.jump_mean >= 0.0) {
            return Err(PricingError::InvalidInput(format!(
                "jump mean must be >= 0, got {}",
                self.jump_mean
            )));
        }
        if !(self.jump_volatility >= 0.0) {
            return Err(PricingError::InvalidInput(format!(
                "jump volatility must be >= 0, got {}",
                self.jump_volatility
            )));
        }

        Ok(MarketData {
            curve,
            volatility: self.volatility,
            drift: self.drift,
            jump_intensity: self.jump_intensity,
            jump_mean: self.jump_mean,
            jump_volatility: self.jump_volatility,
            spot,
            risk_neutral: self.risk_neutral,
        })
    }
}

impl Default for MarketDataBuilder {
    fn default() -> Self {
        Self {
            curve: None,
            volatility: 0.0,
            drift: 0.0,
            jump_intensity: 0.0,
            jump_mean: 0.0,
            jump_volatility: 0.0,
            spot: None,
            risk_neutral: true,
        }
    }
}
