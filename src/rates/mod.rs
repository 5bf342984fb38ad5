//! Interest-rate term structure primitives.

pub mod rate_curve;

pub use rate_curve::RateCurve;
