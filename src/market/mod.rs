//! Market snapshot shared by the pricing engines.

pub mod market;

pub use market::{MarketData, MarketDataBuilder};
