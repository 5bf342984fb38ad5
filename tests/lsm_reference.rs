//! Longstaff-Schwartz reference tests
//!
//! American and Bermudan prices are checked against their European
//! counterparts and against standard reference values for the flat-rate,
//! no-jump special case. Tolerances are wider than the European tests
//! because the regression step adds its own (small) bias.

use mertonmc::core::PricingEngine;
use mertonmc::engines;
use mertonmc::engines::lsm::LongstaffSchwartzEngine;
use mertonmc::engines::monte_carlo::EuropeanMonteCarloEngine;
use mertonmc::instruments::OptionContract;
use mertonmc::market::MarketData;
use mertonmc::rates::RateCurve;

fn flat_market(rate: f64, volatility: f64) -> MarketData {
    MarketData::builder()
        .rate_curve(RateCurve::new(vec![(1.0, rate)]).unwrap())
        .spot(100.0)
        .volatility(volatility)
        .build()
        .unwrap()
}

// ============================================================================
// American put, S=K=100, r=0.05, sigma=0.20, T=1
// Reference value ~6.09 (binomial/PDE benchmarks)
// ============================================================================

#[test]
fn test_american_put_reference_value() {
    let market = flat_market(0.05, 0.20);
    let put = OptionContract::american_put(100.0, 1.0);
    let engine = LongstaffSchwartzEngine::new(100_000, 4, 42);

    let result = engine.price(&put, &market).unwrap();
    let error = (result.price - 6.09).abs();

    assert!(
        error <= 0.30,
        "American put should be near 6.09: got={:.4} err={:.4}",
        result.price,
        error
    );
}

#[test]
fn test_american_put_dominates_european_put() {
    let market = flat_market(0.05, 0.20);

    let american = LongstaffSchwartzEngine::new(100_000, 4, 42)
        .price(&OptionContract::american_put(100.0, 1.0), &market)
        .unwrap()
        .price;
    let european = EuropeanMonteCarloEngine::new(100_000, 4, 42)
        .price(&OptionContract::european_put(100.0, 1.0), &market)
        .unwrap()
        .price;

    assert!(
        american >= european - 0.05,
        "early exercise right cannot lose value: american={american:.4} european={european:.4}"
    );
    // At a 5% short rate the premium is material, not noise-sized.
    assert!(
        american - european > 0.2,
        "early exercise premium looks too small: american={american:.4} european={european:.4}"
    );
}

// ============================================================================
// Bermudan bracketing: European <= Bermudan <= American (within MC noise)
// ============================================================================

#[test]
fn test_bermudan_call_is_bracketed_by_european_and_american() {
    let market = flat_market(0.05, 0.20);
    let strike = 100.0;

    let european = EuropeanMonteCarloEngine::new(100_000, 4, 42)
        .price(&OptionContract::european_call(strike, 1.0), &market)
        .unwrap()
        .price;

    let lsm = LongstaffSchwartzEngine::new(100_000, 4, 42);
    let bermudan = lsm
        .price(
            &OptionContract::bermudan_call(strike, 1.0, vec![0.5, 0.75]),
            &market,
        )
        .unwrap()
        .price;
    let american = lsm
        .price(&OptionContract::american_call(strike, 1.0), &market)
        .unwrap()
        .price;

    assert!(bermudan.is_finite() && bermudan > 0.0);
    assert!(
        bermudan >= european - 0.3,
        "bermudan below european: bermudan={bermudan:.4} european={european:.4}"
    );
    assert!(
        bermudan <= american + 0.3,
        "bermudan above american: bermudan={bermudan:.4} american={american:.4}"
    );
}

#[test]
fn test_bermudan_put_with_late_date_approaches_european() {
    let market = flat_market(0.05, 0.20);

    let bermudan = LongstaffSchwartzEngine::new(100_000, 4, 42)
        .price(
            &OptionContract::bermudan_put(100.0, 1.0, vec![0.98]),
            &market,
        )
        .unwrap()
        .price;
    let european = EuropeanMonteCarloEngine::new(100_000, 4, 42)
        .price(&OptionContract::european_put(100.0, 1.0), &market)
        .unwrap()
        .price;

    assert!(
        (bermudan - european).abs() < 0.3,
        "single near-maturity date should look European: bermudan={bermudan:.4} european={european:.4}"
    );
}

// ============================================================================
// Monotonicity in volatility
// ============================================================================

#[test]
fn test_american_put_price_increases_with_volatility() {
    let put = OptionContract::american_put(100.0, 1.0);
    let engine = LongstaffSchwartzEngine::new(50_000, 4, 42);

    let low = engine.price(&put, &flat_market(0.05, 0.20)).unwrap().price;
    let high = engine.price(&put, &flat_market(0.05, 0.40)).unwrap().price;

    assert!(
        high > low,
        "put value should increase with vol: low={low:.4} high={high:.4}"
    );
}

// ============================================================================
// Jump-diffusion market: prices stay finite, non-negative, and ordered
// ============================================================================

#[test]
fn test_american_put_under_jumps() {
    let market = MarketData::builder()
        .rate_curve(RateCurve::new(vec![(1.0, 0.05)]).unwrap())
        .spot(100.0)
        .volatility(0.20)
        .jump_intensity(0.5)
        .jump_mean(0.1)
        .jump_volatility(0.25)
        .build()
        .unwrap();

    let american = LongstaffSchwartzEngine::new(50_000, 4, 13)
        .price(&OptionContract::american_put(100.0, 1.0), &market)
        .unwrap()
        .price;
    let european = EuropeanMonteCarloEngine::new(50_000, 4, 13)
        .price(&OptionContract::european_put(100.0, 1.0), &market)
        .unwrap()
        .price;

    assert!(american.is_finite() && american >= 0.0);
    assert!(
        american >= european - 0.15,
        "american={american:.4} european={european:.4}"
    );
}

// ============================================================================
// Family dispatch facade
// ============================================================================

#[test]
fn test_dispatch_routes_every_family() {
    let market = flat_market(0.05, 0.20);

    let contracts = [
        OptionContract::european_call(100.0, 1.0),
        OptionContract::american_put(100.0, 1.0),
        OptionContract::bermudan_put(100.0, 1.0, vec![0.25, 0.5, 0.75]),
    ];
    for contract in &contracts {
        let result = engines::price(contract, &market, 10_000, 2, 3).unwrap();
        assert!(result.price.is_finite());
        assert!(result.price >= 0.0);
    }
}

#[test]
fn test_dispatch_surfaces_invalid_parameters() {
    let market = flat_market(0.05, 0.20);
    let put = OptionContract::american_put(100.0, 1.0);

    assert!(engines::price(&put, &market, 0, 2, 3).is_err());
    assert!(engines::price(&put, &market, 10_000, 0, 3).is_err());
}
