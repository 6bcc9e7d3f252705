//! Integration tests: calibrate USD curve groups end to end.
//!
//! Valuation date: March 8, 2011 (spot March 10, 2011)
//!
//! | Group   | Nodes                                   | Interpolation    |
//! |---------|-----------------------------------------|------------------|
//! | FRAs    | 1x4, 2x5, 3x6, 6x9, 9x12, 12x15, 18x21  | Double quadratic |
//! | Mixed   | FRA 3x6, 6x9; swaps 1Y, 2Y, 3Y          | Double quadratic |
//!
//! One curve serves both USD discounting and USD-LIBOR-3M forecasting.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use approx::assert_abs_diff_eq;
use calibre_calibration::adapter;
use calibre_calibration::prelude::*;
use calibre_core::CurrencyAmount;
use calibre_curves::pricer::{DiscountingTradePricer, TradePricer};
use calibre_curves::products::{FixedIborSwapConvention, FixedIborSwapTemplate, FraTemplate, Trade};
use calibre_curves::provider::RatesProvider;
use calibre_curves::CurveResult;
use calibre_math::extrapolation::ExtrapolationMethod;
use calibre_math::interpolation::InterpolationMethod;
use calibre_math::solvers::CancellationToken;

const TOLERANCE_PV: f64 = 5e-10;
const GROUP: &str = "Test";
const CURVE: &str = "USD-LIBOR-3M";
const SCHEME: &str = "test";

const FRA_TENORS: [(i32, i32); 7] = [(1, 4), (2, 5), (3, 6), (6, 9), (9, 12), (12, 15), (18, 21)];
const FRA_RATES: [f64; 7] = [0.003, 0.0033, 0.0037, 0.0054, 0.007, 0.0091, 0.0134];

fn valuation() -> Date {
    Date::from_ymd(2011, 3, 8).unwrap()
}

fn feed() -> MarketDataFeed {
    MarketDataFeed::new("Feed")
}

fn curve_builder() -> calibre_calibration::config::CurveConfigBuilder {
    CurveConfig::builder(CURVE)
        .day_count(DayCountConvention::ActActIsda)
        .interpolation(InterpolationMethod::DoubleQuadratic)
        .extrapolation(ExtrapolationMethod::Flat, ExtrapolationMethod::Flat)
}

fn group_of(curve: CurveConfig) -> CurveGroupConfig {
    CurveGroupConfig::builder(GROUP)
        .add_curve(curve, Currency::USD, IborIndex::UsdLibor3M)
        .build()
        .unwrap()
}

fn fra_nodes() -> Vec<CurveNode> {
    FRA_TENORS
        .iter()
        .zip(FRA_RATES)
        .map(|(&(start, end), rate)| {
            CurveNode::fixed(FraTemplate::of(start, end, IborIndex::UsdLibor3M), rate / 100.0)
        })
        .collect()
}

fn fra_group() -> CurveGroupConfig {
    group_of(curve_builder().add_nodes(fra_nodes()).build().unwrap())
}

fn key(value: &str) -> QuoteKey {
    QuoteKey::of(SCHEME, value)
}

fn swap(years: i32) -> FixedIborSwapTemplate {
    FixedIborSwapTemplate::of(Tenor::years(years), FixedIborSwapConvention::USD_FIXED_6M_LIBOR_3M)
}

fn mixed_group() -> CurveGroupConfig {
    let curve = curve_builder()
        .add_node(CurveNode::quoted(FraTemplate::of(3, 6, IborIndex::UsdLibor3M), key("fra3x6")))
        .add_node(CurveNode::quoted(FraTemplate::of(6, 9, IborIndex::UsdLibor3M), key("fra6x9")))
        .add_node(CurveNode::quoted(swap(1), key("swap1y")))
        .add_node(CurveNode::quoted(swap(2), key("swap2y")))
        .add_node(CurveNode::quoted(swap(3), key("swap3y")))
        .build()
        .unwrap();
    group_of(curve)
}

fn mixed_quotes() -> BTreeMap<QuoteKey, f64> {
    [
        ("fra3x6", 0.0037),
        ("fra6x9", 0.0054),
        ("swap1y", 0.005),
        ("swap2y", 0.0087),
        ("swap3y", 0.012),
    ]
    .into_iter()
    .map(|(name, rate)| (key(name), rate))
    .collect()
}

fn mixed_snapshot(config: &CurveGroupConfig) -> MarketDataSnapshot {
    let curve = config.curve(&CURVE.into()).unwrap();
    let rates = ParRates::from_quotes(curve, &mixed_quotes()).unwrap();
    MarketDataSnapshot::new(valuation())
        .with_par_rates(ParRatesId::new(GROUP.into(), CURVE.into(), feed()), rates)
}

/// Rebuilds every node's instrument and prices it against the group.
fn node_present_values(config: &CurveGroupConfig, snapshot: &MarketDataSnapshot, group: &CurveGroup) -> Vec<f64> {
    let provider = group.rates_provider(valuation()).unwrap();
    let mut pvs = Vec::new();
    for entry in config.entries() {
        let id = ParRatesId::new(GROUP.into(), entry.curve.name().clone(), feed());
        let par_rates = snapshot.par_rates(&id).ok();
        for node in entry.curve.nodes() {
            let trade = adapter::build_trade(node, valuation(), par_rates).unwrap();
            pvs.push(adapter::residual(&trade, &provider, &DiscountingTradePricer).unwrap());
        }
    }
    pvs
}

#[test]
fn test_fra_group_reprices_to_zero() {
    let config = fra_group();
    let snapshot = MarketDataSnapshot::new(valuation());

    let requirements = curve_group_requirements(&config, &feed());
    assert!(requirements.is_empty());

    let group = build_curve_group(&config, &snapshot, &feed()).unwrap();
    assert_eq!(group.name().as_str(), GROUP);
    assert_eq!(group.curves().count(), 1);
    assert_eq!(group.curve(&CURVE.into()).unwrap().parameter_count(), 7);
    assert!(group.diagnostics().residual_norm < 1e-12);

    let pvs = node_present_values(&config, &snapshot, &group);
    assert_eq!(pvs.len(), 7);
    for pv in pvs {
        assert_abs_diff_eq!(pv, 0.0, epsilon = TOLERANCE_PV);
    }
}

#[test]
fn test_fra_group_forwards_match_rates() {
    let config = fra_group();
    let snapshot = MarketDataSnapshot::new(valuation());
    let group = build_curve_group(&config, &snapshot, &feed()).unwrap();
    let provider = group.rates_provider(valuation()).unwrap();

    for (&(start, end), rate) in FRA_TENORS.iter().zip(FRA_RATES) {
        let trade: Trade = FraTemplate::of(start, end, IborIndex::UsdLibor3M)
            .create_trade(valuation(), rate / 100.0, 1_000_000.0)
            .unwrap()
            .into();
        let par = DiscountingTradePricer.par_rate(&trade, &provider).unwrap();
        assert_abs_diff_eq!(par, rate / 100.0, epsilon = 1e-10);
    }
}

#[test]
fn test_mixed_group_reprices_to_zero() {
    let config = mixed_group();
    let snapshot = mixed_snapshot(&config);

    let group = build_curve_group(&config, &snapshot, &feed()).unwrap();
    let pvs = node_present_values(&config, &snapshot, &group);
    assert_eq!(pvs.len(), 5);
    for pv in pvs {
        assert_abs_diff_eq!(pv, 0.0, epsilon = TOLERANCE_PV);
    }

    let provider = group.rates_provider(valuation()).unwrap();
    for (years, quote) in [(1, "swap1y"), (2, "swap2y"), (3, "swap3y")] {
        let trade: Trade = swap(years).create_trade(valuation(), 0.0, 1.0).unwrap().into();
        let par = DiscountingTradePricer.par_rate(&trade, &provider).unwrap();
        assert_abs_diff_eq!(par, mixed_quotes()[&key(quote)], epsilon = 1e-10);
    }
}

#[test]
fn test_requirements_by_group_id() {
    let quoted = group_of(
        curve_builder()
            .add_node(CurveNode::quoted(FraTemplate::of(3, 6, IborIndex::UsdLibor3M), key("fra3x6")))
            .build()
            .unwrap(),
    );
    let fixed = CurveGroupConfig::builder("Fixed")
        .add_curve(
            curve_builder().add_nodes(fra_nodes()).build().unwrap(),
            Currency::USD,
            IborIndex::UsdLibor3M,
        )
        .build()
        .unwrap();
    let config = MarketDataConfig::new().with_group(quoted).with_group(fixed);

    let needed = requirements(&CurveGroupId::new(GROUP.into(), feed()), &config).unwrap();
    assert!(needed.observables.is_empty());
    assert_eq!(
        needed.non_observables.into_iter().collect::<Vec<_>>(),
        vec![ParRatesId::new(GROUP.into(), CURVE.into(), feed())]
    );

    let needed = requirements(&CurveGroupId::new("Fixed".into(), feed()), &config).unwrap();
    assert!(needed.observables.is_empty());
    assert!(needed.non_observables.is_empty());
}

#[test]
fn test_builds_are_deterministic() {
    let config = mixed_group();
    let snapshot = mixed_snapshot(&config);

    let first = build_curve_group(&config, &snapshot, &feed()).unwrap();
    let second = build_curve_group(&config, &snapshot, &feed()).unwrap();
    let values = |group: &CurveGroup| group.curve(&CURVE.into()).unwrap().values().to_vec();
    assert_eq!(values(&first), values(&second));
    assert_eq!(first.diagnostics(), second.diagnostics());
}

#[test]
fn test_missing_market_data() {
    let config = mixed_group();

    let empty = MarketDataSnapshot::new(valuation());
    let err = build_curve_group(&config, &empty, &feed()).unwrap_err();
    assert_eq!(err.kind(), CalibrationErrorKind::MissingMarketData);

    let other_feed = build_curve_group(&config, &mixed_snapshot(&config), &MarketDataFeed::default());
    assert!(matches!(other_feed, Err(CalibrationError::MissingMarketData(_))));

    let partial: ParRates = mixed_quotes()
        .into_iter()
        .filter(|(k, _)| k.value() != "swap2y")
        .collect();
    let snapshot = MarketDataSnapshot::new(valuation())
        .with_par_rates(ParRatesId::new(GROUP.into(), CURVE.into(), feed()), partial);
    let err = build_curve_group(&config, &snapshot, &feed()).unwrap_err();
    assert_eq!(err.kind(), CalibrationErrorKind::MissingMarketData);
    assert!(err.to_string().contains("swap2y"));
}

#[test]
fn test_config_serialization_preserves_node_order() {
    let config = MarketDataConfig::new().with_group(mixed_group()).with_group(fra_group());
    let json = serde_json::to_string_pretty(&mixed_group()).unwrap();
    let restored: CurveGroupConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, mixed_group());

    let labels = |group: &CurveGroupConfig| -> Vec<String> {
        group.entries()[0].curve.nodes().iter().map(CurveNode::label).collect()
    };
    assert_eq!(labels(&restored), ["FRA 3x6", "FRA 6x9", "Swap 1Y", "Swap 2Y", "Swap 3Y"]);

    let json = serde_json::to_string(&config).unwrap();
    let restored: MarketDataConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, config);
}

#[test]
fn test_empty_curve_is_rejected_on_deserialization() {
    let json = r#"{
        "name": "Empty",
        "entries": [{
            "curve": {
                "name": "USD",
                "day_count": "ACT/ACT ISDA",
                "interpolation": "DoubleQuadratic",
                "left_extrapolation": "Flat",
                "right_extrapolation": "Flat",
                "nodes": []
            },
            "discount_currencies": ["USD"]
        }]
    }"#;
    assert!(serde_json::from_str::<CurveGroupConfig>(json).is_err());
}

#[test]
fn test_concurrent_builds_share_nothing() {
    let fras = fra_group();
    let mixed = mixed_group();
    let fra_snapshot = MarketDataSnapshot::new(valuation());
    let mixed_snapshot = mixed_snapshot(&mixed);
    let function = CurveGroupMarketDataFunction::default();

    let expected = build_curve_group(&mixed, &mixed_snapshot, &feed()).unwrap();
    let (a, b) = std::thread::scope(|s| {
        let a = s.spawn(|| function.build_curve_group(&fras, &fra_snapshot, &feed()));
        let b = s.spawn(|| function.build_curve_group(&mixed, &mixed_snapshot, &feed()));
        (a.join().unwrap(), b.join().unwrap())
    });
    assert!(a.is_ok());
    assert_eq!(
        b.unwrap().curve(&CURVE.into()).unwrap().values(),
        expected.curve(&CURVE.into()).unwrap().values()
    );
}

#[test]
fn test_cancelled_build() {
    let token = CancellationToken::new();
    token.cancel();
    let function = CurveGroupMarketDataFunction::default().with_cancellation(token);

    let err = function
        .build_curve_group(&fra_group(), &MarketDataSnapshot::new(valuation()), &feed())
        .unwrap_err();
    assert!(matches!(err, CalibrationError::Cancelled { iterations: 0 }));
}

#[test]
fn test_constrained_nodes_calibrate_inside_bounds() {
    let range = ParameterConstraint::Range {
        lower: -0.01,
        upper: 0.05,
    };
    let nodes = fra_nodes()
        .into_iter()
        .map(|node| node.with_constraint(range));
    let config = group_of(curve_builder().add_nodes(nodes).build().unwrap());
    let snapshot = MarketDataSnapshot::new(valuation());

    let group = build_curve_group(&config, &snapshot, &feed()).unwrap();
    for value in group.curve(&CURVE.into()).unwrap().values() {
        assert!(*value > -0.01 && *value < 0.05);
    }
    for pv in node_present_values(&config, &snapshot, &group) {
        assert_abs_diff_eq!(pv, 0.0, epsilon = TOLERANCE_PV);
    }

    let unconstrained = build_curve_group(&fra_group(), &snapshot, &feed()).unwrap();
    let curve = |g: &CurveGroup| g.curve(&CURVE.into()).unwrap().values().to_vec();
    for (a, b) in curve(&group).iter().zip(curve(&unconstrained)) {
        assert_abs_diff_eq!(*a, b, epsilon = 1e-9);
    }
}

/// Delegates to the discounting pricer and counts valuations.
#[derive(Default)]
struct CountingPricer {
    calls: AtomicUsize,
}

impl TradePricer for CountingPricer {
    fn present_value(&self, trade: &Trade, provider: &dyn RatesProvider) -> CurveResult<CurrencyAmount> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        DiscountingTradePricer.present_value(trade, provider)
    }

    fn par_rate(&self, trade: &Trade, provider: &dyn RatesProvider) -> CurveResult<f64> {
        DiscountingTradePricer.par_rate(trade, provider)
    }
}

#[test]
fn test_injected_pricer_is_used() {
    let pricer = Arc::new(CountingPricer::default());
    let function = CurveGroupMarketDataFunction::new(RootFinderConfig::default())
        .with_pricer(pricer.clone());
    let config = mixed_group();

    function
        .build_curve_group(&config, &mixed_snapshot(&config), &feed())
        .unwrap();
    assert!(pricer.calls.load(Ordering::Relaxed) >= 5);
}

/// Raises a cancellation token once a number of valuations have run.
struct CancellingPricer {
    calls: AtomicUsize,
    cancel_after: usize,
    token: CancellationToken,
}

impl TradePricer for CancellingPricer {
    fn present_value(&self, trade: &Trade, provider: &dyn RatesProvider) -> CurveResult<CurrencyAmount> {
        if self.calls.fetch_add(1, Ordering::Relaxed) + 1 == self.cancel_after {
            self.token.cancel();
        }
        DiscountingTradePricer.present_value(trade, provider)
    }

    fn par_rate(&self, trade: &Trade, provider: &dyn RatesProvider) -> CurveResult<f64> {
        DiscountingTradePricer.par_rate(trade, provider)
    }
}

#[test]
fn test_cancelled_between_iterations() {
    let config = mixed_group();
    let snapshot = mixed_snapshot(&config);
    let token = CancellationToken::new();
    // Raised while the first residual vector is being valued.
    let pricer = Arc::new(CancellingPricer {
        calls: AtomicUsize::new(0),
        cancel_after: 3,
        token: token.clone(),
    });
    let function = CurveGroupMarketDataFunction::default()
        .with_pricer(pricer.clone())
        .with_cancellation(token);

    let err = function
        .build_curve_group(&config, &snapshot, &feed())
        .unwrap_err();
    assert!(matches!(err, CalibrationError::Cancelled { iterations: 1 }));
    assert_eq!(err.kind(), CalibrationErrorKind::Cancelled);

    // The first step ran to completion; nothing was valued after the check.
    let calls = pricer.calls.load(Ordering::Relaxed);
    let uncancelled = Arc::new(CountingPricer::default());
    CurveGroupMarketDataFunction::default()
        .with_pricer(uncancelled.clone())
        .build_curve_group(&config, &snapshot, &feed())
        .unwrap();
    assert!(calls > 5);
    assert!(calls < uncancelled.calls.load(Ordering::Relaxed));
}
