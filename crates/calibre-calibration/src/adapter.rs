//! Calibration instruments: from curve nodes to residuals.

use calibre_core::Date;
use calibre_curves::pricer::TradePricer;
use calibre_curves::products::Trade;
use calibre_curves::provider::RatesProvider;

use crate::config::{CurveNode, NodeRate};
use crate::error::{CalibrationError, CalibrationResult};
use crate::market_data::ParRates;

/// Notional of calibration trades; residuals are present values per unit.
pub const CALIBRATION_NOTIONAL: f64 = 1.0;

/// The rate a node is calibrated to.
///
/// Fixed nodes return their literal rate without any lookup. Market-quote
/// nodes read the curve's par rates bundle.
///
/// # Errors
///
/// Returns [`CalibrationError::MissingMarketData`] if a market-quote node has
/// no bundle or its key is not in the bundle.
pub fn node_rate(node: &CurveNode, par_rates: Option<&ParRates>) -> CalibrationResult<f64> {
    match &node.rate {
        NodeRate::Fixed(rate) => Ok(*rate),
        NodeRate::MarketQuote(key) => par_rates
            .and_then(|rates| rates.rate(key))
            .ok_or_else(|| {
                CalibrationError::missing_market_data(format!(
                    "quote {key} for node {}",
                    node.label()
                ))
            }),
    }
}

/// Builds the trade a node represents, at the node's rate.
pub fn build_trade(node: &CurveNode, valuation_date: Date, par_rates: Option<&ParRates>) -> CalibrationResult<Trade> {
    let rate = node_rate(node, par_rates)?;
    Ok(node
        .template
        .create_trade(valuation_date, rate, CALIBRATION_NOTIONAL)?)
}

/// Present value of a calibration trade, which calibration drives to zero.
pub fn residual(trade: &Trade, provider: &dyn RatesProvider, pricer: &dyn TradePricer) -> CalibrationResult<f64> {
    Ok(pricer.present_value(trade, provider)?.amount)
}

/// Residual of a node against a candidate curve set.
pub fn build_residual(
    node: &CurveNode,
    valuation_date: Date,
    par_rates: Option<&ParRates>,
    provider: &dyn RatesProvider,
    pricer: &dyn TradePricer,
) -> CalibrationResult<f64> {
    let trade = build_trade(node, valuation_date, par_rates)?;
    residual(&trade, provider, pricer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::QuoteKey;
    use approx::assert_relative_eq;
    use calibre_core::daycounts::DayCountConvention;
    use calibre_core::Currency;
    use calibre_curves::curve::InterpolatedCurve;
    use calibre_curves::index::IborIndex;
    use calibre_curves::pricer::DiscountingTradePricer;
    use calibre_curves::products::FraTemplate;
    use calibre_curves::provider::CurveRatesProvider;
    use calibre_math::extrapolation::ExtrapolationMethod;
    use calibre_math::interpolation::InterpolationMethod;

    fn valuation() -> Date {
        Date::from_ymd(2011, 3, 8).unwrap()
    }

    fn provider(rate: f64) -> CurveRatesProvider {
        let curve = InterpolatedCurve::new(
            "USD",
            DayCountConvention::ActActIsda,
            valuation(),
            vec![1.0],
            vec![rate],
            InterpolationMethod::Linear,
            ExtrapolationMethod::Flat,
            ExtrapolationMethod::Flat,
        )
        .unwrap();
        CurveRatesProvider::new(valuation())
            .with_discount_curve(Currency::USD, curve.clone())
            .with_forward_curve(IborIndex::UsdLibor3M, curve)
    }

    #[test]
    fn test_fixed_node_needs_no_market_data() {
        let node = CurveNode::fixed(FraTemplate::of(3, 6, IborIndex::UsdLibor3M), 0.0037);
        assert_eq!(node_rate(&node, None).unwrap(), 0.0037);
    }

    #[test]
    fn test_quoted_node_lookup() {
        let key = QuoteKey::of("test", "fra3x6");
        let node = CurveNode::quoted(FraTemplate::of(3, 6, IborIndex::UsdLibor3M), key.clone());

        assert!(matches!(
            node_rate(&node, None),
            Err(CalibrationError::MissingMarketData(_))
        ));
        assert!(node_rate(&node, Some(&ParRates::new())).is_err());

        let rates = ParRates::new().with_rate(key, 0.0054);
        assert_eq!(node_rate(&node, Some(&rates)).unwrap(), 0.0054);
    }

    #[test]
    fn test_residual_sign_follows_rate_difference() {
        let pricer = DiscountingTradePricer;
        let node = CurveNode::fixed(FraTemplate::of(3, 6, IborIndex::UsdLibor3M), 0.01);

        let low = build_residual(&node, valuation(), None, &provider(0.005), &pricer).unwrap();
        let high = build_residual(&node, valuation(), None, &provider(0.02), &pricer).unwrap();
        assert!(low < 0.0);
        assert!(high > 0.0);

        let trade = build_trade(&node, valuation(), None).unwrap();
        assert_relative_eq!(
            residual(&trade, &provider(0.02), &pricer).unwrap(),
            high,
            epsilon = 1e-16
        );
    }
}
