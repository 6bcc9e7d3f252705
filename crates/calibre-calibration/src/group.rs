//! Calibrated curve groups.

use std::collections::BTreeMap;
use std::sync::Arc;

use calibre_core::{Currency, Date};
use calibre_curves::curve::InterpolatedCurve;
use calibre_curves::index::IborIndex;
use calibre_curves::provider::CurveRatesProvider;

use crate::error::{CalibrationError, CalibrationResult};
use crate::ids::{CurveGroupName, CurveName};

/// Solver statistics of a successful calibration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationDiagnostics {
    /// Newton steps taken.
    pub iterations: u32,
    /// Euclidean norm of the residual vector at the solution.
    pub residual_norm: f64,
}

/// A set of calibrated curves and the roles they play.
///
/// Produced once per successful build and never mutated; a rebuild yields a
/// new instance. Curves are shared, so cloning is cheap.
#[derive(Debug, Clone)]
pub struct CurveGroup {
    name: CurveGroupName,
    valuation_date: Date,
    curves: Vec<(CurveName, Arc<InterpolatedCurve>)>,
    discount: BTreeMap<Currency, usize>,
    forward: BTreeMap<IborIndex, usize>,
    fixings: BTreeMap<IborIndex, BTreeMap<Date, f64>>,
    diagnostics: CalibrationDiagnostics,
}

impl CurveGroup {
    pub(crate) fn new(
        name: CurveGroupName,
        valuation_date: Date,
        curves: Vec<(CurveName, Arc<InterpolatedCurve>)>,
        discount: BTreeMap<Currency, usize>,
        forward: BTreeMap<IborIndex, usize>,
        fixings: BTreeMap<IborIndex, BTreeMap<Date, f64>>,
        diagnostics: CalibrationDiagnostics,
    ) -> Self {
        Self {
            name,
            valuation_date,
            curves,
            discount,
            forward,
            fixings,
            diagnostics,
        }
    }

    /// Group name.
    #[must_use]
    pub fn name(&self) -> &CurveGroupName {
        &self.name
    }

    /// Valuation date the group was calibrated at.
    #[must_use]
    pub fn valuation_date(&self) -> Date {
        self.valuation_date
    }

    /// Curves in configuration order.
    pub fn curves(&self) -> impl Iterator<Item = (&CurveName, &InterpolatedCurve)> {
        self.curves.iter().map(|(name, curve)| (name, &**curve))
    }

    /// Looks up a curve by name.
    #[must_use]
    pub fn curve(&self, name: &CurveName) -> Option<&InterpolatedCurve> {
        self.curves
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, curve)| &**curve)
    }

    /// The curve discounting `currency`.
    #[must_use]
    pub fn discount_curve(&self, currency: Currency) -> Option<&InterpolatedCurve> {
        self.discount.get(&currency).map(|&i| &*self.curves[i].1)
    }

    /// The curve forecasting `index`.
    #[must_use]
    pub fn forward_curve(&self, index: IborIndex) -> Option<&InterpolatedCurve> {
        self.forward.get(&index).map(|&i| &*self.curves[i].1)
    }

    /// Solver statistics.
    #[must_use]
    pub fn diagnostics(&self) -> CalibrationDiagnostics {
        self.diagnostics
    }

    /// A rates provider over the calibrated curves, with the fixings used in
    /// calibration.
    ///
    /// # Errors
    ///
    /// Returns [`CalibrationError::InvalidConfiguration`] if `valuation_date`
    /// is before the date the curves were calibrated at.
    pub fn rates_provider(&self, valuation_date: Date) -> CalibrationResult<CurveRatesProvider> {
        if valuation_date < self.valuation_date {
            return Err(CalibrationError::invalid_configuration(format!(
                "valuation date {valuation_date} precedes curve date {}",
                self.valuation_date
            )));
        }
        let mut provider = CurveRatesProvider::new(valuation_date);
        for (currency, &i) in &self.discount {
            provider = provider.with_discount_curve(*currency, Arc::clone(&self.curves[i].1));
        }
        for (index, &i) in &self.forward {
            provider = provider.with_forward_curve(*index, Arc::clone(&self.curves[i].1));
        }
        for (index, series) in &self.fixings {
            provider = provider.with_fixings(*index, series.clone());
        }
        Ok(provider)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use calibre_core::daycounts::DayCountConvention;
    use calibre_curves::provider::RatesProvider;
    use calibre_math::extrapolation::ExtrapolationMethod;
    use calibre_math::interpolation::InterpolationMethod;

    fn group() -> CurveGroup {
        let date = Date::from_ymd(2011, 3, 8).unwrap();
        let curve = InterpolatedCurve::new(
            "USD",
            DayCountConvention::ActActIsda,
            date,
            vec![0.5, 1.0],
            vec![0.01, 0.02],
            InterpolationMethod::Linear,
            ExtrapolationMethod::Flat,
            ExtrapolationMethod::Flat,
        )
        .unwrap();
        CurveGroup::new(
            "Test".into(),
            date,
            vec![("USD".into(), Arc::new(curve))],
            BTreeMap::from([(Currency::USD, 0)]),
            BTreeMap::from([(IborIndex::UsdLibor3M, 0)]),
            BTreeMap::new(),
            CalibrationDiagnostics {
                iterations: 3,
                residual_norm: 1e-14,
            },
        )
    }

    #[test]
    fn test_lookups() {
        let group = group();
        assert!(group.discount_curve(Currency::USD).is_some());
        assert!(group.discount_curve(Currency::EUR).is_none());
        assert!(group.forward_curve(IborIndex::UsdLibor3M).is_some());
        assert!(group.forward_curve(IborIndex::GbpLibor3M).is_none());
        assert_eq!(group.curve(&"USD".into()).map(InterpolatedCurve::name), Some("USD"));
        assert_eq!(group.curves().count(), 1);
        assert_eq!(group.diagnostics().iterations, 3);
    }

    #[test]
    fn test_rates_provider_uses_curves() {
        let group = group();
        let provider = group.rates_provider(group.valuation_date()).unwrap();
        let date = Date::from_ymd(2012, 3, 8).unwrap();
        assert_relative_eq!(
            provider.discount_factor(Currency::USD, date).unwrap(),
            group.discount_curve(Currency::USD).unwrap().discount_factor(date).unwrap(),
            epsilon = 1e-15
        );

        let earlier = Date::from_ymd(2011, 3, 7).unwrap();
        assert!(group.rates_provider(earlier).is_err());
    }
}
