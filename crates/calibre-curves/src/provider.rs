//! Rates providers: read-only views over a set of curves.

use std::collections::BTreeMap;
use std::sync::Arc;

use calibre_core::{Currency, Date};

use crate::curve::InterpolatedCurve;
use crate::error::{CurveError, CurveResult};
use crate::index::IborIndex;

/// Market view used by pricers.
pub trait RatesProvider: Send + Sync {
    /// The valuation date.
    fn valuation_date(&self) -> Date;

    /// Discount factor in `currency` from the valuation date to `date`.
    fn discount_factor(&self, currency: Currency, date: Date) -> CurveResult<f64>;

    /// Rate of `index` fixed on `fixing_date`.
    fn ibor_rate(&self, index: IborIndex, fixing_date: Date) -> CurveResult<f64>;
}

/// Rates provider backed by interpolated curves.
///
/// Discount curves are keyed by currency and forward curves by index; the
/// same curve may serve both roles. Fixings before the valuation date must
/// come from the fixing series. A fixing on the valuation date uses the
/// series when it has one, otherwise the forward curve.
#[derive(Debug, Clone)]
pub struct CurveRatesProvider {
    valuation_date: Date,
    discount_curves: BTreeMap<Currency, Arc<InterpolatedCurve>>,
    forward_curves: BTreeMap<IborIndex, Arc<InterpolatedCurve>>,
    fixings: BTreeMap<IborIndex, BTreeMap<Date, f64>>,
}

impl CurveRatesProvider {
    /// Creates an empty provider.
    #[must_use]
    pub fn new(valuation_date: Date) -> Self {
        Self {
            valuation_date,
            discount_curves: BTreeMap::new(),
            forward_curves: BTreeMap::new(),
            fixings: BTreeMap::new(),
        }
    }

    /// Adds a discount curve.
    #[must_use]
    pub fn with_discount_curve(
        mut self,
        currency: Currency,
        curve: impl Into<Arc<InterpolatedCurve>>,
    ) -> Self {
        self.discount_curves.insert(currency, curve.into());
        self
    }

    /// Adds a forward curve.
    #[must_use]
    pub fn with_forward_curve(
        mut self,
        index: IborIndex,
        curve: impl Into<Arc<InterpolatedCurve>>,
    ) -> Self {
        self.forward_curves.insert(index, curve.into());
        self
    }

    /// Adds a fixing time series for an index.
    #[must_use]
    pub fn with_fixings(mut self, index: IborIndex, fixings: BTreeMap<Date, f64>) -> Self {
        self.fixings.insert(index, fixings);
        self
    }

    /// The discount curve for a currency.
    pub fn discount_curve(&self, currency: Currency) -> CurveResult<&InterpolatedCurve> {
        self.discount_curves
            .get(&currency)
            .map(|curve| &**curve)
            .ok_or(CurveError::MissingDiscountCurve(currency))
    }

    /// The forward curve for an index.
    pub fn forward_curve(&self, index: IborIndex) -> CurveResult<&InterpolatedCurve> {
        self.forward_curves
            .get(&index)
            .map(|curve| &**curve)
            .ok_or_else(|| CurveError::MissingForwardCurve(index.name().to_string()))
    }

    fn forward_rate(&self, index: IborIndex, fixing_date: Date) -> CurveResult<f64> {
        let curve = self.forward_curve(index)?;
        let start = index.effective_date(fixing_date);
        let end = index.maturity_date(start)?;
        let accrual = index.day_count().year_fraction_f64(start, end);
        if accrual <= 0.0 {
            return Err(CurveError::invalid_product(format!(
                "{index} period {start} to {end} has no accrual"
            )));
        }
        let df_start = curve.discount_factor(start)?;
        let df_end = curve.discount_factor(end)?;
        Ok((df_start / df_end - 1.0) / accrual)
    }
}

impl RatesProvider for CurveRatesProvider {
    fn valuation_date(&self) -> Date {
        self.valuation_date
    }

    fn discount_factor(&self, currency: Currency, date: Date) -> CurveResult<f64> {
        self.discount_curve(currency)?.discount_factor(date)
    }

    fn ibor_rate(&self, index: IborIndex, fixing_date: Date) -> CurveResult<f64> {
        if fixing_date > self.valuation_date {
            return self.forward_rate(index, fixing_date);
        }
        let fixed = self
            .fixings
            .get(&index)
            .and_then(|series| series.get(&fixing_date))
            .copied();
        match fixed {
            Some(rate) => Ok(rate),
            None if fixing_date == self.valuation_date => self.forward_rate(index, fixing_date),
            None => Err(CurveError::MissingFixing {
                index: index.name().to_string(),
                date: fixing_date,
            }),
        }
    }
}
