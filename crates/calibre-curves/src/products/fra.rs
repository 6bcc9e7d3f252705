//! Forward rate agreements.

use calibre_core::calendars::{BusinessDayAdjustment, BusinessDayConvention, Calendar};
use calibre_core::{Currency, Date, Tenor};
use serde::{Deserialize, Serialize};

use crate::error::{CurveError, CurveResult};
use crate::index::IborIndex;

/// Forward Rate Agreement.
///
/// Pays at the start of the accrual period the discounted difference between
/// the Ibor fixing and the agreed rate (ISDA FRA discounting):
///
/// ```text
/// PV = N × (F - K) × τ / (1 + F × τ) × DF(payment)
/// ```
///
/// A positive notional receives the floating rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fra {
    /// Currency of the settlement amount.
    pub currency: Currency,
    /// Notional; positive receives floating.
    pub notional: f64,
    /// Agreed fixed rate.
    pub fixed_rate: f64,
    /// Accrual start.
    pub start_date: Date,
    /// Accrual end.
    pub end_date: Date,
    /// Settlement date.
    pub payment_date: Date,
    /// Date the index is observed.
    pub fixing_date: Date,
    /// Accrual year fraction in the index day count.
    pub year_fraction: f64,
    /// Floating rate index.
    pub index: IborIndex,
}

/// Template for an FRA relative to a valuation date.
///
/// Quoted as "A x B": the accrual period starts A months after spot and ends
/// B months after spot. Both dates are adjusted modified following on the
/// index calendar.
///
/// # Example
///
/// ```rust
/// use calibre_core::Date;
/// use calibre_curves::index::IborIndex;
/// use calibre_curves::products::FraTemplate;
///
/// let valuation = Date::from_ymd(2011, 3, 8).unwrap();
/// let fra = FraTemplate::of(3, 6, IborIndex::UsdLibor3M)
///     .create_trade(valuation, 0.0037, 1.0)
///     .unwrap();
/// assert_eq!(fra.start_date, Date::from_ymd(2011, 6, 10).unwrap());
/// assert_eq!(fra.end_date, Date::from_ymd(2011, 9, 12).unwrap());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FraTemplate {
    /// Period from spot to the accrual start.
    pub period_to_start: Tenor,
    /// Period from spot to the accrual end.
    pub period_to_end: Tenor,
    /// Floating rate index.
    pub index: IborIndex,
}

impl FraTemplate {
    /// Creates an "A x B" template in months.
    #[must_use]
    pub fn of(months_to_start: i32, months_to_end: i32, index: IborIndex) -> Self {
        Self {
            period_to_start: Tenor::months(months_to_start),
            period_to_end: Tenor::months(months_to_end),
            index,
        }
    }

    /// Market label, e.g. `3x6`.
    #[must_use]
    pub fn label(&self) -> String {
        format!(
            "{}x{}",
            self.period_to_start.total_months(),
            self.period_to_end.total_months()
        )
    }

    /// Builds the FRA traded on `valuation_date` at `fixed_rate`.
    ///
    /// # Errors
    ///
    /// Returns an error if the end is not after the start.
    pub fn create_trade(&self, valuation_date: Date, fixed_rate: f64, notional: f64) -> CurveResult<Fra> {
        let calendar = self.index.fixing_calendar();
        let adjustment =
            BusinessDayAdjustment::new(BusinessDayConvention::ModifiedFollowing, calendar);
        let spot = calendar.add_business_days(valuation_date, self.index.effective_offset_days());

        let start_date = adjustment.adjust(spot.plus_tenor(self.period_to_start)?);
        let end_date = adjustment.adjust(spot.plus_tenor(self.period_to_end)?);
        if end_date <= start_date {
            return Err(CurveError::invalid_product(format!(
                "FRA {} ends on {end_date}, not after its start {start_date}",
                self.label()
            )));
        }

        Ok(Fra {
            currency: self.index.currency(),
            notional,
            fixed_rate,
            start_date,
            end_date,
            payment_date: start_date,
            fixing_date: self.index.fixing_date(start_date),
            year_fraction: self.index.day_count().year_fraction_f64(start_date, end_date),
            index: self.index,
        })
    }

    /// The date the FRA contributes to a curve: its accrual end.
    pub fn node_date(&self, valuation_date: Date) -> CurveResult<Date> {
        Ok(self.create_trade(valuation_date, 0.0, 1.0)?.end_date)
    }
}
