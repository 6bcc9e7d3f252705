//! Fixed-for-Ibor interest rate swaps.

use calibre_core::calendars::{
    BusinessDayAdjustment, BusinessDayConvention, Calendar, HolidayCalendar,
};
use calibre_core::daycounts::DayCountConvention;
use calibre_core::{CoreResult, Currency, Date, Frequency, Tenor};
use serde::{Deserialize, Serialize};

use crate::error::{CurveError, CurveResult};
use crate::index::IborIndex;

/// One accrual period of the fixed leg.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FixedPeriod {
    /// Accrual start.
    pub start_date: Date,
    /// Accrual end.
    pub end_date: Date,
    /// Payment date.
    pub payment_date: Date,
    /// Accrual year fraction.
    pub year_fraction: f64,
}

/// One accrual period of the floating leg.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IborPeriod {
    /// Accrual start.
    pub start_date: Date,
    /// Accrual end.
    pub end_date: Date,
    /// Payment date.
    pub payment_date: Date,
    /// Date the index is observed.
    pub fixing_date: Date,
    /// Accrual year fraction in the index day count.
    pub year_fraction: f64,
}

/// Fixed-for-Ibor swap.
///
/// A positive notional pays fixed and receives floating:
///
/// ```text
/// PV = N × (Σ F_j τ_j DF(p_j) - K Σ τ_i DF(p_i))
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Swap {
    /// Currency of both legs.
    pub currency: Currency,
    /// Notional; positive pays fixed.
    pub notional: f64,
    /// Fixed rate.
    pub fixed_rate: f64,
    /// Floating rate index.
    pub index: IborIndex,
    /// Fixed leg periods in date order.
    pub fixed_periods: Vec<FixedPeriod>,
    /// Floating leg periods in date order.
    pub float_periods: Vec<IborPeriod>,
}

impl Swap {
    /// Final accrual end date over both legs.
    #[must_use]
    pub fn end_date(&self) -> Option<Date> {
        let fixed = self.fixed_periods.last().map(|p| p.end_date);
        let float = self.float_periods.last().map(|p| p.end_date);
        fixed.max(float)
    }
}

/// Market conventions of a fixed-for-Ibor swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FixedIborSwapConvention {
    /// Fixed leg accrual day count.
    pub fixed_day_count: DayCountConvention,
    /// Fixed leg payment frequency.
    pub fixed_frequency: Frequency,
    /// Fixed leg date adjustment.
    pub fixed_adjustment: BusinessDayAdjustment,
    /// Floating rate index; its tenor sets the floating frequency.
    pub index: IborIndex,
    /// Business days from trade to start.
    pub spot_days: i32,
}

impl FixedIborSwapConvention {
    /// USD fixed semi-annual Act/360 against USD LIBOR 3M.
    pub const USD_FIXED_6M_LIBOR_3M: FixedIborSwapConvention = FixedIborSwapConvention {
        fixed_day_count: DayCountConvention::Act360,
        fixed_frequency: Frequency::SemiAnnual,
        fixed_adjustment: BusinessDayAdjustment::new(
            BusinessDayConvention::Following,
            HolidayCalendar::WeekendsOnly,
        ),
        index: IborIndex::UsdLibor3M,
        spot_days: 2,
    };

    /// EUR fixed annual Act/360 against EURIBOR 6M.
    pub const EUR_FIXED_1Y_EURIBOR_6M: FixedIborSwapConvention = FixedIborSwapConvention {
        fixed_day_count: DayCountConvention::Act360,
        fixed_frequency: Frequency::Annual,
        fixed_adjustment: BusinessDayAdjustment::new(
            BusinessDayConvention::ModifiedFollowing,
            HolidayCalendar::WeekendsOnly,
        ),
        index: IborIndex::EurEuribor6M,
        spot_days: 2,
    };

    /// Builds the swap for the unadjusted period `[start, end]`.
    pub fn to_trade(
        &self,
        start: Date,
        end: Date,
        fixed_rate: f64,
        notional: f64,
    ) -> CurveResult<Swap> {
        if end <= start {
            return Err(CurveError::invalid_product(format!(
                "swap ends on {end}, not after its start {start}"
            )));
        }

        let fixed_periods = schedule(
            start,
            end,
            self.fixed_frequency.tenor(),
            self.fixed_adjustment,
        )?
        .into_iter()
        .map(|(start_date, end_date)| FixedPeriod {
            start_date,
            end_date,
            payment_date: end_date,
            year_fraction: self.fixed_day_count.year_fraction_f64(start_date, end_date),
        })
        .collect();

        let float_adjustment = BusinessDayAdjustment::new(
            BusinessDayConvention::ModifiedFollowing,
            self.index.fixing_calendar(),
        );
        let float_periods = schedule(start, end, self.index.tenor(), float_adjustment)?
            .into_iter()
            .map(|(start_date, end_date)| IborPeriod {
                start_date,
                end_date,
                payment_date: end_date,
                fixing_date: self.index.fixing_date(start_date),
                year_fraction: self.index.day_count().year_fraction_f64(start_date, end_date),
            })
            .collect();

        Ok(Swap {
            currency: self.index.currency(),
            notional,
            fixed_rate,
            index: self.index,
            fixed_periods,
            float_periods,
        })
    }
}

/// Template for a swap relative to a valuation date.
///
/// The swap starts `period_to_start` after spot and runs for `tenor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FixedIborSwapTemplate {
    /// Period from spot to the start.
    pub period_to_start: Tenor,
    /// Length of the swap.
    pub tenor: Tenor,
    /// Market conventions.
    pub convention: FixedIborSwapConvention,
}

impl FixedIborSwapTemplate {
    /// Creates a spot-starting template.
    #[must_use]
    pub fn of(tenor: Tenor, convention: FixedIborSwapConvention) -> Self {
        Self {
            period_to_start: Tenor::ZERO,
            tenor,
            convention,
        }
    }

    /// Sets a forward start.
    #[must_use]
    pub fn with_period_to_start(mut self, period_to_start: Tenor) -> Self {
        self.period_to_start = period_to_start;
        self
    }

    /// Market label, e.g. `2Y` or `6Mx2Y`.
    #[must_use]
    pub fn label(&self) -> String {
        if self.period_to_start.is_zero() {
            self.tenor.to_string()
        } else {
            format!("{}x{}", self.period_to_start, self.tenor)
        }
    }

    /// Builds the swap traded on `valuation_date` at `fixed_rate`.
    pub fn create_trade(&self, valuation_date: Date, fixed_rate: f64, notional: f64) -> CurveResult<Swap> {
        let spot = self
            .convention
            .index
            .fixing_calendar()
            .add_business_days(valuation_date, self.convention.spot_days);
        let start = spot.plus_tenor(self.period_to_start)?;
        let end = start.plus_tenor(self.tenor)?;
        self.convention.to_trade(start, end, fixed_rate, notional)
    }

    /// The date the swap contributes to a curve: its final accrual end.
    pub fn node_date(&self, valuation_date: Date) -> CurveResult<Date> {
        self.create_trade(valuation_date, 0.0, 1.0)?
            .end_date()
            .ok_or_else(|| CurveError::invalid_product(format!("swap {} has no periods", self.label())))
    }
}

/// Adjusted accrual periods rolling forward from `start` by `step`.
///
/// Dates are rolled from the unadjusted start so month ends do not drift; a
/// final short stub ends at `end`.
fn schedule(
    start: Date,
    end: Date,
    step: Tenor,
    adjustment: BusinessDayAdjustment,
) -> CoreResult<Vec<(Date, Date)>> {
    let mut unadjusted = vec![start];
    let mut k = 1;
    loop {
        let next = start.plus_tenor(step.times(k))?;
        if next >= end {
            break;
        }
        unadjusted.push(next);
        k += 1;
    }
    unadjusted.push(end);

    let adjusted: Vec<Date> = unadjusted.into_iter().map(|d| adjustment.adjust(d)).collect();
    Ok(adjusted.windows(2).map(|w| (w[0], w[1])).collect())
}
