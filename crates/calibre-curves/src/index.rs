//! Ibor rate indices.

use std::fmt;
use std::str::FromStr;

use calibre_core::calendars::{
    BusinessDayAdjustment, BusinessDayConvention, Calendar, HolidayCalendar,
};
use calibre_core::daycounts::DayCountConvention;
use calibre_core::{CoreError, CoreResult, Currency, Date, Tenor};
use serde::{Deserialize, Serialize};

/// An interbank offered rate index.
///
/// Each index knows how a fixing date maps to its accrual period: the
/// effective date is `effective_offset_days` business days after fixing and
/// the maturity is one index tenor later, adjusted modified following.
///
/// Serialized as its market name, e.g. `"USD-LIBOR-3M"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum IborIndex {
    /// USD LIBOR 3 month
    UsdLibor3M,
    /// GBP LIBOR 3 month
    GbpLibor3M,
    /// EURIBOR 3 month
    EurEuribor3M,
    /// EURIBOR 6 month
    EurEuribor6M,
}

impl IborIndex {
    /// Market name of the index.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            IborIndex::UsdLibor3M => "USD-LIBOR-3M",
            IborIndex::GbpLibor3M => "GBP-LIBOR-3M",
            IborIndex::EurEuribor3M => "EUR-EURIBOR-3M",
            IborIndex::EurEuribor6M => "EUR-EURIBOR-6M",
        }
    }

    /// All supported indices.
    #[must_use]
    pub fn all() -> &'static [IborIndex] {
        &[
            IborIndex::UsdLibor3M,
            IborIndex::GbpLibor3M,
            IborIndex::EurEuribor3M,
            IborIndex::EurEuribor6M,
        ]
    }

    /// Currency of the index.
    #[must_use]
    pub fn currency(&self) -> Currency {
        match self {
            IborIndex::UsdLibor3M => Currency::USD,
            IborIndex::GbpLibor3M => Currency::GBP,
            IborIndex::EurEuribor3M | IborIndex::EurEuribor6M => Currency::EUR,
        }
    }

    /// Length of the underlying deposit.
    #[must_use]
    pub fn tenor(&self) -> Tenor {
        match self {
            IborIndex::EurEuribor6M => Tenor::months(6),
            _ => Tenor::months(3),
        }
    }

    /// Accrual day count.
    #[must_use]
    pub fn day_count(&self) -> DayCountConvention {
        match self {
            IborIndex::GbpLibor3M => DayCountConvention::Act365Fixed,
            _ => DayCountConvention::Act360,
        }
    }

    /// Business days from fixing to effective date.
    #[must_use]
    pub fn effective_offset_days(&self) -> i32 {
        match self {
            IborIndex::GbpLibor3M => 0,
            _ => 2,
        }
    }

    /// Calendar used for fixing and date adjustment.
    #[must_use]
    pub fn fixing_calendar(&self) -> HolidayCalendar {
        HolidayCalendar::WeekendsOnly
    }

    /// Effective date of the deposit fixed on `fixing_date`.
    #[must_use]
    pub fn effective_date(&self, fixing_date: Date) -> Date {
        self.fixing_calendar()
            .add_business_days(fixing_date, self.effective_offset_days())
    }

    /// Fixing date of the deposit starting on `effective_date`.
    #[must_use]
    pub fn fixing_date(&self, effective_date: Date) -> Date {
        self.fixing_calendar()
            .add_business_days(effective_date, -self.effective_offset_days())
    }

    /// Maturity of the deposit starting on `effective_date`.
    pub fn maturity_date(&self, effective_date: Date) -> CoreResult<Date> {
        let unadjusted = effective_date.plus_tenor(self.tenor())?;
        Ok(BusinessDayAdjustment::new(
            BusinessDayConvention::ModifiedFollowing,
            self.fixing_calendar(),
        )
        .adjust(unadjusted))
    }
}

impl fmt::Display for IborIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for IborIndex {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IborIndex::all()
            .iter()
            .find(|index| index.name().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| CoreError::unknown_code("Ibor index", s))
    }
}

impl TryFrom<String> for IborIndex {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<IborIndex> for String {
    fn from(index: IborIndex) -> Self {
        index.name().to_string()
    }
}
