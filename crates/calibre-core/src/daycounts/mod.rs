//! Day count conventions.
//!
//! Day count conventions convert a pair of dates into a year fraction. They
//! drive both instrument accrual and the time axis of calibrated curves.
//!
//! # Supported Conventions
//!
//! - [`Act360`]: Actual/360, IBOR accrual and USD fixed legs
//! - [`Act365Fixed`]: Actual/365 Fixed
//! - [`ActActIsda`]: Actual/Actual ISDA, default curve time measure
//!
//! # Usage
//!
//! ```rust
//! use calibre_core::daycounts::{DayCount, Act360};
//! use calibre_core::types::Date;
//!
//! let start = Date::from_ymd(2011, 3, 10).unwrap();
//! let end = Date::from_ymd(2011, 6, 10).unwrap();
//! assert_eq!(Act360.day_count(start, end), 92);
//! ```

mod act360;
mod act365;
mod actact;

pub use act360::Act360;
pub use act365::Act365Fixed;
pub use actact::ActActIsda;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Date;

/// Trait for day count conventions.
///
/// Implementations must be thread-safe (`Send + Sync`).
pub trait DayCount: Send + Sync {
    /// Returns the market name of the convention (e.g. "ACT/360").
    fn name(&self) -> &'static str;

    /// Calculates the year fraction between two dates.
    ///
    /// Negative if `end` is before `start`.
    fn year_fraction(&self, start: Date, end: Date) -> Decimal;

    /// Calculates the day count between two dates.
    fn day_count(&self, start: Date, end: Date) -> i64;
}

/// Runtime selection of a day count convention.
///
/// Serializes as its market name so configurations stay readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DayCountConvention {
    /// Actual/360
    Act360,
    /// Actual/365 Fixed
    Act365Fixed,
    /// Actual/Actual ISDA
    #[default]
    ActActIsda,
}

impl DayCountConvention {
    /// Creates a boxed day count implementation.
    #[must_use]
    pub fn to_day_count(&self) -> Box<dyn DayCount> {
        match self {
            DayCountConvention::Act360 => Box::new(Act360),
            DayCountConvention::Act365Fixed => Box::new(Act365Fixed),
            DayCountConvention::ActActIsda => Box::new(ActActIsda),
        }
    }

    /// Returns the market name of the convention.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            DayCountConvention::Act360 => "ACT/360",
            DayCountConvention::Act365Fixed => "ACT/365F",
            DayCountConvention::ActActIsda => "ACT/ACT ISDA",
        }
    }

    /// Returns all available conventions.
    #[must_use]
    pub fn all() -> &'static [DayCountConvention] {
        &[
            DayCountConvention::Act360,
            DayCountConvention::Act365Fixed,
            DayCountConvention::ActActIsda,
        ]
    }

    /// Year fraction between two dates.
    #[must_use]
    pub fn year_fraction(&self, start: Date, end: Date) -> Decimal {
        match self {
            DayCountConvention::Act360 => Act360.year_fraction(start, end),
            DayCountConvention::Act365Fixed => Act365Fixed.year_fraction(start, end),
            DayCountConvention::ActActIsda => ActActIsda.year_fraction(start, end),
        }
    }

    /// Year fraction as `f64`, the form used by pricing and curve code.
    #[must_use]
    pub fn year_fraction_f64(&self, start: Date, end: Date) -> f64 {
        self.year_fraction(start, end).to_f64().unwrap_or(f64::NAN)
    }
}

impl std::fmt::Display for DayCountConvention {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for DayCountConvention {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase();

        match normalized.as_str() {
            "ACT/360" | "ACTUAL/360" | "ACT360" => Ok(DayCountConvention::Act360),
            "ACT/365" | "ACT/365F" | "ACT/365 FIXED" | "ACTUAL/365" | "ACT365FIXED" => {
                Ok(DayCountConvention::Act365Fixed)
            }
            "ACT/ACT" | "ACT/ACT ISDA" | "ACTUAL/ACTUAL" | "ACTACTISDA" => {
                Ok(DayCountConvention::ActActIsda)
            }
            _ => Err(CoreError::unknown_code("day count", s)),
        }
    }
}

impl TryFrom<String> for DayCountConvention {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DayCountConvention> for String {
    fn from(convention: DayCountConvention) -> Self {
        convention.name().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_convention_enum_matches_impls() {
        let start = Date::from_ymd(2011, 3, 8).unwrap();
        let end = Date::from_ymd(2012, 9, 10).unwrap();
        for convention in DayCountConvention::all() {
            let dc = convention.to_day_count();
            assert_eq!(dc.name(), convention.name());
            assert_eq!(dc.year_fraction(start, end), convention.year_fraction(start, end));
        }
    }

    #[test]
    fn test_year_fraction_f64() {
        let start = Date::from_ymd(2011, 1, 1).unwrap();
        let end = Date::from_ymd(2011, 7, 1).unwrap();
        assert_relative_eq!(
            DayCountConvention::Act365Fixed.year_fraction_f64(start, end),
            181.0 / 365.0,
            epsilon = 1e-15
        );
    }

    #[test]
    fn test_from_str_roundtrip() {
        for convention in DayCountConvention::all() {
            let parsed: DayCountConvention = convention.name().parse().unwrap();
            assert_eq!(*convention, parsed);
        }
        assert!("30/360".parse::<DayCountConvention>().is_err());
    }

    #[test]
    fn test_serde_uses_market_name() {
        let json = serde_json::to_string(&DayCountConvention::Act360).unwrap();
        assert_eq!(json, "\"ACT/360\"");
        let back: DayCountConvention = serde_json::from_str("\"ACT/ACT ISDA\"").unwrap();
        assert_eq!(back, DayCountConvention::ActActIsda);
    }

    proptest! {
        #[test]
        fn prop_year_fractions_add_up(
            offset in 0i64..10_000,
            first in 0i64..1_000,
            second in 0i64..1_000,
        ) {
            let start = Date::from_ymd(2000, 1, 1).unwrap().add_days(offset);
            let middle = start.add_days(first);
            let end = middle.add_days(second);
            for convention in DayCountConvention::all() {
                let whole = convention.year_fraction_f64(start, end);
                let parts = convention.year_fraction_f64(start, middle)
                    + convention.year_fraction_f64(middle, end);
                prop_assert!((whole - parts).abs() < 1e-12, "{convention:?}");
            }
        }
    }
}
