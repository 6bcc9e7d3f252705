//! Actual/Actual ISDA day count convention.

use chrono::Datelike;
use rust_decimal::Decimal;

use super::DayCount;
use crate::types::Date;

/// Actual/Actual ISDA day count convention.
///
/// The period is split at year boundaries; days falling in a leap year are
/// divided by 366 and the rest by 365. This is the default time measure for
/// calibrated curves.
///
/// # Formula
///
/// $$\text{Year Fraction} = \frac{\text{Days in non-leap year}}{365} + \frac{\text{Days in leap year}}{366}$$
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActActIsda;

impl ActActIsda {
    fn forward_fraction(start: Date, end: Date) -> Decimal {
        let mut total = Decimal::ZERO;
        let mut current = start;

        while current.year() < end.year() {
            let days_in_year = i64::from(current.days_in_year());
            // Days up to and including 31 December.
            let ordinal = i64::from(current.as_naive_date().ordinal());
            let days = days_in_year - ordinal + 1;

            total += Decimal::from(days) / Decimal::from(days_in_year);
            current = current.add_days(days);
        }

        if current < end {
            let days = current.days_between(&end);
            total += Decimal::from(days) / Decimal::from(current.days_in_year());
        }

        total
    }
}

impl DayCount for ActActIsda {
    fn name(&self) -> &'static str {
        "ACT/ACT ISDA"
    }

    fn year_fraction(&self, start: Date, end: Date) -> Decimal {
        if start <= end {
            Self::forward_fraction(start, end)
        } else {
            -Self::forward_fraction(end, start)
        }
    }

    fn day_count(&self, start: Date, end: Date) -> i64 {
        start.days_between(&end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_actact_isda_full_years() {
        let dc = ActActIsda;
        let start = Date::from_ymd(2011, 1, 1).unwrap();
        let end = Date::from_ymd(2013, 1, 1).unwrap();
        assert_eq!(dc.year_fraction(start, end), dec!(2));
    }

    #[test]
    fn test_actact_isda_straddles_leap_year() {
        let dc = ActActIsda;
        let start = Date::from_ymd(2011, 11, 1).unwrap();
        let end = Date::from_ymd(2012, 3, 1).unwrap();

        // 61 days in 2011, 60 days in 2012
        let expected = dec!(61) / dec!(365) + dec!(60) / dec!(366);
        assert_eq!(dc.year_fraction(start, end), expected);
    }

    #[test]
    fn test_actact_isda_antisymmetric() {
        let dc = ActActIsda;
        let a = Date::from_ymd(2011, 3, 8).unwrap();
        let b = Date::from_ymd(2014, 3, 10).unwrap();
        assert_eq!(dc.year_fraction(b, a), -dc.year_fraction(a, b));
        assert_eq!(dc.year_fraction(a, a), Decimal::ZERO);
    }
}
