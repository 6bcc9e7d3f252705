//! Actual/360 day count convention.

use rust_decimal::Decimal;

use super::DayCount;
use crate::types::Date;

/// Actual/360 day count convention.
///
/// The day count is the actual number of days between dates and the year
/// basis is always 360 days. Used for IBOR accrual and money market legs.
///
/// # Formula
///
/// $$\text{Year Fraction} = \frac{\text{Actual Days}}{360}$$
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Act360;

impl DayCount for Act360 {
    fn name(&self) -> &'static str {
        "ACT/360"
    }

    fn year_fraction(&self, start: Date, end: Date) -> Decimal {
        Decimal::from(start.days_between(&end)) / Decimal::from(360)
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
    fn test_act360_quarter() {
        let dc = Act360;
        let start = Date::from_ymd(2011, 3, 10).unwrap();
        let end = Date::from_ymd(2011, 6, 10).unwrap();

        assert_eq!(dc.day_count(start, end), 92);
        assert_eq!(dc.year_fraction(start, end), dec!(92) / dec!(360));
    }

    #[test]
    fn test_act360_negative() {
        let dc = Act360;
        let start = Date::from_ymd(2025, 6, 15).unwrap();
        let end = Date::from_ymd(2025, 6, 1).unwrap();

        assert_eq!(dc.day_count(start, end), -14);
        assert_eq!(dc.year_fraction(start, end), dec!(-14) / dec!(360));
    }
}
