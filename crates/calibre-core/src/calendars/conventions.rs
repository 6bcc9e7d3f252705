//! Business day adjustment conventions.

use serde::{Deserialize, Serialize};

use super::{Calendar, HolidayCalendar};
use crate::types::Date;

/// Business day adjustment conventions.
///
/// These conventions specify how to adjust a date that falls
/// on a non-business day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum BusinessDayConvention {
    /// No adjustment.
    Unadjusted,

    /// Move to the following business day.
    #[default]
    Following,

    /// Move to the following business day, unless it crosses a month boundary,
    /// in which case move to the preceding business day.
    ModifiedFollowing,

    /// Move to the preceding business day.
    Preceding,

    /// Move to the preceding business day, unless it crosses a month boundary,
    /// in which case move to the following business day.
    ModifiedPreceding,
}

impl std::fmt::Display for BusinessDayConvention {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            BusinessDayConvention::Unadjusted => "Unadjusted",
            BusinessDayConvention::Following => "Following",
            BusinessDayConvention::ModifiedFollowing => "Modified Following",
            BusinessDayConvention::Preceding => "Preceding",
            BusinessDayConvention::ModifiedPreceding => "Modified Preceding",
        };
        write!(f, "{name}")
    }
}

/// Adjusts a date according to the given business day convention.
pub fn adjust<C: Calendar + ?Sized>(
    date: Date,
    convention: BusinessDayConvention,
    calendar: &C,
) -> Date {
    if calendar.is_business_day(date) {
        return date;
    }

    match convention {
        BusinessDayConvention::Unadjusted => date,
        BusinessDayConvention::Following => following(date, calendar),
        BusinessDayConvention::ModifiedFollowing => {
            let adjusted = following(date, calendar);
            if adjusted.month() == date.month() {
                adjusted
            } else {
                preceding(date, calendar)
            }
        }
        BusinessDayConvention::Preceding => preceding(date, calendar),
        BusinessDayConvention::ModifiedPreceding => {
            let adjusted = preceding(date, calendar);
            if adjusted.month() == date.month() {
                adjusted
            } else {
                following(date, calendar)
            }
        }
    }
}

fn following<C: Calendar + ?Sized>(mut date: Date, calendar: &C) -> Date {
    while !calendar.is_business_day(date) {
        date = date.add_days(1);
    }
    date
}

fn preceding<C: Calendar + ?Sized>(mut date: Date, calendar: &C) -> Date {
    while !calendar.is_business_day(date) {
        date = date.add_days(-1);
    }
    date
}

/// A business day convention paired with the calendar it rolls against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct BusinessDayAdjustment {
    /// Rolling rule.
    pub convention: BusinessDayConvention,
    /// Holiday calendar.
    pub calendar: HolidayCalendar,
}

impl BusinessDayAdjustment {
    /// No adjustment at all.
    pub const NONE: BusinessDayAdjustment = BusinessDayAdjustment {
        convention: BusinessDayConvention::Unadjusted,
        calendar: HolidayCalendar::NoHolidays,
    };

    /// Creates an adjustment.
    #[must_use]
    pub const fn new(convention: BusinessDayConvention, calendar: HolidayCalendar) -> Self {
        Self {
            convention,
            calendar,
        }
    }

    /// Applies the adjustment to a date.
    #[must_use]
    pub fn adjust(&self, date: Date) -> Date {
        adjust(date, self.convention, &self.calendar)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendars::WeekendCalendar;

    #[test]
    fn test_following() {
        let saturday = Date::from_ymd(2025, 1, 4).unwrap();
        let adjusted = adjust(saturday, BusinessDayConvention::Following, &WeekendCalendar);
        assert_eq!(adjusted, Date::from_ymd(2025, 1, 6).unwrap());
    }

    #[test]
    fn test_preceding() {
        let saturday = Date::from_ymd(2025, 1, 4).unwrap();
        let adjusted = adjust(saturday, BusinessDayConvention::Preceding, &WeekendCalendar);
        assert_eq!(adjusted, Date::from_ymd(2025, 1, 3).unwrap());
    }

    #[test]
    fn test_modified_following_month_end() {
        // Saturday 31 May 2025 would roll into June
        let saturday = Date::from_ymd(2025, 5, 31).unwrap();
        let adjusted = adjust(
            saturday,
            BusinessDayConvention::ModifiedFollowing,
            &WeekendCalendar,
        );
        assert_eq!(adjusted, Date::from_ymd(2025, 5, 30).unwrap());
    }

    #[test]
    fn test_adjustment_struct() {
        let adj =
            BusinessDayAdjustment::new(BusinessDayConvention::Following, HolidayCalendar::WeekendsOnly);
        let sunday = Date::from_ymd(2011, 3, 13).unwrap();
        assert_eq!(adj.adjust(sunday), Date::from_ymd(2011, 3, 14).unwrap());
        assert_eq!(BusinessDayAdjustment::NONE.adjust(sunday), sunday);
    }
}
