//! Business day calendars and conventions.
//!
//! This module provides:
//! - The [`Calendar`] trait and a weekend-only implementation
//! - [`HolidayCalendar`], a serializable calendar identifier
//! - Business day adjustment conventions

mod conventions;

pub use conventions::{adjust, BusinessDayAdjustment, BusinessDayConvention};

use serde::{Deserialize, Serialize};

use crate::types::Date;

/// Trait for business day calendars.
pub trait Calendar: Send + Sync {
    /// Returns the name of the calendar.
    fn name(&self) -> &'static str;

    /// Returns true if the date is a business day.
    fn is_business_day(&self, date: Date) -> bool;

    /// Returns true if the date is a holiday.
    fn is_holiday(&self, date: Date) -> bool {
        !self.is_business_day(date)
    }

    /// Adjusts a date according to the given business day convention.
    fn adjust(&self, date: Date, convention: BusinessDayConvention) -> Date {
        conventions::adjust(date, convention, self)
    }

    /// Advances a date by a number of business days.
    fn add_business_days(&self, date: Date, days: i32) -> Date {
        let mut result = date;
        let mut remaining = days.abs();
        let direction: i64 = if days >= 0 { 1 } else { -1 };

        while remaining > 0 {
            result = result.add_days(direction);
            if self.is_business_day(result) {
                remaining -= 1;
            }
        }

        result
    }
}

/// A simple weekend-only calendar (no holidays).
#[derive(Debug, Clone, Copy, Default)]
pub struct WeekendCalendar;

impl Calendar for WeekendCalendar {
    fn name(&self) -> &'static str {
        "Weekend Only"
    }

    fn is_business_day(&self, date: Date) -> bool {
        !date.is_weekend()
    }
}

/// Calendar identifiers usable in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum HolidayCalendar {
    /// Every day is a business day.
    NoHolidays,
    /// Saturdays and Sundays are holidays.
    #[default]
    WeekendsOnly,
}

impl Calendar for HolidayCalendar {
    fn name(&self) -> &'static str {
        match self {
            HolidayCalendar::NoHolidays => "No Holidays",
            HolidayCalendar::WeekendsOnly => WeekendCalendar.name(),
        }
    }

    fn is_business_day(&self, date: Date) -> bool {
        match self {
            HolidayCalendar::NoHolidays => true,
            HolidayCalendar::WeekendsOnly => WeekendCalendar.is_business_day(date),
        }
    }
}
