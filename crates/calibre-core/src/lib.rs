//! # Calibre Core
//!
//! Core types shared by every crate in the Calibre curve calibration workspace.
//!
//! This crate provides:
//!
//! - **Types**: [`Date`], [`Currency`], [`Tenor`], [`Frequency`], [`CurrencyAmount`]
//! - **Day Count Conventions**: Year fraction calculations used for accrual and curve time
//! - **Business Day Calendars**: Calendars and business day adjustment rules
//!
//! ## Example
//!
//! ```rust
//! use calibre_core::prelude::*;
//!
//! let valuation = Date::from_ymd(2011, 3, 8).unwrap();
//! let start = valuation.plus_tenor(Tenor::months(3)).unwrap();
//! let yf = DayCountConvention::Act360.year_fraction_f64(valuation, start);
//! assert!(yf > 0.25);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::trivially_copy_pass_by_ref)]

pub mod calendars;
pub mod daycounts;
pub mod error;
pub mod types;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::calendars::{
        BusinessDayAdjustment, BusinessDayConvention, Calendar, HolidayCalendar,
    };
    pub use crate::daycounts::{DayCount, DayCountConvention};
    pub use crate::error::{CoreError, CoreResult};
    pub use crate::types::{Currency, CurrencyAmount, Date, Frequency, Tenor};
}

// Re-export commonly used types at crate root
pub use error::{CoreError, CoreResult};
pub use types::{Currency, CurrencyAmount, Date, Frequency, Tenor};
