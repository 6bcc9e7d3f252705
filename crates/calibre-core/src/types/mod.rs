//! Domain types shared across the workspace.
//!
//! - [`Date`]: Calendar date
//! - [`Tenor`]: Period expressed in months and days
//! - [`Currency`]: ISO currency codes
//! - [`CurrencyAmount`]: An amount in a single currency
//! - [`Frequency`]: Payment frequency

mod currency;
mod date;
mod frequency;
mod tenor;

pub use currency::{Currency, CurrencyAmount};
pub use date::Date;
pub use frequency::Frequency;
pub use tenor::Tenor;
