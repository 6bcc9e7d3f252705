//! Calibration instruments and the templates that build them.
//!
//! # Available Products
//!
//! - [`Fra`]: Forward rate agreement, built from a [`FraTemplate`]
//! - [`Swap`]: Fixed-for-Ibor swap, built from a [`FixedIborSwapTemplate`]
//!
//! A template describes an instrument relative to a valuation date; given a
//! date and a rate it produces a concrete [`Trade`].

mod fra;
mod swap;

pub use fra::{Fra, FraTemplate};
pub use swap::{FixedIborSwapConvention, FixedIborSwapTemplate, FixedPeriod, IborPeriod, Swap};

use calibre_core::{Currency, Date};
use serde::{Deserialize, Serialize};

use crate::error::CurveResult;

/// A concrete priced instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Trade {
    /// Forward rate agreement
    Fra(Fra),
    /// Fixed-for-Ibor swap
    Swap(Swap),
}

impl Trade {
    /// Settlement currency.
    #[must_use]
    pub fn currency(&self) -> Currency {
        match self {
            Trade::Fra(fra) => fra.currency,
            Trade::Swap(swap) => swap.currency,
        }
    }
}

impl From<Fra> for Trade {
    fn from(fra: Fra) -> Self {
        Trade::Fra(fra)
    }
}

impl From<Swap> for Trade {
    fn from(swap: Swap) -> Self {
        Trade::Swap(swap)
    }
}

/// An instrument described relative to a valuation date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TradeTemplate {
    /// Forward rate agreement
    Fra(FraTemplate),
    /// Fixed-for-Ibor swap
    Swap(FixedIborSwapTemplate),
}

impl TradeTemplate {
    /// Builds the trade at `rate`.
    pub fn create_trade(&self, valuation_date: Date, rate: f64, notional: f64) -> CurveResult<Trade> {
        Ok(match self {
            TradeTemplate::Fra(t) => t.create_trade(valuation_date, rate, notional)?.into(),
            TradeTemplate::Swap(t) => t.create_trade(valuation_date, rate, notional)?.into(),
        })
    }

    /// Date at which the instrument pins a curve.
    pub fn node_date(&self, valuation_date: Date) -> CurveResult<Date> {
        match self {
            TradeTemplate::Fra(t) => t.node_date(valuation_date),
            TradeTemplate::Swap(t) => t.node_date(valuation_date),
        }
    }

    /// Default label, e.g. `FRA 3x6` or `Swap 2Y`.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            TradeTemplate::Fra(t) => format!("FRA {}", t.label()),
            TradeTemplate::Swap(t) => format!("Swap {}", t.label()),
        }
    }
}

impl From<FraTemplate> for TradeTemplate {
    fn from(template: FraTemplate) -> Self {
        TradeTemplate::Fra(template)
    }
}

impl From<FixedIborSwapTemplate> for TradeTemplate {
    fn from(template: FixedIborSwapTemplate) -> Self {
        TradeTemplate::Swap(template)
    }
}
