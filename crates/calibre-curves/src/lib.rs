//! # Calibre Curves
//!
//! Curves, rates providers, and instrument pricing used by curve calibration.
//!
//! This crate provides:
//!
//! - **Curves**: [`InterpolatedCurve`], a zero-rate curve built from knots
//!   with pluggable interpolation and extrapolation
//! - **Indices**: Ibor indices with their fixing conventions
//! - **Rates Provider**: A read-only view over a set of curves exposing
//!   discount factors and Ibor forward rates
//! - **Products**: FRAs and fixed/Ibor swaps, plus templates that build them
//!   relative to a valuation date
//! - **Pricing**: Discounting pricers producing present values and par rates
//!
//! ## Quick Start
//!
//! ```rust
//! use calibre_curves::prelude::*;
//! use calibre_math::prelude::{ExtrapolationMethod, InterpolationMethod};
//!
//! let valuation = Date::from_ymd(2011, 3, 8).unwrap();
//! let curve = InterpolatedCurve::new(
//!     "USD-LIBOR-3M",
//!     DayCountConvention::ActActIsda,
//!     valuation,
//!     vec![0.5, 1.0, 2.0],
//!     vec![0.004, 0.005, 0.008],
//!     InterpolationMethod::Linear,
//!     ExtrapolationMethod::Flat,
//!     ExtrapolationMethod::Flat,
//! )
//! .unwrap();
//!
//! let provider = CurveRatesProvider::new(valuation)
//!     .with_discount_curve(Currency::USD, curve.clone())
//!     .with_forward_curve(IborIndex::UsdLibor3M, curve);
//!
//! let fra = FraTemplate::of(3, 6, IborIndex::UsdLibor3M)
//!     .create_trade(valuation, 0.005, 1.0)
//!     .unwrap();
//! let pv = DiscountingTradePricer.present_value(&fra.into(), &provider).unwrap();
//! assert_eq!(pv.currency, Currency::USD);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::uninlined_format_args)]

pub mod curve;
pub mod error;
pub mod index;
pub mod pricer;
pub mod products;
pub mod provider;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::curve::InterpolatedCurve;
    pub use crate::error::{CurveError, CurveResult};
    pub use crate::index::IborIndex;
    pub use crate::pricer::{DiscountingTradePricer, TradePricer};
    pub use crate::products::{
        FixedIborSwapConvention, FixedIborSwapTemplate, Fra, FraTemplate, Swap, Trade,
        TradeTemplate,
    };
    pub use crate::provider::{CurveRatesProvider, RatesProvider};
    pub use calibre_core::prelude::*;
}

pub use curve::InterpolatedCurve;
pub use error::{CurveError, CurveResult};
