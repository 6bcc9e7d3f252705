//! # Calibre Calibration
//!
//! Calibration of interest rate curve groups to market data.
//!
//! This crate provides:
//!
//! - **Configuration**: Curve groups, curves, and their ordered nodes, each
//!   node pairing an instrument template with a fixed rate or a quote key
//! - **Market Data**: Snapshots of quotes, par rate bundles, and fixings,
//!   plus the requirements a configuration places on them
//! - **Requirements**: Pure resolution of the market data a group needs
//! - **Instruments**: Conversion of nodes into priced residuals
//! - **Builder**: Simultaneous Newton calibration of every curve in a group
//!
//! ## Quick Start
//!
//! ```rust
//! use calibre_calibration::prelude::*;
//! use calibre_curves::products::FraTemplate;
//!
//! let curve = CurveConfig::builder("USD")
//!     .add_node(CurveNode::quoted(
//!         FraTemplate::of(3, 6, IborIndex::UsdLibor3M),
//!         QuoteKey::of("test", "fra3x6"),
//!     ))
//!     .build()
//!     .unwrap();
//! let config = CurveGroupConfig::builder("Test")
//!     .add_curve(curve, Currency::USD, IborIndex::UsdLibor3M)
//!     .build()
//!     .unwrap();
//! let feed = MarketDataFeed::default();
//!
//! let needed = curve_group_requirements(&config, &feed);
//! assert_eq!(needed.non_observables.len(), 1);
//!
//! let id = ParRatesId::new("Test".into(), "USD".into(), feed.clone());
//! let rates = ParRates::new().with_rate(QuoteKey::of("test", "fra3x6"), 0.0037);
//! let snapshot = MarketDataSnapshot::new(Date::from_ymd(2011, 3, 8).unwrap())
//!     .with_par_rates(id, rates);
//!
//! let group = build_curve_group(&config, &snapshot, &feed).unwrap();
//! assert!(group.discount_curve(Currency::USD).is_some());
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

pub mod adapter;
pub mod builder;
pub mod config;
pub mod error;
pub mod group;
pub mod ids;
pub mod market_data;
pub mod requirements;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::builder::{build_curve_group, CurveGroupMarketDataFunction, RootFinderConfig};
    pub use crate::config::{
        CurveConfig, CurveGroupConfig, CurveGroupEntry, CurveNode, MarketDataConfig, NodeRate,
        ParameterConstraint,
    };
    pub use crate::error::{CalibrationError, CalibrationErrorKind, CalibrationResult};
    pub use crate::group::{CalibrationDiagnostics, CurveGroup};
    pub use crate::ids::{
        CurveGroupId, CurveGroupName, CurveName, MarketDataFeed, ParRatesId, QuoteKey,
    };
    pub use crate::market_data::{MarketDataRequirements, MarketDataSnapshot, ParRates};
    pub use crate::requirements::{curve_group_requirements, requirements};
    pub use calibre_curves::index::IborIndex;
    pub use calibre_core::prelude::*;
}

pub use builder::{build_curve_group, CurveGroupMarketDataFunction, RootFinderConfig};
pub use error::{CalibrationError, CalibrationResult};
pub use group::CurveGroup;
