//! Error types for curve and pricing operations.

use calibre_core::{CoreError, Currency, Date};
use calibre_math::MathError;
use thiserror::Error;

/// A specialized Result type for curve operations.
pub type CurveResult<T> = Result<T, CurveError>;

/// Error types for curve and pricing operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CurveError {
    /// Curve knots or parameters are malformed.
    #[error("Invalid curve '{name}': {reason}")]
    InvalidCurve {
        /// Curve name.
        name: String,
        /// Description of the problem.
        reason: String,
    },

    /// No discount curve is available for the currency.
    #[error("No discount curve for {0}")]
    MissingDiscountCurve(Currency),

    /// No forward curve is available for the index.
    #[error("No forward curve for {0}")]
    MissingForwardCurve(String),

    /// A past fixing is required but not available.
    #[error("Missing fixing for {index} on {date}")]
    MissingFixing {
        /// Index name.
        index: String,
        /// Fixing date.
        date: Date,
    },

    /// A product could not be built or priced.
    #[error("Invalid product: {reason}")]
    InvalidProduct {
        /// Description of the problem.
        reason: String,
    },

    /// Numerical failure in the math layer.
    #[error(transparent)]
    Math(#[from] MathError),

    /// Date or convention failure.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl CurveError {
    /// Creates an invalid curve error.
    #[must_use]
    pub fn invalid_curve(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidCurve {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Creates an invalid product error.
    #[must_use]
    pub fn invalid_product(reason: impl Into<String>) -> Self {
        Self::InvalidProduct {
            reason: reason.into(),
        }
    }
}
