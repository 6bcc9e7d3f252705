//! Error types for curve calibration.

use calibre_curves::CurveError;
use calibre_math::MathError;
use thiserror::Error;

/// A specialized Result type for calibration operations.
pub type CalibrationResult<T> = Result<T, CalibrationError>;

/// Calibration failure.
///
/// Every expected failure of a curve group build is reported through this
/// type; nothing in the build path panics on caller input.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalibrationError {
    /// A required quote, bundle, or fixing is absent from the snapshot.
    #[error("Missing market data: {0}")]
    MissingMarketData(String),

    /// The curve group configuration is structurally malformed.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The Jacobian is singular or the iteration produced non-finite values.
    #[error("Numerical failure: {0}")]
    NumericalFailure(String),

    /// The iteration budget ran out.
    #[error("Calibration did not converge after {iterations} iterations (residual norm: {residual:.3e})")]
    ConvergenceFailure {
        /// Iterations performed.
        iterations: u32,
        /// Residual norm at the last iterate.
        residual: f64,
    },

    /// Cancellation was requested.
    #[error("Calibration cancelled after {iterations} iterations")]
    Cancelled {
        /// Iterations completed before cancellation was observed.
        iterations: u32,
    },

    /// Curve construction or pricing failed.
    #[error("Pricing failure: {0}")]
    Pricing(CurveError),
}

/// Kind of a [`CalibrationError`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CalibrationErrorKind {
    /// See [`CalibrationError::MissingMarketData`].
    MissingMarketData,
    /// See [`CalibrationError::InvalidConfiguration`].
    InvalidConfiguration,
    /// See [`CalibrationError::NumericalFailure`].
    NumericalFailure,
    /// See [`CalibrationError::ConvergenceFailure`].
    ConvergenceFailure,
    /// See [`CalibrationError::Cancelled`].
    Cancelled,
    /// See [`CalibrationError::Pricing`].
    Pricing,
}

impl CalibrationError {
    /// Creates a missing market data error.
    #[must_use]
    pub fn missing_market_data(what: impl Into<String>) -> Self {
        Self::MissingMarketData(what.into())
    }

    /// Creates an invalid configuration error.
    #[must_use]
    pub fn invalid_configuration(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration(reason.into())
    }

    /// The kind of failure.
    #[must_use]
    pub fn kind(&self) -> CalibrationErrorKind {
        match self {
            Self::MissingMarketData(_) => CalibrationErrorKind::MissingMarketData,
            Self::InvalidConfiguration(_) => CalibrationErrorKind::InvalidConfiguration,
            Self::NumericalFailure(_) => CalibrationErrorKind::NumericalFailure,
            Self::ConvergenceFailure { .. } => CalibrationErrorKind::ConvergenceFailure,
            Self::Cancelled { .. } => CalibrationErrorKind::Cancelled,
            Self::Pricing(_) => CalibrationErrorKind::Pricing,
        }
    }
}

impl From<MathError> for CalibrationError {
    fn from(error: MathError) -> Self {
        match error {
            MathError::ConvergenceFailed {
                iterations,
                residual,
            } => Self::ConvergenceFailure {
                iterations,
                residual,
            },
            MathError::Cancelled { iterations } => Self::Cancelled { iterations },
            MathError::InvalidInput { reason } => Self::InvalidConfiguration(reason),
            MathError::DimensionMismatch { .. } => Self::InvalidConfiguration(error.to_string()),
            other => Self::NumericalFailure(other.to_string()),
        }
    }
}

impl From<CurveError> for CalibrationError {
    fn from(error: CurveError) -> Self {
        match error {
            CurveError::MissingFixing { .. } => Self::MissingMarketData(error.to_string()),
            CurveError::Math(math) => math.into(),
            other => Self::Pricing(other),
        }
    }
}
