//! Error types for the core crate.

use thiserror::Error;

/// A specialized Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised by date arithmetic and convention lookups.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Error in date calculations or invalid date.
    #[error("Invalid date: {message}")]
    InvalidDate {
        /// Description of the date error.
        message: String,
    },

    /// A tenor or period string could not be understood.
    #[error("Invalid tenor: {reason}")]
    InvalidTenor {
        /// Why the tenor was rejected.
        reason: String,
    },

    /// An unknown convention or currency code was supplied.
    #[error("Unknown {kind}: {value}")]
    UnknownCode {
        /// Kind of code (currency, day count, ...).
        kind: &'static str,
        /// The code that was not recognised.
        value: String,
    },
}

impl CoreError {
    /// Creates an invalid date error.
    #[must_use]
    pub fn invalid_date(message: impl Into<String>) -> Self {
        Self::InvalidDate {
            message: message.into(),
        }
    }

    /// Creates an invalid tenor error.
    #[must_use]
    pub fn invalid_tenor(reason: impl Into<String>) -> Self {
        Self::InvalidTenor {
            reason: reason.into(),
        }
    }

    /// Creates an unknown code error.
    #[must_use]
    pub fn unknown_code(kind: &'static str, value: impl Into<String>) -> Self {
        Self::UnknownCode {
            kind,
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::invalid_date("2011-02-30 is not a valid date");
        assert!(err.to_string().contains("Invalid date"));

        let err = CoreError::unknown_code("currency", "XYZ");
        assert_eq!(err.to_string(), "Unknown currency: XYZ");
    }
}
