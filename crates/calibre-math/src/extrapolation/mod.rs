//! Extrapolation methods for curves.
//!
//! Extrapolators extend a curve beyond its first or last knot using the
//! value and slope at that boundary knot:
//!
//! - [`FlatExtrapolator`]: Constant extension of the boundary value
//! - [`LinearExtrapolator`]: Continuation of the boundary slope
//!
//! # Example
//!
//! ```rust
//! use calibre_math::extrapolation::{Extrapolator, FlatExtrapolator};
//!
//! // Last observed: 1.2% at 3 years
//! let rate = FlatExtrapolator.extrapolate(10.0, 3.0, 0.012, 0.0004);
//! assert_eq!(rate, 0.012);
//! ```

mod flat;
mod linear;

pub use flat::FlatExtrapolator;
pub use linear::LinearExtrapolator;

use serde::{Deserialize, Serialize};

/// Trait for extrapolation methods.
pub trait Extrapolator: Send + Sync {
    /// Extrapolates to `t` from a boundary knot.
    ///
    /// # Arguments
    ///
    /// * `t` - Target point, on either side of the knot range
    /// * `edge_t` - Boundary knot nearest to `t`
    /// * `edge_value` - Value at the boundary knot
    /// * `edge_derivative` - Slope at the boundary knot
    fn extrapolate(&self, t: f64, edge_t: f64, edge_value: f64, edge_derivative: f64) -> f64;

    /// Returns the name of the extrapolation method.
    fn name(&self) -> &'static str;
}

/// Extrapolator identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ExtrapolationMethod {
    /// Constant value from boundary
    #[default]
    Flat,
    /// Linear continuation with boundary slope
    Linear,
}

impl ExtrapolationMethod {
    /// Returns the extrapolator for this method.
    #[must_use]
    pub fn extrapolator(self) -> &'static dyn Extrapolator {
        match self {
            ExtrapolationMethod::Flat => &FlatExtrapolator,
            ExtrapolationMethod::Linear => &LinearExtrapolator,
        }
    }
}

impl std::fmt::Display for ExtrapolationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extrapolator().name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_method_dispatch() {
        let flat = ExtrapolationMethod::Flat.extrapolator();
        let linear = ExtrapolationMethod::Linear.extrapolator();

        assert_relative_eq!(flat.extrapolate(15.0, 10.0, 0.05, 0.001), 0.05);
        assert_relative_eq!(linear.extrapolate(15.0, 10.0, 0.05, 0.001), 0.055, epsilon = 1e-12);
        // Left side
        assert_relative_eq!(linear.extrapolate(0.0, 0.25, 0.01, 0.004), 0.009, epsilon = 1e-12);

        assert_eq!(ExtrapolationMethod::default().to_string(), "Flat");
    }

    #[test]
    fn test_method_serde() {
        let json = serde_json::to_string(&ExtrapolationMethod::Linear).unwrap();
        assert_eq!(json, "\"Linear\"");
    }
}
