//! Linear extrapolation.

use super::Extrapolator;

/// Linear extrapolation: continues the boundary slope.
///
/// # Example
///
/// ```rust
/// use calibre_math::extrapolation::{Extrapolator, LinearExtrapolator};
///
/// // 5% at 10 years with 0.1% slope per year
/// let rate = LinearExtrapolator.extrapolate(15.0, 10.0, 0.05, 0.001);
/// assert!((rate - 0.055).abs() < 1e-10);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearExtrapolator;

impl Extrapolator for LinearExtrapolator {
    fn extrapolate(&self, t: f64, edge_t: f64, edge_value: f64, edge_derivative: f64) -> f64 {
        edge_value + edge_derivative * (t - edge_t)
    }

    fn name(&self) -> &'static str {
        "Linear"
    }
}
