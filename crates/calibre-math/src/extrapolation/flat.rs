//! Flat extrapolation.

use super::Extrapolator;

/// Flat extrapolation: holds the boundary value.
///
/// Applied to zero rates this gives a flat zero curve beyond the knots.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatExtrapolator;

impl Extrapolator for FlatExtrapolator {
    fn extrapolate(&self, _t: f64, _edge_t: f64, edge_value: f64, _edge_derivative: f64) -> f64 {
        edge_value
    }

    fn name(&self) -> &'static str {
        "Flat"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_ignores_slope() {
        assert_eq!(FlatExtrapolator.extrapolate(100.0, 10.0, 0.05, 0.001), 0.05);
        assert_eq!(FlatExtrapolator.extrapolate(0.0, 0.25, 0.003, -0.2), 0.003);
    }
}
