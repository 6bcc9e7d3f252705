//! Natural cubic spline interpolation.

use super::{check_range, find_segment, validate_knots};
use crate::error::MathResult;
use crate::interpolation::Interpolator;
use crate::linear_algebra::solve_tridiagonal;

/// Natural cubic spline interpolation.
///
/// Piecewise cubic with continuous first and second derivatives and zero
/// second derivative at both ends. With two knots it is a straight line.
#[derive(Debug, Clone)]
pub struct CubicSpline {
    xs: Vec<f64>,
    ys: Vec<f64>,
    /// Second derivatives at each knot
    y2s: Vec<f64>,
}

impl CubicSpline {
    /// Creates a natural cubic spline interpolator.
    ///
    /// # Errors
    ///
    /// Returns an error if there are fewer than 2 points, if lengths differ,
    /// or if `xs` is not strictly increasing.
    pub fn new(xs: Vec<f64>, ys: Vec<f64>) -> MathResult<Self> {
        validate_knots(&xs, &ys, 2)?;
        let y2s = compute_second_derivatives(&xs, &ys)?;
        Ok(Self { xs, ys, y2s })
    }

    fn coefficients(&self, x: f64) -> (usize, f64, f64, f64) {
        let i = find_segment(&self.xs, x);
        let h = self.xs[i + 1] - self.xs[i];
        let a = (self.xs[i + 1] - x) / h;
        let b = (x - self.xs[i]) / h;
        (i, h, a, b)
    }
}

impl Interpolator for CubicSpline {
    fn interpolate(&self, x: f64) -> MathResult<f64> {
        check_range(&self.xs, x)?;
        let (i, h, a, b) = self.coefficients(x);
        Ok(a * self.ys[i]
            + b * self.ys[i + 1]
            + ((a * a * a - a) * self.y2s[i] + (b * b * b - b) * self.y2s[i + 1]) * (h * h) / 6.0)
    }

    fn derivative(&self, x: f64) -> MathResult<f64> {
        check_range(&self.xs, x)?;
        let (i, h, a, b) = self.coefficients(x);
        Ok((self.ys[i + 1] - self.ys[i]) / h
            - (3.0 * a * a - 1.0) * h * self.y2s[i] / 6.0
            + (3.0 * b * b - 1.0) * h * self.y2s[i + 1] / 6.0)
    }

    fn min_x(&self) -> f64 {
        self.xs[0]
    }

    fn max_x(&self) -> f64 {
        self.xs[self.xs.len() - 1]
    }
}

/// Second derivatives at the knots; zero at both ends.
fn compute_second_derivatives(xs: &[f64], ys: &[f64]) -> MathResult<Vec<f64>> {
    let n = xs.len();
    let mut y2s = vec![0.0; n];
    if n < 3 {
        return Ok(y2s);
    }

    let h: Vec<f64> = xs.windows(2).map(|w| w[1] - w[0]).collect();
    let interior = n - 2;
    let lower: Vec<f64> = (1..interior).map(|k| h[k]).collect();
    let upper = lower.clone();
    let diag: Vec<f64> = (0..interior).map(|k| 2.0 * (h[k] + h[k + 1])).collect();
    let rhs: Vec<f64> = (0..interior)
        .map(|k| 6.0 * ((ys[k + 2] - ys[k + 1]) / h[k + 1] - (ys[k + 1] - ys[k]) / h[k]))
        .collect();

    let solved = solve_tridiagonal(&lower, &diag, &upper, &rhs)?;
    y2s[1..=interior].copy_from_slice(&solved);
    Ok(y2s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_cubic_spline_through_points() {
        let xs = vec![0.0, 1.0, 2.0, 3.0];
        let ys = vec![0.0, 1.0, 4.0, 9.0];
        let spline = CubicSpline::new(xs.clone(), ys.clone()).unwrap();
        for (x, y) in xs.iter().zip(ys.iter()) {
            assert_relative_eq!(spline.interpolate(*x).unwrap(), *y, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_natural_boundary() {
        let spline =
            CubicSpline::new(vec![0.0, 1.0, 2.0, 4.0], vec![1.0, 0.0, 2.0, 1.0]).unwrap();
        assert_eq!(spline.y2s[0], 0.0);
        assert_eq!(spline.y2s[3], 0.0);
        // Reproduces a straight line exactly
        let line = CubicSpline::new(vec![0.0, 1.0, 3.0], vec![1.0, 2.0, 4.0]).unwrap();
        assert_relative_eq!(line.interpolate(2.0).unwrap(), 3.0, epsilon = 1e-14);
    }

    #[test]
    fn test_extrapolation_error() {
        let spline = CubicSpline::new(vec![0.0, 1.0, 2.0], vec![0.0, 1.0, 4.0]).unwrap();
        assert!(spline.interpolate(-0.5).is_err());
        assert!(spline.interpolate(2.5).is_err());
    }
}
