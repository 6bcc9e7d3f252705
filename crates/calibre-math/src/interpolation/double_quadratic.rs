//! Double quadratic interpolation.

use super::{check_range, find_segment, validate_knots};
use crate::error::MathResult;
use crate::interpolation::Interpolator;

/// Double quadratic interpolation.
///
/// On the segment `[x_i, x_{i+1}]` the value is a linear blend of the
/// quadratic through knots `i-1, i, i+1` and the quadratic through knots
/// `i, i+1, i+2`, weighted towards the left quadratic at `x_i` and the right
/// one at `x_{i+1}`. End segments use the single quadratic available; with
/// two knots the method reduces to linear interpolation.
///
/// The result passes through every knot and has a continuous first
/// derivative at interior knots.
#[derive(Debug, Clone)]
pub struct DoubleQuadraticInterpolator {
    xs: Vec<f64>,
    ys: Vec<f64>,
}

impl DoubleQuadraticInterpolator {
    /// Creates a new double quadratic interpolator.
    ///
    /// # Errors
    ///
    /// Returns an error if there are fewer than 2 points, if lengths differ,
    /// or if `xs` is not strictly increasing.
    pub fn new(xs: Vec<f64>, ys: Vec<f64>) -> MathResult<Self> {
        validate_knots(&xs, &ys, 2)?;
        Ok(Self { xs, ys })
    }

    /// Value and slope of the quadratic through knots `k, k+1, k+2` at `x`.
    fn quadratic(&self, k: usize, x: f64) -> (f64, f64) {
        let (x0, x1, x2) = (self.xs[k], self.xs[k + 1], self.xs[k + 2]);
        let (y0, y1, y2) = (self.ys[k], self.ys[k + 1], self.ys[k + 2]);

        let l0 = (x - x1) * (x - x2) / ((x0 - x1) * (x0 - x2));
        let l1 = (x - x0) * (x - x2) / ((x1 - x0) * (x1 - x2));
        let l2 = (x - x0) * (x - x1) / ((x2 - x0) * (x2 - x1));

        let d0 = (2.0 * x - x1 - x2) / ((x0 - x1) * (x0 - x2));
        let d1 = (2.0 * x - x0 - x2) / ((x1 - x0) * (x1 - x2));
        let d2 = (2.0 * x - x0 - x1) / ((x2 - x0) * (x2 - x1));

        (y0 * l0 + y1 * l1 + y2 * l2, y0 * d0 + y1 * d1 + y2 * d2)
    }

    fn evaluate(&self, x: f64) -> (f64, f64) {
        let n = self.xs.len();
        let i = find_segment(&self.xs, x);

        if n == 2 {
            let slope = (self.ys[1] - self.ys[0]) / (self.xs[1] - self.xs[0]);
            return (self.ys[0] + (x - self.xs[0]) * slope, slope);
        }

        let has_left = i >= 1;
        let has_right = i + 2 < n;
        match (has_left, has_right) {
            (true, true) => {
                let (ql, dl) = self.quadratic(i - 1, x);
                let (qr, dr) = self.quadratic(i, x);
                let h = self.xs[i + 1] - self.xs[i];
                let w = (self.xs[i + 1] - x) / h;
                let value = w * ql + (1.0 - w) * qr;
                let slope = w * dl + (1.0 - w) * dr + (qr - ql) / h;
                (value, slope)
            }
            (true, false) => self.quadratic(i - 1, x),
            _ => self.quadratic(i, x),
        }
    }
}

impl Interpolator for DoubleQuadraticInterpolator {
    fn interpolate(&self, x: f64) -> MathResult<f64> {
        check_range(&self.xs, x)?;
        Ok(self.evaluate(x).0)
    }

    fn derivative(&self, x: f64) -> MathResult<f64> {
        check_range(&self.xs, x)?;
        Ok(self.evaluate(x).1)
    }

    fn min_x(&self) -> f64 {
        self.xs[0]
    }

    fn max_x(&self) -> f64 {
        self.xs[self.xs.len() - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_reproduces_quadratic() {
        let f = |x: f64| 0.5 * x * x - x + 2.0;
        let xs = vec![0.0, 0.5, 1.5, 2.0, 4.0];
        let ys: Vec<f64> = xs.iter().map(|x| f(*x)).collect();
        let interp = DoubleQuadraticInterpolator::new(xs, ys).unwrap();
        for x in [0.1, 0.9, 1.7, 3.3] {
            assert_relative_eq!(interp.interpolate(x).unwrap(), f(x), epsilon = 1e-12);
            assert_relative_eq!(interp.derivative(x).unwrap(), x - 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_slope_continuous_at_knots() {
        let xs = vec![0.25, 0.5, 1.0, 2.0, 3.0];
        let ys = vec![0.003, 0.0034, 0.0041, 0.0062, 0.009];
        let interp = DoubleQuadraticInterpolator::new(xs, ys).unwrap();
        for knot in [0.5, 1.0, 2.0] {
            let left = interp.derivative(knot - 1e-9).unwrap();
            let right = interp.derivative(knot + 1e-9).unwrap();
            assert_relative_eq!(left, right, epsilon = 1e-8);
        }
    }

    #[test]
    fn test_two_points_is_linear() {
        let interp = DoubleQuadraticInterpolator::new(vec![1.0, 2.0], vec![3.0, 5.0]).unwrap();
        assert_relative_eq!(interp.interpolate(1.25).unwrap(), 3.5);
        assert_relative_eq!(interp.derivative(1.25).unwrap(), 2.0);
    }
}
