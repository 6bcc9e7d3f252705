//! Finite-difference differentiation of vector functions.
//!
//! [`VectorFieldFirstOrderDifferentiator`] turns a function `R^n -> R^m` into
//! an approximate Jacobian function `R^n -> R^(m x n)`. Steps are relative to
//! the evaluation point with a floor of one, so a component at zero still
//! gets a non-zero bump.

use nalgebra::{DMatrix, DVector};

use crate::error::MathError;

/// Default relative bump size.
pub const DEFAULT_EPS: f64 = 1e-6;

/// Finite-difference scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DifferenceScheme {
    /// `(f(x + h) - f(x)) / h`
    Forward,
    /// `(f(x + h) - f(x - h)) / 2h`
    #[default]
    Central,
    /// `(f(x) - f(x - h)) / h`
    Backward,
}

/// First-order finite-difference Jacobian of a vector field.
///
/// # Example
///
/// ```rust
/// use calibre_math::differentiation::VectorFieldFirstOrderDifferentiator;
/// use calibre_math::MathError;
/// use nalgebra::DVector;
///
/// let f = |x: &DVector<f64>| -> Result<DVector<f64>, MathError> {
///     Ok(DVector::from_vec(vec![x[0] * x[1], x[0] + x[1]]))
/// };
/// let jacobian = VectorFieldFirstOrderDifferentiator::default().differentiate(f);
/// let j = jacobian(&DVector::from_vec(vec![2.0, 3.0])).unwrap();
/// assert!((j[(0, 0)] - 3.0).abs() < 1e-8);
/// assert!((j[(1, 1)] - 1.0).abs() < 1e-8);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VectorFieldFirstOrderDifferentiator {
    scheme: DifferenceScheme,
    eps: f64,
}

impl Default for VectorFieldFirstOrderDifferentiator {
    fn default() -> Self {
        Self {
            scheme: DifferenceScheme::Central,
            eps: DEFAULT_EPS,
        }
    }
}

impl VectorFieldFirstOrderDifferentiator {
    /// Creates a differentiator.
    ///
    /// A non-positive or non-finite `eps` falls back to [`DEFAULT_EPS`].
    #[must_use]
    pub fn new(scheme: DifferenceScheme, eps: f64) -> Self {
        let eps = if eps.is_finite() && eps > 0.0 {
            eps
        } else {
            DEFAULT_EPS
        };
        Self { scheme, eps }
    }

    /// Sets the difference scheme.
    #[must_use]
    pub fn with_scheme(mut self, scheme: DifferenceScheme) -> Self {
        self.scheme = scheme;
        self
    }

    /// Sets the relative bump size.
    #[must_use]
    pub fn with_eps(self, eps: f64) -> Self {
        Self::new(self.scheme, eps)
    }

    /// The difference scheme in use.
    #[must_use]
    pub fn scheme(&self) -> DifferenceScheme {
        self.scheme
    }

    /// The relative bump size.
    #[must_use]
    pub fn eps(&self) -> f64 {
        self.eps
    }

    /// Bump applied to component value `x`.
    #[must_use]
    pub fn step(&self, x: f64) -> f64 {
        self.eps * x.abs().max(1.0)
    }

    /// Returns a closure evaluating the finite-difference Jacobian.
    pub fn differentiate<F, E>(&self, function: F) -> impl Fn(&DVector<f64>) -> Result<DMatrix<f64>, E>
    where
        F: Fn(&DVector<f64>) -> Result<DVector<f64>, E>,
        E: From<MathError>,
    {
        let this = *self;
        move |x: &DVector<f64>| this.jacobian(&function, x)
    }

    /// Evaluates the finite-difference Jacobian of `function` at `x`.
    ///
    /// The number of rows is taken from the first evaluation; later
    /// evaluations of a different length are rejected.
    pub fn jacobian<F, E>(&self, function: &F, x: &DVector<f64>) -> Result<DMatrix<f64>, E>
    where
        F: Fn(&DVector<f64>) -> Result<DVector<f64>, E>,
        E: From<MathError>,
    {
        let n = x.len();
        let centre = match self.scheme {
            DifferenceScheme::Central => None,
            DifferenceScheme::Forward | DifferenceScheme::Backward => Some(function(x)?),
        };

        let mut jacobian: Option<DMatrix<f64>> = None;
        let mut bumped = x.clone();
        for j in 0..n {
            let h = self.step(x[j]);
            let (up, down, width) = match (&centre, self.scheme) {
                (Some(f0), DifferenceScheme::Forward) => {
                    bumped[j] = x[j] + h;
                    (function(&bumped)?, f0.clone(), h)
                }
                (Some(f0), _) => {
                    bumped[j] = x[j] - h;
                    (f0.clone(), function(&bumped)?, h)
                }
                (None, _) => {
                    bumped[j] = x[j] + h;
                    let up = function(&bumped)?;
                    bumped[j] = x[j] - h;
                    (up, function(&bumped)?, 2.0 * h)
                }
            };
            if up.len() != down.len() {
                return Err(MathError::dimension_mismatch((up.len(), 1), (down.len(), 1)).into());
            }
            let column = (up - down) / width;
            bumped[j] = x[j];

            let jac = jacobian.get_or_insert_with(|| DMatrix::zeros(column.len(), n));
            if column.len() != jac.nrows() {
                return Err(MathError::dimension_mismatch((column.len(), 1), (jac.nrows(), 1)).into());
            }
            jac.set_column(j, &column);
        }

        match (jacobian, centre) {
            (Some(jac), _) => Ok(jac),
            (None, Some(f0)) => Ok(DMatrix::zeros(f0.len(), 0)),
            (None, None) => Ok(DMatrix::zeros(function(x)?.len(), 0)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MathResult;
    use approx::assert_relative_eq;

    fn field(x: &DVector<f64>) -> MathResult<DVector<f64>> {
        Ok(DVector::from_vec(vec![
            x[0].exp() * x[1],
            x[0] * x[0] - 3.0 * x[1],
            x[1].sin(),
        ]))
    }

    fn field_jacobian(x: &DVector<f64>) -> DMatrix<f64> {
        DMatrix::from_row_slice(
            3,
            2,
            &[
                x[0].exp() * x[1],
                x[0].exp(),
                2.0 * x[0],
                -3.0,
                0.0,
                x[1].cos(),
            ],
        )
    }

    #[test]
    fn test_all_schemes_approximate_jacobian() {
        let x = DVector::from_vec(vec![0.3, -1.2]);
        let exact = field_jacobian(&x);
        for (scheme, tol) in [
            (DifferenceScheme::Central, 1e-8),
            (DifferenceScheme::Forward, 1e-5),
            (DifferenceScheme::Backward, 1e-5),
        ] {
            let diff = VectorFieldFirstOrderDifferentiator::default().with_scheme(scheme);
            let approx = diff.jacobian(&field, &x).unwrap();
            assert_eq!(approx.shape(), (3, 2));
            for i in 0..3 {
                for j in 0..2 {
                    assert_relative_eq!(approx[(i, j)], exact[(i, j)], epsilon = tol);
                }
            }
        }
    }

    #[test]
    fn test_step_has_floor() {
        let diff = VectorFieldFirstOrderDifferentiator::default();
        assert_eq!(diff.step(0.0), DEFAULT_EPS);
        assert_relative_eq!(diff.step(-250.0), 250.0 * DEFAULT_EPS);
        assert_eq!(VectorFieldFirstOrderDifferentiator::new(DifferenceScheme::Forward, -1.0).eps(), DEFAULT_EPS);
    }

    #[test]
    fn test_kinked_function_does_not_fail() {
        let abs = |x: &DVector<f64>| -> MathResult<DVector<f64>> { Ok(x.map(f64::abs)) };
        let jac = VectorFieldFirstOrderDifferentiator::default()
            .differentiate(abs)(&DVector::from_vec(vec![0.0, 2.0]))
            .unwrap();
        assert_eq!(jac[(0, 0)], 0.0);
        assert_relative_eq!(jac[(1, 1)], 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_error_propagates() {
        let failing = |_: &DVector<f64>| -> MathResult<DVector<f64>> {
            Err(MathError::invalid_input("pricing failed"))
        };
        let result = VectorFieldFirstOrderDifferentiator::default()
            .jacobian(&failing, &DVector::from_vec(vec![1.0]));
        assert!(matches!(result, Err(MathError::InvalidInput { .. })));
    }
}
