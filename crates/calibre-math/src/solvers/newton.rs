//! Newton iteration for square nonlinear systems.

use log::{debug, warn};
use nalgebra::{DMatrix, DVector};

use super::{CancellationToken, NewtonConfig, NewtonResult};
use crate::differentiation::VectorFieldFirstOrderDifferentiator;
use crate::error::MathError;
use crate::linear_algebra::solve_linear_system;

/// Newton root finder for `F: R^n -> R^n`.
///
/// Each step evaluates `r = F(x)`, stops if `||r|| < tolerance`, otherwise
/// solves `J(x) d = -r` and moves to `x + d`. The iteration is fully
/// deterministic.
///
/// Failures:
/// - [`MathError::SingularMatrix`] when the Jacobian cannot be factorized
/// - [`MathError::ConvergenceFailed`] when the iteration budget runs out
/// - [`MathError::Cancelled`] when the cancellation token is raised
///
/// Errors produced by the function or Jacobian closures are returned
/// unchanged.
#[derive(Debug, Clone, Default)]
pub struct NewtonVectorRootFinder {
    config: NewtonConfig,
    differentiator: VectorFieldFirstOrderDifferentiator,
    cancellation: Option<CancellationToken>,
}

impl NewtonVectorRootFinder {
    /// Creates a solver with the central-difference fallback Jacobian.
    #[must_use]
    pub fn new(config: NewtonConfig) -> Self {
        Self {
            config,
            differentiator: VectorFieldFirstOrderDifferentiator::default(),
            cancellation: None,
        }
    }

    /// Sets the differentiator used when no Jacobian is supplied.
    #[must_use]
    pub fn with_differentiator(mut self, differentiator: VectorFieldFirstOrderDifferentiator) -> Self {
        self.differentiator = differentiator;
        self
    }

    /// Attaches a cancellation token, checked before every iteration.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// The solver configuration.
    #[must_use]
    pub fn config(&self) -> &NewtonConfig {
        &self.config
    }

    /// Solves `function(x) = 0` starting from `initial`.
    ///
    /// Uses `jacobian` when supplied, otherwise a finite-difference
    /// approximation of `function`.
    pub fn solve<F, J, E>(
        &self,
        function: F,
        jacobian: Option<J>,
        initial: &DVector<f64>,
    ) -> Result<NewtonResult, E>
    where
        F: Fn(&DVector<f64>) -> Result<DVector<f64>, E>,
        J: Fn(&DVector<f64>) -> Result<DMatrix<f64>, E>,
        E: From<MathError>,
    {
        match jacobian {
            Some(jacobian) => self.iterate(&function, &jacobian, initial),
            None => {
                let fd = |x: &DVector<f64>| self.differentiator.jacobian(&function, x);
                self.iterate(&function, &fd, initial)
            }
        }
    }

    /// Solves `function(x) = 0` with a finite-difference Jacobian.
    pub fn solve_numerical<F, E>(&self, function: F, initial: &DVector<f64>) -> Result<NewtonResult, E>
    where
        F: Fn(&DVector<f64>) -> Result<DVector<f64>, E>,
        E: From<MathError>,
    {
        self.solve(
            function,
            None::<fn(&DVector<f64>) -> Result<DMatrix<f64>, E>>,
            initial,
        )
    }

    fn iterate<F, J, E>(&self, function: &F, jacobian: &J, initial: &DVector<f64>) -> Result<NewtonResult, E>
    where
        F: Fn(&DVector<f64>) -> Result<DVector<f64>, E>,
        J: Fn(&DVector<f64>) -> Result<DMatrix<f64>, E>,
        E: From<MathError>,
    {
        let mut x = initial.clone();

        for iteration in 0..=self.config.max_iterations {
            if self.cancellation.as_ref().is_some_and(CancellationToken::is_cancelled) {
                debug!("Newton iteration cancelled after {iteration} iterations");
                return Err(MathError::Cancelled {
                    iterations: iteration,
                }
                .into());
            }

            let residual = function(&x)?;
            if residual.len() != x.len() {
                return Err(MathError::dimension_mismatch((residual.len(), 1), (x.len(), 1)).into());
            }
            if residual.iter().any(|r| !r.is_finite()) {
                return Err(MathError::non_finite(format!("residual at iteration {iteration}")).into());
            }

            let norm = residual.norm();
            debug!("Newton iteration {iteration}: residual norm {norm:.3e}");
            if norm < self.config.tolerance {
                return Ok(NewtonResult {
                    root: x,
                    iterations: iteration,
                    residual_norm: norm,
                });
            }
            if iteration == self.config.max_iterations {
                return Err(MathError::convergence_failed(iteration, norm).into());
            }

            let jac = jacobian(&x)?;
            let step = solve_linear_system(&jac, &(-residual)).map_err(|e| {
                warn!("Newton iteration {iteration}: linear solve failed: {e}");
                e
            })?;
            x += step;
        }

        // The loop returns on its final pass.
        Err(MathError::convergence_failed(self.config.max_iterations, f64::NAN).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MathResult;
    use approx::assert_relative_eq;

    fn circle_line(v: &DVector<f64>) -> MathResult<DVector<f64>> {
        Ok(DVector::from_vec(vec![
            v[0] * v[0] + v[1] * v[1] - 4.0,
            v[0] - v[1],
        ]))
    }

    fn circle_line_jacobian(v: &DVector<f64>) -> MathResult<DMatrix<f64>> {
        Ok(DMatrix::from_row_slice(2, 2, &[2.0 * v[0], 2.0 * v[1], 1.0, -1.0]))
    }

    #[test]
    fn test_analytic_jacobian() {
        let solver = NewtonVectorRootFinder::new(NewtonConfig::default());
        let result = solver
            .solve(circle_line, Some(circle_line_jacobian), &DVector::from_vec(vec![1.0, 2.0]))
            .unwrap();
        assert_relative_eq!(result.root[0], 2f64.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(result.root[1], 2f64.sqrt(), epsilon = 1e-12);
        assert!(result.residual_norm < 1e-12);
        assert!(result.iterations < 10);
    }

    #[test]
    fn test_numerical_jacobian() {
        let solver = NewtonVectorRootFinder::new(NewtonConfig::default());
        let result = solver
            .solve_numerical(circle_line, &DVector::from_vec(vec![3.0, 0.5]))
            .unwrap();
        assert_relative_eq!(result.root[0], 2f64.sqrt(), epsilon = 1e-10);
    }

    #[test]
    fn test_already_converged_takes_no_steps() {
        let solver = NewtonVectorRootFinder::new(NewtonConfig::default());
        let start = DVector::from_vec(vec![2f64.sqrt(), 2f64.sqrt()]);
        let result = solver.solve_numerical(circle_line, &start).unwrap();
        assert_eq!(result.iterations, 0);
        assert_eq!(result.root, start);
    }

    #[test]
    fn test_singular_jacobian() {
        let f = |v: &DVector<f64>| -> MathResult<DVector<f64>> {
            Ok(DVector::from_vec(vec![v[0] + v[1] - 1.0, 2.0 * v[0] + 2.0 * v[1] - 3.0]))
        };
        let jac = |_: &DVector<f64>| -> MathResult<DMatrix<f64>> {
            Ok(DMatrix::from_row_slice(2, 2, &[1.0, 1.0, 2.0, 2.0]))
        };
        let solver = NewtonVectorRootFinder::new(NewtonConfig::default());
        let result = solver.solve(f, Some(jac), &DVector::from_vec(vec![0.0, 0.0]));
        assert_eq!(result.unwrap_err(), MathError::SingularMatrix);
    }

    #[test]
    fn test_budget_exhausted() {
        // No real root: x^2 + 1 = 0
        let f = |v: &DVector<f64>| -> MathResult<DVector<f64>> {
            Ok(DVector::from_vec(vec![v[0] * v[0] + 1.0]))
        };
        let solver = NewtonVectorRootFinder::new(NewtonConfig::new(1e-12, 5));
        match solver.solve_numerical(f, &DVector::from_vec(vec![0.7])) {
            Err(MathError::ConvergenceFailed {
                iterations,
                residual,
            }) => {
                assert_eq!(iterations, 5);
                assert!(residual >= 1.0);
            }
            other => panic!("expected convergence failure, got {other:?}"),
        }
    }

    #[test]
    fn test_cancelled_before_first_step() {
        let token = CancellationToken::new();
        token.cancel();
        let solver = NewtonVectorRootFinder::new(NewtonConfig::default()).with_cancellation(token);
        let result = solver.solve_numerical(circle_line, &DVector::from_vec(vec![1.0, 2.0]));
        assert_eq!(result.unwrap_err(), MathError::Cancelled { iterations: 0 });
    }

    #[test]
    fn test_function_error_passes_through() {
        let f = |_: &DVector<f64>| -> MathResult<DVector<f64>> {
            Err(MathError::invalid_input("missing quote"))
        };
        let solver = NewtonVectorRootFinder::new(NewtonConfig::default());
        let result = solver.solve_numerical(f, &DVector::from_vec(vec![1.0]));
        assert!(matches!(result, Err(MathError::InvalidInput { .. })));
    }

    #[test]
    fn test_non_square_system_rejected() {
        let f = |v: &DVector<f64>| -> MathResult<DVector<f64>> {
            Ok(DVector::from_vec(vec![v[0], v[0]]))
        };
        let solver = NewtonVectorRootFinder::new(NewtonConfig::default());
        let result = solver.solve_numerical(f, &DVector::from_vec(vec![1.0]));
        assert!(matches!(result, Err(MathError::DimensionMismatch { .. })));
    }
}
