//! Root finding for square nonlinear systems.
//!
//! - [`NewtonVectorRootFinder`]: Newton iteration with an analytic or
//!   finite-difference Jacobian
//! - [`CancellationToken`]: Cooperative cancellation checked between
//!   iterations
//!
//! # Example
//!
//! ```rust
//! use calibre_math::solvers::{NewtonConfig, NewtonVectorRootFinder};
//! use calibre_math::MathError;
//! use nalgebra::DVector;
//!
//! // x^2 + y^2 = 4, x = y
//! let f = |v: &DVector<f64>| -> Result<DVector<f64>, MathError> {
//!     Ok(DVector::from_vec(vec![v[0] * v[0] + v[1] * v[1] - 4.0, v[0] - v[1]]))
//! };
//!
//! let solver = NewtonVectorRootFinder::new(NewtonConfig::default());
//! let result = solver.solve_numerical(f, &DVector::from_vec(vec![1.0, 2.0])).unwrap();
//! assert!((result.root[0] - 2f64.sqrt()).abs() < 1e-10);
//! ```

mod newton;

pub use newton::NewtonVectorRootFinder;

use nalgebra::DVector;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Default absolute tolerance on the residual norm.
pub const DEFAULT_TOLERANCE: f64 = 1e-12;

/// Default maximum iterations.
pub const DEFAULT_MAX_ITERATIONS: u32 = 100;

/// Configuration for Newton iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewtonConfig {
    /// Convergence threshold on the Euclidean norm of the residual.
    pub tolerance: f64,
    /// Maximum number of Newton steps.
    pub max_iterations: u32,
}

impl Default for NewtonConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl NewtonConfig {
    /// Creates a new configuration.
    #[must_use]
    pub fn new(tolerance: f64, max_iterations: u32) -> Self {
        Self {
            tolerance,
            max_iterations,
        }
    }

    /// Sets the tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Sets the maximum iterations.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }
}

/// Result of a successful solve.
#[derive(Debug, Clone, PartialEq)]
pub struct NewtonResult {
    /// The solution vector.
    pub root: DVector<f64>,
    /// Number of Newton steps taken.
    pub iterations: u32,
    /// Residual norm at the solution.
    pub residual_norm: f64,
}

/// A shared flag used to abort long-running iterations.
///
/// Clones share the same flag, so a token handed to a solver can be
/// cancelled from another thread.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates a token in the not-cancelled state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Returns true once cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
