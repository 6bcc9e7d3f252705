//! # Calibre Math
//!
//! Numerical building blocks for curve calibration.
//!
//! This crate provides:
//!
//! - **Transforms**: Bijections between constrained model parameters and
//!   unconstrained fitting parameters, with fixed-parameter masking
//! - **Differentiation**: Finite-difference Jacobians of vector functions
//! - **Solvers**: Newton iteration for square nonlinear systems
//! - **Linear Algebra**: Dense and tridiagonal linear solves
//! - **Interpolation**: One-dimensional interpolators used to build curves
//! - **Extrapolation**: Extension of curves beyond their first and last knots

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::similar_names)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::unreadable_literal)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::uninlined_format_args)]

pub mod differentiation;
pub mod error;
pub mod extrapolation;
pub mod interpolation;
pub mod linear_algebra;
pub mod solvers;
pub mod transform;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::differentiation::{DifferenceScheme, VectorFieldFirstOrderDifferentiator};
    pub use crate::error::{MathError, MathResult};
    pub use crate::extrapolation::{
        ExtrapolationMethod, Extrapolator, FlatExtrapolator, LinearExtrapolator,
    };
    pub use crate::interpolation::{
        CubicSpline, DoubleQuadraticInterpolator, InterpolationMethod, Interpolator,
        LinearInterpolator, LogLinearInterpolator,
    };
    pub use crate::solvers::{
        CancellationToken, NewtonConfig, NewtonResult, NewtonVectorRootFinder,
    };
    pub use crate::transform::{
        LimitDirection, NonLinearTransformFunction, ParameterTransform, ParameterTransformSet,
    };
}

pub use error::{MathError, MathResult};
