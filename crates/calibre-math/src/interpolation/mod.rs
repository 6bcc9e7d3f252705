//! Interpolation methods for curve construction.
//!
//! # Available Methods
//!
//! - [`LinearInterpolator`]: Piecewise linear
//! - [`LogLinearInterpolator`]: Linear in `ln(y)`, for positive values such as discount factors
//! - [`DoubleQuadraticInterpolator`]: Weighted blend of overlapping quadratics
//! - [`CubicSpline`]: Natural cubic spline
//!
//! [`InterpolationMethod`] is the serializable identifier used in curve
//! configuration.

mod cubic_spline;
mod double_quadratic;
mod linear;
mod log_linear;

pub use cubic_spline::CubicSpline;
pub use double_quadratic::DoubleQuadraticInterpolator;
pub use linear::LinearInterpolator;
pub use log_linear::LogLinearInterpolator;

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::error::{MathError, MathResult};

/// Trait for interpolation methods.
pub trait Interpolator: Send + Sync {
    /// Returns the interpolated value at x.
    fn interpolate(&self, x: f64) -> MathResult<f64>;

    /// Returns the first derivative at x.
    fn derivative(&self, x: f64) -> MathResult<f64>;

    /// Returns the minimum x value in the data.
    fn min_x(&self) -> f64;

    /// Returns the maximum x value in the data.
    fn max_x(&self) -> f64;

    /// Checks if x is within the interpolation range.
    fn in_range(&self, x: f64) -> bool {
        x >= self.min_x() && x <= self.max_x()
    }
}

/// Interpolator identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum InterpolationMethod {
    /// Piecewise linear.
    Linear,
    /// Linear on the logarithm of the values.
    LogLinear,
    /// Blend of the two quadratics through neighbouring knots.
    #[default]
    DoubleQuadratic,
    /// Natural cubic spline.
    NaturalCubicSpline,
}

impl InterpolationMethod {
    /// Builds an interpolator over the given knots.
    pub fn build(self, xs: Vec<f64>, ys: Vec<f64>) -> MathResult<Box<dyn Interpolator>> {
        Ok(match self {
            InterpolationMethod::Linear => Box::new(LinearInterpolator::new(xs, ys)?),
            InterpolationMethod::LogLinear => Box::new(LogLinearInterpolator::new(xs, ys)?),
            InterpolationMethod::DoubleQuadratic => {
                Box::new(DoubleQuadraticInterpolator::new(xs, ys)?)
            }
            InterpolationMethod::NaturalCubicSpline => Box::new(CubicSpline::new(xs, ys)?),
        })
    }

    /// Returns the name of the method.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            InterpolationMethod::Linear => "Linear",
            InterpolationMethod::LogLinear => "LogLinear",
            InterpolationMethod::DoubleQuadratic => "DoubleQuadratic",
            InterpolationMethod::NaturalCubicSpline => "NaturalCubicSpline",
        }
    }
}

impl std::fmt::Display for InterpolationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Checks knot arrays shared by every interpolator.
pub(crate) fn validate_knots(xs: &[f64], ys: &[f64], required: usize) -> MathResult<()> {
    if xs.len() < required {
        return Err(MathError::insufficient_data(required, xs.len()));
    }
    if xs.len() != ys.len() {
        return Err(MathError::invalid_input(format!(
            "xs and ys must have same length: {} vs {}",
            xs.len(),
            ys.len()
        )));
    }
    if xs.iter().chain(ys).any(|v| !v.is_finite()) {
        return Err(MathError::non_finite("interpolation knots"));
    }
    if xs.windows(2).any(|w| w[1] <= w[0]) {
        return Err(MathError::invalid_input(
            "x values must be strictly increasing",
        ));
    }
    Ok(())
}

/// Rejects points outside the knot range.
pub(crate) fn check_range(xs: &[f64], x: f64) -> MathResult<()> {
    let (min, max) = (xs[0], xs[xs.len() - 1]);
    if x < min || x > max || x.is_nan() {
        return Err(MathError::ExtrapolationNotAllowed { x, min, max });
    }
    Ok(())
}

/// Finds the index i such that xs[i] <= x < xs[i+1].
pub(crate) fn find_segment(xs: &[f64], x: f64) -> usize {
    match xs.binary_search_by(|probe| probe.partial_cmp(&x).unwrap_or(Ordering::Equal)) {
        Ok(i) => i.min(xs.len() - 2),
        Err(i) => i.saturating_sub(1).min(xs.len() - 2),
    }
}
