//! Parameter transforms.
//!
//! A calibration solves for *model* parameters that may be constrained
//! (a rate that must stay positive, a weight in `(0, 1)`), while the root
//! finder works on the whole real line. A [`ParameterTransform`] is a smooth
//! bijection between the two:
//!
//! ```text
//!   fitting (R)  --to_model-->  model (domain)
//!   fitting (R)  <--to_fitting--  model (domain)
//! ```
//!
//! [`ParameterTransformSet`] applies one transform per parameter and masks
//! out fixed parameters; [`NonLinearTransformFunction`] lifts a model-space
//! function and its Jacobian into fitting space.

mod function;
mod set;

pub use function::NonLinearTransformFunction;
pub use set::ParameterTransformSet;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{MathError, MathResult};

/// Beyond this fitting magnitude `tanh` is flat in double precision.
const TANH_MAX: f64 = 18.0;

/// Switch point from exponential to linear growth for one-sided limits.
const EXP_MAX: f64 = 50.0;

/// Side of a one-sided limit on which the model value lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LimitDirection {
    /// Model values lie in `(limit, +inf)`.
    GreaterThan,
    /// Model values lie in `(-inf, limit)`.
    LessThan,
}

impl LimitDirection {
    fn sign(self) -> f64 {
        match self {
            LimitDirection::GreaterThan => 1.0,
            LimitDirection::LessThan => -1.0,
        }
    }
}

/// A bijection between an unconstrained fitting value and a model value.
///
/// # Example
///
/// ```rust
/// use calibre_math::transform::{LimitDirection, ParameterTransform};
///
/// let positive = ParameterTransform::one_sided_limit(0.0, LimitDirection::GreaterThan).unwrap();
/// let y = positive.to_fitting(0.03).unwrap();
/// assert!((positive.to_model(y) - 0.03).abs() < 1e-15);
/// assert!(positive.to_model(-1000.0) > 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ParameterTransform {
    /// No constraint: fitting and model values coincide.
    #[default]
    Identity,

    /// Model value confined to the open interval `(lower, upper)`.
    ///
    /// `model = mid + half_width * tanh(fitting)`.
    TwoSidedRange {
        /// Lower bound (exclusive).
        lower: f64,
        /// Upper bound (exclusive).
        upper: f64,
    },

    /// Model value confined to one side of `limit`.
    ///
    /// `model = limit ± exp(fitting)`, continued linearly for large fitting
    /// values so the map stays finite.
    OneSidedLimit {
        /// The limit (exclusive).
        limit: f64,
        /// Which side of the limit is admissible.
        direction: LimitDirection,
    },
}

impl ParameterTransform {
    /// Creates a two-sided range transform.
    ///
    /// # Errors
    ///
    /// Returns an error unless both bounds are finite and `lower < upper`.
    pub fn two_sided_range(lower: f64, upper: f64) -> MathResult<Self> {
        if !(lower.is_finite() && upper.is_finite()) || next_up(lower) >= upper {
            return Err(MathError::invalid_input(format!(
                "range bounds must be finite with lower < upper, got ({lower}, {upper})"
            )));
        }
        Ok(ParameterTransform::TwoSidedRange { lower, upper })
    }

    /// Creates a one-sided limit transform.
    ///
    /// # Errors
    ///
    /// Returns an error if the limit is not finite.
    pub fn one_sided_limit(limit: f64, direction: LimitDirection) -> MathResult<Self> {
        if !limit.is_finite() {
            return Err(MathError::invalid_input(format!(
                "limit must be finite, got {limit}"
            )));
        }
        Ok(ParameterTransform::OneSidedLimit { limit, direction })
    }

    /// Returns true if `model` lies strictly inside the transform's domain.
    #[must_use]
    pub fn contains(&self, model: f64) -> bool {
        if model.is_nan() {
            return false;
        }
        match *self {
            ParameterTransform::Identity => model.is_finite(),
            ParameterTransform::TwoSidedRange { lower, upper } => model > lower && model < upper,
            ParameterTransform::OneSidedLimit { limit, direction } => {
                model.is_finite() && direction.sign() * (model - limit) > 0.0
            }
        }
    }

    /// Maps a model value to its fitting value.
    ///
    /// # Errors
    ///
    /// Returns [`MathError::OutsideDomain`] if `model` is not strictly inside
    /// the domain.
    pub fn to_fitting(&self, model: f64) -> MathResult<f64> {
        if !self.contains(model) {
            return Err(MathError::OutsideDomain {
                value: model,
                domain: self.to_string(),
            });
        }
        Ok(match *self {
            ParameterTransform::Identity => model,
            ParameterTransform::TwoSidedRange { lower, upper } => {
                let mid = 0.5 * (lower + upper);
                let half = 0.5 * (upper - lower);
                ((model - mid) / half).atanh()
            }
            ParameterTransform::OneSidedLimit { limit, direction } => {
                let r = direction.sign() * (model - limit);
                let switch = EXP_MAX.exp();
                if r <= switch {
                    r.ln()
                } else {
                    EXP_MAX + r / switch - 1.0
                }
            }
        })
    }

    /// Maps a fitting value to its model value.
    ///
    /// For every finite input the result lies strictly inside the domain.
    #[must_use]
    pub fn to_model(&self, fitting: f64) -> f64 {
        match *self {
            ParameterTransform::Identity => fitting,
            ParameterTransform::TwoSidedRange { lower, upper } => {
                let mid = 0.5 * (lower + upper);
                let half = 0.5 * (upper - lower);
                let model = mid + half * fitting.clamp(-TANH_MAX, TANH_MAX).tanh();
                model.clamp(next_up(lower), next_down(upper))
            }
            ParameterTransform::OneSidedLimit { limit, direction } => {
                let r = if fitting <= EXP_MAX {
                    fitting.exp()
                } else {
                    EXP_MAX.exp() * (1.0 + fitting - EXP_MAX)
                };
                match direction {
                    LimitDirection::GreaterThan => (limit + r).max(next_up(limit)),
                    LimitDirection::LessThan => (limit - r).min(next_down(limit)),
                }
            }
        }
    }

    /// Derivative `d model / d fitting` at a fitting value.
    #[must_use]
    pub fn local_derivative(&self, fitting: f64) -> f64 {
        match *self {
            ParameterTransform::Identity => 1.0,
            ParameterTransform::TwoSidedRange { lower, upper } => {
                if fitting.abs() > TANH_MAX {
                    return 0.0;
                }
                let t = fitting.tanh();
                0.5 * (upper - lower) * (1.0 - t * t)
            }
            ParameterTransform::OneSidedLimit { direction, .. } => {
                let slope = if fitting <= EXP_MAX {
                    fitting.exp()
                } else {
                    EXP_MAX.exp()
                };
                direction.sign() * slope
            }
        }
    }
}

impl fmt::Display for ParameterTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterTransform::Identity => write!(f, "(-inf, +inf)"),
            ParameterTransform::TwoSidedRange { lower, upper } => write!(f, "({lower}, {upper})"),
            ParameterTransform::OneSidedLimit {
                limit,
                direction: LimitDirection::GreaterThan,
            } => write!(f, "({limit}, +inf)"),
            ParameterTransform::OneSidedLimit {
                limit,
                direction: LimitDirection::LessThan,
            } => write!(f, "(-inf, {limit})"),
        }
    }
}

/// Smallest double strictly greater than `x`.
fn next_up(x: f64) -> f64 {
    if x.is_nan() || x == f64::INFINITY {
        return x;
    }
    if x == 0.0 {
        return f64::from_bits(1);
    }
    let bits = x.to_bits();
    if x > 0.0 {
        f64::from_bits(bits + 1)
    } else {
        f64::from_bits(bits - 1)
    }
}

/// Largest double strictly less than `x`.
fn next_down(x: f64) -> f64 {
    -next_up(-x)
}
