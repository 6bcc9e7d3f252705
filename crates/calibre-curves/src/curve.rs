//! Interpolated zero-rate curves.

use std::fmt;
use std::sync::Arc;

use calibre_core::daycounts::DayCountConvention;
use calibre_core::Date;
use calibre_math::extrapolation::ExtrapolationMethod;
use calibre_math::interpolation::{InterpolationMethod, Interpolator};

use crate::error::{CurveError, CurveResult};

/// A curve of continuously compounded zero rates defined by knots.
///
/// Times are year fractions from the reference date under the curve day
/// count. Between the first and last knot the zero rate comes from the
/// interpolator; outside that range the left or right extrapolator extends
/// it from the boundary knot. A curve with a single knot is flat.
///
/// [`InterpolationMethod::LogLinear`] interpolates discount factors rather
/// than rates, which gives piecewise constant forwards; its knot times must
/// be positive.
///
/// Curves are immutable. [`with_values`](Self::with_values) produces a new
/// curve on the same knots, which is how calibration moves between iterates.
#[derive(Clone)]
pub struct InterpolatedCurve {
    name: String,
    day_count: DayCountConvention,
    reference_date: Date,
    times: Vec<f64>,
    values: Vec<f64>,
    interpolation: InterpolationMethod,
    left_extrapolation: ExtrapolationMethod,
    right_extrapolation: ExtrapolationMethod,
    interpolator: Option<Arc<dyn Interpolator>>,
}

impl InterpolatedCurve {
    /// Builds a curve from knot times and zero rates.
    ///
    /// # Errors
    ///
    /// Returns [`CurveError::InvalidCurve`] if there are no knots, if times and
    /// rates differ in length, or if the interpolator rejects the knots.
    pub fn new(
        name: impl Into<String>,
        day_count: DayCountConvention,
        reference_date: Date,
        times: Vec<f64>,
        values: Vec<f64>,
        interpolation: InterpolationMethod,
        left_extrapolation: ExtrapolationMethod,
        right_extrapolation: ExtrapolationMethod,
    ) -> CurveResult<Self> {
        let name = name.into();
        if times.is_empty() {
            return Err(CurveError::invalid_curve(name, "curve has no knots"));
        }
        if times.len() != values.len() {
            return Err(CurveError::invalid_curve(
                name,
                format!("{} times but {} values", times.len(), values.len()),
            ));
        }
        if let Some(i) = values.iter().position(|v| !v.is_finite()) {
            return Err(CurveError::invalid_curve(
                name,
                format!("zero rate at knot {i} is not finite"),
            ));
        }

        let interpolator = if times.len() > 1 {
            let knots = if interpolation == InterpolationMethod::LogLinear {
                if times[0] <= 0.0 {
                    return Err(CurveError::invalid_curve(
                        name,
                        "log-linear interpolation requires positive knot times",
                    ));
                }
                times
                    .iter()
                    .zip(&values)
                    .map(|(t, r)| (-r * t).exp())
                    .collect()
            } else {
                values.clone()
            };
            let built = interpolation
                .build(times.clone(), knots)
                .map_err(|e| CurveError::invalid_curve(name.clone(), e.to_string()))?;
            Some(Arc::from(built))
        } else {
            None
        };

        Ok(Self {
            name,
            day_count,
            reference_date,
            times,
            values,
            interpolation,
            left_extrapolation,
            right_extrapolation,
            interpolator,
        })
    }

    /// Returns a curve on the same knots with new zero rates.
    pub fn with_values(&self, values: Vec<f64>) -> CurveResult<Self> {
        Self::new(
            self.name.clone(),
            self.day_count,
            self.reference_date,
            self.times.clone(),
            values,
            self.interpolation,
            self.left_extrapolation,
            self.right_extrapolation,
        )
    }

    /// Curve name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Day count used to measure time.
    #[must_use]
    pub fn day_count(&self) -> DayCountConvention {
        self.day_count
    }

    /// The date at which time is zero.
    #[must_use]
    pub fn reference_date(&self) -> Date {
        self.reference_date
    }

    /// Knot times.
    #[must_use]
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Zero rates at the knots; these are the curve parameters.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of parameters.
    #[must_use]
    pub fn parameter_count(&self) -> usize {
        self.values.len()
    }

    /// Interpolation method.
    #[must_use]
    pub fn interpolation(&self) -> InterpolationMethod {
        self.interpolation
    }

    /// Extrapolation before the first knot.
    #[must_use]
    pub fn left_extrapolation(&self) -> ExtrapolationMethod {
        self.left_extrapolation
    }

    /// Extrapolation after the last knot.
    #[must_use]
    pub fn right_extrapolation(&self) -> ExtrapolationMethod {
        self.right_extrapolation
    }

    /// Year fraction from the reference date to `date`.
    #[must_use]
    pub fn year_fraction(&self, date: Date) -> f64 {
        self.day_count.year_fraction_f64(self.reference_date, date)
    }

    /// Continuously compounded zero rate at time `t`.
    pub fn zero_rate(&self, t: f64) -> CurveResult<f64> {
        let Some(interpolator) = &self.interpolator else {
            return Ok(self.values[0]);
        };
        let first = self.times[0];
        let last = self.times[self.times.len() - 1];

        if t < first {
            let (rate, slope) = self.rate_and_slope(interpolator.as_ref(), first)?;
            Ok(self
                .left_extrapolation
                .extrapolator()
                .extrapolate(t, first, rate, slope))
        } else if t > last {
            let (rate, slope) = self.rate_and_slope(interpolator.as_ref(), last)?;
            Ok(self
                .right_extrapolation
                .extrapolator()
                .extrapolate(t, last, rate, slope))
        } else {
            Ok(self.rate_and_slope(interpolator.as_ref(), t)?.0)
        }
    }

    /// Discount factor at time `t`.
    pub fn discount_factor_at(&self, t: f64) -> CurveResult<f64> {
        if t == 0.0 {
            return Ok(1.0);
        }
        Ok((-self.zero_rate(t)? * t).exp())
    }

    /// Discount factor from the reference date to `date`.
    pub fn discount_factor(&self, date: Date) -> CurveResult<f64> {
        self.discount_factor_at(self.year_fraction(date))
    }

    fn rate_and_slope(&self, interpolator: &dyn Interpolator, t: f64) -> CurveResult<(f64, f64)> {
        let value = interpolator.interpolate(t)?;
        let slope = interpolator.derivative(t)?;
        if self.interpolation != InterpolationMethod::LogLinear {
            return Ok((value, slope));
        }
        // value is a discount factor here
        let rate = -value.ln() / t;
        Ok((rate, (-slope / value - rate) / t))
    }
}

impl fmt::Debug for InterpolatedCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterpolatedCurve")
            .field("name", &self.name)
            .field("day_count", &self.day_count)
            .field("reference_date", &self.reference_date)
            .field("times", &self.times)
            .field("values", &self.values)
            .field("interpolation", &self.interpolation)
            .field("left_extrapolation", &self.left_extrapolation)
            .field("right_extrapolation", &self.right_extrapolation)
            .finish_non_exhaustive()
    }
}
