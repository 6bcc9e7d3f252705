//! Uncoupled per-parameter transforms with fixed-parameter masking.

use nalgebra::{DMatrix, DVector};

use super::ParameterTransform;
use crate::error::{MathError, MathResult};

/// One transform per model parameter, plus a mask of fixed parameters.
///
/// Fixed parameters are held at their starting model values and do not
/// appear in the fitting vector at all, so a set with `n` model parameters
/// and `k` fixed ones produces fitting vectors of length `n - k`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterTransformSet {
    start: Vec<f64>,
    transforms: Vec<ParameterTransform>,
    fixed: Vec<bool>,
    free_count: usize,
}

impl ParameterTransformSet {
    /// Creates a transform set.
    ///
    /// # Arguments
    ///
    /// * `start` - Model values; entries for fixed parameters are kept as-is
    /// * `transforms` - Transform for each model parameter
    /// * `fixed` - `true` for parameters excluded from fitting
    ///
    /// # Errors
    ///
    /// Returns an error if the three slices differ in length, or if a fixed
    /// value is not finite.
    pub fn new(
        start: Vec<f64>,
        transforms: Vec<ParameterTransform>,
        fixed: Vec<bool>,
    ) -> MathResult<Self> {
        if start.len() != transforms.len() || start.len() != fixed.len() {
            return Err(MathError::invalid_input(format!(
                "start ({}), transforms ({}) and fixed mask ({}) must have equal length",
                start.len(),
                transforms.len(),
                fixed.len()
            )));
        }
        if let Some(i) = (0..start.len()).find(|&i| fixed[i] && !start[i].is_finite()) {
            return Err(MathError::non_finite(format!("fixed parameter {i}")));
        }
        let free_count = fixed.iter().filter(|f| !**f).count();
        Ok(Self {
            start,
            transforms,
            fixed,
            free_count,
        })
    }

    /// Identity transforms on every parameter with nothing fixed.
    #[must_use]
    pub fn unconstrained(start: Vec<f64>) -> Self {
        let n = start.len();
        Self {
            start,
            transforms: vec![ParameterTransform::Identity; n],
            fixed: vec![false; n],
            free_count: n,
        }
    }

    /// Number of model parameters.
    #[must_use]
    pub fn model_len(&self) -> usize {
        self.start.len()
    }

    /// Number of fitting parameters (free model parameters).
    #[must_use]
    pub fn fitting_len(&self) -> usize {
        self.free_count
    }

    /// Returns true if model parameter `index` is fixed.
    #[must_use]
    pub fn is_fixed(&self, index: usize) -> bool {
        self.fixed.get(index).copied().unwrap_or(false)
    }

    /// The model values the set was created with.
    #[must_use]
    pub fn start(&self) -> &[f64] {
        &self.start
    }

    /// Fitting vector corresponding to the starting model values.
    pub fn start_fitting(&self) -> MathResult<DVector<f64>> {
        self.transform(&DVector::from_column_slice(&self.start))
    }

    /// Maps a model vector to a fitting vector, dropping fixed parameters.
    pub fn transform(&self, model: &DVector<f64>) -> MathResult<DVector<f64>> {
        if model.len() != self.model_len() {
            return Err(MathError::dimension_mismatch(
                (model.len(), 1),
                (self.model_len(), 1),
            ));
        }
        let mut fitting = Vec::with_capacity(self.free_count);
        for (i, transform) in self.transforms.iter().enumerate() {
            if !self.fixed[i] {
                fitting.push(transform.to_fitting(model[i])?);
            }
        }
        Ok(DVector::from_vec(fitting))
    }

    /// Maps a fitting vector back to a full model vector.
    ///
    /// Fixed parameters are reinserted at their starting values and index
    /// order is preserved.
    pub fn inverse_transform(&self, fitting: &DVector<f64>) -> MathResult<DVector<f64>> {
        if fitting.len() != self.free_count {
            return Err(MathError::dimension_mismatch(
                (fitting.len(), 1),
                (self.free_count, 1),
            ));
        }
        let mut model = DVector::from_column_slice(&self.start);
        let free = (0..self.model_len()).filter(|&i| !self.fixed[i]);
        for (i, y) in free.zip(fitting.iter()) {
            model[i] = self.transforms[i].to_model(*y);
        }
        Ok(model)
    }

    /// Converts a model-space Jacobian into a fitting-space Jacobian.
    ///
    /// Column `i` of `model_jacobian` is scaled by the local derivative of
    /// parameter `i`'s transform at the matching fitting value; columns of
    /// fixed parameters are dropped.
    pub fn jacobian(
        &self,
        model_jacobian: &DMatrix<f64>,
        fitting: &DVector<f64>,
    ) -> MathResult<DMatrix<f64>> {
        if model_jacobian.ncols() != self.model_len() {
            return Err(MathError::dimension_mismatch(
                model_jacobian.shape(),
                (model_jacobian.nrows(), self.model_len()),
            ));
        }
        if fitting.len() != self.free_count {
            return Err(MathError::dimension_mismatch(
                (fitting.len(), 1),
                (self.free_count, 1),
            ));
        }

        let mut result = DMatrix::zeros(model_jacobian.nrows(), self.free_count);
        let mut col = 0;
        for (i, transform) in self.transforms.iter().enumerate() {
            if self.fixed[i] {
                continue;
            }
            let scale = transform.local_derivative(fitting[col]);
            result.set_column(col, &(model_jacobian.column(i) * scale));
            col += 1;
        }
        Ok(result)
    }
}
