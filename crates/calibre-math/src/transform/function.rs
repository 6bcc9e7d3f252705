//! Lifting model-space functions into fitting space.

use nalgebra::{DMatrix, DVector};

use super::ParameterTransformSet;
use crate::error::MathError;

/// A model-space vector function and Jacobian viewed through a
/// [`ParameterTransformSet`].
///
/// The fitting function is `F(y) = f(inverse_transform(y))` and its Jacobian
/// follows from the chain rule, which for uncoupled transforms reduces to
/// column scaling.
///
/// Both closures may fail with any error type that can absorb a
/// [`MathError`], so domain-specific failures raised inside the model
/// function pass through unchanged.
pub struct NonLinearTransformFunction<F, J> {
    function: F,
    jacobian: J,
    transforms: ParameterTransformSet,
}

impl<F, J, E> NonLinearTransformFunction<F, J>
where
    F: Fn(&DVector<f64>) -> Result<DVector<f64>, E>,
    J: Fn(&DVector<f64>) -> Result<DMatrix<f64>, E>,
    E: From<MathError>,
{
    /// Wraps a model-space function and its Jacobian.
    pub fn new(function: F, jacobian: J, transforms: ParameterTransformSet) -> Self {
        Self {
            function,
            jacobian,
            transforms,
        }
    }

    /// The transform set in use.
    #[must_use]
    pub fn transforms(&self) -> &ParameterTransformSet {
        &self.transforms
    }

    /// Evaluates the function at a fitting-space point.
    pub fn fitting_value(&self, fitting: &DVector<f64>) -> Result<DVector<f64>, E> {
        let model = self.transforms.inverse_transform(fitting)?;
        (self.function)(&model)
    }

    /// Evaluates the Jacobian at a fitting-space point.
    pub fn fitting_jacobian_at(&self, fitting: &DVector<f64>) -> Result<DMatrix<f64>, E> {
        let model = self.transforms.inverse_transform(fitting)?;
        let model_jacobian = (self.jacobian)(&model)?;
        Ok(self.transforms.jacobian(&model_jacobian, fitting)?)
    }

    /// The fitting-space function as a closure.
    pub fn fitting_function(&self) -> impl Fn(&DVector<f64>) -> Result<DVector<f64>, E> + '_ {
        move |y: &DVector<f64>| self.fitting_value(y)
    }

    /// The fitting-space Jacobian as a closure.
    pub fn fitting_jacobian(&self) -> impl Fn(&DVector<f64>) -> Result<DMatrix<f64>, E> + '_ {
        move |y: &DVector<f64>| self.fitting_jacobian_at(y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::differentiation::VectorFieldFirstOrderDifferentiator;
    use crate::error::MathResult;
    use crate::transform::{LimitDirection, ParameterTransform};
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn sphere(x: &DVector<f64>) -> MathResult<DVector<f64>> {
        let (x1, x2) = (x[0], x[1]);
        Ok(DVector::from_vec(vec![
            x1.sin() * x2.cos(),
            x1.sin() * x2.sin(),
            x1.cos(),
        ]))
    }

    fn sphere_jacobian(x: &DVector<f64>) -> MathResult<DMatrix<f64>> {
        let (x1, x2) = (x[0], x[1]);
        Ok(DMatrix::from_row_slice(
            3,
            2,
            &[
                x1.cos() * x2.cos(),
                -x1.sin() * x2.sin(),
                x1.cos() * x2.sin(),
                x1.sin() * x2.cos(),
                -x1.sin(),
                0.0,
            ],
        ))
    }

    #[test]
    fn test_identity_transforms_with_fixed_parameter() {
        let transforms = ParameterTransformSet::new(
            vec![PI / 4.0, 1.0],
            vec![ParameterTransform::Identity; 2],
            vec![true, false],
        )
        .unwrap();
        let wrapped = NonLinearTransformFunction::new(sphere, sphere_jacobian, transforms);
        let func = wrapped.fitting_function();
        let jac = wrapped.fitting_jacobian();

        let x = DVector::from_vec(vec![0.5]);
        let root_half = 0.5f64.sqrt();

        let y = func(&x).unwrap();
        assert_eq!(y.len(), 3);
        assert_relative_eq!(y[0], root_half * 0.5f64.cos(), epsilon = 1e-9);
        assert_relative_eq!(y[1], root_half * 0.5f64.sin(), epsilon = 1e-9);
        assert_relative_eq!(y[2], root_half, epsilon = 1e-9);

        let j = jac(&x).unwrap();
        assert_eq!(j.shape(), (3, 1));
        assert_relative_eq!(j[(0, 0)], -root_half * 0.5f64.sin(), epsilon = 1e-9);
        assert_relative_eq!(j[(1, 0)], root_half * 0.5f64.cos(), epsilon = 1e-9);
        assert_relative_eq!(j[(2, 0)], 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_nonlinear_transforms_match_finite_difference() {
        let transforms = ParameterTransformSet::new(
            vec![1.0, 1.0],
            vec![
                ParameterTransform::two_sided_range(0.0, PI).unwrap(),
                ParameterTransform::one_sided_limit(0.0, LimitDirection::GreaterThan).unwrap(),
            ],
            vec![false, false],
        )
        .unwrap();
        let wrapped = NonLinearTransformFunction::new(sphere, sphere_jacobian, transforms);
        let func = wrapped.fitting_function();
        let jac = wrapped.fitting_jacobian();
        let jac_fd = VectorFieldFirstOrderDifferentiator::default().differentiate(&func);

        let point = DVector::from_vec(vec![4.5, -2.1]);
        let analytic = jac(&point).unwrap();
        let numeric = jac_fd(&point).unwrap();
        assert_eq!(analytic.shape(), (3, 2));
        for i in 0..3 {
            for j in 0..2 {
                assert_relative_eq!(analytic[(i, j)], numeric[(i, j)], epsilon = 1e-6);
            }
        }
    }
}
