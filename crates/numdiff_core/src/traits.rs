use anyhow::Result;
use nalgebra::DVector;
use num_traits::{Float, FromPrimitive};
use std::fmt::Debug;

/// A trait for floating-point types the step-size policy can work with.
/// Must support `Float` operations (epsilon, sqrt, abs), debug printing, and conversion from f64.
pub trait Scalar: Float + FromPrimitive + Debug + 'static {}

impl<T: Float + FromPrimitive + Debug + 'static> Scalar for T {}

/// A residual function being differentiated.
pub trait ResidualFunction {
    /// Evaluates the residuals at the given parameter blocks.
    /// parameters: every parameter block of the evaluation point
    /// residuals: buffer to write the residual vector into
    ///
    /// Returning an error marks the point as not evaluable.
    fn evaluate(&mut self, parameters: &[DVector<f64>], residuals: &mut [f64]) -> Result<()>;
}

impl<F> ResidualFunction for F
where
    F: FnMut(&[DVector<f64>], &mut [f64]) -> Result<()>,
{
    fn evaluate(&mut self, parameters: &[DVector<f64>], residuals: &mut [f64]) -> Result<()> {
        self(parameters, residuals)
    }
}

/// Residuals together with optional Jacobian blocks, one per parameter block.
pub trait CostFunction {
    /// Length of the residual vector.
    fn num_residuals(&self) -> usize;

    /// Sizes of the parameter blocks, in evaluation order.
    fn parameter_block_sizes(&self) -> &[usize];

    /// Evaluate the residuals, and the Jacobian blocks whose slots are `Some`.
    ///
    /// Slot `i` is a row-major `num_residuals x parameter_block_sizes()[i]` buffer.
    fn evaluate(
        &mut self,
        parameters: &[DVector<f64>],
        residuals: &mut [f64],
        jacobians: Option<&mut [Option<&mut [f64]>]>,
    ) -> Result<()>;
}

/// Evaluates a [`CostFunction`] as a plain [`ResidualFunction`], never requesting Jacobians.
pub struct ResidualsOnly<'a, C: ?Sized>(pub &'a mut C);

impl<C: CostFunction + ?Sized> ResidualFunction for ResidualsOnly<'_, C> {
    fn evaluate(&mut self, parameters: &[DVector<f64>], residuals: &mut [f64]) -> Result<()> {
        self.0.evaluate(parameters, residuals, None)
    }
}
