//! Finite-difference Jacobian of a residual function with respect to one parameter block.
//!
//! The engine is generic over the residual count `R` and the block size `C`: nalgebra's
//! `Const<N>` when the size is known at compile time, `Dyn` otherwise. Both go through
//! the same code path; static sizes just keep the residual buffer on the stack.
//! The parameter block index is always a run-time argument; only the two sizes can be
//! fixed at compile time.

use std::marker::PhantomData;

use log::{debug, trace, warn};
use nalgebra::allocator::Allocator;
use nalgebra::{Const, DVector, DefaultAllocator, Dim, Dyn, MatrixView, OVector, U1};

use crate::error::{NumericDiffError, StepDirection};
use crate::layout::JacobianLayout;
use crate::settings::{NumericDiffMethod, NumericDiffSettings};
use crate::step::step_size;
use crate::traits::ResidualFunction;

/// Engine with both sizes supplied at run time.
pub type DynamicNumericDiff = NumericDiff<Dyn, Dyn>;

/// Engine for `M` residuals and a block of `N` parameters.
pub type FixedNumericDiff<const M: usize, const N: usize> = NumericDiff<Const<M>, Const<N>>;

#[derive(Debug, Clone, Copy)]
pub struct NumericDiff<R: Dim = Dyn, C: Dim = Dyn> {
    settings: NumericDiffSettings,
    _dims: PhantomData<(R, C)>,
}

impl<R: Dim, C: Dim> NumericDiff<R, C> {
    pub fn new(settings: NumericDiffSettings) -> Result<Self, NumericDiffError> {
        settings.validate()?;
        Ok(Self {
            settings,
            _dims: PhantomData,
        })
    }

    pub fn settings(&self) -> &NumericDiffSettings {
        &self.settings
    }

    /// Fills `jacobian` with the finite-difference estimate of `d residual_i / d x_j` for
    /// every coordinate `x_j` of `parameters[parameter_block_index]`.
    ///
    /// `num_residuals` and `parameter_block_size` are only consulted for dimensions that
    /// are `Dyn`. `residuals_at_eval_point` must hold the residuals at the unperturbed
    /// point for forward differencing and is ignored for central differencing.
    /// `jacobian` is written row-major (column-major for a single-parameter block).
    ///
    /// The target block is perturbed in place one coordinate at a time and every
    /// coordinate is restored before returning, on success and on failure alike.
    ///
    /// # Panics
    ///
    /// If the effective parameter block size is zero.
    #[allow(clippy::too_many_arguments)]
    pub fn evaluate_jacobian_for_parameter_block<F>(
        &self,
        function: &mut F,
        residuals_at_eval_point: Option<&[f64]>,
        num_residuals: usize,
        parameter_block_index: usize,
        parameter_block_size: usize,
        parameters: &mut [DVector<f64>],
        jacobian: &mut [f64],
    ) -> Result<(), NumericDiffError>
    where
        F: ResidualFunction + ?Sized,
        DefaultAllocator: Allocator<R>,
    {
        let nrows: R = resolve_dim(num_residuals, "residual");
        let ncols: C = resolve_dim(parameter_block_size, "parameter block");
        let num_residuals = nrows.value();
        let block_size = ncols.value();
        assert!(
            block_size > 0,
            "numeric differentiation requested for a zero-sized parameter block (index {})",
            parameter_block_index
        );

        if parameter_block_index >= parameters.len() {
            return Err(NumericDiffError::ParameterBlockOutOfRange {
                index: parameter_block_index,
                count: parameters.len(),
            });
        }
        check_len(
            "parameter block",
            block_size,
            parameters[parameter_block_index].len(),
        )?;
        let jacobian_len = num_residuals.checked_mul(block_size).ok_or(
            NumericDiffError::JacobianTooLarge {
                num_residuals,
                block_size,
            },
        )?;
        check_len("jacobian buffer", jacobian_len, jacobian.len())?;
        let reference = match self.settings.method {
            NumericDiffMethod::Forward => {
                let reference =
                    residuals_at_eval_point.ok_or(NumericDiffError::MissingEvalPointResiduals)?;
                check_len("evaluation point residual", num_residuals, reference.len())?;
                Some(MatrixView::from_slice_generic(reference, nrows, U1))
            }
            NumericDiffMethod::Central => None,
        };

        debug!(
            "differencing block {} ({:?}): {} residuals, {} evaluations",
            parameter_block_index,
            self.settings.method,
            num_residuals,
            block_size.saturating_mul(self.settings.method.evaluations_per_coordinate())
        );

        let layout = JacobianLayout::for_block_size(block_size);
        let mut parameter_jacobian = layout.view_mut(jacobian, nrows, ncols);
        let mut residuals = OVector::<f64, R>::zeros_generic(nrows, U1);

        for j in 0..block_size {
            let x_j = parameters[parameter_block_index][j];
            let delta = step_size(x_j, self.settings.relative_step_size);
            trace!(
                "block {} coordinate {}: x = {:e}, step = {:e}",
                parameter_block_index,
                j,
                x_j,
                delta
            );

            evaluate_perturbed(
                function,
                parameters,
                parameter_block_index,
                j,
                x_j + delta,
                residuals.as_mut_slice(),
            )
            .map_err(|source| {
                evaluation_failed(parameter_block_index, j, StepDirection::Forward, source)
            })?;

            // Forward residuals, minus the backward (or reference) residuals, over the run.
            let mut column = parameter_jacobian.column_mut(j);
            column.copy_from(&residuals);

            let mut one_over_delta = 1.0 / delta;
            match &reference {
                Some(reference) => column -= reference,
                None => {
                    evaluate_perturbed(
                        function,
                        parameters,
                        parameter_block_index,
                        j,
                        x_j - delta,
                        residuals.as_mut_slice(),
                    )
                    .map_err(|source| {
                        evaluation_failed(parameter_block_index, j, StepDirection::Backward, source)
                    })?;
                    column -= &residuals;
                    one_over_delta /= 2.0;
                }
            }

            column *= one_over_delta;
        }

        Ok(())
    }
}

/// Sets one coordinate, evaluates, and puts the original value back whatever the outcome.
fn evaluate_perturbed<F: ResidualFunction + ?Sized>(
    function: &mut F,
    parameters: &mut [DVector<f64>],
    block: usize,
    coordinate: usize,
    value: f64,
    residuals: &mut [f64],
) -> anyhow::Result<()> {
    let original = parameters[block][coordinate];
    parameters[block][coordinate] = value;
    let result = function.evaluate(parameters, residuals);
    parameters[block][coordinate] = original;
    result
}

fn evaluation_failed(
    parameter_block: usize,
    coordinate: usize,
    direction: StepDirection,
    source: anyhow::Error,
) -> NumericDiffError {
    debug!(
        "{} evaluation failed for block {} coordinate {}: {:#}",
        direction, parameter_block, coordinate, source
    );
    NumericDiffError::EvaluationFailed {
        parameter_block,
        coordinate,
        direction,
        source,
    }
}

/// Compile-time dimension if `D` has one, otherwise the run-time value.
fn resolve_dim<D: Dim>(runtime: usize, what: &str) -> D {
    match D::try_to_usize() {
        Some(fixed) => {
            if runtime != fixed {
                warn!(
                    "{} size {} overridden by compile-time size {}",
                    what, runtime, fixed
                );
            }
            D::from_usize(fixed)
        }
        None => D::from_usize(runtime),
    }
}

fn check_len(what: &'static str, expected: usize, actual: usize) -> Result<(), NumericDiffError> {
    if expected != actual {
        return Err(NumericDiffError::DimensionMismatch {
            what,
            expected,
            actual,
        });
    }
    Ok(())
}
