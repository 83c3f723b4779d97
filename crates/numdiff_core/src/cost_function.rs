use anyhow::Result;
use log::debug;
use nalgebra::DVector;

use crate::error::NumericDiffError;
use crate::numeric_diff::DynamicNumericDiff;
use crate::settings::NumericDiffSettings;
use crate::traits::{CostFunction, ResidualFunction};

/// A [`CostFunction`] whose Jacobian blocks are computed by finite differences of a
/// residual functor.
pub struct NumericDiffCostFunction<F> {
    functor: F,
    engine: DynamicNumericDiff,
    num_residuals: usize,
    parameter_block_sizes: Vec<usize>,
}

impl<F: ResidualFunction> NumericDiffCostFunction<F> {
    pub fn new(
        functor: F,
        num_residuals: usize,
        parameter_block_sizes: Vec<usize>,
        settings: NumericDiffSettings,
    ) -> Result<Self, NumericDiffError> {
        if num_residuals == 0 {
            return Err(NumericDiffError::NoResiduals);
        }
        if let Some(index) = parameter_block_sizes.iter().position(|&size| size == 0) {
            return Err(NumericDiffError::EmptyParameterBlock(index));
        }
        Ok(Self {
            functor,
            engine: DynamicNumericDiff::new(settings)?,
            num_residuals,
            parameter_block_sizes,
        })
    }

    pub fn functor(&self) -> &F {
        &self.functor
    }

    pub fn settings(&self) -> &NumericDiffSettings {
        self.engine.settings()
    }

    fn check_shapes(
        &self,
        parameters: &[DVector<f64>],
        residuals: &[f64],
    ) -> Result<(), NumericDiffError> {
        if parameters.len() != self.parameter_block_sizes.len() {
            return Err(NumericDiffError::ParameterBlockCountMismatch {
                expected: self.parameter_block_sizes.len(),
                actual: parameters.len(),
            });
        }
        for (block, &size) in parameters.iter().zip(&self.parameter_block_sizes) {
            if block.len() != size {
                return Err(NumericDiffError::DimensionMismatch {
                    what: "parameter block",
                    expected: size,
                    actual: block.len(),
                });
            }
        }
        if residuals.len() != self.num_residuals {
            return Err(NumericDiffError::DimensionMismatch {
                what: "residual",
                expected: self.num_residuals,
                actual: residuals.len(),
            });
        }
        Ok(())
    }
}

impl<F: ResidualFunction> CostFunction for NumericDiffCostFunction<F> {
    fn num_residuals(&self) -> usize {
        self.num_residuals
    }

    fn parameter_block_sizes(&self) -> &[usize] {
        &self.parameter_block_sizes
    }

    fn evaluate(
        &mut self,
        parameters: &[DVector<f64>],
        residuals: &mut [f64],
        jacobians: Option<&mut [Option<&mut [f64]>]>,
    ) -> Result<()> {
        self.check_shapes(parameters, residuals)?;
        self.functor
            .evaluate(parameters, residuals)
            .map_err(NumericDiffError::EvaluationPointFailed)?;

        let Some(jacobians) = jacobians else {
            return Ok(());
        };
        if jacobians.len() != self.parameter_block_sizes.len() {
            return Err(NumericDiffError::ParameterBlockCountMismatch {
                expected: self.parameter_block_sizes.len(),
                actual: jacobians.len(),
            }
            .into());
        }
        if jacobians.iter().all(Option::is_none) {
            return Ok(());
        }

        // The engine perturbs in place; the caller's blocks stay untouched.
        let mut working = parameters.to_vec();
        for (block, slot) in jacobians.iter_mut().enumerate() {
            let Some(jacobian) = slot.as_deref_mut() else {
                debug!("skipping jacobian of parameter block {}", block);
                continue;
            };
            self.engine.evaluate_jacobian_for_parameter_block(
                &mut self.functor,
                Some(&*residuals),
                self.num_residuals,
                block,
                self.parameter_block_sizes[block],
                &mut working,
                jacobian,
            )?;
        }
        Ok(())
    }
}
