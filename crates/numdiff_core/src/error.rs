use std::fmt;

use thiserror::Error;

/// Which side of the evaluation point a failed evaluation was taken on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepDirection {
    Forward,
    Backward,
}

impl fmt::Display for StepDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepDirection::Forward => f.write_str("forward"),
            StepDirection::Backward => f.write_str("backward"),
        }
    }
}

#[derive(Debug, Error)]
pub enum NumericDiffError {
    /// The residual function failed at a perturbed point. The Jacobian block is not valid.
    #[error(
        "residual evaluation failed at the {direction} step of coordinate {coordinate} \
         in parameter block {parameter_block}"
    )]
    EvaluationFailed {
        parameter_block: usize,
        coordinate: usize,
        direction: StepDirection,
        #[source]
        source: anyhow::Error,
    },

    #[error("residual evaluation failed at the evaluation point")]
    EvaluationPointFailed(#[source] anyhow::Error),

    #[error("{what} dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("jacobian of {num_residuals} residuals by {block_size} parameters does not fit in memory")]
    JacobianTooLarge {
        num_residuals: usize,
        block_size: usize,
    },

    #[error("parameter block index {index} is out of range for {count} blocks")]
    ParameterBlockOutOfRange { index: usize, count: usize },

    #[error("expected {expected} parameter blocks, got {actual}")]
    ParameterBlockCountMismatch { expected: usize, actual: usize },

    #[error("forward differencing requires the residuals at the evaluation point")]
    MissingEvalPointResiduals,

    #[error("relative step size must be positive and finite, got {0}")]
    InvalidStepSize(f64),

    #[error("parameter block {0} has zero size")]
    EmptyParameterBlock(usize),

    #[error("cost function must have at least one residual")]
    NoResiduals,
}
