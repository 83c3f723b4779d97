pub mod cost_function;
pub mod error;
pub mod layout;
pub mod numeric_diff;
pub mod settings;
pub mod step;
/// The `numdiff_core` crate approximates Jacobians of residual functions by finite
/// differences, for use inside nonlinear least-squares solvers that have no analytic
/// derivative available.
///
/// Key components:
/// - **Traits**: `Scalar`, `ResidualFunction` (the callback being differentiated) and
///   `CostFunction` (residuals plus optional per-block Jacobians).
/// - **Numeric diff**: `NumericDiff`, the forward/central differencing engine for one
///   parameter block, generic over static (`Const<N>`) and dynamic (`Dyn`) sizes. The
///   block index is always passed at run time, never as a compile-time constant.
/// - **Cost function**: `NumericDiffCostFunction`, which assembles the Jacobian blocks
///   of every requested parameter block.
/// - **Layout**: row-major / column-major views over caller-owned Jacobian buffers.
pub mod traits;

#[cfg(test)]
mod test_utils;

pub use cost_function::NumericDiffCostFunction;
pub use error::{NumericDiffError, StepDirection};
pub use layout::JacobianLayout;
pub use numeric_diff::{DynamicNumericDiff, FixedNumericDiff, NumericDiff};
pub use settings::{NumericDiffMethod, NumericDiffSettings};
pub use traits::{CostFunction, ResidualFunction, ResidualsOnly, Scalar};
