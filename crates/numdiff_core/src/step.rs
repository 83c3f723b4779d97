//! Step-size policy for finite differences.
//!
//! A purely relative step collapses to zero near `x = 0`, so it is floored at
//! `sqrt(epsilon)`, which bounds the cancellation error of subtracting two
//! nearly equal residuals.

use crate::traits::Scalar;

/// Smallest step ever taken: `sqrt(epsilon)` of the scalar type.
pub fn min_step_size<T: Scalar>() -> T {
    T::epsilon().sqrt()
}

/// Absolute perturbation for a coordinate with value `x`:
/// `max(sqrt(epsilon), relative_step_size * |x|)`.
pub fn step_size<T: Scalar>(x: T, relative_step_size: T) -> T {
    min_step_size::<T>().max(relative_step_size * x.abs())
}
