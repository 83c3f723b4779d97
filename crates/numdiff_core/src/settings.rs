use serde::{Deserialize, Serialize};

use crate::error::NumericDiffError;

/// Finite-difference formula used for every column of a Jacobian block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NumericDiffMethod {
    /// `(f(x + h) - f(x)) / h`, one extra evaluation per coordinate.
    Forward,
    /// `(f(x + h) - f(x - h)) / 2h`, two evaluations per coordinate.
    Central,
}

impl NumericDiffMethod {
    /// Residual evaluations issued per parameter coordinate.
    pub fn evaluations_per_coordinate(self) -> usize {
        match self {
            NumericDiffMethod::Forward => 1,
            NumericDiffMethod::Central => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumericDiffSettings {
    pub method: NumericDiffMethod,
    /// Step as a fraction of `|x_j|`; floored at `sqrt(epsilon)`.
    pub relative_step_size: f64,
}

impl Default for NumericDiffSettings {
    fn default() -> Self {
        Self {
            method: NumericDiffMethod::Forward,
            relative_step_size: 1e-6,
        }
    }
}

impl NumericDiffSettings {
    pub fn forward(relative_step_size: f64) -> Self {
        Self {
            method: NumericDiffMethod::Forward,
            relative_step_size,
        }
    }

    pub fn central(relative_step_size: f64) -> Self {
        Self {
            method: NumericDiffMethod::Central,
            relative_step_size,
        }
    }

    pub fn validate(&self) -> Result<(), NumericDiffError> {
        if !self.relative_step_size.is_finite() || self.relative_step_size <= 0.0 {
            return Err(NumericDiffError::InvalidStepSize(self.relative_step_size));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_forward_with_one_ppm_step() {
        let settings = NumericDiffSettings::default();
        assert_eq!(settings.method, NumericDiffMethod::Forward);
        assert_eq!(settings.relative_step_size, 1e-6);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn rejects_non_positive_and_non_finite_steps() {
        for step in [0.0, -1e-6, f64::NAN, f64::INFINITY] {
            let err = NumericDiffSettings::central(step)
                .validate()
                .expect_err("invalid step accepted");
            assert!(matches!(err, NumericDiffError::InvalidStepSize(_)));
        }
    }

    #[test]
    fn central_costs_two_evaluations_per_coordinate() {
        assert_eq!(NumericDiffMethod::Forward.evaluations_per_coordinate(), 1);
        assert_eq!(NumericDiffMethod::Central.evaluations_per_coordinate(), 2);
    }
}
