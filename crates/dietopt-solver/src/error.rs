use thiserror::Error;

use crate::solution::ConstraintViolation;

/// Structural problems detected before (or while) solving.
///
/// Infeasibility and unboundedness are not errors; they are reported through
/// [`SolutionStatus`](crate::SolutionStatus).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("{context} has {found} coefficients, expected {expected}")]
    DimensionMismatch {
        context: String,
        expected: usize,
        found: usize,
    },
    #[error("Invalid bounds on variable {variable}: [{lower}, {upper}]")]
    InvalidBounds {
        variable: String,
        lower: f64,
        upper: f64,
    },
    #[error("Non-finite coefficient in {0}")]
    NonFiniteCoefficient(String),
    #[error("Unknown variable index {0}")]
    UnknownVariable(usize),
    #[error("Simplex did not terminate within {0} iterations")]
    IterationLimit(usize),
    /// Rounding left the final basis outside the feasible region
    #[error("Final basis violates {} constraint(s) beyond tolerance", .0.len())]
    NumericalFailure(Vec<ConstraintViolation>),
}
