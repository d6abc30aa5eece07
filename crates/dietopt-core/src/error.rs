use dietopt_solver::SolverError;
use thiserror::Error;

/// Malformed catalog or target input, rejected before a problem is built.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BuildError {
    #[error("Item {item} has negative {field}: {value}")]
    NegativeCoefficient {
        item: String,
        field: &'static str,
        value: f64,
    },
    #[error("Item {item} has a non-finite {field}")]
    NonFiniteCoefficient { item: String, field: &'static str },
    #[error("Item {item} has an invalid portion bound: {value}")]
    InvalidPortion { item: String, value: f64 },
    #[error("Item {item} has minimum portion {min} above maximum {max}")]
    PortionOrder { item: String, min: f64, max: f64 },
    #[error("Target {0} is not finite")]
    NonFiniteTarget(&'static str),
    #[error("Duplicate item: {0}")]
    DuplicateItem(String),
}

/// Anything that stops `optimize` from producing a report.
///
/// Infeasible and unbounded problems still produce a report.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DietError {
    #[error("Build error: {0}")]
    Build(#[from] BuildError),
    #[error("Solver error: {0}")]
    Solver(#[from] SolverError),
}
