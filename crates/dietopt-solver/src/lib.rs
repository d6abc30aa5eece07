//! Linear programming engine behind dietopt.
//!
//! [`Solver`] runs a bounded-variable two-phase simplex over an [`LpProblem`]
//! and reports a [`Solution`] tagged Optimal, Infeasible or Unbounded.
//! Malformed problems are rejected with a [`SolverError`] before any pivoting, and
//! a final point that fails its own feasibility check is an error, never an optimum.

mod error;
mod problem;
mod simplex;
mod solution;

pub use error::SolverError;
pub use problem::{Bounds, Constraint, ConstraintOp, LpProblem, Objective};
pub use simplex::{DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE, Solver};
pub use solution::{ConstraintViolation, Solution, SolutionStatus};
