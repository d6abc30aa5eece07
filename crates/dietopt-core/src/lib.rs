//! Least-cost diet selection.
//!
//! The pipeline is catalog adapter -> [`builder::build`] -> [`Solver`] ->
//! [`report::extract`]. [`optimize`] runs all of it as a pure function: every call
//! builds and discards its own problem, so concurrent calls share nothing.

pub mod builder;
pub mod catalog;
mod error;
pub mod report;
mod target;

use std::collections::HashSet;

use dietopt_solver::Solver;
use tracing::{debug, debug_span};

pub use catalog::{Catalog, CatalogRow, Category, Item, PortionPolicy, PortionRange};
pub use error::{BuildError, DietError};
pub use report::{Report, ReportLine, SIGNIFICANCE_THRESHOLD};
pub use target::Target;

/// Tuning for [`optimize_with`]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptimizerConfig {
    /// Smallest quantity listed in the report
    pub significance_threshold: f64,
    pub solver: Solver,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            significance_threshold: SIGNIFICANCE_THRESHOLD,
            solver: Solver::default(),
        }
    }
}

/// Chooses the cheapest quantities of `items` meeting `target`.
///
/// Infeasible and unbounded problems come back as a [`Report`] with that status;
/// only malformed input or a runaway solve is an error.
pub fn optimize(
    items: &[Item],
    target: &Target,
    excluded: &HashSet<String>,
    use_portion_limits: bool,
) -> Result<Report, DietError> {
    optimize_with(&OptimizerConfig::default(), items, target, excluded, use_portion_limits)
}

pub fn optimize_with(
    config: &OptimizerConfig,
    items: &[Item],
    target: &Target,
    excluded: &HashSet<String>,
    use_portion_limits: bool,
) -> Result<Report, DietError> {
    let span = debug_span!("optimize", items = items.len());
    let _enter = span.enter();

    let instance = builder::build(items, target, excluded, use_portion_limits)?;
    let solution = config.solver.solve(&instance)?;
    let report = report::extract_with_threshold(&instance, &solution, items, config.significance_threshold);

    debug!(
        status = %report.status,
        total_cost = report.total_cost,
        listed = report.items.len(),
        iterations = solution.iterations,
        "optimization finished"
    );
    Ok(report)
}
