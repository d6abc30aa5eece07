//! Problem builder: catalog + target -> LP instance.

use std::collections::HashSet;

use dietopt_solver::{Bounds, ConstraintOp, LpProblem};
use tracing::{debug, debug_span};

use crate::catalog::Item;
use crate::error::BuildError;
use crate::target::Target;

pub const CALORIES: &str = "calories";
pub const PROTEIN: &str = "protein";
pub const FAT: &str = "fat";
pub const BUDGET: &str = "budget";
pub const CARBOHYDRATE: &str = "carbohydrate";

/// Builds the cost-minimization problem for `items`, skipping any named in `excluded`.
///
/// One variable per retained item, in catalog order, named after the item. Rows are
/// calories >= target, protein >= target, fat <= target, cost <= budget, and
/// carbohydrate <= target when the target sets one. With `use_portion_limits` each
/// variable is bounded by the item's daily serving range; otherwise it is only
/// non-negative.
///
/// Excluding every item is not an error: the result has no variables and the solver
/// decides whether the targets are trivially met.
pub fn build(
    items: &[Item],
    target: &Target,
    excluded: &HashSet<String>,
    use_portion_limits: bool,
) -> Result<LpProblem, BuildError> {
    let span = debug_span!("build", catalog = items.len(), excluded = excluded.len(), use_portion_limits);
    let _enter = span.enter();

    target.validate()?;

    let mut seen = HashSet::new();
    let mut retained = Vec::with_capacity(items.len());
    for item in items {
        if !seen.insert(item.name.as_str()) {
            return Err(BuildError::DuplicateItem(item.name.clone()));
        }
        if excluded.contains(&item.name) {
            continue;
        }
        item.validate()?;
        retained.push(item);
    }

    let column = |f: fn(&Item) -> f64| -> Vec<f64> { retained.iter().map(|&item| f(item)).collect() };

    let mut problem = LpProblem::new(retained.iter().map(|item| item.name.clone()).collect());
    problem.set_objective(column(|item| item.price), true);

    problem.add_constraint(CALORIES, column(|item| item.calories), ConstraintOp::Ge, target.min_calories);
    problem.add_constraint(PROTEIN, column(|item| item.protein), ConstraintOp::Ge, target.min_protein);
    problem.add_constraint(FAT, column(|item| item.fat), ConstraintOp::Le, target.max_fat);
    problem.add_constraint(BUDGET, column(|item| item.price), ConstraintOp::Le, target.max_budget);
    if let Some(max_carbohydrate) = target.max_carbohydrate {
        problem.add_constraint(
            CARBOHYDRATE,
            column(|item| item.carbohydrate.unwrap_or(0.0)),
            ConstraintOp::Le,
            max_carbohydrate,
        );
    }

    if use_portion_limits {
        problem.bounds = retained.iter().map(|&item| portion_bounds(item)).collect();
    }

    debug!(
        variables = problem.num_variables(),
        constraints = problem.num_constraints(),
        "built diet problem"
    );
    Ok(problem)
}

fn portion_bounds(item: &Item) -> Bounds {
    Bounds::new(
        item.min_daily.unwrap_or(0.0),
        item.max_daily.unwrap_or(f64::INFINITY),
    )
}
