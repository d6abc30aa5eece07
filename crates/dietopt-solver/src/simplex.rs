use tracing::{debug, debug_span, trace, warn};

use crate::error::SolverError;
use crate::problem::{ConstraintOp, LpProblem};
use crate::solution::Solution;

/// Tolerance used for feasibility, pricing and ratio-test comparisons
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

/// Pivot cap shared by both phases
pub const DEFAULT_MAX_ITERATIONS: usize = 50_000;

/// Pivot elements at or below this size are only used when skipping them would push
/// their row past its bound
const PIVOT_TOLERANCE: f64 = 1e-9;

/// Ratio-test limits this close (relative to the step) count as a tie
const RATIO_TIE: f64 = 1e-12;

/// Consecutive degenerate pivots before pricing falls back to Bland's rule
const DEGENERATE_STREAK_LIMIT: usize = 50;

/// Bounded-variable two-phase simplex solver
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Solver {
    /// Maximum iterations before giving up
    max_iterations: usize,
    /// Tolerance for floating point comparisons
    tolerance: f64,
}

impl Default for Solver {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl Solver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    /// Solve the LP problem.
    ///
    /// Variable bounds are handled natively: every nonbasic variable sits at one of its
    /// bounds (or at zero when free), so bounds never become extra rows. Phase 1 drives
    /// the artificial variables to zero; a positive phase 1 optimum means the problem is
    /// infeasible and phase 2 is skipped.
    ///
    /// The problem is never mutated. Malformed problems are rejected before pivoting, and
    /// a final basis that misses a constraint by more than the tolerance is reported as
    /// [`SolverError::NumericalFailure`] rather than as an optimum.
    pub fn solve(&self, problem: &LpProblem) -> Result<Solution, SolverError> {
        problem.validate()?;

        let span = debug_span!(
            "solve",
            variables = problem.num_variables(),
            constraints = problem.num_constraints()
        );
        let _enter = span.enter();

        let mut tableau = Tableau::build(problem, self.tolerance);
        let mut iterations = 0;

        if tableau.n_artificial > 0 {
            debug!(artificials = tableau.n_artificial, "starting phase 1");
            tableau.set_phase1_costs();
            if let Outcome::Unbounded = self.run(&mut tableau, &mut iterations)? {
                // The phase 1 objective is bounded below by zero; only numerical trouble gets here.
                warn!("phase 1 reported unbounded, treating problem as infeasible");
                return Ok(Solution::infeasible(iterations));
            }

            let infeasibility = tableau.artificial_sum();
            if infeasibility > self.tolerance {
                debug!(infeasibility, iterations, "problem is infeasible");
                return Ok(Solution::infeasible(iterations));
            }
            tableau.drive_out_artificials();
        }

        debug!(iterations, "starting phase 2");
        tableau.set_phase2_costs(problem);
        if let Outcome::Unbounded = self.run(&mut tableau, &mut iterations)? {
            debug!(iterations, "problem is unbounded");
            return Ok(Solution::unbounded(iterations));
        }

        let raw = tableau.structural_values();
        let snapped: Vec<f64> = raw
            .iter()
            .zip(&problem.bounds)
            .map(|(&value, b)| snap(value, b.lower, b.upper, self.tolerance))
            .collect();
        // Snapping onto a bound can push a row with large coefficients out of tolerance
        let values = if problem.violations(&snapped, self.tolerance).is_empty() {
            snapped
        } else {
            raw
        };
        let objective_value = problem.objective_value(&values);

        let violations = problem.violations(&values, self.tolerance);
        if !violations.is_empty() {
            warn!(?violations, iterations, "final basis violates constraints beyond tolerance");
            return Err(SolverError::NumericalFailure(violations));
        }

        debug!(iterations, objective_value, "optimal");
        Ok(Solution::optimal(values, objective_value, iterations))
    }

    /// Pivot until no entering variable improves the current cost vector.
    fn run(&self, tableau: &mut Tableau, iterations: &mut usize) -> Result<Outcome, SolverError> {
        let mut degenerate_streak = 0;

        loop {
            let reduced = tableau.reduced_costs();
            let bland = degenerate_streak >= DEGENERATE_STREAK_LIMIT;
            let Some((entering, direction)) = tableau.select_entering(&reduced, bland) else {
                return Ok(Outcome::Optimal);
            };

            if *iterations >= self.max_iterations {
                return Err(SolverError::IterationLimit(self.max_iterations));
            }

            let values = tableau.basic_values();
            let Some(step) = tableau.ratio_test(entering, direction, &values, bland) else {
                return Ok(Outcome::Unbounded);
            };

            if step.length <= self.tolerance {
                degenerate_streak += 1;
            } else {
                degenerate_streak = 0;
            }

            trace!(
                iteration = *iterations,
                entering,
                ?direction,
                step = step.length,
                leaving = ?step.leaving,
                bland,
                "pivot"
            );
            tableau.apply(entering, step.leaving);
            *iterations += 1;
        }
    }
}

enum Outcome {
    Optimal,
    Unbounded,
}

/// Where a nonbasic variable currently sits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VarState {
    Basic,
    AtLower,
    AtUpper,
    /// Both bounds infinite, held at zero
    Free,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Increase,
    Decrease,
}

impl Direction {
    fn sign(self) -> f64 {
        match self {
            Direction::Increase => 1.0,
            Direction::Decrease => -1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Leaving {
    /// The entering variable reaches its opposite bound first
    BoundFlip,
    /// The basic variable of `row` hits a bound and leaves the basis
    Row { row: usize, to_upper: bool },
}

#[derive(Debug, Clone, Copy)]
struct Step {
    length: f64,
    leaving: Leaving,
    /// Magnitude of the pivot element, infinite for a bound flip
    pivot: f64,
}

/// Dense working copy of the problem in bounded standard form.
///
/// Columns are laid out as structural variables, then one logical (slack or surplus)
/// per row, then artificials. `rows` holds `B^-1 A` and `rhs` holds `B^-1 b`; the basic
/// column of each row is a unit vector.
///
/// Each constraint is divided by its largest coefficient before it enters the tableau,
/// so logical and artificial values are in scaled units. Structural values are not
/// affected.
struct Tableau {
    rows: Vec<Vec<f64>>,
    rhs: Vec<f64>,
    basis: Vec<usize>,
    state: Vec<VarState>,
    lower: Vec<f64>,
    upper: Vec<f64>,
    cost: Vec<f64>,
    /// Divisor applied to each constraint
    row_scale: Vec<f64>,
    /// Constraint that each artificial belongs to
    artificial_rows: Vec<usize>,
    n_vars: usize,
    n_artificial: usize,
    tolerance: f64,
}

impl Tableau {
    fn build(problem: &LpProblem, tolerance: f64) -> Self {
        let n_vars = problem.num_variables();
        let n_rows = problem.num_constraints();
        let n_structural_and_slack = n_vars + n_rows;

        let mut lower = Vec::with_capacity(n_structural_and_slack);
        let mut upper = Vec::with_capacity(n_structural_and_slack);
        let mut state = Vec::with_capacity(n_structural_and_slack);

        for b in &problem.bounds {
            lower.push(b.lower);
            upper.push(b.upper);
            state.push(initial_state(b.lower, b.upper));
        }
        for c in &problem.constraints {
            let slack_upper = match c.op {
                ConstraintOp::Le | ConstraintOp::Ge => f64::INFINITY,
                ConstraintOp::Eq => 0.0,
            };
            lower.push(0.0);
            upper.push(slack_upper);
            state.push(VarState::AtLower);
        }

        let mut rows = Vec::with_capacity(n_rows);
        let mut rhs = Vec::with_capacity(n_rows);
        let mut basis = Vec::with_capacity(n_rows);
        let mut row_scale = Vec::with_capacity(n_rows);
        // (row, sign) for rows whose logical cannot start basic within its bounds
        let mut needs_artificial = Vec::new();

        for (i, c) in problem.constraints.iter().enumerate() {
            let slack_col = n_vars + i;
            let slack_coef = match c.op {
                ConstraintOp::Ge => -1.0,
                ConstraintOp::Le | ConstraintOp::Eq => 1.0,
            };
            let factor = largest_magnitude(&c.coefficients);
            let scaled_rhs = c.rhs / factor;

            let mut row = vec![0.0; n_structural_and_slack];
            for (cell, &a) in row.iter_mut().zip(&c.coefficients) {
                *cell = a / factor;
            }
            row[slack_col] = slack_coef;

            let residual = scaled_rhs
                - row[..n_vars]
                    .iter()
                    .zip(&state)
                    .zip(lower.iter().zip(&upper))
                    .map(|((a, &s), (&l, &u))| a * nonbasic_value(s, l, u))
                    .sum::<f64>();

            let slack_value = residual / slack_coef;
            if slack_value >= lower[slack_col] && slack_value <= upper[slack_col] {
                scale(&mut row, slack_coef);
                rhs.push(scaled_rhs / slack_coef);
                basis.push(slack_col);
                state[slack_col] = VarState::Basic;
            } else {
                let sign = if residual >= 0.0 { 1.0 } else { -1.0 };
                needs_artificial.push((i, sign));
                rhs.push(scaled_rhs);
                basis.push(usize::MAX);
            }
            rows.push(row);
            row_scale.push(factor);
        }

        let n_artificial = needs_artificial.len();
        for row in &mut rows {
            row.resize(n_structural_and_slack + n_artificial, 0.0);
        }
        for (k, &(i, sign)) in needs_artificial.iter().enumerate() {
            let col = n_structural_and_slack + k;
            rows[i][col] = sign;
            scale(&mut rows[i], sign);
            rhs[i] /= sign;
            basis[i] = col;
            lower.push(0.0);
            upper.push(f64::INFINITY);
            state.push(VarState::Basic);
        }

        let n_cols = n_structural_and_slack + n_artificial;
        Self {
            rows,
            rhs,
            basis,
            state,
            lower,
            upper,
            cost: vec![0.0; n_cols],
            row_scale,
            artificial_rows: needs_artificial.iter().map(|&(i, _)| i).collect(),
            n_vars,
            n_artificial,
            tolerance,
        }
    }

    fn n_cols(&self) -> usize {
        self.state.len()
    }

    fn artificial_start(&self) -> usize {
        self.n_cols() - self.n_artificial
    }

    fn value_of_nonbasic(&self, j: usize) -> f64 {
        nonbasic_value(self.state[j], self.lower[j], self.upper[j])
    }

    fn set_phase1_costs(&mut self) {
        let start = self.artificial_start();
        for (j, c) in self.cost.iter_mut().enumerate() {
            *c = if j >= start { 1.0 } else { 0.0 };
        }
    }

    fn set_phase2_costs(&mut self, problem: &LpProblem) {
        let sign = if problem.objective.minimize { 1.0 } else { -1.0 };
        self.cost.fill(0.0);
        for (c, &coef) in self.cost.iter_mut().zip(&problem.objective.coefficients) {
            *c = sign * coef;
        }
    }

    /// Current value of each row's basic variable.
    fn basic_values(&self) -> Vec<f64> {
        self.rows
            .iter()
            .zip(&self.rhs)
            .map(|(row, &rhs)| {
                let nonbasic: f64 = row
                    .iter()
                    .enumerate()
                    .filter(|&(j, &a)| a != 0.0 && self.state[j] != VarState::Basic)
                    .map(|(j, &a)| a * self.value_of_nonbasic(j))
                    .sum();
                rhs - nonbasic
            })
            .collect()
    }

    /// `c_j - c_B B^-1 a_j` for every column (zero for basic columns).
    fn reduced_costs(&self) -> Vec<f64> {
        let mut reduced = self.cost.clone();
        for (row, &b) in self.rows.iter().zip(&self.basis) {
            let cb = self.cost[b];
            if cb == 0.0 {
                continue;
            }
            for (d, &a) in reduced.iter_mut().zip(row) {
                *d -= cb * a;
            }
        }
        for &b in &self.basis {
            reduced[b] = 0.0;
        }
        reduced
    }

    /// Dantzig pricing, or the first improving column when `bland` is set.
    /// Ties keep the smallest index.
    fn select_entering(&self, reduced: &[f64], bland: bool) -> Option<(usize, Direction)> {
        let tol = self.tolerance;
        let mut best: Option<(usize, Direction, f64)> = None;

        for (j, &d) in reduced.iter().enumerate() {
            if self.upper[j] - self.lower[j] <= tol {
                continue;
            }
            let candidate = match self.state[j] {
                VarState::Basic => None,
                VarState::AtLower if d < -tol => Some((Direction::Increase, -d)),
                VarState::AtUpper if d > tol => Some((Direction::Decrease, d)),
                VarState::Free if d < -tol => Some((Direction::Increase, -d)),
                VarState::Free if d > tol => Some((Direction::Decrease, d)),
                _ => None,
            };
            let Some((direction, score)) = candidate else {
                continue;
            };
            if bland {
                return Some((j, direction));
            }
            if best.is_none_or(|(_, _, s)| score > s) {
                best = Some((j, direction, score));
            }
        }

        best.map(|(j, direction, _)| (j, direction))
    }

    /// Longest step the entering column can take before a basic variable hits a bound
    /// or the entering variable reaches its own opposite bound. `None` means no limit.
    ///
    /// Only genuine ties are broken: a bound flip first, then the largest pivot element
    /// (the smallest basic index under Bland's rule). Any looser window would let the
    /// losing row overshoot its bound.
    fn ratio_test(&self, entering: usize, direction: Direction, values: &[f64], bland: bool) -> Option<Step> {
        let tol = self.tolerance;
        let sign = direction.sign();

        let range = self.upper[entering] - self.lower[entering];
        let mut best = range.is_finite().then_some(Step {
            length: range,
            leaving: Leaving::BoundFlip,
            pivot: f64::INFINITY,
        });
        let mut small_pivots = Vec::new();

        for (i, (row, &value)) in self.rows.iter().zip(values).enumerate() {
            let alpha = sign * row[entering];
            if alpha == 0.0 {
                continue;
            }
            let b = self.basis[i];
            let (bound, to_upper) = if alpha > 0.0 {
                (self.lower[b], false)
            } else {
                (self.upper[b], true)
            };
            if !bound.is_finite() {
                continue;
            }
            let candidate = Step {
                length: ((value - bound) / alpha).max(0.0),
                leaving: Leaving::Row { row: i, to_upper },
                pivot: alpha.abs(),
            };
            if candidate.pivot <= PIVOT_TOLERANCE {
                small_pivots.push(candidate);
                continue;
            }

            let replace = match best {
                None => true,
                Some(current) => {
                    let tie = RATIO_TIE * current.length.max(1.0);
                    if candidate.length < current.length - tie {
                        true
                    } else if candidate.length <= current.length + tie {
                        match current.leaving {
                            Leaving::BoundFlip => false,
                            Leaving::Row { row: current_row, .. } if bland => b < self.basis[current_row],
                            Leaving::Row { row: current_row, .. } => {
                                candidate.pivot > current.pivot
                                    || (candidate.pivot == current.pivot && b < self.basis[current_row])
                            }
                        }
                    } else {
                        false
                    }
                }
            };
            if replace {
                best = Some(candidate);
            }
        }

        // A small pivot still limits the step once the row would overshoot its bound
        for candidate in small_pivots {
            let overshoots = best.is_none_or(|current| {
                candidate.length < current.length && candidate.pivot * (current.length - candidate.length) > tol
            });
            if overshoots {
                best = Some(candidate);
            }
        }

        best
    }

    fn apply(&mut self, entering: usize, leaving: Leaving) {
        match leaving {
            Leaving::BoundFlip => {
                self.state[entering] = match self.state[entering] {
                    VarState::AtLower => VarState::AtUpper,
                    VarState::AtUpper => VarState::AtLower,
                    other => other,
                };
            }
            Leaving::Row { row, to_upper } => {
                let leaving_var = self.basis[row];
                self.pivot(row, entering);
                self.state[leaving_var] = if to_upper { VarState::AtUpper } else { VarState::AtLower };
            }
        }
    }

    fn pivot(&mut self, row: usize, col: usize) {
        let pivot_val = self.rows[row][col];
        scale(&mut self.rows[row], pivot_val);
        self.rhs[row] /= pivot_val;

        let pivot_row = self.rows[row].clone();
        let pivot_rhs = self.rhs[row];

        for (i, (r, rhs)) in self.rows.iter_mut().zip(self.rhs.iter_mut()).enumerate() {
            if i == row {
                continue;
            }
            let factor = r[col];
            if factor == 0.0 {
                continue;
            }
            for (v, &p) in r.iter_mut().zip(&pivot_row) {
                *v -= factor * p;
            }
            r[col] = 0.0;
            *rhs -= factor * pivot_rhs;
        }

        self.basis[row] = col;
        self.state[col] = VarState::Basic;
    }

    /// Total artificial value in the units of the original constraints.
    fn artificial_sum(&self) -> f64 {
        let start = self.artificial_start();
        self.basis
            .iter()
            .zip(self.basic_values())
            .filter(|&(&b, _)| b >= start)
            .map(|(&b, v)| v.max(0.0) * self.row_scale[self.artificial_rows[b - start]])
            .sum()
    }

    /// Pivot zero-valued artificials out of the basis and pin every artificial at zero.
    ///
    /// A row with no usable pivot is redundant; its artificial stays basic at zero.
    fn drive_out_artificials(&mut self) {
        let start = self.artificial_start();

        for i in 0..self.rows.len() {
            if self.basis[i] < start {
                continue;
            }
            let mut candidate: Option<(usize, f64)> = None;
            for (j, &a) in self.rows[i][..start].iter().enumerate() {
                if self.state[j] == VarState::Basic || a.abs() <= self.tolerance {
                    continue;
                }
                if candidate.is_none_or(|(_, best)| a.abs() > best) {
                    candidate = Some((j, a.abs()));
                }
            }
            if let Some((col, _)) = candidate {
                let artificial = self.basis[i];
                self.pivot(i, col);
                self.state[artificial] = VarState::AtLower;
            }
        }

        for j in start..self.n_cols() {
            self.upper[j] = 0.0;
        }
    }

    /// Current values of the structural variables.
    fn structural_values(&self) -> Vec<f64> {
        let mut values: Vec<f64> = (0..self.n_vars)
            .map(|j| self.value_of_nonbasic(j))
            .collect();
        for (&b, value) in self.basis.iter().zip(self.basic_values()) {
            if b < self.n_vars {
                values[b] = value;
            }
        }
        values
    }
}

fn initial_state(lower: f64, upper: f64) -> VarState {
    if lower.is_finite() {
        VarState::AtLower
    } else if upper.is_finite() {
        VarState::AtUpper
    } else {
        VarState::Free
    }
}

fn nonbasic_value(state: VarState, lower: f64, upper: f64) -> f64 {
    match state {
        VarState::AtLower => lower,
        VarState::AtUpper => upper,
        VarState::Free | VarState::Basic => 0.0,
    }
}

/// Largest coefficient magnitude, or 1 for an all-zero row
fn largest_magnitude(coefficients: &[f64]) -> f64 {
    let largest = coefficients.iter().fold(0.0_f64, |m, a| m.max(a.abs()));
    if largest > 0.0 { largest } else { 1.0 }
}

/// Moves `value` onto a bound it misses by no more than `tolerance`.
fn snap(value: f64, lower: f64, upper: f64, tolerance: f64) -> f64 {
    if value < lower && lower - value <= tolerance {
        lower
    } else if value > upper && value - upper <= tolerance {
        upper
    } else {
        value
    }
}

fn scale(row: &mut [f64], divisor: f64) {
    for v in row {
        *v /= divisor;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::{Bounds, LpProblem};
    use crate::solution::{ConstraintViolation, SolutionStatus};

    fn vars(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn assert_close(actual: f64, expected: f64, what: &str) {
        assert!((actual - expected).abs() < 1e-6, "{what} = {actual} (expected {expected})");
    }

    #[test]
    fn test_simple_maximization() {
        // Maximize: 3x + 2y
        // Subject to:
        //   x + y <= 4
        //   x <= 3
        //   y <= 3
        // Optimal: x=3, y=1, obj=11
        let mut problem = LpProblem::new(vars(&["x", "y"]));
        problem.set_objective(vec![3.0, 2.0], false);
        problem.add_constraint("sum", vec![1.0, 1.0], ConstraintOp::Le, 4.0);
        problem.add_constraint("x_max", vec![1.0, 0.0], ConstraintOp::Le, 3.0);
        problem.add_constraint("y_max", vec![0.0, 1.0], ConstraintOp::Le, 3.0);

        let solution = Solver::new().solve(&problem).unwrap();

        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert_close(solution.values[0], 3.0, "x");
        assert_close(solution.values[1], 1.0, "y");
        assert_close(solution.objective_value, 11.0, "obj");
    }

    #[test]
    fn test_minimization_with_ge() {
        // Minimize: 2x + 3y
        // Subject to:
        //   x + y >= 4
        //   x <= 3
        //   y <= 3
        // Optimal: x=3, y=1, obj=9
        let mut problem = LpProblem::new(vars(&["x", "y"]));
        problem.set_objective(vec![2.0, 3.0], true);
        problem.add_constraint("sum", vec![1.0, 1.0], ConstraintOp::Ge, 4.0);
        problem.add_constraint("x_max", vec![1.0, 0.0], ConstraintOp::Le, 3.0);
        problem.add_constraint("y_max", vec![0.0, 1.0], ConstraintOp::Le, 3.0);

        let solution = Solver::new().solve(&problem).unwrap();

        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert_close(solution.values[0], 3.0, "x");
        assert_close(solution.values[1], 1.0, "y");
        assert_close(solution.objective_value, 9.0, "obj");
    }

    #[test]
    fn test_native_bounds_replace_rows() {
        // Same optimum as above with the caps expressed as bounds
        let mut problem = LpProblem::new(vars(&["x", "y"]));
        problem.set_objective(vec![2.0, 3.0], true);
        problem.add_constraint("sum", vec![1.0, 1.0], ConstraintOp::Ge, 4.0);
        problem.set_bounds(0, Bounds::new(0.0, 3.0)).unwrap();
        problem.set_bounds(1, Bounds::new(0.0, 3.0)).unwrap();

        let solution = Solver::new().solve(&problem).unwrap();

        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert_close(solution.values[0], 3.0, "x");
        assert_close(solution.values[1], 1.0, "y");
        assert_close(solution.objective_value, 9.0, "obj");
    }

    #[test]
    fn test_positive_lower_bound_is_respected() {
        // Minimize x + y with x + y >= 1, y >= 2: the lower bound alone decides
        let mut problem = LpProblem::new(vars(&["x", "y"]));
        problem.set_objective(vec![1.0, 1.0], true);
        problem.add_constraint("sum", vec![1.0, 1.0], ConstraintOp::Ge, 1.0);
        problem.set_bounds(1, Bounds::new(2.0, 5.0)).unwrap();

        let solution = Solver::new().solve(&problem).unwrap();

        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert_close(solution.values[0], 0.0, "x");
        assert_close(solution.values[1], 2.0, "y");
    }

    #[test]
    fn test_equality_constraint() {
        // Minimize x + 2y with x + y = 3, x <= 1
        let mut problem = LpProblem::new(vars(&["x", "y"]));
        problem.set_objective(vec![1.0, 2.0], true);
        problem.add_constraint("total", vec![1.0, 1.0], ConstraintOp::Eq, 3.0);
        problem.set_bounds(0, Bounds::new(0.0, 1.0)).unwrap();

        let solution = Solver::new().solve(&problem).unwrap();

        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert_close(solution.values[0], 1.0, "x");
        assert_close(solution.values[1], 2.0, "y");
        assert_close(solution.objective_value, 5.0, "obj");
    }

    #[test]
    fn test_infeasible() {
        // x >= 5
        // x <= 3
        let mut problem = LpProblem::new(vars(&["x"]));
        problem.set_objective(vec![1.0], true);
        problem.add_constraint("lower", vec![1.0], ConstraintOp::Ge, 5.0);
        problem.add_constraint("upper", vec![1.0], ConstraintOp::Le, 3.0);

        let solution = Solver::new().solve(&problem).unwrap();

        assert_eq!(solution.status, SolutionStatus::Infeasible);
        assert!(solution.values.is_empty());
    }

    #[test]
    fn test_infeasible_from_bounds() {
        // x >= 5 against an upper bound of 3
        let mut problem = LpProblem::new(vars(&["x"]));
        problem.set_objective(vec![1.0], true);
        problem.add_constraint("lower", vec![1.0], ConstraintOp::Ge, 5.0);
        problem.set_bounds(0, Bounds::new(0.0, 3.0)).unwrap();

        let solution = Solver::new().solve(&problem).unwrap();

        assert_eq!(solution.status, SolutionStatus::Infeasible);
    }

    #[test]
    fn test_unbounded_free_variable() {
        // Minimize -x with x free and nothing limiting it
        let mut problem = LpProblem::new(vars(&["x"]));
        problem.set_objective(vec![-1.0], true);
        problem.set_bounds(0, Bounds::FREE).unwrap();

        let solution = Solver::new().solve(&problem).unwrap();

        assert_eq!(solution.status, SolutionStatus::Unbounded);
        assert_eq!(solution.objective_value, f64::NEG_INFINITY);
    }

    #[test]
    fn test_unbounded_with_loose_row() {
        // Minimize -x - y with x - y <= 1: moving along x = y + 1 never stops
        let mut problem = LpProblem::new(vars(&["x", "y"]));
        problem.set_objective(vec![-1.0, -1.0], true);
        problem.add_constraint("gap", vec![1.0, -1.0], ConstraintOp::Le, 1.0);

        let solution = Solver::new().solve(&problem).unwrap();

        assert_eq!(solution.status, SolutionStatus::Unbounded);
    }

    #[test]
    fn test_free_variable_settles_at_optimum() {
        // Minimize x with x free and x >= -2
        let mut problem = LpProblem::new(vars(&["x"]));
        problem.set_objective(vec![1.0], true);
        problem.add_constraint("floor", vec![1.0], ConstraintOp::Ge, -2.0);
        problem.set_bounds(0, Bounds::FREE).unwrap();

        let solution = Solver::new().solve(&problem).unwrap();

        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert_close(solution.values[0], -2.0, "x");
    }

    #[test]
    fn test_empty_problem() {
        let problem = LpProblem::new(Vec::new());
        let solution = Solver::new().solve(&problem).unwrap();
        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert_close(solution.objective_value, 0.0, "obj");
    }

    #[test]
    fn test_zero_variables_with_requirement_is_infeasible() {
        let mut problem = LpProblem::new(Vec::new());
        problem.add_constraint("calories", Vec::new(), ConstraintOp::Ge, 400.0);
        problem.add_constraint("budget", Vec::new(), ConstraintOp::Le, 10.0);

        let solution = Solver::new().solve(&problem).unwrap();
        assert_eq!(solution.status, SolutionStatus::Infeasible);
    }

    #[test]
    fn test_zero_variables_with_trivial_targets_is_optimal() {
        let mut problem = LpProblem::new(Vec::new());
        problem.add_constraint("calories", Vec::new(), ConstraintOp::Ge, 0.0);
        problem.add_constraint("budget", Vec::new(), ConstraintOp::Le, 10.0);

        let solution = Solver::new().solve(&problem).unwrap();
        assert_eq!(solution.status, SolutionStatus::Optimal);
    }

    #[test]
    fn test_redundant_equalities() {
        // The second row duplicates the first; its artificial cannot leave the basis
        let mut problem = LpProblem::new(vars(&["x", "y"]));
        problem.set_objective(vec![1.0, 3.0], true);
        problem.add_constraint("a", vec![1.0, 1.0], ConstraintOp::Eq, 2.0);
        problem.add_constraint("b", vec![2.0, 2.0], ConstraintOp::Eq, 4.0);

        let solution = Solver::new().solve(&problem).unwrap();

        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert_close(solution.values[0], 2.0, "x");
        assert_close(solution.values[1], 0.0, "y");
    }

    #[test]
    fn test_degenerate_problem_terminates() {
        // Beale's cycling example; Dantzig pricing cycles on it without a tie-break
        let mut problem = LpProblem::new(vars(&["x1", "x2", "x3", "x4"]));
        problem.set_objective(vec![-0.75, 150.0, -0.02, 6.0], true);
        problem.add_constraint("r1", vec![0.25, -60.0, -0.04, 9.0], ConstraintOp::Le, 0.0);
        problem.add_constraint("r2", vec![0.5, -90.0, -0.02, 3.0], ConstraintOp::Le, 0.0);
        problem.add_constraint("r3", vec![0.0, 0.0, 1.0, 0.0], ConstraintOp::Le, 1.0);

        let solution = Solver::new().solve(&problem).unwrap();

        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert_close(solution.objective_value, -0.05, "obj");
        assert!(problem.violations(&solution.values, 1e-6).is_empty());
    }

    #[test]
    fn test_small_pivot_still_limits_the_step() {
        // Badly scaled diet rows. After three pivots the calorie surplus enters with a
        // long step while the basic x0 has a column entry below 1e-6; ignoring that row
        // drives x0 negative and breaks the fat row.
        let mut problem = LpProblem::new(vars(&["x0", "x1", "x2", "x3", "x4", "x5"]));
        let price = vec![73.2, 25.0, 76.3, 0.0135, 0.0941, 98.2];
        problem.set_objective(price.clone(), true);
        problem.add_constraint(
            "calories",
            vec![204.0, 638.0, 8970.0, 727.0, 16.7, 1480.0],
            ConstraintOp::Ge,
            696.0,
        );
        problem.add_constraint(
            "protein",
            vec![1067.0, 83.7, 102.8, 0.344, 1.088, 64.4],
            ConstraintOp::Ge,
            10.1,
        );
        problem.add_constraint(
            "fat",
            vec![11.7, 0.0711, 0.953, 0.0702, 0.0398, 3.63],
            ConstraintOp::Le,
            3.48,
        );
        problem.add_constraint("budget", price, ConstraintOp::Le, 1034.0);

        let solution = Solver::new().solve(&problem).unwrap();

        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert!(problem.violations(&solution.values, 1e-6).is_empty());
        assert_close(solution.values[3], 10.1 / 0.344, "x3");
        assert_close(solution.objective_value, 10.1 / 0.344 * 0.0135, "obj");
        for (j, &v) in solution.values.iter().enumerate().filter(|&(j, _)| j != 3) {
            assert_close(v, 0.0, &format!("x{j}"));
        }
    }

    #[test]
    fn test_snap_only_within_tolerance() {
        assert_eq!(snap(-1e-9, 0.0, 5.0, 1e-6), 0.0);
        assert_eq!(snap(5.0 + 1e-9, 0.0, 5.0, 1e-6), 5.0);
        assert_eq!(snap(-0.01, 0.0, 5.0, 1e-6), -0.01);
        assert_eq!(snap(2.5, 0.0, 5.0, 1e-6), 2.5);
        assert_eq!(snap(-3.0, f64::NEG_INFINITY, f64::INFINITY, 1e-6), -3.0);
    }

    #[test]
    fn test_numerical_failure_lists_violations() {
        let err = SolverError::NumericalFailure(vec![ConstraintViolation {
            constraint: "fat".to_string(),
            required: 3.48,
            actual: 3.56,
            violation_amount: 0.08,
        }]);
        assert_eq!(err.to_string(), "Final basis violates 1 constraint(s) beyond tolerance");
    }

    #[test]
    fn test_iteration_limit() {
        let mut problem = LpProblem::new(vars(&["x", "y"]));
        problem.set_objective(vec![2.0, 3.0], true);
        problem.add_constraint("sum", vec![1.0, 1.0], ConstraintOp::Ge, 4.0);

        let result = Solver::new().with_max_iterations(0).solve(&problem);
        assert_eq!(result, Err(SolverError::IterationLimit(0)));
    }

    #[test]
    fn test_invalid_problem_is_rejected() {
        let mut problem = LpProblem::new(vars(&["x"]));
        problem.set_objective(vec![1.0, 2.0], true);
        assert!(matches!(
            Solver::new().solve(&problem),
            Err(SolverError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_problem_is_not_mutated_and_solves_are_repeatable() {
        let mut problem = LpProblem::new(vars(&["x", "y", "z"]));
        problem.set_objective(vec![1.0, 1.5, 0.8], true);
        problem.add_constraint("a", vec![2.0, 1.0, 1.0], ConstraintOp::Ge, 6.0);
        problem.add_constraint("b", vec![1.0, 3.0, 0.5], ConstraintOp::Ge, 4.0);
        problem.add_constraint("c", vec![1.0, 1.0, 1.0], ConstraintOp::Le, 10.0);
        let before = problem.clone();

        let solver = Solver::new();
        let first = solver.solve(&problem).unwrap();
        let second = solver.solve(&problem).unwrap();

        assert_eq!(problem, before);
        assert_eq!(first, second);
        assert!(problem.violations(&first.values, 1e-6).is_empty());
    }
}
