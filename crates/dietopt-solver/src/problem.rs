use crate::error::SolverError;
use crate::solution::ConstraintViolation;

/// Represents a linear programming problem with bounded variables
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct LpProblem {
    /// Variable names
    pub variables: Vec<String>,
    /// Objective function coefficients (costs)
    pub objective: Objective,
    /// Constraints
    pub constraints: Vec<Constraint>,
    /// Bounds for each variable, aligned with `variables`
    pub bounds: Vec<Bounds>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Objective {
    /// Coefficients for each variable
    pub coefficients: Vec<f64>,
    /// Whether to minimize or maximize
    pub minimize: bool,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    /// Name/label for the constraint (for diagnostics)
    pub name: String,
    /// Coefficients for each variable
    pub coefficients: Vec<f64>,
    /// Comparison operator
    pub op: ConstraintOp,
    /// Right-hand side value
    pub rhs: f64,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintOp {
    /// Less than or equal (<=)
    Le,
    /// Greater than or equal (>=)
    Ge,
    /// Equal (=)
    Eq,
}

/// Closed interval a variable must lie in. Either end may be infinite.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub lower: f64,
    pub upper: f64,
}

impl Bounds {
    /// `[0, +inf)`
    pub const NON_NEGATIVE: Bounds = Bounds {
        lower: 0.0,
        upper: f64::INFINITY,
    };

    /// `(-inf, +inf)`
    pub const FREE: Bounds = Bounds {
        lower: f64::NEG_INFINITY,
        upper: f64::INFINITY,
    };

    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    pub fn contains(&self, value: f64, tolerance: f64) -> bool {
        value >= self.lower - tolerance && value <= self.upper + tolerance
    }

    fn is_valid(&self) -> bool {
        !self.lower.is_nan()
            && !self.upper.is_nan()
            && self.lower <= self.upper
            && self.lower < f64::INFINITY
            && self.upper > f64::NEG_INFINITY
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::NON_NEGATIVE
    }
}

impl Constraint {
    /// Left-hand side value for the given variable assignment.
    pub fn activity(&self, values: &[f64]) -> f64 {
        self.coefficients
            .iter()
            .zip(values)
            .map(|(coef, value)| coef * value)
            .sum()
    }
}

impl LpProblem {
    /// Creates a minimization problem whose variables are all non-negative.
    pub fn new(variables: Vec<String>) -> Self {
        let n = variables.len();
        Self {
            variables,
            objective: Objective {
                coefficients: vec![0.0; n],
                minimize: true,
            },
            constraints: Vec::new(),
            bounds: vec![Bounds::NON_NEGATIVE; n],
        }
    }

    pub fn set_objective(&mut self, coefficients: Vec<f64>, minimize: bool) {
        self.objective = Objective { coefficients, minimize };
    }

    pub fn add_constraint(&mut self, name: impl Into<String>, coefficients: Vec<f64>, op: ConstraintOp, rhs: f64) {
        self.constraints.push(Constraint {
            name: name.into(),
            coefficients,
            op,
            rhs,
        });
    }

    pub fn set_bounds(&mut self, index: usize, bounds: Bounds) -> Result<(), SolverError> {
        let slot = self
            .bounds
            .get_mut(index)
            .ok_or(SolverError::UnknownVariable(index))?;
        *slot = bounds;
        Ok(())
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Objective value of an assignment, using the coefficients as given.
    pub fn objective_value(&self, values: &[f64]) -> f64 {
        self.objective
            .coefficients
            .iter()
            .zip(values)
            .map(|(coef, value)| coef * value)
            .sum()
    }

    /// Checks dimensions, finiteness and bound ordering.
    pub fn validate(&self) -> Result<(), SolverError> {
        let n = self.num_variables();

        check_len("objective", n, self.objective.coefficients.len())?;
        check_len("bounds", n, self.bounds.len())?;
        if self.objective.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(SolverError::NonFiniteCoefficient("objective".to_string()));
        }

        for c in &self.constraints {
            check_len(&format!("constraint {}", c.name), n, c.coefficients.len())?;
            if !c.rhs.is_finite() || c.coefficients.iter().any(|a| !a.is_finite()) {
                return Err(SolverError::NonFiniteCoefficient(format!("constraint {}", c.name)));
            }
        }

        for (name, b) in self.variables.iter().zip(&self.bounds) {
            if !b.is_valid() {
                return Err(SolverError::InvalidBounds {
                    variable: name.clone(),
                    lower: b.lower,
                    upper: b.upper,
                });
            }
        }

        Ok(())
    }

    /// Constraints (and variable bounds) the assignment breaks by more than `tolerance`,
    /// worst first.
    pub fn violations(&self, values: &[f64], tolerance: f64) -> Vec<ConstraintViolation> {
        let mut violations = Vec::new();

        for c in &self.constraints {
            let lhs = c.activity(values);
            let amount = match c.op {
                ConstraintOp::Le => lhs - c.rhs,
                ConstraintOp::Ge => c.rhs - lhs,
                ConstraintOp::Eq => (lhs - c.rhs).abs(),
            };
            if amount > tolerance {
                violations.push(ConstraintViolation {
                    constraint: c.name.clone(),
                    required: c.rhs,
                    actual: lhs,
                    violation_amount: amount,
                });
            }
        }

        for ((name, b), &value) in self.variables.iter().zip(&self.bounds).zip(values) {
            if !b.contains(value, tolerance) {
                let (required, amount) = if value < b.lower {
                    (b.lower, b.lower - value)
                } else {
                    (b.upper, value - b.upper)
                };
                violations.push(ConstraintViolation {
                    constraint: format!("bounds of {name}"),
                    required,
                    actual: value,
                    violation_amount: amount,
                });
            }
        }

        violations.sort_by(|a, b| b.violation_amount.total_cmp(&a.violation_amount));
        violations
    }
}

fn check_len(context: &str, expected: usize, found: usize) -> Result<(), SolverError> {
    if expected == found {
        Ok(())
    } else {
        Err(SolverError::DimensionMismatch {
            context: context.to_string(),
            expected,
            found,
        })
    }
}
