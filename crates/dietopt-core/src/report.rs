//! Result extractor: solved variables -> per-item quantities and totals.

use std::collections::HashMap;

use dietopt_solver::{LpProblem, Solution, SolutionStatus};

use crate::catalog::Item;

/// Quantities below this many servings are left out of the itemized list
pub const SIGNIFICANCE_THRESHOLD: f64 = 0.01;

/// One recommended item and what it contributes.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ReportLine {
    pub name: String,
    pub quantity: f64,
    pub cost: f64,
    pub calories: f64,
    pub protein: f64,
    pub fat: f64,
    pub carbohydrate: f64,
}

/// Outcome of one optimization, ready for presentation.
///
/// Totals cover every item, including those too small to be listed. When the status
/// is not optimal the totals are zero and the list is empty.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub status: SolutionStatus,
    pub total_cost: f64,
    pub total_calories: f64,
    pub total_protein: f64,
    pub total_fat: f64,
    pub total_carbohydrate: f64,
    pub items: Vec<ReportLine>,
}

impl Report {
    pub fn empty(status: SolutionStatus) -> Self {
        Self {
            status,
            total_cost: 0.0,
            total_calories: 0.0,
            total_protein: 0.0,
            total_fat: 0.0,
            total_carbohydrate: 0.0,
            items: Vec::new(),
        }
    }

    pub fn is_optimal(&self) -> bool {
        self.status == SolutionStatus::Optimal
    }

    pub fn line(&self, name: &str) -> Option<&ReportLine> {
        self.items.iter().find(|line| line.name == name)
    }

    /// Listed quantity of `name`, 0 when it is not listed.
    pub fn quantity(&self, name: &str) -> f64 {
        self.line(name).map_or(0.0, |line| line.quantity)
    }

    fn accumulate(&mut self, line: &ReportLine) {
        self.total_cost += line.cost;
        self.total_calories += line.calories;
        self.total_protein += line.protein;
        self.total_fat += line.fat;
        self.total_carbohydrate += line.carbohydrate;
    }
}

/// Maps `solution` back onto `items` using the default significance threshold.
pub fn extract(instance: &LpProblem, solution: &Solution, items: &[Item]) -> Report {
    extract_with_threshold(instance, solution, items, SIGNIFICANCE_THRESHOLD)
}

/// Items without a variable in `instance` (excluded ones) count as zero.
pub fn extract_with_threshold(instance: &LpProblem, solution: &Solution, items: &[Item], threshold: f64) -> Report {
    if !solution.is_optimal() {
        return Report::empty(solution.status);
    }

    let positions: HashMap<&str, usize> = instance
        .variables
        .iter()
        .enumerate()
        .map(|(i, name)| (name.as_str(), i))
        .collect();

    let mut report = Report::empty(SolutionStatus::Optimal);
    for item in items {
        let quantity = positions
            .get(item.name.as_str())
            .map_or(0.0, |&i| solution.value(i));

        let line = ReportLine {
            name: item.name.clone(),
            quantity,
            cost: quantity * item.price,
            calories: quantity * item.calories,
            protein: quantity * item.protein,
            fat: quantity * item.fat,
            carbohydrate: quantity * item.carbohydrate.unwrap_or(0.0),
        };
        report.accumulate(&line);
        if quantity >= threshold {
            report.items.push(line);
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instance(names: &[&str]) -> LpProblem {
        LpProblem::new(names.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_extract_totals_and_lines() {
        let items = vec![
            Item::new("A", 200.0, 10.0, 5.0, 2.0).with_carbohydrate(20.0),
            Item::new("B", 150.0, 3.0, 1.0, 1.0),
        ];
        let solution = Solution::optimal(vec![1.5, 2.0], 5.0, 3);

        let report = extract(&instance(&["A", "B"]), &solution, &items);

        assert!(report.is_optimal());
        assert_eq!(report.items.len(), 2);
        assert_eq!(report.total_cost, 5.0);
        assert_eq!(report.total_calories, 600.0);
        assert_eq!(report.total_protein, 21.0);
        assert_eq!(report.total_fat, 9.5);
        assert_eq!(report.total_carbohydrate, 30.0);

        let a = report.line("A").unwrap();
        assert_eq!(a.cost, 3.0);
        assert_eq!(a.carbohydrate, 30.0);
    }

    #[test]
    fn test_negligible_quantities_are_hidden_but_counted() {
        let items = vec![Item::new("A", 100.0, 1.0, 1.0, 2.0), Item::new("B", 100.0, 1.0, 1.0, 1.0)];
        let solution = Solution::optimal(vec![3.0, 0.005], 6.005, 1);

        let report = extract(&instance(&["A", "B"]), &solution, &items);

        assert_eq!(report.items.len(), 1);
        assert!(report.line("B").is_none());
        assert_eq!(report.quantity("B"), 0.0);
        assert!((report.total_cost - 6.005).abs() < 1e-12);
        assert!((report.total_calories - 300.5).abs() < 1e-9);
    }

    #[test]
    fn test_items_without_variables_count_as_zero() {
        let items = vec![Item::new("A", 100.0, 1.0, 1.0, 2.0), Item::new("Excluded", 100.0, 1.0, 1.0, 1.0)];
        let solution = Solution::optimal(vec![2.0], 4.0, 1);

        let report = extract(&instance(&["A"]), &solution, &items);

        assert_eq!(report.items.len(), 1);
        assert_eq!(report.total_cost, 4.0);
    }

    #[test]
    fn test_non_optimal_reports_status_only() {
        let items = vec![Item::new("A", 100.0, 1.0, 1.0, 2.0)];
        for solution in [Solution::infeasible(4), Solution::unbounded(2)] {
            let report = extract(&instance(&["A"]), &solution, &items);
            assert_eq!(report, Report::empty(solution.status));
            assert!(!report.is_optimal());
        }
    }
}
