use crate::error::BuildError;

/// Daily nutritional goals and spending cap.
///
/// Sign and magnitude are the caller's business; only finiteness is checked.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Target {
    pub min_calories: f64,
    pub min_protein: f64,
    pub max_fat: f64,
    pub max_budget: f64,
    pub max_carbohydrate: Option<f64>,
}

impl Target {
    pub fn new(min_calories: f64, min_protein: f64, max_fat: f64, max_budget: f64) -> Self {
        Self {
            min_calories,
            min_protein,
            max_fat,
            max_budget,
            max_carbohydrate: None,
        }
    }

    pub fn with_max_carbohydrate(mut self, max_carbohydrate: f64) -> Self {
        self.max_carbohydrate = Some(max_carbohydrate);
        self
    }

    /// 2000 kcal, 50 g protein, at most 65 g fat and 50.00 spent.
    pub fn reference() -> Self {
        Self::new(2000.0, 50.0, 65.0, 50.0)
    }

    pub fn validate(&self) -> Result<(), BuildError> {
        let fields = [
            ("min_calories", Some(self.min_calories)),
            ("min_protein", Some(self.min_protein)),
            ("max_fat", Some(self.max_fat)),
            ("max_budget", Some(self.max_budget)),
            ("max_carbohydrate", self.max_carbohydrate),
        ];
        match fields
            .into_iter()
            .find(|(_, value)| value.is_some_and(|v| !v.is_finite()))
        {
            Some((name, _)) => Err(BuildError::NonFiniteTarget(name)),
            None => Ok(()),
        }
    }
}
