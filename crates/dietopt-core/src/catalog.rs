//! Catalog adapter: turns external catalog rows into engine [`Item`]s.

use std::collections::{BTreeMap, HashSet};

use crate::error::BuildError;

/// Food group a catalog row belongs to. Only the adapter looks at it.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Grains,
    Proteins,
    Dairy,
    Vegetables,
    Fruits,
    Fats,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Grains,
        Category::Proteins,
        Category::Dairy,
        Category::Vegetables,
        Category::Fruits,
        Category::Fats,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::Grains => "Grains",
            Category::Proteins => "Proteins",
            Category::Dairy => "Dairy",
            Category::Vegetables => "Vegetables",
            Category::Fruits => "Fruits",
            Category::Fats => "Oils and fats",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A food as the engine sees it. All quantities are per serving.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub name: String,
    pub calories: f64,
    pub protein: f64,
    pub fat: f64,
    pub carbohydrate: Option<f64>,
    pub price: f64,
    /// Minimum daily servings, applied only when portion limits are on
    pub min_daily: Option<f64>,
    /// Maximum daily servings, applied only when portion limits are on
    pub max_daily: Option<f64>,
}

impl Item {
    pub fn new(name: impl Into<String>, calories: f64, protein: f64, fat: f64, price: f64) -> Self {
        Self {
            name: name.into(),
            calories,
            protein,
            fat,
            carbohydrate: None,
            price,
            min_daily: None,
            max_daily: None,
        }
    }

    pub fn with_carbohydrate(mut self, carbohydrate: f64) -> Self {
        self.carbohydrate = Some(carbohydrate);
        self
    }

    pub fn with_portion(mut self, min_daily: Option<f64>, max_daily: Option<f64>) -> Self {
        self.min_daily = min_daily;
        self.max_daily = max_daily;
        self
    }

    /// Rejects negative or non-finite coefficients and inconsistent portion bounds.
    pub fn validate(&self) -> Result<(), BuildError> {
        let coefficients = [
            ("calories", Some(self.calories)),
            ("protein", Some(self.protein)),
            ("fat", Some(self.fat)),
            ("carbohydrate", self.carbohydrate),
            ("price", Some(self.price)),
        ];
        for (field, value) in coefficients {
            let Some(value) = value else { continue };
            if !value.is_finite() {
                return Err(BuildError::NonFiniteCoefficient {
                    item: self.name.clone(),
                    field,
                });
            }
            if value < 0.0 {
                return Err(BuildError::NegativeCoefficient {
                    item: self.name.clone(),
                    field,
                    value,
                });
            }
        }

        for value in [self.min_daily, self.max_daily].into_iter().flatten() {
            if !value.is_finite() || value < 0.0 {
                return Err(BuildError::InvalidPortion {
                    item: self.name.clone(),
                    value,
                });
            }
        }
        if let (Some(min), Some(max)) = (self.min_daily, self.max_daily) {
            if min > max {
                return Err(BuildError::PortionOrder {
                    item: self.name.clone(),
                    min,
                    max,
                });
            }
        }

        Ok(())
    }
}

/// A row of the external catalog before normalization.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogRow {
    pub name: String,
    pub category: Option<Category>,
    pub calories: f64,
    pub protein: f64,
    pub fat: f64,
    pub carbohydrate: Option<f64>,
    pub price: f64,
    pub min_daily: Option<f64>,
    pub max_daily: Option<f64>,
}

impl CatalogRow {
    fn basic(name: &str, category: Category, calories: f64, protein: f64, fat: f64, price: f64) -> Self {
        Self {
            name: name.to_string(),
            category: Some(category),
            calories,
            protein,
            fat,
            carbohydrate: None,
            price,
            min_daily: None,
            max_daily: None,
        }
    }

    /// Normalizes the row, filling missing portion bounds from `policy`.
    pub fn into_item(self, policy: &PortionPolicy) -> Item {
        let range = policy.range_for(self.category);
        Item {
            name: self.name,
            calories: self.calories,
            protein: self.protein,
            fat: self.fat,
            carbohydrate: self.carbohydrate,
            price: self.price,
            min_daily: self.min_daily.or(range.map(|r| r.min)),
            max_daily: self.max_daily.or(range.map(|r| r.max)),
        }
    }
}

/// Daily serving range
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortionRange {
    pub min: f64,
    pub max: f64,
}

impl PortionRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

/// Default serving ranges per category, used to fill rows that carry none.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PortionPolicy {
    pub categories: BTreeMap<Category, PortionRange>,
    /// Range for rows whose category has no entry (or no category at all)
    pub fallback: Option<PortionRange>,
}

impl PortionPolicy {
    /// Leaves rows untouched.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn reference() -> Self {
        let categories = BTreeMap::from([
            (Category::Fats, PortionRange::new(0.0, 3.0)),
            (Category::Proteins, PortionRange::new(1.0, 5.0)),
            (Category::Fruits, PortionRange::new(2.0, 4.0)),
            (Category::Vegetables, PortionRange::new(3.0, 8.0)),
            (Category::Grains, PortionRange::new(2.0, 6.0)),
            (Category::Dairy, PortionRange::new(1.0, 3.0)),
        ]);
        Self {
            categories,
            fallback: Some(PortionRange::new(0.0, 10.0)),
        }
    }

    pub fn range_for(&self, category: Option<Category>) -> Option<PortionRange> {
        category
            .and_then(|c| self.categories.get(&c).copied())
            .or(self.fallback)
    }
}

/// Read-only, normalized item table.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    items: Vec<Item>,
    categories: Vec<Option<Category>>,
}

impl Catalog {
    /// Normalizes rows in order. Names must be unique.
    pub fn from_rows(rows: Vec<CatalogRow>, policy: &PortionPolicy) -> Result<Self, BuildError> {
        let mut seen = HashSet::new();
        if let Some(duplicate) = rows.iter().find(|row| !seen.insert(row.name.as_str())) {
            return Err(BuildError::DuplicateItem(duplicate.name.clone()));
        }
        Ok(Self::normalize(rows, policy))
    }

    fn normalize(rows: Vec<CatalogRow>, policy: &PortionPolicy) -> Self {
        let categories = rows.iter().map(|row| row.category).collect();
        let items = rows.into_iter().map(|row| row.into_item(policy)).collect();
        Self { items, categories }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Case-insensitive lookup by name.
    pub fn get(&self, name: &str) -> Option<&Item> {
        let needle = name.to_lowercase();
        self.items.iter().find(|item| item.name.to_lowercase() == needle)
    }

    /// Case-insensitive, like [`Catalog::get`].
    pub fn category_of(&self, name: &str) -> Option<Category> {
        let needle = name.to_lowercase();
        self.items
            .iter()
            .position(|item| item.name.to_lowercase() == needle)
            .and_then(|i| self.categories.get(i).copied().flatten())
    }

    /// Item names grouped by category, each group in catalog order.
    pub fn categories(&self) -> BTreeMap<Category, Vec<&str>> {
        let mut groups: BTreeMap<Category, Vec<&str>> = BTreeMap::new();
        for (item, category) in self.items.iter().zip(&self.categories) {
            if let Some(category) = category {
                groups.entry(*category).or_default().push(&item.name);
            }
        }
        groups
    }
}

/// Reference rows, per serving. Prices in local currency.
pub fn builtin_rows() -> Vec<CatalogRow> {
    use Category::*;

    vec![
        CatalogRow::basic("Rice", Grains, 130.0, 2.7, 0.3, 1.20),
        CatalogRow::basic("Beans", Grains, 95.0, 6.0, 0.5, 2.50),
        CatalogRow::basic("Pasta", Grains, 220.0, 8.0, 1.1, 1.80),
        CatalogRow::basic("Oats", Grains, 68.0, 2.4, 1.4, 1.50),
        CatalogRow::basic("Wholegrain Bread", Grains, 80.0, 4.0, 1.0, 1.00),
        CatalogRow::basic("Chicken", Proteins, 165.0, 31.0, 3.6, 8.50),
        CatalogRow::basic("Beef", Proteins, 250.0, 26.0, 15.0, 15.00),
        CatalogRow::basic("Fish", Proteins, 206.0, 22.0, 12.0, 12.00),
        CatalogRow::basic("Eggs", Proteins, 155.0, 13.0, 11.0, 4.50),
        CatalogRow::basic("Cheese", Proteins, 113.0, 7.0, 9.0, 5.50),
        CatalogRow::basic("Milk", Dairy, 60.0, 3.2, 3.2, 2.80),
        CatalogRow::basic("Yogurt", Dairy, 59.0, 3.5, 3.3, 4.20),
        CatalogRow::basic("Broccoli", Vegetables, 25.0, 3.0, 0.3, 3.50),
        CatalogRow::basic("Carrot", Vegetables, 25.0, 0.6, 0.1, 2.00),
        CatalogRow::basic("Tomato", Vegetables, 18.0, 0.9, 0.2, 2.50),
        CatalogRow::basic("Lettuce", Vegetables, 5.0, 0.5, 0.1, 1.80),
        CatalogRow::basic("Banana", Fruits, 89.0, 1.1, 0.3, 2.20),
        CatalogRow::basic("Apple", Fruits, 52.0, 0.3, 0.2, 3.00),
        CatalogRow::basic("Orange", Fruits, 47.0, 0.9, 0.1, 2.80),
        CatalogRow::basic("Olive Oil", Fats, 884.0, 0.0, 100.0, 0.80),
        CatalogRow::basic("Butter", Fats, 717.0, 0.9, 81.0, 1.20),
    ]
}

/// The reference catalog with the reference portion policy applied.
pub fn builtin() -> Catalog {
    Catalog::normalize(builtin_rows(), &PortionPolicy::reference())
}
