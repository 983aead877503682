use std::collections::HashMap;

use anyhow::Context;
use serde::{Deserialize, Serialize};

const EMBEDDED_TABLE: &str = include_str!("../../data/nutrition.json");

/// Nutrition facts for one serving of a food item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionInfo {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    #[serde(default)]
    pub fiber: f64,
    #[serde(default)]
    pub sugar: f64,
    pub serving_size: String,
}

impl NutritionInfo {
    pub fn unknown() -> Self {
        Self {
            calories: 0.0,
            protein: 0.0,
            carbs: 0.0,
            fat: 0.0,
            fiber: 0.0,
            sugar: 0.0,
            serving_size: "unknown".into(),
        }
    }
}

/// Lookup table keyed by lowercase food label.
#[derive(Debug, Clone)]
pub struct NutritionTable {
    entries: HashMap<String, NutritionInfo>,
}

impl NutritionTable {
    pub fn from_json(raw: &str) -> anyhow::Result<Self> {
        let parsed: HashMap<String, NutritionInfo> =
            serde_json::from_str(raw).context("parse nutrition table")?;
        let entries = parsed
            .into_iter()
            .map(|(k, v)| (k.trim().to_lowercase(), v))
            .collect();
        Ok(Self { entries })
    }

    /// The table shipped inside the binary.
    pub fn embedded() -> anyhow::Result<Self> {
        Self::from_json(EMBEDDED_TABLE)
    }

    pub fn lookup(&self, label: &str) -> NutritionInfo {
        self.entries
            .get(&label.trim().to_lowercase())
            .cloned()
            .unwrap_or_else(NutritionInfo::unknown)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.entries.contains_key(&label.trim().to_lowercase())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_table_parses() {
        let table = NutritionTable::embedded().expect("embedded table");
        assert!(!table.is_empty());
        let banana = table.lookup("banana");
        assert_eq!(banana.calories, 105.0);
        assert_eq!(banana.serving_size, "1 medium (118g)");
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let table = NutritionTable::embedded().unwrap();
        assert_eq!(table.lookup("Pizza"), table.lookup("pizza"));
        assert_eq!(table.lookup("  BROCCOLI "), table.lookup("broccoli"));
    }

    #[test]
    fn unknown_label_yields_zeros() {
        let table = NutritionTable::embedded().unwrap();
        let info = table.lookup("dragonfruit");
        assert_eq!(info, NutritionInfo::unknown());
        assert_eq!(info.serving_size, "unknown");
    }

    #[test]
    fn micros_default_to_zero_when_absent() {
        let raw = r#"{"Tea": {
            "calories": 2, "protein": 0, "carbs": 0.5, "fat": 0, "serving_size": "1 cup"
        }}"#;
        let table = NutritionTable::from_json(raw).unwrap();
        let tea = table.lookup("tea");
        assert_eq!(tea.fiber, 0.0);
        assert_eq!(tea.sugar, 0.0);
    }

    #[test]
    fn malformed_table_is_an_error() {
        assert!(NutritionTable::from_json("[1, 2, 3]").is_err());
    }
}
