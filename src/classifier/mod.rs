mod heuristic;
mod nutrition;

use serde::Serialize;

pub use heuristic::{ColorStats, FoodGroup, HeuristicClassifier};
pub use nutrition::{NutritionInfo, NutritionTable};

/// Guessed food label with a confidence in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub food_item: String,
    pub confidence: f64,
}

/// Maps raw image bytes to a food label and its nutrition facts.
///
/// Implementations are CPU-bound; callers on the async runtime should run
/// `predict` on the blocking pool.
pub trait FoodClassifier: Send + Sync {
    fn predict(&self, image: &[u8]) -> anyhow::Result<Prediction>;
    fn nutrition(&self, label: &str) -> NutritionInfo;
}
