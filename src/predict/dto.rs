use serde::Serialize;

use crate::classifier::NutritionInfo;

#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    pub food_item: String,
    pub confidence: f64,
    pub nutrition: NutritionInfo,
}
