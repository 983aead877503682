use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// One recorded meal entry.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct FoodLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub food_item: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub fiber: f64,
    pub sugar: f64,
    pub serving_size: Option<String>,
    pub image_url: Option<String>,
    pub confidence: Option<f64>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Validated values for a new row; id and timestamp come from the database.
#[derive(Debug, Clone, PartialEq)]
pub struct NewFoodLog {
    pub food_item: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub fiber: f64,
    pub sugar: f64,
    pub serving_size: Option<String>,
    pub image_url: Option<String>,
    pub confidence: Option<f64>,
}
