use time::{macros::format_description, Date, Duration, OffsetDateTime};
use uuid::Uuid;

use super::{
    dto::{DailySummary, FoodLogCreate, HistoryQuery},
    repo_types::{FoodLog, NewFoodLog},
};
use crate::error::AppError;

pub const HISTORY_MAX_LIMIT: i64 = 100;

fn check_amount(name: &str, value: f64) -> Result<f64, AppError> {
    if !value.is_finite() || value < 0.0 {
        return Err(AppError::bad_request(format!(
            "{name} must be a non-negative number"
        )));
    }
    Ok(value)
}

/// Blank optional strings are stored as NULL.
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

pub fn validate_create(body: FoodLogCreate) -> Result<NewFoodLog, AppError> {
    let food_item = body.food_item.trim().to_string();
    if food_item.is_empty() {
        return Err(AppError::bad_request("food_item must not be empty"));
    }

    let confidence = match body.confidence {
        Some(c) if !c.is_finite() || !(0.0..=1.0).contains(&c) => {
            return Err(AppError::bad_request("confidence must be between 0 and 1"))
        }
        other => other,
    };

    Ok(NewFoodLog {
        food_item,
        calories: check_amount("calories", body.calories)?,
        protein: check_amount("protein", body.protein)?,
        carbs: check_amount("carbs", body.carbs)?,
        fat: check_amount("fat", body.fat)?,
        fiber: check_amount("fiber", body.fiber)?,
        sugar: check_amount("sugar", body.sugar)?,
        serving_size: non_blank(body.serving_size),
        image_url: non_blank(body.image_url),
        confidence,
    })
}

pub fn validate_history(q: &HistoryQuery) -> Result<(i64, i64), AppError> {
    if !(1..=HISTORY_MAX_LIMIT).contains(&q.limit) {
        return Err(AppError::bad_request(format!(
            "limit must be between 1 and {HISTORY_MAX_LIMIT}"
        )));
    }
    if q.offset < 0 {
        return Err(AppError::bad_request("offset must not be negative"));
    }
    Ok((q.limit, q.offset))
}

/// Parses `YYYY-MM-DD`.
pub fn parse_date(raw: &str) -> Result<Date, AppError> {
    Date::parse(raw.trim(), format_description!("[year]-[month]-[day]"))
        .map_err(|_| AppError::bad_request(format!("Invalid date '{raw}', expected YYYY-MM-DD")))
}

pub fn parse_log_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::bad_request("Invalid food log id"))
}

pub fn today_utc() -> Date {
    OffsetDateTime::now_utc().date()
}

/// `[midnight, next midnight)` in UTC.
pub fn day_bounds(date: Date) -> Result<(OffsetDateTime, OffsetDateTime), AppError> {
    let start = date.midnight().assume_utc();
    let end = start
        .checked_add(Duration::DAY)
        .ok_or_else(|| AppError::bad_request("Date out of range"))?;
    Ok((start, end))
}

pub fn summarize(date: Date, logs: &[FoodLog]) -> DailySummary {
    logs.iter().fold(
        DailySummary {
            date: date.to_string(),
            total_calories: 0.0,
            total_protein: 0.0,
            total_carbs: 0.0,
            total_fat: 0.0,
            total_fiber: 0.0,
            total_sugar: 0.0,
            meal_count: 0,
        },
        |mut acc, log| {
            acc.total_calories += log.calories;
            acc.total_protein += log.protein;
            acc.total_carbs += log.carbs;
            acc.total_fat += log.fat;
            acc.total_fiber += log.fiber;
            acc.total_sugar += log.sugar;
            acc.meal_count += 1;
            acc
        },
    )
}
