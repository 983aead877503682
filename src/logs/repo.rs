use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{FoodLog, NewFoodLog};

const COLUMNS: &str = "id, user_id, food_item, calories, protein, carbs, fat, fiber, sugar, \
                       serving_size, image_url, confidence, created_at";

pub async fn insert(db: &PgPool, user_id: Uuid, log: &NewFoodLog) -> Result<FoodLog, sqlx::Error> {
    let sql = format!(
        r#"
        INSERT INTO food_logs
            (user_id, food_item, calories, protein, carbs, fat, fiber, sugar,
             serving_size, image_url, confidence)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING {COLUMNS}
        "#
    );
    sqlx::query_as::<_, FoodLog>(&sql)
        .bind(user_id)
        .bind(&log.food_item)
        .bind(log.calories)
        .bind(log.protein)
        .bind(log.carbs)
        .bind(log.fat)
        .bind(log.fiber)
        .bind(log.sugar)
        .bind(&log.serving_size)
        .bind(&log.image_url)
        .bind(log.confidence)
        .fetch_one(db)
        .await
}

/// Newest first.
pub async fn list_by_user(
    db: &PgPool,
    user_id: Uuid,
    limit: i64,
    offset: i64,
) -> anyhow::Result<Vec<FoodLog>> {
    let sql = format!(
        r#"
        SELECT {COLUMNS}
        FROM food_logs
        WHERE user_id = $1
        ORDER BY created_at DESC
        LIMIT $2 OFFSET $3
        "#
    );
    let rows = sqlx::query_as::<_, FoodLog>(&sql)
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

/// Logs with `start <= created_at < end`, newest first.
pub async fn list_between(
    db: &PgPool,
    user_id: Uuid,
    start: OffsetDateTime,
    end: OffsetDateTime,
) -> anyhow::Result<Vec<FoodLog>> {
    let sql = format!(
        r#"
        SELECT {COLUMNS}
        FROM food_logs
        WHERE user_id = $1 AND created_at >= $2 AND created_at < $3
        ORDER BY created_at DESC
        "#
    );
    let rows = sqlx::query_as::<_, FoodLog>(&sql)
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

/// Returns false when no row with that id belongs to the user.
pub async fn delete_owned(db: &PgPool, user_id: Uuid, log_id: Uuid) -> anyhow::Result<bool> {
    let res = sqlx::query(
        r#"
        DELETE FROM food_logs
        WHERE id = $1 AND user_id = $2
        "#,
    )
    .bind(log_id)
    .bind(user_id)
    .execute(db)
    .await?;
    Ok(res.rows_affected() > 0)
}
