use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::{
    dto::{DailySummary, FoodLogCreate, HistoryQuery},
    repo,
    repo_types::FoodLog,
    services::{
        day_bounds, parse_date, parse_log_id, summarize, today_utc, validate_create,
        validate_history,
    },
};
use crate::{
    auth::CurrentUser,
    db,
    error::{AppError, AppResult},
    extract::{AppJson, AppPath, AppQuery},
    state::AppState,
};

pub fn log_routes() -> Router<AppState> {
    Router::new()
        .route("/log/add", post(add_log))
        .route("/log/history", get(history))
        .route("/log/today", get(today))
        .route("/log/summary/today", get(summary_today))
        .route("/log/summary/date/:date", get(summary_for_date))
        .route("/log/:id", delete(delete_log))
}

#[instrument(skip(state, user, body), fields(user_id = %user.id))]
pub async fn add_log(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    AppJson(body): AppJson<FoodLogCreate>,
) -> AppResult<(StatusCode, Json<FoodLog>)> {
    let user_id = user.id;
    let new = validate_create(body).map_err(|e| {
        warn!(error = %e, %user_id, "invalid food log");
        e
    })?;

    let log = repo::insert(&state.db, user_id, &new).await.map_err(|e| {
        // user removed between the lookup and the insert
        if db::is_foreign_key_violation(&e) {
            warn!(%user_id, "food log for unknown user");
            AppError::unauthorized("User not found")
        } else {
            AppError::Internal(anyhow::Error::new(e).context("insert food log"))
        }
    })?;

    info!(%user_id, log_id = %log.id, food_item = %log.food_item, "food log added");
    Ok((StatusCode::CREATED, Json(log)))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn history(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    AppQuery(q): AppQuery<HistoryQuery>,
) -> AppResult<Json<Vec<FoodLog>>> {
    let user_id = user.id;
    let (limit, offset) = validate_history(&q)?;
    let logs = repo::list_by_user(&state.db, user_id, limit, offset).await?;
    Ok(Json(logs))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn today(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<Vec<FoodLog>>> {
    let user_id = user.id;
    let (start, end) = day_bounds(today_utc())?;
    let logs = repo::list_between(&state.db, user_id, start, end).await?;
    Ok(Json(logs))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn summary_today(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<DailySummary>> {
    let user_id = user.id;
    daily_summary(&state, user_id, today_utc()).await.map(Json)
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn summary_for_date(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    AppPath(raw): AppPath<String>,
) -> AppResult<Json<DailySummary>> {
    let user_id = user.id;
    let date = parse_date(&raw)?;
    daily_summary(&state, user_id, date).await.map(Json)
}

async fn daily_summary(
    state: &AppState,
    user_id: uuid::Uuid,
    date: time::Date,
) -> AppResult<DailySummary> {
    let (start, end) = day_bounds(date)?;
    let logs = repo::list_between(&state.db, user_id, start, end).await?;
    Ok(summarize(date, &logs))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn delete_log(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    AppPath(raw): AppPath<String>,
) -> AppResult<StatusCode> {
    let user_id = user.id;
    let log_id = parse_log_id(&raw)?;
    if !repo::delete_owned(&state.db, user_id, log_id).await? {
        warn!(%user_id, %log_id, "delete of missing or foreign food log");
        return Err(AppError::not_found("Food log not found"));
    }
    info!(%user_id, %log_id, "food log deleted");
    Ok(StatusCode::NO_CONTENT)
}
