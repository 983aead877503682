pub mod dto;
pub mod handlers;

use crate::state::AppState;
use axum::Router;

pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    handlers::predict_routes(max_upload_bytes)
}
