use axum::{
    extract::{
        multipart::{Field, MultipartRejection}, DefaultBodyLimit, Multipart, State,
    },
    routing::post,
    Json, Router,
};
use bytes::Bytes;
use tracing::{info, instrument, warn};

use super::dto::PredictionResponse;
use crate::{
    error::{AppError, AppResult},
    state::AppState,
};

const IMAGE_FIELDS: [&str; 2] = ["image", "file"];

pub fn predict_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/predict", post(predict))
        .route("/predict/", post(predict))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
}

/// Uploaded image bytes with the client-declared content type.
#[derive(Debug)]
pub struct ImageUpload {
    pub content_type: String,
    pub body: Bytes,
}

async fn read_upload(field: Field<'_>) -> AppResult<ImageUpload> {
    let content_type = field.content_type().unwrap_or_default().to_string();
    if !content_type.starts_with("image/") {
        return Err(AppError::bad_request("File must be an image"));
    }
    let body = field
        .bytes()
        .await
        .map_err(|e| AppError::bad_request(format!("Failed to read upload: {e}")))?;
    if body.is_empty() {
        return Err(AppError::bad_request("Empty image upload"));
    }
    Ok(ImageUpload { content_type, body })
}

/// First image-bearing field of the form, validated.
pub async fn extract_image(mp: &mut Multipart) -> AppResult<ImageUpload> {
    loop {
        let field = mp
            .next_field()
            .await
            .map_err(|e| AppError::bad_request(format!("Malformed multipart body: {e}")))?;
        let Some(field) = field else {
            return Err(AppError::bad_request("No image uploaded"));
        };
        if field.name().is_some_and(|n| IMAGE_FIELDS.contains(&n)) {
            return read_upload(field).await;
        }
    }
}

#[instrument(skip(state, mp))]
pub async fn predict(
    State(state): State<AppState>,
    mp: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<PredictionResponse>> {
    let mut mp = mp?;
    let upload = extract_image(&mut mp).await.map_err(|e| {
        warn!(error = %e, "rejected prediction upload");
        e
    })?;
    let size = upload.body.len();
    let content_type = upload.content_type.clone();

    let classifier = state.classifier.clone();
    let (prediction, nutrition) = tokio::task::spawn_blocking(move || {
        let p = classifier.predict(&upload.body)?;
        let n = classifier.nutrition(&p.food_item);
        anyhow::Ok((p, n))
    })
    .await
    .map_err(|e| AppError::ImageProcessing(e.to_string()))?
    .map_err(|e| AppError::ImageProcessing(format!("{e:#}")))?;

    info!(
        bytes = size,
        %content_type,
        food_item = %prediction.food_item,
        confidence = prediction.confidence,
        "prediction served"
    );
    Ok(Json(PredictionResponse {
        food_item: prediction.food_item,
        confidence: prediction.confidence,
        nutrition,
    }))
}
