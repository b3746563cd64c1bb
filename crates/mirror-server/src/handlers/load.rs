//! Reload handler

use crate::error::ApiError;
use crate::AppState;
use axum::{extract::State, Json};
use mirror_core::MessageBody;

/// `GET /load`: replace the store contents with a fresh seed subset
pub async fn load(State(state): State<AppState>) -> Result<Json<MessageBody>, ApiError> {
    state
        .dataset
        .reload()
        .await
        .map_err(ApiError::internal("Failed to load data"))?;

    Ok(Json(MessageBody::new("Loaded users, posts, and comments.")))
}
