//! User handlers

use crate::error::ApiError;
use crate::services::CreateOutcome;
use crate::AppState;
use axum::{
    extract::{
        rejection::{BytesRejection, PathRejection},
        Path, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use mirror_core::{Document, MessageBody};
use serde_json::Value;

/// `DELETE /users`: empty all three collections
pub async fn purge(State(state): State<AppState>) -> Result<Json<MessageBody>, ApiError> {
    let counts = state
        .dataset
        .purge()
        .await
        .map_err(ApiError::internal("Failed to delete users."))?;

    Ok(Json(MessageBody::new(format!(
        "Deleted {} users, {} posts, and {} comments.",
        counts.users, counts.posts, counts.comments
    ))))
}

/// `DELETE /users/:id`: cascading delete of one user
pub async fn remove(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<MessageBody>, ApiError> {
    let Path(raw_id) = path.map_err(|_| ApiError::BadRequest("Invalid userId."))?;
    remove_by_raw_id(&state, &raw_id).await
}

/// `DELETE /users/`: id segment present but empty
pub async fn remove_blank(State(state): State<AppState>) -> Result<Json<MessageBody>, ApiError> {
    remove_by_raw_id(&state, "").await
}

async fn remove_by_raw_id(state: &AppState, raw_id: &str) -> Result<Json<MessageBody>, ApiError> {
    let user_id: i64 = raw_id
        .parse()
        .map_err(|_| ApiError::BadRequest("Invalid userId."))?;

    let posts_removed = state
        .dataset
        .remove_user(user_id)
        .await
        .map_err(ApiError::internal("Error deleting user."))?
        .ok_or(ApiError::NotFound("User not found."))?;

    Ok(Json(MessageBody::new(format!(
        "User {}, their {} posts and related comments deleted.",
        user_id, posts_removed
    ))))
}

/// `GET /users/:id`: user with nested posts and comments
pub async fn get(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<Document>, ApiError> {
    let Ok(Path(raw_id)) = path else {
        return Err(ApiError::NotFound("User not found."));
    };
    get_by_raw_id(&state, &raw_id).await
}

/// `GET /users/`: id segment present but empty
pub async fn get_blank(State(state): State<AppState>) -> Result<Json<Document>, ApiError> {
    get_by_raw_id(&state, "").await
}

async fn get_by_raw_id(state: &AppState, raw_id: &str) -> Result<Json<Document>, ApiError> {
    // An id that is not an integer cannot name a stored user
    let Ok(user_id) = raw_id.parse::<i64>() else {
        return Err(ApiError::NotFound("User not found."));
    };

    state
        .dataset
        .user_with_posts(user_id)
        .await
        .map_err(ApiError::internal("Failed to fetch user."))?
        .map(Json)
        .ok_or(ApiError::NotFound("User not found."))
}

/// `PUT /users`: create a user unless the id is taken.
///
/// The route runs without a body size limit, so any remaining rejection is
/// a body that could not be read at all.
pub async fn create(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, ApiError> {
    let body = body.map_err(|_| ApiError::BadRequest("Invalid user data."))?;
    let (user_id, user) = parse_user(&body).ok_or(ApiError::BadRequest("Invalid user data."))?;

    let outcome = state
        .dataset
        .create_user(user_id, &user)
        .await
        .map_err(ApiError::internal("Failed to create user."))?;

    match outcome {
        CreateOutcome::AlreadyExists => Err(ApiError::Conflict("User already exists.")),
        CreateOutcome::Created => Ok((
            StatusCode::CREATED,
            [(header::LOCATION, format!("/users/{}", user_id))],
            Json(MessageBody::new("User created.")),
        )
            .into_response()),
    }
}

/// A JSON object carrying an integer `id`
fn parse_user(body: &[u8]) -> Option<(i64, Document)> {
    let value: Value = serde_json::from_slice(body).ok()?;
    let user = Document::try_from(value).ok()?;
    Some((user.id()?, user))
}
