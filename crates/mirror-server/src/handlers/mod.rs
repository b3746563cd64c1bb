//! HTTP handlers

pub mod load;
pub mod users;

use crate::error::ApiError;

/// Fallback for unknown paths and unsupported methods on known paths
pub async fn route_not_found() -> ApiError {
    ApiError::route_not_found()
}
