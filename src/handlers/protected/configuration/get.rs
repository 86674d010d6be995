use axum::{
    extract::{rejection::PathRejection, Path, State},
    response::{IntoResponse, Json, Response},
};

use crate::api::format::last_modified_headers;
use crate::database::models::{Configuration, ConfigurationKey};
use crate::error::ApiError;
use crate::state::AppState;

/// Look up and decode the configuration at `key`, shared by GET and HEAD
pub(super) async fn load(state: &AppState, key: &ConfigurationKey) -> Result<Configuration, ApiError> {
    state
        .configurations
        .find(key)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("configuration {} not found", key)))
}

/// GET /api/vehicles/:vehicleId/devices/:deviceId/configurations/:configurationId
///
/// Full record as JSON with `Last-Modified` set to its last write.
pub async fn get(
    State(state): State<AppState>,
    path: Result<Path<ConfigurationKey>, PathRejection>,
) -> Result<Response, ApiError> {
    let Path(key) = path?;
    let configuration = load(&state, &key).await?;
    let headers = last_modified_headers(&configuration)
        .map_err(|e| ApiError::internal_server_error(e.to_string()))?;

    Ok((headers, Json(configuration)).into_response())
}
