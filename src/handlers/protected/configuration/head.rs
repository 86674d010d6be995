use axum::{
    extract::{rejection::PathRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::api::format::probe_headers;
use crate::database::models::ConfigurationKey;
use crate::error::ApiError;
use crate::state::AppState;

use super::get::load;

/// HEAD /api/vehicles/:vehicleId/devices/:deviceId/configurations/:configurationId
///
/// Change-detection probe: `Last-Modified` plus the identifying `X-*` headers,
/// no body. Clients compare these against a cached copy before issuing a GET.
pub async fn head(
    State(state): State<AppState>,
    path: Result<Path<ConfigurationKey>, PathRejection>,
) -> Result<Response, ApiError> {
    let Path(key) = path?;
    let configuration = load(&state, &key).await?;
    let headers = probe_headers(&configuration)
        .map_err(|e| ApiError::internal_server_error(e.to_string()))?;

    Ok((StatusCode::OK, headers).into_response())
}
