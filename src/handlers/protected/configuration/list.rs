use axum::{
    extract::{rejection::PathRejection, Path, State},
    response::Json,
};
use serde::Deserialize;

use crate::database::models::ConfigurationSummary;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevicePath {
    pub vehicle_id: String,
    pub device_id: String,
}

/// GET /api/vehicles/:vehicleId/devices/:deviceId/configurations
///
/// Summaries (everything but `content`) of the device's configurations.
pub async fn list(
    State(state): State<AppState>,
    path: Result<Path<DevicePath>, PathRejection>,
) -> Result<Json<Vec<ConfigurationSummary>>, ApiError> {
    let Path(path) = path?;
    let configurations = state
        .configurations
        .list(&path.vehicle_id, &path.device_id)
        .await?;

    Ok(Json(configurations.iter().map(|c| c.summary()).collect()))
}
