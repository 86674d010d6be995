use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, PathRejection},
        Extension, Path, State,
    },
    http::StatusCode,
};
use chrono::Utc;
use serde_json::Value;
use tracing::info;

use crate::api::format::http_date;
use crate::auth::Principal;
use crate::database::models::{Configuration, ConfigurationKey, ConfigurationUpdate};
use crate::error::ApiError;
use crate::schema::SchemaFetcher;
use crate::state::AppState;

/// POST /api/vehicles/:vehicleId/devices/:deviceId/configurations/:configurationId
///
/// Overwrites an existing configuration with `{configurationVersionHash, content}`
/// after validating `content` against the schema bound to `configurationId` at
/// that hash. Never creates a configuration.
///
/// 400: body malformed or content rejected by the schema
/// 404: no schema binding, or no configuration at this key
/// 413: body over the configured size limit
/// 500: corrupt binding, schema unreachable or not a usable JSON Schema
pub async fn post(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    path: Result<Path<ConfigurationKey>, PathRejection>,
    body: Result<Bytes, BytesRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(key) = path?;
    // Oversized bodies are 413
    let body = body?;

    // Unparseable JSON and shape mismatches are both the caller's problem
    let update = ConfigurationUpdate::decode(&body)
        .map_err(|e| ApiError::bad_request(format!("invalid configuration body for {}: {}", key, e)))?;

    let binding = state
        .schema_bindings
        .find(&key.configuration_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("no schema binding for configuration '{}'", key.configuration_id)))?;

    let schema_url = SchemaFetcher::parse_url(&binding.resolve(&update.configuration_version_hash))?;
    let schema = state.schemas.fetch(&schema_url).await?;

    state
        .validator
        .validate(&schema, &Value::Object(update.content.clone()))?;

    let configuration = Configuration {
        vehicle_id: key.vehicle_id,
        device_id: key.device_id,
        configuration_id: key.configuration_id,
        configuration_version_hash: update.configuration_version_hash,
        content: update.content,
        updated_by: principal.email,
        last_update: http_date(Utc::now()),
    };

    if !state.configurations.replace(&configuration).await? {
        return Err(ApiError::not_found(format!("configuration {} not found", configuration.key())));
    }

    info!(
        "Configuration {} replaced by {} (version {})",
        configuration.key(),
        configuration.updated_by,
        configuration.configuration_version_hash
    );
    Ok(StatusCode::OK)
}
