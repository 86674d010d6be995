use axum::http::{header, HeaderMap, HeaderName, HeaderValue};
use chrono::{DateTime, Utc};

use crate::database::models::Configuration;

pub const X_VEHICLE_ID: HeaderName = HeaderName::from_static("x-vehicleid");
pub const X_DEVICE_ID: HeaderName = HeaderName::from_static("x-deviceid");
pub const X_CONFIGURATION_ID: HeaderName = HeaderName::from_static("x-configurationid");
pub const X_CONFIGURATION_VERSION_HASH: HeaderName = HeaderName::from_static("x-configurationversionhash");

/// IMF-fixdate, e.g. `Sun, 06 Nov 1994 08:49:37 GMT`
pub fn http_date(at: DateTime<Utc>) -> String {
    at.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

#[derive(Debug, thiserror::Error)]
#[error("stored value for {header} cannot be sent as a header: {value:?}")]
pub struct HeaderValueError {
    pub header: HeaderName,
    pub value: String,
}

fn header_value(header: &HeaderName, value: &str) -> Result<HeaderValue, HeaderValueError> {
    HeaderValue::from_str(value).map_err(|_| HeaderValueError {
        header: header.clone(),
        value: value.to_string(),
    })
}

/// `Last-Modified` for a GET response
pub fn last_modified_headers(configuration: &Configuration) -> Result<HeaderMap, HeaderValueError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::LAST_MODIFIED,
        header_value(&header::LAST_MODIFIED, &configuration.last_update)?,
    );
    Ok(headers)
}

/// `Last-Modified` plus the identifying `X-*` headers for a HEAD probe
pub fn probe_headers(configuration: &Configuration) -> Result<HeaderMap, HeaderValueError> {
    let mut headers = last_modified_headers(configuration)?;
    for (name, value) in [
        (X_VEHICLE_ID, &configuration.vehicle_id),
        (X_DEVICE_ID, &configuration.device_id),
        (X_CONFIGURATION_ID, &configuration.configuration_id),
        (X_CONFIGURATION_VERSION_HASH, &configuration.configuration_version_hash),
    ] {
        let value = header_value(&name, value)?;
        headers.insert(name, value);
    }
    Ok(headers)
}
