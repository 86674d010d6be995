mod common;

use anyhow::Result;
use axum::http::{header, Method, StatusCode};
use serde_json::json;

use common::{configuration_path, document, request, token, TestApp, EDITOR};

#[tokio::test]
async fn get_returns_full_record_with_last_modified() -> Result<()> {
    let app = TestApp::new();
    app.seed_configuration("v1", "d1", "c1", "abc123", json!({"key": "value", "nested": {"n": 1}}))
        .await;

    let res = app.get(&configuration_path("v1", "d1", "c1")).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.headers[header::LAST_MODIFIED], "Mon, 05 Oct 2026 09:30:00 GMT");

    let body = res.json();
    assert_eq!(
        body,
        json!({
            "vehicleId": "v1",
            "deviceId": "d1",
            "configurationId": "c1",
            "configurationVersionHash": "abc123",
            "content": {"key": "value", "nested": {"n": 1}},
            "updatedBy": "seed@example.com",
            "lastUpdate": "Mon, 05 Oct 2026 09:30:00 GMT"
        })
    );
    Ok(())
}

#[tokio::test]
async fn head_agrees_with_get() -> Result<()> {
    let app = TestApp::new();
    app.seed_configuration("v1", "d1", "c1", "abc123", json!({"key": "value"})).await;
    let path = configuration_path("v1", "d1", "c1");

    let head = app.send(request(Method::HEAD, &path, Some(&token(EDITOR)), None)).await?;
    assert_eq!(head.status, StatusCode::OK);
    assert!(head.body.is_empty());
    assert_eq!(head.headers["x-vehicleid"], "v1");
    assert_eq!(head.headers["x-deviceid"], "d1");
    assert_eq!(head.headers["x-configurationid"], "c1");
    assert_eq!(head.headers["x-configurationversionhash"], "abc123");

    let get = app.get(&path).await?;
    assert_eq!(head.headers[header::LAST_MODIFIED], get.headers[header::LAST_MODIFIED]);
    Ok(())
}

#[tokio::test]
async fn missing_configuration_is_not_found() -> Result<()> {
    let app = TestApp::new();
    app.seed_configuration("v1", "d1", "c1", "abc123", json!({})).await;

    // Same vehicle and configuration, different device
    let path = configuration_path("v1", "d2", "c1");
    let res = app.get(&path).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert!(res.body.is_empty());

    let res = app.send(request(Method::HEAD, &path, Some(&token(EDITOR)), None)).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn corrupt_stored_record_is_server_error() -> Result<()> {
    let app = TestApp::new();
    // content must be an object
    app.configurations
        .insert(document(json!({
            "vehicleId": "v1",
            "deviceId": "d1",
            "configurationId": "c1",
            "configurationVersionHash": "abc123",
            "content": "not an object",
            "updatedBy": "seed@example.com",
            "lastUpdate": "Mon, 05 Oct 2026 09:30:00 GMT"
        })))
        .await;
    // unknown field
    app.configurations
        .insert(document(json!({
            "vehicleId": "v1",
            "deviceId": "d1",
            "configurationId": "c2",
            "configurationVersionHash": "abc123",
            "content": {},
            "updatedBy": "seed@example.com",
            "lastUpdate": "Mon, 05 Oct 2026 09:30:00 GMT",
            "legacy": true
        })))
        .await;

    for id in ["c1", "c2"] {
        let path = configuration_path("v1", "d1", id);
        let res = app.get(&path).await?;
        assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR, "GET {}", id);
        assert!(res.body.is_empty());

        let res = app.send(request(Method::HEAD, &path, Some(&token(EDITOR)), None)).await?;
        assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR, "HEAD {}", id);
    }
    Ok(())
}

#[tokio::test]
async fn list_returns_device_summaries() -> Result<()> {
    let app = TestApp::new();
    app.seed_configuration("v1", "d1", "network", "h1", json!({"apn": "internet"})).await;
    app.seed_configuration("v1", "d1", "telemetry", "h2", json!({"interval": 30})).await;
    app.seed_configuration("v1", "d2", "network", "h3", json!({})).await;

    let res = app.get("/api/vehicles/v1/devices/d1/configurations").await?;
    assert_eq!(res.status, StatusCode::OK);

    let body = res.json();
    let summaries = body.as_array().expect("array body");
    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0]["configurationId"], "network");
    assert_eq!(summaries[1]["configurationId"], "telemetry");
    assert!(summaries.iter().all(|s| s.get("content").is_none()));

    let res = app.get("/api/vehicles/v9/devices/d1/configurations").await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json(), json!([]));
    Ok(())
}

#[tokio::test]
async fn undecodable_path_segments_are_bad_requests() -> Result<()> {
    let app = TestApp::new();
    app.seed_configuration("v1", "d1", "c1", "abc123", json!({"key": "value"})).await;

    // %FF is not UTF-8
    let path = configuration_path("v1", "d1", "%FF");
    let body = json!({"configurationVersionHash": "abc123", "content": {"key": "value"}});
    for (method, body) in [(Method::GET, None), (Method::HEAD, None), (Method::POST, Some(body))] {
        let res = app.send(request(method.clone(), &path, Some(&token(EDITOR)), body)).await?;
        assert_eq!(res.status, StatusCode::BAD_REQUEST, "{}", method);
        assert!(res.body.is_empty(), "{} error carries a body", method);
    }

    let res = app.get("/api/vehicles/%FF/devices/d1/configurations").await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.body.is_empty());

    // Auth still comes first
    let res = app.send(request(Method::GET, &path, None, None)).await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    Ok(())
}
