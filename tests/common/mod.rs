#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    body::{Body, Bytes},
    extract::{Path, State},
    http::{header, HeaderMap, Method, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use vehicle_config_api::{
    app,
    auth::{generate_jwt, Claims, TokenVerifier},
    config::AppConfig,
    database::{Document, MemoryCollection},
    schema::{JsonSchemaValidator, SchemaFetcher},
    AppState,
};

pub const SECRET: &str = "integration-test-secret";
pub const SESSION_COOKIE: &str = "session-token";
pub const EDITOR: &str = "editor@example.com";

pub fn token(email: &str) -> String {
    let claims = Claims::new(email, None, 1).expect("token claims");
    generate_jwt(&claims, SECRET).expect("sign test token")
}

pub fn configuration_path(vehicle: &str, device: &str, configuration: &str) -> String {
    format!("/api/vehicles/{}/devices/{}/configurations/{}", vehicle, device, configuration)
}

pub fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    builder.body(body).expect("build request")
}

pub fn raw_request(method: Method, uri: &str, token: &str, body: &'static str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .expect("build request")
}

pub fn document(value: Value) -> Document {
    value.as_object().cloned().expect("document must be an object")
}

pub fn stored_configuration(vehicle: &str, device: &str, configuration: &str, hash: &str, content: Value) -> Document {
    document(json!({
        "vehicleId": vehicle,
        "deviceId": device,
        "configurationId": configuration,
        "configurationVersionHash": hash,
        "content": content,
        "updatedBy": "seed@example.com",
        "lastUpdate": "Mon, 05 Oct 2026 09:30:00 GMT"
    }))
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("response body is JSON")
    }
}

/// Router wired to in-memory collections
pub struct TestApp {
    pub router: Router,
    pub configurations: Arc<MemoryCollection>,
    pub bindings: Arc<MemoryCollection>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    /// Router built from the development preset after `configure` adjusts it
    pub fn with_config(configure: impl FnOnce(&mut AppConfig)) -> Self {
        let configurations = Arc::new(MemoryCollection::new());
        let bindings = Arc::new(MemoryCollection::new());

        let state = AppState::new(
            configurations.clone(),
            bindings.clone(),
            SchemaFetcher::new(reqwest::Client::new(), None),
            Arc::new(JsonSchemaValidator::new()),
            TokenVerifier::new(SECRET, SESSION_COOKIE).expect("verifier"),
        );

        let mut config = AppConfig::development();
        config.api.enable_request_logging = false;
        configure(&mut config);

        Self {
            router: app(state, &config),
            configurations,
            bindings,
        }
    }

    pub async fn seed_configuration(&self, vehicle: &str, device: &str, configuration: &str, hash: &str, content: Value) {
        self.configurations
            .insert(stored_configuration(vehicle, device, configuration, hash, content))
            .await;
    }

    pub async fn seed_binding(&self, configuration: &str, url: &str) {
        self.bindings
            .insert(document(json!({ "configurationId": configuration, "url": url })))
            .await;
    }

    pub async fn send(&self, request: Request<Body>) -> Result<TestResponse> {
        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        Ok(TestResponse { status, headers, body })
    }

    pub async fn get(&self, uri: &str) -> Result<TestResponse> {
        self.send(request(Method::GET, uri, Some(&token(EDITOR)), None)).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> Result<TestResponse> {
        self.send(request(Method::POST, uri, Some(&token(EDITOR)), Some(body))).await
    }
}

#[derive(Clone)]
struct SchemaRoutes {
    documents: Arc<HashMap<String, (StatusCode, String)>>,
    hits: Arc<AtomicUsize>,
}

/// Local HTTP server standing in for the remote schema host
pub struct SchemaServer {
    pub base_url: String,
    hits: Arc<AtomicUsize>,
}

impl SchemaServer {
    /// Serve `GET /schemas/<name>` from `(name, status, body)` entries; anything else is 404
    pub async fn spawn(documents: Vec<(&str, StatusCode, String)>) -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind schema server")?;

        let hits = Arc::new(AtomicUsize::new(0));
        let routes = SchemaRoutes {
            documents: Arc::new(
                documents
                    .into_iter()
                    .map(|(name, status, body)| (name.to_string(), (status, body)))
                    .collect(),
            ),
            hits: hits.clone(),
        };

        let router = Router::new()
            .route("/schemas/:name", get(serve_schema))
            .with_state(routes);
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Ok(Self {
            base_url: format!("http://127.0.0.1:{}", port),
            hits,
        })
    }

    /// `{hash}` template under this server
    pub fn template(&self, prefix: &str) -> String {
        format!("{}/schemas/{}-{{hash}}.json", self.base_url, prefix)
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

async fn serve_schema(State(routes): State<SchemaRoutes>, Path(name): Path<String>) -> Response {
    routes.hits.fetch_add(1, Ordering::SeqCst);
    match routes.documents.get(&name) {
        Some((status, body)) => (
            *status,
            [(header::CONTENT_TYPE, "application/schema+json")],
            body.clone(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

pub fn string_key_schema() -> String {
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "type": "object",
        "properties": { "key": { "type": "string" } },
        "required": ["key"],
        "additionalProperties": false
    })
    .to_string()
}

pub fn number_key_schema() -> String {
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "type": "object",
        "properties": { "key": { "type": "number" } },
        "required": ["key"]
    })
    .to_string()
}
