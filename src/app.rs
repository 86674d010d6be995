use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware,
    routing::get,
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::api::format::{X_CONFIGURATION_ID, X_CONFIGURATION_VERSION_HASH, X_DEVICE_ID, X_VEHICLE_ID};
use crate::config::{AppConfig, SecurityConfig};
use crate::handlers::{protected, public};
use crate::middleware::jwt_auth_middleware;
use crate::state::AppState;

pub fn app(state: AppState, config: &AppConfig) -> Router {
    let mut router = Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        // Protected API
        .merge(configuration_routes(state.clone()))
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
        .with_state(state);

    // Global middleware
    if config.security.enable_cors {
        router = router.layer(cors_layer(&config.security));
    }
    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }
    router
}

fn configuration_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/api/vehicles/:vehicleId/devices/:deviceId/configurations",
            get(protected::configuration_list),
        )
        .route(
            "/api/vehicles/:vehicleId/devices/:deviceId/configurations/:configurationId",
            get(protected::configuration_get)
                .head(protected::configuration_head)
                .post(protected::configuration_post),
        )
        .route_layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::HEAD, Method::POST])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        // Polling clients read these from HEAD responses
        .expose_headers([
            header::LAST_MODIFIED,
            X_VEHICLE_ID,
            X_DEVICE_ID,
            X_CONFIGURATION_ID,
            X_CONFIGURATION_VERSION_HASH,
        ]);

    // A wildcard origin cannot be combined with credentials
    if security.cors_origins.iter().any(|origin| origin == "*") {
        tracing::warn!("CORS allows any origin; credentialed requests are disabled");
        return layer.allow_origin(AllowOrigin::any());
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(origins)).allow_credentials(true)
}
