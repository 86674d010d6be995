use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::error::ApiError;
use crate::state::AppState;

/// Authentication middleware: verifies the session token and injects the
/// `Principal` into request extensions. Runs before any handler extractor, so
/// unauthenticated requests are rejected before the body is read.
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let principal = state
        .verifier
        .verify(request.headers())
        .ok_or_else(|| ApiError::unauthorized(format!("{} {} without a valid token", request.method(), request.uri().path())))?;

    tracing::debug!("Authenticated {} for {}", principal.email, request.uri().path());
    request.extensions_mut().insert(principal);

    Ok(next.run(request).await)
}
