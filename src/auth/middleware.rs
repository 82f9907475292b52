//! Per-request authentication gate
//!
//! Runs before any handler. A request without a `Bearer` authorization header
//! passes through unauthenticated; whether a route demands an identity is the
//! handler's concern. A present token is checked against the revocation list
//! before anything else, then validated and resolved to a user that handlers
//! read from request extensions.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::auth::api::AppState;
use crate::auth::service::AuthError;
use crate::store::models::User;

/// Authenticated identity attached to the request by the gate
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

/// Extract the token from an `Authorization: Bearer <token>` header
///
/// Exact prefix match: case-sensitive scheme, single space. Anything else is
/// treated as no token at all.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

/// Authenticate a request, once, before the inner handler runs
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = bearer_token(request.headers()) else {
        // No bearer token: unauthenticated pass-through
        return next.run(request).await;
    };
    let token = token.to_owned();

    // Revocation wins over everything, including cryptographic validity
    if state.auth.blacklist().is_revoked(&token) {
        tracing::warn!("rejected blacklisted token");
        return AuthError::Revoked.into_response();
    }

    match state.auth.resolve_token(&token).await {
        Ok(user) => {
            if request.extensions().get::<AuthUser>().is_none() {
                request.extensions_mut().insert(AuthUser(user));
            }
            next.run(request).await
        }
        // Malformed, expired, or unresolvable tokens fail the request
        // through the shared error response; the pipeline never panics
        Err(err) => err.into_response(),
    }
}
