//! Auth API endpoints
//!
//! - POST /auth/login - Verify credentials, issue a token, persist a session
//! - POST /auth/logout - Revoke a token and remove its session
//! - POST /auth/register - Create a new account
//! - GET  /auth/me - Current user info (requires auth)
//! - POST /auth/profile - Update display/preferred name (requires auth)
//! - POST /auth/delete-account - Close the account (requires auth)
//! - GET  /auth/sessions - Enumerate the caller's sessions (requires auth)

use axum::{
    Extension, Json, Router,
    extract::State,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::middleware::{AuthUser, authenticate};
use crate::auth::service::{
    AuthError, AuthService, LoginRequest, LoginResponse, RegisterRequest, UpdateProfileRequest,
};
use crate::store::models::{Session, UserResponse};

/// Shared state for auth routes and the authenticator layer
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
}

/// API error response body
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
}

impl ApiError {
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
        }
    }
}

/// Convert AuthError to an API response; nothing here is fatal
impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AuthError::MissingField(_) => (StatusCode::BAD_REQUEST, "MISSING_FIELD"),
            AuthError::InvalidEmail => (StatusCode::BAD_REQUEST, "INVALID_EMAIL"),
            AuthError::EmailTaken => (StatusCode::CONFLICT, "EMAIL_EXISTS"),
            AuthError::UserNotFound => (StatusCode::UNAUTHORIZED, "USER_NOT_FOUND"),
            AuthError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS"),
            AuthError::TokenExpired => (StatusCode::UNAUTHORIZED, "TOKEN_EXPIRED"),
            AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "INVALID_TOKEN"),
            AuthError::Revoked => (StatusCode::UNAUTHORIZED, "TOKEN_REVOKED"),
            AuthError::NotAuthenticated => (StatusCode::UNAUTHORIZED, "NOT_AUTHENTICATED"),
            AuthError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let body = ApiError::new(self.to_string(), code);

        (status, Json(body)).into_response()
    }
}

/// Logout request: the token to revoke
#[derive(Debug, Deserialize)]
pub struct LogoutRequest {
    pub token: String,
}

/// Response for logout
#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub message: String,
}

/// Public view of one stored session
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub id: Uuid,
    pub token: String,
    pub expires_in: i64,
    pub created_at: DateTime<Utc>,
}

impl From<Session> for SessionResponse {
    fn from(session: Session) -> Self {
        Self {
            id: session.id,
            token: session.token,
            expires_in: session.expires_in,
            created_at: session.created_at,
        }
    }
}

/// Generic success response
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
    pub message: String,
}

/// Create the auth router with the request authenticator layered on
pub fn auth_router(state: AppState) -> Router {
    Router::new()
        .route("/auth/login", post(login_handler))
        .route("/auth/logout", post(logout_handler))
        .route("/auth/register", post(register_handler))
        .route("/auth/me", get(me_handler))
        .route("/auth/profile", post(profile_handler))
        .route("/auth/delete-account", post(delete_account_handler))
        .route("/auth/sessions", get(sessions_handler))
        .layer(middleware::from_fn_with_state(state.clone(), authenticate))
        .with_state(state)
}

/// POST /auth/login
async fn login_handler(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AuthError> {
    tracing::info!("login attempt for email: {}", request.email);

    let response = state.auth.login(request).await?;

    Ok(Json(response))
}

/// POST /auth/logout
async fn logout_handler(
    State(state): State<AppState>,
    Json(request): Json<LogoutRequest>,
) -> Result<Json<LogoutResponse>, AuthError> {
    tracing::info!("logout request");

    state.auth.logout(&request.token).await?;

    Ok(Json(LogoutResponse {
        message: "Logged out successfully".to_string(),
    }))
}

/// POST /auth/register
async fn register_handler(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AuthError> {
    tracing::info!("registration attempt for email: {}", request.email);

    let user = state.auth.register(request).await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /auth/me
async fn me_handler(user: Option<Extension<AuthUser>>) -> Result<Json<UserResponse>, AuthError> {
    let Extension(AuthUser(user)) = user.ok_or(AuthError::NotAuthenticated)?;
    Ok(Json(user.into()))
}

/// POST /auth/profile
async fn profile_handler(
    State(state): State<AppState>,
    user: Option<Extension<AuthUser>>,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<UserResponse>, AuthError> {
    let Extension(AuthUser(user)) = user.ok_or(AuthError::NotAuthenticated)?;

    let updated = state.auth.update_profile(user.id, request).await?;

    Ok(Json(updated))
}

/// POST /auth/delete-account
async fn delete_account_handler(
    State(state): State<AppState>,
    user: Option<Extension<AuthUser>>,
) -> Result<Json<SuccessResponse>, AuthError> {
    let Extension(AuthUser(user)) = user.ok_or(AuthError::NotAuthenticated)?;

    state.auth.delete_account(user.id).await?;
    tracing::info!("account deleted: {}", user.email);

    Ok(Json(SuccessResponse {
        success: true,
        message: "Account deleted successfully".to_string(),
    }))
}

/// GET /auth/sessions
async fn sessions_handler(
    State(state): State<AppState>,
    user: Option<Extension<AuthUser>>,
) -> Result<Json<Vec<SessionResponse>>, AuthError> {
    let Extension(AuthUser(user)) = user.ok_or(AuthError::NotAuthenticated)?;

    let sessions = state.auth.sessions_for(user.id).await?;

    Ok(Json(sessions.into_iter().map(Into::into).collect()))
}
