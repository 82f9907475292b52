//! Authentication service
//!
//! Coordinates credential verification, token issuance, session persistence,
//! and revocation. Stores are reached through the narrow traits in
//! [`crate::store`]; nothing here blocks beyond a single store call.

use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::auth::blacklist::TokenBlacklist;
use crate::auth::token::{TokenError, TokenService};
use crate::store::models::{Session, User, UserResponse};
use crate::store::{IdentityLookup, SessionStore, StoreError, UserStore};

/// Cost factor for bcrypt hashing (12 is recommended for production)
const BCRYPT_COST: u32 = 12;

/// Authentication error types
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("User not found")]
    UserNotFound,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Email already registered")]
    EmailTaken,

    #[error("Invalid email format")]
    InvalidEmail,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token is blacklisted")]
    Revoked,

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => AuthError::UserNotFound,
            StoreError::EmailAlreadyExists => AuthError::EmailTaken,
        }
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => AuthError::TokenExpired,
            TokenError::InvalidToken | TokenError::SubjectMismatch => AuthError::InvalidToken,
            TokenError::EncodingError(_) | TokenError::DecodingError(_) => AuthError::InvalidToken,
        }
    }
}

/// Login request data
#[derive(Debug, Clone, serde::Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Registration request data
#[derive(Debug, Clone, serde::Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

/// Profile update request data
#[derive(Debug, Clone, serde::Deserialize)]
pub struct UpdateProfileRequest {
    pub name: String,
    pub preferred_name: Option<String>,
}

/// Login response: the issued token, its lifetime, and the user's public view
#[derive(Debug, Clone, serde::Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_in: i64,
    pub user: UserResponse,
}

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    sessions: Arc<dyn SessionStore>,
    tokens: Arc<TokenService>,
    blacklist: Arc<TokenBlacklist>,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserStore>,
        sessions: Arc<dyn SessionStore>,
        tokens: Arc<TokenService>,
        blacklist: Arc<TokenBlacklist>,
    ) -> Self {
        Self {
            users,
            sessions,
            tokens,
            blacklist,
        }
    }

    pub fn blacklist(&self) -> &TokenBlacklist {
        &self.blacklist
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Basic email shape check: local@domain.tld
    fn validate_email(email: &str) -> Result<(), AuthError> {
        let Some((local, domain)) = email.split_once('@') else {
            return Err(AuthError::InvalidEmail);
        };

        if local.is_empty() || domain.is_empty() || !domain.contains('.') {
            return Err(AuthError::InvalidEmail);
        }

        if domain.split('.').any(|part| part.is_empty()) || email.matches('@').count() > 1 {
            return Err(AuthError::InvalidEmail);
        }

        Ok(())
    }

    /// Check submitted credentials against the stored password hash
    ///
    /// Blank email or password fails fast before any store access. Read-only:
    /// no side effects on any store.
    pub async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        if email.trim().is_empty() {
            return Err(AuthError::MissingField("email"));
        }
        if password.trim().is_empty() {
            return Err(AuthError::MissingField("password"));
        }

        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let matches = bcrypt::verify(password, &user.password_hash)
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        if !matches {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(user)
    }

    /// Authenticate a user and issue a fresh session
    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, AuthError> {
        let user = self
            .verify_credentials(&request.email, &request.password)
            .await?;

        let token = self.tokens.issue(&user)?;
        let expires_in = self.tokens.expiration_millis();

        self.sessions
            .save(Session::new(token.clone(), expires_in, user.id))
            .await?;

        tracing::info!("user logged in: {}", user.email);

        Ok(LoginResponse {
            token,
            expires_in,
            user: user.into(),
        })
    }

    /// Revoke a token and remove its session
    ///
    /// Revocation happens first: it is the security-critical effect and must
    /// be recorded even if session deletion fails. Only the named session is
    /// removed; the user's other sessions stay valid.
    pub async fn logout(&self, raw_token: &str) -> Result<(), AuthError> {
        let token = raw_token.trim();

        self.blacklist.revoke(token);

        let removed = self.sessions.delete_by_token(token).await?;
        if removed {
            tracing::info!("session removed on logout");
        } else {
            tracing::debug!("logout for unknown token; revocation recorded anyway");
        }

        Ok(())
    }

    /// Register a new user account
    pub async fn register(&self, request: RegisterRequest) -> Result<UserResponse, AuthError> {
        if request.email.trim().is_empty() {
            return Err(AuthError::MissingField("email"));
        }
        if request.password.trim().is_empty() {
            return Err(AuthError::MissingField("password"));
        }
        if request.name.trim().is_empty() {
            return Err(AuthError::MissingField("name"));
        }
        Self::validate_email(&request.email)?;

        if self.users.find_by_email(&request.email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let password_hash = bcrypt::hash(&request.password, BCRYPT_COST)
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        let user = self
            .users
            .create(User::new(request.email, password_hash, request.name))
            .await?;

        tracing::info!("user registered: {}", user.email);

        Ok(user.into())
    }

    /// Resolve a bearer token to its user, verifying the signature first
    ///
    /// Decode (signature + expiry) before trusting the subject, then look the
    /// subject up and run the full per-user validation.
    pub async fn resolve_token(&self, token: &str) -> Result<User, AuthError> {
        let claims = self.tokens.decode(token).map_err(|e| {
            tracing::warn!("token rejected: {e}");
            AuthError::from(e)
        })?;

        let user = self
            .users
            .lookup(&claims.sub)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        self.tokens.validate(token, &user)?;

        Ok(user)
    }

    /// Update a user's display and preferred names
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        request: UpdateProfileRequest,
    ) -> Result<UserResponse, AuthError> {
        if request.name.trim().is_empty() {
            return Err(AuthError::MissingField("name"));
        }

        let mut user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        user.name = request.name;
        user.preferred_name = request.preferred_name;

        let user = self.users.update(user).await?;
        Ok(user.into())
    }

    /// Close an account; the user's sessions go with it
    pub async fn delete_account(&self, user_id: Uuid) -> Result<(), AuthError> {
        if !self.users.delete(user_id).await? {
            return Err(AuthError::UserNotFound);
        }

        let removed = self.sessions.delete_all_for_user(user_id).await?;
        tracing::info!("account deleted, {removed} session(s) removed");

        Ok(())
    }

    /// Enumerate a user's stored sessions
    pub async fn sessions_for(&self, user_id: Uuid) -> Result<Vec<Session>, AuthError> {
        Ok(self.sessions.find_by_user(user_id).await?)
    }

    /// Issue a token carrying additional claims on top of the reserved set
    pub fn issue_with_claims(
        &self,
        user: &User,
        extra: HashMap<String, serde_json::Value>,
    ) -> Result<String, AuthError> {
        Ok(self.tokens.issue_with_claims(user, extra)?)
    }
}
