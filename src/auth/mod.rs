//! Token-based session authentication
//!
//! This module provides the authentication core:
//! - Signed bearer token issuance and validation
//! - Credential verification against bcrypt password hashes
//! - Session persistence and targeted revocation (blacklist)
//! - A per-request authentication gate and REST endpoints

pub mod api;
pub mod blacklist;
pub mod middleware;
pub mod service;
pub mod token;

pub use api::{ApiError, AppState, auth_router};
pub use blacklist::TokenBlacklist;
pub use middleware::{AuthUser, authenticate};
pub use service::{
    AuthError, AuthService, LoginRequest, LoginResponse, RegisterRequest, UpdateProfileRequest,
};
pub use token::{Claims, TokenConfig, TokenError, TokenService};
