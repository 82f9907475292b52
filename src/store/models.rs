//! Domain models for identities and sessions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user account (authenticable principal)
///
/// The email is the login key and must be unique across the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: String,
    pub preferred_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with a pre-hashed password
    pub fn new(
        email: impl Into<String>,
        password_hash: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.into(),
            password_hash: password_hash.into(),
            name: name.into(),
            preferred_name: None,
            created_at: Utc::now(),
        }
    }
}

/// Public view of a user (no password hash)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub preferred_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            preferred_name: user.preferred_name,
            created_at: user.created_at,
        }
    }
}

/// Server-side record of one issued token
///
/// A user may hold many sessions, but a token value maps to at most one
/// session and is never shared across users.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub token: String,
    /// Configured token lifetime at issue time, in milliseconds
    pub expires_in: i64,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(token: impl Into<String>, expires_in: i64, user_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            token: token.into(),
            expires_in,
            user_id,
            created_at: Utc::now(),
        }
    }
}
