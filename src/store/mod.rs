//! Identity and session stores
//!
//! The auth core treats persistence as an external collaborator behind two
//! narrow traits. The in-process implementations in [`memory`] back the
//! binary and the test suite; a host can substitute its own stores.

pub mod memory;
pub mod models;

use async_trait::async_trait;
use uuid::Uuid;

pub use memory::{InMemorySessionStore, InMemoryUserStore};
pub use models::{Session, User, UserResponse};

/// Store error types
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Record not found")]
    NotFound,

    #[error("Email already exists")]
    EmailAlreadyExists,
}

/// User persistence operations
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user; fails if the email is already taken
    async fn create(&self, user: User) -> Result<User, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Replace an existing user record, keyed by id
    async fn update(&self, user: User) -> Result<User, StoreError>;

    /// Remove a user; returns whether a record was deleted
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}

/// The single-method lookup capability the request authenticator needs
///
/// Every [`UserStore`] provides it; the authenticator depends on nothing more.
#[async_trait]
pub trait IdentityLookup: Send + Sync {
    async fn lookup(&self, email: &str) -> Result<Option<User>, StoreError>;
}

#[async_trait]
impl<T: UserStore + ?Sized> IdentityLookup for T {
    async fn lookup(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.find_by_email(email).await
    }
}

/// Session persistence operations
///
/// A token value maps to at most one stored session.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Create or update a session, keyed by its token
    async fn save(&self, session: Session) -> Result<Session, StoreError>;

    async fn find_by_token(&self, token: &str) -> Result<Option<Session>, StoreError>;

    /// All sessions owned by a user, newest first
    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Session>, StoreError>;

    /// Remove the session holding this token; returns whether one existed
    async fn delete_by_token(&self, token: &str) -> Result<bool, StoreError>;

    /// Remove every session owned by a user; returns how many were removed
    async fn delete_all_for_user(&self, user_id: Uuid) -> Result<u64, StoreError>;
}
