//! In-process store implementations backed by concurrent maps
//!
//! Safe for concurrent use from independent request tasks; each operation is
//! atomic at the granularity of a single save/delete call.

use async_trait::async_trait;
use dashmap::{DashMap, Entry};
use uuid::Uuid;

use crate::store::models::{Session, User};
use crate::store::{SessionStore, StoreError, UserStore};

/// In-memory user store with a unique-email index
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: DashMap<Uuid, User>,
    emails: DashMap<String, Uuid>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn create(&self, user: User) -> Result<User, StoreError> {
        // Claim the email slot first so two concurrent creates cannot both win
        match self.emails.entry(user.email.clone()) {
            Entry::Occupied(_) => Err(StoreError::EmailAlreadyExists),
            Entry::Vacant(slot) => {
                slot.insert(user.id);
                self.users.insert(user.id, user.clone());
                Ok(user)
            }
        }
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.users.get(&id).map(|entry| entry.clone()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let Some(id) = self.emails.get(email).map(|entry| *entry) else {
            return Ok(None);
        };
        Ok(self.users.get(&id).map(|entry| entry.clone()))
    }

    async fn update(&self, user: User) -> Result<User, StoreError> {
        let existing = self
            .users
            .get(&user.id)
            .map(|entry| entry.clone())
            .ok_or(StoreError::NotFound)?;

        if existing.email != user.email {
            // Claim the new email atomically, same as create
            match self.emails.entry(user.email.clone()) {
                Entry::Occupied(_) => return Err(StoreError::EmailAlreadyExists),
                Entry::Vacant(slot) => {
                    slot.insert(user.id);
                }
            }
            self.emails.remove(&existing.email);
        }

        self.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        match self.users.remove(&id) {
            Some((_, user)) => {
                self.emails.remove(&user.email);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// In-memory session store keyed by token value
///
/// Keying by token enforces "at most one session per token" structurally.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: DashMap<String, Session>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn save(&self, session: Session) -> Result<Session, StoreError> {
        self.sessions.insert(session.token.clone(), session.clone());
        Ok(session)
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<Session>, StoreError> {
        Ok(self.sessions.get(token).map(|entry| entry.clone()))
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Session>, StoreError> {
        let mut sessions: Vec<Session> = self
            .sessions
            .iter()
            .filter(|entry| entry.user_id == user_id)
            .map(|entry| entry.clone())
            .collect();
        sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(sessions)
    }

    async fn delete_by_token(&self, token: &str) -> Result<bool, StoreError> {
        Ok(self.sessions.remove(token).is_some())
    }

    async fn delete_all_for_user(&self, user_id: Uuid) -> Result<u64, StoreError> {
        let mut removed = 0u64;
        self.sessions.retain(|_, session| {
            if session.user_id == user_id {
                removed += 1;
                false
            } else {
                true
            }
        });
        Ok(removed)
    }
}
