//! Revocation store for tokens invalidated before their natural expiry
//!
//! Append-only set keyed by the raw token string. Entries are never purged:
//! tokens self-expire, so the set is bounded by token lifetime times logout
//! volume.

use dashmap::DashSet;

/// Denylist of tokens rejected regardless of cryptographic validity
///
/// Safe for concurrent revoke/check across request tasks; a revocation is
/// visible to every check that starts after `revoke` returns.
#[derive(Debug, Default)]
pub struct TokenBlacklist {
    revoked: DashSet<String>,
}

impl TokenBlacklist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a token permanently unusable; revoking twice is a no-op
    pub fn revoke(&self, token: &str) {
        self.revoked.insert(token.to_string());
    }

    pub fn is_revoked(&self, token: &str) -> bool {
        self.revoked.contains(token)
    }

    pub fn len(&self) -> usize {
        self.revoked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.revoked.is_empty()
    }
}
