//! Stream access token issuance and resolution.
//!
//! A token is an opaque UUID v4 bound at mint time to exactly one
//! (lecture, user) pair. The binding lives in the expiring [`KvStore`]; a
//! token past its absolute TTL simply stops resolving, which is the only
//! expiry mechanism. There is no revoke path: a token minted while the user
//! was entitled stays valid for its full lifetime.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use lectern_core::{LectureId, UserId};

use crate::kv::KvStore;

/// Namespace prefix for token keys in the shared store.
pub const TOKEN_KEY_PREFIX: &str = "hls_token:";

/// Record bound to a stream token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamToken {
    pub lecture_id: LectureId,
    pub user_id: UserId,
    pub is_free_preview: bool,
    /// Unix timestamp of issuance.
    pub issued_at: i64,
}

/// Issues and resolves stream access tokens.
#[derive(Clone)]
pub struct StreamTokenStore {
    store: Arc<dyn KvStore>,
    ttl: Duration,
}

impl StreamTokenStore {
    pub fn new(store: Arc<dyn KvStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// Token lifetime in seconds, as reported to clients.
    pub fn ttl_secs(&self) -> u64 {
        self.ttl.as_secs()
    }

    /// Mint a fresh token for a (lecture, user) pair.
    ///
    /// Every call produces a brand-new UUID; bindings are never reused or
    /// updated in place.
    pub fn issue(&self, lecture_id: LectureId, user_id: UserId, is_free_preview: bool) -> String {
        let token = Uuid::new_v4().to_string();
        let record = StreamToken {
            lecture_id,
            user_id,
            is_free_preview,
            issued_at: chrono::Utc::now().timestamp(),
        };

        let value = serde_json::to_string(&record).unwrap_or_default();
        self.store
            .put(&format!("{TOKEN_KEY_PREFIX}{token}"), value, self.ttl);

        tracing::debug!(
            lecture_id = %lecture_id,
            user_id = %user_id,
            ttl_secs = self.ttl.as_secs(),
            "Issued stream token"
        );

        token
    }

    /// Resolve a token back to its binding.
    ///
    /// Unknown, expired, and undeserializable records all return `None`;
    /// callers cannot (and must not) tell these cases apart.
    pub fn resolve(&self, token: &str) -> Option<StreamToken> {
        let raw = self.store.get(&format!("{TOKEN_KEY_PREFIX}{token}"))?;
        serde_json::from_str(&raw).ok()
    }
}
