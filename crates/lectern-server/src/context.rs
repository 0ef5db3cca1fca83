//! Shared application context.
//!
//! [`AppContext`] is the central struct shared across all route handlers via
//! Axum state. It is cheaply cloneable because it only holds `Arc`s and the
//! pool handle.

use std::sync::Arc;
use std::time::Duration;

use lectern_core::config::Config;
use lectern_db::pool::DbPool;

use crate::access::ContentAccess;
use crate::kv::KvStore;
use crate::tokens::StreamTokenStore;

/// Application context shared by all request handlers (via Axum state).
#[derive(Clone)]
pub struct AppContext {
    /// Database connection pool.
    pub db: DbPool,
    /// Immutable application configuration snapshot.
    pub config: Arc<Config>,
    /// Expiring key-value store backing tokens and the enrollment cache.
    pub kv: Arc<dyn KvStore>,
    /// Stream access token issuer/resolver.
    pub tokens: Arc<StreamTokenStore>,
    /// Entitlement evaluator.
    pub access: Arc<ContentAccess>,
}

impl AppContext {
    /// Wire up the context from its three roots: pool, config, and store.
    pub fn new(db: DbPool, config: Arc<Config>, kv: Arc<dyn KvStore>) -> Self {
        let tokens = Arc::new(StreamTokenStore::new(
            kv.clone(),
            Duration::from_secs(config.streaming.token_ttl_secs),
        ));
        let access = Arc::new(ContentAccess::new(
            db.clone(),
            kv.clone(),
            Duration::from_secs(config.streaming.enrollment_cache_ttl_secs),
        ));

        Self {
            db,
            config,
            kv,
            tokens,
            access,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryKvStore;
    use lectern_db::pool::init_memory_pool;

    #[test]
    fn context_wires_token_ttl_from_config() {
        let db = init_memory_pool().unwrap();
        let mut config = Config::default();
        config.streaming.token_ttl_secs = 123;

        let ctx = AppContext::new(db, Arc::new(config), Arc::new(MemoryKvStore::new()));
        assert_eq!(ctx.tokens.ttl_secs(), 123);
    }
}
