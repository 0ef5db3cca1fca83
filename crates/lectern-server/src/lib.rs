//! lectern-server: HTTP API server for token-gated HLS streaming.
//!
//! This crate ties the other lectern crates into a running server. It
//! provides:
//!
//! - Axum-based HTTP API with session authentication and request IDs
//! - Stream initiation with entitlement and sequential-progress gating
//! - Short-lived capability tokens resolving to playlist/segment serving
//! - Graceful shutdown via signal handling

pub mod access;
pub mod context;
pub mod envelope;
pub mod error;
pub mod flags;
pub mod kv;
pub mod manifest;
pub mod middleware;
pub mod origin;
pub mod progress_gate;
pub mod router;
pub mod routes;
pub mod tokens;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use lectern_core::config::Config;
use lectern_db::pool;

use crate::context::AppContext;
use crate::kv::MemoryKvStore;

/// Start the lectern server.
///
/// Initializes the database, constructs the [`AppContext`], spawns the
/// cache-cleanup and session-sweep tasks, and serves HTTP until a shutdown
/// signal is received.
pub async fn start(config: Config) -> lectern_core::Result<()> {
    for warning in config.validate() {
        tracing::warn!("Config warning: {warning}");
    }

    // Initialize database.
    let db_path = &config.server.db_path;
    let existed = db_path.exists();
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
            tracing::info!("Created database directory {}", parent.display());
        }
    }
    let db_str = db_path.to_string_lossy();
    let db = pool::init_pool(&db_str)?;
    if existed {
        tracing::info!("Database opened (existing) at {db_str}");
    } else {
        tracing::info!("Database created (new) at {db_str}");
    }

    // Shared expiring key-value store for stream tokens and the enrollment
    // cache, with periodic purge of expired entries.
    let kv = Arc::new(MemoryKvStore::new());
    kv::start_cleanup_task(kv.clone(), 60);

    // Periodic sweep of expired session tokens.
    let sweeper_db = db.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(900));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            let Ok(conn) = pool::get_conn(&sweeper_db) else {
                continue;
            };
            let now = chrono::Utc::now().to_rfc3339();
            match lectern_db::queries::auth::delete_expired_tokens(&conn, &now) {
                Ok(n) if n > 0 => tracing::debug!(removed = n, "Purged expired session tokens"),
                Ok(_) => {}
                Err(e) => tracing::warn!("Session token sweep failed: {e}"),
            }
        }
    });

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| lectern_core::Error::Internal(format!("Invalid server address: {e}")))?;

    let ctx = AppContext::new(db, Arc::new(config), kv);
    let app = router::build_router(ctx);

    tracing::info!("Starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| lectern_core::Error::Internal(format!("Failed to bind to {addr}: {e}")))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| lectern_core::Error::Internal(format!("Server error: {e}")))?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                tracing::error!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    tracing::info!("Shutdown signal received");
}
