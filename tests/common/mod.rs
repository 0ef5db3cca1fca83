//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`] which creates an in-memory DB, default config,
//! KV store, and full [`AppContext`]. The [`TestHarness::with_server`]
//! constructor starts Axum on a random port for HTTP-level testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use lectern_core::config::Config;
use lectern_core::{ChapterId, CourseId, LectureId, UserId};
use lectern_db::pool::{init_memory_pool, DbPool, PooledConnection};
use lectern_server::context::AppContext;
use lectern_server::kv::MemoryKvStore;
use lectern_server::router::build_router;

/// Well-known user resolved when auth is disabled (seeded by migration V2).
pub const ANONYMOUS_USER: &str = "00000000-0000-0000-0000-000000000000";

/// Test harness wrapping a fully-constructed [`AppContext`] backed by an
/// in-memory database.
pub struct TestHarness {
    pub ctx: AppContext,
    pub db: DbPool,
}

impl TestHarness {
    /// Create a new harness with default configuration and in-memory DB.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create a new harness with a custom configuration and in-memory DB.
    pub fn with_config(config: Config) -> Self {
        let db = init_memory_pool().expect("failed to create in-memory pool");
        let ctx = AppContext::new(db.clone(), Arc::new(config), Arc::new(MemoryKvStore::new()));
        Self { ctx, db }
    }

    /// Start an Axum server on a random port and return the harness together
    /// with the bound socket address.
    pub async fn with_server() -> (Self, SocketAddr) {
        Self::with_server_config(Config::default()).await
    }

    /// Start an Axum server with custom config on a random port.
    ///
    /// The listener is bound before the context is built so the config's
    /// `public_url` can point at the real address; absolute URLs in
    /// responses (manifest URLs, rewritten playlists) are then directly
    /// fetchable by the test client.
    pub async fn with_server_config(mut config: Config) -> (Self, SocketAddr) {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind random port");
        let addr = listener.local_addr().expect("failed to get local addr");

        if config.server.public_url.is_none() {
            config.server.public_url = Some(format!("http://{addr}"));
        }

        let harness = Self::with_config(config);
        let app = build_router(harness.ctx.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        (harness, addr)
    }

    /// Borrow a pooled connection.
    pub fn conn(&self) -> PooledConnection {
        self.db.get().expect("failed to get connection")
    }
}

/// The user ID every request resolves to while auth is disabled.
pub fn anonymous_user_id() -> UserId {
    ANONYMOUS_USER.parse().expect("static anonymous UUID")
}

/// Create a course with one chapter.
pub fn seed_catalog(conn: &PooledConnection, price_cents: i64) -> (CourseId, ChapterId) {
    let course =
        lectern_db::queries::courses::create_course(conn, "Test Course", price_cents).unwrap();
    let chapter =
        lectern_db::queries::courses::create_chapter(conn, course.id, "Chapter 1", 1).unwrap();
    (course.id, chapter.id)
}

/// Bytes written into the fixture segment file.
pub const SEGMENT_BYTES: &[u8] = b"\x47fake-transport-stream-payload";

/// Write a small two-level artifact set (master -> variant -> segment) for a
/// lecture under `hls_root`.
pub fn write_hls_artifacts(hls_root: &Path, lecture_id: LectureId) {
    let dir = hls_root.join(lecture_id.to_string());
    std::fs::create_dir_all(&dir).unwrap();

    std::fs::write(
        dir.join("master.m3u8"),
        "#EXTM3U\n\
         #EXT-X-STREAM-INF:BANDWIDTH=800000,RESOLUTION=640x360\n\
         360p.m3u8\n",
    )
    .unwrap();

    std::fs::write(
        dir.join("360p.m3u8"),
        "#EXTM3U\n\
         #EXT-X-TARGETDURATION:6\n\
         #EXTINF:6.0,\n\
         segment_000.ts\n\
         #EXT-X-ENDLIST\n",
    )
    .unwrap();

    std::fs::write(dir.join("segment_000.ts"), SEGMENT_BYTES).unwrap();
}

/// Pull the stream token out of a manifest URL of the form
/// `{base}/api/hls/{token}/master.m3u8`.
pub fn token_from_manifest_url(manifest_url: &str) -> String {
    manifest_url
        .split("/api/hls/")
        .nth(1)
        .and_then(|rest| rest.split('/').next())
        .expect("manifest URL should contain a token")
        .to_string()
}
