//! Axum router construction.
//!
//! Builds the application router with all route groups and middleware
//! layers. The playlist/segment endpoints sit outside the auth layer on
//! purpose: the stream token in the path is their credential, and native
//! HLS players cannot attach session headers to segment fetches.

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::context::AppContext;
use crate::middleware::auth::auth_middleware;
use crate::middleware::request_id::request_id_middleware;
use crate::routes;

/// Build the complete Axum router.
pub fn build_router(ctx: AppContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Auth routes -- always accessible.
    let auth_routes = Router::new()
        .route("/auth/login", post(routes::auth::login))
        .route("/auth/logout", post(routes::auth::logout))
        .route("/auth/status", get(routes::auth::auth_status));

    // Protected routes require a resolved user identity.
    let protected_routes = Router::new()
        .route("/stream/{lecture_id}", get(routes::stream::start_stream))
        .route(
            "/stream/{lecture_id}/direct",
            get(routes::stream::direct_stream),
        )
        .route(
            "/lectures/{lecture_id}/progress",
            get(routes::progress::get_progress).post(routes::progress::report_progress),
        )
        .layer(middleware::from_fn_with_state(ctx.clone(), auth_middleware));

    // Token-gated streaming routes; origin and token checks happen in the
    // handlers themselves. The CORS layer stays off these routes -- the
    // handlers emit their own per-request Access-Control-Allow-Origin echo,
    // and a second header value from the layer would break players.
    let hls_routes = Router::new()
        .route("/hls/{token}", get(routes::hls::serve_master))
        .route("/hls/{token}/{*path}", get(routes::hls::serve_file));

    let api = auth_routes
        .merge(protected_routes)
        .layer(cors)
        .merge(hls_routes);

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/api", api)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryKvStore;
    use lectern_core::config::Config;
    use lectern_db::pool::init_memory_pool;
    use std::sync::Arc;

    #[test]
    fn router_builds() {
        let db = init_memory_pool().unwrap();
        let ctx = AppContext::new(
            db,
            Arc::new(Config::default()),
            Arc::new(MemoryKvStore::new()),
        );
        let _router = build_router(ctx);
    }
}
