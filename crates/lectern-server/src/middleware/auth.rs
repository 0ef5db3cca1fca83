//! Authentication middleware.
//!
//! Resolves a session token (Authorization bearer, session cookie, or the
//! configured API key) to a [`UserId`] and injects it into request
//! extensions for downstream handlers. When auth is disabled, every request
//! resolves to the well-known anonymous user so the progress and streaming
//! handlers still have an identity to key on.

use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};

use lectern_core::config::AuthConfig;
use lectern_core::UserId;
use lectern_db::pool::DbPool;

use crate::context::AppContext;
use crate::error::AppError;

/// Cookie name for browser sessions.
pub const SESSION_COOKIE: &str = "lectern_session";

/// Well-known user ID for unauthenticated requests (auth disabled).
/// Seeded into the users table by migration V2.
const ANONYMOUS_USER_ID: &str = "00000000-0000-0000-0000-000000000000";

/// Resolve a user from raw HTTP header values.
///
/// Token resolution order:
/// 1. `Authorization: Bearer <token>` (API / web clients)
/// 2. Cookie: `lectern_session=<token>` (web browser)
///
/// Returns `Some(UserId)` on success, `None` on failure.
pub fn resolve_user(
    auth_config: &AuthConfig,
    db: &DbPool,
    authorization: Option<&str>,
    cookie: Option<&str>,
) -> Option<UserId> {
    if !auth_config.enabled {
        return Some(
            ANONYMOUS_USER_ID
                .parse()
                .expect("static anonymous UUID is valid"),
        );
    }

    if let Some(auth_value) = authorization {
        if let Some(token) = auth_value.strip_prefix("Bearer ") {
            if let Some(uid) = validate_token(auth_config, db, token) {
                return Some(uid);
            }
        }
    }

    if let Some(cookies_str) = cookie {
        for part in cookies_str.split(';') {
            let part = part.trim();
            if let Some(value) = part.strip_prefix(&format!("{SESSION_COOKIE}=")) {
                if let Some(uid) = validate_token(auth_config, db, value) {
                    return Some(uid);
                }
            }
        }
    }

    None
}

/// Validate a single token against the config API key and stored sessions.
fn validate_token(auth_config: &AuthConfig, db: &DbPool, token: &str) -> Option<UserId> {
    if let Some(ref api_key) = auth_config.api_key {
        if token == api_key {
            return Some(
                ANONYMOUS_USER_ID
                    .parse()
                    .expect("static anonymous UUID is valid"),
            );
        }
    }

    let conn = lectern_db::pool::get_conn(db).ok()?;
    let session = lectern_db::queries::auth::get_token(&conn, token).ok()??;

    // A session past its expiry is as good as absent. The periodic sweep
    // deletes the row eventually; correctness does not depend on it.
    let expires = DateTime::parse_from_rfc3339(&session.expires_at).ok()?;
    if expires <= Utc::now() {
        return None;
    }

    Some(session.user_id)
}

/// Authentication middleware. Applied to protected routes only.
///
/// On success, inserts the resolved [`UserId`] into request extensions.
pub async fn auth_middleware(
    State(ctx): State<AppContext>,
    mut request: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let authorization = request
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_owned());

    let cookie = request
        .headers()
        .get(axum::http::header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_owned());

    match resolve_user(
        &ctx.config.auth,
        &ctx.db,
        authorization.as_deref(),
        cookie.as_deref(),
    ) {
        Some(user_id) => {
            request.extensions_mut().insert(user_id);
            Ok(next.run(request).await)
        }
        None => Err(AppError::new(lectern_core::Error::Unauthorized(
            "Authentication required".into(),
        ))
        .into_response()),
    }
}
