//! Authentication route handlers: login, logout, status.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use chrono::{Duration, Utc};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use lectern_core::Error;
use lectern_db::pool;
use lectern_db::queries::{auth, users};

use crate::context::AppContext;
use crate::envelope::Envelope;
use crate::error::AppError;
use crate::middleware::auth::{resolve_user, SESSION_COOKIE};

/// Login request payload.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// POST /api/auth/login
pub async fn login(
    State(ctx): State<AppContext>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<Envelope>, AppError> {
    if !ctx.config.auth.enabled {
        return Ok(Json(Envelope::message("Authentication is disabled")));
    }

    let conn = pool::get_conn(&ctx.db)?;

    let user = users::get_user_by_username(&conn, &payload.username)?
        .ok_or_else(|| Error::Unauthorized("Invalid credentials".into()))?;

    let password_valid = user.password_hash.starts_with("$2")
        && bcrypt::verify(&payload.password, &user.password_hash).unwrap_or(false);
    if !password_valid {
        return Err(Error::Unauthorized("Invalid credentials".into()).into());
    }

    let token = Uuid::new_v4().to_string();
    let expires =
        Utc::now() + Duration::hours(ctx.config.auth.session_timeout_hours as i64);
    auth::create_token(&conn, user.id, &token, &expires.to_rfc3339())?;

    tracing::info!(user_id = %user.id, "Login successful");

    Ok(Json(Envelope::ok(
        "Login successful",
        json!({
            "token": token,
            "expires_at": expires.to_rfc3339(),
        }),
    )))
}

/// POST /api/auth/logout
///
/// Deletes the presented session token. Stream access tokens already in
/// flight are deliberately left to expire on their own.
pub async fn logout(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
) -> Result<Json<Envelope>, AppError> {
    if let Some(token) = extract_session_token(&headers) {
        if let Ok(conn) = pool::get_conn(&ctx.db) {
            let _ = auth::delete_token(&conn, &token);
        }
    }

    Ok(Json(Envelope::message("Logged out")))
}

/// GET /api/auth/status
pub async fn auth_status(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
) -> Json<Envelope> {
    let authorization = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    let cookie = headers
        .get(axum::http::header::COOKIE)
        .and_then(|v| v.to_str().ok());

    let user_id = resolve_user(&ctx.config.auth, &ctx.db, authorization, cookie);

    Json(Envelope::ok(
        "OK",
        json!({
            "auth_enabled": ctx.config.auth.enabled,
            "authenticated": user_id.is_some(),
            "user_id": user_id.map(|u| u.to_string()),
        }),
    ))
}

/// Pull the session token out of the Authorization header or cookie.
fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(auth_value) = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
    {
        if let Some(token) = auth_value.strip_prefix("Bearer ") {
            return Some(token.to_string());
        }
    }

    let cookies = headers
        .get(axum::http::header::COOKIE)
        .and_then(|v| v.to_str().ok())?;
    for part in cookies.split(';') {
        let part = part.trim();
        if let Some(value) = part.strip_prefix(&format!("{SESSION_COOKIE}=")) {
            return Some(value.to_string());
        }
    }
    None
}
