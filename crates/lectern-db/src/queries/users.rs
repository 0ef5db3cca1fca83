//! User account operations.

use chrono::Utc;
use rusqlite::Connection;

use lectern_core::{Error, Result, UserId};

use crate::models::User;

const COLS: &str = "id, username, password_hash, role, created_at";

/// Create a new user with an already-hashed password.
pub fn create_user(
    conn: &Connection,
    username: &str,
    password_hash: &str,
    role: &str,
) -> Result<User> {
    let id = UserId::new();
    let now = Utc::now().to_rfc3339();

    conn.execute(
        "INSERT INTO users (id, username, password_hash, role, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![id.to_string(), username, password_hash, role, &now],
    )
    .map_err(|e| match e {
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            Error::Conflict(format!("username '{username}' already exists"))
        }
        other => Error::database(other.to_string()),
    })?;

    Ok(User {
        id,
        username: username.to_string(),
        password_hash: password_hash.to_string(),
        role: role.to_string(),
        created_at: now,
    })
}

/// Look up a user by username.
pub fn get_user_by_username(conn: &Connection, username: &str) -> Result<Option<User>> {
    let q = format!("SELECT {COLS} FROM users WHERE username = ?1");
    let result = conn.query_row(&q, [username], User::from_row);
    match result {
        Ok(u) => Ok(Some(u)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

/// Look up a user by ID.
pub fn get_user(conn: &Connection, user_id: UserId) -> Result<Option<User>> {
    let q = format!("SELECT {COLS} FROM users WHERE id = ?1");
    let result = conn.query_row(&q, [user_id.to_string()], User::from_row);
    match result {
        Ok(u) => Ok(Some(u)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}
