//! Key-value settings store, used for runtime feature flags.

use rusqlite::Connection;

use lectern_core::{Error, Result};

/// Read a setting value by key.
pub fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
    let result = conn.query_row("SELECT value FROM settings WHERE key = ?1", [key], |row| {
        row.get(0)
    });
    match result {
        Ok(v) => Ok(Some(v)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

/// Insert or replace a setting value.
pub fn set_setting(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO settings (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        [key, value],
    )
    .map_err(|e| Error::database(e.to_string()))?;
    Ok(())
}

/// Read a boolean flag, falling back to `default` when the key is absent or
/// holds an unrecognized value.
pub fn get_flag(conn: &Connection, key: &str, default: bool) -> Result<bool> {
    Ok(match get_setting(conn, key)?.as_deref() {
        Some("true") | Some("1") => true,
        Some("false") | Some("0") => false,
        _ => default,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::init_memory_pool;

    #[test]
    fn set_and_get() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        set_setting(&conn, "theme", "dark").unwrap();
        assert_eq!(get_setting(&conn, "theme").unwrap().as_deref(), Some("dark"));

        set_setting(&conn, "theme", "light").unwrap();
        assert_eq!(
            get_setting(&conn, "theme").unwrap().as_deref(),
            Some("light")
        );
    }

    #[test]
    fn flag_defaults() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        assert!(get_flag(&conn, "missing_flag", true).unwrap());
        assert!(!get_flag(&conn, "missing_flag", false).unwrap());
    }

    #[test]
    fn flag_parses_truthy_and_falsy() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        set_setting(&conn, "a", "true").unwrap();
        set_setting(&conn, "b", "0").unwrap();
        set_setting(&conn, "c", "banana").unwrap();

        assert!(get_flag(&conn, "a", false).unwrap());
        assert!(!get_flag(&conn, "b", true).unwrap());
        // Unrecognized values fall back to the supplied default.
        assert!(get_flag(&conn, "c", true).unwrap());
        assert!(!get_flag(&conn, "c", false).unwrap());
    }

    #[test]
    fn seeded_enforcement_flag_is_on() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        assert!(get_flag(&conn, "video_progress_enforcement", false).unwrap());
    }
}
