//! Application configuration types.
//!
//! The top-level [`Config`] struct is deserialized from JSON and carries the
//! sub-configs for server, auth, and streaming. Every section defaults
//! sensibly so a completely empty `{}` file is valid.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::Error;

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub streaming: StreamingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            auth: AuthConfig::default(),
            streaming: StreamingConfig::default(),
        }
    }
}

impl Config {
    /// Deserialize a `Config` from a JSON string.
    pub fn from_json(json_str: &str) -> Result<Self> {
        serde_json::from_str(json_str)
            .map_err(|e| Error::Validation(format!("config parse error: {e}")))
    }

    /// Load configuration from a file path, falling back to defaults if the
    /// path is `None` or the file does not exist.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_json(&contents).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse config file {}: {e}", path.display());
                Self::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No config file at {}; using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                tracing::warn!("Failed to read config file {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Return a list of validation warnings (non-fatal issues).
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.server.port == 0 {
            warnings.push("server.port is 0; a random port will be assigned".into());
        }

        if self.auth.enabled && self.auth.api_key.is_none() {
            warnings.push(
                "auth is enabled with no api_key; only database users can log in".into(),
            );
        }

        if self.streaming.token_ttl_secs == 0 {
            warnings.push("streaming.token_ttl_secs is 0; every token expires instantly".into());
        }

        if self.streaming.allowed_origins.is_empty() {
            warnings.push(
                "streaming.allowed_origins is empty; all playlist/segment requests will be rejected"
                    .into(),
            );
        }

        if !self.streaming.hls_root.exists() {
            warnings.push(format!(
                "streaming.hls_root {} does not exist",
                self.streaming.hls_root.display()
            ));
        }

        warnings
    }

    /// Absolute base URL clients can reach this server under, without a
    /// trailing slash. Used to build manifest and fallback URLs.
    pub fn public_base_url(&self) -> String {
        match &self.server.public_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("http://{}:{}", self.server.host, self.server.port),
        }
    }
}

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Path to the SQLite database file.
    pub db_path: PathBuf,
    /// Externally visible base URL (scheme://host[:port]). Falls back to
    /// `http://{host}:{port}` when unset.
    pub public_url: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            db_path: PathBuf::from("lectern.db"),
            public_url: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

/// Authentication settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Enable authentication. When disabled, every request resolves to the
    /// well-known anonymous user.
    pub enabled: bool,
    /// API key for programmatic access (Authorization: Bearer header).
    pub api_key: Option<String>,
    /// Session token lifetime in hours.
    pub session_timeout_hours: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: None,
            session_timeout_hours: 24,
        }
    }
}

// ---------------------------------------------------------------------------
// Streaming
// ---------------------------------------------------------------------------

/// Token-gated HLS streaming settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamingConfig {
    /// Root directory holding one artifact directory per lecture.
    pub hls_root: PathBuf,
    /// Absolute lifetime of a stream access token in seconds.
    pub token_ttl_secs: u64,
    /// Lifetime of a memoized entitlement lookup in seconds.
    pub enrollment_cache_ttl_secs: u64,
    /// Origins allowed to fetch playlists and segments. `"*"` disables the
    /// origin check entirely.
    pub allowed_origins: Vec<String>,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            hls_root: PathBuf::from("hls"),
            token_ttl_secs: 1800,
            enrollment_cache_ttl_secs: 300,
            allowed_origins: vec!["*".to_string()],
        }
    }
}
