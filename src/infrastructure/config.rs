use std::env;
use std::path::PathBuf;

use crate::domain::ApiError;
use crate::domain::pagination::DEFAULT_PAGE_SIZE;
use crate::domain::permissions::OWNER_ROLE;

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the REST API, e.g. `http://localhost:3000/api/v1`
    pub api_url: String,
    pub session_file: PathBuf,
    pub timeout_secs: u64,
    pub page_size: u64,
    pub owner_role: String,
}

impl Config {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            session_file: default_session_file(),
            timeout_secs: 15,
            page_size: DEFAULT_PAGE_SIZE,
            owner_role: OWNER_ROLE.to_string(),
        }
    }

    pub fn from_env() -> Result<Self, ApiError> {
        let api_url = env::var("API_URL")
            .ok()
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                ApiError::Config("API_URL no está definida (archivo .env o entorno)".to_string())
            })?;

        let mut config = Self::new(api_url);

        if let Ok(path) = env::var("SESSION_FILE") {
            config.session_file = PathBuf::from(path);
        }
        config.timeout_secs = env::var("HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(config.timeout_secs);
        config.page_size = env::var("PAGE_SIZE")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|v: &u64| *v > 0)
            .unwrap_or(config.page_size);
        if let Ok(role) = env::var("OWNER_ROLE") {
            if !role.trim().is_empty() {
                config.owner_role = role.trim().to_string();
            }
        }

        Ok(config)
    }
}

/// `~/.cache/backoffice/session.json` on Linux, the platform cache dir elsewhere.
fn default_session_file() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(env::temp_dir)
        .join("backoffice")
        .join("session.json")
}
