use std::path::PathBuf;
use std::time::Duration;

use shopfront_canva::api::DEFAULT_BASE_URL;
use shopfront_canva::oauth::{OAuthConfig, DEFAULT_AUTHORIZE_URL, DEFAULT_SCOPES};
use shopfront_canva::poll::PollConfig;

/// Path the platform redirects to after the user grants access.
pub const OAUTH_REDIRECT_PATH: &str = "/oauth/redirect";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} has invalid value {value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    pub request_timeout_secs: u64,
    /// Public root of this service; return navigation points here.
    pub backend_url: String,
    /// Where users land after OAuth and return navigation.
    pub frontend_url: String,
    pub canva_api_base_url: String,
    pub oauth: OAuthConfig,
    /// Directory of the file-backed key-value store.
    pub data_dir: PathBuf,
    pub poll_interval_ms: u64,
    pub poll_timeout_secs: u64,
    /// Open editor URLs in the local browser as well as returning them.
    pub open_browser: bool,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                                   |
    /// |------------------------|-------------------------------------------|
    /// | `HOST`                 | `127.0.0.1`                               |
    /// | `PORT`                 | `3001`                                    |
    /// | `CORS_ORIGINS`         | `http://localhost:3000`                   |
    /// | `REQUEST_TIMEOUT_SECS` | `120`                                     |
    /// | `BACKEND_URL`          | `http://127.0.0.1:3001`                   |
    /// | `FRONTEND_URL`         | `http://localhost:3000`                   |
    /// | `CANVA_API_BASE_URL`   | `https://api.canva.com/rest`              |
    /// | `CANVA_AUTHORIZE_URL`  | `https://www.canva.com/api/oauth/authorize` |
    /// | `CANVA_CLIENT_ID`      | empty (OAuth disabled)                    |
    /// | `CANVA_CLIENT_SECRET`  | empty (OAuth disabled)                    |
    /// | `CANVA_SCOPES`         | space-separated default scope list        |
    /// | `DATA_DIR`             | `./data`                                  |
    /// | `POLL_INTERVAL_MS`     | `1000`                                    |
    /// | `POLL_TIMEOUT_SECS`    | `120`                                     |
    /// | `OPEN_BROWSER`         | `false`                                   |
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = var_or("HOST", "127.0.0.1");
        let port = parse_var("PORT", "3001")?;

        let cors_origins: Vec<String> = var_or("CORS_ORIGINS", "http://localhost:3000")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let backend_url = var_or("BACKEND_URL", "http://127.0.0.1:3001")
            .trim_end_matches('/')
            .to_string();
        let canva_api_base_url = var_or("CANVA_API_BASE_URL", DEFAULT_BASE_URL);

        let scopes = std::env::var("CANVA_SCOPES")
            .map(|s| s.split_whitespace().map(str::to_string).collect())
            .unwrap_or_else(|_| DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect());

        let oauth = OAuthConfig {
            client_id: var_or("CANVA_CLIENT_ID", ""),
            client_secret: var_or("CANVA_CLIENT_SECRET", ""),
            authorize_url: var_or("CANVA_AUTHORIZE_URL", DEFAULT_AUTHORIZE_URL),
            api_base_url: canva_api_base_url.clone(),
            redirect_uri: format!("{backend_url}{OAUTH_REDIRECT_PATH}"),
            scopes,
        };

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs: parse_var("REQUEST_TIMEOUT_SECS", "120")?,
            backend_url,
            frontend_url: var_or("FRONTEND_URL", "http://localhost:3000")
                .trim_end_matches('/')
                .to_string(),
            canva_api_base_url,
            oauth,
            data_dir: PathBuf::from(var_or("DATA_DIR", "./data")),
            poll_interval_ms: parse_var("POLL_INTERVAL_MS", "1000")?,
            poll_timeout_secs: parse_var("POLL_TIMEOUT_SECS", "120")?,
            open_browser: parse_var("OPEN_BROWSER", "false")?,
        })
    }

    /// Fixed-interval polling for platform jobs.
    pub fn poll_config(&self) -> PollConfig {
        PollConfig::fixed(
            Duration::from_millis(self.poll_interval_ms),
            Duration::from_secs(self.poll_timeout_secs),
        )
    }
}

fn var_or(var: &str, default: &str) -> String {
    std::env::var(var).unwrap_or_else(|_| default.to_string())
}

fn parse_var<T>(var: &'static str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let value = var_or(var, default);
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        var,
        reason: e.to_string(),
        value,
    })
}
