//! Client settings.
//!
//! Read from `$HOME/.config/mailcast/config.toml`:
//!
//! ```toml
//! api_token = "..."
//! host = "production"            # or "development", or { custom = "http://localhost:3000" }
//! transport = "socket"           # or "reqwest"
//! ```
//!
//! `MAILCAST_API_TOKEN` and `MAILCAST_BASE_URL` override the file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::endpoint::Endpoint;
use crate::error::ConfigError;

pub const PRODUCTION_URL: &str = "https://api.funnelerapp.com";
pub const DEVELOPMENT_URL: &str = "http://api.lvh.me:3002";

pub const TOKEN_ENV: &str = "MAILCAST_API_TOKEN";
pub const BASE_URL_ENV: &str = "MAILCAST_BASE_URL";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Host {
    #[default]
    Production,
    Development,
    Custom(String),
}

impl Host {
    pub fn base_url(&self) -> &str {
        match self {
            Host::Production => PRODUCTION_URL,
            Host::Development => DEVELOPMENT_URL,
            Host::Custom(url) => url,
        }
    }
}

/// Which [`Transport`](crate::Transport) strategy the front end constructs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    #[default]
    Socket,
    Reqwest,
}

#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api_token: String,
    pub host:      Host,
    pub transport: TransportKind,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("api_token", &if self.api_token.is_empty() { "" } else { "<redacted>" })
            .field("host", &self.host)
            .field("transport", &self.transport)
            .finish()
    }
}

impl Settings {
    pub fn default_path() -> Option<PathBuf> {
        home::home_dir().map(|home| home.join(".config").join("mailcast").join("config.toml"))
    }

    /// Loads `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, ConfigError> { Ok(toml::from_str(text)?) }

    pub fn with_env(self) -> Self {
        self.with_overrides(std::env::var(TOKEN_ENV).ok(), std::env::var(BASE_URL_ENV).ok())
    }

    /// Non-empty values replace the token and the host.
    pub fn with_overrides(mut self, token: Option<String>, base_url: Option<String>) -> Self {
        if let Some(token) = token.filter(|t| !t.is_empty()) {
            self.api_token = token;
        }
        if let Some(url) = base_url.filter(|u| !u.is_empty()) {
            self.host = Host::Custom(url);
        }
        self
    }

    /// Checks the token and base URL before any request is made.
    pub fn endpoint(&self) -> Result<Endpoint, ConfigError> {
        if self.api_token.trim().is_empty() {
            return Err(ConfigError::MissingToken);
        }
        let base_url = self.host.base_url();
        url::Url::parse(base_url).map_err(|source| ConfigError::InvalidBaseUrl {
            url: base_url.to_string(),
            source,
        })?;
        Ok(Endpoint::new(base_url, self.api_token.trim()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_file() {
        let settings = Settings::parse(
            r#"
api_token = "abc"
host = { custom = "http://localhost:3000/" }
transport = "reqwest"
"#,
        )
        .unwrap();

        assert_eq!(settings.api_token, "abc");
        assert_eq!(settings.host, Host::Custom("http://localhost:3000/".into()));
        assert_eq!(settings.transport, TransportKind::Reqwest);
        assert_eq!(settings.endpoint().unwrap().url("x"), "http://localhost:3000/x");
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::parse("host = \"development\"").unwrap();
        assert_eq!(settings.host.base_url(), DEVELOPMENT_URL);
        assert_eq!(settings.transport, TransportKind::Socket);
        assert!(matches!(settings.endpoint(), Err(ConfigError::MissingToken)));
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.host.base_url(), PRODUCTION_URL);
    }

    #[test]
    fn test_load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "api_token = \"from-file\"\n").unwrap();

        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.api_token, "from-file");
    }

    #[test]
    fn test_overrides() {
        let settings = Settings::default()
            .with_overrides(Some("env-token".into()), Some("http://127.0.0.1:9".into()))
            .with_overrides(Some(String::new()), None);

        assert_eq!(settings.api_token, "env-token");
        assert_eq!(settings.host, Host::Custom("http://127.0.0.1:9".into()));
    }

    #[test]
    fn test_invalid_base_url() {
        let settings = Settings {
            api_token: "t".into(),
            host:      Host::Custom("not a url".into()),
            transport: TransportKind::Socket,
        };
        assert!(matches!(settings.endpoint(), Err(ConfigError::InvalidBaseUrl { .. })));
    }

    #[test]
    fn test_rejects_unknown_transport() {
        assert!(matches!(Settings::parse("transport = \"carrier-pigeon\""), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_debug_redacts_token() {
        let settings = Settings::default().with_overrides(Some("secret".into()), None);
        assert!(!format!("{settings:?}").contains("secret"));
    }
}
