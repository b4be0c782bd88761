use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{debug, info};
use serde::Deserialize;

use crate::errors::WikiError;

/// A known user as declared in configuration.
///
/// Either `password` (hashed at startup) or `password_hash` (an Argon2 PHC
/// string) must be present.
#[derive(Debug, Clone, Deserialize)]
pub struct UserConfig {
    pub username: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub password_hash: Option<String>,
    #[serde(default)]
    pub groups: Vec<String>,
}

impl UserConfig {
    fn with_password(username: &str, password: &str, groups: &[&str]) -> Self {
        Self {
            username: username.to_string(),
            password: Some(password.to_string()),
            password_hash: None,
            groups: groups.iter().map(|g| g.to_string()).collect(),
        }
    }
}

/// Application configuration and constants
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub max_connections: u32,
    /// Secret for the authentication ticket cookie.
    pub auth_secret: String,
    /// Secret for the session cookie.
    pub session_secret: String,
    /// Ticket lifetime in seconds; `None` keeps tickets valid until logout.
    pub auth_timeout_secs: Option<u64>,
    pub session_timeout_secs: Option<u64>,
    /// Directory searched for `base.html`; the inline shell is used when absent.
    pub template_dir: PathBuf,
    pub users: Vec<UserConfig>,
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 6543,
            database_url: "sqlite://tutorial.sqlite?mode=rwc".to_string(),
            max_connections: 8,
            auth_secret: "tutorial-secret".to_string(),
            session_secret: "itsaseekreet".to_string(),
            auth_timeout_secs: Some(24 * 60 * 60),
            session_timeout_secs: Some(20 * 60),
            template_dir: PathBuf::from("static/html"),
            users: vec![
                UserConfig::with_password("editor", "editor", &["group:editors"]),
                UserConfig::with_password("viewer", "viewer", &[]),
            ],
        }
    }

    /// Load configuration from a JSON file; missing keys fall back to defaults
    pub fn from_file(path: &Path) -> Result<Self, WikiError> {
        debug!("Loading configuration from {:?}", path);
        let raw = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&raw)
            .map_err(|e| WikiError::Config(format!("{}: {}", path.display(), e)))?;
        info!("Loaded configuration from {:?} ({} users)", path, config.users.len());
        Ok(config)
    }

    /// Load from an optional file, then apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self, WikiError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::new(),
        };
        config.with_env_overrides()
    }

    /// Apply `TUTORIAL_*` environment variables on top of this configuration
    pub fn with_env_overrides(mut self) -> Result<Self, WikiError> {
        if let Ok(url) = std::env::var("TUTORIAL_DATABASE_URL") {
            self.database_url = url;
        }
        if let Ok(host) = std::env::var("TUTORIAL_HOST") {
            self.host = host;
        }
        if let Ok(port) = std::env::var("TUTORIAL_PORT") {
            self.port = port
                .parse()
                .map_err(|_| WikiError::Config(format!("invalid TUTORIAL_PORT '{}'", port)))?;
        }
        if let Ok(secret) = std::env::var("TUTORIAL_SECRET") {
            self.auth_secret = secret;
        }
        Ok(self)
    }

    pub fn auth_timeout(&self) -> Option<Duration> {
        self.auth_timeout_secs.map(Duration::from_secs)
    }

    pub fn session_timeout(&self) -> Option<Duration> {
        self.session_timeout_secs.map(Duration::from_secs)
    }

    /// Get the socket address for binding
    pub fn socket_addr(&self) -> Result<SocketAddr, WikiError> {
        let ip = if self.host == "localhost" {
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        } else {
            self.host
                .parse::<IpAddr>()
                .map_err(|_| WikiError::Config(format!("invalid host '{}'", self.host)))?
        };
        Ok(SocketAddr::new(ip, self.port))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
