//! Relay configuration.
//!
//! Stored as TOML. Credentials can be supplied or overridden through
//! `STEMRELAY_*` environment variables.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use stemrelay_protocol::constants::{DEFAULT_CHUNK_SIZE, DEFAULT_CONTENT_URL, DEFAULT_TOKEN_URL};

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Relay configuration.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Remote folder archives are placed in.
    #[serde(default = "default_destination_folder")]
    pub destination_folder: String,

    /// OAuth application key (client id).
    #[serde(default)]
    pub app_key: String,

    /// OAuth application secret.
    #[serde(default)]
    pub app_secret: String,

    /// Long-lived refresh token.
    #[serde(default)]
    pub refresh_token: String,

    /// Payloads above this size use an upload session.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: u64,

    /// Gzip level, 0-9.
    #[serde(default = "default_compression_level")]
    pub compression_level: u32,

    /// Where produced archives are written before upload.
    #[serde(default = "default_staging_dir")]
    pub staging_dir: PathBuf,

    #[serde(default = "default_token_url")]
    pub token_url: String,

    #[serde(default = "default_content_url")]
    pub content_url: String,

    /// Per-call HTTP timeout. Must cover one full chunk.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

fn default_destination_folder() -> String {
    "/Stem Uploads".into()
}

fn default_chunk_size() -> u64 {
    DEFAULT_CHUNK_SIZE
}

fn default_compression_level() -> u32 {
    6
}

fn default_staging_dir() -> PathBuf {
    std::env::temp_dir().join("stemrelay")
}

fn default_token_url() -> String {
    DEFAULT_TOKEN_URL.into()
}

fn default_content_url() -> String {
    DEFAULT_CONTENT_URL.into()
}

fn default_request_timeout() -> u64 {
    30 * 60
}

fn default_connect_timeout() -> u64 {
    30
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            destination_folder: default_destination_folder(),
            app_key: String::new(),
            app_secret: String::new(),
            refresh_token: String::new(),
            chunk_size: default_chunk_size(),
            compression_level: default_compression_level(),
            staging_dir: default_staging_dir(),
            token_url: default_token_url(),
            content_url: default_content_url(),
            request_timeout_secs: default_request_timeout(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

impl fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayConfig")
            .field("destination_folder", &self.destination_folder)
            .field("app_key", &self.app_key)
            .field("chunk_size", &self.chunk_size)
            .field("compression_level", &self.compression_level)
            .field("staging_dir", &self.staging_dir)
            .field("token_url", &self.token_url)
            .field("content_url", &self.content_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish_non_exhaustive()
    }
}

impl RelayConfig {
    /// Loads configuration from `path`, falling back to defaults when the
    /// file does not exist, then applies environment overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::from_toml_str(&content)?
        } else {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            Self::default()
        };
        config.apply_env()?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Applies `STEMRELAY_*` overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Applies overrides from `lookup`. Empty values are ignored.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("STEMRELAY_APP_KEY") {
            self.app_key = v;
        }
        if let Some(v) = get("STEMRELAY_APP_SECRET") {
            self.app_secret = v;
        }
        if let Some(v) = get("STEMRELAY_REFRESH_TOKEN") {
            self.refresh_token = v;
        }
        if let Some(v) = get("STEMRELAY_DESTINATION_FOLDER") {
            self.destination_folder = v;
        }
        if let Some(v) = get("STEMRELAY_CHUNK_SIZE") {
            self.chunk_size = v.trim().parse().map_err(|_| {
                ConfigError::Invalid(format!("STEMRELAY_CHUNK_SIZE is not a byte count: {v}"))
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size == 0 {
            return Err(ConfigError::Invalid("chunk_size must be positive".into()));
        }
        if self.compression_level > 9 {
            return Err(ConfigError::Invalid(format!(
                "compression_level must be 0-9, got {}",
                self.compression_level
            )));
        }
        for (name, value) in [
            ("app_key", &self.app_key),
            ("app_secret", &self.app_secret),
            ("refresh_token", &self.refresh_token),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{name} is required")));
            }
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_secs must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn complete() -> RelayConfig {
        RelayConfig {
            app_key: "key".into(),
            app_secret: "secret".into(),
            refresh_token: "refresh".into(),
            ..RelayConfig::default()
        }
    }

    #[test]
    fn default_config() {
        let config = RelayConfig::default();
        assert_eq!(config.destination_folder, "/Stem Uploads");
        assert_eq!(config.chunk_size, 100 * 1024 * 1024);
        assert_eq!(config.compression_level, 6);
        assert_eq!(config.request_timeout(), Duration::from_secs(1800));
        assert_eq!(config.connect_timeout(), Duration::from_secs(30));
        assert_eq!(config.token_url, "https://api.dropboxapi.com/oauth2/token");
        assert!(config.staging_dir.ends_with("stemrelay"));
        assert!(config.app_key.is_empty());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = RelayConfig::from_toml_str(
            r#"
            app_key = "k"
            chunk_size = 1048576
            "#,
        )
        .unwrap();
        assert_eq!(config.app_key, "k");
        assert_eq!(config.chunk_size, 1024 * 1024);
        assert_eq!(config.destination_folder, "/Stem Uploads");
        assert_eq!(config.compression_level, 6);
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let err = RelayConfig::from_toml_str("chunk_size = \"big\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn toml_roundtrip() {
        let config = complete();
        let text = toml::to_string_pretty(&config).unwrap();
        assert_eq!(RelayConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn env_overrides() {
        let env: HashMap<&str, &str> = [
            ("STEMRELAY_APP_KEY", "env-key"),
            ("STEMRELAY_REFRESH_TOKEN", "env-refresh"),
            ("STEMRELAY_DESTINATION_FOLDER", "/Inbox"),
            ("STEMRELAY_CHUNK_SIZE", " 4096 "),
            ("STEMRELAY_APP_SECRET", ""),
        ]
        .into_iter()
        .collect();

        let mut config = complete();
        config
            .apply_env_from(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.app_key, "env-key");
        assert_eq!(config.app_secret, "secret");
        assert_eq!(config.refresh_token, "env-refresh");
        assert_eq!(config.destination_folder, "/Inbox");
        assert_eq!(config.chunk_size, 4096);
    }

    #[test]
    fn bad_chunk_size_env_rejected() {
        let mut config = complete();
        let err = config
            .apply_env_from(|k| (k == "STEMRELAY_CHUNK_SIZE").then(|| "lots".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn validate_rules() {
        assert!(complete().validate().is_ok());
        assert!(RelayConfig::default().validate().is_err());

        let mut zero_chunk = complete();
        zero_chunk.chunk_size = 0;
        assert!(zero_chunk.validate().is_err());

        let mut level = complete();
        level.compression_level = 10;
        assert!(level.validate().is_err());

        let mut no_secret = complete();
        no_secret.app_secret = "  ".into();
        match no_secret.validate() {
            Err(ConfigError::Invalid(msg)) => assert!(msg.contains("app_secret")),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn debug_hides_secrets() {
        let printed = format!("{:?}", complete());
        assert!(printed.contains("key"));
        assert!(!printed.contains("secret"));
        assert!(!printed.contains("refresh"));
    }

    #[test]
    fn load_missing_file_uses_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = RelayConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.compression_level, 6);
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("relay.toml");
        std::fs::write(&path, "destination_folder = \"/Mixes\"\ncompression_level = 9\n").unwrap();
        let config = RelayConfig::load(&path).unwrap();
        assert_eq!(config.compression_level, 9);
        // The folder may be overridden by the environment running the tests.
        if std::env::var("STEMRELAY_DESTINATION_FOLDER").is_err() {
            assert_eq!(config.destination_folder, "/Mixes");
        }
    }
}
