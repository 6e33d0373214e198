use crate::error::{ConfigError, CoreError};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
pub const YOUTUBE_FORCE_SSL_SCOPE: &str = "https://www.googleapis.com/auth/youtube.force-ssl";

pub const CONFIG_PATH_ENV: &str = "SWEEPER_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "comment-sweeper.toml";

/// OAuth client registration, read from the provider's credentials file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub auth_uri: String,
    pub token_uri: String,
}

#[derive(Debug, Deserialize)]
struct CredentialsFile {
    installed: Option<RawClientSection>,
    web: Option<RawClientSection>,
}

#[derive(Debug, Deserialize)]
struct RawClientSection {
    client_id: Option<String>,
    client_secret: Option<String>,
    #[serde(default)]
    redirect_uris: Vec<String>,
    auth_uri: Option<String>,
    token_uri: Option<String>,
}

impl ClientConfig {
    pub fn from_credentials_file(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                CoreError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                CoreError::Io(e)
            }
        })?;
        let config = Self::from_credentials_json(&contents)?;
        info!("Loaded OAuth client {} from {}", config.client_id, path.display());
        Ok(config)
    }

    pub fn from_credentials_json(json: &str) -> Result<Self, CoreError> {
        let file: CredentialsFile =
            serde_json::from_str(json).map_err(|e| ConfigError::InvalidFormat {
                details: e.to_string(),
            })?;

        let section = file
            .installed
            .or(file.web)
            .ok_or_else(|| ConfigError::MissingField {
                field: "installed".to_string(),
            })?;

        let client_id = section.client_id.ok_or_else(|| ConfigError::MissingField {
            field: "client_id".to_string(),
        })?;
        let client_secret = section
            .client_secret
            .ok_or_else(|| ConfigError::MissingField {
                field: "client_secret".to_string(),
            })?;
        let redirect_uri =
            section
                .redirect_uris
                .into_iter()
                .next()
                .ok_or_else(|| ConfigError::MissingField {
                    field: "redirect_uris".to_string(),
                })?;

        Ok(Self {
            client_id,
            client_secret,
            redirect_uri,
            auth_uri: section
                .auth_uri
                .unwrap_or_else(|| DEFAULT_AUTH_URI.to_string()),
            token_uri: section
                .token_uri
                .unwrap_or_else(|| DEFAULT_TOKEN_URI.to_string()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub port: u16,
    pub credentials_path: PathBuf,
    pub token_path: PathBuf,
    pub scopes: Vec<String>,
    pub moderation_delay_ms: u64,
    pub default_blocked_words: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            credentials_path: PathBuf::from("credentials.json"),
            token_path: PathBuf::from("token.json"),
            scopes: vec![YOUTUBE_FORCE_SSL_SCOPE.to_string()],
            moderation_delay_ms: 1000,
            default_blocked_words: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Defaults, then the optional TOML file, then the `PORT` variable.
    pub fn load() -> Result<Self, CoreError> {
        let explicit = std::env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from);
        let path = explicit
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

        let mut config = if path.exists() {
            Self::from_file(&path)?
        } else if let Some(path) = explicit {
            return Err(ConfigError::FileNotFound {
                path: path.display().to_string(),
            }
            .into());
        } else {
            debug!("No {} found, using defaults", DEFAULT_CONFIG_PATH);
            Self::default()
        };

        config.apply_port_override(std::env::var("PORT").ok().as_deref())?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&contents)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self, CoreError> {
        let config: AppConfig = toml::from_str(contents).map_err(ConfigError::Parse)?;
        if config.scopes.is_empty() {
            return Err(ConfigError::MissingField {
                field: "scopes".to_string(),
            }
            .into());
        }
        Ok(config)
    }

    pub fn apply_port_override(&mut self, port: Option<&str>) -> Result<(), CoreError> {
        if let Some(raw) = port {
            self.port = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                field: "PORT".to_string(),
                value: raw.to_string(),
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const INSTALLED: &str = r#"{
        "installed": {
            "client_id": "123.apps.googleusercontent.com",
            "client_secret": "shh",
            "redirect_uris": ["http://localhost:3000/auth/callback", "urn:ietf:wg:oauth:2.0:oob"],
            "auth_uri": "https://accounts.google.com/o/oauth2/auth",
            "token_uri": "https://oauth2.googleapis.com/token"
        }
    }"#;

    #[test]
    fn test_installed_credentials() {
        let config = ClientConfig::from_credentials_json(INSTALLED).unwrap();
        assert_eq!(config.client_id, "123.apps.googleusercontent.com");
        assert_eq!(config.client_secret, "shh");
        assert_eq!(config.redirect_uri, "http://localhost:3000/auth/callback");
        assert_eq!(config.token_uri, DEFAULT_TOKEN_URI);
    }

    #[test]
    fn test_web_credentials_use_default_endpoints() {
        let json = r#"{"web": {"client_id": "id", "client_secret": "secret",
            "redirect_uris": ["https://example.com/cb"]}}"#;
        let config = ClientConfig::from_credentials_json(json).unwrap();
        assert_eq!(config.redirect_uri, "https://example.com/cb");
        assert_eq!(config.auth_uri, DEFAULT_AUTH_URI);
    }

    #[test]
    fn test_credentials_missing_fields() {
        let err = ClientConfig::from_credentials_json(r#"{"other": {}}"#).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Config(ConfigError::MissingField { ref field }) if field == "installed"
        ));

        let json = r#"{"installed": {"client_id": "id", "client_secret": "s"}}"#;
        let err = ClientConfig::from_credentials_json(json).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Config(ConfigError::MissingField { ref field }) if field == "redirect_uris"
        ));

        let err = ClientConfig::from_credentials_json("not json").unwrap_err();
        assert!(matches!(err, CoreError::Config(ConfigError::InvalidFormat { .. })));
    }

    #[test]
    fn test_credentials_file_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = ClientConfig::from_credentials_file(dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, CoreError::Config(ConfigError::FileNotFound { .. })));
    }

    #[test]
    fn test_credentials_file_read() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(INSTALLED.as_bytes()).unwrap();
        let config = ClientConfig::from_credentials_file(file.path()).unwrap();
        assert_eq!(config.client_secret, "shh");
    }

    #[test]
    fn test_app_config_toml_overlay() {
        let config = AppConfig::from_toml(
            r#"
            port = 8080
            token_path = "/var/lib/sweeper/token.json"
            default_blocked_words = ["cheap", "free money"]
            "#,
        )
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.token_path, PathBuf::from("/var/lib/sweeper/token.json"));
        assert_eq!(config.credentials_path, PathBuf::from("credentials.json"));
        assert_eq!(config.moderation_delay_ms, 1000);
        assert_eq!(config.scopes, vec![YOUTUBE_FORCE_SSL_SCOPE.to_string()]);
        assert_eq!(config.default_blocked_words.len(), 2);
    }

    #[test]
    fn test_app_config_rejects_bad_input() {
        assert!(matches!(
            AppConfig::from_toml("port = \"eighty\""),
            Err(CoreError::Config(ConfigError::Parse(_)))
        ));
        assert!(matches!(
            AppConfig::from_toml("scopes = []"),
            Err(CoreError::Config(ConfigError::MissingField { .. }))
        ));
    }

    #[test]
    fn test_port_override() {
        let mut config = AppConfig::default();
        config.apply_port_override(None).unwrap();
        assert_eq!(config.port, 3000);

        config.apply_port_override(Some("4000")).unwrap();
        assert_eq!(config.port, 4000);

        let err = config.apply_port_override(Some("not-a-port")).unwrap_err();
        assert!(matches!(err, CoreError::Config(ConfigError::InvalidValue { .. })));
    }
}
