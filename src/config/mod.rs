//! Configuration management
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! `CONFHOOK__SECTION__KEY` environment variables.

use serde::{Deserialize, Serialize};

/// Environment variable naming the config file
pub const CONFIG_PATH_ENV: &str = "CONFHOOK_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config/confhook.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub provider: ProviderConfig,
    pub conference: ConferenceConfig,
    pub dedup: DedupConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub api_base_url: String,
    pub api_key: String,
    /// Base64 Ed25519 public key used to verify webhooks
    pub public_key: String,
    /// Number callers dial to reach the conference
    pub phone_number: String,
    pub connection_id: String,
    /// Accepted clock skew for webhook timestamps
    pub signature_tolerance_secs: u64,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConferenceConfig {
    pub name_prefix: String,
    pub greeting: String,
    pub voice: String,
    pub language: String,
    pub waiting_audio_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DedupConfig {
    pub capacity: usize,
    pub retention_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 9090,
            },
            provider: ProviderConfig {
                api_base_url: "https://api.telnyx.com/v2".to_string(),
                api_key: String::new(),
                public_key: String::new(),
                phone_number: String::new(),
                connection_id: String::new(),
                signature_tolerance_secs: 300,
                request_timeout_secs: 10,
            },
            conference: ConferenceConfig {
                name_prefix: "demo-conference".to_string(),
                greeting: "joining conference".to_string(),
                voice: "female".to_string(),
                language: "en-GB".to_string(),
                waiting_audio_url:
                    "https://upload.wikimedia.org/wikipedia/commons/4/40/Toreador_song_cleaned.ogg"
                        .to_string(),
            },
            dedup: DedupConfig {
                capacity: 10_000,
                retention_secs: 24 * 60 * 60,
            },
        }
    }
}

impl Config {
    /// Load from `CONFHOOK_CONFIG` (or the default path) and the environment
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let path =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(&path)
    }

    /// Load from a specific file; a missing file falls back to defaults
    pub fn load_from(path: &str) -> Result<Self, ::config::ConfigError> {
        let loaded: Config = ::config::Config::builder()
            .add_source(::config::Config::try_from(&Config::default())?)
            .add_source(::config::File::with_name(path).required(false))
            .add_source(
                ::config::Environment::with_prefix("CONFHOOK")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        loaded.validate()?;
        Ok(loaded)
    }

    /// Reject configurations the service cannot run with
    pub fn validate(&self) -> Result<(), ::config::ConfigError> {
        if self.provider.api_key.trim().is_empty() {
            return Err(::config::ConfigError::Message(
                "provider.api_key must be set".to_string(),
            ));
        }
        if self.provider.public_key.trim().is_empty() {
            return Err(::config::ConfigError::Message(
                "provider.public_key must be set".to_string(),
            ));
        }
        if self.dedup.capacity == 0 {
            return Err(::config::ConfigError::Message(
                "dedup.capacity must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.provider.signature_tolerance_secs, 300);
        assert_eq!(config.conference.voice, "female");
        assert_eq!(config.conference.language, "en-GB");
        assert_eq!(config.bind_address(), "0.0.0.0:9090");
    }

    #[test]
    fn test_default_config_fails_validation() {
        let err = Config::default().validate().unwrap_err();
        assert!(err.to_string().contains("api_key"));
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let path = std::env::temp_dir().join(format!("confhook-{}.toml", uuid::Uuid::new_v4()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
[server]
port = 9191

[provider]
api_key = "KEY123"
public_key = "cHVibGljLWtleQ=="
phone_number = "+15550001111"

[conference]
voice = "male"
"#
        )
        .unwrap();

        let config = Config::load_from(path.to_str().unwrap()).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.server.port, 9191);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.provider.api_key, "KEY123");
        assert_eq!(config.provider.phone_number, "+15550001111");
        assert_eq!(config.conference.voice, "male");
        assert_eq!(config.conference.language, "en-GB");
        assert_eq!(config.dedup.capacity, 10_000);
    }
}
