//! # lms-config
//!
//! Layered configuration loading for the LMS using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`LMS_*` prefix, `__` as separator)
//! 2. Project-level `lms.toml`
//! 3. User-level `~/.config/lms/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `LMS_SERVER__PORT` -> `server.port`, `LMS_OAUTH__GOOGLE__CLIENT_ID`
//! -> `oauth.google.client_id`, etc. The `__` (double underscore) separates
//! nested config sections.
//!
//! # Usage
//!
//! ```no_run
//! use lms_config::LmsConfig;
//!
//! let config = LmsConfig::load_with_dotenv().expect("config");
//! if config.smtp.is_configured() {
//!     println!("SMTP host: {}", config.smtp.host);
//! }
//! ```

mod database;
mod error;
mod general;
mod oauth;
mod server;
mod session;
mod smtp;
mod uploads;

pub use database::DatabaseConfig;
pub use error::ConfigError;
pub use general::GeneralConfig;
pub use oauth::{MicrosoftOAuthConfig, OAuthClientConfig, OAuthConfig};
pub use server::ServerConfig;
pub use session::SessionConfig;
pub use smtp::SmtpConfig;
pub use uploads::UploadsConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Name of the project-local config file.
pub const LOCAL_CONFIG_FILE: &str = "lms.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LmsConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub smtp: SmtpConfig,
    #[serde(default)]
    pub oauth: OAuthConfig,
    #[serde(default)]
    pub uploads: UploadsConfig,
    #[serde(default)]
    pub general: GeneralConfig,
}

impl LmsConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy`; use [`Self::load_with_dotenv`] for `.env` loading.
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment().extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with `.env` file support.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        Self::load_dotenv_from_workspace();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment directly or add providers on top.
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        // Layer 2: Project-local config
        let local_path = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: Environment variables (highest priority)
        figment.merge(Env::prefixed("LMS_").split("__"))
    }

    /// Reject values that parse but cannot work.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(invalid("server.port", "must be non-zero"));
        }
        if self.session.max_age_days <= 0 {
            return Err(invalid("session.max_age_days", "must be positive"));
        }
        if self.uploads.max_video_bytes == 0 {
            return Err(invalid("uploads.max_video_bytes", "must be positive"));
        }
        if self.general.default_limit == 0 {
            return Err(invalid("general.default_limit", "must be positive"));
        }
        if self.smtp.secure && self.smtp.host.is_empty() {
            return Err(ConfigError::NotConfigured {
                section: "smtp".to_string(),
                missing: "secure is set but host is empty".to_string(),
            });
        }
        Ok(())
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("lms").join("config.toml"))
    }

    /// Load `.env` from the workspace root.
    ///
    /// Walks up from `CARGO_MANIFEST_DIR` (if available), then falls back to
    /// the current directory. Silently does nothing if no `.env` is found.
    fn load_dotenv_from_workspace() {
        if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
            let mut dir = PathBuf::from(manifest_dir);
            // crate -> crates/ -> workspace root
            for _ in 0..3 {
                let env_path = dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                    return;
                }
                if !dir.pop() {
                    break;
                }
            }
        }

        let _ = dotenvy::dotenv();
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = LmsConfig::default();
        assert!(config.validate().is_ok());
        assert!(!config.smtp.is_configured());
        assert!(!config.oauth.google.is_configured());
        assert_eq!(config.database.path, "lms.db");
    }

    #[test]
    fn figment_builds_without_files() {
        figment::Jail::expect_with(|_jail| {
            let config: LmsConfig = LmsConfig::figment().extract()?;
            assert_eq!(config.server.port, 5000);
            assert_eq!(config.general.default_limit, 50);
            Ok(())
        });
    }

    #[test]
    fn zero_limit_is_rejected() {
        let mut config = LmsConfig::default();
        config.general.default_limit = 0;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "general.default_limit"));
    }

    #[test]
    fn secure_smtp_needs_a_host() {
        let mut config = LmsConfig::default();
        config.smtp.secure = true;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::NotConfigured { ref section, .. } if section == "smtp"));

        config.smtp.host = "smtp.example.com".into();
        assert!(config.validate().is_ok());
    }
}
