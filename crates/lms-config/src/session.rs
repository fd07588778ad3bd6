//! Session cookie configuration.

use serde::{Deserialize, Serialize};

fn default_cookie_name() -> String {
    "lms.sid".to_string()
}

const fn default_max_age_days() -> i64 {
    7
}

const fn default_cleanup_interval_secs() -> u64 {
    3600
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,

    /// Sessions expire after this many days of inactivity.
    #[serde(default = "default_max_age_days")]
    pub max_age_days: i64,

    /// Set the `Secure` cookie attribute. Enable behind HTTPS.
    #[serde(default)]
    pub secure: bool,

    /// How often expired session rows are deleted.
    #[serde(default = "default_cleanup_interval_secs")]
    pub cleanup_interval_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
            max_age_days: default_max_age_days(),
            secure: false,
            cleanup_interval_secs: default_cleanup_interval_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = SessionConfig::default();
        assert_eq!(config.cookie_name, "lms.sid");
        assert_eq!(config.max_age_days, 7);
        assert!(!config.secure);
        assert_eq!(config.cleanup_interval_secs, 3600);
    }
}
