//! General application configuration.

use serde::{Deserialize, Serialize};

/// Default result limit.
const fn default_limit() -> u32 {
    50
}

fn default_app_name() -> String {
    "LMS".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// Product name used in email subjects and bodies.
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// Default result limit for capped list endpoints (activity logs).
    #[serde(default = "default_limit")]
    pub default_limit: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            app_name: default_app_name(),
            default_limit: default_limit(),
        }
    }
}
