//! OAuth provider configuration (Google, Microsoft).

use serde::{Deserialize, Serialize};

fn default_tenant() -> String {
    "common".to_string()
}

/// Client credentials for one OAuth provider.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OAuthClientConfig {
    #[serde(default)]
    pub client_id: String,

    #[serde(default)]
    pub client_secret: String,
}

impl OAuthClientConfig {
    pub fn is_configured(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }
}

/// Microsoft identity platform credentials. `tenant` selects the directory
/// (`common`, `organizations`, or a tenant id).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MicrosoftOAuthConfig {
    #[serde(default)]
    pub client_id: String,

    #[serde(default)]
    pub client_secret: String,

    #[serde(default = "default_tenant")]
    pub tenant: String,
}

impl Default for MicrosoftOAuthConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            tenant: default_tenant(),
        }
    }
}

impl MicrosoftOAuthConfig {
    pub fn is_configured(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OAuthConfig {
    #[serde(default)]
    pub google: OAuthClientConfig,

    #[serde(default)]
    pub microsoft: MicrosoftOAuthConfig,
}
