//! SMTP configuration for transactional email.

use serde::{Deserialize, Serialize};

const fn default_port() -> u16 {
    587
}

fn default_from() -> String {
    "LMS <noreply@lms.local>".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SmtpConfig {
    #[serde(default)]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Implicit TLS (usually port 465). When false, STARTTLS is used.
    #[serde(default)]
    pub secure: bool,

    #[serde(default)]
    pub user: String,

    #[serde(default)]
    pub pass: String,

    /// `From` header, e.g. `LMS <noreply@example.com>`.
    #[serde(default = "default_from")]
    pub from: String,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: default_port(),
            secure: false,
            user: String::new(),
            pass: String::new(),
            from: default_from(),
        }
    }
}

impl SmtpConfig {
    /// Host and credentials are all present.
    pub fn is_configured(&self) -> bool {
        !self.host.is_empty() && !self.user.is_empty() && !self.pass.is_empty()
    }
}
