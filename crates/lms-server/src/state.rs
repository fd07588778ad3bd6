use std::sync::Arc;

use lms_config::LmsConfig;
use lms_db::LmsService;
use lms_mail::Mailer;

/// Shared handler state. Cloned per request; everything heavy sits behind
/// `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<LmsService>,
    pub config: Arc<LmsConfig>,
    pub mailer: Arc<Mailer>,
    /// Outbound client for OAuth token and profile requests.
    pub http: reqwest::Client,
}

impl AppState {
    #[must_use]
    pub fn new(service: LmsService, config: LmsConfig, mailer: Mailer) -> Self {
        Self {
            service: Arc::new(service),
            config: Arc::new(config),
            mailer: Arc::new(mailer),
            http: reqwest::Client::new(),
        }
    }

    #[must_use]
    pub fn db(&self) -> &LmsService {
        &self.service
    }
}
