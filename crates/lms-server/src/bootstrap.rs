use anyhow::Context;
use lms_config::LmsConfig;
use lms_db::LmsService;
use lms_mail::Mailer;
use lms_server::AppState;

pub fn load_config() -> anyhow::Result<LmsConfig> {
    LmsConfig::load_with_dotenv().context("failed to load configuration")
}

pub async fn open_service(config: &LmsConfig) -> anyhow::Result<LmsService> {
    let path = &config.database.path;
    LmsService::new_local(path)
        .await
        .with_context(|| format!("failed to open database at {path}"))
}

/// Config, database and mailer, ready to serve.
pub async fn app_state(config: LmsConfig) -> anyhow::Result<AppState> {
    let service = open_service(&config).await?;
    let mailer = Mailer::from_config(&config.smtp).context("invalid SMTP configuration")?;
    if !config.oauth.google.is_configured() && !config.oauth.microsoft.is_configured() {
        tracing::debug!("no OAuth providers configured");
    }
    Ok(AppState::new(service, config, mailer))
}
