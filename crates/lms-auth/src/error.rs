use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid password hash format")]
    MalformedHash,

    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error("random source unavailable: {0}")]
    Random(String),

    #[error("unknown OAuth provider: {0}")]
    UnknownProvider(String),

    #[error("OAuth provider {0} is not configured")]
    ProviderNotConfigured(&'static str),

    #[error("OAuth state mismatch")]
    StateMismatch,

    #[error("OAuth token exchange failed: {0}")]
    TokenExchange(String),

    #[error("OAuth profile request failed: {0}")]
    Profile(String),
}
