//! Errors raised while loading or checking [`crate::LmsConfig`].

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// A source could not be read or a value had the wrong type.
    #[error("failed to load configuration: {0}")]
    Figment(#[from] figment::Error),

    /// Options of a section were set without the fields they depend on.
    #[error("[{section}] is incomplete: {missing}")]
    NotConfigured { section: String, missing: String },

    /// A value parsed but is outside its allowed range.
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}
