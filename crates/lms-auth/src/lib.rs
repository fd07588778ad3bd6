//! # lms-auth
//!
//! Credential handling for the LMS: salted scrypt password hashes and OAuth
//! sign-in through Google and Microsoft. Session management lives in the
//! server; this crate has no HTTP surface of its own.

pub mod error;
pub mod oauth;
pub mod password;

pub use error::AuthError;
pub use oauth::{OAuthClient, OAuthProfile, Provider};
pub use password::{hash_password, random_password, verify_password};
