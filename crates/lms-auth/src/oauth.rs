//! OAuth 2.0 authorization-code sign-in with Google and Microsoft.
//!
//! The server redirects to [`OAuthClient::authorize_url`] with a random
//! `state` kept in the session, then on callback exchanges the code for an
//! access token and fetches the user's profile.

use std::fmt;
use std::str::FromStr;

use lms_config::OAuthConfig;
use serde::Deserialize;

use crate::error::AuthError;
use crate::password::random_bytes;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Google,
    Microsoft,
}

impl Provider {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Microsoft => "microsoft",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "google" => Ok(Self::Google),
            "microsoft" => Ok(Self::Microsoft),
            other => Err(AuthError::UnknownProvider(other.to_string())),
        }
    }
}

/// The parts of a provider profile the LMS keeps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthProfile {
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub picture: Option<String>,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct GoogleProfile {
    email: Option<String>,
    given_name: Option<String>,
    family_name: Option<String>,
    picture: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MicrosoftProfile {
    mail: Option<String>,
    user_principal_name: Option<String>,
    given_name: Option<String>,
    surname: Option<String>,
}

/// 16 random bytes, hex encoded, for the `state` parameter.
///
/// # Errors
///
/// Returns `AuthError::Random` if the OS random source fails.
pub fn generate_state() -> Result<String, AuthError> {
    Ok(random_bytes(16)?.iter().map(|b| format!("{b:02x}")).collect())
}

/// Compare the callback `state` with the one stored in the session.
///
/// # Errors
///
/// Returns `AuthError::StateMismatch` if either is missing or they differ.
pub fn check_state(expected: Option<&str>, received: Option<&str>) -> Result<(), AuthError> {
    match (expected, received) {
        (Some(e), Some(r)) if !e.is_empty() && e == r => Ok(()),
        _ => Err(AuthError::StateMismatch),
    }
}

/// A configured provider with its endpoints and redirect URI.
#[derive(Debug, Clone)]
pub struct OAuthClient {
    pub provider: Provider,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    authorize_endpoint: String,
    token_endpoint: String,
    profile_endpoint: String,
    scope: &'static str,
}

impl OAuthClient {
    /// Build the client for `provider` from config.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::ProviderNotConfigured` when its credentials are
    /// missing.
    pub fn from_config(
        provider: Provider,
        config: &OAuthConfig,
        redirect_uri: String,
    ) -> Result<Self, AuthError> {
        match provider {
            Provider::Google => {
                let google = &config.google;
                if !google.is_configured() {
                    return Err(AuthError::ProviderNotConfigured(provider.as_str()));
                }
                Ok(Self {
                    provider,
                    client_id: google.client_id.clone(),
                    client_secret: google.client_secret.clone(),
                    redirect_uri,
                    authorize_endpoint: "https://accounts.google.com/o/oauth2/v2/auth".into(),
                    token_endpoint: "https://oauth2.googleapis.com/token".into(),
                    profile_endpoint: "https://openidconnect.googleapis.com/v1/userinfo".into(),
                    scope: "openid email profile",
                })
            }
            Provider::Microsoft => {
                let ms = &config.microsoft;
                if !ms.is_configured() {
                    return Err(AuthError::ProviderNotConfigured(provider.as_str()));
                }
                let base = format!("https://login.microsoftonline.com/{}/oauth2/v2.0", ms.tenant);
                Ok(Self {
                    provider,
                    client_id: ms.client_id.clone(),
                    client_secret: ms.client_secret.clone(),
                    redirect_uri,
                    authorize_endpoint: format!("{base}/authorize"),
                    token_endpoint: format!("{base}/token"),
                    profile_endpoint: "https://graph.microsoft.com/v1.0/me".into(),
                    scope: "openid email profile User.Read",
                })
            }
        }
    }

    /// Provider sign-in URL carrying `state`.
    #[must_use]
    pub fn authorize_url(&self, state: &str) -> String {
        format!(
            "{}?response_type=code&client_id={}&redirect_uri={}&scope={}&state={}",
            self.authorize_endpoint,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_uri),
            urlencoding::encode(self.scope),
            urlencoding::encode(state),
        )
    }

    /// Trade an authorization code for an access token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenExchange` on transport failure or a non-2xx
    /// response.
    pub async fn exchange_code(
        &self,
        http: &reqwest::Client,
        code: &str,
    ) -> Result<String, AuthError> {
        let resp = http
            .post(&self.token_endpoint)
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AuthError::TokenExchange(format!("{}: {e}", self.provider)))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(AuthError::TokenExchange(format!(
                "{}: HTTP {status}: {body}",
                self.provider
            )));
        }

        let token = resp
            .json::<TokenResponse>()
            .await
            .map_err(|e| AuthError::TokenExchange(format!("{}: parse: {e}", self.provider)))?;
        Ok(token.access_token)
    }

    /// Fetch the signed-in user's profile.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Profile` on transport failure, a non-2xx response,
    /// or a profile without an email address.
    pub async fn fetch_profile(
        &self,
        http: &reqwest::Client,
        access_token: &str,
    ) -> Result<OAuthProfile, AuthError> {
        let resp = http
            .get(&self.profile_endpoint)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AuthError::Profile(format!("{}: {e}", self.provider)))?;

        if !resp.status().is_success() {
            let status = resp.status();
            return Err(AuthError::Profile(format!("{}: HTTP {status}", self.provider)));
        }

        let body = resp
            .json::<serde_json::Value>()
            .await
            .map_err(|e| AuthError::Profile(format!("{}: parse: {e}", self.provider)))?;
        parse_profile(self.provider, body)
    }
}

/// Map a provider's profile JSON onto [`OAuthProfile`].
///
/// # Errors
///
/// Returns `AuthError::Profile` if the JSON does not match or carries no
/// email address.
pub fn parse_profile(provider: Provider, body: serde_json::Value) -> Result<OAuthProfile, AuthError> {
    let parse_err = |e: serde_json::Error| AuthError::Profile(format!("{provider}: {e}"));
    let profile = match provider {
        Provider::Google => {
            let p: GoogleProfile = serde_json::from_value(body).map_err(parse_err)?;
            OAuthProfile {
                email: p.email.unwrap_or_default(),
                first_name: p.given_name,
                last_name: p.family_name,
                picture: p.picture,
            }
        }
        Provider::Microsoft => {
            let p: MicrosoftProfile = serde_json::from_value(body).map_err(parse_err)?;
            OAuthProfile {
                email: p.mail.or(p.user_principal_name).unwrap_or_default(),
                first_name: p.given_name,
                last_name: p.surname,
                picture: None,
            }
        }
    };

    if profile.email.is_empty() {
        return Err(AuthError::Profile(format!("{provider}: no email in profile")));
    }
    Ok(profile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lms_config::{MicrosoftOAuthConfig, OAuthClientConfig};
    use pretty_assertions::assert_eq;

    fn configured() -> OAuthConfig {
        OAuthConfig {
            google: OAuthClientConfig {
                client_id: "gid".into(),
                client_secret: "gsecret".into(),
            },
            microsoft: MicrosoftOAuthConfig {
                client_id: "mid".into(),
                client_secret: "msecret".into(),
                tenant: "contoso".into(),
            },
        }
    }

    #[test]
    fn provider_names() {
        assert_eq!("google".parse::<Provider>().unwrap(), Provider::Google);
        assert_eq!(Provider::Microsoft.to_string(), "microsoft");
        assert!(matches!(
            "github".parse::<Provider>(),
            Err(AuthError::UnknownProvider(_))
        ));
    }

    #[test]
    fn unconfigured_provider_is_rejected() {
        let err = OAuthClient::from_config(
            Provider::Google,
            &OAuthConfig::default(),
            "http://localhost/cb".into(),
        )
        .unwrap_err();
        assert!(matches!(err, AuthError::ProviderNotConfigured("google")));
    }

    #[test]
    fn google_authorize_url_is_encoded() {
        let client = OAuthClient::from_config(
            Provider::Google,
            &configured(),
            "http://localhost:5000/api/auth/google/callback".into(),
        )
        .unwrap();
        let url = client.authorize_url("abc123");
        assert!(url.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
        assert!(url.contains("client_id=gid"));
        assert!(url.contains(
            "redirect_uri=http%3A%2F%2Flocalhost%3A5000%2Fapi%2Fauth%2Fgoogle%2Fcallback"
        ));
        assert!(url.contains("scope=openid%20email%20profile"));
        assert!(url.ends_with("state=abc123"));
    }

    #[test]
    fn microsoft_uses_tenant() {
        let client = OAuthClient::from_config(
            Provider::Microsoft,
            &configured(),
            "http://localhost/cb".into(),
        )
        .unwrap();
        assert!(
            client
                .authorize_url("s")
                .starts_with("https://login.microsoftonline.com/contoso/oauth2/v2.0/authorize?")
        );
    }

    #[test]
    fn state_is_random_hex() {
        let a = generate_state().unwrap();
        let b = generate_state().unwrap();
        assert_eq!(a.len(), 32);
        assert_ne!(a, b);
        check_state(Some(a.as_str()), Some(a.as_str())).unwrap();
        assert!(check_state(Some(a.as_str()), Some(b.as_str())).is_err());
        assert!(check_state(None, Some(a.as_str())).is_err());
    }

    #[test]
    fn parses_google_profile() {
        let profile = parse_profile(
            Provider::Google,
            serde_json::json!({
                "sub": "1",
                "email": "ann@corp.test",
                "given_name": "Ann",
                "family_name": "Lee",
                "picture": "https://img/ann.png"
            }),
        )
        .unwrap();
        assert_eq!(
            profile,
            OAuthProfile {
                email: "ann@corp.test".into(),
                first_name: Some("Ann".into()),
                last_name: Some("Lee".into()),
                picture: Some("https://img/ann.png".into()),
            }
        );
    }

    #[test]
    fn microsoft_falls_back_to_principal_name() {
        let profile = parse_profile(
            Provider::Microsoft,
            serde_json::json!({
                "mail": null,
                "userPrincipalName": "bob@contoso.test",
                "givenName": "Bob",
                "surname": "Ray"
            }),
        )
        .unwrap();
        assert_eq!(profile.email, "bob@contoso.test");
        assert_eq!(profile.last_name.as_deref(), Some("Ray"));
    }

    #[test]
    fn profile_without_email_fails() {
        assert!(parse_profile(Provider::Google, serde_json::json!({ "sub": "1" })).is_err());
    }
}
