//! Welcome email for accounts created by an administrator.

/// Content of the welcome email. The temporary password only appears in
/// the body, never in `Debug` output.
#[derive(Clone)]
pub struct WelcomeEmail {
    pub app_name: String,
    pub username: String,
    pub role: String,
    pub temporary_password: String,
    pub login_url: String,
}

impl std::fmt::Debug for WelcomeEmail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WelcomeEmail")
            .field("app_name", &self.app_name)
            .field("username", &self.username)
            .field("role", &self.role)
            .field("login_url", &self.login_url)
            .finish_non_exhaustive()
    }
}

impl WelcomeEmail {
    #[must_use]
    pub fn subject(&self) -> String {
        format!("Welcome to {}", self.app_name)
    }

    #[must_use]
    pub fn body(&self) -> String {
        format!(
            "Hello {username},\n\
             \n\
             An account has been created for you on {app} with the role \"{role}\".\n\
             \n\
             Username: {username}\n\
             Temporary password: {password}\n\
             \n\
             Sign in at {url} and change your password from your profile page.\n",
            username = self.username,
            app = self.app_name,
            role = self.role,
            password = self.temporary_password,
            url = self.login_url,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn email() -> WelcomeEmail {
        WelcomeEmail {
            app_name: "Acme LMS".into(),
            username: "ann".into(),
            role: "contributor".into(),
            temporary_password: "s3cr3t-temp".into(),
            login_url: "https://lms.acme.test/".into(),
        }
    }

    #[test]
    fn body_lists_credentials() {
        let body = email().body();
        assert!(body.contains("Username: ann"));
        assert!(body.contains("Temporary password: s3cr3t-temp"));
        assert!(body.contains("\"contributor\""));
        assert_eq!(email().subject(), "Welcome to Acme LMS");
    }

    #[test]
    fn debug_hides_password() {
        assert!(!format!("{:?}", email()).contains("s3cr3t-temp"));
    }
}
