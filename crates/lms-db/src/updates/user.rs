//! User update builder.

use lms_core::enums::Role;
use lms_core::serde_util::double_option;
use serde::{Deserialize, Serialize};

/// Partial account update. The password is changed through
/// `LmsService::set_user_password`, never through this struct.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "double_option"
    )]
    pub first_name: Option<Option<String>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "double_option"
    )]
    pub last_name: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "double_option"
    )]
    pub profile_picture: Option<Option<String>>,
}

impl UserUpdate {
    /// Keep only the fields a user may change on their own profile.
    #[must_use]
    pub fn profile_only(self) -> Self {
        Self {
            first_name: self.first_name,
            last_name: self.last_name,
            profile_picture: self.profile_picture,
            ..Self::default()
        }
    }
}

pub struct UserUpdateBuilder(UserUpdate);

impl UserUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(UserUpdate::default())
    }

    #[must_use]
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.0.email = Some(email.into());
        self
    }

    #[must_use]
    pub fn first_name(mut self, first_name: Option<String>) -> Self {
        self.0.first_name = Some(first_name);
        self
    }

    #[must_use]
    pub fn last_name(mut self, last_name: Option<String>) -> Self {
        self.0.last_name = Some(last_name);
        self
    }

    #[must_use]
    pub fn role(mut self, role: Role) -> Self {
        self.0.role = Some(role);
        self
    }

    #[must_use]
    pub fn profile_picture(mut self, url: Option<String>) -> Self {
        self.0.profile_picture = Some(url);
        self
    }

    #[must_use]
    pub fn build(self) -> UserUpdate {
        self.0
    }
}

impl Default for UserUpdateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
