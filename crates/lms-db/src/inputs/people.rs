//! Accounts, groups and access grants.

use lms_core::enums::{AccessType, Role};
use serde::{Deserialize, Serialize};

use super::require;
use crate::error::DatabaseError;

/// A user row to insert. `password` is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Role,
    pub profile_picture: Option<String>,
}

impl NewUser {
    pub fn validate(&self) -> Result<(), DatabaseError> {
        require("username", &self.username)?;
        require("email", &self.email)?;
        if !self.email.contains('@') {
            return Err(DatabaseError::Validation("email must be a valid address".into()));
        }
        require("password", &self.password)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGroup {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl NewGroup {
    pub fn validate(&self) -> Result<(), DatabaseError> {
        require("name", &self.name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGroupMember {
    pub group_id: i64,
    pub user_id: i64,
}

fn default_access_type() -> AccessType {
    AccessType::View
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCourseAccess {
    pub course_id: i64,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub group_id: Option<i64>,
    #[serde(default = "default_access_type")]
    pub access_type: AccessType,
}

impl NewCourseAccess {
    pub fn validate(&self) -> Result<(), DatabaseError> {
        if self.user_id.is_none() && self.group_id.is_none() {
            return Err(DatabaseError::Validation(
                "Either userId or groupId is required".into(),
            ));
        }
        Ok(())
    }
}
