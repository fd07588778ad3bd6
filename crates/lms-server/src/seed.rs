//! Account bootstrapping for `lms seed` and `lms create-admin`.

use lms_auth::password::hash_password_async;
use lms_core::entities::User;
use lms_core::enums::Role;
use lms_db::LmsService;
use lms_db::inputs::NewUser;

use crate::error::ApiError;

/// A seeded account and its initial password.
#[derive(Debug, Clone, Copy)]
pub struct DefaultAccount {
    pub username: &'static str,
    pub email: &'static str,
    pub password: &'static str,
    pub first_name: &'static str,
    pub last_name: &'static str,
    pub role: Role,
}

pub const DEFAULT_ACCOUNTS: [DefaultAccount; 3] = [
    DefaultAccount {
        username: "admin",
        email: "admin@example.com",
        password: "admin123",
        first_name: "Admin",
        last_name: "User",
        role: Role::Admin,
    },
    DefaultAccount {
        username: "contributor",
        email: "contributor@example.com",
        password: "contributor123",
        first_name: "Content",
        last_name: "Creator",
        role: Role::Contributor,
    },
    DefaultAccount {
        username: "employee",
        email: "employee@example.com",
        password: "employee123",
        first_name: "John",
        last_name: "Doe",
        role: Role::Employee,
    },
];

/// Create the default accounts that do not exist yet. Returns the ones
/// created.
pub async fn seed_default_accounts(service: &LmsService) -> Result<Vec<User>, ApiError> {
    let mut created = Vec::new();
    for account in DEFAULT_ACCOUNTS {
        if service.find_user_by_email(account.email).await?.is_some()
            || service.find_user_by_username(account.username).await?.is_some()
        {
            tracing::debug!(username = account.username, "default account exists");
            continue;
        }
        let user = service
            .create_user(&NewUser {
                username: account.username.to_string(),
                email: account.email.to_string(),
                password: hash_password_async(account.password.to_string()).await?,
                first_name: Some(account.first_name.to_string()),
                last_name: Some(account.last_name.to_string()),
                role: account.role,
                profile_picture: None,
            })
            .await?;
        created.push(user);
    }
    Ok(created)
}

/// Create an admin account with the given credentials.
pub async fn create_admin(
    service: &LmsService,
    username: &str,
    email: &str,
    password: &str,
) -> Result<User, ApiError> {
    let user = service
        .create_user(&NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password: hash_password_async(password.to_string()).await?,
            first_name: None,
            last_name: None,
            role: Role::Admin,
            profile_picture: None,
        })
        .await?;
    Ok(user)
}
