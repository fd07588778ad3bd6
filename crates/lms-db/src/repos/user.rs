//! User repository: accounts, lookups by email/username, password changes.

use chrono::Utc;

use lms_core::entities::User;

use crate::error::DatabaseError;
use crate::helpers::{SetClause, collect_rows, first_row, get_opt_string, parse_datetime, parse_enum};
use crate::inputs::NewUser;
use crate::service::LmsService;
use crate::updates::user::UserUpdate;

const SELECT_COLS: &str =
    "id, username, email, password, first_name, last_name, role, profile_picture, created_at";

pub(crate) fn row_to_user(row: &libsql::Row) -> Result<User, DatabaseError> {
    row_to_user_at(row, 0)
}

/// Parse a user whose columns start at `offset` (for joined selects).
pub(crate) fn row_to_user_at(row: &libsql::Row, offset: i32) -> Result<User, DatabaseError> {
    Ok(User {
        id: row.get(offset)?,
        username: row.get(offset + 1)?,
        email: row.get(offset + 2)?,
        password: row.get(offset + 3)?,
        first_name: get_opt_string(row, offset + 4)?,
        last_name: get_opt_string(row, offset + 5)?,
        role: parse_enum(&row.get::<String>(offset + 6)?)?,
        profile_picture: get_opt_string(row, offset + 7)?,
        created_at: parse_datetime(&row.get::<String>(offset + 8)?)?,
    })
}

/// User columns qualified with a table alias, for joins.
pub(crate) fn qualified_cols(alias: &str) -> String {
    SELECT_COLS
        .split(", ")
        .map(|col| format!("{alias}.{col}"))
        .collect::<Vec<_>>()
        .join(", ")
}

impl LmsService {
    /// Insert a user. Duplicate email or username is a `Conflict` with the
    /// message shown to the client.
    pub async fn create_user(&self, new: &NewUser) -> Result<User, DatabaseError> {
        new.validate()?;
        if self.find_user_by_email(&new.email).await?.is_some() {
            return Err(DatabaseError::Conflict("Email already in use".into()));
        }
        if self.find_user_by_username(&new.username).await?.is_some() {
            return Err(DatabaseError::Conflict("Username already taken".into()));
        }

        let now = Utc::now();
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "INSERT INTO users (username, email, password, first_name, last_name, role, profile_picture, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                     RETURNING {SELECT_COLS}"
                ),
                libsql::params![
                    new.username.trim(),
                    new.email.trim(),
                    new.password.as_str(),
                    new.first_name.as_deref(),
                    new.last_name.as_deref(),
                    new.role.as_str(),
                    new.profile_picture.as_deref(),
                    now.to_rfc3339()
                ],
            )
            .await
            .map_err(|e| DatabaseError::from(e).on_unique("Username or email already in use"))?;
        let row = first_row(&mut rows, |e| e.on_unique("Username or email already in use")).await?;
        let user = row_to_user(&row)?;

        tracing::info!(user_id = user.id, role = %user.role, "user created");
        Ok(user)
    }

    pub async fn get_user(&self, id: i64) -> Result<User, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(&format!("SELECT {SELECT_COLS} FROM users WHERE id = ?1"), [id])
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_user(&row)
    }

    /// Case-insensitive email lookup.
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM users WHERE email = ?1"),
                [email.trim()],
            )
            .await?;
        rows.next().await?.map(|row| row_to_user(&row)).transpose()
    }

    /// Case-insensitive username lookup.
    pub async fn find_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<User>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM users WHERE username = ?1"),
                [username.trim()],
            )
            .await?;
        rows.next().await?.map(|row| row_to_user(&row)).transpose()
    }

    pub async fn list_users(&self) -> Result<Vec<User>, DatabaseError> {
        let rows = self
            .db()
            .conn()
            .query(&format!("SELECT {SELECT_COLS} FROM users ORDER BY id"), ())
            .await?;
        collect_rows(rows, row_to_user).await
    }

    pub async fn update_user(&self, id: i64, update: UserUpdate) -> Result<User, DatabaseError> {
        let mut set = SetClause::new();
        if let Some(username) = update.username {
            set.push("username", username.trim().to_string());
        }
        if let Some(email) = update.email {
            set.push("email", email.trim().to_string());
        }
        if let Some(first_name) = update.first_name {
            set.push_nullable("first_name", first_name);
        }
        if let Some(last_name) = update.last_name {
            set.push_nullable("last_name", last_name);
        }
        if let Some(role) = update.role {
            set.push("role", role.as_str());
        }
        if let Some(profile_picture) = update.profile_picture {
            set.push_nullable("profile_picture", profile_picture);
        }

        if set.is_empty() {
            return self.get_user(id).await;
        }

        let (sql, params) = set.into_update("users", id);
        let affected = self
            .db()
            .conn()
            .execute(&sql, libsql::params_from_iter(params))
            .await
            .map_err(|e| DatabaseError::from(e).on_unique("Username or email already in use"))?;
        if affected == 0 {
            return Err(DatabaseError::NoResult);
        }
        self.get_user(id).await
    }

    /// Replace the stored password hash.
    pub async fn set_user_password(&self, id: i64, password_hash: &str) -> Result<(), DatabaseError> {
        let affected = self
            .db()
            .conn()
            .execute(
                "UPDATE users SET password = ?1 WHERE id = ?2",
                libsql::params![password_hash, id],
            )
            .await?;
        if affected == 0 {
            return Err(DatabaseError::NoResult);
        }
        tracing::info!(user_id = id, "password changed");
        Ok(())
    }

    /// Delete a user. Their enrollments, progress and logs cascade; courses
    /// they taught keep existing without an instructor.
    pub async fn delete_user(&self, id: i64) -> Result<(), DatabaseError> {
        self.delete_by_id("users", id).await
    }
}
