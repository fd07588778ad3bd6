//! Category repository.

use chrono::Utc;

use lms_core::entities::Category;

use crate::error::DatabaseError;
use crate::helpers::{SetClause, collect_rows, first_row, get_opt_string, parse_datetime};
use crate::inputs::NewCategory;
use crate::service::LmsService;
use crate::updates::category::CategoryUpdate;

const SELECT_COLS: &str = "id, name, description, created_at";

const DUPLICATE: &str = "Category name already exists";

fn row_to_category(row: &libsql::Row) -> Result<Category, DatabaseError> {
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        description: get_opt_string(row, 2)?,
        created_at: parse_datetime(&row.get::<String>(3)?)?,
    })
}

impl LmsService {
    pub async fn create_category(&self, new: &NewCategory) -> Result<Category, DatabaseError> {
        new.validate()?;
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "INSERT INTO categories (name, description, created_at) VALUES (?1, ?2, ?3)
                     RETURNING {SELECT_COLS}"
                ),
                libsql::params![
                    new.name.trim(),
                    new.description.as_deref(),
                    Utc::now().to_rfc3339()
                ],
            )
            .await
            .map_err(|e| DatabaseError::from(e).on_unique(DUPLICATE))?;
        let row = first_row(&mut rows, |e| e.on_unique(DUPLICATE)).await?;
        row_to_category(&row)
    }

    pub async fn get_category(&self, id: i64) -> Result<Category, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(&format!("SELECT {SELECT_COLS} FROM categories WHERE id = ?1"), [id])
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_category(&row)
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>, DatabaseError> {
        let rows = self
            .db()
            .conn()
            .query(&format!("SELECT {SELECT_COLS} FROM categories ORDER BY name"), ())
            .await?;
        collect_rows(rows, row_to_category).await
    }

    pub async fn update_category(
        &self,
        id: i64,
        update: CategoryUpdate,
    ) -> Result<Category, DatabaseError> {
        let mut set = SetClause::new();
        if let Some(name) = update.name {
            set.push("name", name.trim().to_string());
        }
        if let Some(description) = update.description {
            set.push_nullable("description", description);
        }
        if set.is_empty() {
            return self.get_category(id).await;
        }

        let (sql, params) = set.into_update("categories", id);
        let affected = self
            .db()
            .conn()
            .execute(&sql, libsql::params_from_iter(params))
            .await
            .map_err(|e| DatabaseError::from(e).on_unique(DUPLICATE))?;
        if affected == 0 {
            return Err(DatabaseError::NoResult);
        }
        self.get_category(id).await
    }

    /// Delete a category; its courses become uncategorized.
    pub async fn delete_category(&self, id: i64) -> Result<(), DatabaseError> {
        self.delete_by_id("categories", id).await
    }
}
