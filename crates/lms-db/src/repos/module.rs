//! Module repository.

use lms_core::entities::Module;

use crate::error::DatabaseError;
use crate::helpers::{SetClause, collect_rows};
use crate::inputs::NewModule;
use crate::service::LmsService;
use crate::updates::module::ModuleUpdate;

const SELECT_COLS: &str = "id, course_id, title, position";

fn row_to_module(row: &libsql::Row) -> Result<Module, DatabaseError> {
    Ok(Module {
        id: row.get(0)?,
        course_id: row.get(1)?,
        title: row.get(2)?,
        position: row.get(3)?,
    })
}

impl LmsService {
    /// Append a module to a course. Without an explicit position it goes
    /// after the last existing module.
    pub async fn create_module(&self, new: &NewModule) -> Result<Module, DatabaseError> {
        new.validate()?;
        self.get_course(new.course_id).await?;

        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "INSERT INTO modules (course_id, title, position)
                     VALUES (?1, ?2, COALESCE(?3, (SELECT COALESCE(MAX(position) + 1, 0) FROM modules WHERE course_id = ?1)))
                     RETURNING {SELECT_COLS}"
                ),
                libsql::params![new.course_id, new.title.trim(), new.position],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_module(&row)
    }

    pub async fn get_module(&self, id: i64) -> Result<Module, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(&format!("SELECT {SELECT_COLS} FROM modules WHERE id = ?1"), [id])
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_module(&row)
    }

    /// Modules of a course ordered by position.
    pub async fn list_modules(&self, course_id: i64) -> Result<Vec<Module>, DatabaseError> {
        let rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM modules WHERE course_id = ?1 ORDER BY position, id"
                ),
                [course_id],
            )
            .await?;
        collect_rows(rows, row_to_module).await
    }

    pub async fn update_module(&self, id: i64, update: ModuleUpdate) -> Result<Module, DatabaseError> {
        let mut set = SetClause::new();
        if let Some(title) = update.title {
            set.push("title", title.trim().to_string());
        }
        if let Some(position) = update.position {
            set.push("position", position);
        }
        if set.is_empty() {
            return self.get_module(id).await;
        }

        let (sql, params) = set.into_update("modules", id);
        let affected = self
            .db()
            .conn()
            .execute(&sql, libsql::params_from_iter(params))
            .await?;
        if affected == 0 {
            return Err(DatabaseError::NoResult);
        }
        self.get_module(id).await
    }

    pub async fn delete_module(&self, id: i64) -> Result<(), DatabaseError> {
        self.delete_by_id("modules", id).await
    }
}
