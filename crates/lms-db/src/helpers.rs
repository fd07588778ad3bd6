//! Row-to-entity parsing helpers and the dynamic UPDATE builder.
//!
//! Every repo needs to convert `libsql::Row` (column-indexed) into typed entity
//! structs. These helpers isolate the parsing logic and handle the dual datetime
//! format issue (`SQLite`'s `datetime('now')` vs Rust's `to_rfc3339()`).

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;

use crate::error::DatabaseError;

/// Parse a required TEXT column as `DateTime<Utc>`.
///
/// Handles both RFC 3339 (`"2026-02-09T14:30:00+00:00"`) and `SQLite`'s default
/// format (`"2026-02-09 14:30:00"`).
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the string cannot be parsed as either format.
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, DatabaseError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|e| DatabaseError::Query(format!("Failed to parse datetime '{s}': {e}")))
}

/// Parse an optional TEXT column as `Option<DateTime<Utc>>`.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if a non-empty string cannot be parsed.
pub fn parse_optional_datetime(s: Option<&str>) -> Result<Option<DateTime<Utc>>, DatabaseError> {
    match s {
        Some(s) if !s.is_empty() => Ok(Some(parse_datetime(s)?)),
        _ => Ok(None),
    }
}

/// Parse a TEXT column into a serde-deserializable enum.
///
/// Works with all lms-core enums that use `#[serde(rename_all = "snake_case")]`.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the string does not match any enum variant.
pub fn parse_enum<T: DeserializeOwned>(s: &str) -> Result<T, DatabaseError> {
    serde_json::from_value(serde_json::Value::String(s.to_string()))
        .map_err(|e| DatabaseError::Query(format!("Failed to parse enum from '{s}': {e}")))
}

/// Parse a nullable TEXT column into an enum.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if a non-empty string matches no variant.
pub fn parse_optional_enum<T: DeserializeOwned>(s: Option<&str>) -> Result<Option<T>, DatabaseError> {
    match s {
        Some(s) if !s.is_empty() => Ok(Some(parse_enum(s)?)),
        _ => Ok(None),
    }
}

/// Read a nullable TEXT column. Returns `None` for both SQL NULL and empty string.
///
/// `row.get::<String>(idx)` on a NULL column returns an error, not `""`.
/// You must use `get::<Option<String>>()` for nullable columns.
///
/// # Errors
///
/// Returns `DatabaseError` if the column read fails.
pub fn get_opt_string(row: &libsql::Row, idx: i32) -> Result<Option<String>, DatabaseError> {
    match row.get::<Option<String>>(idx)? {
        Some(s) if s.is_empty() => Ok(None),
        other => Ok(other),
    }
}

/// Step to the first row of an `INSERT ... RETURNING`.
///
/// libSQL reports UNIQUE and FOREIGN KEY failures when the statement is
/// stepped, not when it is prepared, so `on_error` has to see errors from
/// `next()` as well as from `query()`.
///
/// # Errors
///
/// Returns `on_error` applied to a step failure, or `DatabaseError::NoResult`
/// when the statement produced no row.
pub async fn first_row(
    rows: &mut libsql::Rows,
    on_error: impl FnOnce(DatabaseError) -> DatabaseError,
) -> Result<libsql::Row, DatabaseError> {
    match rows.next().await {
        Ok(Some(row)) => Ok(row),
        Ok(None) => Err(DatabaseError::NoResult),
        Err(e) => Err(on_error(DatabaseError::from(e))),
    }
}

/// Parse a JSON TEXT column.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the column contains invalid JSON for `T`.
pub fn parse_json<T: DeserializeOwned>(s: &str) -> Result<T, DatabaseError> {
    serde_json::from_str(s).map_err(|e| DatabaseError::Query(format!("Invalid JSON in column: {e}")))
}

/// Serialize a value for a JSON TEXT column.
///
/// # Errors
///
/// Returns `DatabaseError::Other` if serialization fails.
pub fn to_json<T: serde::Serialize>(value: &T) -> Result<String, DatabaseError> {
    serde_json::to_string(value).map_err(|e| DatabaseError::Other(e.into()))
}

/// Drain a result set through a row parser.
///
/// # Errors
///
/// Returns the first row-fetch or parse error.
pub async fn collect_rows<T>(
    mut rows: libsql::Rows,
    parse: impl Fn(&libsql::Row) -> Result<T, DatabaseError>,
) -> Result<Vec<T>, DatabaseError> {
    let mut out = Vec::new();
    while let Some(row) = rows.next().await? {
        out.push(parse(&row)?);
    }
    Ok(out)
}

/// Builds the `SET` list of a dynamic `UPDATE` with positional parameters.
///
/// Only fields that were pushed produce SQL, so `Option` fields of an update
/// struct map directly onto calls.
#[derive(Debug, Default)]
pub struct SetClause {
    sets: Vec<String>,
    params: Vec<libsql::Value>,
}

impl SetClause {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, column: &str, value: impl Into<libsql::Value>) {
        self.params.push(value.into());
        self.sets.push(format!("{column} = ?{}", self.params.len()));
    }

    /// Push a nullable column; `None` writes SQL NULL.
    pub fn push_nullable<T: Into<libsql::Value>>(&mut self, column: &str, value: Option<T>) {
        self.push(column, value.map_or(libsql::Value::Null, Into::into));
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Finish as `UPDATE {table} SET ... WHERE id = ?n`.
    #[must_use]
    pub fn into_update(mut self, table: &str, id: i64) -> (String, Vec<libsql::Value>) {
        self.params.push(id.into());
        let sql = format!(
            "UPDATE {table} SET {} WHERE id = ?{}",
            self.sets.join(", "),
            self.params.len()
        );
        (sql, self.params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lms_core::enums::CourseStatus;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_both_datetime_formats() {
        let rfc = parse_datetime("2026-02-09T14:30:00+00:00").unwrap();
        let sqlite = parse_datetime("2026-02-09 14:30:00").unwrap();
        assert_eq!(rfc, sqlite);
        assert!(parse_datetime("yesterday").is_err());
    }

    #[test]
    fn empty_optional_values_are_none() {
        assert_eq!(parse_optional_datetime(Some("")).unwrap(), None);
        assert_eq!(parse_optional_enum::<CourseStatus>(None).unwrap(), None);
        assert_eq!(
            parse_optional_enum::<CourseStatus>(Some("pending")).unwrap(),
            Some(CourseStatus::Pending)
        );
    }

    #[test]
    fn set_clause_numbers_params_in_order() {
        let mut set = SetClause::new();
        assert!(set.is_empty());
        set.push("title", "New");
        set.push_nullable::<String>("thumbnail", None);
        let (sql, params) = set.into_update("courses", 9);

        assert_eq!(sql, "UPDATE courses SET title = ?1, thumbnail = ?2 WHERE id = ?3");
        assert_eq!(params.len(), 3);
        assert!(matches!(params[1], libsql::Value::Null));
        assert!(matches!(params[2], libsql::Value::Integer(9)));
    }
}
