//! Serde helpers for partial-update payloads.

use serde::{Deserialize, Deserializer};

/// Deserialize a field that distinguishes "absent" from "explicitly null".
///
/// Use with `#[serde(default, deserialize_with = "double_option")]` on an
/// `Option<Option<T>>` field: absent → `None`, `null` → `Some(None)`,
/// value → `Some(Some(v))`.
///
/// # Errors
///
/// Propagates the inner deserializer's error.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Default, Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "double_option")]
        thumbnail: Option<Option<String>>,
    }

    #[test]
    fn absent_null_and_value_are_distinct() {
        let absent: Patch = serde_json::from_str("{}").unwrap();
        let null: Patch = serde_json::from_str(r#"{"thumbnail": null}"#).unwrap();
        let value: Patch = serde_json::from_str(r#"{"thumbnail": "a.png"}"#).unwrap();

        assert_eq!(absent.thumbnail, None);
        assert_eq!(null.thumbnail, Some(None));
        assert_eq!(value.thumbnail, Some(Some("a.png".to_string())));
    }
}
