//! Update payloads that tell an absent field from an explicit `null`.
//!
//! Fields are typed `Option<Option<T>>` and tagged
//! `#[serde(default, deserialize_with = "nullable")]`:
//!
//! | JSON            | Value              | Meaning          |
//! |-----------------|--------------------|------------------|
//! | field missing   | `None`             | leave unchanged  |
//! | `null`          | `Some(None)`       | clear the column |
//! | a value         | `Some(Some(v))`    | set the column   |

use serde::{Deserialize, Deserializer};

/// `deserialize_with` target for `Option<Option<T>>` fields.
pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// The value to write, if any, for a field that is being set or cleared.
pub fn value<T>(field: &Option<Option<T>>) -> Option<&T> {
    field.as_ref().and_then(Option::as_ref)
}

/// `true` when the field is being cleared.
pub fn is_cleared<T>(field: &Option<Option<T>>) -> bool {
    matches!(field, Some(None))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "nullable")]
        note: Option<Option<String>>,
    }

    #[test]
    fn absent_null_and_value_are_distinct() {
        let absent: Patch = serde_json::from_value(json!({})).unwrap();
        assert_eq!(absent.note, None);
        assert!(!is_cleared(&absent.note));

        let cleared: Patch = serde_json::from_value(json!({ "note": null })).unwrap();
        assert_eq!(cleared.note, Some(None));
        assert!(is_cleared(&cleared.note));
        assert_eq!(value(&cleared.note), None);

        let set: Patch = serde_json::from_value(json!({ "note": "hi" })).unwrap();
        assert_eq!(value(&set.note).map(String::as_str), Some("hi"));
    }
}
