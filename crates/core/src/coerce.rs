//! Numeric coercion for form-style inputs.
//!
//! Forms and spreadsheet imports send numbers as strings (`"1,250.500"`,
//! `" 42 "`). The helpers here turn those into `f64` / `i32` or report a
//! validation message; they never guess on non-numeric text.

use serde_json::Value;

/// Interpret a JSON value as a number.
///
/// - numbers pass through (must be finite)
/// - strings are trimmed, thousands separators (`,`) removed, then parsed
/// - `null` and empty strings mean "no value"
/// - anything else is an error
pub fn number(value: &Value) -> Result<Option<f64>, String> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .as_f64()
            .filter(|f| f.is_finite())
            .map(Some)
            .ok_or_else(|| format!("{n} is not a finite number")),
        Value::String(s) => {
            let cleaned: String = s.trim().chars().filter(|c| *c != ',').collect();
            if cleaned.is_empty() {
                return Ok(None);
            }
            cleaned
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .map(Some)
                .ok_or_else(|| format!("'{s}' is not a number"))
        }
        other => Err(format!("{other} is not a number")),
    }
}

/// Interpret a JSON value as a whole number fitting in `i32`.
///
/// `"45"` and `45.0` are accepted; `45.5` is rejected rather than rounded.
pub fn integer(value: &Value) -> Result<Option<i32>, String> {
    match number(value)? {
        None => Ok(None),
        Some(f) if f.fract() != 0.0 => Err(format!("{f} is not a whole number")),
        Some(f) if f < i32::MIN as f64 || f > i32::MAX as f64 => {
            Err(format!("{f} is out of range"))
        }
        Some(f) => Ok(Some(f as i32)),
    }
}

/// `deserialize_with` adapter for `Option<f64>` fields.
pub mod loose_f64 {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        super::number(&value).map_err(D::Error::custom)
    }
}

/// `deserialize_with` adapter for `Option<i32>` fields.
pub mod loose_i32 {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        super::integer(&value).map_err(D::Error::custom)
    }
}

/// `deserialize_with` adapter for nullable `Option<Option<f64>>` update
/// fields. Pair with `#[serde(default)]`; `null` and `""` both clear.
pub mod loose_f64_patch {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Option<f64>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        super::number(&value).map(Some).map_err(D::Error::custom)
    }
}
