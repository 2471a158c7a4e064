//! Project change-log building (the pure half of the change-log recorder).
//!
//! Handlers never hand raw JSON to the log table. A [`LogDraft`] is built
//! here from the before/after project snapshots, with every from/to value
//! already classified into a [`ChangeValue`] so the display path never has
//! to re-sniff shapes. `pmo_db::repositories::ProjectLogRepo` persists the
//! draft together with the acting user.
//!
//! Which project fields are worth logging is declared once, in
//! [`PROJECT_FIELDS`].

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::coerce;
use crate::timestamp;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// Kind of change a log entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogAction {
    StatusChange,
    SubstatusChange,
    ProjectCreated,
    ProjectUpdated,
    NoteAdded,
}

impl LogAction {
    pub const ALL: [LogAction; 5] = [
        LogAction::StatusChange,
        LogAction::SubstatusChange,
        LogAction::ProjectCreated,
        LogAction::ProjectUpdated,
        LogAction::NoteAdded,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::StatusChange => "STATUS_CHANGE",
            Self::SubstatusChange => "SUBSTATUS_CHANGE",
            Self::ProjectCreated => "PROJECT_CREATED",
            Self::ProjectUpdated => "PROJECT_UPDATED",
            Self::NoteAdded => "NOTE_ADDED",
        }
    }
}

impl fmt::Display for LogAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LogAction::ALL
            .into_iter()
            .find(|a| a.as_str() == s.trim())
            .ok_or_else(|| {
                let valid: Vec<&str> = LogAction::ALL.iter().map(|a| a.as_str()).collect();
                format!("Invalid log action '{s}'. Must be one of: {}", valid.join(", "))
            })
    }
}

// ---------------------------------------------------------------------------
// Change values
// ---------------------------------------------------------------------------

/// One side of a recorded field change, classified when the log is written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ChangeValue {
    Null,
    Text(String),
    Number(f64),
    Bool(bool),
    /// Epoch milliseconds, UTC.
    Date(i64),
    /// A value that matched no known shape, kept as its JSON text.
    Unknown(String),
}

impl ChangeValue {
    /// Classify an arbitrary JSON value with no field context.
    ///
    /// Date-shaped objects (`{ seconds, nanoseconds }`) become [`ChangeValue::Date`];
    /// strings stay text even when they look like dates.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => n
                .as_f64()
                .map(Self::Number)
                .unwrap_or_else(|| Self::Unknown(n.to_string())),
            Value::String(s) => Self::Text(s.clone()),
            Value::Object(_) => match timestamp::normalize(value) {
                Some(ts) => Self::Date(ts.timestamp_millis()),
                None => Self::Unknown(value.to_string()),
            },
            Value::Array(_) => Self::Unknown(value.to_string()),
        }
    }

    /// Classify a value using the declared kind of the field it came from.
    pub fn for_field(kind: FieldKind, value: &Value) -> Self {
        if value.is_null() {
            return Self::Null;
        }
        match kind {
            FieldKind::Text => match value {
                Value::String(s) if s.is_empty() => Self::Null,
                Value::String(s) => Self::Text(s.clone()),
                Value::Number(n) => Self::Text(n.to_string()),
                Value::Bool(b) => Self::Text(b.to_string()),
                other => Self::Unknown(other.to_string()),
            },
            FieldKind::Number => match coerce::number(value) {
                Ok(Some(n)) => Self::Number(n),
                Ok(None) => Self::Null,
                Err(_) => Self::Unknown(value.to_string()),
            },
            FieldKind::Bool => match value {
                Value::Bool(b) => Self::Bool(*b),
                other => Self::Unknown(other.to_string()),
            },
            FieldKind::Date => match timestamp::normalize(value) {
                Some(ts) => Self::Date(ts.timestamp_millis()),
                None => match value {
                    Value::String(s) if s.trim().is_empty() => Self::Null,
                    other => Self::Unknown(other.to_string()),
                },
            },
        }
    }
}

impl fmt::Display for ChangeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("none"),
            Self::Text(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Date(ms) => match chrono::DateTime::from_timestamp_millis(*ms) {
                Some(ts) => write!(f, "{}", ts.format("%Y-%m-%d")),
                None => write!(f, "{ms}"),
            },
            Self::Unknown(raw) => f.write_str(raw),
        }
    }
}

/// A single field's before/after pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    pub from: ChangeValue,
    pub to: ChangeValue,
}

/// Field name → change. Ordered so stored JSON is stable.
pub type Changes = BTreeMap<String, FieldChange>;

// ---------------------------------------------------------------------------
// Tracked-field schema
// ---------------------------------------------------------------------------

/// Value kind of a project field, used to classify its log values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    Bool,
    Date,
}

/// Declaration of one project field as seen by the change log.
#[derive(Debug, Clone, Copy)]
pub struct TrackedField {
    /// Wire (camelCase) name, matching the serialized project.
    pub name: &'static str,
    /// Human label used in log descriptions.
    pub label: &'static str,
    pub kind: FieldKind,
    /// Whether a difference in this field produces a `PROJECT_UPDATED` entry.
    pub loggable: bool,
}

const fn field(
    name: &'static str,
    label: &'static str,
    kind: FieldKind,
    loggable: bool,
) -> TrackedField {
    TrackedField {
        name,
        label,
        kind,
        loggable,
    }
}

/// Every project field the log knows about.
///
/// `status` and `subStatus` are not `loggable` here because they have their
/// own dedicated actions; see [`plan_update_log`].
pub const PROJECT_FIELDS: &[TrackedField] = &[
    field("title", "Title", FieldKind::Text, true),
    field("department", "Department", FieldKind::Text, true),
    field("status", "Status", FieldKind::Text, false),
    field("subStatus", "Sub-status", FieldKind::Text, false),
    field("percentage", "Percentage", FieldKind::Number, true),
    field("budget", "Budget", FieldKind::Number, true),
    field("awardAmount", "Award amount", FieldKind::Number, true),
    field("savingsOMR", "Savings (OMR)", FieldKind::Number, false),
    field("savingsPercentage", "Savings (%)", FieldKind::Number, false),
    field("opdFocal", "Focal person", FieldKind::Text, true),
    field("startDate", "Start date", FieldKind::Date, true),
    field("completionDate", "Completion date", FieldKind::Date, true),
    field("description", "Description", FieldKind::Text, false),
    field("isArchived", "Archived", FieldKind::Bool, false),
];

pub fn tracked_field(name: &str) -> Option<&'static TrackedField> {
    PROJECT_FIELDS.iter().find(|f| f.name == name)
}

fn field_value<'a>(snapshot: &'a Value, name: &str) -> &'a Value {
    snapshot.get(name).unwrap_or(&Value::Null)
}

fn classify(snapshot: &Value, f: &TrackedField) -> ChangeValue {
    ChangeValue::for_field(f.kind, field_value(snapshot, f.name))
}

/// Compare two serialized project snapshots over the loggable fields only.
pub fn diff_tracked(old: &Value, new: &Value) -> Changes {
    PROJECT_FIELDS
        .iter()
        .filter(|f| f.loggable)
        .filter_map(|f| {
            let from = classify(old, f);
            let to = classify(new, f);
            (from != to).then(|| (f.name.to_string(), FieldChange { from, to }))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Drafts
// ---------------------------------------------------------------------------

/// The user performing a mutation. Passed explicitly into every recorder call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: DbId,
    pub name: String,
}

/// A log entry ready to be persisted (everything except ids and timestamps).
#[derive(Debug, Clone, PartialEq)]
pub struct LogDraft {
    pub action: LogAction,
    pub description: String,
    pub changes: Changes,
    pub note: Option<String>,
}

impl LogDraft {
    pub fn status_change(old: &str, new: &str) -> Self {
        Self::single_field(
            LogAction::StatusChange,
            "status",
            format!("Status changed from \"{old}\" to \"{new}\""),
            text_or_null(old),
            text_or_null(new),
        )
    }

    pub fn substatus_change(old: &str, new: &str) -> Self {
        Self::single_field(
            LogAction::SubstatusChange,
            "subStatus",
            format!("Sub-status changed from \"{old}\" to \"{new}\""),
            text_or_null(old),
            text_or_null(new),
        )
    }

    pub fn created(title: &str) -> Self {
        Self {
            action: LogAction::ProjectCreated,
            description: format!("Project \"{title}\" was created"),
            changes: Changes::new(),
            note: None,
        }
    }

    /// A generic update over already-diffed significant fields.
    pub fn updated(changes: Changes) -> Self {
        let labels: Vec<&str> = PROJECT_FIELDS
            .iter()
            .filter(|f| changes.contains_key(f.name))
            .map(|f| f.label)
            .collect();
        let description = if labels.is_empty() {
            "Project updated".to_string()
        } else {
            format!("Updated {}", labels.join(", "))
        };
        Self {
            action: LogAction::ProjectUpdated,
            description,
            changes,
            note: None,
        }
    }

    pub fn note(text: &str) -> Self {
        Self {
            action: LogAction::NoteAdded,
            description: "Note added".to_string(),
            changes: Changes::new(),
            note: Some(text.to_string()),
        }
    }

    fn single_field(
        action: LogAction,
        key: &str,
        description: String,
        from: ChangeValue,
        to: ChangeValue,
    ) -> Self {
        let mut changes = Changes::new();
        changes.insert(key.to_string(), FieldChange { from, to });
        Self {
            action,
            description,
            changes,
            note: None,
        }
    }
}

fn text_or_null(s: &str) -> ChangeValue {
    if s.is_empty() {
        ChangeValue::Null
    } else {
        ChangeValue::Text(s.to_string())
    }
}

fn text_field(snapshot: &Value, name: &str) -> String {
    match field_value(snapshot, name) {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Decide the single log entry an update should produce.
///
/// Priority: status transition, then sub-status transition, then any
/// significant-field change. Returns `None` when nothing tracked changed.
pub fn plan_update_log(old: &Value, new: &Value) -> Option<LogDraft> {
    let (old_status, new_status) = (text_field(old, "status"), text_field(new, "status"));
    if old_status != new_status {
        return Some(LogDraft::status_change(&old_status, &new_status));
    }

    let (old_sub, new_sub) = (text_field(old, "subStatus"), text_field(new, "subStatus"));
    if old_sub != new_sub {
        return Some(LogDraft::substatus_change(&old_sub, &new_sub));
    }

    let changes = diff_tracked(old, new);
    (!changes.is_empty()).then(|| LogDraft::updated(changes))
}

/// Classify a caller-supplied `{ field: { from, to } }` object.
///
/// Known project fields use their declared kind; anything else falls back
/// to [`ChangeValue::from_json`]. Entries that are not `{ from, to }`
/// objects are rejected.
pub fn changes_from_json(value: &Value) -> Result<Changes, String> {
    let Value::Object(map) = value else {
        return Err("changes must be an object of { field: { from, to } }".to_string());
    };

    map.iter()
        .map(|(name, pair)| {
            let Value::Object(pair) = pair else {
                return Err(format!("changes.{name} must be an object with from/to"));
            };
            let from = pair.get("from").unwrap_or(&Value::Null);
            let to = pair.get("to").unwrap_or(&Value::Null);
            let classify = |v: &Value| match tracked_field(name) {
                Some(f) => ChangeValue::for_field(f.kind, v),
                None => ChangeValue::from_json(v),
            };
            Ok((
                name.clone(),
                FieldChange {
                    from: classify(from),
                    to: classify(to),
                },
            ))
        })
        .collect()
}
