//! Field-level input validation shared by single-record handlers and bulk import.

use validator::ValidateEmail;

/// Maximum length of a project title.
pub const MAX_TITLE_LENGTH: usize = 200;

/// Maximum length of a person or department name.
pub const MAX_NAME_LENGTH: usize = 120;

/// Maximum length of a log note.
pub const MAX_NOTE_LENGTH: usize = 5_000;

/// A validation failure on a single named field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// A required text field must be present, non-blank, and within `max` characters.
pub fn require_text(field: &'static str, value: &str, max: usize) -> Result<(), FieldError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FieldError::new(field, "is required"));
    }
    if trimmed.chars().count() > max {
        return Err(FieldError::new(
            field,
            format!("must be at most {max} characters"),
        ));
    }
    Ok(())
}

pub fn validate_title(title: &str) -> Result<(), FieldError> {
    require_text("title", title, MAX_TITLE_LENGTH)
}

/// Completion percentage must lie in `0..=100`.
pub fn validate_percentage(percentage: i32) -> Result<(), FieldError> {
    if (0..=100).contains(&percentage) {
        Ok(())
    } else {
        Err(FieldError::new(
            "percentage",
            format!("must be between 0 and 100, got {percentage}"),
        ))
    }
}

/// Monetary amounts (budget, award) must be finite and non-negative.
pub fn validate_amount(field: &'static str, amount: f64) -> Result<(), FieldError> {
    if !amount.is_finite() {
        return Err(FieldError::new(field, "must be a finite number"));
    }
    if amount < 0.0 {
        return Err(FieldError::new(field, "must not be negative"));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), FieldError> {
    if email.trim().validate_email() {
        Ok(())
    } else {
        Err(FieldError::new("email", format!("'{email}' is not a valid email address")))
    }
}

/// Emails are compared case-insensitively; store them trimmed and lower-cased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn validate_note(note: &str) -> Result<(), FieldError> {
    require_text("note", note, MAX_NOTE_LENGTH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_title_is_rejected() {
        let err = validate_title("   ").unwrap_err();
        assert_eq!(err.field, "title");
        assert_eq!(err.to_string(), "title: is required");
    }

    #[test]
    fn long_title_is_rejected() {
        let long = "x".repeat(MAX_TITLE_LENGTH + 1);
        assert!(validate_title(&long).is_err());
        assert!(validate_title(&"x".repeat(MAX_TITLE_LENGTH)).is_ok());
    }

    #[test]
    fn percentage_bounds() {
        assert!(validate_percentage(0).is_ok());
        assert!(validate_percentage(100).is_ok());
        assert!(validate_percentage(-1).is_err());
        assert!(validate_percentage(101).is_err());
    }

    #[test]
    fn amounts_must_be_non_negative() {
        assert!(validate_amount("budget", 0.0).is_ok());
        assert!(validate_amount("budget", 12.5).is_ok());
        assert!(validate_amount("budget", -0.01).is_err());
        assert!(validate_amount("budget", f64::NAN).is_err());
    }

    #[test]
    fn email_validation() {
        assert!(validate_email("ahmed@example.om").is_ok());
        assert!(validate_email("not-an-email").is_err());
        assert_eq!(normalize_email("  Ahmed@Example.OM "), "ahmed@example.om");
    }
}
