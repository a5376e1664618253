//! Validation error types and the field checks shared by the form models

/// Validation error for submitted form fields
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Field is empty after trimming
    #[error("{field} is required")]
    Empty { field: &'static str },

    /// Field exceeds maximum length
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    /// Field is not a whole number
    #[error("{field} must be an integer amount")]
    NotInteger { field: &'static str },

    /// Whole number outside the accepted range
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: &'static str, min: i64, max: i64 },

    /// String doesn't match required format (e.g., email)
    #[error("{field}: {reason}")]
    InvalidFormat { field: &'static str, reason: &'static str },

    /// Request body could not be read as the expected JSON form
    #[error("invalid request body: {reason}")]
    MalformedBody { reason: String },
}

/// Trim `raw` and check it holds between 1 and `max` characters.
pub(crate) fn bounded_text(
    raw: &str,
    field: &'static str,
    max: usize,
) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    if trimmed.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(trimmed.to_owned())
}

/// Trim `raw` and parse it as a whole number within `min..=max`.
pub(crate) fn bounded_integer(
    raw: &str,
    field: &'static str,
    min: i64,
    max: i64,
) -> Result<i64, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    let value: i64 = trimmed
        .parse()
        .map_err(|_| ValidationError::NotInteger { field })?;
    if value < min || value > max {
        return Err(ValidationError::OutOfRange { field, min, max });
    }
    Ok(value)
}

/// Collect the errors of independently validated fields.
pub(crate) fn collect_errors<const N: usize>(
    errors: [Option<ValidationError>; N],
) -> Vec<ValidationError> {
    errors.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ValidationError::TooLong {
            field: "class name",
            max: 35,
        };
        assert_eq!(err.to_string(), "class name must be at most 35 characters");
    }

    #[test]
    fn bounded_text_trims() {
        assert_eq!(bounded_text("  Clover ", "horse name", 20).unwrap(), "Clover");
        assert_eq!(
            bounded_text("   ", "horse name", 20).unwrap_err(),
            ValidationError::Empty { field: "horse name" }
        );
    }

    #[test]
    fn bounded_text_counts_characters_not_bytes() {
        // 5 characters, 10 bytes
        assert!(bounded_text("ééééé", "name", 5).is_ok());
        assert!(bounded_text("éééééé", "name", 5).is_err());
    }

    #[test]
    fn bounded_integer_rejects_non_numbers() {
        assert_eq!(
            bounded_integer("12a", "prize money", 0, 100).unwrap_err(),
            ValidationError::NotInteger { field: "prize money" }
        );
        assert_eq!(
            bounded_integer("5.5", "prize money", 0, 100).unwrap_err(),
            ValidationError::NotInteger { field: "prize money" }
        );
        assert_eq!(bounded_integer(" 42 ", "prize money", 0, 100).unwrap(), 42);
    }

    #[test]
    fn collects_only_failures() {
        let errors = collect_errors([
            None,
            Some(ValidationError::Empty { field: "a" }),
            None,
        ]);
        assert_eq!(errors, vec![ValidationError::Empty { field: "a" }]);
    }
}
