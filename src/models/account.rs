use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use super::validation::{bounded_text, collect_errors, ValidationError};

const MAX_EMAIL_LEN: usize = 100;

/// Longest password in bytes. bcrypt reads 72 bytes including a trailing NUL
/// and silently ignores the rest.
pub const MAX_PASSWORD_LENGTH: usize = 71;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("invalid email regex")
});

/// Validated account email, which doubles as the username
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email(String);

impl Email {
    pub fn new(raw: &str) -> Result<Self, ValidationError> {
        let email = bounded_text(raw, "email", MAX_EMAIL_LEN)?;
        if !EMAIL_RE.is_match(&email) {
            return Err(ValidationError::InvalidFormat {
                field: "email",
                reason: "must be an email address",
            });
        }
        Ok(Self(email))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A new password checked against its confirmation.
///
/// Passwords are not trimmed: sign-in compares them verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPassword(String);

impl NewPassword {
    pub fn confirm(password: &str, confirmation: &str) -> Result<Self, ValidationError> {
        if password.trim().is_empty() {
            return Err(ValidationError::Empty { field: "password" });
        }
        if password.len() > MAX_PASSWORD_LENGTH {
            return Err(ValidationError::TooLong {
                field: "password",
                max: MAX_PASSWORD_LENGTH,
            });
        }
        if password != confirmation {
            return Err(ValidationError::InvalidFormat {
                field: "password",
                reason: "passwords don't match",
            });
        }
        Ok(Self(password.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Submitted create-account form
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateAccountForm {
    pub username: String,
    pub password1: String,
    pub password2: String,
}

impl CreateAccountForm {
    pub fn validate(&self) -> Result<(Email, NewPassword), Vec<ValidationError>> {
        match (
            Email::new(&self.username),
            NewPassword::confirm(&self.password1, &self.password2),
        ) {
            (Ok(email), Ok(password)) => Ok((email, password)),
            (email, password) => Err(collect_errors([email.err(), password.err()])),
        }
    }
}

/// Submitted sign-in form
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SignInForm {
    pub username: String,
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_email() {
        let email = Email::new("  rider@example.com ").unwrap();
        assert_eq!(email.as_str(), "rider@example.com");
    }

    #[test]
    fn rejects_non_email() {
        assert!(matches!(
            Email::new("admin").unwrap_err(),
            ValidationError::InvalidFormat { .. }
        ));
        assert!(matches!(
            Email::new("a b@example.com").unwrap_err(),
            ValidationError::InvalidFormat { .. }
        ));
        assert!(matches!(
            Email::new("").unwrap_err(),
            ValidationError::Empty { .. }
        ));
    }

    #[test]
    fn rejects_long_email() {
        let long = format!("{}@example.com", "a".repeat(100));
        assert!(matches!(
            Email::new(&long).unwrap_err(),
            ValidationError::TooLong { max: 100, .. }
        ));
    }

    #[test]
    fn password_must_match_confirmation() {
        assert!(NewPassword::confirm("secret", "secret").is_ok());
        assert!(matches!(
            NewPassword::confirm("secret", "Secret").unwrap_err(),
            ValidationError::InvalidFormat { .. }
        ));
        assert!(matches!(
            NewPassword::confirm("  ", "  ").unwrap_err(),
            ValidationError::Empty { .. }
        ));
        let longest = "p".repeat(71);
        assert!(NewPassword::confirm(&longest, &longest).is_ok());
        let long = "p".repeat(72);
        assert!(matches!(
            NewPassword::confirm(&long, &long).unwrap_err(),
            ValidationError::TooLong { max: 71, .. }
        ));
    }

    #[test]
    fn password_kept_verbatim() {
        let password = NewPassword::confirm(" padded ", " padded ").unwrap();
        assert_eq!(password.as_str(), " padded ");
    }

    #[test]
    fn form_collects_errors() {
        let form = CreateAccountForm {
            username: "nope".into(),
            password1: "a".into(),
            password2: "b".into(),
        };
        assert_eq!(form.validate().unwrap_err().len(), 2);
    }
}
