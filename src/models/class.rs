use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::validation::{bounded_integer, bounded_text, collect_errors, ValidationError};

const MAX_CLASS_NAME_LEN: usize = 35;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Class {
    pub id: i32,
    pub name: String,
    pub prize_money: i32,
}

/// Validated class name (1-35 characters, trimmed)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassName(String);

impl ClassName {
    pub fn new(raw: &str) -> Result<Self, ValidationError> {
        bounded_text(raw, "class name", MAX_CLASS_NAME_LEN).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Validated prize money: a whole, non-negative amount with no dollar sign
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrizeMoney(i32);

impl PrizeMoney {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        bounded_integer(raw, "prize money", 0, i32::MAX as i64).map(|v| Self(v as i32))
    }

    pub fn value(self) -> i32 {
        self.0
    }
}

/// Submitted add/modify class form
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ClassForm {
    pub class_name: String,
    pub prize_money: String,
}

impl ClassForm {
    /// Validate every field, reporting all failures at once.
    pub fn validate(&self) -> Result<(ClassName, PrizeMoney), Vec<ValidationError>> {
        match (ClassName::new(&self.class_name), PrizeMoney::parse(&self.prize_money)) {
            (Ok(name), Ok(prize)) => Ok((name, prize)),
            (name, prize) => Err(collect_errors([name.err(), prize.err()])),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_name_limits() {
        assert!(ClassName::new("Hunter Classic").is_ok());
        assert!(ClassName::new(&"a".repeat(35)).is_ok());
        assert!(matches!(
            ClassName::new(&"a".repeat(36)).unwrap_err(),
            ValidationError::TooLong { max: 35, .. }
        ));
        assert!(matches!(
            ClassName::new("").unwrap_err(),
            ValidationError::Empty { .. }
        ));
    }

    #[test]
    fn prize_money_is_non_negative_integer() {
        assert_eq!(PrizeMoney::parse("500").unwrap().value(), 500);
        assert_eq!(PrizeMoney::parse("0").unwrap().value(), 0);
        assert!(matches!(
            PrizeMoney::parse("-1").unwrap_err(),
            ValidationError::OutOfRange { .. }
        ));
        assert!(matches!(
            PrizeMoney::parse("$500").unwrap_err(),
            ValidationError::NotInteger { .. }
        ));
    }

    #[test]
    fn form_reports_every_failure() {
        let form = ClassForm {
            class_name: " ".into(),
            prize_money: "lots".into(),
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn missing_field_reads_as_blank() {
        let form: ClassForm = serde_json::from_str(r#"{"class_name":"Hunter Classic"}"#).unwrap();
        assert_eq!(
            form.validate().unwrap_err(),
            vec![ValidationError::Empty { field: "prize money" }]
        );
    }

    #[test]
    fn form_trims_name() {
        let form = ClassForm {
            class_name: "  Green Hunters ".into(),
            prize_money: "100".into(),
        };
        let (name, prize) = form.validate().unwrap();
        assert_eq!(name.as_str(), "Green Hunters");
        assert_eq!(prize.value(), 100);
    }
}
