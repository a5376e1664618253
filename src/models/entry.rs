use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::validation::{bounded_integer, bounded_text, collect_errors, ValidationError};

const MAX_HORSE_NAME_LEN: usize = 20;
const MAX_RIDER_NAME_LEN: usize = 30;
const MAX_HORSE_NUMBER: i64 = 999;

/// A horse/rider pair entered into a class.
///
/// `horse_id` is the horse's back number, not a foreign key.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Entry {
    pub id: i32,
    pub class_id: i32,
    pub horse_id: i32,
    pub horse_name: String,
    pub rider_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HorseNumber(i32);

impl HorseNumber {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        bounded_integer(raw, "horse number", 1, MAX_HORSE_NUMBER).map(|v| Self(v as i32))
    }

    pub fn value(self) -> i32 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HorseName(String);

impl HorseName {
    pub fn new(raw: &str) -> Result<Self, ValidationError> {
        bounded_text(raw, "horse name", MAX_HORSE_NAME_LEN).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiderName(String);

impl RiderName {
    pub fn new(raw: &str) -> Result<Self, ValidationError> {
        bounded_text(raw, "rider name", MAX_RIDER_NAME_LEN).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Submitted add-entry form
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewEntryForm {
    pub horse_number: String,
    pub horse_name: String,
    pub rider_name: String,
}

impl NewEntryForm {
    pub fn validate(&self) -> Result<(HorseNumber, HorseName, RiderName), Vec<ValidationError>> {
        match (
            HorseNumber::parse(&self.horse_number),
            HorseName::new(&self.horse_name),
            RiderName::new(&self.rider_name),
        ) {
            (Ok(number), Ok(horse), Ok(rider)) => Ok((number, horse, rider)),
            (number, horse, rider) => Err(collect_errors([number.err(), horse.err(), rider.err()])),
        }
    }
}

/// Submitted edit-entry form. The horse number cannot be changed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EditEntryForm {
    pub horse_name: String,
    pub rider_name: String,
}

impl EditEntryForm {
    pub fn validate(&self) -> Result<(HorseName, RiderName), Vec<ValidationError>> {
        match (HorseName::new(&self.horse_name), RiderName::new(&self.rider_name)) {
            (Ok(horse), Ok(rider)) => Ok((horse, rider)),
            (horse, rider) => Err(collect_errors([horse.err(), rider.err()])),
        }
    }
}
