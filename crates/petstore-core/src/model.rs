// ABOUTME: Defines the Pet record, the Gender enumeration, and the PetFields mutation set.
// ABOUTME: PetFields distinguishes absent fields from fields supplied as null at the type level.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::contract::{COLUMN_BREED, COLUMN_GENDER, COLUMN_NAME, COLUMN_WEIGHT};

/// Gender of a pet. The integer codes are part of the storage contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    #[default]
    Unknown = 0,
    Male = 1,
    Female = 2,
}

impl Gender {
    pub fn code(self) -> i64 {
        self as i64
    }

    /// Map a stored code back to a gender. Returns `None` for codes outside 0..=2.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Gender::Unknown),
            1 => Some(Gender::Male),
            2 => Some(Gender::Female),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Unknown => "unknown",
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown gender '{0}', expected unknown, male, female, or 0-2")]
pub struct ParseGenderError(String);

impl FromStr for Gender {
    type Err = ParseGenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "unknown" | "0" => Ok(Gender::Unknown),
            "male" | "1" => Ok(Gender::Male),
            "female" | "2" => Ok(Gender::Female),
            other => Err(ParseGenderError(other.to_string())),
        }
    }
}

/// A stored pet record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pet {
    pub id: i64,
    pub name: String,
    pub breed: Option<String>,
    pub gender: Gender,
    pub weight: i64,
}

/// A field of the record a caller may supply in a mutation. `_id` is never
/// caller-supplied so it has no variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Breed,
    Gender,
    Weight,
}

impl Field {
    pub fn column(self) -> &'static str {
        match self {
            Field::Name => COLUMN_NAME,
            Field::Breed => COLUMN_BREED,
            Field::Gender => COLUMN_GENDER,
            Field::Weight => COLUMN_WEIGHT,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// The set of fields supplied to an insert or update.
///
/// Each field is tri-state: `None` means the caller did not supply it,
/// `Some(None)` means it was supplied as null, and `Some(Some(v))` carries a
/// value. `gender` holds the raw code so out-of-range values reach validation
/// instead of being lost in a conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PetFields {
    pub name: Option<Option<String>>,
    pub breed: Option<Option<String>>,
    pub gender: Option<Option<i64>>,
    pub weight: Option<Option<i64>>,
}

impl PetFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// A complete field set for a new pet.
    pub fn for_pet(name: &str, breed: Option<&str>, gender: Gender, weight: i64) -> Self {
        Self {
            name: Some(Some(name.to_string())),
            breed: Some(breed.map(str::to_string)),
            gender: Some(Some(gender.code())),
            weight: Some(Some(weight)),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(Some(name.into()));
        self
    }

    pub fn with_breed(mut self, breed: impl Into<String>) -> Self {
        self.breed = Some(Some(breed.into()));
        self
    }

    pub fn with_gender(self, gender: Gender) -> Self {
        self.with_gender_code(gender.code())
    }

    /// Supply a raw gender code, valid or not.
    pub fn with_gender_code(mut self, code: i64) -> Self {
        self.gender = Some(Some(code));
        self
    }

    pub fn with_weight(mut self, weight: i64) -> Self {
        self.weight = Some(Some(weight));
        self
    }

    /// Mark a field as supplied with a null value.
    pub fn with_null(mut self, field: Field) -> Self {
        match field {
            Field::Name => self.name = Some(None),
            Field::Breed => self.breed = Some(None),
            Field::Gender => self.gender = Some(None),
            Field::Weight => self.weight = Some(None),
        }
        self
    }

    /// Whether the caller supplied this field at all, null or not.
    pub fn is_present(&self, field: Field) -> bool {
        match field {
            Field::Name => self.name.is_some(),
            Field::Breed => self.breed.is_some(),
            Field::Gender => self.gender.is_some(),
            Field::Weight => self.weight.is_some(),
        }
    }

    /// Supplied fields in column order.
    pub fn present(&self) -> Vec<Field> {
        [Field::Name, Field::Breed, Field::Gender, Field::Weight]
            .into_iter()
            .filter(|field| self.is_present(*field))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.present().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
