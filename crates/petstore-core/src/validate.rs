// ABOUTME: Field-level checks applied to a PetFields set before any write reaches storage.
// ABOUTME: Insert requires a complete, valid record; update checks only the fields supplied.

use thiserror::Error;

use crate::model::{Field, Gender, PetFields};

/// Why a field was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Reason {
    #[error("is required")]
    Missing,
    #[error("must not be null")]
    Null,
    #[error("must not be empty")]
    Empty,
    #[error("must be 0 (unknown), 1 (male), or 2 (female), got {0}")]
    UnknownGender(i64),
    #[error("must be greater than 0, got {0}")]
    NotPositive(i64),
    #[error("must not be negative, got {0}")]
    Negative(i64),
}

/// A rejected mutation, naming the offending field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field} {reason}")]
pub struct ValidationError {
    pub field: Field,
    pub reason: Reason,
}

impl ValidationError {
    fn new(field: Field, reason: Reason) -> Self {
        Self { field, reason }
    }
}

/// What an update should do once its fields pass validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdatePlan {
    /// Nothing was supplied; report zero rows without touching storage.
    NoOp,
    Apply,
}

/// Check a field set for insertion. `name` must be non-empty, `gender` must be
/// a known code, and `weight` must be strictly positive. `breed` may be
/// absent, null, or empty.
pub fn validate_for_insert(fields: &PetFields) -> Result<(), ValidationError> {
    match &fields.name {
        None => return Err(ValidationError::new(Field::Name, Reason::Missing)),
        Some(None) => return Err(ValidationError::new(Field::Name, Reason::Null)),
        Some(Some(name)) if name.is_empty() => {
            return Err(ValidationError::new(Field::Name, Reason::Empty));
        }
        Some(Some(_)) => {}
    }

    match fields.gender {
        None => return Err(ValidationError::new(Field::Gender, Reason::Missing)),
        Some(code) => check_gender(code)?,
    }

    match fields.weight {
        None => return Err(ValidationError::new(Field::Weight, Reason::Missing)),
        Some(None) => return Err(ValidationError::new(Field::Weight, Reason::Null)),
        Some(Some(weight)) if weight <= 0 => {
            return Err(ValidationError::new(Field::Weight, Reason::NotPositive(weight)));
        }
        Some(Some(_)) => {}
    }

    Ok(())
}

/// Check only the fields present in an update. A present `name` must not be
/// null (an empty name is accepted here), a present `gender` must be a known
/// code, and a present `weight` must be zero or more.
pub fn validate_for_update(fields: &PetFields) -> Result<UpdatePlan, ValidationError> {
    if let Some(None) = fields.name {
        return Err(ValidationError::new(Field::Name, Reason::Null));
    }

    if let Some(code) = fields.gender {
        check_gender(code)?;
    }

    match fields.weight {
        Some(None) => return Err(ValidationError::new(Field::Weight, Reason::Null)),
        Some(Some(weight)) if weight < 0 => {
            return Err(ValidationError::new(Field::Weight, Reason::Negative(weight)));
        }
        _ => {}
    }

    if fields.is_empty() {
        return Ok(UpdatePlan::NoOp);
    }
    Ok(UpdatePlan::Apply)
}

fn check_gender(code: Option<i64>) -> Result<(), ValidationError> {
    match code {
        None => Err(ValidationError::new(Field::Gender, Reason::Null)),
        Some(code) if Gender::from_code(code).is_none() => {
            Err(ValidationError::new(Field::Gender, Reason::UnknownGender(code)))
        }
        Some(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> PetFields {
        PetFields::for_pet("Toto", Some("Terrier"), Gender::Male, 7)
    }

    fn insert_err(fields: PetFields) -> ValidationError {
        validate_for_insert(&fields).unwrap_err()
    }

    #[test]
    fn insert_accepts_complete_record() {
        assert!(validate_for_insert(&valid()).is_ok());
        assert!(validate_for_insert(&PetFields::for_pet("Rex", None, Gender::Unknown, 1)).is_ok());
        let mut no_breed = valid();
        no_breed.breed = None;
        assert!(validate_for_insert(&no_breed).is_ok());
        assert!(validate_for_insert(&valid().with_breed("")).is_ok());
    }

    #[test]
    fn insert_rejects_bad_name() {
        let mut missing = valid();
        missing.name = None;
        assert_eq!(insert_err(missing).reason, Reason::Missing);

        let err = insert_err(valid().with_null(Field::Name));
        assert_eq!(err.field, Field::Name);
        assert_eq!(err.reason, Reason::Null);

        assert_eq!(insert_err(valid().with_name("")).reason, Reason::Empty);
    }

    #[test]
    fn insert_rejects_bad_gender() {
        let err = insert_err(valid().with_gender_code(5));
        assert_eq!(err.field, Field::Gender);
        assert_eq!(err.reason, Reason::UnknownGender(5));

        assert_eq!(insert_err(valid().with_gender_code(-1)).field, Field::Gender);
        assert_eq!(
            insert_err(valid().with_null(Field::Gender)).reason,
            Reason::Null
        );

        let mut missing = valid();
        missing.gender = None;
        assert_eq!(insert_err(missing).reason, Reason::Missing);
    }

    #[test]
    fn insert_requires_positive_weight() {
        assert_eq!(
            insert_err(valid().with_weight(0)).reason,
            Reason::NotPositive(0)
        );
        assert_eq!(
            insert_err(valid().with_weight(-4)).reason,
            Reason::NotPositive(-4)
        );

        let mut missing = valid();
        missing.weight = None;
        assert_eq!(insert_err(missing).field, Field::Weight);

        let err = insert_err(valid().with_null(Field::Weight));
        assert_eq!(err.field, Field::Weight);
        assert_eq!(err.reason, Reason::Null);
    }

    #[test]
    fn update_rejects_null_gender_and_weight() {
        let err = validate_for_update(&PetFields::new().with_null(Field::Gender)).unwrap_err();
        assert_eq!(err.field, Field::Gender);
        assert_eq!(err.reason, Reason::Null);

        let err = validate_for_update(&PetFields::new().with_null(Field::Weight)).unwrap_err();
        assert_eq!(err.field, Field::Weight);
        assert_eq!(err.reason, Reason::Null);
    }

    #[test]
    fn update_of_empty_set_is_noop() {
        assert_eq!(validate_for_update(&PetFields::new()), Ok(UpdatePlan::NoOp));
    }

    #[test]
    fn update_checks_only_present_fields() {
        assert_eq!(
            validate_for_update(&PetFields::new().with_breed("Beagle")),
            Ok(UpdatePlan::Apply)
        );
        assert_eq!(
            validate_for_update(&PetFields::new().with_null(Field::Breed)),
            Ok(UpdatePlan::Apply)
        );
    }

    #[test]
    fn update_name_rejects_null_but_allows_empty() {
        let err = validate_for_update(&PetFields::new().with_null(Field::Name)).unwrap_err();
        assert_eq!(err.field, Field::Name);
        assert_eq!(
            validate_for_update(&PetFields::new().with_name("")),
            Ok(UpdatePlan::Apply)
        );
    }

    #[test]
    fn update_weight_allows_zero_but_not_negative() {
        assert_eq!(
            validate_for_update(&PetFields::new().with_weight(0)),
            Ok(UpdatePlan::Apply)
        );
        let err = validate_for_update(&PetFields::new().with_weight(-1)).unwrap_err();
        assert_eq!(err.field, Field::Weight);
        assert_eq!(err.reason, Reason::Negative(-1));
    }

    #[test]
    fn update_rejects_unknown_gender() {
        let err = validate_for_update(&PetFields::new().with_gender_code(3)).unwrap_err();
        assert_eq!(err.reason, Reason::UnknownGender(3));
    }

    #[test]
    fn error_message_names_field() {
        let err = insert_err(valid().with_weight(0));
        assert_eq!(err.to_string(), "weight must be greater than 0, got 0");
    }
}
