// ABOUTME: Core library for petstore: schema contract, record types, routing, and validation.
// ABOUTME: Pure domain code with no storage dependency, shared by the store and the CLI.

pub mod contract;
pub mod model;
pub mod route;
pub mod validate;

pub use model::{Field, Gender, ParseGenderError, Pet, PetFields};
pub use route::{Route, RouteError, Router};
pub use validate::{Reason, UpdatePlan, ValidationError, validate_for_insert, validate_for_update};
