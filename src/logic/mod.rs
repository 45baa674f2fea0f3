pub mod todos;
pub mod validate;

pub use validate::{FieldError, Rules, Validate, ValidationErrors, Validator};
