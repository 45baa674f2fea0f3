use std::fmt;

/// A single failed rule on a single field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub type_name: &'static str,
    pub field: &'static str,
    pub rule: &'static str,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Key: '{}.{}' Error:Field validation for '{}' failed on the '{}' tag",
            self.type_name, self.field, self.field, self.rule
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Rule collector handed to [`Validate::validate`].
#[derive(Debug)]
pub struct Rules {
    type_name: &'static str,
    errors: Vec<FieldError>,
}

impl Rules {
    fn new(type_name: &'static str) -> Self {
        Self {
            type_name,
            errors: Vec::new(),
        }
    }

    fn fail(&mut self, field: &'static str, rule: &'static str) {
        self.errors.push(FieldError {
            type_name: self.type_name,
            field,
            rule,
        });
    }

    /// At most `max` characters.
    pub fn max_len(&mut self, field: &'static str, value: &str, max: usize) -> &mut Self {
        if value.chars().count() > max {
            self.fail(field, "max");
        }
        self
    }

    fn finish(self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(self.errors))
        }
    }
}

/// Declarative validation rules for a request type.
pub trait Validate {
    fn validate(&self, rules: &mut Rules);
}

/// Stateless validation engine, shared by every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct Validator;

impl Validator {
    pub fn validate<T: Validate>(&self, value: &T) -> Result<(), ValidationErrors> {
        let mut rules = Rules::new(short_type_name::<T>());
        value.validate(&mut rules);
        rules.finish()
    }
}

fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    let path = full.split('<').next().unwrap_or(full);
    path.rsplit("::").next().unwrap_or(path)
}
