//! Terminal validation pass over the fully-bound value.
//!
//! Responsibilities:
//! - Run the target's `validator::Validate` rules once, after defaults and
//!   environment binding succeeded.
//! - Flatten nested `ValidationErrors` into a flat, ordered list of
//!   field-level violations.
//!
//! Does NOT handle:
//! - Defining validation rules; targets declare them with
//!   `#[derive(Validate)]` attributes.
//! - Retrying or partial validation; one pass, all violations collected.

use std::fmt;

use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use crate::loader::LoadError;

/// One field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Dotted path to the offending field, with `[i]` for list entries.
    pub field: String,
    /// The rule that failed (e.g. `email`, `range`).
    pub code: String,
    /// Optional human message declared on the rule.
    pub message: Option<String>,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{}: {} ({})", self.field, self.code, message),
            None => write!(f, "{}: {}", self.field, self.code),
        }
    }
}

/// All violations from one validation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Violations(pub Vec<Violation>);

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} violation(s)", self.0.len())?;
        for violation in &self.0 {
            write!(f, "; {violation}")?;
        }
        Ok(())
    }
}

/// Validate the bound value, folding any failures into a single error.
pub(crate) fn check<T: Validate>(value: &T) -> Result<(), LoadError> {
    value.validate().map_err(|errors| {
        let mut violations = Vec::new();
        collect(&errors, "", &mut violations);
        violations.sort_by(|a, b| a.field.cmp(&b.field).then_with(|| a.code.cmp(&b.code)));
        LoadError::Validation(Violations(violations))
    })
}

fn collect(errors: &ValidationErrors, prefix: &str, out: &mut Vec<Violation>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            (*field).to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for error in field_errors {
                    out.push(Violation {
                        field: path.clone(),
                        code: error.code.to_string(),
                        message: error.message.as_ref().map(|m| m.to_string()),
                    });
                }
            }
            ValidationErrorsKind::Struct(nested) => collect(nested, &path, out),
            ValidationErrorsKind::List(entries) => {
                for (index, nested) in entries {
                    collect(nested, &format!("{path}[{index}]"), out);
                }
            }
        }
    }
}
