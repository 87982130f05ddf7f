//! Declarative field validation.
//!
//! A request shape implements [`Validate`] by exposing a static rule table and a way to
//! read each field. [`validate`] walks the table and collects one message per failing
//! field; it never stops at the first bad field.
//!
//! ```text
//!   shape ──► rules() ──► [(field, [Rule, ...]), ...]
//!     │                          │
//!     └──► field(name) ──► FieldValue ──► first failing Rule ──► details[field]
//! ```

pub mod rules;

use crate::error::{AppError, ErrorDetails};

pub use rules::Rule;

/// Field name → violation message, ordered by field name.
pub type FieldViolations = ErrorDetails;

/// The value of a single field as seen by the validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    /// Omitted, or left at its zero value
    Absent,
    /// Present string value (possibly empty when explicitly supplied)
    Text(&'a str),
}

impl<'a> FieldValue<'a> {
    /// Zero-valued strings count as absent.
    pub fn from_value(value: &'a str) -> Self {
        if value.is_empty() {
            FieldValue::Absent
        } else {
            FieldValue::Text(value)
        }
    }

    /// `None` is absent; `Some("")` was supplied explicitly and is present.
    pub fn from_option(value: Option<&'a str>) -> Self {
        match value {
            Some(v) => FieldValue::Text(v),
            None => FieldValue::Absent,
        }
    }
}

/// Constraints declared for one field.
#[derive(Debug, Clone, Copy)]
pub struct FieldRules {
    /// Lower-cased field name, used as the details key
    pub field: &'static str,
    /// Rules in evaluation order
    pub rules: &'static [Rule],
}

impl FieldRules {
    /// # Panics
    ///
    /// Panics (at compile time for `const` tables) when `rules` is not in evaluation order.
    pub const fn new(field: &'static str, rules: &'static [Rule]) -> Self {
        let mut i = 1;
        while i < rules.len() {
            if rules[i - 1].rank() > rules[i].rank() {
                panic!("validation rules must follow evaluation order");
            }
            i += 1;
        }
        Self { field, rules }
    }

    fn is_required(&self) -> bool {
        self.rules.contains(&Rule::Required)
    }

    /// First violation for this field, if any.
    fn evaluate(&self, value: FieldValue<'_>) -> Option<String> {
        match value {
            FieldValue::Absent if self.is_required() => Some(rules::required_message()),
            FieldValue::Absent => None,
            FieldValue::Text(text) => self.rules.iter().find_map(|rule| rule.check(text).err()),
        }
    }
}

/// A request shape with a declarative rule table.
pub trait Validate {
    /// The rule table bound to this shape.
    fn rules() -> &'static [FieldRules];

    /// Read a field by its rule-table name.
    fn field(&self, name: &str) -> FieldValue<'_>;
}

/// Evaluate every declared field of `input`.
///
/// # Errors
///
/// Returns every failing field with a single message each.
pub fn validate<T: Validate>(input: &T) -> Result<(), FieldViolations> {
    let violations: FieldViolations = T::rules()
        .iter()
        .filter_map(|field_rules| {
            field_rules
                .evaluate(input.field(field_rules.field))
                .map(|message| (field_rules.field.to_lowercase(), message))
        })
        .collect();

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

/// Validate and lift violations into the canonical "validation failed" error.
///
/// # Errors
///
/// Returns `AppError::validation_failed()` carrying the violations as details.
pub fn validate_request<T: Validate>(input: &T) -> Result<(), AppError> {
    validate(input).map_err(|violations| AppError::validation_failed().with_details(violations))
}
