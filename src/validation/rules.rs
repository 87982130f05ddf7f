//! Individual validation rules.
//!
//! Each rule is a pure check over a present string value. Absence is decided by the
//! engine before any rule runs, so only [`Rule::Required`] ever sees an empty field.

use chrono::{DateTime, Timelike};

/// Datetime layout accepted by [`Rule::DateTime`], as shown to clients.
pub const DATETIME_LAYOUT: &str = "YYYY-MM-DDThh:mm:ssZ";

/// A single declarative constraint on a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Field must be present and non-empty
    Required,
    /// Minimum length in characters
    Min(usize),
    /// Maximum length in characters
    Max(usize),
    /// Value must be one of the listed options
    OneOf(&'static [&'static str]),
    /// Value must be an RFC 3339 timestamp with an explicit offset
    DateTime,
}

impl Rule {
    /// Position in the evaluation order: required → min → max → oneof → datetime.
    pub const fn rank(&self) -> u8 {
        match self {
            Rule::Required => 0,
            Rule::Min(_) => 1,
            Rule::Max(_) => 2,
            Rule::OneOf(_) => 3,
            Rule::DateTime => 4,
        }
    }

    /// Check a present value.
    ///
    /// # Errors
    ///
    /// Returns the human-readable violation message.
    pub fn check(&self, value: &str) -> Result<(), String> {
        match *self {
            Rule::Required => {
                if value.is_empty() {
                    return Err(required_message());
                }
            }
            Rule::Min(min) => {
                if value.chars().count() < min {
                    return Err(format!("This field must be at least {} characters", min));
                }
            }
            Rule::Max(max) => {
                if value.chars().count() > max {
                    return Err(format!("This field must be at most {} characters", max));
                }
            }
            Rule::OneOf(allowed) => {
                if !allowed.contains(&value) {
                    return Err(format!("This field must be one of: {}", allowed.join(" ")));
                }
            }
            Rule::DateTime => {
                if !is_datetime(value) {
                    return Err(format!(
                        "This field must be a valid datetime in format: {}",
                        DATETIME_LAYOUT
                    ));
                }
            }
        }
        Ok(())
    }
}

pub fn required_message() -> String {
    "This field is required".to_string()
}

/// `YYYY-MM-DDThh:mm:ss[.frac](Z|±hh:mm)` with uppercase `T` and `Z`, no leap seconds.
fn is_datetime(value: &str) -> bool {
    if value.as_bytes().get(10) != Some(&b'T') || !has_offset_suffix(value) {
        return false;
    }
    match DateTime::parse_from_rfc3339(value) {
        // chrono folds a `:60` second into the nanosecond field
        Ok(parsed) => parsed.nanosecond() < 1_000_000_000,
        Err(_) => false,
    }
}

fn has_offset_suffix(value: &str) -> bool {
    let bytes = value.as_bytes();
    if bytes.last() == Some(&b'Z') {
        return true;
    }
    match bytes.len().checked_sub(6).map(|start| &bytes[start..]) {
        Some([sign, h1, h2, b':', m1, m2]) => {
            matches!(*sign, b'+' | b'-')
                && [h1, h2, m1, m2].iter().all(|b| b.is_ascii_digit())
        }
        _ => false,
    }
}
