// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed conversion of raw entry text.
//!
//! Conversion is driven by the entry's *declared* type tag, not by the
//! requested Rust type: asking for an `i32` from an entry declared `string`
//! yields nothing, exactly like asking for an `i32` from an entry declared
//! `int` whose payload does not parse. The reader substitutes the type's
//! zero value in both cases.

use crate::domain::ValueKind;

/// Conversion from an entry's raw text into a typed value.
///
/// Implementations return `None` when the declared kind does not match the
/// requested type or the payload fails to parse; callers fall back to
/// [`Default`] (the type's zero value) and log, never error.
///
/// # Examples
///
/// ```
/// use dynconf::domain::{FromEntryValue, ValueKind};
///
/// assert_eq!(i32::from_entry_value("42", ValueKind::Int), Some(42));
/// assert_eq!(i32::from_entry_value("abc", ValueKind::Int), None);
/// assert_eq!(i32::from_entry_value("42", ValueKind::Str), None);
/// assert_eq!(String::from_entry_value("x", ValueKind::Str), Some("x".to_string()));
/// ```
pub trait FromEntryValue: Default + Sized {
    /// Converts raw text to `Self` according to the declared kind.
    fn from_entry_value(value: &str, kind: ValueKind) -> Option<Self>;
}

impl FromEntryValue for String {
    fn from_entry_value(value: &str, kind: ValueKind) -> Option<Self> {
        match kind {
            ValueKind::Str => Some(value.to_string()),
            _ => None,
        }
    }
}

impl FromEntryValue for i32 {
    fn from_entry_value(value: &str, kind: ValueKind) -> Option<Self> {
        match kind {
            ValueKind::Int => value.trim().parse().ok(),
            _ => None,
        }
    }
}

impl FromEntryValue for i64 {
    fn from_entry_value(value: &str, kind: ValueKind) -> Option<Self> {
        match kind {
            ValueKind::Int => value.trim().parse().ok(),
            _ => None,
        }
    }
}

impl FromEntryValue for bool {
    fn from_entry_value(value: &str, kind: ValueKind) -> Option<Self> {
        if kind != ValueKind::Bool {
            return None;
        }
        // Accept the common truthy/falsy spellings, not just Rust's.
        match value.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" | "on" => Some(true),
            "false" | "no" | "0" | "off" => Some(false),
            other => other.parse().ok(),
        }
    }
}

impl FromEntryValue for f64 {
    fn from_entry_value(value: &str, kind: ValueKind) -> Option<Self> {
        match kind {
            ValueKind::Double => value.trim().parse().ok(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_identity() {
        assert_eq!(
            String::from_entry_value("hello", ValueKind::Str),
            Some("hello".to_string())
        );
    }

    #[test]
    fn test_string_rejects_other_kinds() {
        assert_eq!(String::from_entry_value("42", ValueKind::Int), None);
        assert_eq!(String::from_entry_value("true", ValueKind::Bool), None);
    }

    #[test]
    fn test_int_parse() {
        assert_eq!(i32::from_entry_value("42", ValueKind::Int), Some(42));
        assert_eq!(i32::from_entry_value("-7", ValueKind::Int), Some(-7));
        assert_eq!(i64::from_entry_value(" 100 ", ValueKind::Int), Some(100));
    }

    #[test]
    fn test_int_parse_failure() {
        assert_eq!(i32::from_entry_value("abc", ValueKind::Int), None);
        assert_eq!(i32::from_entry_value("3.14", ValueKind::Int), None);
    }

    #[test]
    fn test_int_kind_mismatch() {
        assert_eq!(i32::from_entry_value("42", ValueKind::Str), None);
        assert_eq!(i32::from_entry_value("42", ValueKind::Double), None);
    }

    #[test]
    fn test_bool_variants() {
        for truthy in ["true", "True", "YES", "1", "on"] {
            assert_eq!(
                bool::from_entry_value(truthy, ValueKind::Bool),
                Some(true),
                "failed for {}",
                truthy
            );
        }
        for falsy in ["false", "FALSE", "no", "0", "Off"] {
            assert_eq!(
                bool::from_entry_value(falsy, ValueKind::Bool),
                Some(false),
                "failed for {}",
                falsy
            );
        }
        assert_eq!(bool::from_entry_value("maybe", ValueKind::Bool), None);
    }

    #[test]
    fn test_double_parse() {
        assert_eq!(f64::from_entry_value("3.14", ValueKind::Double), Some(3.14));
        assert_eq!(f64::from_entry_value("-0.5", ValueKind::Double), Some(-0.5));
        assert_eq!(f64::from_entry_value("x", ValueKind::Double), None);
        assert_eq!(f64::from_entry_value("3.14", ValueKind::Int), None);
    }
}
