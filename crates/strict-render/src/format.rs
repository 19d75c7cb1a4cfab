//! Canonical text form of scalar values.
//!
//! Strict checking compares flattened data against rendered output as text, so
//! both sides must print a scalar the same way. [`format_scalar`] is that one
//! form, and [`scalar_formatter`] installs it in every environment a
//! [`MiniJinjaEngine`](crate::MiniJinjaEngine) creates.
//!
//! | Value | Text |
//! |-------|------|
//! | `true` / `false` | `true` / `false` |
//! | `None`, `()` | `none` |
//! | anything else | MiniJinja's display (`778.5`, `79`, `Jupiter`) |

use std::fmt::Write;

use minijinja::value::ValueKind;
use minijinja::{escape_formatter, Error, ErrorKind, Output, State, Value};

/// Text written for a null value.
pub const NULL_FORM: &str = "none";

/// Formats a scalar the way templates print it.
///
/// ```rust
/// use strict_render::{format_scalar, Value};
///
/// assert_eq!(format_scalar(&Value::from(true)), "true");
/// assert_eq!(format_scalar(&Value::from(())), "none");
/// assert_eq!(format_scalar(&Value::from(778.5)), "778.5");
/// ```
pub fn format_scalar(value: &Value) -> String {
    match value.kind() {
        ValueKind::Bool if value.is_true() => "true".to_string(),
        ValueKind::Bool => "false".to_string(),
        ValueKind::None => NULL_FORM.to_string(),
        _ => value.to_string(),
    }
}

/// MiniJinja formatter that writes bools and null in their canonical form.
///
/// Every other value goes through MiniJinja's own formatter, so auto-escaping
/// still applies when it is enabled.
pub(crate) fn scalar_formatter(
    out: &mut Output<'_>,
    state: &State<'_, '_>,
    value: &Value,
) -> Result<(), Error> {
    match value.kind() {
        ValueKind::Bool | ValueKind::None => out
            .write_str(&format_scalar(value))
            .map_err(|_| Error::new(ErrorKind::WriteFailure, "could not write output")),
        _ => escape_formatter(out, state, value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bools_are_lowercase() {
        assert_eq!(format_scalar(&Value::from(true)), "true");
        assert_eq!(format_scalar(&Value::from(false)), "false");
    }

    #[test]
    fn test_null_form() {
        assert_eq!(format_scalar(&Value::from(())), "none");
        assert_eq!(format_scalar(&Value::from_serialize(None::<u8>)), "none");
    }

    #[test]
    fn test_numbers_and_strings() {
        assert_eq!(format_scalar(&Value::from(778.5)), "778.5");
        assert_eq!(format_scalar(&Value::from(79)), "79");
        assert_eq!(format_scalar(&Value::from(-3i64)), "-3");
        assert_eq!(format_scalar(&Value::from("Jupiter")), "Jupiter");
    }
}
