//! Strict checking of rendered output against flattened data.

use crate::error::{MissingData, RenderError};
use crate::flatten::FlatMap;

/// Checks that every value in `expected` occurs in `rendered`.
///
/// Entries are checked in path order and the first missing value aborts the
/// check. Returns the number of entries found.
pub fn verify(rendered: &str, expected: &FlatMap) -> Result<usize, RenderError> {
    let mut validated = 0;
    for (key, value) in expected {
        if !rendered.contains(value.as_str()) {
            return Err(RenderError::ValidationFailure {
                key: key.clone(),
                source: MissingData {
                    expected: value.clone(),
                },
            });
        }
        validated += 1;
        tracing::debug!(key = %key, "strict check: data value found in rendered template");
    }
    Ok(validated)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expected(pairs: &[(&str, &str)]) -> FlatMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_all_present() {
        let map = expected(&[("name", "Jupiter"), ("moons", "79")]);
        assert_eq!(verify("Jupiter has 79 moons", &map).unwrap(), 2);
    }

    #[test]
    fn test_empty_map_validates_nothing() {
        assert_eq!(verify("anything", &FlatMap::new()).unwrap(), 0);
    }

    #[test]
    fn test_missing_value_names_key() {
        let map = expected(&[("name", "Jupiter"), ("moons", "79")]);
        let err = verify("Jupiter has many moons", &map).unwrap_err();
        assert_eq!(err.failing_key(), Some("moons"));
        match err {
            RenderError::ValidationFailure { source, .. } => assert_eq!(source.expected, "79"),
            other => panic!("expected ValidationFailure, got {other:?}"),
        }
    }

    #[test]
    fn test_reports_first_missing_key_in_path_order() {
        let map = expected(&[("b", "beta"), ("a", "alpha"), ("c", "gamma")]);
        let err = verify("beta", &map).unwrap_err();
        assert_eq!(err.failing_key(), Some("a"));
    }

    #[test]
    fn test_empty_value_always_matches() {
        let map = expected(&[("note", "")]);
        assert_eq!(verify("x", &map).unwrap(), 1);
    }
}
