//! Flattening of nested data into path → string pairs.
//!
//! Strict checking needs a flat list of "this value must appear in the output".
//! This module produces it in two steps:
//!
//! 1. **Capture**: any `Serialize` value is captured as a [`Node`] tree, a
//!    closed set of shapes (scalar, record, mapping, sequence, reference).
//!    Scalars are formatted on the way in with [`format_scalar`], the form
//!    the template engine writes for `{{ value }}`.
//! 2. **Flatten**: the tree is walked and every scalar is recorded under its
//!    path in a [`FlatMap`].
//!
//! Nodes can also be built by hand, for data that does not go through serde.
//!
//! ## Paths
//!
//! | Step | Path segment | Example |
//! |------|--------------|---------|
//! | record field | `.name` | `body.name` |
//! | mapping key | `.key` | `body.attributes.Mass` |
//! | sequence element | `[index]` | `body.atmosphere[1]` |
//! | reference | none | `Some(x)` flattens like `x` |
//!
//! The leading dot is dropped at the root; a scalar at the root is recorded
//! under the empty path.
//!
//! ## Internal fields
//!
//! Record fields marked [`Visibility::Internal`] are skipped together with
//! everything below them. When capturing through serde, a field is internal if
//! its serialized name starts with an underscore:
//!
//! ```rust
//! use serde::Serialize;
//! use strict_render::flatten;
//!
//! #[derive(Serialize)]
//! struct Page {
//!     title: String,
//!     #[serde(rename = "_etag")]
//!     etag: String,
//! }
//!
//! let flat = flatten(&Page { title: "Home".into(), etag: "abc123".into() }).unwrap();
//! assert_eq!(flat.len(), 1);
//! assert_eq!(flat["title"], "Home");
//! ```
//!
//! ## Key collisions
//!
//! Two different paths can produce the same key string, for example a mapping
//! with both a `"1"` and a `1` key. The later entry wins.

mod capture;

use std::collections::BTreeMap;

use minijinja::Value;
use serde::Serialize;

use crate::error::RenderError;
use crate::format::format_scalar;

/// Flattened data: path → string form of the scalar found there.
///
/// Sorted by path, so iteration order is deterministic.
pub type FlatMap = BTreeMap<String, String>;

/// Whether a record field takes part in strict checking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    /// The field is expected to appear in rendered output.
    Exported,
    /// The field is skipped during flattening.
    Internal,
}

/// A named member of a [`Node::Record`].
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub value: Node,
    pub visibility: Visibility,
}

impl Field {
    /// Creates an exported field.
    pub fn exported(name: impl Into<String>, value: Node) -> Self {
        Self {
            name: name.into(),
            value,
            visibility: Visibility::Exported,
        }
    }

    /// Creates an internal field.
    pub fn internal(name: impl Into<String>, value: Node) -> Self {
        Self {
            name: name.into(),
            value,
            visibility: Visibility::Internal,
        }
    }
}

/// The shape of a data value, as far as flattening is concerned.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// A terminal value, already formatted.
    Scalar(String),
    /// Named fields in declaration order.
    Record(Vec<Field>),
    /// Key/value entries. Keys must resolve to scalars.
    Mapping(Vec<(Node, Node)>),
    /// Elements in order.
    Sequence(Vec<Node>),
    /// An optional indirection. `None` is a null reference.
    Reference(Option<Box<Node>>),
}

impl Node {
    /// Captures a serializable value.
    ///
    /// Fails with [`RenderError::UnflattenableValue`] if the value's
    /// `Serialize` implementation reports an error.
    pub fn capture<T: Serialize + ?Sized>(data: &T) -> Result<Self, RenderError> {
        capture::capture(data).map_err(|err| RenderError::unflattenable("", err.to_string()))
    }

    /// A scalar formatted the way templates print `value`.
    pub fn scalar(value: impl Into<Value>) -> Self {
        Node::Scalar(format_scalar(&value.into()))
    }

    /// The scalar templates print for a missing value (`none`).
    pub fn null() -> Self {
        Node::Scalar(Self::null_string())
    }

    fn null_string() -> String {
        format_scalar(&Value::from(()))
    }

    /// Builds a mapping from string keys.
    pub fn mapping<K: Into<String>>(entries: impl IntoIterator<Item = (K, Node)>) -> Self {
        Node::Mapping(
            entries
                .into_iter()
                .map(|(key, value)| (Node::Scalar(key.into()), value))
                .collect(),
        )
    }

    /// Short name of the node's shape, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Scalar(_) => "scalar",
            Node::Record(_) => "record",
            Node::Mapping(_) => "mapping",
            Node::Sequence(_) => "sequence",
            Node::Reference(_) => "reference",
        }
    }

    /// Follows references down to the first non-reference node.
    ///
    /// Returns `None` for a null reference.
    fn resolve(&self) -> Option<&Node> {
        match self {
            Node::Reference(Some(target)) => target.resolve(),
            Node::Reference(None) => None,
            other => Some(other),
        }
    }
}

/// Flattens any serializable value.
///
/// ```rust
/// use serde::Serialize;
/// use strict_render::flatten;
///
/// #[derive(Serialize)]
/// struct Planet { name: String, atmosphere: Vec<String> }
///
/// let flat = flatten(&Planet {
///     name: "Jupiter".into(),
///     atmosphere: vec!["Hydrogen".into(), "Helium".into()],
/// }).unwrap();
///
/// assert_eq!(flat["name"], "Jupiter");
/// assert_eq!(flat["atmosphere[0]"], "Hydrogen");
/// assert_eq!(flat["atmosphere[1]"], "Helium");
/// ```
pub fn flatten<T: Serialize + ?Sized>(data: &T) -> Result<FlatMap, RenderError> {
    flatten_node(&Node::capture(data)?)
}

/// Flattens a captured or hand-built [`Node`].
pub fn flatten_node(node: &Node) -> Result<FlatMap, RenderError> {
    let mut acc = FlatMap::new();
    flatten_recursive(node, "", &mut acc)?;
    Ok(acc)
}

fn flatten_recursive(node: &Node, prefix: &str, acc: &mut FlatMap) -> Result<(), RenderError> {
    match node {
        Node::Reference(Some(target)) => flatten_recursive(target, prefix, acc)?,
        Node::Reference(None) => {
            acc.insert(prefix.to_string(), Node::null_string());
        }
        Node::Record(fields) => {
            for field in fields {
                if field.visibility == Visibility::Internal {
                    continue;
                }
                flatten_recursive(&field.value, &member_path(prefix, &field.name), acc)?;
            }
        }
        Node::Mapping(entries) => {
            for (key, value) in entries {
                let key = match key.resolve() {
                    Some(Node::Scalar(key)) => key.clone(),
                    None => Node::null_string(),
                    Some(other) => {
                        return Err(RenderError::unflattenable(
                            prefix,
                            format!("mapping key is a {}, not a scalar", other.kind()),
                        ))
                    }
                };
                flatten_recursive(value, &member_path(prefix, &key), acc)?;
            }
        }
        Node::Sequence(items) => {
            for (index, item) in items.iter().enumerate() {
                flatten_recursive(item, &format!("{}[{}]", prefix, index), acc)?;
            }
        }
        Node::Scalar(value) => {
            acc.insert(prefix.to_string(), value.clone());
        }
    }
    Ok(())
}

fn member_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;
    use std::collections::HashMap;

    #[derive(Serialize)]
    struct Planet {
        name: String,
        atmosphere: Vec<String>,
    }

    #[derive(Serialize)]
    struct Page {
        title: String,
        body: Planet,
    }

    fn jupiter_page() -> Page {
        Page {
            title: "My Favorite Planet".into(),
            body: Planet {
                name: "Jupiter".into(),
                atmosphere: vec!["Hydrogen".into(), "Helium".into()],
            },
        }
    }

    #[test]
    fn test_nested_record_path() {
        let flat = flatten(&jupiter_page()).unwrap();
        assert_eq!(flat.get("body.name").map(String::as_str), Some("Jupiter"));
        assert_eq!(flat.get("title").map(String::as_str), Some("My Favorite Planet"));
    }

    #[test]
    fn test_sequence_indexing() {
        let flat = flatten(&jupiter_page()).unwrap();
        assert_eq!(flat["body.atmosphere[0]"], "Hydrogen");
        assert_eq!(flat["body.atmosphere[1]"], "Helium");
        assert_eq!(flat.len(), 4);
    }

    #[test]
    fn test_internal_field_skipped() {
        let node = Node::Record(vec![
            Field::exported("visible", Node::Scalar("yes".into())),
            Field::internal("hidden", Node::Scalar("no".into())),
        ]);
        let flat = flatten_node(&node).unwrap();
        assert_eq!(flat.len(), 1);
        assert_eq!(flat["visible"], "yes");
    }

    #[test]
    fn test_internal_field_hides_subtree() {
        let node = Node::Record(vec![Field::internal(
            "cache",
            Node::Sequence(vec![Node::Scalar("a".into()), Node::Scalar("b".into())]),
        )]);
        assert!(flatten_node(&node).unwrap().is_empty());
    }

    #[test]
    fn test_mapping_keys() {
        let mut attributes = HashMap::new();
        attributes.insert("Diameter", "142,984 km");
        attributes.insert("Mass", "1.898 × 10^27 kg");
        let flat = flatten(&attributes).unwrap();
        assert_eq!(flat["Diameter"], "142,984 km");
        assert_eq!(flat["Mass"], "1.898 × 10^27 kg");
    }

    #[test]
    fn test_reference_adds_no_segment() {
        #[derive(Serialize)]
        struct Moon {
            parent: Option<Box<String>>,
        }

        let flat = flatten(&Moon {
            parent: Some(Box::new("Saturn".into())),
        })
        .unwrap();
        assert_eq!(flat["parent"], "Saturn");
    }

    #[test]
    fn test_null_reference_is_terminal() {
        let flat = flatten_node(&Node::Record(vec![Field::exported(
            "parent",
            Node::Reference(None),
        )]))
        .unwrap();
        assert_eq!(flat["parent"], "none");
    }

    #[test]
    fn test_root_scalar_uses_empty_path() {
        let flat = flatten(&42u32).unwrap();
        assert_eq!(flat.len(), 1);
        assert_eq!(flat[""], "42");
    }

    #[test]
    fn test_empty_containers_produce_nothing() {
        assert!(flatten(&Vec::<u8>::new()).unwrap().is_empty());
        assert!(flatten(&HashMap::<String, u8>::new()).unwrap().is_empty());
        assert!(flatten_node(&Node::Record(Vec::new())).unwrap().is_empty());
    }

    #[test]
    fn test_non_scalar_key_is_unflattenable() {
        let node = Node::Record(vec![Field::exported(
            "index",
            Node::Mapping(vec![(
                Node::Sequence(vec![Node::Scalar("a".into())]),
                Node::Scalar("b".into()),
            )]),
        )]);
        let err = flatten_node(&node).unwrap_err();
        match err {
            RenderError::UnflattenableValue { key, reason } => {
                assert_eq!(key, "index");
                assert!(reason.contains("sequence"));
            }
            other => panic!("expected UnflattenableValue, got {other:?}"),
        }
    }

    #[test]
    fn test_colliding_keys_last_wins() {
        let node = Node::Mapping(vec![
            (Node::Scalar("1".into()), Node::Scalar("first".into())),
            (Node::scalar(1u8), Node::Scalar("second".into())),
        ]);
        let flat = flatten_node(&node).unwrap();
        assert_eq!(flat.len(), 1);
        assert_eq!(flat["1"], "second");
    }

    #[test]
    fn test_mapping_helper() {
        let node = Node::mapping([("a", Node::scalar(1u8)), ("b", Node::scalar(false))]);
        let flat = flatten_node(&node).unwrap();
        assert_eq!(flat["a"], "1");
        assert_eq!(flat["b"], "false");
    }

    #[test]
    fn test_json_values_flatten() {
        let data = serde_json::json!({
            "title": "Report",
            "rows": [{"id": 1}, {"id": 2.5}],
            "done": true
        });
        let flat = flatten(&data).unwrap();
        assert_eq!(flat["title"], "Report");
        assert_eq!(flat["rows[0].id"], "1");
        assert_eq!(flat["rows[1].id"], "2.5");
        assert_eq!(flat["done"], "true");
    }

    #[test]
    fn test_serialize_error_is_unflattenable() {
        struct Broken;

        impl Serialize for Broken {
            fn serialize<S: serde::Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
                Err(serde::ser::Error::custom("cannot serialize"))
            }
        }

        let err = flatten(&Broken).unwrap_err();
        assert!(matches!(err, RenderError::UnflattenableValue { .. }));
    }
}
