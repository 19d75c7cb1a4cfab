//! Error types for rendering and strict checking.
//!
//! This module provides [`RenderError`], the single error type returned by every
//! public operation of the crate. Each variant carries the structured fields a
//! caller needs (the failing template, the failing data path) and keeps the
//! underlying I/O or engine error as its source.

use std::io;

/// A data value that was expected in the rendered output but not found.
///
/// Wrapped by [`RenderError::ValidationFailure`], which adds the path of the
/// value inside the source data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("source data value not present: {expected:?}")]
pub struct MissingData {
    /// The string form of the value that was searched for.
    pub expected: String,
}

/// Error type for asset and rendering operations.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The asset directory could not be listed.
    #[error("open static dir {directory:?}: {source}")]
    DirectoryUnreadable {
        directory: String,
        #[source]
        source: io::Error,
    },

    /// `render` was called with an empty template list.
    #[error("no templates given, at least a parent template is required")]
    NoTemplates,

    /// A template file could not be read from the filesystem.
    #[error("parse template {template:?}: {source}")]
    TemplateMissing {
        template: String,
        #[source]
        source: io::Error,
    },

    /// Template syntax error.
    #[error("parse template {template:?}: {source}")]
    ParseFailure {
        template: String,
        #[source]
        source: minijinja::Error,
    },

    /// The template engine failed while executing the root template.
    #[error("execute template {template:?}: {source}")]
    ExecutionFailure {
        template: String,
        #[source]
        source: minijinja::Error,
    },

    /// Rendering succeeded but produced zero bytes.
    #[error("template output is empty, ensure parents are listed before children: {templates:?}")]
    EmptyOutput { templates: Vec<String> },

    /// Strict checking found a data value missing from the output.
    #[error("strict checking: template validation failed: key {key:?}")]
    ValidationFailure {
        key: String,
        #[source]
        source: MissingData,
    },

    /// A data value has no string form usable for strict checking.
    #[error("strict checking: value at {key:?} cannot be flattened: {reason}")]
    UnflattenableValue { key: String, reason: String },
}

impl RenderError {
    /// Create an unflattenable-value error.
    pub fn unflattenable(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnflattenableValue {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Returns true if strict checking rejected the output.
    pub fn is_validation_failure(&self) -> bool {
        matches!(self, Self::ValidationFailure { .. })
    }

    /// The data path that failed strict checking or flattening, if any.
    pub fn failing_key(&self) -> Option<&str> {
        match self {
            Self::ValidationFailure { key, .. } | Self::UnflattenableValue { key, .. } => {
                Some(key)
            }
            _ => None,
        }
    }
}
