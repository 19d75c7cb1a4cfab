//! Template engine abstraction.
//!
//! This module defines the [`TemplateEngine`] trait, the seam between the
//! render-then-verify protocol in [`Assets`](crate::Assets) and the engine that
//! actually turns templates into text. The default implementation is
//! [`MiniJinjaEngine`].
//!
//! # Template sets
//!
//! An engine renders a *set* of templates rather than a single one. The first
//! [`TemplateSource`] is the root (the parent); the rest are children that the
//! root pulls in by name:
//!
//! ```jinja
//! {# static/html/index.html #}
//! <h1>{{ title }}</h1>
//! {% include "footer.html" %}
//! ```
//!
//! Only the templates in the set are visible to each other. Nothing is cached
//! between calls: every render compiles the set from scratch.

use minijinja::{AutoEscape, Environment, UndefinedBehavior, Value};

use crate::error::RenderError;
use crate::format::scalar_formatter;

/// A template identifier together with its source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSource {
    /// Identifier the template was loaded under (e.g. `"static/html/index.html"`).
    pub id: String,
    /// Template source text.
    pub source: String,
}

impl TemplateSource {
    /// Creates a new template source.
    pub fn new(id: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
        }
    }

    /// The final path element of the identifier (`"footer.html"` for
    /// `"static/html/footer.html"`).
    pub fn file_name(&self) -> &str {
        self.id.rsplit('/').next().unwrap_or(&self.id)
    }
}

/// A template engine that renders a set of templates against data.
///
/// Implementations compile every template in `set`, execute the first one with
/// `data` as its context and return the output. Syntax errors must be reported
/// as [`RenderError::ParseFailure`] and runtime errors as
/// [`RenderError::ExecutionFailure`].
pub trait TemplateEngine: Send + Sync {
    /// Renders `set[0]`, with the rest of `set` available by name.
    fn render_set(&self, set: &[TemplateSource], data: &Value) -> Result<String, RenderError>;
}

/// Settings applied to every environment a [`MiniJinjaEngine`] creates.
///
/// The defaults mirror a plain text-substitution engine: values are written
/// verbatim and referencing a missing field is an error.
///
/// # Example
///
/// ```rust
/// use strict_render::{EngineConfig, MiniJinjaEngine, UndefinedBehavior};
///
/// let engine = MiniJinjaEngine::with_config(EngineConfig {
///     undefined: UndefinedBehavior::Lenient,
///     ..EngineConfig::default()
/// });
/// assert_eq!(engine.config().undefined, UndefinedBehavior::Lenient);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// How undefined variables and attributes behave. Defaults to
    /// [`UndefinedBehavior::Strict`].
    pub undefined: UndefinedBehavior,

    /// Apply MiniJinja's extension-based auto-escaping (`.html` templates get
    /// HTML escaping). Off by default: escaped output would no longer contain
    /// the literal data values that strict checking looks for.
    pub auto_escape: bool,

    /// Keep the trailing newline at the end of each template.
    pub keep_trailing_newline: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            undefined: UndefinedBehavior::Strict,
            auto_escape: false,
            keep_trailing_newline: false,
        }
    }
}

/// MiniJinja-based template engine.
///
/// Every template is registered under its full identifier. It is also
/// registered under its file name when no earlier template in the set claimed
/// that name, so `{% include "footer.html" %}` finds
/// `static/html/footer.html`.
///
/// # Example
///
/// ```rust
/// use strict_render::{MiniJinjaEngine, TemplateEngine, TemplateSource, Value};
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Page { title: String }
///
/// let engine = MiniJinjaEngine::new();
/// let set = [
///     TemplateSource::new("html/page.html", "{{ title }} | {% include 'footer.html' %}"),
///     TemplateSource::new("html/footer.html", "end"),
/// ];
/// let data = Value::from_serialize(&Page { title: "Home".into() });
/// let output = engine.render_set(&set, &data).unwrap();
/// assert_eq!(output, "Home | end");
/// ```
#[derive(Debug, Clone, Default)]
pub struct MiniJinjaEngine {
    config: EngineConfig,
}

impl MiniJinjaEngine {
    /// Creates an engine with the default [`EngineConfig`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an engine with the given configuration.
    pub fn with_config(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Returns the engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Builds a fresh environment with all templates of `set` compiled.
    ///
    /// Bools and null print as `true`, `false` and `none`, matching
    /// [`format_scalar`](crate::format_scalar).
    pub fn environment(
        &self,
        set: &[TemplateSource],
    ) -> Result<Environment<'static>, RenderError> {
        let mut env = Environment::new();
        env.set_undefined_behavior(self.config.undefined);
        env.set_keep_trailing_newline(self.config.keep_trailing_newline);
        env.set_formatter(scalar_formatter);
        if !self.config.auto_escape {
            env.set_auto_escape_callback(|_name: &str| AutoEscape::None);
        }

        for template in set {
            env.add_template_owned(template.id.clone(), template.source.clone())
                .map_err(|source| RenderError::ParseFailure {
                    template: template.id.clone(),
                    source,
                })?;
        }

        // Short names never shadow a full identifier or an earlier short name.
        for template in set {
            let name = template.file_name();
            if name != template.id && env.get_template(name).is_err() {
                env.add_template_owned(name.to_string(), template.source.clone())
                    .map_err(|source| RenderError::ParseFailure {
                        template: template.id.clone(),
                        source,
                    })?;
            }
        }

        Ok(env)
    }
}

impl TemplateEngine for MiniJinjaEngine {
    fn render_set(&self, set: &[TemplateSource], data: &Value) -> Result<String, RenderError> {
        let root = set.first().ok_or(RenderError::NoTemplates)?;
        let env = self.environment(set)?;
        let execution_failure = |source: minijinja::Error| RenderError::ExecutionFailure {
            template: root.id.clone(),
            source,
        };
        let tmpl = env.get_template(&root.id).map_err(execution_failure)?;
        tmpl.render(data).map_err(execution_failure)
    }
}
