//! Template assets and the render-then-verify protocol.
//!
//! [`Assets`] binds a file tree and a directory inside it. Rendering takes an
//! ordered list of template paths and a data value:
//!
//! 1. Every template is read from the tree and handed to the engine as one
//!    set. The first path is the parent that gets executed; later paths are
//!    children the parent pulls in.
//! 2. Output of zero bytes is an error. A child listed before its parent
//!    typically renders nothing, and that mistake should not pass silently.
//! 3. In strict mode the data is [flattened](crate::flatten()) and every value
//!    must appear verbatim somewhere in the output.
//!
//! Nothing is cached: each call reads and compiles its templates afresh, so an
//! `Assets` can be shared freely between threads.

use minijinja::Value;
use serde::Serialize;

use crate::engine::{MiniJinjaEngine, TemplateEngine, TemplateSource};
use crate::error::RenderError;
use crate::flatten::flatten;
use crate::fs::{AssetEntry, AssetFs};
use crate::validate::verify;

/// Output of a successful render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    /// The rendered text. Never empty.
    pub text: String,
    /// Number of data values found in `text` by strict checking; zero when
    /// strict checking was off.
    pub fields_validated: usize,
}

/// A directory of templates and other static assets.
///
/// # Example
///
/// ```rust
/// use serde::Serialize;
/// use strict_render::{Assets, EmbeddedFs};
///
/// static ENTRIES: &[(&str, &str)] = &[
///     ("static/html/index.html", "<h1>{{ title }}</h1>{% include 'footer.html' %}"),
///     ("static/html/footer.html", "<footer>{{ year }}</footer>"),
/// ];
///
/// #[derive(Serialize)]
/// struct Page { title: String, year: i32 }
///
/// let assets = Assets::open(EmbeddedFs::from_entries(ENTRIES), "static").unwrap();
/// let rendered = assets
///     .render(
///         &["static/html/index.html", "static/html/footer.html"],
///         &Page { title: "Planets".into(), year: 2024 },
///         true,
///     )
///     .unwrap();
///
/// assert_eq!(rendered.text, "<h1>Planets</h1><footer>2024</footer>");
/// assert_eq!(rendered.fields_validated, 2);
/// ```
#[derive(Debug, Clone)]
pub struct Assets<F, E = MiniJinjaEngine> {
    fs: F,
    directory: String,
    entries: Vec<AssetEntry>,
    engine: E,
}

impl<F: AssetFs> Assets<F> {
    /// Opens `directory` inside `fs` with the default engine.
    ///
    /// The directory is listed immediately; an unreadable directory fails with
    /// [`RenderError::DirectoryUnreadable`].
    pub fn open(fs: F, directory: impl Into<String>) -> Result<Self, RenderError> {
        Self::with_engine(fs, directory, MiniJinjaEngine::new())
    }
}

impl<F: AssetFs, E: TemplateEngine> Assets<F, E> {
    /// Opens `directory` inside `fs`, rendering with `engine`.
    pub fn with_engine(
        fs: F,
        directory: impl Into<String>,
        engine: E,
    ) -> Result<Self, RenderError> {
        let directory = directory.into();
        let entries = fs
            .read_dir(&directory)
            .map_err(|source| RenderError::DirectoryUnreadable {
                directory: directory.clone(),
                source,
            })?;
        tracing::debug!(directory = %directory, entries = entries.len(), "opened static dir");
        Ok(Self {
            fs,
            directory,
            entries,
            engine,
        })
    }

    /// The underlying file tree.
    pub fn fs(&self) -> &F {
        &self.fs
    }

    /// The directory this instance was opened on.
    pub fn directory(&self) -> &str {
        &self.directory
    }

    /// Directory entries as listed when the instance was opened.
    pub fn entries(&self) -> &[AssetEntry] {
        &self.entries
    }

    /// The template engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Reads the given templates from the file tree, in order.
    ///
    /// Template paths are relative to the root of the tree, not to
    /// [`directory`](Self::directory).
    pub fn load<S: AsRef<str>>(&self, templates: &[S]) -> Result<Vec<TemplateSource>, RenderError> {
        if templates.is_empty() {
            return Err(RenderError::NoTemplates);
        }
        templates
            .iter()
            .map(|id| {
                let id = id.as_ref();
                self.fs
                    .read_to_string(id)
                    .map(|source| TemplateSource::new(id, source))
                    .map_err(|source| RenderError::TemplateMissing {
                        template: id.to_string(),
                        source,
                    })
            })
            .collect()
    }

    /// Renders a set of templates with `data`.
    ///
    /// Templates must be listed parent first. With `strict`, every value
    /// reachable from `data` must occur in the output; the first one that does
    /// not fails the call with [`RenderError::ValidationFailure`].
    pub fn render<T, S>(
        &self,
        templates: &[S],
        data: &T,
        strict: bool,
    ) -> Result<Rendered, RenderError>
    where
        T: Serialize + ?Sized,
        S: AsRef<str>,
    {
        let set = self.load(templates)?;
        let ids: Vec<String> = set.iter().map(|template| template.id.clone()).collect();

        let text = self.engine.render_set(&set, &Value::from_serialize(data))?;
        if text.is_empty() {
            return Err(RenderError::EmptyOutput { templates: ids });
        }

        let fields_validated = if strict {
            let expected = flatten(data)?;
            verify(&text, &expected)?
        } else {
            0
        };

        tracing::info!(
            bytes = text.len(),
            templates = ?ids,
            strict,
            fields_validated,
            "template(s) executed"
        );
        Ok(Rendered {
            text,
            fields_validated,
        })
    }

    /// Like [`render`](Self::render), returning only the text.
    pub fn make<T, S>(&self, templates: &[S], data: &T, strict: bool) -> Result<String, RenderError>
    where
        T: Serialize + ?Sized,
        S: AsRef<str>,
    {
        Ok(self.render(templates, data, strict)?.text)
    }
}
