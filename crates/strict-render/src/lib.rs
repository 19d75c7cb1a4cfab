//! # Strict Render - Templates That Prove They Used Their Data
//!
//! `strict-render` renders named template files against arbitrary data and can
//! verify, after rendering, that every value reachable from the data actually
//! made it into the output.
//!
//! ## Core Concepts
//!
//! - [`Assets`]: A directory of templates inside a file tree; renders template sets
//! - [`AssetFs`]: Read-only file tree, either [`DiskFs`] (development) or [`EmbeddedFs`] (bundled)
//! - [`TemplateEngine`]: The engine seam, with [`MiniJinjaEngine`] as the default
//! - [`flatten()`]: Decomposes nested data into `path → string` pairs
//! - Strict mode: every flattened value must occur in the rendered text
//!
//! ## Quick Start
//!
//! ```rust
//! use serde::Serialize;
//! use strict_render::{Assets, EmbeddedFs};
//!
//! static ENTRIES: &[(&str, &str)] = &[
//!     ("static/html/planet.html", "<h1>{{ name }}</h1><p>{{ moons }} moons</p>"),
//! ];
//!
//! #[derive(Serialize)]
//! struct Planet { name: String, moons: u32 }
//!
//! let assets = Assets::open(EmbeddedFs::from_entries(ENTRIES), "static").unwrap();
//! let planet = Planet { name: "Jupiter".into(), moons: 79 };
//!
//! let html = assets.make(&["static/html/planet.html"], &planet, true).unwrap();
//! assert_eq!(html, "<h1>Jupiter</h1><p>79 moons</p>");
//! ```
//!
//! ## Strict Mode
//!
//! When a template forgets a field, strict mode reports the exact path that is
//! missing from the output:
//!
//! ```rust
//! use serde::Serialize;
//! use strict_render::{Assets, EmbeddedFs, RenderError};
//!
//! static ENTRIES: &[(&str, &str)] = &[("planet.txt", "{{ name }}")];
//!
//! #[derive(Serialize)]
//! struct Planet { name: String, moons: u32 }
//!
//! let assets = Assets::open(EmbeddedFs::from_entries(ENTRIES), ".").unwrap();
//! let err = assets
//!     .render(&["planet.txt"], &Planet { name: "Mars".into(), moons: 2 }, true)
//!     .unwrap_err();
//!
//! assert!(matches!(err, RenderError::ValidationFailure { ref key, .. } if key == "moons"));
//! ```
//!
//! Values are compared as text, formatted the way the engine prints them.
//! Booleans print as `true`/`false` and null as `none` (see [`format_scalar`]).
//! Fields whose serialized name starts with `_` are left out of the check.
//!
//! ## Logging
//!
//! Each successful render emits one `tracing` event at `INFO` with the output
//! size, template list, strict flag and number of validated fields. Individual
//! field checks are logged at `DEBUG`. Install any `tracing` subscriber to see
//! them.

pub mod assets;
pub mod engine;
mod error;
pub mod flatten;
pub mod format;
pub mod fs;
pub mod validate;

// Error types
pub use error::{MissingData, RenderError};

// Assets and rendering
pub use assets::{Assets, Rendered};

// Template engine
pub use engine::{EngineConfig, MiniJinjaEngine, TemplateEngine, TemplateSource};
pub use minijinja::{UndefinedBehavior, Value};

// Flattening
pub use format::{format_scalar, NULL_FORM};
pub use flatten::{flatten, flatten_node, Field, FlatMap, Node, Visibility};

// File trees
pub use fs::{AssetEntry, AssetFs, DiskFs, EmbeddedFs};

// Strict checking
pub use validate::verify;
