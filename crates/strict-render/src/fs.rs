//! Read-only file trees that templates are loaded from.
//!
//! Rendering only needs two capabilities from a filesystem: listing a directory
//! and reading a file as text. [`AssetFs`] captures exactly that, so the same
//! [`Assets`](crate::Assets) code works against a development checkout on disk
//! ([`DiskFs`]) and against a snapshot compiled into the binary ([`EmbeddedFs`]).
//!
//! # Paths
//!
//! Paths are slash-separated and relative to the root of the tree, regardless
//! of platform. `"."` and `""` name the root itself. Absolute paths, empty
//! elements (`a//b`) and `.` or `..` elements are rejected with
//! [`io::ErrorKind::InvalidInput`], so a tree can never be escaped.
//!
//! ```text
//! static/
//! ├── html/
//! │   ├── index.html      -> "static/html/index.html"
//! │   └── footer.html     -> "static/html/footer.html"
//! └── css/
//!     └── site.css        -> "static/css/site.css"
//! ```

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A single directory listing entry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct AssetEntry {
    /// File or directory name (final path element only).
    pub name: String,
    /// Whether the entry is a directory.
    pub is_dir: bool,
}

impl AssetEntry {
    /// Creates a file entry.
    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_dir: false,
        }
    }

    /// Creates a directory entry.
    pub fn dir(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_dir: true,
        }
    }
}

/// A read-only file tree.
///
/// Implementations must be safe to share between threads; rendering never
/// mutates the tree.
pub trait AssetFs: Send + Sync {
    /// Lists the entries of a directory, sorted by name.
    fn read_dir(&self, path: &str) -> io::Result<Vec<AssetEntry>>;

    /// Reads a file as UTF-8 text.
    fn read_to_string(&self, path: &str) -> io::Result<String>;
}

impl<T: AssetFs + ?Sized> AssetFs for &T {
    fn read_dir(&self, path: &str) -> io::Result<Vec<AssetEntry>> {
        (**self).read_dir(path)
    }

    fn read_to_string(&self, path: &str) -> io::Result<String> {
        (**self).read_to_string(path)
    }
}

impl<T: AssetFs + ?Sized> AssetFs for Box<T> {
    fn read_dir(&self, path: &str) -> io::Result<Vec<AssetEntry>> {
        (**self).read_dir(path)
    }

    fn read_to_string(&self, path: &str) -> io::Result<String> {
        (**self).read_to_string(path)
    }
}

impl<T: AssetFs + ?Sized> AssetFs for Arc<T> {
    fn read_dir(&self, path: &str) -> io::Result<Vec<AssetEntry>> {
        (**self).read_dir(path)
    }

    fn read_to_string(&self, path: &str) -> io::Result<String> {
        (**self).read_to_string(path)
    }
}

/// Normalizes a tree path, returning its elements.
///
/// The root (`"."` or `""`) yields no elements.
pub fn path_elements(path: &str) -> io::Result<Vec<&str>> {
    if path.is_empty() || path == "." {
        return Ok(Vec::new());
    }
    if path.starts_with('/') {
        return Err(invalid_path(path, "absolute paths are not allowed"));
    }
    path.split('/')
        .map(|element| match element {
            "" => Err(invalid_path(path, "empty path element")),
            "." | ".." => Err(invalid_path(path, "relative path element")),
            other => Ok(other),
        })
        .collect()
}

fn invalid_path(path: &str, reason: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidInput,
        format!("invalid path {:?}: {}", path, reason),
    )
}

/// A file tree rooted at a local directory.
///
/// Content is read from disk on every access, so edits to templates are
/// picked up without restarting.
#[derive(Debug, Clone)]
pub struct DiskFs {
    root: PathBuf,
}

impl DiskFs {
    /// Creates a tree rooted at `root`. The directory is not checked here.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> io::Result<PathBuf> {
        let mut resolved = self.root.clone();
        for element in path_elements(path)? {
            resolved.push(element);
        }
        Ok(resolved)
    }
}

impl AssetFs for DiskFs {
    fn read_dir(&self, path: &str) -> io::Result<Vec<AssetEntry>> {
        let dir = self.resolve(path)?;
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            entries.push(AssetEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                is_dir: entry.file_type()?.is_dir(),
            });
        }
        entries.sort();
        Ok(entries)
    }

    fn read_to_string(&self, path: &str) -> io::Result<String> {
        std::fs::read_to_string(self.resolve(path)?)
    }
}

/// An in-memory file tree.
///
/// Directories are implied by the file paths they contain. This is the
/// release-build counterpart of [`DiskFs`]: entries are usually baked into the
/// binary with `include_str!` and handed over as a static slice.
///
/// ```rust
/// use strict_render::{AssetFs, EmbeddedFs};
///
/// static ENTRIES: &[(&str, &str)] = &[
///     ("static/html/index.html", "<h1>{{ title }}</h1>"),
///     ("static/html/footer.html", "<footer></footer>"),
/// ];
///
/// let fs = EmbeddedFs::from_entries(ENTRIES);
/// let names: Vec<_> = fs.read_dir("static/html").unwrap()
///     .into_iter()
///     .map(|entry| entry.name)
///     .collect();
/// assert_eq!(names, ["footer.html", "index.html"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct EmbeddedFs {
    files: BTreeMap<String, Cow<'static, str>>,
}

impl EmbeddedFs {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a tree from `(path, content)` pairs.
    ///
    /// Later entries replace earlier ones with the same path.
    pub fn from_entries(entries: &'static [(&'static str, &'static str)]) -> Self {
        let files = entries
            .iter()
            .map(|(path, content)| ((*path).to_string(), Cow::Borrowed(*content)))
            .collect();
        Self { files }
    }

    /// Adds or replaces a file.
    pub fn insert(&mut self, path: impl Into<String>, content: impl Into<Cow<'static, str>>) {
        self.files.insert(path.into(), content.into());
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with_file(
        mut self,
        path: impl Into<String>,
        content: impl Into<Cow<'static, str>>,
    ) -> Self {
        self.insert(path, content);
        self
    }

    /// Number of files in the tree.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns true if the tree has no files.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl AssetFs for EmbeddedFs {
    fn read_dir(&self, path: &str) -> io::Result<Vec<AssetEntry>> {
        let elements = path_elements(path)?;
        let prefix = if elements.is_empty() {
            String::new()
        } else {
            format!("{}/", elements.join("/"))
        };
        if !prefix.is_empty() && self.files.contains_key(prefix.trim_end_matches('/')) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("not a directory: {:?}", path),
            ));
        }

        // name -> is_dir; a name seen as both keeps the directory
        let mut children: BTreeMap<&str, bool> = BTreeMap::new();
        for file in self.files.keys() {
            let Some(rest) = file.strip_prefix(prefix.as_str()) else {
                continue;
            };
            match rest.split_once('/') {
                Some((dir, _)) => {
                    children.insert(dir, true);
                }
                None => {
                    children.entry(rest).or_insert(false);
                }
            }
        }

        if children.is_empty() && !prefix.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("directory not found: {:?}", path),
            ));
        }

        Ok(children
            .into_iter()
            .map(|(name, is_dir)| AssetEntry {
                name: name.to_string(),
                is_dir,
            })
            .collect())
    }

    fn read_to_string(&self, path: &str) -> io::Result<String> {
        let key = path_elements(path)?.join("/");
        self.files
            .get(&key)
            .map(|content| content.to_string())
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("file not found: {:?}", path),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    static ENTRIES: &[(&str, &str)] = &[
        ("static/html/index.html", "index"),
        ("static/html/footer.html", "footer"),
        ("static/robots.txt", "robots"),
        ("readme.txt", "readme"),
    ];

    #[test]
    fn test_path_elements_root() {
        assert!(path_elements(".").unwrap().is_empty());
        assert!(path_elements("").unwrap().is_empty());
    }

    #[test]
    fn test_path_elements_splits() {
        assert_eq!(
            path_elements("static/html/index.html").unwrap(),
            ["static", "html", "index.html"]
        );
    }

    #[test]
    fn test_path_elements_rejects_escapes() {
        for bad in ["/etc/passwd", "../secret", "static/../x", "a//b", "a/./b", "a/"] {
            let err = path_elements(bad).unwrap_err();
            assert_eq!(err.kind(), io::ErrorKind::InvalidInput, "path {bad:?}");
        }
    }

    #[test]
    fn test_embedded_read_dir_root() {
        let fs = EmbeddedFs::from_entries(ENTRIES);
        let entries = fs.read_dir(".").unwrap();
        assert_eq!(
            entries,
            vec![AssetEntry::file("readme.txt"), AssetEntry::dir("static")]
        );
    }

    #[test]
    fn test_embedded_read_dir_nested() {
        let fs = EmbeddedFs::from_entries(ENTRIES);
        let entries = fs.read_dir("static").unwrap();
        assert_eq!(
            entries,
            vec![AssetEntry::dir("html"), AssetEntry::file("robots.txt")]
        );
    }

    #[test]
    fn test_embedded_read_dir_missing() {
        let fs = EmbeddedFs::from_entries(ENTRIES);
        let err = fs.read_dir("templates").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_embedded_read_dir_on_file() {
        let fs = EmbeddedFs::from_entries(ENTRIES);
        assert!(fs.read_dir("readme.txt").is_err());
    }

    #[test]
    fn test_embedded_empty_root_lists_nothing() {
        let fs = EmbeddedFs::new();
        assert!(fs.is_empty());
        assert!(fs.read_dir(".").unwrap().is_empty());
    }

    #[test]
    fn test_embedded_read_to_string() {
        let fs = EmbeddedFs::from_entries(ENTRIES);
        assert_eq!(
            fs.read_to_string("static/html/footer.html").unwrap(),
            "footer"
        );
        let err = fs.read_to_string("static/html/nav.html").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_embedded_insert_replaces() {
        let fs = EmbeddedFs::new()
            .with_file("a.txt", "one")
            .with_file("a.txt", String::from("two"));
        assert_eq!(fs.len(), 1);
        assert_eq!(fs.read_to_string("a.txt").unwrap(), "two");
    }

    #[test]
    fn test_disk_read_dir_sorted() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("html")).unwrap();
        fs::write(temp_dir.path().join("b.txt"), "b").unwrap();
        fs::write(temp_dir.path().join("a.txt"), "a").unwrap();

        let disk = DiskFs::new(temp_dir.path());
        let entries = disk.read_dir(".").unwrap();
        assert_eq!(
            entries,
            vec![
                AssetEntry::file("a.txt"),
                AssetEntry::file("b.txt"),
                AssetEntry::dir("html"),
            ]
        );
    }

    #[test]
    fn test_disk_read_to_string_nested() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("html")).unwrap();
        fs::write(temp_dir.path().join("html/index.html"), "<p>hi</p>").unwrap();

        let disk = DiskFs::new(temp_dir.path());
        assert_eq!(disk.read_to_string("html/index.html").unwrap(), "<p>hi</p>");
    }

    #[test]
    fn test_disk_rejects_parent_paths() {
        let temp_dir = TempDir::new().unwrap();
        let disk = DiskFs::new(temp_dir.path());
        let err = disk.read_to_string("../outside.txt").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn test_shared_handles_delegate() {
        let fs = Arc::new(EmbeddedFs::from_entries(ENTRIES));
        let by_ref = &*fs;
        assert_eq!(by_ref.read_to_string("readme.txt").unwrap(), "readme");
        assert_eq!(fs.read_dir("static/html").unwrap().len(), 2);
    }
}
