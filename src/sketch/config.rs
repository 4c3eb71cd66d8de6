//! Options for reading, writing and comparing archives.
//!
//! Every option type is a plain struct with public fields, a `Default`, and
//! chainable `with_*` setters.

use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::sketch::node::ID_KEY;

/// Key excluded from comparison by default as non-semantic.
pub const USER_INFO_KEY: &str = "userInfo";

/// Options for [`ArchiveReader`](crate::sketch::ArchiveReader).
///
/// # Examples
///
/// ```rust
/// use sketchpack::sketch::ReadOptions;
///
/// let options = ReadOptions::new()
///     .with_sidecar(false)
///     .with_layer_names(false);
/// assert!(!options.materialize_sidecar);
/// ```
#[derive(Debug, Clone)]
pub struct ReadOptions {
    /// Write the asset store to a sidecar directory after a successful read.
    ///
    /// Only applies when the archive is read from a path, or when
    /// [`assets_dir`](Self::assets_dir) is set.
    pub materialize_sidecar: bool,
    /// Sidecar directory to use instead of `<stem>_images/` beside the archive.
    pub assets_dir: Option<PathBuf>,
    /// Key referenced assets by their bitmap layer's name when that name is
    /// unambiguous, instead of the hash-derived member name.
    pub name_assets_by_layer: bool,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            materialize_sidecar: true,
            assets_dir: None,
            name_assets_by_layer: true,
        }
    }
}

impl ReadOptions {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn with_sidecar(mut self, materialize: bool) -> Self {
        self.materialize_sidecar = materialize;
        self
    }

    /// Materialize assets into `dir`. Also enables materialization.
    #[inline]
    pub fn with_assets_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.assets_dir = Some(dir.into());
        self.materialize_sidecar = true;
        self
    }

    #[inline]
    pub fn with_layer_names(mut self, enabled: bool) -> Self {
        self.name_assets_by_layer = enabled;
        self
    }
}

/// Options for [`ArchiveWriter`](crate::sketch::ArchiveWriter).
#[derive(Debug, Clone, Default)]
pub struct WriteOptions {
    /// Indent JSON members.
    pub pretty_json: bool,
    /// Deflate image members. Images are usually compressed already, so they
    /// are stored by default.
    pub compress_images: bool,
}

impl WriteOptions {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn with_pretty_json(mut self, pretty: bool) -> Self {
        self.pretty_json = pretty;
        self
    }

    #[inline]
    pub fn with_compressed_images(mut self, compress: bool) -> Self {
        self.compress_images = compress;
        self
    }
}

/// Options for [`Comparator`](crate::sketch::Comparator).
///
/// # Examples
///
/// ```rust
/// use sketchpack::sketch::CompareOptions;
///
/// let options = CompareOptions::new().with_object_ids(true).ignore("name");
/// assert!(options.is_ignored("name"));
/// assert!(!options.is_ignored("do_objectID"));
/// assert!(options.is_ignored("userInfo"));
/// ```
#[derive(Debug, Clone)]
pub struct CompareOptions {
    /// Keys skipped on nodes and on nested mappings.
    pub ignored: BTreeSet<String>,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            ignored: [ID_KEY, USER_INFO_KEY].iter().map(|k| k.to_string()).collect(),
        }
    }
}

impl CompareOptions {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Include (`true`) or skip (`false`) object identifiers.
    pub fn with_object_ids(mut self, compare: bool) -> Self {
        if compare {
            self.ignored.remove(ID_KEY);
        } else {
            self.ignored.insert(ID_KEY.to_string());
        }
        self
    }

    /// Add a key to the ignore list.
    pub fn ignore(mut self, key: impl Into<String>) -> Self {
        self.ignored.insert(key.into());
        self
    }

    #[inline]
    pub fn is_ignored(&self, key: &str) -> bool {
        self.ignored.contains(key)
    }

    #[inline]
    pub fn ignores_object_ids(&self) -> bool {
        self.is_ignored(ID_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_defaults() {
        let options = ReadOptions::default();
        assert!(options.materialize_sidecar);
        assert!(options.name_assets_by_layer);
        assert!(options.assets_dir.is_none());

        let options = ReadOptions::new().with_sidecar(false).with_assets_dir("/tmp/x");
        assert!(options.materialize_sidecar);
    }

    #[test]
    fn test_compare_ignore_list() {
        let options = CompareOptions::default();
        assert!(options.ignores_object_ids());
        assert!(options.is_ignored("userInfo"));
        let options = options.with_object_ids(true);
        assert!(!options.ignores_object_ids());
        let options = options.with_object_ids(false);
        assert!(options.ignores_object_ids());
    }
}
