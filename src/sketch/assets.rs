//! Asset store for archive binaries.
//!
//! Bitmap layers point at `images/` members through weak, path-based
//! references. The store maps a key to binary content, where the key is
//! either the reference with its `images/` prefix removed (`abc.png`) or a
//! name derived from the owning layer (`Photo.png`). The reader records which
//! key each reference was stored under so the writer can find it again.
//!
//! On disk the store is a sidecar directory with one file per key, plus a
//! hidden index of the reference bindings.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path};

use log::{debug, warn};
use serde_json::Value;

use crate::common::{Error, Result};
use crate::sketch::IMAGES_DIR;

/// Hidden sidecar file holding the reference to key bindings.
pub const BINDINGS_FILE: &str = ".sketchpack-bindings.json";

/// Broad kind of an asset, from its file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    /// Raster image (PNG, JPEG, TIFF, ...)
    Image,
    /// PDF or SVG content
    Vector,
    /// Anything else
    Unknown,
}

impl AssetKind {
    /// Detect the asset kind from a file extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "png" | "jpg" | "jpeg" | "gif" | "tiff" | "tif" | "bmp" | "heic" | "webp" => {
                AssetKind::Image
            },
            "pdf" | "svg" => AssetKind::Vector,
            _ => AssetKind::Unknown,
        }
    }

    /// Detect the asset kind of a store key or member path
    pub fn of(key: &str) -> Self {
        Path::new(key)
            .extension()
            .and_then(|e| e.to_str())
            .map(Self::from_extension)
            .unwrap_or(AssetKind::Unknown)
    }
}

/// Key to binary content, plus the key chosen for each asset reference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetStore {
    entries: BTreeMap<String, Vec<u8>>,
    bindings: BTreeMap<String, String>,
}

impl AssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store content under `key`, returning the previous content.
    pub fn insert(&mut self, key: impl Into<String>, data: Vec<u8>) -> Option<Vec<u8>> {
        self.entries.insert(key.into(), data)
    }

    pub fn get(&self, key: &str) -> Option<&[u8]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    #[inline]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Remove an entry and any reference bound to it.
    pub fn remove(&mut self, key: &str) -> Option<Vec<u8>> {
        self.bindings.retain(|_, bound| bound != key);
        self.entries.remove(key)
    }

    /// Keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record that `reference` is stored under `key`.
    pub fn bind(&mut self, reference: impl Into<String>, key: impl Into<String>) {
        self.bindings.insert(reference.into(), key.into());
    }

    /// Key recorded for `reference`, if any.
    pub fn binding(&self, reference: &str) -> Option<&str> {
        self.bindings.get(reference).map(String::as_str)
    }

    /// Find the content for a reference held by the layer named `layer_name`.
    ///
    /// Tries, in order: the recorded binding, the layer-derived key, the
    /// reference without its `images/` prefix, and the reference itself.
    /// A layer-derived key bound to another reference is passed over.
    /// Returns the matching key with the content.
    pub fn resolve(&self, reference: &str, layer_name: &str) -> Option<(&str, &[u8])> {
        let bound = self.binding(reference).map(str::to_string);
        let by_layer = layer_asset_key(layer_name, reference).filter(|key| {
            !self
                .bindings
                .iter()
                .any(|(other, other_key)| other_key == key && other != reference)
        });
        let candidates = bound
            .into_iter()
            .chain(by_layer)
            .chain([reference_key(reference).to_string(), reference.to_string()]);
        for candidate in candidates {
            if let Some((key, data)) = self.entries.get_key_value(&candidate) {
                return Some((key.as_str(), data.as_slice()));
            }
        }
        None
    }

    /// Write every entry to `dir`, one file per key, creating directories as
    /// needed, followed by the binding index. Keys that would escape `dir`
    /// are skipped. Files already in `dir` are left alone.
    pub fn save_to_dir(&self, dir: &Path) -> Result<usize> {
        fs::create_dir_all(dir)?;
        let mut written = 0;
        for (key, data) in &self.entries {
            if !is_safe_key(key) {
                warn!("Skipping asset with unsafe key {:?}", key);
                continue;
            }
            let target = dir.join(key);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&target, data)?;
            written += 1;
        }
        fs::write(dir.join(BINDINGS_FILE), serde_json::to_vec_pretty(&self.bindings)?)?;
        debug!("Saved {} assets to {}", written, dir.display());
        Ok(written)
    }

    /// Make `dir` hold exactly this store.
    ///
    /// The content is staged in a hidden directory beside `dir` and swapped
    /// in once complete, so files from an earlier save do not survive.
    pub fn replace_dir(&self, dir: &Path) -> Result<usize> {
        let parent = match dir.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent)?;
        let staging = tempfile::Builder::new()
            .prefix(".sketchpack")
            .tempdir_in(parent)?;
        let written = self.save_to_dir(staging.path())?;
        if dir.is_dir() {
            fs::remove_dir_all(dir)?;
        } else if dir.exists() {
            return Err(Error::Other(format!("{} is not a directory", dir.display())));
        }
        fs::rename(staging.path(), dir)?;
        debug!("Replaced {} with {} assets", dir.display(), written);
        Ok(written)
    }

    /// Load a store from a sidecar directory. Keys are `/`-separated paths
    /// relative to `dir`; hidden files are skipped. A missing directory yields
    /// an empty store.
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let mut store = Self::new();
        if !dir.exists() {
            return Ok(store);
        }
        if !dir.is_dir() {
            return Err(Error::Other(format!("{} is not a directory", dir.display())));
        }
        Self::load_recursive(dir, "", &mut store)?;
        store.load_bindings(&dir.join(BINDINGS_FILE))?;
        debug!("Loaded {} assets from {}", store.len(), dir.display());
        Ok(store)
    }

    /// Restore bindings from an index file. Entries whose key has no content
    /// are dropped; an unreadable index is ignored with a warning.
    fn load_bindings(&mut self, index: &Path) -> Result<()> {
        if !index.is_file() {
            return Ok(());
        }
        let map = match serde_json::from_slice::<Value>(&fs::read(index)?) {
            Ok(Value::Object(map)) => map,
            Ok(_) | Err(_) => {
                warn!("Ignoring malformed binding index {}", index.display());
                return Ok(());
            },
        };
        for (reference, key) in map {
            match key.as_str() {
                Some(key) if self.contains(key) => self.bind(reference, key),
                _ => debug!("Dropping stale binding for {}", reference),
            }
        }
        Ok(())
    }

    fn load_recursive(dir: &Path, prefix: &str, store: &mut Self) -> Result<()> {
        let mut entries = fs::read_dir(dir)?.collect::<std::io::Result<Vec<_>>>()?;
        entries.sort_by_key(|e| e.file_name());
        for entry in entries {
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                warn!("Skipping non UTF-8 asset name {:?}", entry.path());
                continue;
            };
            if name.starts_with('.') {
                continue;
            }
            let key = format!("{}{}", prefix, name);
            let path = entry.path();
            if path.is_dir() {
                Self::load_recursive(&path, &format!("{}/", key), store)?;
            } else if path.is_file() {
                store.insert(key, fs::read(&path)?);
            }
        }
        Ok(())
    }

    /// Summary counts over the stored content.
    pub fn stats(&self) -> AssetStats {
        let mut stats = AssetStats {
            total_count: self.entries.len(),
            ..AssetStats::default()
        };
        for (key, data) in &self.entries {
            stats.total_size += data.len() as u64;
            match AssetKind::of(key) {
                AssetKind::Image => stats.image_count += 1,
                AssetKind::Vector => stats.vector_count += 1,
                AssetKind::Unknown => stats.unknown_count += 1,
            }
        }
        stats
    }
}

/// Statistics about the content of an asset store
#[derive(Debug, Clone, Default)]
pub struct AssetStats {
    /// Number of entries
    pub total_count: usize,
    /// Total content size in bytes
    pub total_size: u64,
    /// Number of raster images
    pub image_count: usize,
    /// Number of vector assets
    pub vector_count: usize,
    /// Number of other entries
    pub unknown_count: usize,
}

impl AssetStats {
    /// Get a one-line summary
    pub fn summary(&self) -> String {
        format!(
            "{} assets ({}) - {} images, {} vector, {} other",
            self.total_count,
            format_bytes(self.total_size),
            self.image_count,
            self.vector_count,
            self.unknown_count
        )
    }
}

/// Format a byte count as a human-readable string
fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    format!("{:.2} {}", size, UNITS[unit_index])
}

/// Store key for a reference: the reference without its `images/` prefix.
pub fn reference_key(reference: &str) -> &str {
    reference.strip_prefix(IMAGES_DIR).unwrap_or(reference)
}

/// Store key derived from a bitmap layer's name: the name made safe for a
/// file system, with the reference's extension. `None` for blank names.
pub fn layer_asset_key(layer_name: &str, reference: &str) -> Option<String> {
    let name: String = layer_name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let name = name.trim_start_matches('.');
    if name.is_empty() {
        return None;
    }
    match Path::new(reference).extension().and_then(|e| e.to_str()) {
        Some(ext) if !name.to_lowercase().ends_with(&format!(".{}", ext.to_lowercase())) => {
            Some(format!("{}.{}", name, ext))
        },
        _ => Some(name.to_string()),
    }
}

/// Whether `key` stays inside the directory it is joined to.
fn is_safe_key(key: &str) -> bool {
    !key.is_empty()
        && Path::new(key)
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
}
