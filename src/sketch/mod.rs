//! Sketch design archive support.
//!
//! A `.sketch` file is a zip container holding JSON members and binary
//! assets:
//! - `document.json`: entry point, shared styles and the ordered page list
//! - `user.json`, `meta.json`: view state and producing-application metadata
//! - `pages/<id>.json`: one member per page, named by the page identifier
//! - `images/`: bitmap content referenced by bitmap layers
//! - `previews/preview.png`: rendered snapshot of the first page
//!
//! # Examples
//!
//! ```rust,no_run
//! use sketchpack::sketch::{self, CompareOptions};
//!
//! let loaded = sketch::read("design.sketch")?;
//! for warning in &loaded.warnings {
//!     println!("warning: {}", warning);
//! }
//! sketch::write("copy.sketch", &loaded.file, &loaded.assets)?;
//!
//! let copy = sketch::read("copy.sketch")?;
//! let diffs = sketch::compare(&loaded.file, &copy.file, &CompareOptions::default());
//! assert!(diffs.is_empty());
//! # Ok::<(), sketchpack::Error>(())
//! ```

pub mod assets;
pub mod compare;
pub mod config;
pub mod file;
pub mod node;
pub mod reader;
pub mod writer;

#[cfg(test)]
pub(crate) mod test_support;

use std::path::Path;

pub use assets::AssetStore;
pub use compare::{Comparator, Discrepancy, DiscrepancyKind, pretty_print};
pub use config::{CompareOptions, ReadOptions, WriteOptions};
pub use file::{LayerQuery, SketchFile, sidecar_dir};
pub use reader::{ArchiveReader, LoadedArchive};
pub use writer::{ArchiveWriter, WriteReport};

use crate::common::Result;

/// Archive file extension, without the dot.
pub const FILE_EXTENSION: &str = "sketch";
pub const DOCUMENT_JSON: &str = "document.json";
pub const USER_JSON: &str = "user.json";
pub const META_JSON: &str = "meta.json";
pub const PAGES_DIR: &str = "pages/";
pub const IMAGES_DIR: &str = "images/";
pub const PREVIEWS_DIR: &str = "previews/";
/// Asset store key of the archive preview.
pub const PREVIEW_NAME: &str = "preview.png";
/// Suffix of the sidecar asset directory, `<stem>_images/`.
pub const SIDECAR_SUFFIX: &str = "_images";
/// `_ref_class` of a page reference.
pub const MS_IMMUTABLE_PAGE: &str = "MSImmutablePage";
/// `_ref_class` of an image reference.
pub const MS_IMAGE_DATA: &str = "MSImageData";
/// Application version written into new `meta.json` members.
pub const APP_VERSION: &str = "61.2";
/// Application identifier written into new `meta.json` members.
pub const APP_ID: &str = "com.bohemiancoding.sketch3";

/// Read an archive with default options.
pub fn read<P: AsRef<Path>>(path: P) -> Result<LoadedArchive> {
    ArchiveReader::default().read(path)
}

/// Write an archive with default options.
pub fn write<P: AsRef<Path>>(path: P, file: &SketchFile, assets: &AssetStore) -> Result<WriteReport> {
    ArchiveWriter::default().write(path, file, assets)
}

/// Compare two files; an empty result means they are structurally equal.
pub fn compare(left: &SketchFile, right: &SketchFile, options: &CompareOptions) -> Vec<Discrepancy> {
    Comparator::new(options.clone()).compare_files(left, right)
}
