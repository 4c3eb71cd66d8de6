//! Sketchpack - A Rust library for reading, writing and diffing Sketch design archives
//!
//! A `.sketch` file is a zip container of JSON members (the document, user
//! state, application metadata and one member per page) plus the binary
//! assets bitmap layers reference. This library loads such an archive into a
//! typed node graph and an asset store, writes the pair back out, and
//! compares two graphs structurally.
//!
//! # Features
//!
//! - **Typed node model**: artboards, groups, shapes, bitmaps and text as Rust
//!   types, with unknown class tags kept as opaque passthrough nodes
//! - **Lossless round trips**: fields a node type does not declare are kept
//!   verbatim and written back unchanged
//! - **Asset store**: bitmap content keyed by layer name, with an optional
//!   sidecar directory beside the archive
//! - **Atomic writes**: archives are assembled in a temporary file and moved
//!   into place only when complete
//! - **Structural comparison**: located discrepancies with a configurable
//!   ignore list
//!
//! # Example - Reading an archive
//!
//! ```no_run
//! use sketchpack::sketch;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let loaded = sketch::read("design.sketch")?;
//! for page in loaded.file.ordered_pages() {
//!     for artboard in page.artboards() {
//!         println!("{}: {}x{}", artboard.props.name, artboard.width(), artboard.height());
//!     }
//! }
//! for warning in &loaded.warnings {
//!     eprintln!("warning: {}", warning);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Authoring a new archive
//!
//! ```no_run
//! use sketchpack::sketch::{self, AssetStore, SketchFile};
//! use sketchpack::sketch::node::{Artboard, Bitmap, Page, Rect};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut artboard = Artboard::new("Cover", Rect::new(0.0, 0.0, 576.0, 783.0));
//! artboard.push_layer(Bitmap::new("Logo", Rect::new(10.0, 10.0, 64.0, 64.0), "images/logo.png"));
//! let mut page = Page::new("Page 1");
//! page.push_layer(artboard);
//!
//! let mut file = SketchFile::new();
//! file.add_page(page);
//!
//! let mut assets = AssetStore::new();
//! assets.insert("Logo.png", std::fs::read("logo.png")?);
//! sketch::write("cover.sketch", &file, &assets)?;
//! # Ok(())
//! # }
//! ```

/// Shared infrastructure: error types, identifiers and number handling.
pub mod common;

/// The Sketch archive codec: node model, asset store, reader, writer and
/// comparator.
pub mod sketch;

// Re-export commonly used types for convenience
pub use common::{Error, Result, Warning};
pub use sketch::{
    ArchiveReader, ArchiveWriter, AssetStore, Comparator, CompareOptions, Discrepancy,
    LoadedArchive, ReadOptions, SketchFile, WriteOptions, WriteReport,
};
