//! Unified error types for Sketchpack.
//!
//! Fatal conditions are reported through [`Error`]. Conditions that let a read
//! continue are collected as [`Warning`] values on the read result instead.
use std::path::PathBuf;

use thiserror::Error;

/// Main error type for Sketchpack operations.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The archive path does not exist
    #[error("Archive not found: {}", .0.display())]
    ArchiveNotFound(PathBuf),

    /// Not a valid zip container, or a required member is not valid JSON
    #[error("Corrupted archive: {0}")]
    ArchiveCorrupt(String),

    /// The `document.json` entry point is absent
    #[error("Archive has no document.json manifest")]
    MissingDocumentManifest,

    /// A bitmap references an asset that the store cannot supply
    #[error("No asset content for {reference} (layer \"{layer}\")")]
    MissingAssetContent {
        /// Archive-relative reference, e.g. `images/abc.png`
        reference: String,
        /// Name of the bitmap layer holding the reference
        layer: String,
    },

    /// A node value could not be built or does not satisfy an invariant
    #[error("Invalid node: {0}")]
    InvalidNode(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

/// Result type for Sketchpack operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Non-fatal condition recorded while reading an archive.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// A layer carried a class tag with no typed variant; it is kept as an
    /// opaque passthrough node.
    #[error("unknown class tag \"{class}\" on {}", .object_id.as_deref().unwrap_or("<no id>"))]
    UnknownClassTag {
        class: String,
        object_id: Option<String>,
    },
    /// A bitmap references an `images/` member that is not in the archive.
    #[error("layer \"{layer}\" references missing asset {reference}")]
    UnresolvedAsset { reference: String, layer: String },
    /// An `images/` member that no bitmap references.
    #[error("unreferenced asset {member}")]
    OrphanAsset { member: String },
    /// A page member whose base name differs from the page identifier.
    #[error("page member {member} holds page {object_id}")]
    PageNameMismatch { member: String, object_id: String },
    /// An optional member could not be parsed and was replaced by defaults.
    #[error("{member} ignored: {reason}")]
    DegradedMember { member: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = Error::MissingAssetContent {
            reference: "images/missing.png".to_string(),
            layer: "Photo".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "No asset content for images/missing.png (layer \"Photo\")"
        );
        let err = Error::ArchiveNotFound(PathBuf::from("nowhere.sketch"));
        assert_eq!(err.to_string(), "Archive not found: nowhere.sketch");
    }

    #[test]
    fn test_warning_display() {
        let warning = Warning::UnknownClassTag {
            class: "hotspot".to_string(),
            object_id: None,
        };
        assert_eq!(warning.to_string(), "unknown class tag \"hotspot\" on <no id>");
        let warning = Warning::UnknownClassTag {
            class: "hotspot".to_string(),
            object_id: Some("H1".to_string()),
        };
        assert_eq!(warning.to_string(), "unknown class tag \"hotspot\" on H1");
        let warning = Warning::UnresolvedAsset {
            reference: "images/a.png".to_string(),
            layer: "Photo".to_string(),
        };
        assert_eq!(warning.to_string(), "layer \"Photo\" references missing asset images/a.png");
        let warning: &dyn std::error::Error = &Warning::OrphanAsset {
            member: "images/stray.png".to_string(),
        };
        assert_eq!(warning.to_string(), "unreferenced asset images/stray.png");
    }
}
