//! Error conversion implementations.
//!
//! This module contains From trait implementations to convert errors from the
//! zip, JSON and temporary-file layers into the unified Error type.

use super::types::Error;

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => Error::Io(e),
            other => Error::ArchiveCorrupt(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        if err.is_io() {
            Error::Io(std::io::Error::other(err))
        } else {
            Error::InvalidNode(err.to_string())
        }
    }
}

impl From<tempfile::PersistError> for Error {
    fn from(err: tempfile::PersistError) -> Self {
        Error::Io(err.error)
    }
}

impl Error {
    /// Wrap a JSON failure on an archive member as archive corruption.
    pub(crate) fn corrupt_member(member: &str, err: serde_json::Error) -> Self {
        Error::ArchiveCorrupt(format!("{}: {}", member, err))
    }
}
