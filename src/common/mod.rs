//! Common types and utilities shared by the node model, reader and writer.
//!
//! This module holds the crate-wide error type, object identifier generation
//! and the number formatting used when nodes are written back to JSON.

// Submodule declarations
pub mod error;
pub mod id;
pub mod number;

// Re-exports for convenience
pub use error::{Error, Result, Warning};
pub use id::new_object_id;
