//! Unified error types for Sketchpack.
//!
//! This module provides the fatal error type shared by the reader, writer and
//! node model, and the non-fatal warnings collected during a read.

// Submodule declarations
pub mod types;
pub mod conversions;

// Re-exports
pub use types::{Error, Result, Warning};
