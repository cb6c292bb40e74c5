//! Utility functions
//!
//! **Why**: Centralized helpers used across multiple modules
//!
//! **Used by**: export (report paths), review (export naming)

pub mod sequences;

pub use sequences::{is_sequence_pattern, normalize_sequence_notation, strip_padding};
