//! Type-safe wrappers for container extraction.
//!
//! This module provides newtypes that enforce path-safety validation at the
//! type level. All types are validated upon construction and cannot be
//! created from raw types without going through validation.
//!
//! # Design Principles
//!
//! - Type-driven security: Invalid states cannot be represented
//! - Zero-cost abstractions: Newtypes compile to underlying types
//! - No `From<RawType>` implementations for security types
//! - All constructors perform validation

pub mod dest_dir;
pub mod safe_path;

pub use dest_dir::DestDir;
pub use safe_path::SafePath;
