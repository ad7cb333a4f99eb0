//! Firmware configuration blob extraction library with security validation.
//!
//! `unpackcgi-core` unpacks the `cgi_config.bin` configuration partitions
//! found in MStar-based DVR/NVR firmware. The blobs are small JFFS2 images
//! (a length-prefixed record variant is also handled), and this crate
//! rebuilds the contained file tree with built-in protection against path
//! traversal, decompression bombs, and symlink attacks.
//!
//! # Examples
//!
//! ```no_run
//! use unpackcgi_core::ExtractConfig;
//! use unpackcgi_core::extract_container;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ExtractConfig::default();
//! let report = extract_container("cgi_config.bin", "config_out", &config)?;
//! println!("Extracted {} files", report.files_extracted);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod config;
pub mod error;
pub mod extraction;
pub mod formats;
pub mod report;
pub mod types;

// Re-export main API types
pub use api::extract_container;
pub use api::extract_container_with_progress;
pub use config::ExtractConfig;
pub use error::ExtractError;
pub use error::QuotaResource;
pub use error::Result;
pub use report::ExtractionReport;
pub use report::NoopProgress;
pub use report::ProgressCallback;

// Re-export types module for easier access
pub use types::DestDir;
pub use types::SafePath;
