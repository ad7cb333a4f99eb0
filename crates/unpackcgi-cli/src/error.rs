//! Error conversion utilities for CLI.
//!
//! Converts unpackcgi-core's typed errors (thiserror) into user-friendly
//! contextual errors (anyhow) with actionable guidance.

use anyhow::anyhow;
use std::path::Path;
use unpackcgi_core::ExtractError;

/// Converts `ExtractError` to a user-friendly anyhow error with context
pub fn convert_extract_error(err: ExtractError, firmware: &Path) -> anyhow::Error {
    match err {
        ExtractError::CorruptContainer(reason) => {
            anyhow!(
                "Invalid configuration blob '{}': {}\n\
                 HINT: The blob may be truncated or not a cgi_config partition at all.\n\
                 Re-carve it from the firmware image and check the offset.",
                firmware.display(),
                reason
            )
        }
        ExtractError::PathTraversal { path } => {
            anyhow!(
                "Security violation: blob '{}' attempted path traversal with '{}'\n\
                 HINT: This blob may be malicious. Do not unpack from untrusted sources.",
                firmware.display(),
                path.display()
            )
        }
        ExtractError::QuotaExceeded { resource } => {
            anyhow!(
                "Extraction limit exceeded for '{}': {}\n\
                 HINT: Use --max-files, --max-total-size, or --max-file-size to increase limits.",
                firmware.display(),
                resource
            )
        }
        ExtractError::SecurityViolation { reason } => {
            anyhow!(
                "Security violation in '{}': {}\n\
                 HINT: The blob contains an entry that cannot be written safely.",
                firmware.display(),
                reason
            )
        }
        ExtractError::Io(io_err) => {
            anyhow!(
                "I/O error while processing '{}': {}",
                firmware.display(),
                io_err
            )
        }
    }
}

/// Adds blob context to a core extraction result
pub fn add_blob_context<T>(
    result: Result<T, ExtractError>,
    firmware: &Path,
) -> anyhow::Result<T> {
    result.map_err(|e| convert_extract_error(e, firmware))
}
