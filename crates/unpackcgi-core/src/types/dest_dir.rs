//! Validated output directory type.

use crate::ExtractError;
use crate::Result;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

/// A validated output directory for container extraction.
///
/// This type represents a directory that has been validated to:
/// - Exist on the filesystem (it is created, with parents, if absent)
/// - Be a directory (not a file)
/// - Be writable by the current process
/// - Be represented as an absolute canonical path
///
/// # Security Properties
///
/// Once constructed, a `DestDir` is guaranteed to be a valid, writable
/// directory. All paths are canonicalized so that extracted entry paths can
/// be checked for containment against a stable prefix.
///
/// # Examples
///
/// ```no_run
/// use std::path::PathBuf;
/// use unpackcgi_core::types::DestDir;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dest = DestDir::create(PathBuf::from("/tmp/extracted"))?;
/// println!("Extracting to: {}", dest.as_path().display());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestDir(PathBuf);

impl DestDir {
    /// Creates the output directory if needed and validates it.
    ///
    /// # Validation
    ///
    /// 1. Creates the directory (including parents) if it does not exist
    /// 2. Verifies the path is a directory
    /// 3. Canonicalizes the path to an absolute path
    /// 4. Checks write permissions (Unix)
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The path exists but is not a directory
    /// - The directory cannot be created or canonicalized
    /// - The directory is not writable (on Unix)
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if path.exists() {
            if !path.is_dir() {
                return Err(ExtractError::Io(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("output path is not a directory: {}", path.display()),
                )));
            }
        } else {
            fs::create_dir_all(&path).map_err(|e| {
                ExtractError::Io(std::io::Error::new(
                    e.kind(),
                    format!(
                        "failed to create output directory {}: {}",
                        path.display(),
                        e
                    ),
                ))
            })?;
        }

        // Canonicalize to absolute path
        let canonical = path.canonicalize().map_err(|e| {
            ExtractError::Io(std::io::Error::new(
                e.kind(),
                format!("failed to canonicalize path {}: {}", path.display(), e),
            ))
        })?;

        // Check effective write permissions with access() (Unix only)
        #[cfg(unix)]
        {
            use std::ffi::CString;
            use std::os::unix::ffi::OsStrExt;

            let path_cstring = CString::new(canonical.as_os_str().as_bytes()).map_err(|_| {
                ExtractError::Io(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "path contains null byte",
                ))
            })?;

            // SAFETY: access() is safe to call with a valid C string.
            // The pointer is valid for the duration of the call.
            // access() does not modify the string and returns immediately.
            #[allow(unsafe_code)]
            let result = unsafe { libc::access(path_cstring.as_ptr(), libc::W_OK) };

            if result != 0 {
                return Err(ExtractError::Io(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    format!("output directory is not writable: {}", canonical.display()),
                )));
            }
        }

        Ok(Self(canonical))
    }

    /// Returns the path as a `&Path`.
    #[inline]
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Joins a `SafePath` to this output directory.
    ///
    /// This method combines the output directory with a validated safe
    /// path to produce the final extraction path.
    #[inline]
    #[must_use]
    pub fn join(&self, safe_path: &super::SafePath) -> PathBuf {
        self.0.join(safe_path.as_path())
    }

    /// Converts into the inner `PathBuf`.
    #[inline]
    #[must_use]
    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }
}
