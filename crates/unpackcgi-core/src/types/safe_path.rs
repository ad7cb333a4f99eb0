//! Validated safe path type for entry names.

use crate::ExtractConfig;
use crate::ExtractError;
use crate::Result;
use std::borrow::Cow;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use super::DestDir;

/// A validated entry path that is safe to write under the output directory.
///
/// `SafePath` represents a path that has been validated to not contain:
/// - Path traversal attempts (`..`)
/// - Null bytes
/// - Absolute paths (unless explicitly allowed)
/// - Excessive path depth
///
/// # Security Properties
///
/// - Can ONLY be constructed through validation
/// - NO `From<PathBuf>` implementation (security critical)
/// - Always resolves within the output directory
/// - Normalized to remove redundant `.` components
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use std::path::PathBuf;
/// use unpackcgi_core::ExtractConfig;
/// use unpackcgi_core::types::DestDir;
/// use unpackcgi_core::types::SafePath;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dest = DestDir::create(PathBuf::from("/tmp/out"))?;
/// let config = ExtractConfig::default();
///
/// // Valid entry name
/// let safe = SafePath::validate(Path::new("web/cgi/config.ini"), &dest, &config)?;
///
/// // Traversal is rejected
/// assert!(SafePath::validate(Path::new("../etc/passwd"), &dest, &config).is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SafePath(PathBuf);

impl SafePath {
    /// Validates and constructs a `SafePath`.
    ///
    /// This is the ONLY way to construct a `SafePath`.
    ///
    /// # Validation Steps
    ///
    /// 1. Reject empty paths
    /// 2. Check for null bytes
    /// 3. Reject absolute paths (unless allowed by config)
    /// 4. Reject parent directory traversal (`..`)
    /// 5. Enforce the maximum path depth
    /// 6. Normalize away `.` components
    /// 7. Verify the resolved path stays within the output directory,
    ///    canonicalizing existing parents so symlinked intermediates
    ///    cannot redirect the write
    ///
    /// # Errors
    ///
    /// - `ExtractError::PathTraversal` for `..`, absolute, or escaping paths
    /// - `ExtractError::SecurityViolation` for null bytes or excessive depth
    pub fn validate(path: &Path, dest: &DestDir, config: &ExtractConfig) -> Result<Self> {
        if path.as_os_str().is_empty() {
            return Err(ExtractError::PathTraversal {
                path: path.to_path_buf(),
            });
        }

        if has_null_bytes(path) {
            return Err(ExtractError::SecurityViolation {
                reason: format!("entry name contains null bytes: {}", path.display()),
            });
        }

        if path.is_absolute() && !config.allow_absolute_paths {
            return Err(ExtractError::PathTraversal {
                path: path.to_path_buf(),
            });
        }

        // Single pass: validate components, count depth, normalize.
        let mut depth = 0;
        let mut normalized = PathBuf::new();
        let mut needs_normalization = false;

        for component in path.components() {
            match component {
                Component::ParentDir => {
                    return Err(ExtractError::PathTraversal {
                        path: path.to_path_buf(),
                    });
                }
                Component::Normal(_) => {
                    depth += 1;
                    normalized.push(component);
                }
                Component::CurDir => {
                    needs_normalization = true;
                }
                Component::RootDir | Component::Prefix(_) => {
                    if !config.allow_absolute_paths {
                        return Err(ExtractError::PathTraversal {
                            path: path.to_path_buf(),
                        });
                    }
                    normalized.push(component);
                }
            }
        }

        if depth == 0 {
            return Err(ExtractError::PathTraversal {
                path: path.to_path_buf(),
            });
        }

        if depth > config.max_path_depth {
            return Err(ExtractError::SecurityViolation {
                reason: format!(
                    "entry path depth {} exceeds maximum {}",
                    depth, config.max_path_depth
                ),
            });
        }

        let final_path = if needs_normalization {
            Cow::Owned(normalized)
        } else {
            Cow::Borrowed(path)
        };

        let resolved = dest.as_path().join(final_path.as_ref());

        // Canonicalize the parent chain so a symlinked intermediate
        // directory cannot redirect the write outside the destination.
        if let Some(parent) = resolved.parent() {
            match parent.canonicalize() {
                Ok(canonical_parent) => {
                    if !canonical_parent.starts_with(dest.as_path()) {
                        return Err(ExtractError::PathTraversal {
                            path: path.to_path_buf(),
                        });
                    }
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    // Parent doesn't exist yet, created later during the write
                }
                Err(e) => {
                    return Err(ExtractError::Io(std::io::Error::new(
                        e.kind(),
                        format!("failed to canonicalize parent: {e}"),
                    )));
                }
            }
        }

        match resolved.canonicalize() {
            Ok(canonical) => {
                if !canonical.starts_with(dest.as_path()) {
                    return Err(ExtractError::PathTraversal {
                        path: path.to_path_buf(),
                    });
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                if !resolved.starts_with(dest.as_path()) {
                    return Err(ExtractError::PathTraversal {
                        path: path.to_path_buf(),
                    });
                }
            }
            Err(e) => {
                return Err(ExtractError::Io(std::io::Error::new(
                    e.kind(),
                    format!("failed to canonicalize path: {e}"),
                )));
            }
        }

        Ok(Self(final_path.into_owned()))
    }

    /// Returns the path as a `&Path`.
    #[inline]
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Converts into the inner `PathBuf`.
    #[inline]
    #[must_use]
    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }
}

/// Checks if a path contains null bytes.
#[cfg(unix)]
fn has_null_bytes(path: &Path) -> bool {
    use std::os::unix::ffi::OsStrExt;
    path.as_os_str().as_bytes().contains(&b'\0')
}

/// Checks if a path contains null bytes.
#[cfg(not(unix))]
fn has_null_bytes(path: &Path) -> bool {
    path.to_str().is_none_or(|s| s.contains('\0'))
}
