//! Extraction limits and policy configuration.

/// Extraction configuration with default-deny settings.
///
/// Firmware blobs are reverse-engineered input: headers can declare absurd
/// lengths and entry names can attempt to escape the output directory. The
/// limits here bound what a single extraction is allowed to write.
///
/// # Examples
///
/// ```
/// use unpackcgi_core::ExtractConfig;
///
/// // Secure defaults
/// let config = ExtractConfig::default();
///
/// // Customize for specific needs
/// let custom = ExtractConfig {
///     max_file_size: 128 * 1024 * 1024, // 128 MB
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Maximum size for a single extracted file in bytes.
    pub max_file_size: u64,

    /// Maximum total size for all extracted files in bytes.
    pub max_total_size: u64,

    /// Maximum number of files that can be extracted.
    pub max_file_count: usize,

    /// Maximum path depth allowed for entry names.
    pub max_path_depth: usize,

    /// Allow symlink entries (JFFS2 containers can carry them).
    pub allow_symlinks: bool,

    /// Allow absolute paths in entry names.
    pub allow_absolute_paths: bool,

    /// Apply file permission bits recovered from the container (Unix).
    pub preserve_permissions: bool,
}

impl Default for ExtractConfig {
    /// Creates an `ExtractConfig` with secure default settings.
    ///
    /// Default values:
    /// - `max_file_size`: 64 MB
    /// - `max_total_size`: 512 MB
    /// - `max_file_count`: 10,000
    /// - `max_path_depth`: 32
    /// - `allow_symlinks`: false (deny)
    /// - `allow_absolute_paths`: false (deny)
    /// - `preserve_permissions`: false
    fn default() -> Self {
        Self {
            max_file_size: 64 * 1024 * 1024,    // 64 MB
            max_total_size: 512 * 1024 * 1024,  // 512 MB
            max_file_count: 10_000,
            max_path_depth: 32,
            allow_symlinks: false,
            allow_absolute_paths: false,
            preserve_permissions: false,
        }
    }
}

impl ExtractConfig {
    /// Creates a permissive configuration for trusted images.
    ///
    /// Allows symlinks and preserves permission bits. Use only when the
    /// firmware dump comes from a device you control.
    #[must_use]
    pub fn permissive() -> Self {
        Self {
            allow_symlinks: true,
            preserve_permissions: true,
            ..Default::default()
        }
    }
}
