//! Common trait for container format handlers.

use crate::ExtractConfig;
use crate::ExtractionReport;
use crate::ProgressCallback;
use crate::Result;
use crate::types::DestDir;

/// Trait for container format handlers.
pub trait ContainerFormat {
    /// Extracts the container to the output directory.
    ///
    /// Per-entry anomalies (invalid header, unsafe name) are recorded in
    /// the report as skips; only whole-container failures return an error.
    ///
    /// # Errors
    ///
    /// Returns an error if no valid entries are recovered, a quota is
    /// exceeded, or a write fails.
    fn extract(
        &mut self,
        dest: &DestDir,
        config: &ExtractConfig,
        progress: &mut dyn ProgressCallback,
    ) -> Result<ExtractionReport>;

    /// Returns the container format name.
    fn format_name(&self) -> &str;
}
