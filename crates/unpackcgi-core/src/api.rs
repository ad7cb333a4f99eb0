//! High-level public API for configuration blob extraction.

use std::fs;
use std::path::Path;
use std::time::Instant;

use crate::ExtractConfig;
use crate::ExtractionReport;
use crate::NoopProgress;
use crate::ProgressCallback;
use crate::Result;
use crate::formats::ContainerFormat;
use crate::formats::ContainerKind;
use crate::formats::Jffs2Image;
use crate::formats::RecordContainer;
use crate::formats::detect_format;
use crate::types::DestDir;

/// Extracts a configuration blob to the specified output directory.
///
/// This is the main high-level API. The container layout (JFFS2 image or
/// length-prefixed record container) is detected from the blob's content,
/// and every entry is validated against the destination before anything
/// is written.
///
/// # Errors
///
/// Returns an error if:
/// - The input file cannot be read
/// - The output directory cannot be created or is not writable
/// - No valid entries are recovered from the blob
/// - A security quota is exceeded
/// - I/O operations fail
///
/// # Examples
///
/// ```no_run
/// use unpackcgi_core::ExtractConfig;
/// use unpackcgi_core::extract_container;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ExtractConfig::default();
/// let report = extract_container("cgi_config.bin", "config_out", &config)?;
/// println!("Extracted {} files", report.files_extracted);
/// # Ok(())
/// # }
/// ```
pub fn extract_container<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output_dir: Q,
    config: &ExtractConfig,
) -> Result<ExtractionReport> {
    let mut progress = NoopProgress;
    extract_container_with_progress(input, output_dir, config, &mut progress)
}

/// Extracts a configuration blob, reporting progress through a callback.
///
/// Identical to [`extract_container`] except that entry and byte events are
/// delivered to `progress` as extraction proceeds.
///
/// # Errors
///
/// Same failure modes as [`extract_container`].
pub fn extract_container_with_progress<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output_dir: Q,
    config: &ExtractConfig,
    progress: &mut dyn ProgressCallback,
) -> Result<ExtractionReport> {
    let start = Instant::now();

    let data = fs::read(input.as_ref())?;
    let dest = DestDir::create(output_dir.as_ref())?;

    let mut report = match detect_format(&data) {
        ContainerKind::Jffs2 => Jffs2Image::new(data).extract(&dest, config, progress)?,
        ContainerKind::Record => RecordContainer::new(data).extract(&dest, config, progress)?,
    };

    report.duration = start.elapsed();
    progress.on_complete();
    Ok(report)
}
