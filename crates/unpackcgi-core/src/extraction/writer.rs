//! Shared write path for extracted entries.
//!
//! Both container formats funnel their disk writes through these helpers so
//! that quota enforcement, parent directory creation, and report bookkeeping
//! stay consistent.

use std::fs::File;
use std::fs::create_dir_all;
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;

use crate::ExtractConfig;
use crate::ExtractError;
use crate::ExtractionReport;
use crate::ProgressCallback;
use crate::Result;
use crate::error::QuotaResource;
use crate::types::DestDir;
use crate::types::SafePath;

/// Writes one entry payload to disk under the output directory.
///
/// Quotas are checked BEFORE writing so an over-limit entry never leaves a
/// partial file behind. On success the report's counters and `output_paths`
/// are updated and the progress callback is notified of the bytes written.
///
/// # Errors
///
/// Returns `QuotaExceeded` if the file count, single-file size, or total
/// size limit would be exceeded, or an I/O error if the write fails.
pub(crate) fn write_file(
    payload: &[u8],
    safe_path: &SafePath,
    mode: Option<u32>,
    dest: &DestDir,
    config: &ExtractConfig,
    report: &mut ExtractionReport,
    progress: &mut dyn ProgressCallback,
) -> Result<()> {
    let size = payload.len() as u64;

    if report.files_extracted + 1 > config.max_file_count {
        return Err(ExtractError::QuotaExceeded {
            resource: QuotaResource::FileCount {
                current: report.files_extracted + 1,
                max: config.max_file_count,
            },
        });
    }

    if size > config.max_file_size {
        return Err(ExtractError::QuotaExceeded {
            resource: QuotaResource::FileSize {
                size,
                max: config.max_file_size,
            },
        });
    }

    let total = report
        .bytes_written
        .checked_add(size)
        .ok_or(ExtractError::QuotaExceeded {
            resource: QuotaResource::IntegerOverflow,
        })?;
    if total > config.max_total_size {
        return Err(ExtractError::QuotaExceeded {
            resource: QuotaResource::TotalSize {
                current: total,
                max: config.max_total_size,
            },
        });
    }

    let output_path = dest.join(safe_path);

    if let Some(parent) = output_path.parent() {
        create_dir_all(parent)?;
    }

    let output_file = File::create(&output_path)?;
    let mut writer = BufWriter::with_capacity(64 * 1024, output_file);
    writer.write_all(payload)?;
    writer.flush()?;

    // Apply permission bits recovered from the container (Unix only)
    #[cfg(unix)]
    if config.preserve_permissions
        && let Some(mode) = mode
    {
        use std::os::unix::fs::PermissionsExt;
        let permissions = std::fs::Permissions::from_mode(mode & 0o7777);
        std::fs::set_permissions(&output_path, permissions)?;
    }
    #[cfg(not(unix))]
    let _ = mode;

    report.files_extracted += 1;
    report.bytes_written = total;
    report.output_paths.push(safe_path.as_path().to_path_buf());
    progress.on_bytes_written(size);

    Ok(())
}

/// Creates a directory entry under the output directory.
///
/// Idempotent: `create_dir_all` succeeds silently when the directory
/// already exists. Directories do not count toward the byte quota.
pub(crate) fn create_directory(
    safe_path: &SafePath,
    dest: &DestDir,
    report: &mut ExtractionReport,
) -> Result<()> {
    create_dir_all(dest.join(safe_path))?;
    report.directories_created += 1;
    Ok(())
}

/// Creates a symlink entry under the output directory.
///
/// The target must be a relative path that does not traverse upward;
/// anything else is rejected so the link cannot point outside the
/// extraction tree.
///
/// # Errors
///
/// Returns `SecurityViolation` for unsafe targets or unsupported
/// platforms, and I/O errors from link creation.
#[allow(unused_variables)]
pub(crate) fn create_symlink(
    safe_path: &SafePath,
    target: &Path,
    dest: &DestDir,
    report: &mut ExtractionReport,
) -> Result<()> {
    if target.as_os_str().is_empty()
        || target.is_absolute()
        || target
            .components()
            .any(|c| matches!(c, std::path::Component::ParentDir))
    {
        return Err(ExtractError::SecurityViolation {
            reason: format!(
                "symlink target escapes extraction directory: {}",
                target.display()
            ),
        });
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::symlink;

        let link_path = dest.join(safe_path);
        if let Some(parent) = link_path.parent() {
            create_dir_all(parent)?;
        }

        if link_path.symlink_metadata().is_ok() {
            // Already present from an earlier entry; keep the first link
            return Ok(());
        }

        symlink(target, &link_path)?;
        report.symlinks_created += 1;

        Ok(())
    }

    #[cfg(not(unix))]
    {
        Err(ExtractError::SecurityViolation {
            reason: "symlinks are not supported on this platform".into(),
        })
    }
}
