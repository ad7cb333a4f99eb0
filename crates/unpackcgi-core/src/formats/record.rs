//! Generic length-prefixed record container.
//!
//! Layout: repeated records of
//! `[name_len: u16 LE][name: bytes][payload_len: u32 LE][payload: bytes]`.
//!
//! The scan is a single forward pass. A header whose lengths imply a read
//! past the end of the blob terminates the scan (typical of truncated
//! carves); the partial entry is reported as skipped. A `name_len` of zero
//! is treated as the terminator, since valid entries never have empty
//! names.

use byteorder::LittleEndian;
use byteorder::ReadBytesExt;
use std::collections::HashSet;
use std::io::Cursor;
use std::path::Path;

use crate::ExtractConfig;
use crate::ExtractError;
use crate::ExtractionReport;
use crate::ProgressCallback;
use crate::Result;
use crate::extraction::writer;
use crate::types::DestDir;
use crate::types::SafePath;

use super::traits::ContainerFormat;

/// One record discovered in the blob.
///
/// The payload is kept as a byte range into the container buffer rather
/// than a copy; it is sliced only when the entry is written.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RecordEntry {
    /// Entry name as recovered from the blob (not yet validated).
    name: String,
    /// Byte offset of the payload within the blob.
    offset: usize,
    /// Payload length in bytes.
    length: usize,
}

/// Record container handler.
pub struct RecordContainer {
    data: Vec<u8>,
}

impl RecordContainer {
    /// Creates a handler owning the container bytes.
    #[must_use]
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Scans the blob for records in one forward pass.
    ///
    /// Returns the discovered entries; scan-terminating anomalies
    /// (truncated record) are recorded on the report as skips.
    fn scan(&self, report: &mut ExtractionReport) -> Vec<RecordEntry> {
        let mut entries = Vec::new();
        let len = self.data.len();
        let mut cursor = Cursor::new(self.data.as_slice());

        loop {
            let pos = cursor.position() as usize;
            if pos + 2 > len {
                break;
            }

            let Ok(name_len) = cursor.read_u16::<LittleEndian>() else {
                break;
            };
            let name_len = name_len as usize;
            // Zero-length name terminates the record stream
            if name_len == 0 {
                break;
            }

            if pos + 2 + name_len + 4 > len {
                report.skip(format!(
                    "truncated record header at offset {pos}: name length {name_len} \
                     exceeds remaining bytes"
                ));
                break;
            }

            let name_start = pos + 2;
            let name = String::from_utf8_lossy(&self.data[name_start..name_start + name_len])
                .into_owned();
            cursor.set_position((name_start + name_len) as u64);

            let Ok(payload_len) = cursor.read_u32::<LittleEndian>() else {
                break;
            };
            let payload_len = payload_len as usize;
            let payload_start = name_start + name_len + 4;

            if payload_start + payload_len > len {
                report.skip(format!(
                    "truncated record at offset {pos}: payload length {payload_len} \
                     exceeds remaining bytes"
                ));
                break;
            }

            entries.push(RecordEntry {
                name,
                offset: payload_start,
                length: payload_len,
            });
            cursor.set_position((payload_start + payload_len) as u64);
        }

        entries
    }
}

impl ContainerFormat for RecordContainer {
    fn extract(
        &mut self,
        dest: &DestDir,
        config: &ExtractConfig,
        progress: &mut dyn ProgressCallback,
    ) -> Result<ExtractionReport> {
        let mut report = ExtractionReport::new();
        let entries = self.scan(&mut report);

        if entries.is_empty() {
            return Err(ExtractError::CorruptContainer(
                "no valid records found in container".into(),
            ));
        }

        let total = entries.len();
        let mut seen: HashSet<String> = HashSet::new();

        for (index, entry) in entries.iter().enumerate() {
            let entry_path = Path::new(&entry.name);
            progress.on_entry_start(entry_path, total, index + 1);

            let safe_path = match SafePath::validate(entry_path, dest, config) {
                Ok(safe) => safe,
                Err(err) if err.is_recoverable() => {
                    report.skip(format!("unsafe entry name {:?}: {err}", entry.name));
                    continue;
                }
                Err(err) => return Err(err),
            };

            // Last write wins on duplicates, but the overwrite is reported
            if !seen.insert(entry.name.clone()) {
                report.add_warning(format!(
                    "duplicate entry name {:?}: overwriting earlier payload",
                    entry.name
                ));
            }

            let payload = &self.data[entry.offset..entry.offset + entry.length];
            writer::write_file(
                payload,
                &safe_path,
                None,
                dest,
                config,
                &mut report,
                progress,
            )?;

            progress.on_entry_complete(entry_path);
        }

        Ok(report)
    }

    fn format_name(&self) -> &str {
        "record"
    }
}
