//! Container format detection.
//!
//! Detection is content-based rather than extension-based: firmware blobs
//! carved out by binwalk carry arbitrary names, so the leading bytes are
//! the only reliable signal.

use super::jffs2;

/// How far into the blob to look for a JFFS2 node before falling back to
/// the record container.
///
/// JFFS2 images from small config partitions start with a node at or near
/// offset zero; 4 KB of slack covers vendor padding seen in the wild.
const JFFS2_SCAN_WINDOW: usize = 4096;

/// Supported container layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    /// JFFS2 node stream.
    Jffs2,
    /// Generic length-prefixed record container.
    Record,
}

/// Detects the container layout from the blob's content.
///
/// Returns [`ContainerKind::Jffs2`] when a JFFS2 node with a valid header
/// CRC is found in the leading window, otherwise assumes the record
/// container. The record scanner reports `CorruptContainer` itself when
/// the blob matches neither layout.
#[must_use]
pub fn detect_format(data: &[u8]) -> ContainerKind {
    let window = &data[..data.len().min(JFFS2_SCAN_WINDOW)];
    if jffs2::contains_node(window) {
        ContainerKind::Jffs2
    } else {
        ContainerKind::Record
    }
}
