//! JFFS2 node-stream container.
//!
//! `cgi_config.bin` partitions on MStar DVR firmware are small JFFS2
//! images. The scanner walks the blob looking for node magic halfwords,
//! verifies header CRCs, and rebuilds the directory tree from dirent
//! nodes plus file contents from inode data nodes.
//!
//! Corruption is the norm in carved dumps: a node failing its CRC is
//! resynchronized past byte-by-byte, and unreadable fragments are
//! zero-filled rather than failing the whole extraction.

use byteorder::ByteOrder;
use byteorder::LittleEndian;
use flate2::read::ZlibDecoder;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use std::path::PathBuf;
use xz2::stream::Action;
use xz2::stream::Filters;
use xz2::stream::LzmaOptions;
use xz2::stream::Stream;

use crate::ExtractConfig;
use crate::ExtractError;
use crate::ExtractionReport;
use crate::ProgressCallback;
use crate::Result;
use crate::error::QuotaResource;
use crate::extraction::writer;
use crate::types::DestDir;
use crate::types::SafePath;

use super::traits::ContainerFormat;

const JFFS2_MAGIC: u16 = 0x1985;
const JFFS2_OLD_MAGIC: u16 = 0x1984;

const JFFS2_COMPR_NONE: u8 = 0x00;
const JFFS2_COMPR_ZERO: u8 = 0x01;
const JFFS2_COMPR_ZLIB: u8 = 0x06;
const JFFS2_COMPR_LZO: u8 = 0x07;
const JFFS2_COMPR_LZMA: u8 = 0x08;

const JFFS2_FEATURE_INCOMPAT: u16 = 0xC000;
const JFFS2_NODE_ACCURATE: u16 = 0x2000;
const JFFS2_NODETYPE_DIRENT: u16 = JFFS2_FEATURE_INCOMPAT | JFFS2_NODE_ACCURATE | 1;
const JFFS2_NODETYPE_INODE: u16 = JFFS2_FEATURE_INCOMPAT | JFFS2_NODE_ACCURATE | 2;

/// Common node header: magic, nodetype, totlen, hdr_crc.
const NODE_HEADER_SIZE: usize = 12;
/// Fixed part of a dirent node, name bytes follow.
const DIRENT_SIZE: usize = 40;
/// Fixed part of an inode node, compressed data follows.
const INODE_SIZE: usize = 68;

/// Bound on parent-chain walks while rebuilding paths; a corrupt image
/// can contain pino cycles.
const MAX_PARENT_HOPS: usize = 100;

// LZMA stream parameters fixed by the JFFS2 LZMA patch; the node carries
// only the compressed bytes, not the stream properties.
const LZMA_LC: u32 = 0;
const LZMA_LP: u32 = 0;
const LZMA_PB: u32 = 0;
const LZMA_DICT_SIZE: u32 = 0x2000;

// File type bits of the on-disk mode field. JFFS2 stores standard
// S_IFMT values regardless of the host platform.
const S_IFMT: u32 = 0o170_000;
const S_IFDIR: u32 = 0o040_000;
const S_IFREG: u32 = 0o100_000;
const S_IFLNK: u32 = 0o120_000;

/// CRC32 as used by JFFS2/MTD: zero initial state, no final xor.
fn mtd_crc(data: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new_with_initial(0xFFFF_FFFF);
    hasher.update(data);
    hasher.finalize() ^ 0xFFFF_FFFF
}

/// Pads a node length to the 4-byte alignment JFFS2 uses on flash.
const fn pad(len: usize) -> usize {
    (len + 3) & !3
}

fn lzma_filters() -> Option<Filters> {
    let mut options = LzmaOptions::new_preset(6).ok()?;
    options
        .literal_context_bits(LZMA_LC)
        .literal_position_bits(LZMA_LP)
        .position_bits(LZMA_PB)
        .dict_size(LZMA_DICT_SIZE);
    let mut filters = Filters::new();
    filters.lzma1(&options);
    Some(filters)
}

/// Decodes a raw LZMA1 fragment.
///
/// The stream has no header and usually no end marker, so decoding stops
/// when the input is exhausted; anything short of the declared size is
/// treated as a failure.
fn lzma_decompress(raw: &[u8], dsize: usize) -> Option<Vec<u8>> {
    let filters = lzma_filters()?;
    let mut stream = Stream::new_raw_decoder(&filters).ok()?;
    let mut decoded = Vec::with_capacity(dsize + 1);
    match stream.process_vec(raw, &mut decoded, Action::Finish) {
        Ok(_) if decoded.len() >= dsize => {
            decoded.truncate(dsize);
            Some(decoded)
        }
        _ => None,
    }
}

/// Finds the next node magic halfword at or after `from`.
fn find_magic(data: &[u8], from: usize) -> Option<usize> {
    let tail = data.get(from..)?;
    tail.windows(2)
        .position(|w| {
            let magic = u16::from_le_bytes([w[0], w[1]]);
            magic == JFFS2_MAGIC || magic == JFFS2_OLD_MAGIC
        })
        .map(|i| from + i)
}

/// Returns true if `data` contains a node header with a valid CRC.
///
/// Used by format detection; a bare magic halfword is not enough since
/// record containers can contain those bytes by chance.
pub(crate) fn contains_node(data: &[u8]) -> bool {
    let mut pos = 0;
    while let Some(idx) = find_magic(data, pos) {
        if idx + NODE_HEADER_SIZE > data.len() {
            return false;
        }
        let stored = LittleEndian::read_u32(&data[idx + 8..idx + 12]);
        if mtd_crc(&data[idx..idx + 8]) == stored {
            return true;
        }
        pos = idx + 1;
    }
    false
}

/// Directory entry node surviving header, node, and name CRC checks.
#[derive(Debug, Clone)]
struct Dirent {
    pino: u32,
    version: u32,
    ino: u32,
    name: Vec<u8>,
}

/// Data node for one inode, payload kept as a range into the blob.
#[derive(Debug, Clone)]
struct Inode {
    version: u32,
    mode: u32,
    offset: u32,
    dsize: u32,
    compr: u8,
    /// Byte range of the (possibly compressed) payload within the blob.
    data_start: usize,
    data_len: usize,
}

/// Scan result: the latest dirent per inode number plus all data nodes
/// grouped by inode number.
#[derive(Debug, Default)]
struct ScannedFs {
    dirents: BTreeMap<u32, Dirent>,
    inodes: BTreeMap<u32, Vec<Inode>>,
}

/// JFFS2 image handler.
pub struct Jffs2Image {
    data: Vec<u8>,
}

impl Jffs2Image {
    /// Creates a handler owning the image bytes.
    #[must_use]
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Walks the blob collecting accurate dirent and inode nodes.
    ///
    /// A header CRC mismatch advances the scan by a single byte to
    /// resynchronize; a valid node advances by its padded total length.
    fn scan(&self, report: &mut ExtractionReport) -> ScannedFs {
        let data = &self.data;
        let mut fs = ScannedFs::default();
        let mut pos = 0;

        while let Some(idx) = find_magic(data, pos) {
            pos = idx;
            if pos + NODE_HEADER_SIZE > data.len() {
                break;
            }

            let stored_crc = LittleEndian::read_u32(&data[pos + 8..pos + 12]);
            if mtd_crc(&data[pos..pos + 8]) != stored_crc {
                pos += 1;
                continue;
            }

            let nodetype = LittleEndian::read_u16(&data[pos + 2..pos + 4]);
            let totlen = LittleEndian::read_u32(&data[pos + 4..pos + 8]) as usize;
            let node = &data[pos..(pos + totlen).min(data.len())];

            match nodetype {
                JFFS2_NODETYPE_DIRENT => {
                    if let Some(dirent) = parse_dirent(node, report) {
                        // Keep only the highest version per inode number
                        let replace = fs
                            .dirents
                            .get(&dirent.ino)
                            .is_none_or(|existing| existing.version < dirent.version);
                        if replace {
                            fs.dirents.insert(dirent.ino, dirent);
                        }
                    }
                }
                JFFS2_NODETYPE_INODE => {
                    if let Some((ino, inode)) = parse_inode(node, pos, report) {
                        fs.inodes.entry(ino).or_default().push(inode);
                    }
                }
                _ => {
                    // Cleanmarkers, padding, and xattr nodes are not needed
                }
            }

            pos += pad(totlen).max(4);
        }

        fs
    }

    /// Rebuilds the relative path of a dirent by walking its parent chain.
    fn entry_path(fs: &ScannedFs, dirent: &Dirent) -> PathBuf {
        let mut parts = Vec::new();
        let mut pino = dirent.pino;
        for _ in 0..MAX_PARENT_HOPS {
            let Some(parent) = fs.dirents.get(&pino) else {
                break;
            };
            parts.push(String::from_utf8_lossy(&parent.name).into_owned());
            pino = parent.pino;
        }
        parts.reverse();
        parts.push(String::from_utf8_lossy(&dirent.name).into_owned());
        parts.iter().collect()
    }

    /// Decompresses one data node fragment.
    ///
    /// Fragments that cannot be decoded are zero-filled to their declared
    /// size with a warning, so one bad node does not lose the rest of the
    /// file.
    fn read_fragment(
        &self,
        inode: &Inode,
        entry: &Path,
        report: &mut ExtractionReport,
    ) -> Vec<u8> {
        let raw = &self.data[inode.data_start..inode.data_start + inode.data_len];
        let dsize = inode.dsize as usize;

        match inode.compr {
            JFFS2_COMPR_NONE => raw.to_vec(),
            JFFS2_COMPR_ZERO => vec![0u8; dsize],
            JFFS2_COMPR_ZLIB => {
                let mut decoded = Vec::with_capacity(dsize);
                match ZlibDecoder::new(raw).read_to_end(&mut decoded) {
                    Ok(_) => {
                        decoded.truncate(dsize);
                        decoded
                    }
                    Err(e) => {
                        report.add_warning(format!(
                            "zlib decompression failed for {}: {e}; zero-filling fragment",
                            entry.display()
                        ));
                        vec![0u8; dsize]
                    }
                }
            }
            JFFS2_COMPR_LZMA => match lzma_decompress(raw, dsize) {
                Some(decoded) => decoded,
                None => {
                    report.add_warning(format!(
                        "LZMA decompression failed for {}; zero-filling fragment",
                        entry.display()
                    ));
                    vec![0u8; dsize]
                }
            },
            JFFS2_COMPR_LZO => {
                report.add_warning(format!(
                    "unsupported compression {:#04x} for {}; zero-filling fragment",
                    inode.compr,
                    entry.display()
                ));
                vec![0u8; dsize]
            }
            other => {
                report.add_warning(format!(
                    "unknown compression {other:#04x} for {}; storing raw bytes",
                    entry.display()
                ));
                raw.to_vec()
            }
        }
    }

    /// Assembles a regular file from its data fragments.
    ///
    /// Fragments are applied in (offset, version) order so later versions
    /// win where ranges overlap; the file size is the largest extent any
    /// fragment reaches.
    fn assemble_file(
        &self,
        inodes: &[Inode],
        entry: &Path,
        config: &ExtractConfig,
        report: &mut ExtractionReport,
    ) -> Result<Vec<u8>> {
        let mut fragments: Vec<&Inode> = inodes.iter().collect();
        fragments.sort_by_key(|i| (i.offset, i.version));

        let size = fragments
            .iter()
            .map(|i| u64::from(i.offset) + u64::from(i.dsize))
            .max()
            .unwrap_or(0);

        // Declared extents are untrusted; bound the allocation before it
        // happens rather than after
        if size > config.max_file_size {
            return Err(ExtractError::QuotaExceeded {
                resource: QuotaResource::FileSize {
                    size,
                    max: config.max_file_size,
                },
            });
        }

        #[allow(clippy::cast_possible_truncation)]
        let mut content = vec![0u8; size as usize];
        for fragment in fragments {
            let decoded = self.read_fragment(fragment, entry, report);
            let start = fragment.offset as usize;
            let end = (start + decoded.len()).min(content.len());
            content[start..end].copy_from_slice(&decoded[..end - start]);
        }

        Ok(content)
    }
}

/// Parses a dirent node, returning `None` (with a warning) when the node
/// is truncated or fails its CRCs.
fn parse_dirent(node: &[u8], report: &mut ExtractionReport) -> Option<Dirent> {
    if node.len() < DIRENT_SIZE {
        report.add_warning("truncated dirent node, skipping".into());
        return None;
    }

    let pino = LittleEndian::read_u32(&node[12..16]);
    let version = LittleEndian::read_u32(&node[16..20]);
    let ino = LittleEndian::read_u32(&node[20..24]);
    let nsize = node[28] as usize;
    let node_crc = LittleEndian::read_u32(&node[32..36]);
    let name_crc = LittleEndian::read_u32(&node[36..40]);

    if node.len() < DIRENT_SIZE + nsize {
        report.add_warning("dirent name extends past node, skipping".into());
        return None;
    }

    if mtd_crc(&node[..DIRENT_SIZE - 8]) != node_crc {
        report.add_warning(format!("dirent node CRC mismatch for ino {ino}, skipping"));
        return None;
    }

    let name = node[DIRENT_SIZE..DIRENT_SIZE + nsize].to_vec();
    if mtd_crc(&name) != name_crc {
        report.add_warning(format!("dirent name CRC mismatch for ino {ino}, skipping"));
        return None;
    }

    Some(Dirent {
        pino,
        version,
        ino,
        name,
    })
}

/// Parses an inode data node, returning the owning inode number and the
/// fragment descriptor.
fn parse_inode(node: &[u8], node_offset: usize, report: &mut ExtractionReport) -> Option<(u32, Inode)> {
    if node.len() < INODE_SIZE {
        report.add_warning("truncated inode node, skipping".into());
        return None;
    }

    let ino = LittleEndian::read_u32(&node[12..16]);
    let version = LittleEndian::read_u32(&node[16..20]);
    let mode = LittleEndian::read_u32(&node[20..24]);
    let offset = LittleEndian::read_u32(&node[44..48]);
    let csize = LittleEndian::read_u32(&node[48..52]) as usize;
    let dsize = LittleEndian::read_u32(&node[52..56]);
    let compr = node[56];

    if node.len() < INODE_SIZE + csize {
        report.add_warning(format!(
            "inode data extends past node for ino {ino}, skipping"
        ));
        return None;
    }

    Some((
        ino,
        Inode {
            version,
            mode,
            offset,
            dsize,
            compr,
            data_start: node_offset + INODE_SIZE,
            data_len: csize,
        },
    ))
}

impl ContainerFormat for Jffs2Image {
    fn extract(
        &mut self,
        dest: &DestDir,
        config: &ExtractConfig,
        progress: &mut dyn ProgressCallback,
    ) -> Result<ExtractionReport> {
        let mut report = ExtractionReport::new();
        let fs = self.scan(&mut report);

        if fs.dirents.is_empty() {
            return Err(ExtractError::CorruptContainer(
                "no valid JFFS2 dirent nodes recovered".into(),
            ));
        }

        let total = fs.dirents.len();
        for (index, dirent) in fs.dirents.values().enumerate() {
            let rel = Self::entry_path(&fs, dirent);
            progress.on_entry_start(&rel, total, index + 1);

            let safe_path = match SafePath::validate(&rel, dest, config) {
                Ok(safe) => safe,
                Err(err) if err.is_recoverable() => {
                    report.skip(format!("unsafe entry path {}: {err}", rel.display()));
                    continue;
                }
                Err(err) => return Err(err),
            };

            // A dirent without surviving data nodes carries no content
            // (deleted entries and corrupt regions end up here)
            let Some(inodes) = fs.inodes.get(&dirent.ino) else {
                continue;
            };
            let Some(latest) = inodes.iter().max_by_key(|i| i.version) else {
                continue;
            };

            match latest.mode & S_IFMT {
                S_IFDIR => writer::create_directory(&safe_path, dest, &mut report)?,
                S_IFREG => {
                    let content = self.assemble_file(inodes, &rel, config, &mut report)?;
                    writer::write_file(
                        &content,
                        &safe_path,
                        Some(latest.mode),
                        dest,
                        config,
                        &mut report,
                        progress,
                    )?;
                }
                S_IFLNK => {
                    if config.allow_symlinks {
                        let target_bytes = self.read_fragment(latest, &rel, &mut report);
                        let target = String::from_utf8_lossy(&target_bytes).into_owned();
                        match writer::create_symlink(
                            &safe_path,
                            Path::new(&target),
                            dest,
                            &mut report,
                        ) {
                            Ok(()) => {}
                            Err(err) if err.is_recoverable() => {
                                report.skip(format!(
                                    "symlink {} rejected: {err}",
                                    rel.display()
                                ));
                            }
                            Err(err) => return Err(err),
                        }
                    } else {
                        report.skip(format!(
                            "symlink {} skipped (enable allow_symlinks to extract)",
                            rel.display()
                        ));
                    }
                }
                other => {
                    report.skip(format!(
                        "unsupported entry type {:#o} for {}",
                        other,
                        rel.display()
                    ));
                }
            }

            progress.on_entry_complete(&rel);
        }

        Ok(report)
    }

    fn format_name(&self) -> &str {
        "jffs2"
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::cast_possible_truncation)]
mod tests {
    use super::*;
    use crate::NoopProgress;
    use flate2::Compression;
    use flate2::write::ZlibEncoder;
    use std::io::Write;
    use tempfile::TempDir;

    /// Serializes a dirent node with valid CRCs.
    fn build_dirent(pino: u32, version: u32, ino: u32, name: &[u8]) -> Vec<u8> {
        let totlen = (DIRENT_SIZE + name.len()) as u32;
        let mut node = Vec::new();
        node.extend_from_slice(&JFFS2_MAGIC.to_le_bytes());
        node.extend_from_slice(&JFFS2_NODETYPE_DIRENT.to_le_bytes());
        node.extend_from_slice(&totlen.to_le_bytes());
        let hdr_crc = mtd_crc(&node);
        node.extend_from_slice(&hdr_crc.to_le_bytes());
        node.extend_from_slice(&pino.to_le_bytes());
        node.extend_from_slice(&version.to_le_bytes());
        node.extend_from_slice(&ino.to_le_bytes());
        node.extend_from_slice(&0u32.to_le_bytes()); // mctime
        node.push(name.len() as u8); // nsize
        node.push(2); // dtype
        node.extend_from_slice(&[0, 0]); // unused
        let node_crc = mtd_crc(&node);
        node.extend_from_slice(&node_crc.to_le_bytes());
        node.extend_from_slice(&mtd_crc(name).to_le_bytes());
        node.extend_from_slice(name);
        node
    }

    /// Serializes an inode data node with a valid header CRC.
    #[allow(clippy::too_many_arguments)]
    fn build_inode(
        ino: u32,
        version: u32,
        mode: u32,
        offset: u32,
        dsize: u32,
        compr: u8,
        data: &[u8],
    ) -> Vec<u8> {
        let totlen = (INODE_SIZE + data.len()) as u32;
        let mut node = Vec::new();
        node.extend_from_slice(&JFFS2_MAGIC.to_le_bytes());
        node.extend_from_slice(&JFFS2_NODETYPE_INODE.to_le_bytes());
        node.extend_from_slice(&totlen.to_le_bytes());
        let hdr_crc = mtd_crc(&node);
        node.extend_from_slice(&hdr_crc.to_le_bytes());
        node.extend_from_slice(&ino.to_le_bytes());
        node.extend_from_slice(&version.to_le_bytes());
        node.extend_from_slice(&mode.to_le_bytes());
        node.extend_from_slice(&0u16.to_le_bytes()); // uid
        node.extend_from_slice(&0u16.to_le_bytes()); // gid
        node.extend_from_slice(&dsize.to_le_bytes()); // isize
        node.extend_from_slice(&0u32.to_le_bytes()); // atime
        node.extend_from_slice(&0u32.to_le_bytes()); // mtime
        node.extend_from_slice(&0u32.to_le_bytes()); // ctime
        node.extend_from_slice(&offset.to_le_bytes());
        node.extend_from_slice(&(data.len() as u32).to_le_bytes()); // csize
        node.extend_from_slice(&dsize.to_le_bytes());
        node.push(compr);
        node.push(0); // usercompr
        node.extend_from_slice(&0u16.to_le_bytes()); // flags
        node.extend_from_slice(&mtd_crc(data).to_le_bytes()); // data_crc
        node.extend_from_slice(&0u32.to_le_bytes()); // node_crc (not checked)
        node.extend_from_slice(data);
        node
    }

    /// Concatenates nodes with JFFS2 4-byte alignment padding.
    fn build_image(nodes: &[Vec<u8>]) -> Vec<u8> {
        let mut image = Vec::new();
        for node in nodes {
            image.extend_from_slice(node);
            while image.len() % 4 != 0 {
                image.push(0xFF);
            }
        }
        image
    }

    fn zlib_compress(data: &[u8]) -> Vec<u8> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    /// Raw LZMA1 with the same fixed parameters the decoder expects.
    fn lzma_compress(data: &[u8]) -> Vec<u8> {
        let filters = lzma_filters().unwrap();
        let mut stream = Stream::new_raw_encoder(&filters).unwrap();
        let mut encoded = Vec::with_capacity(data.len() + 128);
        stream
            .process_vec(data, &mut encoded, Action::Finish)
            .unwrap();
        encoded
    }

    fn extract_image(
        image: Vec<u8>,
        config: &ExtractConfig,
    ) -> (TempDir, Result<ExtractionReport>) {
        let temp = TempDir::new().expect("failed to create temp dir");
        let dest = DestDir::create(temp.path().to_path_buf()).expect("failed to create dest");
        let mut noop = NoopProgress;
        let result = Jffs2Image::new(image).extract(&dest, config, &mut noop);
        (temp, result)
    }

    #[test]
    fn test_mtd_crc_empty() {
        // Zero initial state, no data, no final xor
        assert_eq!(mtd_crc(b""), 0);
    }

    #[test]
    fn test_pad() {
        assert_eq!(pad(0), 0);
        assert_eq!(pad(1), 4);
        assert_eq!(pad(4), 4);
        assert_eq!(pad(41), 44);
    }

    #[test]
    fn test_contains_node() {
        let image = build_image(&[build_dirent(1, 1, 2, b"etc")]);
        assert!(contains_node(&image));
        assert!(!contains_node(b"not a jffs2 image at all"));

        // Magic bytes with a corrupted header CRC are rejected
        let mut corrupt = build_dirent(1, 1, 2, b"etc");
        corrupt[5] ^= 0xFF;
        assert!(!contains_node(&corrupt));
    }

    #[test]
    fn test_extract_file_tree() {
        let content = b"serverip=192.168.1.10\n";
        let image = build_image(&[
            build_dirent(1, 1, 2, b"etc"),
            build_inode(2, 1, S_IFDIR | 0o755, 0, 0, JFFS2_COMPR_NONE, b""),
            build_dirent(2, 1, 3, b"net.conf"),
            build_inode(
                3,
                1,
                S_IFREG | 0o644,
                0,
                content.len() as u32,
                JFFS2_COMPR_NONE,
                content,
            ),
        ]);

        let config = ExtractConfig::default();
        let (temp, result) = extract_image(image, &config);
        let report = result.expect("extraction should succeed");

        assert_eq!(report.directories_created, 1);
        assert_eq!(report.files_extracted, 1);
        assert_eq!(
            std::fs::read(temp.path().join("etc/net.conf")).unwrap(),
            content
        );
        assert_eq!(report.output_paths, vec![PathBuf::from("etc/net.conf")]);
    }

    #[test]
    fn test_extract_zlib_fragments() {
        let part_a = vec![b'a'; 64];
        let part_b = vec![b'b'; 64];
        let image = build_image(&[
            build_dirent(1, 1, 2, b"blob.bin"),
            build_inode(
                2,
                1,
                S_IFREG | 0o644,
                0,
                64,
                JFFS2_COMPR_ZLIB,
                &zlib_compress(&part_a),
            ),
            build_inode(
                2,
                2,
                S_IFREG | 0o644,
                64,
                64,
                JFFS2_COMPR_ZLIB,
                &zlib_compress(&part_b),
            ),
        ]);

        let config = ExtractConfig::default();
        let (temp, result) = extract_image(image, &config);
        let report = result.expect("extraction should succeed");

        assert_eq!(report.files_extracted, 1);
        let mut expected = part_a;
        expected.extend_from_slice(&part_b);
        assert_eq!(std::fs::read(temp.path().join("blob.bin")).unwrap(), expected);
    }

    #[test]
    fn test_zero_compression_fragment() {
        let image = build_image(&[
            build_dirent(1, 1, 2, b"sparse.bin"),
            build_inode(2, 1, S_IFREG | 0o644, 0, 32, JFFS2_COMPR_ZERO, b""),
        ]);

        let config = ExtractConfig::default();
        let (temp, result) = extract_image(image, &config);
        result.expect("extraction should succeed");
        assert_eq!(
            std::fs::read(temp.path().join("sparse.bin")).unwrap(),
            vec![0u8; 32]
        );
    }

    #[test]
    fn test_extract_lzma_fragment() {
        let content = b"DeviceType=DVR-8CH\nVideoStandard=PAL\n";
        let image = build_image(&[
            build_dirent(1, 1, 2, b"device.conf"),
            build_inode(
                2,
                1,
                S_IFREG | 0o644,
                0,
                content.len() as u32,
                JFFS2_COMPR_LZMA,
                &lzma_compress(content),
            ),
        ]);

        let config = ExtractConfig::default();
        let (temp, result) = extract_image(image, &config);
        let report = result.expect("extraction should succeed");

        assert!(report.warnings.is_empty());
        assert_eq!(
            std::fs::read(temp.path().join("device.conf")).unwrap(),
            content
        );
    }

    #[test]
    fn test_corrupt_lzma_fragment_zero_fills() {
        // A valid LZMA1 stream must start with a zero byte, so this
        // fragment cannot decode
        let image = build_image(&[
            build_dirent(1, 1, 2, b"broken.conf"),
            build_inode(2, 1, S_IFREG | 0o644, 0, 24, JFFS2_COMPR_LZMA, &[0xFF; 16]),
        ]);

        let config = ExtractConfig::default();
        let (temp, result) = extract_image(image, &config);
        let report = result.expect("extraction should succeed");

        assert!(report.warnings.iter().any(|w| w.contains("LZMA")));
        assert_eq!(
            std::fs::read(temp.path().join("broken.conf")).unwrap(),
            vec![0u8; 24]
        );
    }

    #[test]
    fn test_unsupported_compression_zero_fills() {
        let image = build_image(&[
            build_dirent(1, 1, 2, b"packed.bin"),
            build_inode(2, 1, S_IFREG | 0o644, 0, 16, JFFS2_COMPR_LZO, &[0xAB; 8]),
        ]);

        let config = ExtractConfig::default();
        let (temp, result) = extract_image(image, &config);
        let report = result.expect("extraction should succeed");

        assert!(report
            .warnings
            .iter()
            .any(|w| w.contains("unsupported compression")));
        assert_eq!(
            std::fs::read(temp.path().join("packed.bin")).unwrap(),
            vec![0u8; 16]
        );
    }

    #[test]
    fn test_dirent_version_dedup() {
        let content = b"renamed";
        let image = build_image(&[
            build_dirent(1, 1, 2, b"old_name"),
            build_dirent(1, 2, 2, b"new_name"),
            build_inode(
                2,
                1,
                S_IFREG | 0o644,
                0,
                content.len() as u32,
                JFFS2_COMPR_NONE,
                content,
            ),
        ]);

        let config = ExtractConfig::default();
        let (temp, result) = extract_image(image, &config);
        result.expect("extraction should succeed");
        assert!(temp.path().join("new_name").exists());
        assert!(!temp.path().join("old_name").exists());
    }

    #[test]
    fn test_corrupt_node_resync() {
        let content = b"survives";
        let mut bad = build_dirent(1, 1, 9, b"ghost");
        bad[8] ^= 0xFF; // break hdr_crc

        let image = build_image(&[
            bad,
            build_dirent(1, 1, 2, b"real.txt"),
            build_inode(
                2,
                1,
                S_IFREG | 0o644,
                0,
                content.len() as u32,
                JFFS2_COMPR_NONE,
                content,
            ),
        ]);

        let config = ExtractConfig::default();
        let (temp, result) = extract_image(image, &config);
        let report = result.expect("extraction should succeed");
        assert_eq!(report.files_extracted, 1);
        assert!(temp.path().join("real.txt").exists());
        assert!(!temp.path().join("ghost").exists());
    }

    #[test]
    fn test_no_dirents_is_corrupt() {
        let config = ExtractConfig::default();
        let (_temp, result) = extract_image(vec![0xFF; 256], &config);
        assert!(matches!(result, Err(ExtractError::CorruptContainer(_))));
    }

    #[test]
    #[cfg(unix)]
    fn test_symlink_requires_opt_in() {
        let image = build_image(&[
            build_dirent(1, 1, 2, b"target.txt"),
            build_inode(2, 1, S_IFREG | 0o644, 0, 2, JFFS2_COMPR_NONE, b"hi"),
            build_dirent(1, 1, 3, b"link"),
            build_inode(3, 1, S_IFLNK | 0o777, 0, 10, JFFS2_COMPR_NONE, b"target.txt"),
        ]);

        let config = ExtractConfig::default();
        let (temp, result) = extract_image(image.clone(), &config);
        let report = result.expect("extraction should succeed");
        assert_eq!(report.symlinks_created, 0);
        assert_eq!(report.files_skipped, 1);
        assert!(!temp.path().join("link").exists());

        let config = ExtractConfig::permissive();
        let (temp, result) = extract_image(image, &config);
        let report = result.expect("extraction should succeed");
        assert_eq!(report.symlinks_created, 1);
        assert_eq!(
            std::fs::read_to_string(temp.path().join("link")).unwrap(),
            "hi"
        );
    }

    #[test]
    fn test_traversal_dirent_skipped() {
        let content = b"evil";
        let image = build_image(&[
            build_dirent(1, 1, 2, b"../escape"),
            build_inode(
                2,
                1,
                S_IFREG | 0o644,
                0,
                content.len() as u32,
                JFFS2_COMPR_NONE,
                content,
            ),
        ]);

        let config = ExtractConfig::default();
        let (temp, result) = extract_image(image, &config);
        let report = result.expect("extraction should succeed");
        assert_eq!(report.files_extracted, 0);
        assert_eq!(report.files_skipped, 1);
        assert!(!temp.path().parent().unwrap().join("escape").exists());
    }
}
