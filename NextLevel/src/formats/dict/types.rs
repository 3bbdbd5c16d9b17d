//! Types for DICT block index handling
//!
//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT

/// Usage tag of blocks that hold chunk data and are deflated in compressed archives.
pub const USAGE_CHUNK_DATA: u8 = 0;

/// One contiguous region of the data file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlockDescriptor {
    /// Offset of the stored bytes in the data file
    pub offset: u32,
    /// Size once inflated
    pub decompressed_size: u32,
    /// Size as stored when the archive is compressed
    pub compressed_size: u32,
    /// What the block is used for (0 = chunk data)
    pub usage_tag: u8,
    /// Bytes 12, 13 and 15 of the descriptor, kept as read
    pub reserved: [u8; 3],
}

impl BlockDescriptor {
    /// Create a descriptor for a chunk-data block.
    #[must_use]
    pub fn new(offset: u32, decompressed_size: u32, compressed_size: u32) -> Self {
        Self {
            offset,
            decompressed_size,
            compressed_size,
            usage_tag: USAGE_CHUNK_DATA,
            reserved: [0; 3],
        }
    }

    /// Whether this block is deflated when the archive is in compressed mode.
    #[must_use]
    pub fn is_deflated(&self, archive_compressed: bool) -> bool {
        archive_compressed && self.usage_tag == USAGE_CHUNK_DATA
    }

    /// Number of bytes this block occupies in the data file.
    #[must_use]
    pub fn stored_size(&self, archive_compressed: bool) -> u32 {
        if archive_compressed {
            self.compressed_size
        } else {
            self.decompressed_size
        }
    }
}

/// The parsed `.dict` file
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DictionaryIndex {
    /// Format version (bytes 4-5 of the header)
    pub version: u16,
    /// Whether chunk-data blocks are deflated in the data file
    pub is_compressed: bool,
    /// Block descriptors in file order
    pub blocks: Vec<BlockDescriptor>,
    /// Table-reference region, `TABLE_REF_SIZE` bytes per entry, not interpreted
    pub table_refs: Vec<u8>,
    /// Zero-terminated names region (usually `.data` and `.debug`)
    pub names: Vec<String>,
    /// Bytes after the names region, kept as read
    pub trailer: Vec<u8>,
    /// Header bytes 7 and 15, kept as read
    pub header_reserved: [u8; 2],
}

impl DictionaryIndex {
    /// Create an empty index.
    #[must_use]
    pub fn new(is_compressed: bool) -> Self {
        Self {
            version: 1,
            is_compressed,
            ..Self::default()
        }
    }

    /// Size of the largest block once inflated.
    ///
    /// This is written into the header on save.
    #[must_use]
    pub fn largest_block(&self) -> u32 {
        self.blocks
            .iter()
            .map(|b| b.decompressed_size)
            .max()
            .unwrap_or(0)
    }

    /// Number of table-reference entries.
    #[must_use]
    pub fn table_ref_count(&self) -> usize {
        self.table_refs.len() / super::TABLE_REF_SIZE
    }
}
