//! SPDX-FileCopyrightText: 2025 CyberDeco
//!
//! SPDX-License-Identifier: MIT
//!
//! DICT block index reader

use std::fs::File;
use std::io::{BufRead, Cursor, Read};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};

use super::{BlockDescriptor, DictionaryIndex, MAGIC, TABLE_REF_SIZE};
use crate::error::{Error, Result};

impl DictionaryIndex {
    /// Read a `.dict` file from disk
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)?;
        let mut buffer = Vec::new();
        file.read_to_end(&mut buffer)?;
        Self::load(&buffer)
    }

    /// Parse a `.dict` file from bytes
    ///
    /// Fails with [`Error::BadMagic`] before anything else is read if the
    /// signature does not match.
    pub fn load(data: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(data);

        let magic = cursor.read_u32::<LittleEndian>()?;
        if magic != MAGIC {
            return Err(Error::BadMagic { found: magic });
        }

        let version = cursor.read_u16::<LittleEndian>()?;
        let is_compressed = cursor.read_u8()? != 0;
        let reserved_a = cursor.read_u8()?;
        // Recomputed on save
        let _largest_block = cursor.read_u32::<LittleEndian>()?;
        let block_count = cursor.read_u8()? as usize;
        let table_ref_count = cursor.read_u8()? as usize;
        let name_count = cursor.read_u8()? as usize;
        let reserved_b = cursor.read_u8()?;

        let mut blocks = Vec::with_capacity(block_count);
        for _ in 0..block_count {
            blocks.push(read_block(&mut cursor)?);
        }

        let mut table_refs = vec![0u8; table_ref_count * TABLE_REF_SIZE];
        cursor.read_exact(&mut table_refs)?;

        let mut names = Vec::with_capacity(name_count);
        for _ in 0..name_count {
            let mut raw = Vec::new();
            cursor.read_until(0, &mut raw)?;
            if raw.pop() != Some(0) {
                return Err(Error::UnexpectedEof);
            }
            let name = String::from_utf8(raw)
                .map_err(|e| Error::InvalidFormat(format!("dictionary name is not UTF-8: {e}")))?;
            names.push(name);
        }

        let mut trailer = Vec::new();
        cursor.read_to_end(&mut trailer)?;

        tracing::debug!(
            "Loaded dictionary: {} blocks, compressed={}, {} table refs, names={:?}",
            blocks.len(),
            is_compressed,
            table_ref_count,
            names
        );

        Ok(DictionaryIndex {
            version,
            is_compressed,
            blocks,
            table_refs,
            names,
            trailer,
            header_reserved: [reserved_a, reserved_b],
        })
    }

    /// Check every block against the length of the data file.
    pub fn check_bounds(&self, data_len: usize) -> Result<()> {
        for (block, desc) in self.blocks.iter().enumerate() {
            let end = u64::from(desc.offset) + u64::from(desc.stored_size(self.is_compressed));
            if end > data_len as u64 {
                return Err(Error::BlockOutOfRange { block, end, data_len });
            }
        }
        Ok(())
    }
}

fn read_block<R: Read>(reader: &mut R) -> Result<BlockDescriptor> {
    let offset = reader.read_u32::<LittleEndian>()?;
    let decompressed_size = reader.read_u32::<LittleEndian>()?;
    let compressed_size = reader.read_u32::<LittleEndian>()?;
    let reserved_lo = reader.read_u8()?;
    let reserved_hi = reader.read_u8()?;
    let usage_tag = reader.read_u8()?;
    let reserved_tail = reader.read_u8()?;

    Ok(BlockDescriptor {
        offset,
        decompressed_size,
        compressed_size,
        usage_tag,
        reserved: [reserved_lo, reserved_hi, reserved_tail],
    })
}
