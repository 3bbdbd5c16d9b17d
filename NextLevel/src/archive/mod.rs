//! SPDX-FileCopyrightText: 2025 CyberDeco
//!
//! SPDX-License-Identifier: MIT
//!
//! DICT/DATA archive
//!
//! An [`Archive`] owns the dictionary, the inflated bytes of every block and
//! the chunk forest parsed from them. Payload edits go through
//! [`Archive::set_chunk_payload`], which keeps all three consistent.
//!
//! # Example
//!
//! ```no_run
//! use nextlevel::archive::Archive;
//!
//! let mut archive = Archive::read("level.dict", "level.data")?;
//! let path = archive
//!     .chunks()
//!     .find_path(|node| node.type_id == 0xB502)
//!     .expect("texture data");
//! archive.set_chunk_payload(&path, vec![0; 64])?;
//! archive.write("level_new.dict", "level_new.data")?;
//! # Ok::<(), nextlevel::Error>(())
//! ```

mod options;
mod repack;

use std::path::Path;

use crate::compression;
use crate::error::{Error, Result};
use crate::formats::chunk::{CHUNK_SCRIPT_DATA, ChunkForest, ChunkPath};
use crate::formats::common::HashNames;
use crate::formats::dict::{BlockDescriptor, DictionaryIndex};
use crate::script::{ScriptModule, decompile_script_with};

pub use options::{ReadOptions, WriteOptions};

/// A block that could not be inflated when the archive was opened.
///
/// Its stored bytes are kept as-is and written back unchanged on save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockFault {
    pub block: usize,
    pub message: String,
}

/// An opened DICT/DATA archive
#[derive(Debug, Clone)]
pub struct Archive {
    index: DictionaryIndex,
    /// Inflated bytes of every dictionary block; block 0 is the chunk table
    blocks: Vec<Vec<u8>>,
    forest: ChunkForest,
    faults: Vec<BlockFault>,
}

impl Archive {
    /// Open an archive from the contents of its `.dict` and `.data` files
    pub fn open(dict: &[u8], data: &[u8]) -> Result<Self> {
        Self::open_with(dict, data, &ReadOptions::default())
    }

    /// Open an archive with explicit options
    pub fn open_with(dict: &[u8], data: &[u8], options: &ReadOptions) -> Result<Self> {
        let index = DictionaryIndex::load(dict)?;
        index.check_bounds(data.len())?;

        let mut blocks = Vec::with_capacity(index.blocks.len());
        let mut faults = Vec::new();

        for (block, desc) in index.blocks.iter().enumerate() {
            let start = desc.offset as usize;
            let stored = &data[start..start + desc.stored_size(index.is_compressed) as usize];

            if !desc.is_deflated(index.is_compressed) {
                blocks.push(stored.to_vec());
                continue;
            }

            match compression::decompress(stored, desc.decompressed_size) {
                Ok(bytes) => blocks.push(bytes),
                Err(Error::CorruptBlock { message, .. }) => {
                    if options.strict_blocks {
                        return Err(Error::CorruptBlock { block, message });
                    }
                    tracing::warn!("Block {block} is corrupt, keeping stored bytes: {message}");
                    faults.push(BlockFault { block, message });
                    blocks.push(stored.to_vec());
                }
                Err(e) => return Err(e),
            }
        }

        let forest = match blocks.split_first() {
            Some((table, data_blocks)) => ChunkForest::parse(table, data_blocks)?,
            None => ChunkForest::default(),
        };

        tracing::debug!(
            "Opened archive: {} blocks, {} chunks, {} faults",
            blocks.len(),
            forest.node_count(),
            faults.len()
        );

        Ok(Self {
            index,
            blocks,
            forest,
            faults,
        })
    }

    /// Read an archive from disk
    pub fn read<P: AsRef<Path>, Q: AsRef<Path>>(dict_path: P, data_path: Q) -> Result<Self> {
        let dict = std::fs::read(dict_path)?;
        let data = std::fs::read(data_path)?;
        Self::open(&dict, &data)
    }

    /// Build a new archive holding `forest`.
    ///
    /// Data blocks are laid out from the leaf offsets already in the forest.
    pub fn from_forest(forest: ChunkForest, is_compressed: bool) -> Result<Self> {
        let table = forest.write_table()?;
        let mut blocks = vec![table];
        blocks.extend(forest.layout_blocks(0));

        let mut index = DictionaryIndex::new(is_compressed);
        index.blocks = blocks
            .iter()
            .map(|b| BlockDescriptor::new(0, b.len() as u32, b.len() as u32))
            .collect();

        Ok(Self {
            index,
            blocks,
            forest,
            faults: Vec::new(),
        })
    }

    /// The chunk forest
    #[must_use]
    pub fn chunks(&self) -> &ChunkForest {
        &self.forest
    }

    /// The dictionary as it would be saved (block offsets are assigned on save)
    #[must_use]
    pub fn dictionary(&self) -> &DictionaryIndex {
        &self.index
    }

    /// Inflated bytes of a dictionary block
    #[must_use]
    pub fn block(&self, index: usize) -> Option<&[u8]> {
        self.blocks.get(index).map(Vec::as_slice)
    }

    /// Blocks that failed to inflate when the archive was opened
    #[must_use]
    pub fn block_faults(&self) -> &[BlockFault] {
        &self.faults
    }

    #[must_use]
    pub fn is_compressed(&self) -> bool {
        self.index.is_compressed
    }

    /// Switch between compressed and raw storage. Takes effect on save.
    pub fn set_compressed(&mut self, compressed: bool) {
        self.index.is_compressed = compressed;
    }

    /// Decompile every chunk that has a `ScriptData` child, using the
    /// process-wide hash names
    #[must_use]
    pub fn script_modules(&self) -> Vec<(ChunkPath, Result<ScriptModule>)> {
        self.script_modules_with(HashNames::global())
    }

    /// Decompile every script module with an explicit name table.
    ///
    /// Each module succeeds or fails on its own.
    #[must_use]
    pub fn script_modules_with(&self, names: &HashNames) -> Vec<(ChunkPath, Result<ScriptModule>)> {
        self.forest
            .walk()
            .into_iter()
            .filter(|(_, node)| node.find_child(CHUNK_SCRIPT_DATA).is_some())
            .map(|(path, node)| {
                let module = decompile_script_with(node, names);
                if let Err(e) = &module {
                    tracing::warn!("Script module at {path} failed to decompile: {e}");
                }
                (path, module)
            })
            .collect()
    }

    /// Serialize the archive into `.dict` and `.data` bytes
    pub fn save(&self) -> Result<(Vec<u8>, Vec<u8>)> {
        self.save_with(&WriteOptions::default())
    }

    /// Serialize the archive with explicit options.
    ///
    /// Blocks are written back-to-back in dictionary order. In compressed
    /// mode, chunk-data blocks are deflated and all others are stored raw.
    pub fn save_with(&self, options: &WriteOptions) -> Result<(Vec<u8>, Vec<u8>)> {
        let mut index = self.index.clone();
        let mut data = Vec::new();

        for (block, (desc, bytes)) in index.blocks.iter_mut().zip(&self.blocks).enumerate() {
            desc.offset = u32::try_from(data.len()).map_err(|_| {
                Error::InvalidFormat(format!("data file exceeds 4 GiB at block {block}"))
            })?;

            if self.faults.iter().any(|f| f.block == block) {
                tracing::warn!("Writing stored bytes of corrupt block {block} unchanged");
                if index.is_compressed {
                    desc.compressed_size = bytes.len() as u32;
                } else {
                    desc.decompressed_size = bytes.len() as u32;
                }
                data.extend_from_slice(bytes);
                continue;
            }

            desc.decompressed_size = bytes.len() as u32;
            if desc.is_deflated(index.is_compressed) {
                let packed = compression::compress_with_level(bytes, options.compression_level)?;
                desc.compressed_size = packed.len() as u32;
                data.extend_from_slice(&packed);
            } else {
                if index.is_compressed {
                    desc.compressed_size = bytes.len() as u32;
                }
                data.extend_from_slice(bytes);
            }
        }

        tracing::debug!(
            "Saved archive: {} blocks, {} data bytes, compressed={}",
            index.blocks.len(),
            data.len(),
            index.is_compressed
        );

        Ok((index.save()?, data))
    }

    /// Write the archive to disk
    pub fn write<P: AsRef<Path>, Q: AsRef<Path>>(&self, dict_path: P, data_path: Q) -> Result<()> {
        self.write_with(dict_path, data_path, &WriteOptions::default())
    }

    /// Write the archive to disk with explicit options
    pub fn write_with<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        dict_path: P,
        data_path: Q,
        options: &WriteOptions,
    ) -> Result<()> {
        let (dict, data) = self.save_with(options)?;
        std::fs::write(dict_path, dict)?;
        std::fs::write(data_path, data)?;
        Ok(())
    }
}
