//! SPDX-FileCopyrightText: 2025 CyberDeco
//!
//! SPDX-License-Identifier: MIT
//!
//! Chunk table parser

use std::io::Cursor;

use byteorder::{LittleEndian, ReadBytesExt};

use super::CHUNK_HEADER_SIZE;
use super::forest::ChunkForest;
use super::node::{ChunkBody, ChunkNode};
use crate::error::{Error, Result};

/// Container nesting deeper than this is treated as a corrupt table
const MAX_DEPTH: usize = 64;

/// Raw 12-byte chunk header
#[derive(Debug, Clone, Copy)]
struct ChunkHeader {
    type_id: u16,
    flags: u16,
    offset: u32,
    size: u32,
}

impl ChunkHeader {
    fn read(table: &[u8], pos: usize) -> Result<Self> {
        let bytes = table
            .get(pos..pos + CHUNK_HEADER_SIZE)
            .ok_or_else(|| Error::InvalidChunkTable {
                offset: pos,
                message: format!("header runs past the end of the table ({} bytes)", table.len()),
            })?;
        let mut cursor = Cursor::new(bytes);
        Ok(Self {
            type_id: cursor.read_u16::<LittleEndian>()?,
            flags: cursor.read_u16::<LittleEndian>()?,
            offset: cursor.read_u32::<LittleEndian>()?,
            size: cursor.read_u32::<LittleEndian>()?,
        })
    }
}

impl ChunkForest {
    /// Parse a whole chunk table.
    ///
    /// Root headers are read back-to-back until the table is exhausted.
    /// Leaf payloads are copied out of `data_blocks[block_index]`.
    pub fn parse(table: &[u8], data_blocks: &[Vec<u8>]) -> Result<Self> {
        let mut roots = Vec::new();
        let mut pos = 0;

        while pos < table.len() {
            let rest = &table[pos..];
            if rest.len() < CHUNK_HEADER_SIZE {
                if rest.iter().all(|&b| b == 0) {
                    tracing::debug!("Ignoring {} padding bytes after the chunk table", rest.len());
                    break;
                }
                return Err(Error::InvalidChunkTable {
                    offset: pos,
                    message: format!("{} trailing bytes do not form a header", rest.len()),
                });
            }
            let (node, consumed) = ChunkNode::parse(table, pos, data_blocks)?;
            roots.push(node);
            pos += consumed;
        }

        tracing::debug!("Parsed chunk table: {} roots", roots.len());
        Ok(Self { roots })
    }
}

impl ChunkNode {
    /// Parse the node whose header starts at `base_offset`.
    ///
    /// Returns the node and the number of table bytes it spans (its header
    /// plus any nested header run).
    pub fn parse(table: &[u8], base_offset: usize, data_blocks: &[Vec<u8>]) -> Result<(Self, usize)> {
        parse_node(table, base_offset, data_blocks, 0)
    }
}

fn parse_node(
    table: &[u8],
    pos: usize,
    data_blocks: &[Vec<u8>],
    depth: usize,
) -> Result<(ChunkNode, usize)> {
    if depth > MAX_DEPTH {
        return Err(Error::InvalidChunkTable {
            offset: pos,
            message: format!("containers nested deeper than {MAX_DEPTH}"),
        });
    }

    let header = ChunkHeader::read(table, pos)?;
    let mut node = ChunkNode {
        type_id: header.type_id,
        flags: header.flags,
        offset: header.offset,
        size: header.size,
        body: ChunkBody::Payload(Vec::new()),
    };

    if node.has_children() {
        let run_start = pos + CHUNK_HEADER_SIZE;
        let run_end = run_start + header.size as usize;
        if run_end > table.len() {
            return Err(Error::InvalidChunkTable {
                offset: pos,
                message: format!(
                    "child headers end at {run_end:#X}, past the table end {:#X}",
                    table.len()
                ),
            });
        }

        let mut children = Vec::new();
        let mut child_pos = run_start;
        while child_pos < run_end {
            if run_end - child_pos < CHUNK_HEADER_SIZE {
                return Err(Error::InvalidChunkTable {
                    offset: child_pos,
                    message: format!("{} bytes left in the child run", run_end - child_pos),
                });
            }
            let (child, consumed) = parse_node(table, child_pos, data_blocks, depth + 1)?;
            child_pos += consumed;
            if child_pos > run_end {
                return Err(Error::InvalidChunkTable {
                    offset: pos,
                    message: "child overruns its parent's header run".to_string(),
                });
            }
            children.push(child);
        }

        node.body = ChunkBody::Children(children);
        return Ok((node, CHUNK_HEADER_SIZE + header.size as usize));
    }

    let block_index = node.block_index();
    let block = data_blocks
        .get(block_index as usize)
        .ok_or_else(|| Error::InvalidChunkTable {
            offset: pos,
            message: format!("payload lives in missing data block {block_index}"),
        })?;
    let start = header.offset as usize;
    let end = start + header.size as usize;
    let payload = block.get(start..end).ok_or_else(|| Error::InvalidChunkTable {
        offset: pos,
        message: format!(
            "payload {start:#X}..{end:#X} lies outside data block {block_index} ({} bytes)",
            block.len()
        ),
    })?;
    node.body = ChunkBody::Payload(payload.to_vec());

    Ok((node, CHUNK_HEADER_SIZE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn header(type_id: u16, flags: u16, offset: u32, size: u32) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&type_id.to_le_bytes());
        out.extend_from_slice(&flags.to_le_bytes());
        out.extend_from_slice(&offset.to_le_bytes());
        out.extend_from_slice(&size.to_le_bytes());
        out
    }

    #[test]
    fn test_parse_nested() {
        let mut table = header(0x5000, 0x8000, 0, 24);
        table.extend(header(0x5013, 0, 0, 4));
        table.extend(header(0x5012, 0x1000, 4, 2));
        table.extend(header(0x0001, 0, 4, 4));

        let blocks = vec![vec![1, 2, 3, 4, 5, 6, 7, 8], vec![0, 0, 0, 0, 9, 9]];
        let forest = ChunkForest::parse(&table, &blocks).unwrap();

        assert_eq!(forest.roots.len(), 2);
        let script = &forest.roots[0];
        assert!(script.has_children());
        assert_eq!(script.children().len(), 2);
        assert_eq!(script.children()[0].payload(), Some(&[1, 2, 3, 4][..]));
        assert_eq!(script.children()[1].payload(), Some(&[9, 9][..]));
        assert_eq!(forest.roots[1].payload(), Some(&[5, 6, 7, 8][..]));
    }

    #[test]
    fn test_padding_after_table() {
        let mut table = header(0x0001, 0, 0, 0);
        table.extend([0, 0, 0, 0]);
        let forest = ChunkForest::parse(&table, &[Vec::new()]).unwrap();
        assert_eq!(forest.roots.len(), 1);

        table.extend([1]);
        assert!(ChunkForest::parse(&table, &[Vec::new()]).is_err());
    }

    #[test]
    fn test_payload_out_of_block() {
        let table = header(0x0001, 0, 4, 8);
        let err = ChunkForest::parse(&table, &[vec![0; 8]]).unwrap_err();
        assert!(matches!(err, Error::InvalidChunkTable { offset: 0, .. }));
    }

    #[test]
    fn test_missing_data_block() {
        let table = header(0x0001, 0x2000, 0, 0);
        assert!(ChunkForest::parse(&table, &[Vec::new()]).is_err());
    }

    #[test]
    fn test_child_run_past_table() {
        let mut table = header(0x5000, 0x8000, 0, 24);
        table.extend(header(0x5013, 0, 0, 0));
        assert!(ChunkForest::parse(&table, &[Vec::new()]).is_err());
    }

    #[test]
    fn test_ragged_child_run() {
        let mut table = header(0x5000, 0x8000, 0, 16);
        table.extend(header(0x5013, 0, 0, 0));
        table.extend([0; 4]);
        assert!(ChunkForest::parse(&table, &[Vec::new()]).is_err());
    }
}
