//! Script module builders shared by the unit tests

use crate::formats::chunk::{
    CHUNK_SCRIPT, CHUNK_SCRIPT_DATA, CHUNK_SCRIPT_FUNCTION_TABLE, CHUNK_SCRIPT_HEADER,
    CHUNK_SCRIPT_STRING_HASHES, ChunkNode, align_up,
};

pub const SCRIPT_HASH: u32 = 0x1234_5678;
pub const HASH_TYPE: u32 = 0xC0DE_0001;

/// Function table entry: (name hash, code start word, flags)
pub type Entry = (u32, u32, u32);

pub fn data_payload(pool: &[u32], code: &[u16], strings: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&HASH_TYPE.to_le_bytes());
    out.extend_from_slice(&((code.len() * 2) as u32).to_le_bytes());
    out.extend_from_slice(&((pool.len() * 4) as u32).to_le_bytes());
    out.extend_from_slice(&(strings.len() as u16).to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes());
    for word in pool {
        out.extend_from_slice(&word.to_le_bytes());
    }
    for word in code {
        out.extend_from_slice(&word.to_le_bytes());
    }
    out.extend_from_slice(strings);
    out
}

pub fn table_payload(entries: &[Entry]) -> Vec<u8> {
    entries
        .iter()
        .flat_map(|(hash, start, flags)| [*hash, *start, *flags])
        .flat_map(u32::to_le_bytes)
        .collect()
}

pub fn header_payload(scripts: usize) -> Vec<u8> {
    (0..scripts as u32)
        .flat_map(|i| [SCRIPT_HASH + i, 0x40])
        .flat_map(u32::to_le_bytes)
        .collect()
}

/// A script container with one script per function table, its leaves packed
/// into data block 1
pub fn script_node(pool: &[u32], code: &[u16], strings: &[u8], tables: &[&[Entry]]) -> ChunkNode {
    let mut leaves = vec![(CHUNK_SCRIPT_HEADER, header_payload(tables.len()))];
    leaves.extend(
        tables
            .iter()
            .map(|t| (CHUNK_SCRIPT_FUNCTION_TABLE, table_payload(t))),
    );
    leaves.push((CHUNK_SCRIPT_DATA, data_payload(pool, code, strings)));
    leaves.push((
        CHUNK_SCRIPT_STRING_HASHES,
        [0xAAAA_0001u32, 0, 4].into_iter().flat_map(u32::to_le_bytes).collect(),
    ));
    container(leaves)
}

pub fn container(leaves: Vec<(u16, Vec<u8>)>) -> ChunkNode {
    let mut offset = 0u64;
    let children = leaves
        .into_iter()
        .map(|(type_id, payload)| {
            let at = align_up(offset, 4);
            offset = at + payload.len() as u64;
            ChunkNode::leaf(type_id, 0, at as u32, payload)
        })
        .collect();
    ChunkNode::container(CHUNK_SCRIPT, 0, 0, children)
}
