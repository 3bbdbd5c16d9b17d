//! Chunk table writer

use byteorder::{LittleEndian, WriteBytesExt};

use super::forest::ChunkForest;
use super::node::{ChunkBody, ChunkNode};
use crate::error::Result;

impl ChunkForest {
    /// Serialize every header, pre-order, into a chunk table.
    ///
    /// Container sizes are recomputed from their descendants.
    pub fn write_table(&self) -> Result<Vec<u8>> {
        let len = self.roots.iter().map(ChunkNode::table_len).sum();
        let mut table = Vec::with_capacity(len);
        for root in &self.roots {
            write_node(root, &mut table)?;
        }
        Ok(table)
    }

    /// Build data blocks holding every leaf payload at its offset.
    ///
    /// At least `min_blocks` buffers are returned; gaps are zero-filled.
    #[must_use]
    pub fn layout_blocks(&self, min_blocks: usize) -> Vec<Vec<u8>> {
        let mut blocks = vec![Vec::new(); min_blocks];
        for (_, node) in self.walk() {
            let ChunkBody::Payload(payload) = &node.body else {
                continue;
            };
            let index = node.block_index() as usize;
            if blocks.len() <= index {
                blocks.resize(index + 1, Vec::new());
            }
            let block = &mut blocks[index];
            let start = node.offset as usize;
            let end = start + payload.len();
            if block.len() < end {
                block.resize(end, 0);
            }
            block[start..end].copy_from_slice(payload);
        }
        blocks
    }
}

fn write_node(node: &ChunkNode, out: &mut Vec<u8>) -> Result<()> {
    let size = match &node.body {
        ChunkBody::Children(children) => children.iter().map(ChunkNode::table_len).sum::<usize>() as u32,
        ChunkBody::Payload(payload) => payload.len() as u32,
    };

    out.write_u16::<LittleEndian>(node.type_id)?;
    out.write_u16::<LittleEndian>(node.flags)?;
    out.write_u32::<LittleEndian>(node.offset)?;
    out.write_u32::<LittleEndian>(size)?;

    for child in node.children() {
        write_node(child, out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::node::{FLAG_ALIGN_8, align_up};
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn arb_leaf() -> impl Strategy<Value = ChunkNode> {
        (
            any::<u16>(),
            0u16..4,
            any::<bool>(),
            prop::collection::vec(any::<u8>(), 0..24),
        )
            .prop_map(|(type_id, block, align8, payload)| {
                let flags = (block << 12) | if align8 { FLAG_ALIGN_8 } else { 0 };
                ChunkNode::leaf(type_id, flags, 0, payload)
            })
    }

    fn arb_node() -> impl Strategy<Value = ChunkNode> {
        arb_leaf().prop_recursive(3, 24, 4, |inner| {
            (any::<u16>(), any::<u32>(), prop::collection::vec(inner, 0..4))
                .prop_map(|(type_id, offset, children)| ChunkNode::container(type_id, 0, offset, children))
        })
    }

    /// Give every leaf its own aligned slot in its block
    fn place_payloads(forest: &mut ChunkForest) {
        let mut cursors = [0u64; 4];
        for node in &mut forest.roots {
            place_node(node, &mut cursors);
        }
    }

    fn place_node(node: &mut ChunkNode, cursors: &mut [u64; 4]) {
        if let Some(children) = node.children_mut() {
            for child in children {
                place_node(child, cursors);
            }
            return;
        }
        let cursor = &mut cursors[node.block_index() as usize];
        let start = align_up(*cursor, node.alignment());
        node.offset = start as u32;
        *cursor = start + u64::from(node.size);
    }

    proptest! {
        #[test]
        fn prop_table_round_trip(roots in prop::collection::vec(arb_node(), 0..6)) {
            let mut forest = ChunkForest::new(roots);
            place_payloads(&mut forest);

            let table = forest.write_table().unwrap();
            let blocks = forest.layout_blocks(4);
            let parsed = ChunkForest::parse(&table, &blocks).unwrap();
            prop_assert_eq!(parsed, forest);
        }
    }

    #[test]
    fn test_table_bytes() {
        let forest = ChunkForest::new(vec![ChunkNode::container(
            0x5000,
            0,
            0xAABB,
            vec![ChunkNode::leaf(0x5012, 0x1000, 8, vec![7; 3])],
        )]);
        let table = forest.write_table().unwrap();
        assert_eq!(
            table,
            vec![
                0x00, 0x50, 0x00, 0x80, 0xBB, 0xAA, 0x00, 0x00, 0x0C, 0x00, 0x00, 0x00, //
                0x12, 0x50, 0x00, 0x10, 0x08, 0x00, 0x00, 0x00, 0x03, 0x00, 0x00, 0x00,
            ]
        );

        let blocks = forest.layout_blocks(1);
        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].is_empty());
        assert_eq!(blocks[1], vec![0, 0, 0, 0, 0, 0, 0, 0, 7, 7, 7]);
    }
}
