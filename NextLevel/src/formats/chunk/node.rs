//! Chunk nodes and the bit-packed header flags

use super::types::{ChunkTypeId, chunk_type_label};

/// Flag bit marking a container chunk
pub const FLAG_HAS_CHILDREN: u16 = 0x8000;

/// Flag bit selecting 8-byte alignment
pub const FLAG_ALIGN_8: u16 = 0x0100;

/// What a chunk holds: nested chunks or payload bytes, never both
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkBody {
    Children(Vec<ChunkNode>),
    Payload(Vec<u8>),
}

/// One node of the chunk forest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkNode {
    pub type_id: u16,
    pub flags: u16,
    /// For leaves, the payload offset inside the data block. Kept as read
    /// for containers.
    pub offset: u32,
    /// For leaves, the payload length. For containers, the byte length of
    /// the nested header run.
    pub size: u32,
    pub body: ChunkBody,
}

impl ChunkNode {
    /// Create a leaf chunk. Clears the children flag.
    #[must_use]
    pub fn leaf(type_id: ChunkTypeId, flags: u16, offset: u32, payload: Vec<u8>) -> Self {
        Self {
            type_id,
            flags: flags & !FLAG_HAS_CHILDREN,
            offset,
            size: payload.len() as u32,
            body: ChunkBody::Payload(payload),
        }
    }

    /// Create a container chunk. Sets the children flag.
    #[must_use]
    pub fn container(type_id: ChunkTypeId, flags: u16, offset: u32, children: Vec<ChunkNode>) -> Self {
        let size = children.iter().map(ChunkNode::table_len).sum::<usize>() as u32;
        Self {
            type_id,
            flags: flags | FLAG_HAS_CHILDREN,
            offset,
            size,
            body: ChunkBody::Children(children),
        }
    }

    /// Alignment field as encoded in the flags
    #[must_use]
    pub fn raw_alignment(&self) -> u16 {
        (self.flags >> 1) & 10
    }

    /// Which data block holds the payload (0..=3)
    #[must_use]
    pub fn block_index(&self) -> u8 {
        ((self.flags >> 12) & 3) as u8
    }

    #[must_use]
    pub fn has_children(&self) -> bool {
        (self.flags >> 15) & 1 != 0
    }

    /// Payload alignment: 16, 8 or 4 bytes
    #[must_use]
    pub fn alignment(&self) -> u32 {
        if self.raw_alignment() == 512 {
            16
        } else if (self.flags >> 8) & 1 != 0 {
            8
        } else {
            4
        }
    }

    #[must_use]
    pub fn type_name(&self) -> String {
        chunk_type_label(self.type_id)
    }

    #[must_use]
    pub fn children(&self) -> &[ChunkNode] {
        match &self.body {
            ChunkBody::Children(children) => children,
            ChunkBody::Payload(_) => &[],
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<ChunkNode>> {
        match &mut self.body {
            ChunkBody::Children(children) => Some(children),
            ChunkBody::Payload(_) => None,
        }
    }

    #[must_use]
    pub fn payload(&self) -> Option<&[u8]> {
        match &self.body {
            ChunkBody::Payload(payload) => Some(payload),
            ChunkBody::Children(_) => None,
        }
    }

    /// First immediate child of the given type
    #[must_use]
    pub fn find_child(&self, type_id: ChunkTypeId) -> Option<&ChunkNode> {
        self.children().iter().find(|c| c.type_id == type_id)
    }

    /// All immediate children of the given type, in order
    #[must_use]
    pub fn find_children(&self, type_id: ChunkTypeId) -> Vec<&ChunkNode> {
        self.children()
            .iter()
            .filter(|c| c.type_id == type_id)
            .collect()
    }

    /// Bytes this node and its descendants occupy in the chunk table
    #[must_use]
    pub fn table_len(&self) -> usize {
        super::CHUNK_HEADER_SIZE
            + self.children().iter().map(ChunkNode::table_len).sum::<usize>()
    }

    /// End of the payload inside its data block
    #[must_use]
    pub fn end(&self) -> u64 {
        u64::from(self.offset) + u64::from(self.size)
    }
}

/// Round `value` up to a multiple of `alignment`
#[must_use]
pub fn align_up(value: u64, alignment: u32) -> u64 {
    let alignment = u64::from(alignment.max(1));
    value.div_ceil(alignment) * alignment
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_accessors() {
        let node = ChunkNode::leaf(0xB502, 0x2100, 0, vec![]);
        assert_eq!(node.block_index(), 2);
        assert_eq!(node.alignment(), 8);
        assert!(!node.has_children());

        let node = ChunkNode::leaf(0xB502, 0x3000, 0, vec![]);
        assert_eq!(node.block_index(), 3);
        assert_eq!(node.alignment(), 4);
    }

    #[test]
    fn test_raw_alignment_mask() {
        // (flags >> 1) & 10 keeps bits 1 and 3 of the shifted value
        let node = ChunkNode::leaf(1, 0x0014, 0, vec![]);
        assert_eq!(node.raw_alignment(), 10);
        let node = ChunkNode::leaf(1, 0x0008, 0, vec![]);
        assert_eq!(node.raw_alignment(), 0);
    }

    #[test]
    fn test_constructors_keep_flag_and_body_in_step() {
        let leaf = ChunkNode::leaf(0x5012, 0xFFFF, 0, vec![1, 2, 3]);
        assert!(!leaf.has_children());
        assert_eq!(leaf.size, 3);

        let parent = ChunkNode::container(0x5000, 0, 0, vec![leaf.clone(), leaf]);
        assert!(parent.has_children());
        assert_eq!(parent.size, 24);
        assert_eq!(parent.table_len(), 36);
        assert_eq!(parent.find_children(0x5012).len(), 2);
        assert!(parent.find_child(0x5013).is_none());
    }

    #[test]
    fn test_align_up() {
        assert_eq!(align_up(0, 4), 0);
        assert_eq!(align_up(5, 4), 8);
        assert_eq!(align_up(17, 16), 32);
        assert_eq!(align_up(24, 8), 24);
    }
}
