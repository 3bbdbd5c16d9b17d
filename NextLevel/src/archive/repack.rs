//! Payload replacement with offset cascade
//!
//! Leaves sharing a data block are packed by offset. When one grows or
//! shrinks, every leaf of the same block stored after it moves by the size
//! delta, rounded up to that leaf's own alignment.

use super::Archive;
use crate::error::{Error, Result};
use crate::formats::chunk::{ChunkBody, ChunkForest, ChunkPath, align_up};

/// A leaf that has to move
#[derive(Debug, Clone, PartialEq, Eq)]
struct Shift {
    path: ChunkPath,
    new_offset: u32,
}

impl Archive {
    /// Replace the payload of the leaf at `path`.
    ///
    /// Every leaf in the same data block stored after the target is shifted by the size delta, rounded up to its alignment, and
    /// the block bytes and dictionary are updated to match. Everything is
    /// validated before anything changes: on error the archive is untouched.
    pub fn set_chunk_payload(&mut self, path: &ChunkPath, payload: Vec<u8>) -> Result<()> {
        let target = self.forest.resolve(path)?;
        if target.has_children() || !matches!(target.body, ChunkBody::Payload(_)) {
            return Err(Error::NotALeaf {
                path: path.to_string(),
            });
        }

        let block = 1 + target.block_index() as usize;
        if self.faults.iter().any(|f| f.block == block) {
            return Err(Error::CorruptBlock {
                block,
                message: "block failed to inflate and cannot be edited".to_string(),
            });
        }
        let old_block = self.blocks.get(block).ok_or_else(|| Error::InvalidFormat(format!(
            "chunk {path} lives in missing block {block}"
        )))?;

        let new_size = u32::try_from(payload.len()).map_err(|_| {
            Error::InvalidFormat(format!("payload of {} bytes is too large", payload.len()))
        })?;
        let shifts = plan_shifts(&self.forest, path, new_size)?;
        let new_block = rebuild_block(&self.forest, path, old_block, &payload, &shifts);

        tracing::debug!(
            "Repacking chunk {path}: {} -> {new_size} bytes, {} chunks shifted, block {block} now {} bytes",
            target.size,
            shifts.len(),
            new_block.len()
        );

        // Commit
        let new_len = new_block.len() as u32;
        for shift in &shifts {
            if let Some(node) = self.forest.get_mut(&shift.path) {
                node.offset = shift.new_offset;
            }
        }
        if let Some(node) = self.forest.get_mut(path) {
            node.size = new_size;
            node.body = ChunkBody::Payload(payload);
        }
        self.blocks[block] = new_block;
        if let Some(desc) = self.index.blocks.get_mut(block) {
            desc.decompressed_size = new_len;
        }
        self.refresh_table()
    }

    /// Regenerate the chunk table (block 0) from the forest
    fn refresh_table(&mut self) -> Result<()> {
        let table = self.forest.write_table()?;
        if let Some(desc) = self.index.blocks.first_mut() {
            desc.decompressed_size = table.len() as u32;
        }
        if let Some(block) = self.blocks.first_mut() {
            *block = table;
        }
        Ok(())
    }
}

/// Work out the new offset of every leaf that follows the target.
///
/// Leaves are placed in ascending offset order. A leaf that would overlap
/// the one placed before it is pushed past it instead.
fn plan_shifts(forest: &ChunkForest, target_path: &ChunkPath, new_size: u32) -> Result<Vec<Shift>> {
    let target = forest.resolve(target_path)?;
    let delta = i64::from(new_size) - i64::from(target.size);
    if delta == 0 {
        return Ok(Vec::new());
    }

    // An empty target shares its offset with the leaf stored after it, so
    // leaves at the same offset later in pre-order follow it too.
    let walked = forest.walk();
    let target_rank = walked.iter().position(|(path, _)| path == target_path);
    let mut following: Vec<_> = walked
        .into_iter()
        .enumerate()
        .filter(|(rank, (path, node))| {
            path != target_path
                && !node.has_children()
                && node.block_index() == target.block_index()
                && (node.offset > target.offset
                    || (target.size == 0
                        && node.offset == target.offset
                        && target_rank.is_some_and(|t| *rank > t)))
        })
        .map(|(_, entry)| entry)
        .collect();
    following.sort_by(|(pa, a), (pb, b)| a.offset.cmp(&b.offset).then_with(|| pa.cmp(pb)));

    let mut placed_end = u64::from(target.offset) + u64::from(new_size);
    let mut shifts = Vec::with_capacity(following.len());

    for (path, node) in following {
        let alignment = node.alignment();
        let wanted = (i64::from(node.offset) + delta).max(0) as u64;
        let mut new_offset = align_up(wanted, alignment);
        if new_offset < placed_end {
            new_offset = align_up(placed_end, alignment);
        }
        let end = new_offset + u64::from(node.size);
        if end > u64::from(u32::MAX) {
            return Err(Error::InvalidFormat(format!(
                "chunk {path} would end past 4 GiB after repacking"
            )));
        }
        placed_end = placed_end.max(end);
        shifts.push(Shift {
            path,
            new_offset: new_offset as u32,
        });
    }

    Ok(shifts)
}

/// Build the block bytes after the edit.
///
/// Bytes before the target are kept, bytes after it move with the delta, and
/// every shifted payload is written at its new offset. Gaps are zero-filled.
fn rebuild_block(
    forest: &ChunkForest,
    target_path: &ChunkPath,
    old_block: &[u8],
    payload: &[u8],
    shifts: &[Shift],
) -> Vec<u8> {
    let Some(target) = forest.get(target_path) else {
        return old_block.to_vec();
    };
    let start = (target.offset as usize).min(old_block.len());
    let old_end = (target.end() as usize).min(old_block.len());
    let new_end = target.offset as usize + payload.len();

    let shifted_end = shifts
        .iter()
        .filter_map(|s| forest.get(&s.path).map(|n| s.new_offset as usize + n.size as usize))
        .max()
        .unwrap_or(0);
    let tail = &old_block[old_end..];
    let len = (new_end + tail.len()).max(shifted_end);

    let mut block = vec![0u8; len];
    block[..start].copy_from_slice(&old_block[..start]);
    block[new_end..new_end + tail.len()].copy_from_slice(tail);
    block[target.offset as usize..new_end].copy_from_slice(payload);

    for shift in shifts {
        if let Some(data) = forest.get(&shift.path).and_then(|n| n.payload()) {
            let at = shift.new_offset as usize;
            block[at..at + data.len()].copy_from_slice(data);
        }
    }
    block
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::chunk::{ChunkNode, FLAG_ALIGN_8};
    use pretty_assertions::assert_eq;

    /// Block 1 holds A@0(8) B@8(8) C@16(4) D@24(8, 8-aligned); block 2 holds E@0(4)
    fn sample() -> Archive {
        let forest = ChunkForest::new(vec![
            ChunkNode::container(
                0x5000,
                0,
                0,
                vec![
                    ChunkNode::leaf(0x5013, 0, 0, vec![0xA; 8]),
                    ChunkNode::leaf(0x5012, 0, 8, vec![0xB; 8]),
                ],
            ),
            ChunkNode::leaf(0x0001, 0, 16, vec![0xC; 4]),
            ChunkNode::leaf(0xB502, FLAG_ALIGN_8, 24, vec![0xD; 8]),
            ChunkNode::leaf(0xB502, 0x1000, 0, vec![0xE; 4]),
        ]);
        Archive::from_forest(forest, false).unwrap()
    }

    fn offsets(archive: &Archive) -> Vec<(String, u32, u32)> {
        archive
            .chunks()
            .walk()
            .into_iter()
            .filter(|(_, n)| !n.has_children())
            .map(|(p, n)| (p.to_string(), n.offset, n.size))
            .collect()
    }

    fn path(s: &str) -> ChunkPath {
        s.parse().unwrap()
    }

    #[test]
    fn test_grow_by_aligned_delta_shifts_exactly() {
        let mut archive = sample();
        archive.set_chunk_payload(&path("0/0"), vec![0x1; 16]).unwrap();

        assert_eq!(
            offsets(&archive),
            vec![
                ("0/0".to_string(), 0, 16),
                ("0/1".to_string(), 16, 8),
                ("1".to_string(), 24, 4),
                ("2".to_string(), 32, 8),
                ("3".to_string(), 0, 4),
            ]
        );

        let block = archive.block(1).unwrap();
        assert_eq!(block.len(), 40);
        assert_eq!(&block[..16], &[0x1; 16]);
        assert_eq!(&block[16..24], &[0xB; 8]);
        assert_eq!(&block[24..28], &[0xC; 4]);
        assert_eq!(&block[32..40], &[0xD; 8]);
        assert_eq!(archive.dictionary().blocks[1].decompressed_size, 40);
        // the other data block is untouched
        assert_eq!(archive.block(2).unwrap(), &[0xE; 4]);
    }

    #[test]
    fn test_unaligned_delta_rounds_up_per_node() {
        let mut archive = sample();
        archive.set_chunk_payload(&path("0/1"), vec![0x2; 11]).unwrap();
        let offs = offsets(&archive);
        // C: 16 + 3 -> 20 (4-aligned); D: 24 + 3 -> 32 (8-aligned)
        assert_eq!(offs[2], ("1".to_string(), 20, 4));
        assert_eq!(offs[3], ("2".to_string(), 32, 8));
        for (_, n) in archive.chunks().walk() {
            assert_eq!(n.offset % n.alignment(), 0);
        }
    }

    #[test]
    fn test_shrink_moves_following_down() {
        let mut archive = sample();
        archive.set_chunk_payload(&path("0/0"), vec![0x3; 4]).unwrap();
        let offs = offsets(&archive);
        assert_eq!(offs[1], ("0/1".to_string(), 4, 8));
        assert_eq!(offs[2], ("1".to_string(), 12, 4));
        assert_eq!(offs[3], ("2".to_string(), 24, 8));
        assert_eq!(archive.block(1).unwrap().len(), 32);
    }

    #[test]
    fn test_same_size_moves_nothing() {
        let mut archive = sample();
        let before = offsets(&archive);
        archive.set_chunk_payload(&path("1"), vec![0x7; 4]).unwrap();
        assert_eq!(offsets(&archive), before);
        assert_eq!(&archive.block(1).unwrap()[16..20], &[0x7; 4]);
    }

    #[test]
    fn test_edit_survives_save() {
        let mut archive = sample();
        archive.set_chunk_payload(&path("0/1"), vec![0x9; 20]).unwrap();
        let (dict, data) = archive.save().unwrap();
        let reopened = Archive::open(&dict, &data).unwrap();
        assert_eq!(reopened.chunks(), archive.chunks());
        assert_eq!(
            reopened.chunks().get(&path("0/1")).unwrap().payload(),
            Some(&[0x9; 20][..])
        );
    }

    #[test]
    fn test_grow_empty_leaf_in_front_of_another() {
        let forest = ChunkForest::new(vec![
            ChunkNode::leaf(0x0001, 0, 0, Vec::new()),
            ChunkNode::leaf(0x0001, 0, 0, vec![0xB; 4]),
        ]);
        let mut archive = Archive::from_forest(forest, false).unwrap();
        archive.set_chunk_payload(&path("0"), vec![0xA; 4]).unwrap();

        assert_eq!(
            offsets(&archive),
            vec![("0".to_string(), 0, 4), ("1".to_string(), 4, 4)]
        );
        assert_eq!(archive.block(1).unwrap(), &[0xA, 0xA, 0xA, 0xA, 0xB, 0xB, 0xB, 0xB]);

        let (dict, data) = archive.save().unwrap();
        let reopened = Archive::open(&dict, &data).unwrap();
        assert_eq!(reopened.chunks().get(&path("1")).unwrap().payload(), Some(&[0xB; 4][..]));
        assert_eq!(reopened.chunks(), archive.chunks());
    }

    #[test]
    fn test_errors_leave_archive_untouched() {
        let mut archive = sample();
        let before = archive.chunks().clone();

        let err = archive.set_chunk_payload(&path("7"), vec![]).unwrap_err();
        assert!(matches!(err, Error::NodeNotFound { .. }));

        let err = archive.set_chunk_payload(&path("0"), vec![]).unwrap_err();
        assert!(matches!(err, Error::NotALeaf { .. }));

        assert_eq!(archive.chunks(), &before);
    }
}
