//! DICT block index writer

use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};

use super::{BLOCK_DESCRIPTOR_SIZE, DictionaryIndex, HEADER_SIZE, MAGIC, TABLE_REF_SIZE};
use crate::error::{Error, Result};

impl DictionaryIndex {
    /// Write the index to disk
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let bytes = self.save()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Serialize the index to bytes
    ///
    /// Field order and region sizes mirror [`DictionaryIndex::load`], so
    /// `load(save(index)) == index`.
    pub fn save(&self) -> Result<Vec<u8>> {
        let block_count = count_u8(self.blocks.len())?;
        let table_ref_count = count_u8(self.table_ref_count())?;
        let name_count = count_u8(self.names.len())?;

        if self.table_refs.len() % TABLE_REF_SIZE != 0 {
            return Err(Error::InvalidFormat(format!(
                "table reference region is {} bytes, not a multiple of {TABLE_REF_SIZE}",
                self.table_refs.len()
            )));
        }

        let mut output = Vec::with_capacity(
            HEADER_SIZE + self.blocks.len() * BLOCK_DESCRIPTOR_SIZE + self.table_refs.len(),
        );

        // Header
        output.write_u32::<LittleEndian>(MAGIC)?;
        output.write_u16::<LittleEndian>(self.version)?;
        output.write_u8(u8::from(self.is_compressed))?;
        output.write_u8(self.header_reserved[0])?;
        output.write_u32::<LittleEndian>(self.largest_block())?;
        output.write_u8(block_count)?;
        output.write_u8(table_ref_count)?;
        output.write_u8(name_count)?;
        output.write_u8(self.header_reserved[1])?;

        // Block descriptors
        for block in &self.blocks {
            output.write_u32::<LittleEndian>(block.offset)?;
            output.write_u32::<LittleEndian>(block.decompressed_size)?;
            output.write_u32::<LittleEndian>(block.compressed_size)?;
            output.write_u8(block.reserved[0])?;
            output.write_u8(block.reserved[1])?;
            output.write_u8(block.usage_tag)?;
            output.write_u8(block.reserved[2])?;
        }

        // Regions this crate does not interpret
        output.extend_from_slice(&self.table_refs);
        for name in &self.names {
            output.extend_from_slice(name.as_bytes());
            output.push(0);
        }
        output.extend_from_slice(&self.trailer);

        Ok(output)
    }
}

fn count_u8(count: usize) -> Result<u8> {
    u8::try_from(count).map_err(|_| Error::TooManyBlocks { count })
}

#[cfg(test)]
mod tests {
    use super::super::{BlockDescriptor, USAGE_CHUNK_DATA};
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_index() -> DictionaryIndex {
        let mut debug_block = BlockDescriptor::new(0x300, 0x40, 0x40);
        debug_block.usage_tag = 2;
        DictionaryIndex {
            version: 0x0401,
            is_compressed: true,
            blocks: vec![
                BlockDescriptor::new(0, 0x100, 0x80),
                BlockDescriptor::new(0x80, 0x2000, 0x280),
                debug_block,
            ],
            table_refs: vec![1, 2, 3, 4, 5, 6, 7, 8],
            names: vec![".data".to_string(), ".debug".to_string()],
            trailer: vec![0xAA, 0xBB],
            header_reserved: [0, 0],
        }
    }

    #[test]
    fn test_save_then_load() {
        let index = sample_index();
        let bytes = index.save().unwrap();
        assert_eq!(DictionaryIndex::load(&bytes).unwrap(), index);
    }

    #[test]
    fn test_header_layout() {
        let bytes = sample_index().save().unwrap();
        assert_eq!(&bytes[0..4], &MAGIC.to_le_bytes());
        assert_eq!(bytes[6], 1); // compressed
        assert_eq!(&bytes[8..12], &0x2000u32.to_le_bytes()); // largest block
        assert_eq!(bytes[12], 3); // blocks
        assert_eq!(bytes[13], 1); // table refs
        assert_eq!(bytes[14], 2); // names
        // usage tag of the third descriptor
        assert_eq!(bytes[HEADER_SIZE + 2 * BLOCK_DESCRIPTOR_SIZE + 14], 2);
        assert!(bytes.ends_with(b".data\0.debug\0\xAA\xBB"));
    }

    #[test]
    fn test_bad_magic() {
        let mut bytes = sample_index().save().unwrap();
        bytes[0] ^= 0xFF;
        let err = DictionaryIndex::load(&bytes).unwrap_err();
        assert!(matches!(err, Error::BadMagic { .. }));
    }

    #[test]
    fn test_truncated_descriptors() {
        let bytes = sample_index().save().unwrap();
        assert!(DictionaryIndex::load(&bytes[..HEADER_SIZE + 5]).is_err());
    }

    #[test]
    fn test_check_bounds() {
        let index = sample_index();
        assert!(index.check_bounds(0x340).is_ok());
        let err = index.check_bounds(0x33F).unwrap_err();
        assert!(matches!(err, Error::BlockOutOfRange { block: 2, .. }));
    }

    #[test]
    fn test_too_many_blocks() {
        let mut index = DictionaryIndex::new(false);
        index.blocks = vec![BlockDescriptor::default(); 256];
        assert!(matches!(index.save(), Err(Error::TooManyBlocks { count: 256 })));
        assert_eq!(index.blocks[0].usage_tag, USAGE_CHUNK_DATA);
    }
}
