//! CLI command for printing the chunk forest

use std::path::Path;

use crate::archive::Archive;
use crate::formats::chunk::{ChunkTypeId, chunk_type_name_to_id};

/// Parse a chunk type given as a registry name or a hex ID
fn parse_chunk_type(s: &str) -> anyhow::Result<ChunkTypeId> {
    if let Some(id) = chunk_type_name_to_id(s) {
        return Ok(id);
    }
    let hex = s.trim_start_matches("0x").trim_start_matches("0X");
    ChunkTypeId::from_str_radix(hex, 16).map_err(|_| anyhow::anyhow!("Unknown chunk type '{s}'"))
}

pub fn execute(source: &Path, data: &Path, chunk_type: Option<&str>) -> anyhow::Result<()> {
    let archive = Archive::read(source, data)?;
    let filter = chunk_type.map(parse_chunk_type).transpose()?;

    for (path, node) in archive.chunks().walk() {
        if filter.is_some_and(|t| t != node.type_id) {
            continue;
        }
        let indent = if filter.is_some() { 0 } else { path.depth() * 2 };
        if node.has_children() {
            println!(
                "{:indent$}{path}  {}  flags={:#06X}  children={}",
                "",
                node.type_name(),
                node.flags,
                node.children().len()
            );
        } else {
            println!(
                "{:indent$}{path}  {}  flags={:#06X}  block={}  align={}  offset={:#X}  size={}",
                "",
                node.type_name(),
                node.flags,
                1 + node.block_index(),
                node.alignment(),
                node.offset,
                node.size
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chunk_type() {
        assert_eq!(parse_chunk_type("ScriptData").unwrap(), 0x5012);
        assert_eq!(parse_chunk_type("0xB502").unwrap(), 0xB502);
        assert_eq!(parse_chunk_type("5013").unwrap(), 0x5013);
        assert!(parse_chunk_type("NotAChunk").is_err());
    }
}
