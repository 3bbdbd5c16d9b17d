//! CLI command for dictionary and block summaries

use std::path::Path;

use console::style;

use super::format_size;
use crate::archive::Archive;

pub fn execute(source: &Path, data: &Path) -> anyhow::Result<()> {
    let archive = Archive::read(source, data)?;
    let index = archive.dictionary();

    println!("Archive: {}", source.display());
    println!();
    println!("Version: {}", index.version);
    println!("Compressed: {}", if index.is_compressed { "yes" } else { "no" });
    println!("Largest block: {}", format_size(u64::from(index.largest_block())));
    println!("Table references: {}", index.table_ref_count());
    if !index.names.is_empty() {
        println!("Names: {}", index.names.join(", "));
    }
    println!("Chunks: {}", archive.chunks().node_count());
    println!();

    println!(
        "{:>5}  {:>10}  {:>10}  {:>10}  {:>5}",
        "BLOCK", "OFFSET", "SIZE", "STORED", "USAGE"
    );
    for (i, desc) in index.blocks.iter().enumerate() {
        let line = format!(
            "{:>5}  {:>#10X}  {:>10}  {:>10}  {:>5}",
            i,
            desc.offset,
            format_size(u64::from(desc.decompressed_size)),
            format_size(u64::from(desc.stored_size(index.is_compressed))),
            desc.usage_tag
        );
        if archive.block_faults().iter().any(|f| f.block == i) {
            println!("{}  {}", style(line).red(), style("corrupt").red().bold());
        } else {
            println!("{line}");
        }
    }

    let total: u64 = index.blocks.iter().map(|d| u64::from(d.decompressed_size)).sum();
    let stored: u64 = index
        .blocks
        .iter()
        .map(|d| u64::from(d.stored_size(index.is_compressed)))
        .sum();
    println!();
    println!(
        "{} blocks, {} total ({} stored)",
        index.blocks.len(),
        format_size(total),
        format_size(stored)
    );

    Ok(())
}
