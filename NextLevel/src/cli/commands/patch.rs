//! CLI command for replacing a chunk payload

use std::path::Path;

use anyhow::Context;

use crate::archive::Archive;
use crate::cli::progress::{DISK, GEAR, LOOKING_GLASS, print_done, print_step};
use crate::formats::chunk::ChunkPath;

pub fn execute(
    source: &Path,
    data: &Path,
    chunk: &str,
    payload: &Path,
    destination: &Path,
) -> anyhow::Result<()> {
    let start = std::time::Instant::now();
    let path: ChunkPath = chunk.parse()?;
    let bytes = std::fs::read(payload).with_context(|| format!("Failed to read {}", payload.display()))?;

    print_step(1, 3, LOOKING_GLASS, "Reading archive...");
    let mut archive = Archive::read(source, data)?;

    print_step(2, 3, GEAR, &format!("Replacing chunk {path} ({} bytes)...", bytes.len()));
    archive.set_chunk_payload(&path, bytes)?;

    let data_out = destination.with_extension("data");
    print_step(3, 3, DISK, &format!("Writing {}...", destination.display()));
    archive.write(destination, &data_out)?;

    print_done(start.elapsed());
    Ok(())
}
