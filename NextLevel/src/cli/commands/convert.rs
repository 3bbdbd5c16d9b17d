//! CLI commands for switching an archive's block storage

use std::path::Path;

use crate::archive::{Archive, WriteOptions};
use crate::cli::progress::{DISK, LOOKING_GLASS, PACKAGE, print_done, print_step};

/// Re-save an archive deflated (`Some(level)`) or raw (`None`)
pub fn execute(source: &Path, data: &Path, destination: &Path, level: Option<u32>) -> anyhow::Result<()> {
    let start = std::time::Instant::now();

    print_step(1, 3, LOOKING_GLASS, "Reading archive...");
    let mut archive = Archive::read(source, data)?;

    let message = if level.is_some() { "Compressing blocks..." } else { "Decompressing blocks..." };
    print_step(2, 3, PACKAGE, message);
    archive.set_compressed(level.is_some());
    let options = WriteOptions::new().with_compression_level(level.unwrap_or(6));

    let data_out = destination.with_extension("data");
    print_step(3, 3, DISK, &format!("Writing {}...", destination.display()));
    archive.write_with(destination, &data_out, &options)?;

    print_done(start.elapsed());
    Ok(())
}
