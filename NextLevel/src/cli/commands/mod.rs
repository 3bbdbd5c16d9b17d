use clap::Subcommand;
use std::path::{Path, PathBuf};

pub mod convert;
pub mod decompile;
pub mod execute;
pub mod info;
pub mod patch;
pub mod tree;

#[derive(Subcommand)]
pub enum Commands {
    /// Show the dictionary header and block table
    Info {
        /// Source .dict file
        source: PathBuf,

        /// Paired .data file (defaults to the .dict path with a .data extension)
        #[arg(long)]
        data: Option<PathBuf>,
    },

    /// Print the chunk forest
    Tree {
        /// Source .dict file
        source: PathBuf,

        /// Paired .data file
        #[arg(long)]
        data: Option<PathBuf>,

        /// Only show chunks of this type (name or hex ID, e.g. "ScriptData" or 0x5012)
        #[arg(short = 't', long = "type")]
        chunk_type: Option<String>,
    },

    /// Decompile every script module in an archive
    Decompile {
        /// Source .dict file
        source: PathBuf,

        /// Paired .data file
        #[arg(long)]
        data: Option<PathBuf>,

        /// Emit JSON instead of pseudo-code
        #[arg(long)]
        json: bool,

        /// Write output to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Replace one chunk payload and save the archive
    Patch {
        /// Source .dict file
        source: PathBuf,

        /// Chunk path, root index then child indices (e.g. "0/2/1")
        #[arg(short, long)]
        chunk: String,

        /// File holding the new payload
        #[arg(short, long)]
        payload: PathBuf,

        /// Destination .dict file (the .data file is written next to it)
        destination: PathBuf,

        /// Paired .data file of the source
        #[arg(long)]
        data: Option<PathBuf>,
    },

    /// Save an archive with deflated data blocks
    Compress {
        /// Source .dict file
        source: PathBuf,

        /// Destination .dict file (the .data file is written next to it)
        destination: PathBuf,

        /// Paired .data file of the source
        #[arg(long)]
        data: Option<PathBuf>,

        /// DEFLATE level (0-9)
        #[arg(short, long, default_value_t = 6)]
        level: u32,
    },

    /// Save an archive with raw data blocks
    Decompress {
        /// Source .dict file
        source: PathBuf,

        /// Destination .dict file (the .data file is written next to it)
        destination: PathBuf,

        /// Paired .data file of the source
        #[arg(long)]
        data: Option<PathBuf>,
    },
}

/// The `.data` file paired with a `.dict` file
pub(crate) fn data_path_for(dict: &Path, data: Option<&Path>) -> PathBuf {
    data.map_or_else(|| dict.with_extension("data"), Path::to_path_buf)
}

/// Format byte size for human-readable output
pub(crate) fn format_size(bytes: u64) -> String {
    if bytes >= 1_048_576 {
        format!("{:.1}M", bytes as f64 / 1_048_576.0)
    } else if bytes >= 1024 {
        format!("{:.1}K", bytes as f64 / 1024.0)
    } else {
        format!("{bytes}")
    }
}
