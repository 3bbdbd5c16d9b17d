//! # NextLevel
//!
//! A pure-Rust library for the `.dict`/`.data` archives used by Next Level
//! Games titles (Luigi's Mansion 2 and relatives).
//!
//! ## Supported Formats
//!
//! - **DICT/DATA archives** - Block index, raw DEFLATE blocks, load and save
//! - **Chunk trees** - Nested chunk headers with flag-derived alignment
//! - **Repacking** - Replace a chunk payload and cascade the offsets that follow
//! - **Script bytecode** - Decompile script modules to typed variables and pseudo-code
//!
//! ## Quick Start
//!
//! ### Listing Chunks
//!
//! ```no_run
//! use nextlevel::archive::Archive;
//!
//! let archive = Archive::read("level.dict", "level.data")?;
//! for (path, node) in archive.chunks().walk() {
//!     println!("{path} {} {} bytes", node.type_name(), node.size);
//! }
//! # Ok::<(), nextlevel::Error>(())
//! ```
//!
//! ### Using the Prelude
//!
//! ```
//! use nextlevel::prelude::*;
//!
//! let path: ChunkPath = "0/1".parse()?;
//! assert_eq!(path.depth(), 1);
//! # Ok::<(), nextlevel::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` - Enables the `nextlevel` command-line binary

pub mod archive;
pub mod compression;
pub mod error;
pub mod formats;
pub mod script;

// Re-exports for convenience
pub use error::{Error, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::archive::{Archive, BlockFault, ReadOptions, WriteOptions};
    pub use crate::error::{Error, Result};
    pub use crate::formats::chunk::{
        ChunkBody, ChunkForest, ChunkNode, ChunkPath, ChunkTypeId, chunk_type_label, get_chunk_type_name,
    };
    pub use crate::formats::common::HashNames;
    pub use crate::formats::dict::{BlockDescriptor, DictionaryIndex};
    pub use crate::script::{
        DecodeStatus, Function, Script, ScriptModule, Statement, TypedValue, Variable, decompile_script,
        decompile_script_with,
    };
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// CLI module (feature-gated)
#[cfg(feature = "cli")]
pub mod cli;
