//! SPDX-FileCopyrightText: 2025 CyberDeco
//!
//! SPDX-License-Identifier: MIT
//!
//! Chunk tree model
//!
//! Dictionary block 0 holds a table of 12-byte chunk headers:
//!
//! ```text
//! type_id u16 | flags u16 | offset u32 | size u32
//! ```
//!
//! A container (flags bit 15) is followed by its children's headers, `size`
//! bytes of them. A leaf's payload is `size` bytes at `offset` inside data
//! block `block_index` (dictionary block `1 + block_index`).

mod forest;
mod node;
mod reader;
pub mod types;
mod writer;

pub use forest::{ChunkForest, ChunkPath};
pub use node::{ChunkBody, ChunkNode, FLAG_ALIGN_8, FLAG_HAS_CHILDREN, align_up};
pub use types::*;

/// Size of one chunk header in the table
pub const CHUNK_HEADER_SIZE: usize = 12;
