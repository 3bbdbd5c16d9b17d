//! SPDX-FileCopyrightText: 2025 CyberDeco
//!
//! SPDX-License-Identifier: MIT
//!
//! DICT block index reader/writer
//!
//! The `.dict` side-car describes how the paired `.data` file is cut into
//! blocks, and whether those blocks are deflated.

mod reader;
mod types;
mod writer;

pub use types::*;

/// DICT magic signature
pub const MAGIC: u32 = 0xA9F32458;

/// Size of the fixed header
pub const HEADER_SIZE: usize = 16;

/// Size of one block descriptor
pub const BLOCK_DESCRIPTOR_SIZE: usize = 16;

/// Size of one entry in the table-reference region
pub const TABLE_REF_SIZE: usize = 8;
