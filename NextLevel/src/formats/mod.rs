//! File format handlers for Next Level Games archives

pub mod chunk;
pub mod common;
pub mod dict;

// Re-export common types for convenience
pub use chunk::{ChunkForest, ChunkNode, ChunkPath, ChunkTypeId, get_chunk_type_name, chunk_type_name_to_id};
pub use common::HashNames;
pub use dict::{BlockDescriptor, DictionaryIndex};
