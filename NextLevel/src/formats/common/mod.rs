//! Common types and utilities shared across archive formats

pub mod hash;

pub use hash::HashNames;
