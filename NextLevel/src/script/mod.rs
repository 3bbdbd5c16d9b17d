//! Script bytecode decompiler
//!
//! A script module is a container chunk whose children hold the script
//! header, one function table per script, the `ScriptData` blob (data pool,
//! code and string table) and optional hash tables. [`decompile_script`]
//! runs every function through a small stack VM and recovers the typed
//! variables it stores.
//!
//! ```no_run
//! use nextlevel::archive::Archive;
//! use nextlevel::formats::common::HashNames;
//!
//! let names = HashNames::load("hashes.txt")?;
//! let archive = Archive::read("level.dict", "level.data")?;
//! for (path, module) in archive.script_modules_with(&names) {
//!     println!("{path}:\n{}", module?.to_code(&names));
//! }
//! # Ok::<(), nextlevel::Error>(())
//! ```

mod assemble;
mod decompiler;
mod module;
pub mod opcode;
mod render;
mod value;

#[cfg(test)]
mod fixtures;

pub use assemble::AssembledScript;
pub use decompiler::{DecodeStatus, DecodedFunction, Operation, Pools, Statement, Variable, decode_function};
pub use module::{
    Function, SCRIPT_DATA_HEADER_SIZE, Script, ScriptModule, StringHash, decompile_script,
    decompile_script_with,
};
pub use opcode::{OpCode, combine_u24};
pub use value::{FLOAT_MAGNITUDE_LIMIT, TypedValue, classify_pool_word};
