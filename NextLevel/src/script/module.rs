//! Script modules: the chunk family rooted at a container with a
//! `ScriptData` child
//!
//! ```text
//! ScriptHeader        (0x5013)  per script: hash u32, string_buffer_size u32
//! ScriptFunctionTable (0x5014)  one per script; per function: hash, code_start_index, flags
//! ScriptData          (0x5012)  hash_type u32, code_size u32, data_size u32,
//!                               string_table_size u16, reserved u16,
//!                               data pool, code, string table
//! ScriptStringHashes  (0x5015)  optional; per entry: hash, unknown, offset
//! ScriptHashBundle    (0x5011)  optional; u32 hashes
//! ```

use std::io::Cursor;

use byteorder::{LittleEndian, ReadBytesExt};
use indexmap::IndexMap;
use serde::Serialize;

use super::decompiler::{DecodeStatus, Operation, Pools, Statement, Variable, decode_function};
use super::value::TypedValue;
use crate::error::{Error, Result};
use crate::formats::chunk::{
    CHUNK_SCRIPT_DATA, CHUNK_SCRIPT_FUNCTION_TABLE, CHUNK_SCRIPT_HASH_BUNDLE, CHUNK_SCRIPT_HEADER,
    CHUNK_SCRIPT_STRING_HASHES, ChunkNode,
};
use crate::formats::common::HashNames;

/// Size of the `ScriptData` header
pub const SCRIPT_DATA_HEADER_SIZE: usize = 16;

/// An entry of the `ScriptStringHashes` chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StringHash {
    pub hash: u32,
    pub unknown: u32,
    pub offset: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Function {
    pub name_hash: u32,
    pub name: String,
    pub code_start_index: u32,
    pub flags: u32,
    pub operations: Vec<Operation>,
    pub variables: IndexMap<u32, Variable>,
    pub statements: Vec<Statement>,
    pub status: DecodeStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Script {
    pub name_hash: u32,
    pub name: String,
    pub string_buffer_size: u32,
    pub functions: Vec<Function>,
}

/// A decompiled script module
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScriptModule {
    pub hash_type: u32,
    pub scripts: Vec<Script>,
    pub strings: Vec<String>,
    pub string_hashes: Vec<StringHash>,
    pub hash_table: Vec<u32>,
    /// Data pool words, as stored
    #[serde(skip)]
    pub pool: Vec<u32>,
    /// Code region, as stored
    #[serde(skip)]
    pub code: Vec<u16>,
    /// String table bytes, as stored
    #[serde(skip)]
    pub string_table: Vec<u8>,
    /// Bytes after the string table, up to the end of the payload
    #[serde(skip)]
    pub padding: Vec<u8>,
    /// `string_table_size` header field, as stored
    #[serde(skip)]
    pub string_table_size: u16,
    #[serde(skip)]
    pub reserved: u16,
}

/// Decompile a script module, labelling it with the process-wide hash names
pub fn decompile_script(node: &ChunkNode) -> Result<ScriptModule> {
    decompile_script_with(node, HashNames::global())
}

/// Decompile a script module with an explicit name table.
///
/// A missing header or data chunk, or fewer function tables than scripts,
/// fails the whole module. Every function is decoded independently and
/// reports its own [`DecodeStatus`].
pub fn decompile_script_with(node: &ChunkNode, names: &HashNames) -> Result<ScriptModule> {
    let header = required_payload(node, CHUNK_SCRIPT_HEADER, "ScriptHeader")?;
    let data = required_payload(node, CHUNK_SCRIPT_DATA, "ScriptData")?;
    let tables = node.find_children(CHUNK_SCRIPT_FUNCTION_TABLE);

    let mut scripts = read_script_headers(header, names)?;
    if tables.len() < scripts.len() {
        return Err(Error::MissingRequiredChunk {
            chunk: "ScriptFunctionTable",
        });
    }
    if tables.len() > scripts.len() {
        tracing::warn!(
            "{} function tables for {} scripts, ignoring the extra tables",
            tables.len(),
            scripts.len()
        );
    }

    let string_hashes = match node.find_child(CHUNK_SCRIPT_STRING_HASHES).and_then(ChunkNode::payload) {
        Some(bytes) => read_string_hashes(bytes)?,
        None => Vec::new(),
    };
    let hash_table = match node.find_child(CHUNK_SCRIPT_HASH_BUNDLE).and_then(ChunkNode::payload) {
        Some(bytes) => read_u32s(bytes)?,
        None => Vec::new(),
    };

    let mut module = ScriptModule::parse_data(data)?;
    module.string_hashes = string_hashes;
    module.hash_table = hash_table;

    for (script, table) in scripts.iter_mut().zip(&tables) {
        let entries = table.payload().unwrap_or_default();
        script.functions = read_function_table(entries, names)?;
    }

    let pools = Pools {
        pool: &module.pool,
        code: &module.code,
        strings: &module.string_table,
        names,
    };
    for script in &mut scripts {
        for function in &mut script.functions {
            let decoded = decode_function(pools, function.code_start_index);
            function.operations = decoded.operations;
            function.variables = decoded.variables;
            function.statements = decoded.statements;
            function.status = decoded.status;
        }
    }
    module.scripts = scripts;

    tracing::debug!(
        "Decompiled script module {:#010X}: {} scripts, {} functions, {} pool slots",
        module.hash_type,
        module.scripts.len(),
        module.scripts.iter().map(|s| s.functions.len()).sum::<usize>(),
        module.pool.len()
    );

    Ok(module)
}

fn required_payload<'a>(node: &'a ChunkNode, type_id: u16, chunk: &'static str) -> Result<&'a [u8]> {
    node.find_child(type_id)
        .and_then(ChunkNode::payload)
        .ok_or(Error::MissingRequiredChunk { chunk })
}

fn read_script_headers(bytes: &[u8], names: &HashNames) -> Result<Vec<Script>> {
    let mut cursor = Cursor::new(bytes);
    let mut scripts = Vec::with_capacity(bytes.len() / 8);
    for _ in 0..bytes.len() / 8 {
        let name_hash = cursor.read_u32::<LittleEndian>()?;
        let string_buffer_size = cursor.read_u32::<LittleEndian>()?;
        scripts.push(Script {
            name_hash,
            name: names.name_or_fallback(name_hash),
            string_buffer_size,
            functions: Vec::new(),
        });
    }
    Ok(scripts)
}

fn read_function_table(bytes: &[u8], names: &HashNames) -> Result<Vec<Function>> {
    let mut cursor = Cursor::new(bytes);
    let mut functions = Vec::with_capacity(bytes.len() / 12);
    for _ in 0..bytes.len() / 12 {
        let name_hash = cursor.read_u32::<LittleEndian>()?;
        let code_start_index = cursor.read_u32::<LittleEndian>()?;
        let flags = cursor.read_u32::<LittleEndian>()?;
        functions.push(Function {
            name_hash,
            name: names.name_or_fallback(name_hash),
            code_start_index,
            flags,
            operations: Vec::new(),
            variables: IndexMap::new(),
            statements: Vec::new(),
            status: DecodeStatus::Complete,
        });
    }
    Ok(functions)
}

fn read_string_hashes(bytes: &[u8]) -> Result<Vec<StringHash>> {
    let mut cursor = Cursor::new(bytes);
    let mut entries = Vec::with_capacity(bytes.len() / 12);
    for _ in 0..bytes.len() / 12 {
        entries.push(StringHash {
            hash: cursor.read_u32::<LittleEndian>()?,
            unknown: cursor.read_u32::<LittleEndian>()?,
            offset: cursor.read_u32::<LittleEndian>()?,
        });
    }
    Ok(entries)
}

fn read_u32s(bytes: &[u8]) -> Result<Vec<u32>> {
    let mut cursor = Cursor::new(bytes);
    let mut words = Vec::with_capacity(bytes.len() / 4);
    for _ in 0..bytes.len() / 4 {
        words.push(cursor.read_u32::<LittleEndian>()?);
    }
    Ok(words)
}

fn split_strings(table: &[u8]) -> Vec<String> {
    let table = table.strip_suffix(&[0]).unwrap_or(table);
    if table.is_empty() {
        return Vec::new();
    }
    table
        .split(|&b| b == 0)
        .map(|s| String::from_utf8_lossy(s).into_owned())
        .collect()
}

impl ScriptModule {
    /// Parse the `ScriptData` payload. Scripts are filled in by the caller.
    fn parse_data(data: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(data);
        let hash_type = cursor.read_u32::<LittleEndian>()?;
        let code_size = cursor.read_u32::<LittleEndian>()? as usize;
        let data_size = cursor.read_u32::<LittleEndian>()? as usize;
        let string_table_size = cursor.read_u16::<LittleEndian>()?;
        let reserved = cursor.read_u16::<LittleEndian>()?;

        let pool_end = SCRIPT_DATA_HEADER_SIZE + data_size;
        let pool_bytes = data.get(SCRIPT_DATA_HEADER_SIZE..pool_end).ok_or_else(|| {
            Error::InvalidFormat(format!(
                "script data pool of {data_size} bytes does not fit in {} bytes",
                data.len()
            ))
        })?;
        let pool = read_u32s(pool_bytes)?;

        let code_end = pool_end + code_size;
        if code_end > data.len() {
            tracing::warn!(
                "Script code region claims {code_size} bytes, only {} present",
                data.len() - pool_end
            );
        }
        let code_bytes = &data[pool_end..code_end.min(data.len())];
        let code = code_bytes
            .chunks_exact(2)
            .map(|w| u16::from_le_bytes([w[0], w[1]]))
            .collect();

        let table_start = code_end.min(data.len());
        let table_end = (code_end + usize::from(string_table_size)).min(data.len());
        let string_table = data[table_start..table_end].to_vec();
        let padding = data[table_end..].to_vec();

        Ok(Self {
            hash_type,
            scripts: Vec::new(),
            strings: split_strings(&string_table),
            string_hashes: Vec::new(),
            hash_table: Vec::new(),
            pool,
            code,
            string_table,
            padding,
            string_table_size,
            reserved,
        })
    }

    /// Look up a function by script and function index
    pub fn function(&self, script: usize, function: usize) -> Result<&Function> {
        self.scripts
            .get(script)
            .and_then(|s| s.functions.get(function))
            .ok_or(Error::FunctionNotFound { script, function })
    }

    fn function_mut(&mut self, script: usize, function: usize) -> Result<&mut Function> {
        self.scripts
            .get_mut(script)
            .and_then(|s| s.functions.get_mut(function))
            .ok_or(Error::FunctionNotFound { script, function })
    }

    /// Functions that did not decode completely
    #[must_use]
    pub fn incomplete_functions(&self) -> Vec<(usize, usize, &DecodeStatus)> {
        self.scripts
            .iter()
            .enumerate()
            .flat_map(|(si, s)| {
                s.functions
                    .iter()
                    .enumerate()
                    .filter(|(_, f)| !f.status.is_complete())
                    .map(move |(fi, f)| (si, fi, &f.status))
            })
            .collect()
    }

    /// Change a variable by rewriting the pool slots that fed it.
    ///
    /// The new value must have the same shape as the old one, and components
    /// that came from inline literals must keep their value. Other variables
    /// that read the same slots see the change after the next decompile.
    pub fn patch_variable(
        &mut self,
        script: usize,
        function: usize,
        offset: u32,
        value: TypedValue,
    ) -> Result<()> {
        let pool_len = self.pool.len();
        let func = self.function_mut(script, function)?;
        let variable = func
            .variables
            .get_mut(&offset)
            .ok_or_else(|| not_patchable(offset, "no variable at this offset"))?;

        if variable.value.kind() != value.kind() {
            return Err(not_patchable(
                offset,
                &format!("cannot store {} in a {} variable", value.kind(), variable.value.kind()),
            ));
        }
        let (Some(old_words), Some(new_words)) = (variable.value.pool_words(), value.pool_words()) else {
            return Err(not_patchable(offset, "only pool-backed values can be patched"));
        };
        if variable.sources.len() != new_words.len() {
            return Err(not_patchable(offset, "component count does not match its sources"));
        }

        let mut writes = Vec::new();
        for (i, (source, (old, new))) in variable
            .sources
            .iter()
            .zip(old_words.iter().zip(&new_words))
            .enumerate()
        {
            match source {
                Some(slot) if (*slot as usize) < pool_len => writes.push((*slot as usize, *new)),
                _ if old == new => {}
                _ => {
                    return Err(not_patchable(
                        offset,
                        &format!("component {i} is an inline literal"),
                    ));
                }
            }
        }

        variable.value = value;
        for (slot, word) in writes {
            self.pool[slot] = word;
        }
        Ok(())
    }

    /// Write the data pool back into a `ScriptData` payload, in place
    pub fn write_pool_into(&self, data: &mut [u8]) -> Result<()> {
        let end = SCRIPT_DATA_HEADER_SIZE + self.pool.len() * 4;
        let data_len = data.len();
        let region = data.get_mut(SCRIPT_DATA_HEADER_SIZE..end).ok_or_else(|| {
            Error::InvalidFormat(format!(
                "script data of {data_len} bytes cannot hold a {}-slot pool",
                self.pool.len()
            ))
        })?;
        for (slot, word) in region.chunks_exact_mut(4).zip(&self.pool) {
            slot.copy_from_slice(&word.to_le_bytes());
        }
        Ok(())
    }
}

fn not_patchable(offset: u32, reason: &str) -> Error {
    Error::VariableNotPatchable {
        offset,
        reason: reason.to_string(),
    }
}
