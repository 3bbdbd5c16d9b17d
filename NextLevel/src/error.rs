//! Error types for `NextLevel`

use thiserror::Error;

/// The error type for `NextLevel` operations.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    // ==================== IO Errors ====================
    /// IO error from file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Unexpected end of data while reading a fixed-size structure.
    #[error("unexpected end of data")]
    UnexpectedEof,

    // ==================== Dictionary Errors ====================
    /// The index file does not start with the dictionary signature.
    #[error("invalid dictionary magic: expected 0xA9F32458, found {found:#010X}")]
    BadMagic {
        /// The signature that was read instead.
        found: u32,
    },

    /// A block descriptor points outside the data file.
    #[error("block {block} lies outside the data file ({end} > {data_len})")]
    BlockOutOfRange {
        /// Index of the block in the dictionary.
        block: usize,
        /// End offset of the block's stored bytes.
        end: u64,
        /// Length of the data file.
        data_len: usize,
    },

    /// The dictionary has more blocks than its header can count.
    #[error("too many blocks for a dictionary: {count}")]
    TooManyBlocks {
        /// The number of blocks.
        count: usize,
    },

    // ==================== Block Codec Errors ====================
    /// A block failed to inflate, or inflated to the wrong size.
    #[error("corrupt block {block}: {message}")]
    CorruptBlock {
        /// Index of the block in the dictionary (0 when decoding a bare buffer).
        block: usize,
        /// What went wrong.
        message: String,
    },

    /// Deflating a block failed.
    #[error("compression failed: {0}")]
    CompressionError(String),

    // ==================== Chunk Tree Errors ====================
    /// The chunk table could not be decoded.
    #[error("invalid chunk table at {offset:#X}: {message}")]
    InvalidChunkTable {
        /// Byte offset of the offending header in the table.
        offset: usize,
        /// What went wrong.
        message: String,
    },

    /// A chunk path does not resolve to a node in the forest.
    #[error("chunk not found: {path}")]
    NodeNotFound {
        /// Display form of the path that was looked up.
        path: String,
    },

    /// A payload edit was aimed at a container chunk.
    #[error("chunk {path} has children and carries no payload")]
    NotALeaf {
        /// Display form of the path.
        path: String,
    },

    // ==================== Script Errors ====================
    /// A script module is missing one of its required sibling chunks.
    #[error("script module is missing its {chunk} chunk")]
    MissingRequiredChunk {
        /// Name of the missing chunk type.
        chunk: &'static str,
    },

    /// The instruction stream ended before an END opcode.
    #[error("instruction stream truncated at code offset {offset:#X}")]
    TruncatedInstructionStream {
        /// Byte offset into the code region where decoding stopped.
        offset: usize,
    },

    /// MOV_8 carried a width other than 1, 2 or 4.
    #[error("unsupported move width {width} at code offset {offset:#X}")]
    UnsupportedMoveWidth {
        /// The width operand.
        width: u32,
        /// Byte offset into the code region of the instruction.
        offset: usize,
    },

    /// A script or function index is out of range.
    #[error("function {function} of script {script} not found")]
    FunctionNotFound {
        /// Script index.
        script: usize,
        /// Function index within the script.
        function: usize,
    },

    /// A variable cannot be rewritten in place.
    #[error("variable at {offset:#X} cannot be patched: {reason}")]
    VariableNotPatchable {
        /// Struct offset of the variable.
        offset: u32,
        /// Why the patch was refused.
        reason: String,
    },

    // ==================== Parsing Errors ====================
    /// JSON serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid format error (use specific variants when possible).
    #[error("invalid format: {0}")]
    InvalidFormat(String),
}

/// A specialized Result type for `NextLevel` operations.
pub type Result<T> = std::result::Result<T, Error>;
