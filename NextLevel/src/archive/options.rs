//! Options for opening and saving archives

use flate2::Compression;

/// Options used when opening an archive.
///
/// # Example
///
/// ```
/// use nextlevel::archive::ReadOptions;
///
/// let options = ReadOptions::new().with_strict_blocks(true);
/// assert!(options.strict_blocks);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ReadOptions {
    /// Fail to open when a block does not inflate, instead of keeping its
    /// stored bytes and recording a block fault
    pub strict_blocks: bool,
}

impl ReadOptions {
    /// Create options with the lenient defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether a corrupt block aborts opening.
    #[must_use]
    pub fn with_strict_blocks(mut self, strict: bool) -> Self {
        self.strict_blocks = strict;
        self
    }
}

/// Options used when saving an archive.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// DEFLATE level for chunk-data blocks of compressed archives
    pub compression_level: Compression,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            compression_level: Compression::default(),
        }
    }
}

impl WriteOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the DEFLATE level (0-9).
    #[must_use]
    pub fn with_compression_level(mut self, level: u32) -> Self {
        self.compression_level = Compression::new(level.min(9));
        self
    }
}
