//! Hash-name lookup
//!
//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT
//!
//! Scripts and functions are identified by 32-bit hashes. Names are only
//! used for display, so a missing entry is never an error.

use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

use crate::error::Result;

static GLOBAL: OnceLock<HashNames> = OnceLock::new();

/// A hash -> name table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HashNames {
    names: HashMap<u32, String>,
}

impl HashNames {
    /// Create an empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a `hash:name` text file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let table = Self::parse(&text);
        tracing::info!(
            "Loaded {} hash names from {}",
            table.len(),
            path.as_ref().display()
        );
        Ok(table)
    }

    /// Parse `hash:name` lines.
    ///
    /// The hash may be `0x`-prefixed hex, bare 8-digit hex or decimal. Blank
    /// lines, lines without a `:` and unparseable hashes are skipped. Later
    /// entries overwrite earlier ones.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut table = Self::new();
        for line in text.lines() {
            let Some((hash_part, name_part)) = line.split_once(':') else {
                continue;
            };
            if let Some(hash) = parse_hash(hash_part.trim()) {
                table.insert(hash, name_part.trim());
            }
        }
        table
    }

    /// Add or replace a name
    pub fn insert(&mut self, hash: u32, name: impl Into<String>) {
        self.names.insert(hash, name.into());
    }

    /// Look up a name
    #[must_use]
    pub fn get(&self, hash: u32) -> Option<&str> {
        self.names.get(&hash).map(String::as_str)
    }

    /// Whether the hash is known
    #[must_use]
    pub fn contains(&self, hash: u32) -> bool {
        self.names.contains_key(&hash)
    }

    /// The name, or `Func_XXXXXXXX` when the hash is unknown
    #[must_use]
    pub fn name_or_fallback(&self, hash: u32) -> String {
        self.get(hash)
            .map_or_else(|| format!("Func_{hash:08X}"), str::to_string)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Install the process-wide table.
    ///
    /// Only the first call has an effect; returns `false` if a table was
    /// already installed.
    pub fn install_global(self) -> bool {
        GLOBAL.set(self).is_ok()
    }

    /// The process-wide table, empty if none was installed
    pub fn global() -> &'static HashNames {
        GLOBAL.get_or_init(HashNames::new)
    }
}

fn parse_hash(text: &str) -> Option<u32> {
    if let Some(hex) = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
    {
        return u32::from_str_radix(hex, 16).ok();
    }
    if text.len() == 8 && text.bytes().all(|b| b.is_ascii_hexdigit()) {
        return u32::from_str_radix(text, 16).ok();
    }
    text.parse().ok()
}
