//! Command execution implementations

use super::{Commands, convert, data_path_for, decompile, info, patch, tree};

impl Commands {
    /// Execute the selected command.
    ///
    /// # Errors
    /// Returns an error if the underlying command fails.
    pub fn execute(&self) -> anyhow::Result<()> {
        match self {
            Commands::Info { source, data } => info::execute(source, &data_path_for(source, data.as_deref())),
            Commands::Tree {
                source,
                data,
                chunk_type,
            } => tree::execute(
                source,
                &data_path_for(source, data.as_deref()),
                chunk_type.as_deref(),
            ),
            Commands::Decompile {
                source,
                data,
                json,
                output,
            } => decompile::execute(
                source,
                &data_path_for(source, data.as_deref()),
                *json,
                output.as_deref(),
            ),
            Commands::Patch {
                source,
                chunk,
                payload,
                destination,
                data,
            } => patch::execute(
                source,
                &data_path_for(source, data.as_deref()),
                chunk,
                payload,
                destination,
            ),
            Commands::Compress {
                source,
                destination,
                data,
                level,
            } => convert::execute(
                source,
                &data_path_for(source, data.as_deref()),
                destination,
                Some(*level),
            ),
            Commands::Decompress {
                source,
                destination,
                data,
            } => convert::execute(source, &data_path_for(source, data.as_deref()), destination, None),
        }
    }
}
