//! CLI command for script decompilation

use std::fmt::Write as _;
use std::path::Path;

use anyhow::Context;
use serde_json::json;

use crate::archive::Archive;
use crate::cli::progress::{DISK, GEAR, LOOKING_GLASS, print_done, print_step};
use crate::formats::common::HashNames;

pub fn execute(source: &Path, data: &Path, json: bool, output: Option<&Path>) -> anyhow::Result<()> {
    let start = std::time::Instant::now();
    let steps = if output.is_some() { 3 } else { 2 };

    print_step(1, steps, LOOKING_GLASS, "Reading archive...");
    let archive = Archive::read(source, data)?;

    print_step(2, steps, GEAR, "Decompiling scripts...");
    let names = HashNames::global();
    let modules = archive.script_modules_with(names);
    let failed = modules.iter().filter(|(_, m)| m.is_err()).count();

    let text = if json {
        let mut entries = Vec::with_capacity(modules.len());
        for (path, module) in &modules {
            entries.push(match module {
                Ok(module) => json!({ "path": path.to_string(), "module": serde_json::to_value(module)? }),
                Err(e) => json!({ "path": path.to_string(), "error": e.to_string() }),
            });
        }
        serde_json::to_string_pretty(&entries)?
    } else {
        let mut text = String::new();
        for (path, module) in &modules {
            let _ = writeln!(text, "// chunk {path}");
            match module {
                Ok(module) => text.push_str(&module.to_code(names)),
                Err(e) => {
                    let _ = writeln!(text, "// failed to decompile: {e}");
                }
            }
            text.push('\n');
        }
        text
    };

    match output {
        Some(path) => {
            print_step(3, steps, DISK, &format!("Writing {}...", path.display()));
            std::fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))?;
        }
        None => print!("{text}"),
    }

    if failed > 0 {
        tracing::warn!("{failed} of {} script modules failed to decompile", modules.len());
    }
    print_done(start.elapsed());
    Ok(())
}
