//! Pseudo-code listing of a decompiled module

use std::fmt::Write;

use super::decompiler::{DecodeStatus, Statement};
use super::module::{Function, ScriptModule};
use super::value::TypedValue;
use crate::formats::common::HashNames;

/// Hash table entries at or below this value are counters, not hashes
const MIN_LISTED_HASH: u32 = 100;

impl ScriptModule {
    /// Render the module as pseudo-code
    #[must_use]
    pub fn to_code(&self, names: &HashNames) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Script Type {}", names.name_or_fallback(self.hash_type));

        let hashes: Vec<String> = self
            .hash_table
            .iter()
            .filter(|&&h| h > MIN_LISTED_HASH)
            .map(|&h| names.name_or_fallback(h))
            .collect();
        let _ = writeln!(out, "Hash Table: [ {} ]", hashes.join(", "));

        let strings: Vec<String> = self.strings.iter().map(|s| format!("{s:?}")).collect();
        let _ = writeln!(out, "String Table: [{}]", strings.join(", "));

        out.push_str("String Hashes: [\n");
        for entry in &self.string_hashes {
            let _ = writeln!(out, "    {} {}", entry.offset, names.name_or_fallback(entry.hash));
        }
        out.push_str("]\n");

        for script in &self.scripts {
            let _ = writeln!(out, "\nScript Hash {}", script.name);
            let _ = writeln!(out, "Script String Hash BufferSize: {}", script.string_buffer_size);
            for function in &script.functions {
                out.push('\n');
                render_function(&mut out, function, names);
            }
        }
        out
    }
}

fn render_function(out: &mut String, function: &Function, names: &HashNames) {
    let _ = writeln!(out, "{}_{:X}() {{", function.name, function.flags);
    for statement in &function.statements {
        out.push_str("    ");
        match statement {
            Statement::Assign { offset, value } => render_assign(out, *offset, value, names),
            Statement::Command { command, args, .. } => {
                let args: Vec<String> = args.iter().map(|a| render_value(a, names)).collect();
                let _ = write!(out, "CMD {command} ({})", args.join(", "));
            }
            Statement::Op { opcode, operand } => {
                let _ = write!(out, "OpCode {opcode} Reg {operand}");
            }
        }
        out.push('\n');
    }
    match &function.status {
        DecodeStatus::Complete => {}
        DecodeStatus::Truncated { offset } => {
            let _ = writeln!(out, "    // truncated at code offset {offset:#X}");
        }
        DecodeStatus::Failed { reason } => {
            let _ = writeln!(out, "    // decoding stopped: {reason}");
        }
    }
    out.push_str("}\n");
}

fn render_assign(out: &mut String, offset: u32, value: &TypedValue, names: &HashNames) {
    let var = format!("var{offset:X}");
    let _ = match value {
        TypedValue::U32(v) => match names.get(*v) {
            Some(name) => write!(out, "hash {var} = {name}"),
            None => write!(out, "uint {var} = {v:#X}"),
        },
        TypedValue::Opaque(_) => write!(out, "{var} = {}", render_value(value, names)),
        other => write!(out, "{} {var} = {}", other.kind(), render_value(other, names)),
    };
}

fn render_value(value: &TypedValue, names: &HashNames) -> String {
    match value {
        TypedValue::Float(f) => format!("{f:?}"),
        TypedValue::U32(v) => names.get(*v).map_or_else(|| format!("{v:#X}"), str::to_string),
        TypedValue::Short(v) => v.to_string(),
        TypedValue::Byte(v) => v.to_string(),
        TypedValue::Bool(b) => b.to_string(),
        TypedValue::Vec3(v) => format!("Vec3({:?}, {:?}, {:?})", v.x, v.y, v.z),
        TypedValue::Vec4(v) => format!("Vec4({:?}, {:?}, {:?}, {:?})", v.x, v.y, v.z, v.w),
        TypedValue::Matrix(m) => {
            let cells: Vec<String> = m.to_cols_array().iter().map(|f| format!("{f:?}")).collect();
            format!("[{}]", cells.join(", "))
        }
        TypedValue::String(s) => format!("{s:?}"),
        TypedValue::Opaque(items) => {
            let items: Vec<String> = items.iter().map(|a| render_value(a, names)).collect();
            format!("[{}]", items.join(", "))
        }
    }
}
