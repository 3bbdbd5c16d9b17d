//! Re-emission of a decompiled module into chunk payloads

use byteorder::{LittleEndian, WriteBytesExt};

use super::module::ScriptModule;
use super::opcode::OpCode;
use crate::error::{Error, Result};

/// Payloads produced by [`ScriptModule::assemble`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledScript {
    /// New `ScriptData` payload
    pub data: Vec<u8>,
    /// New `ScriptHeader` payload
    pub header: Vec<u8>,
    /// New `ScriptFunctionTable` payload for each script, in order
    pub function_tables: Vec<Vec<u8>>,
}

impl ScriptModule {
    /// Lay every function out back-to-back and rebuild the module payloads.
    ///
    /// Each decoded operation is written again with its extension word. A
    /// function whose listing does not end in `END` gets one appended. The
    /// data pool, the raw string table and any trailing padding are reused
    /// as they are.
    pub fn assemble(&self) -> Result<AssembledScript> {
        let mut code: Vec<u16> = Vec::with_capacity(self.code.len());
        let mut header = Vec::with_capacity(self.scripts.len() * 8);
        let mut function_tables = Vec::with_capacity(self.scripts.len());

        for script in &self.scripts {
            header.write_u32::<LittleEndian>(script.name_hash)?;
            header.write_u32::<LittleEndian>(script.string_buffer_size)?;

            let mut table = Vec::with_capacity(script.functions.len() * 12);
            for function in &script.functions {
                let start = u32::try_from(code.len())
                    .map_err(|_| Error::InvalidFormat("code region too large".to_string()))?;
                table.write_u32::<LittleEndian>(function.name_hash)?;
                table.write_u32::<LittleEndian>(start)?;
                table.write_u32::<LittleEndian>(function.flags)?;

                for op in &function.operations {
                    code.push(op.opcode.encode(op.reg_value));
                    if op.opcode.has_extension() {
                        code.push(op.reg_value_ex as u16);
                    }
                }
                if function.operations.last().map(|op| op.opcode) != Some(OpCode::End) {
                    code.push(OpCode::End.encode(0));
                }
            }
            function_tables.push(table);
        }

        let code_size = u32::try_from(code.len() * 2)
            .map_err(|_| Error::InvalidFormat("code region too large".to_string()))?;
        let data_size = u32::try_from(self.pool.len() * 4)
            .map_err(|_| Error::InvalidFormat("data pool too large".to_string()))?;

        let mut data = Vec::with_capacity(16 + self.pool.len() * 4 + code.len() * 2 + self.string_table.len() + self.padding.len());
        data.write_u32::<LittleEndian>(self.hash_type)?;
        data.write_u32::<LittleEndian>(code_size)?;
        data.write_u32::<LittleEndian>(data_size)?;
        data.write_u16::<LittleEndian>(self.string_table_size)?;
        data.write_u16::<LittleEndian>(self.reserved)?;
        for word in &self.pool {
            data.write_u32::<LittleEndian>(*word)?;
        }
        for word in &code {
            data.write_u16::<LittleEndian>(*word)?;
        }
        data.extend_from_slice(&self.string_table);
        data.extend_from_slice(&self.padding);

        tracing::debug!(
            "Assembled script module {:#010X}: {} code words, {} bytes",
            self.hash_type,
            code.len(),
            data.len()
        );

        Ok(AssembledScript {
            data,
            header,
            function_tables,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::chunk::{CHUNK_SCRIPT_DATA, CHUNK_SCRIPT_FUNCTION_TABLE, CHUNK_SCRIPT_HEADER};
    use crate::formats::common::HashNames;
    use crate::script::decompile_script_with;
    use crate::script::fixtures::{self, script_node};
    use crate::script::value::TypedValue;
    use pretty_assertions::assert_eq;

    fn sample_code() -> Vec<u16> {
        vec![
            OpCode::Ptr.encode(0),
            OpCode::Read.encode(0),
            OpCode::Mov8.encode(4),
            OpCode::Jump.encode(0),
            0x0042,
            OpCode::Run.encode(3),
            OpCode::End.encode(0),
            // second function
            OpCode::StringOffset.encode(0),
            OpCode::Mov8.encode(4),
            OpCode::End.encode(0),
        ]
    }

    #[test]
    fn test_unchanged_module_reproduces_payloads() {
        let node = script_node(&[1.5f32.to_bits()], &sample_code(), b"hi\0", &[&[(1, 0, 2), (2, 7, 0)]]);
        let module = decompile_script_with(&node, &HashNames::new()).unwrap();
        let out = module.assemble().unwrap();

        let payload = |t| node.find_child(t).unwrap().payload().unwrap().to_vec();
        assert_eq!(out.data, payload(CHUNK_SCRIPT_DATA));
        assert_eq!(out.header, payload(CHUNK_SCRIPT_HEADER));
        assert_eq!(out.function_tables, vec![payload(CHUNK_SCRIPT_FUNCTION_TABLE)]);
    }

    #[test]
    fn test_padded_data_is_reproduced() {
        let mut data = fixtures::data_payload(&[1.5f32.to_bits()], &sample_code(), b"hi\0");
        data.extend_from_slice(&[0; 5]);
        let node = fixtures::container(vec![
            (CHUNK_SCRIPT_HEADER, fixtures::header_payload(1)),
            (CHUNK_SCRIPT_FUNCTION_TABLE, fixtures::table_payload(&[(1, 0, 2), (2, 7, 0)])),
            (CHUNK_SCRIPT_DATA, data.clone()),
        ]);

        let module = decompile_script_with(&node, &HashNames::new()).unwrap();
        assert_eq!(module.strings, vec!["hi".to_string()]);
        assert_eq!(module.assemble().unwrap().data, data);
    }

    #[test]
    fn test_truncated_function_gets_end() {
        let code = [OpCode::Set.encode(1), OpCode::Mov8.encode(4)];
        let node = script_node(&[], &code, b"", &[&[(1, 0, 0)]]);
        let module = decompile_script_with(&node, &HashNames::new()).unwrap();
        let out = module.assemble().unwrap();

        let expected = script_node(&[], &[code[0], code[1], OpCode::End.encode(0)], b"", &[&[(1, 0, 0)]]);
        assert_eq!(out.data, expected.find_child(CHUNK_SCRIPT_DATA).unwrap().payload().unwrap());
    }

    #[test]
    fn test_patched_pool_is_emitted() {
        let node = script_node(&[1.5f32.to_bits()], &sample_code(), b"hi\0", &[&[(1, 0, 2), (2, 7, 0)]]);
        let mut module = decompile_script_with(&node, &HashNames::new()).unwrap();
        module.patch_variable(0, 0, 4, TypedValue::Float(8.0)).unwrap();
        let out = module.assemble().unwrap();
        assert_eq!(&out.data[16..20], &8.0f32.to_bits().to_le_bytes());
    }
}
