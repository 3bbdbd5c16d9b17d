//! Stack VM that decodes one function's instruction window
//!
//! The VM keeps an evaluation stack and a struct pointer. `READ`/`SET`/
//! `STRING_OFFSET` push values, `MOV_8` and `CMD` consume the whole stack and
//! record a variable at the struct pointer.

use glam::{Mat4, Vec3, Vec4};
use indexmap::IndexMap;
use serde::Serialize;

use super::opcode::{OpCode, combine_u24, command};
use super::value::{TypedValue, classify_pool_word};
use crate::error::{Error, Result};
use crate::formats::common::HashNames;

/// Shared inputs of every function in a module
#[derive(Debug, Clone, Copy)]
pub struct Pools<'a> {
    /// Data pool, one raw 32-bit word per slot
    pub pool: &'a [u32],
    /// Code region as instruction words
    pub code: &'a [u16],
    /// Raw string table
    pub strings: &'a [u8],
    pub names: &'a HashNames,
}

/// One decoded instruction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Operation {
    pub opcode: OpCode,
    /// Operand of the instruction word
    pub reg_value: u32,
    /// Extension word, 0 when the opcode has none
    pub reg_value_ex: u32,
    /// Value fetched by READ/STRING instructions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decoded_value: Option<TypedValue>,
    /// Byte offset of the instruction in the code region
    pub code_offset: usize,
}

/// A typed value stored at a struct offset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Variable {
    pub struct_offset: u32,
    pub value: TypedValue,
    /// Pool slot that fed each component; `None` for inline literals
    pub sources: Vec<Option<u32>>,
}

/// One line of decompiled output, in code order
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Statement {
    /// A typed variable store
    Assign { offset: u32, value: TypedValue },
    /// A command that is not decoded, with its raw arguments
    Command {
        offset: u32,
        command: u32,
        args: Vec<TypedValue>,
    },
    /// An instruction with no decoded effect
    Op { opcode: OpCode, operand: u32 },
}

/// How far decoding of a function got
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DecodeStatus {
    /// Reached `END`
    Complete,
    /// The code region ran out before `END`
    Truncated { offset: usize },
    /// Decoding stopped on an error; later instructions are listed but not
    /// interpreted
    Failed { reason: String },
}

impl DecodeStatus {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete)
    }
}

/// Everything decoded from one function
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedFunction {
    pub operations: Vec<Operation>,
    pub variables: IndexMap<u32, Variable>,
    pub statements: Vec<Statement>,
    pub status: DecodeStatus,
}

#[derive(Debug, Clone)]
struct StackValue {
    value: TypedValue,
    source: Option<u32>,
}

struct Vm<'a> {
    pools: Pools<'a>,
    /// Next instruction, in words
    ip: usize,
    stack: Vec<StackValue>,
    pointer: u32,
    operations: Vec<Operation>,
    variables: IndexMap<u32, Variable>,
    statements: Vec<Statement>,
}

/// Decode the function starting at word `code_start_index`
#[must_use]
pub fn decode_function(pools: Pools<'_>, code_start_index: u32) -> DecodedFunction {
    let mut vm = Vm {
        pools,
        ip: code_start_index as usize,
        stack: Vec::new(),
        pointer: 0,
        operations: Vec::new(),
        variables: IndexMap::new(),
        statements: Vec::new(),
    };

    let status = match vm.run() {
        Ok(()) => DecodeStatus::Complete,
        Err(Error::TruncatedInstructionStream { offset }) => {
            tracing::warn!("Function at word {code_start_index:#X} truncated at code offset {offset:#X}");
            DecodeStatus::Truncated { offset }
        }
        Err(e) => {
            tracing::warn!("Function at word {code_start_index:#X} failed: {e}");
            vm.list_remaining();
            DecodeStatus::Failed {
                reason: e.to_string(),
            }
        }
    };

    DecodedFunction {
        operations: vm.operations,
        variables: vm.variables,
        statements: vm.statements,
        status,
    }
}

impl Vm<'_> {
    fn next_word(&mut self) -> Result<u16> {
        let word = self
            .pools
            .code
            .get(self.ip)
            .copied()
            .ok_or(Error::TruncatedInstructionStream { offset: self.ip * 2 })?;
        self.ip += 1;
        Ok(word)
    }

    /// Read one instruction and its extension word
    fn next_operation(&mut self) -> Result<Operation> {
        let code_offset = self.ip * 2;
        let (opcode, operand) = OpCode::decode(self.next_word()?);
        let reg_value_ex = if opcode.has_extension() {
            u32::from(self.next_word()?)
        } else {
            0
        };
        Ok(Operation {
            opcode,
            reg_value: operand,
            reg_value_ex,
            decoded_value: None,
            code_offset,
        })
    }

    fn run(&mut self) -> Result<()> {
        loop {
            let mut op = self.next_operation()?;
            let operand = op.reg_value;
            let wide = combine_u24(operand, op.reg_value_ex as u16);

            let effect = match op.opcode {
                OpCode::Read => {
                    op.decoded_value = self.fetch(operand);
                    Ok(())
                }
                OpCode::ReadU24 => {
                    op.decoded_value = self.fetch(wide);
                    Ok(())
                }
                OpCode::StringOffset => {
                    op.decoded_value = Some(self.push_string(operand));
                    Ok(())
                }
                OpCode::StringOffsetU24 => {
                    op.decoded_value = Some(self.push_string(wide));
                    Ok(())
                }
                OpCode::Set => {
                    self.push(TypedValue::U32(operand), None);
                    Ok(())
                }
                OpCode::Cmd => {
                    self.command(operand);
                    Ok(())
                }
                OpCode::CmdU24 => {
                    self.command(wide);
                    Ok(())
                }
                OpCode::Ptr => {
                    self.pointer = operand.wrapping_mul(4).wrapping_add(4);
                    Ok(())
                }
                OpCode::ShiftPtr => {
                    self.pointer = self.pointer.wrapping_add(operand);
                    Ok(())
                }
                OpCode::ShiftPtrU24 => {
                    self.pointer = self.pointer.wrapping_add(wide);
                    Ok(())
                }
                OpCode::Mov8 => self.mov8(operand, op.code_offset),
                // Control flow is not modelled; only the extension word is consumed
                OpCode::Jump | OpCode::JumpNoAdjust | OpCode::MovIndirect | OpCode::Noop | OpCode::End => Ok(()),
                OpCode::Run | OpCode::Mov4 | OpCode::SetFuncHash | OpCode::Unknown(_) => {
                    self.statements.push(Statement::Op {
                        opcode: op.opcode,
                        operand,
                    });
                    Ok(())
                }
            };

            let done = op.opcode == OpCode::End;
            self.operations.push(op);
            effect?;
            if done {
                return Ok(());
            }
        }
    }

    /// Record the rest of the function without interpreting it
    fn list_remaining(&mut self) {
        while let Ok(op) = self.next_operation() {
            let done = op.opcode == OpCode::End;
            self.operations.push(op);
            if done {
                break;
            }
        }
    }

    fn push(&mut self, value: TypedValue, source: Option<u32>) {
        self.stack.push(StackValue { value, source });
    }

    /// Fetch a pool slot; out-of-range indices push nothing
    fn fetch(&mut self, index: u32) -> Option<TypedValue> {
        let Some(&bits) = self.pools.pool.get(index as usize) else {
            tracing::debug!(
                "Pool index {index:#X} out of range ({} slots), skipping",
                self.pools.pool.len()
            );
            return None;
        };
        let value = classify_pool_word(bits, self.pools.names);
        self.push(value.clone(), Some(index));
        Some(value)
    }

    fn push_string(&mut self, offset: u32) -> TypedValue {
        let value = TypedValue::String(read_string(self.pools.strings, offset as usize));
        self.push(value.clone(), None);
        value
    }

    fn mov8(&mut self, width: u32, code_offset: usize) -> Result<()> {
        if !matches!(width, 1 | 2 | 4) {
            return Err(Error::UnsupportedMoveWidth {
                width,
                offset: code_offset,
            });
        }
        let Some(top) = self.stack.last() else {
            return Ok(());
        };
        let value = match width {
            4 => top.value.clone(),
            2 => top.value.to_short(),
            _ => top.value.to_byte(),
        };
        let sources = vec![top.source];
        self.stack.clear();
        self.define(value, sources);
        Ok(())
    }

    fn command(&mut self, id: u32) {
        let args = std::mem::take(&mut self.stack);
        let typed = match id {
            command::VEC3 => floats(&args, 3).map(|f| TypedValue::Vec3(Vec3::new(f[0], f[1], f[2]))),
            command::VEC4 => floats(&args, 4).map(|f| TypedValue::Vec4(Vec4::new(f[0], f[1], f[2], f[3]))),
            command::MATRIX4X4 => floats(&args, 16).and_then(|f| {
                let cols: [f32; 16] = f.try_into().ok()?;
                Some(TypedValue::Matrix(Mat4::from_cols_array(&cols)))
            }),
            command::BOOL => args
                .first()
                .and_then(|a| a.value.as_f32())
                .map(|v| TypedValue::Bool(v == 1.0)),
            _ => None,
        };

        match typed {
            Some(value) => {
                let sources = match id {
                    command::BOOL => args.first().map(|a| a.source).into_iter().collect(),
                    _ => args.iter().map(|a| a.source).collect(),
                };
                self.define(value, sources);
            }
            None => {
                let values: Vec<TypedValue> = args.into_iter().map(|a| a.value).collect();
                self.statements.push(Statement::Command {
                    offset: self.pointer,
                    command: id,
                    args: values.clone(),
                });
                self.variables.entry(self.pointer).or_insert(Variable {
                    struct_offset: self.pointer,
                    value: TypedValue::Opaque(values),
                    sources: Vec::new(),
                });
            }
        }
    }

    /// Record a variable; the first one stored at an offset wins
    fn define(&mut self, value: TypedValue, sources: Vec<Option<u32>>) {
        let offset = self.pointer;
        self.statements.push(Statement::Assign {
            offset,
            value: value.clone(),
        });
        self.variables.entry(offset).or_insert(Variable {
            struct_offset: offset,
            value,
            sources,
        });
    }
}

fn floats(args: &[StackValue], count: usize) -> Option<Vec<f32>> {
    if args.len() != count {
        return None;
    }
    args.iter().map(|a| a.value.as_f32()).collect()
}

/// Zero-terminated string at `offset`; empty when out of range
fn read_string(table: &[u8], offset: usize) -> String {
    let Some(rest) = table.get(offset..) else {
        return String::new();
    };
    let end = rest.iter().position(|&b| b == 0).unwrap_or(rest.len());
    String::from_utf8_lossy(&rest[..end]).into_owned()
}
