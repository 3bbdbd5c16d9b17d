//! Instruction set of the script VM
//!
//! Every instruction is a little-endian 16-bit word: the top six bits are the
//! opcode, the rest is the operand. Some opcodes read one extra word.

use std::fmt;

use serde::Serialize;

/// Mask applied to the widened instruction word to get its operand
pub const OPERAND_MASK: u32 = 0xFFFF_03FF;

/// Well-known `CMD` command IDs
pub mod command {
    pub const LIST_ITEM: u32 = 21;
    pub const BOOL: u32 = 57;
    pub const LIST_ADD: u32 = 434;
    pub const MATRIX4X4: u32 = 560;
    pub const VEC4: u32 = 821;
    pub const VEC3: u32 = 824;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpCode {
    Read,
    ReadU24,
    StringOffset,
    StringOffsetU24,
    Set,
    Jump,
    JumpNoAdjust,
    Cmd,
    CmdU24,
    Noop,
    Run,
    End,
    Ptr,
    Mov8,
    Mov4,
    SetFuncHash,
    ShiftPtr,
    ShiftPtrU24,
    MovIndirect,
    Unknown(u8),
}

impl OpCode {
    #[must_use]
    pub fn from_u8(code: u8) -> Self {
        match code {
            0x00 => Self::Read,
            0x01 => Self::ReadU24,
            0x02 => Self::StringOffset,
            0x03 => Self::StringOffsetU24,
            0x04 => Self::Set,
            0x05 => Self::Jump,
            0x06 => Self::JumpNoAdjust,
            0x07 => Self::Cmd,
            0x08 => Self::CmdU24,
            0x0A => Self::Noop,
            0x0B => Self::Run,
            0x0C => Self::End,
            0x0E => Self::Ptr,
            0x10 => Self::Mov8,
            0x11 => Self::Mov4,
            0x14 => Self::SetFuncHash,
            0x15 => Self::ShiftPtr,
            0x16 => Self::ShiftPtrU24,
            0x1D => Self::MovIndirect,
            other => Self::Unknown(other),
        }
    }

    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            Self::Read => 0x00,
            Self::ReadU24 => 0x01,
            Self::StringOffset => 0x02,
            Self::StringOffsetU24 => 0x03,
            Self::Set => 0x04,
            Self::Jump => 0x05,
            Self::JumpNoAdjust => 0x06,
            Self::Cmd => 0x07,
            Self::CmdU24 => 0x08,
            Self::Noop => 0x0A,
            Self::Run => 0x0B,
            Self::End => 0x0C,
            Self::Ptr => 0x0E,
            Self::Mov8 => 0x10,
            Self::Mov4 => 0x11,
            Self::SetFuncHash => 0x14,
            Self::ShiftPtr => 0x15,
            Self::ShiftPtrU24 => 0x16,
            Self::MovIndirect => 0x1D,
            Self::Unknown(code) => code,
        }
    }

    /// Whether the instruction is followed by an extension word
    #[must_use]
    pub fn has_extension(self) -> bool {
        matches!(
            self,
            Self::ReadU24
                | Self::StringOffsetU24
                | Self::Jump
                | Self::JumpNoAdjust
                | Self::CmdU24
                | Self::ShiftPtrU24
                | Self::MovIndirect
        )
    }

    #[must_use]
    pub fn name(self) -> String {
        let name = match self {
            Self::Read => "READ",
            Self::ReadU24 => "READ_U24",
            Self::StringOffset => "STRING_OFFSET",
            Self::StringOffsetU24 => "STRING_OFFSETU24",
            Self::Set => "SET",
            Self::Jump => "JUMP",
            Self::JumpNoAdjust => "JUMP_NO_ADJUST",
            Self::Cmd => "CMD",
            Self::CmdU24 => "CMD_U24",
            Self::Noop => "NOOP",
            Self::Run => "RUN",
            Self::End => "END",
            Self::Ptr => "PTR",
            Self::Mov8 => "MOV_8",
            Self::Mov4 => "MOV_4",
            Self::SetFuncHash => "SET_FUNC_HASH",
            Self::ShiftPtr => "SHIFT_PTR",
            Self::ShiftPtrU24 => "SHIFT_PTR_U24",
            Self::MovIndirect => "MOV_INDIRECT",
            Self::Unknown(code) => return format!("OP_{code:02X}"),
        };
        name.to_string()
    }

    /// Split an instruction word into opcode and operand
    #[must_use]
    pub fn decode(word: u16) -> (Self, u32) {
        let opcode = Self::from_u8((word >> 10) as u8);
        let operand = u32::from(word) & OPERAND_MASK;
        (opcode, operand)
    }

    /// Build an instruction word
    #[must_use]
    pub fn encode(self, operand: u32) -> u16 {
        ((operand & 0x3FF) as u16) | (u16::from(self.code()) << 10)
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl Serialize for OpCode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.name())
    }
}

/// Combine an operand and its extension word into a 24-bit value.
///
/// The operand is the high part.
#[must_use]
pub fn combine_u24(operand: u32, extension: u16) -> u32 {
    u32::from(extension) + operand * 0x10000
}
