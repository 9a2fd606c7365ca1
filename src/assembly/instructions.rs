//! Static CIL opcode tables.
//!
//! Two tables describe the whole instruction set: [`INSTRUCTIONS`] for single byte opcodes
//! and [`INSTRUCTIONS_FE`] for the extended family that follows the `0xFE` prefix. Slots that
//! ECMA-335 leaves unassigned carry an empty mnemonic and are reported as unknown by the
//! lookup functions.
//!
//! Every opcode also has a signed 16-bit combined code: a single byte `b` maps to `b`, an
//! extended `0xFE b` maps to `-(b + 1)`. [`lookup_code`] resolves that code through a lazily
//! built map.
//!
//! # Examples
//!
//! ```rust
//! use cilreader::assembly::{lookup_extended, lookup_single_byte, OperandKind};
//!
//! let call = lookup_single_byte(0x28).unwrap();
//! assert_eq!(call.mnemonic, "call");
//! assert_eq!(call.operand, OperandKind::InlineMethod);
//!
//! let ceq = lookup_extended(0x01).unwrap();
//! assert_eq!(ceq.mnemonic, "ceq");
//! assert_eq!(ceq.size(), 2);
//! assert!(lookup_extended(0x1F).is_none());
//! ```

use std::{collections::HashMap, sync::OnceLock};

use strum::{Display, EnumIter};

use crate::{Error, Result};

/// How the bytes following an opcode are encoded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum OperandKind {
    /// No operand
    None,
    /// 8-bit signed integer
    ShortInlineI,
    /// 8-bit argument or local slot
    ShortInlineVar,
    /// 8-bit signed branch offset
    ShortInlineBrTarget,
    /// 32-bit float
    ShortInlineR,
    /// 16-bit argument or local slot
    InlineVar,
    /// 32-bit signed integer
    InlineI,
    /// 64-bit signed integer
    InlineI8,
    /// 64-bit float
    InlineR,
    /// 32-bit signed branch offset
    InlineBrTarget,
    /// Field token
    InlineField,
    /// Method token
    InlineMethod,
    /// Type token
    InlineType,
    /// Field, method or type token (`ldtoken`)
    InlineTok,
    /// User string token
    InlineString,
    /// Standalone signature token
    InlineSig,
    /// 32-bit count followed by that many 32-bit branch offsets
    InlineSwitch,
    /// Reserved, never emitted by compilers
    InlinePhi,
}

impl OperandKind {
    /// Size of the fixed part of the operand in bytes.
    ///
    /// For [`OperandKind::InlineSwitch`] this only covers the leading count field.
    ///
    /// # Errors
    /// Returns [`Error::UnknownOperandKind`] for [`OperandKind::InlinePhi`].
    pub fn size(self) -> Result<usize> {
        match self {
            OperandKind::None => Ok(0),
            OperandKind::ShortInlineI
            | OperandKind::ShortInlineVar
            | OperandKind::ShortInlineBrTarget => Ok(1),
            OperandKind::InlineVar => Ok(2),
            OperandKind::InlineI
            | OperandKind::InlineBrTarget
            | OperandKind::InlineField
            | OperandKind::InlineMethod
            | OperandKind::InlineType
            | OperandKind::InlineTok
            | OperandKind::InlineString
            | OperandKind::InlineSig
            | OperandKind::ShortInlineR
            | OperandKind::InlineSwitch => Ok(4),
            OperandKind::InlineI8 | OperandKind::InlineR => Ok(8),
            OperandKind::InlinePhi => Err(Error::UnknownOperandKind(self)),
        }
    }

    /// Returns true for operands that name a member the matcher can compare against
    pub fn is_member_token(self) -> bool {
        matches!(
            self,
            OperandKind::InlineField
                | OperandKind::InlineMethod
                | OperandKind::InlineType
                | OperandKind::InlineTok
        )
    }
}

/// How an instruction affects control flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum FlowControl {
    /// Execution continues with the next instruction
    Next,
    /// Unconditional branch
    Branch,
    /// Conditional branch, including `switch`
    CondBranch,
    /// Method call
    Call,
    /// Return from the method or from a handler clause
    Return,
    /// Exception throw
    Throw,
    /// Prefix that modifies the following instruction
    Meta,
    /// Debugger breakpoint
    Break,
}

/// Immutable description of one opcode
#[derive(Debug, PartialEq, Eq)]
pub struct OpCode {
    /// Combined signed code, see the module documentation
    pub code: i16,
    /// Assembler mnemonic, empty for reserved slots
    pub mnemonic: &'static str,
    /// Operand encoding
    pub operand: OperandKind,
    /// Control flow classification
    pub flow: FlowControl,
    /// Short human readable description
    pub description: &'static str,
}

impl OpCode {
    const fn single(
        byte: u8,
        mnemonic: &'static str,
        operand: OperandKind,
        flow: FlowControl,
        description: &'static str,
    ) -> Self {
        OpCode {
            code: byte as i16,
            mnemonic,
            operand,
            flow,
            description,
        }
    }

    const fn extended(
        second: u8,
        mnemonic: &'static str,
        operand: OperandKind,
        flow: FlowControl,
        description: &'static str,
    ) -> Self {
        OpCode {
            code: -(second as i16) - 1,
            mnemonic,
            operand,
            flow,
            description,
        }
    }

    const fn reserved(byte: u8) -> Self {
        Self::single(byte, "", OperandKind::None, FlowControl::Next, "")
    }

    const fn reserved_extended(second: u8) -> Self {
        Self::extended(second, "", OperandKind::None, FlowControl::Next, "")
    }

    /// Size of the opcode itself: 1, or 2 for the `0xFE` family
    pub const fn size(&self) -> usize {
        if self.code < 0 {
            2
        } else {
            1
        }
    }

    /// Returns true for opcodes of the `0xFE` family
    pub const fn is_extended(&self) -> bool {
        self.code < 0
    }

    /// Returns true for unassigned table slots
    pub const fn is_reserved(&self) -> bool {
        self.mnemonic.is_empty()
    }

    /// The raw opcode value: the single byte, or `0xFE00 | second` for the extended family
    pub fn raw(&self) -> u16 {
        if self.code < 0 {
            0xFE00 | (-(self.code + 1)) as u16
        } else {
            self.code as u16
        }
    }
}

/// The single byte opcode table, indexed by the opcode byte
#[rustfmt::skip]
pub static INSTRUCTIONS: [OpCode; 256] = [
    OpCode::single(0x00, "nop", OperandKind::None, FlowControl::Next, "Do nothing"),
    OpCode::single(0x01, "break", OperandKind::None, FlowControl::Break, "Signal a breakpoint to an attached debugger"),
    OpCode::single(0x02, "ldarg.0", OperandKind::None, FlowControl::Next, "Load argument 0 onto the stack"),
    OpCode::single(0x03, "ldarg.1", OperandKind::None, FlowControl::Next, "Load argument 1 onto the stack"),
    OpCode::single(0x04, "ldarg.2", OperandKind::None, FlowControl::Next, "Load argument 2 onto the stack"),
    OpCode::single(0x05, "ldarg.3", OperandKind::None, FlowControl::Next, "Load argument 3 onto the stack"),
    OpCode::single(0x06, "ldloc.0", OperandKind::None, FlowControl::Next, "Load local variable 0 onto the stack"),
    OpCode::single(0x07, "ldloc.1", OperandKind::None, FlowControl::Next, "Load local variable 1 onto the stack"),
    OpCode::single(0x08, "ldloc.2", OperandKind::None, FlowControl::Next, "Load local variable 2 onto the stack"),
    OpCode::single(0x09, "ldloc.3", OperandKind::None, FlowControl::Next, "Load local variable 3 onto the stack"),
    OpCode::single(0x0A, "stloc.0", OperandKind::None, FlowControl::Next, "Pop a value into local variable 0"),
    OpCode::single(0x0B, "stloc.1", OperandKind::None, FlowControl::Next, "Pop a value into local variable 1"),
    OpCode::single(0x0C, "stloc.2", OperandKind::None, FlowControl::Next, "Pop a value into local variable 2"),
    OpCode::single(0x0D, "stloc.3", OperandKind::None, FlowControl::Next, "Pop a value into local variable 3"),
    OpCode::single(0x0E, "ldarg.s", OperandKind::ShortInlineVar, FlowControl::Next, "Load argument, short form"),
    OpCode::single(0x0F, "ldarga.s", OperandKind::ShortInlineVar, FlowControl::Next, "Load argument address, short form"),
    OpCode::single(0x10, "starg.s", OperandKind::ShortInlineVar, FlowControl::Next, "Store into argument, short form"),
    OpCode::single(0x11, "ldloc.s", OperandKind::ShortInlineVar, FlowControl::Next, "Load local variable, short form"),
    OpCode::single(0x12, "ldloca.s", OperandKind::ShortInlineVar, FlowControl::Next, "Load local variable address, short form"),
    OpCode::single(0x13, "stloc.s", OperandKind::ShortInlineVar, FlowControl::Next, "Pop a value into a local variable, short form"),
    OpCode::single(0x14, "ldnull", OperandKind::None, FlowControl::Next, "Push a null reference"),
    OpCode::single(0x15, "ldc.i4.m1", OperandKind::None, FlowControl::Next, "Push -1 as int32"),
    OpCode::single(0x16, "ldc.i4.0", OperandKind::None, FlowControl::Next, "Push 0 as int32"),
    OpCode::single(0x17, "ldc.i4.1", OperandKind::None, FlowControl::Next, "Push 1 as int32"),
    OpCode::single(0x18, "ldc.i4.2", OperandKind::None, FlowControl::Next, "Push 2 as int32"),
    OpCode::single(0x19, "ldc.i4.3", OperandKind::None, FlowControl::Next, "Push 3 as int32"),
    OpCode::single(0x1A, "ldc.i4.4", OperandKind::None, FlowControl::Next, "Push 4 as int32"),
    OpCode::single(0x1B, "ldc.i4.5", OperandKind::None, FlowControl::Next, "Push 5 as int32"),
    OpCode::single(0x1C, "ldc.i4.6", OperandKind::None, FlowControl::Next, "Push 6 as int32"),
    OpCode::single(0x1D, "ldc.i4.7", OperandKind::None, FlowControl::Next, "Push 7 as int32"),
    OpCode::single(0x1E, "ldc.i4.8", OperandKind::None, FlowControl::Next, "Push 8 as int32"),
    OpCode::single(0x1F, "ldc.i4.s", OperandKind::ShortInlineI, FlowControl::Next, "Push an int8 widened to int32"),
    OpCode::single(0x20, "ldc.i4", OperandKind::InlineI, FlowControl::Next, "Push an int32"),
    OpCode::single(0x21, "ldc.i8", OperandKind::InlineI8, FlowControl::Next, "Push an int64"),
    OpCode::single(0x22, "ldc.r4", OperandKind::ShortInlineR, FlowControl::Next, "Push a float32"),
    OpCode::single(0x23, "ldc.r8", OperandKind::InlineR, FlowControl::Next, "Push a float64"),
    OpCode::reserved(0x24),
    OpCode::single(0x25, "dup", OperandKind::None, FlowControl::Next, "Duplicate the top of the stack"),
    OpCode::single(0x26, "pop", OperandKind::None, FlowControl::Next, "Discard the top of the stack"),
    OpCode::single(0x27, "jmp", OperandKind::InlineMethod, FlowControl::Call, "Exit the current method and jump to another"),
    OpCode::single(0x28, "call", OperandKind::InlineMethod, FlowControl::Call, "Call a method"),
    OpCode::single(0x29, "calli", OperandKind::InlineSig, FlowControl::Call, "Call a method through a function pointer"),
    OpCode::single(0x2A, "ret", OperandKind::None, FlowControl::Return, "Return from the current method"),
    OpCode::single(0x2B, "br.s", OperandKind::ShortInlineBrTarget, FlowControl::Branch, "Unconditional branch, short form"),
    OpCode::single(0x2C, "brfalse.s", OperandKind::ShortInlineBrTarget, FlowControl::CondBranch, "Branch if false, null or zero, short form"),
    OpCode::single(0x2D, "brtrue.s", OperandKind::ShortInlineBrTarget, FlowControl::CondBranch, "Branch if true, non-null or non-zero, short form"),
    OpCode::single(0x2E, "beq.s", OperandKind::ShortInlineBrTarget, FlowControl::CondBranch, "Branch if equal, short form"),
    OpCode::single(0x2F, "bge.s", OperandKind::ShortInlineBrTarget, FlowControl::CondBranch, "Branch if greater or equal, short form"),
    OpCode::single(0x30, "bgt.s", OperandKind::ShortInlineBrTarget, FlowControl::CondBranch, "Branch if greater, short form"),
    OpCode::single(0x31, "ble.s", OperandKind::ShortInlineBrTarget, FlowControl::CondBranch, "Branch if less or equal, short form"),
    OpCode::single(0x32, "blt.s", OperandKind::ShortInlineBrTarget, FlowControl::CondBranch, "Branch if less, short form"),
    OpCode::single(0x33, "bne.un.s", OperandKind::ShortInlineBrTarget, FlowControl::CondBranch, "Branch if not equal or unordered, short form"),
    OpCode::single(0x34, "bge.un.s", OperandKind::ShortInlineBrTarget, FlowControl::CondBranch, "Branch if greater or equal (unsigned or unordered), short form"),
    OpCode::single(0x35, "bgt.un.s", OperandKind::ShortInlineBrTarget, FlowControl::CondBranch, "Branch if greater (unsigned or unordered), short form"),
    OpCode::single(0x36, "ble.un.s", OperandKind::ShortInlineBrTarget, FlowControl::CondBranch, "Branch if less or equal (unsigned or unordered), short form"),
    OpCode::single(0x37, "blt.un.s", OperandKind::ShortInlineBrTarget, FlowControl::CondBranch, "Branch if less (unsigned or unordered), short form"),
    OpCode::single(0x38, "br", OperandKind::InlineBrTarget, FlowControl::Branch, "Unconditional branch"),
    OpCode::single(0x39, "brfalse", OperandKind::InlineBrTarget, FlowControl::CondBranch, "Branch if false, null or zero"),
    OpCode::single(0x3A, "brtrue", OperandKind::InlineBrTarget, FlowControl::CondBranch, "Branch if true, non-null or non-zero"),
    OpCode::single(0x3B, "beq", OperandKind::InlineBrTarget, FlowControl::CondBranch, "Branch if equal"),
    OpCode::single(0x3C, "bge", OperandKind::InlineBrTarget, FlowControl::CondBranch, "Branch if greater or equal"),
    OpCode::single(0x3D, "bgt", OperandKind::InlineBrTarget, FlowControl::CondBranch, "Branch if greater"),
    OpCode::single(0x3E, "ble", OperandKind::InlineBrTarget, FlowControl::CondBranch, "Branch if less or equal"),
    OpCode::single(0x3F, "blt", OperandKind::InlineBrTarget, FlowControl::CondBranch, "Branch if less"),
    OpCode::single(0x40, "bne.un", OperandKind::InlineBrTarget, FlowControl::CondBranch, "Branch if not equal or unordered"),
    OpCode::single(0x41, "bge.un", OperandKind::InlineBrTarget, FlowControl::CondBranch, "Branch if greater or equal (unsigned or unordered)"),
    OpCode::single(0x42, "bgt.un", OperandKind::InlineBrTarget, FlowControl::CondBranch, "Branch if greater (unsigned or unordered)"),
    OpCode::single(0x43, "ble.un", OperandKind::InlineBrTarget, FlowControl::CondBranch, "Branch if less or equal (unsigned or unordered)"),
    OpCode::single(0x44, "blt.un", OperandKind::InlineBrTarget, FlowControl::CondBranch, "Branch if less (unsigned or unordered)"),
    OpCode::single(0x45, "switch", OperandKind::InlineSwitch, FlowControl::CondBranch, "Jump to one of several targets"),
    OpCode::single(0x46, "ldind.i1", OperandKind::None, FlowControl::Next, "Load an int8 indirectly"),
    OpCode::single(0x47, "ldind.u1", OperandKind::None, FlowControl::Next, "Load a uint8 indirectly"),
    OpCode::single(0x48, "ldind.i2", OperandKind::None, FlowControl::Next, "Load an int16 indirectly"),
    OpCode::single(0x49, "ldind.u2", OperandKind::None, FlowControl::Next, "Load a uint16 indirectly"),
    OpCode::single(0x4A, "ldind.i4", OperandKind::None, FlowControl::Next, "Load an int32 indirectly"),
    OpCode::single(0x4B, "ldind.u4", OperandKind::None, FlowControl::Next, "Load a uint32 indirectly"),
    OpCode::single(0x4C, "ldind.i8", OperandKind::None, FlowControl::Next, "Load an int64 indirectly"),
    OpCode::single(0x4D, "ldind.i", OperandKind::None, FlowControl::Next, "Load a native int indirectly"),
    OpCode::single(0x4E, "ldind.r4", OperandKind::None, FlowControl::Next, "Load a float32 indirectly"),
    OpCode::single(0x4F, "ldind.r8", OperandKind::None, FlowControl::Next, "Load a float64 indirectly"),
    OpCode::single(0x50, "ldind.ref", OperandKind::None, FlowControl::Next, "Load an object reference indirectly"),
    OpCode::single(0x51, "stind.ref", OperandKind::None, FlowControl::Next, "Store an object reference indirectly"),
    OpCode::single(0x52, "stind.i1", OperandKind::None, FlowControl::Next, "Store an int8 indirectly"),
    OpCode::single(0x53, "stind.i2", OperandKind::None, FlowControl::Next, "Store an int16 indirectly"),
    OpCode::single(0x54, "stind.i4", OperandKind::None, FlowControl::Next, "Store an int32 indirectly"),
    OpCode::single(0x55, "stind.i8", OperandKind::None, FlowControl::Next, "Store an int64 indirectly"),
    OpCode::single(0x56, "stind.r4", OperandKind::None, FlowControl::Next, "Store a float32 indirectly"),
    OpCode::single(0x57, "stind.r8", OperandKind::None, FlowControl::Next, "Store a float64 indirectly"),
    OpCode::single(0x58, "add", OperandKind::None, FlowControl::Next, "Add two values"),
    OpCode::single(0x59, "sub", OperandKind::None, FlowControl::Next, "Subtract two values"),
    OpCode::single(0x5A, "mul", OperandKind::None, FlowControl::Next, "Multiply two values"),
    OpCode::single(0x5B, "div", OperandKind::None, FlowControl::Next, "Divide two values"),
    OpCode::single(0x5C, "div.un", OperandKind::None, FlowControl::Next, "Divide two unsigned values"),
    OpCode::single(0x5D, "rem", OperandKind::None, FlowControl::Next, "Remainder of a division"),
    OpCode::single(0x5E, "rem.un", OperandKind::None, FlowControl::Next, "Remainder of an unsigned division"),
    OpCode::single(0x5F, "and", OperandKind::None, FlowControl::Next, "Bitwise AND"),
    OpCode::single(0x60, "or", OperandKind::None, FlowControl::Next, "Bitwise OR"),
    OpCode::single(0x61, "xor", OperandKind::None, FlowControl::Next, "Bitwise XOR"),
    OpCode::single(0x62, "shl", OperandKind::None, FlowControl::Next, "Shift left"),
    OpCode::single(0x63, "shr", OperandKind::None, FlowControl::Next, "Arithmetic shift right"),
    OpCode::single(0x64, "shr.un", OperandKind::None, FlowControl::Next, "Logical shift right"),
    OpCode::single(0x65, "neg", OperandKind::None, FlowControl::Next, "Negate a value"),
    OpCode::single(0x66, "not", OperandKind::None, FlowControl::Next, "Bitwise complement"),
    OpCode::single(0x67, "conv.i1", OperandKind::None, FlowControl::Next, "Convert to int8"),
    OpCode::single(0x68, "conv.i2", OperandKind::None, FlowControl::Next, "Convert to int16"),
    OpCode::single(0x69, "conv.i4", OperandKind::None, FlowControl::Next, "Convert to int32"),
    OpCode::single(0x6A, "conv.i8", OperandKind::None, FlowControl::Next, "Convert to int64"),
    OpCode::single(0x6B, "conv.r4", OperandKind::None, FlowControl::Next, "Convert to float32"),
    OpCode::single(0x6C, "conv.r8", OperandKind::None, FlowControl::Next, "Convert to float64"),
    OpCode::single(0x6D, "conv.u4", OperandKind::None, FlowControl::Next, "Convert to uint32"),
    OpCode::single(0x6E, "conv.u8", OperandKind::None, FlowControl::Next, "Convert to uint64"),
    OpCode::single(0x6F, "callvirt", OperandKind::InlineMethod, FlowControl::Call, "Call a method through late binding"),
    OpCode::single(0x70, "cpobj", OperandKind::InlineType, FlowControl::Next, "Copy a value type"),
    OpCode::single(0x71, "ldobj", OperandKind::InlineType, FlowControl::Next, "Load a value type from an address"),
    OpCode::single(0x72, "ldstr", OperandKind::InlineString, FlowControl::Next, "Push a string literal"),
    OpCode::single(0x73, "newobj", OperandKind::InlineMethod, FlowControl::Call, "Allocate an object and call its constructor"),
    OpCode::single(0x74, "castclass", OperandKind::InlineType, FlowControl::Next, "Cast an object to a class"),
    OpCode::single(0x75, "isinst", OperandKind::InlineType, FlowControl::Next, "Test whether an object is an instance of a type"),
    OpCode::single(0x76, "conv.r.un", OperandKind::None, FlowControl::Next, "Convert an unsigned integer to floating point"),
    OpCode::reserved(0x77),
    OpCode::reserved(0x78),
    OpCode::single(0x79, "unbox", OperandKind::InlineType, FlowControl::Next, "Extract the address of a boxed value type"),
    OpCode::single(0x7A, "throw", OperandKind::None, FlowControl::Throw, "Throw an exception"),
    OpCode::single(0x7B, "ldfld", OperandKind::InlineField, FlowControl::Next, "Load an instance field"),
    OpCode::single(0x7C, "ldflda", OperandKind::InlineField, FlowControl::Next, "Load the address of an instance field"),
    OpCode::single(0x7D, "stfld", OperandKind::InlineField, FlowControl::Next, "Store into an instance field"),
    OpCode::single(0x7E, "ldsfld", OperandKind::InlineField, FlowControl::Next, "Load a static field"),
    OpCode::single(0x7F, "ldsflda", OperandKind::InlineField, FlowControl::Next, "Load the address of a static field"),
    OpCode::single(0x80, "stsfld", OperandKind::InlineField, FlowControl::Next, "Store into a static field"),
    OpCode::single(0x81, "stobj", OperandKind::InlineType, FlowControl::Next, "Store a value type at an address"),
    OpCode::single(0x82, "conv.ovf.i1.un", OperandKind::None, FlowControl::Next, "Convert unsigned to int8 with overflow check"),
    OpCode::single(0x83, "conv.ovf.i2.un", OperandKind::None, FlowControl::Next, "Convert unsigned to int16 with overflow check"),
    OpCode::single(0x84, "conv.ovf.i4.un", OperandKind::None, FlowControl::Next, "Convert unsigned to int32 with overflow check"),
    OpCode::single(0x85, "conv.ovf.i8.un", OperandKind::None, FlowControl::Next, "Convert unsigned to int64 with overflow check"),
    OpCode::single(0x86, "conv.ovf.u1.un", OperandKind::None, FlowControl::Next, "Convert unsigned to uint8 with overflow check"),
    OpCode::single(0x87, "conv.ovf.u2.un", OperandKind::None, FlowControl::Next, "Convert unsigned to uint16 with overflow check"),
    OpCode::single(0x88, "conv.ovf.u4.un", OperandKind::None, FlowControl::Next, "Convert unsigned to uint32 with overflow check"),
    OpCode::single(0x89, "conv.ovf.u8.un", OperandKind::None, FlowControl::Next, "Convert unsigned to uint64 with overflow check"),
    OpCode::single(0x8A, "conv.ovf.i.un", OperandKind::None, FlowControl::Next, "Convert unsigned to native int with overflow check"),
    OpCode::single(0x8B, "conv.ovf.u.un", OperandKind::None, FlowControl::Next, "Convert unsigned to native uint with overflow check"),
    OpCode::single(0x8C, "box", OperandKind::InlineType, FlowControl::Next, "Box a value type"),
    OpCode::single(0x8D, "newarr", OperandKind::InlineType, FlowControl::Next, "Create a zero-based one-dimensional array"),
    OpCode::single(0x8E, "ldlen", OperandKind::None, FlowControl::Next, "Load the length of an array"),
    OpCode::single(0x8F, "ldelema", OperandKind::InlineType, FlowControl::Next, "Load the address of an array element"),
    OpCode::single(0x90, "ldelem.i1", OperandKind::None, FlowControl::Next, "Load an int8 array element"),
    OpCode::single(0x91, "ldelem.u1", OperandKind::None, FlowControl::Next, "Load a uint8 array element"),
    OpCode::single(0x92, "ldelem.i2", OperandKind::None, FlowControl::Next, "Load an int16 array element"),
    OpCode::single(0x93, "ldelem.u2", OperandKind::None, FlowControl::Next, "Load a uint16 array element"),
    OpCode::single(0x94, "ldelem.i4", OperandKind::None, FlowControl::Next, "Load an int32 array element"),
    OpCode::single(0x95, "ldelem.u4", OperandKind::None, FlowControl::Next, "Load a uint32 array element"),
    OpCode::single(0x96, "ldelem.i8", OperandKind::None, FlowControl::Next, "Load an int64 array element"),
    OpCode::single(0x97, "ldelem.i", OperandKind::None, FlowControl::Next, "Load a native int array element"),
    OpCode::single(0x98, "ldelem.r4", OperandKind::None, FlowControl::Next, "Load a float32 array element"),
    OpCode::single(0x99, "ldelem.r8", OperandKind::None, FlowControl::Next, "Load a float64 array element"),
    OpCode::single(0x9A, "ldelem.ref", OperandKind::None, FlowControl::Next, "Load an object reference array element"),
    OpCode::single(0x9B, "stelem.i", OperandKind::None, FlowControl::Next, "Store a native int array element"),
    OpCode::single(0x9C, "stelem.i1", OperandKind::None, FlowControl::Next, "Store an int8 array element"),
    OpCode::single(0x9D, "stelem.i2", OperandKind::None, FlowControl::Next, "Store an int16 array element"),
    OpCode::single(0x9E, "stelem.i4", OperandKind::None, FlowControl::Next, "Store an int32 array element"),
    OpCode::single(0x9F, "stelem.i8", OperandKind::None, FlowControl::Next, "Store an int64 array element"),
    OpCode::single(0xA0, "stelem.r4", OperandKind::None, FlowControl::Next, "Store a float32 array element"),
    OpCode::single(0xA1, "stelem.r8", OperandKind::None, FlowControl::Next, "Store a float64 array element"),
    OpCode::single(0xA2, "stelem.ref", OperandKind::None, FlowControl::Next, "Store an object reference array element"),
    OpCode::single(0xA3, "ldelem", OperandKind::InlineType, FlowControl::Next, "Load an array element of the given type"),
    OpCode::single(0xA4, "stelem", OperandKind::InlineType, FlowControl::Next, "Store an array element of the given type"),
    OpCode::single(0xA5, "unbox.any", OperandKind::InlineType, FlowControl::Next, "Unbox to the given type"),
    OpCode::reserved(0xA6),
    OpCode::reserved(0xA7),
    OpCode::reserved(0xA8),
    OpCode::reserved(0xA9),
    OpCode::reserved(0xAA),
    OpCode::reserved(0xAB),
    OpCode::reserved(0xAC),
    OpCode::reserved(0xAD),
    OpCode::reserved(0xAE),
    OpCode::reserved(0xAF),
    OpCode::reserved(0xB0),
    OpCode::reserved(0xB1),
    OpCode::reserved(0xB2),
    OpCode::single(0xB3, "conv.ovf.i1", OperandKind::None, FlowControl::Next, "Convert to int8 with overflow check"),
    OpCode::single(0xB4, "conv.ovf.u1", OperandKind::None, FlowControl::Next, "Convert to uint8 with overflow check"),
    OpCode::single(0xB5, "conv.ovf.i2", OperandKind::None, FlowControl::Next, "Convert to int16 with overflow check"),
    OpCode::single(0xB6, "conv.ovf.u2", OperandKind::None, FlowControl::Next, "Convert to uint16 with overflow check"),
    OpCode::single(0xB7, "conv.ovf.i4", OperandKind::None, FlowControl::Next, "Convert to int32 with overflow check"),
    OpCode::single(0xB8, "conv.ovf.u4", OperandKind::None, FlowControl::Next, "Convert to uint32 with overflow check"),
    OpCode::single(0xB9, "conv.ovf.i8", OperandKind::None, FlowControl::Next, "Convert to int64 with overflow check"),
    OpCode::single(0xBA, "conv.ovf.u8", OperandKind::None, FlowControl::Next, "Convert to uint64 with overflow check"),
    OpCode::reserved(0xBB),
    OpCode::reserved(0xBC),
    OpCode::reserved(0xBD),
    OpCode::reserved(0xBE),
    OpCode::reserved(0xBF),
    OpCode::reserved(0xC0),
    OpCode::reserved(0xC1),
    OpCode::single(0xC2, "refanyval", OperandKind::InlineType, FlowControl::Next, "Load the address stored in a typed reference"),
    OpCode::single(0xC3, "ckfinite", OperandKind::None, FlowControl::Next, "Throw if the value is not a finite number"),
    OpCode::reserved(0xC4),
    OpCode::reserved(0xC5),
    OpCode::single(0xC6, "mkrefany", OperandKind::InlineType, FlowControl::Next, "Push a typed reference"),
    OpCode::reserved(0xC7),
    OpCode::reserved(0xC8),
    OpCode::reserved(0xC9),
    OpCode::reserved(0xCA),
    OpCode::reserved(0xCB),
    OpCode::reserved(0xCC),
    OpCode::reserved(0xCD),
    OpCode::reserved(0xCE),
    OpCode::reserved(0xCF),
    OpCode::single(0xD0, "ldtoken", OperandKind::InlineTok, FlowControl::Next, "Load a runtime handle for a metadata token"),
    OpCode::single(0xD1, "conv.u2", OperandKind::None, FlowControl::Next, "Convert to uint16"),
    OpCode::single(0xD2, "conv.u1", OperandKind::None, FlowControl::Next, "Convert to uint8"),
    OpCode::single(0xD3, "conv.i", OperandKind::None, FlowControl::Next, "Convert to native int"),
    OpCode::single(0xD4, "conv.ovf.i", OperandKind::None, FlowControl::Next, "Convert to native int with overflow check"),
    OpCode::single(0xD5, "conv.ovf.u", OperandKind::None, FlowControl::Next, "Convert to native uint with overflow check"),
    OpCode::single(0xD6, "add.ovf", OperandKind::None, FlowControl::Next, "Add with overflow check"),
    OpCode::single(0xD7, "add.ovf.un", OperandKind::None, FlowControl::Next, "Add unsigned with overflow check"),
    OpCode::single(0xD8, "mul.ovf", OperandKind::None, FlowControl::Next, "Multiply with overflow check"),
    OpCode::single(0xD9, "mul.ovf.un", OperandKind::None, FlowControl::Next, "Multiply unsigned with overflow check"),
    OpCode::single(0xDA, "sub.ovf", OperandKind::None, FlowControl::Next, "Subtract with overflow check"),
    OpCode::single(0xDB, "sub.ovf.un", OperandKind::None, FlowControl::Next, "Subtract unsigned with overflow check"),
    OpCode::single(0xDC, "endfinally", OperandKind::None, FlowControl::Return, "End a finally or fault clause"),
    OpCode::single(0xDD, "leave", OperandKind::InlineBrTarget, FlowControl::Branch, "Exit a protected region"),
    OpCode::single(0xDE, "leave.s", OperandKind::ShortInlineBrTarget, FlowControl::Branch, "Exit a protected region, short form"),
    OpCode::single(0xDF, "stind.i", OperandKind::None, FlowControl::Next, "Store a native int indirectly"),
    OpCode::single(0xE0, "conv.u", OperandKind::None, FlowControl::Next, "Convert to native uint"),
    OpCode::reserved(0xE1),
    OpCode::reserved(0xE2),
    OpCode::reserved(0xE3),
    OpCode::reserved(0xE4),
    OpCode::reserved(0xE5),
    OpCode::reserved(0xE6),
    OpCode::reserved(0xE7),
    OpCode::reserved(0xE8),
    OpCode::reserved(0xE9),
    OpCode::reserved(0xEA),
    OpCode::reserved(0xEB),
    OpCode::reserved(0xEC),
    OpCode::reserved(0xED),
    OpCode::reserved(0xEE),
    OpCode::reserved(0xEF),
    OpCode::reserved(0xF0),
    OpCode::reserved(0xF1),
    OpCode::reserved(0xF2),
    OpCode::reserved(0xF3),
    OpCode::reserved(0xF4),
    OpCode::reserved(0xF5),
    OpCode::reserved(0xF6),
    OpCode::reserved(0xF7),
    OpCode::reserved(0xF8),
    OpCode::reserved(0xF9),
    OpCode::reserved(0xFA),
    OpCode::reserved(0xFB),
    OpCode::reserved(0xFC),
    OpCode::reserved(0xFD),
    OpCode::reserved(0xFE),
    OpCode::reserved(0xFF),
];

/// The extended (`0xFE` prefixed) opcode table, indexed by the second byte
#[rustfmt::skip]
pub static INSTRUCTIONS_FE: [OpCode; 31] = [
    OpCode::extended(0x00, "arglist", OperandKind::None, FlowControl::Next, "Return a handle to the argument list"),
    OpCode::extended(0x01, "ceq", OperandKind::None, FlowControl::Next, "Compare for equality"),
    OpCode::extended(0x02, "cgt", OperandKind::None, FlowControl::Next, "Compare greater than"),
    OpCode::extended(0x03, "cgt.un", OperandKind::None, FlowControl::Next, "Compare greater than (unsigned or unordered)"),
    OpCode::extended(0x04, "clt", OperandKind::None, FlowControl::Next, "Compare less than"),
    OpCode::extended(0x05, "clt.un", OperandKind::None, FlowControl::Next, "Compare less than (unsigned or unordered)"),
    OpCode::extended(0x06, "ldftn", OperandKind::InlineMethod, FlowControl::Next, "Push a pointer to a method"),
    OpCode::extended(0x07, "ldvirtftn", OperandKind::InlineMethod, FlowControl::Next, "Push a pointer to a virtual method"),
    OpCode::reserved_extended(0x08),
    OpCode::extended(0x09, "ldarg", OperandKind::InlineVar, FlowControl::Next, "Load argument"),
    OpCode::extended(0x0A, "ldarga", OperandKind::InlineVar, FlowControl::Next, "Load argument address"),
    OpCode::extended(0x0B, "starg", OperandKind::InlineVar, FlowControl::Next, "Store into argument"),
    OpCode::extended(0x0C, "ldloc", OperandKind::InlineVar, FlowControl::Next, "Load local variable"),
    OpCode::extended(0x0D, "ldloca", OperandKind::InlineVar, FlowControl::Next, "Load local variable address"),
    OpCode::extended(0x0E, "stloc", OperandKind::InlineVar, FlowControl::Next, "Pop a value into a local variable"),
    OpCode::extended(0x0F, "localloc", OperandKind::None, FlowControl::Next, "Allocate space on the local memory pool"),
    OpCode::reserved_extended(0x10),
    OpCode::extended(0x11, "endfilter", OperandKind::None, FlowControl::Return, "End an exception filter clause"),
    OpCode::extended(0x12, "unaligned.", OperandKind::ShortInlineI, FlowControl::Meta, "Following access may be unaligned"),
    OpCode::extended(0x13, "volatile.", OperandKind::None, FlowControl::Meta, "Following access is volatile"),
    OpCode::extended(0x14, "tail.", OperandKind::None, FlowControl::Meta, "Following call is a tail call"),
    OpCode::extended(0x15, "initobj", OperandKind::InlineType, FlowControl::Next, "Initialize a value type"),
    OpCode::extended(0x16, "constrained.", OperandKind::InlineType, FlowControl::Meta, "Constrain the following virtual call to a type"),
    OpCode::extended(0x17, "cpblk", OperandKind::None, FlowControl::Next, "Copy a block of memory"),
    OpCode::extended(0x18, "initblk", OperandKind::None, FlowControl::Next, "Initialize a block of memory"),
    OpCode::reserved_extended(0x19),
    OpCode::extended(0x1A, "rethrow", OperandKind::None, FlowControl::Throw, "Rethrow the current exception"),
    OpCode::reserved_extended(0x1B),
    OpCode::extended(0x1C, "sizeof", OperandKind::InlineType, FlowControl::Next, "Push the size of a value type"),
    OpCode::extended(0x1D, "refanytype", OperandKind::None, FlowControl::Next, "Push the type token stored in a typed reference"),
    OpCode::extended(0x1E, "readonly.", OperandKind::None, FlowControl::Meta, "Following array address load is read-only"),
];

static BY_CODE: OnceLock<HashMap<i16, &'static OpCode>> = OnceLock::new();
static BY_MNEMONIC: OnceLock<HashMap<&'static str, &'static OpCode>> = OnceLock::new();

fn defined() -> impl Iterator<Item = &'static OpCode> {
    INSTRUCTIONS
        .iter()
        .chain(INSTRUCTIONS_FE.iter())
        .filter(|op| !op.is_reserved())
}

/// Look up a single byte opcode. `None` for reserved bytes and for the `0xFE` prefix itself.
pub fn lookup_single_byte(byte: u8) -> Option<&'static OpCode> {
    let op = &INSTRUCTIONS[usize::from(byte)];
    (!op.is_reserved()).then_some(op)
}

/// Look up the opcode following a `0xFE` prefix. Valid second bytes are `0x00..=0x1E`,
/// minus the unassigned ones.
pub fn lookup_extended(second: u8) -> Option<&'static OpCode> {
    INSTRUCTIONS_FE
        .get(usize::from(second))
        .filter(|op| !op.is_reserved())
}

/// Look up an opcode by its combined signed code
pub fn lookup_code(code: i16) -> Option<&'static OpCode> {
    BY_CODE
        .get_or_init(|| defined().map(|op| (op.code, op)).collect())
        .get(&code)
        .copied()
}

/// Look up an opcode by mnemonic (e.g. `"ldc.i4.s"`)
pub fn lookup_mnemonic(mnemonic: &str) -> Option<&'static OpCode> {
    BY_MNEMONIC
        .get_or_init(|| defined().map(|op| (op.mnemonic, op)).collect())
        .get(mnemonic)
        .copied()
}
