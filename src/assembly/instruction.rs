//! Decoded instruction model.
//!
//! A decoded method body is an [`InstructionList`]: a contiguous arena of [`Instruction`]s in
//! byte order. Instructions link to their neighbours and to branch targets by arena index, so
//! the list can be freely moved, shared across threads and dropped as a single unit.
//!
//! Operands are a closed sum type. Short-form slot opcodes (`ldarg.0`, `stloc.s`, ...) are
//! normalized while decoding, so consumers only ever see [`Operand::This`],
//! [`Operand::Parameter`] or [`Operand::Local`] regardless of the encoding used.

use std::ops::Index;

use crate::{
    assembly::instructions::{FlowControl, OpCode},
    metadata::{
        member::{FieldRc, MemberRef},
        method::{LocalVariable, MethodRc, ParamDesc},
        typesystem::TypeRc,
    },
};

/// The operand of a decoded instruction
#[derive(Debug, Clone)]
pub enum Operand {
    /// No operand
    None,
    /// Unsigned 8-bit literal (`unaligned.`)
    Byte(u8),
    /// Signed 8-bit literal (`ldc.i4.s`), sign-extended to 32 bits
    SByte(i32),
    /// 32-bit literal
    Int32(i32),
    /// 64-bit literal
    Int64(i64),
    /// 32-bit float literal
    Float32(f32),
    /// 64-bit float literal
    Float64(f64),
    /// User string (`ldstr`)
    String(String),
    /// Resolved field
    Field(FieldRc),
    /// Resolved method
    Method(MethodRc),
    /// Resolved type
    Type(TypeRc),
    /// Standalone signature blob (`calli`), owned copy
    Signature(Vec<u8>),
    /// Local variable slot
    Local {
        /// Slot index
        slot: u16,
        /// Descriptor of the slot
        variable: LocalVariable,
    },
    /// Declared parameter
    Parameter {
        /// Zero based position, not counting `this`
        position: u16,
        /// Descriptor of the parameter
        parameter: ParamDesc,
    },
    /// The implicit `this` argument of an instance method
    This,
    /// Branch target
    Branch {
        /// Encoded offset, relative to the end of the instruction
        raw_offset: i32,
        /// Absolute target offset within the method body
        target_offset: usize,
        /// Index of the target instruction
        target: Option<usize>,
    },
    /// Jump table
    Switch {
        /// Encoded offsets, relative to the end of the instruction
        raw_offsets: Vec<i32>,
        /// Absolute target offsets within the method body
        target_offsets: Vec<usize>,
        /// Indices of the target instructions, in table order
        targets: Vec<Option<usize>>,
    },
    /// An `ldtoken` operand that resolved to neither field, method nor type
    Unresolved(crate::metadata::token::Token),
}

impl Operand {
    /// The referenced member, for field, method and type operands
    pub fn member(&self) -> Option<MemberRef> {
        match self {
            Operand::Field(field) => Some(MemberRef::Field(field.clone())),
            Operand::Method(method) => Some(MemberRef::Method(method.clone())),
            Operand::Type(ty) => Some(MemberRef::Type(ty.clone())),
            _ => None,
        }
    }
}

/// A single decoded instruction
#[derive(Debug, Clone)]
pub struct Instruction {
    /// Position in the arena
    pub index: usize,
    /// Byte offset within the method body
    pub offset: usize,
    /// Opcode descriptor
    pub opcode: &'static OpCode,
    /// Total size in bytes, opcode and operand
    pub size: usize,
    /// Index of the preceding instruction
    pub previous: Option<usize>,
    /// Index of the following instruction
    pub next: Option<usize>,
    /// Decoded operand
    pub operand: Operand,
}

impl Instruction {
    /// Assembler mnemonic of the opcode
    pub fn mnemonic(&self) -> &'static str {
        self.opcode.mnemonic
    }

    /// Control flow classification of the opcode
    pub fn flow(&self) -> FlowControl {
        self.opcode.flow
    }

    /// Offset of the first byte after this instruction
    pub fn end_offset(&self) -> usize {
        self.offset + self.size
    }

    /// Returns true for conditional and unconditional branches, `leave` and `switch`
    pub fn is_branch(&self) -> bool {
        matches!(
            self.opcode.flow,
            FlowControl::Branch | FlowControl::CondBranch
        )
    }

    /// Returns true if execution never falls through to the next instruction
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.opcode.flow,
            FlowControl::Branch | FlowControl::Return | FlowControl::Throw
        )
    }

    /// Indices of all resolved branch targets, in table order for `switch`
    pub fn targets(&self) -> Vec<usize> {
        match &self.operand {
            Operand::Branch { target, .. } => target.iter().copied().collect(),
            Operand::Switch { targets, .. } => targets.iter().flatten().copied().collect(),
            _ => Vec::new(),
        }
    }
}

/// The decoded instructions of one method body, ordered by offset
#[derive(Debug, Clone, Default)]
pub struct InstructionList {
    instructions: Vec<Instruction>,
}

impl InstructionList {
    pub(crate) fn from_vec(instructions: Vec<Instruction>) -> Self {
        InstructionList { instructions }
    }

    /// Number of instructions
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Returns true for an empty method body
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Instruction at arena position `index`
    pub fn get(&self, index: usize) -> Option<&Instruction> {
        self.instructions.get(index)
    }

    /// Iterate in byte order
    pub fn iter(&self) -> std::slice::Iter<'_, Instruction> {
        self.instructions.iter()
    }

    /// The first instruction
    pub fn first(&self) -> Option<&Instruction> {
        self.instructions.first()
    }

    /// The last instruction
    pub fn last(&self) -> Option<&Instruction> {
        self.instructions.last()
    }

    /// The instruction following `instruction`
    pub fn next(&self, instruction: &Instruction) -> Option<&Instruction> {
        instruction.next.and_then(|index| self.get(index))
    }

    /// The instruction preceding `instruction`
    pub fn previous(&self, instruction: &Instruction) -> Option<&Instruction> {
        instruction.previous.and_then(|index| self.get(index))
    }

    /// The instruction starting exactly at `offset`
    pub fn at_offset(&self, offset: usize) -> Option<&Instruction> {
        self.index_of_offset(offset).and_then(|index| self.get(index))
    }

    /// Arena index of the instruction starting exactly at `offset`
    pub fn index_of_offset(&self, offset: usize) -> Option<usize> {
        self.instructions
            .binary_search_by_key(&offset, |instruction| instruction.offset)
            .ok()
    }

    /// The instructions `instruction` may branch to
    pub fn branch_targets(&self, instruction: &Instruction) -> Vec<&Instruction> {
        instruction
            .targets()
            .into_iter()
            .filter_map(|index| self.get(index))
            .collect()
    }

    /// Consume the list, returning the underlying arena
    pub fn into_vec(self) -> Vec<Instruction> {
        self.instructions
    }
}

impl Index<usize> for InstructionList {
    type Output = Instruction;

    fn index(&self, index: usize) -> &Self::Output {
        &self.instructions[index]
    }
}

impl<'a> IntoIterator for &'a InstructionList {
    type Item = &'a Instruction;
    type IntoIter = std::slice::Iter<'a, Instruction>;

    fn into_iter(self) -> Self::IntoIter {
        self.instructions.iter()
    }
}
