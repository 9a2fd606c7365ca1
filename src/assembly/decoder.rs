//! CIL method body decoding.
//!
//! This module turns the raw instruction stream of one method body into an
//! [`InstructionList`] whose operands are fully typed and whose branch and switch targets
//! point at concrete instructions.
//!
//! # Architecture
//!
//! Decoding is a two pass process driven by a [`MethodBodyParser`]:
//!
//! 1. Instructions are decoded front to back into a growable arena. Each instruction is
//!    linked to its predecessor as it is appended. Backward branches are resolved on the
//!    spot by a binary search over the instructions decoded so far. Forward branches and all
//!    `switch` tables are recorded in a pending list.
//! 2. Once the stream is exhausted, every pending target offset is looked up in the
//!    finished arena. A target that does not start an instruction is an
//!    [`crate::Error::UnresolvedBranchTarget`].
//!
//! Branch targets are relative to the first byte after the instruction. For `switch` that
//! is the byte after the whole jump table.
//!
//! # Key Components
//!
//! - [`decode_method_body`] - Decode one body
//! - [`decode_method_bodies`] - Decode many independent bodies in parallel
//! - [`MethodBodyParser`] - The stateful decoder behind both
//!
//! # Usage Examples
//!
//! ```rust
//! use cilreader::{assembly::decode_method_body, metadata::MemoryResolver, MethodBodyContext};
//!
//! // nop; br.s -3; ret
//! let code = [0x00, 0x2B, 0xFD, 0x2A];
//! let resolver = MemoryResolver::new();
//! let ctx = MethodBodyContext::new(&code, &resolver);
//!
//! let instructions = decode_method_body(&ctx)?;
//! assert_eq!(instructions.len(), 3);
//! assert_eq!(instructions[1].targets(), vec![0]);
//! # Ok::<(), cilreader::Error>(())
//! ```

use rayon::prelude::*;

use crate::{
    assembly::{
        instruction::{Instruction, InstructionList, Operand},
        instructions::{lookup_extended, lookup_single_byte, OpCode, OperandKind},
        opcodes,
    },
    metadata::{member::MemberRef, method::MethodBodyContext, token::Token},
    stream::{io::CilIO, parser::Parser},
    Error, Result,
};

/// Read a fixed size operand of the instruction at `offset`.
///
/// Running out of bytes is reported as [`Error::TruncatedOperand`] for that instruction.
pub(crate) fn read_operand<T: CilIO>(parser: &mut Parser, offset: usize) -> Result<T> {
    let needed = std::mem::size_of::<T>();
    let available = parser.remaining();

    parser
        .read_le::<T>()
        .map_err(|_| Error::TruncatedOperand {
            offset,
            needed,
            available,
        })
}

/// Skip `needed` operand bytes of the instruction at `offset`
pub(crate) fn skip_operand(parser: &mut Parser, offset: usize, needed: usize) -> Result<()> {
    let available = parser.remaining();
    if needed > available {
        return Err(Error::TruncatedOperand {
            offset,
            needed,
            available,
        });
    }

    parser.advance_by(needed)
}

/// Read the opcode of the instruction at `offset`, following the `0xFE` prefix.
///
/// Returns the descriptor and the byte that selected it (the second byte for the extended
/// family).
pub(crate) fn read_opcode(parser: &mut Parser, offset: usize) -> Result<(&'static OpCode, u8)> {
    let first = read_operand::<u8>(parser, offset)?;
    if first == opcodes::FE_PREFIX {
        let second = read_operand::<u8>(parser, offset)?;
        let opcode = lookup_extended(second).ok_or(Error::UnknownOpcode {
            offset,
            opcode: 0xFE00 | u16::from(second),
        })?;
        return Ok((opcode, second));
    }

    let opcode = lookup_single_byte(first).ok_or(Error::UnknownOpcode {
        offset,
        opcode: u16::from(first),
    })?;
    Ok((opcode, first))
}

/// Read a `switch` count and check that the table fits in the remaining buffer
pub(crate) fn read_switch_count(parser: &mut Parser, offset: usize) -> Result<usize> {
    let count = read_operand::<u32>(parser, offset)? as usize;
    let needed = count.saturating_mul(4);
    let available = parser.remaining();
    if needed > available {
        return Err(Error::TruncatedOperand {
            offset,
            needed,
            available,
        });
    }

    Ok(count)
}

/// Stateful decoder for a single method body.
///
/// A parser is consumed by [`MethodBodyParser::parse`]; all scratch state (the arena and the
/// pending list) lives inside it, so independent bodies can be decoded on different threads.
pub struct MethodBodyParser<'a> {
    /// Caller supplied context of the body
    ctx: &'a MethodBodyContext<'a>,
    /// Cursor over the instruction bytes
    parser: Parser<'a>,
    /// Instructions decoded so far, ordered by offset
    instructions: Vec<Instruction>,
    /// Arena indices of instructions whose targets are resolved in the second pass
    pending: Vec<usize>,
}

impl<'a> MethodBodyParser<'a> {
    /// Create a parser positioned at the first byte of the body
    pub fn new(ctx: &'a MethodBodyContext<'a>) -> Self {
        MethodBodyParser {
            ctx,
            parser: Parser::new(ctx.code),
            // CIL averages a little under three bytes per instruction
            instructions: Vec::with_capacity(ctx.code.len() / 3 + 1),
            pending: Vec::new(),
        }
    }

    /// Decode the whole body.
    ///
    /// # Errors
    /// - [`Error::UnknownOpcode`] for reserved or out of range opcodes
    /// - [`Error::TruncatedOperand`] if the buffer ends inside an instruction
    /// - [`Error::UnresolvedBranchTarget`] if a target is not an instruction boundary
    /// - [`Error::TokenResolution`] if the resolver fails on a token operand
    /// - [`Error::Malformed`] if an argument or local slot is outside the context
    pub fn parse(mut self) -> Result<InstructionList> {
        while self.parser.has_more_data() {
            self.decode_next()?;
        }

        let deferred = self.pending.len();
        self.resolve_pending()?;

        log::trace!(
            "decoded {} instructions from {} bytes, {} deferred target(s)",
            self.instructions.len(),
            self.ctx.code.len(),
            deferred
        );

        Ok(InstructionList::from_vec(self.instructions))
    }

    /// Decode many independent bodies in parallel. Results are in input order and
    /// independent of each other.
    pub fn parse_many(bodies: &[MethodBodyContext<'_>]) -> Vec<Result<InstructionList>> {
        bodies.par_iter().map(decode_method_body).collect()
    }

    fn decode_next(&mut self) -> Result<()> {
        let offset = self.parser.pos();
        let index = self.instructions.len();
        let (opcode, byte) = read_opcode(&mut self.parser, offset)?;
        let extended = opcode.is_extended();

        let operand = match opcode.operand {
            OperandKind::None => self.short_form_slot(extended, byte, offset)?,
            OperandKind::ShortInlineI => {
                if !extended && byte == opcodes::LDC_I4_S {
                    Operand::SByte(i32::from(read_operand::<i8>(&mut self.parser, offset)?))
                } else {
                    Operand::Byte(read_operand::<u8>(&mut self.parser, offset)?)
                }
            }
            OperandKind::ShortInlineVar => {
                let slot = u16::from(read_operand::<u8>(&mut self.parser, offset)?);
                if matches!(
                    byte,
                    opcodes::LDARG_S | opcodes::LDARGA_S | opcodes::STARG_S
                ) {
                    self.argument(slot, offset)?
                } else {
                    self.local(slot, offset)?
                }
            }
            OperandKind::InlineVar => {
                let slot = read_operand::<u16>(&mut self.parser, offset)?;
                if matches!(
                    byte,
                    opcodes::FE_LDARG | opcodes::FE_LDARGA | opcodes::FE_STARG
                ) {
                    self.argument(slot, offset)?
                } else {
                    self.local(slot, offset)?
                }
            }
            OperandKind::InlineI => Operand::Int32(read_operand::<i32>(&mut self.parser, offset)?),
            OperandKind::InlineI8 => Operand::Int64(read_operand::<i64>(&mut self.parser, offset)?),
            OperandKind::ShortInlineR => {
                Operand::Float32(read_operand::<f32>(&mut self.parser, offset)?)
            }
            OperandKind::InlineR => {
                Operand::Float64(read_operand::<f64>(&mut self.parser, offset)?)
            }
            OperandKind::InlineString => {
                let token = self.read_token(offset)?;
                Operand::String(self.ctx.resolver.resolve_string(token)?)
            }
            OperandKind::InlineField => {
                let token = self.read_token(offset)?;
                Operand::Field(self.ctx.resolver.resolve_field(
                    token,
                    self.ctx.type_generic_args,
                    self.ctx.method_generic_args,
                )?)
            }
            OperandKind::InlineMethod => {
                let token = self.read_token(offset)?;
                Operand::Method(self.ctx.resolver.resolve_method(
                    token,
                    self.ctx.type_generic_args,
                    self.ctx.method_generic_args,
                )?)
            }
            OperandKind::InlineType => {
                let token = self.read_token(offset)?;
                Operand::Type(self.ctx.resolver.resolve_type(
                    token,
                    self.ctx.type_generic_args,
                    self.ctx.method_generic_args,
                )?)
            }
            OperandKind::InlineTok => {
                let token = self.read_token(offset)?;
                let member = self.ctx.resolver.resolve_member(
                    token,
                    self.ctx.type_generic_args,
                    self.ctx.method_generic_args,
                )?;
                match member {
                    MemberRef::Field(field) => Operand::Field(field),
                    MemberRef::Method(method) => Operand::Method(method),
                    MemberRef::Type(ty) => Operand::Type(ty),
                    MemberRef::Property(_) | MemberRef::Unknown(_) => Operand::Unresolved(token),
                }
            }
            OperandKind::InlineSig => {
                let token = self.read_token(offset)?;
                Operand::Signature(self.ctx.resolver.resolve_signature(token)?.to_vec())
            }
            OperandKind::ShortInlineBrTarget => {
                let raw = i32::from(read_operand::<i8>(&mut self.parser, offset)?);
                self.branch(opcode, offset, index, raw)?
            }
            OperandKind::InlineBrTarget => {
                let raw = read_operand::<i32>(&mut self.parser, offset)?;
                self.branch(opcode, offset, index, raw)?
            }
            OperandKind::InlineSwitch => self.switch(opcode, offset, index)?,
            OperandKind::InlinePhi => return Err(Error::UnknownOperandKind(opcode.operand)),
        };

        let size = self.parser.pos() - offset;
        let previous = index.checked_sub(1);
        if let Some(previous) = previous {
            self.instructions[previous].next = Some(index);
        }

        self.instructions.push(Instruction {
            index,
            offset,
            opcode,
            size,
            previous,
            next: None,
            operand,
        });

        Ok(())
    }

    fn read_token(&mut self, offset: usize) -> Result<Token> {
        Ok(Token::new(read_operand::<u32>(&mut self.parser, offset)?))
    }

    /// Slot operands of `ldarg.0`-`ldarg.3`, `ldloc.0`-`ldloc.3` and `stloc.0`-`stloc.3`
    fn short_form_slot(&self, extended: bool, byte: u8, offset: usize) -> Result<Operand> {
        if extended {
            return Ok(Operand::None);
        }

        match byte {
            opcodes::LDARG_0..=opcodes::LDARG_3 => {
                self.argument(u16::from(byte - opcodes::LDARG_0), offset)
            }
            opcodes::LDLOC_0..=opcodes::LDLOC_3 => {
                self.local(u16::from(byte - opcodes::LDLOC_0), offset)
            }
            opcodes::STLOC_0..=opcodes::STLOC_3 => {
                self.local(u16::from(byte - opcodes::STLOC_0), offset)
            }
            _ => Ok(Operand::None),
        }
    }

    /// Map an argument slot to `this` or a declared parameter
    fn argument(&self, slot: u16, offset: usize) -> Result<Operand> {
        let position = if self.ctx.is_static {
            slot
        } else if slot == 0 {
            return Ok(Operand::This);
        } else {
            slot - 1
        };

        let parameter = self
            .ctx
            .parameters
            .get(usize::from(position))
            .ok_or_else(|| {
                malformed_error!(
                    "Argument slot {} at offset {} exceeds the {} declared parameter(s)",
                    slot,
                    offset,
                    self.ctx.parameters.len()
                )
            })?;

        Ok(Operand::Parameter {
            position,
            parameter: parameter.clone(),
        })
    }

    fn local(&self, slot: u16, offset: usize) -> Result<Operand> {
        let variable = self.ctx.locals.get(usize::from(slot)).ok_or_else(|| {
            malformed_error!(
                "Local slot {} at offset {} exceeds the {} declared local(s)",
                slot,
                offset,
                self.ctx.locals.len()
            )
        })?;

        Ok(Operand::Local {
            slot,
            variable: variable.clone(),
        })
    }

    fn branch(
        &mut self,
        opcode: &'static OpCode,
        offset: usize,
        index: usize,
        raw_offset: i32,
    ) -> Result<Operand> {
        let target_offset = absolute_target(opcode, offset, self.parser.pos(), raw_offset)?;

        let target = if target_offset < offset {
            Some(self.find(opcode, offset, target_offset)?)
        } else {
            self.pending.push(index);
            None
        };

        Ok(Operand::Branch {
            raw_offset,
            target_offset,
            target,
        })
    }

    fn switch(&mut self, opcode: &'static OpCode, offset: usize, index: usize) -> Result<Operand> {
        let count = read_switch_count(&mut self.parser, offset)?;

        let mut raw_offsets = Vec::with_capacity(count);
        for _ in 0..count {
            raw_offsets.push(read_operand::<i32>(&mut self.parser, offset)?);
        }

        let base = self.parser.pos();
        let target_offsets = raw_offsets
            .iter()
            .map(|&raw| absolute_target(opcode, offset, base, raw))
            .collect::<Result<Vec<usize>>>()?;

        self.pending.push(index);
        Ok(Operand::Switch {
            raw_offsets,
            target_offsets,
            targets: vec![None; count],
        })
    }

    /// Index of the instruction starting at `target_offset`
    fn find(
        &self,
        opcode: &'static OpCode,
        source_offset: usize,
        target_offset: usize,
    ) -> Result<usize> {
        self.instructions
            .binary_search_by_key(&target_offset, |instruction| instruction.offset)
            .map_err(|_| Error::UnresolvedBranchTarget {
                source_offset,
                mnemonic: opcode.mnemonic,
                target: target_offset as i64,
            })
    }

    fn resolve_pending(&mut self) -> Result<()> {
        let pending = std::mem::take(&mut self.pending);

        for index in pending {
            let source = &self.instructions[index];
            let resolved = match &source.operand {
                Operand::Branch { target_offset, .. } => {
                    vec![self.find(source.opcode, source.offset, *target_offset)?]
                }
                Operand::Switch { target_offsets, .. } => target_offsets
                    .iter()
                    .map(|&target| self.find(source.opcode, source.offset, target))
                    .collect::<Result<Vec<usize>>>()?,
                _ => continue,
            };

            match &mut self.instructions[index].operand {
                Operand::Branch { target, .. } => *target = resolved.first().copied(),
                Operand::Switch { targets, .. } => {
                    *targets = resolved.into_iter().map(Some).collect();
                }
                _ => {}
            }
        }

        Ok(())
    }
}

/// `base + raw`, rejecting targets before the start of the body
fn absolute_target(
    opcode: &'static OpCode,
    source_offset: usize,
    base: usize,
    raw_offset: i32,
) -> Result<usize> {
    let target = base as i64 + i64::from(raw_offset);
    usize::try_from(target).map_err(|_| Error::UnresolvedBranchTarget {
        source_offset,
        mnemonic: opcode.mnemonic,
        target,
    })
}

/// Decode one method body into a linked, fully resolved instruction list.
///
/// # Errors
/// See [`MethodBodyParser::parse`].
pub fn decode_method_body(ctx: &MethodBodyContext<'_>) -> Result<InstructionList> {
    MethodBodyParser::new(ctx).parse()
}

/// Decode many independent method bodies in parallel, see [`MethodBodyParser::parse_many`]
pub fn decode_method_bodies(bodies: &[MethodBodyContext<'_>]) -> Vec<Result<InstructionList>> {
    MethodBodyParser::parse_many(bodies)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        assembly::instructions::FlowControl,
        metadata::MemoryResolver,
        test::{sample_hierarchy, SampleHierarchy},
    };

    fn decode(code: &[u8]) -> Result<InstructionList> {
        let resolver = MemoryResolver::new();
        let ctx = MethodBodyContext::new(code, &resolver);
        decode_method_body(&ctx)
    }

    fn assert_contiguous(list: &InstructionList, len: usize) {
        let mut expected = 0;
        for (index, instruction) in list.iter().enumerate() {
            assert_eq!(instruction.index, index);
            assert_eq!(instruction.offset, expected);
            assert_eq!(instruction.previous, index.checked_sub(1));
            assert_eq!(
                instruction.next,
                (index + 1 < list.len()).then_some(index + 1)
            );
            expected += instruction.size;
        }
        assert_eq!(expected, len);
    }

    #[test]
    fn empty_body() {
        let list = decode(&[]).unwrap();
        assert!(list.is_empty());
    }

    #[test]
    fn simple_stream() {
        // nop; ldc.i4.s -2; ldc.i4 0x12345678; add; ret
        let code = [0x00, 0x1F, 0xFE, 0x20, 0x78, 0x56, 0x34, 0x12, 0x58, 0x2A];
        let list = decode(&code).unwrap();

        assert_eq!(list.len(), 5);
        assert_contiguous(&list, code.len());
        assert!(matches!(list[1].operand, Operand::SByte(-2)));
        assert!(matches!(list[2].operand, Operand::Int32(0x1234_5678)));
        assert_eq!(list[4].flow(), FlowControl::Return);
    }

    #[test]
    fn extended_opcode_size() {
        // ldc.i4.0; ldc.i4.1; ceq; ret
        let list = decode(&[0x16, 0x17, 0xFE, 0x01, 0x2A]).unwrap();
        assert_eq!(list[2].mnemonic(), "ceq");
        assert_eq!(list[2].size, 2);
        assert_eq!(list[3].offset, 4);
    }

    #[test]
    fn floats_and_longs() {
        let mut code = vec![0x22];
        code.extend_from_slice(&1.5f32.to_le_bytes());
        code.push(0x23);
        code.extend_from_slice(&(-2.25f64).to_le_bytes());
        code.push(0x21);
        code.extend_from_slice(&i64::MIN.to_le_bytes());

        let list = decode(&code).unwrap();
        assert!(matches!(list[0].operand, Operand::Float32(v) if v == 1.5));
        assert!(matches!(list[1].operand, Operand::Float64(v) if v == -2.25));
        assert!(matches!(list[2].operand, Operand::Int64(i64::MIN)));
        assert_eq!(list[2].size, 9);
    }

    #[test]
    fn unaligned_prefix_is_byte() {
        // unaligned. 1; ldind.i4
        let list = decode(&[0xFE, 0x12, 0x01, 0x4A]).unwrap();
        assert!(matches!(list[0].operand, Operand::Byte(1)));
        assert_eq!(list[0].size, 3);
    }

    #[test]
    fn backward_branch_resolves_immediately() {
        // 0: nop, 1: nop, 2: br.s -4 (-> 0)
        let list = decode(&[0x00, 0x00, 0x2B, 0xFC]).unwrap();
        match &list[2].operand {
            Operand::Branch {
                raw_offset,
                target_offset,
                target,
            } => {
                assert_eq!(*raw_offset, -4);
                assert_eq!(*target_offset, 0);
                assert_eq!(*target, Some(0));
            }
            other => panic!("unexpected operand {other:?}"),
        }
    }

    #[test]
    fn forward_branch_resolves_in_second_pass() {
        // 0: br 1 (-> 6), 5: nop, 6: ret
        let list = decode(&[0x38, 0x01, 0x00, 0x00, 0x00, 0x00, 0x2A]).unwrap();
        assert_eq!(list[0].targets(), vec![2]);
        assert_eq!(list.branch_targets(&list[0])[0].mnemonic(), "ret");
    }

    #[test]
    fn branch_to_self() {
        // 0: br.s -2
        let list = decode(&[0x2B, 0xFE]).unwrap();
        assert_eq!(list[0].targets(), vec![0]);
    }

    #[test]
    fn branch_into_middle_of_instruction() {
        // 0: br.s +1 (-> 3), 2: ldc.i4 0, 7: ret
        let code = [0x2B, 0x01, 0x20, 0x00, 0x00, 0x00, 0x00, 0x2A];
        match decode(&code) {
            Err(Error::UnresolvedBranchTarget {
                source_offset,
                mnemonic,
                target,
            }) => {
                assert_eq!(source_offset, 0);
                assert_eq!(mnemonic, "br.s");
                assert_eq!(target, 3);
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn backward_branch_before_body_start() {
        // 0: br.s -10
        assert!(matches!(
            decode(&[0x2B, 0xF6]),
            Err(Error::UnresolvedBranchTarget { target: -8, .. })
        ));
    }

    #[test]
    fn branch_past_end() {
        // 0: br.s +5, 2: ret
        assert!(matches!(
            decode(&[0x2B, 0x05, 0x2A]),
            Err(Error::UnresolvedBranchTarget { target: 7, .. })
        ));
    }

    #[test]
    fn switch_targets_in_order() {
        let mut code = vec![0x00, 0x00, 0x00];
        code.push(0x45);
        code.extend_from_slice(&3u32.to_le_bytes());
        for raw in [-20i32, 0, 1] {
            code.extend_from_slice(&raw.to_le_bytes());
        }
        code.extend_from_slice(&[0x2A, 0x2A]);
        // nop x3; switch at 3 with base 20 -> [0, 20, 21]; ret; ret
        let list = decode(&code).unwrap();
        let switch = &list[3];
        assert_eq!(switch.size, 17);
        match &switch.operand {
            Operand::Switch {
                raw_offsets,
                target_offsets,
                targets,
            } => {
                assert_eq!(raw_offsets, &vec![-20, 0, 1]);
                assert_eq!(target_offsets, &vec![0, 20, 21]);
                assert_eq!(targets, &vec![Some(0), Some(4), Some(5)]);
            }
            other => panic!("unexpected operand {other:?}"),
        }
        assert_contiguous(&list, code.len());
    }

    #[test]
    fn empty_switch() {
        let list = decode(&[0x45, 0x00, 0x00, 0x00, 0x00, 0x2A]).unwrap();
        assert!(list[0].targets().is_empty());
        assert_eq!(list[0].size, 5);
    }

    #[test]
    fn oversized_switch_fails_before_allocating() {
        let code = [0x45, 0xFF, 0xFF, 0xFF, 0x7F, 0x00];
        assert!(matches!(
            decode(&code),
            Err(Error::TruncatedOperand {
                offset: 0,
                available: 1,
                ..
            })
        ));
    }

    #[test]
    fn truncated_operand() {
        match decode(&[0x00, 0x20, 0x01, 0x00]) {
            Err(Error::TruncatedOperand {
                offset,
                needed,
                available,
            }) => {
                assert_eq!(offset, 1);
                assert_eq!(needed, 4);
                assert_eq!(available, 2);
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn truncated_extended_opcode() {
        assert!(matches!(
            decode(&[0x00, 0xFE]),
            Err(Error::TruncatedOperand { offset: 1, .. })
        ));
    }

    #[test]
    fn unknown_opcodes() {
        assert!(matches!(
            decode(&[0x24]),
            Err(Error::UnknownOpcode {
                offset: 0,
                opcode: 0x24
            })
        ));
        assert!(matches!(
            decode(&[0x00, 0xFE, 0x1F]),
            Err(Error::UnknownOpcode {
                offset: 1,
                opcode: 0xFE1F
            })
        ));
        assert!(matches!(
            decode(&[0xFE, 0x19, 0x00]),
            Err(Error::UnknownOpcode { opcode: 0xFE19, .. })
        ));
    }

    #[test]
    fn static_argument_slots() {
        let SampleHierarchy {
            resolver, add, ..
        } = sample_hierarchy();
        // ldarg.0; ldarg.1; add; ret
        let code = [0x02, 0x03, 0x58, 0x2A];
        let ctx = MethodBodyContext::for_method(&add, &code, &resolver);
        let list = decode_method_body(&ctx).unwrap();

        match &list[1].operand {
            Operand::Parameter {
                position,
                parameter,
            } => {
                assert_eq!(*position, 1);
                assert_eq!(parameter.name, "right");
            }
            other => panic!("unexpected operand {other:?}"),
        }
    }

    #[test]
    fn instance_argument_slots() {
        let SampleHierarchy {
            resolver, describe, ..
        } = sample_hierarchy();
        // ldarg.0; ldarg.1; ldarg.s 1; ldarg 1 (FE 09); pop x3; ret
        let code = [0x02, 0x03, 0x0E, 0x01, 0xFE, 0x09, 0x01, 0x00, 0x26, 0x26, 0x26, 0x2A];
        let ctx = MethodBodyContext::for_method(&describe, &code, &resolver);
        let list = decode_method_body(&ctx).unwrap();

        assert!(matches!(list[0].operand, Operand::This));
        for index in 1..=3 {
            assert!(matches!(
                list[index].operand,
                Operand::Parameter { position: 0, .. }
            ));
        }
    }

    #[test]
    fn argument_slot_out_of_range() {
        let resolver = MemoryResolver::new();
        let ctx = MethodBodyContext::new(&[0x02], &resolver);
        assert!(matches!(
            decode_method_body(&ctx),
            Err(Error::Malformed { .. })
        ));
    }

    #[test]
    fn local_slots() {
        let SampleHierarchy {
            resolver, locals, ..
        } = sample_hierarchy();
        // ldc.i4.1; stloc.1; ldloc.s 1; stloc 0 (FE 0E); ldloca.s 0; pop; ret
        let code = [
            0x17, 0x0B, 0x11, 0x01, 0xFE, 0x0E, 0x00, 0x00, 0x12, 0x00, 0x26, 0x2A,
        ];
        let ctx = MethodBodyContext::new(&code, &resolver).with_locals(&locals);
        let list = decode_method_body(&ctx).unwrap();

        assert!(matches!(list[1].operand, Operand::Local { slot: 1, .. }));
        assert!(matches!(list[2].operand, Operand::Local { slot: 1, .. }));
        assert!(matches!(list[3].operand, Operand::Local { slot: 0, .. }));
        assert!(matches!(list[4].operand, Operand::Local { slot: 0, .. }));

        let ctx = MethodBodyContext::new(&[0x09], &resolver).with_locals(&locals);
        assert!(matches!(
            decode_method_body(&ctx),
            Err(Error::Malformed { .. })
        ));
    }

    #[test]
    fn token_operands() {
        let SampleHierarchy {
            resolver,
            base_field,
            describe,
            base,
            ..
        } = sample_hierarchy();

        let mut code = vec![0x7E];
        code.extend_from_slice(&base_field.token.value().to_le_bytes());
        code.push(0x28);
        code.extend_from_slice(&describe.token.value().to_le_bytes());
        code.push(0x8C);
        code.extend_from_slice(&base.token.value().to_le_bytes());
        code.push(0x72);
        code.extend_from_slice(&0x7000_0001u32.to_le_bytes());
        code.push(0x2A);

        let ctx = MethodBodyContext::new(&code, &resolver);
        let list = decode_method_body(&ctx).unwrap();

        assert_eq!(
            list[0].operand.member(),
            Some(MemberRef::Field(base_field.clone()))
        );
        assert_eq!(
            list[1].operand.member(),
            Some(MemberRef::Method(describe.clone()))
        );
        assert!(matches!(&list[2].operand, Operand::Type(ty) if ty.name == "Base"));
        assert!(matches!(&list[3].operand, Operand::String(s) if s == "hello"));
    }

    #[test]
    fn ldtoken_is_classified() {
        let SampleHierarchy {
            resolver,
            base,
            value_property,
            ..
        } = sample_hierarchy();

        let mut code = vec![0xD0];
        code.extend_from_slice(&base.token.value().to_le_bytes());
        code.push(0xD0);
        code.extend_from_slice(&value_property.token.value().to_le_bytes());

        let ctx = MethodBodyContext::new(&code, &resolver);
        let list = decode_method_body(&ctx).unwrap();
        assert!(matches!(list[0].operand, Operand::Type(_)));
        assert!(
            matches!(list[1].operand, Operand::Unresolved(token) if token == value_property.token)
        );
    }

    #[test]
    fn calli_copies_signature() {
        let SampleHierarchy { resolver, .. } = sample_hierarchy();
        let mut code = vec![0x29];
        code.extend_from_slice(&0x1100_0001u32.to_le_bytes());

        let ctx = MethodBodyContext::new(&code, &resolver);
        let list = decode_method_body(&ctx).unwrap();
        assert!(matches!(&list[0].operand, Operand::Signature(blob) if blob == &[0x00, 0x00, 0x01]));
    }

    #[test]
    fn unknown_token_fails() {
        let resolver = MemoryResolver::new();
        let ctx = MethodBodyContext::new(&[0x28, 0x01, 0x00, 0x00, 0x06], &resolver);
        assert!(matches!(
            decode_method_body(&ctx),
            Err(Error::TokenResolution { .. })
        ));
    }

    #[test]
    fn parse_many_keeps_results_independent() {
        let resolver = MemoryResolver::new();
        let good = [0x00, 0x2A];
        let bad = [0x24];
        let bodies = vec![
            MethodBodyContext::new(&good, &resolver),
            MethodBodyContext::new(&bad, &resolver),
            MethodBodyContext::new(&good, &resolver),
        ];

        let results = decode_method_bodies(&bodies);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().len(), 2);
        assert!(results[1].is_err());
        assert_eq!(results[2].as_ref().unwrap().len(), 2);
    }
}
