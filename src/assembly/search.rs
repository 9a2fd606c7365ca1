//! Reference queries over raw method bodies.
//!
//! Answers "does this method body reference X" without building an [`crate::assembly::InstructionList`].
//! The instruction stream is walked with the same opcode and operand rules as the full decoder,
//! but only field, method, type and `ldtoken` operands are resolved. Every other operand is
//! skipped by size, and branch targets are never computed.
//!
//! Each resolved member is tested against a set of [`MemberMatchRule`]s. The walk stops as soon
//! as the outcome is known for the requested [`SearchMode`].
//!
//! A `constrained.` prefix is tracked: for the call that follows it, the override the call
//! dispatches to (see [`resolve_constrained_call`]) is tested after the method token itself.
//! The override is only looked up while some rule is still unmatched, and a failed lookup is
//! logged and skipped.
//!
//! # Examples
//!
//! ```rust
//! use cilreader::{
//!     assembly::references_member,
//!     matching::MemberMatchRule,
//!     metadata::{token::Token, FieldDesc, FieldModifiers, MemberRef, MemoryResolver, TypeDesc},
//!     MethodBodyContext,
//! };
//!
//! let resolver = MemoryResolver::new();
//! let ty = TypeDesc::new(Token::new(0x0200_0002), "App", "Counter", 0);
//! let field = FieldDesc::declare(&ty, Token::new(0x0400_0001), "count", FieldModifiers::empty());
//! resolver.register_type(&ty);
//!
//! // ldarg.0; ldfld count; ret
//! let code = [0x02, 0x7B, 0x01, 0x00, 0x00, 0x04, 0x2A];
//! let ctx = MethodBodyContext::new(&code, &resolver).with_static(false);
//!
//! let rule = MemberMatchRule::exact(MemberRef::Field(field));
//! assert!(references_member(&ctx, &rule)?);
//! # Ok::<(), cilreader::Error>(())
//! ```

use crate::{
    assembly::{
        decoder::{read_opcode, read_operand, read_switch_count, skip_operand},
        instructions::OperandKind,
        opcodes,
    },
    matching::{resolve_constrained_call, MemberMatchRule},
    metadata::{member::MemberRef, method::MethodBodyContext, token::Token, typesystem::TypeRc},
    stream::parser::Parser,
    Error, Result,
};

/// How the results of several rules are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    /// Exactly one rule, true once it matches
    Single,
    /// True once any rule matches
    Any,
    /// True once every rule has matched at least once
    All,
}

/// Search a method body for references matching `rules`.
///
/// An empty rule set is trivially satisfied for [`SearchMode::All`] and never satisfied for
/// [`SearchMode::Any`].
///
/// # Errors
/// Returns [`Error::Malformed`] if `mode` is [`SearchMode::Single`] and `rules` does not hold
/// exactly one rule. Otherwise fails the same way the decoder does for the part of the body
/// that had to be read before the outcome was known.
pub fn search_method_body(
    ctx: &MethodBodyContext<'_>,
    rules: &[MemberMatchRule],
    mode: SearchMode,
) -> Result<bool> {
    if mode == SearchMode::Single && rules.len() != 1 {
        return Err(malformed_error!(
            "single target search needs exactly one rule, got {}",
            rules.len()
        ));
    }

    if rules.is_empty() {
        return Ok(mode == SearchMode::All);
    }

    let mut found = vec![false; rules.len()];
    let mut remaining = rules.len();
    let mut parser = Parser::new(ctx.code);
    let mut constraint: Option<TypeRc> = None;

    while parser.has_more_data() {
        let offset = parser.pos();
        let (opcode, byte) = read_opcode(&mut parser, offset)?;
        let pending_constraint = constraint.take();

        match opcode.operand {
            kind if kind.is_member_token() => {
                let token = Token::new(read_operand::<u32>(&mut parser, offset)?);
                let member = ctx.resolver.resolve_member(
                    token,
                    ctx.type_generic_args,
                    ctx.method_generic_args,
                )?;

                if opcode.is_extended() && byte == opcodes::FE_CONSTRAINED {
                    if let MemberRef::Type(ty) = &member {
                        constraint = Some(ty.clone());
                    }
                }

                if record_hits(&member, rules, &mut found, &mut remaining, mode, ctx) {
                    log::trace!("reference found at offset {}", offset);
                    return Ok(true);
                }

                if let (Some(ty), MemberRef::Method(method)) = (&pending_constraint, &member) {
                    let target = match resolve_constrained_call(ty, method, ctx.resolver) {
                        Ok(target) => target,
                        Err(err) => {
                            log::debug!(
                                "skipping constrained override of {} at offset {}: {}",
                                method.name,
                                offset,
                                err
                            );
                            None
                        }
                    };

                    if let Some(target) = target {
                        let candidate = MemberRef::Method(target);
                        if record_hits(&candidate, rules, &mut found, &mut remaining, mode, ctx)
                        {
                            log::trace!("constrained reference found at offset {}", offset);
                            return Ok(true);
                        }
                    }
                }
            }
            OperandKind::InlineSwitch => {
                let count = read_switch_count(&mut parser, offset)?;
                skip_operand(&mut parser, offset, count * 4)?;
            }
            OperandKind::InlinePhi => return Err(Error::UnknownOperandKind(opcode.operand)),
            kind => skip_operand(&mut parser, offset, kind.size()?)?,
        }
    }

    Ok(false)
}

/// Marks every rule not yet hit that matches `candidate`; true once the outcome is known
fn record_hits(
    candidate: &MemberRef,
    rules: &[MemberMatchRule],
    found: &mut [bool],
    remaining: &mut usize,
    mode: SearchMode,
    ctx: &MethodBodyContext<'_>,
) -> bool {
    for (rule, hit) in rules.iter().zip(found.iter_mut()) {
        if *hit || !rule.matches(candidate, ctx.resolver) {
            continue;
        }

        *hit = true;
        *remaining -= 1;
        if mode != SearchMode::All || *remaining == 0 {
            return true;
        }
    }

    false
}

/// Returns true if the body references the target of `rule`
///
/// # Errors
/// See [`search_method_body`].
pub fn references_member(ctx: &MethodBodyContext<'_>, rule: &MemberMatchRule) -> Result<bool> {
    search_method_body(ctx, std::slice::from_ref(rule), SearchMode::Single)
}

/// Returns true if the body references the target of any rule
///
/// # Errors
/// See [`search_method_body`].
pub fn references_any(ctx: &MethodBodyContext<'_>, rules: &[MemberMatchRule]) -> Result<bool> {
    search_method_body(ctx, rules, SearchMode::Any)
}

/// Returns true if the body references the targets of all rules
///
/// # Errors
/// See [`search_method_body`].
pub fn references_all(ctx: &MethodBodyContext<'_>, rules: &[MemberMatchRule]) -> Result<bool> {
    search_method_body(ctx, rules, SearchMode::All)
}
