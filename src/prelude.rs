//! # cilreader Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the cilreader library. Import this module to get quick access to the essential
//! types for decoding method bodies and querying member references.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all cilreader operations
pub use crate::Error;

/// The result type used throughout cilreader
pub use crate::Result;

/// Low-level byte parsing
pub use crate::Parser;

// ================================================================================================
// Decoding
// ================================================================================================

/// Per-method input of the decoder
pub use crate::MethodBodyContext;

/// Decoder entry points
pub use crate::assembly::{decode_method_bodies, decode_method_body, MethodBodyParser};

/// Decoded instructions
pub use crate::assembly::{FlowControl, Instruction, InstructionList, OpCode, Operand, OperandKind};

// ================================================================================================
// Reference Queries and Matching
// ================================================================================================

/// Reference queries
pub use crate::assembly::{
    references_all, references_any, references_member, search_method_body, SearchMode,
};

/// Member equivalence
pub use crate::matching::{resolve_constrained_call, MatchConfig, MemberMatchRule, WalkOutcome};

// ================================================================================================
// Metadata
// ================================================================================================

/// Metadata token type for referencing table entries
pub use crate::metadata::token::Token;

/// Descriptors
pub use crate::metadata::{
    FieldDesc, FieldModifiers, FieldRc, LocalVariable, MemberKind, MemberRef, MethodDesc,
    MethodModifiers, MethodRc, ParamDesc, PropertyDesc, PropertyRc, TypeDesc, TypeRc, TypeRef,
};

/// Token resolution
pub use crate::metadata::{MemoryResolver, MetadataResolver};
