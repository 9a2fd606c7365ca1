//! CIL method body decoding and reference queries.
//!
//! This module turns the raw instruction stream of a method body into typed instructions
//! with resolved branch targets, and answers "does this body reference X" queries without
//! materializing the instructions.
//!
//! # Key Types
//! - [`OpCode`] - Static descriptor of one opcode (mnemonic, operand kind, flow)
//! - [`Instruction`] - A decoded instruction, linked into an [`InstructionList`]
//! - [`Operand`] - Closed set of operand payloads
//! - [`SearchMode`] - How several reference queries are combined
//!
//! # Main Functions
//! - [`decode_method_body`] - Decode one body
//! - [`decode_method_bodies`] - Decode independent bodies in parallel
//! - [`search_method_body`] - Short-circuiting reference query
//! - [`lookup_single_byte`] / [`lookup_extended`] / [`lookup_code`] - Opcode tables
//!
//! # Example
//! ```rust
//! use cilreader::{assembly::decode_method_body, metadata::MemoryResolver, MethodBodyContext};
//!
//! let resolver = MemoryResolver::new();
//! let bytecode = [0x00, 0x2A]; // nop, ret
//! let ctx = MethodBodyContext::new(&bytecode, &resolver);
//!
//! let instructions = decode_method_body(&ctx)?;
//! assert_eq!(instructions[1].mnemonic(), "ret");
//! # Ok::<(), cilreader::Error>(())
//! ```

mod decoder;
mod instruction;
mod instructions;
mod opcodes;
mod search;

pub use decoder::{decode_method_bodies, decode_method_body, MethodBodyParser};
pub use instruction::{Instruction, InstructionList, Operand};
pub use instructions::*;
pub use search::{
    references_all, references_any, references_member, search_method_body, SearchMode,
};
