// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # cilreader
//!
//! A decoder for the CIL (Common Intermediate Language) instruction stream of a single .NET
//! method body, plus a member equivalence engine that answers "does this method reference X"
//! under configurable rules.
//!
//! The crate does not read PE files. Callers hand it the raw bytes of a method body together
//! with a [`MethodBodyContext`]: the local and parameter slots, whether the method is static,
//! the generic arguments in scope and a [`metadata::MetadataResolver`] that turns metadata
//! tokens into descriptors.
//!
//! ## Features
//!
//! - **Two-pass decoding** - Every branch and `switch` target is resolved to the instruction
//!   it lands on, or decoding fails
//! - **Typed operands** - A closed [`assembly::Operand`] enum; short-form slot opcodes are
//!   normalized to `this`, parameters and locals
//! - **Reference queries** - Short-circuiting searches that skip everything but member tokens
//! - **Member equivalence** - Property accessors, base class members, hiding members and
//!   members seen through a derived type, each switchable through [`matching::MatchConfig`]
//! - **Parallel batches** - Independent bodies decoded on a `rayon` thread pool
//!
//! ## Quick Start
//!
//! ```rust
//! use cilreader::prelude::*;
//!
//! let resolver = MemoryResolver::new();
//! let ty = TypeDesc::new(Token::new(0x0200_0002), "App", "Counter", 0);
//! let count = FieldDesc::declare(&ty, Token::new(0x0400_0001), "count", FieldModifiers::empty());
//! resolver.register_type(&ty);
//!
//! // ldarg.0; ldfld count; brtrue.s +1; nop; ret
//! let code = [0x02, 0x7B, 0x01, 0x00, 0x00, 0x04, 0x2D, 0x01, 0x00, 0x2A];
//! let ctx = MethodBodyContext::new(&code, &resolver).with_static(false);
//!
//! let instructions = decode_method_body(&ctx)?;
//! assert_eq!(instructions.len(), 5);
//! assert!(matches!(instructions[0].operand, Operand::This));
//! assert_eq!(instructions.branch_targets(&instructions[2])[0].mnemonic(), "ret");
//!
//! let rule = MemberMatchRule::exact(MemberRef::Field(count));
//! assert!(references_member(&ctx, &rule)?);
//! # Ok::<(), cilreader::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`prelude`] - Convenient re-exports of commonly used types and traits
//! - [`assembly`] - Opcode tables, instruction model, decoder and reference queries
//! - [`matching`] - Member equivalence rules and constrained-call resolution
//! - [`metadata`] - Tokens, type and member descriptors, the resolver capability
//! - [`stream`] - Bounds-checked little-endian reading
//! - [`Error`] and [`Result`] - Error handling
//!
//! ## Error Handling
//!
//! All operations return [`Result<T, Error>`](Result). Decoding errors are terminal for the
//! body being decoded; there is no partially decoded result. The only place that tolerates
//! failures is the base class walk of a [`matching::MemberMatchRule`], which records them in
//! its [`matching::WalkOutcome`] and logs them at `debug` level.
//!
//! ## Logging
//!
//! The crate logs through the [`log`] facade and never installs a logger.
//!
//! ## References
//!
//! - [ECMA-335 Standard](https://ecma-international.org/publications-and-standards/standards/ecma-335/) - Common Language Infrastructure

#[macro_use]
pub(crate) mod error;

/// Shared functionality which is used in unit-tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use cilreader::prelude::*;
///
/// let resolver = MemoryResolver::new();
/// let ctx = MethodBodyContext::new(&[0x00, 0x2A], &resolver);
/// assert_eq!(decode_method_body(&ctx)?.len(), 2);
/// # Ok::<(), cilreader::Error>(())
/// ```
pub mod prelude;

/// Opcode tables, the decoded instruction model, the method body decoder and reference
/// queries, based on ECMA-335 Partition III.
///
/// # Key Types
///
/// - [`assembly::OpCode`] - Static description of an opcode
/// - [`assembly::Instruction`] - A decoded instruction
/// - [`assembly::InstructionList`] - The decoded body, ordered by offset
/// - [`assembly::Operand`] - Typed operand payloads
///
/// # Main Functions
///
/// - [`assembly::decode_method_body`] - Decode one method body
/// - [`assembly::decode_method_bodies`] - Decode many bodies in parallel
/// - [`assembly::search_method_body`] - Reference query without materializing instructions
pub mod assembly;

/// Member equivalence rules.
pub mod matching;

/// Metadata descriptors and the token resolution capability the decoder depends on.
///
/// # Key Components
///
/// - [`metadata::token`] - Metadata tokens
/// - [`metadata::TypeDesc`], [`metadata::MethodDesc`], [`metadata::FieldDesc`],
///   [`metadata::PropertyDesc`] - Descriptors
/// - [`metadata::MemberRef`] - A resolved member with identity equality
/// - [`metadata::MetadataResolver`] - The injected resolver trait
/// - [`metadata::MemoryResolver`] - In-memory resolver for hosts and tests
pub mod metadata;

/// Bounds-checked little-endian reading of byte buffers.
pub mod stream;

/// `cilreader` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
/// This is used consistently throughout the crate for all fallible operations.
///
/// # Examples
///
/// ```rust
/// use cilreader::{assembly::InstructionList, metadata::MemoryResolver, MethodBodyContext, Result};
///
/// fn decode(code: &[u8]) -> Result<InstructionList> {
///     let resolver = MemoryResolver::new();
///     cilreader::assembly::decode_method_body(&MethodBodyContext::new(code, &resolver))
/// }
///
/// assert!(decode(&[0x2A]).is_ok());
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// `cilreader` Error type
///
/// The main error type for all operations in this crate.
///
/// # Examples
///
/// ```rust
/// use cilreader::{assembly::decode_method_body, metadata::MemoryResolver, Error, MethodBodyContext};
///
/// let resolver = MemoryResolver::new();
/// match decode_method_body(&MethodBodyContext::new(&[0x24], &resolver)) {
///     Err(Error::UnknownOpcode { offset, opcode }) => {
///         assert_eq!((offset, opcode), (0, 0x24));
///     }
///     other => panic!("unexpected: {other:?}"),
/// }
/// ```
pub use error::Error;

/// Per-method input of the decoder.
///
/// See [`metadata::MethodBodyContext`].
pub use metadata::MethodBodyContext;

/// Provides access to low-level byte parsing.
///
/// # Example
///
/// ```rust
/// use cilreader::Parser;
/// let code = [0x2A, 0x00, 0x01];
/// let mut parser = Parser::new(&code);
/// assert_eq!(parser.read_le::<u8>()?, 0x2A);
/// assert_eq!(parser.read_le::<u16>()?, 0x0100);
/// # Ok::<(), cilreader::Error>(())
/// ```
pub use stream::parser::Parser;
