use thiserror::Error;

use crate::{assembly::OperandKind, metadata::token::Token};

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

macro_rules! token_error {
    ($token:expr, $msg:expr) => {
        crate::Error::TokenResolution {
            token: $token,
            message: $msg.to_string(),
        }
    };

    ($token:expr, $fmt:expr, $($arg:tt)*) => {
        crate::Error::TokenResolution {
            token: $token,
            message: format!($fmt, $($arg)*),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Every decoder error is terminal for the method body being decoded: there is no partial
/// result and no retry. Callers decoding many bodies treat each one as an independent unit
/// of work.
///
/// # Error Categories
///
/// ## Instruction Stream Errors
/// - [`Error::UnknownOpcode`] - Reserved or out-of-range opcode byte
/// - [`Error::UnknownOperandKind`] - Operand encoding the decoder does not implement
/// - [`Error::TruncatedOperand`] - Buffer ended in the middle of an instruction
/// - [`Error::UnresolvedBranchTarget`] - Branch or switch target is not an instruction boundary
///
/// ## Metadata Errors
/// - [`Error::TokenResolution`] - The injected resolver could not produce a descriptor
/// - [`Error::Malformed`] - Inconsistent caller-supplied context (e.g. slot out of range)
///
/// # Examples
///
/// ```rust
/// use cilreader::{Error, MethodBodyContext, metadata::MemoryResolver, assembly::decode_method_body};
///
/// let resolver = MemoryResolver::new();
/// let ctx = MethodBodyContext::new(&[0x20, 0x01, 0x00], &resolver);
///
/// match decode_method_body(&ctx) {
///     Err(Error::TruncatedOperand { offset, .. }) => assert_eq!(offset, 0),
///     other => panic!("unexpected result: {other:?}"),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The input is inconsistent and could not be decoded.
    ///
    /// Raised for caller-supplied context that does not agree with the byte stream,
    /// such as an argument slot beyond the declared parameters. The error includes the
    /// source location where the malformation was detected for debugging purposes.
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// An out of bound access was attempted on a byte buffer.
    ///
    /// Low-level reads through [`crate::Parser`] report this; the instruction decoder
    /// translates it into [`Error::TruncatedOperand`] with positional context.
    #[error("Out of Bound read would have occurred!")]
    OutOfBounds,

    /// An opcode byte does not map to a defined instruction.
    ///
    /// `opcode` holds the single byte, or `0xFE00 | second` for the extended family.
    #[error("Unknown opcode 0x{opcode:04X} at offset {offset}")]
    UnknownOpcode {
        /// Offset of the instruction within the method body
        offset: usize,
        /// The raw opcode value
        opcode: u16,
    },

    /// The opcode uses an operand encoding the decoder does not implement.
    ///
    /// Only the reserved `InlinePhi` encoding falls into this category. It is never
    /// silently treated as a zero-sized operand.
    #[error("Unsupported operand kind {0}")]
    UnknownOperandKind(OperandKind),

    /// The buffer ended before an instruction was fully consumed.
    #[error("Truncated instruction at offset {offset}: needed {needed} bytes, {available} available")]
    TruncatedOperand {
        /// Offset of the instruction within the method body
        offset: usize,
        /// Number of bytes the operand requires
        needed: usize,
        /// Number of bytes left in the buffer
        available: usize,
    },

    /// A branch or switch target does not land exactly on an instruction boundary.
    #[error("{mnemonic} at offset {source_offset} targets offset {target}, which is not an instruction boundary")]
    UnresolvedBranchTarget {
        /// Offset of the branching instruction
        source_offset: usize,
        /// Mnemonic of the branching instruction
        mnemonic: &'static str,
        /// The computed absolute target offset
        target: i64,
    },

    /// The metadata resolver could not produce a descriptor for a token.
    #[error("Failed to resolve token {token}: {message}")]
    TokenResolution {
        /// The token that failed to resolve
        token: Token,
        /// Reason reported by the resolver
        message: String,
    },
}
