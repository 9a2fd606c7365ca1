//! CIL opcode byte constants the decoder dispatches on.
//!
//! Single-byte opcodes are named after their mnemonic (e.g. [`LDC_I4_S`] = `0x1F`). Two-byte
//! opcodes that use the `0xFE` prefix have their second byte stored with an `FE_` prefix
//! (e.g. [`FE_CONSTRAINED`] = `0x16` for `constrained.`, encoded `0xFE 0x16`).
#![allow(missing_docs)]

/// Shared first byte of the extended opcode family
pub const FE_PREFIX: u8 = 0xFE;

// Argument shorthand
pub const LDARG_0: u8 = 0x02;
pub const LDARG_3: u8 = 0x05;

// Local shorthand
pub const LDLOC_0: u8 = 0x06;
pub const LDLOC_3: u8 = 0x09;
pub const STLOC_0: u8 = 0x0A;
pub const STLOC_3: u8 = 0x0D;

// Argument/local, short form
pub const LDARG_S: u8 = 0x0E;
pub const LDARGA_S: u8 = 0x0F;
pub const STARG_S: u8 = 0x10;
pub const LDLOC_S: u8 = 0x11;
pub const LDLOCA_S: u8 = 0x12;
pub const STLOC_S: u8 = 0x13;

// Literals
pub const LDC_I4_S: u8 = 0x1F;

// ── Two-byte opcodes (0xFE prefix, second byte) ────────────────────────────

pub const FE_LDARG: u8 = 0x09;
pub const FE_LDARGA: u8 = 0x0A;
pub const FE_STARG: u8 = 0x0B;
pub const FE_LDLOC: u8 = 0x0C;
pub const FE_LDLOCA: u8 = 0x0D;
pub const FE_STLOC: u8 = 0x0E;
pub const FE_CONSTRAINED: u8 = 0x16;
