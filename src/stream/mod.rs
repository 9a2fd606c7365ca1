//! Bounds-checked byte reading used by the instruction decoder.
//!
//! - [`io`] - the [`io::CilIO`] trait and little-endian primitive reads
//! - [`parser`] - the cursor-based [`parser::Parser`]

pub mod io;
pub mod parser;
