//! Member equivalence for reference queries.
//!
//! Deciding whether an instruction "references" a member is more than comparing tokens: the
//! same member can be reached through a derived type, through a property accessor, through a
//! base class declaration or through a `constrained.` call. This module holds the rules that
//! decide that equivalence.
//!
//! # Key Components
//! - [`MatchConfig`] - Which expansions a rule performs
//! - [`MemberMatchRule`] - A target member plus its lazily computed equivalents
//! - [`resolve_constrained_call`] - The override a constrained virtual call dispatches to

mod config;
mod constrained;
mod rule;

pub use config::MatchConfig;
pub use constrained::resolve_constrained_call;
pub use rule::{MemberMatchRule, WalkOutcome};
