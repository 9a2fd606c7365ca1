//! Member matching configuration
//!
//! This module provides the options that decide how far a [`crate::matching::MemberMatchRule`]
//! looks beyond exact identity when comparing a referenced member to its target.

/// Configuration for member matching
///
/// Exact identity and property accessor equivalence are always on. The two switches below
/// widen the set of equivalent members:
/// - across the inheritance chain (members with the same name and shape on base types)
/// - through the declaring type (members obtained through a derived type)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchConfig {
    /// Treat same-named, same-shaped members of base types as equivalent
    /// Also makes a base member match a derived member that hides it
    pub match_base_class_members: bool,

    /// Treat the target as obtained through its declaring type as equivalent
    /// Only relevant when a member is reflected through a type other than its declaring one
    pub match_declaring_type_member: bool,

    /// Maximum number of base types visited when collecting base members (default: 64)
    pub max_ancestor_depth: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self::exact()
    }
}

impl MatchConfig {
    /// Exact identity plus property accessors
    #[must_use]
    pub fn exact() -> Self {
        Self {
            match_base_class_members: false,
            match_declaring_type_member: false,
            max_ancestor_depth: 64,
        }
    }

    /// Also match members declared on base types
    #[must_use]
    pub fn with_base_members() -> Self {
        Self {
            match_base_class_members: true,
            ..Self::exact()
        }
    }

    /// Also match through the declaring type
    #[must_use]
    pub fn with_declaring_type() -> Self {
        Self {
            match_declaring_type_member: true,
            ..Self::exact()
        }
    }

    /// Enables every equivalence
    #[must_use]
    pub fn comprehensive() -> Self {
        Self {
            match_base_class_members: true,
            match_declaring_type_member: true,
            max_ancestor_depth: 64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_config_presets() {
        let exact = MatchConfig::exact();
        assert!(!exact.match_base_class_members);
        assert!(!exact.match_declaring_type_member);
        assert_eq!(exact.max_ancestor_depth, 64);

        let base = MatchConfig::with_base_members();
        assert!(base.match_base_class_members);
        assert!(!base.match_declaring_type_member);

        let declaring = MatchConfig::with_declaring_type();
        assert!(!declaring.match_base_class_members);
        assert!(declaring.match_declaring_type_member);

        let comprehensive = MatchConfig::comprehensive();
        assert!(comprehensive.match_base_class_members);
        assert!(comprehensive.match_declaring_type_member);
    }

    #[test]
    fn default_is_exact() {
        assert_eq!(MatchConfig::default(), MatchConfig::exact());
    }
}
