//! Lazily expanded member equivalence rules.
//!
//! A [`MemberMatchRule`] answers one question: does a member referenced from a method body
//! denote "the same" member as the rule's target? Exact identity always counts. Depending on
//! the target and on the [`MatchConfig`], so do:
//!
//! - the get and set accessors of a property-shaped target
//! - the target as obtained through its declaring type
//! - same-named, same-shaped members of the target's base types
//! - members of derived types that hide the target
//!
//! The expansion is computed on the first call to [`MemberMatchRule::matches`] and cached
//! for the lifetime of the rule. Alternate rules created by the expansion never expand
//! themselves, which bounds every match to two hops.
//!
//! # Examples
//!
//! ```rust
//! use cilreader::{
//!     matching::{MatchConfig, MemberMatchRule},
//!     metadata::{token::Token, FieldDesc, FieldModifiers, MemberRef, MemoryResolver, TypeDesc},
//! };
//!
//! let resolver = MemoryResolver::new();
//! let base = TypeDesc::new(Token::new(0x0200_0002), "App", "Base", 0);
//! let derived = TypeDesc::new(Token::new(0x0200_0003), "App", "Derived", 0);
//! derived.set_base(&base)?;
//!
//! let hidden = FieldDesc::declare(&base, Token::new(0x0400_0001), "F", FieldModifiers::empty());
//! let hiding = FieldDesc::declare(&derived, Token::new(0x0400_0002), "F", FieldModifiers::empty());
//!
//! let exact = MemberMatchRule::exact(MemberRef::Field(hidden.clone()));
//! assert!(!exact.matches(&MemberRef::Field(hiding.clone()), &resolver));
//!
//! let widened = MemberMatchRule::new(MemberRef::Field(hidden), MatchConfig::with_base_members());
//! assert!(widened.matches(&MemberRef::Field(hiding), &resolver));
//! # Ok::<(), cilreader::Error>(())
//! ```

use std::{collections::HashSet, sync::OnceLock};

use crate::{
    matching::config::MatchConfig,
    metadata::{
        member::MemberRef,
        method::MethodRc,
        resolver::MetadataResolver,
        typesystem::TypeRc,
    },
};

/// Result of collecting base class alternates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkOutcome {
    /// Base matching is off, the target is static, or the target has no declaring type
    NotRequested,
    /// Every ancestor was enumerated
    Complete,
    /// Member enumeration failed on some ancestors; their members are missing
    Partial {
        /// Number of ancestors that could not be enumerated
        failures: usize,
    },
}

/// State computed once per rule
#[derive(Debug)]
struct Expansion {
    is_static: bool,
    getter: Option<MethodRc>,
    setter: Option<MethodRc>,
    declaring_alternate: Option<Box<MemberMatchRule>>,
    base_alternates: Vec<MemberMatchRule>,
    walk: WalkOutcome,
}

impl Expansion {
    fn accessors(&self) -> impl Iterator<Item = &MethodRc> {
        self.getter.iter().chain(self.setter.iter())
    }

    fn is_accessor(&self, candidate: &MemberRef) -> bool {
        matches!(candidate, MemberRef::Method(_))
            && self
                .accessors()
                .any(|accessor| MemberRef::Method(accessor.clone()) == *candidate)
    }
}

/// Decides whether a referenced member is equivalent to a target member
#[derive(Debug)]
pub struct MemberMatchRule {
    target: MemberRef,
    config: MatchConfig,
    /// Alternates built by an expansion do not expand further
    expand: bool,
    expansion: OnceLock<Expansion>,
}

impl MemberMatchRule {
    /// Create a rule for `target`
    pub fn new(target: MemberRef, config: MatchConfig) -> Self {
        MemberMatchRule {
            target,
            config,
            expand: true,
            expansion: OnceLock::new(),
        }
    }

    /// Create a rule that only matches the target itself and its property accessors
    pub fn exact(target: MemberRef) -> Self {
        Self::new(target, MatchConfig::exact())
    }

    fn alternate(target: MemberRef) -> Self {
        MemberMatchRule {
            expand: false,
            ..Self::exact(target)
        }
    }

    /// The target member
    pub fn target(&self) -> &MemberRef {
        &self.target
    }

    /// The configuration this rule was built with
    pub fn config(&self) -> MatchConfig {
        self.config
    }

    /// Returns true if `candidate` denotes the same member as the target.
    ///
    /// The first call computes the rule's expansion with `resolver`; later calls reuse it.
    pub fn matches(&self, candidate: &MemberRef, resolver: &dyn MetadataResolver) -> bool {
        if *candidate == self.target {
            return true;
        }

        let expansion = self.expansion(resolver);
        if expansion.is_accessor(candidate) {
            return true;
        }

        if !self.expand {
            return false;
        }

        if expansion
            .declaring_alternate
            .as_ref()
            .is_some_and(|alternate| alternate.matches(candidate, resolver))
        {
            return true;
        }

        if expansion
            .base_alternates
            .iter()
            .any(|alternate| alternate.matches(candidate, resolver))
        {
            return true;
        }

        self.config.match_base_class_members
            && !expansion.is_static
            && self.is_hidden_by(candidate, expansion)
    }

    /// How the base class walk went. Forces the expansion.
    pub fn walk_outcome(&self, resolver: &dyn MetadataResolver) -> WalkOutcome {
        self.expansion(resolver).walk
    }

    /// The get and set accessors of a property-shaped target. Forces the expansion.
    pub fn accessors(
        &self,
        resolver: &dyn MetadataResolver,
    ) -> (Option<&MethodRc>, Option<&MethodRc>) {
        let expansion = self.expansion(resolver);
        (expansion.getter.as_ref(), expansion.setter.as_ref())
    }

    /// Targets of the base class alternates. Forces the expansion.
    pub fn base_alternates(&self, resolver: &dyn MetadataResolver) -> Vec<&MemberRef> {
        self.expansion(resolver)
            .base_alternates
            .iter()
            .map(MemberMatchRule::target)
            .collect()
    }

    /// Target of the declaring type alternate. Forces the expansion.
    pub fn declaring_alternate(&self, resolver: &dyn MetadataResolver) -> Option<&MemberRef> {
        self.expansion(resolver)
            .declaring_alternate
            .as_deref()
            .map(MemberMatchRule::target)
    }

    fn expansion(&self, resolver: &dyn MetadataResolver) -> &Expansion {
        self.expansion.get_or_init(|| self.expand_with(resolver))
    }

    fn expand_with(&self, resolver: &dyn MetadataResolver) -> Expansion {
        let is_static = self.target.is_static();
        let (getter, setter) = self.property_accessors();

        let mut expansion = Expansion {
            is_static,
            getter,
            setter,
            declaring_alternate: None,
            base_alternates: Vec::new(),
            walk: WalkOutcome::NotRequested,
        };

        if !self.expand || is_static {
            return expansion;
        }

        if self.config.match_declaring_type_member {
            expansion.declaring_alternate = self.declaring_type_alternate().map(Box::new);
        }

        if self.config.match_base_class_members {
            let (alternates, walk) = self.collect_base_alternates(resolver);
            expansion.base_alternates = alternates;
            expansion.walk = walk;
        }

        expansion
    }

    /// Accessors of a property target, or of the property a method target belongs to
    fn property_accessors(&self) -> (Option<MethodRc>, Option<MethodRc>) {
        match &self.target {
            MemberRef::Property(property) => (property.getter.clone(), property.setter.clone()),
            MemberRef::Method(method) => {
                let Some(declaring) = method.declaring_type.upgrade() else {
                    return (None, None);
                };

                let Some(property) = declaring
                    .properties
                    .iter()
                    .map(|(_, property)| property)
                    .find(|property| property.has_accessor(method))
                else {
                    return (None, None);
                };

                match method.reflected_type.upgrade() {
                    Some(reflected) if reflected.token != declaring.token => {
                        let reflected = property.reflected_through(&reflected);
                        (reflected.getter.clone(), reflected.setter.clone())
                    }
                    _ => (property.getter.clone(), property.setter.clone()),
                }
            }
            _ => (None, None),
        }
    }

    /// The target as obtained through its declaring type, if it was reflected elsewhere
    fn declaring_type_alternate(&self) -> Option<MemberMatchRule> {
        let declaring = self.target.declaring_type()?;
        let reflected = self.target.reflected_type()?;
        if declaring.token == reflected.token {
            return None;
        }

        Some(MemberMatchRule::alternate(
            self.target.reflected_through(&declaring),
        ))
    }

    fn collect_base_alternates(
        &self,
        resolver: &dyn MetadataResolver,
    ) -> (Vec<MemberMatchRule>, WalkOutcome) {
        let Some(declaring) = self.target.declaring_type() else {
            return (Vec::new(), WalkOutcome::NotRequested);
        };

        let mut seen = HashSet::new();
        seen.insert(self.target.identity());

        let mut alternates = Vec::new();
        let mut failures = 0;
        for ancestor in declaring.ancestors().take(self.config.max_ancestor_depth) {
            let members = match resolver.members_named(&ancestor, self.target.name()) {
                Ok(members) => members,
                Err(error) => {
                    failures += 1;
                    log::debug!(
                        "skipping {} while collecting base members of {:?}: {}",
                        ancestor.fullname(),
                        self.target,
                        error
                    );
                    continue;
                }
            };

            for member in members {
                if same_signature(&self.target, &member) && seen.insert(member.identity()) {
                    alternates.push(MemberMatchRule::alternate(member));
                }
            }
        }

        let walk = if failures == 0 {
            WalkOutcome::Complete
        } else {
            WalkOutcome::Partial { failures }
        };

        (alternates, walk)
    }

    /// The candidate is declared on a type derived from the declaring type of the target (or
    /// of one of its accessors) and has the same name and shape
    fn is_hidden_by(&self, candidate: &MemberRef, expansion: &Expansion) -> bool {
        let Some(candidate_type) = candidate.declaring_type() else {
            return false;
        };

        let hides = |hidden: &MemberRef| {
            same_signature(hidden, candidate)
                && hidden
                    .declaring_type()
                    .is_some_and(|hidden_type| derives_from(&candidate_type, &hidden_type))
        };

        hides(&self.target)
            || expansion
                .accessors()
                .any(|accessor| hides(&MemberRef::Method(accessor.clone())))
    }
}

fn derives_from(ty: &TypeRc, ancestor: &TypeRc) -> bool {
    ty.is_subclass_of(ancestor)
}

/// Same kind and name; methods also need the same parameter names and types
fn same_signature(left: &MemberRef, right: &MemberRef) -> bool {
    if left.kind() != right.kind() || left.name() != right.name() {
        return false;
    }

    match (left, right) {
        (MemberRef::Method(left), MemberRef::Method(right)) => left.same_shape(right),
        _ => true,
    }
}
