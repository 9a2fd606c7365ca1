//! Type descriptors the decoder and the member matcher reason about.
//!
//! This is deliberately a thin model: a type knows its token, its name, its base type and
//! the members declared on it. Everything else about the host's type system stays behind the
//! [`crate::metadata::MetadataResolver`] capability.
//!
//! # Ownership
//!
//! Types own their members through `Arc`, members point back at their declaring and reflected
//! types through [`TypeRef`] (a weak reference), and a type points at its base through a
//! [`TypeRef`] as well. Descriptor graphs therefore never form strong reference cycles; the
//! host keeps its types alive (for example in a [`crate::metadata::MemoryResolver`]).
//!
//! # Examples
//!
//! ```rust
//! use cilreader::metadata::{token::Token, TypeDesc};
//!
//! let object = TypeDesc::new(Token::new(0x0100_0001), "System", "Object", 0);
//! let service = TypeDesc::new(Token::new(0x0200_0002), "App", "Service", 0);
//! service.set_base(&object)?;
//!
//! assert_eq!(service.fullname(), "App.Service");
//! assert!(service.is_subclass_of(&object));
//! # Ok::<(), cilreader::Error>(())
//! ```

use std::{
    fmt,
    sync::{Arc, OnceLock, Weak},
};

use crate::{
    metadata::{
        member::{FieldRc, MemberRef, PropertyRc},
        method::MethodRc,
        token::Token,
    },
    Result,
};

/// Reference to a `TypeDesc`
pub type TypeRc = Arc<TypeDesc>;
/// A list of fields declared on a type
pub type FieldList = Arc<boxcar::Vec<FieldRc>>;
/// A list of methods declared on a type
pub type MethodList = Arc<boxcar::Vec<MethodRc>>;
/// A list of properties declared on a type
pub type PropertyList = Arc<boxcar::Vec<PropertyRc>>;

/// Upper bound for walking a base-type chain.
///
/// `set_base` rejects direct cycles, but hosts can build very deep (or, through
/// reflected copies, effectively cyclic) chains. Walks stop here.
pub const MAX_HIERARCHY_DEPTH: usize = 256;

/// A smart reference to a `TypeDesc` that holds a weak reference to prevent circular
/// reference memory leaks.
#[derive(Clone, Debug)]
pub struct TypeRef {
    weak_ref: Weak<TypeDesc>,
}

impl TypeRef {
    /// Create a new `TypeRef` from a strong reference
    pub fn new(strong_ref: &TypeRc) -> Self {
        Self {
            weak_ref: Arc::downgrade(strong_ref),
        }
    }

    /// Get a strong reference to the type, returning None if the type has been dropped
    #[must_use]
    pub fn upgrade(&self) -> Option<TypeRc> {
        self.weak_ref.upgrade()
    }

    /// Check if the referenced type is still alive
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.weak_ref.strong_count() > 0
    }

    /// Get the token of the referenced type (if still alive)
    #[must_use]
    pub fn token(&self) -> Option<Token> {
        self.upgrade().map(|t| t.token)
    }

    /// Get the name of the referenced type (if still alive)
    #[must_use]
    pub fn name(&self) -> Option<String> {
        self.upgrade().map(|t| t.name.clone())
    }
}

impl From<&TypeRc> for TypeRef {
    fn from(value: &TypeRc) -> Self {
        TypeRef::new(value)
    }
}

/// A type as seen by the decoder: identity, name, base type and declared members.
pub struct TypeDesc {
    /// Token of the `TypeDef`, `TypeRef` or `TypeSpec` row
    pub token: Token,
    /// `TypeNamespace` (can be empty)
    pub namespace: String,
    /// `TypeName`
    pub name: String,
    /// Raw `TypeAttributes` flags
    pub flags: u32,
    /// This type's base aka 'extends'
    base: OnceLock<TypeRef>,
    /// All fields this type declares
    pub fields: FieldList,
    /// All methods this type declares
    pub methods: MethodList,
    /// All properties this type declares
    pub properties: PropertyList,
}

impl TypeDesc {
    /// `TypeAttributes.Interface`
    pub const INTERFACE: u32 = 0x0000_0020;

    /// Create a new type without a base type and without members
    pub fn new(token: Token, namespace: &str, name: &str, flags: u32) -> TypeRc {
        Arc::new(TypeDesc {
            token,
            namespace: namespace.to_string(),
            name: name.to_string(),
            flags,
            base: OnceLock::new(),
            fields: Arc::new(boxcar::Vec::new()),
            methods: Arc::new(boxcar::Vec::new()),
            properties: Arc::new(boxcar::Vec::new()),
        })
    }

    /// Set the base type. Can only be done once.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if a base type was already set, or if `base`
    /// is this type or one of its descendants.
    pub fn set_base(&self, base: &TypeRc) -> Result<()> {
        if base.token == self.token || base.ancestors().any(|a| a.token == self.token) {
            return Err(malformed_error!(
                "Setting {} as base of {} creates a cycle",
                base.fullname(),
                self.fullname()
            ));
        }

        self.base
            .set(TypeRef::new(base))
            .map_err(|_| malformed_error!("Base of {} is already set", self.fullname()))
    }

    /// Access the base type of this type, if it exists
    pub fn base(&self) -> Option<TypeRc> {
        self.base.get().and_then(TypeRef::upgrade)
    }

    /// Iterate over the strict ancestors of this type, nearest first
    pub fn ancestors(&self) -> Ancestors {
        Ancestors {
            next: self.base(),
            depth: 0,
        }
    }

    /// Returns true if `other` appears in this type's ancestor chain
    pub fn is_subclass_of(&self, other: &TypeDesc) -> bool {
        self.ancestors().any(|ancestor| ancestor.token == other.token)
    }

    /// Returns true if this type is an interface
    pub fn is_interface(&self) -> bool {
        self.flags & Self::INTERFACE != 0
    }

    /// Returns the full name (Namespace.Name) of the entity
    pub fn fullname(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{0}.{1}", self.namespace, self.name)
        }
    }

    /// All fields, methods and properties declared on this type with the given name
    pub fn members_named(&self, name: &str) -> Vec<MemberRef> {
        let fields = self
            .fields
            .iter()
            .filter(|(_, field)| field.name == name)
            .map(|(_, field)| MemberRef::Field(field.clone()));
        let methods = self
            .methods
            .iter()
            .filter(|(_, method)| method.name == name)
            .map(|(_, method)| MemberRef::Method(method.clone()));
        let properties = self
            .properties
            .iter()
            .filter(|(_, property)| property.name == name)
            .map(|(_, property)| MemberRef::Property(property.clone()));

        fields.chain(methods).chain(properties).collect()
    }
}

impl PartialEq for TypeDesc {
    fn eq(&self, other: &Self) -> bool {
        self.token == other.token
    }
}

impl Eq for TypeDesc {}

impl fmt::Debug for TypeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDesc")
            .field("token", &self.token)
            .field("name", &self.fullname())
            .field("base", &self.base().map(|b| b.fullname()))
            .finish_non_exhaustive()
    }
}

/// Iterator over a type's base chain, see [`TypeDesc::ancestors`]
pub struct Ancestors {
    next: Option<TypeRc>,
    depth: usize,
}

impl Iterator for Ancestors {
    type Item = TypeRc;

    fn next(&mut self) -> Option<Self::Item> {
        if self.depth >= MAX_HIERARCHY_DEPTH {
            return None;
        }

        let current = self.next.take()?;
        self.next = current.base();
        self.depth += 1;
        Some(current)
    }
}
