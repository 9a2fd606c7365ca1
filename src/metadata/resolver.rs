//! Token resolution capability injected into the decoder and the member matcher.
//!
//! The decoder never interprets metadata tables itself. Every token operand is handed to a
//! [`MetadataResolver`], which answers with a [`MemberRef`], a user string or a signature blob.
//! Hosts backed by a real metadata loader implement the trait directly; [`MemoryResolver`]
//! is a concurrent in-memory implementation for hosts that build descriptors by hand.
//!
//! # Examples
//!
//! ```rust
//! use cilreader::metadata::{token::Token, MemoryResolver, MetadataResolver, TypeDesc};
//!
//! let resolver = MemoryResolver::new();
//! let ty = TypeDesc::new(Token::new(0x0200_0002), "App", "Service", 0);
//! resolver.register_type(&ty);
//! resolver.add_string(Token::new(0x7000_0001), "hello");
//!
//! assert_eq!(resolver.resolve_type(ty.token, &[], &[])?.name, "Service");
//! assert_eq!(resolver.resolve_string(Token::new(0x7000_0001))?, "hello");
//! # Ok::<(), cilreader::Error>(())
//! ```

use dashmap::{DashMap, DashSet};

use crate::{
    metadata::{
        member::{FieldRc, MemberRef},
        method::MethodRc,
        token::Token,
        typesystem::TypeRc,
    },
    Result,
};

/// Resolves metadata tokens found in a method body.
///
/// Implementations must be thread safe: batch decoding shares one resolver across worker
/// threads.
pub trait MetadataResolver: Send + Sync {
    /// Resolve a field, method or type token, substituting the given generic arguments.
    ///
    /// # Errors
    /// Returns [`crate::Error::TokenResolution`] if the token does not denote a known member.
    fn resolve_member(
        &self,
        token: Token,
        type_generic_args: &[TypeRc],
        method_generic_args: &[TypeRc],
    ) -> Result<MemberRef>;

    /// Resolve a user string token (`ldstr`).
    ///
    /// # Errors
    /// Returns [`crate::Error::TokenResolution`] if the string heap has no such entry.
    fn resolve_string(&self, token: Token) -> Result<String>;

    /// Resolve a standalone signature token (`calli`). The decoder copies the returned bytes.
    ///
    /// # Errors
    /// Returns [`crate::Error::TokenResolution`] if there is no such signature.
    fn resolve_signature(&self, token: Token) -> Result<&[u8]>;

    /// All members of `ty` with the given name, declared on `ty` itself.
    ///
    /// # Errors
    /// Hosts may fail here (e.g. a type from an assembly that cannot be loaded).
    fn members_named(&self, ty: &TypeRc, name: &str) -> Result<Vec<MemberRef>> {
        Ok(ty.members_named(name))
    }

    /// Resolve a token that must denote a field.
    ///
    /// # Errors
    /// Returns [`crate::Error::TokenResolution`] if resolution fails or yields another kind.
    fn resolve_field(
        &self,
        token: Token,
        type_generic_args: &[TypeRc],
        method_generic_args: &[TypeRc],
    ) -> Result<FieldRc> {
        match self.resolve_member(token, type_generic_args, method_generic_args)? {
            MemberRef::Field(field) => Ok(field),
            other => Err(token_error!(token, "expected a field, found {}", other.kind())),
        }
    }

    /// Resolve a token that must denote a method.
    ///
    /// # Errors
    /// Returns [`crate::Error::TokenResolution`] if resolution fails or yields another kind.
    fn resolve_method(
        &self,
        token: Token,
        type_generic_args: &[TypeRc],
        method_generic_args: &[TypeRc],
    ) -> Result<MethodRc> {
        match self.resolve_member(token, type_generic_args, method_generic_args)? {
            MemberRef::Method(method) => Ok(method),
            other => Err(token_error!(token, "expected a method, found {}", other.kind())),
        }
    }

    /// Resolve a token that must denote a type.
    ///
    /// # Errors
    /// Returns [`crate::Error::TokenResolution`] if resolution fails or yields another kind.
    fn resolve_type(
        &self,
        token: Token,
        type_generic_args: &[TypeRc],
        method_generic_args: &[TypeRc],
    ) -> Result<TypeRc> {
        match self.resolve_member(token, type_generic_args, method_generic_args)? {
            MemberRef::Type(ty) => Ok(ty),
            other => Err(token_error!(token, "expected a type, found {}", other.kind())),
        }
    }
}

/// In-memory [`MetadataResolver`] keyed by token.
///
/// Registered types are kept alive by the resolver, so descriptors built against it stay
/// valid for as long as the resolver lives. Generic arguments are ignored.
pub struct MemoryResolver {
    types: DashMap<Token, TypeRc>,
    members: DashMap<Token, MemberRef>,
    strings: DashMap<Token, String>,
    signature_index: DashMap<Token, usize>,
    signatures: boxcar::Vec<Vec<u8>>,
    failing_types: DashSet<Token>,
}

impl MemoryResolver {
    /// Create an empty resolver
    pub fn new() -> Self {
        MemoryResolver {
            types: DashMap::new(),
            members: DashMap::new(),
            strings: DashMap::new(),
            signature_index: DashMap::new(),
            signatures: boxcar::Vec::new(),
            failing_types: DashSet::new(),
        }
    }

    /// Register a type together with every field, method and property it currently declares
    pub fn register_type(&self, ty: &TypeRc) {
        self.types.insert(ty.token, ty.clone());
        self.members.insert(ty.token, MemberRef::Type(ty.clone()));

        for (_, field) in ty.fields.iter() {
            self.members.insert(field.token, MemberRef::Field(field.clone()));
        }
        for (_, method) in ty.methods.iter() {
            self.members.insert(method.token, MemberRef::Method(method.clone()));
        }
        for (_, property) in ty.properties.iter() {
            self.members
                .insert(property.token, MemberRef::Property(property.clone()));
        }
    }

    /// Register a single member under its own token
    pub fn add_member(&self, member: MemberRef) {
        self.add_member_as(member.token(), member);
    }

    /// Register a member under a different token (e.g. a `MemberRef` row pointing at a definition)
    pub fn add_member_as(&self, token: Token, member: MemberRef) {
        if let MemberRef::Type(ty) = &member {
            self.types.insert(ty.token, ty.clone());
        }
        self.members.insert(token, member);
    }

    /// Register a user string
    pub fn add_string(&self, token: Token, value: &str) {
        self.strings.insert(token, value.to_string());
    }

    /// Register a standalone signature blob
    pub fn add_signature(&self, token: Token, blob: &[u8]) {
        let index = self.signatures.push(blob.to_vec());
        self.signature_index.insert(token, index);
    }

    /// Make member enumeration on `ty` fail, as a host would for an unloadable type
    pub fn fail_members_of(&self, ty: &TypeRc) {
        self.failing_types.insert(ty.token);
    }

    /// Look up a registered type
    pub fn get_type(&self, token: &Token) -> Option<TypeRc> {
        self.types.get(token).map(|entry| entry.value().clone())
    }

    /// Number of registered members (types included)
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns true if nothing has been registered
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl Default for MemoryResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataResolver for MemoryResolver {
    fn resolve_member(
        &self,
        token: Token,
        _type_generic_args: &[TypeRc],
        _method_generic_args: &[TypeRc],
    ) -> Result<MemberRef> {
        self.members
            .get(&token)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| token_error!(token, "no member registered"))
    }

    fn resolve_string(&self, token: Token) -> Result<String> {
        self.strings
            .get(&token)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| token_error!(token, "no string registered"))
    }

    fn resolve_signature(&self, token: Token) -> Result<&[u8]> {
        let index = self
            .signature_index
            .get(&token)
            .map(|entry| *entry.value())
            .ok_or_else(|| token_error!(token, "no signature registered"))?;

        self.signatures
            .get(index)
            .map(Vec::as_slice)
            .ok_or_else(|| token_error!(token, "signature index {} out of range", index))
    }

    fn members_named(&self, ty: &TypeRc, name: &str) -> Result<Vec<MemberRef>> {
        if self.failing_types.contains(&ty.token) {
            return Err(token_error!(
                ty.token,
                "member enumeration of {} is unavailable",
                ty.fullname()
            ));
        }

        Ok(ty.members_named(name))
    }
}
