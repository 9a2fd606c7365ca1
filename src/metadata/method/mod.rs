//! Method descriptors and the per-body decoding context.
//!
//! # Key Components
//! - [`MethodDesc`] - A method with its declaring/reflected type, modifiers and parameters
//! - [`MethodBodyContext`] - Everything the decoder needs besides the opcode tables
//! - [`types`] - Modifier flags and slot descriptors

mod body;
mod types;

pub use body::*;
pub use types::*;

use std::sync::Arc;

use crate::metadata::{
    token::Token,
    typesystem::{TypeRc, TypeRef},
};

/// Reference to a `MethodDesc`
pub type MethodRc = Arc<MethodDesc>;

/// A method as seen from a method body or from a member lookup.
///
/// `declaring_type` is the type whose metadata defines the method, `reflected_type` the type
/// through which it was obtained. They only differ for inherited members looked up through a
/// derived type (see [`MethodDesc::reflected_through`]).
#[derive(Debug)]
pub struct MethodDesc {
    /// `MethodDef` or `MemberRef` token
    pub token: Token,
    /// Method name
    pub name: String,
    /// The type that defines this method
    pub declaring_type: TypeRef,
    /// The type this method was obtained through
    pub reflected_type: TypeRef,
    /// Method attribute flags
    pub modifiers: MethodModifiers,
    /// Declared parameters, without `this`
    pub params: Vec<ParamDesc>,
}

impl MethodDesc {
    /// Create a method on `declaring_type` and add it to that type's method list
    pub fn declare(
        declaring_type: &TypeRc,
        token: Token,
        name: &str,
        modifiers: MethodModifiers,
        params: Vec<ParamDesc>,
    ) -> MethodRc {
        let method = Arc::new(MethodDesc {
            token,
            name: name.to_string(),
            declaring_type: TypeRef::new(declaring_type),
            reflected_type: TypeRef::new(declaring_type),
            modifiers,
            params,
        });

        declaring_type.methods.push(method.clone());
        method
    }

    /// A copy of this method as obtained through `reflected`
    pub fn reflected_through(&self, reflected: &TypeRc) -> MethodRc {
        Arc::new(MethodDesc {
            token: self.token,
            name: self.name.clone(),
            declaring_type: self.declaring_type.clone(),
            reflected_type: TypeRef::new(reflected),
            modifiers: self.modifiers,
            params: self.params.clone(),
        })
    }

    /// Returns true if this method is static
    pub fn is_static(&self) -> bool {
        self.modifiers.contains(MethodModifiers::STATIC)
    }

    /// Returns true if this method is virtual
    pub fn is_virtual(&self) -> bool {
        self.modifiers.contains(MethodModifiers::VIRTUAL)
    }

    /// Returns true if both methods declare the same parameter names and types, in order
    pub fn same_shape(&self, other: &MethodDesc) -> bool {
        self.params.len() == other.params.len()
            && self
                .params
                .iter()
                .zip(other.params.iter())
                .all(|(left, right)| left.same_shape(right))
    }

    /// Returns true if this is the same method (token and declaring type), regardless of
    /// the type it was reflected through
    pub fn same_definition(&self, other: &MethodDesc) -> bool {
        self.token == other.token && self.declaring_type.token() == other.declaring_type.token()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::typesystem::TypeDesc;

    #[test]
    fn declare_registers_on_type() {
        let ty = TypeDesc::new(Token::new(0x0200_0002), "App", "Service", 0);
        let method = MethodDesc::declare(
            &ty,
            Token::new(0x0600_0001),
            "Run",
            MethodModifiers::VIRTUAL,
            Vec::new(),
        );

        assert_eq!(ty.methods.count(), 1);
        assert_eq!(method.declaring_type.token(), Some(ty.token));
        assert_eq!(method.reflected_type.token(), Some(ty.token));
        assert!(method.is_virtual());
        assert!(!method.is_static());
    }

    #[test]
    fn reflected_copy_keeps_definition() {
        let base = TypeDesc::new(Token::new(0x0200_0002), "App", "Base", 0);
        let derived = TypeDesc::new(Token::new(0x0200_0003), "App", "Derived", 0);
        let method = MethodDesc::declare(
            &base,
            Token::new(0x0600_0001),
            "Run",
            MethodModifiers::empty(),
            Vec::new(),
        );

        let reflected = method.reflected_through(&derived);
        assert_eq!(reflected.reflected_type.token(), Some(derived.token));
        assert_eq!(reflected.declaring_type.token(), Some(base.token));
        assert!(reflected.same_definition(&method));
        assert_eq!(base.methods.count(), 1);
    }

    #[test]
    fn shape_compares_parameters() {
        let ty = TypeDesc::new(Token::new(0x0200_0002), "App", "Service", 0);
        let int32 = TypeDesc::new(Token::new(0x0100_0008), "System", "Int32", 0);

        let one = MethodDesc::declare(
            &ty,
            Token::new(0x0600_0001),
            "Run",
            MethodModifiers::empty(),
            vec![ParamDesc::new(0, "count", TypeRef::new(&int32))],
        );
        let none = MethodDesc::declare(
            &ty,
            Token::new(0x0600_0002),
            "Run",
            MethodModifiers::empty(),
            Vec::new(),
        );

        assert!(one.same_shape(&one));
        assert!(!one.same_shape(&none));
    }
}
