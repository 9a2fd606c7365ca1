//! Method attribute flags and the local/parameter descriptors a method body refers to.
//!
//! # Key Types
//! - [`MethodModifiers`]: Attribute flags relevant for decoding and member matching
//! - [`LocalVariable`], [`ParamDesc`]: Slot descriptors resolved by the decoder

use bitflags::bitflags;

use crate::metadata::typesystem::TypeRef;

/// Bitmask for `ACCESS` state extraction
pub const METHOD_ACCESS_MASK: u32 = 0x0007;
/// Bitmask for `VTABLE_LAYOUT` information extraction
pub const METHOD_VTABLE_LAYOUT_MASK: u32 = 0x0100;

bitflags! {
    #[derive(PartialEq, Eq, Clone, Copy, Debug, Default)]
    /// Method modifiers and properties
    pub struct MethodModifiers: u32 {
        /// Defined on type, else per instance
        const STATIC = 0x0010;
        /// Method cannot be overridden
        const FINAL = 0x0020;
        /// Method is virtual
        const VIRTUAL = 0x0040;
        /// Method hides by name+sig, else just by name
        const HIDE_BY_SIG = 0x0080;
        /// Method does not provide an implementation
        const ABSTRACT = 0x0400;
        /// Method is special (property and event accessors)
        const SPECIAL_NAME = 0x0800;
        /// CLI provides 'special' behavior, depending upon the name of the method
        const RTSPECIAL_NAME = 0x1000;
    }
}

impl MethodModifiers {
    /// Extract method modifiers from raw method attributes
    #[must_use]
    pub fn from_method_flags(flags: u32) -> Self {
        let modifiers = flags & !METHOD_ACCESS_MASK & !METHOD_VTABLE_LAYOUT_MASK;
        Self::from_bits_truncate(modifiers)
    }
}

/// A local variable slot of a method body, as declared by its local signature
#[derive(Clone, Debug)]
pub struct LocalVariable {
    /// Slot index
    pub index: u16,
    /// The declared type of this variable
    pub local_type: TypeRef,
    /// Is passed by reference
    pub is_byref: bool,
    /// This variable is pinned
    pub is_pinned: bool,
}

impl LocalVariable {
    /// Create a plain (not byref, not pinned) local
    pub fn new(index: u16, local_type: TypeRef) -> Self {
        LocalVariable {
            index,
            local_type,
            is_byref: false,
            is_pinned: false,
        }
    }
}

/// A declared parameter of a method. `position` is zero based and does not count `this`.
#[derive(Clone, Debug)]
pub struct ParamDesc {
    /// Zero based position in the declared parameter list
    pub position: u16,
    /// Parameter name
    pub name: String,
    /// The declared type of this parameter
    pub param_type: TypeRef,
    /// Parameter is optional
    pub optional: bool,
}

impl ParamDesc {
    /// Create a required parameter
    pub fn new(position: u16, name: &str, param_type: TypeRef) -> Self {
        ParamDesc {
            position,
            name: name.to_string(),
            param_type,
            optional: false,
        }
    }

    /// Returns true if both parameters have the same name and refer to the same type
    pub fn same_shape(&self, other: &ParamDesc) -> bool {
        self.name == other.name
            && match (self.param_type.token(), other.param_type.token()) {
                (Some(left), Some(right)) => left == right,
                _ => false,
            }
    }
}
