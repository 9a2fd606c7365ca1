//! Field and property descriptors, and the [`MemberRef`] sum type a token resolves to.
//!
//! Member equality is identity based: two references denote the same member when they agree
//! on kind, token, declaring type and reflected type. [`MemberIdentity`] captures exactly that
//! and is what [`MemberRef`] uses for `PartialEq` and hashing.

use std::{fmt, sync::Arc};

use bitflags::bitflags;

use crate::metadata::{
    method::MethodRc,
    token::Token,
    typesystem::{TypeRc, TypeRef},
};

/// Reference to a `FieldDesc`
pub type FieldRc = Arc<FieldDesc>;
/// Reference to a `PropertyDesc`
pub type PropertyRc = Arc<PropertyDesc>;

bitflags! {
    #[derive(PartialEq, Eq, Clone, Copy, Debug, Default)]
    /// Field attribute flags relevant for matching
    pub struct FieldModifiers: u32 {
        /// Defined on type, else per instance
        const STATIC = 0x0010;
        /// Field can only be initialized, not written to after init
        const INIT_ONLY = 0x0020;
        /// Value is compile time constant
        const LITERAL = 0x0040;
    }
}

/// A field declared on a type
#[derive(Debug)]
pub struct FieldDesc {
    /// `Field` or `MemberRef` token
    pub token: Token,
    /// Field name
    pub name: String,
    /// The type that defines this field
    pub declaring_type: TypeRef,
    /// The type this field was obtained through
    pub reflected_type: TypeRef,
    /// Field attribute flags
    pub modifiers: FieldModifiers,
}

impl FieldDesc {
    /// Create a field on `declaring_type` and add it to that type's field list
    pub fn declare(
        declaring_type: &TypeRc,
        token: Token,
        name: &str,
        modifiers: FieldModifiers,
    ) -> FieldRc {
        let field = Arc::new(FieldDesc {
            token,
            name: name.to_string(),
            declaring_type: TypeRef::new(declaring_type),
            reflected_type: TypeRef::new(declaring_type),
            modifiers,
        });

        declaring_type.fields.push(field.clone());
        field
    }

    /// A copy of this field as obtained through `reflected`
    pub fn reflected_through(&self, reflected: &TypeRc) -> FieldRc {
        Arc::new(FieldDesc {
            token: self.token,
            name: self.name.clone(),
            declaring_type: self.declaring_type.clone(),
            reflected_type: TypeRef::new(reflected),
            modifiers: self.modifiers,
        })
    }

    /// Returns true if this field is static
    pub fn is_static(&self) -> bool {
        self.modifiers.contains(FieldModifiers::STATIC)
    }
}

/// A property declared on a type, with its optional accessors
#[derive(Debug)]
pub struct PropertyDesc {
    /// `Property` token
    pub token: Token,
    /// Property name
    pub name: String,
    /// The type that defines this property
    pub declaring_type: TypeRef,
    /// The type this property was obtained through
    pub reflected_type: TypeRef,
    /// The `get_` accessor
    pub getter: Option<MethodRc>,
    /// The `set_` accessor
    pub setter: Option<MethodRc>,
}

impl PropertyDesc {
    /// Create a property on `declaring_type` and add it to that type's property list
    pub fn declare(
        declaring_type: &TypeRc,
        token: Token,
        name: &str,
        getter: Option<MethodRc>,
        setter: Option<MethodRc>,
    ) -> PropertyRc {
        let property = Arc::new(PropertyDesc {
            token,
            name: name.to_string(),
            declaring_type: TypeRef::new(declaring_type),
            reflected_type: TypeRef::new(declaring_type),
            getter,
            setter,
        });

        declaring_type.properties.push(property.clone());
        property
    }

    /// A copy of this property, and of its accessors, as obtained through `reflected`
    pub fn reflected_through(&self, reflected: &TypeRc) -> PropertyRc {
        Arc::new(PropertyDesc {
            token: self.token,
            name: self.name.clone(),
            declaring_type: self.declaring_type.clone(),
            reflected_type: TypeRef::new(reflected),
            getter: self.getter.as_ref().map(|m| m.reflected_through(reflected)),
            setter: self.setter.as_ref().map(|m| m.reflected_through(reflected)),
        })
    }

    /// A property is static when any of its accessors is
    pub fn is_static(&self) -> bool {
        self.getter.iter().chain(self.setter.iter()).any(|m| m.is_static())
    }

    /// Returns true if `method` is this property's getter or setter
    pub fn has_accessor(&self, method: &crate::metadata::method::MethodDesc) -> bool {
        self.getter
            .iter()
            .chain(self.setter.iter())
            .any(|accessor| accessor.same_definition(method))
    }
}

/// The kind of a [`MemberRef`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum MemberKind {
    /// A field
    Field,
    /// A method or constructor
    Method,
    /// A property
    Property,
    /// A type
    Type,
    /// Anything the resolver could not classify
    Unknown,
}

/// What a metadata token resolves to
#[derive(Clone)]
pub enum MemberRef {
    /// A field
    Field(FieldRc),
    /// A method or constructor
    Method(MethodRc),
    /// A property
    Property(PropertyRc),
    /// A type
    Type(TypeRc),
    /// The resolver returned something that is neither of the above
    Unknown(Token),
}

/// The identity of a member: kind, token, declaring type and reflected type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemberIdentity {
    /// Member kind
    pub kind: MemberKind,
    /// Member token
    pub token: Token,
    /// Token of the declaring type, if any and still alive
    pub declaring_type: Option<Token>,
    /// Token of the reflected type, if any and still alive
    pub reflected_type: Option<Token>,
}

impl MemberRef {
    /// The kind of this member
    pub fn kind(&self) -> MemberKind {
        match self {
            MemberRef::Field(_) => MemberKind::Field,
            MemberRef::Method(_) => MemberKind::Method,
            MemberRef::Property(_) => MemberKind::Property,
            MemberRef::Type(_) => MemberKind::Type,
            MemberRef::Unknown(_) => MemberKind::Unknown,
        }
    }

    /// The metadata token of this member
    pub fn token(&self) -> Token {
        match self {
            MemberRef::Field(field) => field.token,
            MemberRef::Method(method) => method.token,
            MemberRef::Property(property) => property.token,
            MemberRef::Type(ty) => ty.token,
            MemberRef::Unknown(token) => *token,
        }
    }

    /// The simple name of this member
    pub fn name(&self) -> &str {
        match self {
            MemberRef::Field(field) => &field.name,
            MemberRef::Method(method) => &method.name,
            MemberRef::Property(property) => &property.name,
            MemberRef::Type(ty) => &ty.name,
            MemberRef::Unknown(_) => "",
        }
    }

    /// The type that defines this member. `None` for types and unknown members.
    pub fn declaring_type(&self) -> Option<TypeRc> {
        match self {
            MemberRef::Field(field) => field.declaring_type.upgrade(),
            MemberRef::Method(method) => method.declaring_type.upgrade(),
            MemberRef::Property(property) => property.declaring_type.upgrade(),
            MemberRef::Type(_) | MemberRef::Unknown(_) => None,
        }
    }

    /// The type this member was obtained through. `None` for types and unknown members.
    pub fn reflected_type(&self) -> Option<TypeRc> {
        match self {
            MemberRef::Field(field) => field.reflected_type.upgrade(),
            MemberRef::Method(method) => method.reflected_type.upgrade(),
            MemberRef::Property(property) => property.reflected_type.upgrade(),
            MemberRef::Type(_) | MemberRef::Unknown(_) => None,
        }
    }

    /// Returns true for static fields, methods and properties
    pub fn is_static(&self) -> bool {
        match self {
            MemberRef::Field(field) => field.is_static(),
            MemberRef::Method(method) => method.is_static(),
            MemberRef::Property(property) => property.is_static(),
            MemberRef::Type(_) | MemberRef::Unknown(_) => false,
        }
    }

    /// The identity used for equality and deduplication
    pub fn identity(&self) -> MemberIdentity {
        let (declaring_type, reflected_type) = match self {
            MemberRef::Field(field) => (field.declaring_type.token(), field.reflected_type.token()),
            MemberRef::Method(method) => {
                (method.declaring_type.token(), method.reflected_type.token())
            }
            MemberRef::Property(property) => (
                property.declaring_type.token(),
                property.reflected_type.token(),
            ),
            MemberRef::Type(_) | MemberRef::Unknown(_) => (None, None),
        };

        MemberIdentity {
            kind: self.kind(),
            token: self.token(),
            declaring_type,
            reflected_type,
        }
    }

    /// This member as obtained through `reflected`. Types and unknown members are returned
    /// unchanged.
    #[must_use]
    pub fn reflected_through(&self, reflected: &TypeRc) -> MemberRef {
        match self {
            MemberRef::Field(field) => MemberRef::Field(field.reflected_through(reflected)),
            MemberRef::Method(method) => MemberRef::Method(method.reflected_through(reflected)),
            MemberRef::Property(property) => {
                MemberRef::Property(property.reflected_through(reflected))
            }
            MemberRef::Type(_) | MemberRef::Unknown(_) => self.clone(),
        }
    }

    /// Returns the method if this is a method reference
    pub fn as_method(&self) -> Option<&MethodRc> {
        match self {
            MemberRef::Method(method) => Some(method),
            _ => None,
        }
    }

    /// Returns the property if this is a property reference
    pub fn as_property(&self) -> Option<&PropertyRc> {
        match self {
            MemberRef::Property(property) => Some(property),
            _ => None,
        }
    }
}

impl PartialEq for MemberRef {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}

impl Eq for MemberRef {}

impl std::hash::Hash for MemberRef {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.identity().hash(state);
    }
}

impl fmt::Debug for MemberRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.declaring_type() {
            Some(ty) => write!(
                f,
                "{}({}::{}, {})",
                self.kind(),
                ty.fullname(),
                self.name(),
                self.token()
            ),
            None => write!(f, "{}({}, {})", self.kind(), self.name(), self.token()),
        }
    }
}

impl From<FieldRc> for MemberRef {
    fn from(value: FieldRc) -> Self {
        MemberRef::Field(value)
    }
}

impl From<MethodRc> for MemberRef {
    fn from(value: MethodRc) -> Self {
        MemberRef::Method(value)
    }
}

impl From<PropertyRc> for MemberRef {
    fn from(value: PropertyRc) -> Self {
        MemberRef::Property(value)
    }
}

impl From<TypeRc> for MemberRef {
    fn from(value: TypeRc) -> Self {
        MemberRef::Type(value)
    }
}
