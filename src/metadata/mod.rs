//! Metadata model the decoder and the member matcher work against.
//!
//! # Key Components
//!
//! - [`token`] - Metadata table row references used throughout .NET
//! - [`typesystem`] - Type descriptors with base-type links and declared members
//! - [`method`] - Method descriptors, slot descriptors and the per-body decoding context
//! - [`member`] - Field and property descriptors and the [`MemberRef`] sum type
//! - [`resolver`] - The injected [`MetadataResolver`] capability and [`MemoryResolver`]

/// Field and property descriptors, member identity
pub mod member;
/// Method descriptors and the method body context
pub mod method;
/// Token resolution capability
pub mod resolver;
/// Commonly used metadata token type
pub mod token;
/// Type descriptors
pub mod typesystem;

pub use member::{
    FieldDesc, FieldModifiers, FieldRc, MemberIdentity, MemberKind, MemberRef, PropertyDesc,
    PropertyRc,
};
pub use method::{
    LocalVariable, MethodBodyContext, MethodDesc, MethodModifiers, MethodRc, ParamDesc,
};
pub use resolver::{MemoryResolver, MetadataResolver};
pub use typesystem::{TypeDesc, TypeRc, TypeRef};
