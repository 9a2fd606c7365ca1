//! Resolution of `constrained.` virtual calls.
//!
//! A `constrained. T callvirt M` sequence dispatches `M` on the constraining type `T`. When `T`
//! implements `M` itself (directly or as an explicit interface implementation) or inherits an
//! implementation from one of its base types, the call actually lands there. Searches for a
//! member therefore have to consider the override as well as the token in the instruction.
//!
//! Only name and parameter shape are compared. A derived member declared with `new` that
//! hides the intended override is not distinguished from a real override.

use crate::{
    metadata::{
        member::MemberRef,
        method::{MethodDesc, MethodRc},
        resolver::MetadataResolver,
        typesystem::TypeRc,
    },
    Result,
};

/// Find the method that a constrained call to `method` on `constraint` dispatches to.
///
/// The constraining type is searched first, then its base types from nearest to farthest.
/// Within one type a method with the same name (or an explicit implementation whose name
/// ends in `.{name}`) and the same parameter shape wins; failing that, the first method with
/// a matching name is taken.
///
/// # Errors
/// Returns the resolver's error if member enumeration fails on any of the searched types.
pub fn resolve_constrained_call(
    constraint: &TypeRc,
    method: &MethodDesc,
    resolver: &dyn MetadataResolver,
) -> Result<Option<MethodRc>> {
    for ty in std::iter::once(constraint.clone()).chain(constraint.ancestors()) {
        if let Some(found) = find_implementation(&ty, method, resolver)? {
            return Ok(Some(found));
        }
    }

    Ok(None)
}

fn find_implementation(
    ty: &TypeRc,
    method: &MethodDesc,
    resolver: &dyn MetadataResolver,
) -> Result<Option<MethodRc>> {
    let explicit_suffix = format!(".{}", method.name);

    let mut candidates: Vec<MethodRc> = resolver
        .members_named(ty, &method.name)?
        .into_iter()
        .filter_map(|member| match member {
            MemberRef::Method(candidate) => Some(candidate),
            _ => None,
        })
        .collect();

    candidates.extend(
        ty.methods
            .iter()
            .map(|(_, candidate)| candidate)
            .filter(|candidate| candidate.name.ends_with(&explicit_suffix))
            .cloned(),
    );

    let shaped = candidates
        .iter()
        .position(|candidate| candidate.same_shape(method));

    Ok(match shaped {
        Some(index) => Some(candidates.swap_remove(index)),
        None => candidates.into_iter().next(),
    })
}
