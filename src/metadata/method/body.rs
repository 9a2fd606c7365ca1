//! The caller-owned input of a single method body decode.
//!
//! A [`MethodBodyContext`] bundles the raw CIL bytes with everything needed to give operands
//! meaning: the local and parameter slot descriptors, whether the method has a `this`
//! argument, the generic arguments in scope, and the [`MetadataResolver`] used for tokens.
//!
//! # Examples
//!
//! ```rust
//! use cilreader::{MethodBodyContext, metadata::MemoryResolver};
//!
//! let resolver = MemoryResolver::new();
//! // ldarg.0; ret
//! let ctx = MethodBodyContext::new(&[0x02, 0x2A], &resolver).with_static(false);
//!
//! assert_eq!(ctx.code.len(), 2);
//! assert!(!ctx.is_static);
//! ```

use crate::metadata::{
    method::{LocalVariable, MethodDesc, ParamDesc},
    resolver::MetadataResolver,
    typesystem::TypeRc,
};

/// Per-method input of the decoder. Borrowed data only, cheap to copy into worker threads.
#[derive(Clone, Copy)]
pub struct MethodBodyContext<'a> {
    /// The raw CIL instruction stream (without the method header)
    pub code: &'a [u8],
    /// Local variable slots, ordered by slot index
    pub locals: &'a [LocalVariable],
    /// Declared parameters, ordered by position, without `this`
    pub parameters: &'a [ParamDesc],
    /// Static methods have no `this` in argument slot 0
    pub is_static: bool,
    /// Generic arguments of the declaring type
    pub type_generic_args: &'a [TypeRc],
    /// Generic arguments of the method itself
    pub method_generic_args: &'a [TypeRc],
    /// Token resolution capability
    pub resolver: &'a dyn MetadataResolver,
}

impl<'a> MethodBodyContext<'a> {
    /// Create a context for a static method without locals, parameters or generic arguments
    pub fn new(code: &'a [u8], resolver: &'a dyn MetadataResolver) -> Self {
        MethodBodyContext {
            code,
            locals: &[],
            parameters: &[],
            is_static: true,
            type_generic_args: &[],
            method_generic_args: &[],
            resolver,
        }
    }

    /// Create a context from a method descriptor, taking parameters and the static flag from it
    pub fn for_method(
        method: &'a MethodDesc,
        code: &'a [u8],
        resolver: &'a dyn MetadataResolver,
    ) -> Self {
        MethodBodyContext {
            parameters: &method.params,
            is_static: method.is_static(),
            ..MethodBodyContext::new(code, resolver)
        }
    }

    /// Set the local variable slots
    #[must_use]
    pub fn with_locals(mut self, locals: &'a [LocalVariable]) -> Self {
        self.locals = locals;
        self
    }

    /// Set the declared parameters
    #[must_use]
    pub fn with_parameters(mut self, parameters: &'a [ParamDesc]) -> Self {
        self.parameters = parameters;
        self
    }

    /// Set whether the method is static
    #[must_use]
    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    /// Set the generic arguments of the declaring type and of the method
    #[must_use]
    pub fn with_generic_args(
        mut self,
        type_generic_args: &'a [TypeRc],
        method_generic_args: &'a [TypeRc],
    ) -> Self {
        self.type_generic_args = type_generic_args;
        self.method_generic_args = method_generic_args;
        self
    }
}

impl std::fmt::Debug for MethodBodyContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MethodBodyContext")
            .field("code_len", &self.code.len())
            .field("locals", &self.locals.len())
            .field("parameters", &self.parameters.len())
            .field("is_static", &self.is_static)
            .finish_non_exhaustive()
    }
}
