//! Shared fixtures for unit tests.

use crate::metadata::{
    member::{FieldDesc, FieldModifiers, FieldRc, PropertyDesc, PropertyRc},
    method::{LocalVariable, MethodDesc, MethodModifiers, MethodRc, ParamDesc},
    resolver::MemoryResolver,
    token::Token,
    typesystem::{TypeDesc, TypeRc, TypeRef},
};

// Helper function to create a type and register it with a resolver
pub fn create_type(resolver: &MemoryResolver, token: u32, namespace: &str, name: &str) -> TypeRc {
    let ty = TypeDesc::new(Token::new(token), namespace, name, 0);
    resolver.register_type(&ty);
    ty
}

// Helper function to create an accessor (`get_X` / `set_X`)
pub fn create_accessor(ty: &TypeRc, token: u32, name: &str, params: Vec<ParamDesc>) -> MethodRc {
    MethodDesc::declare(
        ty,
        Token::new(token),
        name,
        MethodModifiers::SPECIAL_NAME | MethodModifiers::HIDE_BY_SIG,
        params,
    )
}

/// A small hierarchy `Object <- Base <- Derived`, registered with a resolver.
///
/// - `Base.count` / `Derived.count`: instance fields, the latter hides the former
/// - `Base.Describe(int value)`: virtual, overridden by `Derived.Describe(int value)`
/// - `Base.Add(int left, int right)`: static
/// - `Base.Value`: property with `get_Value` and `set_Value`
/// - `Base.Counter`: static field
pub struct SampleHierarchy {
    pub resolver: MemoryResolver,
    pub object: TypeRc,
    pub int32: TypeRc,
    pub base: TypeRc,
    pub derived: TypeRc,
    pub base_field: FieldRc,
    pub derived_field: FieldRc,
    pub static_field: FieldRc,
    pub describe: MethodRc,
    pub derived_describe: MethodRc,
    pub add: MethodRc,
    pub get_value: MethodRc,
    pub set_value: MethodRc,
    pub value_property: PropertyRc,
    pub locals: Vec<LocalVariable>,
}

pub fn sample_hierarchy() -> SampleHierarchy {
    let resolver = MemoryResolver::new();

    let object = TypeDesc::new(Token::new(0x0100_0001), "System", "Object", 0);
    let int32 = TypeDesc::new(Token::new(0x0100_0002), "System", "Int32", 0);
    let base = TypeDesc::new(Token::new(0x0200_0002), "App", "Base", 0);
    let derived = TypeDesc::new(Token::new(0x0200_0003), "App", "Derived", 0);
    base.set_base(&object).unwrap();
    derived.set_base(&base).unwrap();

    let int_param = |position, name| ParamDesc::new(position, name, TypeRef::new(&int32));

    let base_field = FieldDesc::declare(
        &base,
        Token::new(0x0400_0001),
        "count",
        FieldModifiers::empty(),
    );
    let static_field = FieldDesc::declare(
        &base,
        Token::new(0x0400_0003),
        "Counter",
        FieldModifiers::STATIC,
    );
    let derived_field = FieldDesc::declare(
        &derived,
        Token::new(0x0400_0002),
        "count",
        FieldModifiers::empty(),
    );

    let describe = MethodDesc::declare(
        &base,
        Token::new(0x0600_0001),
        "Describe",
        MethodModifiers::VIRTUAL | MethodModifiers::HIDE_BY_SIG,
        vec![int_param(0, "value")],
    );
    let add = MethodDesc::declare(
        &base,
        Token::new(0x0600_0002),
        "Add",
        MethodModifiers::STATIC,
        vec![int_param(0, "left"), int_param(1, "right")],
    );
    let get_value = create_accessor(&base, 0x0600_0003, "get_Value", Vec::new());
    let set_value = create_accessor(&base, 0x0600_0004, "set_Value", vec![int_param(0, "value")]);
    let derived_describe = MethodDesc::declare(
        &derived,
        Token::new(0x0600_0005),
        "Describe",
        MethodModifiers::VIRTUAL | MethodModifiers::HIDE_BY_SIG,
        vec![int_param(0, "value")],
    );

    let value_property = PropertyDesc::declare(
        &base,
        Token::new(0x1700_0001),
        "Value",
        Some(get_value.clone()),
        Some(set_value.clone()),
    );

    for ty in [&object, &int32, &base, &derived] {
        resolver.register_type(ty);
    }
    resolver.add_string(Token::new(0x7000_0001), "hello");
    resolver.add_signature(Token::new(0x1100_0001), &[0x00, 0x00, 0x01]);

    let locals = vec![
        LocalVariable::new(0, TypeRef::new(&int32)),
        LocalVariable::new(1, TypeRef::new(&int32)),
    ];

    SampleHierarchy {
        resolver,
        object,
        int32,
        base,
        derived,
        base_field,
        derived_field,
        static_field,
        describe,
        derived_describe,
        add,
        get_value,
        set_value,
        value_property,
        locals,
    }
}
