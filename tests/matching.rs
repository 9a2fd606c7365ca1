//! Member equivalence integration tests.
//!
//! A small model of a UI toolkit is registered with a `MemoryResolver`:
//!
//! ```text
//! Object <- Control <- Button <- IconButton
//! ```
//!
//! - `Control.text` is hidden by `Button.text`
//! - `Control.Render(int depth)` is overridden by `Button.Render(int depth)`
//! - `Control.Title` is a property with `get_Title` / `set_Title`
//! - `Control.Instances` is a static field
//!
//! Each test hand-assembles a method body and runs reference queries against it.

use cilreader::{
    assembly::{references_all, references_any, references_member, search_method_body, SearchMode},
    matching::{resolve_constrained_call, MatchConfig, MemberMatchRule, WalkOutcome},
    metadata::{
        token::Token, FieldDesc, FieldModifiers, FieldRc, MemberRef, MemoryResolver, MethodDesc,
        MethodModifiers, MethodRc, ParamDesc, PropertyDesc, PropertyRc, TypeDesc, TypeRc, TypeRef,
    },
    Error, MethodBodyContext,
};

struct Toolkit {
    resolver: MemoryResolver,
    object: TypeRc,
    control: TypeRc,
    button: TypeRc,
    icon_button: TypeRc,
    control_text: FieldRc,
    button_text: FieldRc,
    instances: FieldRc,
    render: MethodRc,
    button_render: MethodRc,
    get_title: MethodRc,
    set_title: MethodRc,
    title: PropertyRc,
}

fn toolkit() -> Toolkit {
    let resolver = MemoryResolver::new();

    let object = TypeDesc::new(Token::new(0x0100_0001), "System", "Object", 0);
    let int32 = TypeDesc::new(Token::new(0x0100_0002), "System", "Int32", 0);
    let string = TypeDesc::new(Token::new(0x0100_0003), "System", "String", 0);
    let control = TypeDesc::new(Token::new(0x0200_0002), "Ui", "Control", 0);
    let button = TypeDesc::new(Token::new(0x0200_0003), "Ui", "Button", 0);
    let icon_button = TypeDesc::new(Token::new(0x0200_0004), "Ui", "IconButton", 0);
    control.set_base(&object).unwrap();
    button.set_base(&control).unwrap();
    icon_button.set_base(&button).unwrap();

    let control_text = FieldDesc::declare(
        &control,
        Token::new(0x0400_0001),
        "text",
        FieldModifiers::empty(),
    );
    let button_text = FieldDesc::declare(
        &button,
        Token::new(0x0400_0002),
        "text",
        FieldModifiers::empty(),
    );
    let instances = FieldDesc::declare(
        &control,
        Token::new(0x0400_0003),
        "Instances",
        FieldModifiers::STATIC,
    );

    let depth = || vec![ParamDesc::new(0, "depth", TypeRef::new(&int32))];
    let render = MethodDesc::declare(
        &control,
        Token::new(0x0600_0001),
        "Render",
        MethodModifiers::VIRTUAL | MethodModifiers::HIDE_BY_SIG,
        depth(),
    );
    let button_render = MethodDesc::declare(
        &button,
        Token::new(0x0600_0002),
        "Render",
        MethodModifiers::VIRTUAL | MethodModifiers::HIDE_BY_SIG,
        depth(),
    );

    let accessor = MethodModifiers::SPECIAL_NAME | MethodModifiers::HIDE_BY_SIG;
    let get_title = MethodDesc::declare(
        &control,
        Token::new(0x0600_0003),
        "get_Title",
        accessor,
        Vec::new(),
    );
    let set_title = MethodDesc::declare(
        &control,
        Token::new(0x0600_0004),
        "set_Title",
        accessor,
        vec![ParamDesc::new(0, "value", TypeRef::new(&string))],
    );
    let title = PropertyDesc::declare(
        &control,
        Token::new(0x1700_0001),
        "Title",
        Some(get_title.clone()),
        Some(set_title.clone()),
    );

    for ty in [&object, &int32, &string, &control, &button, &icon_button] {
        resolver.register_type(ty);
    }

    Toolkit {
        resolver,
        object,
        control,
        button,
        icon_button,
        control_text,
        button_text,
        instances,
        render,
        button_render,
        get_title,
        set_title,
        title,
    }
}

fn body(instructions: &[(&[u8], Option<Token>)]) -> Vec<u8> {
    let mut code = Vec::new();
    for (opcode, token) in instructions {
        code.extend_from_slice(opcode);
        if let Some(token) = token {
            code.extend_from_slice(&token.value().to_le_bytes());
        }
    }
    code
}

const LDARG_0: &[u8] = &[0x02];
const LDFLD: &[u8] = &[0x7B];
const LDSFLD: &[u8] = &[0x7E];
const CALL: &[u8] = &[0x28];
const CALLVIRT: &[u8] = &[0x6F];
const CONSTRAINED: &[u8] = &[0xFE, 0x16];
const LDC_I4_0: &[u8] = &[0x16];
const LDC_I4_1: &[u8] = &[0x17];
const LDLOCA_0: &[u8] = &[0xFE, 0x0D, 0x00, 0x00];
const POP: &[u8] = &[0x26];
const RET: &[u8] = &[0x2A];

#[test]
fn hidden_field_matches_only_with_base_matching() {
    let Toolkit {
        resolver,
        control_text,
        button_text,
        ..
    } = toolkit();

    let code = body(&[
        (LDARG_0, None),
        (LDFLD, Some(button_text.token)),
        (RET, None),
    ]);
    let ctx = MethodBodyContext::new(&code, &resolver).with_static(false);

    let target = MemberRef::Field(control_text);
    let exact = MemberMatchRule::new(target.clone(), MatchConfig::exact());
    let widened = MemberMatchRule::new(target, MatchConfig::with_base_members());

    assert!(!references_member(&ctx, &exact).unwrap());
    assert!(references_member(&ctx, &widened).unwrap());
}

#[test]
fn base_member_found_through_override() {
    let Toolkit {
        resolver,
        render,
        button_render,
        ..
    } = toolkit();

    // a body that calls the base implementation directly
    let code = body(&[
        (LDARG_0, None),
        (LDC_I4_1, None),
        (CALL, Some(render.token)),
        (RET, None),
    ]);
    let ctx = MethodBodyContext::new(&code, &resolver).with_static(false);

    let rule = MemberMatchRule::new(
        MemberRef::Method(button_render),
        MatchConfig::with_base_members(),
    );
    assert!(references_member(&ctx, &rule).unwrap());
    assert_eq!(rule.walk_outcome(&resolver), WalkOutcome::Complete);
}

#[test]
fn property_and_accessors() {
    let Toolkit {
        resolver,
        get_title,
        set_title,
        title,
        ..
    } = toolkit();

    let code = body(&[
        (LDARG_0, None),
        (CALLVIRT, Some(get_title.token)),
        (POP, None),
        (RET, None),
    ]);
    let ctx = MethodBodyContext::new(&code, &resolver).with_static(false);

    for target in [
        MemberRef::Property(title),
        MemberRef::Method(get_title),
        MemberRef::Method(set_title),
    ] {
        let rule = MemberMatchRule::exact(target);
        assert!(references_member(&ctx, &rule).unwrap());
    }
}

#[test]
fn member_seen_through_derived_type() {
    let Toolkit {
        resolver,
        icon_button,
        render,
        ..
    } = toolkit();

    // The host resolves this call site to Control.Render as seen through IconButton
    let through_icon = MemberRef::Method(render.reflected_through(&icon_button));
    resolver.add_member_as(Token::new(0x0A00_0001), through_icon.clone());

    let via_icon = body(&[
        (LDARG_0, None),
        (LDC_I4_0, None),
        (CALLVIRT, Some(Token::new(0x0A00_0001))),
        (RET, None),
    ]);
    let via_icon_ctx = MethodBodyContext::new(&via_icon, &resolver).with_static(false);

    let direct = body(&[(CALLVIRT, Some(render.token)), (RET, None)]);
    let direct_ctx = MethodBodyContext::new(&direct, &resolver);

    let exact = MemberMatchRule::exact(through_icon.clone());
    assert!(references_member(&via_icon_ctx, &exact).unwrap());
    assert!(!references_member(&direct_ctx, &exact).unwrap());

    let redirected = MemberMatchRule::new(through_icon, MatchConfig::with_declaring_type());
    assert!(references_member(&direct_ctx, &redirected).unwrap());
    assert_eq!(
        redirected.declaring_alternate(&resolver),
        Some(&MemberRef::Method(render))
    );
}

#[test]
fn static_field_is_exact_only() {
    let Toolkit {
        resolver,
        button,
        instances,
        ..
    } = toolkit();

    let shadow = FieldDesc::declare(
        &button,
        Token::new(0x0400_0010),
        "Instances",
        FieldModifiers::STATIC,
    );
    resolver.add_member(MemberRef::Field(shadow.clone()));

    let code = body(&[(LDSFLD, Some(shadow.token)), (POP, None), (RET, None)]);
    let ctx = MethodBodyContext::new(&code, &resolver);

    let rule = MemberMatchRule::new(MemberRef::Field(instances), MatchConfig::comprehensive());
    assert!(!references_member(&ctx, &rule).unwrap());
    assert_eq!(rule.walk_outcome(&resolver), WalkOutcome::NotRequested);
}

#[test]
fn constrained_call_reaches_override() {
    let Toolkit {
        resolver,
        button,
        icon_button,
        render,
        button_render,
        ..
    } = toolkit();

    // IconButton inherits Render from Button
    let resolved = resolve_constrained_call(&icon_button, &render, &resolver)
        .unwrap()
        .unwrap();
    assert_eq!(resolved.token, button_render.token);

    let code = body(&[
        (LDLOCA_0, None),
        (LDC_I4_0, None),
        (CONSTRAINED, Some(icon_button.token)),
        (CALLVIRT, Some(render.token)),
        (RET, None),
    ]);
    let ctx = MethodBodyContext::new(&code, &resolver);

    let rule = MemberMatchRule::exact(MemberRef::Method(button_render));
    assert!(references_member(&ctx, &rule).unwrap());
    assert!(references_member(&ctx, &MemberMatchRule::exact(MemberRef::Type(icon_button))).unwrap());
    assert!(!references_member(&ctx, &MemberMatchRule::exact(MemberRef::Type(button))).unwrap());
}

#[test]
fn failing_ancestor_is_tolerated() {
    let Toolkit {
        resolver,
        object,
        control,
        icon_button,
        control_text,
        ..
    } = toolkit();

    let icon_text = FieldDesc::declare(
        &icon_button,
        Token::new(0x0400_0020),
        "text",
        FieldModifiers::empty(),
    );
    resolver.fail_members_of(&control);
    resolver.fail_members_of(&object);

    let code = body(&[(LDARG_0, None), (LDFLD, Some(control_text.token)), (RET, None)]);
    let ctx = MethodBodyContext::new(&code, &resolver).with_static(false);

    // Control.text is unreachable through the walk, Button.text still is
    let rule = MemberMatchRule::new(MemberRef::Field(icon_text), MatchConfig::with_base_members());
    assert!(!references_member(&ctx, &rule).unwrap());
    assert_eq!(rule.walk_outcome(&resolver), WalkOutcome::Partial { failures: 2 });
    assert_eq!(rule.base_alternates(&resolver).len(), 1);
}

#[test]
fn combinators() {
    let Toolkit {
        resolver,
        control_text,
        instances,
        render,
        get_title,
        ..
    } = toolkit();

    let code = body(&[
        (LDARG_0, None),
        (LDFLD, Some(control_text.token)),
        (POP, None),
        (LDSFLD, Some(instances.token)),
        (POP, None),
        (RET, None),
    ]);
    let ctx = MethodBodyContext::new(&code, &resolver).with_static(false);

    let field_rules = [
        MemberMatchRule::exact(MemberRef::Field(control_text)),
        MemberMatchRule::exact(MemberRef::Field(instances)),
    ];
    let method_rules = [
        MemberMatchRule::exact(MemberRef::Method(render)),
        MemberMatchRule::exact(MemberRef::Method(get_title)),
    ];

    assert!(references_all(&ctx, &field_rules).unwrap());
    assert!(references_any(&ctx, &field_rules).unwrap());
    assert!(!references_any(&ctx, &method_rules).unwrap());
    assert!(!references_all(&ctx, &method_rules).unwrap());
    assert!(matches!(
        search_method_body(&ctx, &field_rules, SearchMode::Single),
        Err(Error::Malformed { .. })
    ));
}

#[test]
fn rules_are_shared_across_threads() {
    let Toolkit {
        resolver,
        control_text,
        button_text,
        ..
    } = toolkit();

    let rule = MemberMatchRule::new(
        MemberRef::Field(control_text),
        MatchConfig::with_base_members(),
    );
    let code = body(&[(LDARG_0, None), (LDFLD, Some(button_text.token)), (RET, None)]);

    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                let ctx = MethodBodyContext::new(&code, &resolver).with_static(false);
                assert!(references_member(&ctx, &rule).unwrap());
            });
        }
    });
}
