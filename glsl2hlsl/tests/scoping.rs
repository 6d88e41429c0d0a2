//! Identifier resolution and scoping

mod common;

use glsl2hlsl::{ErrorCode, ShaderStage};

#[test]
fn inner_blocks_shadow() {
    common::compile_ok(
        ShaderStage::Fragment,
        r#"void main() {
    float x = 1.0;
    {
        int x = 2;
        int y = x;
    }
    float z = x;
}"#,
    );
}

#[test]
fn redeclaration_in_same_scope() {
    common::compile_err(
        ShaderStage::Fragment,
        "void main() { float x; int x; }",
        ErrorCode::Redeclaration,
    );
}

#[test]
fn parameters_share_the_body_scope() {
    common::compile_err(
        ShaderStage::Fragment,
        "void f(float a) { float a = 1.0; } void main() { f(0.0); }",
        ErrorCode::Redeclaration,
    );
}

#[test]
fn loop_scope_ends_with_the_loop() {
    common::compile_err(
        ShaderStage::Fragment,
        "void main() { for (int i = 0; i < 2; i++) { } int j = i; }",
        ErrorCode::UndeclaredIdentifier,
    );
}

#[test]
fn reserved_identifiers() {
    common::compile_err(
        ShaderStage::Fragment,
        "void main() { float gl_thing = 1.0; }",
        ErrorCode::ReservedIdentifier,
    );

    common::compile_err(
        ShaderStage::Fragment,
        "void main() { float a__b = 1.0; }",
        ErrorCode::ReservedIdentifier,
    );
}

#[test]
fn overloads_get_distinct_names() {
    let compilation = common::compile_ok(
        ShaderStage::Fragment,
        r#"float g(float a) { return a; }
float g(vec2 a) { return a.x; }
void main() {
    gl_FragColor = vec4(g(1.0), g(vec2(1.0)), 0.0, 1.0);
}"#,
    );

    common::assert_contains(
        &compilation,
        &[
            "float f_g(in float _a)",
            "float f_g__1(in float2 _a)",
            "float4(f_g(1.0), f_g__1(((float2)1.0)), 0.0, 1.0)",
        ],
    );
}

fn occurrences(compilation: &glsl2hlsl::Compilation, text: &str) -> usize {
    compilation.hlsl.matches(text).count()
}

#[test]
fn overload_names_differ_from_user_names() {
    let compilation = common::compile_ok(
        ShaderStage::Fragment,
        r#"float foo(float a) { return a; }
float foo(vec2 a) { return a.x; }
float foo_1(vec2 a) { return a.y; }
void main() {
    gl_FragColor = vec4(foo(1.0), foo(vec2(1.0)), foo_1(vec2(2.0)), 1.0);
}"#,
    );

    for definition in &[
        "float f_foo(in float _a)\n{",
        "float f_foo__1(in float2 _a)\n{",
        "float f_foo_1(in float2 _a)\n{",
    ] {
        assert_eq!(occurrences(&compilation, definition), 1, "{}", definition);
    }

    common::assert_contains(
        &compilation,
        &["float4(f_foo(1.0), f_foo__1(((float2)1.0)), f_foo_1(((float2)2.0)), 1.0)"],
    );
}

#[test]
fn shadowed_structures_keep_distinct_names() {
    let compilation = common::compile_ok(
        ShaderStage::Fragment,
        r#"struct S { float a; };
struct S_1 { float b; };
void main() {
    S s = S(1.0);
    S_1 t = S_1(2.0);
    {
        struct S { int c; };
        S u = S(3);
        gl_FragColor = vec4(s.a, t.b, float(u.c), 1.0);
    }
}"#,
    );

    for definition in &[
        "struct _S\n{\n    float _a;\n};",
        "struct _S_1\n{\n    float _b;\n};",
        "struct _S__1\n{\n    int _c;\n};",
    ] {
        assert_eq!(occurrences(&compilation, definition), 1, "{}", definition);
    }

    common::assert_contains(&compilation, &["_S__1 _u = gl_ctor_S__1(3);"]);
}

#[test]
fn variables_and_functions_may_share_a_name() {
    let compilation = common::compile_ok(
        ShaderStage::Fragment,
        r#"float foo;
float foo(float a) { return a * 2.0; }
void main() {
    foo = 1.0;
    gl_FragColor = vec4(foo(foo));
}"#,
    );

    common::assert_contains(
        &compilation,
        &["static float _foo;", "float f_foo(in float _a)", "f_foo(_foo)"],
    );
}

#[test]
fn return_type_overload() {
    common::compile_err(
        ShaderStage::Fragment,
        "float g(float a) { return a; } int g(float a) { return 1; } void main() { }",
        ErrorCode::ReturnTypeOverload,
    );
}

#[test]
fn prototypes_resolve_before_definitions() {
    let compilation = common::compile_ok(
        ShaderStage::Fragment,
        r#"float later(float x);
void main() { gl_FragColor = vec4(later(0.5)); }
float later(float x) { return x * 2.0; }"#,
    );

    common::assert_contains(&compilation, &["float f_later(in float _x);"]);
}

#[test]
fn struct_names_resolve_as_types() {
    common::compile_ok(
        ShaderStage::Fragment,
        r#"struct Light { vec3 color; float power; };
Light make() { return Light(vec3(1.0), 2.0); }
void main() {
    Light l = make();
    gl_FragColor = vec4(l.color * l.power, 1.0);
}"#,
    );
}
