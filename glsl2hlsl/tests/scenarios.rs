//! End-to-end compilation scenarios

mod common;

use glsl2hlsl::tree::NodeKind;
use glsl2hlsl::types::BasicType;
use glsl2hlsl::{Compilation, ErrorCode, ShaderStage};

#[test]
fn constant_initializer_folds() {
    let compilation = common::compile_ok(ShaderStage::Fragment, "void main() { float f = 1.0 + 2.0; }");

    let tree = &compilation.tree;
    let initializer = tree
        .find(tree.root(), |k| *k == NodeKind::Initializer)
        .unwrap();
    let constant = tree.node(initializer).constant();

    assert_eq!(constant.scalar_type(), Some(BasicType::Float));
    assert_eq!(constant.as_f64(), Some(3.0));

    pretty_assertions::assert_eq!(
        common::gl_main(&compilation).trim(),
        "void gl_main()\n{\n    float _f = 3.0;\n}"
    );
}

#[test]
fn no_implicit_conversion_at_call_sites() {
    common::compile_err(
        ShaderStage::Fragment,
        "float foo(float a) { return a; } void main() { float x = foo(1); }",
        ErrorCode::TypeMismatch,
    );
}

#[test]
fn discard_in_vertex_shader() {
    common::compile_err(
        ShaderStage::Vertex,
        r#"void kill() { discard; }
void main() {
    kill();
    gl_Position = vec4(0.0);
}"#,
        ErrorCode::DiscardOutsideFragment,
    );
}

#[test]
fn discard_in_fragment_shader() {
    let compilation = common::compile_ok(
        ShaderStage::Fragment,
        r#"void kill() { discard; }
void main() {
    kill();
}"#,
    );

    common::assert_contains(&compilation, &["void f_kill()\n{\n    discard;\n}"]);
}

#[test]
fn struct_uniforms_link_across_stages() {
    let vertex = common::compile_ok(
        ShaderStage::Vertex,
        r#"struct S { float a; float b; };
uniform S s;
void main() { gl_Position = vec4(s.a, s.b, 0.0, 1.0); }"#,
    );

    // Different declaration order interns the names at different indices
    let fragment = common::compile_ok(
        ShaderStage::Fragment,
        r#"precision mediump float;
uniform float unrelated;
struct S { float a; float b; };
uniform S s;
void main() { gl_FragColor = vec4(s.b + unrelated); }"#,
    );

    Compilation::link(&vertex, &fragment).unwrap();
}
