//! GLSL ES language restrictions enforced during verification

mod common;

use glsl2hlsl::{compile, CompileOptionsBuilder, ErrorCode, ShaderStage};

use common::{compile_err, compile_ok};

#[test]
fn constant_index_out_of_range() {
    compile_err(
        ShaderStage::Fragment,
        "void main() { vec3 v = vec3(1.0); float x = v[3]; }",
        ErrorCode::IndexOutOfRange,
    );

    compile_err(
        ShaderStage::Fragment,
        "void main() { float a[2]; a[2] = 1.0; }",
        ErrorCode::IndexOutOfRange,
    );
}

#[test]
fn constant_index_in_range() {
    compile_ok(
        ShaderStage::Fragment,
        "void main() { vec3 v = vec3(1.0); gl_FragColor = vec4(v[2]); }",
    );
}

#[test]
fn dynamic_index_in_fragment_shader() {
    compile_err(
        ShaderStage::Fragment,
        r#"uniform vec4 colors[4];
uniform int which;
void main() {
    gl_FragColor = colors[which];
}"#,
        ErrorCode::NonConstantIndex,
    );
}

#[test]
fn dynamic_uniform_index_in_vertex_shader() {
    let compilation = compile_ok(
        ShaderStage::Vertex,
        r#"uniform vec4 offsets[4];
attribute float which;
void main() {
    gl_Position = offsets[int(which)];
}"#,
    );

    common::assert_contains(&compilation, &["gl_Position = _offsets[((int)_which)];"]);
}

#[test]
fn dynamic_local_index_in_vertex_shader() {
    compile_err(
        ShaderStage::Vertex,
        r#"attribute float which;
void main() {
    vec4 values[2];
    gl_Position = values[int(which)];
}"#,
        ErrorCode::NonConstantIndex,
    );
}

#[test]
fn break_outside_loop() {
    compile_err(
        ShaderStage::Fragment,
        "void main() { break; }",
        ErrorCode::BreakOutsideLoop,
    );
}

#[test]
fn missing_main() {
    compile_err(
        ShaderStage::Fragment,
        "float f() { return 1.0; }",
        ErrorCode::MissingMain,
    );
}

#[test]
fn main_must_return_void() {
    compile_err(
        ShaderStage::Fragment,
        "int main() { return 0; }",
        ErrorCode::InvalidMain,
    );
}

#[test]
fn recursion_through_prototypes() {
    compile_err(
        ShaderStage::Fragment,
        r#"float f(float x);
float g(float x) { return f(x); }
float f(float x) { return g(x); }
void main() { gl_FragColor = vec4(f(1.0)); }"#,
        ErrorCode::Recursion,
    );
}

#[test]
fn called_but_not_defined() {
    compile_err(
        ShaderStage::Fragment,
        "float f(float x); void main() { gl_FragColor = vec4(f(1.0)); }",
        ErrorCode::FunctionNotDefined,
    );
}

#[test]
fn declared_but_never_called() {
    compile_ok(
        ShaderStage::Fragment,
        "float f(float x); void main() { gl_FragColor = vec4(1.0); }",
    );
}

#[test]
fn frag_color_and_frag_data() {
    compile_err(
        ShaderStage::Fragment,
        "void main() { gl_FragColor = vec4(1.0); gl_FragData[0] = vec4(0.0); }",
        ErrorCode::FragColorAndFragData,
    );
}

#[test]
fn attribute_in_fragment_shader() {
    compile_err(
        ShaderStage::Fragment,
        "attribute vec4 position; void main() { gl_FragColor = position; }",
        ErrorCode::InvalidQualifier,
    );
}

#[test]
fn attribute_types() {
    compile_err(
        ShaderStage::Vertex,
        "attribute int index; void main() { gl_Position = vec4(0.0); }",
        ErrorCode::InvalidAttributeType,
    );
}

#[test]
fn varying_types() {
    compile_err(
        ShaderStage::Vertex,
        "varying bool flag; void main() { gl_Position = vec4(0.0); }",
        ErrorCode::InvalidVaryingType,
    );
}

#[test]
fn samplers_must_be_uniforms() {
    compile_err(
        ShaderStage::Fragment,
        "void main() { sampler2D s; }",
        ErrorCode::InvalidQualifier,
    );
}

#[test]
fn samplers_in_structures() {
    compile_err(
        ShaderStage::Fragment,
        "struct S { sampler2D s; }; uniform S u; void main() { }",
        ErrorCode::SamplerInStruct,
    );
}

#[test]
fn const_needs_an_initializer() {
    compile_err(
        ShaderStage::Fragment,
        "const float k; void main() { }",
        ErrorCode::MissingConstInitializer,
    );
}

#[test]
fn global_initializers_are_constant() {
    compile_err(
        ShaderStage::Fragment,
        "uniform float u; float g = u; void main() { gl_FragColor = vec4(g); }",
        ErrorCode::NotConstantExpression,
    );
}

#[test]
fn uniforms_are_read_only() {
    compile_err(
        ShaderStage::Fragment,
        "uniform float u; void main() { u = 1.0; }",
        ErrorCode::InvalidLValue,
    );
}

#[test]
fn conditions_are_bool() {
    compile_err(
        ShaderStage::Fragment,
        "void main() { if (1.0) { discard; } }",
        ErrorCode::ConditionNotBool,
    );
}

#[test]
fn return_values() {
    compile_err(
        ShaderStage::Fragment,
        "float f() { return 1; } void main() { gl_FragColor = vec4(f()); }",
        ErrorCode::ReturnTypeMismatch,
    );

    compile_err(
        ShaderStage::Fragment,
        "float f() { return; } void main() { gl_FragColor = vec4(f()); }",
        ErrorCode::MissingReturnValue,
    );
}

#[test]
fn void_variables() {
    compile_err(
        ShaderStage::Fragment,
        "void main() { void v; }",
        ErrorCode::VoidVariable,
    );
}

#[test]
fn derivatives_need_the_extension() {
    compile_err(
        ShaderStage::Fragment,
        "varying float v; void main() { gl_FragColor = vec4(dFdx(v)); }",
        ErrorCode::ExtensionNotEnabled,
    );
}

#[test]
fn derivatives_with_the_extension() {
    let compilation = compile_ok(
        ShaderStage::Fragment,
        r#"#extension GL_OES_standard_derivatives : enable
varying float v;
void main() {
    gl_FragColor = vec4(dFdx(v), dFdy(v), 0.0, 1.0);
}"#,
    );

    common::assert_contains(&compilation, &["float4(ddx(_v), ddy(_v), 0.0, 1.0)"]);
}

#[test]
fn derivatives_enabled_by_options() {
    let options = CompileOptionsBuilder::default()
        .stage(ShaderStage::Fragment)
        .standard_derivatives(true)
        .finish()
        .unwrap();

    let compilation = common::compile_with(
        options,
        "varying float v; void main() { gl_FragColor = vec4(dFdx(v)); }",
    );

    common::assert_contains(&compilation, &["ddx(_v)"]);
}

#[test]
fn unsupported_directives() {
    compile_err(
        ShaderStage::Fragment,
        "#define ONE 1.0\nvoid main() { }",
        ErrorCode::UnsupportedDirective,
    );
}

#[test]
fn syntax_errors() {
    compile_err(
        ShaderStage::Fragment,
        "void main() { float x = ; }",
        ErrorCode::SyntaxError,
    );
}

#[test]
fn independent_errors_accumulate() {
    let source = r#"uniform float u;
void main() {
    u = 1.0;
    vec3 v = vec3(1.0);
    float x = v[3];
    break;
}"#;

    let error = compile(source, &glsl2hlsl::CompileOptions::for_stage(ShaderStage::Fragment))
        .unwrap_err();

    assert!(error.has_code(ErrorCode::InvalidLValue));
    assert!(error.has_code(ErrorCode::IndexOutOfRange));
    assert!(error.has_code(ErrorCode::BreakOutsideLoop));
    assert!(error.diagnostics().len() >= 3);
}
