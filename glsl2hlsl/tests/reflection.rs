//! Active variable reflection

mod common;

use glsl2hlsl::types::BasicType;
use glsl2hlsl::{Compilation, ReflectedVariable, ShaderStage, VariableKind};

fn variable<'c>(compilation: &'c Compilation, name: &str) -> Option<&'c ReflectedVariable> {
    compilation.variables.iter().find(|v| v.name == name)
}

fn gl(basic: BasicType) -> u32 {
    basic.gl_enum().unwrap()
}

#[test]
fn only_referenced_variables_are_active() {
    let compilation = common::compile_ok(
        ShaderStage::Vertex,
        r#"uniform vec4 used;
uniform vec4 unused;
attribute vec4 position;
attribute vec4 color;
varying vec4 shade;
void main() {
    shade = used;
    gl_Position = position;
}"#,
    );

    let names: Vec<_> = compilation.variables.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(compilation.variables.len(), 3, "{:?}", names);

    assert_eq!(
        variable(&compilation, "_used"),
        Some(&ReflectedVariable {
            kind: VariableKind::Uniform,
            name: "_used".to_owned(),
            gl_type: gl(BasicType::Vec4),
            size: 1,
        })
    );
    assert_eq!(
        variable(&compilation, "_position").map(|v| v.kind),
        Some(VariableKind::Attribute)
    );
    assert_eq!(
        variable(&compilation, "_shade").map(|v| v.kind),
        Some(VariableKind::Varying)
    );
    assert!(variable(&compilation, "_unused").is_none());
    assert!(variable(&compilation, "_color").is_none());
}

#[test]
fn functions_unreachable_from_main_do_not_count() {
    let compilation = common::compile_ok(
        ShaderStage::Fragment,
        r#"uniform float a;
uniform float b;
float helper() { return b; }
float other() { return helper(); }
void main() { gl_FragColor = vec4(a); }"#,
    );

    assert!(variable(&compilation, "_a").is_some());
    assert!(variable(&compilation, "_b").is_none());
}

#[test]
fn variables_used_through_calls() {
    let compilation = common::compile_ok(
        ShaderStage::Fragment,
        r#"uniform float a;
float helper() { return a; }
void main() { gl_FragColor = vec4(helper()); }"#,
    );

    assert!(variable(&compilation, "_a").is_some());
}

#[test]
fn structure_uniforms_are_flattened() {
    let compilation = common::compile_ok(
        ShaderStage::Fragment,
        r#"struct Light { vec3 p; float k[2]; };
uniform Light light;
uniform Light lights[2];
void main() {
    gl_FragColor = vec4(light.p * light.k[1], lights[1].k[0]);
}"#,
    );

    let expected = [
        ("_light._p", gl(BasicType::Vec3), 1),
        ("_light._k", gl(BasicType::Float), 2),
        ("_lights[0]._p", gl(BasicType::Vec3), 1),
        ("_lights[0]._k", gl(BasicType::Float), 2),
        ("_lights[1]._p", gl(BasicType::Vec3), 1),
        ("_lights[1]._k", gl(BasicType::Float), 2),
    ];

    for (name, gl_type, size) in expected.iter() {
        let found = variable(&compilation, name)
            .unwrap_or_else(|| panic!("{} not reflected in {:?}", name, compilation.variables));
        assert_eq!(found.gl_type, *gl_type, "{}", name);
        assert_eq!(found.size, *size, "{}", name);
    }

    assert_eq!(compilation.variables.len(), expected.len());
}

#[test]
fn arrays_and_samplers() {
    let compilation = common::compile_ok(
        ShaderStage::Fragment,
        r#"uniform vec2 offsets[3];
uniform sampler2D tex;
void main() {
    gl_FragColor = texture2D(tex, offsets[2]);
}"#,
    );

    let offsets = variable(&compilation, "_offsets").expect("no offsets");
    assert_eq!(offsets.gl_type, gl(BasicType::Vec2));
    assert_eq!(offsets.size, 3);

    let tex = variable(&compilation, "_tex__sampler").expect("no sampler");
    assert_eq!(tex.gl_type, gl(BasicType::Sampler2D));
    assert_eq!(tex.kind, VariableKind::Uniform);
}

#[test]
fn built_in_variables_are_not_reflected() {
    let compilation = common::compile_ok(
        ShaderStage::Fragment,
        "void main() { gl_FragColor = gl_FragCoord; }",
    );

    assert!(compilation.variables.is_empty());
}

#[test]
fn display() {
    let variable = ReflectedVariable {
        kind: VariableKind::Uniform,
        name: "_light._k".to_owned(),
        gl_type: 0x1406,
        size: 2,
    };

    assert_eq!(variable.to_string(), "uniform _light._k 0x1406[2]");
}
