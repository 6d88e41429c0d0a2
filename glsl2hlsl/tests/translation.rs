//! Shape of the generated HLSL

mod common;

use glsl2hlsl::{CompileOptionsBuilder, ShaderStage};

use common::{assert_contains, compile_ok, compile_with, verify_main};

const VERTEX: &str = r#"uniform mat4 mvp;
attribute vec4 position;
attribute vec2 coord;
varying vec2 uv;
void main() {
    uv = coord;
    gl_Position = mvp * position;
}"#;

const FRAGMENT: &str = r#"precision mediump float;
uniform sampler2D tex;
varying vec2 uv;
void main() {
    gl_FragColor = texture2D(tex, uv);
}"#;

#[test]
fn vertex_shader() {
    let compilation = compile_ok(ShaderStage::Vertex, VERTEX);

    assert_contains(
        &compilation,
        &[
            "static float4 gl_Position;",
            "uniform float4x4 _mvp;",
            "static float4 _position;",
            "static float2 _uv;",
        ],
    );

    pretty_assertions::assert_eq!(
        common::gl_main(&compilation).trim(),
        "void gl_main()\n{\n    _uv = _coord;\n    gl_Position = mul(_position, _mvp);\n}"
    );
}

#[test]
fn vertex_entry_point() {
    let compilation = compile_ok(ShaderStage::Vertex, VERTEX);

    assert_contains(
        &compilation,
        &[
            r#"struct VS_INPUT
{
    float4 _position : TEXCOORD0;
    float2 _coord : TEXCOORD1;
};"#,
            r#"struct VS_OUTPUT
{
    float4 gl_Position : SV_Position;
    float2 _uv : VARYING_uv_;
};"#,
            r#"void main(in VS_INPUT input, out VS_OUTPUT output)
{
    _position = input._position;
    _coord = input._coord;
    gl_main();
    output.gl_Position = gl_Position;
    output._uv = _uv;
}"#,
        ],
    );
}

#[test]
fn fragment_shader() {
    let compilation = compile_ok(ShaderStage::Fragment, FRAGMENT);

    assert_contains(
        &compilation,
        &[
            "float4 gl_texture2D(SamplerState s, Texture2D t, float2 uv)",
            "static float4 gl_FragColor;",
            "uniform SamplerState _tex__sampler : register(s0);",
            "uniform Texture2D _tex__texture : register(t0);",
            "gl_FragColor = gl_texture2D(_tex__sampler, _tex__texture, _uv);",
        ],
    );
}

#[test]
fn fragment_entry_point() {
    let compilation = compile_ok(ShaderStage::Fragment, FRAGMENT);

    assert_contains(
        &compilation,
        &[
            r#"struct PS_INPUT
{
    float2 _uv : VARYING_uv_;
};"#,
            r#"struct PS_OUTPUT
{
    float4 gl_FragColor : SV_Target0;
};"#,
            r#"void main(in PS_INPUT input, out PS_OUTPUT output)
{
    _uv = input._uv;
    gl_main();
    output.gl_FragColor = gl_FragColor;
}"#,
        ],
    );
}

#[test]
fn fragment_built_in_inputs() {
    let compilation = compile_ok(
        ShaderStage::Fragment,
        r#"void main() {
    gl_FragColor = gl_FrontFacing ? gl_FragCoord : vec4(0.0);
}"#,
    );

    assert_contains(
        &compilation,
        &[
            "float4 gl_FragCoord : SV_Position;",
            "bool gl_FrontFacing : SV_IsFrontFace;",
            "gl_FragCoord = input.gl_FragCoord;",
        ],
    );
}

#[test]
fn frag_data_output() {
    let compilation = compile_ok(
        ShaderStage::Fragment,
        "void main() { gl_FragData[0] = vec4(1.0); }",
    );

    assert_contains(
        &compilation,
        &[
            "float4 gl_FragData0 : SV_Target0;",
            "output.gl_FragData0 = gl_FragData[0];",
        ],
    );
    assert!(!compilation.hlsl.contains("gl_FragColor"));
}

#[test]
fn sampler_registers() {
    let compilation = compile_ok(
        ShaderStage::Fragment,
        r#"uniform sampler2D layers[2];
uniform samplerCube sky;
varying vec3 dir;
void main() {
    gl_FragColor = texture2D(layers[1], dir.xy) + textureCube(sky, dir);
}"#,
    );

    assert_contains(
        &compilation,
        &[
            "uniform SamplerState _layers__sampler[2] : register(s0);",
            "uniform Texture2D _layers__texture[2] : register(t0);",
            "uniform SamplerState _sky__sampler : register(s2);",
            "uniform TextureCube _sky__texture : register(t2);",
            "gl_texture2D(_layers__sampler[1], _layers__texture[1], _dir.xy)",
            "gl_textureCube(_sky__sampler, _sky__texture, _dir)",
        ],
    );
}

#[test]
fn sampler_parameters() {
    let compilation = compile_ok(
        ShaderStage::Fragment,
        r#"uniform sampler2D tex;
vec4 fetch(sampler2D s, vec2 at) { return texture2D(s, at); }
void main() {
    gl_FragColor = fetch(tex, vec2(0.5));
}"#,
    );

    assert_contains(
        &compilation,
        &[
            "float4 f_fetch(SamplerState _s__sampler, Texture2D _s__texture, in float2 _at)",
            "return gl_texture2D(_s__sampler, _s__texture, _at);",
            "gl_FragColor = f_fetch(_tex__sampler, _tex__texture, ((float2)0.5));",
        ],
    );
}

#[test]
fn helpers_and_entry_point_are_optional() {
    let options = CompileOptionsBuilder::default()
        .stage(ShaderStage::Fragment)
        .emit_helpers(false)
        .emit_entry_point(false)
        .finish()
        .unwrap();

    let compilation = compile_with(options, FRAGMENT);

    assert!(compilation.hlsl.contains("gl_texture2D(_tex__sampler, _tex__texture, _uv)"));
    assert!(!compilation.hlsl.contains("float4 gl_texture2D("));
    assert!(!compilation.hlsl.contains("PS_OUTPUT"));
}

#[test]
fn matrix_products() {
    verify_main(
        ShaderStage::Fragment,
        r#"uniform mat3 m;
uniform vec3 v;
void main() {
    vec3 r = m * v;
    mat3 n = m;
    n *= m;
    vec3 s = v * 2.0;
}"#,
        r#"void gl_main()
{
    float3 _r = mul(_v, _m);
    float3x3 _n = _m;
    _n = mul(_m, _n);
    float3 _s = _v * ((float3)2.0);
}"#,
    );
}

#[test]
fn matrix_constructors() {
    let compilation = compile_ok(
        ShaderStage::Fragment,
        r#"uniform mat4 big;
void main() {
    mat2 i = mat2(1.0);
    mat3 c = mat3(big);
    gl_FragColor = vec4(i[0][0] + c[1][1]);
}"#,
    );

    assert_contains(
        &compilation,
        &[
            "float2x2 _i = gl_diagMat2(1.0);",
            "float2x2 gl_diagMat2(float x)",
        ],
    );
}

#[test]
fn vector_equality() {
    verify_main(
        ShaderStage::Fragment,
        r#"uniform vec3 a;
uniform vec3 b;
void main() {
    bool same = a == b;
    bool different = a != b;
}"#,
        r#"void gl_main()
{
    bool _same = all(_a == _b);
    bool _different = any(_a != _b);
}"#,
    );
}

#[test]
fn structure_constructor_and_equality() {
    let compilation = compile_ok(
        ShaderStage::Fragment,
        r#"struct S { float a; vec2 b; };
uniform S u;
void main() {
    S s = S(1.0, vec2(0.0));
    if (s == u) discard;
}"#,
    );

    assert_contains(
        &compilation,
        &[
            "struct _S\n{\n    float _a;\n    float2 _b;\n};",
            r#"_S gl_ctor_S(in float _a, in float2 _b)
{
    _S result;
    result._a = _a;
    result._b = _b;
    return result;
}"#,
            r#"bool gl_equal_S(_S a, _S b)
{
    return a._a == b._a && all(a._b == b._b);
}"#,
            "uniform _S _u;",
            "_S _s = gl_ctor_S(1.0, ((float2)0.0));",
            "if (gl_equal_S(_s, _u))",
        ],
    );
}

#[test]
fn nested_structures_come_first() {
    let compilation = compile_ok(
        ShaderStage::Fragment,
        r#"struct Outer { struct Inner { float x; } inner; float y; };
uniform Outer o;
void main() { gl_FragColor = vec4(o.inner.x, o.y, 0.0, 1.0); }"#,
    );

    let inner = compilation.hlsl.find("struct _Inner").expect("no inner structure");
    let outer = compilation.hlsl.find("struct _Outer").expect("no outer structure");
    assert!(inner < outer);

    assert_contains(&compilation, &["float4(_o._inner._x, _o._y, 0.0, 1.0)"]);
}

#[test]
fn swizzles() {
    verify_main(
        ShaderStage::Fragment,
        r#"void main() {
    vec4 c = vec4(1.0, 2.0, 3.0, 4.0);
    gl_FragColor = c.zyxw;
    gl_FragColor.xy = c.ww;
}"#,
        r#"void gl_main()
{
    float4 _c = float4(1.0, 2.0, 3.0, 4.0);
    gl_FragColor = _c.zyxw;
    gl_FragColor.xy = _c.ww;
}"#,
    );
}

#[test]
fn truncating_constructors() {
    verify_main(
        ShaderStage::Fragment,
        r#"uniform vec4 c;
void main() {
    vec3 d = vec3(c);
    vec2 e = vec2(1.0, d);
    float f = float(c);
}"#,
        r#"void gl_main()
{
    float3 _d = float3(_c.xyz);
    float2 _e = float2(1.0, _d.x);
    float _f = ((float)_c.x);
}"#,
    );
}

#[test]
fn constant_folding() {
    let compilation = compile_ok(
        ShaderStage::Fragment,
        r#"const float k = 2.0 * 3.0;
const int n = 7 / 2;
void main() {
    gl_FragColor = vec4(k, float(n), 0.0, 1.0);
}"#,
    );

    assert_contains(
        &compilation,
        &[
            "static const float _k = 6.0;",
            "static const int _n = 3;",
            "gl_FragColor = float4(6.0, 3.0, 0.0, 1.0);",
        ],
    );
}

#[test]
fn integer_constants_wrap() {
    let compilation = compile_ok(
        ShaderStage::Fragment,
        r#"const int a = 2147483647 + 1;
const int b = a - 1;
void main() {
    gl_FragColor = vec4(float(a), float(b), 0.0, 1.0);
}"#,
    );

    assert_contains(
        &compilation,
        &[
            "static const int _a = (-2147483647 - 1);",
            "static const int _b = 2147483647;",
        ],
    );
}

#[test]
fn logical_operators() {
    verify_main(
        ShaderStage::Fragment,
        r#"uniform bool a;
uniform bool b;
void main() {
    if (a && b) discard;
    if (a || b) discard;
    if (a ^^ b) discard;
    bool c = (a ^^ b) && !(a || b);
}"#,
        r#"void gl_main()
{
    if (_a && _b)
    {
        discard;
    }
    if (_a || _b)
    {
        discard;
    }
    if (_a != _b)
    {
        discard;
    }
    bool _c = (_a != _b) && (!(_a || _b));
}"#,
    );
}

#[test]
fn logical_constants_fold() {
    let compilation = compile_ok(
        ShaderStage::Fragment,
        r#"const bool t = true ^^ false;
const bool f = t && false;
const bool o = f || t;
void main() {
    gl_FragColor = vec4(t ? 1.0 : 0.0, f ? 1.0 : 0.0, o ? 1.0 : 0.0, 1.0);
}"#,
    );

    assert_contains(
        &compilation,
        &[
            "static const bool _t = true;",
            "static const bool _f = false;",
            "static const bool _o = true;",
        ],
    );
}

#[test]
fn builtin_helpers() {
    let compilation = compile_ok(
        ShaderStage::Fragment,
        r#"uniform vec2 a;
uniform vec2 b;
void main() {
    vec2 m = mod(a, 2.0);
    bvec2 l = lessThan(a, b);
    gl_FragColor = vec4(m, sign(a.x), l.x ? 1.0 : 0.0);
}"#,
    );

    assert_contains(
        &compilation,
        &[
            "float2 _m = gl_mod(_a, 2.0);",
            "bool2 _l = gl_lessThan(_a, _b);",
            "gl_sign(_a.x)",
            "float2 gl_mod(float2 x, float y)",
            "bool2 gl_lessThan(float2 x, float2 y)",
        ],
    );
}

#[test]
fn depth_range() {
    let compilation = compile_ok(
        ShaderStage::Fragment,
        "void main() { gl_FragColor = vec4(gl_DepthRange.near, gl_DepthRange.far, 0.0, 1.0); }",
    );

    assert_contains(
        &compilation,
        &["static const gl_DepthRangeParameters gl_DepthRange = {0.0, 1.0, 1.0};"],
    );
}
