//! Definitions of the helper functions referenced by translated code

use std::collections::BTreeSet;
use std::fmt::Write;

use itertools::Itertools;

use crate::known::{CompareOp, Helper};
use crate::options::ShaderStage;
use crate::types::ScalarKind;
use crate::Result;

/// HLSL vector type of `kind` with `size` components, scalar for a size of 1
fn vector(kind: ScalarKind, size: u8) -> String {
    let scalar = match kind {
        ScalarKind::Float => "float",
        ScalarKind::Int => "int",
        ScalarKind::Bool => "bool",
    };

    if size == 1 {
        scalar.to_owned()
    } else {
        format!("{}{}", scalar, size)
    }
}

fn matrix(size: u8) -> String {
    format!("float{}x{}", size, size)
}

/// Texture coordinates after the projective divide
fn projected(coord: &str, divide: Option<char>) -> String {
    match divide {
        Some(w) => format!("{}.xy / {}.{}", coord, coord, w),
        None => coord.to_owned(),
    }
}

/// Sampling expression of a lookup helper
///
/// Implicit-derivative lookups are only available in fragment shaders, so vertex shaders
/// sample the base level.
fn sample(stage: ShaderStage, coord: &str, bias: bool, lod: bool) -> String {
    if lod {
        format!("t.SampleLevel(s, {}, lod)", coord)
    } else if stage == ShaderStage::Vertex {
        format!("t.SampleLevel(s, {}, 0.0)", coord)
    } else if bias {
        format!("t.SampleBias(s, {}, bias)", coord)
    } else {
        format!("t.Sample(s, {})", coord)
    }
}

/// Write one lookup helper overload
fn lookup(
    out: &mut String,
    helper: Helper,
    stage: ShaderStage,
    texture: &str,
    coord_type: &str,
    divide: Option<char>,
) -> Result<()> {
    use Helper::*;

    let bias = matches!(
        helper,
        Texture2DBias | Texture2DProj3Bias | Texture2DProj4Bias | TextureCubeBias
    );
    let lod = matches!(
        helper,
        Texture2DLod | Texture2DProjLod3 | Texture2DProjLod4 | TextureCubeLod
    );

    let mut params = vec![
        "SamplerState s".to_owned(),
        format!("{} t", texture),
        format!("{} uv", coord_type),
    ];
    if bias {
        params.push("float bias".to_owned());
    }
    if lod {
        params.push("float lod".to_owned());
    }

    writeln!(
        out,
        "float4 {}({})\n{{\n    return {};\n}}\n",
        helper.name(),
        params.join(", "),
        sample(stage, &projected("uv", divide), bias, lod)
    )?;

    Ok(())
}

/// Matrix of `size` with `value(row, col)` as its entries
fn matrix_entries(size: u8, value: impl Fn(u8, u8) -> String) -> String {
    let entries = (0..size)
        .cartesian_product(0..size)
        .map(|(i, j)| value(i, j))
        .join(", ");

    format!("{}({})", matrix(size), entries)
}

fn helper(out: &mut String, helper: Helper, stage: ShaderStage) -> Result<()> {
    use Helper::*;

    match helper {
        Sign => {
            for size in 1..=4 {
                let ty = vector(ScalarKind::Float, size);
                writeln!(
                    out,
                    "{} gl_sign({} x)\n{{\n    return ({})sign(x);\n}}\n",
                    ty, ty, ty
                )?;
            }
        }
        Mod => {
            for size in 1..=4 {
                let ty = vector(ScalarKind::Float, size);
                writeln!(
                    out,
                    "{} gl_mod({} x, {} y)\n{{\n    return x - y * floor(x / y);\n}}\n",
                    ty, ty, ty
                )?;
            }
        }
        ModScalar => {
            for size in 2..=4 {
                let ty = vector(ScalarKind::Float, size);
                writeln!(
                    out,
                    "{} gl_mod({} x, float y)\n{{\n    return x - y * floor(x / y);\n}}\n",
                    ty, ty
                )?;
            }
        }
        Compare(op, kind) => {
            let symbol = match op {
                CompareOp::LessThan => "<",
                CompareOp::LessThanEqual => "<=",
                CompareOp::GreaterThan => ">",
                CompareOp::GreaterThanEqual => ">=",
                CompareOp::Equal => "==",
                CompareOp::NotEqual => "!=",
            };

            for size in 2..=4 {
                let ty = vector(kind, size);
                writeln!(
                    out,
                    "{} {}({} x, {} y)\n{{\n    return x {} y;\n}}\n",
                    vector(ScalarKind::Bool, size),
                    helper.name(),
                    ty,
                    ty,
                    symbol
                )?;
            }
        }
        Not => {
            for size in 2..=4 {
                let ty = vector(ScalarKind::Bool, size);
                writeln!(out, "{} gl_not({} x)\n{{\n    return !x;\n}}\n", ty, ty)?;
            }
        }
        MatrixCompMult => {
            for size in 2..=4 {
                let ty = matrix(size);
                writeln!(
                    out,
                    "{} gl_matrixCompMult({} x, {} y)\n{{\n    return x * y;\n}}\n",
                    ty, ty, ty
                )?;
            }
        }
        Texture2D | Texture2DBias | Texture2DLod => {
            lookup(out, helper, stage, "Texture2D", "float2", None)?
        }
        Texture2DProj3 | Texture2DProj3Bias | Texture2DProjLod3 => {
            lookup(out, helper, stage, "Texture2D", "float3", Some('z'))?
        }
        Texture2DProj4 | Texture2DProj4Bias | Texture2DProjLod4 => {
            lookup(out, helper, stage, "Texture2D", "float4", Some('w'))?
        }
        TextureCube | TextureCubeBias | TextureCubeLod => {
            lookup(out, helper, stage, "TextureCube", "float3", None)?
        }
        MatrixDiagonal(size) => {
            let body = matrix_entries(size, |i, j| (if i == j { "x" } else { "0.0" }).to_owned());

            writeln!(
                out,
                "{} {}(float x)\n{{\n    return {};\n}}\n",
                matrix(size),
                helper.name(),
                body
            )?;
        }
        MatrixResize(source, target) => {
            let body = matrix_entries(target, |i, j| {
                if i < source && j < source {
                    format!("m[{}][{}]", i, j)
                } else if i == j {
                    "1.0".to_owned()
                } else {
                    "0.0".to_owned()
                }
            });

            writeln!(
                out,
                "{} {}({} m)\n{{\n    return {};\n}}\n",
                matrix(target),
                helper.name(),
                matrix(source),
                body
            )?;
        }
    }

    Ok(())
}

/// Definitions of `helpers` for the given stage, in a stable order
pub(super) fn prelude(helpers: &BTreeSet<Helper>, stage: ShaderStage) -> Result<String> {
    let mut out = String::new();

    for h in helpers {
        trace!("emitting helper {:?}", h);
        helper(&mut out, *h, stage)?;
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prelude_of(helpers: &[Helper], stage: ShaderStage) -> String {
        prelude(&helpers.iter().copied().collect(), stage).unwrap()
    }

    #[test]
    fn lookups_depend_on_stage() {
        let fragment = prelude_of(&[Helper::Texture2D], ShaderStage::Fragment);
        assert!(fragment.contains("float4 gl_texture2D(SamplerState s, Texture2D t, float2 uv)"));
        assert!(fragment.contains("return t.Sample(s, uv);"));

        let vertex = prelude_of(&[Helper::Texture2D], ShaderStage::Vertex);
        assert!(vertex.contains("return t.SampleLevel(s, uv, 0.0);"));
    }

    #[test]
    fn projective_lookups_divide() {
        let out = prelude_of(&[Helper::Texture2DProj4Bias], ShaderStage::Fragment);
        assert!(out.contains("return t.SampleBias(s, uv.xy / uv.w, bias);"));
    }

    #[test]
    fn matrix_helpers() {
        let out = prelude_of(
            &[Helper::MatrixDiagonal(2), Helper::MatrixResize(2, 3)],
            ShaderStage::Fragment,
        );

        assert!(out.contains("return float2x2(x, 0.0, 0.0, x);"));
        assert!(out.contains(
            "return float3x3(m[0][0], m[0][1], 0.0, m[1][0], m[1][1], 0.0, 0.0, 0.0, 1.0);"
        ));
    }

    #[test]
    fn compare_overloads() {
        let out = prelude_of(
            &[Helper::Compare(CompareOp::LessThan, ScalarKind::Int)],
            ShaderStage::Vertex,
        );

        assert!(out.contains("bool3 gl_lessThan(int3 x, int3 y)"));
        assert_eq!(out.matches("gl_lessThan(").count(), 3);
    }

    #[test]
    fn empty_prelude() {
        assert_eq!(prelude_of(&[], ShaderStage::Fragment), "");
    }
}
