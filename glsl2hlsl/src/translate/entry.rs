//! Stage entry point and built-in variable declarations

use std::fmt::Write;

use super::Translator;
use crate::ident::{IdentifierInfo, ScopeId, Storage, VariableInfo};
use crate::known::KnownVariable;
use crate::options::ShaderStage;
use crate::types::Type;
use crate::{Error, Result};

/// Member of an entry point input or output structure
struct Member {
    declaration: String,
    semantic: String,
    /// Global copied from or to
    global: String,
    /// Structure member name
    member: String,
}

/// Interpolator semantic of a varying, derived from its output name alone
///
/// Semantics are case-insensitive and read trailing digits as an index, so upper case letters
/// become a `__` marker followed by the lower case letter, and the semantic ends with `_`.
/// User names never contain `__`, which keeps the mapping one to one.
fn varying_semantic(name: &str) -> String {
    let mut semantic = String::from("VARYING");
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            semantic.push_str("__");
            semantic.push(c.to_ascii_lowercase());
        } else {
            semantic.push(c);
        }
    }
    semantic.push('_');
    semantic
}

/// Number of interpolator slots taken by a value of type `ty`
fn slots(ty: &Type) -> u32 {
    match ty {
        Type::Basic(basic) if basic.is_matrix() => basic.cols(),
        Type::Basic(_) => 1,
        Type::Array { element, size } => size * slots(element),
        Type::Struct(s) => s.fields().iter().map(|f| slots(&f.ty)).sum(),
    }
}

impl<'a> Translator<'a> {
    /// User variables of the global scope with the given storage, in declaration order
    fn interface(&self, storage: Storage) -> Vec<(&'a IdentifierInfo, &'a VariableInfo)> {
        let cx = self.cx;

        cx.idents()
            .iter()
            .filter(|(_, info)| info.scope == ScopeId::GLOBAL)
            .filter_map(|(_, info)| info.as_variable().map(|variable| (info, variable)))
            .filter(|(_, variable)| variable.storage == storage && variable.special.is_none())
            .collect()
    }

    /// Built-in variable facts, if the stage has it
    fn special(&self, variable: KnownVariable) -> Option<&'a VariableInfo> {
        let cx = self.cx;

        cx.idents()
            .iter()
            .filter(|(_, info)| info.scope == ScopeId::BUILTIN)
            .filter_map(|(_, info)| info.as_variable())
            .find(|info| info.special == Some(variable))
    }

    fn special_used(&self, variable: KnownVariable) -> bool {
        self.special(variable).map(|v| v.used).unwrap_or(false)
    }

    /// Varyings sorted by output name, with their interpolator semantics
    fn varyings(&self) -> Result<Vec<Member>> {
        let mut varyings = self.interface(Storage::Varying);
        varyings.sort_by(|a, b| a.0.name().cmp(b.0.name()));

        varyings
            .into_iter()
            .map(|(info, variable)| -> Result<Member> {
                Ok(Member {
                    declaration: self.declaration(&variable.ty, info.name())?,
                    semantic: varying_semantic(info.name()),
                    global: info.name().to_owned(),
                    member: info.name().to_owned(),
                })
            })
            .collect()
    }

    /// Member for a built-in variable
    fn special_member(&self, variable: KnownVariable, semantic: String) -> Result<Member> {
        let entry = variable.entry();
        let info = self.special(variable).ok_or_else(|| {
            Error::internal(format!("{} is not available in this stage", entry.hlsl))
        })?;

        Ok(Member {
            declaration: self.declaration(&info.ty, entry.hlsl)?,
            semantic,
            global: entry.hlsl.to_owned(),
            member: entry.hlsl.to_owned(),
        })
    }

    fn members(&mut self, name: &str, members: &[Member]) -> Result<()> {
        self.line(format_args!("struct {}", name))?;
        self.line("{")?;
        self.indent += 1;
        for member in members {
            self.line(format_args!("{} : {};", member.declaration, member.semantic))?;
        }
        self.indent -= 1;
        self.line("};")?;
        self.blank();
        Ok(())
    }

    /// Stage entry point calling `gl_main` between copies of the stage inputs and outputs
    pub(super) fn entry_point(&mut self) -> Result<()> {
        let (inputs, outputs, prefix) = match self.cx.stage() {
            ShaderStage::Vertex => {
                let mut inputs = Vec::new();
                let mut next = 0;
                for (info, variable) in self.interface(Storage::Attribute) {
                    inputs.push(Member {
                        declaration: self.declaration(&variable.ty, info.name())?,
                        semantic: format!("TEXCOORD{}", next),
                        global: info.name().to_owned(),
                        member: info.name().to_owned(),
                    });
                    next += slots(&variable.ty);
                }

                let mut outputs = vec![
                    self.special_member(KnownVariable::Position, "SV_Position".to_owned())?
                ];
                outputs.extend(self.varyings()?);
                if self.special_used(KnownVariable::PointSize) {
                    outputs.push(
                        self.special_member(KnownVariable::PointSize, "PSIZE".to_owned())?,
                    );
                }

                (inputs, outputs, "VS")
            }
            ShaderStage::Fragment => {
                let mut inputs = Vec::new();
                if self.special_used(KnownVariable::FragCoord) {
                    inputs.push(
                        self.special_member(KnownVariable::FragCoord, "SV_Position".to_owned())?,
                    );
                }

                inputs.extend(self.varyings()?);

                if self.special_used(KnownVariable::PointCoord) {
                    inputs.push(
                        self.special_member(KnownVariable::PointCoord, "TEXCOORD0".to_owned())?,
                    );
                }

                if self.special_used(KnownVariable::FrontFacing) {
                    inputs.push(self.special_member(
                        KnownVariable::FrontFacing,
                        "SV_IsFrontFace".to_owned(),
                    )?);
                }

                let mut outputs = Vec::new();
                if self.special_used(KnownVariable::FragData) {
                    outputs.push(Member {
                        declaration: "float4 gl_FragData0".to_owned(),
                        semantic: "SV_Target0".to_owned(),
                        global: "gl_FragData[0]".to_owned(),
                        member: "gl_FragData0".to_owned(),
                    });
                } else {
                    outputs.push(
                        self.special_member(KnownVariable::FragColor, "SV_Target0".to_owned())?,
                    );
                }

                if self.special_used(KnownVariable::FragDepthExt) {
                    outputs.push(
                        self.special_member(KnownVariable::FragDepthExt, "SV_Depth".to_owned())?,
                    );
                }

                (inputs, outputs, "PS")
            }
        };

        debug!(
            "entry point with {} inputs and {} outputs",
            inputs.len(),
            outputs.len()
        );

        let input_type = format!("{}_INPUT", prefix);
        let output_type = format!("{}_OUTPUT", prefix);

        let mut params = Vec::with_capacity(2);
        if !inputs.is_empty() {
            self.members(&input_type, &inputs)?;
            params.push(format!("in {} input", input_type));
        }
        self.members(&output_type, &outputs)?;
        params.push(format!("out {} output", output_type));

        self.line(format_args!("void main({})", params.join(", ")))?;
        self.line("{")?;
        self.indent += 1;
        for input in &inputs {
            self.line(format_args!("{} = input.{};", input.global, input.member))?;
        }
        self.line("gl_main();")?;
        for output in &outputs {
            self.line(format_args!("output.{} = {};", output.member, output.global))?;
        }
        self.indent -= 1;
        self.line("}")
    }

    /// Declarations of the built-in variables the translated code refers to
    pub(super) fn builtin_globals(&self) -> Result<String> {
        let mut out = String::new();
        let stage = self.cx.stage();

        if self.special_used(KnownVariable::DepthRange) {
            let ty = self.cx.depth_range_type().ok_or_else(|| {
                Error::internal("gl_DepthRange used without its structure type")
            })?;
            let s = ty.as_struct().ok_or_else(|| {
                Error::internal("gl_DepthRangeParameters is not a structure")
            })?;

            writeln!(out, "struct {}\n{{", self.struct_name(s.id())?)?;
            for field in s.fields() {
                writeln!(out, "    float {};", self.field_name(field.name))?;
            }
            writeln!(out, "}};\n")?;
            writeln!(
                out,
                "static const {} gl_DepthRange = {{0.0, 1.0, 1.0}};\n",
                self.struct_name(s.id())?
            )?;
        }

        let declared = [
            KnownVariable::Position,
            KnownVariable::PointSize,
            KnownVariable::FragCoord,
            KnownVariable::FrontFacing,
            KnownVariable::FragColor,
            KnownVariable::FragData,
            KnownVariable::PointCoord,
            KnownVariable::FragDepthExt,
        ];

        let mut any = false;
        for variable in declared.iter().copied() {
            let info = match self.special(variable) {
                Some(info) => info,
                None => continue,
            };

            let always = match variable {
                KnownVariable::Position => stage == ShaderStage::Vertex,
                KnownVariable::FragColor => !self.special_used(KnownVariable::FragData),
                _ => false,
            };

            if info.used || always {
                let declaration = self.declaration(&info.ty, variable.entry().hlsl)?;
                writeln!(out, "static {};", declaration)?;
                any = true;
            }
        }

        if any {
            out.push('\n');
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn varying_semantics_are_distinct() {
        assert_eq!(varying_semantic("_uv"), "VARYING_uv_");
        assert_eq!(varying_semantic("_uv0"), "VARYING_uv0_");
        assert_eq!(varying_semantic("_Uv"), "VARYING___uv_");

        let names = ["_uv", "_UV", "_uV", "_uv0", "_uv_0", "_u_v"];
        let mut semantics: Vec<_> = names
            .iter()
            .map(|name| varying_semantic(name).to_ascii_uppercase())
            .collect();
        semantics.sort();
        semantics.dedup();
        assert_eq!(semantics.len(), names.len());
    }
}
