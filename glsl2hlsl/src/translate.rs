//! HLSL emission from a verified syntax tree
//!
//! The translation runs in a single pass over the tree. Structure definitions are hoisted to
//! the top of the output, followed by the global declarations and functions in source order.
//! Helper functions referenced by the output and the stage entry point are added around the
//! translated unit depending on the [CompileOptions](crate::CompileOptions).

use std::collections::{BTreeSet, HashMap};
use std::fmt::Write;

use crate::context::Context;
use crate::ident::InfoId;
use crate::known::Helper;
use crate::tree::{NodeId, Tree, VerifyState};
use crate::types::{BasicType, Type};
use crate::{Error, Result};

mod decl;
mod entry;
mod expr;
mod helpers;
mod stmt;

const INDENT: &str = "    ";

/// Translate a verified tree to HLSL
///
/// # Parameters
///
/// * `tree`: tree verified with `cx`
/// * `cx`: compilation context
///
/// # Errors
///
/// Returns [Error::NotVerified] if the tree did not verify cleanly, or an internal error if
/// the tree contradicts the facts recorded while verifying it.
pub fn translate(tree: &Tree, cx: &Context) -> Result<String> {
    if tree.node(tree.root()).state() != VerifyState::Verified || cx.has_errors() {
        return Err(Error::NotVerified);
    }

    info!("translating {:?} shader", cx.stage());

    let mut translator = Translator::new(tree, cx);
    translator.unit()?;

    let body = std::mem::take(&mut translator.out);

    if cx.options().emit_entry_point {
        translator.entry_point()?;
    }
    let entry = std::mem::take(&mut translator.out);

    let mut output = String::new();
    if cx.options().emit_helpers {
        output.push_str(&helpers::prelude(&translator.helpers, cx.stage())?);
    }
    output.push_str(&translator.builtin_globals()?);
    output.push_str(&body);
    output.push_str(&entry);

    debug!(
        "translated into {} bytes using {} helpers",
        output.len(),
        translator.helpers.len()
    );

    Ok(output)
}

/// HLSL spelling of a basic type
fn basic_name(basic: BasicType) -> Result<&'static str> {
    use BasicType::*;

    Ok(match basic {
        Void => "void",
        Float => "float",
        Vec2 => "float2",
        Vec3 => "float3",
        Vec4 => "float4",
        Int => "int",
        IVec2 => "int2",
        IVec3 => "int3",
        IVec4 => "int4",
        Bool => "bool",
        BVec2 => "bool2",
        BVec3 => "bool3",
        BVec4 => "bool4",
        Mat2 => "float2x2",
        Mat3 => "float3x3",
        Mat4 => "float4x4",
        Sampler2D => "Texture2D",
        SamplerCube => "TextureCube",
        GenType | VecType | IVecType | BVecType => {
            return Err(Error::internal(format!(
                "pseudo-type {} in translated code",
                basic.glsl_name()
            )))
        }
    })
}

/// Output state of a translation
pub(crate) struct Translator<'a> {
    tree: &'a Tree,
    cx: &'a Context,
    out: String,
    indent: usize,
    /// Helpers the output refers to
    helpers: BTreeSet<Helper>,
    /// Type name identifiers by structure id
    structs: HashMap<u32, InfoId>,
    /// Next free sampler and texture register
    next_register: u32,
}

impl<'a> Translator<'a> {
    fn new(tree: &'a Tree, cx: &'a Context) -> Self {
        let structs = cx
            .idents()
            .iter()
            .filter_map(|(id, info)| match info.as_type_name() {
                Some(Type::Struct(s)) => Some((s.id(), id)),
                _ => None,
            })
            .collect();

        Self {
            tree,
            cx,
            out: String::new(),
            indent: 0,
            helpers: BTreeSet::new(),
            structs,
            next_register: 0,
        }
    }

    /// Write one indented line
    fn line(&mut self, text: impl std::fmt::Display) -> Result<()> {
        for _ in 0..self.indent {
            self.out.push_str(INDENT);
        }

        writeln!(self.out, "{}", text)?;
        Ok(())
    }

    fn blank(&mut self) {
        self.out.push('\n');
    }

    /// Identifier resolved for `id` during verification
    fn ident(&self, id: NodeId) -> Result<InfoId> {
        self.tree.node(id).ident().ok_or_else(|| {
            Error::internal(format!("unresolved {:?}", self.tree.kind(id)))
        })
    }

    /// Verified type of `id`
    fn type_of(&self, id: NodeId) -> Result<&'a Type> {
        self.tree
            .ty(id)
            .ok_or_else(|| Error::internal(format!("untyped {:?}", self.tree.kind(id))))
    }

    /// Output name of a structure type
    fn struct_name(&self, id: u32) -> Result<&'a str> {
        let info = self
            .structs
            .get(&id)
            .ok_or_else(|| Error::internal(format!("unknown structure {}", id)))?;
        Ok(self.cx.idents().get(*info).name())
    }

    /// Output name of a structure field
    fn field_name(&self, field: crate::symbols::SymbolIndex) -> String {
        format!("_{}", self.cx.text(field))
    }

    /// HLSL type of a value, without its array size
    fn type_name(&self, ty: &Type) -> Result<String> {
        match ty {
            Type::Basic(basic) => Ok(basic_name(*basic)?.to_owned()),
            Type::Array { element, .. } => self.type_name(element),
            Type::Struct(s) => Ok(self.struct_name(s.id())?.to_owned()),
        }
    }

    /// Declaration of `name` with type `ty`: `float3 _v` or `float _a[4]`
    fn declaration(&self, ty: &Type, name: &str) -> Result<String> {
        let mut text = format!("{} {}", self.type_name(ty)?, name);
        if let Type::Array { size, .. } = ty {
            write!(text, "[{}]", size)?;
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{CompileOptions, ShaderStage};
    use crate::parse::parse_str;
    use crate::verify::verify;

    #[test]
    fn refuses_unverified_trees() {
        let mut cx = Context::new(CompileOptions::for_stage(ShaderStage::Fragment)).unwrap();
        let tree = parse_str("void main() { }", &mut cx).unwrap();

        assert!(matches!(translate(&tree, &cx), Err(Error::NotVerified)));
    }

    #[test]
    fn refuses_trees_with_errors() {
        let mut cx = Context::new(CompileOptions::for_stage(ShaderStage::Fragment)).unwrap();
        let mut tree = parse_str("void main() { x = 1.0; }", &mut cx).unwrap();
        assert!(verify(&mut tree, &mut cx).is_err());

        assert!(matches!(translate(&tree, &cx), Err(Error::NotVerified)));
    }

    #[test]
    fn basic_names() {
        assert_eq!(basic_name(BasicType::Vec3).unwrap(), "float3");
        assert_eq!(basic_name(BasicType::BVec2).unwrap(), "bool2");
        assert_eq!(basic_name(BasicType::Mat4).unwrap(), "float4x4");
        assert!(basic_name(BasicType::GenType).is_err());
    }
}
