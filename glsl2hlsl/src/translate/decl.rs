//! Global declarations, structures and functions

use std::collections::BTreeSet;

use super::expr::{list, sampler_pair};
use super::Translator;
use crate::ident::Storage;
use crate::signature::ParamQualifier;
use crate::tree::{NodeId, NodeKind};
use crate::types::{StructType, Type};
use crate::{Error, Result};

/// Generated functions needed by a structure
#[derive(Debug, Default, Clone, Copy)]
struct StructUses {
    constructor: bool,
    equality: bool,
}

impl Translator<'_> {
    /// Translate the whole unit: hoisted structures, then declarations in source order
    pub(super) fn unit(&mut self) -> Result<()> {
        let root = self.tree.root();
        let uses = self.struct_uses(&self.tree.descendants(root))?;

        let mut structs = Vec::new();
        self.struct_specifiers(root, &mut structs);
        for node in structs {
            self.structure(node, &uses)?;
        }

        for declaration in self.tree.children(root).to_vec() {
            match self.tree.kind(declaration) {
                NodeKind::DeclarationList { .. } => self.global(declaration)?,
                NodeKind::FunctionPrototype => {
                    let header = self.child(declaration, 0)?;
                    let signature = self.signature(header)?;
                    self.line(format_args!("{};", signature))?;
                    self.blank();
                }
                NodeKind::FunctionDefinition => {
                    let header = self.child(declaration, 0)?;
                    let body = self.child(declaration, 1)?;
                    let signature = self.signature(header)?;
                    self.line(signature)?;
                    self.statement(body)?;
                    self.blank();
                }
                NodeKind::PrecisionDeclaration { .. } | NodeKind::InvariantDeclaration => {}
                other => return Err(Error::internal(format!("{:?} at global scope", other))),
            }
        }

        Ok(())
    }

    fn child(&self, id: NodeId, index: usize) -> Result<NodeId> {
        self.tree
            .child(id, index)
            .ok_or_else(|| {
                Error::internal(format!("missing child {} of {:?}", index, self.tree.kind(id)))
            })
    }

    /// Structure specifiers under `id`, nested definitions first
    fn struct_specifiers(&self, id: NodeId, out: &mut Vec<NodeId>) {
        for child in self.tree.children(id) {
            self.struct_specifiers(*child, out);
        }

        if let NodeKind::StructSpecifier { .. } = self.tree.kind(id) {
            out.push(id);
        }
    }

    /// Structure ids needing a generated constructor or equality function
    fn struct_uses(&self, nodes: &[NodeId]) -> Result<Vec<(u32, StructUses)>> {
        let mut constructors = BTreeSet::new();
        let mut equalities = BTreeSet::new();

        for node in nodes {
            match self.tree.kind(*node) {
                NodeKind::StructConstructor(_) => {
                    if let Type::Struct(s) = self.type_of(*node)? {
                        constructors.insert(s.id());
                    }
                }
                NodeKind::Binary(op) if op.is_equality() => {
                    let left = self.child(*node, 0)?;
                    if let Type::Struct(s) = self.type_of(left)? {
                        collect_equalities(s, &mut equalities);
                    }
                }
                _ => {}
            }
        }

        Ok(constructors
            .union(&equalities)
            .map(|id| {
                (
                    *id,
                    StructUses {
                        constructor: constructors.contains(id),
                        equality: equalities.contains(id),
                    },
                )
            })
            .collect())
    }

    /// Translate a structure definition and the functions generated for it
    fn structure(&mut self, id: NodeId, uses: &[(u32, StructUses)]) -> Result<()> {
        let ty = self.type_of(id)?;
        let s = match ty {
            Type::Struct(s) => s,
            _ => return Err(Error::internal("structure specifier without a structure type")),
        };

        let name = self.struct_name(s.id())?;
        self.line(format_args!("struct {}", name))?;
        self.line("{")?;
        self.indent += 1;
        for field in s.fields() {
            let declaration = self.declaration(&field.ty, &self.field_name(field.name))?;
            self.line(format_args!("{};", declaration))?;
        }
        self.indent -= 1;
        self.line("};")?;
        self.blank();

        let uses = uses
            .iter()
            .find(|(id, _)| *id == s.id())
            .map(|(_, uses)| *uses)
            .unwrap_or_default();

        if uses.constructor {
            self.struct_constructor(name, s)?;
        }

        if uses.equality {
            self.struct_equality(name, s)?;
        }

        Ok(())
    }

    fn struct_constructor(&mut self, name: &str, s: &StructType) -> Result<()> {
        let params = s
            .fields()
            .iter()
            .map(|field| {
                let declaration = self.declaration(&field.ty, &self.field_name(field.name))?;
                Ok(format!("in {}", declaration))
            })
            .collect::<Result<Vec<_>>>()?;

        self.line(format_args!("{} gl_ctor{}({})", name, name, list(params)))?;
        self.line("{")?;
        self.indent += 1;
        self.line(format_args!("{} result;", name))?;
        for field in s.fields() {
            let field = self.field_name(field.name);
            self.line(format_args!("result.{} = {};", field, field))?;
        }
        self.line("return result;")?;
        self.indent -= 1;
        self.line("}")?;
        self.blank();
        Ok(())
    }

    fn struct_equality(&mut self, name: &str, s: &StructType) -> Result<()> {
        let terms = s
            .fields()
            .iter()
            .map(|field| {
                let field_name = self.field_name(field.name);
                self.equality_term(
                    &field.ty,
                    &format!("a.{}", field_name),
                    &format!("b.{}", field_name),
                )
            })
            .collect::<Result<Vec<_>>>()?;

        self.line(format_args!("bool gl_equal{}({} a, {} b)", name, name, name))?;
        self.line("{")?;
        self.indent += 1;
        self.line(format_args!("return {};", terms.join(" && ")))?;
        self.indent -= 1;
        self.line("}")?;
        self.blank();
        Ok(())
    }

    /// Boolean expression comparing `a` and `b` of type `ty`
    fn equality_term(&self, ty: &Type, a: &str, b: &str) -> Result<String> {
        match ty {
            Type::Basic(basic) if basic.is_scalar() => Ok(format!("{} == {}", a, b)),
            Type::Basic(_) => Ok(format!("all({} == {})", a, b)),
            Type::Struct(inner) => Ok(format!(
                "gl_equal{}({}, {})",
                self.struct_name(inner.id())?,
                a,
                b
            )),
            Type::Array { element, size } => {
                let terms = (0..*size)
                    .map(|i| {
                        self.equality_term(
                            element,
                            &format!("{}[{}]", a, i),
                            &format!("{}[{}]", b, i),
                        )
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(format!("({})", terms.join(" && ")))
            }
        }
    }

    /// Declaration of a variable with its initializer: `float3 _v = float3(0.0, 1.0, 0.0)`
    pub(super) fn variable(&mut self, declarator: NodeId) -> Result<String> {
        let cx = self.cx;
        let info = cx.idents().get(self.ident(declarator)?);
        let mut text = self.declaration(self.type_of(declarator)?, info.name())?;

        let initializer = self
            .tree
            .children(declarator)
            .iter()
            .copied()
            .find(|c| *self.tree.kind(*c) == NodeKind::Initializer);

        if let Some(initializer) = initializer {
            let value = self.child(initializer, 0)?;
            text.push_str(" = ");
            text.push_str(&self.expr(value)?);
        }

        Ok(text)
    }

    /// Translate a global declaration list
    fn global(&mut self, list: NodeId) -> Result<()> {
        let storage = match self.tree.kind(list) {
            NodeKind::DeclarationList { storage, .. } => *storage,
            _ => return Err(Error::internal("not a declaration list")),
        };

        let declarators = self.tree.children(list).get(1..).unwrap_or(&[]).to_vec();
        if declarators.is_empty() {
            return Ok(());
        }

        for declarator in declarators {
            let ty = self.type_of(declarator)?;

            match storage {
                Storage::Uniform if ty.is_sampler_or_array() => {
                    let cx = self.cx;
                    let info = cx.idents().get(self.ident(declarator)?);
                    let (sampler, texture) = sampler_pair(ty, (info.name_at(0), info.name_at(1)))?;
                    let count = match ty {
                        Type::Array { size, .. } => *size,
                        _ => 1,
                    };

                    let register = self.next_register;
                    self.next_register += count;

                    self.line(format_args!("uniform {} : register(s{});", sampler, register))?;
                    self.line(format_args!("uniform {} : register(t{});", texture, register))?;
                }
                Storage::Uniform => {
                    let text = self.variable(declarator)?;
                    self.line(format_args!("uniform {};", text))?;
                }
                Storage::Const => {
                    let text = self.variable(declarator)?;
                    self.line(format_args!("static const {};", text))?;
                }
                Storage::None | Storage::Attribute | Storage::Varying => {
                    let text = self.variable(declarator)?;
                    self.line(format_args!("static {};", text))?;
                }
            }
        }

        self.blank();
        Ok(())
    }

    /// Function signature: `float f_g(in float3 _v, out float _o)`
    fn signature(&self, header: NodeId) -> Result<String> {
        let cx = self.cx;
        let info = cx.idents().get(self.ident(header)?);
        let function = info
            .as_function()
            .ok_or_else(|| Error::internal("function header of a non-function"))?;

        let children = self.tree.children(header).to_vec();
        let mut params = Vec::with_capacity(children.len().saturating_sub(2));

        for (param, node) in function.signature.params.iter().zip(&children[2..]) {
            let qualifier = match param.qualifier {
                ParamQualifier::In => "in",
                ParamQualifier::Out => "out",
                ParamQualifier::InOut => "inout",
            };

            let names = match self.tree.node(*node).ident() {
                Some(ident) => {
                    let ident = cx.idents().get(ident);
                    (ident.name_at(0), ident.name_at(1))
                }
                None => ("", ""),
            };

            if param.ty.is_sampler_or_array() {
                let (sampler, texture) = sampler_pair(&param.ty, names)?;
                params.push(sampler);
                params.push(texture);
            } else {
                let declaration = self.declaration(&param.ty, names.0)?;
                params.push(format!("{} {}", qualifier, declaration));
            }
        }

        let return_type = self.type_name(&function.signature.return_type)?;
        Ok(format!("{} {}({})", return_type, info.name(), list(params)))
    }
}

/// Add `s` and every structure nested in it to `out`
fn collect_equalities(s: &StructType, out: &mut BTreeSet<u32>) {
    out.insert(s.id());

    for field in s.fields() {
        if let Type::Struct(inner) = &field.ty {
            collect_equalities(inner, out);
        }
    }
}
