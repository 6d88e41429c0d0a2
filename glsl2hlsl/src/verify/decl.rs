//! Declarations: types, variables, parameters and functions

use super::{const_expression, Verifier};
use crate::error::{Error, ErrorCode, Fault, VResult};
use crate::ident::{AddResult, InfoId, Namespace, Precision, Storage, VariableInfo};
use crate::known::{KnownSymbol, KnownVariable};
use crate::options::ShaderStage;
use crate::signature::{FunctionSignature, ParamQualifier, Parameter};
use crate::symbols::SymbolIndex;
use crate::tree::{ConstantValue, NodeId, NodeKind, TypeSpec};
use crate::types::{BasicType, ScalarKind, StructField, Type};

/// Float scalars, vectors and matrices
fn is_float_type(ty: &Type) -> bool {
    matches!(ty.as_basic(), Some(b) if b.scalar_kind() == Some(ScalarKind::Float))
}

fn is_varying_type(ty: &Type) -> bool {
    match ty {
        Type::Array { element, .. } => is_float_type(element),
        other => is_float_type(other),
    }
}

impl Verifier<'_> {
    /// Turn the outcome of an identifier table insertion into a verification result
    fn declared(&mut self, id: NodeId, result: AddResult, symbol: SymbolIndex) -> VResult<InfoId> {
        match result {
            Ok(info) => Ok(info),
            Err(code) => {
                let name = self.text(symbol);
                self.fail(id, code, Some(name))
            }
        }
    }

    /// Precision written on a type specifier
    fn precision_of(&self, spec: NodeId) -> Precision {
        match self.tree.kind(spec) {
            NodeKind::TypeSpecifier { precision, .. } => *precision,
            _ => Precision::None,
        }
    }

    /// Base type of a declarator, wrapped into an array when it has a size
    fn declarator_type(&self, id: NodeId, base: Type) -> VResult<Type> {
        let specifier = self
            .tree
            .children(id)
            .iter()
            .copied()
            .find(|c| *self.tree.kind(*c) == NodeKind::ArraySpecifier);

        let specifier = match specifier {
            Some(specifier) => specifier,
            None => return Ok(base),
        };

        if !self.tree.node(specifier).is_verified() {
            return Err(Fault::Reported);
        }

        match self.tree.node(specifier).constant().as_int() {
            Some(size) => Ok(Type::array_of(base, size as u32)),
            None => Err(Fault::Internal(Error::internal("array specifier without a size"))),
        }
    }

    pub(super) fn verify_type_specifier(&mut self, id: NodeId, spec: &TypeSpec) -> VResult<()> {
        let ty = match spec {
            TypeSpec::Basic(basic) => Type::from(*basic),
            TypeSpec::Named(symbol) => {
                let found = self.lookup(id, Namespace::Value, *symbol);
                let named = match found[..] {
                    [info] => self.cx.idents.get(info).as_type_name().cloned(),
                    _ => None,
                };

                match named {
                    Some(ty) => ty,
                    None => {
                        let code = if found.is_empty() {
                            ErrorCode::UndeclaredIdentifier
                        } else {
                            ErrorCode::InvalidIdentifierUsage
                        };
                        let name = self.text(*symbol);
                        return self.fail(id, code, Some(name));
                    }
                }
            }
            TypeSpec::Struct => {
                let specifier = self.child(id, 0)?;
                self.checked_type(specifier)?
            }
        };

        self.tree.set_ty(id, ty);
        Ok(())
    }

    pub(super) fn verify_struct_specifier(
        &mut self,
        id: NodeId,
        name: Option<SymbolIndex>,
        children_failed: bool,
    ) -> VResult<()> {
        if children_failed {
            return Err(Fault::Reported);
        }

        let mut fields: Vec<StructField> = Vec::new();

        for declaration in self.tree.children(id).to_vec() {
            let declarators = self.tree.children(declaration).get(1..).unwrap_or(&[]).to_vec();
            for declarator in declarators {
                let field = match self.tree.kind(declarator) {
                    NodeKind::StructFieldDeclarator { name } => *name,
                    other => {
                        return Err(Fault::Internal(Error::internal(format!(
                            "{:?} in a structure",
                            other
                        ))))
                    }
                };

                let ty = self.type_of(declarator)?;

                if fields.iter().any(|f| f.name == field) {
                    let name = self.text(field);
                    return self.fail(declarator, ErrorCode::Redeclaration, Some(name));
                }

                if ty.is_void() {
                    let name = self.text(field);
                    return self.fail(declarator, ErrorCode::VoidVariable, Some(name));
                }

                if ty.contains_sampler() {
                    let name = self.text(field);
                    return self.fail(declarator, ErrorCode::SamplerInStruct, Some(name));
                }

                fields.push(StructField { name: field, ty });
            }
        }

        let struct_id = self.cx.new_struct_id();
        let symbol = match name {
            Some(symbol) => {
                self.check_name(id, symbol)?;
                symbol
            }
            // Reserved spelling, user code cannot refer to it
            None => self.cx.intern(&format!("__anon{}", struct_id))?,
        };

        let ty = Type::structure(struct_id, symbol, fields);
        let scope = self.declaring_scope(id);
        let result = self
            .cx
            .idents
            .add_type_name(&self.cx.symbols, scope, id, symbol, ty.clone());
        let info = self.declared(id, result, symbol)?;

        self.tree.set_ty(id, ty);
        self.tree.set_ident(id, info);
        Ok(())
    }

    pub(super) fn verify_field_declarator(&mut self, id: NodeId, name: SymbolIndex) -> VResult<()> {
        let declaration = self
            .tree
            .parent(id)
            .ok_or_else(|| Fault::Internal(Error::internal("detached field declarator")))?;
        let spec = self.child(declaration, 0)?;
        let base = self.checked_type(spec)?;

        self.check_name(id, name)?;
        let ty = self.declarator_type(id, base)?;
        self.tree.set_ty(id, ty);
        Ok(())
    }

    pub(super) fn verify_array_specifier(&mut self, id: NodeId, children_failed: bool) -> VResult<()> {
        if children_failed {
            return Err(Fault::Reported);
        }

        let size = self.child(id, 0)?;
        let value = const_expression(self.tree, self.cx, size, false)
            .and_then(|constant| constant.as_int())
            .filter(|value| *value > 0 && *value <= i64::from(u32::MAX));

        match value {
            Some(value) => {
                self.tree.set_constant(id, ConstantValue::int(value));
                Ok(())
            }
            None => {
                let context = self.tree.ty(size).map(|ty| self.describe(ty));
                self.fail(id, ErrorCode::InvalidArraySize, context)
            }
        }
    }

    pub(super) fn verify_initializer(&mut self, id: NodeId, children_failed: bool) -> VResult<()> {
        if children_failed {
            return Err(Fault::Reported);
        }

        let value = self.child(id, 0)?;
        let ty = self.type_of(value)?;
        let constant = self.tree.node(value).constant().clone();

        self.tree.set_ty(id, ty);
        self.tree.set_constant(id, constant);
        Ok(())
    }

    /// Check the qualifiers of a variable declaration against its type and scope
    fn check_qualifiers(
        &mut self,
        id: NodeId,
        ty: &Type,
        storage: Storage,
        invariant: bool,
        global: bool,
        initialized: bool,
    ) -> VResult<()> {
        let msg = |message: &str| Some(message.to_owned());

        if storage.is_interface() {
            if !global {
                return self.fail(id, ErrorCode::InvalidQualifier, msg("interface variables must be global"));
            }

            if initialized {
                return self.fail(id, ErrorCode::InvalidQualifier, msg("interface variables cannot be initialized"));
            }
        }

        match storage {
            Storage::Attribute if self.cx.stage() == ShaderStage::Fragment => {
                return self.fail(id, ErrorCode::InvalidQualifier, msg("attributes are only allowed in vertex shaders"));
            }
            Storage::Attribute if !is_float_type(ty) => {
                let context = self.describe(ty);
                return self.fail(id, ErrorCode::InvalidAttributeType, Some(context));
            }
            Storage::Varying if !is_varying_type(ty) => {
                let context = self.describe(ty);
                return self.fail(id, ErrorCode::InvalidVaryingType, Some(context));
            }
            _ => {}
        }

        if ty.contains_sampler() && storage != Storage::Uniform {
            return self.fail(id, ErrorCode::InvalidQualifier, msg("samplers must be uniform"));
        }

        if invariant && storage != Storage::Varying {
            return self.fail(id, ErrorCode::InvalidQualifier, msg("only varyings can be invariant"));
        }

        if storage == Storage::Const && !initialized {
            return self.fail(id, ErrorCode::MissingConstInitializer, None);
        }

        Ok(())
    }

    /// Check an initializer, returning the constant a `const` variable takes
    fn check_initializer(
        &mut self,
        init: NodeId,
        ty: &Type,
        storage: Storage,
        global: bool,
    ) -> VResult<Option<ConstantValue>> {
        let init_ty = self.checked_type(init)?;

        if &init_ty != ty {
            let context = format!(
                "cannot initialize {} with {}",
                self.describe(ty),
                self.describe(&init_ty)
            );
            return self.fail(init, ErrorCode::TypeMismatch, Some(context));
        }

        let value = self.tree.node(init).constant().clone();
        if (global || storage == Storage::Const) && !value.is_constant() {
            return self.fail(init, ErrorCode::NotConstantExpression, None);
        }

        Ok(if storage == Storage::Const {
            Some(value)
        } else {
            None
        })
    }

    pub(super) fn verify_declarator(&mut self, id: NodeId, name: SymbolIndex) -> VResult<()> {
        let list = self
            .tree
            .parent(id)
            .ok_or_else(|| Fault::Internal(Error::internal("detached declarator")))?;

        let (storage, invariant) = match self.tree.kind(list) {
            NodeKind::DeclarationList { storage, invariant } => (*storage, *invariant),
            other => {
                return Err(Fault::Internal(Error::internal(format!(
                    "declarator under {:?}",
                    other
                ))))
            }
        };

        let spec = self.child(list, 0)?;
        let base = self.checked_type(spec)?;
        let precision = self.precision_of(spec);

        self.check_name(id, name)?;
        let ty = self.declarator_type(id, base)?;

        let is_void = match &ty {
            Type::Array { element, .. } => element.is_void(),
            other => other.is_void(),
        };
        if is_void {
            let name = self.text(name);
            return self.fail(id, ErrorCode::VoidVariable, Some(name));
        }

        let scope = self.declaring_scope(id);
        let initializer = self
            .tree
            .children(id)
            .iter()
            .copied()
            .find(|c| *self.tree.kind(*c) == NodeKind::Initializer);

        self.check_qualifiers(
            id,
            &ty,
            storage,
            invariant,
            scope.is_global(),
            initializer.is_some(),
        )?;

        // The variable is declared even with a bad initializer, to avoid follow-up errors
        let checked = match initializer {
            Some(init) => self.check_initializer(init, &ty, storage, scope.is_global()),
            None => Ok(None),
        };

        let loop_index = self
            .tree
            .parent(list)
            .map(|p| {
                matches!(self.tree.kind(p), NodeKind::For { .. })
                    && self.tree.child(p, 0) == Some(list)
            })
            .unwrap_or(false);

        let mut variable = VariableInfo::new(ty.clone(), storage);
        variable.precision = precision;
        variable.invariant = invariant;
        variable.loop_index = loop_index;
        variable.constant = checked.as_ref().ok().cloned().flatten();

        let result = self
            .cx
            .idents
            .add_variable(&self.cx.symbols, scope, id, name, variable);
        let info = self.declared(id, result, name)?;

        self.tree.set_ty(id, ty);
        self.tree.set_ident(id, info);
        checked.map(|_| ())
    }

    pub(super) fn verify_parameter(
        &mut self,
        id: NodeId,
        qualifier: ParamQualifier,
        is_const: bool,
        name: Option<SymbolIndex>,
        children_failed: bool,
    ) -> VResult<()> {
        if children_failed {
            return Err(Fault::Reported);
        }

        let spec = self.child(id, 0)?;
        let base = self.type_of(spec)?;
        let ty = self.declarator_type(id, base)?;

        if ty.is_void() {
            let context = name.map(|n| self.text(n));
            return self.fail(id, ErrorCode::VoidParameter, context);
        }

        if is_const && qualifier.writes() {
            return self.fail(
                id,
                ErrorCode::InvalidQualifier,
                Some("const parameters must be input parameters".to_owned()),
            );
        }

        if ty.contains_sampler() && qualifier.writes() {
            return self.fail(
                id,
                ErrorCode::InvalidQualifier,
                Some("samplers must be input parameters".to_owned()),
            );
        }

        self.tree.set_ty(id, ty.clone());

        if let Some(name) = name {
            self.check_name(id, name)?;

            let storage = if is_const {
                Storage::Const
            } else {
                Storage::None
            };

            let mut variable = VariableInfo::new(ty, storage);
            variable.parameter = Some(qualifier);
            variable.precision = self.precision_of(spec);

            let scope = self.declaring_scope(id);
            let result = self
                .cx
                .idents
                .add_variable(&self.cx.symbols, scope, id, name, variable);
            let info = self.declared(id, result, name)?;
            self.tree.set_ident(id, info);
        }

        Ok(())
    }

    pub(super) fn verify_function_header(&mut self, id: NodeId, children_failed: bool) -> VResult<()> {
        if children_failed {
            return Err(Fault::Reported);
        }

        let children = self.tree.children(id).to_vec();
        let return_type = self.type_of(children[0])?;
        let name = match self.tree.kind(children[1]) {
            NodeKind::FunctionName(name) => *name,
            other => {
                return Err(Fault::Internal(Error::internal(format!(
                    "{:?} as function name",
                    other
                ))))
            }
        };

        let is_main = name == self.cx.known(KnownSymbol::Main);
        if !is_main {
            self.check_name(children[1], name)?;
        }

        let parent = self
            .tree
            .parent(id)
            .ok_or_else(|| Fault::Internal(Error::internal("detached function header")))?;

        if self.tree.parent(parent) != Some(self.tree.root()) {
            let name = self.text(name);
            return self.fail(id, ErrorCode::NestedFunction, Some(name));
        }

        let mut params = Vec::with_capacity(children.len() - 2);
        for param in &children[2..] {
            let (qualifier, is_const) = match self.tree.kind(*param) {
                NodeKind::ParameterDeclaration {
                    qualifier,
                    is_const,
                    ..
                } => (*qualifier, *is_const),
                other => {
                    return Err(Fault::Internal(Error::internal(format!(
                        "{:?} as parameter",
                        other
                    ))))
                }
            };

            params.push(Parameter {
                ty: self.type_of(*param)?,
                qualifier,
                is_const,
            });
        }

        if is_main && (!return_type.is_void() || !params.is_empty()) {
            return self.fail(id, ErrorCode::InvalidMain, None);
        }

        let definition = if *self.tree.kind(parent) == NodeKind::FunctionDefinition {
            Some(parent)
        } else {
            None
        };

        let signature = FunctionSignature::new(return_type, params);
        let result = self
            .cx
            .idents
            .add_function(&self.cx.symbols, id, name, signature, definition);
        let info = self.declared(id, result, name)?;

        self.tree.set_ident(id, info);

        if is_main && definition.is_some() {
            self.cx.set_entry_point(info);
        }

        Ok(())
    }

    pub(super) fn verify_precision_declaration(
        &mut self,
        id: NodeId,
        precision: Precision,
        ty: BasicType,
    ) -> VResult<()> {
        let valid = matches!(
            ty,
            BasicType::Float | BasicType::Int | BasicType::Sampler2D | BasicType::SamplerCube
        );

        if !valid {
            let context = format!("precision {:?} for {}", precision, ty.glsl_name());
            return self.fail(id, ErrorCode::InvalidQualifier, Some(context));
        }

        Ok(())
    }

    pub(super) fn verify_invariant_declaration(
        &mut self,
        id: NodeId,
        children_failed: bool,
    ) -> VResult<()> {
        if children_failed {
            return Err(Fault::Reported);
        }

        if !self.declaring_scope(id).is_global() {
            return self.fail(
                id,
                ErrorCode::InvalidQualifier,
                Some("invariant declarations must be global".to_owned()),
            );
        }

        for child in self.tree.children(id).to_vec() {
            let info = self
                .tree
                .node(child)
                .ident()
                .ok_or_else(|| Fault::Internal(Error::internal("unresolved invariant")))?;

            let allowed = match self.cx.idents.get(info).as_variable() {
                Some(variable) => {
                    (variable.storage == Storage::Varying && variable.special.is_none())
                        || matches!(
                            variable.special,
                            Some(KnownVariable::Position)
                                | Some(KnownVariable::PointSize)
                                | Some(KnownVariable::FragCoord)
                                | Some(KnownVariable::PointCoord)
                        )
                }
                None => false,
            };

            if !allowed {
                let name = self.text(self.cx.idents.get(info).symbol);
                return self.fail(child, ErrorCode::InvalidQualifier, Some(name));
            }

            if let Some(variable) = self.cx.idents.get_mut(info).as_variable_mut() {
                variable.invariant = true;
            }
        }

        Ok(())
    }
}
