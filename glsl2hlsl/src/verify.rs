//! Semantic verification of the syntax tree
//!
//! Every node goes through the same steps: a pre-order hook assigning scopes, the verification
//! of its children, then the checks of the node itself. A node whose children failed still
//! runs the checks that do not depend on them, so unrelated errors are all reported in one
//! pass. Expressions depend on the types of their operands and give up as soon as one of them
//! failed.

use crate::context::Context;
use crate::error::{Error, ErrorCode, Fault, VResult};
use crate::ident::{InfoId, Namespace, ScopeId};
use crate::symbols::SymbolIndex;
use crate::tree::{NodeId, NodeKind, Tree, VerifyState};
use crate::types::Type;
use crate::Result;

mod constexpr;
mod decl;
mod expr;
mod lvalue;
mod stmt;

pub use constexpr::const_expression;

/// Verify a parsed translation unit
///
/// # Returns
///
/// `Ok(())` if the tree is ready for translation, otherwise every diagnostic reported so far
/// in the context, including the ones recorded while parsing.
///
/// # Errors
///
/// Returns the diagnostics as [Error::Diagnostics], or an internal error if an invariant of the
/// tree or of the built-in tables was violated.
pub fn verify(tree: &mut Tree, cx: &mut Context) -> Result<()> {
    info!("verifying {} nodes", tree.len());

    let root = tree.root();
    let result = Verifier {
        tree: &mut *tree,
        cx: &mut *cx,
    }
    .verify_node(root);

    match result {
        Ok(()) | Err(Fault::Reported) => {}
        Err(Fault::Internal(error)) => return Err(error),
    }

    if cx.has_errors() {
        Err(Error::Diagnostics(cx.diagnostics().to_vec()))
    } else {
        Ok(())
    }
}

pub(crate) struct Verifier<'a> {
    pub(super) tree: &'a mut Tree,
    pub(super) cx: &'a mut Context,
}

impl Verifier<'_> {
    fn verify_node(&mut self, id: NodeId) -> VResult<()> {
        match self.tree.node(id).state() {
            VerifyState::Verified => return Ok(()),
            VerifyState::Failed => return Err(Fault::Reported),
            VerifyState::Verifying => {
                return Err(Fault::Internal(Error::internal(format!(
                    "re-entrant verification of {:?}",
                    self.tree.kind(id)
                ))))
            }
            VerifyState::Unverified => {}
        }

        trace!("verifying {:?} at {}", self.tree.kind(id), self.tree.loc(id));
        self.tree.set_state(id, VerifyState::Verifying);

        let result = self.verify_steps(id);

        self.tree.set_state(
            id,
            if result.is_ok() {
                VerifyState::Verified
            } else {
                VerifyState::Failed
            },
        );

        result
    }

    fn verify_steps(&mut self, id: NodeId) -> VResult<()> {
        self.pre_verify(id);

        let mut children_failed = false;
        let children = self.tree.children(id).to_vec();

        for child in children {
            match self.verify_node(child) {
                Ok(()) => {}
                Err(Fault::Reported) => children_failed = true,
                Err(internal) => return Err(internal),
            }
        }

        let result = self.verify_self(id, children_failed);

        if children_failed && result.is_ok() {
            Err(Fault::Reported)
        } else {
            result
        }
    }

    fn pre_verify(&mut self, id: NodeId) {
        let kind = self.tree.kind(id);

        if kind.defines_scope() {
            let scope = if *kind == NodeKind::TranslationUnit {
                ScopeId::GLOBAL
            } else {
                self.cx.new_scope()
            };

            debug!("scope {:?} for {:?}", scope, self.tree.kind(id));
            self.tree.set_scope(id, scope);
        }

        if *self.tree.kind(id) == NodeKind::FunctionHeader {
            self.elide_void_parameter(id);
        }
    }

    /// `f(void)` declares no parameters
    fn elide_void_parameter(&mut self, header: NodeId) {
        let param = match self.tree.children(header).get(2..) {
            Some([param]) => *param,
            _ => return,
        };

        let unnamed = matches!(
            self.tree.kind(param),
            NodeKind::ParameterDeclaration { name: None, .. }
        );
        let is_void = self
            .tree
            .child(param, 0)
            .map(|ty| {
                matches!(
                    self.tree.kind(ty),
                    NodeKind::TypeSpecifier {
                        spec: crate::tree::TypeSpec::Basic(crate::types::BasicType::Void),
                        ..
                    }
                )
            })
            .unwrap_or(false);

        if unnamed && is_void && self.tree.children(param).len() == 1 {
            self.tree.remove_child(header, 2);
        }
    }

    fn verify_self(&mut self, id: NodeId, children_failed: bool) -> VResult<()> {
        use NodeKind::*;

        let kind = self.tree.kind(id).clone();

        if kind.is_expression() {
            if children_failed {
                return Err(Fault::Reported);
            }

            return self.verify_expression(id, &kind);
        }

        match kind {
            TranslationUnit => self.verify_translation_unit(id),
            FunctionDefinition | FunctionPrototype | FunctionName(_) => Ok(()),
            FunctionHeader => self.verify_function_header(id, children_failed),
            ParameterDeclaration {
                qualifier,
                is_const,
                name,
            } => self.verify_parameter(id, qualifier, is_const, name, children_failed),
            TypeSpecifier { spec, .. } => self.verify_type_specifier(id, &spec),
            StructSpecifier { name } => self.verify_struct_specifier(id, name, children_failed),
            StructFieldDeclaration => Ok(()),
            StructFieldDeclarator { name } => self.verify_field_declarator(id, name),
            ArraySpecifier => self.verify_array_specifier(id, children_failed),
            DeclarationList { .. } => Ok(()),
            Declarator { name } => self.verify_declarator(id, name),
            Initializer => self.verify_initializer(id, children_failed),
            PrecisionDeclaration { precision, ty } => {
                self.verify_precision_declaration(id, precision, ty)
            }
            InvariantDeclaration => self.verify_invariant_declaration(id, children_failed),
            CompoundStatement { .. } | ExpressionStatement | EmptyStatement => Ok(()),
            If => self.verify_condition(id, 0),
            While => self.verify_condition(id, 0),
            DoWhile => self.verify_condition(id, 1),
            For { .. } => self.verify_for(id, children_failed),
            Return => self.verify_return(id, children_failed),
            Break => self.verify_jump(id, ErrorCode::BreakOutsideLoop),
            Continue => self.verify_jump(id, ErrorCode::ContinueOutsideLoop),
            Discard => self.verify_discard(id),
            _ => Err(Fault::Internal(Error::internal(format!(
                "unhandled node kind {:?}",
                kind
            )))),
        }
    }

    pub(super) fn report(&mut self, id: NodeId, code: ErrorCode, context: Option<String>) -> Fault {
        let loc = self.tree.loc(id);
        self.cx.report(code, loc, context)
    }

    pub(super) fn fail<T>(&mut self, id: NodeId, code: ErrorCode, context: Option<String>) -> VResult<T> {
        Err(self.report(id, code, context))
    }

    pub(super) fn text(&self, symbol: SymbolIndex) -> String {
        self.cx.text(symbol).to_owned()
    }

    pub(super) fn describe(&self, ty: &Type) -> String {
        ty.describe(self.cx.symbols())
    }

    /// Child `index` of `id`, which the tree shape guarantees
    pub(super) fn child(&self, id: NodeId, index: usize) -> VResult<NodeId> {
        self.tree.child(id, index).ok_or_else(|| {
            Fault::Internal(Error::internal(format!(
                "missing child {} of {:?}",
                index,
                self.tree.kind(id)
            )))
        })
    }

    /// Resolved type of an already verified node
    pub(super) fn type_of(&self, id: NodeId) -> VResult<Type> {
        self.tree.ty(id).cloned().ok_or_else(|| {
            Fault::Internal(Error::internal(format!(
                "{:?} has no type",
                self.tree.kind(id)
            )))
        })
    }

    /// Type of a node that may have failed verification, which was reported already
    pub(super) fn checked_type(&self, id: NodeId) -> VResult<Type> {
        match self.tree.ty(id) {
            Some(ty) if self.tree.node(id).is_verified() => Ok(ty.clone()),
            _ => Err(Fault::Reported),
        }
    }

    pub(super) fn lookup(&self, id: NodeId, namespace: Namespace, symbol: SymbolIndex) -> Vec<InfoId> {
        let chain = self.tree.scope_chain(id);
        self.cx.idents.lookup(&chain, namespace, symbol)
    }

    /// Scope receiving the declarations made by `id`
    pub(super) fn declaring_scope(&self, id: NodeId) -> ScopeId {
        self.tree
            .scope_chain(id)
            .first()
            .copied()
            .unwrap_or(ScopeId::GLOBAL)
    }

    /// Identifier of the function whose body contains `id`
    pub(super) fn enclosing_function(&self, id: NodeId) -> Option<InfoId> {
        let definition = self
            .tree
            .find_ancestor(id, |k| *k == NodeKind::FunctionDefinition)?;
        let header = self.tree.child(definition, 0)?;
        self.tree.node(header).ident()
    }

    /// Reject names reserved for the implementation
    pub(super) fn check_name(&mut self, id: NodeId, symbol: SymbolIndex) -> VResult<()> {
        let text = self.cx.text(symbol);

        if text.starts_with("gl_") || text.contains("__") {
            let text = text.to_owned();
            return self.fail(id, ErrorCode::ReservedIdentifier, Some(text));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{CompileOptions, ShaderStage};
    use crate::parse::parse_str;
    use crate::types::BasicType;

    fn verify_source(stage: ShaderStage, source: &str) -> (Tree, Context, Result<()>) {
        let mut cx = Context::new(CompileOptions::for_stage(stage)).unwrap();
        let mut tree = parse_str(source, &mut cx).unwrap();
        let result = verify(&mut tree, &mut cx);
        (tree, cx, result)
    }

    #[test]
    fn every_node_is_verified() {
        let (tree, _, result) = verify_source(
            ShaderStage::Fragment,
            "uniform vec4 c; void main() { gl_FragColor = c * 2.0; }",
        );
        result.unwrap();

        for id in tree.descendants(tree.root()) {
            assert_eq!(tree.node(id).state(), VerifyState::Verified);
        }
    }

    #[test]
    fn void_parameter_is_elided() {
        let (tree, cx, result) = verify_source(ShaderStage::Fragment, "void main(void) { }");
        result.unwrap();

        let header = tree
            .find(tree.root(), |k| *k == NodeKind::FunctionHeader)
            .unwrap();
        assert_eq!(tree.children(header).len(), 2);

        let main = cx.entry_point().unwrap();
        assert!(cx.idents().get(main).as_function().unwrap().signature.params.is_empty());
    }

    #[test]
    fn errors_accumulate() {
        let (_, cx, result) = verify_source(
            ShaderStage::Fragment,
            "void main() { float a = b; float c = d; }",
        );
        assert!(result.is_err());
        assert_eq!(cx.diagnostics().len(), 2);
    }

    #[test]
    fn constant_loop_index() {
        let (tree, cx, result) = verify_source(
            ShaderStage::Fragment,
            "void main() { for (int i = 0; i < 3; i++) { float x = float(i); } }",
        );
        result.unwrap();

        let index = tree
            .descendants(tree.root())
            .into_iter()
            .find(|id| {
                matches!(tree.kind(*id), NodeKind::VariableIdentifier(_))
                    && tree.ty(*id).map(|t| t.is(BasicType::Int)).unwrap_or(false)
                    && tree
                        .find_ancestor(*id, |k| *k == NodeKind::ConstructorCall(BasicType::Float))
                        .is_some()
            })
            .unwrap();

        assert!(const_expression(&tree, &cx, index, false).is_none());
        assert!(const_expression(&tree, &cx, index, true).is_some());
    }

    #[test]
    fn literals_are_constant_either_way() {
        let (tree, cx, result) = verify_source(
            ShaderStage::Fragment,
            "void main() { float f = 2.5; bool b = true ^^ false; }",
        );
        result.unwrap();

        let literal = tree
            .find(tree.root(), |k| matches!(k, NodeKind::FloatLiteral(_)))
            .unwrap();
        let strict = const_expression(&tree, &cx, literal, false).unwrap();
        assert_eq!(strict.as_f64(), Some(2.5));
        assert_eq!(strict.scalar_type(), Some(BasicType::Float));
        assert_eq!(const_expression(&tree, &cx, literal, true), Some(strict));

        let xor = tree
            .find(tree.root(), |k| matches!(k, NodeKind::Binary(_)))
            .unwrap();
        let strict = const_expression(&tree, &cx, xor, false).unwrap();
        assert_eq!(strict.as_bool(), Some(true));
        assert_eq!(const_expression(&tree, &cx, xor, true), Some(strict));
    }
}
