//! Scope-aware identifier table

use std::collections::HashMap;

use indexmap::IndexMap;

use super::info::*;
use crate::error::ErrorCode;
use crate::signature::FunctionSignature;
use crate::symbols::{SymbolIndex, SymbolTable};
use crate::tree::NodeId;
use crate::types::Type;

/// Outcome of a declaration: the new or reused identifier, or a diagnosable error code
pub type AddResult = std::result::Result<InfoId, ErrorCode>;

/// Output name of the user entry point
pub const ENTRY_POINT_NAME: &str = "gl_main";

/// Prefix of user function names, keeping them apart from variables and types
pub const FUNCTION_PREFIX: &str = "f_";

/// Identifiers of a compilation, indexed by declaring scope
#[derive(Debug, Default, Clone)]
pub struct IdentifierTable {
    infos: Vec<IdentifierInfo>,
    scopes: IndexMap<(ScopeId, Namespace, SymbolIndex), Vec<InfoId>>,
    /// Number of suffixed names per symbol, for functions and types
    generated: HashMap<(Namespace, SymbolIndex), u32>,
}

impl IdentifierTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.infos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }

    pub fn get(&self, id: InfoId) -> &IdentifierInfo {
        &self.infos[id.index()]
    }

    pub fn get_mut(&mut self, id: InfoId) -> &mut IdentifierInfo {
        &mut self.infos[id.index()]
    }

    /// All identifiers in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (InfoId, &IdentifierInfo)> {
        self.infos
            .iter()
            .enumerate()
            .map(|(i, info)| (InfoId::new(i), info))
    }

    /// Identifiers declared with this name in exactly this scope
    pub fn in_scope(&self, scope: ScopeId, namespace: Namespace, symbol: SymbolIndex) -> &[InfoId] {
        self.scopes
            .get(&(scope, namespace, symbol))
            .map(|v| &v[..])
            .unwrap_or(&[])
    }

    /// Identifiers visible through a scope chain
    ///
    /// Scopes are searched innermost first, and the search stops at the first scope declaring
    /// the name: inner declarations hide outer ones.
    ///
    /// # Parameters
    ///
    /// * `chain`: scopes to search, innermost first
    /// * `namespace`: namespace of the name
    /// * `symbol`: name to look up
    pub fn lookup(
        &self,
        chain: &[ScopeId],
        namespace: Namespace,
        symbol: SymbolIndex,
    ) -> Vec<InfoId> {
        chain
            .iter()
            .map(|scope| self.in_scope(*scope, namespace, symbol))
            .find(|found| !found.is_empty())
            .map(|found| found.to_vec())
            .unwrap_or_default()
    }

    /// Register an identifier without any redeclaration check
    pub(crate) fn insert(&mut self, info: IdentifierInfo) -> InfoId {
        let id = InfoId::new(self.infos.len());
        self.scopes
            .entry((info.scope, info.namespace(), info.symbol))
            .or_insert_with(Vec::new)
            .push(id);
        self.infos.push(info);
        id
    }

    /// Declare a variable
    ///
    /// # Parameters
    ///
    /// * `symbols`: symbol table of the compilation
    /// * `scope`: declaring scope
    /// * `node`: declaring node
    /// * `symbol`: variable name
    /// * `variable`: variable facts
    ///
    /// # Errors
    ///
    /// [ErrorCode::Redeclaration] if the name is already declared in `scope`.
    pub fn add_variable(
        &mut self,
        symbols: &SymbolTable,
        scope: ScopeId,
        node: NodeId,
        symbol: SymbolIndex,
        variable: VariableInfo,
    ) -> AddResult {
        if !self.in_scope(scope, Namespace::Value, symbol).is_empty() {
            return Err(ErrorCode::Redeclaration);
        }

        let base = format!("_{}", symbols.text(symbol));
        let names = if variable.ty.is_sampler_or_array() {
            vec![format!("{}__sampler", base), format!("{}__texture", base)]
        } else {
            vec![base]
        };

        debug!(
            "declared variable {} in scope {:?} as {}",
            symbols.text(symbol),
            scope,
            names.join("/")
        );

        Ok(self.insert(IdentifierInfo {
            symbol,
            names,
            scope,
            node: Some(node),
            kind: InfoKind::Variable(variable),
        }))
    }

    /// Declare a structure type name
    ///
    /// Structures are all emitted at global scope, so one declared in an inner scope gets a
    /// numbered name.
    ///
    /// # Errors
    ///
    /// [ErrorCode::Redeclaration] if the name is already declared in `scope`.
    pub fn add_type_name(
        &mut self,
        symbols: &SymbolTable,
        scope: ScopeId,
        node: NodeId,
        symbol: SymbolIndex,
        ty: Type,
    ) -> AddResult {
        if !self.in_scope(scope, Namespace::Value, symbol).is_empty() {
            return Err(ErrorCode::Redeclaration);
        }

        let base = format!("_{}", symbols.text(symbol));
        let name = if scope == ScopeId::GLOBAL {
            base
        } else {
            self.numbered_name(Namespace::Value, symbol, &base)
        };
        debug!("declared type {} as {}", symbols.text(symbol), name);

        Ok(self.insert(IdentifierInfo {
            symbol,
            names: vec![name],
            scope,
            node: Some(node),
            kind: InfoKind::TypeName(ty),
        }))
    }

    /// Declare or define a function
    ///
    /// A declaration with the same parameter types as an earlier one refers to the same
    /// function; any other parameter list creates a new overload with its own output name.
    ///
    /// # Parameters
    ///
    /// * `symbols`: symbol table of the compilation
    /// * `node`: function header node
    /// * `symbol`: function name
    /// * `signature`: signature derived from the header
    /// * `definition`: definition node, when this is a definition rather than a prototype
    ///
    /// # Errors
    ///
    /// * [ErrorCode::BuiltinRedefinition] if the name belongs to a built-in function
    /// * [ErrorCode::ReturnTypeOverload] if only the return type differs from a previous
    ///   declaration
    /// * [ErrorCode::ParameterQualifierMismatch] if parameter qualifiers differ from a
    ///   previous declaration
    /// * [ErrorCode::FunctionRedefinition] if the function already has a body
    pub fn add_function(
        &mut self,
        symbols: &SymbolTable,
        node: NodeId,
        symbol: SymbolIndex,
        signature: FunctionSignature,
        definition: Option<NodeId>,
    ) -> AddResult {
        if !self
            .in_scope(ScopeId::BUILTIN, Namespace::Function, symbol)
            .is_empty()
        {
            return Err(ErrorCode::BuiltinRedefinition);
        }

        let previous = self
            .in_scope(ScopeId::GLOBAL, Namespace::Function, symbol)
            .iter()
            .copied()
            .find(|id| {
                self.get(*id)
                    .as_function()
                    .map(|f| f.signature.same_parameters(&signature))
                    .unwrap_or(false)
            });

        if let Some(id) = previous {
            let function = match self.get_mut(id).as_function_mut() {
                Some(function) => function,
                None => return Err(ErrorCode::Redeclaration),
            };

            if function.signature.return_type != signature.return_type {
                return Err(ErrorCode::ReturnTypeOverload);
            }

            if !function.signature.same_qualifiers(&signature) {
                return Err(ErrorCode::ParameterQualifierMismatch);
            }

            if let Some(definition) = definition {
                if function.defined {
                    return Err(ErrorCode::FunctionRedefinition);
                }

                function.defined = true;
                function.definition = Some(definition);
            }

            debug!("redeclared function {}", symbols.text(symbol));
            return Ok(id);
        }

        let base = format!("{}{}", FUNCTION_PREFIX, symbols.text(symbol));
        let name = if symbols.text(symbol) == "main" {
            ENTRY_POINT_NAME.to_owned()
        } else if self
            .in_scope(ScopeId::GLOBAL, Namespace::Function, symbol)
            .is_empty()
        {
            base
        } else {
            self.numbered_name(Namespace::Function, symbol, &base)
        };

        debug!(
            "declared function {} overload as {}",
            symbols.text(symbol),
            name
        );

        let mut function = FunctionInfo::new(signature);
        function.defined = definition.is_some();
        function.definition = definition;

        Ok(self.insert(IdentifierInfo {
            symbol,
            names: vec![name],
            scope: ScopeId::GLOBAL,
            node: Some(node),
            kind: InfoKind::Function(function),
        }))
    }

    /// `base` followed by a `__n` suffix, which no user identifier can spell
    fn numbered_name(&mut self, namespace: Namespace, symbol: SymbolIndex, base: &str) -> String {
        let count = self.generated.entry((namespace, symbol)).or_insert(0);
        *count += 1;
        format!("{}__{}", base, count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::{ParamQualifier, Parameter};
    use crate::source::SourceLocation;
    use crate::tree::{NodeKind, Tree};
    use crate::types::BasicType;

    struct Fixture {
        symbols: SymbolTable,
        table: IdentifierTable,
        node: NodeId,
    }

    fn fixture() -> Fixture {
        let mut tree = Tree::new(SourceLocation::default());
        let root = tree.root();
        let node = tree.add(root, NodeKind::EmptyStatement, SourceLocation::default());

        Fixture {
            symbols: SymbolTable::new(),
            table: IdentifierTable::new(),
            node,
        }
    }

    fn float_var() -> VariableInfo {
        VariableInfo::new(BasicType::Float.into(), Storage::None)
    }

    #[test]
    fn same_scope_redeclaration() {
        let mut f = fixture();
        let x = f.symbols.intern("x").unwrap();
        let inner = ScopeId::new(7);

        assert!(f
            .table
            .add_variable(&f.symbols, ScopeId::GLOBAL, f.node, x, float_var())
            .is_ok());
        assert!(f
            .table
            .add_variable(&f.symbols, inner, f.node, x, float_var())
            .is_ok());
        assert_eq!(
            f.table
                .add_variable(&f.symbols, inner, f.node, x, float_var())
                .unwrap_err(),
            ErrorCode::Redeclaration
        );
    }

    #[test]
    fn lookup_stops_at_first_hit() {
        let mut f = fixture();
        let x = f.symbols.intern("x").unwrap();
        let inner = ScopeId::new(3);

        let outer_id = f
            .table
            .add_variable(&f.symbols, ScopeId::GLOBAL, f.node, x, float_var())
            .unwrap();
        let inner_id = f
            .table
            .add_variable(&f.symbols, inner, f.node, x, float_var())
            .unwrap();

        let chain = [inner, ScopeId::GLOBAL, ScopeId::BUILTIN];
        assert_eq!(f.table.lookup(&chain, Namespace::Value, x), vec![inner_id]);
        assert_eq!(
            f.table.lookup(&chain[1..], Namespace::Value, x),
            vec![outer_id]
        );
        assert!(f.table.lookup(&chain, Namespace::Function, x).is_empty());
    }

    #[test]
    fn function_declaration_then_definition() {
        let mut f = fixture();
        let foo = f.symbols.intern("foo").unwrap();
        let sig = FunctionSignature::new(
            BasicType::Float.into(),
            vec![Parameter::new(BasicType::Float.into())],
        );

        let decl = f
            .table
            .add_function(&f.symbols, f.node, foo, sig.clone(), None)
            .unwrap();
        let def = f
            .table
            .add_function(&f.symbols, f.node, foo, sig.clone(), Some(f.node))
            .unwrap();
        assert_eq!(decl, def);
        assert!(f.table.get(def).as_function().unwrap().defined);

        assert_eq!(
            f.table
                .add_function(&f.symbols, f.node, foo, sig, Some(f.node))
                .unwrap_err(),
            ErrorCode::FunctionRedefinition
        );
    }

    #[test]
    fn function_qualifier_mismatch() {
        let mut f = fixture();
        let foo = f.symbols.intern("foo").unwrap();
        let sig = FunctionSignature::new(
            BasicType::Void.into(),
            vec![Parameter::new(BasicType::Float.into())],
        );
        let mut out_sig = sig.clone();
        out_sig.params[0].qualifier = ParamQualifier::Out;

        f.table
            .add_function(&f.symbols, f.node, foo, sig, None)
            .unwrap();
        assert_eq!(
            f.table
                .add_function(&f.symbols, f.node, foo, out_sig, Some(f.node))
                .unwrap_err(),
            ErrorCode::ParameterQualifierMismatch
        );
    }

    #[test]
    fn overloads_get_distinct_names() {
        let mut f = fixture();
        let foo = f.symbols.intern("foo").unwrap();
        let a = FunctionSignature::new(
            BasicType::Float.into(),
            vec![Parameter::new(BasicType::Float.into())],
        );
        let b = FunctionSignature::new(
            BasicType::Float.into(),
            vec![Parameter::new(BasicType::Vec2.into())],
        );
        let c = FunctionSignature::new(
            BasicType::Vec2.into(),
            vec![Parameter::new(BasicType::Vec2.into())],
        );

        let a = f.table.add_function(&f.symbols, f.node, foo, a, None).unwrap();
        let b = f.table.add_function(&f.symbols, f.node, foo, b, None).unwrap();
        assert_eq!(f.table.get(a).name(), "f_foo");
        assert_eq!(f.table.get(b).name(), "f_foo__1");

        assert_eq!(
            f.table
                .add_function(&f.symbols, f.node, foo, c, None)
                .unwrap_err(),
            ErrorCode::ReturnTypeOverload
        );
    }

    #[test]
    fn sampler_gets_two_names() {
        let mut f = fixture();
        let s = f.symbols.intern("tex").unwrap();
        let id = f
            .table
            .add_variable(
                &f.symbols,
                ScopeId::GLOBAL,
                f.node,
                s,
                VariableInfo::new(BasicType::Sampler2D.into(), Storage::Uniform),
            )
            .unwrap();

        assert_eq!(f.table.get(id).name_at(0), "_tex__sampler");
        assert_eq!(f.table.get(id).name_at(1), "_tex__texture");
    }

    #[test]
    fn generated_names_do_not_clash() {
        let mut f = fixture();
        let foo = f.symbols.intern("foo").unwrap();
        let foo_1 = f.symbols.intern("foo_1").unwrap();
        let s = f.symbols.intern("S").unwrap();
        let inner = ScopeId::new(4);
        let sig = |param: BasicType| {
            FunctionSignature::new(BasicType::Float.into(), vec![Parameter::new(param.into())])
        };

        let variable = f
            .table
            .add_variable(&f.symbols, ScopeId::GLOBAL, f.node, foo, float_var())
            .unwrap();
        let first = f
            .table
            .add_function(&f.symbols, f.node, foo, sig(BasicType::Float), None)
            .unwrap();
        let second = f
            .table
            .add_function(&f.symbols, f.node, foo, sig(BasicType::Vec2), None)
            .unwrap();
        let other = f
            .table
            .add_function(&f.symbols, f.node, foo_1, sig(BasicType::Vec2), None)
            .unwrap();

        let global = f
            .table
            .add_type_name(&f.symbols, ScopeId::GLOBAL, f.node, s, BasicType::Float.into())
            .unwrap();
        let shadowing = f
            .table
            .add_type_name(&f.symbols, inner, f.node, s, BasicType::Float.into())
            .unwrap();

        let names: Vec<_> = [variable, first, second, other, global, shadowing]
            .iter()
            .map(|id| f.table.get(*id).name())
            .collect();
        assert_eq!(names, vec!["_foo", "f_foo", "f_foo__1", "f_foo_1", "_S", "_S__1"]);
    }
}
