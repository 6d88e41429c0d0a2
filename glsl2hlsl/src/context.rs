//! Compilation context shared by the parser, the verifier and the translator

use crate::callgraph::CallGraph;
use crate::error::{Diagnostic, ErrorCode, Fault};
use crate::ident::*;
use crate::known::*;
use crate::options::{CompileOptions, ShaderStage};
use crate::source::SourceLocation;
use crate::symbols::{SymbolIndex, SymbolTable};
use crate::types::{BasicType, StructField, Type};
use crate::Result;

/// Extension controlling the derivative functions
pub const EXT_STANDARD_DERIVATIVES: &str = "GL_OES_standard_derivatives";
/// Extension controlling `gl_FragDepthEXT`
pub const EXT_FRAG_DEPTH: &str = "GL_EXT_frag_depth";

/// Per-compilation state
///
/// Owns the symbol and identifier tables, the diagnostics sink and the stage settings. The
/// context is created once per compilation unit and threaded through every phase.
#[derive(Debug, Clone)]
pub struct Context {
    pub(crate) symbols: SymbolTable,
    pub(crate) idents: IdentifierTable,
    pub(crate) calls: CallGraph,
    known_symbols: Vec<SymbolIndex>,
    diagnostics: Vec<Diagnostic>,
    options: CompileOptions,
    standard_derivatives: bool,
    frag_depth: bool,
    next_scope: u32,
    next_struct: u32,
    entry_point: Option<InfoId>,
    wrote_frag_color: bool,
    wrote_frag_data: bool,
    depth_range: Option<Type>,
}

impl Context {
    /// Create a context with every built-in of the stage registered
    ///
    /// # Errors
    ///
    /// Returns an internal error if the built-in tables are inconsistent.
    pub fn new(options: CompileOptions) -> Result<Self> {
        let mut cx = Self {
            symbols: SymbolTable::new(),
            idents: IdentifierTable::new(),
            calls: CallGraph::new(),
            known_symbols: Vec::with_capacity(KNOWN_SYMBOL_COUNT),
            diagnostics: Vec::new(),
            standard_derivatives: options.standard_derivatives,
            frag_depth: options.frag_depth,
            options,
            // 0 and 1 are the built-in and global scopes
            next_scope: 2,
            next_struct: 0,
            entry_point: None,
            wrote_frag_color: false,
            wrote_frag_data: false,
            depth_range: None,
        };

        cx.register_builtins()?;
        Ok(cx)
    }

    fn register_builtins(&mut self) -> Result<()> {
        for symbol in ALL_KNOWN_SYMBOLS.iter() {
            let index = self.symbols.intern(symbol.name())?;
            self.known_symbols.push(index);
        }

        let stage = self.stage();

        for function in KNOWN_FUNCTIONS
            .iter()
            .filter(|f| f.applicability.allows_stage(stage))
        {
            let name = match function.lowering {
                Lowering::Rename(name) => name.to_owned(),
                Lowering::Helper(helper) => helper.name().to_owned(),
            };

            let mut info = FunctionInfo::new(function.signature.to_signature());
            info.defined = true;
            info.known = Some(function);

            self.idents.insert(IdentifierInfo {
                symbol: self.known(function.symbol),
                names: vec![name],
                scope: ScopeId::BUILTIN,
                node: None,
                kind: InfoKind::Function(info),
            });
        }

        let depth_range = Type::structure(
            self.new_struct_id(),
            self.known(KnownSymbol::GlDepthRangeParameters),
            [KnownSymbol::Near, KnownSymbol::Far, KnownSymbol::Diff]
                .iter()
                .map(|field| StructField {
                    name: self.known(*field),
                    ty: BasicType::Float.into(),
                })
                .collect(),
        );

        self.idents.insert(IdentifierInfo {
            symbol: self.known(KnownSymbol::GlDepthRangeParameters),
            names: vec![KnownSymbol::GlDepthRangeParameters.name().to_owned()],
            scope: ScopeId::BUILTIN,
            node: None,
            kind: InfoKind::TypeName(depth_range.clone()),
        });

        for entry in KNOWN_VARIABLES
            .iter()
            .filter(|v| v.applicability.allows_stage(stage))
        {
            let base = match entry.ty {
                SpecialType::Basic(basic) => Type::from(basic),
                SpecialType::DepthRange => depth_range.clone(),
            };

            let ty = match entry.array_size {
                Some(size) => Type::array_of(base, size),
                None => base,
            };

            let mut variable = VariableInfo::new(ty, entry.storage);
            variable.special = Some(entry.variable);
            variable.constant = entry.value.map(crate::tree::ConstantValue::int);

            self.idents.insert(IdentifierInfo {
                symbol: self.known(entry.symbol),
                names: vec![entry.hlsl.to_owned()],
                scope: ScopeId::BUILTIN,
                node: None,
                kind: InfoKind::Variable(variable),
            });
        }

        self.depth_range = Some(depth_range);

        debug!(
            "registered {} built-in identifiers for the {:?} stage",
            self.idents.len(),
            stage
        );

        Ok(())
    }

    /// Symbol index of a built-in symbol
    pub fn known(&self, symbol: KnownSymbol) -> SymbolIndex {
        self.known_symbols[symbol as usize]
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    pub fn stage(&self) -> ShaderStage {
        self.options.stage
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn idents(&self) -> &IdentifierTable {
        &self.idents
    }

    pub fn call_graph(&self) -> &CallGraph {
        &self.calls
    }

    /// Text of an interned symbol
    pub fn text(&self, symbol: SymbolIndex) -> &str {
        self.symbols.text(symbol)
    }

    /// Type of `gl_DepthRange`
    pub fn depth_range_type(&self) -> Option<&Type> {
        self.depth_range.as_ref()
    }

    pub fn standard_derivatives(&self) -> bool {
        self.standard_derivatives
    }

    pub fn frag_depth(&self) -> bool {
        self.frag_depth
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics[..]
    }

    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    /// Identifier of the user `main` function, once defined
    pub fn entry_point(&self) -> Option<InfoId> {
        self.entry_point
    }

    pub(crate) fn set_entry_point(&mut self, info: InfoId) {
        self.entry_point = Some(info);
    }

    /// Report a diagnostic
    ///
    /// This is the only place diagnostics are recorded. The returned fault tells callers the
    /// error has already been reported.
    pub(crate) fn report(
        &mut self,
        code: ErrorCode,
        location: SourceLocation,
        context: Option<String>,
    ) -> Fault {
        let diagnostic = Diagnostic::new(code, location, context);
        debug!("{}", diagnostic);
        self.diagnostics.push(diagnostic);
        Fault::Reported
    }

    pub(crate) fn new_scope(&mut self) -> ScopeId {
        let scope = ScopeId::new(self.next_scope);
        self.next_scope += 1;
        scope
    }

    pub(crate) fn new_struct_id(&mut self) -> u32 {
        let id = self.next_struct;
        self.next_struct += 1;
        id
    }

    pub(crate) fn intern(&mut self, text: &str) -> Result<SymbolIndex> {
        self.symbols.intern(text)
    }

    /// Apply an `#extension` directive
    pub(crate) fn extension(&mut self, name: &str, behavior: &str, location: SourceLocation) {
        let enable = match behavior {
            "require" | "enable" | "warn" => true,
            "disable" => false,
            other => {
                self.report(
                    ErrorCode::SyntaxError,
                    location,
                    Some(format!("unknown extension behavior {}", other)),
                );
                return;
            }
        };

        match name {
            EXT_STANDARD_DERIVATIVES => self.standard_derivatives = enable,
            EXT_FRAG_DEPTH => self.frag_depth = enable,
            "all" if behavior == "warn" || behavior == "disable" => {
                self.standard_derivatives = enable && self.options.standard_derivatives;
                self.frag_depth = enable && self.options.frag_depth;
            }
            _ if behavior == "warn" || behavior == "disable" => {
                warn!("{}: ignoring unsupported extension {}", location, name);
                return;
            }
            _ => {
                self.report(
                    ErrorCode::UnsupportedExtension,
                    location,
                    Some(name.to_owned()),
                );
                return;
            }
        }

        debug!("extension {} set to {}", name, behavior);
    }

    /// Track writes to the fragment outputs
    ///
    /// # Returns
    ///
    /// `false` if both `gl_FragColor` and `gl_FragData` have now been written.
    pub(crate) fn record_output_write(&mut self, variable: KnownVariable) -> bool {
        match variable {
            KnownVariable::FragColor => self.wrote_frag_color = true,
            KnownVariable::FragData => self.wrote_frag_data = true,
            _ => return true,
        }

        !(self.wrote_frag_color && self.wrote_frag_data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(stage: ShaderStage) -> Context {
        Context::new(CompileOptions::for_stage(stage)).unwrap()
    }

    #[test]
    fn builtins_are_registered_per_stage() {
        let fragment = context(ShaderStage::Fragment);
        let vertex = context(ShaderStage::Vertex);

        let sym = fragment.known(KnownSymbol::GlFragColor);
        assert_eq!(fragment.text(sym), "gl_FragColor");
        assert_eq!(
            fragment
                .idents()
                .in_scope(ScopeId::BUILTIN, Namespace::Value, sym)
                .len(),
            1
        );
        assert!(vertex
            .idents()
            .in_scope(ScopeId::BUILTIN, Namespace::Value, sym)
            .is_empty());

        let lod = vertex.known(KnownSymbol::Texture2DLod);
        assert!(!vertex
            .idents()
            .in_scope(ScopeId::BUILTIN, Namespace::Function, lod)
            .is_empty());
        assert!(fragment
            .idents()
            .in_scope(ScopeId::BUILTIN, Namespace::Function, lod)
            .is_empty());
    }

    #[test]
    fn max_constants_have_values() {
        let cx = context(ShaderStage::Vertex);
        let sym = cx.known(KnownSymbol::GlMaxDrawBuffers);
        let id = cx.idents().in_scope(ScopeId::BUILTIN, Namespace::Value, sym)[0];
        let var = cx.idents().get(id).as_variable().unwrap();

        assert_eq!(var.storage, Storage::Const);
        assert_eq!(var.constant.as_ref().and_then(|c| c.as_int()), Some(1));
    }

    #[test]
    fn extension_directives() {
        let mut cx = context(ShaderStage::Fragment);
        let loc = SourceLocation::new(1, 1);

        assert!(!cx.standard_derivatives());
        cx.extension(EXT_STANDARD_DERIVATIVES, "enable", loc);
        assert!(cx.standard_derivatives());

        cx.extension("GL_foo_bar", "warn", loc);
        assert!(!cx.has_errors());
        cx.extension("GL_foo_bar", "require", loc);
        assert_eq!(cx.diagnostics()[0].code, ErrorCode::UnsupportedExtension);
    }

    #[test]
    fn frag_outputs_are_exclusive() {
        let mut cx = context(ShaderStage::Fragment);
        assert!(cx.record_output_write(KnownVariable::FragColor));
        assert!(cx.record_output_write(KnownVariable::FragColor));
        assert!(!cx.record_output_write(KnownVariable::FragData));
    }
}
