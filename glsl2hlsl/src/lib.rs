//! glsl2hlsl is a GLSL ES 1.00 to HLSL translator.
//!
//! A compilation parses the source into an arena syntax tree, verifies it (scoping, typing,
//! constant expressions, built-in resolution and the GLSL ES language restrictions) and then
//! emits HLSL text for the verified tree. Diagnostics are accumulated during verification so a
//! single run reports every independent error in the program.
//!
//! # Usage
//!
//! ```
//! use glsl2hlsl::{compile, CompileOptions, ShaderStage};
//!
//! let options = CompileOptions::for_stage(ShaderStage::Fragment);
//! let compilation = compile("void main() { gl_FragColor = vec4(1.0); }", &options).unwrap();
//!
//! assert!(compilation.hlsl.contains("void gl_main()"));
//! ```
//!
//! Vertex and fragment compilations of the same program can be checked against each other with
//! [Compilation::link].

#[macro_use]
extern crate log;

pub mod api;

mod callgraph;
pub use callgraph::CallGraph;

mod context;
pub use context::*;

mod error;
pub use error::{Diagnostic, Error, ErrorCode, Result};

pub mod ident;
pub use ident::ENTRY_POINT_NAME;
pub mod known;

mod options;
pub use options::*;

pub mod parse;

mod reflect;
pub use reflect::*;

pub mod signature;

mod source;
pub use source::*;

pub mod symbols;
pub mod tree;
pub mod types;

pub mod translate;
pub use translate::translate;

pub mod verify;
pub use verify::verify;

use ident::{IdentifierInfo, ScopeId, Storage, VariableInfo};
use tree::Tree;

/// Result of a successful compilation
#[derive(Debug)]
pub struct Compilation {
    /// Translated HLSL source
    pub hlsl: String,
    /// Active interface variables
    pub variables: Vec<ReflectedVariable>,
    /// Verified syntax tree
    pub tree: Tree,
    /// Context the tree was verified with
    pub context: Context,
}

/// Compile a GLSL ES shader held in memory
///
/// # Parameters
///
/// * `source`: shader source text
/// * `options`: compilation options
///
/// # Errors
///
/// Returns [Error::Diagnostics] with every diagnostic reported against the program, or an
/// internal error.
pub fn compile(source: &str, options: &CompileOptions) -> Result<Compilation> {
    compile_source(&mut StrSource::new(source), options)
}

/// Compile a GLSL ES shader read from a character source
///
/// # Parameters
///
/// * `source`: character source
/// * `options`: compilation options
///
/// # Errors
///
/// See [compile].
pub fn compile_source(
    source: &mut dyn CharSource,
    options: &CompileOptions,
) -> Result<Compilation> {
    let mut context = Context::new(options.clone())?;

    let mut tree = parse::parse_source(source, &mut context)?;
    verify(&mut tree, &mut context)?;

    let hlsl = translate(&tree, &context)?;
    let variables = reflect(&context)?;

    info!(
        "compiled {:?} shader: {} bytes, {} active variables",
        context.stage(),
        hlsl.len(),
        variables.len()
    );

    Ok(Compilation {
        hlsl,
        variables,
        tree,
        context,
    })
}

/// Global user variables of a compilation with the given storage
fn interface(
    cx: &Context,
    storage: Storage,
) -> impl Iterator<Item = (&IdentifierInfo, &VariableInfo)> {
    cx.idents()
        .iter()
        .filter(|(_, info)| info.scope == ScopeId::GLOBAL)
        .filter_map(|(_, info)| info.as_variable().map(|variable| (info, variable)))
        .filter(move |(_, variable)| variable.storage == storage && variable.special.is_none())
}

impl Compilation {
    /// GLSL name of an identifier
    fn source_name(&self, info: &IdentifierInfo) -> &str {
        self.context.text(info.symbol)
    }

    fn location(&self, info: &IdentifierInfo) -> SourceLocation {
        info.node
            .map(|node| self.tree.loc(node))
            .unwrap_or_default()
    }

    /// Check a vertex and a fragment compilation against each other
    ///
    /// Uniforms declared by both stages must have types that are equal for uniforms, and every
    /// varying the fragment stage reads must be written by the vertex stage with the same type.
    ///
    /// # Parameters
    ///
    /// * `vertex`: vertex stage compilation
    /// * `fragment`: fragment stage compilation
    ///
    /// # Errors
    ///
    /// Returns [Error::Diagnostics] with a [ErrorCode::LinkMismatch] diagnostic per offending
    /// declaration of the fragment stage.
    pub fn link(vertex: &Compilation, fragment: &Compilation) -> Result<()> {
        if vertex.context.stage() != ShaderStage::Vertex
            || fragment.context.stage() != ShaderStage::Fragment
        {
            return Err(Error::Options(
                "link requires a vertex and a fragment compilation".to_owned(),
            ));
        }

        let vcx = &vertex.context;
        let fcx = &fragment.context;
        let mut diagnostics = Vec::new();

        for (info, variable) in interface(fcx, Storage::Uniform) {
            let name = fragment.source_name(info);
            let other =
                interface(vcx, Storage::Uniform).find(|(i, _)| vertex.source_name(i) == name);

            if let Some((_, other)) = other {
                if !variable
                    .ty
                    .equal_for_uniforms(fcx.symbols(), &other.ty, vcx.symbols())
                {
                    diagnostics.push(Diagnostic::new(
                        ErrorCode::LinkMismatch,
                        fragment.location(info),
                        Some(format!(
                            "uniform {} has a different type in the vertex shader",
                            name
                        )),
                    ));
                }
            }
        }

        for (info, variable) in interface(fcx, Storage::Varying).filter(|(_, v)| v.used) {
            let name = fragment.source_name(info);
            let other =
                interface(vcx, Storage::Varying).find(|(i, _)| vertex.source_name(i) == name);

            let context = match other {
                None => Some(format!("varying {} is not declared in the vertex shader", name)),
                Some((_, other))
                    if !variable
                        .ty
                        .equal_for_uniforms(fcx.symbols(), &other.ty, vcx.symbols()) =>
                {
                    Some(format!("varying {} has a different type in the vertex shader", name))
                }
                Some((_, other)) if other.writes == 0 => {
                    Some(format!("varying {} is not written by the vertex shader", name))
                }
                Some(_) => None,
            };

            if let Some(context) = context {
                diagnostics.push(Diagnostic::new(
                    ErrorCode::LinkMismatch,
                    fragment.location(info),
                    Some(context),
                ));
            }
        }

        if diagnostics.is_empty() {
            debug!("vertex and fragment shaders link");
            Ok(())
        } else {
            Err(Error::Diagnostics(diagnostics))
        }
    }
}
