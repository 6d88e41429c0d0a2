//! Active variable reflection
//!
//! A variable is active when a function reachable from `main` refers to it. Structure uniforms
//! are flattened into their leaf members so each reflected entry has a GL type.

use crate::context::Context;
use crate::ident::{ScopeId, Storage};
use crate::symbols::SymbolIndex;
use crate::types::ActiveInfo;
use crate::Result;

/// Interface kind of a reflected variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableKind {
    Uniform,
    Attribute,
    Varying,
}

impl VariableKind {
    fn from_storage(storage: Storage) -> Option<Self> {
        match storage {
            Storage::Uniform => Some(Self::Uniform),
            Storage::Attribute => Some(Self::Attribute),
            Storage::Varying => Some(Self::Varying),
            Storage::None | Storage::Const => None,
        }
    }
}

impl std::fmt::Display for VariableKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Uniform => "uniform",
            Self::Attribute => "attribute",
            Self::Varying => "varying",
        })
    }
}

/// Reflection entry for an active variable, or a leaf of an active structure uniform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReflectedVariable {
    pub kind: VariableKind,
    /// Output-language access path
    pub name: String,
    /// GL type enum
    pub gl_type: u32,
    /// Array size, 1 for non-arrays
    pub size: u32,
}

impl std::fmt::Display for ReflectedVariable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} 0x{:04x}[{}]",
            self.kind, self.name, self.gl_type, self.size
        )
    }
}

/// List the active user variables of a verified compilation
///
/// # Parameters
///
/// * `cx`: context the tree was verified with
///
/// # Errors
///
/// Returns an internal error if an active variable has a type without a GL counterpart.
pub fn reflect(cx: &Context) -> Result<Vec<ReflectedVariable>> {
    let entry = match cx.entry_point() {
        Some(entry) => entry,
        None => return Ok(Vec::new()),
    };

    let functions = cx.call_graph().reachable_from(entry);
    let referenced = cx.call_graph().referenced_by(&functions);

    let field_name = |symbol: SymbolIndex| format!("_{}", cx.text(symbol));
    let mut result = Vec::new();

    for id in referenced {
        let info = cx.idents().get(id);
        if info.scope != ScopeId::GLOBAL {
            continue;
        }

        let (variable, kind) = match info
            .as_variable()
            .filter(|variable| variable.special.is_none())
            .and_then(|variable| {
                VariableKind::from_storage(variable.storage).map(|kind| (variable, kind))
            }) {
            Some(found) => found,
            None => continue,
        };

        let mut leaves = Vec::new();
        variable
            .ty
            .flatten_active(info.name(), &field_name, &mut leaves)?;

        result.extend(leaves.into_iter().map(|ActiveInfo { name, gl_type, size }| {
            ReflectedVariable {
                kind,
                name,
                gl_type,
                size,
            }
        }));
    }

    debug!("{} active variables", result.len());
    Ok(result)
}
