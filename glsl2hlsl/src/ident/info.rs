//! Per-declaration identifier information

use crate::known::{KnownFunction, KnownVariable};
use crate::signature::{FunctionSignature, ParamQualifier};
use crate::symbols::SymbolIndex;
use crate::tree::{ConstantValue, NodeId};
use crate::types::Type;

/// Index of an identifier in its table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InfoId(u32);

impl InfoId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Lexical scope id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(u32);

impl ScopeId {
    /// Scope of built-in functions and variables, outside of every other scope
    pub const BUILTIN: ScopeId = ScopeId(0);
    /// Scope of global declarations
    pub const GLOBAL: ScopeId = ScopeId(1);

    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn is_global(self) -> bool {
        self == Self::GLOBAL
    }
}

/// Identifier namespaces: functions never collide with variables or type names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Namespace {
    /// Variables and type names
    Value,
    Function,
}

/// Storage qualifier of a variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Storage {
    None,
    Const,
    Uniform,
    Attribute,
    Varying,
}

impl Default for Storage {
    fn default() -> Self {
        Self::None
    }
}

impl Storage {
    /// Return true for the qualifiers that link a shader to the outside world
    pub fn is_interface(self) -> bool {
        matches!(self, Self::Uniform | Self::Attribute | Self::Varying)
    }
}

/// Precision qualifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Precision {
    None,
    Low,
    Medium,
    High,
}

impl Default for Precision {
    fn default() -> Self {
        Self::None
    }
}

/// Variable declaration facts
#[derive(Debug, Clone)]
pub struct VariableInfo {
    pub ty: Type,
    pub storage: Storage,
    pub precision: Precision,
    /// Direction, for function parameters
    pub parameter: Option<ParamQualifier>,
    /// Set for the index of a `for` loop
    pub loop_index: bool,
    /// Number of places the variable is written
    pub writes: u32,
    /// Set once the variable is read or written
    pub used: bool,
    /// Value of a `const` variable with a constant initializer
    pub constant: Option<ConstantValue>,
    /// Built-in variable this identifier stands for
    pub special: Option<KnownVariable>,
    pub invariant: bool,
}

impl VariableInfo {
    /// Plain variable of the given type and storage
    pub fn new(ty: Type, storage: Storage) -> Self {
        Self {
            ty,
            storage,
            precision: Precision::None,
            parameter: None,
            loop_index: false,
            writes: 0,
            used: false,
            constant: None,
            special: None,
            invariant: false,
        }
    }
}

/// Function declaration facts
#[derive(Debug, Clone)]
pub struct FunctionInfo {
    pub signature: FunctionSignature,
    pub declared: bool,
    pub defined: bool,
    pub called: bool,
    /// Definition node, once defined
    pub definition: Option<NodeId>,
    /// Built-in this identifier stands for
    pub known: Option<&'static KnownFunction>,
}

impl FunctionInfo {
    pub fn new(signature: FunctionSignature) -> Self {
        Self {
            signature,
            declared: true,
            defined: false,
            called: false,
            definition: None,
            known: None,
        }
    }
}

/// Kind-specific identifier facts
#[derive(Debug, Clone)]
pub enum InfoKind {
    Variable(VariableInfo),
    Function(FunctionInfo),
    /// Structure name and the type it names
    TypeName(Type),
}

/// A declared identifier
#[derive(Debug, Clone)]
pub struct IdentifierInfo {
    pub symbol: SymbolIndex,
    /// Output-language names; samplers use a second name for their texture
    pub names: Vec<String>,
    pub scope: ScopeId,
    /// Declaring node, `None` for built-ins
    pub node: Option<NodeId>,
    pub kind: InfoKind,
}

impl IdentifierInfo {
    /// Primary output-language name
    pub fn name(&self) -> &str {
        self.names.first().map(String::as_str).unwrap_or("")
    }

    /// Output-language name by position, falling back to the primary name
    pub fn name_at(&self, index: usize) -> &str {
        self.names
            .get(index)
            .map(String::as_str)
            .unwrap_or_else(|| self.name())
    }

    pub fn namespace(&self) -> Namespace {
        match self.kind {
            InfoKind::Function(_) => Namespace::Function,
            _ => Namespace::Value,
        }
    }

    pub fn is_builtin(&self) -> bool {
        self.scope == ScopeId::BUILTIN
    }

    pub fn as_variable(&self) -> Option<&VariableInfo> {
        match &self.kind {
            InfoKind::Variable(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_variable_mut(&mut self) -> Option<&mut VariableInfo> {
        match &mut self.kind {
            InfoKind::Variable(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&FunctionInfo> {
        match &self.kind {
            InfoKind::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_function_mut(&mut self) -> Option<&mut FunctionInfo> {
        match &mut self.kind {
            InfoKind::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_type_name(&self) -> Option<&Type> {
        match &self.kind {
            InfoKind::TypeName(t) => Some(t),
            _ => None,
        }
    }
}
