//! Node kinds of the syntax tree

use crate::ident::{Precision, Storage};
use crate::signature::ParamQualifier;
use crate::symbols::SymbolIndex;
use crate::types::BasicType;

/// Type named by a type specifier
#[derive(Debug, Clone, PartialEq)]
pub enum TypeSpec {
    /// Basic type keyword
    Basic(BasicType),
    /// Reference to a previously declared structure
    Named(SymbolIndex),
    /// Inline structure definition, held by the only child
    Struct,
}

/// Resolved meaning of a field selection
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    /// Structure field, by position
    Field(usize),
    /// Vector components, as `xyzw` indices
    Swizzle(Vec<u8>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Plus,
    Minus,
    Not,
    PreInc,
    PreDec,
    PostInc,
    PostDec,
}

impl UnaryOp {
    /// Return true for increments and decrements, which write their operand
    pub fn writes(self) -> bool {
        matches!(
            self,
            Self::PreInc | Self::PreDec | Self::PostInc | Self::PostDec
        )
    }

    pub fn is_postfix(self) -> bool {
        matches!(self, Self::PostInc | Self::PostDec)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Not => "!",
            Self::PreInc | Self::PostInc => "++",
            Self::PreDec | Self::PostDec => "--",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    Equal,
    NotEqual,
    And,
    Xor,
    Or,
}

impl BinaryOp {
    pub fn is_arithmetic(self) -> bool {
        matches!(self, Self::Add | Self::Sub | Self::Mul | Self::Div)
    }

    pub fn is_relational(self) -> bool {
        matches!(
            self,
            Self::Less | Self::Greater | Self::LessEqual | Self::GreaterEqual
        )
    }

    pub fn is_equality(self) -> bool {
        matches!(self, Self::Equal | Self::NotEqual)
    }

    pub fn is_logical(self) -> bool {
        matches!(self, Self::And | Self::Xor | Self::Or)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Less => "<",
            Self::Greater => ">",
            Self::LessEqual => "<=",
            Self::GreaterEqual => ">=",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::And => "&&",
            Self::Xor => "^^",
            Self::Or => "||",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
}

impl AssignOp {
    /// Arithmetic operator applied by a compound assignment
    pub fn arithmetic(self) -> Option<BinaryOp> {
        match self {
            Self::Assign => None,
            Self::Add => Some(BinaryOp::Add),
            Self::Sub => Some(BinaryOp::Sub),
            Self::Mul => Some(BinaryOp::Mul),
            Self::Div => Some(BinaryOp::Div),
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Assign => "=",
            Self::Add => "+=",
            Self::Sub => "-=",
            Self::Mul => "*=",
            Self::Div => "/=",
        }
    }
}

/// Kind of a tree node, along with its kind-specific data
///
/// Child layouts are listed for each kind; `?` marks optional children.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// `[declaration...]`
    TranslationUnit,
    /// `[FunctionHeader, CompoundStatement]`
    FunctionDefinition,
    /// `[FunctionHeader]`
    FunctionPrototype,
    /// `[TypeSpecifier, FunctionName, ParameterDeclaration...]`
    FunctionHeader,
    FunctionName(SymbolIndex),
    /// `[TypeSpecifier, ArraySpecifier?]`
    ParameterDeclaration {
        qualifier: ParamQualifier,
        is_const: bool,
        name: Option<SymbolIndex>,
    },
    /// `[StructSpecifier]` for inline structures, no children otherwise
    TypeSpecifier {
        precision: Precision,
        spec: TypeSpec,
    },
    /// `[StructFieldDeclaration...]`
    StructSpecifier { name: Option<SymbolIndex> },
    /// `[TypeSpecifier, StructFieldDeclarator...]`
    StructFieldDeclaration,
    /// `[ArraySpecifier?]`
    StructFieldDeclarator { name: SymbolIndex },
    /// `[size]`
    ArraySpecifier,
    /// `[TypeSpecifier, Declarator...]`
    DeclarationList { storage: Storage, invariant: bool },
    /// `[ArraySpecifier?, Initializer?]`
    Declarator { name: SymbolIndex },
    /// `[value]`
    Initializer,
    PrecisionDeclaration {
        precision: Precision,
        ty: BasicType,
    },
    /// `[VariableIdentifier...]`
    InvariantDeclaration,
    /// `[statement...]`
    CompoundStatement { new_scope: bool },
    /// `[expression]`
    ExpressionStatement,
    EmptyStatement,
    /// `[condition, then, else?]`
    If,
    /// `[init, condition?, increment?, body]`
    For {
        has_condition: bool,
        has_increment: bool,
    },
    /// `[condition, body]`
    While,
    /// `[body, condition]`
    DoWhile,
    /// `[value?]`
    Return,
    Break,
    Continue,
    Discard,
    IntLiteral(i64),
    FloatLiteral(f64),
    BoolLiteral(bool),
    VariableIdentifier(SymbolIndex),
    /// `[argument...]`
    FunctionCall(SymbolIndex),
    /// `[argument...]`
    ConstructorCall(BasicType),
    /// `[argument...]`
    StructConstructor(SymbolIndex),
    /// `[operand]`
    Unary(UnaryOp),
    /// `[left, right]`
    Binary(BinaryOp),
    /// `[target, value]`
    Assign(AssignOp),
    /// `[condition, then, else]`
    Ternary,
    /// `[base, index]`
    Index,
    /// `[base]`
    FieldSelect {
        field: SymbolIndex,
        selection: Option<Selection>,
    },
    /// `[left, right]`
    Comma,
}

impl NodeKind {
    /// Return true for expression kinds
    pub fn is_expression(&self) -> bool {
        use NodeKind::*;

        matches!(
            self,
            IntLiteral(_)
                | FloatLiteral(_)
                | BoolLiteral(_)
                | VariableIdentifier(_)
                | FunctionCall(_)
                | ConstructorCall(_)
                | StructConstructor(_)
                | Unary(_)
                | Binary(_)
                | Assign(_)
                | Ternary
                | Index
                | FieldSelect { .. }
                | Comma
        )
    }

    /// Return true for loop statements
    pub fn is_loop(&self) -> bool {
        matches!(self, Self::For { .. } | Self::While | Self::DoWhile)
    }

    /// Return true if nodes of this kind introduce a scope
    pub fn defines_scope(&self) -> bool {
        use NodeKind::*;

        match self {
            TranslationUnit | FunctionDefinition | FunctionPrototype => true,
            For { .. } | While | DoWhile => true,
            CompoundStatement { new_scope } => *new_scope,
            _ => false,
        }
    }
}
