//! Error types for the translator

use std::fmt;

use thiserror::Error;

use crate::source::SourceLocation;

/// Stable codes for errors reported against the input program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ErrorCode {
    /// The token stream does not follow the grammar
    SyntaxError,
    /// A character that cannot start any token
    InvalidCharacter,
    /// A keyword reserved for future use
    ReservedKeyword,
    /// An identifier starting with `gl_` or containing `__`
    ReservedIdentifier,
    /// A preprocessor directive other than `#version`, `#extension` and `#pragma`
    UnsupportedDirective,
    /// An unknown extension or an unsupported `#version`
    UnsupportedExtension,
    /// Use of a built-in that requires an extension which was not enabled
    ExtensionNotEnabled,
    /// Identifier already declared in the same scope
    Redeclaration,
    /// Identifier is not declared in any enclosing scope
    UndeclaredIdentifier,
    /// Identifier used in a role it was not declared for
    InvalidIdentifierUsage,
    /// Operand or argument types do not match
    TypeMismatch,
    /// No overload accepts the given argument types
    NoMatchingOverload,
    /// Expression cannot be assigned to
    InvalidLValue,
    /// Constant index outside of the bounds of the indexed value
    IndexOutOfRange,
    /// Index is not a constant expression
    NonConstantIndex,
    /// Value is neither an array, a vector nor a matrix
    InvalidIndexTarget,
    /// Field selection on a value that has no such field
    InvalidFieldSelection,
    /// Malformed swizzle
    InvalidSwizzle,
    /// Overloads only differ by their return type
    ReturnTypeOverload,
    /// Redeclaration or redefinition of a built-in function
    BuiltinRedefinition,
    /// Function defined twice
    FunctionRedefinition,
    /// Function called but never defined
    FunctionNotDefined,
    /// Function declared outside of the global scope
    NestedFunction,
    /// Parameter qualifiers differ between declaration and definition
    ParameterQualifierMismatch,
    /// `void` used as a parameter type other than a sole unnamed parameter
    VoidParameter,
    /// Variable declared with `void` type
    VoidVariable,
    /// `discard` used in a vertex shader
    DiscardOutsideFragment,
    /// No `main` function was defined
    MissingMain,
    /// `main` is not declared as `void main()`
    InvalidMain,
    /// Function calls itself directly or indirectly
    Recursion,
    /// Expression is required to be constant but is not
    NotConstantExpression,
    /// `const` variable without initializer
    MissingConstInitializer,
    /// Storage or parameter qualifier not allowed here
    InvalidQualifier,
    /// Type not allowed for an attribute
    InvalidAttributeType,
    /// Type not allowed for a varying
    InvalidVaryingType,
    /// Array size is not a positive constant integer
    InvalidArraySize,
    /// Constructor arguments do not fit the constructed type
    InvalidConstructor,
    /// Operator does not accept its operand types
    InvalidOperands,
    /// Condition is not a scalar boolean
    ConditionNotBool,
    /// Returned value does not match the function return type
    ReturnTypeMismatch,
    /// Non-void function returns without a value
    MissingReturnValue,
    /// `break` outside of a loop
    BreakOutsideLoop,
    /// `continue` outside of a loop
    ContinueOutsideLoop,
    /// `for` loop outside of the supported form
    InvalidLoop,
    /// Loop index written inside the loop body
    LoopIndexModified,
    /// Shader writes both `gl_FragColor` and `gl_FragData`
    FragColorAndFragData,
    /// Structure with a sampler member
    SamplerInStruct,
    /// Vertex and fragment declarations disagree
    LinkMismatch,
}

impl ErrorCode {
    /// Fixed message text for this error code
    pub fn message(self) -> &'static str {
        use ErrorCode::*;

        match self {
            SyntaxError => "syntax error",
            InvalidCharacter => "invalid character",
            ReservedKeyword => "reserved keyword",
            ReservedIdentifier => "reserved identifier",
            UnsupportedDirective => "unsupported preprocessor directive",
            UnsupportedExtension => "unsupported extension",
            ExtensionNotEnabled => "required extension is not enabled",
            Redeclaration => "identifier already declared",
            UndeclaredIdentifier => "undeclared identifier",
            InvalidIdentifierUsage => "invalid use of identifier",
            TypeMismatch => "type mismatch",
            NoMatchingOverload => "no matching overload",
            InvalidLValue => "expression is not assignable",
            IndexOutOfRange => "index out of range",
            NonConstantIndex => "index must be a constant expression",
            InvalidIndexTarget => "expression cannot be indexed",
            InvalidFieldSelection => "invalid field selection",
            InvalidSwizzle => "invalid swizzle",
            ReturnTypeOverload => "function cannot be overloaded on return type",
            BuiltinRedefinition => "built-in function cannot be redeclared",
            FunctionRedefinition => "function already defined",
            FunctionNotDefined => "function called but not defined",
            NestedFunction => "functions can only be declared at global scope",
            ParameterQualifierMismatch => "parameter qualifiers do not match previous declaration",
            VoidParameter => "void can only be used as a sole unnamed parameter",
            VoidVariable => "variable cannot be declared void",
            DiscardOutsideFragment => "discard is only allowed in fragment shaders",
            MissingMain => "missing main function",
            InvalidMain => "main must be declared as void main()",
            Recursion => "recursive function calls are not allowed",
            NotConstantExpression => "constant expression required",
            MissingConstInitializer => "const variable requires an initializer",
            InvalidQualifier => "invalid qualifier",
            InvalidAttributeType => "invalid attribute type",
            InvalidVaryingType => "invalid varying type",
            InvalidArraySize => "array size must be a positive constant integer",
            InvalidConstructor => "invalid constructor arguments",
            InvalidOperands => "invalid operands",
            ConditionNotBool => "condition must be a scalar boolean",
            ReturnTypeMismatch => "returned value does not match the function return type",
            MissingReturnValue => "function must return a value",
            BreakOutsideLoop => "break outside of a loop",
            ContinueOutsideLoop => "continue outside of a loop",
            InvalidLoop => "unsupported loop form",
            LoopIndexModified => "loop index cannot be modified in the loop body",
            FragColorAndFragData => "cannot write both gl_FragColor and gl_FragData",
            SamplerInStruct => "structures cannot contain samplers",
            LinkMismatch => "vertex and fragment shaders do not match",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// An error reported against the input program
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Error code
    pub code: ErrorCode,
    /// Location of the offending construct
    pub location: SourceLocation,
    /// Offending identifier or other context text
    pub context: Option<String>,
}

impl Diagnostic {
    /// Create a new diagnostic
    ///
    /// # Parameters
    ///
    /// * `code`: error code
    /// * `location`: location of the offending construct
    /// * `context`: optional context text, usually the offending identifier
    pub fn new(code: ErrorCode, location: SourceLocation, context: Option<String>) -> Self {
        Self {
            code,
            location,
            context,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.code)?;

        if let Some(context) = &self.context {
            write!(f, ": {}", context)?;
        }

        Ok(())
    }
}

fn format_diagnostics(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Translator error type
#[derive(Debug, Error)]
pub enum Error {
    /// Errors were reported against the input program
    #[error("{}", format_diagnostics(.0))]
    Diagnostics(Vec<Diagnostic>),
    /// An invariant of the translator itself was violated
    #[error("internal compiler error: {0}")]
    Internal(String),
    /// Translation was requested on a tree that did not verify cleanly
    #[error("translation requires a verified, error-free tree")]
    NotVerified,
    /// I/O error while reading source text
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// Invalid compilation options
    #[error("invalid options: {0}")]
    Options(String),
}

impl Error {
    /// Create a new [Internal](#variant.Internal) error
    ///
    /// # Parameters
    ///
    /// * `message`: description of the violated invariant
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Diagnostics carried by this error, empty for non-diagnostic errors
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            Self::Diagnostics(diagnostics) => &diagnostics[..],
            _ => &[],
        }
    }

    /// Return true if any carried diagnostic has the given code
    pub fn has_code(&self, code: ErrorCode) -> bool {
        self.diagnostics().iter().any(|d| d.code == code)
    }
}

impl From<std::fmt::Error> for Error {
    fn from(_: std::fmt::Error) -> Self {
        Self::internal("failed to format output")
    }
}

/// Translator result type
pub type Result<T> = std::result::Result<T, Error>;

/// Failure of a single verification step
///
/// `Reported` means the error already went through the diagnostics funnel, so callers must not
/// report it again. `Internal` aborts the whole walk.
#[derive(Debug)]
pub(crate) enum Fault {
    Reported,
    Internal(Error),
}

impl From<Error> for Fault {
    fn from(error: Error) -> Self {
        Self::Internal(error)
    }
}

pub(crate) type VResult<T> = std::result::Result<T, Fault>;
