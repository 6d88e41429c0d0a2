//! Tokens and the token stream consumed by the parser

use std::fmt;

use crate::ident::Precision;
use crate::source::SourceLocation;
use crate::types::BasicType;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Qualifiers
    Attribute,
    Const,
    Uniform,
    Varying,
    In,
    Out,
    InOut,
    Invariant,
    PrecisionKw,
    Precision(Precision),
    // Control flow
    Break,
    Continue,
    Do,
    For,
    While,
    If,
    Else,
    Discard,
    Return,
    Struct,
    /// Built-in type keyword, including `void`
    Type(BasicType),
    Identifier(String),
    IntConstant(i64),
    FloatConstant(f64),
    BoolConstant(bool),
    // Punctuation
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    LeftBrace,
    RightBrace,
    Dot,
    Comma,
    Colon,
    Semicolon,
    Question,
    // Operators
    Equal,
    Plus,
    Dash,
    Star,
    Slash,
    Bang,
    LeftAngle,
    RightAngle,
    LessEqual,
    GreaterEqual,
    EqualEqual,
    NotEqual,
    AndAnd,
    OrOr,
    XorXor,
    PlusPlus,
    DashDash,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use TokenKind::*;

        let text = match self {
            Attribute => "attribute",
            Const => "const",
            Uniform => "uniform",
            Varying => "varying",
            In => "in",
            Out => "out",
            InOut => "inout",
            Invariant => "invariant",
            PrecisionKw => "precision",
            Precision(crate::ident::Precision::Low) => "lowp",
            Precision(crate::ident::Precision::Medium) => "mediump",
            Precision(_) => "highp",
            Break => "break",
            Continue => "continue",
            Do => "do",
            For => "for",
            While => "while",
            If => "if",
            Else => "else",
            Discard => "discard",
            Return => "return",
            Struct => "struct",
            Type(basic) => basic.glsl_name(),
            Identifier(name) => return f.write_str(name),
            IntConstant(value) => return write!(f, "{}", value),
            FloatConstant(value) => return write!(f, "{}", value),
            BoolConstant(value) => return write!(f, "{}", value),
            LeftParen => "(",
            RightParen => ")",
            LeftBracket => "[",
            RightBracket => "]",
            LeftBrace => "{",
            RightBrace => "}",
            Dot => ".",
            Comma => ",",
            Colon => ":",
            Semicolon => ";",
            Question => "?",
            Equal => "=",
            Plus => "+",
            Dash => "-",
            Star => "*",
            Slash => "/",
            Bang => "!",
            LeftAngle => "<",
            RightAngle => ">",
            LessEqual => "<=",
            GreaterEqual => ">=",
            EqualEqual => "==",
            NotEqual => "!=",
            AndAnd => "&&",
            OrOr => "||",
            XorXor => "^^",
            PlusPlus => "++",
            DashDash => "--",
            AddAssign => "+=",
            SubAssign => "-=",
            MulAssign => "*=",
            DivAssign => "/=",
            Eof => "end of input",
        };

        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub loc: SourceLocation,
}

/// Cursor over the lexed tokens
///
/// The token list always ends with an [TokenKind::Eof] token, so peeking never runs out.
pub struct TokenStream {
    tokens: Vec<Token>,
    cursor: usize,
}

impl TokenStream {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        let needs_eof = tokens.last().map(|t| t.kind != TokenKind::Eof).unwrap_or(true);
        if needs_eof {
            let loc = tokens
                .last()
                .map(|t| t.loc)
                .unwrap_or_else(|| SourceLocation::new(1, 1));
            tokens.push(Token {
                kind: TokenKind::Eof,
                loc,
            });
        }

        Self { tokens, cursor: 0 }
    }

    /// Next token, without advancing
    pub fn peek(&self) -> &Token {
        self.peek_nth(0)
    }

    /// Token `n` positions ahead, without advancing
    pub fn peek_nth(&self, n: usize) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.cursor + n).min(last)]
    }

    pub fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    /// Consume and return the next token
    pub fn take(&mut self) -> Token {
        let token = self.peek().clone();
        if self.cursor < self.tokens.len() - 1 {
            self.cursor += 1;
        }
        token
    }

    /// Consume the next token if it has the expected kind
    pub fn take_if(&mut self, expected: &TokenKind) -> Option<Token> {
        if self.peek_kind() == expected {
            Some(self.take())
        } else {
            None
        }
    }

    pub fn next_is(&self, expected: &TokenKind) -> bool {
        self.peek_kind() == expected
    }

    pub fn is_eof(&self) -> bool {
        self.next_is(&TokenKind::Eof)
    }

    /// Location of the next token
    pub fn loc(&self) -> SourceLocation {
        self.peek().loc
    }
}
