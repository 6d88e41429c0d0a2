//! Lexer for GLSL ES 1.00 source text
//!
//! Converts characters into [Token]s with their source locations. Directive lines are handled
//! here: there is no macro preprocessor, so only `#version`, `#extension` and `#pragma` are
//! understood.

use std::collections::{HashMap, HashSet};

use lazy_static::lazy_static;

use super::token::{Token, TokenKind};
use crate::context::Context;
use crate::error::{ErrorCode, VResult};
use crate::source::SourceLocation;
use crate::types::BasicType;

lazy_static! {
    static ref KEYWORDS: HashMap<&'static str, TokenKind> = {
        use TokenKind::*;

        let mut m = HashMap::new();
        m.insert("attribute", Attribute);
        m.insert("const", Const);
        m.insert("uniform", Uniform);
        m.insert("varying", Varying);
        m.insert("in", In);
        m.insert("out", Out);
        m.insert("inout", InOut);
        m.insert("invariant", Invariant);
        m.insert("precision", PrecisionKw);
        m.insert("lowp", Precision(crate::ident::Precision::Low));
        m.insert("mediump", Precision(crate::ident::Precision::Medium));
        m.insert("highp", Precision(crate::ident::Precision::High));
        m.insert("break", Break);
        m.insert("continue", Continue);
        m.insert("do", Do);
        m.insert("for", For);
        m.insert("while", While);
        m.insert("if", If);
        m.insert("else", Else);
        m.insert("discard", Discard);
        m.insert("return", Return);
        m.insert("struct", Struct);
        m.insert("true", BoolConstant(true));
        m.insert("false", BoolConstant(false));

        for basic in &[
            BasicType::Void,
            BasicType::Float,
            BasicType::Int,
            BasicType::Bool,
            BasicType::Vec2,
            BasicType::Vec3,
            BasicType::Vec4,
            BasicType::IVec2,
            BasicType::IVec3,
            BasicType::IVec4,
            BasicType::BVec2,
            BasicType::BVec3,
            BasicType::BVec4,
            BasicType::Mat2,
            BasicType::Mat3,
            BasicType::Mat4,
            BasicType::Sampler2D,
            BasicType::SamplerCube,
        ] {
            m.insert(basic.glsl_name(), Type(*basic));
        }

        m
    };

    static ref RESERVED: HashSet<&'static str> = [
        "asm", "class", "union", "enum", "typedef", "template", "this", "packed", "goto",
        "switch", "default", "inline", "noinline", "volatile", "public", "static", "extern",
        "external", "interface", "flat", "long", "short", "double", "half", "fixed",
        "unsigned", "superp", "input", "output", "hvec2", "hvec3", "hvec4", "dvec2", "dvec3",
        "dvec4", "fvec2", "fvec3", "fvec4", "sampler1D", "sampler3D", "sampler1DShadow",
        "sampler2DShadow", "sampler2DRect", "sampler3DRect", "sampler2DRectShadow", "sizeof",
        "cast", "namespace", "using",
    ]
    .iter()
    .copied()
    .collect();
}

/// Operators, longest first
const OPERATORS: &[(&str, TokenKind)] = &[
    ("++", TokenKind::PlusPlus),
    ("--", TokenKind::DashDash),
    ("+=", TokenKind::AddAssign),
    ("-=", TokenKind::SubAssign),
    ("*=", TokenKind::MulAssign),
    ("/=", TokenKind::DivAssign),
    ("<=", TokenKind::LessEqual),
    (">=", TokenKind::GreaterEqual),
    ("==", TokenKind::EqualEqual),
    ("!=", TokenKind::NotEqual),
    ("&&", TokenKind::AndAnd),
    ("||", TokenKind::OrOr),
    ("^^", TokenKind::XorXor),
    ("(", TokenKind::LeftParen),
    (")", TokenKind::RightParen),
    ("[", TokenKind::LeftBracket),
    ("]", TokenKind::RightBracket),
    ("{", TokenKind::LeftBrace),
    ("}", TokenKind::RightBrace),
    (".", TokenKind::Dot),
    (",", TokenKind::Comma),
    (":", TokenKind::Colon),
    (";", TokenKind::Semicolon),
    ("?", TokenKind::Question),
    ("=", TokenKind::Equal),
    ("+", TokenKind::Plus),
    ("-", TokenKind::Dash),
    ("*", TokenKind::Star),
    ("/", TokenKind::Slash),
    ("!", TokenKind::Bang),
    ("<", TokenKind::LeftAngle),
    (">", TokenKind::RightAngle),
];

/// Operators reserved for future use
const RESERVED_OPERATORS: &[&str] = &[
    "<<=", ">>=", "%=", "&=", "^=", "|=", "<<", ">>", "%", "&", "|", "^", "~",
];

struct Lexer<'c, 'x> {
    chars: &'c [char],
    pos: usize,
    line: u32,
    column: u32,
    /// Only whitespace was seen since the start of the line
    line_start: bool,
    cx: &'x mut Context,
}

/// Split `chars` into tokens
///
/// Directive errors are reported and lexing continues; any other error stops lexing.
pub(crate) fn tokenize(chars: &[char], cx: &mut Context) -> VResult<Vec<Token>> {
    let mut lexer = Lexer {
        chars,
        pos: 0,
        line: 1,
        column: 1,
        line_start: true,
        cx,
    };

    let mut tokens = Vec::new();
    while let Some(token) = lexer.next_token()? {
        tokens.push(token);
    }

    trace!("lexed {} tokens", tokens.len());
    Ok(tokens)
}

impl Lexer<'_, '_> {
    fn peek(&self, n: usize) -> Option<char> {
        self.chars.get(self.pos + n).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek(0)?;
        self.pos += 1;

        if c == '\n' {
            self.line += 1;
            self.column = 1;
            self.line_start = true;
        } else {
            self.column += 1;
        }

        Some(c)
    }

    fn loc(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }

    fn starts_with(&self, text: &str) -> bool {
        text.chars()
            .enumerate()
            .all(|(i, c)| self.peek(i) == Some(c))
    }

    fn fail<T>(&mut self, code: ErrorCode, loc: SourceLocation, context: String) -> VResult<T> {
        Err(self.cx.report(code, loc, Some(context)))
    }

    /// Skip whitespace and comments
    fn skip_trivia(&mut self) -> VResult<()> {
        loop {
            match (self.peek(0), self.peek(1)) {
                (Some(c), _) if c.is_whitespace() => {
                    self.bump();
                }
                (Some('/'), Some('/')) => {
                    while let Some(c) = self.peek(0) {
                        if c == '\n' {
                            break;
                        }
                        self.bump();
                    }
                }
                (Some('/'), Some('*')) => {
                    let loc = self.loc();
                    self.bump();
                    self.bump();

                    loop {
                        match (self.peek(0), self.peek(1)) {
                            (Some('*'), Some('/')) => {
                                self.bump();
                                self.bump();
                                break;
                            }
                            (Some(_), _) => {
                                self.bump();
                            }
                            (None, _) => {
                                return self.fail(
                                    ErrorCode::SyntaxError,
                                    loc,
                                    "unterminated comment".to_owned(),
                                );
                            }
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn next_token(&mut self) -> VResult<Option<Token>> {
        loop {
            self.skip_trivia()?;

            let c = match self.peek(0) {
                Some(c) => c,
                None => return Ok(None),
            };

            if c == '#' {
                let loc = self.loc();
                if !self.line_start {
                    return self.fail(
                        ErrorCode::SyntaxError,
                        loc,
                        "directive must start a line".to_owned(),
                    );
                }

                self.directive(loc);
                continue;
            }

            self.line_start = false;
            let loc = self.loc();

            let kind = if c.is_ascii_alphabetic() || c == '_' {
                self.word(loc)?
            } else if c.is_ascii_digit() || (c == '.' && self.peek(1).map_or(false, |d| d.is_ascii_digit())) {
                self.number(loc)?
            } else {
                self.operator(loc)?
            };

            let end = self.loc();
            return Ok(Some(Token {
                kind,
                loc: loc.to(end),
            }));
        }
    }

    fn word(&mut self, loc: SourceLocation) -> VResult<TokenKind> {
        let mut text = String::new();
        while let Some(c) = self.peek(0) {
            if c.is_ascii_alphanumeric() || c == '_' {
                text.push(c);
                self.bump();
            } else {
                break;
            }
        }

        if let Some(keyword) = KEYWORDS.get(text.as_str()) {
            return Ok(keyword.clone());
        }

        if RESERVED.contains(text.as_str()) {
            return self.fail(ErrorCode::ReservedKeyword, loc, text);
        }

        Ok(TokenKind::Identifier(text))
    }

    fn number(&mut self, loc: SourceLocation) -> VResult<TokenKind> {
        let mut text = String::new();

        if self.peek(0) == Some('0') && matches!(self.peek(1), Some('x') | Some('X')) {
            self.bump();
            self.bump();

            while let Some(c) = self.peek(0) {
                if c.is_ascii_hexdigit() {
                    text.push(c);
                    self.bump();
                } else {
                    break;
                }
            }

            return match u32::from_str_radix(&text, 16) {
                Ok(bits) => {
                    self.check_suffix(loc)?;
                    Ok(TokenKind::IntConstant(i64::from(bits as i32)))
                }
                _ => self.fail(
                    ErrorCode::SyntaxError,
                    loc,
                    format!("invalid hexadecimal constant 0x{}", text),
                ),
            };
        }

        let mut is_float = false;
        while let Some(c) = self.peek(0) {
            if c.is_ascii_digit() {
                text.push(c);
            } else if c == '.' && !is_float {
                is_float = true;
                text.push(c);
            } else {
                break;
            }
            self.bump();
        }

        if matches!(self.peek(0), Some('e') | Some('E')) {
            let sign = matches!(self.peek(1), Some('+') | Some('-'));
            let digit = self.peek(if sign { 2 } else { 1 });

            if digit.map_or(false, |d| d.is_ascii_digit()) {
                is_float = true;
                text.push('e');
                self.bump();

                if sign {
                    text.extend(self.bump());
                }

                while let Some(c) = self.peek(0) {
                    if c.is_ascii_digit() {
                        text.push(c);
                        self.bump();
                    } else {
                        break;
                    }
                }
            }
        }

        self.check_suffix(loc)?;

        if is_float {
            return match text.parse::<f64>() {
                Ok(value) => Ok(TokenKind::FloatConstant(value)),
                Err(_) => self.fail(
                    ErrorCode::SyntaxError,
                    loc,
                    format!("invalid floating-point constant {}", text),
                ),
            };
        }

        // Octal constants may use all 32 bits, decimal ones must fit a signed int
        let parsed = if text.len() > 1 && text.starts_with('0') {
            u32::from_str_radix(&text[1..], 8).map(|bits| bits as i32)
        } else {
            text.parse::<i32>()
        };

        match parsed {
            Ok(value) => Ok(TokenKind::IntConstant(i64::from(value))),
            Err(_) => self.fail(
                ErrorCode::SyntaxError,
                loc,
                format!("invalid integer constant {}", text),
            ),
        }
    }

    /// Reject letters glued to a number, such as the `f` suffix
    fn check_suffix(&mut self, loc: SourceLocation) -> VResult<()> {
        match self.peek(0) {
            Some(c) if c.is_ascii_alphanumeric() || c == '_' => self.fail(
                ErrorCode::SyntaxError,
                loc,
                format!("invalid suffix {} on numeric constant", c),
            ),
            _ => Ok(()),
        }
    }

    /// Longest match across the valid and the reserved operators
    fn operator(&mut self, loc: SourceLocation) -> VResult<TokenKind> {
        let valid = OPERATORS.iter().find(|(text, _)| self.starts_with(text));
        let reserved = RESERVED_OPERATORS
            .iter()
            .filter(|text| self.starts_with(text))
            .max_by_key(|text| text.len());

        if let Some(reserved) = reserved {
            if valid.map(|(text, _)| text.len() < reserved.len()).unwrap_or(true) {
                return self.fail(
                    ErrorCode::SyntaxError,
                    loc,
                    format!("reserved operator {}", reserved),
                );
            }
        }

        if let Some((text, kind)) = valid {
            for _ in 0..text.len() {
                self.bump();
            }
            return Ok(kind.clone());
        }

        let c = self.peek(0).unwrap_or('\0');
        self.fail(ErrorCode::InvalidCharacter, loc, c.escape_default().to_string())
    }

    /// Read the rest of a directive line, after the `#`
    fn directive(&mut self, loc: SourceLocation) {
        self.bump();

        let mut line = String::new();
        while let Some(c) = self.peek(0) {
            if c == '\n' {
                break;
            }
            line.push(c);
            self.bump();
        }

        // Drop trailing comments
        if let Some(i) = line.find("//") {
            line.truncate(i);
        }

        let spaced = line.replace(':', " : ");
        let words: Vec<&str> = spaced.split_whitespace().collect();

        match words.as_slice() {
            [] => {}
            ["version", "100"] => debug!("{}: #version 100", loc),
            ["version", other] => {
                self.cx.report(
                    ErrorCode::UnsupportedDirective,
                    loc,
                    Some(format!("#version {}", other)),
                );
            }
            ["extension", name, ":", behavior] => self.cx.extension(name, behavior, loc),
            ["pragma", ..] => warn!(
                "{}: ignoring #pragma{}",
                loc,
                &line.trim_start()["pragma".len()..]
            ),
            [name, ..] => {
                self.cx.report(
                    ErrorCode::UnsupportedDirective,
                    loc,
                    Some(format!("#{}", name)),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::CompileOptions;

    fn lex(source: &str) -> (VResult<Vec<TokenKind>>, Context) {
        let mut cx = Context::new(CompileOptions::default()).unwrap();
        let chars: Vec<char> = source.chars().collect();
        let result = tokenize(&chars, &mut cx).map(|t| t.into_iter().map(|t| t.kind).collect());
        (result, cx)
    }

    fn kinds(source: &str) -> Vec<TokenKind> {
        match lex(source).0 {
            Ok(kinds) => kinds,
            Err(_) => panic!("lexing failed"),
        }
    }

    #[test]
    fn keywords_and_identifiers() {
        use TokenKind::*;

        assert_eq!(
            kinds("uniform highp vec4 color_1;"),
            vec![
                Uniform,
                Precision(crate::ident::Precision::High),
                Type(BasicType::Vec4),
                Identifier("color_1".to_owned()),
                Semicolon
            ]
        );
    }

    #[test]
    fn numbers() {
        use TokenKind::*;

        assert_eq!(
            kinds("1 017 0x1F 1.5 .5 2. 1e3 2.5E-1"),
            vec![
                IntConstant(1),
                IntConstant(15),
                IntConstant(31),
                FloatConstant(1.5),
                FloatConstant(0.5),
                FloatConstant(2.0),
                FloatConstant(1000.0),
                FloatConstant(0.25),
            ]
        );

        assert!(lex("1.0f").0.is_err());
    }

    #[test]
    fn integer_range() {
        use TokenKind::*;

        assert_eq!(
            kinds("2147483647 0xFFFFFFFF 037777777777"),
            vec![IntConstant(2147483647), IntConstant(-1), IntConstant(-1)]
        );

        let (result, cx) = lex("int x = 2147483648;");
        assert!(result.is_err());
        assert_eq!(cx.diagnostics()[0].code, ErrorCode::SyntaxError);

        assert!(lex("0x100000000").0.is_err());
    }

    #[test]
    fn operators_longest_first() {
        use TokenKind::*;

        assert_eq!(
            kinds("a+=b++ <= c ^^ d"),
            vec![
                Identifier("a".to_owned()),
                AddAssign,
                Identifier("b".to_owned()),
                PlusPlus,
                LessEqual,
                Identifier("c".to_owned()),
                XorXor,
                Identifier("d".to_owned()),
            ]
        );
    }

    #[test]
    fn logical_operators() {
        use TokenKind::*;

        assert_eq!(
            kinds("a&&b||c^^d"),
            vec![
                Identifier("a".to_owned()),
                AndAnd,
                Identifier("b".to_owned()),
                OrOr,
                Identifier("c".to_owned()),
                XorXor,
                Identifier("d".to_owned()),
            ]
        );
    }

    #[test]
    fn comments_are_skipped() {
        assert_eq!(kinds("a /* b \n c */ // d\n e").len(), 2);
    }

    #[test]
    fn reserved_words_and_operators() {
        let (result, cx) = lex("float switch;");
        assert!(result.is_err());
        assert_eq!(cx.diagnostics()[0].code, ErrorCode::ReservedKeyword);

        for source in &["a % b", "a & b", "a | b", "a ^ b", "a << b", "a <<= b", "a &= b"] {
            let (result, cx) = lex(source);
            assert!(result.is_err(), "{}", source);
            assert_eq!(cx.diagnostics()[0].code, ErrorCode::SyntaxError, "{}", source);
        }

        let (result, cx) = lex("a @ b");
        assert!(result.is_err());
        assert_eq!(cx.diagnostics()[0].code, ErrorCode::InvalidCharacter);
    }

    #[test]
    fn directives() {
        let (result, cx) = lex("#version 100\n#extension GL_OES_standard_derivatives : enable\nfloat x;");
        assert_eq!(result.map(|k| k.len()).ok(), Some(3));
        assert!(cx.standard_derivatives());
        assert!(!cx.has_errors());

        let (result, cx) = lex("#define X 1\nfloat x;");
        assert!(result.is_ok());
        assert_eq!(cx.diagnostics()[0].code, ErrorCode::UnsupportedDirective);

        let (result, _) = lex("float x; #pragma foo");
        assert!(result.is_err());
    }
}
