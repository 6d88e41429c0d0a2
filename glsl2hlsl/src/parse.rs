//! Parsing utilities

use std::path::Path;

use crate::context::Context;
use crate::error::{Error, Fault};
use crate::source::{drain, CharSource, ReaderSource, StrSource};
use crate::tree::Tree;
use crate::Result;

mod expr;
mod lexer;
mod parser;
mod stmt;
mod token;

pub use token::{Token, TokenKind};

fn into_result<T>(result: std::result::Result<T, Fault>, cx: &Context) -> Result<T> {
    match result {
        Ok(value) => Ok(value),
        Err(Fault::Reported) => Err(Error::Diagnostics(cx.diagnostics().to_vec())),
        Err(Fault::Internal(error)) => Err(error),
    }
}

/// Parse a translation unit from a character source
///
/// Diagnostics for directives the lexer skips over are kept in the context and do not stop
/// parsing. Any other lexical or syntax error stops at the first occurrence.
///
/// # Parameters
///
/// * `source`: character source, drained completely before lexing
/// * `cx`: compilation context receiving symbols and diagnostics
pub fn parse_source(source: &mut dyn CharSource, cx: &mut Context) -> Result<Tree> {
    let chars = drain(source)?;
    info!("parsing {} characters", chars.len());

    let tokens = lexer::tokenize(&chars, cx);
    let tokens = into_result(tokens, cx)?;

    let tree = parser::Parser::new(tokens, cx).parse_translation_unit();
    let tree = into_result(tree, cx)?;

    debug!("parsed {} nodes", tree.len());
    Ok(tree)
}

/// Parse a translation unit held in memory
pub fn parse_str(source: &str, cx: &mut Context) -> Result<Tree> {
    parse_source(&mut StrSource::new(source), cx)
}

/// Parse a translation unit from a file
///
/// # Parameters
///
/// * `path`: path to the source file
/// * `cx`: compilation context
pub fn parse_file(path: &Path, cx: &mut Context) -> Result<Tree> {
    let file = std::fs::File::open(path)?;
    parse_source(&mut ReaderSource::new(file), cx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::options::CompileOptions;
    use crate::tree::{BinaryOp, NodeKind};

    fn parse(source: &str) -> (Result<Tree>, Context) {
        let mut cx = Context::new(CompileOptions::default()).unwrap();
        let tree = parse_str(source, &mut cx);
        (tree, cx)
    }

    #[test]
    fn precedence() {
        let (tree, _) = parse("void main() { x = 1 + 2 * 3; }");
        let tree = tree.unwrap();

        let add = tree
            .find(tree.root(), |k| *k == NodeKind::Binary(BinaryOp::Add))
            .unwrap();
        let children = tree.children(add);
        assert_eq!(*tree.kind(children[0]), NodeKind::IntLiteral(1));
        assert_eq!(*tree.kind(children[1]), NodeKind::Binary(BinaryOp::Mul));
    }

    #[test]
    fn left_associative() {
        let (tree, _) = parse("void main() { x = 1 - 2 - 3; }");
        let tree = tree.unwrap();

        let outer = tree
            .find(tree.root(), |k| *k == NodeKind::Binary(BinaryOp::Sub))
            .unwrap();
        let children = tree.children(outer);
        assert_eq!(*tree.kind(children[0]), NodeKind::Binary(BinaryOp::Sub));
        assert_eq!(*tree.kind(children[1]), NodeKind::IntLiteral(3));
    }

    #[test]
    fn struct_names_are_types() {
        let (tree, _) = parse("struct S { float a; }; void main() { S s = S(1.0); }");
        let tree = tree.unwrap();

        assert!(tree
            .find(tree.root(), |k| matches!(k, NodeKind::StructConstructor(_)))
            .is_some());
        assert!(tree
            .find(tree.root(), |k| matches!(k, NodeKind::Declarator { .. }))
            .is_some());
    }

    #[test]
    fn for_loop_shape() {
        let (tree, _) = parse("void main() { for (int i = 0; i < 4; i++) { } }");
        let tree = tree.unwrap();

        let node = tree
            .find(tree.root(), |k| matches!(k, NodeKind::For { .. }))
            .unwrap();
        assert_eq!(
            *tree.kind(node),
            NodeKind::For {
                has_condition: true,
                has_increment: true
            }
        );
        assert_eq!(tree.children(node).len(), 4);
    }

    #[test]
    fn syntax_error_stops_parsing() {
        let (tree, cx) = parse("void main() { float x = ; }");
        let error = tree.unwrap_err();
        assert!(error.has_code(ErrorCode::SyntaxError));
        assert_eq!(cx.diagnostics().len(), 1);
    }
}
