//! Recursive-descent parser building the syntax tree

use std::collections::HashSet;

use super::token::{Token, TokenKind, TokenStream};
use crate::context::Context;
use crate::error::{ErrorCode, Fault, VResult};
use crate::ident::{Precision, Storage};
use crate::signature::ParamQualifier;
use crate::source::SourceLocation;
use crate::symbols::SymbolIndex;
use crate::tree::{NodeId, NodeKind, Tree, TypeSpec};

pub(crate) struct Parser<'x> {
    pub(super) tokens: TokenStream,
    pub(super) tree: Tree,
    pub(super) cx: &'x mut Context,
    /// Structure names declared in each open block
    struct_names: Vec<HashSet<SymbolIndex>>,
}

/// Qualifiers in front of a declaration
#[derive(Debug, Default, Clone, Copy)]
pub(super) struct Qualifiers {
    pub storage: Storage,
    pub invariant: bool,
    pub loc: Option<SourceLocation>,
}

impl<'x> Parser<'x> {
    pub fn new(tokens: Vec<Token>, cx: &'x mut Context) -> Self {
        let loc = tokens
            .first()
            .map(|t| t.loc)
            .unwrap_or_else(|| SourceLocation::new(1, 1));

        Self {
            tokens: TokenStream::new(tokens),
            tree: Tree::new(loc),
            cx,
            struct_names: vec![HashSet::new()],
        }
    }

    /// Parse a whole translation unit
    pub fn parse_translation_unit(mut self) -> VResult<Tree> {
        let root = self.tree.root();

        while !self.tokens.is_eof() {
            self.external_declaration(root)?;
        }

        Ok(self.tree)
    }

    pub(super) fn error<T>(&mut self, expected: &str) -> VResult<T> {
        let token = self.tokens.peek().clone();
        Err(self.cx.report(
            ErrorCode::SyntaxError,
            token.loc,
            Some(format!("expected {}, found {}", expected, token.kind)),
        ))
    }

    pub(super) fn expect(&mut self, kind: TokenKind) -> VResult<Token> {
        match self.tokens.take_if(&kind) {
            Some(token) => Ok(token),
            None => self.error(&format!("'{}'", kind)),
        }
    }

    pub(super) fn identifier(&mut self) -> VResult<(SymbolIndex, SourceLocation)> {
        let token = self.tokens.peek().clone();
        match token.kind {
            TokenKind::Identifier(name) => {
                self.tokens.take();
                let symbol = self.cx.intern(&name).map_err(Fault::Internal)?;
                Ok((symbol, token.loc))
            }
            _ => self.error("identifier"),
        }
    }

    pub(super) fn push_block(&mut self) {
        self.struct_names.push(HashSet::new());
    }

    pub(super) fn pop_block(&mut self) {
        self.struct_names.pop();
    }

    /// Return true if `token` names a structure type visible here
    pub(super) fn is_type_name(&self, token: &Token) -> bool {
        match &token.kind {
            TokenKind::Identifier(name) => match self.cx.symbols().find(name) {
                Some(symbol) => self.struct_names.iter().any(|s| s.contains(&symbol)),
                None => false,
            },
            _ => false,
        }
    }

    /// Return true if the next tokens start a declaration
    pub(super) fn at_declaration(&self) -> bool {
        use TokenKind::*;

        let token = self.tokens.peek();
        match &token.kind {
            Attribute | Const | Uniform | Varying | Invariant | PrecisionKw | Precision(_)
            | Struct => true,
            // Constructors start expressions
            Type(_) => self.tokens.peek_nth(1).kind != LeftParen,
            Identifier(_) if self.is_type_name(token) => {
                matches!(self.tokens.peek_nth(1).kind, Identifier(_))
            }
            _ => false,
        }
    }

    fn external_declaration(&mut self, parent: NodeId) -> VResult<()> {
        if self.tokens.take_if(&TokenKind::Semicolon).is_some() {
            return Ok(());
        }

        self.declaration(parent)
    }

    /// Parse a declaration, a function prototype or a function definition into `parent`
    pub(super) fn declaration(&mut self, parent: NodeId) -> VResult<()> {
        let loc = self.tokens.loc();

        if self.tokens.take_if(&TokenKind::PrecisionKw).is_some() {
            return self.precision_declaration(parent, loc);
        }

        if self.tokens.next_is(&TokenKind::Invariant)
            && matches!(self.tokens.peek_nth(1).kind, TokenKind::Identifier(_))
            && !self.is_type_name(self.tokens.peek_nth(1))
        {
            self.tokens.take();
            return self.invariant_declaration(parent, loc);
        }

        let qualifiers = self.qualifiers();
        let type_spec = self.type_specifier()?;

        // Function prototype or definition
        if matches!(self.tokens.peek_kind(), TokenKind::Identifier(_))
            && self.tokens.peek_nth(1).kind == TokenKind::LeftParen
        {
            if let Some(loc) = qualifiers.loc {
                return Err(self.cx.report(
                    ErrorCode::InvalidQualifier,
                    loc,
                    Some("functions cannot have storage qualifiers".to_owned()),
                ));
            }

            return self.function(parent, type_spec, loc);
        }

        let list = self.tree.add_detached(
            NodeKind::DeclarationList {
                storage: qualifiers.storage,
                invariant: qualifiers.invariant,
            },
            loc,
        );
        self.tree.attach(list, type_spec);
        self.tree.attach(parent, list);

        if self.tokens.take_if(&TokenKind::Semicolon).is_some() {
            return Ok(());
        }

        loop {
            self.declarator(list)?;

            if self.tokens.take_if(&TokenKind::Comma).is_none() {
                break;
            }
        }

        self.expect(TokenKind::Semicolon)?;
        Ok(())
    }

    fn precision_declaration(&mut self, parent: NodeId, loc: SourceLocation) -> VResult<()> {
        let precision = match self.tokens.peek_kind() {
            TokenKind::Precision(precision) => *precision,
            _ => return self.error("precision qualifier"),
        };
        self.tokens.take();

        let ty = match self.tokens.peek_kind() {
            TokenKind::Type(basic) => *basic,
            _ => return self.error("type"),
        };
        self.tokens.take();
        self.expect(TokenKind::Semicolon)?;

        self.tree
            .add(parent, NodeKind::PrecisionDeclaration { precision, ty }, loc);
        Ok(())
    }

    fn invariant_declaration(&mut self, parent: NodeId, loc: SourceLocation) -> VResult<()> {
        let node = self.tree.add(parent, NodeKind::InvariantDeclaration, loc);

        loop {
            let (symbol, loc) = self.identifier()?;
            self.tree
                .add(node, NodeKind::VariableIdentifier(symbol), loc);

            if self.tokens.take_if(&TokenKind::Comma).is_none() {
                break;
            }
        }

        self.expect(TokenKind::Semicolon)?;
        Ok(())
    }

    fn qualifiers(&mut self) -> Qualifiers {
        let mut qualifiers = Qualifiers::default();

        if let Some(token) = self.tokens.take_if(&TokenKind::Invariant) {
            qualifiers.invariant = true;
            qualifiers.loc = Some(token.loc);
        }

        let storage = match self.tokens.peek_kind() {
            TokenKind::Const => Storage::Const,
            TokenKind::Uniform => Storage::Uniform,
            TokenKind::Attribute => Storage::Attribute,
            TokenKind::Varying => Storage::Varying,
            _ => return qualifiers,
        };

        let token = self.tokens.take();
        qualifiers.storage = storage;
        qualifiers.loc.get_or_insert(token.loc);
        qualifiers
    }

    /// Parse an optional precision qualifier and a type into a detached `TypeSpecifier` node
    pub(super) fn type_specifier(&mut self) -> VResult<NodeId> {
        let loc = self.tokens.loc();

        let precision = match self.tokens.peek_kind() {
            TokenKind::Precision(precision) => {
                let precision = *precision;
                self.tokens.take();
                precision
            }
            _ => Precision::None,
        };

        let token = self.tokens.peek().clone();
        match token.kind {
            TokenKind::Type(basic) => {
                self.tokens.take();
                Ok(self.tree.add_detached(
                    NodeKind::TypeSpecifier {
                        precision,
                        spec: TypeSpec::Basic(basic),
                    },
                    loc,
                ))
            }
            TokenKind::Struct => {
                let node = self.tree.add_detached(
                    NodeKind::TypeSpecifier {
                        precision,
                        spec: TypeSpec::Struct,
                    },
                    loc,
                );
                let spec = self.struct_specifier()?;
                self.tree.attach(node, spec);
                Ok(node)
            }
            TokenKind::Identifier(_) if self.is_type_name(&token) => {
                let (symbol, _) = self.identifier()?;
                Ok(self.tree.add_detached(
                    NodeKind::TypeSpecifier {
                        precision,
                        spec: TypeSpec::Named(symbol),
                    },
                    loc,
                ))
            }
            _ => self.error("type"),
        }
    }

    fn struct_specifier(&mut self) -> VResult<NodeId> {
        let loc = self.expect(TokenKind::Struct)?.loc;

        let name = match self.tokens.peek_kind() {
            TokenKind::Identifier(_) => Some(self.identifier()?.0),
            _ => None,
        };

        let node = self
            .tree
            .add_detached(NodeKind::StructSpecifier { name }, loc);
        self.expect(TokenKind::LeftBrace)?;

        loop {
            let field_loc = self.tokens.loc();
            let decl = self.tree.add(node, NodeKind::StructFieldDeclaration, field_loc);
            let ty = self.type_specifier()?;
            self.tree.attach(decl, ty);

            loop {
                let (name, loc) = self.identifier()?;
                let declarator = self
                    .tree
                    .add(decl, NodeKind::StructFieldDeclarator { name }, loc);

                if self.tokens.next_is(&TokenKind::LeftBracket) {
                    self.array_specifier(declarator)?;
                }

                if self.tokens.take_if(&TokenKind::Comma).is_none() {
                    break;
                }
            }

            self.expect(TokenKind::Semicolon)?;

            if self.tokens.take_if(&TokenKind::RightBrace).is_some() {
                break;
            }
        }

        if let (Some(name), Some(names)) = (name, self.struct_names.last_mut()) {
            names.insert(name);
        }

        Ok(node)
    }

    /// Parse `[size]` into an `ArraySpecifier` child of `parent`
    pub(super) fn array_specifier(&mut self, parent: NodeId) -> VResult<()> {
        let loc = self.expect(TokenKind::LeftBracket)?.loc;
        let node = self.tree.add(parent, NodeKind::ArraySpecifier, loc);
        self.conditional_expression(node)?;
        self.expect(TokenKind::RightBracket)?;
        Ok(())
    }

    fn declarator(&mut self, list: NodeId) -> VResult<()> {
        let (name, loc) = self.identifier()?;
        let node = self.tree.add(list, NodeKind::Declarator { name }, loc);

        if self.tokens.next_is(&TokenKind::LeftBracket) {
            self.array_specifier(node)?;
        }

        if let Some(token) = self.tokens.take_if(&TokenKind::Equal) {
            let init = self.tree.add(node, NodeKind::Initializer, token.loc);
            self.assignment_expression(init)?;
        }

        Ok(())
    }

    fn function(&mut self, parent: NodeId, return_type: NodeId, loc: SourceLocation) -> VResult<()> {
        let header = self.tree.add_detached(NodeKind::FunctionHeader, loc);
        self.tree.attach(header, return_type);

        let (name, name_loc) = self.identifier()?;
        self.tree.add(header, NodeKind::FunctionName(name), name_loc);
        self.expect(TokenKind::LeftParen)?;

        if !self.tokens.next_is(&TokenKind::RightParen) {
            loop {
                self.parameter(header)?;

                if self.tokens.take_if(&TokenKind::Comma).is_none() {
                    break;
                }
            }
        }

        self.expect(TokenKind::RightParen)?;

        if self.tokens.take_if(&TokenKind::Semicolon).is_some() {
            let prototype = self.tree.add(parent, NodeKind::FunctionPrototype, loc);
            self.tree.attach(prototype, header);
            return Ok(());
        }

        let definition = self.tree.add(parent, NodeKind::FunctionDefinition, loc);
        self.tree.attach(definition, header);

        // Parameters and the outermost body statements share one scope
        let body_loc = self.tokens.loc();
        let body = self.tree.add(
            definition,
            NodeKind::CompoundStatement { new_scope: false },
            body_loc,
        );
        self.block(body)
    }

    fn parameter(&mut self, header: NodeId) -> VResult<()> {
        let loc = self.tokens.loc();
        let is_const = self.tokens.take_if(&TokenKind::Const).is_some();

        let qualifier = match self.tokens.peek_kind() {
            TokenKind::In => ParamQualifier::In,
            TokenKind::Out => ParamQualifier::Out,
            TokenKind::InOut => ParamQualifier::InOut,
            _ => ParamQualifier::default(),
        };

        if matches!(
            self.tokens.peek_kind(),
            TokenKind::In | TokenKind::Out | TokenKind::InOut
        ) {
            self.tokens.take();
        }

        let ty = self.type_specifier()?;

        let name = match self.tokens.peek_kind() {
            TokenKind::Identifier(_) => Some(self.identifier()?.0),
            _ => None,
        };

        let node = self.tree.add(
            header,
            NodeKind::ParameterDeclaration {
                qualifier,
                is_const,
                name,
            },
            loc,
        );
        self.tree.attach(node, ty);

        if self.tokens.next_is(&TokenKind::LeftBracket) {
            self.array_specifier(node)?;
        }

        Ok(())
    }
}
