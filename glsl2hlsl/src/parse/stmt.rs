//! Statement parsing

use super::parser::Parser;
use super::token::TokenKind;
use crate::error::VResult;
use crate::tree::{NodeId, NodeKind};

impl Parser<'_> {
    /// Parse `{ statements }` into the existing compound statement `node`
    pub(super) fn block(&mut self, node: NodeId) -> VResult<()> {
        self.expect(TokenKind::LeftBrace)?;
        self.push_block();

        let result = self.statements(node);
        self.pop_block();
        result
    }

    fn statements(&mut self, node: NodeId) -> VResult<()> {
        while self.tokens.take_if(&TokenKind::RightBrace).is_none() {
            if self.tokens.is_eof() {
                return self.error("'}'");
            }

            self.statement(node)?;
        }

        Ok(())
    }

    /// Parse a statement into `parent`
    pub(super) fn statement(&mut self, parent: NodeId) -> VResult<()> {
        let loc = self.tokens.loc();

        match self.tokens.peek_kind() {
            TokenKind::LeftBrace => {
                let node = self.tree.add(
                    parent,
                    NodeKind::CompoundStatement { new_scope: true },
                    loc,
                );
                self.block(node)
            }
            TokenKind::If => self.if_statement(parent),
            TokenKind::For => self.for_statement(parent),
            TokenKind::While => self.while_statement(parent),
            TokenKind::Do => self.do_while_statement(parent),
            TokenKind::Return => {
                self.tokens.take();
                let node = self.tree.add(parent, NodeKind::Return, loc);
                if !self.tokens.next_is(&TokenKind::Semicolon) {
                    self.expression(node)?;
                }
                self.expect(TokenKind::Semicolon)?;
                Ok(())
            }
            TokenKind::Break | TokenKind::Continue | TokenKind::Discard => {
                let kind = match self.tokens.take().kind {
                    TokenKind::Break => NodeKind::Break,
                    TokenKind::Continue => NodeKind::Continue,
                    _ => NodeKind::Discard,
                };
                self.tree.add(parent, kind, loc);
                self.expect(TokenKind::Semicolon)?;
                Ok(())
            }
            TokenKind::Semicolon => {
                self.tokens.take();
                self.tree.add(parent, NodeKind::EmptyStatement, loc);
                Ok(())
            }
            _ if self.at_declaration() => self.declaration(parent),
            _ => {
                let node = self.tree.add(parent, NodeKind::ExpressionStatement, loc);
                self.expression(node)?;
                self.expect(TokenKind::Semicolon)?;
                Ok(())
            }
        }
    }

    /// Parse the body of a loop, which shares the scope the loop introduces
    fn loop_body(&mut self, parent: NodeId) -> VResult<()> {
        if self.tokens.next_is(&TokenKind::LeftBrace) {
            let loc = self.tokens.loc();
            let node = self.tree.add(
                parent,
                NodeKind::CompoundStatement { new_scope: false },
                loc,
            );
            self.block(node)
        } else {
            self.statement(parent)
        }
    }

    /// Parse a branch of an `if`, giving a lone declaration its own scope
    fn branch(&mut self, parent: NodeId) -> VResult<()> {
        if self.at_declaration() {
            let loc = self.tokens.loc();
            let node = self.tree.add(
                parent,
                NodeKind::CompoundStatement { new_scope: true },
                loc,
            );
            self.push_block();
            let result = self.declaration(node);
            self.pop_block();
            result
        } else {
            self.statement(parent)
        }
    }

    fn if_statement(&mut self, parent: NodeId) -> VResult<()> {
        let loc = self.expect(TokenKind::If)?.loc;
        let node = self.tree.add(parent, NodeKind::If, loc);

        self.expect(TokenKind::LeftParen)?;
        self.expression(node)?;
        self.expect(TokenKind::RightParen)?;
        self.branch(node)?;

        if self.tokens.take_if(&TokenKind::Else).is_some() {
            self.branch(node)?;
        }

        Ok(())
    }

    fn for_statement(&mut self, parent: NodeId) -> VResult<()> {
        let loc = self.expect(TokenKind::For)?.loc;
        let node = self.tree.add(
            parent,
            NodeKind::For {
                has_condition: false,
                has_increment: false,
            },
            loc,
        );

        self.push_block();
        let result = self.for_parts(node);
        self.pop_block();
        result
    }

    fn for_parts(&mut self, node: NodeId) -> VResult<()> {
        self.expect(TokenKind::LeftParen)?;

        // The init statement consumes its own semicolon
        let init_loc = self.tokens.loc();
        if self.at_declaration() {
            self.declaration(node)?;
        } else if self.tokens.take_if(&TokenKind::Semicolon).is_some() {
            self.tree.add(node, NodeKind::EmptyStatement, init_loc);
        } else {
            let init = self.tree.add(node, NodeKind::ExpressionStatement, init_loc);
            self.expression(init)?;
            self.expect(TokenKind::Semicolon)?;
        }

        let has_condition = !self.tokens.next_is(&TokenKind::Semicolon);
        if has_condition {
            self.expression(node)?;
        }
        self.expect(TokenKind::Semicolon)?;

        let has_increment = !self.tokens.next_is(&TokenKind::RightParen);
        if has_increment {
            self.expression(node)?;
        }
        self.expect(TokenKind::RightParen)?;

        self.tree.node_mut(node).kind = NodeKind::For {
            has_condition,
            has_increment,
        };

        self.loop_body(node)
    }

    fn while_statement(&mut self, parent: NodeId) -> VResult<()> {
        let loc = self.expect(TokenKind::While)?.loc;
        let node = self.tree.add(parent, NodeKind::While, loc);

        self.expect(TokenKind::LeftParen)?;
        self.expression(node)?;
        self.expect(TokenKind::RightParen)?;

        self.push_block();
        let result = self.loop_body(node);
        self.pop_block();
        result
    }

    fn do_while_statement(&mut self, parent: NodeId) -> VResult<()> {
        let loc = self.expect(TokenKind::Do)?.loc;
        let node = self.tree.add(parent, NodeKind::DoWhile, loc);

        self.push_block();
        let result = self.loop_body(node);
        self.pop_block();
        result?;

        self.expect(TokenKind::While)?;
        self.expect(TokenKind::LeftParen)?;
        self.expression(node)?;
        self.expect(TokenKind::RightParen)?;
        self.expect(TokenKind::Semicolon)?;
        Ok(())
    }
}
