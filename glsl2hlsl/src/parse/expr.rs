//! Expression parsing
//!
//! Binary operators are parsed by precedence climbing. Every function below attaches the
//! expression it parsed as the last child of `parent`.

use super::parser::Parser;
use super::token::TokenKind;
use crate::error::VResult;
use crate::source::SourceLocation;
use crate::tree::{AssignOp, BinaryOp, NodeId, NodeKind, UnaryOp};

/// Binding power of a binary operator token
fn binary_operator(kind: &TokenKind) -> Option<(BinaryOp, u8)> {
    use TokenKind::*;

    Some(match kind {
        OrOr => (BinaryOp::Or, 1),
        XorXor => (BinaryOp::Xor, 2),
        AndAnd => (BinaryOp::And, 3),
        EqualEqual => (BinaryOp::Equal, 4),
        NotEqual => (BinaryOp::NotEqual, 4),
        LeftAngle => (BinaryOp::Less, 5),
        RightAngle => (BinaryOp::Greater, 5),
        LessEqual => (BinaryOp::LessEqual, 5),
        GreaterEqual => (BinaryOp::GreaterEqual, 5),
        Plus => (BinaryOp::Add, 6),
        Dash => (BinaryOp::Sub, 6),
        Star => (BinaryOp::Mul, 7),
        Slash => (BinaryOp::Div, 7),
        _ => return None,
    })
}

fn assignment_operator(kind: &TokenKind) -> Option<AssignOp> {
    Some(match kind {
        TokenKind::Equal => AssignOp::Assign,
        TokenKind::AddAssign => AssignOp::Add,
        TokenKind::SubAssign => AssignOp::Sub,
        TokenKind::MulAssign => AssignOp::Mul,
        TokenKind::DivAssign => AssignOp::Div,
        _ => return None,
    })
}

impl Parser<'_> {
    /// Wrap the last child of `parent` into a new node of the given kind
    fn wrap_last(&mut self, parent: NodeId, kind: NodeKind, loc: SourceLocation) -> NodeId {
        let index = self.tree.children(parent).len() - 1;
        let node = self.tree.add_detached(kind, loc);

        if let Some(child) = self.tree.remove_child(parent, index) {
            self.tree.attach(node, child);
        }

        self.tree.attach(parent, node);
        node
    }

    /// `assignment (, assignment)*`
    pub(super) fn expression(&mut self, parent: NodeId) -> VResult<()> {
        self.assignment_expression(parent)?;

        while let Some(token) = self.tokens.take_if(&TokenKind::Comma) {
            let node = self.wrap_last(parent, NodeKind::Comma, token.loc);
            self.assignment_expression(node)?;
        }

        Ok(())
    }

    pub(super) fn assignment_expression(&mut self, parent: NodeId) -> VResult<()> {
        self.conditional_expression(parent)?;

        if let Some(op) = assignment_operator(self.tokens.peek_kind()) {
            let loc = self.tokens.take().loc;
            let node = self.wrap_last(parent, NodeKind::Assign(op), loc);
            self.assignment_expression(node)?;
        }

        Ok(())
    }

    pub(super) fn conditional_expression(&mut self, parent: NodeId) -> VResult<()> {
        self.binary_expression(parent, 1)?;

        if let Some(token) = self.tokens.take_if(&TokenKind::Question) {
            let node = self.wrap_last(parent, NodeKind::Ternary, token.loc);
            self.expression(node)?;
            self.expect(TokenKind::Colon)?;
            self.assignment_expression(node)?;
        }

        Ok(())
    }

    fn binary_expression(&mut self, parent: NodeId, min_power: u8) -> VResult<()> {
        self.unary_expression(parent)?;

        while let Some((op, power)) = binary_operator(self.tokens.peek_kind()) {
            if power < min_power {
                break;
            }

            let loc = self.tokens.take().loc;
            let node = self.wrap_last(parent, NodeKind::Binary(op), loc);
            self.binary_expression(node, power + 1)?;
        }

        Ok(())
    }

    fn unary_expression(&mut self, parent: NodeId) -> VResult<()> {
        let op = match self.tokens.peek_kind() {
            TokenKind::Plus => UnaryOp::Plus,
            TokenKind::Dash => UnaryOp::Minus,
            TokenKind::Bang => UnaryOp::Not,
            TokenKind::PlusPlus => UnaryOp::PreInc,
            TokenKind::DashDash => UnaryOp::PreDec,
            _ => return self.postfix_expression(parent),
        };

        let loc = self.tokens.take().loc;
        let node = self.tree.add(parent, NodeKind::Unary(op), loc);
        self.unary_expression(node)
    }

    fn postfix_expression(&mut self, parent: NodeId) -> VResult<()> {
        self.primary_expression(parent)?;

        loop {
            let token = self.tokens.peek().clone();

            match token.kind {
                TokenKind::LeftBracket => {
                    self.tokens.take();
                    let node = self.wrap_last(parent, NodeKind::Index, token.loc);
                    self.expression(node)?;
                    self.expect(TokenKind::RightBracket)?;
                }
                TokenKind::Dot => {
                    self.tokens.take();
                    let (field, _) = self.identifier()?;
                    self.wrap_last(
                        parent,
                        NodeKind::FieldSelect {
                            field,
                            selection: None,
                        },
                        token.loc,
                    );
                }
                TokenKind::PlusPlus => {
                    self.tokens.take();
                    self.wrap_last(parent, NodeKind::Unary(UnaryOp::PostInc), token.loc);
                }
                TokenKind::DashDash => {
                    self.tokens.take();
                    self.wrap_last(parent, NodeKind::Unary(UnaryOp::PostDec), token.loc);
                }
                _ => return Ok(()),
            }
        }
    }

    fn primary_expression(&mut self, parent: NodeId) -> VResult<()> {
        let token = self.tokens.peek().clone();
        let loc = token.loc;

        match token.kind {
            TokenKind::IntConstant(value) => {
                self.tokens.take();
                self.tree.add(parent, NodeKind::IntLiteral(value), loc);
            }
            TokenKind::FloatConstant(value) => {
                self.tokens.take();
                self.tree.add(parent, NodeKind::FloatLiteral(value), loc);
            }
            TokenKind::BoolConstant(value) => {
                self.tokens.take();
                self.tree.add(parent, NodeKind::BoolLiteral(value), loc);
            }
            TokenKind::LeftParen => {
                self.tokens.take();
                self.expression(parent)?;
                self.expect(TokenKind::RightParen)?;
            }
            TokenKind::Type(basic) => {
                self.tokens.take();
                let node = self.tree.add(parent, NodeKind::ConstructorCall(basic), loc);
                self.arguments(node)?;
            }
            TokenKind::Identifier(_) => {
                let is_type = self.is_type_name(&token);
                let (symbol, _) = self.identifier()?;

                if is_type {
                    let node = self
                        .tree
                        .add(parent, NodeKind::StructConstructor(symbol), loc);
                    self.arguments(node)?;
                } else if self.tokens.next_is(&TokenKind::LeftParen) {
                    let node = self.tree.add(parent, NodeKind::FunctionCall(symbol), loc);
                    self.arguments(node)?;
                } else {
                    self.tree
                        .add(parent, NodeKind::VariableIdentifier(symbol), loc);
                }
            }
            _ => return self.error("expression"),
        }

        Ok(())
    }

    /// `( )`, `( void )` or `( assignment (, assignment)* )`
    fn arguments(&mut self, call: NodeId) -> VResult<()> {
        self.expect(TokenKind::LeftParen)?;

        if self.tokens.take_if(&TokenKind::RightParen).is_some() {
            return Ok(());
        }

        if self.tokens.next_is(&TokenKind::Type(crate::types::BasicType::Void))
            && self.tokens.peek_nth(1).kind == TokenKind::RightParen
        {
            self.tokens.take();
            self.tokens.take();
            return Ok(());
        }

        loop {
            self.assignment_expression(call)?;

            if self.tokens.take_if(&TokenKind::Comma).is_none() {
                break;
            }
        }

        self.expect(TokenKind::RightParen)?;
        Ok(())
    }
}
