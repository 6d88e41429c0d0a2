//! Statements

use super::Translator;
use crate::ident::Storage;
use crate::tree::{NodeId, NodeKind};
use crate::{Error, Result};

impl Translator<'_> {
    /// Translate a statement inside a function body
    pub(super) fn statement(&mut self, id: NodeId) -> Result<()> {
        let children = self.tree.children(id).to_vec();

        match self.tree.kind(id).clone() {
            NodeKind::CompoundStatement { .. } => {
                self.line("{")?;
                self.indent += 1;
                for child in children {
                    self.statement(child)?;
                }
                self.indent -= 1;
                self.line("}")
            }
            NodeKind::DeclarationList { storage, .. } => {
                let prefix = if storage == Storage::Const { "const " } else { "" };

                for declarator in &children[1..] {
                    let text = self.variable(*declarator)?;
                    self.line(format_args!("{}{};", prefix, text))?;
                }

                Ok(())
            }
            NodeKind::ExpressionStatement => {
                let text = self.expr(children[0])?;
                self.line(format_args!("{};", text))
            }
            NodeKind::EmptyStatement => self.line(";"),
            NodeKind::If => {
                let condition = self.expr(children[0])?;
                self.line(format_args!("if ({})", condition))?;
                self.body(children[1])?;

                if let Some(otherwise) = children.get(2) {
                    self.line("else")?;
                    self.body(*otherwise)?;
                }

                Ok(())
            }
            NodeKind::For { .. } => self.for_loop(id, &children),
            NodeKind::While => {
                let condition = self.expr(children[0])?;
                self.line("[loop]")?;
                self.line(format_args!("while ({})", condition))?;
                self.body(children[1])
            }
            NodeKind::DoWhile => {
                self.line("[loop]")?;
                self.line("do")?;
                self.body(children[0])?;
                let condition = self.expr(children[1])?;
                self.line(format_args!("while ({});", condition))
            }
            NodeKind::Return => match children.first() {
                Some(value) => {
                    let value = self.expr(*value)?;
                    self.line(format_args!("return {};", value))
                }
                None => self.line("return;"),
            },
            NodeKind::Break => self.line("break;"),
            NodeKind::Continue => self.line("continue;"),
            NodeKind::Discard => self.line("discard;"),
            NodeKind::PrecisionDeclaration { .. } | NodeKind::InvariantDeclaration => Ok(()),
            other => Err(Error::internal(format!("{:?} is not a statement", other))),
        }
    }

    /// Translate the body of a control statement as a block
    fn body(&mut self, id: NodeId) -> Result<()> {
        if let NodeKind::CompoundStatement { .. } = self.tree.kind(id) {
            return self.statement(id);
        }

        self.line("{")?;
        self.indent += 1;
        self.statement(id)?;
        self.indent -= 1;
        self.line("}")
    }

    /// Return true if a gradient-based built-in is called within `id`
    fn uses_gradients(&self, id: NodeId) -> bool {
        self.tree.descendants(id).into_iter().any(|node| {
            matches!(self.tree.kind(node), NodeKind::FunctionCall(_))
                && self
                    .tree
                    .node(node)
                    .ident()
                    .and_then(|info| self.cx.idents().get(info).as_function())
                    .and_then(|f| f.known)
                    .map(|known| known.uses_gradients())
                    .unwrap_or(false)
        })
    }

    fn for_loop(&mut self, id: NodeId, children: &[NodeId]) -> Result<()> {
        let (init, condition, increment, body) = match children {
            [init, condition, increment, body] => (*init, *condition, *increment, *body),
            _ => return Err(Error::internal("for loop outside of the verified form")),
        };

        let declarator = self
            .tree
            .child(init, 1)
            .ok_or_else(|| Error::internal("for loop without an index"))?;

        let header = format!(
            "for ({}; {}; {})",
            self.variable(declarator)?,
            self.expr(condition)?,
            self.expr(increment)?
        );

        // Gradient lookups need uniform control flow
        let unroll = self.tree.node(id).constant().as_int().is_some() && self.uses_gradients(body);
        self.line(if unroll { "[unroll]" } else { "[loop]" })?;
        self.line(header)?;
        self.body(body)
    }
}
