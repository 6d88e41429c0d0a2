//! Assignment targets

use super::Verifier;
use crate::error::{Error, ErrorCode, Fault, VResult};
use crate::ident::{InfoId, Storage};
use crate::options::ShaderStage;
use crate::tree::{NodeId, NodeKind, Selection};

impl Verifier<'_> {
    /// Check that the expression `id` can be written
    ///
    /// Variables are writable unless they are constants, uniforms, attributes or fragment-stage
    /// varyings. Indexing and field selection are writable when their base is, except for
    /// swizzles repeating a component. The index of a `for` loop can only be written by the
    /// loop increment.
    ///
    /// # Returns
    ///
    /// The variable written through the expression.
    pub(super) fn check_lvalue(&mut self, id: NodeId) -> VResult<InfoId> {
        match self.tree.kind(id).clone() {
            NodeKind::VariableIdentifier(symbol) => {
                let info = self.tree.node(id).ident().ok_or_else(|| {
                    Fault::Internal(Error::internal("unresolved identifier used as l-value"))
                })?;

                let (storage, loop_index) = match self.cx.idents.get(info).as_variable() {
                    Some(variable) => (variable.storage, variable.loop_index),
                    None => {
                        let name = self.text(symbol);
                        return self.fail(id, ErrorCode::InvalidLValue, Some(name));
                    }
                };

                let read_only = match storage {
                    Storage::Const | Storage::Uniform | Storage::Attribute => true,
                    Storage::Varying => self.cx.stage() == ShaderStage::Fragment,
                    Storage::None => false,
                };

                if read_only {
                    let name = self.text(symbol);
                    return self.fail(id, ErrorCode::InvalidLValue, Some(name));
                }

                if loop_index && !self.in_loop_increment(id, info) {
                    let name = self.text(symbol);
                    return self.fail(id, ErrorCode::LoopIndexModified, Some(name));
                }

                Ok(info)
            }
            NodeKind::Index => {
                let base = self.child(id, 0)?;
                self.check_lvalue(base)
            }
            NodeKind::FieldSelect { field, selection } => {
                if let Some(Selection::Swizzle(components)) = selection {
                    let mut seen = [false; 4];

                    for component in components {
                        let slot = &mut seen[usize::from(component) % 4];
                        if *slot {
                            let name = self.text(field);
                            return self.fail(id, ErrorCode::InvalidLValue, Some(name));
                        }
                        *slot = true;
                    }
                }

                let base = self.child(id, 0)?;
                self.check_lvalue(base)
            }
            _ => self.fail(id, ErrorCode::InvalidLValue, None),
        }
    }

    /// Return true if `id` is part of the increment of the loop declaring `index`
    fn in_loop_increment(&self, id: NodeId, index: InfoId) -> bool {
        let for_node = self
            .cx
            .idents
            .get(index)
            .node
            .and_then(|declarator| self.tree.parent(declarator))
            .and_then(|list| self.tree.parent(list));

        let increment = match for_node.map(|node| (node, self.tree.kind(node))) {
            Some((
                node,
                NodeKind::For {
                    has_condition,
                    has_increment: true,
                },
            )) => self.tree.child(node, 1 + usize::from(*has_condition)),
            _ => None,
        };

        match increment {
            Some(increment) => {
                id == increment || self.tree.ancestors(id).any(|a| a == increment)
            }
            None => false,
        }
    }

    /// Record a write to `variable` made by the expression `site`
    pub(super) fn mark_written(&mut self, site: NodeId, variable: InfoId) -> VResult<()> {
        let special = match self.cx.idents.get_mut(variable).as_variable_mut() {
            Some(info) => {
                info.writes += 1;
                info.used = true;
                info.special
            }
            None => None,
        };

        if let Some(special) = special {
            if !self.cx.record_output_write(special) {
                return self.fail(site, ErrorCode::FragColorAndFragData, None);
            }
        }

        Ok(())
    }
}
