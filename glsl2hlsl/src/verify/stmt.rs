//! Statements and whole-unit checks

use super::{const_expression, Verifier};
use crate::error::{Error, ErrorCode, Fault, VResult};
use crate::ident::InfoId;
use crate::options::ShaderStage;
use crate::tree::{AssignOp, BinaryOp, ConstantValue, NodeId, NodeKind, UnaryOp};
use crate::types::BasicType;

/// Iterations simulated before a loop is considered to have no known trip count
const MAX_TRIP_COUNT: i64 = 1 << 16;

/// Number of iterations of `for (index = start; index op limit; index += step)`
fn trip_count(start: f64, op: BinaryOp, limit: f64, step: f64) -> Option<i64> {
    let holds = |index: f64| match op {
        BinaryOp::Less => index < limit,
        BinaryOp::Greater => index > limit,
        BinaryOp::LessEqual => index <= limit,
        BinaryOp::GreaterEqual => index >= limit,
        BinaryOp::Equal => index == limit,
        BinaryOp::NotEqual => index != limit,
        _ => false,
    };

    let mut index = start;
    let mut count = 0;

    while holds(index) {
        count += 1;
        if count > MAX_TRIP_COUNT {
            return None;
        }
        index += step;
    }

    Some(count)
}

impl Verifier<'_> {
    pub(super) fn verify_translation_unit(&mut self, id: NodeId) -> VResult<()> {
        if self.cx.entry_point().is_none() {
            return self.fail(id, ErrorCode::MissingMain, None);
        }

        let undefined: Vec<_> = self
            .cx
            .idents
            .iter()
            .filter(|(_, info)| !info.is_builtin())
            .filter_map(|(_, info)| {
                let function = info.as_function()?;
                if function.called && !function.defined {
                    Some((info.symbol, info.node?))
                } else {
                    None
                }
            })
            .collect();

        let mut failed = false;
        for (symbol, header) in undefined {
            let name = self.text(symbol);
            self.report(header, ErrorCode::FunctionNotDefined, Some(name));
            failed = true;
        }

        if let Some((function, site)) = self.cx.calls.recursion() {
            let name = self.text(self.cx.idents.get(function).symbol);
            self.report(site, ErrorCode::Recursion, Some(name));
            failed = true;
        }

        if failed {
            Err(Fault::Reported)
        } else {
            Ok(())
        }
    }

    /// Check that child `index` of `id` is a boolean condition
    pub(super) fn verify_condition(&mut self, id: NodeId, index: usize) -> VResult<()> {
        let condition = self.child(id, index)?;
        let ty = self.checked_type(condition)?;

        if !ty.is(BasicType::Bool) {
            let context = self.describe(&ty);
            return self.fail(condition, ErrorCode::ConditionNotBool, Some(context));
        }

        Ok(())
    }

    pub(super) fn verify_return(&mut self, id: NodeId, children_failed: bool) -> VResult<()> {
        if children_failed {
            return Err(Fault::Reported);
        }

        let expected = match self
            .enclosing_function(id)
            .and_then(|f| self.cx.idents.get(f).as_function())
        {
            Some(function) => function.signature.return_type.clone(),
            // The header failed and was reported
            None => return Ok(()),
        };

        match self.tree.child(id, 0) {
            None if !expected.is_void() => {
                let context = self.describe(&expected);
                self.fail(id, ErrorCode::MissingReturnValue, Some(context))
            }
            None => Ok(()),
            Some(value) => {
                let ty = self.type_of(value)?;

                if ty != expected {
                    let context = format!(
                        "expected {}, found {}",
                        self.describe(&expected),
                        self.describe(&ty)
                    );
                    return self.fail(value, ErrorCode::ReturnTypeMismatch, Some(context));
                }

                Ok(())
            }
        }
    }

    /// `break` and `continue` need an enclosing loop in the same function
    pub(super) fn verify_jump(&mut self, id: NodeId, code: ErrorCode) -> VResult<()> {
        let target = self
            .tree
            .find_ancestor(id, |k| k.is_loop() || *k == NodeKind::FunctionDefinition);

        match target.map(|t| self.tree.kind(t).is_loop()) {
            Some(true) => Ok(()),
            _ => self.fail(id, code, None),
        }
    }

    pub(super) fn verify_discard(&mut self, id: NodeId) -> VResult<()> {
        if self.cx.stage() != ShaderStage::Fragment {
            return self.fail(id, ErrorCode::DiscardOutsideFragment, None);
        }

        Ok(())
    }

    fn invalid_loop<T>(&mut self, id: NodeId, message: &str) -> VResult<T> {
        self.fail(id, ErrorCode::InvalidLoop, Some(message.to_owned()))
    }

    /// Return true if `id` reads the variable `index` directly
    fn is_index(&self, id: NodeId, index: InfoId) -> bool {
        matches!(self.tree.kind(id), NodeKind::VariableIdentifier(_))
            && self.tree.node(id).ident() == Some(index)
    }

    /// Known value of a constant expression, or `None` if it is constant with an unknown value
    fn loop_bound(&mut self, id: NodeId, message: &str) -> VResult<Option<f64>> {
        match const_expression(self.tree, self.cx, id, false) {
            Some(constant) => Ok(constant.as_f64()),
            None => self.invalid_loop(id, message),
        }
    }

    /// Loop index declared by the init statement, and its start value
    fn loop_index(&mut self, init: NodeId) -> VResult<(InfoId, Option<f64>)> {
        if !matches!(self.tree.kind(init), NodeKind::DeclarationList { .. }) {
            return self.invalid_loop(init, "the loop must declare its index");
        }

        let declarator = match self.tree.children(init) {
            [_, declarator] => *declarator,
            _ => return self.invalid_loop(init, "the loop must declare exactly one index"),
        };

        let index = self
            .tree
            .node(declarator)
            .ident()
            .ok_or_else(|| Fault::Internal(Error::internal("unregistered loop index")))?;

        let ty = self.type_of(declarator)?;
        if !ty.is(BasicType::Int) && !ty.is(BasicType::Float) {
            return self.invalid_loop(declarator, "the loop index must be an int or a float");
        }

        let initializer = self
            .tree
            .children(declarator)
            .iter()
            .copied()
            .find(|c| *self.tree.kind(*c) == NodeKind::Initializer);

        match initializer {
            Some(initializer) => {
                let start = self.loop_bound(initializer, "the loop index must start at a constant")?;
                Ok((index, start))
            }
            None => self.invalid_loop(declarator, "the loop index must be initialized"),
        }
    }

    /// Comparison operator and limit of the loop condition
    fn loop_condition(&mut self, condition: NodeId, index: InfoId) -> VResult<(BinaryOp, Option<f64>)> {
        let op = match self.tree.kind(condition) {
            NodeKind::Binary(op) if op.is_relational() || op.is_equality() => *op,
            _ => return self.invalid_loop(condition, "the condition must compare the loop index"),
        };

        let (left, right) = (self.child(condition, 0)?, self.child(condition, 1)?);
        if !self.is_index(left, index) {
            return self.invalid_loop(condition, "the condition must compare the loop index");
        }

        let limit = self.loop_bound(right, "the loop index must be compared to a constant")?;
        Ok((op, limit))
    }

    /// Step added to the index by the loop increment
    fn loop_step(&mut self, increment: NodeId, index: InfoId) -> VResult<Option<f64>> {
        match self.tree.kind(increment).clone() {
            NodeKind::Unary(op) if op.writes() => {
                let operand = self.child(increment, 0)?;
                if !self.is_index(operand, index) {
                    return self.invalid_loop(increment, "the increment must update the loop index");
                }

                Ok(Some(match op {
                    UnaryOp::PreInc | UnaryOp::PostInc => 1.0,
                    _ => -1.0,
                }))
            }
            NodeKind::Assign(op @ AssignOp::Add) | NodeKind::Assign(op @ AssignOp::Sub) => {
                let (target, value) = (self.child(increment, 0)?, self.child(increment, 1)?);
                if !self.is_index(target, index) {
                    return self.invalid_loop(increment, "the increment must update the loop index");
                }

                let step = self.loop_bound(value, "the loop index must change by a constant")?;
                Ok(step.map(|step| if op == AssignOp::Sub { -step } else { step }))
            }
            _ => self.invalid_loop(increment, "the increment must be ++, --, += or -="),
        }
    }

    /// Check a `for` loop against the restricted loop form and compute its trip count
    pub(super) fn verify_for(&mut self, id: NodeId, children_failed: bool) -> VResult<()> {
        let (has_condition, has_increment) = match self.tree.kind(id) {
            NodeKind::For {
                has_condition,
                has_increment,
            } => (*has_condition, *has_increment),
            _ => return Err(Fault::Internal(Error::internal("not a for loop"))),
        };

        let children = self.tree.children(id).to_vec();
        let header = &children[..children.len().saturating_sub(1)];
        if header.iter().any(|c| !self.tree.node(*c).is_verified()) {
            return Err(Fault::Reported);
        }

        if !has_condition {
            return self.invalid_loop(id, "the loop must have a condition");
        }

        if !has_increment {
            return self.invalid_loop(id, "the loop must have an increment");
        }

        let (index, start) = self.loop_index(children[0])?;

        let condition = children[1];
        if !self.tree.ty(condition).map(|t| t.is(BasicType::Bool)).unwrap_or(false) {
            return self.fail(condition, ErrorCode::ConditionNotBool, None);
        }
        let (op, limit) = self.loop_condition(condition, index)?;
        let step = self.loop_step(children[2], index)?;

        if children_failed {
            return Err(Fault::Reported);
        }

        if let (Some(start), Some(limit), Some(step)) = (start, limit, step) {
            if let Some(count) = trip_count(start, op, limit, step) {
                debug!("loop at {} runs {} times", self.tree.loc(id), count);
                self.tree.set_constant(id, ConstantValue::int(count));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trip_counts() {
        assert_eq!(trip_count(0.0, BinaryOp::Less, 4.0, 1.0), Some(4));
        assert_eq!(trip_count(0.0, BinaryOp::LessEqual, 4.0, 2.0), Some(3));
        assert_eq!(trip_count(10.0, BinaryOp::Greater, 0.0, -3.0), Some(4));
        assert_eq!(trip_count(0.0, BinaryOp::Greater, 1.0, 1.0), Some(0));
        assert_eq!(trip_count(0.0, BinaryOp::NotEqual, 1.0, 2.0), None);
    }
}
