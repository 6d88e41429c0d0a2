//! Constant-expression classification

use crate::context::Context;
use crate::known::Helper;
use crate::tree::{ConstantValue, NodeId, NodeKind, Tree};

/// Classify a verified expression as a constant expression
///
/// Values folded during verification are returned as they are. With `include_loop_index`, the
/// index of a `for` loop also counts as a constant of unknown value, and so does any operator,
/// constructor or built-in call applied only to such constants. This is the notion of
/// constant-index-expression used for array indexing.
///
/// # Parameters
///
/// * `tree`: verified tree
/// * `cx`: context the tree was verified with
/// * `id`: expression node
/// * `include_loop_index`: count loop indices as constants
///
/// # Returns
///
/// The constant facts of the expression, `None` if it is not constant.
pub fn const_expression(
    tree: &Tree,
    cx: &Context,
    id: NodeId,
    include_loop_index: bool,
) -> Option<ConstantValue> {
    let constant = tree.node(id).constant();
    if constant.is_constant() {
        return Some(constant.clone());
    }

    if !include_loop_index {
        return None;
    }

    let ty = tree.ty(id)?;
    let operands_constant = || {
        tree.children(id)
            .iter()
            .all(|child| const_expression(tree, cx, *child, true).is_some())
    };

    let constant = match tree.kind(id) {
        NodeKind::VariableIdentifier(_) => {
            let info = cx.idents().get(tree.node(id).ident()?);
            info.as_variable()?.loop_index
        }
        NodeKind::Unary(op) => !op.writes() && operands_constant(),
        NodeKind::Binary(_)
        | NodeKind::Ternary
        | NodeKind::Index
        | NodeKind::FieldSelect { .. }
        | NodeKind::ConstructorCall(_)
        | NodeKind::StructConstructor(_) => operands_constant(),
        NodeKind::FunctionCall(_) => {
            let info = cx.idents().get(tree.node(id).ident()?);
            let known = info.as_function()?.known?;
            let lookup = known.helper().map(Helper::is_texture_lookup).unwrap_or(false);

            !lookup && !known.uses_gradients() && operands_constant()
        }
        _ => false,
    };

    if constant {
        Some(ConstantValue::typed(ty.clone()))
    } else {
        None
    }
}
