//! Expression typing and constant folding

use itertools::Itertools;

use super::{const_expression, Verifier};
use crate::context::{EXT_FRAG_DEPTH, EXT_STANDARD_DERIVATIVES};
use crate::error::{Error, ErrorCode, Fault, VResult};
use crate::ident::{InfoId, Namespace, Storage};
use crate::known::{Applicability, Helper, KnownVariable};
use crate::options::ShaderStage;
use crate::symbols::SymbolIndex;
use crate::tree::{
    AssignOp, BinaryOp, ConstantData, ConstantValue, NodeId, NodeKind, Selection, UnaryOp,
};
use crate::types::{BasicType, Type};

const SWIZZLE_SETS: [&str; 3] = ["xyzw", "rgba", "stpq"];

/// Component indices of a swizzle on a vector of `size` components
fn parse_swizzle(text: &str, size: u32) -> Option<Vec<u8>> {
    if text.is_empty() || text.len() > 4 {
        return None;
    }

    SWIZZLE_SETS.iter().find_map(|set| {
        text.chars()
            .map(|c| {
                set.find(c)
                    .map(|i| i as u8)
                    .filter(|i| u32::from(*i) < size)
            })
            .collect::<Option<Vec<_>>>()
    })
}

/// Result type of a binary operator, `None` if the operands are invalid
pub(crate) fn binary_result(op: BinaryOp, left: &Type, right: &Type) -> Option<Type> {
    if op.is_equality() {
        return if left == right
            && !left.is_void()
            && !left.contains_array()
            && !left.contains_sampler()
        {
            Some(BasicType::Bool.into())
        } else {
            None
        };
    }

    let (l, r) = (left.as_basic()?, right.as_basic()?);

    if op.is_logical() {
        return if l == BasicType::Bool && r == BasicType::Bool {
            Some(BasicType::Bool.into())
        } else {
            None
        };
    }

    if !l.is_numeric() || l.scalar_kind() != r.scalar_kind() {
        return None;
    }

    if op.is_relational() {
        return if l == r && l.is_scalar() {
            Some(BasicType::Bool.into())
        } else {
            None
        };
    }

    let result = if l == r {
        l
    } else if l.is_scalar() {
        r
    } else if r.is_scalar() {
        l
    } else if op == BinaryOp::Mul && l.is_vector() && r.is_matrix() && l.size() == r.size() {
        l
    } else if op == BinaryOp::Mul && l.is_matrix() && r.is_vector() && l.size() == r.size() {
        r
    } else {
        return None;
    };

    Some(result.into())
}

/// Fold a binary operator applied to two scalar constants with known values
fn fold_binary(op: BinaryOp, result: &Type, left: &ConstantValue, right: &ConstantValue) -> ConstantValue {
    use BinaryOp::*;

    let unknown = || ConstantValue::typed(result.clone());

    let (lk, rk) = match (left.scalar_type(), right.scalar_type()) {
        (Some(l), Some(r)) => (l, r),
        _ => return unknown(),
    };

    match (left.data, right.data) {
        (ConstantData::Int(a), ConstantData::Int(b)) if lk == BasicType::Int && rk == BasicType::Int => {
            // int is 32 bits wide and wraps on overflow
            let (a, b) = (a as i32, b as i32);
            let int = |value: i32| ConstantValue::int(i64::from(value));

            match op {
                Add => int(a.wrapping_add(b)),
                Sub => int(a.wrapping_sub(b)),
                Mul => int(a.wrapping_mul(b)),
                Div if b != 0 => int(a.wrapping_div(b)),
                Div => unknown(),
                Less => ConstantValue::boolean(a < b),
                Greater => ConstantValue::boolean(a > b),
                LessEqual => ConstantValue::boolean(a <= b),
                GreaterEqual => ConstantValue::boolean(a >= b),
                Equal => ConstantValue::boolean(a == b),
                NotEqual => ConstantValue::boolean(a != b),
                And | Xor | Or => unknown(),
            }
        }
        (ConstantData::Int(a), ConstantData::Int(b)) if lk == BasicType::Bool => {
            let (a, b) = (a != 0, b != 0);
            match op {
                And => ConstantValue::boolean(a && b),
                Xor => ConstantValue::boolean(a != b),
                Or => ConstantValue::boolean(a || b),
                Equal => ConstantValue::boolean(a == b),
                NotEqual => ConstantValue::boolean(a != b),
                _ => unknown(),
            }
        }
        _ => {
            let (a, b) = match (left.as_f64(), right.as_f64()) {
                (Some(a), Some(b)) => (a, b),
                _ => return unknown(),
            };

            match op {
                Add => ConstantValue::float(a + b),
                Sub => ConstantValue::float(a - b),
                Mul => ConstantValue::float(a * b),
                Div if b != 0.0 => ConstantValue::float(a / b),
                Less => ConstantValue::boolean(a < b),
                Greater => ConstantValue::boolean(a > b),
                LessEqual => ConstantValue::boolean(a <= b),
                GreaterEqual => ConstantValue::boolean(a >= b),
                Equal => ConstantValue::boolean(a == b),
                NotEqual => ConstantValue::boolean(a != b),
                _ => unknown(),
            }
        }
    }
}

fn fold_unary(op: UnaryOp, ty: &Type, operand: &ConstantValue) -> ConstantValue {
    if !operand.is_constant() {
        return ConstantValue::none();
    }

    match (op, operand.scalar_type(), operand.data) {
        (UnaryOp::Plus, Some(_), _) => operand.clone(),
        (UnaryOp::Minus, Some(BasicType::Int), ConstantData::Int(v)) => {
            ConstantValue::int(i64::from((v as i32).wrapping_neg()))
        }
        (UnaryOp::Minus, Some(BasicType::Float), ConstantData::Double(v)) => {
            ConstantValue::float(-v)
        }
        (UnaryOp::Not, Some(BasicType::Bool), ConstantData::Int(v)) => {
            ConstantValue::boolean(v == 0)
        }
        _ => ConstantValue::typed(ty.clone()),
    }
}

impl Verifier<'_> {
    pub(super) fn verify_expression(&mut self, id: NodeId, kind: &NodeKind) -> VResult<()> {
        use NodeKind::*;

        match kind {
            IntLiteral(value) => self.set_value(id, ConstantValue::int(*value)),
            FloatLiteral(value) => self.set_value(id, ConstantValue::float(*value)),
            BoolLiteral(value) => self.set_value(id, ConstantValue::boolean(*value)),
            VariableIdentifier(symbol) => self.verify_variable(id, *symbol),
            FunctionCall(symbol) => self.verify_call(id, *symbol),
            ConstructorCall(target) => self.verify_constructor(id, *target),
            StructConstructor(symbol) => self.verify_struct_constructor(id, *symbol),
            Unary(op) => self.verify_unary(id, *op),
            Binary(op) => self.verify_binary(id, *op),
            Assign(op) => self.verify_assign(id, *op),
            Ternary => self.verify_ternary(id),
            Index => self.verify_index(id),
            FieldSelect { field, .. } => self.verify_field_select(id, *field),
            Comma => {
                let right = self.child(id, 1)?;
                let ty = self.type_of(right)?;
                self.tree.set_ty(id, ty);
                Ok(())
            }
            other => Err(Fault::Internal(Error::internal(format!(
                "{:?} is not an expression",
                other
            )))),
        }
    }

    fn set_value(&mut self, id: NodeId, constant: ConstantValue) -> VResult<()> {
        if let Some(ty) = &constant.ty {
            self.tree.set_ty(id, ty.clone());
        }

        self.tree.set_constant(id, constant);
        Ok(())
    }

    fn all_constant(&self, nodes: &[NodeId]) -> bool {
        nodes
            .iter()
            .all(|node| self.tree.node(*node).constant().is_constant())
    }

    fn verify_variable(&mut self, id: NodeId, symbol: SymbolIndex) -> VResult<()> {
        let found = self.lookup(id, Namespace::Value, symbol);

        let info = match found[..] {
            [] => {
                let name = self.text(symbol);
                return self.fail(id, ErrorCode::UndeclaredIdentifier, Some(name));
            }
            [info] => info,
            _ => {
                return Err(Fault::Internal(Error::internal(format!(
                    "{} declarations of {} in one scope",
                    found.len(),
                    self.text(symbol)
                ))))
            }
        };

        let (ty, constant, special) = match self.cx.idents.get(info).as_variable() {
            Some(variable) => (
                variable.ty.clone(),
                variable.constant.clone(),
                variable.special,
            ),
            None => {
                let name = self.text(symbol);
                return self.fail(id, ErrorCode::InvalidIdentifierUsage, Some(name));
            }
        };

        if special == Some(KnownVariable::FragDepthExt) && !self.cx.frag_depth() {
            let context = format!("{} requires {}", self.text(symbol), EXT_FRAG_DEPTH);
            return self.fail(id, ErrorCode::ExtensionNotEnabled, Some(context));
        }

        if let Some(variable) = self.cx.idents.get_mut(info).as_variable_mut() {
            variable.used = true;
        }

        if let Some(function) = self.enclosing_function(id) {
            self.cx.calls.add_reference(function, info);
        }

        self.tree.set_ty(id, ty);
        self.tree.set_constant(id, constant.unwrap_or_default());
        self.tree.set_ident(id, info);
        Ok(())
    }

    /// Resolve the overload called at `id` among the visible candidates
    fn resolve_overload(
        &self,
        candidates: &[InfoId],
        args: &[Type],
    ) -> VResult<Option<(InfoId, Type)>> {
        for candidate in candidates {
            let function = match self.cx.idents.get(*candidate).as_function() {
                Some(function) => function,
                None => continue,
            };

            let result = if function.known.is_some() {
                function.signature.match_builtin(args)?
            } else if function.signature.matches_exactly(args) {
                Some(function.signature.return_type.clone())
            } else {
                None
            };

            if let Some(return_type) = result {
                debug!(
                    "call to {} resolved to {}",
                    self.cx.text(self.cx.idents.get(*candidate).symbol),
                    self.cx.idents.get(*candidate).name()
                );
                return Ok(Some((*candidate, return_type)));
            }
        }

        Ok(None)
    }

    fn verify_call(&mut self, id: NodeId, symbol: SymbolIndex) -> VResult<()> {
        let args = self.tree.children(id).to_vec();
        let arg_types = args
            .iter()
            .map(|arg| self.type_of(*arg))
            .collect::<VResult<Vec<_>>>()?;

        let candidates = self.lookup(id, Namespace::Function, symbol);
        if candidates.is_empty() {
            let code = if self.lookup(id, Namespace::Value, symbol).is_empty() {
                ErrorCode::UndeclaredIdentifier
            } else {
                ErrorCode::InvalidIdentifierUsage
            };

            let name = self.text(symbol);
            return self.fail(id, code, Some(name));
        }

        let (callee, return_type) = match self.resolve_overload(&candidates, &arg_types)? {
            Some(resolved) => resolved,
            None => {
                // A single user overload of the right arity means the argument types are wrong
                let same_arity = candidates
                    .iter()
                    .filter_map(|c| self.cx.idents.get(*c).as_function())
                    .filter(|f| f.known.is_none() && f.signature.params.len() == args.len())
                    .count();

                let code = if same_arity == 1 {
                    ErrorCode::TypeMismatch
                } else {
                    ErrorCode::NoMatchingOverload
                };

                let context = format!(
                    "{}({})",
                    self.text(symbol),
                    arg_types.iter().map(|t| self.describe(t)).join(", ")
                );
                return self.fail(id, code, Some(context));
            }
        };

        let (known, params) = match self.cx.idents.get(callee).as_function() {
            Some(function) => (function.known, function.signature.params.clone()),
            None => return Err(Fault::Internal(Error::internal("callee is not a function"))),
        };

        if let Some(known) = known {
            if known.applicability.contains(Applicability::DERIVATIVES)
                && !self.cx.standard_derivatives()
            {
                let context = format!("{} requires {}", self.text(symbol), EXT_STANDARD_DERIVATIVES);
                return self.fail(id, ErrorCode::ExtensionNotEnabled, Some(context));
            }
        }

        for (arg, param) in args.iter().zip(params.iter()) {
            if param.qualifier.writes() {
                let variable = self.check_lvalue(*arg)?;
                self.mark_written(*arg, variable)?;
            }
        }

        let constant = match known {
            None => {
                if let Some(caller) = self.enclosing_function(id) {
                    self.cx.calls.add_call(caller, callee, id);
                }

                if let Some(function) = self.cx.idents.get_mut(callee).as_function_mut() {
                    function.called = true;
                }

                ConstantValue::none()
            }
            Some(known) => {
                let lookup = known.helper().map(Helper::is_texture_lookup).unwrap_or(false);

                if !lookup && !known.uses_gradients() && self.all_constant(&args) {
                    ConstantValue::typed(return_type.clone())
                } else {
                    ConstantValue::none()
                }
            }
        };

        self.tree.set_ty(id, return_type);
        self.tree.set_constant(id, constant);
        self.tree.set_ident(id, callee);
        Ok(())
    }

    fn verify_constructor(&mut self, id: NodeId, target: BasicType) -> VResult<()> {
        let args = self.tree.children(id).to_vec();
        let name = target.glsl_name();

        if target.scalar_kind().is_none() {
            return self.fail(id, ErrorCode::InvalidConstructor, Some(name.to_owned()));
        }

        if args.is_empty() {
            let context = format!("{} requires arguments", name);
            return self.fail(id, ErrorCode::InvalidConstructor, Some(context));
        }

        let mut arg_types = Vec::with_capacity(args.len());
        for arg in &args {
            let ty = self.type_of(*arg)?;

            match ty.as_basic() {
                Some(basic) if basic.scalar_kind().is_some() => arg_types.push(basic),
                _ => {
                    let context = format!("{} argument to {}", self.describe(&ty), name);
                    return self.fail(*arg, ErrorCode::InvalidConstructor, Some(context));
                }
            }
        }

        if let Some(problem) = constructor_problem(target, &arg_types) {
            let context = format!("{}: {}", name, problem);
            return self.fail(id, ErrorCode::InvalidConstructor, Some(context));
        }

        let constant = if !self.all_constant(&args) {
            ConstantValue::none()
        } else if target.is_scalar() && arg_types[0].is_scalar() {
            self.tree.node(args[0]).constant().convert(target)
        } else {
            ConstantValue::typed(target.into())
        };

        self.tree.set_ty(id, target.into());
        self.tree.set_constant(id, constant);
        Ok(())
    }

    fn verify_struct_constructor(&mut self, id: NodeId, symbol: SymbolIndex) -> VResult<()> {
        let found = self.lookup(id, Namespace::Value, symbol);
        let resolved = match found[..] {
            [info] => self
                .cx
                .idents
                .get(info)
                .as_type_name()
                .cloned()
                .map(|ty| (info, ty)),
            _ => None,
        };

        let (info, ty) = match resolved {
            Some(resolved) => resolved,
            None => {
                let name = self.text(symbol);
                let code = if found.is_empty() {
                    ErrorCode::UndeclaredIdentifier
                } else {
                    ErrorCode::InvalidIdentifierUsage
                };
                return self.fail(id, code, Some(name));
            }
        };

        let fields = match ty.as_struct() {
            Some(s) => s.fields().iter().map(|f| f.ty.clone()).collect::<Vec<_>>(),
            None => return Err(Fault::Internal(Error::internal("type name of a non-structure"))),
        };

        let args = self.tree.children(id).to_vec();
        let arg_types = args
            .iter()
            .map(|arg| self.type_of(*arg))
            .collect::<VResult<Vec<_>>>()?;

        if arg_types != fields {
            let context = format!(
                "{}({})",
                self.text(symbol),
                arg_types.iter().map(|t| self.describe(t)).join(", ")
            );
            return self.fail(id, ErrorCode::InvalidConstructor, Some(context));
        }

        let constant = if self.all_constant(&args) {
            ConstantValue::typed(ty.clone())
        } else {
            ConstantValue::none()
        };

        self.tree.set_ty(id, ty);
        self.tree.set_constant(id, constant);
        self.tree.set_ident(id, info);
        Ok(())
    }

    fn verify_unary(&mut self, id: NodeId, op: UnaryOp) -> VResult<()> {
        let operand = self.child(id, 0)?;
        let ty = self.type_of(operand)?;

        let valid = match op {
            UnaryOp::Not => ty.is(BasicType::Bool),
            _ => ty.as_basic().map(BasicType::is_numeric).unwrap_or(false),
        };

        if !valid {
            let context = format!("{}{}", op.symbol(), self.describe(&ty));
            return self.fail(id, ErrorCode::InvalidOperands, Some(context));
        }

        let constant = if op.writes() {
            let variable = self.check_lvalue(operand)?;
            self.mark_written(id, variable)?;
            ConstantValue::none()
        } else {
            fold_unary(op, &ty, self.tree.node(operand).constant())
        };

        self.tree.set_ty(id, ty);
        self.tree.set_constant(id, constant);
        Ok(())
    }

    fn verify_binary(&mut self, id: NodeId, op: BinaryOp) -> VResult<()> {
        let (left, right) = (self.child(id, 0)?, self.child(id, 1)?);
        let (lt, rt) = (self.type_of(left)?, self.type_of(right)?);

        let result = match binary_result(op, &lt, &rt) {
            Some(result) => result,
            None => {
                let context = format!(
                    "{} {} {}",
                    self.describe(&lt),
                    op.symbol(),
                    self.describe(&rt)
                );
                return self.fail(id, ErrorCode::InvalidOperands, Some(context));
            }
        };

        let (lc, rc) = (
            self.tree.node(left).constant(),
            self.tree.node(right).constant(),
        );
        let constant = if lc.is_constant() && rc.is_constant() {
            fold_binary(op, &result, lc, rc)
        } else {
            ConstantValue::none()
        };

        self.tree.set_ty(id, result);
        self.tree.set_constant(id, constant);
        Ok(())
    }

    fn verify_assign(&mut self, id: NodeId, op: AssignOp) -> VResult<()> {
        let (target, value) = (self.child(id, 0)?, self.child(id, 1)?);
        let (lt, rt) = (self.type_of(target)?, self.type_of(value)?);

        if lt.contains_array() || lt.contains_sampler() {
            let context = format!("cannot assign to {}", self.describe(&lt));
            return self.fail(id, ErrorCode::InvalidLValue, Some(context));
        }

        let variable = self.check_lvalue(target)?;

        let valid = match op.arithmetic() {
            None => lt == rt,
            Some(arithmetic) => binary_result(arithmetic, &lt, &rt).as_ref() == Some(&lt),
        };

        if !valid {
            let context = format!(
                "{} {} {}",
                self.describe(&lt),
                op.symbol(),
                self.describe(&rt)
            );
            return self.fail(id, ErrorCode::TypeMismatch, Some(context));
        }

        self.mark_written(id, variable)?;
        self.tree.set_ty(id, lt);
        Ok(())
    }

    fn verify_ternary(&mut self, id: NodeId) -> VResult<()> {
        let (condition, then, otherwise) =
            (self.child(id, 0)?, self.child(id, 1)?, self.child(id, 2)?);

        let ct = self.type_of(condition)?;
        if !ct.is(BasicType::Bool) {
            let context = self.describe(&ct);
            return self.fail(condition, ErrorCode::ConditionNotBool, Some(context));
        }

        let (tt, et) = (self.type_of(then)?, self.type_of(otherwise)?);
        if tt != et {
            let context = format!("{} : {}", self.describe(&tt), self.describe(&et));
            return self.fail(id, ErrorCode::TypeMismatch, Some(context));
        }

        if tt.is_array() {
            let context = format!("?: on {}", self.describe(&tt));
            return self.fail(id, ErrorCode::InvalidOperands, Some(context));
        }

        let constant = match self.tree.node(condition).constant().as_bool() {
            Some(true) if self.all_constant(&[then]) => self.tree.node(then).constant().clone(),
            Some(false) if self.all_constant(&[otherwise]) => {
                self.tree.node(otherwise).constant().clone()
            }
            _ if self.all_constant(&[condition, then, otherwise]) => {
                ConstantValue::typed(tt.clone())
            }
            _ => ConstantValue::none(),
        };

        self.tree.set_ty(id, tt);
        self.tree.set_constant(id, constant);
        Ok(())
    }

    /// Storage of the variable an indexing or selection chain starts from
    fn root_storage(&self, mut id: NodeId) -> Option<Storage> {
        loop {
            match self.tree.kind(id) {
                NodeKind::Index | NodeKind::FieldSelect { .. } => id = self.tree.child(id, 0)?,
                NodeKind::VariableIdentifier(_) => {
                    let info = self.tree.node(id).ident()?;
                    return self.cx.idents.get(info).as_variable().map(|v| v.storage);
                }
                _ => return None,
            }
        }
    }

    fn verify_index(&mut self, id: NodeId) -> VResult<()> {
        let (base, index) = (self.child(id, 0)?, self.child(id, 1)?);
        let (base_ty, index_ty) = (self.type_of(base)?, self.type_of(index)?);

        if !index_ty.is(BasicType::Int) {
            let context = format!("index of type {}", self.describe(&index_ty));
            return self.fail(index, ErrorCode::InvalidOperands, Some(context));
        }

        let (result, size) = match &base_ty {
            Type::Array { element, size } => ((**element).clone(), *size),
            Type::Basic(basic) => match basic.index_result() {
                Some(result) => (result.into(), basic.size()),
                None => {
                    let context = self.describe(&base_ty);
                    return self.fail(id, ErrorCode::InvalidIndexTarget, Some(context));
                }
            },
            Type::Struct(_) => {
                let context = self.describe(&base_ty);
                return self.fail(id, ErrorCode::InvalidIndexTarget, Some(context));
            }
        };

        match const_expression(self.tree, self.cx, index, true) {
            Some(constant) => {
                if let Some(value) = constant.as_int() {
                    if value < 0 || value >= i64::from(size) {
                        let context = format!("index {} of {}", value, self.describe(&base_ty));
                        return self.fail(index, ErrorCode::IndexOutOfRange, Some(context));
                    }
                }
            }
            None => {
                // Uniform arrays can be indexed dynamically in vertex shaders only
                let allowed = base_ty.is_array()
                    && self.cx.stage() == ShaderStage::Vertex
                    && self.root_storage(base) == Some(Storage::Uniform);

                if !allowed {
                    let context = self.describe(&base_ty);
                    return self.fail(index, ErrorCode::NonConstantIndex, Some(context));
                }
            }
        }

        let constant = if self.all_constant(&[base, index]) {
            ConstantValue::typed(result.clone())
        } else {
            ConstantValue::none()
        };

        self.tree.set_ty(id, result);
        self.tree.set_constant(id, constant);
        Ok(())
    }

    fn verify_field_select(&mut self, id: NodeId, field: SymbolIndex) -> VResult<()> {
        let base = self.child(id, 0)?;
        let base_ty = self.type_of(base)?;
        let text = self.text(field);

        let (selection, ty) = match &base_ty {
            Type::Struct(s) => match s.field(field) {
                Some((index, f)) => (Selection::Field(index), f.ty.clone()),
                None => {
                    let context = format!("{}.{}", self.describe(&base_ty), text);
                    return self.fail(id, ErrorCode::InvalidFieldSelection, Some(context));
                }
            },
            Type::Basic(basic) if basic.is_vector() => {
                let swizzled = parse_swizzle(&text, basic.size()).and_then(|components| {
                    let kind = basic.scalar_kind()?;
                    let ty = BasicType::vector(kind, components.len() as u32)?;
                    Some((Selection::Swizzle(components), Type::from(ty)))
                });

                match swizzled {
                    Some(swizzled) => swizzled,
                    None => {
                        let context = format!("{}.{}", self.describe(&base_ty), text);
                        return self.fail(id, ErrorCode::InvalidSwizzle, Some(context));
                    }
                }
            }
            _ => {
                let context = format!("{}.{}", self.describe(&base_ty), text);
                return self.fail(id, ErrorCode::InvalidFieldSelection, Some(context));
            }
        };

        let constant = if self.all_constant(&[base]) {
            ConstantValue::typed(ty.clone())
        } else {
            ConstantValue::none()
        };

        self.tree.node_mut(id).kind = NodeKind::FieldSelect {
            field,
            selection: Some(selection),
        };
        self.tree.set_ty(id, ty);
        self.tree.set_constant(id, constant);
        Ok(())
    }
}

/// Describe why `target` cannot be built from arguments of the given types
fn constructor_problem(target: BasicType, args: &[BasicType]) -> Option<&'static str> {
    if target.is_scalar() {
        return if args.len() == 1 {
            None
        } else {
            Some("scalar constructors take one argument")
        };
    }

    // Broadcast, diagonal matrix or matrix resize
    if args.len() == 1 && (args[0].is_scalar() || (target.is_matrix() && args[0].is_matrix())) {
        return None;
    }

    let needed = target.component_count();
    let mut provided = 0;

    for arg in args {
        if provided >= needed {
            return Some("too many arguments");
        }

        if arg.is_matrix() {
            if target.is_matrix() {
                return Some("matrices cannot be combined with other arguments");
            }

            if provided + arg.component_count() > needed {
                return Some("matrix argument is only partially used");
            }
        }

        provided += arg.component_count();
    }

    if provided < needed {
        Some("not enough components")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swizzles() {
        assert_eq!(parse_swizzle("xyz", 3), Some(vec![0, 1, 2]));
        assert_eq!(parse_swizzle("bgr", 4), Some(vec![2, 1, 0]));
        assert_eq!(parse_swizzle("z", 2), None);
        assert_eq!(parse_swizzle("xg", 4), None);
        assert_eq!(parse_swizzle("xxxxx", 4), None);
    }

    #[test]
    fn binary_result_types() {
        let vec3: Type = BasicType::Vec3.into();
        let mat3: Type = BasicType::Mat3.into();
        let float: Type = BasicType::Float.into();
        let int: Type = BasicType::Int.into();

        assert_eq!(binary_result(BinaryOp::Mul, &vec3, &mat3), Some(vec3.clone()));
        assert_eq!(binary_result(BinaryOp::Mul, &float, &vec3), Some(vec3.clone()));
        assert_eq!(binary_result(BinaryOp::Add, &int, &float), None);
        assert_eq!(
            binary_result(BinaryOp::Less, &float, &float),
            Some(BasicType::Bool.into())
        );
        assert_eq!(binary_result(BinaryOp::Less, &vec3, &vec3), None);
        assert_eq!(
            binary_result(BinaryOp::Equal, &vec3, &vec3),
            Some(BasicType::Bool.into())
        );
    }

    #[test]
    fn constructor_shapes() {
        use BasicType::*;

        assert_eq!(constructor_problem(Vec4, &[Vec3, Float]), None);
        assert_eq!(constructor_problem(Vec4, &[Float]), None);
        assert_eq!(constructor_problem(Vec3, &[Vec4]), None);
        assert_eq!(constructor_problem(Vec4, &[Mat2]), None);
        assert_eq!(constructor_problem(Mat3, &[Mat4]), None);
        assert!(constructor_problem(Vec4, &[Vec2, Vec2, Float]).is_some());
        assert!(constructor_problem(Vec4, &[Vec2]).is_some());
        assert!(constructor_problem(Vec3, &[Mat2]).is_some());
        assert!(constructor_problem(Float, &[Float, Float]).is_some());
    }

    #[test]
    fn folding() {
        let float: Type = BasicType::Float.into();
        let folded = fold_binary(
            BinaryOp::Add,
            &float,
            &ConstantValue::float(1.0),
            &ConstantValue::float(2.0),
        );
        assert_eq!(folded, ConstantValue::float(3.0));

        let int: Type = BasicType::Int.into();
        let by_zero = fold_binary(BinaryOp::Div, &int, &ConstantValue::int(1), &ConstantValue::int(0));
        assert!(by_zero.is_constant());
        assert!(!by_zero.has_value());

        assert_eq!(
            fold_unary(UnaryOp::Minus, &int, &ConstantValue::int(4)),
            ConstantValue::int(-4)
        );
    }

    #[test]
    fn integer_folding_wraps_at_32_bits() {
        let int: Type = BasicType::Int.into();
        let max = ConstantValue::int(i64::from(i32::MAX));
        let min = ConstantValue::int(i64::from(i32::MIN));

        assert_eq!(
            fold_binary(BinaryOp::Add, &int, &max, &ConstantValue::int(1)),
            min
        );
        assert_eq!(
            fold_binary(BinaryOp::Mul, &int, &max, &ConstantValue::int(2)),
            ConstantValue::int(-2)
        );
        assert_eq!(
            fold_binary(BinaryOp::Div, &int, &min, &ConstantValue::int(-1)),
            min
        );
        assert_eq!(fold_unary(UnaryOp::Minus, &int, &min), min);
    }
}
