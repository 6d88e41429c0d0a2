//! Expressions

use itertools::Itertools;

use super::{basic_name, Translator};
use crate::known::{Helper, Lowering};
use crate::tree::{AssignOp, BinaryOp, ConstantData, NodeId, NodeKind, Selection};
use crate::types::{BasicType, Type};
use crate::{Error, Result};

const COMPONENTS: &str = "xyzw";

/// HLSL literal for a float value
fn float_literal(value: f64) -> String {
    if value.is_nan() {
        return "(0.0 / 0.0)".to_owned();
    }

    if value.is_infinite() {
        return if value > 0.0 {
            "(1.0 / 0.0)".to_owned()
        } else {
            "(-1.0 / 0.0)".to_owned()
        };
    }

    let text = format!("{:?}", value);
    if value < 0.0 {
        format!("({})", text)
    } else {
        text
    }
}

fn int_literal(value: i64) -> String {
    if value == i64::from(i32::MIN) {
        // 2147483648 is not a valid int literal
        "(-2147483647 - 1)".to_owned()
    } else if value < 0 {
        format!("({})", value)
    } else {
        value.to_string()
    }
}

/// Swizzle selecting the first `count` components
fn leading_components(count: u32) -> &'static str {
    &COMPONENTS[..(count as usize).min(COMPONENTS.len())]
}

/// Return true if the expression needs no parentheses as an operand
fn is_primary(kind: &NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::IntLiteral(_)
            | NodeKind::FloatLiteral(_)
            | NodeKind::BoolLiteral(_)
            | NodeKind::VariableIdentifier(_)
            | NodeKind::FunctionCall(_)
            | NodeKind::ConstructorCall(_)
            | NodeKind::StructConstructor(_)
            | NodeKind::Index
            | NodeKind::FieldSelect { .. }
    )
}

impl Translator<'_> {
    /// Translate an expression
    pub(super) fn expr(&mut self, id: NodeId) -> Result<String> {
        self.expr_named(id, 0)
    }

    /// Translate an expression as an operand, parenthesized unless it is a primary expression
    pub(super) fn operand(&mut self, id: NodeId) -> Result<String> {
        self.operand_named(id, 0)
    }

    fn operand_named(&mut self, id: NodeId, name: usize) -> Result<String> {
        let text = self.expr_named(id, name)?;

        if is_primary(self.tree.kind(id)) || self.folded(id).is_some() {
            Ok(text)
        } else {
            Ok(format!("({})", text))
        }
    }

    /// Literal for an expression with a known scalar value
    fn folded(&self, id: NodeId) -> Option<String> {
        let constant = self.tree.node(id).constant();
        let basic = constant.scalar_type()?;

        match (constant.data, basic) {
            (ConstantData::Int(value), BasicType::Int) => Some(int_literal(value)),
            (ConstantData::Int(value), BasicType::Bool) => {
                Some(if value != 0 { "true" } else { "false" }.to_owned())
            }
            (ConstantData::Double(value), BasicType::Float) => Some(float_literal(value)),
            (ConstantData::Int(value), BasicType::Float) => Some(float_literal(value as f64)),
            _ => None,
        }
    }

    /// Translate an expression
    ///
    /// `name` selects the generated name of sampler variables, which stand for both a sampler
    /// state and a texture in the output.
    fn expr_named(&mut self, id: NodeId, name: usize) -> Result<String> {
        if let Some(literal) = self.folded(id) {
            return Ok(literal);
        }

        let children = self.tree.children(id).to_vec();

        match self.tree.kind(id).clone() {
            NodeKind::IntLiteral(value) => Ok(int_literal(value)),
            NodeKind::FloatLiteral(value) => Ok(float_literal(value)),
            NodeKind::BoolLiteral(value) => Ok(value.to_string()),
            NodeKind::VariableIdentifier(_) => {
                let info = self.ident(id)?;
                Ok(self.cx.idents().get(info).name_at(name).to_owned())
            }
            NodeKind::FunctionCall(_) => self.call(id, &children),
            NodeKind::ConstructorCall(target) => self.constructor(target, &children),
            NodeKind::StructConstructor(_) => {
                let struct_name = match self.type_of(id)? {
                    Type::Struct(s) => self.struct_name(s.id())?,
                    _ => return Err(Error::internal("structure constructor of a non-structure")),
                };
                let args = self.arguments(&children)?;
                Ok(format!("gl_ctor{}({})", struct_name, list(args)))
            }
            NodeKind::Unary(op) => {
                let operand = self.operand(children[0])?;
                Ok(if op.is_postfix() {
                    format!("{}{}", operand, op.symbol())
                } else {
                    format!("{}{}", op.symbol(), operand)
                })
            }
            NodeKind::Binary(op) => self.binary(op, children[0], children[1]),
            NodeKind::Assign(op) => self.assign(op, children[0], children[1]),
            NodeKind::Ternary => Ok(format!(
                "{} ? {} : {}",
                self.operand(children[0])?,
                self.operand(children[1])?,
                self.operand(children[2])?
            )),
            NodeKind::Index => Ok(format!(
                "{}[{}]",
                self.operand_named(children[0], name)?,
                self.expr(children[1])?
            )),
            NodeKind::FieldSelect { selection, .. } => {
                let base = self.operand(children[0])?;
                match selection {
                    Some(Selection::Field(index)) => {
                        let field = match self.type_of(children[0])? {
                            Type::Struct(s) => s.fields().get(index).map(|f| f.name),
                            _ => None,
                        }
                        .ok_or_else(|| Error::internal("field selection out of its structure"))?;

                        Ok(format!("{}.{}", base, self.field_name(field)))
                    }
                    Some(Selection::Swizzle(components)) => {
                        let swizzle: String = components
                            .iter()
                            .filter_map(|c| COMPONENTS.chars().nth(usize::from(*c)))
                            .collect();
                        Ok(format!("{}.{}", base, swizzle))
                    }
                    None => Err(Error::internal("unresolved field selection")),
                }
            }
            NodeKind::Comma => Ok(format!(
                "{}, {}",
                self.operand(children[0])?,
                self.operand(children[1])?
            )),
            other => Err(Error::internal(format!("{:?} is not an expression", other))),
        }
    }

    /// Translate call arguments, passing samplers as their sampler state and texture
    pub(super) fn arguments(&mut self, args: &[NodeId]) -> Result<Vec<String>> {
        let mut result = Vec::with_capacity(args.len());

        for arg in args {
            if self.type_of(*arg)?.is_sampler_or_array() {
                result.push(self.expr_named(*arg, 0)?);
                result.push(self.expr_named(*arg, 1)?);
            } else {
                result.push(self.expr(*arg)?);
            }
        }

        Ok(result)
    }

    fn call(&mut self, id: NodeId, args: &[NodeId]) -> Result<String> {
        let cx = self.cx;
        let info = cx.idents().get(self.ident(id)?);
        let function = info
            .as_function()
            .ok_or_else(|| Error::internal("call to a non-function"))?;

        let name = match function.known.map(|known| known.lowering) {
            Some(Lowering::Rename(name)) => name,
            Some(Lowering::Helper(helper)) => {
                self.helpers.insert(helper);
                helper.name()
            }
            None => info.name(),
        };

        let args = self.arguments(args)?;
        Ok(format!("{}({})", name, list(args)))
    }

    fn constructor(&mut self, target: BasicType, args: &[NodeId]) -> Result<String> {
        let name = basic_name(target)?;
        let types: Vec<BasicType> = args
            .iter()
            .map(|arg| self.type_of(*arg)?.basic_type())
            .collect::<Result<_>>()?;

        if target.is_scalar() {
            let arg = self.operand(args[0])?;
            let first = if types[0].is_matrix() {
                format!("{}[0][0]", arg)
            } else if types[0].is_vector() {
                format!("{}.x", arg)
            } else {
                arg
            };

            return Ok(format!("(({}){})", name, first));
        }

        if let [source] = types[..] {
            if source.is_scalar() && target.is_matrix() {
                let helper = Helper::MatrixDiagonal(target.size() as u8);
                self.helpers.insert(helper);
                return Ok(format!("{}({})", helper.name(), self.expr(args[0])?));
            }

            if source.is_scalar() {
                return Ok(format!("(({}){})", name, self.operand(args[0])?));
            }

            if source.is_matrix() && target.is_matrix() {
                if source == target {
                    return self.expr(args[0]);
                }

                let helper = Helper::MatrixResize(source.size() as u8, target.size() as u8);
                self.helpers.insert(helper);
                return Ok(format!("{}({})", helper.name(), self.expr(args[0])?));
            }
        }

        // Component-wise construction, truncating the last argument if it is not fully used
        let mut remaining = target.component_count();
        let mut parts = Vec::with_capacity(args.len());

        for (arg, ty) in args.iter().zip(types.iter()) {
            if remaining == 0 {
                break;
            }

            let count = ty.component_count();
            if count > remaining {
                parts.push(format!(
                    "{}.{}",
                    self.operand(*arg)?,
                    leading_components(remaining)
                ));
                remaining = 0;
            } else {
                parts.push(self.expr(*arg)?);
                remaining -= count;
            }
        }

        Ok(format!("{}({})", name, list(parts)))
    }

    /// Cast a scalar operand to the aggregate type it is combined with
    fn promoted(&mut self, id: NodeId, other: &Type) -> Result<String> {
        let ty = self.type_of(id)?;

        match (ty.as_basic(), other.as_basic()) {
            (Some(scalar), Some(aggregate)) if scalar.is_scalar() && !aggregate.is_scalar() => {
                Ok(format!("(({}){})", basic_name(aggregate)?, self.operand(id)?))
            }
            _ => self.operand(id),
        }
    }

    fn binary(&mut self, op: BinaryOp, left: NodeId, right: NodeId) -> Result<String> {
        let lt = self.type_of(left)?;
        let rt = self.type_of(right)?;

        let is_matrix = |ty: &Type| ty.as_basic().map(BasicType::is_matrix).unwrap_or(false);
        let is_scalar = |ty: &Type| ty.as_basic().map(BasicType::is_scalar).unwrap_or(false);

        // Matrices are stored transposed: M * v becomes mul(v, M)
        if op == BinaryOp::Mul
            && (is_matrix(lt) || is_matrix(rt))
            && !is_scalar(lt)
            && !is_scalar(rt)
        {
            return Ok(format!("mul({}, {})", self.expr(right)?, self.expr(left)?));
        }

        if op.is_equality() {
            if let Type::Struct(s) = lt {
                let name = self.struct_name(s.id())?;
                let call = format!(
                    "gl_equal{}({}, {})",
                    name,
                    self.expr(left)?,
                    self.expr(right)?
                );
                return Ok(if op == BinaryOp::Equal {
                    call
                } else {
                    format!("!{}", call)
                });
            }

            if !is_scalar(lt) {
                let (reduce, symbol) = if op == BinaryOp::Equal {
                    ("all", "==")
                } else {
                    ("any", "!=")
                };

                return Ok(format!(
                    "{}({} {} {})",
                    reduce,
                    self.operand(left)?,
                    symbol,
                    self.operand(right)?
                ));
            }
        }

        if op == BinaryOp::Xor {
            return Ok(format!("{} != {}", self.operand(left)?, self.operand(right)?));
        }

        let (l, r) = if op.is_arithmetic() {
            (self.promoted(left, rt)?, self.promoted(right, lt)?)
        } else {
            (self.operand(left)?, self.operand(right)?)
        };

        Ok(format!("{} {} {}", l, op.symbol(), r))
    }

    fn assign(&mut self, op: AssignOp, target: NodeId, value: NodeId) -> Result<String> {
        let tt = self.type_of(target)?;
        let vt = self.type_of(value)?;

        let is_matrix = vt.as_basic().map(BasicType::is_matrix).unwrap_or(false);
        let target_scalar = tt.as_basic().map(BasicType::is_scalar).unwrap_or(false);

        if op == AssignOp::Mul && is_matrix && !target_scalar {
            let t = self.operand(target)?;
            return Ok(format!("{} = mul({}, {})", t, self.expr(value)?, t));
        }

        let value = match (op.arithmetic(), self.tree.kind(value)) {
            (_, NodeKind::Comma) => self.operand(value)?,
            (Some(_), _) => self.promoted(value, tt)?,
            (None, _) => self.expr(value)?,
        };

        Ok(format!("{} {} {}", self.operand(target)?, op.symbol(), value))
    }
}

/// Declarations of the sampler state and the texture standing for a sampler
pub(super) fn sampler_pair(ty: &Type, names: (&str, &str)) -> Result<(String, String)> {
    let (texture, size) = match ty {
        Type::Basic(basic) => (basic_name(*basic)?, None),
        Type::Array { element, size } => (
            basic_name(element.basic_type()?)?,
            Some(format!("[{}]", size)),
        ),
        Type::Struct(_) => return Err(Error::internal("structure used as a sampler")),
    };

    let size = size.unwrap_or_default();
    Ok((
        format!("SamplerState {}{}", names.0, size),
        format!("{} {}{}", texture, names.1, size),
    ))
}

/// Join translated parts as a comma-separated list
pub(super) fn list<I: IntoIterator<Item = String>>(parts: I) -> String {
    parts.into_iter().join(", ")
}
