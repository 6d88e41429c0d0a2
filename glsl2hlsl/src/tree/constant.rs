//! Compile-time constant values

use crate::types::{BasicType, Type};

/// Value of a constant, when it can be computed
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConstantData {
    Unset,
    Int(i64),
    Double(f64),
}

impl Default for ConstantData {
    fn default() -> Self {
        Self::Unset
    }
}

/// Constant-expression facts about a node
///
/// The type tag is independent of the value: a tagged value with [ConstantData::Unset] data is
/// a constant expression whose value is not computed (vector constructors, built-in calls).
/// No tag means the expression is not constant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstantValue {
    pub data: ConstantData,
    pub ty: Option<Type>,
}

impl ConstantValue {
    /// Not a constant expression
    pub fn none() -> Self {
        Self::default()
    }

    /// Constant expression of a known type, value not computed
    pub fn typed(ty: Type) -> Self {
        Self {
            data: ConstantData::Unset,
            ty: Some(ty),
        }
    }

    pub fn int(value: i64) -> Self {
        Self {
            data: ConstantData::Int(value),
            ty: Some(BasicType::Int.into()),
        }
    }

    pub fn float(value: f64) -> Self {
        Self {
            data: ConstantData::Double(value),
            ty: Some(BasicType::Float.into()),
        }
    }

    pub fn boolean(value: bool) -> Self {
        Self {
            data: ConstantData::Int(value as i64),
            ty: Some(BasicType::Bool.into()),
        }
    }

    /// Return true for constant expressions, whether or not the value is known
    pub fn is_constant(&self) -> bool {
        self.ty.is_some()
    }

    /// Return true if the value is known
    pub fn has_value(&self) -> bool {
        self.ty.is_some() && self.data != ConstantData::Unset
    }

    /// Scalar basic type of a constant with a known value
    pub fn scalar_type(&self) -> Option<BasicType> {
        match (&self.data, &self.ty) {
            (ConstantData::Unset, _) => None,
            (_, Some(ty)) => ty.as_basic(),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match (self.data, self.scalar_type()) {
            (ConstantData::Int(v), Some(BasicType::Int)) => Some(v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self.data {
            ConstantData::Int(v) => Some(v as f64),
            ConstantData::Double(v) => Some(v),
            ConstantData::Unset => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match (self.data, self.scalar_type()) {
            (ConstantData::Int(v), Some(BasicType::Bool)) => Some(v != 0),
            _ => None,
        }
    }

    /// Convert a known scalar value to another scalar type, as a constructor would
    pub fn convert(&self, target: BasicType) -> Self {
        let value = match self.as_f64() {
            Some(value) if self.scalar_type().is_some() => value,
            _ => return Self::typed(target.into()),
        };

        match target {
            BasicType::Float => Self::float(value),
            BasicType::Int => Self::int(i64::from(value.trunc() as i32)),
            BasicType::Bool => Self::boolean(value != 0.0),
            other => Self::typed(other.into()),
        }
    }
}
