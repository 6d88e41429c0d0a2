//! Function signatures and overload matching

use crate::types::{BasicType, ScalarKind, Type};
use crate::{Error, Result};

/// Direction of a function parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamQualifier {
    In,
    Out,
    InOut,
}

impl Default for ParamQualifier {
    fn default() -> Self {
        Self::In
    }
}

impl ParamQualifier {
    /// Return true if the argument is written by the callee
    pub fn writes(self) -> bool {
        !matches!(self, Self::In)
    }
}

/// A function parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub ty: Type,
    pub qualifier: ParamQualifier,
    pub is_const: bool,
}

impl Parameter {
    pub fn new(ty: Type) -> Self {
        Self {
            ty,
            qualifier: ParamQualifier::In,
            is_const: false,
        }
    }
}

/// How arguments are matched against a signature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureKind {
    /// Fixed parameter list, possibly using the gentype placeholder
    Normal,
    /// Two float vectors of equal size, returning a bool vector
    CompareFloatVector,
    /// Two int vectors of equal size, returning a bool vector
    CompareIntVector,
    /// Two bool vectors of equal size, returning a bool vector
    CompareBoolVector,
    /// One bool vector, returning a bool
    TestBoolVector,
}

/// Signature of a built-in or user function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSignature {
    pub kind: SignatureKind,
    pub params: Vec<Parameter>,
    pub return_type: Type,
}

impl FunctionSignature {
    /// Signature of a user function
    pub fn new(return_type: Type, params: Vec<Parameter>) -> Self {
        Self {
            kind: SignatureKind::Normal,
            params,
            return_type,
        }
    }

    /// Return true if both signatures take the same parameter types
    pub fn same_parameters(&self, other: &FunctionSignature) -> bool {
        self.params.len() == other.params.len()
            && self
                .params
                .iter()
                .zip(other.params.iter())
                .all(|(a, b)| a.ty == b.ty)
    }

    /// Return true if both signatures use the same parameter qualifiers
    pub fn same_qualifiers(&self, other: &FunctionSignature) -> bool {
        self.params.len() == other.params.len()
            && self
                .params
                .iter()
                .zip(other.params.iter())
                .all(|(a, b)| a.qualifier == b.qualifier && a.is_const == b.is_const)
    }

    /// Exact match of argument types, as used for user overloads
    pub fn matches_exactly(&self, args: &[Type]) -> bool {
        self.kind == SignatureKind::Normal
            && self.params.len() == args.len()
            && self.params.iter().zip(args.iter()).all(|(p, a)| &p.ty == a)
    }

    /// Match argument types against a built-in signature
    ///
    /// # Parameters
    ///
    /// * `args`: types of the already verified arguments
    ///
    /// # Returns
    ///
    /// The resolved return type, or `None` if the arguments do not match.
    ///
    /// # Errors
    ///
    /// Returns an internal error if the signature data is malformed, for example a generic
    /// return type that no parameter resolves.
    pub fn match_builtin(&self, args: &[Type]) -> Result<Option<Type>> {
        match self.kind {
            SignatureKind::Normal => self.match_normal(args),
            SignatureKind::CompareFloatVector => Ok(match_compare(args, ScalarKind::Float)),
            SignatureKind::CompareIntVector => Ok(match_compare(args, ScalarKind::Int)),
            SignatureKind::CompareBoolVector => Ok(match_compare(args, ScalarKind::Bool)),
            SignatureKind::TestBoolVector => Ok(match args {
                [Type::Basic(b)] if b.is_vector() && b.scalar_kind() == Some(ScalarKind::Bool) => {
                    Some(BasicType::Bool.into())
                }
                _ => None,
            }),
        }
    }

    fn match_normal(&self, args: &[Type]) -> Result<Option<Type>> {
        if args.len() != self.params.len() {
            return Ok(None);
        }

        let mut resolved: Option<BasicType> = None;

        for (param, arg) in self.params.iter().zip(args.iter()) {
            if param.ty.is(BasicType::GenType) {
                let arg = match arg.as_basic() {
                    Some(arg) if arg.is_gentype_member() => arg,
                    _ => return Ok(None),
                };

                match resolved {
                    None => resolved = Some(arg),
                    Some(gentype) if gentype == arg => {}
                    Some(_) => return Ok(None),
                }
            } else if &param.ty != arg {
                return Ok(None);
            }
        }

        if self.return_type.is(BasicType::GenType) {
            match resolved {
                Some(gentype) => Ok(Some(gentype.into())),
                None => Err(Error::internal(
                    "generic return type without a generic parameter",
                )),
            }
        } else if self
            .return_type
            .as_basic()
            .map(BasicType::is_pseudo)
            .unwrap_or(false)
        {
            Err(Error::internal("pseudo-type in a fixed signature"))
        } else {
            Ok(Some(self.return_type.clone()))
        }
    }
}

fn match_compare(args: &[Type], kind: ScalarKind) -> Option<Type> {
    match args {
        [Type::Basic(a), Type::Basic(b)]
            if a == b && a.is_vector() && a.scalar_kind() == Some(kind) =>
        {
            BasicType::vector(ScalarKind::Bool, a.size()).map(Type::Basic)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sig(ret: BasicType, params: &[BasicType]) -> FunctionSignature {
        FunctionSignature::new(
            ret.into(),
            params.iter().map(|p| Parameter::new((*p).into())).collect(),
        )
    }

    fn types(list: &[BasicType]) -> Vec<Type> {
        list.iter().map(|t| (*t).into()).collect()
    }

    #[test]
    fn gentype_resolves_consistently() {
        use BasicType::*;
        let clamp = sig(GenType, &[GenType, GenType, GenType]);

        for t in &[Float, Vec2, Vec3, Vec4] {
            assert_eq!(
                clamp.match_builtin(&types(&[*t, *t, *t])).unwrap(),
                Some((*t).into())
            );
        }

        assert_eq!(
            clamp.match_builtin(&types(&[Vec2, Vec3, Vec2])).unwrap(),
            None
        );
        assert_eq!(clamp.match_builtin(&types(&[Int, Int, Int])).unwrap(), None);
    }

    #[test]
    fn gentype_with_fixed_parameter() {
        use BasicType::*;
        let min = sig(GenType, &[GenType, Float]);

        assert_eq!(
            min.match_builtin(&types(&[Vec3, Float])).unwrap(),
            Some(Vec3.into())
        );
        assert_eq!(min.match_builtin(&types(&[Vec3, Vec3])).unwrap(), None);
        assert_eq!(min.match_builtin(&types(&[Vec3])).unwrap(), None);
    }

    #[test]
    fn fixed_return_type() {
        use BasicType::*;
        let dot = sig(Float, &[GenType, GenType]);
        assert_eq!(
            dot.match_builtin(&types(&[Vec4, Vec4])).unwrap(),
            Some(Float.into())
        );
    }

    #[test]
    fn unresolved_generic_return_is_internal() {
        use BasicType::*;
        let broken = sig(GenType, &[Float]);
        assert!(matches!(
            broken.match_builtin(&types(&[Float])),
            Err(Error::Internal(_))
        ));
    }

    #[test]
    fn compare_vectors() {
        use BasicType::*;
        let less = FunctionSignature {
            kind: SignatureKind::CompareFloatVector,
            params: Vec::new(),
            return_type: BVecType.into(),
        };

        assert_eq!(
            less.match_builtin(&types(&[Vec3, Vec3])).unwrap(),
            Some(BVec3.into())
        );
        assert_eq!(less.match_builtin(&types(&[Vec3, Vec2])).unwrap(), None);
        assert_eq!(less.match_builtin(&types(&[IVec3, IVec3])).unwrap(), None);
        assert_eq!(less.match_builtin(&types(&[Float, Float])).unwrap(), None);
    }

    #[test]
    fn test_bool_vector() {
        use BasicType::*;
        let any = FunctionSignature {
            kind: SignatureKind::TestBoolVector,
            params: Vec::new(),
            return_type: Bool.into(),
        };

        assert_eq!(
            any.match_builtin(&types(&[BVec4])).unwrap(),
            Some(Bool.into())
        );
        assert_eq!(any.match_builtin(&types(&[Vec4])).unwrap(), None);
        assert_eq!(any.match_builtin(&types(&[Bool])).unwrap(), None);
    }

    #[test]
    fn exact_match_never_converts() {
        use BasicType::*;
        let foo = sig(Float, &[Float]);
        assert!(foo.matches_exactly(&types(&[Float])));
        assert!(!foo.matches_exactly(&types(&[Int])));
    }
}
