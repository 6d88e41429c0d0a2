//! Built-in function table

use super::KnownSymbol;
use crate::options::ShaderStage;
use crate::signature::{FunctionSignature, Parameter, SignatureKind};
use crate::types::{BasicType, ScalarKind};

/// Stage and extension requirements of a built-in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Applicability(u8);

impl Applicability {
    pub const ANY: Self = Self(0);
    pub const FRAGMENT_ONLY: Self = Self(1);
    pub const VERTEX_ONLY: Self = Self(2);
    /// Requires `GL_OES_standard_derivatives`
    pub const DERIVATIVES: Self = Self(4);
    /// Requires `GL_EXT_frag_depth`
    pub const FRAG_DEPTH: Self = Self(8);

    pub const fn with(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Return true if the built-in exists in the given stage
    pub fn allows_stage(self, stage: ShaderStage) -> bool {
        match stage {
            ShaderStage::Vertex => !self.contains(Self::FRAGMENT_ONLY),
            ShaderStage::Fragment => !self.contains(Self::VERTEX_ONLY),
        }
    }
}

/// Relational function applied component-wise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CompareOp {
    LessThan,
    LessThanEqual,
    GreaterThan,
    GreaterThanEqual,
    Equal,
    NotEqual,
}

/// Helper functions emitted alongside the translated code
///
/// Each helper stands for a set of output-language overloads sharing a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Helper {
    Sign,
    /// `mod(genType, genType)`
    Mod,
    /// `mod(genType, float)` for vectors
    ModScalar,
    Compare(CompareOp, ScalarKind),
    Not,
    MatrixCompMult,
    Texture2D,
    Texture2DBias,
    Texture2DProj3,
    Texture2DProj3Bias,
    Texture2DProj4,
    Texture2DProj4Bias,
    Texture2DLod,
    Texture2DProjLod3,
    Texture2DProjLod4,
    TextureCube,
    TextureCubeBias,
    TextureCubeLod,
    /// Matrix with a scalar on its diagonal, by matrix size
    MatrixDiagonal(u8),
    /// Matrix built from a matrix of another size, by source and target sizes
    MatrixResize(u8, u8),
}

impl Helper {
    /// Output-language name of the helper overload set
    pub fn name(self) -> &'static str {
        use CompareOp as C;
        use Helper::*;

        match self {
            Sign => "gl_sign",
            Mod | ModScalar => "gl_mod",
            Compare(C::LessThan, _) => "gl_lessThan",
            Compare(C::LessThanEqual, _) => "gl_lessThanEqual",
            Compare(C::GreaterThan, _) => "gl_greaterThan",
            Compare(C::GreaterThanEqual, _) => "gl_greaterThanEqual",
            Compare(C::Equal, _) => "gl_equal",
            Compare(C::NotEqual, _) => "gl_notEqual",
            Not => "gl_not",
            MatrixCompMult => "gl_matrixCompMult",
            Texture2D => "gl_texture2D",
            Texture2DBias => "gl_texture2DBias",
            Texture2DProj3 | Texture2DProj4 => "gl_texture2DProj",
            Texture2DProj3Bias | Texture2DProj4Bias => "gl_texture2DProjBias",
            Texture2DLod => "gl_texture2DLod",
            Texture2DProjLod3 | Texture2DProjLod4 => "gl_texture2DProjLod",
            TextureCube => "gl_textureCube",
            TextureCubeBias => "gl_textureCubeBias",
            TextureCubeLod => "gl_textureCubeLod",
            MatrixDiagonal(2) => "gl_diagMat2",
            MatrixDiagonal(3) => "gl_diagMat3",
            MatrixDiagonal(_) => "gl_diagMat4",
            MatrixResize(_, 2) => "gl_toMat2",
            MatrixResize(_, 3) => "gl_toMat3",
            MatrixResize(_, _) => "gl_toMat4",
        }
    }

    /// Return true for texture lookups, which take a sampler and texture pair
    pub fn is_texture_lookup(self) -> bool {
        use Helper::*;

        matches!(
            self,
            Texture2D
                | Texture2DBias
                | Texture2DProj3
                | Texture2DProj3Bias
                | Texture2DProj4
                | Texture2DProj4Bias
                | Texture2DLod
                | Texture2DProjLod3
                | Texture2DProjLod4
                | TextureCube
                | TextureCubeBias
                | TextureCubeLod
        )
    }
}

/// How a built-in call is written in the output language
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lowering {
    /// Call to an output-language intrinsic of another name
    Rename(&'static str),
    /// Call to a helper function
    Helper(Helper),
}

/// Maximum number of parameters of a fixed built-in signature
pub const MAX_BUILTIN_PARAMS: usize = 3;

/// Signature of a built-in, as stored in the table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureTemplate {
    Fixed {
        ret: BasicType,
        params: [Option<BasicType>; MAX_BUILTIN_PARAMS],
    },
    Special {
        kind: SignatureKind,
        ret: BasicType,
    },
}

impl SignatureTemplate {
    /// Expand into a matchable signature
    pub fn to_signature(&self) -> FunctionSignature {
        match self {
            Self::Fixed { ret, params } => FunctionSignature::new(
                (*ret).into(),
                params
                    .iter()
                    .flatten()
                    .map(|p| Parameter::new((*p).into()))
                    .collect(),
            ),
            Self::Special { kind, ret } => FunctionSignature {
                kind: *kind,
                params: Vec::new(),
                return_type: (*ret).into(),
            },
        }
    }
}

/// One overload of a built-in function
#[derive(Debug, PartialEq, Eq)]
pub struct KnownFunction {
    pub symbol: KnownSymbol,
    pub lowering: Lowering,
    pub applicability: Applicability,
    pub signature: SignatureTemplate,
}

impl KnownFunction {
    const fn new(
        symbol: KnownSymbol,
        lowering: Lowering,
        applicability: Applicability,
        signature: SignatureTemplate,
    ) -> Self {
        Self {
            symbol,
            lowering,
            applicability,
            signature,
        }
    }

    /// Return true for lookups and derivatives, which need uniform control flow
    pub fn uses_gradients(&self) -> bool {
        use KnownSymbol::*;

        matches!(
            self.symbol,
            Texture2D | Texture2DProj | TextureCube | DFdx | DFdy | Fwidth
        )
    }

    /// Helper function this overload is lowered to, if any
    pub fn helper(&self) -> Option<Helper> {
        match self.lowering {
            Lowering::Helper(helper) => Some(helper),
            Lowering::Rename(_) => None,
        }
    }
}

const G: BasicType = BasicType::GenType;
const F: BasicType = BasicType::Float;
const V2: BasicType = BasicType::Vec2;
const V3: BasicType = BasicType::Vec3;
const V4: BasicType = BasicType::Vec4;
const S2D: BasicType = BasicType::Sampler2D;
const SCUBE: BasicType = BasicType::SamplerCube;

const ANY: Applicability = Applicability::ANY;
const FRAG: Applicability = Applicability::FRAGMENT_ONLY;
const VERT: Applicability = Applicability::VERTEX_ONLY;
const DERIV: Applicability = Applicability::FRAGMENT_ONLY.with(Applicability::DERIVATIVES);

const fn f1(ret: BasicType, a: BasicType) -> SignatureTemplate {
    SignatureTemplate::Fixed {
        ret,
        params: [Some(a), None, None],
    }
}

const fn f2(ret: BasicType, a: BasicType, b: BasicType) -> SignatureTemplate {
    SignatureTemplate::Fixed {
        ret,
        params: [Some(a), Some(b), None],
    }
}

const fn f3(ret: BasicType, a: BasicType, b: BasicType, c: BasicType) -> SignatureTemplate {
    SignatureTemplate::Fixed {
        ret,
        params: [Some(a), Some(b), Some(c)],
    }
}

const fn special(kind: SignatureKind, ret: BasicType) -> SignatureTemplate {
    SignatureTemplate::Special { kind, ret }
}

const fn rename(name: &'static str) -> Lowering {
    Lowering::Rename(name)
}

const fn helper(helper: Helper) -> Lowering {
    Lowering::Helper(helper)
}

const fn compare(op: CompareOp, kind: ScalarKind) -> Lowering {
    Lowering::Helper(Helper::Compare(op, kind))
}

/// Number of built-in function overloads
pub const KNOWN_FUNCTION_COUNT: usize = 80;

/// Built-in function overloads, in matching order
pub static KNOWN_FUNCTIONS: [KnownFunction; KNOWN_FUNCTION_COUNT] = {
    use KnownFunction as K;
    use KnownSymbol::*;
    use SignatureKind::*;

    [
        // Angle and trigonometry
        K::new(Radians, rename("radians"), ANY, f1(G, G)),
        K::new(Degrees, rename("degrees"), ANY, f1(G, G)),
        K::new(Sin, rename("sin"), ANY, f1(G, G)),
        K::new(Cos, rename("cos"), ANY, f1(G, G)),
        K::new(Tan, rename("tan"), ANY, f1(G, G)),
        K::new(Asin, rename("asin"), ANY, f1(G, G)),
        K::new(Acos, rename("acos"), ANY, f1(G, G)),
        K::new(Atan, rename("atan"), ANY, f1(G, G)),
        K::new(Atan, rename("atan2"), ANY, f2(G, G, G)),
        // Exponential
        K::new(Pow, rename("pow"), ANY, f2(G, G, G)),
        K::new(Exp, rename("exp"), ANY, f1(G, G)),
        K::new(Log, rename("log"), ANY, f1(G, G)),
        K::new(Exp2, rename("exp2"), ANY, f1(G, G)),
        K::new(Log2, rename("log2"), ANY, f1(G, G)),
        K::new(Sqrt, rename("sqrt"), ANY, f1(G, G)),
        K::new(InverseSqrt, rename("rsqrt"), ANY, f1(G, G)),
        // Common
        K::new(Abs, rename("abs"), ANY, f1(G, G)),
        K::new(Sign, helper(Helper::Sign), ANY, f1(G, G)),
        K::new(Floor, rename("floor"), ANY, f1(G, G)),
        K::new(Ceil, rename("ceil"), ANY, f1(G, G)),
        K::new(Fract, rename("frac"), ANY, f1(G, G)),
        K::new(Mod, helper(Helper::Mod), ANY, f2(G, G, G)),
        K::new(Mod, helper(Helper::ModScalar), ANY, f2(G, G, F)),
        K::new(Min, rename("min"), ANY, f2(G, G, G)),
        K::new(Min, rename("min"), ANY, f2(G, G, F)),
        K::new(Max, rename("max"), ANY, f2(G, G, G)),
        K::new(Max, rename("max"), ANY, f2(G, G, F)),
        K::new(Clamp, rename("clamp"), ANY, f3(G, G, G, G)),
        K::new(Clamp, rename("clamp"), ANY, f3(G, G, F, F)),
        K::new(Mix, rename("lerp"), ANY, f3(G, G, G, G)),
        K::new(Mix, rename("lerp"), ANY, f3(G, G, G, F)),
        K::new(Step, rename("step"), ANY, f2(G, G, G)),
        K::new(Step, rename("step"), ANY, f2(G, F, G)),
        K::new(SmoothStep, rename("smoothstep"), ANY, f3(G, G, G, G)),
        K::new(SmoothStep, rename("smoothstep"), ANY, f3(G, F, F, G)),
        // Geometric
        K::new(Length, rename("length"), ANY, f1(F, G)),
        K::new(Distance, rename("distance"), ANY, f2(F, G, G)),
        K::new(Dot, rename("dot"), ANY, f2(F, G, G)),
        K::new(Cross, rename("cross"), ANY, f2(V3, V3, V3)),
        K::new(Normalize, rename("normalize"), ANY, f1(G, G)),
        K::new(FaceForward, rename("faceforward"), ANY, f3(G, G, G, G)),
        K::new(Reflect, rename("reflect"), ANY, f2(G, G, G)),
        K::new(Refract, rename("refract"), ANY, f3(G, G, G, F)),
        // Matrix
        K::new(
            MatrixCompMult,
            helper(Helper::MatrixCompMult),
            ANY,
            f2(BasicType::Mat2, BasicType::Mat2, BasicType::Mat2),
        ),
        K::new(
            MatrixCompMult,
            helper(Helper::MatrixCompMult),
            ANY,
            f2(BasicType::Mat3, BasicType::Mat3, BasicType::Mat3),
        ),
        K::new(
            MatrixCompMult,
            helper(Helper::MatrixCompMult),
            ANY,
            f2(BasicType::Mat4, BasicType::Mat4, BasicType::Mat4),
        ),
        // Vector relational
        K::new(
            LessThan,
            compare(CompareOp::LessThan, ScalarKind::Float),
            ANY,
            special(CompareFloatVector, BasicType::BVecType),
        ),
        K::new(
            LessThan,
            compare(CompareOp::LessThan, ScalarKind::Int),
            ANY,
            special(CompareIntVector, BasicType::BVecType),
        ),
        K::new(
            LessThanEqual,
            compare(CompareOp::LessThanEqual, ScalarKind::Float),
            ANY,
            special(CompareFloatVector, BasicType::BVecType),
        ),
        K::new(
            LessThanEqual,
            compare(CompareOp::LessThanEqual, ScalarKind::Int),
            ANY,
            special(CompareIntVector, BasicType::BVecType),
        ),
        K::new(
            GreaterThan,
            compare(CompareOp::GreaterThan, ScalarKind::Float),
            ANY,
            special(CompareFloatVector, BasicType::BVecType),
        ),
        K::new(
            GreaterThan,
            compare(CompareOp::GreaterThan, ScalarKind::Int),
            ANY,
            special(CompareIntVector, BasicType::BVecType),
        ),
        K::new(
            GreaterThanEqual,
            compare(CompareOp::GreaterThanEqual, ScalarKind::Float),
            ANY,
            special(CompareFloatVector, BasicType::BVecType),
        ),
        K::new(
            GreaterThanEqual,
            compare(CompareOp::GreaterThanEqual, ScalarKind::Int),
            ANY,
            special(CompareIntVector, BasicType::BVecType),
        ),
        K::new(
            KnownSymbol::Equal,
            compare(CompareOp::Equal, ScalarKind::Float),
            ANY,
            special(CompareFloatVector, BasicType::BVecType),
        ),
        K::new(
            KnownSymbol::Equal,
            compare(CompareOp::Equal, ScalarKind::Int),
            ANY,
            special(CompareIntVector, BasicType::BVecType),
        ),
        K::new(
            KnownSymbol::Equal,
            compare(CompareOp::Equal, ScalarKind::Bool),
            ANY,
            special(CompareBoolVector, BasicType::BVecType),
        ),
        K::new(
            KnownSymbol::NotEqual,
            compare(CompareOp::NotEqual, ScalarKind::Float),
            ANY,
            special(CompareFloatVector, BasicType::BVecType),
        ),
        K::new(
            KnownSymbol::NotEqual,
            compare(CompareOp::NotEqual, ScalarKind::Int),
            ANY,
            special(CompareIntVector, BasicType::BVecType),
        ),
        K::new(
            KnownSymbol::NotEqual,
            compare(CompareOp::NotEqual, ScalarKind::Bool),
            ANY,
            special(CompareBoolVector, BasicType::BVecType),
        ),
        K::new(
            Any,
            rename("any"),
            ANY,
            special(TestBoolVector, BasicType::Bool),
        ),
        K::new(
            All,
            rename("all"),
            ANY,
            special(TestBoolVector, BasicType::Bool),
        ),
        K::new(
            Not,
            helper(Helper::Not),
            ANY,
            f1(BasicType::BVec2, BasicType::BVec2),
        ),
        K::new(
            Not,
            helper(Helper::Not),
            ANY,
            f1(BasicType::BVec3, BasicType::BVec3),
        ),
        K::new(
            Not,
            helper(Helper::Not),
            ANY,
            f1(BasicType::BVec4, BasicType::BVec4),
        ),
        // Texture lookup
        K::new(Texture2D, helper(Helper::Texture2D), ANY, f2(V4, S2D, V2)),
        K::new(
            Texture2D,
            helper(Helper::Texture2DBias),
            FRAG,
            f3(V4, S2D, V2, F),
        ),
        K::new(
            Texture2DProj,
            helper(Helper::Texture2DProj3),
            ANY,
            f2(V4, S2D, V3),
        ),
        K::new(
            Texture2DProj,
            helper(Helper::Texture2DProj3Bias),
            FRAG,
            f3(V4, S2D, V3, F),
        ),
        K::new(
            Texture2DProj,
            helper(Helper::Texture2DProj4),
            ANY,
            f2(V4, S2D, V4),
        ),
        K::new(
            Texture2DProj,
            helper(Helper::Texture2DProj4Bias),
            FRAG,
            f3(V4, S2D, V4, F),
        ),
        K::new(
            Texture2DLod,
            helper(Helper::Texture2DLod),
            VERT,
            f3(V4, S2D, V2, F),
        ),
        K::new(
            Texture2DProjLod,
            helper(Helper::Texture2DProjLod3),
            VERT,
            f3(V4, S2D, V3, F),
        ),
        K::new(
            Texture2DProjLod,
            helper(Helper::Texture2DProjLod4),
            VERT,
            f3(V4, S2D, V4, F),
        ),
        K::new(
            TextureCube,
            helper(Helper::TextureCube),
            ANY,
            f2(V4, SCUBE, V3),
        ),
        K::new(
            TextureCube,
            helper(Helper::TextureCubeBias),
            FRAG,
            f3(V4, SCUBE, V3, F),
        ),
        K::new(
            TextureCubeLod,
            helper(Helper::TextureCubeLod),
            VERT,
            f3(V4, SCUBE, V3, F),
        ),
        // Derivatives
        K::new(DFdx, rename("ddx"), DERIV, f1(G, G)),
        K::new(DFdy, rename("ddy"), DERIV, f1(G, G)),
        K::new(Fwidth, rename("fwidth"), DERIV, f1(G, G)),
    ]
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_entry_is_consistent() {
        for (i, f) in KNOWN_FUNCTIONS.iter().enumerate() {
            match f.signature {
                SignatureTemplate::Fixed { ret, params } => {
                    assert!(params[0].is_some(), "entry {} has no parameter", i);

                    // A generic return type needs a generic parameter to resolve from
                    if ret == BasicType::GenType {
                        assert!(
                            params.iter().any(|p| *p == Some(BasicType::GenType)),
                            "entry {} cannot resolve its return type",
                            i
                        );
                    }
                }
                SignatureTemplate::Special { kind, .. } => {
                    assert_ne!(kind, SignatureKind::Normal, "entry {}", i);
                }
            }
        }
    }

    #[test]
    fn every_function_symbol_has_an_overload() {
        use KnownSymbol::*;

        for symbol in super::super::symbols::ALL_KNOWN_SYMBOLS.iter() {
            if *symbol >= GlPosition {
                break;
            }

            assert!(
                KNOWN_FUNCTIONS.iter().any(|f| f.symbol == *symbol),
                "no overload for {}",
                symbol.name()
            );
        }
    }

    #[test]
    fn stage_applicability() {
        assert!(FRAG.allows_stage(ShaderStage::Fragment));
        assert!(!FRAG.allows_stage(ShaderStage::Vertex));
        assert!(!VERT.allows_stage(ShaderStage::Fragment));
        assert!(ANY.allows_stage(ShaderStage::Vertex));
        assert!(DERIV.contains(Applicability::DERIVATIVES));
        assert!(!DERIV.allows_stage(ShaderStage::Vertex));
    }
}
