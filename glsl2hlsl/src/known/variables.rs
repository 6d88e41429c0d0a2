//! Built-in variable table

use super::{Applicability, KnownSymbol};
use crate::ident::Storage;
use crate::types::BasicType;

/// Built-in variables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KnownVariable {
    Position,
    PointSize,
    FragCoord,
    FrontFacing,
    FragColor,
    FragData,
    PointCoord,
    FragDepthExt,
    MaxVertexAttribs,
    MaxVertexUniformVectors,
    MaxVaryingVectors,
    MaxVertexTextureImageUnits,
    MaxCombinedTextureImageUnits,
    MaxTextureImageUnits,
    MaxFragmentUniformVectors,
    MaxDrawBuffers,
    DepthRange,
}

/// Number of built-in variables
pub const KNOWN_VARIABLE_COUNT: usize = KnownVariable::DepthRange as usize + 1;

/// Type of a built-in variable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialType {
    Basic(BasicType),
    /// `gl_DepthRangeParameters`
    DepthRange,
}

/// Table entry of a built-in variable
#[derive(Debug, PartialEq, Eq)]
pub struct KnownVariableEntry {
    pub variable: KnownVariable,
    pub symbol: KnownSymbol,
    /// Output-language spelling
    pub hlsl: &'static str,
    pub applicability: Applicability,
    pub ty: SpecialType,
    /// Read-only stage inputs are `Varying` in the fragment stage, constants are `Const`
    pub storage: Storage,
    pub array_size: Option<u32>,
    /// Value of built-in constants
    pub value: Option<i64>,
}

const MAX_DRAW_BUFFERS: i64 = 1;

const fn var(
    variable: KnownVariable,
    symbol: KnownSymbol,
    hlsl: &'static str,
    applicability: Applicability,
    ty: BasicType,
    storage: Storage,
) -> KnownVariableEntry {
    KnownVariableEntry {
        variable,
        symbol,
        hlsl,
        applicability,
        ty: SpecialType::Basic(ty),
        storage,
        array_size: None,
        value: None,
    }
}

const fn constant(
    variable: KnownVariable,
    symbol: KnownSymbol,
    hlsl: &'static str,
    value: i64,
) -> KnownVariableEntry {
    KnownVariableEntry {
        variable,
        symbol,
        hlsl,
        applicability: Applicability::ANY,
        ty: SpecialType::Basic(BasicType::Int),
        storage: Storage::Const,
        array_size: None,
        value: Some(value),
    }
}

/// Built-in variables, indexed by [KnownVariable]
pub static KNOWN_VARIABLES: [KnownVariableEntry; KNOWN_VARIABLE_COUNT] = {
    use KnownVariable as V;
    use KnownSymbol as S;

    const FRAG: Applicability = Applicability::FRAGMENT_ONLY;
    const VERT: Applicability = Applicability::VERTEX_ONLY;

    [
        var(
            V::Position,
            S::GlPosition,
            "gl_Position",
            VERT,
            BasicType::Vec4,
            Storage::None,
        ),
        var(
            V::PointSize,
            S::GlPointSize,
            "gl_PointSize",
            VERT,
            BasicType::Float,
            Storage::None,
        ),
        var(
            V::FragCoord,
            S::GlFragCoord,
            "gl_FragCoord",
            FRAG,
            BasicType::Vec4,
            Storage::Varying,
        ),
        var(
            V::FrontFacing,
            S::GlFrontFacing,
            "gl_FrontFacing",
            FRAG,
            BasicType::Bool,
            Storage::Varying,
        ),
        var(
            V::FragColor,
            S::GlFragColor,
            "gl_FragColor",
            FRAG,
            BasicType::Vec4,
            Storage::None,
        ),
        KnownVariableEntry {
            variable: V::FragData,
            symbol: S::GlFragData,
            hlsl: "gl_FragData",
            applicability: FRAG,
            ty: SpecialType::Basic(BasicType::Vec4),
            storage: Storage::None,
            array_size: Some(MAX_DRAW_BUFFERS as u32),
            value: None,
        },
        var(
            V::PointCoord,
            S::GlPointCoord,
            "gl_PointCoord",
            FRAG,
            BasicType::Vec2,
            Storage::Varying,
        ),
        var(
            V::FragDepthExt,
            S::GlFragDepthExt,
            "gl_FragDepth",
            FRAG.with(Applicability::FRAG_DEPTH),
            BasicType::Float,
            Storage::None,
        ),
        constant(
            V::MaxVertexAttribs,
            S::GlMaxVertexAttribs,
            "gl_MaxVertexAttribs",
            16,
        ),
        constant(
            V::MaxVertexUniformVectors,
            S::GlMaxVertexUniformVectors,
            "gl_MaxVertexUniformVectors",
            254,
        ),
        constant(
            V::MaxVaryingVectors,
            S::GlMaxVaryingVectors,
            "gl_MaxVaryingVectors",
            10,
        ),
        constant(
            V::MaxVertexTextureImageUnits,
            S::GlMaxVertexTextureImageUnits,
            "gl_MaxVertexTextureImageUnits",
            4,
        ),
        constant(
            V::MaxCombinedTextureImageUnits,
            S::GlMaxCombinedTextureImageUnits,
            "gl_MaxCombinedTextureImageUnits",
            20,
        ),
        constant(
            V::MaxTextureImageUnits,
            S::GlMaxTextureImageUnits,
            "gl_MaxTextureImageUnits",
            16,
        ),
        constant(
            V::MaxFragmentUniformVectors,
            S::GlMaxFragmentUniformVectors,
            "gl_MaxFragmentUniformVectors",
            221,
        ),
        constant(
            V::MaxDrawBuffers,
            S::GlMaxDrawBuffers,
            "gl_MaxDrawBuffers",
            MAX_DRAW_BUFFERS,
        ),
        KnownVariableEntry {
            variable: V::DepthRange,
            symbol: S::GlDepthRange,
            hlsl: "gl_DepthRange",
            applicability: Applicability::ANY,
            ty: SpecialType::DepthRange,
            storage: Storage::Uniform,
            array_size: None,
            value: None,
        },
    ]
};

impl KnownVariable {
    pub fn entry(self) -> &'static KnownVariableEntry {
        &KNOWN_VARIABLES[self as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_matches_enum() {
        for (i, entry) in KNOWN_VARIABLES.iter().enumerate() {
            assert_eq!(entry.variable as usize, i);
            assert_eq!(entry.value.is_some(), entry.storage == Storage::Const);
        }

        assert_eq!(KnownVariable::FragData.entry().array_size, Some(1));
        assert_eq!(KnownVariable::Position.entry().symbol.name(), "gl_Position");
    }
}
