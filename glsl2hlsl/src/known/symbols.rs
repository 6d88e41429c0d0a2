//! Names of built-in symbols

/// Built-in symbols interned before any user code is parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KnownSymbol {
    // Angle and trigonometry functions
    Radians,
    Degrees,
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    // Exponential functions
    Pow,
    Exp,
    Log,
    Exp2,
    Log2,
    Sqrt,
    InverseSqrt,
    // Common functions
    Abs,
    Sign,
    Floor,
    Ceil,
    Fract,
    Mod,
    Min,
    Max,
    Clamp,
    Mix,
    Step,
    SmoothStep,
    // Geometric functions
    Length,
    Distance,
    Dot,
    Cross,
    Normalize,
    FaceForward,
    Reflect,
    Refract,
    // Matrix functions
    MatrixCompMult,
    // Vector relational functions
    LessThan,
    LessThanEqual,
    GreaterThan,
    GreaterThanEqual,
    Equal,
    NotEqual,
    Any,
    All,
    Not,
    // Texture lookup functions
    Texture2D,
    Texture2DProj,
    Texture2DLod,
    Texture2DProjLod,
    TextureCube,
    TextureCubeLod,
    // Derivative functions
    DFdx,
    DFdy,
    Fwidth,
    // Special variables
    GlPosition,
    GlPointSize,
    GlFragCoord,
    GlFrontFacing,
    GlFragColor,
    GlFragData,
    GlPointCoord,
    GlFragDepthExt,
    GlMaxVertexAttribs,
    GlMaxVertexUniformVectors,
    GlMaxVaryingVectors,
    GlMaxVertexTextureImageUnits,
    GlMaxCombinedTextureImageUnits,
    GlMaxTextureImageUnits,
    GlMaxFragmentUniformVectors,
    GlMaxDrawBuffers,
    GlDepthRange,
    // Special types and their fields
    GlDepthRangeParameters,
    Near,
    Far,
    Diff,
    // Entry point
    Main,
}

/// Number of built-in symbols
pub const KNOWN_SYMBOL_COUNT: usize = KnownSymbol::Main as usize + 1;

/// Every built-in symbol, in declaration order
pub const ALL_KNOWN_SYMBOLS: [KnownSymbol; KNOWN_SYMBOL_COUNT] = {
    use KnownSymbol::*;
    [
        Radians,
        Degrees,
        Sin,
        Cos,
        Tan,
        Asin,
        Acos,
        Atan,
        Pow,
        Exp,
        Log,
        Exp2,
        Log2,
        Sqrt,
        InverseSqrt,
        Abs,
        Sign,
        Floor,
        Ceil,
        Fract,
        Mod,
        Min,
        Max,
        Clamp,
        Mix,
        Step,
        SmoothStep,
        Length,
        Distance,
        Dot,
        Cross,
        Normalize,
        FaceForward,
        Reflect,
        Refract,
        MatrixCompMult,
        LessThan,
        LessThanEqual,
        GreaterThan,
        GreaterThanEqual,
        Equal,
        NotEqual,
        Any,
        All,
        Not,
        Texture2D,
        Texture2DProj,
        Texture2DLod,
        Texture2DProjLod,
        TextureCube,
        TextureCubeLod,
        DFdx,
        DFdy,
        Fwidth,
        GlPosition,
        GlPointSize,
        GlFragCoord,
        GlFrontFacing,
        GlFragColor,
        GlFragData,
        GlPointCoord,
        GlFragDepthExt,
        GlMaxVertexAttribs,
        GlMaxVertexUniformVectors,
        GlMaxVaryingVectors,
        GlMaxVertexTextureImageUnits,
        GlMaxCombinedTextureImageUnits,
        GlMaxTextureImageUnits,
        GlMaxFragmentUniformVectors,
        GlMaxDrawBuffers,
        GlDepthRange,
        GlDepthRangeParameters,
        Near,
        Far,
        Diff,
        Main,
    ]
};

/// Source spelling of each built-in symbol, indexed by [KnownSymbol]
pub static KNOWN_SYMBOL_NAMES: [&str; KNOWN_SYMBOL_COUNT] = [
    "radians",
    "degrees",
    "sin",
    "cos",
    "tan",
    "asin",
    "acos",
    "atan",
    "pow",
    "exp",
    "log",
    "exp2",
    "log2",
    "sqrt",
    "inversesqrt",
    "abs",
    "sign",
    "floor",
    "ceil",
    "fract",
    "mod",
    "min",
    "max",
    "clamp",
    "mix",
    "step",
    "smoothstep",
    "length",
    "distance",
    "dot",
    "cross",
    "normalize",
    "faceforward",
    "reflect",
    "refract",
    "matrixCompMult",
    "lessThan",
    "lessThanEqual",
    "greaterThan",
    "greaterThanEqual",
    "equal",
    "notEqual",
    "any",
    "all",
    "not",
    "texture2D",
    "texture2DProj",
    "texture2DLod",
    "texture2DProjLod",
    "textureCube",
    "textureCubeLod",
    "dFdx",
    "dFdy",
    "fwidth",
    "gl_Position",
    "gl_PointSize",
    "gl_FragCoord",
    "gl_FrontFacing",
    "gl_FragColor",
    "gl_FragData",
    "gl_PointCoord",
    "gl_FragDepthEXT",
    "gl_MaxVertexAttribs",
    "gl_MaxVertexUniformVectors",
    "gl_MaxVaryingVectors",
    "gl_MaxVertexTextureImageUnits",
    "gl_MaxCombinedTextureImageUnits",
    "gl_MaxTextureImageUnits",
    "gl_MaxFragmentUniformVectors",
    "gl_MaxDrawBuffers",
    "gl_DepthRange",
    "gl_DepthRangeParameters",
    "near",
    "far",
    "diff",
    "main",
];

impl KnownSymbol {
    /// Source spelling
    pub fn name(self) -> &'static str {
        KNOWN_SYMBOL_NAMES[self as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_matches_enum() {
        for (i, symbol) in ALL_KNOWN_SYMBOLS.iter().enumerate() {
            assert_eq!(*symbol as usize, i);
        }

        let mut names: Vec<_> = KNOWN_SYMBOL_NAMES.to_vec();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), KNOWN_SYMBOL_COUNT);

        assert_eq!(KnownSymbol::InverseSqrt.name(), "inversesqrt");
        assert_eq!(KnownSymbol::GlFragDepthExt.name(), "gl_FragDepthEXT");
        assert_eq!(KnownSymbol::Main.name(), "main");
    }
}
