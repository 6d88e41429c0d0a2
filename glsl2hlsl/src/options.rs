//! Compilation options

use derive_builder::Builder;

use crate::{Error, Result};

/// Shader stage of a compilation unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl Default for ShaderStage {
    fn default() -> Self {
        Self::Fragment
    }
}

impl std::str::FromStr for ShaderStage {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "vertex" | "vert" | "vs" => Ok(Self::Vertex),
            "fragment" | "frag" | "fs" => Ok(Self::Fragment),
            other => Err(Error::Options(format!("unknown shader stage: {}", other))),
        }
    }
}

/// Options for a single compilation
#[derive(Debug, Clone, Builder)]
#[builder(default)]
pub struct CompileOptions {
    /// Shader stage being compiled
    pub stage: ShaderStage,
    /// Enable `dFdx`, `dFdy` and `fwidth` without an `#extension` directive
    pub standard_derivatives: bool,
    /// Enable `gl_FragDepthEXT` without an `#extension` directive
    pub frag_depth: bool,
    /// Prepend definitions of the helper functions the output refers to
    pub emit_helpers: bool,
    /// Emit the stage entry point wrapping the translated `main`
    pub emit_entry_point: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            stage: ShaderStage::default(),
            standard_derivatives: false,
            frag_depth: false,
            emit_helpers: true,
            emit_entry_point: true,
        }
    }
}

impl CompileOptions {
    /// Default options for the given stage
    pub fn for_stage(stage: ShaderStage) -> Self {
        Self {
            stage,
            ..Default::default()
        }
    }
}

impl CompileOptionsBuilder {
    /// Build the options, mapping builder failures to the crate error type
    pub fn finish(&self) -> Result<CompileOptions> {
        self.build().map_err(|e| Error::Options(e.to_string()))
    }
}
