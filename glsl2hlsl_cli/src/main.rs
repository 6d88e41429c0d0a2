//! glsl2hlslc is the command-line front-end of the glsl2hlsl translator. To translate shaders
//! from Rust code, see the documentation for the `glsl2hlsl` crate.
//!
//! # Command-line usage
//!
//! ```bash
//! glsl2hlslc 0.1.0
//! GLSL ES to HLSL translator
//!
//! USAGE:
//!     glsl2hlslc [FLAGS] [OPTIONS] <input>
//!
//! FLAGS:
//!         --derivatives    Enable GL_OES_standard_derivatives without an #extension directive
//!         --frag-depth     Enable GL_EXT_frag_depth without an #extension directive
//!     -h, --help           Prints help information
//!         --no-helpers     Do not emit the helper function definitions
//!     -q, --quiet          Quiet mode
//!         --reflect        Print the active variables after the translated code
//!     -V, --version        Prints version information
//!     -v, --verbose        Verbose mode. Repeat to increase verbosity
//!
//! OPTIONS:
//!     -o, --output <output>    Output file (defaults to stdout)
//!     -s, --stage <stage>      Shader stage (vertex or fragment), inferred from the input
//!                              extension by default
//!
//! ARGS:
//!     <input>    Input shader file
//! ```
//!
//! # Examples
//!
//! ```bash
//! # Translate the fragment shader `blur.frag` to `blur.hlsl`
//! glsl2hlslc -o blur.hlsl blur.frag
//!
//! # Translate a vertex shader with a non-standard extension and list its active variables
//! glsl2hlslc -s vertex --reflect sprite.glsl
//! ```

use glsl2hlsl::api::cli::*;

fn main() -> anyhow::Result<()> {
    glsl2hlsl::api::cli::main(Opts::from_args())
}
