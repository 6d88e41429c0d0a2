//! Command-line interface to glsl2hlsl

use std::path::{Path, PathBuf};

pub use anyhow;
pub use structopt::StructOpt;

use crate::{compile_source, CompileOptionsBuilder, Error, ReaderSource, ShaderStage};

/// Command-line arguments structure
#[derive(StructOpt)]
#[structopt(name = "glsl2hlslc", about = "GLSL ES to HLSL translator", author)]
pub struct Opts {
    /// Input shader file
    input: PathBuf,

    /// Output file (defaults to stdout)
    #[structopt(short, long)]
    output: Option<PathBuf>,

    /// Shader stage (vertex or fragment), inferred from the input extension by default
    #[structopt(short, long)]
    stage: Option<ShaderStage>,

    /// Print the active variables after the translated code
    #[structopt(long)]
    reflect: bool,

    /// Do not emit the helper function definitions
    #[structopt(long)]
    no_helpers: bool,

    /// Enable GL_OES_standard_derivatives without an #extension directive
    #[structopt(long)]
    derivatives: bool,

    /// Enable GL_EXT_frag_depth without an #extension directive
    #[structopt(long)]
    frag_depth: bool,

    /// Quiet mode
    #[structopt(short, long)]
    quiet: bool,

    /// Verbose mode. Repeat to increase verbosity
    #[structopt(short, long, parse(from_occurrences))]
    verbose: u32,
}

/// Shader stage implied by the extension of `path`
fn stage_from_path(path: &Path) -> Option<ShaderStage> {
    match path.extension()?.to_str()? {
        "vert" | "vs" => Some(ShaderStage::Vertex),
        "frag" | "fs" => Some(ShaderStage::Fragment),
        _ => None,
    }
}

fn init_logger(opts: &Opts) {
    let level = if opts.quiet {
        log::LevelFilter::Error
    } else {
        match opts.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    };

    env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp(None)
        .init();
}

/// Entry point for the glsl2hlslc front-end
///
/// # Parameters
///
/// * `opts`: command-line options
pub fn main(opts: Opts) -> anyhow::Result<()> {
    init_logger(&opts);

    let stage = match opts.stage.or_else(|| stage_from_path(&opts.input)) {
        Some(stage) => stage,
        None => anyhow::bail!(
            "cannot infer the shader stage of {}, use --stage",
            opts.input.display()
        ),
    };

    let options = CompileOptionsBuilder::default()
        .stage(stage)
        .standard_derivatives(opts.derivatives)
        .frag_depth(opts.frag_depth)
        .emit_helpers(!opts.no_helpers)
        .emit_entry_point(true)
        .finish()?;

    let file = std::fs::File::open(&opts.input)?;
    let compilation = match compile_source(&mut ReaderSource::new(file), &options) {
        Ok(compilation) => compilation,
        Err(Error::Diagnostics(diagnostics)) => {
            for diagnostic in &diagnostics {
                eprintln!("{}: {}", opts.input.display(), diagnostic);
            }

            anyhow::bail!("{} error(s) reported", diagnostics.len());
        }
        Err(other) => return Err(other.into()),
    };

    let mut s = compilation.hlsl;
    if opts.reflect {
        for variable in &compilation.variables {
            s.push_str(&format!("// {}\n", variable));
        }
    }

    // Write output
    if let Some(path) = opts.output {
        use std::io::Write;
        write!(std::fs::File::create(path)?, "{}", s)?;
    } else {
        print!("{}", s);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_from_extensions() {
        assert_eq!(
            stage_from_path(Path::new("a/shader.vert")),
            Some(ShaderStage::Vertex)
        );
        assert_eq!(
            stage_from_path(Path::new("shader.fs")),
            Some(ShaderStage::Fragment)
        );
        assert_eq!(stage_from_path(Path::new("shader.glsl")), None);
    }

    #[test]
    fn parses_flags() {
        let opts = Opts::from_iter(&["glsl2hlslc", "-vv", "-s", "vertex", "--reflect", "in.glsl"]);

        assert_eq!(opts.verbose, 2);
        assert_eq!(opts.stage, Some(ShaderStage::Vertex));
        assert!(opts.reflect);
        assert!(!opts.no_helpers);
    }
}
