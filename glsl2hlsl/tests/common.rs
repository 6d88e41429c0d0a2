#![allow(dead_code)]

use glsl2hlsl::{compile, Compilation, CompileOptions, Error, ErrorCode, ShaderStage};

fn init_logger() {
    env_logger::builder()
        .format_timestamp(None)
        .filter_level(log::LevelFilter::Trace)
        .is_test(true)
        .try_init()
        .ok();
}

/// Compile `src` for `stage` with default options, panicking on any error
pub fn compile_ok(stage: ShaderStage, src: &str) -> Compilation {
    compile_with(CompileOptions::for_stage(stage), src)
}

/// Compile `src` with the given options, panicking on any error
pub fn compile_with(options: CompileOptions, src: &str) -> Compilation {
    init_logger();

    match compile(src, &options) {
        Ok(compilation) => {
            eprintln!(">>> source:\n{}\n>>> hlsl:\n{}", src, compilation.hlsl);
            compilation
        }
        Err(error) => panic!("failed to compile:\n{}\n>>> error:\n{}", src, error),
    }
}

/// Compile `src` for `stage`, expecting it to fail with a diagnostic of the given code
pub fn compile_err(stage: ShaderStage, src: &str, code: ErrorCode) -> Error {
    init_logger();

    match compile(src, &CompileOptions::for_stage(stage)) {
        Ok(compilation) => panic!(
            "expected {:?} but compilation succeeded:\n{}",
            code, compilation.hlsl
        ),
        Err(error) => {
            eprintln!(">>> source:\n{}\n>>> error:\n{}", src, error);
            assert!(
                error.has_code(code),
                "expected {:?}, got:\n{}",
                code,
                error
            );
            error
        }
    }
}

/// Assert that the translated code contains every snippet
pub fn assert_contains(compilation: &Compilation, snippets: &[&str]) {
    for snippet in snippets {
        assert!(
            compilation.hlsl.contains(snippet),
            "missing `{}` in:\n{}",
            snippet,
            compilation.hlsl
        );
    }
}

/// Text of the translated user `main`, from its signature to its closing brace
pub fn gl_main(compilation: &Compilation) -> String {
    let start = compilation
        .hlsl
        .find("void gl_main()\n")
        .expect("no gl_main in the output");

    let body = &compilation.hlsl[start..];
    let end = body.find("\n}\n").expect("unterminated gl_main") + 3;
    body[..end].to_owned()
}

/// Compare the translated user `main` with `expected`, ignoring surrounding whitespace
pub fn verify_main(stage: ShaderStage, src: &str, expected: &str) {
    let compilation = compile_ok(stage, src);
    pretty_assertions::assert_eq!(gl_main(&compilation).trim(), expected.trim());
}
