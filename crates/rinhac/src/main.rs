//! Command-line driver for the Rinha compiler.
//!
//! Runs one full cycle per input document: decode the JSON AST, lower it to
//! textual LLVM IR (`output.ll`), compile with `llc`, link with `clang`,
//! execute the binary, and exit with the program's own exit code. Batch
//! mode runs the cycle over every document in a directory and reports
//! per-file wall-clock time; one file's failure does not stop the rest.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;

#[derive(Parser)]
#[command(name = "rinhac")]
#[command(about = "Compiles Rinha AST documents to native executables via LLVM")]
struct Args {
    /// AST document (.rinha.json), or a directory of them with --batch
    input: PathBuf,

    /// Run the compile-link-execute cycle for every .json document in the
    /// input directory, timing each one
    #[arg(long)]
    batch: bool,

    /// Stop after writing the textual IR artifact (output.ll)
    #[arg(long)]
    emit_ir: bool,

    /// Directory for build artifacts (defaults to the input's directory)
    #[arg(long)]
    out_dir: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    if args.batch {
        return run_batch(&args);
    }

    match run_cycle(&args.input, args.out_dir.as_deref(), args.emit_ir) {
        Ok(code) => ExitCode::from((code & 0xff) as u8),
        Err(err) => {
            eprintln!("rinhac: error: {err}");
            ExitCode::FAILURE
        }
    }
}

/// One compilation cycle for a single document. Returns the exit code of
/// the produced executable (or 0 when stopping at the IR artifact).
fn run_cycle(
    input: &Path,
    out_dir: Option<&Path>,
    emit_ir_only: bool,
) -> Result<i32, Box<dyn std::error::Error>> {
    let program = rinha_ast::parse_program_file(input)?;
    let ir = rinha_codegen::compile_to_ir(&program)?;

    let dir = match out_dir {
        Some(dir) => dir.to_path_buf(),
        None => input
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".")),
    };
    let ll_path = dir.join("output.ll");
    std::fs::write(&ll_path, &ir)?;
    if emit_ir_only {
        return Ok(0);
    }

    let obj_path = dir.join("output.o");
    let exe_path = dir.join("output");
    rinha_codegen::toolchain::assemble(&ll_path, &obj_path)?;
    rinha_codegen::toolchain::link(&obj_path, &exe_path)?;
    let code = rinha_codegen::toolchain::run(&exe_path)?;
    Ok(code)
}

fn run_batch(args: &Args) -> ExitCode {
    let entries = match std::fs::read_dir(&args.input) {
        Ok(entries) => entries,
        Err(err) => {
            eprintln!("rinhac: cannot read '{}': {err}", args.input.display());
            return ExitCode::FAILURE;
        }
    };

    let mut inputs: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    inputs.sort();

    let mut failures = 0usize;
    for input in &inputs {
        let started = Instant::now();
        match run_cycle(input, args.out_dir.as_deref(), args.emit_ir) {
            Ok(code) => {
                println!(
                    "{}: exit {code} in {:.3?}",
                    input.display(),
                    started.elapsed()
                );
            }
            Err(err) => {
                failures += 1;
                eprintln!(
                    "{}: failed in {:.3?}: {err}",
                    input.display(),
                    started.elapsed()
                );
            }
        }
    }

    if failures == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
