//! Backend toolchain glue.
//!
//! Drives the external steps of the cycle: `llc` compiles the textual IR to
//! a relocatable object, `clang` links it into an executable, and the
//! executable runs as a subprocess with its exit code handed back. Any
//! non-zero tool exit aborts the cycle as a [`CodegenError::BackendToolchain`];
//! nothing is retried.

use std::path::Path;
use std::process::Command;

use crate::error::CodegenError;

/// Compile a textual IR file to a relocatable object with `llc`.
pub fn assemble(ll_path: &Path, obj_path: &Path) -> Result<(), CodegenError> {
    run_tool(
        Command::new("llc")
            .arg("-filetype=obj")
            .arg("-relocation-model=pic")
            .arg("-tailcallopt")
            .arg("-o")
            .arg(obj_path)
            .arg(ll_path),
        "llc",
    )
}

/// Link an object file into an executable with `clang`.
pub fn link(obj_path: &Path, exe_path: &Path) -> Result<(), CodegenError> {
    run_tool(
        Command::new("clang")
            .arg("-fPIE")
            .arg("-o")
            .arg(exe_path)
            .arg(obj_path),
        "clang",
    )
}

/// Run the produced executable, inheriting stdio, and hand back its exit
/// code. Termination by signal (no code) is a backend failure.
pub fn run(exe_path: &Path) -> Result<i32, CodegenError> {
    let status = Command::new(exe_path)
        .status()
        .map_err(|e| CodegenError::BackendToolchain {
            tool: exe_path.display().to_string(),
            code: None,
            stderr: format!("failed to invoke: {e}"),
        })?;
    status.code().ok_or_else(|| CodegenError::BackendToolchain {
        tool: exe_path.display().to_string(),
        code: None,
        stderr: String::new(),
    })
}

fn run_tool(cmd: &mut Command, tool: &str) -> Result<(), CodegenError> {
    let output = cmd.output().map_err(|e| CodegenError::BackendToolchain {
        tool: tool.to_string(),
        code: None,
        stderr: format!("failed to invoke: {e}"),
    })?;
    if !output.status.success() {
        return Err(CodegenError::BackendToolchain {
            tool: tool.to_string(),
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }
    Ok(())
}
