//! End-to-end integration tests for the Rinha compiler driver.
//!
//! Each test writes a `.rinha.json` AST document, invokes the full
//! compile-link-execute cycle through the `rinhac` binary, and asserts on
//! the program's stdout and exit code. Tests that need the external
//! toolchain skip silently when `llc` or `clang` is not on PATH.

use std::path::Path;
use std::process::Command;

fn toolchain_available() -> bool {
    let have = |tool: &str| {
        Command::new(tool)
            .arg("--version")
            .output()
            .map(|out| out.status.success())
            .unwrap_or(false)
    };
    have("llc") && have("clang")
}

/// Run the full cycle on an AST document; returns (stdout, exit code).
fn compile_and_run(document: &str) -> (String, i32) {
    let temp_dir = tempfile::tempdir().expect("failed to create temp dir");
    let source = temp_dir.path().join("program.rinha.json");
    std::fs::write(&source, document).expect("failed to write AST document");

    let output = Command::new(env!("CARGO_BIN_EXE_rinhac"))
        .arg(&source)
        .output()
        .expect("failed to invoke rinhac");

    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        output.status.code().unwrap_or(-1),
    )
}

/// Stop at the IR artifact; returns (ll file contents, success, stderr).
fn emit_ir(dir: &Path, document: &str) -> (String, bool, String) {
    let source = dir.join("program.rinha.json");
    std::fs::write(&source, document).expect("failed to write AST document");

    let output = Command::new(env!("CARGO_BIN_EXE_rinhac"))
        .arg("--emit-ir")
        .arg(&source)
        .output()
        .expect("failed to invoke rinhac");

    let ll = std::fs::read_to_string(dir.join("output.ll")).unwrap_or_default();
    (
        ll,
        output.status.success(),
        String::from_utf8_lossy(&output.stderr).to_string(),
    )
}

#[test]
fn emit_ir_writes_the_artifact() {
    let temp_dir = tempfile::tempdir().expect("failed to create temp dir");
    let (ll, ok, stderr) = emit_ir(
        temp_dir.path(),
        r#"{ "expression": { "kind": "Print", "value": { "kind": "Int", "value": 1 } } }"#,
    );
    assert!(ok, "{stderr}");
    assert!(ll.contains("define i32 @main()"), "{ll}");
    assert!(ll.contains("declare i32 @printf(ptr, ...)"), "{ll}");
}

#[test]
fn unbound_name_fails_without_an_artifact() {
    let temp_dir = tempfile::tempdir().expect("failed to create temp dir");
    let (ll, ok, stderr) = emit_ir(
        temp_dir.path(),
        r#"{ "expression": { "kind": "Print", "value": { "kind": "Var", "text": "ghost" } } }"#,
    );
    assert!(!ok);
    assert!(stderr.contains("unbound name"), "{stderr}");
    assert!(ll.is_empty(), "no IR may be written for a failed module: {ll}");
}

#[test]
fn missing_root_expression_is_rejected() {
    let temp_dir = tempfile::tempdir().expect("failed to create temp dir");
    let (_, ok, stderr) = emit_ir(temp_dir.path(), r#"{ "name": "empty.rinha" }"#);
    assert!(!ok);
    assert!(stderr.contains("malformed input"), "{stderr}");
}

#[test]
fn prints_an_integer() {
    if !toolchain_available() {
        eprintln!("skipping: llc/clang not on PATH");
        return;
    }
    let (stdout, code) = compile_and_run(
        r#"{ "expression": { "kind": "Print", "value": { "kind": "Int", "value": 42 } } }"#,
    );
    assert_eq!(stdout, "42\n");
    assert_eq!(code, 0);
}

#[test]
fn prints_a_string() {
    if !toolchain_available() {
        eprintln!("skipping: llc/clang not on PATH");
        return;
    }
    let (stdout, code) = compile_and_run(
        r#"{ "expression": { "kind": "Print", "value": { "kind": "Str", "value": "hello world" } } }"#,
    );
    assert_eq!(stdout, "hello world\n");
    assert_eq!(code, 0);
}

#[test]
fn print_chain_runs_in_source_order() {
    if !toolchain_available() {
        eprintln!("skipping: llc/clang not on PATH");
        return;
    }
    let (stdout, code) = compile_and_run(
        r#"{
            "expression": {
                "kind": "Let",
                "name": { "text": "_" },
                "value": { "kind": "Print", "value": { "kind": "Int", "value": 1 } },
                "next": {
                    "kind": "Let",
                    "name": { "text": "_" },
                    "value": { "kind": "Print", "value": { "kind": "Int", "value": 2 } },
                    "next": { "kind": "Print", "value": { "kind": "Int", "value": 3 } }
                }
            }
        }"#,
    );
    assert_eq!(stdout, "1\n2\n3\n");
    assert_eq!(code, 0);
}

#[test]
fn if_selects_the_live_arm() {
    if !toolchain_available() {
        eprintln!("skipping: llc/clang not on PATH");
        return;
    }
    let document = |op: &str| {
        format!(
            r#"{{
                "expression": {{
                    "kind": "If",
                    "condition": {{
                        "kind": "Binary",
                        "op": "{op}",
                        "lhs": {{ "kind": "Int", "value": 1 }},
                        "rhs": {{ "kind": "Int", "value": 2 }}
                    }},
                    "then": {{ "kind": "Int", "value": 7 }},
                    "otherwise": {{ "kind": "Int", "value": 9 }}
                }}
            }}"#
        )
    };
    // 1 < 2 takes the then arm; 1 > 2 takes the otherwise arm. The selected
    // value is main's return, so it surfaces as the exit code.
    let (_, code) = compile_and_run(&document("Lt"));
    assert_eq!(code, 7);
    let (_, code) = compile_and_run(&document("Gt"));
    assert_eq!(code, 9);
}

#[test]
fn recursive_fib_computes_fib_10() {
    if !toolchain_available() {
        eprintln!("skipping: llc/clang not on PATH");
        return;
    }
    let (stdout, code) = compile_and_run(
        r#"{
            "expression": {
                "kind": "Let",
                "name": { "text": "fib" },
                "value": {
                    "kind": "Function",
                    "parameters": [ { "text": "n" } ],
                    "value": {
                        "kind": "If",
                        "condition": {
                            "kind": "Binary",
                            "op": "Lt",
                            "lhs": { "kind": "Var", "text": "n" },
                            "rhs": { "kind": "Int", "value": 2 }
                        },
                        "then": { "kind": "Var", "text": "n" },
                        "otherwise": {
                            "kind": "Binary",
                            "op": "Add",
                            "lhs": {
                                "kind": "Call",
                                "callee": { "text": "fib" },
                                "arguments": [ {
                                    "kind": "Binary",
                                    "op": "Sub",
                                    "lhs": { "kind": "Var", "text": "n" },
                                    "rhs": { "kind": "Int", "value": 1 }
                                } ]
                            },
                            "rhs": {
                                "kind": "Call",
                                "callee": { "text": "fib" },
                                "arguments": [ {
                                    "kind": "Binary",
                                    "op": "Sub",
                                    "lhs": { "kind": "Var", "text": "n" },
                                    "rhs": { "kind": "Int", "value": 2 }
                                } ]
                            }
                        }
                    }
                },
                "next": {
                    "kind": "Print",
                    "value": {
                        "kind": "Call",
                        "callee": { "text": "fib" },
                        "arguments": [ { "kind": "Int", "value": 10 } ]
                    }
                }
            }
        }"#,
    );
    assert_eq!(stdout, "55\n");
    assert_eq!(code, 0);
}

#[test]
fn batch_mode_survives_a_failing_document() {
    let temp_dir = tempfile::tempdir().expect("failed to create temp dir");
    std::fs::write(
        temp_dir.path().join("a_bad.json"),
        r#"{ "expression": { "kind": "Print", "value": { "kind": "Var", "text": "ghost" } } }"#,
    )
    .unwrap();
    std::fs::write(
        temp_dir.path().join("b_good.json"),
        r#"{ "expression": { "kind": "Print", "value": { "kind": "Int", "value": 5 } } }"#,
    )
    .unwrap();

    // --emit-ir keeps the batch independent of the external toolchain.
    let output = Command::new(env!("CARGO_BIN_EXE_rinhac"))
        .arg("--batch")
        .arg("--emit-ir")
        .arg(temp_dir.path())
        .output()
        .expect("failed to invoke rinhac");

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("a_bad.json"), "{stderr}");
    assert!(stdout.contains("b_good.json"), "{stdout}");
    // Some document failed, so the batch reports failure overall.
    assert!(!output.status.success());
}
