// Integration tests for the rulegraph binary

use anyhow::Result;
use assert_cmd::prelude::*; // Add methods on commands
use predicates::prelude::*; // Used for writing assertions
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::TempDir;

// Helper to create a temporary grammar file
fn create_grammar(dir: &TempDir, filename: &str, content: &str) -> Result<PathBuf> {
    let path = dir.path().join(filename);
    fs::write(&path, content)?;
    Ok(path)
}

const SMALL_GRAMMAR: &str = "grammar Small;\na : 'x' b | 'y' ;\nb : 'z' ;\n";

#[test]
fn test_print_to_stdout() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let grammar = create_grammar(&temp_dir, "Small.g4", SMALL_GRAMMAR)?;

    Command::cargo_bin("rulegraph")?
        .arg(&grammar)
        .args(["--depth", "1", "--stdout"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("digraph Small {"))
        .stdout(predicate::str::contains("    a -> \"'x'\" [style=dashed];\n"))
        .stdout(predicate::str::contains("    \"'x'\" -> b [penwidth=3.0];\n"))
        .stdout(predicate::str::contains("    b -> \"'z'\" [style=dashed];\n"))
        .stdout(predicate::str::contains("    a [fillcolor=\"#aa6666\"];\n}\n"));

    Ok(())
}

#[test]
fn test_depth_zero_stays_in_start_rule() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let grammar = create_grammar(&temp_dir, "Small.g4", SMALL_GRAMMAR)?;

    Command::cargo_bin("rulegraph")?
        .arg(&grammar)
        .args(["-d", "0", "--stdout"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"'x'\" -> b"))
        .stdout(predicate::str::contains("b -> \"'z'\"").not());

    Ok(())
}

#[test]
fn test_write_dot_file() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let out_dir = temp_dir.path().join("dot");

    Command::cargo_bin("rulegraph")?
        .arg("example_data/Expr.g4")
        .args(["--start", "stat", "--out-dir"])
        .arg(&out_dir)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let dot = fs::read_to_string(out_dir.join("Expr_stat.dot"))?;
    assert!(dot.starts_with("digraph Expr {"));
    assert!(dot.contains("    stat -> expr [style=dashed];"));
    assert!(dot.contains("    stat -> ID [style=dashed];"));
    assert!(dot.contains("    expr -> NEWLINE [penwidth=3.0];"));
    assert!(dot.trim_end().ends_with("stat [fillcolor=\"#aa6666\"];\n}"));

    Ok(())
}

#[test]
fn test_default_start_is_first_rule() -> Result<()> {
    let temp_dir = TempDir::new()?;

    Command::cargo_bin("rulegraph")?
        .arg("example_data/Expr.g4")
        .arg("--out-dir")
        .arg(temp_dir.path())
        .assert()
        .success();

    assert!(temp_dir.path().join("Expr_prog.dot").exists());
    Ok(())
}

#[test]
fn test_separators_are_skipped() -> Result<()> {
    Command::cargo_bin("rulegraph")?
        .arg("example_data/Kotlinish.g4")
        .args(["--start", "classDeclaration", "--depth", "0", "--stdout"])
        .assert()
        .success()
        .stdout(predicate::str::contains("    CLASS -> simpleIdentifier [penwidth=3.0];\n"))
        .stdout(predicate::str::contains("    simpleIdentifier -> classBody [penwidth=3.0];\n"))
        .stdout(predicate::str::contains("nls").not());

    Ok(())
}

#[test]
fn test_unknown_start_rule() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let grammar = create_grammar(&temp_dir, "Small.g4", SMALL_GRAMMAR)?;

    Command::cargo_bin("rulegraph")?
        .arg(&grammar)
        .args(["--start", "nowhere", "--stdout"])
        .assert()
        .success()
        .stdout(predicate::str::contains("->").not())
        .stdout(predicate::str::contains("    nowhere [fillcolor=\"#aa6666\"];\n"));

    Ok(())
}

#[test]
fn test_malformed_grammar() -> Result<()> {
    Command::cargo_bin("rulegraph")?
        .arg("example_data/Malformed.g4")
        .arg("--stdout")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Malformed.g4:6:3"))
        .stderr(predicate::str::contains("Unexpected `|`"))
        .stderr(predicate::str::contains("Expected a rule name"));

    Ok(())
}

#[test]
fn test_missing_grammar_file() -> Result<()> {
    Command::cargo_bin("rulegraph")?
        .arg("example_data/does_not_exist.g4")
        .assert()
        .failure()
        .stderr(predicate::str::contains("File error"));

    Ok(())
}
