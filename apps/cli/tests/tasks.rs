use std::error::Error;
use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn tasks_lists_rows_for_files_and_directories() -> Result<(), Box<dyn Error>> {
    let workspace = tempdir()?;
    let src = workspace.path().join("src");
    fs::create_dir_all(&src)?;
    fs::write(src.join("a.rs"), "fn a() {}\n// TODO: finish a\n")?;
    fs::write(src.join("b.rs"), "// FIXME b is broken\n// HACK around it\n")?;
    let loose = workspace.path().join("notes.txt");
    fs::write(&loose, "nothing here\n")?;

    let output = cli()?
        .args([src.to_str().unwrap(), loose.to_str().unwrap()])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let stdout = String::from_utf8(output)?;
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].ends_with("a.rs:2: TODO: finish a"));
    assert!(lines[1].ends_with("b.rs:1: FIXME b is broken"));
    assert!(lines[2].ends_with("b.rs:2: HACK around it"));
    Ok(())
}

#[test]
fn tasks_honours_identifier_override_and_json() -> Result<(), Box<dyn Error>> {
    let workspace = tempdir()?;
    let file = workspace.path().join("main.rs");
    fs::write(&file, "// TODO skipped\n// XXX picked\n")?;

    let output = cli()?
        .args(["--json", "--identifiers", "XXX", file.to_str().unwrap()])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let rows: serde_json::Value = serde_json::from_slice(&output)?;
    let rows = rows.as_array().expect("array output");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["line"], 2);
    assert_eq!(rows[0]["message"], "XXX picked");
    Ok(())
}

#[test]
fn tasks_reads_identifiers_from_config() -> Result<(), Box<dyn Error>> {
    let workspace = tempdir()?;
    let config = workspace.path().join("preferences.json");
    fs::write(&config, r#"{ "tasks": { "identifiers": ["NOTE"] } }"#)?;
    let file = workspace.path().join("doc.txt");
    fs::write(&file, "TODO no\nNOTE yes\n")?;

    Command::cargo_bin("rtext-cli")?
        .args([
            "--config",
            config.to_str().unwrap(),
            "tasks",
            file.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("doc.txt:2: NOTE yes"))
        .stdout(predicate::str::contains("TODO no").not());
    Ok(())
}

#[test]
fn tasks_skips_binary_files() -> Result<(), Box<dyn Error>> {
    let workspace = tempdir()?;
    fs::write(workspace.path().join("blob.bin"), b"TODO\0\x01\x02")?;

    cli()?
        .arg(workspace.path().to_str().unwrap())
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
    Ok(())
}

#[test]
fn tasks_fails_for_missing_paths() -> Result<(), Box<dyn Error>> {
    let workspace = tempdir()?;
    let missing = workspace.path().join("missing.rs");

    cli()?
        .arg(missing.to_str().unwrap())
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
    Ok(())
}

fn cli() -> Result<Command, Box<dyn Error>> {
    let mut cmd = Command::cargo_bin("rtext-cli")?;
    cmd.env_remove("RUST_LOG").arg("tasks");
    Ok(cmd)
}
