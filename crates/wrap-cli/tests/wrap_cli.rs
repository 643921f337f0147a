//! End-to-end tests for the `wrap` binary's `-a`/`--alias` and
//! `-c`/`--config` options (SPEC_FULL §2.1/§2.2/§2.3).

use std::io::Write;

use assert_cmd::Command;

fn config_with_narrow_alias() -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[ALIASES]\nnarrow = -w 10 --no-hyphen\n[PATTERNS]\n*.txt = narrow\n").unwrap();
    file
}

#[test]
fn named_alias_supplies_its_argv() {
    let config = config_with_narrow_alias();
    let assert = Command::cargo_bin("wrap")
        .unwrap()
        .args(["--config", config.path().to_str().unwrap(), "--alias", "narrow"])
        .write_stdin("one two three four five\n")
        .assert()
        .success();
    let out = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert!(out.lines().all(|l| l.chars().count() <= 10), "not wrapped to the alias's width: {out:?}");
}

#[test]
fn a_flag_the_user_types_overrides_the_alias() {
    let config = config_with_narrow_alias();
    let assert = Command::cargo_bin("wrap")
        .unwrap()
        .args(["--config", config.path().to_str().unwrap(), "--alias", "narrow", "--width", "80"])
        .write_stdin("one two three four five\n")
        .assert()
        .success();
    let out = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert_eq!(out, "one two three four five\n");
}

#[test]
fn unknown_alias_is_a_usage_error() {
    let config = config_with_narrow_alias();
    Command::cargo_bin("wrap")
        .unwrap()
        .args(["--config", config.path().to_str().unwrap(), "--alias", "bogus"])
        .write_stdin("x\n")
        .assert()
        .failure()
        .code(64);
}

#[test]
fn pattern_section_auto_selects_an_alias_by_input_filename() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("wraprc");
    std::fs::write(&config_path, "[ALIASES]\nnarrow = -w 10\n[PATTERNS]\n*.txt = narrow\n").unwrap();
    let input_path = dir.path().join("prose.txt");
    std::fs::write(&input_path, "one two three four five\n").unwrap();

    let assert = Command::cargo_bin("wrap")
        .unwrap()
        .args(["--config", config_path.to_str().unwrap(), input_path.to_str().unwrap()])
        .assert()
        .success();
    let out = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert!(out.lines().all(|l| l.chars().count() <= 10), "not wrapped to the matched alias's width: {out:?}");
}
