//! End-to-end tests for the `wrapc` binary: reflow comment prose, leave
//! code untouched (spec §4.4).

use assert_cmd::Command;

#[test]
fn reflows_a_c_line_comment_and_leaves_code_alone() {
    let input = "// one two three four five six seven\nint x = 1;\n";
    let assert = Command::cargo_bin("wrapc")
        .unwrap()
        .args(["--width", "20"])
        .write_stdin(input)
        .assert()
        .success();
    let out = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert!(out.lines().all(|l| !l.starts_with("//") || l.len() <= 20));
    assert!(out.contains("int x = 1;"));
}

#[test]
fn block_comment_reflows_body_and_keeps_open_and_close_markers() {
    let input = "/*\n * one two three four five six seven eight\n */\n";
    let assert = Command::cargo_bin("wrapc")
        .unwrap()
        .args(["--width", "20"])
        .write_stdin(input)
        .assert()
        .success();
    let out = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert!(out.starts_with("/*\n"));
    assert!(out.trim_end().ends_with(" */"));
    assert!(out.lines().all(|l| l.chars().count() <= 20));
}

#[test]
fn plain_code_with_no_comment_chars_is_reflowed_as_prose() {
    // With no comment character on the first line, the reader never
    // leaves pass-through mode (spec §4.4.1): the whole file is ordinary
    // text to `wrap`, not source code to preserve untouched.
    let input = "fn main() {\n    println!(\"hi\");\n}\n";
    let assert = Command::cargo_bin("wrapc")
        .unwrap()
        .write_stdin(input)
        .assert()
        .success();
    let out = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert_eq!(out, "fn main() { println!(\"hi\"); }\n");
}
