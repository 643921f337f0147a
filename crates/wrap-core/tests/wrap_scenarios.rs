//! End-to-end scenarios straight from the worked examples: each checks the
//! whole `wrap` pipeline (decode, fill, re-encode) against a known output.

use wrap_core::options::Options;
use wrap_core::wrap_str;

fn opts(line_width: usize) -> Options {
    Options { line_width, ..Default::default() }
}

#[test]
fn basic_fill() {
    let out = wrap_str(&opts(5), "a b c d e f g\n").unwrap();
    assert_eq!(out, "a b c\nd e f\ng\n");
}

#[test]
fn end_of_sentence_spacing() {
    let opts = Options { eos_spaces: 2, line_width: 80, ..Default::default() };
    let out = wrap_str(&opts, "Hi.\nBye.\n").unwrap();
    assert_eq!(out, "Hi.  Bye.\n");
}

#[test]
fn hyphen_rejoin_keeps_the_hyphen() {
    let out = wrap_str(&opts(80), "non-\nwhitespace\n").unwrap();
    assert_eq!(out, "non-whitespace\n");
}

#[test]
fn no_hyphen_disables_the_rejoin() {
    let opts = Options { line_width: 80, no_hyphen: true, ..Default::default() };
    let out = wrap_str(&opts, "non-\nwhitespace\n").unwrap();
    assert_eq!(out, "non- whitespace\n");
}

#[test]
fn uri_is_not_split_at_internal_hyphens() {
    let out = wrap_str(&opts(20), "see http://a-b.example/x-y for details\n").unwrap();
    assert!(
        out.contains("http://a-b.example/x-y"),
        "URI must survive intact, got: {out:?}"
    );
}

#[test]
fn markdown_list_gets_hang_indent_on_continuation_lines() {
    let opts = Options { markdown: true, line_width: 10, ..Default::default() };
    let out = wrap_str(&opts, "- one two three\n- four five six\n").unwrap();
    let lines: Vec<&str> = out.lines().collect();
    assert!(lines.iter().any(|l| l.starts_with("- one")));
    assert!(lines.iter().any(|l| l.starts_with("  two") || l.starts_with("  three")));
    assert!(lines.iter().any(|l| l.starts_with("- four")));
}

#[test]
fn long_unbreakable_word_passes_through_one_line_at_a_time() {
    let out = wrap_str(&opts(5), "supercalifragilisticexpialidocious\n").unwrap();
    assert_eq!(out, "supercalifragilisticexpialidocious\n");
}
