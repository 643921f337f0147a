//! The URI/email no-wrap regex (§4.3.3) and helpers for matching the
//! configurable `block_regex` against a raw line.

use once_cell::sync::Lazy;
use regex::Regex;

/// A single compiled disjunction of a loose RFC-5322-ish email address,
/// `file:`, `ftp://`, and `http(s)://` URIs.
static URI_OR_EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?x)
        (?P<email> [[:alnum:]._%+-]+ @ [[:alnum:].-]+ \.[[:alpha:]]{2,} )
        |
        (?P<uri> (?:file:|ftp://|https?://) [^\s<>\x22]+ )
        ",
    )
    .expect("static no-wrap regex must compile")
});

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Find all non-overlapping URI/email matches in `line` that pass the
/// word-boundary guard: a match is accepted only if the byte immediately
/// before it is not a word character.
pub fn no_wrap_ranges(line: &str) -> Vec<(usize, usize)> {
    let bytes = line.as_bytes();
    URI_OR_EMAIL_RE
        .find_iter(line)
        .filter(|m| {
            let start = m.start();
            start == 0 || !is_word_byte(bytes[start - 1])
        })
        .map(|m| (m.start(), m.end()))
        .collect()
}

/// Compile a user-supplied `block_regex` pattern, mapping failure to the
/// crate's `Error::Regex` variant (a `SOFTWARE` exit per spec §4.3.5).
pub fn compile_block_regex(pattern: &str) -> crate::error::Result<Regex> {
    Ok(Regex::new(pattern)?)
}

/// Translate a simple shell glob (`*`, `?`, `[...]`, literal `.`) into an
/// anchored regex, for the filename-pattern matcher (spec §6, SPEC_FULL §2.3).
pub fn glob_to_regex(glob: &str) -> crate::error::Result<Regex> {
    let mut pattern = String::with_capacity(glob.len() * 2 + 2);
    pattern.push('^');
    let mut chars = glob.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' => pattern.push_str(".*"),
            '?' => pattern.push('.'),
            '[' => {
                pattern.push('[');
                if chars.peek() == Some(&'!') {
                    chars.next();
                    pattern.push('^');
                }
                for c2 in chars.by_ref() {
                    pattern.push(c2);
                    if c2 == ']' {
                        break;
                    }
                }
            }
            _ => pattern.push_str(&regex::escape(&c.to_string())),
        }
    }
    pattern.push('$');
    Ok(Regex::new(&pattern)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_http_uri() {
        let ranges = no_wrap_ranges("see http://a-b.example/x-y for details");
        assert_eq!(ranges.len(), 1);
        let (lo, hi) = ranges[0];
        assert_eq!(&"see http://a-b.example/x-y for details"[lo..hi], "http://a-b.example/x-y");
    }

    #[test]
    fn finds_email() {
        let ranges = no_wrap_ranges("contact me at a.b@example.com please");
        assert_eq!(ranges.len(), 1);
    }

    #[test]
    fn word_boundary_guard_rejects_mid_word_match() {
        // "xhttp://..." should not match because 'x' precedes it as a word char.
        let ranges = no_wrap_ranges("xhttp://example.com");
        assert!(ranges.is_empty());
    }

    #[test]
    fn glob_translates_star_and_question() {
        let re = glob_to_regex("*.rs").unwrap();
        assert!(re.is_match("main.rs"));
        assert!(!re.is_match("main.rsx"));

        let re2 = glob_to_regex("file?.txt").unwrap();
        assert!(re2.is_match("file1.txt"));
        assert!(!re2.is_match("file12.txt"));
    }
}
