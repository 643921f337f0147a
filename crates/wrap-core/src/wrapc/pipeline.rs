//! `wrapc`'s three-stage pipeline (spec §4.4): a reader that strips comment
//! leaders and emits the in-band control protocol, a child `wrap` process,
//! and a framer that re-prepends the leader on the way to stdout.
//!
//! Spec §4.4.5 describes three `fork`ed processes sharing two pipes. The
//! design note in spec §9 permits an equivalent single-process rendition
//! with cooperating tasks; this crate spawns the real `wrap` binary as a
//! child process (so the reader/framer split still talks to an external
//! `wrap`) and runs the reader and framer as two threads in the parent.

use std::collections::BTreeSet;
use std::io::{BufRead, BufReader, Read, Write};
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Error, Result};
use crate::wrapc::protocol::ControlCode;

/// The leader detected (or carried forward) for the comment currently
/// being wrapped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leader {
    /// The literal leader text, including surrounding whitespace.
    pub text: String,
    /// Whether this leader opens a block comment (nothing but punctuation follows it).
    pub is_block_comment: bool,
}

static LEADING_WS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[ \t]*").unwrap());

/// Two-character comment delimiters with a configured, distinct second
/// character (spec §4.4.1).
const TWO_CHAR_DELIMS: [(char, char); 6] =
    [('/', '*'), ('(', '*'), ('(', ':'), ('{', '-'), ('#', '|'), ('<', '#')];

/// Detect the prototype leader on `first_line` against the configured
/// comment-character set, narrowing that set to the delimiter actually
/// observed (spec §4.4.1).
pub fn detect_leader(first_line: &str, comment_chars: &BTreeSet<char>) -> (Leader, BTreeSet<char>) {
    let ws_len = LEADING_WS_RE.find(first_line).map_or(0, |m| m.end());
    let after_ws = &first_line[ws_len..];

    let Some(first_cc) = after_ws.chars().next().filter(|c| comment_chars.contains(c)) else {
        return (
            Leader { text: first_line[..ws_len].to_string(), is_block_comment: false },
            BTreeSet::new(),
        );
    };

    // `[CC]*`: consume the maximal run of configured comment characters.
    let cc_run_len: usize = after_ws.chars().take_while(|c| comment_chars.contains(c)).map(char::len_utf8).sum();
    let cc_run = &after_ws[..cc_run_len];
    let second_cc = cc_run.chars().nth(1);

    let two_char = second_cc
        .filter(|&second| second != first_cc)
        .filter(|&second| TWO_CHAR_DELIMS.contains(&(first_cc, second)));

    let narrowed = if let Some(second) = two_char {
        let mut set = BTreeSet::from([first_cc, second]);
        if first_cc == '{' {
            set.insert('}');
        }
        set
    } else {
        BTreeSet::from([first_cc])
    };

    let after_cc = &after_ws[cc_run_len..];
    let ws2_len = LEADING_WS_RE.find(after_cc).map_or(0, |m| m.end());
    let leader_len = ws_len + cc_run_len + ws2_len;

    let rest = &after_cc[ws2_len..];
    let is_block_comment = rest.chars().all(|c| !c.is_alphanumeric());

    (Leader { text: first_line[..leader_len].to_string(), is_block_comment }, narrowed)
}

/// Spawn `wrap_bin` as a child with the given argv and run the reader and
/// framer as threads in this process, driving `input` to `output`.
pub fn run<R: Read + Send + 'static, W: Write>(
    wrap_bin: &Path,
    wrap_args: &[String],
    comment_chars: BTreeSet<char>,
    mut input: R,
    mut output: W,
) -> Result<()> {
    let mut child = Command::new(wrap_bin)
        .args(wrap_args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .map_err(Error::Io)?;

    let mut child_stdin = child.stdin.take().expect("piped stdin");
    let child_stdout = child.stdout.take().expect("piped stdout");

    let reader_handle = thread::spawn(move || -> std::io::Result<()> {
        let mut buf = Vec::new();
        input.read_to_end(&mut buf)?;
        let text = String::from_utf8_lossy(&buf).into_owned();
        let mut lines = text.split_inclusive('\n');

        let Some(first) = lines.next() else {
            return Ok(());
        };
        let (mut leader, mut active_chars) = detect_leader(first, &comment_chars);

        if leader.is_block_comment {
            // The open line itself carries no reflowable prose; pass it
            // through unwrapped. The real per-line leader (e.g. " * ") is
            // picked up from the next physical line by the loop below.
            let mut begin = Vec::new();
            ControlCode::PreformattedBegin.encode(&mut begin);
            child_stdin.write_all(&begin)?;
            child_stdin.write_all(first.as_bytes())?;
            let mut end = Vec::new();
            ControlCode::PreformattedEnd.encode(&mut end);
            child_stdin.write_all(&end)?;
        } else {
            let mut msg = Vec::new();
            ControlCode::NewLeader { width: leader.text.chars().count(), leader: leader.text.clone() }
                .encode(&mut msg);
            child_stdin.write_all(&msg)?;
            let stripped = &first[leader.text.len()..];
            child_stdin.write_all(stripped.as_bytes())?;
        }

        for line in lines {
            let trimmed = line.trim_end_matches('\n');
            let ws_len = LEADING_WS_RE.find(trimmed).map_or(0, |m| m.end());
            let has_comment = trimmed[ws_len..].chars().next().is_some_and(|c| active_chars.contains(&c));

            if !has_comment && !active_chars.is_empty() {
                let mut msg = Vec::new();
                ControlCode::WrapEnd.encode(&mut msg);
                child_stdin.write_all(&msg)?;
                child_stdin.write_all(line.as_bytes())?;
                active_chars = BTreeSet::new();
                continue;
            }

            let (new_leader, new_chars) = detect_leader(trimmed, &comment_chars);

            if has_comment && new_leader.is_block_comment {
                // Nothing alphanumeric survives the marker (e.g. the
                // closing `*/`, or a decorative rule): no prose to
                // reflow, so pass the line through unwrapped rather than
                // leaving the leader to cover an empty body.
                let mut begin = Vec::new();
                ControlCode::PreformattedBegin.encode(&mut begin);
                child_stdin.write_all(&begin)?;
                child_stdin.write_all(line.as_bytes())?;
                let mut end = Vec::new();
                ControlCode::PreformattedEnd.encode(&mut end);
                child_stdin.write_all(&end)?;
                continue;
            }

            if has_comment && new_leader.text != leader.text {
                let mut msg = Vec::new();
                ControlCode::NewLeader { width: new_leader.text.chars().count(), leader: new_leader.text.clone() }
                    .encode(&mut msg);
                child_stdin.write_all(&msg)?;
                leader = new_leader;
                active_chars = new_chars;
            }

            let stripped = if has_comment { &trimmed[leader.text.len().min(trimmed.len())..] } else { trimmed };
            child_stdin.write_all(stripped.as_bytes())?;
            child_stdin.write_all(b"\n")?;
        }
        Ok(())
    });

    frame(BufReader::new(child_stdout), &mut output)?;

    reader_handle.join().expect("reader thread panicked").map_err(Error::Io)?;
    let status = child.wait().map_err(Error::Io)?;
    if !status.success() {
        return Err(Error::Software(format!("wrap child exited with {status}")));
    }
    Ok(())
}

/// Consume the `wrap` child's DLE-annotated stdout, re-prepending the
/// current leader onto each payload line, and write the result to `output`
/// (spec §4.4.3).
fn frame<R: BufRead, W: Write>(mut reader: R, mut output: W) -> Result<()> {
    let mut leader_text = String::new();
    let mut copy_through = false;
    let mut suppress_leader = false;
    let mut line = Vec::new();
    loop {
        line.clear();
        let n = reader.read_until(b'\n', &mut line).map_err(Error::Io)?;
        if n == 0 {
            break;
        }

        // See the matching loop in `engine::wrap`: a run of zero-payload
        // control messages can share one `read_until` chunk with a
        // trailing `NEW_LEADER` whose own `\n` is what it stopped at.
        let mut rest: &[u8] = &line;
        while rest.first() == Some(&crate::wrapc::protocol::DLE) && rest.len() >= 2 {
            let code_byte = rest[1];
            if code_byte == (ControlCode::NewLeader { width: 0, leader: String::new() }).code_byte() {
                let after = &rest[2..];
                let payload_end = after.iter().position(|&b| b == b'\n').map_or(after.len(), |p| p + 1);
                let payload_bytes = &after[..payload_end];
                let payload =
                    String::from_utf8_lossy(payload_bytes.strip_suffix(b"\n").unwrap_or(payload_bytes));
                if let Some(ControlCode::NewLeader { leader, .. }) = ControlCode::parse(code_byte, &payload) {
                    leader_text = leader;
                }
                rest = &after[payload_end..];
                continue;
            }
            if code_byte == ControlCode::WrapEnd.code_byte() {
                copy_through = true;
            } else if code_byte == ControlCode::PreformattedBegin.code_byte() {
                suppress_leader = true;
            } else if code_byte == ControlCode::PreformattedEnd.code_byte() {
                suppress_leader = false;
            }
            // `DelimitParagraph` and the codes above carry no payload here.
            rest = &rest[2..];
            if copy_through {
                break;
            }
        }
        if rest.is_empty() {
            continue;
        }

        if copy_through || suppress_leader {
            output.write_all(rest).map_err(Error::Io)?;
        } else if rest == b"\n" {
            // Spec §4.4.3: omit the trailing-whitespace half of the leader
            // on a blank payload line, so e.g. a " * "-led block comment's
            // blank line comes out as " *" rather than " * " or "".
            output.write_all(leader_text.trim_end_matches([' ', '\t']).as_bytes()).map_err(Error::Io)?;
            output.write_all(rest).map_err(Error::Io)?;
        } else {
            output.write_all(leader_text.as_bytes()).map_err(Error::Io)?;
            output.write_all(rest).map_err(Error::Io)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_line_comment_leader() {
        let chars = BTreeSet::from(['/', '#']);
        let (leader, narrowed) = detect_leader("  // a comment", &chars);
        assert_eq!(leader.text, "  // ");
        assert!(!leader.is_block_comment);
        assert_eq!(narrowed, BTreeSet::from(['/']));
    }

    #[test]
    fn detects_block_comment_open() {
        let chars = BTreeSet::from(['/', '*']);
        let (leader, _) = detect_leader("/*", &chars);
        assert!(leader.is_block_comment);
    }

    #[test]
    fn no_comment_char_falls_back_to_whitespace_leader() {
        let chars = BTreeSet::from(['/']);
        let (leader, narrowed) = detect_leader("    plain text", &chars);
        assert_eq!(leader.text, "    ");
        assert!(narrowed.is_empty());
    }

    #[test]
    fn frame_prepends_only_the_non_whitespace_half_of_the_leader_on_a_blank_payload_line() {
        let mut msg = Vec::new();
        ControlCode::NewLeader { width: 3, leader: " * ".to_string() }.encode(&mut msg);
        msg.extend_from_slice(b"one two\n");
        msg.extend_from_slice(b"\n");
        msg.extend_from_slice(b"three four\n");

        let mut out = Vec::new();
        frame(msg.as_slice(), &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();

        assert_eq!(out, " * one two\n *\n * three four\n");
    }
}
