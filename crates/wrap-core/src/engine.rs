//! The core wrap state machine (spec §4.3): folds an input stream into
//! reformatted paragraphs, one codepoint at a time.

use std::io::{self, BufRead, Read, Write};

use regex::Regex;

use crate::error::{Error, Result};
use crate::markdown::{LineType, MarkdownClassifier};
use crate::options::{Eol, HyphenState, Indent, Options, TabSpaces};
use crate::regexes;
use crate::unicode::{self, Codepoint};
use crate::wrapc::protocol::{ControlCode, DLE};

/// The wrap state machine. Owns exactly one paragraph's worth of
/// in-progress output at a time; `process_line` and `finish` are the only
/// entry points that touch a writer.
pub struct Engine {
    opts: Options,
    classifier: Option<MarkdownClassifier>,
    block_regex: Option<Regex>,

    eol: Eol,
    eol_locked: bool,

    first_line: bool,
    line_prefix: Vec<u8>,
    line_prefix_width: usize,
    /// Columns reserved for a comment leader maintained by `NEW_LEADER`
    /// control messages (spec §4.4.2). Unlike `line_prefix`, this never
    /// gets written to `out` here — the framer downstream re-prepends the
    /// leader text itself, so double-prefixing would result.
    dle_leader_width: usize,

    md_line_width_override: Option<usize>,
    md_lead: Option<TabSpaces>,
    md_hang: Option<TabSpaces>,
    md_sequence_number: u32,

    consec_newlines: u32,
    encountered_nonws: bool,
    hyphen: HyphenState,
    indent: Indent,
    is_long_line: bool,
    next_line_is_title: bool,
    put_spaces: usize,
    was_eos: bool,
    at_line_start: bool,
    cp_prev: Option<char>,

    output: Vec<u8>,
    output_width: usize,
    wrap_pos: Option<usize>,

    no_wrap_ranges: Vec<(usize, usize)>,
    byte_pos: usize,

    suppress_leader: bool,
    copy_through: bool,
}

impl Engine {
    /// Build a fresh engine. Compiles `block_regex` up front so a bad
    /// pattern is reported before any input is consumed.
    pub fn new(opts: &Options) -> Result<Self> {
        opts.validate().map_err(Error::Usage)?;
        let block_regex = match &opts.block_regex {
            Some(pattern) => Some(regexes::compile_block_regex(pattern)?),
            None => None,
        };
        let classifier = opts.markdown.then(MarkdownClassifier::new);

        Ok(Self {
            opts: opts.clone(),
            classifier,
            block_regex,
            eol: opts.eol,
            eol_locked: !matches!(opts.eol, Eol::Input),
            first_line: true,
            line_prefix: Vec::new(),
            line_prefix_width: 0,
            dle_leader_width: 0,
            md_line_width_override: None,
            md_lead: None,
            md_hang: None,
            md_sequence_number: 0,
            consec_newlines: 0,
            encountered_nonws: false,
            hyphen: HyphenState::No,
            indent: Indent::Line,
            is_long_line: false,
            next_line_is_title: false,
            put_spaces: 0,
            was_eos: false,
            at_line_start: true,
            cp_prev: None,
            output: Vec::new(),
            output_width: 0,
            wrap_pos: None,
            no_wrap_ranges: Vec::new(),
            byte_pos: 0,
            suppress_leader: false,
            copy_through: false,
        })
    }

    fn eol_bytes(&self) -> &'static [u8] {
        match self.eol {
            Eol::Windows => b"\r\n",
            _ => b"\n",
        }
    }

    fn effective_line_width(&self) -> usize {
        let base = self.md_line_width_override.unwrap_or(self.opts.line_width);
        base.saturating_sub(self.line_prefix_width).saturating_sub(self.dle_leader_width).max(1)
    }

    fn lead_for(&self, indent: Indent) -> TabSpaces {
        match indent {
            Indent::Line => self.md_lead.unwrap_or(self.opts.indent),
            Indent::Hang => self.md_hang.unwrap_or(self.opts.hang),
            Indent::None => TabSpaces::default(),
        }
    }

    /// Write `self.line_prefix` + `self.output` + an EOL (if `with_eol`) to
    /// `out`, then reset the line buffer. If `with_eol` is false, the line
    /// is left unterminated (long-line mode, spec §4.3.2 step 11).
    fn flush_line(&mut self, out: &mut impl Write, with_eol: bool) -> io::Result<()> {
        let had_content = !self.output.is_empty();
        if had_content || with_eol {
            out.write_all(&self.line_prefix)?;
            out.write_all(&self.output)?;
            if with_eol {
                out.write_all(self.eol_bytes())?;
            }
        }
        self.output.clear();
        self.output_width = 0;
        self.wrap_pos = None;
        self.is_long_line = had_content && !with_eol;
        Ok(())
    }

    /// Emit a lead-prefixed blank line (used for the extra blank line
    /// between paragraphs when `consec_newlines` crosses the threshold).
    ///
    /// Spec §8 invariant 2: blank output lines carry the lead with its
    /// trailing whitespace stripped, so `--prototype`/`--mirror-*`/
    /// `--lead-tabs`/`--lead-spaces` runs don't leave trailing whitespace on
    /// otherwise-empty lines.
    fn flush_blank_line(&mut self, out: &mut impl Write) -> io::Result<()> {
        let end = self.line_prefix.iter().rposition(|b| !b.is_ascii_whitespace()).map_or(0, |i| i + 1);
        out.write_all(&self.line_prefix[..end])?;
        out.write_all(self.eol_bytes())
    }

    /// Paragraph delimitation (spec §4.3.2, "Paragraph delimitation").
    fn delimit_paragraph(&mut self, out: &mut impl Write) -> io::Result<()> {
        if self.is_long_line && self.output.is_empty() {
            out.write_all(self.eol_bytes())?;
            self.is_long_line = false;
        } else if !self.output.is_empty() {
            self.flush_line(out, true)?;
        }

        self.encountered_nonws = false;
        self.hyphen = HyphenState::No;
        self.put_spaces = 0;
        self.was_eos = false;
        self.indent = if self.opts.markdown { Indent::None } else { Indent::Line };

        let extra_blank = self.consec_newlines == 2
            || (self.consec_newlines > 2 && self.opts.newlines_delimit == crate::options::NewlinesDelimit::One);
        if extra_blank {
            self.flush_blank_line(out)?;
        }
        Ok(())
    }

    fn apply_indent_if_pending(&mut self) {
        if self.indent == Indent::None || !self.output.is_empty() {
            return;
        }
        let lead = self.lead_for(self.indent);
        self.output.extend_from_slice(lead.render().as_bytes());
        self.output_width += lead.width(self.opts.tab_spaces);
        self.indent = Indent::None;
    }

    /// The `\n` branch of the per-codepoint step, called once per
    /// terminated input line.
    fn on_newline(&mut self, out: &mut impl Write) -> io::Result<()> {
        self.encountered_nonws = false;
        self.consec_newlines += 1;

        if let Some(threshold) = self.opts.newlines_delimit.threshold() {
            if self.consec_newlines >= threshold {
                if self.opts.title_line {
                    self.next_line_is_title = true;
                }
                self.delimit_paragraph(out)?;
                return Ok(());
            }
        }

        if !self.output.is_empty() && self.next_line_is_title {
            self.next_line_is_title = false;
            self.flush_line(out, true)?;
            self.indent = Indent::Hang;
        } else if self.was_eos {
            if self.opts.eos_delimit {
                self.delimit_paragraph(out)?;
            } else {
                self.put_spaces = self.opts.eos_spaces;
            }
        } else if self.hyphen == HyphenState::Maybe {
            // Swallow the newline: the hyphen may still rejoin.
        } else if !self.output.is_empty() {
            self.put_spaces = self.put_spaces.max(1);
        }
        Ok(())
    }

    fn current_no_wrap(&self) -> bool {
        self.no_wrap_ranges
            .iter()
            .any(|&(lo, hi)| self.byte_pos >= lo && self.byte_pos < hi)
    }

    /// Step 6: leading-of-line punctuation, only consulted when the
    /// previous emitted codepoint was a line break.
    fn handle_line_start_punctuation(&mut self, c: char, raw_line: &str, out: &mut impl Write) -> io::Result<bool> {
        if !self.at_line_start {
            return Ok(false);
        }
        self.at_line_start = false;

        // `lead_para_chars`/`doxygen` (SPEC_FULL.md §3): a line opening with
        // one of these is never rejoined to the preceding paragraph, even
        // though the character itself is still emitted normally afterwards.
        let is_doxygen_tag = self.opts.doxygen && (c == '\\' || c == '@');
        if self.opts.lead_para_chars.contains(&c) || is_doxygen_tag {
            self.delimit_paragraph(out)?;
        }

        if self.opts.lead_dot_ignore && c == '.' {
            return Ok(true);
        }
        if let Some(re) = &self.block_regex {
            if re.is_match(raw_line) {
                if let Some(classifier) = &mut self.classifier {
                    *classifier = MarkdownClassifier::new();
                }
                return Ok(true);
            }
        }
        if self.hyphen == HyphenState::Maybe && !unicode::is_hyphen_adjacent(c) {
            self.hyphen = HyphenState::No;
            self.put_spaces = 1;
        }
        Ok(false)
    }

    fn step(&mut self, cp: Codepoint, raw_line: &str, out: &mut impl Write) -> io::Result<()> {
        let c = match cp {
            Codepoint::Invalid | Codepoint::Eof => return Ok(()),
            Codepoint::Char(c) if c == unicode::BOM => return Ok(()),
            Codepoint::Char(c) => c,
        };
        if c == '\r' {
            return Ok(());
        }
        if c == '\n' {
            return self.on_newline(out);
        }
        self.consec_newlines = 0;

        let no_wrap = self.current_no_wrap();

        if unicode::is_space(c) {
            let delimit = self.is_long_line
                || (self.opts.lead_ws_delimit && self.cp_prev == Some('\n'))
                || (self.opts.eos_delimit && self.was_eos)
                || self.cp_prev.is_some_and(|p| self.opts.para_chars.contains(&p));
            if delimit {
                self.delimit_paragraph(out)?;
            } else if self.hyphen == HyphenState::Maybe && !self.encountered_nonws {
                // Swallow: rejoin after a cross-line hyphen.
            } else if !self.output.is_empty() || self.put_spaces > 0 {
                let bump = if self.was_eos { self.opts.eos_spaces } else { 1 };
                self.put_spaces = self.put_spaces.max(bump);
            }
            self.cp_prev = Some(c);
            return Ok(());
        }

        if unicode::is_control(c) {
            self.cp_prev = Some(c);
            return Ok(());
        }

        if self.handle_line_start_punctuation(c, raw_line, out)? {
            self.cp_prev = Some(c);
            return Ok(());
        }

        self.was_eos = if self.was_eos {
            unicode::is_eos(c) || unicode::is_eos_ext(c)
        } else {
            unicode::is_eos(c)
        };

        if self.put_spaces > 0 && !self.output.is_empty() {
            self.wrap_pos = Some(self.output.len());
            for _ in 0..self.put_spaces {
                self.output.push(b' ');
            }
            self.output_width += self.put_spaces;
        }
        self.put_spaces = 0;

        self.apply_indent_if_pending();

        self.encountered_nonws = true;
        let start = self.output.len();
        let mut buf = [0u8; 4];
        self.output.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
        self.output_width += 1;
        let _ = start;

        if !no_wrap && !self.opts.no_hyphen {
            self.hyphen = match self.hyphen {
                HyphenState::Maybe if unicode::is_hyphen_adjacent(c) => {
                    self.wrap_pos = Some(self.output.len());
                    HyphenState::Yes
                }
                HyphenState::Maybe if unicode::is_hyphen(c) => HyphenState::Maybe,
                HyphenState::Maybe => HyphenState::No,
                HyphenState::No | HyphenState::Yes
                    if unicode::is_hyphen(c) && self.cp_prev.is_some_and(unicode::is_hyphen_adjacent) =>
                {
                    HyphenState::Maybe
                }
                other => other,
            };
        }
        self.cp_prev = Some(c);
        self.at_line_start = false;

        if self.output_width <= self.effective_line_width() {
            return Ok(());
        }

        match self.wrap_pos {
            None => {
                self.flush_line(out, false)?;
            }
            Some(pos) => {
                let saved = self.output.get(pos).copied();
                let tail_start = if saved.is_some_and(|b| unicode::is_space(b as char)) {
                    let mut t = pos + 1;
                    while self.output.get(t).is_some_and(|&b| b == b' ' || b == b'\t') {
                        t += 1;
                    }
                    t
                } else {
                    pos + 1
                };
                let tail = self.output[tail_start..].to_vec();
                self.output.truncate(pos);
                self.flush_line(out, true)?;
                self.indent = Indent::Hang;
                self.apply_indent_if_pending();
                if saved.is_some_and(|b| !unicode::is_space(b as char)) {
                    self.output.push(saved.unwrap());
                    self.output_width += 1;
                }
                self.output.extend_from_slice(&tail);
                self.output_width += tail.len();
            }
        }
        Ok(())
    }

    /// Runs the Markdown classifier for `raw_line`, applying §4.3.4's
    /// effects. Returns `true` if the raw line was flushed verbatim and
    /// should not be fed through the per-codepoint loop.
    fn markdown_pre_line(&mut self, raw_line: &str, out: &mut impl Write) -> io::Result<bool> {
        let Some(classifier) = &mut self.classifier else {
            return Ok(false);
        };
        let state = classifier.classify(raw_line);

        match state.line_type {
            LineType::FencedCode
            | LineType::IndentedCode
            | LineType::AtxHeader
            | LineType::SetextHeader
            | LineType::HorizontalRule
            | LineType::Html
            | LineType::HtmlAbbrevDef
            | LineType::LinkLabelDef
            | LineType::Table => {
                self.flush_line(out, !self.output.is_empty())?;
                out.write_all(&self.line_prefix)?;
                out.write_all(raw_line.as_bytes())?;
                out.write_all(self.eol_bytes())?;
                return Ok(true);
            }
            LineType::FootnoteDef if !state.footnote_has_inline_text => {
                self.flush_line(out, !self.output.is_empty())?;
                out.write_all(&self.line_prefix)?;
                out.write_all(raw_line.as_bytes())?;
                out.write_all(self.eol_bytes())?;
                return Ok(true);
            }
            LineType::DefinitionList | LineType::FootnoteDef | LineType::OrderedList | LineType::UnorderedList => {
                // Every line classified this way starts with a fresh marker
                // (a continuation line classifies as `Text` instead), so it
                // always begins a new rendered item.
                self.md_sequence_number = state.sequence_number;
                self.flush_line(out, !self.output.is_empty())?;
                // The marker text itself (part of `raw_line`) is the
                // visible lead for this line; don't also inject spaces.
                self.indent = Indent::None;
                self.md_line_width_override = Some(self.opts.line_width.saturating_sub(state.left_indent));
                self.md_lead = Some(TabSpaces::new(0, state.left_indent));
                self.md_hang = Some(TabSpaces::new(0, state.hang_indent));
            }
            LineType::Blank | LineType::Text => {
                self.md_line_width_override = None;
                self.md_lead = None;
                self.md_hang = None;
            }
        }
        Ok(false)
    }

    /// Process one input line (its terminator stripped). `had_nl` is
    /// whether the original line ended with `\n` in the input.
    pub fn process_line(&mut self, raw_line: &str, had_nl: bool, out: &mut impl Write) -> io::Result<()> {
        if self.first_line {
            self.capture_prototype(raw_line);
            self.first_line = false;
        }

        // `PREFORMATTED_BEGIN` (spec §4.4.2): pass lines through unwrapped
        // until `PREFORMATTED_END`.
        if self.suppress_leader {
            out.write_all(raw_line.as_bytes())?;
            if had_nl {
                out.write_all(self.eol_bytes())?;
            }
            self.cp_prev = Some('\n');
            self.at_line_start = true;
            return Ok(());
        }

        if self.markdown_pre_line(raw_line, out)? {
            self.at_line_start = true;
            self.cp_prev = Some('\n');
            return Ok(());
        }

        self.no_wrap_ranges = regexes::no_wrap_ranges(raw_line);
        self.byte_pos = 0;
        self.at_line_start = true;

        let bytes = raw_line.as_bytes();
        let mut rest = bytes;
        while !rest.is_empty() {
            let (cp, len) = unicode::decode(rest);
            self.step(cp, raw_line, out)?;
            self.byte_pos += len;
            rest = &rest[len..];
        }
        if had_nl {
            self.step(Codepoint::Char('\n'), raw_line, out)?;
        }
        Ok(())
    }

    fn capture_prototype(&mut self, first_line: &str) {
        if let Some(lead_string) = &self.opts.lead_string {
            let trimmed = lead_string.trim_end();
            self.line_prefix = trimmed.as_bytes().to_vec();
            self.line_prefix_width = trimmed.chars().count();
            return;
        }
        // `mirror_tabs`/`mirror_spaces` (SPEC_FULL.md §3): capture the
        // first line's leading whitespace as the lead, same as `prototype`,
        // but keep only the tab run and/or the space run per which flag is
        // set rather than the whole captured lead.
        if self.opts.mirror_tabs || self.opts.mirror_spaces {
            let leading: String = first_line.chars().take_while(|c| *c == ' ' || *c == '\t').collect();
            let mirrored: String = leading
                .chars()
                .filter(|&c| (c == '\t' && self.opts.mirror_tabs) || (c == ' ' && self.opts.mirror_spaces))
                .collect();
            self.line_prefix_width =
                mirrored.chars().map(|c| if c == '\t' { self.opts.tab_spaces } else { 1 }).sum();
            self.line_prefix = mirrored.into_bytes();
            return;
        }
        if !self.opts.prototype {
            // Third source of the per-line lead (spec §8 invariant 2):
            // `lead_tabs` tabs followed by `lead_spaces` spaces. Defaults to
            // empty, so runs that set none of `lead`/`lead_string`/
            // `prototype`/`mirror_*` see no lead at all.
            self.line_prefix_width = self.opts.lead.width(self.opts.tab_spaces);
            self.line_prefix = self.opts.lead.render().into_bytes();
            return;
        }
        let leading: String = first_line.chars().take_while(|c| *c == ' ' || *c == '\t').collect();
        self.line_prefix_width = leading
            .chars()
            .map(|c| if c == '\t' { self.opts.tab_spaces } else { 1 })
            .sum();
        self.line_prefix = leading.into_bytes();
    }

    /// Flush any buffered output at end of input.
    pub fn finish(&mut self, out: &mut impl Write) -> io::Result<()> {
        if self.is_long_line && self.output.is_empty() {
            out.write_all(self.eol_bytes())?;
        } else if !self.output.is_empty() {
            self.flush_line(out, true)?;
        }
        Ok(())
    }

    /// Handle a wrapc in-band control message (spec §4.4.2). Used by the
    /// wrapc pipeline when `data_link_esc` is enabled. `NEW_LEADER`,
    /// `PREFORMATTED_BEGIN`/`_END` and `WRAP_END` are forwarded onto `out`
    /// so the framer downstream can act on them too.
    pub fn handle_control(&mut self, code: &ControlCode, out: &mut impl Write) -> io::Result<()> {
        match code {
            ControlCode::DelimitParagraph => self.delimit_paragraph(out)?,
            ControlCode::NewLeader { width, .. } => {
                self.finish(out)?;
                Self::forward(code, out)?;
                self.dle_leader_width = *width;
            }
            ControlCode::PreformattedBegin => {
                self.finish(out)?;
                Self::forward(code, out)?;
                self.suppress_leader = true;
            }
            ControlCode::PreformattedEnd => {
                Self::forward(code, out)?;
                self.suppress_leader = false;
            }
            ControlCode::WrapEnd => {
                self.finish(out)?;
                Self::forward(code, out)?;
                self.copy_through = true;
            }
        }
        Ok(())
    }

    fn forward(code: &ControlCode, out: &mut impl Write) -> io::Result<()> {
        let mut buf = Vec::new();
        code.encode(&mut buf);
        out.write_all(&buf)
    }

    /// Is the pipeline past `WRAP_END`, i.e. should remaining bytes be
    /// copied through unchanged?
    pub fn is_copy_through(&self) -> bool {
        self.copy_through
    }
}

/// Run the wrap engine end to end over `input`, writing reformatted
/// output to `output`.
pub fn wrap<R: Read, W: Write>(opts: &Options, input: R, output: W) -> Result<()> {
    let mut reader = io::BufReader::new(input);
    let mut writer = io::BufWriter::new(output);
    let mut engine = Engine::new(opts)?;

    let mut raw = Vec::new();
    loop {
        raw.clear();
        let n = reader.read_until(b'\n', &mut raw).map_err(Error::Io)?;
        if n == 0 {
            break;
        }

        if engine.is_copy_through() {
            writer.write_all(&raw).map_err(Error::Io)?;
            continue;
        }

        // A single `read_until` chunk can hold a run of consecutive
        // zero-payload control messages (each lacking its own `\n`)
        // followed by a `NEW_LEADER` whose payload line supplies the `\n`
        // the reader stopped at, so drain every leading control message
        // before treating what's left as ordinary content.
        let mut chunk: &[u8] = &raw;
        if opts.data_link_esc {
            while chunk.first() == Some(&DLE) && chunk.len() >= 2 {
                let code_byte = chunk[1];
                if code_byte == (ControlCode::NewLeader { width: 0, leader: String::new() }).code_byte() {
                    let after = &chunk[2..];
                    let payload_end = after.iter().position(|&b| b == b'\n').map_or(after.len(), |p| p + 1);
                    let payload_bytes = &after[..payload_end];
                    let payload =
                        String::from_utf8_lossy(payload_bytes.strip_suffix(b"\n").unwrap_or(payload_bytes))
                            .into_owned();
                    if let Some(code) = ControlCode::parse(code_byte, &payload) {
                        engine.handle_control(&code, &mut writer).map_err(Error::Io)?;
                    }
                    chunk = &after[payload_end..];
                } else {
                    if let Some(code) = ControlCode::parse(code_byte, "") {
                        engine.handle_control(&code, &mut writer).map_err(Error::Io)?;
                    }
                    chunk = &chunk[2..];
                    if engine.is_copy_through() {
                        break;
                    }
                }
            }
        }

        if engine.is_copy_through() {
            writer.write_all(chunk).map_err(Error::Io)?;
            continue;
        }
        if chunk.is_empty() {
            continue;
        }

        let mut chunk = chunk.to_vec();
        let had_nl = chunk.last() == Some(&b'\n');
        if had_nl {
            chunk.pop();
        }
        if chunk.last() == Some(&b'\r') {
            chunk.pop();
            if !engine.eol_locked {
                engine.eol = Eol::Windows;
                engine.eol_locked = true;
            }
        } else if !engine.eol_locked {
            engine.eol = Eol::Unix;
            engine.eol_locked = true;
        }
        let line = String::from_utf8_lossy(&chunk).into_owned();
        engine.process_line(&line, had_nl, &mut writer).map_err(Error::Io)?;
    }
    engine.finish(&mut writer).map_err(Error::Io)?;
    writer.flush().map_err(Error::Io)?;
    Ok(())
}

/// Convenience entry point for tests and callers that already hold the
/// whole input in memory.
pub fn wrap_str(opts: &Options, input: &str) -> Result<String> {
    let mut out = Vec::new();
    wrap(opts, input.as_bytes(), &mut out)?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn opts(line_width: usize) -> Options {
        Options { line_width, ..Default::default() }
    }

    #[test]
    fn fills_a_single_paragraph() {
        let text = "one two three four five six seven eight nine ten\n";
        let out = wrap_str(&opts(20), text).unwrap();
        for line in out.lines() {
            assert!(line.chars().count() <= 20, "line too wide: {line:?}");
        }
        assert_eq!(out.split_whitespace().collect::<Vec<_>>(), text.split_whitespace().collect::<Vec<_>>());
    }

    #[test]
    fn blank_line_delimits_paragraphs() {
        let text = "first paragraph here\n\nsecond paragraph here\n";
        let out = wrap_str(&opts(80), text).unwrap();
        let blanks = out.lines().filter(|l| l.is_empty()).count();
        assert_eq!(blanks, 1);
    }

    #[test]
    fn end_of_sentence_gets_double_space() {
        let mut o = opts(80);
        o.eos_spaces = 2;
        let out = wrap_str(&o, "One sentence. Two sentence.\n").unwrap();
        assert!(out.contains("sentence.  Two"));
    }

    #[test]
    fn trailing_hyphen_rejoins_across_a_line_break() {
        let out = wrap_str(&opts(80), "non-\nwhitespace\n").unwrap();
        assert_eq!(out, "non-whitespace\n");
    }

    #[test]
    fn uri_does_not_wrap_at_internal_hyphen() {
        let mut o = opts(80);
        o.line_width = 15;
        let out = wrap_str(&o, "see http://a-b.example/x-y now\n").unwrap();
        assert!(out.contains("http://a-b.example/x-y"), "URI was split: {out:?}");
    }

    #[test]
    fn long_unbreakable_token_emits_without_wrapping() {
        let o = opts(5);
        let out = wrap_str(&o, "supercalifragilisticexpialidocious\n").unwrap();
        assert!(out.contains("supercalifragilisticexpialidocious"));
    }

    #[test]
    fn lead_para_chars_starts_a_new_paragraph_without_a_blank_line() {
        let o = Options { line_width: 80, lead_para_chars: BTreeSet::from(['>']), ..Default::default() };
        let out = wrap_str(&o, "first line\n>quoted line\n").unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines, vec!["first line", ">quoted line"]);
    }

    #[test]
    fn doxygen_tag_starts_a_new_paragraph() {
        let o = Options { line_width: 80, doxygen: true, ..Default::default() };
        let out = wrap_str(&o, "Does a thing.\n\\param x the input\n").unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines, vec!["Does a thing.", "\\param x the input"]);
    }

    #[test]
    fn mirror_tabs_carries_only_the_first_lines_tab_run_as_the_lead() {
        let o = Options { line_width: 80, mirror_tabs: true, ..Default::default() };
        let out = wrap_str(&o, "\t  one two\nthree four\n").unwrap();
        assert!(out.lines().all(|l| l.starts_with('\t') && !l.starts_with("\t ")));
    }

    #[test]
    fn lead_spaces_prefix_every_line_including_across_paragraphs() {
        let o = Options {
            line_width: 80,
            lead: TabSpaces::new(0, 2),
            ..Default::default()
        };
        let out = wrap_str(&o, "first paragraph\n\nsecond paragraph\n").unwrap();
        for line in out.lines().filter(|l| !l.is_empty()) {
            assert!(line.starts_with("  "), "missing lead: {line:?}");
        }
    }

    #[test]
    fn blank_separator_line_has_its_lead_trailing_whitespace_stripped() {
        let o = Options {
            line_width: 80,
            lead: TabSpaces::new(0, 2),
            ..Default::default()
        };
        let out = wrap_str(&o, "first paragraph\n\nsecond paragraph\n").unwrap();
        let blank = out.lines().find(|l| l.trim().is_empty()).expect("no blank separator line found");
        assert_eq!(blank, "", "blank line must not carry trailing lead whitespace: {blank:?}");
    }

    #[test]
    fn indent_spaces_apply_only_to_the_first_line_of_a_paragraph() {
        let o = Options {
            line_width: 15,
            indent: TabSpaces::new(0, 4),
            ..Default::default()
        };
        let out = wrap_str(&o, "one two three four five\n\nsix seven\n").unwrap();
        let lines: Vec<&str> = out.lines().filter(|l| !l.is_empty()).collect();
        assert!(lines[0].starts_with("    one"), "first line of paragraph should be indented: {lines:?}");
        assert!(
            lines.iter().any(|l| !l.starts_with("    ")),
            "no continuation line found unindented: {lines:?}"
        );
        assert!(
            lines.last().unwrap().starts_with("    six"),
            "second paragraph's first line should be indented: {lines:?}"
        );
    }
}
