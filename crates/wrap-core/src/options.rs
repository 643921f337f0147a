//! Configuration options for the wrap engine.

use std::collections::BTreeSet;

/// End-of-line policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Eol {
    /// Infer from the first input line (`\r\n` locks Windows mode).
    #[default]
    Input,
    /// Always emit `\n`.
    Unix,
    /// Always emit `\r\n`.
    Windows,
}

/// How many consecutive newlines are required to delimit a paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NewlinesDelimit {
    /// A single newline delimits a paragraph.
    One,
    /// Two consecutive newlines delimit a paragraph.
    #[default]
    Two,
    /// Newlines never delimit on their own (only other rules do).
    Never,
}

impl NewlinesDelimit {
    /// The threshold `consec_newlines` must reach to delimit, or `None` if
    /// newlines never delimit by themselves.
    pub fn threshold(self) -> Option<u32> {
        match self {
            NewlinesDelimit::One => Some(1),
            NewlinesDelimit::Two => Some(2),
            NewlinesDelimit::Never => None,
        }
    }
}

/// The indentation to apply to the next non-whitespace byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Indent {
    /// No indentation.
    #[default]
    None,
    /// First-line (lead) indentation.
    Line,
    /// Continuation-line (hang) indentation.
    Hang,
}

/// Tri-state for the trailing-hyphen rejoin heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HyphenState {
    /// No hyphen in play.
    #[default]
    No,
    /// A hyphen was seen; rejoin is still possible.
    Maybe,
    /// The hyphen is confirmed as a wrap point.
    Yes,
}

/// A tab/space lead, used for the prototype lead, the hang indent, and the
/// mirrored indent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TabSpaces {
    /// Number of leading tab characters.
    pub tabs: usize,
    /// Number of leading space characters, after the tabs.
    pub spaces: usize,
}

impl TabSpaces {
    /// Build a lead from a tab count and a space count.
    pub fn new(tabs: usize, spaces: usize) -> Self {
        Self { tabs, spaces }
    }

    /// Render this lead as a literal string.
    pub fn render(self) -> String {
        let mut s = String::with_capacity(self.tabs + self.spaces);
        for _ in 0..self.tabs {
            s.push('\t');
        }
        for _ in 0..self.spaces {
            s.push(' ');
        }
        s
    }

    /// Display width of this lead (tabs count as `tab_width` columns).
    pub fn width(self, tab_width: usize) -> usize {
        self.tabs * tab_width + self.spaces
    }
}

/// Immutable configuration for a single wrap run, built once from parsed
/// CLI options and/or a config-file alias before the engine starts.
#[derive(Debug, Clone)]
pub struct Options {
    // Widths
    /// Maximum output line width, in columns.
    pub line_width: usize,
    /// Columns a tab stop covers for width accounting.
    pub tab_spaces: usize,
    /// Spaces inserted after an end-of-sentence punctuation mark.
    pub eos_spaces: usize,

    // Indentation
    /// First-line (lead) indentation.
    pub indent: TabSpaces,
    /// Continuation-line indentation.
    pub hang: TabSpaces,
    /// Leading whitespace prepended to every output line.
    pub lead: TabSpaces,
    /// Mirror the first line's leading tabs as the lead for every line.
    pub mirror_tabs: bool,
    /// Mirror the first line's leading spaces as the lead for every line.
    pub mirror_spaces: bool,

    // Delimiters
    /// Characters that delimit a paragraph wherever they appear.
    pub para_chars: BTreeSet<char>,
    /// Characters that delimit a paragraph only at the start of a line.
    pub lead_para_chars: BTreeSet<char>,
    /// How many consecutive newlines delimit a paragraph.
    pub newlines_delimit: NewlinesDelimit,
    /// Delimit a paragraph at the first whitespace after an end-of-sentence mark.
    pub eos_delimit: bool,
    /// Delimit a paragraph when a line starts with whitespace.
    pub lead_ws_delimit: bool,
    /// Treat a leading `.` as ending the paragraph and pass the rest of the line through.
    pub lead_dot_ignore: bool,

    // Policy
    /// Treat the first line of a paragraph as a title line.
    pub title_line: bool,
    /// Capture the first line's leading whitespace as a literal lead.
    pub prototype: bool,
    /// Enable the Markdown-aware block classifier.
    pub markdown: bool,
    /// Treat doxygen comment markers as part of the prototype lead.
    pub doxygen: bool,
    /// Disable the trailing-hyphen rejoin heuristic.
    pub no_hyphen: bool,
    /// Recognize the wrapc in-band control protocol on input.
    pub data_link_esc: bool,
    /// End-of-line policy.
    pub eol: Eol,

    // Strings
    /// A literal string used as the lead instead of captured whitespace.
    pub lead_string: Option<String>,
    /// A regex that, matched against a raw line, forces a paragraph break.
    pub block_regex: Option<String>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            line_width: 80,
            tab_spaces: 8,
            eos_spaces: 2,
            indent: TabSpaces::default(),
            hang: TabSpaces::default(),
            lead: TabSpaces::default(),
            mirror_tabs: false,
            mirror_spaces: false,
            para_chars: BTreeSet::new(),
            lead_para_chars: BTreeSet::new(),
            newlines_delimit: NewlinesDelimit::default(),
            eos_delimit: false,
            lead_ws_delimit: false,
            lead_dot_ignore: false,
            title_line: false,
            prototype: false,
            markdown: false,
            doxygen: false,
            no_hyphen: false,
            data_link_esc: false,
            eol: Eol::default(),
            lead_string: None,
            block_regex: None,
        }
    }
}

impl Options {
    /// Validate option combinations that can only be checked once all
    /// fields are known. Returns a human-readable message on failure; the
    /// caller maps this to a `USAGE` exit.
    pub fn validate(&self) -> Result<(), String> {
        if self.line_width == 0 {
            return Err("line width must be at least 1".to_string());
        }
        if self.eos_spaces > self.line_width {
            return Err("eos-spaces cannot exceed line width".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_are_valid() {
        assert!(Options::default().validate().is_ok());
    }

    #[test]
    fn zero_width_is_rejected() {
        let opts = Options {
            line_width: 0,
            ..Default::default()
        };
        assert!(opts.validate().is_err());
    }

    #[test]
    fn tab_spaces_render_tabs_then_spaces() {
        let lead = TabSpaces::new(1, 2);
        assert_eq!(lead.render(), "\t  ");
        assert_eq!(lead.width(8), 10);
    }
}
