//! Markdown block-level line classifier.
//!
//! This is *not* a Markdown renderer: it classifies one line at a time well
//! enough for the wrap engine to decide when to pass a line through
//! verbatim versus fold it into a wrapped paragraph, and to compute the
//! hang indent for list/definition continuations. No span-level (inline)
//! parsing is performed.

use once_cell::sync::Lazy;
use regex::Regex;

/// Markdown's tab model is 4 columns, independent of the host's
/// `tab_spaces` option.
const MARKDOWN_TAB_WIDTH: usize = 4;

/// The block-level classification of one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineType {
    /// `# ...` through `###### ...`.
    AtxHeader,
    /// A `===`/`---` underline following a text line.
    SetextHeader,
    /// `***`, `---`, `___` (three or more, optionally space-separated).
    HorizontalRule,
    /// Inside (or opening/closing) a ` ``` `/`~~~` fenced code block.
    FencedCode,
    /// A line indented >= 4 Markdown columns outside any fence or list.
    IndentedCode,
    /// An HTML block line (starts with `<tag`, `</tag`, `<!--`, `<!`).
    Html,
    /// `*[abbr]: definition`.
    HtmlAbbrevDef,
    /// `[id]: URI`.
    LinkLabelDef,
    /// `[^id]: ...`.
    FootnoteDef,
    /// `1.` / `1)` list items.
    OrderedList,
    /// `*` / `+` / `-` list items.
    UnorderedList,
    /// `: definition` lines.
    DefinitionList,
    /// A line containing `|`.
    Table,
    /// A blank line.
    Blank,
    /// Ordinary prose.
    Text,
}

/// The state record the classifier returns for each line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineState {
    /// The kind of line this is.
    pub line_type: LineType,
    /// Bumped each time a list/definition/footnote item starts a new entry.
    pub sequence_number: u32,
    /// List nesting depth at this line, 0 outside any list.
    pub nesting_depth: u32,
    /// Effective first-line indent (columns) for this block.
    pub left_indent: usize,
    /// Effective continuation-line indent (columns) for this block.
    pub hang_indent: usize,
    /// The ordered-list marker punctuation (`.` or `)`), if applicable.
    pub ordered_list_marker_char: Option<char>,
    /// The ordered-list item number, if applicable.
    pub ordered_list_number: Option<u64>,
    /// Whether a footnote definition line carries inline text after its label.
    pub footnote_has_inline_text: bool,
}

impl LineState {
    fn plain(line_type: LineType) -> Self {
        Self {
            line_type,
            sequence_number: 0,
            nesting_depth: 0,
            left_indent: 0,
            hang_indent: 0,
            ordered_list_marker_char: None,
            ordered_list_number: None,
            footnote_has_inline_text: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Ordered,
    Unordered,
}

#[derive(Debug, Clone, Copy)]
struct ListFrame {
    kind: ListKind,
    marker_char: Option<char>,
    marker_col: usize,
    content_col: usize,
    hang_col: usize,
}

static ATX_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(#{1,6})(\s+.*)?$").unwrap());
static HR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:-(?: *-){2,}|\*(?: *\*){2,}|_(?: *_){2,}) *$").unwrap());
static ORDERED_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)([.)])(\s+|$)").unwrap());
static UNORDERED_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([*+-])(\s+)").unwrap());
static HTML_ABBREV_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\*\[[^\]]+\]:").unwrap());
static FOOTNOTE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\[\^[^\]]+\]:(.*)$").unwrap());
static LINK_LABEL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\[[^\]\^]+\]:\s*\S").unwrap());
static DEFN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^:\s+\S").unwrap());
static FENCE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(`{3,}|~{3,})").unwrap());
static HTML_BLOCK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^</?[A-Za-z!][^>]*>?").unwrap());

fn leading_indent_cols(line: &str) -> (usize, &str) {
    let mut cols = 0usize;
    let mut idx = 0usize;
    for c in line.chars() {
        match c {
            ' ' => cols += 1,
            '\t' => cols += MARKDOWN_TAB_WIDTH - (cols % MARKDOWN_TAB_WIDTH),
            _ => break,
        }
        idx += c.len_utf8();
    }
    (cols, &line[idx..])
}

/// Stateful single-pass block classifier. Call [`classify`](Self::classify)
/// once per input line, in order.
#[derive(Debug, Default)]
pub struct MarkdownClassifier {
    fence: Option<(char, usize)>,
    list_stack: Vec<ListFrame>,
    sequence_number: u32,
    prev_was_text: bool,
}

impl MarkdownClassifier {
    /// Create a fresh classifier with no fence or list context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify one line. `line` must not include its line terminator.
    pub fn classify(&mut self, line: &str) -> LineState {
        let (indent_cols, trimmed) = leading_indent_cols(line);

        if let Some((fence_char, fence_len)) = self.fence {
            let mut state = LineState::plain(LineType::FencedCode);
            if !trimmed.is_empty()
                && trimmed.chars().all(|c| c == fence_char)
                && trimmed.chars().count() >= fence_len
            {
                self.fence = None;
            }
            state.nesting_depth = self.list_stack.len() as u32;
            self.prev_was_text = false;
            return state;
        }

        if trimmed.is_empty() {
            self.prev_was_text = false;
            let mut state = LineState::plain(LineType::Blank);
            state.nesting_depth = self.list_stack.len() as u32;
            return state;
        }

        // Dedent: pop any list frames nested deeper than this line's indent.
        while let Some(top) = self.list_stack.last() {
            if indent_cols < top.marker_col {
                self.list_stack.pop();
            } else {
                break;
            }
        }

        if let Some(caps) = FENCE_RE.captures(trimmed) {
            let fence_str = caps.get(1).unwrap().as_str();
            self.fence = Some((fence_str.chars().next().unwrap(), fence_str.len()));
            self.prev_was_text = false;
            let mut state = LineState::plain(LineType::FencedCode);
            state.nesting_depth = self.list_stack.len() as u32;
            return state;
        }

        if HR_RE.is_match(trimmed) && !trimmed.starts_with('=') {
            // `---`/`***`/`___` runs. A lone `-`/`_` run right after a text
            // line is ambiguous with a Setext H2 underline; prefer Setext.
            if trimmed.starts_with('-') && self.prev_was_text {
                self.prev_was_text = false;
                return LineState::plain(LineType::SetextHeader);
            }
            self.prev_was_text = false;
            return LineState::plain(LineType::HorizontalRule);
        }

        if trimmed.chars().all(|c| c == '=') && !trimmed.is_empty() && self.prev_was_text {
            self.prev_was_text = false;
            return LineState::plain(LineType::SetextHeader);
        }

        if ATX_RE.is_match(trimmed) {
            self.prev_was_text = false;
            return LineState::plain(LineType::AtxHeader);
        }

        if HTML_ABBREV_RE.is_match(trimmed) {
            self.prev_was_text = false;
            return LineState::plain(LineType::HtmlAbbrevDef);
        }

        if let Some(caps) = FOOTNOTE_RE.captures(trimmed) {
            self.prev_was_text = false;
            let mut state = LineState::plain(LineType::FootnoteDef);
            state.footnote_has_inline_text = caps
                .get(1)
                .map(|m| !m.as_str().trim().is_empty())
                .unwrap_or(false);
            return state;
        }

        if LINK_LABEL_RE.is_match(trimmed) {
            self.prev_was_text = false;
            return LineState::plain(LineType::LinkLabelDef);
        }

        if HTML_BLOCK_RE.is_match(trimmed) {
            self.prev_was_text = false;
            return LineState::plain(LineType::Html);
        }

        if let Some(caps) = ORDERED_RE.captures(trimmed) {
            let marker_char = caps.get(2).unwrap().as_str().chars().next();
            let number: Option<u64> = caps.get(1).unwrap().as_str().parse().ok();
            let marker_width = caps.get(0).unwrap().as_str().trim_end().len().max(2) + 1;
            let content_col = indent_cols + marker_width;

            let same_level = self.list_stack.last().filter(|top| top.marker_col == indent_cols);
            let bumped = match same_level {
                Some(top) => top.kind != ListKind::Ordered || top.marker_char != marker_char,
                None => true,
            };
            if bumped {
                self.sequence_number += 1;
            }

            self.push_or_replace_list_frame(ListFrame {
                kind: ListKind::Ordered,
                marker_char,
                marker_col: indent_cols,
                content_col,
                hang_col: content_col,
            });

            self.prev_was_text = false;
            return LineState {
                line_type: LineType::OrderedList,
                sequence_number: self.sequence_number,
                nesting_depth: self.list_stack.len() as u32 - 1,
                left_indent: content_col,
                hang_indent: content_col,
                ordered_list_marker_char: marker_char,
                ordered_list_number: number,
                footnote_has_inline_text: false,
            };
        }

        if let Some(caps) = UNORDERED_RE.captures(trimmed) {
            let marker_char = caps.get(1).unwrap().as_str().chars().next();
            let content_col = indent_cols + caps.get(0).unwrap().as_str().len();

            let same_level = self.list_stack.last().filter(|top| top.marker_col == indent_cols);
            let bumped = match same_level {
                Some(top) => top.kind != ListKind::Unordered,
                None => true,
            };
            if bumped {
                self.sequence_number += 1;
            }

            self.push_or_replace_list_frame(ListFrame {
                kind: ListKind::Unordered,
                marker_char,
                marker_col: indent_cols,
                content_col,
                hang_col: content_col,
            });

            self.prev_was_text = false;
            return LineState {
                line_type: LineType::UnorderedList,
                sequence_number: self.sequence_number,
                nesting_depth: self.list_stack.len() as u32 - 1,
                left_indent: content_col,
                hang_indent: content_col,
                ordered_list_marker_char: None,
                ordered_list_number: None,
                footnote_has_inline_text: false,
            };
        }

        if DEFN_RE.is_match(trimmed) {
            self.prev_was_text = false;
            let content_col = indent_cols + 2;
            return LineState {
                line_type: LineType::DefinitionList,
                sequence_number: self.sequence_number,
                nesting_depth: self.list_stack.len() as u32,
                left_indent: content_col,
                hang_indent: content_col,
                ordered_list_marker_char: None,
                ordered_list_number: None,
                footnote_has_inline_text: false,
            };
        }

        if trimmed.contains('|') {
            self.prev_was_text = false;
            return LineState::plain(LineType::Table);
        }

        if self.list_stack.is_empty() && indent_cols >= 4 {
            self.prev_was_text = false;
            return LineState::plain(LineType::IndentedCode);
        }

        // Continuation of an open list item: reuse its indentation.
        if let Some(top) = self.list_stack.last() {
            if indent_cols >= top.content_col {
                self.prev_was_text = true;
                return LineState {
                    line_type: LineType::Text,
                    sequence_number: self.sequence_number,
                    nesting_depth: self.list_stack.len() as u32 - 1,
                    left_indent: top.content_col,
                    hang_indent: top.hang_col,
                    ordered_list_marker_char: None,
                    ordered_list_number: None,
                    footnote_has_inline_text: false,
                };
            }
        }

        self.prev_was_text = true;
        LineState::plain(LineType::Text)
    }

    fn push_or_replace_list_frame(&mut self, frame: ListFrame) {
        if let Some(top) = self.list_stack.last_mut() {
            if frame.marker_col == top.marker_col {
                *top = frame;
                return;
            }
        }
        self.list_stack.push(frame);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_atx_header() {
        let mut c = MarkdownClassifier::new();
        assert_eq!(c.classify("## Title").line_type, LineType::AtxHeader);
    }

    #[test]
    fn classifies_horizontal_rule() {
        let mut c = MarkdownClassifier::new();
        assert_eq!(c.classify("***").line_type, LineType::HorizontalRule);
        assert_eq!(c.classify("- - -").line_type, LineType::HorizontalRule);
    }

    #[test]
    fn classifies_setext_header_after_text() {
        let mut c = MarkdownClassifier::new();
        assert_eq!(c.classify("Title").line_type, LineType::Text);
        assert_eq!(c.classify("=====").line_type, LineType::SetextHeader);
    }

    #[test]
    fn classifies_fenced_code_block() {
        let mut c = MarkdownClassifier::new();
        assert_eq!(c.classify("```rust").line_type, LineType::FencedCode);
        assert_eq!(c.classify("let x = 1;").line_type, LineType::FencedCode);
        assert_eq!(c.classify("```").line_type, LineType::FencedCode);
        assert_eq!(c.classify("plain again").line_type, LineType::Text);
    }

    #[test]
    fn classifies_unordered_list_with_hang_indent() {
        let mut c = MarkdownClassifier::new();
        let one = c.classify("- one two three");
        assert_eq!(one.line_type, LineType::UnorderedList);
        assert_eq!(one.left_indent, 2);
        let two = c.classify("- four five six");
        assert_eq!(two.line_type, LineType::UnorderedList);
        assert_eq!(two.sequence_number, one.sequence_number);
    }

    #[test]
    fn ordered_list_marker_change_bumps_sequence() {
        let mut c = MarkdownClassifier::new();
        let a = c.classify("1. one");
        let b = c.classify("2. two");
        let d = c.classify("1) three");
        assert_eq!(a.sequence_number, b.sequence_number);
        assert_eq!(d.ordered_list_marker_char, Some(')'));
        assert!(d.sequence_number > b.sequence_number);
    }

    #[test]
    fn classifies_footnote_def_inline_text() {
        let mut c = MarkdownClassifier::new();
        let with_text = c.classify("[^1]: has text");
        assert!(with_text.footnote_has_inline_text);
        let mut c2 = MarkdownClassifier::new();
        let without_text = c2.classify("[^1]:");
        assert!(!without_text.footnote_has_inline_text);
    }

    #[test]
    fn classifies_link_label_definition() {
        let mut c = MarkdownClassifier::new();
        assert_eq!(c.classify("[id]: https://example.com").line_type, LineType::LinkLabelDef);
    }

    #[test]
    fn classifies_indented_code_block() {
        let mut c = MarkdownClassifier::new();
        assert_eq!(c.classify("    code here").line_type, LineType::IndentedCode);
    }

    #[test]
    fn classifies_table_line() {
        let mut c = MarkdownClassifier::new();
        assert_eq!(c.classify("| a | b |").line_type, LineType::Table);
    }

    #[test]
    fn classifies_definition_list() {
        let mut c = MarkdownClassifier::new();
        assert_eq!(c.classify(": a definition").line_type, LineType::DefinitionList);
    }
}
