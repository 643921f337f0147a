//! The `[ALIASES]`/`[PATTERNS]` config file reader (SPEC_FULL §2.2).
//!
//! This is not INI: `@alias` expansion and `#`-comment stripping need a
//! small hand-rolled scanner rather than a generic INI crate.

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::regexes;

/// How deep `@alias` expansion may recurse before it's treated as a cycle.
const MAX_EXPANSION_DEPTH: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Aliases,
    Patterns,
}

/// A parsed config file: alias names to their expanded argv, and glob
/// patterns bound to alias names, in file order.
#[derive(Debug, Clone, Default)]
pub struct Config {
    aliases: BTreeMap<String, Vec<String>>,
    patterns: Vec<(String, String)>,
}

impl Config {
    /// Parse a config file's contents.
    pub fn parse(text: &str) -> Result<Self> {
        let mut section = Section::None;
        let mut raw_aliases: BTreeMap<String, Vec<String>> = BTreeMap::new();
        let mut patterns = Vec::new();

        for (lineno, raw_line) in text.lines().enumerate() {
            let line = strip_comment(raw_line).trim();
            if line.is_empty() {
                continue;
            }
            if let Some(name) = line.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
                section = match name.trim() {
                    "ALIASES" => Section::Aliases,
                    "PATTERNS" => Section::Patterns,
                    other => {
                        return Err(Error::Config(format!("line {}: unknown section [{other}]", lineno + 1)));
                    }
                };
                continue;
            }

            match section {
                Section::None => {
                    return Err(Error::Config(format!("line {}: entry outside any [section]", lineno + 1)));
                }
                Section::Aliases => {
                    let (name, rhs) = line
                        .split_once('=')
                        .ok_or_else(|| Error::Config(format!("line {}: expected `name = ...`", lineno + 1)))?;
                    let tokens = shell_words::split(rhs.trim())
                        .map_err(|e| Error::Config(format!("line {}: {e}", lineno + 1)))?;
                    raw_aliases.insert(name.trim().to_string(), tokens);
                }
                Section::Patterns => {
                    let (glob, alias) = line
                        .split_once('=')
                        .ok_or_else(|| Error::Config(format!("line {}: expected `glob = alias`", lineno + 1)))?;
                    patterns.push((glob.trim().to_string(), alias.trim().to_string()));
                }
            }
        }

        let mut aliases = BTreeMap::new();
        for name in raw_aliases.keys() {
            let expanded = expand_alias(name, &raw_aliases, &mut Vec::new())?;
            aliases.insert(name.clone(), expanded);
        }

        Ok(Self { aliases, patterns })
    }

    /// The expanded argv for an alias, if defined.
    pub fn alias(&self, name: &str) -> Option<&[String]> {
        self.aliases.get(name).map(Vec::as_slice)
    }

    /// The first pattern (in file order) whose glob matches `filename`,
    /// together with its bound alias's argv.
    pub fn matching_alias(&self, filename: &str) -> Result<Option<&[String]>> {
        for (glob, alias_name) in &self.patterns {
            let re = regexes::glob_to_regex(glob)?;
            if re.is_match(filename) {
                return Ok(self.alias(alias_name));
            }
        }
        Ok(None)
    }
}

fn strip_comment(line: &str) -> &str {
    let mut in_quote: Option<char> = None;
    for (idx, c) in line.char_indices() {
        match in_quote {
            Some(q) if c == q => in_quote = None,
            Some(_) => {}
            None if c == '\'' || c == '"' => in_quote = Some(c),
            None if c == '#' => return &line[..idx],
            None => {}
        }
    }
    line
}

fn expand_alias(
    name: &str,
    raw: &BTreeMap<String, Vec<String>>,
    stack: &mut Vec<String>,
) -> Result<Vec<String>> {
    if stack.len() > MAX_EXPANSION_DEPTH || stack.iter().any(|s| s == name) {
        return Err(Error::Config(format!("alias expansion cycle at `{name}`")));
    }
    let Some(tokens) = raw.get(name) else {
        return Err(Error::Config(format!("undefined alias `{name}`")));
    };

    stack.push(name.to_string());
    let mut out = Vec::with_capacity(tokens.len());
    for token in tokens {
        if let Some(other) = token.strip_prefix('@') {
            out.extend(expand_alias(other, raw, stack)?);
        } else {
            out.push(token.clone());
        }
    }
    stack.pop();
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_alias_and_pattern_sections() {
        let cfg = Config::parse(
            "[ALIASES]\nrust = -w 100 --markdown\n[PATTERNS]\n*.rs = rust\n",
        )
        .unwrap();
        assert_eq!(cfg.alias("rust"), Some(&["-w".to_string(), "100".to_string(), "--markdown".to_string()][..]));
        assert_eq!(cfg.matching_alias("lib.rs").unwrap(), cfg.alias("rust"));
        assert_eq!(cfg.matching_alias("lib.py").unwrap(), None);
    }

    #[test]
    fn at_alias_expands_inline() {
        let cfg = Config::parse("[ALIASES]\nbase = -w 72\nquoted = @base --markdown\n").unwrap();
        assert_eq!(cfg.alias("quoted"), Some(&["-w".to_string(), "72".to_string(), "--markdown".to_string()][..]));
    }

    #[test]
    fn cyclic_alias_is_a_config_error() {
        let err = Config::parse("[ALIASES]\na = @b\nb = @a\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn entry_outside_section_is_a_config_error() {
        let err = Config::parse("name = -w 80\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn hash_inside_quotes_is_not_a_comment() {
        let cfg = Config::parse("[ALIASES]\nx = \"a # b\" c\n").unwrap();
        assert_eq!(cfg.alias("x"), Some(&["a # b".to_string(), "c".to_string()][..]));
    }
}
