//! Shared CLI plumbing for the `wrap` and `wrapc` binaries.

/// Resolve the output line width: an explicit `--width` wins, otherwise
/// `COLUMNS` if set and parseable, otherwise a `TIOCGWINSZ`-style probe of
/// stdout, otherwise the conventional 80-column default.
pub fn resolve_width(explicit: Option<usize>) -> usize {
    if let Some(w) = explicit {
        return w;
    }
    if let Ok(columns) = std::env::var("COLUMNS") {
        if let Ok(w) = columns.trim().parse::<usize>() {
            if w > 0 {
                return w;
            }
        }
    }
    if let Some((terminal_size::Width(w), _)) = terminal_size::terminal_size() {
        return w as usize;
    }
    80
}

/// Locate a config file when `-c`/`--config` wasn't given, in the search
/// order `.wraprc` (current directory), then `$XDG_CONFIG_HOME/wrap/config`
/// (falling back to `~/.config/wrap/config`), then `/etc/xdg/wrap/config`.
/// Returns the first candidate that exists.
pub fn find_default_config() -> Option<std::path::PathBuf> {
    let xdg_config = std::env::var_os("XDG_CONFIG_HOME")
        .map(std::path::PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| std::path::PathBuf::from(home).join(".config")))
        .map(|dir| dir.join("wrap").join("config"));

    let mut candidates = vec![std::path::PathBuf::from(".wraprc")];
    candidates.extend(xdg_config);
    candidates.push(std::path::PathBuf::from("/etc/xdg/wrap/config"));

    candidates.into_iter().find(|p| p.is_file())
}
