//! Error types and the `sysexits`-family exit-code mapping from spec §6/§7.

use std::path::PathBuf;

/// The `sysexits(3)` exit codes this crate's errors map to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success.
    Ok = 0,
    /// The command line was used incorrectly.
    Usage = 64,
    /// Input data was incorrect in some way.
    DataErr = 65,
    /// Input file did not exist or was not readable.
    NoInput = 66,
    /// An internal software error was detected.
    Software = 70,
    /// An operating system error occurred.
    OsErr = 71,
    /// A (user-specified) output file could not be created.
    CantCreat = 73,
    /// An error occurred while doing I/O on some file.
    IoErr = 74,
    /// Something was found in an unconfigured or misconfigured state.
    Config = 78,
}

/// Errors the wrap engine, the Markdown classifier, the config reader, and
/// the wrapc pipeline can raise.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The input file could not be opened.
    #[error("cannot open input: {0}")]
    NoInput(std::io::Error),

    /// The output file could not be created.
    #[error("cannot create output: {path}: {source}")]
    CantCreat {
        /// The output path that could not be created.
        path: PathBuf,
        /// The underlying I/O failure.
        source: std::io::Error,
    },

    /// A read or write failed after the stream was already open.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The command line or option combination was invalid.
    #[error("{0}")]
    Usage(String),

    /// The alias/pattern config file was malformed.
    #[error("config error: {0}")]
    Config(String),

    /// A user- or config-supplied pattern failed to compile.
    #[error("internal error: regex compile failed: {0}")]
    Regex(#[from] regex::Error),

    /// An invariant the engine relies on was violated.
    #[error("internal error: {0}")]
    Software(String),
}

impl Error {
    /// The exit code this error maps to.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Error::NoInput(_) => ExitCode::NoInput,
            Error::CantCreat { .. } => ExitCode::CantCreat,
            Error::Io(_) => ExitCode::IoErr,
            Error::Usage(_) => ExitCode::Usage,
            Error::Config(_) => ExitCode::Config,
            Error::Regex(_) | Error::Software(_) => ExitCode::Software,
        }
    }
}

/// Convenience result alias.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_error_maps_to_usage_exit() {
        let err = Error::Usage("bad option".to_string());
        assert_eq!(err.exit_code() as i32, 64);
    }

    #[test]
    fn config_error_maps_to_config_exit() {
        let err = Error::Config("line outside section".to_string());
        assert_eq!(err.exit_code() as i32, 78);
    }

    #[test]
    #[allow(clippy::invalid_regex)]
    fn regex_error_maps_to_software_exit() {
        let re_err = regex::Regex::new("(").unwrap_err();
        assert_eq!(Error::from(re_err).exit_code() as i32, 70);
    }
}
