//! `wrapc`: reflow the prose inside source-code comments, leaving code
//! untouched (spec §4.4).

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode as ProcessExitCode;

use clap::Parser;
use wrap_core::error::{Error, ExitCode};
use wrap_core::wrapc::pipeline;

/// Reflow comment prose in source files, passing code through unchanged.
#[derive(Debug, Parser)]
#[command(name = "wrapc", version, about)]
struct Cli {
    /// Input file (stdin if omitted).
    input: Option<PathBuf>,

    /// Output file (stdout if omitted).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Maximum output line width (default: `$COLUMNS`, else the terminal
    /// width, else 80).
    #[arg(short = 'w', long)]
    width: Option<usize>,

    /// Columns a tab stop covers for width accounting.
    #[arg(short = 't', long = "tab-width", default_value_t = 8)]
    tab_width: usize,

    /// Spaces inserted after an end-of-sentence punctuation mark.
    #[arg(short = 's', long, default_value_t = 2)]
    eos_spaces: usize,

    /// Enable the Markdown-aware block classifier (for `/** markdown */`-style comments).
    #[arg(short = 'm', long)]
    markdown: bool,

    /// Treat doxygen comment markers as part of the prototype lead.
    #[arg(short = 'D', long)]
    doxygen: bool,

    /// Disable the trailing-hyphen rejoin heuristic.
    #[arg(short = 'y', long = "no-hyphen")]
    no_hyphen: bool,

    /// Characters that introduce a comment, consulted by leader detection.
    #[arg(long, default_value = "/*#-(:{|")]
    comment_chars: String,

    /// Path to the `wrap` binary to drive as the middle pipeline stage.
    #[arg(long)]
    wrap_bin: Option<PathBuf>,
}

fn find_wrap_bin(cli: &Cli) -> PathBuf {
    if let Some(path) = &cli.wrap_bin {
        return path.clone();
    }
    let exe_name = if cfg!(windows) { "wrap.exe" } else { "wrap" };
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            let candidate = dir.join(exe_name);
            if candidate.exists() {
                return candidate;
            }
        }
    }
    PathBuf::from(exe_name)
}

fn wrap_args(cli: &Cli) -> Vec<String> {
    let mut args = vec![
        "--width".to_string(),
        wrap_cli::resolve_width(cli.width).to_string(),
        "--tab-width".to_string(),
        cli.tab_width.to_string(),
        "--eos-spaces".to_string(),
        cli.eos_spaces.to_string(),
        "--data-link-esc".to_string(),
    ];
    if cli.markdown {
        args.push("--markdown".to_string());
    }
    if cli.doxygen {
        args.push("--doxygen".to_string());
    }
    if cli.no_hyphen {
        args.push("--no-hyphen".to_string());
    }
    args
}

fn run() -> Result<(), Error> {
    let cli = Cli::parse();
    tracing::debug!(width = wrap_cli::resolve_width(cli.width), "starting wrapc");

    if std::env::var("WRAP_DUMP_CC_MAP").is_ok() {
        eprintln!("comment_chars = {:?}", cli.comment_chars.chars().collect::<BTreeSet<_>>());
        std::process::exit(0);
    }

    let comment_chars: BTreeSet<char> = cli.comment_chars.chars().collect();
    let wrap_bin = find_wrap_bin(&cli);
    let args = wrap_args(&cli);

    let input: Box<dyn Read + Send> = match &cli.input {
        Some(path) => Box::new(File::open(path).map_err(Error::NoInput)?),
        None => Box::new(io::stdin()),
    };
    let output: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(
            File::create(path).map_err(|source| Error::CantCreat { path: path.clone(), source })?,
        ),
        None => Box::new(io::stdout()),
    };

    pipeline::run(Path::new(&wrap_bin), &args, comment_chars, input, output)
}

fn main() -> ProcessExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    match run() {
        Ok(()) => ProcessExitCode::from(ExitCode::Ok as u8),
        Err(err) => {
            eprintln!("wrapc: {err}");
            ProcessExitCode::from(err.exit_code() as u8)
        }
    }
}
