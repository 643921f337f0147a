//! `wrap`: a Unicode-aware paragraph filter (spec §1, §4.3).

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode as ProcessExitCode;

use clap::{Parser, ValueEnum};
use wrap_core::config::Config;
use wrap_core::error::{Error, ExitCode};
use wrap_core::options::{Eol, NewlinesDelimit, Options, TabSpaces};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum EolArg {
    Input,
    Unix,
    Windows,
}

/// Reflow text into filled paragraphs, optionally Markdown-aware.
#[derive(Debug, Parser)]
#[command(name = "wrap", version, about, args_override_self = true)]
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

    /// First-line indent, in tab stops.
    #[arg(long, default_value_t = 0)]
    indent_tabs: usize,

    /// First-line indent, in spaces.
    #[arg(short = 'i', long, default_value_t = 0)]
    indent_spaces: usize,

    /// Continuation-line indent, in tab stops.
    #[arg(long, default_value_t = 0)]
    hang_tabs: usize,

    /// Continuation-line indent, in spaces.
    #[arg(long, default_value_t = 0)]
    hang_spaces: usize,

    /// Leading tabs prepended to every output line.
    #[arg(long, default_value_t = 0)]
    lead_tabs: usize,

    /// Leading spaces prepended to every output line.
    #[arg(long, default_value_t = 0)]
    lead_spaces: usize,

    /// Mirror the first line's leading tabs as the lead for every line.
    #[arg(long)]
    mirror_tabs: bool,

    /// Mirror the first line's leading spaces as the lead for every line.
    #[arg(long)]
    mirror_spaces: bool,

    /// Capture the first line's leading whitespace as a literal lead.
    #[arg(short = 'p', long)]
    prototype: bool,

    /// Use a literal string (instead of captured whitespace) as the lead.
    #[arg(long)]
    lead_string: Option<String>,

    /// Characters that delimit a paragraph wherever they appear.
    #[arg(long)]
    para_chars: Option<String>,

    /// Characters that delimit a paragraph only at the start of a line.
    #[arg(long)]
    lead_para_chars: Option<String>,

    /// How many consecutive newlines delimit a paragraph (1, 2, or "never").
    #[arg(long, default_value = "2")]
    newlines_delimit: String,

    /// Delimit a paragraph at the first whitespace after an end-of-sentence mark.
    #[arg(long)]
    eos_delimit: bool,

    /// Delimit a paragraph when a line starts with whitespace.
    #[arg(long)]
    lead_ws_delimit: bool,

    /// Treat a leading `.` as ending the paragraph and pass the rest of the line through.
    #[arg(long)]
    lead_dot_ignore: bool,

    /// Treat the first line of a paragraph as a title line.
    #[arg(long)]
    title_line: bool,

    /// Enable the Markdown-aware block classifier.
    #[arg(short = 'm', long)]
    markdown: bool,

    /// Treat doxygen comment markers as part of the prototype lead.
    #[arg(short = 'D', long)]
    doxygen: bool,

    /// Disable the trailing-hyphen rejoin heuristic.
    #[arg(short = 'y', long = "no-hyphen")]
    no_hyphen: bool,

    /// End-of-line policy.
    #[arg(long, value_enum, default_value_t = EolArg::Input)]
    eol: EolArg,

    /// A regex that, matched against a raw line, forces a paragraph break.
    #[arg(long)]
    block_regex: Option<String>,

    /// Recognize the wrapc in-band control protocol on input.
    #[arg(long)]
    data_link_esc: bool,

    /// Load options from a named alias in a config file.
    #[arg(short = 'a', long)]
    alias: Option<String>,

    /// Config file to read aliases/patterns from.
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,
}

fn parse_char_set(s: &Option<String>) -> std::collections::BTreeSet<char> {
    s.as_deref().unwrap_or_default().chars().collect()
}

fn build_options(cli: &Cli) -> Result<Options, Error> {
    let newlines_delimit = match cli.newlines_delimit.as_str() {
        "1" => NewlinesDelimit::One,
        "2" => NewlinesDelimit::Two,
        "never" | "inf" => NewlinesDelimit::Never,
        other => return Err(Error::Usage(format!("invalid --newlines-delimit value: {other}"))),
    };
    let eol = match cli.eol {
        EolArg::Input => Eol::Input,
        EolArg::Unix => Eol::Unix,
        EolArg::Windows => Eol::Windows,
    };

    let opts = Options {
        line_width: wrap_cli::resolve_width(cli.width),
        tab_spaces: cli.tab_width,
        eos_spaces: cli.eos_spaces,
        indent: TabSpaces::new(cli.indent_tabs, cli.indent_spaces),
        hang: TabSpaces::new(cli.hang_tabs, cli.hang_spaces),
        lead: TabSpaces::new(cli.lead_tabs, cli.lead_spaces),
        mirror_tabs: cli.mirror_tabs,
        mirror_spaces: cli.mirror_spaces,
        para_chars: parse_char_set(&cli.para_chars),
        lead_para_chars: parse_char_set(&cli.lead_para_chars),
        newlines_delimit,
        eos_delimit: cli.eos_delimit,
        lead_ws_delimit: cli.lead_ws_delimit,
        lead_dot_ignore: cli.lead_dot_ignore,
        title_line: cli.title_line,
        prototype: cli.prototype,
        markdown: cli.markdown,
        doxygen: cli.doxygen,
        no_hyphen: cli.no_hyphen,
        data_link_esc: cli.data_link_esc,
        eol,
        lead_string: cli.lead_string.clone(),
        block_regex: cli.block_regex.clone(),
    };
    opts.validate().map_err(Error::Usage)?;
    Ok(opts)
}

/// Resolve `-a`/`-c` into the effective CLI: load the config (explicit
/// `--config`, else the search order in `wrap_cli::find_default_config`),
/// pick the argv for `--alias` (or the first `[PATTERNS]` glob matching the
/// input filename when no alias was named), and splice it in before the
/// real command line so any flag the user actually typed still wins
/// (SPEC_FULL §2.1–§2.3).
fn resolve_cli() -> Result<Cli, Error> {
    let raw: Vec<String> = std::env::args().collect();
    let cli = Cli::parse_from(&raw);

    let Some(config_path) = cli.config.clone().or_else(wrap_cli::find_default_config) else {
        return Ok(cli);
    };
    let text = std::fs::read_to_string(&config_path).map_err(Error::NoInput)?;
    let cfg = Config::parse(&text)?;

    let alias_args = if let Some(alias) = &cli.alias {
        Some(cfg.alias(alias).ok_or_else(|| Error::Usage(format!("undefined alias `{alias}`")))?.to_vec())
    } else if let Some(input) = &cli.input {
        cfg.matching_alias(&input.to_string_lossy())?.map(<[String]>::to_vec)
    } else {
        None
    };

    let Some(alias_args) = alias_args else { return Ok(cli) };
    let mut combined = vec![raw[0].clone()];
    combined.extend(alias_args);
    combined.extend(raw.into_iter().skip(1));
    Ok(Cli::parse_from(combined))
}

fn block_for_debugger() {
    let Ok(val) = std::env::var("WRAP_DEBUG") else { return };
    if matches!(val.as_str(), "" | "0" | "false") {
        return;
    }
    eprintln!("wrap: WRAP_DEBUG set, pid {} waiting for debugger (unset WRAP_DEBUG to continue)", std::process::id());
    while std::env::var("WRAP_DEBUG").is_ok_and(|v| !matches!(v.as_str(), "" | "0" | "false")) {
        std::thread::sleep(std::time::Duration::from_millis(200));
    }
}

fn dump_conf_and_maybe_exit(cli: &Cli) -> Result<(), Error> {
    if std::env::var("WRAP_DUMP_CONF").is_err() {
        return Ok(());
    }
    if let Some(path) = &cli.config {
        let text = std::fs::read_to_string(path).map_err(Error::NoInput)?;
        let cfg = Config::parse(&text)?;
        if let Some(alias) = &cli.alias {
            eprintln!("{alias} = {:?}", cfg.alias(alias));
        } else {
            eprintln!("{cfg:#?}");
        }
    }
    std::process::exit(0);
}

fn run() -> Result<(), Error> {
    let cli = resolve_cli()?;
    block_for_debugger();
    dump_conf_and_maybe_exit(&cli)?;

    let opts = build_options(&cli)?;
    tracing::debug!(?opts, "starting wrap");

    let input: Box<dyn Read> = match &cli.input {
        Some(path) => Box::new(File::open(path).map_err(Error::NoInput)?),
        None => Box::new(io::stdin()),
    };
    let output: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(
            File::create(path).map_err(|source| Error::CantCreat { path: path.clone(), source })?,
        ),
        None => Box::new(io::stdout()),
    };

    wrap_core::wrap(&opts, input, output)
}

fn main() -> ProcessExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    match run() {
        Ok(()) => ProcessExitCode::from(ExitCode::Ok as u8),
        Err(err) => {
            eprintln!("wrap: {err}");
            ProcessExitCode::from(err.exit_code() as u8)
        }
    }
}
