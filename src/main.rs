// src/main.rs
//
// pennybook - render receipt/report markup to fixed-width text
//
// - <br> becomes a newline; other text outside tables is copied.
// - <table>/<tr>/<td width="N%" align="left|center|right"> rows become one
//   line each, N% of --width characters per cell.
// - Any error (malformed tag, <td> without width, non-UTF-8 input) aborts
//   with a message on stderr and no output.
//
// CLI flags:
//   -w, --width N   : characters a 100% cell spans (env PENNYBOOK_WIDTH, default 50)
//   -v, --verbose   : more logging, repeatable; RUST_LOG overrides
// INPUT may be `-` for stdin. Output goes to stdout unless OUTPUT is given.

use clap::{ArgAction, Parser};
use log::{debug, LevelFilter};
use pennybook::options::DEFAULT_MAX_LINE_WIDTH;
use pennybook::{bytes_to_text, RenderOptions};
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

/// CLI flags
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Characters that a 100% wide cell spans
    #[arg(short, long, env = "PENNYBOOK_WIDTH", default_value_t = DEFAULT_MAX_LINE_WIDTH)]
    width: usize,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Input file, or `-` for stdin
    input: PathBuf,

    /// Output file (default: stdout)
    output: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("pennybook: {err}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn run(cli: &Cli) -> pennybook::Result<()> {
    let src = if cli.input.as_os_str() == "-" {
        let mut buf = Vec::new();
        io::stdin().read_to_end(&mut buf)?;
        buf
    } else {
        fs::read(&cli.input)?
    };

    let opts = RenderOptions::new().max_line_width(cli.width);
    let text = bytes_to_text(&src, &opts)?;
    debug!(
        "rendered {} input bytes into {} output bytes at width {}",
        src.len(),
        text.len(),
        cli.width
    );

    match &cli.output {
        Some(path) => fs::write(path, text)?,
        None => io::stdout().write_all(text.as_bytes())?,
    }
    Ok(())
}
