//! `pdf-rebuild` CLI: rebuild one or more PDF files into a single output stream.
//!
//! ## Usage
//!
//! ```sh
//! # Rebuild to stdout
//! pdf-rebuild input.pdf > output.pdf
//!
//! # Rebuild several files into one output file, failing on damaged objects
//! pdf-rebuild --strict -o out.bin a.pdf b.pdf
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, LevelFilter};
use pdf_rebuild::{PDFRebuilder, RebuildOptions};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "pdf-rebuild",
    version,
    about = "Rebuild PDF documents into deduplicated, self-contained files"
)]
struct Cli {
    /// Input PDF files, processed in order
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Output file (writes to stdout if omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Fail a file on its first unreadable object
    #[arg(long)]
    strict: bool,

    /// Hex characters per line of armored stream data
    #[arg(long, default_value_t = pdf_rebuild::pdf::DEFAULT_HEX_LINE_WIDTH)]
    hex_line_width: usize,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("Error: {:#}", err);
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

/// Rebuild every input into the sink; returns whether all files succeeded
fn run(cli: &Cli) -> Result<bool> {
    let rebuilder = PDFRebuilder::with_options(RebuildOptions {
        strict: cli.strict,
        hex_line_width: cli.hex_line_width,
    });

    let mut sink = open_output(cli.output.as_ref())?;
    let mut all_ok = true;

    for file in &cli.files {
        match rebuilder.rebuild_file(file) {
            Ok(output) => {
                info!(
                    "{}: {} objects, {} bytes",
                    file.display(),
                    output.object_count,
                    output.data.len()
                );
                for diagnostic in &output.diagnostics {
                    eprintln!(
                        "{}: object {} replaced by null: {}",
                        file.display(),
                        diagnostic.identity,
                        diagnostic.message
                    );
                }
                sink.write_all(&output.data)
                    .context("Failed to write output")?;
            }
            Err(err) => {
                eprintln!("{} -> {}", err, file.display());
                all_ok = false;
            }
        }
    }

    sink.flush().context("Failed to flush output")?;
    Ok(all_ok)
}

fn open_output(path: Option<&PathBuf>) -> Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create file: {}", path.display()))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(BufWriter::new(io::stdout().lock()))),
    }
}
