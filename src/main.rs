//! ippcode-parse CLI - Syntax analyzer for IPPcode24.

use clap::Parser as ClapParser;
use env_logger::Env;
use ippcode_parser::error::{EXIT_INVALID_ARGUMENTS, ParseError, format_errors};
use ippcode_parser::stats::{StatGroup, Statistics};
use ippcode_parser::{
    ParseOptions, ParseResult, parse_directory, parse_file_with, parse_source, write_result,
};
use log::{info, warn};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(ClapParser, Debug)]
#[command(name = "ippcode-parse")]
#[command(version)]
#[command(about = "Syntax analyzer translating IPPcode24 source to XML")]
struct Args {
    /// Input file or directory of .src files (reads stdin when omitted)
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,

    /// Output file, or output directory for directory input (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Report every failing line instead of stopping at the first
    #[arg(long)]
    all_errors: bool,

    /// Write statistics to this file
    #[arg(long, value_name = "FILE")]
    stats: Option<PathBuf>,

    /// Statistic to write, in order (repeatable; requires --stats)
    #[arg(long = "stat", value_enum, value_name = "GROUP")]
    stat: Vec<StatGroup>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::from(EXIT_INVALID_ARGUMENTS)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    init_logging(args.verbose);

    match run(&args) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn run(args: &Args) -> Result<u8, ParseError> {
    if !args.stat.is_empty() && args.stats.is_none() {
        return Err(ParseError::InvalidArguments {
            message: "--stat requires --stats <FILE>".to_string(),
        });
    }

    let options = ParseOptions {
        collect_all: args.all_errors,
        ..Default::default()
    };

    match &args.input {
        Some(dir) if dir.is_dir() => {
            if args.stats.is_some() {
                return Err(ParseError::InvalidArguments {
                    message: "--stats is not supported for directory input".to_string(),
                });
            }
            run_directory(dir, args.output.as_deref(), options)
        }
        Some(file) => {
            let result = parse_file_with(file, options);
            finish_single(args, result)
        }
        None => {
            let mut source = String::new();
            io::stdin()
                .read_to_string(&mut source)
                .map_err(|e| ParseError::input("<stdin>", e))?;
            let result = parse_source(&source, "<stdin>", options);
            finish_single(args, result)
        }
    }
}

fn finish_single(args: &Args, result: ParseResult) -> Result<u8, ParseError> {
    if !result.is_ok() {
        // Input errors carry no source to point into.
        let input_error = result
            .errors
            .first()
            .filter(|e| matches!(e, ParseError::InputRead { .. }));
        if let Some(err) = input_error {
            eprintln!("Error: {}", err);
        } else {
            eprint!(
                "{}",
                format_errors(&result.errors, &result.source, &result.filename)
            );
        }
        return Ok(result.exit_code());
    }

    match &args.output {
        Some(path) => {
            fs::write(path, &result.xml).map_err(|e| ParseError::output(path, e))?;
            info!("{} -> {}", result.filename, path.display());
        }
        None => io::stdout()
            .write_all(result.xml.as_bytes())
            .map_err(|e| ParseError::output("<stdout>", e))?,
    }

    if let (Some(path), Some(program)) = (&args.stats, &result.program) {
        let text = Statistics::collect(program).render(&args.stat);
        fs::write(path, text).map_err(|e| ParseError::output(path, e))?;
        info!("statistics -> {}", path.display());
    }

    Ok(0)
}

fn run_directory(
    dir: &Path,
    output: Option<&Path>,
    options: ParseOptions,
) -> Result<u8, ParseError> {
    let output_dir = output.unwrap_or(dir);
    let results = parse_directory(dir, options);

    if results.is_empty() {
        warn!("no .src files found in {}", dir.display());
        return Ok(0);
    }

    let mut exit_code = 0;

    for result in &results {
        if !result.is_ok() {
            eprint!(
                "{}",
                format_errors(&result.errors, &result.source, &result.filename)
            );
            if exit_code == 0 {
                exit_code = result.exit_code();
            }
            continue;
        }

        match write_result(result, output_dir) {
            Ok(path) => info!("{} -> {}", result.filename, path.display()),
            Err(e) => {
                eprintln!("Error writing output for {}: {}", result.filename, e);
                if exit_code == 0 {
                    exit_code = e.exit_code();
                }
            }
        }
    }

    Ok(exit_code)
}
