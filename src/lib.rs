//! IPPcode24 Parser - Syntax analyzer for the IPPcode24 instruction language.
//!
//! This crate checks IPPcode24 source line by line (header, opcodes, operand
//! counts and operand kinds) and renders a valid program as an XML document.
//!
//! # Usage
//!
//! ```no_run
//! use ippcode_parser::{ParseOptions, parse_directory, parse_file, translate};
//! use std::path::Path;
//!
//! // Translate source held in memory
//! let xml = translate(".IPPcode24\nDEFVAR GF@x\n");
//!
//! // Parse a single file
//! let result = parse_file(Path::new("prog.src"));
//!
//! // Parse a directory (parallel processing)
//! let results = parse_directory(Path::new("tests/"), ParseOptions::default());
//! ```

pub mod error;
pub mod grammar;
pub mod operand;
pub mod parser;
pub mod program;
pub mod source;
pub mod stats;
pub mod xml;

use error::ParseError;
use program::{Program, build, build_all};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

/// Language name, as written in the document's `language` attribute.
pub const LANGUAGE: &str = "IPPcode24";

/// Mandatory first meaningful line of every program.
pub const HEADER: &str = ".IPPcode24";

/// Extension of source files picked up in directory mode.
pub const SOURCE_EXTENSION: &str = "src";

/// How a source is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Keep checking after the first failing line.
    pub collect_all: bool,
    /// Upper bound on collected errors.
    pub max_errors: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            collect_all: false,
            max_errors: 20,
        }
    }
}

/// Result of parsing a single source.
#[derive(Debug)]
pub struct ParseResult {
    /// The filename that was parsed.
    pub filename: String,
    /// The source text, kept for diagnostic formatting.
    pub source: String,
    /// The validated program, when parsing succeeded.
    pub program: Option<Program>,
    /// XML output; empty on failure.
    pub xml: String,
    /// Any errors encountered during parsing.
    pub errors: Vec<ParseError>,
}

impl ParseResult {
    /// Check if parsing was successful (no errors).
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Exit code of the first error, or 0.
    pub fn exit_code(&self) -> u8 {
        self.errors.first().map_or(0, ParseError::exit_code)
    }

    fn failed(filename: &str, source: String, errors: Vec<ParseError>) -> Self {
        Self {
            filename: filename.to_string(),
            source,
            program: None,
            xml: String::new(),
            errors,
        }
    }
}

/// Translate IPPcode24 source to XML, stopping at the first error.
pub fn translate(source: &str) -> Result<String, ParseError> {
    let program = build(source.lines())?;
    Ok(xml::program_to_xml(&program))
}

/// Parse source code held in memory.
pub fn parse_source(source: &str, filename: &str, options: ParseOptions) -> ParseResult {
    let built = if options.collect_all {
        build_all(source.lines(), options.max_errors)
    } else {
        build(source.lines()).map_err(|err| vec![err])
    };

    match built {
        Ok(program) => ParseResult {
            filename: filename.to_string(),
            source: source.to_string(),
            xml: xml::program_to_xml(&program),
            program: Some(program),
            errors: Vec::new(),
        },
        Err(errors) => ParseResult::failed(filename, source.to_string(), errors),
    }
}

/// Parse a single source file.
pub fn parse_file(path: &Path) -> ParseResult {
    parse_file_with(path, ParseOptions::default())
}

/// Parse a single source file with the given options.
pub fn parse_file_with(path: &Path, options: ParseOptions) -> ParseResult {
    let filename = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("unknown")
        .to_string();

    match fs::read_to_string(path) {
        Ok(source) => parse_source(&source, &filename, options),
        Err(e) => {
            ParseResult::failed(&filename, String::new(), vec![ParseError::input(path, e)])
        }
    }
}

/// Parse every `.src` file in a directory.
///
/// Files are independent programs and are parsed in parallel via Rayon.
/// Results come back sorted by filename.
pub fn parse_directory(dir: &Path, options: ParseOptions) -> Vec<ParseResult> {
    let mut files: Vec<PathBuf> = match fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file())
            .filter(|p| p.extension().is_some_and(|ext| ext == SOURCE_EXTENSION))
            .collect(),
        Err(e) => {
            return vec![ParseResult::failed(
                &dir.to_string_lossy(),
                String::new(),
                vec![ParseError::input(dir, e)],
            )];
        }
    };
    files.sort();

    files
        .par_iter()
        .map(|path| parse_file_with(path, options))
        .collect()
}

/// Write a successful result as `<stem>.xml` into `output_dir`.
pub fn write_result(result: &ParseResult, output_dir: &Path) -> Result<PathBuf, ParseError> {
    let stem = Path::new(&result.filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(&result.filename);

    let path = output_dir.join(format!("{}.xml", stem));
    fs::write(&path, &result.xml).map_err(|e| ParseError::output(&path, e))?;
    Ok(path)
}
