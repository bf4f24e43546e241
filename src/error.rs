//! Error types, exit codes and diagnostics for the IPPcode24 parser.
//!
//! Every error carries the 1-based source line it was raised on (where one
//! exists) so diagnostics can point at the offending token.

use crate::HEADER;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Invalid command-line parameters.
pub const EXIT_INVALID_ARGUMENTS: u8 = 10;
/// Input cannot be opened or read.
pub const EXIT_INPUT: u8 = 11;
/// Output cannot be opened or written.
pub const EXIT_OUTPUT: u8 = 12;
/// Missing or malformed header.
pub const EXIT_MISSING_HEADER: u8 = 21;
/// Unknown or malformed opcode.
pub const EXIT_UNKNOWN_OPCODE: u8 = 22;
/// Lexical or syntax error in an instruction's operands.
pub const EXIT_SYNTAX: u8 = 23;
/// Internal error.
pub const EXIT_INTERNAL: u8 = 99;

/// Parser error with source context.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("line {line}: expected header '{}', found {}", HEADER, describe_found(.found))]
    MissingHeader { line: usize, found: Option<String> },

    #[error("line {line}: unknown opcode: {opcode}")]
    UnknownOpcode { line: usize, opcode: String },

    #[error("line {line}: {opcode} takes {expected} operand(s), found {found}")]
    ArityMismatch {
        line: usize,
        opcode: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("line {line}: operand {position} of {opcode} must be {expected}, found '{token}'")]
    OperandType {
        line: usize,
        opcode: &'static str,
        position: usize,
        token: String,
        expected: String,
    },

    #[error("internal error: {message}")]
    Internal { message: String },

    #[error("failed to read {path}: {source}")]
    InputRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid arguments: {message}")]
    InvalidArguments { message: String },
}

fn describe_found(found: &Option<String>) -> String {
    match found {
        Some(text) => format!("'{}'", text),
        None => "end of input".to_string(),
    }
}

impl ParseError {
    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ParseError::Internal {
            message: message.into(),
        }
    }

    /// Create an input error.
    pub fn input(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ParseError::InputRead {
            path: path.into(),
            source,
        }
    }

    /// Create an output error.
    pub fn output(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ParseError::OutputWrite {
            path: path.into(),
            source,
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            ParseError::InvalidArguments { .. } => EXIT_INVALID_ARGUMENTS,
            ParseError::InputRead { .. } => EXIT_INPUT,
            ParseError::OutputWrite { .. } => EXIT_OUTPUT,
            ParseError::MissingHeader { .. } => EXIT_MISSING_HEADER,
            ParseError::UnknownOpcode { .. } => EXIT_UNKNOWN_OPCODE,
            ParseError::ArityMismatch { .. } | ParseError::OperandType { .. } => EXIT_SYNTAX,
            ParseError::Internal { .. } => EXIT_INTERNAL,
        }
    }

    /// Source line this error was raised on, if any.
    pub fn line(&self) -> Option<usize> {
        match self {
            ParseError::MissingHeader { line, .. }
            | ParseError::UnknownOpcode { line, .. }
            | ParseError::ArityMismatch { line, .. }
            | ParseError::OperandType { line, .. } => Some(*line),
            _ => None,
        }
    }

    /// Whether this error belongs to the source-checking taxonomy, as opposed
    /// to a failure of the surrounding I/O or command line.
    pub fn is_core(&self) -> bool {
        matches!(
            self,
            ParseError::MissingHeader { .. }
                | ParseError::UnknownOpcode { .. }
                | ParseError::ArityMismatch { .. }
                | ParseError::OperandType { .. }
                | ParseError::Internal { .. }
        )
    }

    /// The source text the error points at, with its token index on the line.
    fn culprit(&self) -> Option<(usize, &str)> {
        match self {
            ParseError::MissingHeader { found, .. } => found.as_deref().map(|text| (0, text)),
            ParseError::UnknownOpcode { opcode, .. } => Some((0, opcode.as_str())),
            ParseError::OperandType {
                position, token, ..
            } => Some((*position, token.as_str())),
            _ => None,
        }
    }
}

/// Byte offset of the `index`-th whitespace-separated token in `line`.
fn token_offset(line: &str, index: usize) -> Option<usize> {
    let mut seen = 0;
    let mut in_token = false;
    for (offset, c) in line.char_indices() {
        if c.is_whitespace() {
            in_token = false;
            continue;
        }
        if !in_token {
            if seen == index {
                return Some(offset);
            }
            seen += 1;
            in_token = true;
        }
    }
    None
}

/// Result type alias for parser operations.
pub type Result<T> = std::result::Result<T, ParseError>;

/// A bounded collection of errors for the collect-all mode.
#[derive(Debug)]
pub struct ErrorAccumulator {
    errors: Vec<ParseError>,
    max_errors: usize,
}

impl ErrorAccumulator {
    /// Create with a max error limit; at least one error is always kept.
    pub fn with_max(max_errors: usize) -> Self {
        Self {
            errors: Vec::new(),
            max_errors: max_errors.max(1),
        }
    }

    /// Add an error; errors past the limit are dropped.
    pub fn push(&mut self, error: ParseError) {
        if self.errors.len() < self.max_errors {
            self.errors.push(error);
        }
    }

    pub fn is_full(&self) -> bool {
        self.errors.len() >= self.max_errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn into_errors(self) -> Vec<ParseError> {
        self.errors
    }
}

/// Diagnostic formatter for rich error output.
pub struct Diagnostic<'a> {
    error: &'a ParseError,
    source: Option<&'a str>,
    filename: Option<&'a str>,
}

impl<'a> Diagnostic<'a> {
    pub fn new(error: &'a ParseError) -> Self {
        Self {
            error,
            source: None,
            filename: None,
        }
    }

    pub fn with_source(mut self, source: &'a str) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_filename(mut self, filename: &'a str) -> Self {
        self.filename = Some(filename);
        self
    }
}

impl fmt::Display for Diagnostic<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let filename = self.filename.unwrap_or("<stdin>");

        writeln!(f, "error: {}", self.error)?;

        let Some(line_num) = self.error.line() else {
            return Ok(());
        };
        writeln!(f, "  --> {}:{}", filename, line_num)?;

        if let Some(source) = self.source
            && let Some(line) = line_num.checked_sub(1).and_then(|i| source.lines().nth(i))
        {
            writeln!(f, "    |")?;
            writeln!(f, "{:3} | {}", line_num, line)?;

            if let Some((index, culprit)) = self.error.culprit()
                && !culprit.is_empty()
                && let Some(column) = token_offset(line, index)
            {
                let width = line[..column].chars().count();
                let marks = "^".repeat(culprit.chars().count());
                writeln!(f, "    | {:>width$}{}", "", marks, width = width)?;
            }
        }

        Ok(())
    }
}

/// Format multiple errors with context.
pub fn format_errors(errors: &[ParseError], source: &str, filename: &str) -> String {
    let mut output = String::new();
    let total = errors.len();

    for (i, error) in errors.iter().enumerate() {
        if i > 0 {
            output.push('\n');
        }
        output.push_str(&format!("Error {} of {}:\n", i + 1, total));
        output.push_str(
            &Diagnostic::new(error)
                .with_source(source)
                .with_filename(filename)
                .to_string(),
        );
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ParseError::UnknownOpcode {
            line: 4,
            opcode: "FOO".to_string(),
        };
        assert_eq!(err.to_string(), "line 4: unknown opcode: FOO");

        let err = ParseError::MissingHeader {
            line: 1,
            found: None,
        };
        assert_eq!(
            err.to_string(),
            "line 1: expected header '.IPPcode24', found end of input"
        );
    }

    #[test]
    fn test_exit_codes_are_distinct() {
        let header = ParseError::MissingHeader {
            line: 1,
            found: Some("MOVE".to_string()),
        };
        let opcode = ParseError::UnknownOpcode {
            line: 2,
            opcode: "FOO".to_string(),
        };
        let arity = ParseError::ArityMismatch {
            line: 2,
            opcode: "ADD",
            expected: 3,
            found: 2,
        };
        let internal = ParseError::internal("broken");

        assert_eq!(header.exit_code(), EXIT_MISSING_HEADER);
        assert_eq!(opcode.exit_code(), EXIT_UNKNOWN_OPCODE);
        assert_eq!(arity.exit_code(), EXIT_SYNTAX);
        assert_eq!(internal.exit_code(), EXIT_INTERNAL);
        assert_ne!(arity.exit_code(), internal.exit_code());
    }

    #[test]
    fn test_core_taxonomy() {
        let core = [
            ParseError::MissingHeader {
                line: 1,
                found: None,
            },
            ParseError::UnknownOpcode {
                line: 2,
                opcode: "FOO".to_string(),
            },
            ParseError::ArityMismatch {
                line: 2,
                opcode: "ADD",
                expected: 3,
                found: 1,
            },
            ParseError::OperandType {
                line: 2,
                opcode: "PUSHS",
                position: 1,
                token: "int@x".to_string(),
                expected: "symbol".to_string(),
            },
            ParseError::internal("broken"),
        ];
        assert!(core.iter().all(ParseError::is_core));

        let io = std::io::Error::other("disk");
        assert!(!ParseError::input("prog.src", io).is_core());
        let io = std::io::Error::other("disk");
        assert!(!ParseError::output("prog.xml", io).is_core());
        let args = ParseError::InvalidArguments {
            message: "bad".to_string(),
        };
        assert!(!args.is_core());
    }

    #[test]
    fn test_error_accumulator() {
        let mut acc = ErrorAccumulator::with_max(2);
        assert!(!acc.has_errors());

        acc.push(ParseError::internal("error 1"));
        assert!(!acc.is_full());
        acc.push(ParseError::internal("error 2"));
        assert!(acc.is_full());

        // Should not add more after limit
        acc.push(ParseError::internal("error 3"));
        assert_eq!(acc.into_errors().len(), 2);
    }

    #[test]
    fn test_error_accumulator_zero_limit_keeps_one() {
        let mut acc = ErrorAccumulator::with_max(0);
        assert!(!acc.is_full());
        acc.push(ParseError::internal("error 1"));
        assert!(acc.is_full());
        assert!(acc.has_errors());
    }

    #[test]
    fn test_diagnostic_points_at_token() {
        let source = ".IPPcode24\nMOVE GF@x int@abc\n";
        let err = ParseError::OperandType {
            line: 2,
            opcode: "MOVE",
            position: 2,
            token: "int@abc".to_string(),
            expected: "symbol".to_string(),
        };
        let text = Diagnostic::new(&err)
            .with_source(source)
            .with_filename("prog.src")
            .to_string();

        assert!(text.contains("  --> prog.src:2"));
        assert!(text.contains("  2 | MOVE GF@x int@abc"));
        assert!(text.contains("    |           ^^^^^^^"));
    }

    #[test]
    fn test_diagnostic_points_at_operand_position() {
        // The failing token also appears inside an earlier operand.
        let source = ".IPPcode24\nADD GF@x GF@y x\n";
        let err = ParseError::OperandType {
            line: 2,
            opcode: "ADD",
            position: 3,
            token: "x".to_string(),
            expected: "symbol".to_string(),
        };
        let text = Diagnostic::new(&err).with_source(source).to_string();

        let caret = format!("    | {}^\n", " ".repeat(14));
        assert!(text.ends_with(&caret), "got:\n{}", text);
    }

    #[test]
    fn test_token_offset() {
        assert_eq!(token_offset("  MOVE\tGF@x  int@1", 0), Some(2));
        assert_eq!(token_offset("  MOVE\tGF@x  int@1", 1), Some(7));
        assert_eq!(token_offset("  MOVE\tGF@x  int@1", 2), Some(13));
        assert_eq!(token_offset("MOVE", 1), None);
    }

    #[test]
    fn test_format_errors_numbering() {
        let errors = vec![ParseError::internal("a"), ParseError::internal("b")];
        let text = format_errors(&errors, "", "prog.src");
        assert!(text.contains("Error 1 of 2:"));
        assert!(text.contains("Error 2 of 2:"));
    }
}
