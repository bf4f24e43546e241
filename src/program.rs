//! Program builder.
//!
//! Consumes raw source lines one at a time, checks the header, numbers the
//! instructions and collects them into a [`Program`].

use crate::HEADER;
use crate::error::{ErrorAccumulator, ParseError, Result};
use crate::grammar::Opcode;
use crate::operand::Operand;
use crate::parser::{Command, interpret};
use crate::source::{COMMENT_START, clean_line};
use log::{debug, info};

/// A numbered, validated instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub order: usize,
    pub opcode: Opcode,
    pub operands: Vec<Operand>,
}

impl Instruction {
    pub fn new(order: usize, command: Command) -> Self {
        Self {
            order,
            opcode: command.opcode,
            operands: command.operands,
        }
    }
}

/// A fully validated program.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    pub header_seen: bool,
    pub instructions: Vec<Instruction>,
    /// Source lines that carried a comment, header line included.
    pub comment_lines: usize,
}

impl Program {
    /// Append an instruction, checking numbering and arity.
    fn push(&mut self, instruction: Instruction) -> Result<()> {
        let expected = self.instructions.len() + 1;
        if instruction.order != expected {
            return Err(ParseError::internal(format!(
                "instruction numbered {} where {} was expected",
                instruction.order, expected
            )));
        }
        if instruction.operands.len() != instruction.opcode.arity() {
            return Err(ParseError::internal(format!(
                "{} built with {} operand(s)",
                instruction.opcode,
                instruction.operands.len()
            )));
        }
        self.instructions.push(instruction);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

/// Incremental, single-pass program builder.
#[derive(Debug, Default)]
pub struct ProgramBuilder {
    program: Program,
    line_num: usize,
}

impl ProgramBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one raw source line.
    ///
    /// Blank and comment-only lines are skipped. The first meaningful line
    /// must be the header; every later one must be a valid instruction.
    pub fn feed(&mut self, raw: &str) -> Result<()> {
        match self.next_line(raw) {
            Some(line) => self.accept(line),
            None => Ok(()),
        }
    }

    /// Finish the build once input is exhausted.
    pub fn finish(self) -> Result<Program> {
        if !self.program.header_seen {
            return Err(ParseError::MissingHeader {
                line: self.line_num + 1,
                found: None,
            });
        }
        info!(
            "built program: {} instruction(s) from {} line(s)",
            self.program.len(),
            self.line_num
        );
        Ok(self.program)
    }

    /// Count the line and return its cleaned text, or `None` if blank.
    fn next_line<'a>(&mut self, raw: &'a str) -> Option<&'a str> {
        self.line_num += 1;

        if raw.contains(COMMENT_START) {
            self.program.comment_lines += 1;
        }

        let line = clean_line(raw);
        (!line.is_empty()).then_some(line)
    }

    fn accept(&mut self, line: &str) -> Result<()> {
        if !self.program.header_seen {
            if !line.eq_ignore_ascii_case(HEADER) {
                return Err(ParseError::MissingHeader {
                    line: self.line_num,
                    found: Some(line.to_string()),
                });
            }
            self.program.header_seen = true;
            return Ok(());
        }

        let command = interpret(line, self.line_num)?;
        let order = self.program.len() + 1;
        debug!("line {}: #{} {}", self.line_num, order, command.opcode);
        self.program.push(Instruction::new(order, command))
    }

    /// Feed one line; on a missing header, record it and carry on as if the
    /// header were present so later lines are still checked.
    fn feed_recovering(&mut self, raw: &str, errors: &mut ErrorAccumulator) {
        let Some(line) = self.next_line(raw) else {
            return;
        };

        match self.accept(line) {
            Ok(()) => {}
            Err(err @ ParseError::MissingHeader { .. }) => {
                errors.push(err);
                self.program.header_seen = true;
                // The offending line may itself be an instruction.
                if let Err(err) = self.accept(line) {
                    errors.push(err);
                }
            }
            Err(err) => errors.push(err),
        }
    }
}

/// Build a program, stopping at the first error.
pub fn build<I, S>(lines: I) -> Result<Program>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut builder = ProgramBuilder::new();
    for line in lines {
        builder.feed(line.as_ref())?;
    }
    builder.finish()
}

/// Build a program, collecting up to `max_errors` errors instead of stopping.
///
/// A program is only returned when no line failed.
pub fn build_all<I, S>(
    lines: I,
    max_errors: usize,
) -> std::result::Result<Program, Vec<ParseError>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut builder = ProgramBuilder::new();
    let mut errors = ErrorAccumulator::with_max(max_errors);

    for line in lines {
        builder.feed_recovering(line.as_ref(), &mut errors);
        if errors.is_full() {
            break;
        }
    }

    if errors.has_errors() {
        return Err(errors.into_errors());
    }
    builder.finish().map_err(|err| vec![err])
}
