//! Line interpreter.
//!
//! Turns one cleaned source line into a validated [`Command`]: opcode lookup,
//! arity check, then operand classification in positional order. The first
//! failure aborts the line.

use crate::error::{ParseError, Result};
use crate::grammar::Opcode;
use crate::operand::{Operand, classify};

/// A validated instruction that has not been numbered yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub opcode: Opcode,
    pub operands: Vec<Operand>,
}

/// Interpret a single cleaned, non-empty line.
///
/// `line_num` is only used for error context.
pub fn interpret(line: &str, line_num: usize) -> Result<Command> {
    let mut parts = line.split_whitespace();
    let name = parts.next().unwrap_or("");

    let opcode = Opcode::lookup(name).ok_or_else(|| ParseError::UnknownOpcode {
        line: line_num,
        opcode: name.to_string(),
    })?;

    let tokens: Vec<&str> = parts.collect();
    let permitted = opcode.operands();

    if tokens.len() != permitted.len() {
        return Err(ParseError::ArityMismatch {
            line: line_num,
            opcode: opcode.as_str(),
            expected: permitted.len(),
            found: tokens.len(),
        });
    }

    let operands = tokens
        .iter()
        .zip(permitted)
        .enumerate()
        .map(|(i, (token, &kinds))| {
            classify(token, kinds).ok_or_else(|| ParseError::OperandType {
                line: line_num,
                opcode: opcode.as_str(),
                position: i + 1,
                token: token.to_string(),
                expected: kinds.to_string(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Command { opcode, operands })
}
