//! XML document emitter.
//!
//! Writes directly into a pre-sized `String`: no `format!()` per node, static
//! tag names, indentation by repeated `push_str`.

use crate::LANGUAGE;
use crate::operand::{Operand, OperandKind, xml_escape};
use crate::program::{Instruction, Program};

/// Estimated bytes per instruction in XML output (for buffer pre-allocation).
const BYTES_PER_INSTRUCTION: usize = 64;

/// Estimated bytes per operand.
const BYTES_PER_OPERAND: usize = 40;

/// Operand element tags, by position.
const ARG_TAGS: [&str; 3] = ["arg1", "arg2", "arg3"];

/// Render a validated program as an XML document.
pub fn program_to_xml(program: &Program) -> String {
    XmlWriter::with_capacity(program).write_program(program)
}

/// XML writer for a [`Program`].
pub struct XmlWriter {
    output: String,
    indent: usize,
}

impl XmlWriter {
    /// Create a writer with a capacity hint based on program size.
    pub fn with_capacity(program: &Program) -> Self {
        let operands: usize = program.instructions.iter().map(|i| i.operands.len()).sum();
        let capacity =
            128 + program.len() * BYTES_PER_INSTRUCTION + operands * BYTES_PER_OPERAND;
        Self {
            output: String::with_capacity(capacity),
            indent: 0,
        }
    }

    /// Write the whole document.
    pub fn write_program(mut self, program: &Program) -> String {
        self.output
            .push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");

        self.output.push_str("<program language=\"");
        self.output.push_str(LANGUAGE);
        self.output.push_str("\">\n");
        self.indent += 1;

        for instruction in &program.instructions {
            self.write_instruction(instruction);
        }

        self.indent -= 1;
        self.output.push_str("</program>\n");
        self.output
    }

    #[inline]
    fn write_indent(&mut self) {
        for _ in 0..self.indent {
            self.output.push_str("  ");
        }
    }

    fn write_instruction(&mut self, instruction: &Instruction) {
        self.write_indent();
        self.output.push_str("<instruction order=\"");
        self.output.push_str(&instruction.order.to_string());
        self.output.push_str("\" opcode=\"");
        self.output.push_str(instruction.opcode.as_str());

        if instruction.operands.is_empty() {
            self.output.push_str("\"/>\n");
            return;
        }
        self.output.push_str("\">\n");

        self.indent += 1;
        for (tag, operand) in ARG_TAGS.iter().zip(&instruction.operands) {
            self.write_operand(tag, operand);
        }
        self.indent -= 1;

        self.write_indent();
        self.output.push_str("</instruction>\n");
    }

    fn write_operand(&mut self, tag: &str, operand: &Operand) {
        self.write_indent();
        self.output.push('<');
        self.output.push_str(tag);
        self.output.push_str(" type=\"");
        self.output.push_str(operand.kind.as_str());
        self.output.push_str("\">");
        match operand.kind {
            // String payloads are escaped at classification; names may still hold `&`.
            OperandKind::Variable | OperandKind::Label => {
                self.output.push_str(&xml_escape(&operand.payload))
            }
            _ => self.output.push_str(&operand.payload),
        }
        self.output.push_str("</");
        self.output.push_str(tag);
        self.output.push_str(">\n");
    }
}
