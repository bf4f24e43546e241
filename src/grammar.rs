//! Instruction grammar table.
//!
//! Every opcode maps to a fixed list of permitted operand kinds, one entry per
//! operand position. The table is an exhaustive `match`, so adding an opcode
//! without its operand list fails to compile.

use crate::operand::KindSet;
use phf::phf_map;
use std::fmt;

const NONE: &[KindSet] = &[];
const VAR: &[KindSet] = &[KindSet::VAR];
const LABEL: &[KindSet] = &[KindSet::LABEL];
const SYMB: &[KindSet] = &[KindSet::SYMBOL];
const VAR_SYMB: &[KindSet] = &[KindSet::VAR, KindSet::SYMBOL];
const VAR_TYPE: &[KindSet] = &[KindSet::VAR, KindSet::TYPE];
const VAR_SYMB_SYMB: &[KindSet] = &[KindSet::VAR, KindSet::SYMBOL, KindSet::SYMBOL];
const LABEL_SYMB_SYMB: &[KindSet] = &[KindSet::LABEL, KindSet::SYMBOL, KindSet::SYMBOL];

/// IPPcode24 opcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Opcode {
    // Frames and calls
    Move,
    CreateFrame,
    PushFrame,
    PopFrame,
    DefVar,
    Call,
    Return,

    // Data stack
    PushS,
    PopS,

    // Arithmetic, relational, boolean and conversion
    Add,
    Sub,
    Mul,
    IDiv,
    Lt,
    Gt,
    Eq,
    And,
    Or,
    Not,
    Int2Char,
    Stri2Int,

    // I/O
    Read,
    Write,

    // Strings
    Concat,
    StrLen,
    GetChar,
    SetChar,

    // Types
    Type,

    // Control flow
    Label,
    Jump,
    JumpIfEq,
    JumpIfNeq,
    Exit,

    // Debugging
    DPrint,
    Break,
}

/// Canonical opcode names (compile-time perfect hash map).
static OPCODES: phf::Map<&'static str, Opcode> = phf_map! {
    "MOVE" => Opcode::Move,
    "CREATEFRAME" => Opcode::CreateFrame,
    "PUSHFRAME" => Opcode::PushFrame,
    "POPFRAME" => Opcode::PopFrame,
    "DEFVAR" => Opcode::DefVar,
    "CALL" => Opcode::Call,
    "RETURN" => Opcode::Return,
    "PUSHS" => Opcode::PushS,
    "POPS" => Opcode::PopS,
    "ADD" => Opcode::Add,
    "SUB" => Opcode::Sub,
    "MUL" => Opcode::Mul,
    "IDIV" => Opcode::IDiv,
    "LT" => Opcode::Lt,
    "GT" => Opcode::Gt,
    "EQ" => Opcode::Eq,
    "AND" => Opcode::And,
    "OR" => Opcode::Or,
    "NOT" => Opcode::Not,
    "INT2CHAR" => Opcode::Int2Char,
    "STRI2INT" => Opcode::Stri2Int,
    "READ" => Opcode::Read,
    "WRITE" => Opcode::Write,
    "CONCAT" => Opcode::Concat,
    "STRLEN" => Opcode::StrLen,
    "GETCHAR" => Opcode::GetChar,
    "SETCHAR" => Opcode::SetChar,
    "TYPE" => Opcode::Type,
    "LABEL" => Opcode::Label,
    "JUMP" => Opcode::Jump,
    "JUMPIFEQ" => Opcode::JumpIfEq,
    "JUMPIFNEQ" => Opcode::JumpIfNeq,
    "EXIT" => Opcode::Exit,
    "DPRINT" => Opcode::DPrint,
    "BREAK" => Opcode::Break,
};

impl Opcode {
    /// Look up an opcode by name, ignoring ASCII case.
    pub fn lookup(name: &str) -> Option<Self> {
        OPCODES.get(name.to_ascii_uppercase().as_str()).copied()
    }

    /// Iterate over every opcode in the table.
    pub fn all() -> impl Iterator<Item = Opcode> {
        OPCODES.values().copied()
    }

    /// Canonical upper-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Opcode::Move => "MOVE",
            Opcode::CreateFrame => "CREATEFRAME",
            Opcode::PushFrame => "PUSHFRAME",
            Opcode::PopFrame => "POPFRAME",
            Opcode::DefVar => "DEFVAR",
            Opcode::Call => "CALL",
            Opcode::Return => "RETURN",
            Opcode::PushS => "PUSHS",
            Opcode::PopS => "POPS",
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Mul => "MUL",
            Opcode::IDiv => "IDIV",
            Opcode::Lt => "LT",
            Opcode::Gt => "GT",
            Opcode::Eq => "EQ",
            Opcode::And => "AND",
            Opcode::Or => "OR",
            Opcode::Not => "NOT",
            Opcode::Int2Char => "INT2CHAR",
            Opcode::Stri2Int => "STRI2INT",
            Opcode::Read => "READ",
            Opcode::Write => "WRITE",
            Opcode::Concat => "CONCAT",
            Opcode::StrLen => "STRLEN",
            Opcode::GetChar => "GETCHAR",
            Opcode::SetChar => "SETCHAR",
            Opcode::Type => "TYPE",
            Opcode::Label => "LABEL",
            Opcode::Jump => "JUMP",
            Opcode::JumpIfEq => "JUMPIFEQ",
            Opcode::JumpIfNeq => "JUMPIFNEQ",
            Opcode::Exit => "EXIT",
            Opcode::DPrint => "DPRINT",
            Opcode::Break => "BREAK",
        }
    }

    /// Permitted operand kinds, one entry per operand position.
    pub fn operands(&self) -> &'static [KindSet] {
        match self {
            Opcode::CreateFrame
            | Opcode::PushFrame
            | Opcode::PopFrame
            | Opcode::Return
            | Opcode::Break => NONE,

            Opcode::DefVar | Opcode::PopS => VAR,
            Opcode::Call | Opcode::Label | Opcode::Jump => LABEL,
            Opcode::PushS | Opcode::Write | Opcode::Exit | Opcode::DPrint => SYMB,

            Opcode::Move | Opcode::Int2Char | Opcode::StrLen | Opcode::Type | Opcode::Not => {
                VAR_SYMB
            }
            Opcode::Read => VAR_TYPE,

            Opcode::Add
            | Opcode::Sub
            | Opcode::Mul
            | Opcode::IDiv
            | Opcode::Lt
            | Opcode::Gt
            | Opcode::Eq
            | Opcode::And
            | Opcode::Or
            | Opcode::Stri2Int
            | Opcode::Concat
            | Opcode::GetChar
            | Opcode::SetChar => VAR_SYMB_SYMB,
            Opcode::JumpIfEq | Opcode::JumpIfNeq => LABEL_SYMB_SYMB,
        }
    }

    /// Number of operands the opcode takes.
    pub fn arity(&self) -> usize {
        self.operands().len()
    }

    /// Opcodes whose first operand names a jump target.
    pub fn is_label_jump(&self) -> bool {
        matches!(
            self,
            Opcode::Call | Opcode::Jump | Opcode::JumpIfEq | Opcode::JumpIfNeq
        )
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
