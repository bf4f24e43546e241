//! Operand kinds and the operand classifier.
//!
//! A token is classified against the set of kinds its position permits. The
//! kind prefixes (`int@`, `bool@`, `string@`, `nil@`, `GF@`/`LF@`/`TF@`) are
//! mutually exclusive, so at most one permitted kind can match a token.

use bitflags::bitflags;
use std::fmt;

/// Frame prefixes a variable may carry.
pub const FRAMES: &[&str] = &["GF", "LF", "TF"];

/// Non-alphanumeric characters allowed in variable and label names.
pub const NAME_SPECIALS: &[char] = &['_', '-', '$', '&', '%', '*', '!', '?'];

/// Type names accepted by `READ`.
pub const TYPE_NAMES: &[&str] = &["int", "string", "bool", "nil"];

/// Concrete operand kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperandKind {
    Variable,
    Label,
    Int,
    Bool,
    String,
    Nil,
    Type,
}

impl OperandKind {
    /// All kinds, in the order classification tries them.
    pub const ALL: [OperandKind; 7] = [
        OperandKind::Variable,
        OperandKind::Label,
        OperandKind::Int,
        OperandKind::Bool,
        OperandKind::String,
        OperandKind::Nil,
        OperandKind::Type,
    ];

    /// Name used in the `type` attribute of the XML document.
    pub fn as_str(&self) -> &'static str {
        match self {
            OperandKind::Variable => "var",
            OperandKind::Label => "label",
            OperandKind::Int => "int",
            OperandKind::Bool => "bool",
            OperandKind::String => "string",
            OperandKind::Nil => "nil",
            OperandKind::Type => "type",
        }
    }

    /// The single-kind set for this kind.
    pub fn flag(&self) -> KindSet {
        match self {
            OperandKind::Variable => KindSet::VAR,
            OperandKind::Label => KindSet::LABEL,
            OperandKind::Int => KindSet::INT,
            OperandKind::Bool => KindSet::BOOL,
            OperandKind::String => KindSet::STRING,
            OperandKind::Nil => KindSet::NIL,
            OperandKind::Type => KindSet::TYPE,
        }
    }

    /// Match `token` against this kind's syntax and return its payload.
    fn extract(&self, token: &str) -> Option<String> {
        match self {
            OperandKind::Variable => {
                let (frame, name) = token.split_once('@')?;
                (FRAMES.contains(&frame) && is_name(name)).then(|| token.to_string())
            }
            OperandKind::Label => is_name(token).then(|| token.to_string()),
            OperandKind::Int => {
                let value = token.strip_prefix("int@")?;
                is_decimal(value).then(|| value.to_string())
            }
            OperandKind::Bool => match token {
                "bool@true" | "bool@false" => Some(token["bool@".len()..].to_string()),
                _ => None,
            },
            OperandKind::String => {
                let value = token.strip_prefix("string@")?;
                is_string_literal(value).then(|| xml_escape(value))
            }
            OperandKind::Nil => (token == "nil@nil").then(|| "nil".to_string()),
            OperandKind::Type => TYPE_NAMES.contains(&token).then(|| token.to_string()),
        }
    }
}

impl fmt::Display for OperandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

bitflags! {
    /// Set of operand kinds permitted at one operand position.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct KindSet: u8 {
        const VAR = 1 << 0;
        const LABEL = 1 << 1;
        const INT = 1 << 2;
        const BOOL = 1 << 3;
        const STRING = 1 << 4;
        const NIL = 1 << 5;
        const TYPE = 1 << 6;
        /// A variable or any constant.
        const SYMBOL = Self::VAR.bits()
            | Self::INT.bits()
            | Self::BOOL.bits()
            | Self::STRING.bits()
            | Self::NIL.bits();
    }
}

impl KindSet {
    /// Check whether `kind` is a member of this set.
    pub fn permits(&self, kind: OperandKind) -> bool {
        self.contains(kind.flag())
    }
}

impl fmt::Display for KindSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == KindSet::SYMBOL {
            return f.write_str("symbol");
        }

        let mut first = true;
        for kind in OperandKind::ALL.iter().filter(|k| self.permits(**k)) {
            if !first {
                f.write_str(" or ")?;
            }
            f.write_str(kind.as_str())?;
            first = false;
        }
        Ok(())
    }
}

/// A classified operand.
///
/// The payload has the kind prefix removed. Variables have no kind prefix,
/// so their payload keeps the frame (`GF@x`). String payloads are XML-escaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operand {
    pub kind: OperandKind,
    pub payload: String,
}

impl Operand {
    pub fn new(kind: OperandKind, payload: impl Into<String>) -> Self {
        Self {
            kind,
            payload: payload.into(),
        }
    }
}

/// Classify `token` against the `permitted` kinds.
///
/// Returns `None` when no permitted kind matches the token's syntax.
pub fn classify(token: &str, permitted: KindSet) -> Option<Operand> {
    OperandKind::ALL
        .iter()
        .filter(|kind| permitted.permits(**kind))
        .find_map(|&kind| kind.extract(token).map(|payload| Operand { kind, payload }))
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || NAME_SPECIALS.contains(&c)
}

/// Check a variable or label name: no leading digit, non-empty.
pub fn is_name(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || NAME_SPECIALS.contains(&c) => {
            chars.all(is_name_char)
        }
        _ => false,
    }
}

/// Optional sign followed by at least one decimal digit.
fn is_decimal(s: &str) -> bool {
    let digits = s.strip_prefix(['+', '-']).unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// String literal body: no whitespace, `#` or bare backslash; `\DDD` escapes only.
fn is_string_literal(s: &str) -> bool {
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                for _ in 0..3 {
                    if !chars.next().is_some_and(|d| d.is_ascii_digit()) {
                        return false;
                    }
                }
            }
            '#' => return false,
            c if c.is_whitespace() => return false,
            _ => {}
        }
    }
    true
}

/// Escape `&`, `<` and `>` for XML text content.
pub fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}
