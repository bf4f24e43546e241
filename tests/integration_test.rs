//! Integration tests for the IPPcode24 parser.
//!
//! In-memory runs cover the error taxonomy and document shape; the sample
//! programs under `tests/programs/` cover file and directory mode.

use ippcode_parser::error::{
    EXIT_INPUT, EXIT_MISSING_HEADER, EXIT_SYNTAX, EXIT_UNKNOWN_OPCODE, ParseError,
};
use ippcode_parser::operand::OperandKind;
use ippcode_parser::program::build;
use ippcode_parser::stats::{StatGroup, Statistics};
use ippcode_parser::{
    ParseOptions, parse_directory, parse_file, parse_source, translate, write_result,
};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};

// =============================================================================
// Helper Functions
// =============================================================================

fn programs_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("programs")
}

fn orders(xml: &str) -> Vec<usize> {
    xml.lines()
        .filter_map(|line| line.split("order=\"").nth(1))
        .filter_map(|rest| rest.split('"').next())
        .map(|n| n.parse().expect("order is numeric"))
        .collect()
}

// =============================================================================
// In-Memory Tests
// =============================================================================

#[test]
fn test_full_document() {
    let source = "\
.IPPcode24
# swap two values
DEFVAR GF@a
DEFVAR GF@b
MOVE GF@a string@x<y
ADD GF@b GF@b int@-1   # decrement
JUMPIFNEQ skip GF@a nil@nil
CREATEFRAME
LABEL skip
";
    let expected = "\
<?xml version=\"1.0\" encoding=\"UTF-8\"?>
<program language=\"IPPcode24\">
  <instruction order=\"1\" opcode=\"DEFVAR\">
    <arg1 type=\"var\">GF@a</arg1>
  </instruction>
  <instruction order=\"2\" opcode=\"DEFVAR\">
    <arg1 type=\"var\">GF@b</arg1>
  </instruction>
  <instruction order=\"3\" opcode=\"MOVE\">
    <arg1 type=\"var\">GF@a</arg1>
    <arg2 type=\"string\">x&lt;y</arg2>
  </instruction>
  <instruction order=\"4\" opcode=\"ADD\">
    <arg1 type=\"var\">GF@b</arg1>
    <arg2 type=\"var\">GF@b</arg2>
    <arg3 type=\"int\">-1</arg3>
  </instruction>
  <instruction order=\"5\" opcode=\"JUMPIFNEQ\">
    <arg1 type=\"label\">skip</arg1>
    <arg2 type=\"var\">GF@a</arg2>
    <arg3 type=\"nil\">nil</arg3>
  </instruction>
  <instruction order=\"6\" opcode=\"CREATEFRAME\"/>
  <instruction order=\"7\" opcode=\"LABEL\">
    <arg1 type=\"label\">skip</arg1>
  </instruction>
</program>
";
    assert_eq!(translate(source).expect("Translation failed"), expected);
}

#[test]
fn test_output_is_deterministic() {
    let source = fs::read_to_string(programs_dir().join("frames.src")).unwrap();
    let first = translate(&source).unwrap();
    let second = translate(&source).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_defvar_single_operand() {
    let program = build([".IPPcode24", "DEFVAR GF@x"]).unwrap();
    assert_eq!(program.instructions.len(), 1);
    let instruction = &program.instructions[0];
    assert_eq!(instruction.opcode.as_str(), "DEFVAR");
    assert_eq!(instruction.operands.len(), 1);
    assert_eq!(instruction.operands[0].kind, OperandKind::Variable);
    assert_eq!(instruction.operands[0].payload, "GF@x");
}

#[test]
fn test_add_operand_kinds_in_order() {
    let program = build([".IPPcode24", "ADD GF@x GF@y int@1"]).unwrap();
    let kinds: Vec<_> = program.instructions[0]
        .operands
        .iter()
        .map(|op| op.kind)
        .collect();
    assert_eq!(
        kinds,
        vec![OperandKind::Variable, OperandKind::Variable, OperandKind::Int]
    );
}

#[test]
fn test_int_payload_and_failure() {
    let program = build([".IPPcode24", "PUSHS int@42"]).unwrap();
    assert_eq!(program.instructions[0].operands[0].payload, "42");

    let err = build([".IPPcode24", "PUSHS int@abc"]).unwrap_err();
    assert!(matches!(err, ParseError::OperandType { position: 1, .. }));
    assert_eq!(err.exit_code(), EXIT_SYNTAX);
}

#[test]
fn test_string_escaping() {
    let program = build([".IPPcode24", "WRITE string@a&b"]).unwrap();
    assert_eq!(program.instructions[0].operands[0].payload, "a&amp;b");
}

#[test]
fn test_missing_header_wins_over_valid_lines() {
    let err = translate("DEFVAR GF@x\nWRITE GF@x\n").unwrap_err();
    assert!(matches!(err, ParseError::MissingHeader { line: 1, .. }));
    assert_eq!(err.exit_code(), EXIT_MISSING_HEADER);
}

#[test]
fn test_missing_header_before_bad_instruction() {
    // The header check happens before any instruction is looked at.
    let err = translate("FOO\n").unwrap_err();
    assert_eq!(err.exit_code(), EXIT_MISSING_HEADER);
}

#[test]
fn test_unknown_opcode() {
    let err = translate(".IPPcode24\nFOO\n").unwrap_err();
    assert!(matches!(err, ParseError::UnknownOpcode { line: 2, .. }));
    assert_eq!(err.exit_code(), EXIT_UNKNOWN_OPCODE);
}

#[test]
fn test_arity_mismatch() {
    let err = translate(".IPPcode24\nJUMPIFEQ label1 GF@x\n").unwrap_err();
    match &err {
        ParseError::ArityMismatch {
            opcode,
            expected,
            found,
            ..
        } => {
            assert_eq!(*opcode, "JUMPIFEQ");
            assert_eq!(*expected, 3);
            assert_eq!(*found, 2);
        }
        other => panic!("expected ArityMismatch, got {:?}", other),
    }
    assert_eq!(err.exit_code(), EXIT_SYNTAX);
}

#[test]
fn test_orders_skip_blank_and_comment_lines() {
    let source = ".IPPcode24\n\nBREAK\n# c\n   \nBREAK\nBREAK # trailing\n";
    let xml = translate(source).unwrap();
    assert_eq!(orders(&xml), vec![1, 2, 3]);
}

#[test]
fn test_zero_arity_has_no_children() {
    let xml = translate(".IPPcode24\nCREATEFRAME\nPUSHFRAME\nPOPFRAME\nRETURN\nBREAK\n").unwrap();
    assert!(!xml.contains("<arg"));
    assert_eq!(xml.matches("\"/>").count(), 5);
}

#[test]
fn test_collect_all_reports_every_line() {
    let options = ParseOptions {
        collect_all: true,
        ..Default::default()
    };
    let result = parse_source(
        ".IPPcode24\nFOO\nMOVE GF@x\nWRITE int@\nBREAK\n",
        "bad.src",
        options,
    );
    assert_eq!(result.errors.len(), 3);
    assert_eq!(result.exit_code(), EXIT_UNKNOWN_OPCODE);
    assert!(result.xml.is_empty());
}

// =============================================================================
// File Tests
// =============================================================================

#[test]
fn test_factorial_program() {
    let result = parse_file(&programs_dir().join("factorial.src"));
    assert!(result.is_ok(), "errors: {:?}", result.errors);
    assert_eq!(orders(&result.xml), (1..=13).collect::<Vec<_>>());
    assert!(result.xml.contains("<arg2 type=\"type\">int</arg2>"));
    assert!(result.xml.contains(r#"<arg1 type="string">\010</arg1>"#));
}

#[test]
fn test_frames_program() {
    let result = parse_file(&programs_dir().join("frames.src"));
    assert!(result.is_ok(), "errors: {:?}", result.errors);
    assert_eq!(result.program.as_ref().map(|p| p.len()), Some(16));
    assert!(
        result
            .xml
            .contains(r#"<arg2 type="string">Hello,\032&lt;world&gt;\032&amp;\032co.</arg2>"#)
    );
}

#[test]
fn test_bad_operand_program() {
    let result = parse_file(&programs_dir().join("bad_operand.src"));
    assert!(!result.is_ok());
    assert_eq!(result.exit_code(), EXIT_SYNTAX);
    assert!(matches!(
        result.errors[0],
        ParseError::OperandType { line: 3, position: 2, .. }
    ));
}

#[test]
fn test_missing_file() {
    let result = parse_file(&programs_dir().join("does_not_exist.src"));
    assert_eq!(result.exit_code(), EXIT_INPUT);
}

#[test]
fn test_factorial_statistics() {
    let result = parse_file(&programs_dir().join("factorial.src"));
    let stats = Statistics::collect(result.program.as_ref().unwrap());
    assert_eq!(stats.loc, 13);
    assert_eq!(stats.comments, 2);
    assert_eq!(stats.labels, 2);
    assert_eq!(stats.jumps, 2);
    assert_eq!(stats.fwjumps, 1);
    assert_eq!(stats.backjumps, 1);
    assert_eq!(stats.badjumps, 0);
    assert_eq!(
        stats.render(&[StatGroup::Frequent, StatGroup::Loc]),
        "DEFVAR,LABEL,WRITE\n13\n"
    );
}

// =============================================================================
// Directory Tests
// =============================================================================

#[test]
fn test_directory_mode() {
    let temp = tempfile::tempdir().unwrap();
    for name in ["factorial.src", "frames.src", "bad_operand.src"] {
        fs::copy(programs_dir().join(name), temp.path().join(name)).unwrap();
    }
    fs::write(temp.path().join("notes.txt"), "not a program").unwrap();

    let results = parse_directory(temp.path(), ParseOptions::default());
    let names: Vec<_> = results.iter().map(|r| r.filename.as_str()).collect();
    assert_eq!(names, vec!["bad_operand.src", "factorial.src", "frames.src"]);

    let out = tempfile::tempdir().unwrap();
    for result in results.iter().filter(|r| r.is_ok()) {
        write_result(result, out.path()).unwrap();
    }

    assert!(out.path().join("factorial.xml").exists());
    assert!(out.path().join("frames.xml").exists());
    assert!(!out.path().join("bad_operand.xml").exists());

    let written = fs::read_to_string(out.path().join("factorial.xml")).unwrap();
    assert_eq!(written, results[1].xml);
}

#[test]
fn test_empty_directory() {
    let temp = tempfile::tempdir().unwrap();
    assert!(parse_directory(temp.path(), ParseOptions::default()).is_empty());
}
