//! VM source parsing
//!
//! Thin line-level front end: strips comments and blank lines, splits
//! mnemonics from operands, and maps them onto the closed [`Command`]
//! set. Everything the translator trusts about operand arity and value
//! signs is enforced here.

use crate::error::{TranslateError, TranslateErrorKind, TranslateResult};
use crate::instruction::{ArithOp, Command, Segment, TranslationUnit};

/// Parse one VM source module into a translation unit
///
/// `name` is the unit name (input file stem); it scopes static variables
/// and labels during translation. Errors carry the zero-based source
/// line index of the offending instruction.
pub fn parse_unit(name: &str, source: &str) -> TranslateResult<TranslationUnit> {
    let mut commands = Vec::new();
    for (line_index, raw) in source.lines().enumerate() {
        let line = strip_comment(raw).trim();
        if line.is_empty() {
            continue;
        }
        let command = parse_line(line)
            .map_err(|kind| TranslateError::new(kind, name, None, line_index))?;
        commands.push(command);
    }
    Ok(TranslationUnit::new(name, commands))
}

/// Drop a trailing `//` comment, if any
fn strip_comment(line: &str) -> &str {
    match line.find("//") {
        Some(pos) => &line[..pos],
        None => line,
    }
}

/// Parse a single significant line into a command
pub fn parse_line(line: &str) -> Result<Command, TranslateErrorKind> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let Some((mnemonic, args)) = fields.split_first() else {
        return Err(malformed(line, "empty command"));
    };

    match *mnemonic {
        "push" => {
            let (segment, index) = parse_access(line, args)?;
            Ok(Command::Push(segment, index))
        }
        "pop" => {
            let (segment, index) = parse_access(line, args)?;
            Ok(Command::Pop(segment, index))
        }
        "label" => Ok(Command::Label(parse_label_name(line, args)?)),
        "goto" => Ok(Command::Goto(parse_label_name(line, args)?)),
        "if-goto" => Ok(Command::IfGoto(parse_label_name(line, args)?)),
        "function" => {
            let (name, n_locals) = parse_callable(line, args)?;
            Ok(Command::Function(name, n_locals))
        }
        "call" => {
            let (name, n_args) = parse_callable(line, args)?;
            Ok(Command::Call(name, n_args))
        }
        "return" => {
            expect_arity(line, args, 0)?;
            Ok(Command::Return)
        }
        op => {
            let op = parse_arith(op)?;
            expect_arity(line, args, 0)?;
            Ok(Command::Arithmetic(op))
        }
    }
}

fn parse_arith(op: &str) -> Result<ArithOp, TranslateErrorKind> {
    match op {
        "add" => Ok(ArithOp::Add),
        "sub" => Ok(ArithOp::Sub),
        "neg" => Ok(ArithOp::Neg),
        "eq" => Ok(ArithOp::Eq),
        "gt" => Ok(ArithOp::Gt),
        "lt" => Ok(ArithOp::Lt),
        "and" => Ok(ArithOp::And),
        "or" => Ok(ArithOp::Or),
        "not" => Ok(ArithOp::Not),
        other => Err(TranslateErrorKind::UnknownOpcode(other.to_string())),
    }
}

fn parse_segment(name: &str) -> Result<Segment, TranslateErrorKind> {
    match name {
        "constant" => Ok(Segment::Constant),
        "local" => Ok(Segment::Local),
        "argument" => Ok(Segment::Argument),
        "this" => Ok(Segment::This),
        "that" => Ok(Segment::That),
        "static" => Ok(Segment::Static),
        "temp" => Ok(Segment::Temp),
        "pointer" => Ok(Segment::Pointer),
        other => Err(TranslateErrorKind::InvalidSegment(other.to_string())),
    }
}

/// Parse `<segment> <index>` operands of push/pop
fn parse_access(line: &str, args: &[&str]) -> Result<(Segment, u16), TranslateErrorKind> {
    expect_arity(line, args, 2)?;
    let segment = parse_segment(args[0])?;
    let index = parse_index(line, args[1])?;
    Ok((segment, index))
}

/// Parse `<name> <count>` operands of function/call
fn parse_callable(line: &str, args: &[&str]) -> Result<(String, u16), TranslateErrorKind> {
    expect_arity(line, args, 2)?;
    let name = args[0].to_string();
    let count: i32 = args[1]
        .parse()
        .map_err(|_| malformed(line, format!("'{}' is not an integer", args[1])))?;
    if count < 0 {
        return Err(TranslateErrorKind::NegativeArity(count, name));
    }
    let count = u16::try_from(count).map_err(|_| malformed(line, "count too large"))?;
    Ok((name, count))
}

fn parse_index(line: &str, text: &str) -> Result<u16, TranslateErrorKind> {
    let index: i32 = text
        .parse()
        .map_err(|_| malformed(line, format!("'{}' is not an integer", text)))?;
    if index < 0 {
        return Err(malformed(line, "negative segment index"));
    }
    u16::try_from(index).map_err(|_| malformed(line, "segment index too large"))
}

fn parse_label_name(line: &str, args: &[&str]) -> Result<String, TranslateErrorKind> {
    expect_arity(line, args, 1)?;
    Ok(args[0].to_string())
}

fn expect_arity(line: &str, args: &[&str], expected: usize) -> Result<(), TranslateErrorKind> {
    if args.len() != expected {
        return Err(malformed(
            line,
            format!("expected {} operand(s), found {}", expected, args.len()),
        ));
    }
    Ok(())
}

fn malformed(line: &str, reason: impl Into<String>) -> TranslateErrorKind {
    TranslateErrorKind::MalformedCommand {
        line: line.to_string(),
        reason: reason.into(),
    }
}
