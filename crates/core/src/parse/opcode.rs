//! Op-code file parser (§6), out of the core's scope but needed to drive the
//! scheduler end to end. Grounded on the donor's `getOpCodes`/`getOpCommand`
//! (`MetaDataAccess.c`): exact header/footer text, semicolon-delimited
//! `L(name)value` records, and a start/end balance check.
//!
//! The donor's balance check is dead code: it recomputes `endCount` with the
//! same `updateStartCount` helper used for `startCount`, so the two counters
//! are always numerically identical and the check can never fail. Since §6
//! states the balance invariant as a requirement to enforce, this parser
//! tracks start and end occurrences independently rather than reproducing
//! that bug.

use std::fs;
use std::path::Path;

use crate::error::OpCodeError;
use crate::opcode::{OpCode, OpLetter, OpName, Program};

const HEADER: &str = "Start Program Meta-Data Code:";
const FOOTER: &str = "End Program Meta-Data Code.";
const MAX_VALUE_DIGITS: usize = 9;

/// Parses and validates an op-code file at `path`.
///
/// # Errors
///
/// Returns [`OpCodeError`] if the file cannot be read, the header/footer is
/// wrong, a record is malformed, a letter or name is unrecognized, a value
/// has more than 9 digits, or the `S`/`A` start and end counts don't balance.
pub fn parse_opcode_file(path: &Path) -> Result<Program, OpCodeError> {
    let text = fs::read_to_string(path).map_err(|source| OpCodeError::FileAccess {
        path: path.to_path_buf(),
        source,
    })?;
    parse_opcode_str(&text)
}

fn parse_opcode_str(text: &str) -> Result<Program, OpCodeError> {
    let trimmed = text.trim();
    let body = trimmed
        .strip_prefix(HEADER)
        .ok_or(OpCodeError::CorruptDescriptor(HEADER))?;
    let body = body
        .trim_end()
        .strip_suffix(FOOTER)
        .ok_or(OpCodeError::CorruptDescriptor(FOOTER))?;

    let mut ops = Vec::new();
    let mut start_count = 0u32;
    let mut end_count = 0u32;

    for record in body.split(';') {
        let record = record.trim();
        if record.is_empty() {
            continue;
        }
        let op = parse_record(record)?;

        if matches!(op.letter, OpLetter::S | OpLetter::A) {
            match op.name {
                OpName::Start => start_count += 1,
                OpName::End => end_count += 1,
                _ => {}
            }
        }

        ops.push(op);
    }

    if start_count != end_count {
        return Err(OpCodeError::UnbalancedStartEnd);
    }

    Ok(Program::new(ops))
}

fn parse_record(record: &str) -> Result<OpCode, OpCodeError> {
    let mut chars = record.chars();
    let letter_char = chars
        .next()
        .ok_or_else(|| OpCodeError::CorruptLetter('\0'))?;
    let letter = OpLetter::from_char(letter_char).ok_or(OpCodeError::CorruptLetter(letter_char))?;

    let rest = chars.as_str();
    let rest = rest
        .strip_prefix('(')
        .ok_or_else(|| OpCodeError::CorruptName(record.to_string()))?;
    let (name_str, after_paren) = rest
        .split_once(')')
        .ok_or_else(|| OpCodeError::CorruptName(record.to_string()))?;
    let name = OpName::from_str(name_str).ok_or_else(|| OpCodeError::CorruptName(name_str.to_string()))?;

    let value_str = after_paren.trim();
    if value_str.is_empty() || value_str.len() > MAX_VALUE_DIGITS || !value_str.bytes().all(|b| b.is_ascii_digit()) {
        return Err(OpCodeError::CorruptValue(value_str.to_string()));
    }
    let value: u32 = value_str
        .parse()
        .map_err(|_| OpCodeError::CorruptValue(value_str.to_string()))?;

    Ok(OpCode::new(letter, name, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn wrap(body: &str) -> String {
        format!("Start Program Meta-Data Code:{body}End Program Meta-Data Code.")
    }

    #[test]
    fn parses_a_well_formed_single_process_program() {
        let text = wrap("S(start)0;A(start)0;P(run)3;A(end)0;S(end)0");
        let program = parse_opcode_str(&text).unwrap();
        assert_eq!(program.len(), 5);
        assert_eq!(program.get(2).unwrap().value, 3);
    }

    #[test]
    fn rejects_wrong_header() {
        let text = "Start Program Meta Data Code:S(start)0;S(end)0End Program Meta-Data Code.";
        assert!(matches!(parse_opcode_str(text), Err(OpCodeError::CorruptDescriptor(_))));
    }

    #[test]
    fn rejects_wrong_footer() {
        let text = "Start Program Meta-Data Code:S(start)0;S(end)0End Program MetaData Code.";
        assert!(matches!(parse_opcode_str(text), Err(OpCodeError::CorruptDescriptor(_))));
    }

    #[test]
    fn rejects_unknown_letter() {
        let text = wrap("X(run)3;S(start)0;S(end)0");
        assert!(matches!(parse_opcode_str(&text), Err(OpCodeError::CorruptLetter('X'))));
    }

    #[test]
    fn rejects_unknown_name() {
        let text = wrap("P(sleep)3;S(start)0;S(end)0");
        assert!(matches!(parse_opcode_str(&text), Err(OpCodeError::CorruptName(_))));
    }

    #[test]
    fn rejects_value_over_nine_digits() {
        let text = wrap("P(run)1234567890;S(start)0;S(end)0");
        assert!(matches!(parse_opcode_str(&text), Err(OpCodeError::CorruptValue(_))));
    }

    #[test]
    fn rejects_non_numeric_value() {
        let text = wrap("P(run)abc;S(start)0;S(end)0");
        assert!(matches!(parse_opcode_str(&text), Err(OpCodeError::CorruptValue(_))));
    }

    #[test]
    fn rejects_unbalanced_start_end() {
        let text = wrap("S(start)0;A(start)0;A(start)0;P(run)3;A(end)0;S(end)0");
        assert!(matches!(parse_opcode_str(&text), Err(OpCodeError::UnbalancedStartEnd)));
    }

    #[test]
    fn memory_command_packs_and_parses_through() {
        let text = wrap("M(allocate)3045120;S(start)0;S(end)0");
        let program = parse_opcode_str(&text).unwrap();
        assert_eq!(program.get(0).unwrap().memory_command(), (3, 45, 120));
    }
}
