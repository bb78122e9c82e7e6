//! Segment addressing resolution
//!
//! Maps a (segment, index) pair onto the addressing strategy the memory
//! emitter needs. Pure lookup: no side effects, no emitted code.

use crate::error::TranslateErrorKind;
use crate::instruction::Segment;

/// Largest literal loadable by an address instruction (15-bit operand)
pub const MAX_CONSTANT: u16 = 0x7FFF;

/// Base address of the eight temp cells
pub const TEMP_BASE: u16 = 5;

/// How a resolved segment reference is addressed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressingStrategy {
    /// Not a memory location: the value is the index literal itself
    Constant,
    /// Effective address = contents of the named base cell + index
    Indirect { base: &'static str },
    /// Unit-scoped symbol `{unit}.{index}`, allocated by the assembler
    Static,
    /// Direct cell at a fixed numeric address
    Fixed { address: u16 },
    /// Direct named cell (the THIS/THAT base cells themselves)
    Register { cell: &'static str },
}

/// Resolve a segment reference to its addressing strategy
///
/// Validates the index ranges that are knowable at translation time:
/// pointer is {0,1}, temp is 0-7, constant must fit an address operand.
pub fn resolve(segment: Segment, index: u16) -> Result<AddressingStrategy, TranslateErrorKind> {
    match segment {
        Segment::Constant => {
            if index > MAX_CONSTANT {
                return Err(out_of_range(segment, index, MAX_CONSTANT));
            }
            Ok(AddressingStrategy::Constant)
        }
        Segment::Local => Ok(AddressingStrategy::Indirect { base: "LCL" }),
        Segment::Argument => Ok(AddressingStrategy::Indirect { base: "ARG" }),
        Segment::This => Ok(AddressingStrategy::Indirect { base: "THIS" }),
        Segment::That => Ok(AddressingStrategy::Indirect { base: "THAT" }),
        Segment::Static => Ok(AddressingStrategy::Static),
        Segment::Temp => {
            if index > 7 {
                return Err(out_of_range(segment, index, 7));
            }
            Ok(AddressingStrategy::Fixed {
                address: TEMP_BASE + index,
            })
        }
        Segment::Pointer => match index {
            0 => Ok(AddressingStrategy::Register { cell: "THIS" }),
            1 => Ok(AddressingStrategy::Register { cell: "THAT" }),
            _ => Err(out_of_range(segment, index, 1)),
        },
    }
}

fn out_of_range(segment: Segment, index: u16, max: u16) -> TranslateErrorKind {
    TranslateErrorKind::IndexOutOfRange {
        segment,
        index,
        max,
    }
}
