//! Push/pop emission
//!
//! push: effective address -> D -> top-of-stack slot, then SP++.
//! pop: SP--, value -> D, then into the effective address.
//!
//! Indirect pops fold the index into the base cell, write through it,
//! then subtract the index back out, so the base pointer is restored to
//! its original value on exit. Direct cells need no scratch at all.

use super::Translator;
use crate::error::TranslateErrorKind;
use crate::instruction::Segment;
use crate::segment::{resolve, AddressingStrategy};

impl Translator {
    pub(super) fn emit_push(&mut self, segment: Segment, index: u16) -> Result<(), TranslateErrorKind> {
        match resolve(segment, index)? {
            AddressingStrategy::Constant => {
                self.asm.emit_at(index.to_string());
                self.asm.emit("D=A");
            }
            AddressingStrategy::Indirect { base } => {
                self.asm.emit_at(index.to_string());
                self.asm.emit("D=A");
                self.asm.emit_at(base);
                self.asm.emit("A=D+M");
                self.asm.emit("D=M");
            }
            AddressingStrategy::Static => {
                self.asm.emit_at(self.static_symbol(index));
                self.asm.emit("D=M");
            }
            AddressingStrategy::Fixed { address } => {
                self.asm.emit_at(address.to_string());
                self.asm.emit("D=M");
            }
            AddressingStrategy::Register { cell } => {
                self.asm.emit_at(cell);
                self.asm.emit("D=M");
            }
        }
        self.push_d();
        Ok(())
    }

    pub(super) fn emit_pop(&mut self, segment: Segment, index: u16) -> Result<(), TranslateErrorKind> {
        match resolve(segment, index)? {
            AddressingStrategy::Constant => {
                return Err(TranslateErrorKind::InvalidDirectionForSegment(segment))
            }
            AddressingStrategy::Indirect { base } => {
                self.asm.emit_at(index.to_string());
                self.asm.emit("D=A");
                self.asm.emit_at(base);
                self.asm.emit("M=D+M");
                self.pop_d();
                self.asm.emit_at(base);
                self.asm.emit("A=M");
                self.asm.emit("M=D");
                self.asm.emit_at(index.to_string());
                self.asm.emit("D=A");
                self.asm.emit_at(base);
                self.asm.emit("M=M-D");
            }
            AddressingStrategy::Static => {
                self.pop_d();
                self.asm.emit_at(self.static_symbol(index));
                self.asm.emit("M=D");
            }
            AddressingStrategy::Fixed { address } => {
                self.pop_d();
                self.asm.emit_at(address.to_string());
                self.asm.emit("M=D");
            }
            AddressingStrategy::Register { cell } => {
                self.pop_d();
                self.asm.emit_at(cell);
                self.asm.emit("M=D");
            }
        }
        Ok(())
    }

    /// `*SP = D; SP++`
    pub(super) fn push_d(&mut self) {
        self.asm.emit_at("SP");
        self.asm.emit("A=M");
        self.asm.emit("M=D");
        self.asm.emit_at("SP");
        self.asm.emit("M=M+1");
    }

    /// `SP--; D = *SP`
    pub(super) fn pop_d(&mut self) {
        self.asm.emit_at("SP");
        self.asm.emit("M=M-1");
        self.asm.emit("A=M");
        self.asm.emit("D=M");
    }
}
