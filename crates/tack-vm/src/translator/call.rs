//! Function call protocol emission
//!
//! Frame layout, from the callee's LCL downwards: saved THAT, THIS,
//! ARG, LCL, then the return address at LCL-5, with the caller's pushed
//! arguments below that. `call` builds the frame, `function` extends it
//! with zeroed locals, `return` collapses it back to the caller leaving
//! one return value where argument 0 used to sit.

use super::Translator;
use crate::error::TranslateErrorKind;

/// Saved caller base-pointer cells, in push order
const FRAME_CELLS: [&str; 4] = ["LCL", "ARG", "THIS", "THAT"];

/// Initial stack pointer value installed by the bootstrap preamble
const STACK_BASE: u16 = 256;

impl Translator {
    /// `function f k`: entry label, then k zero-initialized local slots
    pub(super) fn emit_function(
        &mut self,
        name: &str,
        n_locals: u16,
    ) -> Result<(), TranslateErrorKind> {
        // Function names are global; the entry label is unscoped.
        self.define_label(name)?;
        self.function = Some(name.to_string());
        for _ in 0..n_locals {
            self.asm.emit_at("SP");
            self.asm.emit("A=M");
            self.asm.emit("M=0");
            self.asm.emit_at("SP");
            self.asm.emit("M=M+1");
        }
        Ok(())
    }

    /// `call f n`: push the return address and caller frame, reposition
    /// ARG and LCL for the callee, transfer control
    pub(super) fn emit_call(&mut self, name: &str, n_args: u16) -> Result<(), TranslateErrorKind> {
        let return_label = self.fresh_return_label();

        self.asm.emit_at(&return_label);
        self.asm.emit("D=A");
        self.push_d();
        for cell in FRAME_CELLS {
            self.asm.emit_at(cell);
            self.asm.emit("D=M");
            self.push_d();
        }
        // ARG = SP - 5 - n: the callee sees its n arguments at
        // argument 0..n
        self.asm.emit_at("SP");
        self.asm.emit("D=M");
        self.asm.emit_at((u32::from(n_args) + 5).to_string());
        self.asm.emit("D=D-A");
        self.asm.emit_at("ARG");
        self.asm.emit("M=D");
        // LCL = SP
        self.asm.emit_at("SP");
        self.asm.emit("D=M");
        self.asm.emit_at("LCL");
        self.asm.emit("M=D");
        self.asm.emit_at(name);
        self.asm.emit("0;JMP");
        self.define_label(&return_label)
    }

    /// `return`: collapse the frame, leave the return value at the
    /// caller's argument 0, resume after the call site
    pub(super) fn emit_return(&mut self) {
        // R13 = frame anchor (the callee's LCL)
        self.asm.emit_at("LCL");
        self.asm.emit("D=M");
        self.asm.emit_at("R13");
        self.asm.emit("M=D");
        // R14 = return address at frame-5. Captured first: with zero
        // arguments, ARG points at this very slot and the return value
        // write below would clobber it.
        self.asm.emit_at("5");
        self.asm.emit("A=D-A");
        self.asm.emit("D=M");
        self.asm.emit_at("R14");
        self.asm.emit("M=D");
        // *ARG = return value (current top of stack)
        self.pop_d();
        self.asm.emit_at("ARG");
        self.asm.emit("A=M");
        self.asm.emit("M=D");
        // SP = ARG + 1, discarding the frame and the call arguments
        self.asm.emit_at("ARG");
        self.asm.emit("D=M+1");
        self.asm.emit_at("SP");
        self.asm.emit("M=D");
        // Restore the caller's base pointers, inverse of the save order
        for (offset, cell) in FRAME_CELLS.iter().rev().enumerate() {
            self.asm.emit_at("R13");
            self.asm.emit("D=M");
            self.asm.emit_at((offset + 1).to_string());
            self.asm.emit("A=D-A");
            self.asm.emit("D=M");
            self.asm.emit_at(cell);
            self.asm.emit("M=D");
        }
        self.asm.emit_at("R14");
        self.asm.emit("A=M");
        self.asm.emit("0;JMP");
    }

    /// One-time program preamble: SP = 256, then `call Sys.init 0`
    pub(super) fn emit_bootstrap(&mut self) -> Result<(), TranslateErrorKind> {
        self.asm.emit_at(STACK_BASE.to_string());
        self.asm.emit("D=A");
        self.asm.emit_at("SP");
        self.asm.emit("M=D");
        self.emit_call("Sys.init", 0)
    }
}
