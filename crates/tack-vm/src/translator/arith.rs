//! Arithmetic/logical emission
//!
//! Binary ops pop y into D, point A at x (`A=M-1`) and combine in
//! place, for a net stack effect of -1. Unary ops rewrite the top slot,
//! net effect 0. Comparisons expand to a branch over a false/true
//! materialization pair: `0` for false, `-1` (all one-bits) for true.

use super::Translator;
use crate::error::TranslateErrorKind;
use crate::instruction::ArithOp;

impl Translator {
    pub(super) fn emit_arithmetic(&mut self, op: ArithOp) -> Result<(), TranslateErrorKind> {
        match op {
            ArithOp::Add => self.emit_binary("M=D+M"),
            ArithOp::Sub => self.emit_binary("M=M-D"),
            ArithOp::And => self.emit_binary("M=D&M"),
            ArithOp::Or => self.emit_binary("M=D|M"),
            ArithOp::Neg => self.emit_unary("M=-M"),
            ArithOp::Not => self.emit_unary("M=!M"),
            // Comparisons order the difference so the jump predicate
            // reads in source order: x <op> y.
            ArithOp::Eq => return self.emit_comparison("D=D-M", "JEQ"),
            ArithOp::Gt => return self.emit_comparison("D=M-D", "JGT"),
            ArithOp::Lt => return self.emit_comparison("D=M-D", "JLT"),
        }
        Ok(())
    }

    /// Pop y into D, then apply `combine` with A pointing at x
    fn emit_binary(&mut self, combine: &str) {
        self.pop_d();
        self.asm.emit_at("SP");
        self.asm.emit("A=M-1");
        self.asm.emit(combine);
    }

    /// Rewrite the top stack slot in place
    fn emit_unary(&mut self, rewrite: &str) {
        self.asm.emit_at("SP");
        self.asm.emit("A=M-1");
        self.asm.emit(rewrite);
    }

    /// Signed-difference comparison with a fresh label pair
    ///
    /// With D = y and M = x, `difference` leaves the signed difference
    /// in D; `jump` branches on it to the true block. Each call ticks
    /// the label counter exactly once, so two translations of the same
    /// op never share label text.
    fn emit_comparison(&mut self, difference: &str, jump: &str) -> Result<(), TranslateErrorKind> {
        let (true_label, end_label) = self.fresh_cmp_labels();
        self.pop_d();
        self.asm.emit_at("SP");
        self.asm.emit("A=M-1");
        self.asm.emit(difference);
        self.asm.emit_at(&true_label);
        self.asm.emit(format!("D;{}", jump));
        self.asm.emit_at("SP");
        self.asm.emit("A=M-1");
        self.asm.emit("M=0");
        self.asm.emit_at(&end_label);
        self.asm.emit("0;JMP");
        self.define_label(&true_label)?;
        self.asm.emit_at("SP");
        self.asm.emit("A=M-1");
        self.asm.emit("M=-1");
        self.define_label(&end_label)
    }
}
