//! Label/goto/if-goto emission
//!
//! All three render the label with the current scope baked in before
//! touching the output, so identical label text in two functions can
//! never collide once assembled.

use super::Translator;
use crate::error::TranslateErrorKind;

impl Translator {
    pub(super) fn emit_flow_label(&mut self, name: &str) -> Result<(), TranslateErrorKind> {
        let scoped = self.scoped_label(name);
        self.define_label(&scoped)
    }

    pub(super) fn emit_goto(&mut self, name: &str) {
        let scoped = self.scoped_label(name);
        self.asm.emit_at(scoped);
        self.asm.emit("0;JMP");
    }

    /// Pop the top value and jump when it is non-zero
    ///
    /// SP is decremented whether or not the branch is taken.
    pub(super) fn emit_if_goto(&mut self, name: &str) {
        let scoped = self.scoped_label(name);
        self.pop_d();
        self.asm.emit_at(scoped);
        self.asm.emit("D;JNE");
    }
}
