//! VM-to-assembly translation driver
//!
//! One `Translator` spans one whole program: it is fed translation units
//! in caller order and appends each instruction's expansion to a single
//! output buffer. Label-uniqueness and call-site counters are global
//! across the program and are never reset between units, so identical
//! instructions never mint identical synthetic labels. A `Translator`
//! is single-use; independent program translations need fresh instances.
//!
//! - Commands leave the stack-pointer invariant intact: SP always holds
//!   the address of the next free stack slot on emitter exit
//! - Output ordering mirrors input instruction ordering exactly

use std::collections::HashSet;

use crate::asm::Assembly;
use crate::error::{TranslateError, TranslateErrorKind, TranslateResult};
use crate::instruction::{Command, TranslationUnit};

mod arith;
mod call;
mod flow;
mod memory;

/// Whether to emit the program bootstrap preamble
///
/// `On` is for linking a multi-unit program around `Sys.init`; a
/// standalone single-file translation passes `Off`. The choice is always
/// the caller's, never inferred from the units themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bootstrap {
    /// Initialize the stack pointer and call `Sys.init` before any unit
    On,
    /// Start executing at the first translated instruction
    Off,
}

/// Translation driver state
pub struct Translator {
    /// Accumulated output program
    asm: Assembly,
    /// Current unit name (scopes statics and labels)
    unit: String,
    /// Current function, `None` at unit top level
    function: Option<String>,
    /// Comparison label counter, one increment per eq/gt/lt
    cmp_labels: u32,
    /// Call-site counter for return-address labels
    call_sites: u32,
    /// Every label definition emitted so far, for the collision invariant
    defined_labels: HashSet<String>,
}

impl Translator {
    /// Create a driver, emitting the bootstrap preamble when asked to
    pub fn new(bootstrap: Bootstrap) -> Self {
        let mut translator = Self {
            asm: Assembly::new(),
            unit: "Bootstrap".to_string(),
            function: None,
            cmp_labels: 0,
            call_sites: 0,
            defined_labels: HashSet::new(),
        };
        if bootstrap == Bootstrap::On {
            translator
                .emit_bootstrap()
                .expect("bootstrap mints the first labels of the program");
        }
        translator
    }

    /// Translate one unit, appending its expansion to the output
    ///
    /// Resets the unit name and function context, never the counters.
    pub fn translate(&mut self, unit: &TranslationUnit) -> TranslateResult<()> {
        self.unit = unit.name.clone();
        self.function = None;
        for (index, command) in unit.commands.iter().enumerate() {
            self.translate_command(command).map_err(|kind| {
                TranslateError::new(kind, unit.name.clone(), self.function.clone(), index)
            })?;
        }
        Ok(())
    }

    /// Take the finished assembly program
    pub fn finish(self) -> Vec<String> {
        self.asm.into_lines()
    }

    /// Dispatch one instruction to its emitter
    fn translate_command(&mut self, command: &Command) -> Result<(), TranslateErrorKind> {
        match command {
            Command::Arithmetic(op) => self.emit_arithmetic(*op)?,
            Command::Push(segment, index) => self.emit_push(*segment, *index)?,
            Command::Pop(segment, index) => self.emit_pop(*segment, *index)?,
            Command::Label(name) => self.emit_flow_label(name)?,
            Command::Goto(name) => self.emit_goto(name),
            Command::IfGoto(name) => self.emit_if_goto(name),
            Command::Function(name, n_locals) => self.emit_function(name, *n_locals)?,
            Command::Call(name, n_args) => self.emit_call(name, *n_args)?,
            Command::Return => self.emit_return(),
        }
        Ok(())
    }

    // ===== Context helpers shared by the emitters =====

    /// Render a label name with the current scope baked in:
    /// `unit.function$name`, or `unit$name` outside any function
    fn scoped_label(&self, name: &str) -> String {
        match &self.function {
            Some(function) => format!("{}.{}${}", self.unit, function, name),
            None => format!("{}${}", self.unit, name),
        }
    }

    /// Unit-scoped static variable symbol
    fn static_symbol(&self, index: u16) -> String {
        format!("{}.{}", self.unit, index)
    }

    /// Mint a fresh comparison label pair; one counter tick per call
    fn fresh_cmp_labels(&mut self) -> (String, String) {
        let n = self.cmp_labels;
        self.cmp_labels += 1;
        (format!("CMP_TRUE.{}", n), format!("CMP_END.{}", n))
    }

    /// Mint a fresh call-site return label, scoped to the caller
    fn fresh_return_label(&mut self) -> String {
        let n = self.call_sites;
        self.call_sites += 1;
        self.scoped_label(&format!("ret.{}", n))
    }

    /// Emit a label definition, enforcing program-wide uniqueness
    fn define_label(&mut self, name: &str) -> Result<(), TranslateErrorKind> {
        if !self.defined_labels.insert(name.to_string()) {
            return Err(TranslateErrorKind::UnscopedLabelCollision(name.to_string()));
        }
        self.asm.emit_label(name);
        Ok(())
    }
}

/// Translate a whole program in caller order with one shared driver
pub fn translate_program(
    units: &[TranslationUnit],
    bootstrap: Bootstrap,
) -> TranslateResult<Vec<String>> {
    let mut translator = Translator::new(bootstrap);
    for unit in units {
        translator.translate(unit)?;
    }
    Ok(translator.finish())
}
