//! Test-only execution harness for emitted assembly
//!
//! A minimal symbolic assembler plus CPU interpreter for the 16-bit
//! target machine, just enough to run translated programs and observe
//! their memory. Shipped code never resolves symbols; this exists so
//! the tests can check the translator's output under execution instead
//! of only by text.

use std::collections::HashMap;

/// Well-known RAM cells
pub const SP: usize = 0;
pub const LCL: usize = 1;
pub const ARG: usize = 2;
pub const THIS: usize = 3;
pub const THAT: usize = 4;

/// One decoded instruction
#[derive(Debug, Clone)]
enum Instr {
    /// `@value`: load A
    At(i16),
    /// `dest=comp;jump`
    Compute {
        dest_a: bool,
        dest_d: bool,
        dest_m: bool,
        comp: String,
        jump: String,
    },
}

/// Assembled program on a simulated machine
pub struct Machine {
    rom: Vec<Instr>,
    pub ram: Vec<i16>,
    pc: usize,
    a: i16,
    d: i16,
    steps: usize,
}

impl Machine {
    /// Assemble the emitted lines and load them at address 0
    pub fn load(lines: &[String]) -> Self {
        let symbols = collect_symbols(lines);
        let mut rom = Vec::new();
        for line in lines {
            if line.starts_with('(') {
                continue;
            }
            rom.push(decode(line, &symbols));
        }
        Self {
            rom,
            ram: vec![0; 0x8000],
            pc: 0,
            a: 0,
            d: 0,
            steps: 0,
        }
    }

    /// Run until control falls off the end of the program or parks in a
    /// one-instruction idle loop. Panics if `max_steps` is exhausted.
    pub fn run(&mut self, max_steps: usize) {
        while self.pc < self.rom.len() {
            assert!(
                self.steps < max_steps,
                "program did not halt within {max_steps} steps"
            );
            self.steps += 1;
            match self.rom[self.pc].clone() {
                Instr::At(value) => {
                    self.a = value;
                    self.pc += 1;
                }
                Instr::Compute {
                    dest_a,
                    dest_d,
                    dest_m,
                    comp,
                    jump,
                } => {
                    let addr = address(self.a);
                    let value = self.eval(&comp, addr);
                    if dest_m {
                        self.ram[addr] = value;
                    }
                    if dest_a {
                        self.a = value;
                    }
                    if dest_d {
                        self.d = value;
                    }
                    if taken(&jump, value) {
                        let target = address(self.a);
                        if self.pc > 0 && target == self.pc - 1 {
                            // @HERE / 0;JMP idle loop: treat as halt
                            return;
                        }
                        self.pc = target;
                    } else {
                        self.pc += 1;
                    }
                }
            }
        }
    }

    /// Current stack pointer
    pub fn sp(&self) -> i16 {
        self.ram[SP]
    }

    /// Value just below the stack pointer
    pub fn stack_top(&self) -> i16 {
        self.ram[address(self.sp()) - 1]
    }

    fn eval(&self, comp: &str, addr: usize) -> i16 {
        let a = self.a;
        let d = self.d;
        let m = self.ram[addr];
        match comp {
            "0" => 0,
            "1" => 1,
            "-1" => -1,
            "D" => d,
            "A" => a,
            "M" => m,
            "!D" => !d,
            "!A" => !a,
            "!M" => !m,
            "-D" => d.wrapping_neg(),
            "-A" => a.wrapping_neg(),
            "-M" => m.wrapping_neg(),
            "D+1" => d.wrapping_add(1),
            "A+1" => a.wrapping_add(1),
            "M+1" => m.wrapping_add(1),
            "D-1" => d.wrapping_sub(1),
            "A-1" => a.wrapping_sub(1),
            "M-1" => m.wrapping_sub(1),
            "D+A" | "A+D" => d.wrapping_add(a),
            "D+M" | "M+D" => d.wrapping_add(m),
            "D-A" => d.wrapping_sub(a),
            "D-M" => d.wrapping_sub(m),
            "A-D" => a.wrapping_sub(d),
            "M-D" => m.wrapping_sub(d),
            "D&A" | "A&D" => d & a,
            "D&M" | "M&D" => d & m,
            "D|A" | "A|D" => d | a,
            "D|M" | "M|D" => d | m,
            other => panic!("unknown computation '{other}'"),
        }
    }
}

fn address(value: i16) -> usize {
    usize::try_from(value).expect("address must be non-negative")
}

fn taken(jump: &str, value: i16) -> bool {
    match jump {
        "" => false,
        "JGT" => value > 0,
        "JEQ" => value == 0,
        "JGE" => value >= 0,
        "JLT" => value < 0,
        "JNE" => value != 0,
        "JLE" => value <= 0,
        "JMP" => true,
        other => panic!("unknown jump '{other}'"),
    }
}

/// Two-pass symbol resolution: label markers first, then variables
fn collect_symbols(lines: &[String]) -> HashMap<String, i16> {
    let mut symbols: HashMap<String, i16> = HashMap::new();
    for (name, cell) in [
        ("SP", 0),
        ("LCL", 1),
        ("ARG", 2),
        ("THIS", 3),
        ("THAT", 4),
        ("SCREEN", 16384),
        ("KBD", 24576),
    ] {
        symbols.insert(name.to_string(), cell);
    }
    for r in 0..16 {
        symbols.insert(format!("R{r}"), r);
    }

    let mut address = 0i16;
    for line in lines {
        if let Some(name) = line.strip_prefix('(').and_then(|l| l.strip_suffix(')')) {
            assert!(
                !symbols.contains_key(name),
                "duplicate label definition '{name}'"
            );
            symbols.insert(name.to_string(), address);
        } else {
            address += 1;
        }
    }

    let mut next_variable = 16i16;
    for line in lines {
        if let Some(symbol) = line.strip_prefix('@') {
            if symbol.parse::<i16>().is_ok() || symbols.contains_key(symbol) {
                continue;
            }
            symbols.insert(symbol.to_string(), next_variable);
            next_variable += 1;
        }
    }
    symbols
}

fn decode(line: &str, symbols: &HashMap<String, i16>) -> Instr {
    if let Some(symbol) = line.strip_prefix('@') {
        let value = symbol
            .parse::<i16>()
            .ok()
            .or_else(|| symbols.get(symbol).copied())
            .unwrap_or_else(|| panic!("unresolved symbol '{symbol}'"));
        return Instr::At(value);
    }

    let (dest, rest) = match line.split_once('=') {
        Some((dest, rest)) => (dest, rest),
        None => ("", line),
    };
    let (comp, jump) = match rest.split_once(';') {
        Some((comp, jump)) => (comp, jump),
        None => (rest, ""),
    };
    Instr::Compute {
        dest_a: dest.contains('A'),
        dest_d: dest.contains('D'),
        dest_m: dest.contains('M'),
        comp: comp.to_string(),
        jump: jump.to_string(),
    }
}
