//! Tack command line
//!
//! Thin wrapper around the `tack-vm` core: discovers input files,
//! parses them into translation units, runs the translator, writes the
//! assembly output. All translation semantics live in the library.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tack_vm::{parse_unit, translate_program, Bootstrap, Command, TranslationUnit};
use walkdir::WalkDir;

/// VM-to-assembly translator for the 16-bit stack platform.
///
/// Translates `.vm` modules into one `.asm` program for the downstream
/// assembler.
///
/// EXAMPLES:
///     tack Main.vm              Translate one file (no bootstrap)
///     tack project/             Link a directory into one program
///     tack project/ -o out.asm  Choose the output path
///
/// A directory input links every `.vm` file it contains and emits the
/// bootstrap preamble, which hands control to `Sys.init`; a single-file
/// input skips the preamble. Both defaults can be overridden with
/// --bootstrap / --no-bootstrap.
#[derive(Parser)]
#[command(name = "tack")]
#[command(version)]
struct Cli {
    /// A `.vm` file, or a directory of `.vm` files to link
    input: PathBuf,

    /// Output file (default: input with the `.asm` extension, or
    /// `<dir>/<dirname>.asm` for a directory)
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// Emit the bootstrap preamble even for a single-file input
    #[arg(long, conflicts_with = "no_bootstrap")]
    bootstrap: bool,

    /// Skip the bootstrap preamble even for a directory input
    #[arg(long)]
    no_bootstrap: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let linked = cli.input.is_dir();
    let bootstrap = if cli.bootstrap {
        Bootstrap::On
    } else if cli.no_bootstrap || !linked {
        Bootstrap::Off
    } else {
        Bootstrap::On
    };

    let units = load_units(&cli.input)?;
    if bootstrap == Bootstrap::On && !defines_entry_point(&units) {
        bail!(
            "bootstrap requires a 'function Sys.init' definition; \
             none found in {}",
            cli.input.display()
        );
    }

    let lines = translate_program(&units, bootstrap)?;

    let output = cli.output.unwrap_or_else(|| default_output(&cli.input));
    fs::write(&output, lines.join("\n") + "\n")
        .with_context(|| format!("failed to write {}", output.display()))?;
    println!("{}: {} instructions", output.display(), lines.len());
    Ok(())
}

/// Read and parse the input file, or every `.vm` file of a directory
fn load_units(input: &Path) -> Result<Vec<TranslationUnit>> {
    let paths = if input.is_dir() {
        let mut paths: Vec<PathBuf> = WalkDir::new(input)
            .max_depth(1)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.into_path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "vm"))
            .collect();
        if paths.is_empty() {
            bail!("no .vm files found in {}", input.display());
        }
        // Deterministic link order
        paths.sort();
        paths
    } else {
        if input.extension().map_or(true, |ext| ext != "vm") {
            bail!("expected a .vm file or a directory, got {}", input.display());
        }
        vec![input.to_path_buf()]
    };

    let mut units = Vec::with_capacity(paths.len());
    for path in &paths {
        let source = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .with_context(|| format!("invalid file name {}", path.display()))?;
        units.push(parse_unit(name, &source)?);
    }
    Ok(units)
}

/// Whether any unit defines the bootstrap entry function
fn defines_entry_point(units: &[TranslationUnit]) -> bool {
    units.iter().any(|unit| {
        unit.commands
            .iter()
            .any(|command| matches!(command, Command::Function(name, _) if name == "Sys.init"))
    })
}

fn default_output(input: &Path) -> PathBuf {
    if input.is_dir() {
        let program = input
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "out".to_string());
        input.join(format!("{program}.asm"))
    } else {
        input.with_extension("asm")
    }
}
