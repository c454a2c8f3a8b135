//! Dump the validated program model as JSON.

use crate::processor::ProcessedProgram;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

pub fn emit(program: &ProcessedProgram, path: &Path) -> io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut out, program.model())?;
    writeln!(out)?;
    out.flush()
}
