//! JSON output for CLI commands

use std::io::{self, Write};

use serde_json::Value;

use super::errors::CliResult;

/// Write one JSON line to stdout
pub fn write_json(value: &Value) -> CliResult<()> {
    write_json_to(value, &mut io::stdout())
}

fn write_json_to<W: Write>(value: &Value, writer: &mut W) -> CliResult<()> {
    serde_json::to_writer(&mut *writer, value)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
