use std::io::Write;

use serde::Serialize;
use serde_json::Value;

use crate::error::CliError;

/// Write `value` as pretty JSON followed by a newline.
pub fn write_json<W: Write, T: Serialize>(writer: &mut W, value: &T) -> Result<(), CliError> {
    serde_json::to_writer_pretty(&mut *writer, value)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Write one record per line. The caller flushes.
pub fn write_ndjson<W: Write>(
    writer: &mut W,
    records: &[Value],
    buf: &mut Vec<u8>,
) -> Result<(), CliError> {
    for record in records {
        buf.clear();
        serde_json::to_writer(&mut *buf, record)?;
        buf.push(b'\n');
        writer.write_all(buf)?;
    }
    Ok(())
}
