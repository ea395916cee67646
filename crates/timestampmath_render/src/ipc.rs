use std::fs::File;
use std::path::Path;

use arrow::ipc::reader::FileReader;
use arrow::ipc::writer::FileWriter;
use timestampmath::Table;

use crate::error::{RenderError, Result};

/// Read an Arrow IPC file. Each record batch becomes one chunk per column.
pub fn read_table(path: &Path) -> Result<Table> {
    let file = File::open(path).map_err(|e| RenderError::io(path, e))?;
    let reader = FileReader::try_new(file, None).map_err(|e| RenderError::arrow(path, e))?;
    let schema = reader.schema();
    let batches = reader
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| RenderError::arrow(path, e))?;
    Ok(Table::from_batches(schema, &batches)?)
}

/// Write `table` as an Arrow IPC file, one record batch per chunk.
pub fn write_table(path: &Path, table: &Table) -> Result<()> {
    let batches = table.to_batches()?;
    let file = File::create(path).map_err(|e| RenderError::io(path, e))?;
    let mut writer =
        FileWriter::try_new(file, &table.schema()).map_err(|e| RenderError::arrow(path, e))?;
    for batch in &batches {
        writer.write(batch).map_err(|e| RenderError::arrow(path, e))?;
    }
    writer.finish().map_err(|e| RenderError::arrow(path, e))?;
    Ok(())
}
