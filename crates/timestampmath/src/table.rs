use std::sync::Arc;

use arrow::array::{new_empty_array, Array, ArrayRef, TimestampNanosecondArray};
use arrow::compute::concat;
use arrow::datatypes::{DataType, Field, FieldRef, Schema, SchemaRef, TimeUnit};
use arrow::record_batch::RecordBatch;

use crate::error::{Result, TsMathError};

/// Naive nanosecond timestamps, the only input type the engines accept.
pub fn timestamp_ns() -> DataType {
    DataType::Timestamp(TimeUnit::Nanosecond, None)
}

/// A named, chunked column. Every chunk has the field's data type.
#[derive(Debug, Clone)]
pub struct Column {
    field: FieldRef,
    chunks: Vec<ArrayRef>,
}

impl Column {
    pub fn try_new(field: impl Into<FieldRef>, chunks: Vec<ArrayRef>) -> Result<Self> {
        let field = field.into();
        for chunk in &chunks {
            if chunk.data_type() != field.data_type() {
                return Err(TsMathError::type_mismatch(
                    field.name(),
                    field.data_type().clone(),
                    chunk.data_type(),
                ));
            }
        }
        Ok(Column { field, chunks })
    }

    /// Single-chunk nullable column.
    pub fn from_array(name: &str, array: ArrayRef) -> Self {
        let field = Field::new(name, array.data_type().clone(), true);
        Column {
            field: Arc::new(field),
            chunks: vec![array],
        }
    }

    pub fn name(&self) -> &str {
        self.field.name()
    }

    pub fn field(&self) -> &FieldRef {
        &self.field
    }

    pub fn data_type(&self) -> &DataType {
        self.field.data_type()
    }

    pub fn chunks(&self) -> &[ArrayRef] {
        &self.chunks
    }

    pub fn num_chunks(&self) -> usize {
        self.chunks.len()
    }

    pub fn len(&self) -> usize {
        self.chunks.iter().map(|c| c.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn null_count(&self) -> usize {
        self.chunks.iter().map(|c| c.null_count()).sum()
    }

    pub fn chunk_lengths(&self) -> Vec<usize> {
        self.chunks.iter().map(|c| c.len()).collect()
    }

    /// Returns this column's data cut at the given chunk boundaries.
    /// Chunks are shared, not copied, when the layout already matches.
    pub fn rechunk(&self, lengths: &[usize]) -> Result<Vec<ArrayRef>> {
        if self.chunk_lengths() == lengths {
            return Ok(self.chunks.clone());
        }

        let total: usize = lengths.iter().sum();
        if total != self.len() {
            return Err(TsMathError::LengthMismatch {
                column: self.name().to_string(),
                expected: total,
                found: self.len(),
            });
        }

        let whole = if self.chunks.is_empty() {
            new_empty_array(self.data_type())
        } else {
            let parts: Vec<&dyn Array> = self.chunks.iter().map(|c| c.as_ref()).collect();
            concat(&parts)?
        };

        let mut offset = 0;
        Ok(lengths
            .iter()
            .map(|&len| {
                let chunk = whole.slice(offset, len);
                offset += len;
                chunk
            })
            .collect())
    }
}

/// The column cut at `layout`, each chunk downcast to nanosecond timestamps.
pub(crate) fn timestamp_chunks(
    column: &Column,
    layout: &[usize],
) -> Result<Vec<TimestampNanosecondArray>> {
    if *column.data_type() != timestamp_ns() {
        return Err(TsMathError::type_mismatch(
            column.name(),
            timestamp_ns(),
            column.data_type(),
        ));
    }
    column
        .rechunk(layout)?
        .iter()
        .map(|chunk| {
            chunk
                .as_any()
                .downcast_ref::<TimestampNanosecondArray>()
                .cloned()
                .ok_or_else(|| {
                    TsMathError::type_mismatch(column.name(), timestamp_ns(), chunk.data_type())
                })
        })
        .collect()
}

/// Ordered set of uniquely named, equal-length columns.
#[derive(Debug, Clone, Default)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    pub fn try_new(columns: Vec<Column>) -> Result<Self> {
        let mut table = Table::default();
        for column in columns {
            table.append_column(column)?;
        }
        Ok(table)
    }

    /// One chunk per record batch, per column.
    pub fn from_batches(schema: SchemaRef, batches: &[RecordBatch]) -> Result<Self> {
        let columns = schema
            .fields()
            .iter()
            .enumerate()
            .map(|(i, field)| {
                let chunks = batches.iter().map(|b| b.column(i).clone()).collect();
                Column::try_new(field.clone(), chunks)
            })
            .collect::<Result<Vec<_>>>()?;
        Table::try_new(columns)
    }

    /// One batch per chunk when every column shares a chunk layout,
    /// otherwise a single batch holding the concatenated columns.
    pub fn to_batches(&self) -> Result<Vec<RecordBatch>> {
        let schema = self.schema();
        let Some(first) = self.columns.first() else {
            return Ok(vec![]);
        };

        let layout = first.chunk_lengths();
        if self.columns.iter().all(|c| c.chunk_lengths() == layout) {
            return (0..layout.len())
                .map(|i| -> Result<RecordBatch> {
                    let arrays = self.columns.iter().map(|c| c.chunks[i].clone()).collect();
                    Ok(RecordBatch::try_new(schema.clone(), arrays)?)
                })
                .collect();
        }

        let layout = [self.num_rows()];
        let mut arrays = Vec::with_capacity(self.columns.len());
        for column in &self.columns {
            arrays.extend(column.rechunk(&layout)?);
        }
        Ok(vec![RecordBatch::try_new(schema, arrays)?])
    }

    pub fn schema(&self) -> SchemaRef {
        let fields: Vec<FieldRef> = self.columns.iter().map(|c| c.field.clone()).collect();
        Arc::new(Schema::new(fields))
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name()).collect()
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn num_rows(&self) -> usize {
        self.columns.first().map_or(0, |c| c.len())
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name() == name)
    }

    pub fn column(&self, name: &str) -> Result<&Column> {
        self.columns
            .iter()
            .find(|c| c.name() == name)
            .ok_or_else(|| TsMathError::ColumnNotFound(name.to_string()))
    }

    pub fn remove_column(&mut self, name: &str) -> Option<Column> {
        let index = self.index_of(name)?;
        Some(self.columns.remove(index))
    }

    pub fn append_column(&mut self, column: Column) -> Result<()> {
        if self.index_of(column.name()).is_some() {
            return Err(TsMathError::DuplicateColumn(column.name().to_string()));
        }
        self.check_len(&column)?;
        self.columns.push(column);
        Ok(())
    }

    /// Replace the column at `index`, keeping its position.
    pub fn set_column(&mut self, index: usize, column: Column) -> Result<()> {
        match self.index_of(column.name()) {
            Some(existing) if existing != index => {
                return Err(TsMathError::DuplicateColumn(column.name().to_string()));
            }
            _ => {}
        }
        if index >= self.columns.len() {
            return Err(TsMathError::ColumnNotFound(format!("#{index}")));
        }
        self.check_len(&column)?;
        self.columns[index] = column;
        Ok(())
    }

    /// Drop any column with the same name, then append at the end.
    /// A replaced column loses its original position.
    pub fn replace_or_append(&mut self, column: Column) -> Result<()> {
        self.remove_column(column.name());
        self.append_column(column)
    }

    fn check_len(&self, column: &Column) -> Result<()> {
        if self.columns.is_empty() || column.len() == self.num_rows() {
            return Ok(());
        }
        Err(TsMathError::LengthMismatch {
            column: column.name().to_string(),
            expected: self.num_rows(),
            found: column.len(),
        })
    }
}
