use std::sync::Arc;

use arrow::array::{Array, ArrayRef, TimestampNanosecondArray};
use arrow::datatypes::Field;
use tracing::instrument;

use crate::error::{Result, TsMathError};
use crate::table::{timestamp_chunks, timestamp_ns, Column};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extreme {
    Minimum,
    Maximum,
}

impl Extreme {
    /// Null is the identity: a null only survives when both sides are null.
    pub fn combine(self, x: Option<i64>, y: Option<i64>) -> Option<i64> {
        match (x, y) {
            (None, y) => y,
            (x, None) => x,
            (Some(a), Some(b)) => Some(match self {
                Extreme::Minimum => a.min(b),
                Extreme::Maximum => a.max(b),
            }),
        }
    }
}

/// Elementwise minimum or maximum across `inputs`, ignoring nulls.
///
/// The output follows the chunk layout of the first input. At least one
/// input is required.
#[instrument(name = "timestampmath::reduce", level = "debug", skip(inputs), fields(inputs = inputs.len()))]
pub fn reduce(inputs: &[&Column], outcolname: &str, extreme: Extreme) -> Result<Column> {
    let Some(primary) = inputs.first() else {
        return Err(TsMathError::invalid_params("no columns to reduce"));
    };
    let layout = primary.chunk_lengths();

    let typed = inputs
        .iter()
        .map(|c| timestamp_chunks(c, &layout))
        .collect::<Result<Vec<_>>>()?;

    let chunks = (0..layout.len())
        .map(|chunk| {
            let arrays: Vec<&TimestampNanosecondArray> = typed.iter().map(|col| &col[chunk]).collect();
            Arc::new(reduce_chunk(&arrays, extreme)) as ArrayRef
        })
        .collect();

    Column::try_new(Field::new(outcolname, timestamp_ns(), true), chunks)
}

/// Fold one chunk position by position. All arrays have the same length.
pub fn reduce_chunk(arrays: &[&TimestampNanosecondArray], extreme: Extreme) -> TimestampNanosecondArray {
    let len = arrays.first().map_or(0, |a| a.len());
    (0..len)
        .map(|i| {
            arrays.iter().fold(None, |acc, a| {
                extreme.combine(acc, a.is_valid(i).then(|| a.value(i)))
            })
        })
        .collect()
}
