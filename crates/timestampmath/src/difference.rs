use std::collections::HashMap;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int64Array, TimestampNanosecondArray};
use arrow::datatypes::{DataType, Field};
use tracing::{instrument, warn};

use crate::error::Result;
use crate::table::{timestamp_chunks, Column};
use crate::unit::Unit;

/// Field metadata key carrying a display-format hint.
pub const FORMAT_KEY: &str = "format";
pub const INTEGER_FORMAT: &str = "{:,d}";
pub const DECIMAL_FORMAT: &str = "{:,}";

#[derive(Debug)]
pub struct DifferenceResult {
    pub column: Column,
    /// Some nanosecond difference did not fit in i64 and became null.
    pub overflowed: bool,
}

/// `end - start` per row, in `unit`. Null if either side is null.
///
/// Nanoseconds are returned as Int64; every other unit as Float64 computed
/// from the exact nanosecond difference. The output follows the chunk
/// layout of `start`.
#[instrument(name = "timestampmath::difference", level = "debug", skip(start, end), fields(start = start.name(), end = end.name()))]
pub fn difference(
    start: &Column,
    end: &Column,
    unit: Unit,
    outcolname: &str,
) -> Result<DifferenceResult> {
    let layout = start.chunk_lengths();
    let starts = timestamp_chunks(start, &layout)?;
    let ends = timestamp_chunks(end, &layout)?;

    let mut overflowed = false;
    let (data_type, format) = match unit {
        Unit::Nanosecond => (DataType::Int64, INTEGER_FORMAT),
        _ => (DataType::Float64, DECIMAL_FORMAT),
    };

    let chunks = starts
        .iter()
        .zip(&ends)
        .map(|(a, b)| match unit {
            Unit::Nanosecond => Arc::new(nanosecond_chunk(a, b, &mut overflowed)) as ArrayRef,
            _ => Arc::new(scaled_chunk(a, b, unit)) as ArrayRef,
        })
        .collect();

    if overflowed {
        warn!(column = outcolname, "difference overflowed i64 nanoseconds; converted to null");
    }

    let field = Field::new(outcolname, data_type, true)
        .with_metadata(HashMap::from([(FORMAT_KEY.to_string(), format.to_string())]));
    Ok(DifferenceResult {
        column: Column::try_new(field, chunks)?,
        overflowed,
    })
}

fn nanosecond_chunk(
    a: &TimestampNanosecondArray,
    b: &TimestampNanosecondArray,
    overflowed: &mut bool,
) -> Int64Array {
    a.iter()
        .zip(b.iter())
        .map(|pair| match pair {
            (Some(a), Some(b)) => {
                let delta = b.checked_sub(a);
                *overflowed |= delta.is_none();
                delta
            }
            _ => None,
        })
        .collect()
}

fn scaled_chunk(a: &TimestampNanosecondArray, b: &TimestampNanosecondArray, unit: Unit) -> Float64Array {
    let divisor = unit.nanos() as f64;
    a.iter()
        .zip(b.iter())
        // Widened: two in-range i64 timestamps can be up to 2^64 ns apart.
        .map(|pair| match pair {
            (Some(a), Some(b)) => Some((i128::from(b) - i128::from(a)) as f64 / divisor),
            _ => None,
        })
        .collect()
}
