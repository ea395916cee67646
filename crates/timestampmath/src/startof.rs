use std::sync::Arc;

use arrow::array::{ArrayRef, TimestampNanosecondArray};
use jiff::tz::TimeZone;
use tracing::{instrument, warn};

use crate::error::{Result, TsMathError};
use crate::table::{timestamp_chunks, Column};
use crate::unit::Unit;

#[derive(Debug)]
pub struct StartOfResult {
    pub column: Column,
    /// At least one value had no representable start and became null.
    pub truncated: bool,
}

/// Start of the `unit_ns`-long interval containing `t`, flooring toward
/// negative infinity (`-1ns` floors to `-unit_ns`, not `0`).
///
/// `None` when shifting a negative `t` down by `unit_ns - 1` leaves the
/// i64 range, i.e. for every `t < i64::MIN + unit_ns - 1`.
pub fn start_of(t: i64, unit_ns: i64) -> Option<i64> {
    if t < 0 {
        t.checked_add(1 - unit_ns)?;
    }
    Some(t.div_euclid(unit_ns) * unit_ns)
}

/// Replace every value with the start of its `unit`, keeping chunk layout,
/// name and field metadata.
#[instrument(name = "timestampmath::startof", level = "debug", skip(column), fields(column = column.name()))]
pub fn start_of_column(column: &Column, unit: Unit) -> Result<StartOfResult> {
    let unit_ns = unit.nanos();
    let chunks: Vec<ArrayRef> = timestamp_chunks(column, &column.chunk_lengths())?
        .iter()
        .map(|chunk| {
            let out: TimestampNanosecondArray = chunk
                .iter()
                .map(|v| v.and_then(|t| start_of(t, unit_ns)))
                .collect();
            Arc::new(out) as ArrayRef
        })
        .collect();

    let field = column.field().as_ref().clone().with_nullable(true);
    let out = Column::try_new(field, chunks)?;
    let truncated = out.null_count() > column.null_count();
    if truncated {
        warn!(
            column = column.name(),
            converted = out.null_count() - column.null_count(),
            "start of {unit} is out of bounds; converted to null"
        );
    }

    Ok(StartOfResult {
        column: out,
        truncated,
    })
}

/// The earliest start-of-`unit` that cannot be represented, formatted at the
/// unit's granularity, e.g. `1677-09-21T00:12Z` for minutes.
pub fn out_of_bounds_timestamp(unit: Unit) -> Result<String> {
    let unit_ns = i128::from(unit.nanos());
    let ns = i128::from(i64::MIN).div_euclid(unit_ns) * unit_ns;
    let ts = jiff::Timestamp::from_nanosecond(ns)
        .map_err(|e| TsMathError::InvalidTimestamp(format!("{ns}ns: {e}")))?;
    let dt = ts.to_zoned(TimeZone::UTC);

    let date = format!("{:04}-{:02}-{:02}", dt.year(), dt.month(), dt.day());
    let hm = format!("{date}T{:02}:{:02}", dt.hour(), dt.minute());
    let hms = format!("{hm}:{:02}", dt.second());
    let frac = dt.subsec_nanosecond();

    Ok(match unit {
        Unit::Day => date,
        Unit::Hour | Unit::Minute => format!("{hm}Z"),
        Unit::Second => format!("{hms}Z"),
        Unit::Millisecond => format!("{hms}.{:03}Z", frac / 1_000_000),
        Unit::Microsecond => format!("{hms}.{:06}Z", frac / 1_000),
        Unit::Nanosecond => format!("{hms}.{frac:09}Z"),
    })
}
