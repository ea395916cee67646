mod difference;
mod error;
mod params;
mod reduce;
mod startof;
mod table;
mod unit;
mod warning;

pub use difference::{
    difference, DifferenceResult, DECIMAL_FORMAT, FORMAT_KEY, INTEGER_FORMAT,
};
pub use error::{Result, TsMathError};
pub use params::{migrate_params, OperationKind, Params, Request};
pub use reduce::{reduce, reduce_chunk, Extreme};
pub use startof::{out_of_bounds_timestamp, start_of, start_of_column, StartOfResult};
pub use table::{timestamp_ns, Column, Table};
pub use unit::Unit;
pub use warning::{
    Warning, CONVERTED_DIFFERENCE_OUT_OF_BOUNDS_TO_NULL, CONVERTED_OUT_OF_BOUNDS_TO_NULL,
};

use tracing::{debug, instrument};

/// Output of one invocation: the (possibly unchanged) table plus at most
/// one warning per kind.
#[derive(Debug)]
pub struct RenderResult {
    pub table: Table,
    pub warnings: Vec<Warning>,
}

impl RenderResult {
    fn without_warnings(table: Table) -> Self {
        RenderResult {
            table,
            warnings: vec![],
        }
    }
}

pub fn render(table: Table, params: &Params) -> Result<RenderResult> {
    compute(table, params.request())
}

#[instrument(name = "timestampmath::compute", level = "debug", skip(table), fields(rows = table.num_rows()))]
pub fn compute(table: Table, request: Request<'_>) -> Result<RenderResult> {
    match request {
        Request::Minimum {
            colnames,
            outcolname,
        } => render_extreme(table, colnames, outcolname, Extreme::Minimum),
        Request::Maximum {
            colnames,
            outcolname,
        } => render_extreme(table, colnames, outcolname, Extreme::Maximum),
        Request::Difference {
            colname1,
            colname2,
            unit,
            outcolname,
        } => render_difference(table, colname1, colname2, unit, outcolname),
        Request::StartOf { colnames, unit } => render_start_of(table, colnames, unit),
    }
}

fn render_extreme(
    mut table: Table,
    colnames: &[String],
    outcolname: &str,
    extreme: Extreme,
) -> Result<RenderResult> {
    if outcolname.is_empty() || colnames.is_empty() {
        debug!("no input or output column chosen; table unchanged");
        return Ok(RenderResult::without_warnings(table));
    }

    let inputs = colnames
        .iter()
        .map(|name| table.column(name))
        .collect::<Result<Vec<_>>>()?;
    let column = reduce(&inputs, outcolname, extreme)?;
    table.replace_or_append(column)?;

    Ok(RenderResult::without_warnings(table))
}

fn render_difference(
    mut table: Table,
    colname1: &str,
    colname2: &str,
    unit: Unit,
    outcolname: &str,
) -> Result<RenderResult> {
    if outcolname.is_empty() || colname1.is_empty() || colname2.is_empty() {
        debug!("difference needs two input columns and an output name; table unchanged");
        return Ok(RenderResult::without_warnings(table));
    }

    let result = difference(table.column(colname1)?, table.column(colname2)?, unit, outcolname)?;
    table.replace_or_append(result.column)?;

    let mut warnings = vec![];
    if result.overflowed {
        warnings.push(Warning::converted_difference_out_of_bounds_to_null(outcolname));
    }
    Ok(RenderResult { table, warnings })
}

fn render_start_of(mut table: Table, colnames: &[String], unit: Unit) -> Result<RenderResult> {
    let mut truncated = false;
    for name in colnames {
        let index = table
            .index_of(name)
            .ok_or_else(|| TsMathError::ColumnNotFound(name.clone()))?;
        let result = start_of_column(&table.columns()[index], unit)?;
        table.set_column(index, result.column)?;
        truncated |= result.truncated;
    }

    let mut warnings = vec![];
    if truncated {
        warnings.push(Warning::converted_out_of_bounds_to_null(out_of_bounds_timestamp(unit)?));
    }
    Ok(RenderResult { table, warnings })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use arrow::array::{Array, Float64Array, Int64Array, TimestampNanosecondArray};
    use arrow::datatypes::{DataType, Field};
    use jiff::civil::datetime;
    use jiff::tz::TimeZone;
    use serde_json::json;

    /// Nanoseconds since the epoch for a UTC wall-clock time.
    fn ts(y: i16, mo: i8, d: i8, h: i8, mi: i8, s: i8, ns: i32) -> i64 {
        datetime(y, mo, d, h, mi, s, ns)
            .to_zoned(TimeZone::UTC)
            .unwrap()
            .timestamp()
            .as_nanosecond() as i64
    }

    fn day(y: i16, mo: i8, d: i8) -> i64 {
        ts(y, mo, d, 0, 0, 0, 0)
    }

    fn ts_column(name: &str, values: Vec<Option<i64>>) -> Column {
        Column::from_array(name, Arc::new(TimestampNanosecondArray::from(values)))
    }

    fn table(columns: Vec<Column>) -> Table {
        Table::try_new(columns).unwrap()
    }

    fn params(value: serde_json::Value) -> Params {
        Params::from_json(value).unwrap()
    }

    fn timestamps(table: &Table, name: &str) -> Vec<Option<i64>> {
        values_of::<TimestampNanosecondArray, i64>(table, name)
    }

    fn values_of<A, T>(table: &Table, name: &str) -> Vec<Option<T>>
    where
        A: Array + 'static,
        for<'a> &'a A: IntoIterator<Item = Option<T>>,
    {
        table
            .column(name)
            .unwrap()
            .chunks()
            .iter()
            .flat_map(|c| {
                let c = c.as_any().downcast_ref::<A>().unwrap();
                c.into_iter().collect::<Vec<_>>()
            })
            .collect()
    }

    // ---- Minimum / maximum ----

    #[test]
    fn test_maximum_no_colnames() {
        let input = table(vec![ts_column("A", vec![Some(1), Some(2), Some(3)])]);
        let result = render(
            input,
            &params(json!({"operation": "maximum", "colnames": [], "outcolname": "B"})),
        )
        .unwrap();

        assert_eq!(result.table.column_names(), vec!["A"]);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_maximum_no_outcolname() {
        let input = table(vec![ts_column("A", vec![Some(1), Some(2), Some(3)])]);
        let result = render(
            input,
            &params(json!({"operation": "maximum", "colnames": ["A"], "outcolname": ""})),
        )
        .unwrap();

        assert_eq!(result.table.column_names(), vec!["A"]);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_maximum_one_colname() {
        let input = table(vec![ts_column("A", vec![Some(1), Some(2), Some(3)])]);
        let result = render(
            input,
            &params(json!({"operation": "maximum", "colnames": ["A"], "outcolname": "B"})),
        )
        .unwrap();

        assert_eq!(result.table.column_names(), vec!["A", "B"]);
        assert_eq!(timestamps(&result.table, "B"), vec![Some(1), Some(2), Some(3)]);
        assert_eq!(*result.table.column("B").unwrap().data_type(), timestamp_ns());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_maximum_multiple_colnames() {
        let input = table(vec![
            ts_column("A", vec![Some(1), Some(2), Some(3)]),
            ts_column("B", vec![Some(2), Some(3), Some(1)]),
            ts_column("C", vec![Some(3), Some(1), Some(2)]),
        ]);
        let result = render(
            input,
            &params(json!({"operation": "maximum", "colnames": ["A", "B", "C"], "outcolname": "D"})),
        )
        .unwrap();

        assert_eq!(timestamps(&result.table, "D"), vec![Some(3), Some(3), Some(3)]);
    }

    #[test]
    fn test_maximum_reuse_outcolname() {
        let input = table(vec![
            ts_column("A", vec![Some(1), Some(2), Some(3)]),
            ts_column("B", vec![Some(2), Some(3), Some(1)]),
        ]);
        let result = render(
            input,
            &params(json!({"operation": "maximum", "colnames": ["A", "B"], "outcolname": "A"})),
        )
        .unwrap();

        // replaced column moves to the end
        assert_eq!(result.table.column_names(), vec!["B", "A"]);
        assert_eq!(timestamps(&result.table, "A"), vec![Some(2), Some(3), Some(3)]);
    }

    #[test]
    fn test_maximum_zero_chunks() {
        let empty = Column::try_new(Field::new("A", timestamp_ns(), true), vec![]).unwrap();
        let result = render(
            table(vec![empty]),
            &params(json!({"operation": "maximum", "colnames": ["A"], "outcolname": "B"})),
        )
        .unwrap();

        assert_eq!(result.table.column_names(), vec!["A", "B"]);
        assert_eq!(result.table.num_rows(), 0);
    }

    #[test]
    fn test_maximum_nulls() {
        let input = table(vec![
            ts_column("A", vec![Some(1), None, Some(3), None]),
            ts_column("B", vec![Some(2), Some(3), None, None]),
        ]);
        let result = render(
            input,
            &params(json!({"operation": "maximum", "colnames": ["A", "B"], "outcolname": "C"})),
        )
        .unwrap();

        assert_eq!(timestamps(&result.table, "C"), vec![Some(2), Some(3), Some(3), None]);
    }

    #[test]
    fn test_minimum() {
        let input = table(vec![
            ts_column("A", vec![Some(1), None, Some(3), None]),
            ts_column("B", vec![Some(2), Some(3), None, None]),
        ]);
        let result = render(
            input,
            &params(json!({"operation": "minimum", "colnames": ["A", "B"], "outcolname": "C"})),
        )
        .unwrap();

        assert_eq!(timestamps(&result.table, "C"), vec![Some(1), Some(3), Some(3), None]);
    }

    #[test]
    fn test_minimum_never_exceeds_maximum() {
        let a = vec![Some(-5), Some(10), None, Some(i64::MIN)];
        let b = vec![Some(7), Some(-3), Some(4), Some(i64::MAX)];
        let input = table(vec![ts_column("A", a), ts_column("B", b)]);

        let min = render(
            input.clone(),
            &params(json!({"operation": "minimum", "colnames": ["A", "B"], "outcolname": "C"})),
        )
        .unwrap();
        let max = render(
            input,
            &params(json!({"operation": "maximum", "colnames": ["A", "B"], "outcolname": "C"})),
        )
        .unwrap();

        let mins = timestamps(&min.table, "C");
        let maxs = timestamps(&max.table, "C");
        for (lo, hi) in mins.iter().zip(&maxs) {
            assert!(lo.unwrap() <= hi.unwrap());
        }
    }

    #[test]
    fn test_missing_input_column_is_an_error() {
        let input = table(vec![ts_column("A", vec![Some(1)])]);
        let err = render(
            input,
            &params(json!({"operation": "minimum", "colnames": ["Z"], "outcolname": "C"})),
        )
        .unwrap_err();
        assert!(matches!(err, TsMathError::ColumnNotFound(ref name) if name == "Z"));
    }

    // ---- Difference ----

    fn date_table() -> Table {
        table(vec![
            ts_column("A", vec![Some(day(2019, 1, 1)), Some(day(2020, 3, 2))]),
            ts_column("B", vec![Some(day(2020, 1, 1)), Some(day(2020, 1, 2))]),
        ])
    }

    #[test]
    fn test_difference_missing_names_are_noops() {
        for p in [
            json!({"operation": "difference", "colname1": "", "colname2": "", "outcolname": "C"}),
            json!({"operation": "difference", "colname1": null, "colname2": "B", "outcolname": "C"}),
            json!({"operation": "difference", "colname1": "A", "colname2": "", "outcolname": "C"}),
            json!({"operation": "difference", "colname1": "A", "colname2": "B", "outcolname": ""}),
        ] {
            let result = render(date_table(), &params(p)).unwrap();
            assert_eq!(result.table.column_names(), vec!["A", "B"]);
            assert!(result.warnings.is_empty());
        }
    }

    #[test]
    fn test_difference_days() {
        let result = render(
            date_table(),
            &params(json!({
                "operation": "difference",
                "colname1": "A",
                "colname2": "B",
                "unit": "day",
                "outcolname": "C",
            })),
        )
        .unwrap();

        assert_eq!(result.table.column_names(), vec!["A", "B", "C"]);
        assert_eq!(
            values_of::<Float64Array, f64>(&result.table, "C"),
            vec![Some(365.0), Some(-60.0)]
        );
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_difference_reuse_outcolname() {
        let result = render(
            date_table(),
            &params(json!({
                "operation": "difference",
                "colname1": "A",
                "colname2": "B",
                "unit": "day",
                "outcolname": "A",
            })),
        )
        .unwrap();

        assert_eq!(result.table.column_names(), vec!["B", "A"]);
        assert_eq!(*result.table.column("A").unwrap().data_type(), DataType::Float64);
        assert_eq!(
            values_of::<Float64Array, f64>(&result.table, "A"),
            vec![Some(365.0), Some(-60.0)]
        );
    }

    #[test]
    fn test_difference_nanoseconds_null() {
        let input = table(vec![
            ts_column("A", vec![Some(123), None, None]),
            ts_column("B", vec![None, Some(123), None]),
        ]);
        let result = render(
            input,
            &params(json!({
                "operation": "difference",
                "colname1": "A",
                "colname2": "B",
                "unit": "nanosecond",
                "outcolname": "C",
            })),
        )
        .unwrap();

        let c = result.table.column("C").unwrap();
        assert_eq!(*c.data_type(), DataType::Int64);
        assert_eq!(
            c.field().metadata().get(FORMAT_KEY).map(String::as_str),
            Some(INTEGER_FORMAT)
        );
        assert_eq!(values_of::<Int64Array, i64>(&result.table, "C"), vec![None, None, None]);
    }

    #[test]
    fn test_difference_overflow_warns_once() {
        let input = table(vec![
            ts_column("A", vec![Some(i64::MIN), Some(i64::MIN)]),
            ts_column("B", vec![Some(i64::MAX), Some(i64::MAX)]),
        ]);
        let result = render(
            input,
            &params(json!({
                "operation": "difference",
                "colname1": "A",
                "colname2": "B",
                "unit": "nanosecond",
                "outcolname": "C",
            })),
        )
        .unwrap();

        assert_eq!(values_of::<Int64Array, i64>(&result.table, "C"), vec![None, None]);
        assert_eq!(
            result.warnings,
            vec![Warning::converted_difference_out_of_bounds_to_null("C")]
        );
    }

    // ---- Start of unit ----

    #[test]
    fn test_startof_hour_in_place() {
        let input = table(vec![
            ts_column(
                "A",
                vec![
                    Some(ts(2021, 5, 5, 13, 1, 22, 321_231_000)),
                    Some(ts(1800, 1, 1, 1, 2, 3, 4)),
                    None,
                ],
            ),
            ts_column("B", vec![Some(1), Some(2), Some(3)]),
        ]);
        let result = render(
            input,
            &params(json!({"operation": "startof", "colnames": ["A"], "roundunit": "hour"})),
        )
        .unwrap();

        assert_eq!(result.table.column_names(), vec!["A", "B"]);
        assert_eq!(
            timestamps(&result.table, "A"),
            vec![
                Some(ts(2021, 5, 5, 13, 0, 0, 0)),
                Some(ts(1800, 1, 1, 1, 0, 0, 0)),
                None,
            ]
        );
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_startof_out_of_bounds() {
        let input = table(vec![ts_column(
            "A",
            vec![Some(day(1970, 1, 1)), Some(ts(1677, 9, 21, 0, 12, 43, 145_500_000))],
        )]);
        let result = render(
            input,
            &params(json!({"operation": "startof", "colnames": ["A"], "roundunit": "minute"})),
        )
        .unwrap();

        assert_eq!(timestamps(&result.table, "A"), vec![Some(0), None]);
        assert_eq!(
            result.warnings,
            vec![Warning::converted_out_of_bounds_to_null("1677-09-21T00:12Z")]
        );
    }

    #[test]
    fn test_startof_one_warning_for_many_columns() {
        let input = table(vec![
            ts_column("A", vec![Some(i64::MIN), Some(i64::MIN + 1)]),
            ts_column("B", vec![Some(i64::MIN), Some(0)]),
        ]);
        let result = render(
            input,
            &params(json!({"operation": "startof", "colnames": ["A", "B"], "roundunit": "day"})),
        )
        .unwrap();

        assert_eq!(timestamps(&result.table, "A"), vec![None, None]);
        assert_eq!(timestamps(&result.table, "B"), vec![None, Some(0)]);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].arguments["timestamp"], "1677-09-21");
    }

    #[test]
    fn test_startof_v0_params_default_to_hour() {
        let input = table(vec![ts_column("A", vec![Some(ts(2021, 5, 5, 13, 59, 59, 0))])]);
        let result = render(input, &params(json!({"operation": "startof", "colnames": ["A"]})))
            .unwrap();

        assert_eq!(timestamps(&result.table, "A"), vec![Some(ts(2021, 5, 5, 13, 0, 0, 0))]);
    }

    #[test]
    fn test_startof_no_colnames() {
        let input = table(vec![ts_column("A", vec![Some(i64::MIN)])]);
        let result = render(
            input,
            &params(json!({"operation": "startof", "colnames": [], "roundunit": "hour"})),
        )
        .unwrap();

        assert_eq!(timestamps(&result.table, "A"), vec![Some(i64::MIN)]);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_compute_takes_request_directly() {
        let input = table(vec![ts_column("A", vec![Some(0)]), ts_column("B", vec![Some(3_600_000_000_000)])]);
        let result = compute(
            input,
            Request::Difference {
                colname1: "A",
                colname2: "B",
                unit: Unit::Minute,
                outcolname: "C",
            },
        )
        .unwrap();

        assert_eq!(values_of::<Float64Array, f64>(&result.table, "C"), vec![Some(60.0)]);
    }
}
