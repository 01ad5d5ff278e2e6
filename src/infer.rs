//! Logical type inference from sample cell values.

use log::debug;

use crate::{
    data::{
        is_decimal_token, is_integer_token, parse_boolean_token, parse_calendar_date,
        parse_calendar_datetime,
    },
    schema::{ColumnConfig, LogicalType, ParsedTable},
};

/// Returns the most specific [`LogicalType`] every non-blank sample satisfies.
///
/// Candidates are tried in priority order: integer, decimal, boolean,
/// datetime, date; anything else (or no non-blank sample) is text.
pub fn infer_column_type<S: AsRef<str>>(samples: &[S]) -> LogicalType {
    let non_blank = samples
        .iter()
        .map(AsRef::as_ref)
        .filter(|value| !value.trim().is_empty())
        .collect::<Vec<_>>();
    if non_blank.is_empty() {
        return LogicalType::Text;
    }

    let all = |predicate: fn(&str) -> bool| non_blank.iter().all(|value| predicate(value));

    if all(is_integer_token) {
        LogicalType::Integer
    } else if all(is_decimal_token) {
        LogicalType::Decimal
    } else if all(|value| parse_boolean_token(value).is_some()) {
        LogicalType::Boolean
    } else if all(|value| parse_calendar_datetime(value).is_some()) {
        LogicalType::Datetime
    } else if all(|value| parse_calendar_date(value).is_some()) {
        LogicalType::Date
    } else {
        LogicalType::Text
    }
}

/// Builds one seeded [`ColumnConfig`] per header, typed from up to
/// `sample_rows` rows (0 means every row).
pub fn seed_columns(table: &ParsedTable, sample_rows: usize) -> Vec<ColumnConfig> {
    let limit = if sample_rows == 0 {
        table.row_count()
    } else {
        sample_rows.min(table.row_count())
    };
    table
        .headers
        .iter()
        .enumerate()
        .map(|(idx, header)| {
            let samples = table.rows[..limit]
                .iter()
                .map(|row| row.get(idx).map(String::as_str).unwrap_or(""))
                .collect::<Vec<_>>();
            let ty = infer_column_type(&samples);
            debug!("Column '{header}' inferred as {ty} from {limit} sample(s)");
            ColumnConfig::seeded(header.clone(), ty)
        })
        .collect()
}
