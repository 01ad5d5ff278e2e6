//! Missing-value handling: per-column imputation and policy resolution.
//!
//! [`compute_imputations`] must run over the whole table before any row is
//! emitted; [`resolve_missing`] then decides, per cell, what replaces a value
//! that could not be coded.

use std::collections::HashMap;

use log::debug;

use crate::{
    clean::CellCleaner,
    schema::{ColumnConfig, Dialect, ImputeStrategy, MissingPolicy, ParsedTable},
    sql::{CodedValue, code_value},
};

pub const NULL_LITERAL: &str = "NULL";

/// Resolution of one cell that produced no literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Literal(String),
    DropRow,
}

/// Raw imputed value per column (same order as the column list); `None`
/// unless the column imputes and the table holds at least one usable value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Imputations {
    values: Vec<Option<String>>,
}

impl Imputations {
    pub fn get(&self, column: usize) -> Option<&str> {
        self.values.get(column).and_then(|value| value.as_deref())
    }
}

pub fn compute_imputations(
    table: &ParsedTable,
    columns: &[ColumnConfig],
    cleaners: &[CellCleaner<'_>],
) -> Imputations {
    let values = columns
        .iter()
        .zip(cleaners)
        .enumerate()
        .map(|(idx, (column, cleaner))| {
            if column.missing.policy != MissingPolicy::Impute {
                return None;
            }
            let cleaned = (0..table.row_count())
                .map(|row| cleaner.clean_value(table.cell(row, idx)))
                .filter(|value| !value.is_empty())
                .collect::<Vec<_>>();
            let imputed = impute_value(column, &cleaned);
            debug!(
                "Imputed value for column '{}' ({:?}): {:?}",
                column.name, column.missing.impute_strategy, imputed
            );
            imputed
        })
        .collect();
    Imputations { values }
}

/// Representative value for a column's non-blank cleaned values.
pub fn impute_value(column: &ColumnConfig, values: &[String]) -> Option<String> {
    if values.is_empty() {
        return None;
    }
    match column.missing.impute_strategy {
        ImputeStrategy::Custom => Some(column.missing.impute_custom_value.clone()),
        ImputeStrategy::Mean => mean(&numeric_values(values)).map(format_number),
        ImputeStrategy::Median => median(&numeric_values(values)).map(format_number),
        ImputeStrategy::Mode => mode(values).map(str::to_string),
    }
}

fn numeric_values(values: &[String]) -> Vec<f64> {
    values
        .iter()
        .filter_map(|value| value.trim().parse::<f64>().ok())
        .filter(|value| value.is_finite())
        .collect()
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Most frequent value; ties go to the value seen first.
pub fn mode(values: &[String]) -> Option<&str> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();
    for value in values {
        let count = counts.entry(value.as_str()).or_insert(0);
        if *count == 0 {
            order.push(value.as_str());
        }
        *count += 1;
    }
    let mut best: Option<(&str, usize)> = None;
    for value in order {
        let count = counts[value];
        if best.is_none_or(|(_, best_count)| count > best_count) {
            best = Some((value, count));
        }
    }
    best.map(|(value, _)| value)
}

/// Shortest round-trip rendering; integral values print without a fraction.
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    value.to_string()
}

/// Decides what to emit for a cell of `column` (at index `column_index`)
/// that produced no literal.
pub fn resolve_missing(
    column: &ColumnConfig,
    column_index: usize,
    imputations: &Imputations,
    dialect: Dialect,
) -> Resolution {
    let fallback = |coded: CodedValue| {
        Resolution::Literal(coded.literal().unwrap_or_else(|| NULL_LITERAL.to_string()))
    };
    match column.missing.policy {
        MissingPolicy::KeepNull => Resolution::Literal(NULL_LITERAL.to_string()),
        MissingPolicy::DropRow => Resolution::DropRow,
        MissingPolicy::Default => fallback(code_value(
            &column.missing.default_value,
            column.selected_type,
            dialect,
        )),
        MissingPolicy::Impute => fallback(code_value(
            imputations.get(column_index).unwrap_or(""),
            column.selected_type,
            dialect,
        )),
    }
}
