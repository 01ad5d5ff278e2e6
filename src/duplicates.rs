use std::collections::{BTreeSet, HashSet};

use crate::{
    clean::CellCleaner,
    schema::{ColumnConfig, ParsedTable},
};

const KEY_SEPARATOR: &str = "\u{1}";

/// Indices of rows whose duplicate key (cleaned values of every
/// `duplicate_key` column) repeats an earlier row. Rows with a blank key are
/// never reported, and the first occurrence of a key is not a duplicate.
pub fn duplicate_rows(
    table: &ParsedTable,
    columns: &[ColumnConfig],
    cleaners: &[CellCleaner<'_>],
) -> BTreeSet<usize> {
    let key_columns = columns
        .iter()
        .enumerate()
        .filter(|(_, column)| column.duplicate_key)
        .map(|(idx, _)| idx)
        .collect::<Vec<_>>();
    let mut duplicates = BTreeSet::new();
    if key_columns.is_empty() {
        return duplicates;
    }

    let mut seen = HashSet::new();
    for row in 0..table.row_count() {
        let key = key_columns
            .iter()
            .map(|&idx| cleaners[idx].clean_value(table.cell(row, idx)))
            .collect::<Vec<_>>()
            .join(KEY_SEPARATOR);
        if key.trim().is_empty() {
            continue;
        }
        if !seen.insert(key) {
            duplicates.insert(row);
        }
    }
    duplicates
}
