//! `CREATE TABLE` and `INSERT` statement emission.
//!
//! Both statements are driven by the same [`ColumnLayout`] per configured
//! column, so the number and order of column definitions always equals the
//! number and order of literals in every emitted row.

use itertools::Itertools;
use log::{debug, info};

use crate::{
    clean::{CellCleaner, cleaners_for},
    impute::{Imputations, NULL_LITERAL, Resolution, compute_imputations, resolve_missing},
    schema::{ColumnConfig, Dialect, ParsedTable},
    sql::{CodedValue, code_value, quote_identifier, quote_string, resolve_sql_type},
};

/// Output columns contributed by one configured column, in emission order:
/// the original value, then split parts, then the references column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    pub base_name: String,
    pub include_original: bool,
    pub split_parts: usize,
    pub references_name: Option<String>,
}

impl ColumnLayout {
    pub fn for_column(column: &ColumnConfig) -> Self {
        let include_original = !column.has_split() || column.split.keep_original;
        let split_parts = if column.has_split() && column.split.max_parts >= 2 {
            column.split.max_parts
        } else {
            0
        };
        Self {
            base_name: column.output_name(),
            include_original,
            split_parts,
            references_name: column.references_output_name(),
        }
    }

    pub fn width(&self) -> usize {
        usize::from(self.include_original)
            + self.split_parts
            + usize::from(self.references_name.is_some())
    }

    /// Unquoted output column names with a flag marking the references column.
    pub fn names(&self) -> Vec<(String, bool)> {
        let mut names = Vec::with_capacity(self.width());
        if self.include_original {
            names.push((self.base_name.clone(), false));
        }
        for part in 1..=self.split_parts {
            names.push((format!("{}_{part}", self.base_name), false));
        }
        if let Some(references) = &self.references_name {
            names.push((references.clone(), true));
        }
        names
    }
}

pub fn layouts_for(columns: &[ColumnConfig]) -> Vec<ColumnLayout> {
    columns.iter().map(ColumnLayout::for_column).collect()
}

/// Quoted output column names across all configured columns.
pub fn output_column_names(columns: &[ColumnConfig], dialect: Dialect) -> Vec<String> {
    layouts_for(columns)
        .iter()
        .flat_map(ColumnLayout::names)
        .map(|(name, _)| quote_identifier(&name, dialect))
        .collect()
}

pub fn build_create_table(table_name: &str, columns: &[ColumnConfig], dialect: Dialect) -> String {
    let definitions = columns
        .iter()
        .flat_map(|column| {
            let sql_type = resolve_sql_type(column, dialect);
            ColumnLayout::for_column(column)
                .names()
                .into_iter()
                .map(move |(name, is_references)| {
                    let ty = if is_references { "TEXT" } else { sql_type.as_str() };
                    format!("{} {ty}", quote_identifier(&name, dialect))
                })
        })
        .join(",\n  ");
    format!(
        "CREATE TABLE {} (\n  {definitions}\n);",
        quote_identifier(table_name, dialect)
    )
}

/// Per-row emission result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Kept(Vec<String>),
    Dropped,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InsertOutput {
    pub sql: String,
    pub skipped_rows: usize,
}

/// Row emitter over a fixed configuration snapshot.
pub struct RowEmitter<'a> {
    table: &'a ParsedTable,
    columns: &'a [ColumnConfig],
    dialect: Dialect,
    cleaners: Vec<CellCleaner<'a>>,
    layouts: Vec<ColumnLayout>,
    imputations: Imputations,
}

impl<'a> RowEmitter<'a> {
    pub fn new(table: &'a ParsedTable, columns: &'a [ColumnConfig], dialect: Dialect) -> Self {
        let cleaners = cleaners_for(columns);
        let imputations = compute_imputations(table, columns, &cleaners);
        Self {
            table,
            columns,
            dialect,
            cleaners,
            layouts: layouts_for(columns),
            imputations,
        }
    }

    pub fn emit_row(&self, row: usize) -> RowOutcome {
        let width = self.layouts.iter().map(ColumnLayout::width).sum();
        let mut cells = Vec::with_capacity(width);
        for (idx, column) in self.columns.iter().enumerate() {
            let raw = self.table.cell(row, idx);
            let cleaner = &self.cleaners[idx];
            let layout = &self.layouts[idx];

            let cleaned = cleaner.clean(raw);
            let base = if column.has_merge() {
                self.merged_value(row, column)
            } else {
                cleaned.value
            };

            let mut produced = Vec::with_capacity(layout.width());
            if layout.include_original {
                produced.push(code_value(&base, column.selected_type, self.dialect));
            }
            if layout.split_parts > 0 {
                let delimiters = &column.split.delimiters;
                let mut tokens = base.split(|ch: char| delimiters.contains(ch));
                for _ in 0..layout.split_parts {
                    let token = tokens.next().unwrap_or("");
                    produced.push(code_value(token, column.selected_type, self.dialect));
                }
            }

            for coded in produced {
                match coded {
                    CodedValue::Coded(literal) => cells.push(literal),
                    CodedValue::NoLiteral => {
                        match resolve_missing(column, idx, &self.imputations, self.dialect) {
                            Resolution::Literal(literal) => cells.push(literal),
                            Resolution::DropRow => return RowOutcome::Dropped,
                        }
                    }
                }
            }

            if layout.references_name.is_some() {
                cells.push(match cleaned.refs.as_deref() {
                    Some(refs) => quote_string(refs),
                    None => NULL_LITERAL.to_string(),
                });
            }
        }
        RowOutcome::Kept(cells)
    }

    /// Cleaned values of the merge sources (blank ones omitted) joined by the
    /// column's merge delimiter. Sources past the last column are ignored.
    fn merged_value(&self, row: usize, column: &ColumnConfig) -> String {
        column
            .merge
            .sources
            .iter()
            .filter_map(|&source| match self.cleaners.get(source) {
                Some(cleaner) => Some(cleaner.clean_value(self.table.cell(row, source))),
                None => {
                    debug!(
                        "Column '{}' merge source {source} is out of range; ignoring",
                        column.name
                    );
                    None
                }
            })
            .filter(|value| !value.is_empty())
            .join(&column.merge.delimiter)
    }

    pub fn emit_all(&self) -> (Vec<Vec<String>>, usize) {
        let mut kept = Vec::with_capacity(self.table.row_count());
        let mut skipped = 0usize;
        for row in 0..self.table.row_count() {
            match self.emit_row(row) {
                RowOutcome::Kept(cells) => kept.push(cells),
                RowOutcome::Dropped => skipped += 1,
            }
        }
        (kept, skipped)
    }
}

pub fn build_insert(
    table_name: &str,
    table: &ParsedTable,
    columns: &[ColumnConfig],
    dialect: Dialect,
) -> InsertOutput {
    let emitter = RowEmitter::new(table, columns, dialect);
    let (rows, skipped_rows) = emitter.emit_all();
    if rows.is_empty() {
        return InsertOutput {
            sql: String::new(),
            skipped_rows,
        };
    }
    let column_names = output_column_names(columns, dialect).join(", ");
    let values = rows
        .iter()
        .map(|cells| format!("({})", cells.join(", ")))
        .join(",\n");
    InsertOutput {
        sql: format!(
            "INSERT INTO {} ({column_names})\nVALUES\n{values};",
            quote_identifier(table_name, dialect)
        ),
        skipped_rows,
    }
}

/// Both statements plus the number of rows dropped by the drop-row policy.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GeneratedSql {
    pub create_table: String,
    pub insert: String,
    pub skipped_rows: usize,
}

pub fn generate(
    table_name: &str,
    table: &ParsedTable,
    columns: &[ColumnConfig],
    dialect: Dialect,
) -> GeneratedSql {
    let create_table = build_create_table(table_name, columns, dialect);
    let InsertOutput { sql, skipped_rows } = build_insert(table_name, table, columns, dialect);
    info!(
        "Generated {dialect} SQL for {} column(s), {} row(s) kept, {skipped_rows} skipped",
        layouts_for(columns).iter().map(ColumnLayout::width).sum::<usize>(),
        table.row_count() - skipped_rows
    );
    GeneratedSql {
        create_table,
        insert: sql,
        skipped_rows,
    }
}
