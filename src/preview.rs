use anyhow::{Context, Result};
use log::info;

use crate::{
    clean::{CellCleaner, cleaners_for},
    cli::PreviewArgs,
    duplicates::duplicate_rows,
    probe::{load_or_seed_schema, load_table},
    schema::ParsedTable,
    table,
};

pub fn execute(args: &PreviewArgs) -> Result<()> {
    let data = load_table(&args.input, args.delimiter, args.input_encoding.as_deref())
        .with_context(|| format!("Reading input {:?}", args.input))?;
    let schema = load_or_seed_schema(args.config.as_deref(), &data)?;
    schema
        .validate_against(&data)
        .with_context(|| format!("Configuration does not fit {:?}", args.input))?;

    let cleaners = cleaners_for(&schema.columns);
    let (headers, rows) = preview_rows(&data, &cleaners, args.rows);
    table::print_table(&headers, &rows);
    info!("Displayed {} row(s) from {:?}", rows.len(), args.input);
    Ok(())
}

/// Headers and cells for the first `limit` rows: the cleaned value of each
/// column, its extracted references when extraction is on, then a `dup`
/// column marking rows that repeat an earlier duplicate key.
pub fn preview_rows(
    data: &ParsedTable,
    cleaners: &[CellCleaner<'_>],
    limit: usize,
) -> (Vec<String>, Vec<Vec<String>>) {
    let mut headers = Vec::new();
    for cleaner in cleaners {
        let column = cleaner.config();
        headers.push(column.output_name());
        if let Some(refs) = column.references_output_name() {
            headers.push(refs);
        }
    }
    headers.push("dup".to_string());

    let columns = cleaners
        .iter()
        .map(|cleaner| cleaner.config().clone())
        .collect::<Vec<_>>();
    let duplicates = duplicate_rows(data, &columns, cleaners);

    let rows = (0..data.row_count().min(limit))
        .map(|row| {
            let mut cells = Vec::with_capacity(headers.len());
            for (idx, cleaner) in cleaners.iter().enumerate() {
                let cleaned = cleaner.clean(data.cell(row, idx));
                cells.push(cleaned.value);
                if cleaner.config().references_output_name().is_some() {
                    cells.push(cleaned.refs.unwrap_or_default());
                }
            }
            cells.push(if duplicates.contains(&row) { "yes" } else { "" }.to_string());
            cells
        })
        .collect();
    (headers, rows)
}
