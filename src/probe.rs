use std::path::Path;

use anyhow::{Context, Result};
use log::info;

use crate::{
    cli::ProbeArgs,
    infer, io_utils, printable_delimiter,
    schema::{ParsedTable, Schema},
};

/// Reads `input` into a [`ParsedTable`] using the resolved delimiter and encoding.
pub(crate) fn load_table(
    input: &Path,
    delimiter: Option<u8>,
    input_encoding: Option<&str>,
) -> Result<ParsedTable> {
    let delimiter = io_utils::resolve_input_delimiter(input, delimiter);
    let encoding = io_utils::resolve_encoding(input_encoding)?;
    info!(
        "Reading '{}' with delimiter '{}' ({})",
        input.display(),
        printable_delimiter(delimiter),
        encoding.name()
    );
    let table = io_utils::read_table(input, delimiter, encoding)?;
    info!(
        "Parsed {} column(s) and {} row(s)",
        table.column_count(),
        table.row_count()
    );
    Ok(table)
}

/// Loads the configuration at `config`, or infers one from `table` when absent.
pub(crate) fn load_or_seed_schema(config: Option<&Path>, table: &ParsedTable) -> Result<Schema> {
    match config {
        Some(path) => {
            Schema::load(path).with_context(|| format!("Loading configuration from {path:?}"))
        }
        None => {
            info!("No configuration given; inferring column types from the input");
            Ok(Schema::new(
                Schema::default_table(),
                Default::default(),
                infer::seed_columns(table, 0),
            ))
        }
    }
}

pub fn execute(args: &ProbeArgs) -> Result<()> {
    let table = load_table(&args.input, args.delimiter, args.input_encoding.as_deref())
        .with_context(|| format!("Probing {:?}", args.input))?;
    let columns = infer::seed_columns(&table, args.sample_rows);
    let schema = Schema::new(
        args.table.clone().unwrap_or_else(Schema::default_table),
        args.dialect.unwrap_or_default(),
        columns,
    );
    schema
        .validate()
        .context("Validating inferred configuration")?;
    schema
        .save(&args.output)
        .with_context(|| format!("Writing configuration to {:?}", args.output))?;
    for column in &schema.columns {
        info!("  {} -> {}", column.name, column.inferred_type);
    }
    info!(
        "Configuration for {} column(s) written to {:?}",
        schema.columns.len(),
        args.output
    );
    Ok(())
}
