use std::path::Path;

use anyhow::{Context, Result};
use log::{info, warn};

use crate::{
    clean::cleaners_for,
    cli::GenerateArgs,
    duplicates::duplicate_rows,
    emit, io_utils,
    probe::{load_or_seed_schema, load_table},
};

pub fn execute(args: &GenerateArgs) -> Result<()> {
    let table = load_table(&args.input, args.delimiter, args.input_encoding.as_deref())
        .with_context(|| format!("Reading input {:?}", args.input))?;
    let mut schema = load_or_seed_schema(args.config.as_deref(), &table)?;
    if let Some(name) = &args.table {
        schema.table = name.clone();
    }
    if let Some(dialect) = args.dialect {
        schema.dialect = dialect;
    }
    schema
        .validate_against(&table)
        .with_context(|| format!("Configuration does not fit {:?}", args.input))?;

    let duplicates = duplicate_rows(&table, &schema.columns, &cleaners_for(&schema.columns));
    if !duplicates.is_empty() {
        warn!(
            "{} duplicate row(s) by key; first at data row {}",
            duplicates.len(),
            duplicates.first().map_or(0, |row| row + 1)
        );
    }

    let generated = emit::generate(&schema.table, &table, &schema.columns, schema.dialect);
    if generated.skipped_rows > 0 {
        warn!(
            "Skipped {} row(s) with missing values under the drop-row policy",
            generated.skipped_rows
        );
    }
    if generated.insert.is_empty() {
        warn!("No rows left to insert; INSERT statement omitted");
    }

    let mut to_stdout = Vec::new();
    write_statement(
        args.create_output.as_deref(),
        &generated.create_table,
        "CREATE TABLE",
        &mut to_stdout,
    )?;
    write_statement(
        args.insert_output.as_deref(),
        &generated.insert,
        "INSERT",
        &mut to_stdout,
    )?;
    let to_stdout = to_stdout
        .into_iter()
        .filter(|sql| !sql.is_empty())
        .collect::<Vec<_>>();
    if !to_stdout.is_empty() {
        io_utils::write_text(None, &to_stdout.join("\n\n"))?;
    }
    Ok(())
}

fn write_statement<'a>(
    path: Option<&Path>,
    sql: &'a str,
    label: &str,
    to_stdout: &mut Vec<&'a str>,
) -> Result<()> {
    match path {
        Some(path) if !io_utils::is_dash(path) => {
            io_utils::write_text(Some(path), sql)
                .with_context(|| format!("Writing {label} statement to {path:?}"))?;
            info!("{label} statement written to {path:?}");
        }
        _ => to_stdout.push(sql),
    }
    Ok(())
}
