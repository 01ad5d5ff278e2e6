use anyhow::Result;
use log::info;

use crate::{
    cli::TypesArgs,
    schema::{Dialect, LogicalType},
    sql, table,
};

pub fn execute(args: &TypesArgs) -> Result<()> {
    let headers = vec!["type".to_string(), "label".to_string(), "sized".to_string()];
    let rows = catalog_rows(args.dialect, args.all);
    table::print_table(&headers, &rows);

    println!();
    let headers = vec![
        "logical".to_string(),
        "default".to_string(),
        "suggested custom".to_string(),
    ];
    table::print_table(&headers, &default_rows(args.dialect));
    info!("Listed {} {} type(s)", rows.len(), args.dialect);
    Ok(())
}

fn catalog_rows(dialect: Dialect, show_all: bool) -> Vec<Vec<String>> {
    sql::type_options(dialect, show_all)
        .iter()
        .map(|option| {
            vec![
                option.value.to_string(),
                option.label.to_string(),
                if option.has_n { "(n)" } else { "" }.to_string(),
            ]
        })
        .collect()
}

/// One row per logical type: the type emitted without an override and the
/// type offered as the starting point for a custom override.
fn default_rows(dialect: Dialect) -> Vec<Vec<String>> {
    LogicalType::all()
        .into_iter()
        .map(|ty| {
            vec![
                ty.to_string(),
                sql::default_sql_type(ty, dialect).to_string(),
                sql::default_custom_type(ty, dialect).to_string(),
            ]
        })
        .collect()
}
