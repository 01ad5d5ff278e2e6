use csv2sql::{
    clean::CellCleaner,
    emit::{ColumnLayout, RowEmitter, RowOutcome, build_create_table, layouts_for},
    schema::{CaseTransform, ColumnConfig, Dialect, LogicalType, ParsedTable, SimpleRule},
    sql::{quote_identifier, unquote_identifier},
};
use proptest::prelude::*;

fn any_dialect() -> impl Strategy<Value = Dialect> {
    prop::sample::select(Dialect::all().to_vec())
}

fn any_type() -> impl Strategy<Value = LogicalType> {
    prop::sample::select(LogicalType::all().to_vec())
}

#[derive(Debug, Clone)]
struct Shape {
    ty: LogicalType,
    delimiters: String,
    max_parts: usize,
    keep_original: bool,
    references: bool,
}

fn any_shape() -> impl Strategy<Value = Shape> {
    (
        any_type(),
        prop::sample::select(vec!["", " ", ",;", "-/"]),
        0usize..5,
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(|(ty, delimiters, max_parts, keep_original, references)| Shape {
            ty,
            delimiters: delimiters.to_string(),
            max_parts,
            keep_original,
            references,
        })
}

fn column_for(idx: usize, shape: &Shape) -> ColumnConfig {
    let mut column = ColumnConfig::new(format!("col {idx}"), shape.ty);
    column.split.delimiters = shape.delimiters.clone();
    column.split.max_parts = shape.max_parts;
    column.split.keep_original = shape.keep_original;
    column.references.enabled = shape.references;
    column.references.column_name = Some(format!("refs {idx}"));
    column
}

/// Column definitions between the opening and closing parentheses.
fn create_definitions(create: &str) -> Vec<&str> {
    let body = create
        .split_once("(\n  ")
        .and_then(|(_, rest)| rest.rsplit_once("\n);"))
        .map_or("", |(body, _)| body);
    body.split(",\n  ")
        .filter(|definition| !definition.trim().is_empty())
        .collect()
}

#[test]
fn split_without_parts_or_original_contributes_no_columns() {
    let mut column = ColumnConfig::new("code", LogicalType::Text);
    column.split.delimiters = " ".to_string();
    column.split.max_parts = 0;
    column.split.keep_original = false;
    let columns = vec![column];
    let table = ParsedTable::new(vec!["code".into()], vec![vec!["a b".into()]]);

    let create = build_create_table("t", &columns, Dialect::Postgres);
    assert!(create_definitions(&create).is_empty());
    let emitter = RowEmitter::new(&table, &columns, Dialect::Postgres);
    assert_eq!(emitter.emit_row(0), RowOutcome::Kept(Vec::new()));
}

proptest! {
    #[test]
    fn identifier_quoting_round_trips(name in "\\PC{0,24}", dialect in any_dialect()) {
        let quoted = quote_identifier(&name, dialect);
        let unquoted = unquote_identifier(&quoted, dialect);
        prop_assert_eq!(unquoted.as_deref(), Some(name.as_str()));
        let requoted = unquoted.map(|inner| quote_identifier(&inner, dialect));
        prop_assert_eq!(requoted, Some(quoted));
    }

    #[test]
    fn create_columns_match_row_width(
        shapes in prop::collection::vec(any_shape(), 1..6),
        cells in prop::collection::vec(
            prop::collection::vec("[a-z0-9 ,;/\\-\\[\\]*]{0,12}", 0..6),
            1..5,
        ),
        dialect in any_dialect(),
    ) {
        let columns = shapes
            .iter()
            .enumerate()
            .map(|(idx, shape)| column_for(idx, shape))
            .collect::<Vec<_>>();
        let headers = columns.iter().map(|c| c.name.clone()).collect();
        let table = ParsedTable::new(headers, cells);

        let width = layouts_for(&columns)
            .iter()
            .map(ColumnLayout::width)
            .sum::<usize>();
        let create = build_create_table("t", &columns, dialect);
        prop_assert_eq!(create_definitions(&create).len(), width);

        let emitter = RowEmitter::new(&table, &columns, dialect);
        for row in 0..table.row_count() {
            match emitter.emit_row(row) {
                RowOutcome::Kept(literals) => prop_assert_eq!(literals.len(), width),
                RowOutcome::Dropped => prop_assert!(false, "keep-null rows are never dropped"),
            }
        }
    }

    #[test]
    fn cleaning_clean_values_is_a_no_op(value in "[A-Za-z0-9]([A-Za-z0-9 .,]{0,30}[A-Za-z0-9])?") {
        let mut column = ColumnConfig::new("c", LogicalType::Text);
        column.cleaning.trim_whitespace = true;
        column.cleaning.normalize_quotes_dashes = true;
        column.find_replace.simple_rules.push(SimpleRule {
            find: "#".to_string(),
            replacement: "hash".to_string(),
            case_sensitive: false,
        });
        let cleaner = CellCleaner::new(&column);
        prop_assert_eq!(cleaner.clean_value(&value), value);
    }

    #[test]
    fn cleaning_twice_matches_cleaning_once(value in "\\PC{0,40}") {
        let mut column = ColumnConfig::new("c", LogicalType::Text);
        column.cleaning.trim_whitespace = true;
        column.cleaning.normalize_quotes_dashes = true;
        column.cleaning.case_transform = CaseTransform::Lower;
        let cleaner = CellCleaner::new(&column);
        let once = cleaner.clean_value(&value);
        prop_assert_eq!(cleaner.clean_value(&once), once);
    }
}
