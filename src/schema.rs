//! Column configuration model, dialects, and configuration persistence.
//!
//! This module owns the [`Schema`] struct (table name, target dialect and the
//! ordered [`ColumnConfig`] list), the [`LogicalType`] and [`Dialect`] enums,
//! and [`ParsedTable`], the header + rows snapshot every engine operation reads.
//!
//! ## Responsibilities
//!
//! - YAML (or JSON, by extension) loading and saving via `serde_yaml`/`serde_json`
//! - Per-column cleaning, find/replace, split/merge, missing-value and naming options
//! - Output column naming (name case, underscore-for-spaces)
//! - Structural validation of a configuration against its own column list

use std::{fmt, fs::File, io::BufReader, path::Path};

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::transform::string_ops;

pub const DEFAULT_TABLE_NAME: &str = "my_table";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogicalType {
    Integer,
    Decimal,
    Boolean,
    Date,
    Datetime,
    #[default]
    Text,
}

impl LogicalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogicalType::Integer => "integer",
            LogicalType::Decimal => "decimal",
            LogicalType::Boolean => "boolean",
            LogicalType::Date => "date",
            LogicalType::Datetime => "datetime",
            LogicalType::Text => "text",
        }
    }

    pub fn all() -> [LogicalType; 6] {
        [
            LogicalType::Integer,
            LogicalType::Decimal,
            LogicalType::Boolean,
            LogicalType::Date,
            LogicalType::Datetime,
            LogicalType::Text,
        ]
    }
}

impl fmt::Display for LogicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default, ValueEnum)]
#[serde(rename_all = "lowercase")]
#[value(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    Postgres,
    Mysql,
    Sqlite,
    Sqlserver,
}

impl Dialect {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Postgres => "postgres",
            Dialect::Mysql => "mysql",
            Dialect::Sqlite => "sqlite",
            Dialect::Sqlserver => "sqlserver",
        }
    }

    pub fn all() -> [Dialect; 4] {
        [
            Dialect::Postgres,
            Dialect::Mysql,
            Dialect::Sqlite,
            Dialect::Sqlserver,
        ]
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CaseTransform {
    #[default]
    None,
    Lower,
    Upper,
    Title,
}

/// Case applied to the output column name. `Snake` exists only for names.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum NameCase {
    #[default]
    None,
    Lower,
    Upper,
    Title,
    Snake,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FindReplaceMode {
    #[default]
    Simple,
    Regex,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum MissingPolicy {
    #[default]
    KeepNull,
    Default,
    DropRow,
    Impute,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ImputeStrategy {
    Mean,
    Median,
    #[default]
    Mode,
    Custom,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct CleaningOptions {
    pub trim_whitespace: bool,
    pub normalize_quotes_dashes: bool,
    pub case_transform: CaseTransform,
    pub auto_numeric: bool,
    pub strip_non_alnum: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct SimpleRule {
    pub find: String,
    #[serde(default)]
    pub replacement: String,
    #[serde(default)]
    pub case_sensitive: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct RegexRule {
    pub pattern: String,
    #[serde(default)]
    pub replacement: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flags: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct FindReplace {
    pub mode: FindReplaceMode,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub simple_rules: Vec<SimpleRule>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub regex_rules: Vec<RegexRule>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct ReferenceExtraction {
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SplitOptions {
    pub delimiters: String,
    pub max_parts: usize,
    pub keep_original: bool,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            delimiters: String::new(),
            max_parts: 0,
            keep_original: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MergeOptions {
    pub sources: Vec<usize>,
    pub delimiter: String,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            delimiter: " ".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct MissingValueOptions {
    pub policy: MissingPolicy,
    pub default_value: String,
    pub impute_strategy: ImputeStrategy,
    pub impute_custom_value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct NamingOptions {
    pub case: NameCase,
    pub auto_underscore: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct SqlTypeOverride {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub param_n: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct ColumnConfig {
    pub name: String,
    pub inferred_type: LogicalType,
    pub selected_type: LogicalType,
    pub cleaning: CleaningOptions,
    pub find_replace: FindReplace,
    pub references: ReferenceExtraction,
    pub split: SplitOptions,
    pub merge: MergeOptions,
    pub missing: MissingValueOptions,
    pub naming: NamingOptions,
    pub duplicate_key: bool,
    pub sql_type: SqlTypeOverride,
}

impl ColumnConfig {
    /// Bare configuration: every cleaning step off, keep-null policy.
    pub fn new(name: impl Into<String>, ty: LogicalType) -> Self {
        Self {
            name: name.into(),
            inferred_type: ty,
            selected_type: ty,
            ..Self::default()
        }
    }

    /// Configuration seeded with the defaults offered after a fresh parse.
    pub fn seeded(name: impl Into<String>, ty: LogicalType) -> Self {
        let name = name.into();
        let references_name = format!("{name}_refs");
        Self {
            cleaning: CleaningOptions {
                trim_whitespace: true,
                normalize_quotes_dashes: true,
                ..CleaningOptions::default()
            },
            references: ReferenceExtraction {
                enabled: false,
                column_name: Some(references_name),
            },
            split: SplitOptions {
                max_parts: 2,
                ..SplitOptions::default()
            },
            naming: NamingOptions {
                case: NameCase::None,
                auto_underscore: true,
            },
            ..Self::new(name, ty)
        }
    }

    pub fn output_name(&self) -> String {
        let cased = apply_name_case(&self.name, self.naming.case);
        self.underscored(&cased)
    }

    /// Name of the extracted-references column, when one will be emitted.
    pub fn references_output_name(&self) -> Option<String> {
        if !self.references.enabled {
            return None;
        }
        self.references
            .column_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .map(|name| self.underscored(name))
    }

    fn underscored(&self, name: &str) -> String {
        if self.naming.auto_underscore {
            string_ops::underscore_whitespace(name).into_owned()
        } else {
            name.to_string()
        }
    }

    pub fn has_split(&self) -> bool {
        !self.split.delimiters.is_empty()
    }

    pub fn has_merge(&self) -> bool {
        !self.merge.sources.is_empty()
    }
}

fn apply_name_case(name: &str, case: NameCase) -> String {
    match case {
        NameCase::None => name.to_string(),
        NameCase::Lower => string_ops::lowercase(name).into_owned(),
        NameCase::Upper => string_ops::uppercase(name).into_owned(),
        NameCase::Title => string_ops::title_case(name).into_owned(),
        NameCase::Snake => string_ops::snake_case(name).into_owned(),
    }
}

/// Header row plus data rows, each row aligned positionally with the headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ParsedTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Cell at `(row, column)`; missing trailing cells read as empty.
    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Table name must not be empty")]
    EmptyTableName,
    #[error("Column '{column}' merges source {source_index} but only {available} column(s) exist")]
    MergeSourceOutOfRange {
        column: String,
        source_index: usize,
        available: usize,
    },
    #[error("Configuration lists {configured} column(s) but the input has {actual}")]
    ColumnCountMismatch { configured: usize, actual: usize },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Schema {
    #[serde(default = "Schema::default_table")]
    pub table: String,
    #[serde(default)]
    pub dialect: Dialect,
    #[serde(default)]
    pub columns: Vec<ColumnConfig>,
}

impl Schema {
    pub fn new(table: impl Into<String>, dialect: Dialect, columns: Vec<ColumnConfig>) -> Self {
        Self {
            table: table.into(),
            dialect,
            columns,
        }
    }

    pub fn default_table() -> String {
        DEFAULT_TABLE_NAME.to_string()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.table.trim().is_empty() {
            return Err(ConfigError::EmptyTableName);
        }
        let available = self.columns.len();
        for column in &self.columns {
            if let Some(&source_index) = column.merge.sources.iter().find(|&&i| i >= available) {
                return Err(ConfigError::MergeSourceOutOfRange {
                    column: column.name.clone(),
                    source_index,
                    available,
                });
            }
        }
        Ok(())
    }

    /// Checks the configuration describes the same number of columns as `table`.
    pub fn validate_against(&self, table: &ParsedTable) -> Result<(), ConfigError> {
        self.validate()?;
        if table.column_count() != self.columns.len() {
            return Err(ConfigError::ColumnCountMismatch {
                configured: self.columns.len(),
                actual: table.column_count(),
            });
        }
        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let file =
            File::create(path).with_context(|| format!("Creating configuration file {path:?}"))?;
        if is_json_path(path) {
            serde_json::to_writer_pretty(file, self).context("Writing configuration JSON")
        } else {
            serde_yaml::to_writer(file, self).context("Writing configuration YAML")
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file =
            File::open(path).with_context(|| format!("Opening configuration file {path:?}"))?;
        let reader = BufReader::new(file);
        let schema: Schema = if is_json_path(path) {
            serde_json::from_reader(reader).context("Parsing configuration JSON")?
        } else {
            serde_yaml::from_reader(reader).context("Parsing configuration YAML")?
        };
        schema
            .validate()
            .with_context(|| format!("Validating configuration {path:?}"))?;
        Ok(schema)
    }
}

fn is_json_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_name_applies_case_before_underscores() {
        let mut column = ColumnConfig::new("Order  Date", LogicalType::Date);
        assert_eq!(column.output_name(), "Order  Date");

        column.naming.auto_underscore = true;
        assert_eq!(column.output_name(), "Order_Date");

        column.naming.case = NameCase::Lower;
        assert_eq!(column.output_name(), "order_date");

        column.naming.case = NameCase::Snake;
        column.naming.auto_underscore = false;
        assert_eq!(column.output_name(), "order_date");
    }

    #[test]
    fn references_name_requires_flag_and_name() {
        let mut column = ColumnConfig::seeded("notes", LogicalType::Text);
        assert_eq!(column.references_output_name(), None);

        column.references.enabled = true;
        assert_eq!(column.references_output_name().as_deref(), Some("notes_refs"));

        column.references.column_name = Some("foot notes".to_string());
        assert_eq!(column.references_output_name().as_deref(), Some("foot_notes"));

        column.references.column_name = Some(String::new());
        assert_eq!(column.references_output_name(), None);
    }

    #[test]
    fn partial_yaml_falls_back_to_defaults() {
        let yaml = concat!(
            "table: people\n",
            "columns:\n",
            "  - name: age\n",
            "    selected_type: integer\n",
            "    missing:\n",
            "      policy: drop-row\n",
        );
        let schema: Schema = serde_yaml::from_str(yaml).expect("parse yaml");
        assert_eq!(schema.dialect, Dialect::Postgres);
        let column = &schema.columns[0];
        assert_eq!(column.selected_type, LogicalType::Integer);
        assert_eq!(column.missing.policy, MissingPolicy::DropRow);
        assert!(column.split.keep_original);
        assert_eq!(column.merge.delimiter, " ");
        assert!(!column.cleaning.trim_whitespace);
    }

    #[test]
    fn validate_rejects_out_of_range_merge_sources() {
        let mut merged = ColumnConfig::new("full_name", LogicalType::Text);
        merged.merge.sources = vec![0, 3];
        let schema = Schema::new("people", Dialect::Mysql, vec![merged]);
        assert_eq!(
            schema.validate(),
            Err(ConfigError::MergeSourceOutOfRange {
                column: "full_name".to_string(),
                source_index: 3,
                available: 1,
            })
        );
    }

    #[test]
    fn validate_rejects_blank_table_name() {
        let schema = Schema::new("  ", Dialect::Sqlite, Vec::new());
        assert_eq!(schema.validate(), Err(ConfigError::EmptyTableName));
    }

    #[test]
    fn validate_accepts_any_split_part_count() {
        for max_parts in [0, 1, 2, 5] {
            let mut column = ColumnConfig::new("code", LogicalType::Text);
            column.split.delimiters = "-".to_string();
            column.split.max_parts = max_parts;
            let schema = Schema::new("codes", Dialect::Sqlite, vec![column]);
            assert_eq!(schema.validate(), Ok(()), "max_parts {max_parts}");
        }
    }

    #[test]
    fn parsed_table_reads_missing_cells_as_empty() {
        let table = ParsedTable::new(
            vec!["a".into(), "b".into()],
            vec![vec!["1".into()], vec!["2".into(), "x".into()]],
        );
        assert_eq!(table.cell(0, 1), "");
        assert_eq!(table.cell(1, 1), "x");
        assert_eq!(table.cell(5, 0), "");
    }
}
