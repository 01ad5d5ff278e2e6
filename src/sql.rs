//! Dialect-aware SQL fragments: identifiers, string literals, typed value
//! literals and column type names.

use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

use crate::{
    data::{
        canonical_decimal, has_datetime_shape, is_date_shape, is_decimal_token, is_integer_token,
        parse_boolean_token,
    },
    schema::{ColumnConfig, Dialect, LogicalType},
};

static TYPE_PARAM_PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    RegexBuilder::new(r"\(\s*n\s*\)")
        .case_insensitive(true)
        .build()
        .expect("valid type parameter pattern")
});

/// Outcome of coding one cleaned value as a SQL literal.
///
/// `NoLiteral` means the value was blank or did not fit the column type; it
/// is never the same thing as the literal `NULL`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodedValue {
    Coded(String),
    NoLiteral,
}

impl CodedValue {
    pub fn literal(self) -> Option<String> {
        match self {
            CodedValue::Coded(literal) => Some(literal),
            CodedValue::NoLiteral => None,
        }
    }
}

pub fn quote_identifier(name: &str, dialect: Dialect) -> String {
    match dialect {
        Dialect::Postgres | Dialect::Sqlite => format!("\"{}\"", name.replace('"', "\"\"")),
        Dialect::Mysql => format!("`{}`", name.replace('`', "``")),
        Dialect::Sqlserver => format!("[{}]", name.replace(']', "]]")),
    }
}

/// Inverse of [`quote_identifier`]; `None` when `quoted` is not a well-formed
/// quoted identifier for `dialect`.
pub fn unquote_identifier(quoted: &str, dialect: Dialect) -> Option<String> {
    let (open, close) = match dialect {
        Dialect::Postgres | Dialect::Sqlite => ('"', '"'),
        Dialect::Mysql => ('`', '`'),
        Dialect::Sqlserver => ('[', ']'),
    };
    let inner = quoted.strip_prefix(open)?.strip_suffix(close)?;
    let mut output = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch == close {
            if chars.next() != Some(close) {
                return None;
            }
        }
        output.push(ch);
    }
    Some(output)
}

/// Single-quoted string literal with embedded quotes doubled.
pub fn quote_string(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

pub fn code_value(value: &str, ty: LogicalType, dialect: Dialect) -> CodedValue {
    if value.is_empty() {
        return CodedValue::NoLiteral;
    }
    let literal = match ty {
        LogicalType::Integer => is_integer_token(value).then(|| value.to_string()),
        LogicalType::Decimal => {
            is_decimal_token(value).then(|| canonical_decimal(value).to_string())
        }
        LogicalType::Boolean => {
            parse_boolean_token(value).map(|flag| boolean_literal(flag, dialect))
        }
        LogicalType::Date => is_date_shape(value).then(|| quote_string(value)),
        LogicalType::Datetime => has_datetime_shape(value).then(|| quote_string(value)),
        LogicalType::Text => Some(quote_string(value)),
    };
    match literal {
        Some(literal) => CodedValue::Coded(literal),
        None => CodedValue::NoLiteral,
    }
}

fn boolean_literal(flag: bool, dialect: Dialect) -> String {
    let token = match (dialect, flag) {
        (Dialect::Postgres, true) => "TRUE",
        (Dialect::Postgres, false) => "FALSE",
        (_, true) => "1",
        (_, false) => "0",
    };
    token.to_string()
}

pub fn default_sql_type(ty: LogicalType, dialect: Dialect) -> &'static str {
    match ty {
        LogicalType::Integer => match dialect {
            Dialect::Postgres => "INTEGER",
            _ => "INT",
        },
        LogicalType::Decimal => "DECIMAL(38, 10)",
        LogicalType::Boolean => match dialect {
            Dialect::Mysql => "TINYINT(1)",
            _ => "BOOLEAN",
        },
        LogicalType::Date => "DATE",
        LogicalType::Datetime => match dialect {
            Dialect::Sqlite => "TEXT",
            _ => "TIMESTAMP",
        },
        LogicalType::Text => match dialect {
            Dialect::Sqlserver => "NVARCHAR(MAX)",
            _ => "TEXT",
        },
    }
}

/// Column type for `column`: the custom override (with its first `(n)`
/// placeholder filled from `param_n`, clamped to at least 1) or the dialect
/// default for the selected logical type.
pub fn resolve_sql_type(column: &ColumnConfig, dialect: Dialect) -> String {
    let custom = column
        .sql_type
        .custom
        .as_deref()
        .filter(|name| !name.is_empty());
    match custom {
        Some(name) => match column.sql_type.param_n {
            Some(n) if TYPE_PARAM_PLACEHOLDER.is_match(name) => TYPE_PARAM_PLACEHOLDER
                .replace(name, format!("({})", n.max(1)).as_str())
                .into_owned(),
            _ => name.to_string(),
        },
        None => default_sql_type(column.selected_type, dialect).to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeOption {
    pub value: &'static str,
    pub label: &'static str,
    pub has_n: bool,
}

const fn opt(value: &'static str, label: &'static str) -> TypeOption {
    TypeOption {
        value,
        label,
        has_n: false,
    }
}

const fn opt_n(value: &'static str, label: &'static str) -> TypeOption {
    TypeOption {
        value,
        label,
        has_n: true,
    }
}

const COMMON_BASIC: &[TypeOption] = &[
    opt_n("CHAR(n)", "char(n)"),
    opt_n("VARCHAR(n)", "varchar(n)"),
    opt("INT", "int"),
    opt_n("FLOAT(n)", "float(n)"),
    opt("DATE", "date"),
    opt("TIME", "time"),
];

const POSTGRES_EXTRA_BASIC: &[TypeOption] =
    &[opt("TIMESTAMP", "timestamp"), opt("TEXT", "text")];

const POSTGRES_MORE: &[TypeOption] = &[
    opt("SMALLINT", "smallint"),
    opt("BIGINT", "bigint"),
    opt("REAL", "real"),
    opt("DOUBLE PRECISION", "double precision"),
    opt("BOOLEAN", "boolean"),
    opt_n("NUMERIC(n)", "numeric(n)"),
    opt("TIMESTAMPTZ", "timestamp with time zone"),
];

const MYSQL_SQLSERVER_EXTRA_BASIC: &[TypeOption] = &[
    opt("DATETIME", "datetime"),
    opt("TIMESTAMP", "timestamp"),
    opt("TEXT", "text"),
];

const MYSQL_MORE: &[TypeOption] = &[
    opt("TINYINT", "tinyint"),
    opt("SMALLINT", "smallint"),
    opt("BIGINT", "bigint"),
    opt("DOUBLE", "double"),
    opt_n("DECIMAL(n)", "decimal(n)"),
    opt("YEAR", "year"),
];

const SQLSERVER_MORE: &[TypeOption] = &[
    opt("SMALLINT", "smallint"),
    opt("BIGINT", "bigint"),
    opt("REAL", "real"),
    opt_n("DECIMAL(n)", "decimal(n)"),
    opt("DATETIME2", "datetime2"),
    opt("SMALLDATETIME", "smalldatetime"),
    opt("DATETIMEOFFSET", "datetimeoffset"),
    opt("UNIQUEIDENTIFIER", "uniqueidentifier"),
    opt("XML", "xml"),
];

const SQLITE_TYPES: &[TypeOption] = &[
    opt("NULL", "null"),
    opt("INTEGER", "integer"),
    opt("REAL", "real"),
    opt("TEXT", "text"),
    opt("BLOB", "blob"),
];

/// SQL type names offered for `dialect`, sorted by label.
///
/// `show_all` adds the extended list; SQLite has a single list.
pub fn type_options(dialect: Dialect, show_all: bool) -> Vec<TypeOption> {
    let (basic_extra, more): (&[TypeOption], &[TypeOption]) = match dialect {
        Dialect::Sqlite => return SQLITE_TYPES.to_vec(),
        Dialect::Postgres => (POSTGRES_EXTRA_BASIC, POSTGRES_MORE),
        Dialect::Mysql => (MYSQL_SQLSERVER_EXTRA_BASIC, MYSQL_MORE),
        Dialect::Sqlserver => (MYSQL_SQLSERVER_EXTRA_BASIC, SQLSERVER_MORE),
    };
    let extended: &[TypeOption] = if show_all { more } else { &[] };
    let mut options = COMMON_BASIC
        .iter()
        .chain(basic_extra)
        .chain(extended)
        .cloned()
        .collect::<Vec<_>>();
    options.sort_by(|a, b| a.label.cmp(b.label));
    options
}

/// Custom type suggested when a user first overrides a column's SQL type.
pub fn default_custom_type(ty: LogicalType, dialect: Dialect) -> &'static str {
    match ty {
        LogicalType::Integer => "INT",
        LogicalType::Decimal => match dialect {
            Dialect::Sqlite => "REAL",
            _ => "FLOAT(n)",
        },
        LogicalType::Boolean => match dialect {
            Dialect::Mysql => "TINYINT",
            _ => "BOOLEAN",
        },
        LogicalType::Date => "DATE",
        LogicalType::Datetime => match dialect {
            Dialect::Postgres => "TIMESTAMP",
            _ => "DATETIME",
        },
        LogicalType::Text => "TEXT",
    }
}
