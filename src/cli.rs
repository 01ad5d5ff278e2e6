use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::schema::Dialect;

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Clean CSV columns and generate SQL tables and inserts",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Infer column types from a CSV file and write a column configuration
    Probe(ProbeArgs),
    /// Generate CREATE TABLE and INSERT statements for a CSV file
    Generate(GenerateArgs),
    /// Show cleaned values for the first rows of a CSV file
    Preview(PreviewArgs),
    /// List the SQL types offered for a dialect
    Types(TypesArgs),
}

#[derive(Debug, Args)]
pub struct ProbeArgs {
    /// Input CSV file to inspect ('-' reads stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Destination configuration file (.yml/.yaml or .json)
    #[arg(short = 'o', long = "output")]
    pub output: PathBuf,
    /// Table name stored in the configuration
    #[arg(long)]
    pub table: Option<String>,
    /// SQL dialect stored in the configuration
    #[arg(long, value_enum)]
    pub dialect: Option<Dialect>,
    /// Number of rows to sample when inferring types (0 means full scan)
    #[arg(long, default_value_t = 0)]
    pub sample_rows: usize,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Input CSV file ('-' reads stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Column configuration produced by `probe` (inferred when omitted)
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,
    /// Table name, overriding the configuration
    #[arg(long)]
    pub table: Option<String>,
    /// SQL dialect, overriding the configuration
    #[arg(long, value_enum)]
    pub dialect: Option<Dialect>,
    /// Write the CREATE TABLE statement here instead of stdout
    #[arg(long = "create-output")]
    pub create_output: Option<PathBuf>,
    /// Write the INSERT statement here instead of stdout
    #[arg(long = "insert-output")]
    pub insert_output: Option<PathBuf>,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct PreviewArgs {
    /// Input CSV file to preview
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Column configuration (inferred when omitted)
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,
    /// Number of rows to display
    #[arg(long, default_value_t = 5)]
    pub rows: usize,
    /// CSV delimiter character
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding for input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct TypesArgs {
    /// Dialect whose type catalog to list
    #[arg(long, value_enum, default_value_t = Dialect::Postgres)]
    pub dialect: Dialect,
    /// Include the extended type list
    #[arg(long)]
    pub all: bool,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
