//! I/O utilities for CSV reading, encoding, delimiter resolution, and SQL output.
//!
//! All file I/O in csv2sql flows through this module. It provides:
//!
//! - **Delimiter resolution**: extension-based auto-detection (`.csv` → comma,
//!   `.tsv` → tab) with manual override support.
//! - **Encoding**: input decoding via `encoding_rs`, defaulting to UTF-8.
//! - **Table loading**: [`read_table`] turns raw CSV into a [`ParsedTable`]
//!   (first record is the header row, blank records are skipped, ragged rows
//!   are accepted).
//! - **stdin/stdout**: the `-` path convention routes through standard streams.

use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

use anyhow::{Context, Result, anyhow};
use encoding_rs::{Encoding, UTF_8};

use crate::schema::ParsedTable;

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_TSV_DELIMITER: u8 = b'\t';

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    if let Some(value) = label {
        Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{value}'"))
    } else {
        Ok(UTF_8)
    }
}

pub fn resolve_input_delimiter(path: &Path, provided: Option<u8>) -> u8 {
    provided.unwrap_or_else(|| match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => DEFAULT_TSV_DELIMITER,
        _ => DEFAULT_CSV_DELIMITER,
    })
}

pub fn open_csv_reader<R>(reader: R, delimiter: u8) -> csv::Reader<R>
where
    R: Read,
{
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(false)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(true);
    builder.from_reader(reader)
}

pub fn open_input(path: &Path) -> Result<Box<dyn Read>> {
    if is_dash(path) {
        Ok(Box::new(std::io::stdin().lock()))
    } else {
        Ok(Box::new(BufReader::new(
            File::open(path).with_context(|| format!("Opening input file {path:?}"))?,
        )))
    }
}

pub fn decode_bytes(bytes: &[u8], encoding: &'static Encoding) -> Result<String> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        Err(anyhow!(
            "Failed to decode text with encoding {}",
            encoding.name()
        ))
    } else {
        Ok(text.into_owned())
    }
}

pub fn decode_record(record: &csv::ByteRecord, encoding: &'static Encoding) -> Result<Vec<String>> {
    record
        .iter()
        .map(|field| decode_bytes(field, encoding))
        .collect()
}

fn is_blank_record(record: &[String]) -> bool {
    record.iter().all(|cell| cell.trim().is_empty())
}

/// Reads an entire CSV stream; the first non-blank record becomes the header row.
pub fn read_table_from_reader<R>(
    reader: R,
    delimiter: u8,
    encoding: &'static Encoding,
) -> Result<ParsedTable>
where
    R: Read,
{
    let mut reader = open_csv_reader(reader, delimiter);
    let mut headers: Option<Vec<String>> = None;
    let mut rows = Vec::new();
    for (idx, record) in reader.byte_records().enumerate() {
        let record = record.with_context(|| format!("Reading record {}", idx + 1))?;
        let decoded = decode_record(&record, encoding)
            .with_context(|| format!("Decoding record {}", idx + 1))?;
        if is_blank_record(&decoded) {
            continue;
        }
        if headers.is_none() {
            headers = Some(decoded);
        } else {
            rows.push(decoded);
        }
    }
    Ok(ParsedTable::new(headers.unwrap_or_default(), rows))
}

pub fn read_table(path: &Path, delimiter: u8, encoding: &'static Encoding) -> Result<ParsedTable> {
    let input = open_input(path)?;
    read_table_from_reader(input, delimiter, encoding)
        .with_context(|| format!("Parsing CSV from {path:?}"))
}

pub fn parse_csv_str(content: &str) -> Result<ParsedTable> {
    read_table_from_reader(content.as_bytes(), DEFAULT_CSV_DELIMITER, UTF_8)
}

pub fn open_output_writer(path: Option<&Path>) -> Result<Box<dyn Write>> {
    match path {
        Some(p) if !is_dash(p) => Ok(Box::new(BufWriter::new(
            File::create(p).with_context(|| format!("Creating output file {p:?}"))?,
        ))),
        _ => Ok(Box::new(std::io::stdout())),
    }
}

/// Writes `content` followed by a newline to `path` (stdout when `None` or `-`).
pub fn write_text(path: Option<&Path>, content: &str) -> Result<()> {
    let mut writer = open_output_writer(path)?;
    writeln!(writer, "{content}").context("Writing SQL output")?;
    writer.flush().context("Flushing SQL output")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn first_record_becomes_headers_and_blank_lines_are_skipped() {
        let table = parse_csv_str("id,name\n1,Ada\n , \n2\n\n3,\"Lovelace, A\"\n").unwrap();
        assert_eq!(table.headers, vec!["id", "name"]);
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.cell(1, 1), "");
        assert_eq!(table.cell(2, 1), "Lovelace, A");
    }

    #[test]
    fn empty_input_yields_empty_table() {
        let table = parse_csv_str("").unwrap();
        assert!(table.headers.is_empty());
        assert!(table.rows.is_empty());
    }

    #[test]
    fn decodes_non_utf8_input() {
        let bytes: &[u8] = b"name\ncaf\xe9\n";
        let encoding = resolve_encoding(Some("latin1")).unwrap();
        let table = read_table_from_reader(bytes, b',', encoding).unwrap();
        assert_eq!(table.cell(0, 0), "café");
        assert!(resolve_encoding(Some("klingon")).is_err());
    }

    #[test]
    fn tsv_extension_implies_tab() {
        assert_eq!(resolve_input_delimiter(&PathBuf::from("a.tsv"), None), b'\t');
        assert_eq!(resolve_input_delimiter(&PathBuf::from("a.csv"), None), b',');
        assert_eq!(resolve_input_delimiter(&PathBuf::from("a.tsv"), Some(b';')), b';');
    }
}
