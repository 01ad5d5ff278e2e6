mod common;

use common::{TestWorkspace, csv2sql, path_arg};
use csv2sql::schema::{Dialect, LogicalType, Schema};
use predicates::prelude::*;
use predicates::str::contains;

const COMPANIES: &str = "id,name,amount,active\n1,  ACME  ,1200.50,yes\n2,Globex,,no\n";

#[test]
fn probe_writes_seeded_configuration() {
    let ws = TestWorkspace::new();
    let input = ws.write("companies.csv", COMPANIES);
    let config = ws.path().join("companies.yml");

    csv2sql()
        .args(["probe", "-i", path_arg(&input), "-o", path_arg(&config)])
        .args(["--table", "companies", "--dialect", "mysql"])
        .assert()
        .success();

    let schema = Schema::load(&config).expect("load configuration");
    assert_eq!(schema.table, "companies");
    assert_eq!(schema.dialect, Dialect::Mysql);
    let types = schema
        .columns
        .iter()
        .map(|c| c.selected_type)
        .collect::<Vec<_>>();
    assert_eq!(
        types,
        vec![
            LogicalType::Integer,
            LogicalType::Text,
            LogicalType::Decimal,
            LogicalType::Boolean
        ]
    );
    assert!(schema.columns[1].cleaning.trim_whitespace);
    assert_eq!(
        schema.columns[1].references.column_name.as_deref(),
        Some("name_refs")
    );
}

#[test]
fn generate_from_probed_configuration_prints_both_statements() {
    let ws = TestWorkspace::new();
    let input = ws.write("companies.csv", COMPANIES);
    let config = ws.path().join("companies.json");

    csv2sql()
        .args(["probe", "-i", path_arg(&input), "-o", path_arg(&config)])
        .args(["--table", "companies"])
        .assert()
        .success();

    csv2sql()
        .args(["generate", "-i", path_arg(&input), "-c", path_arg(&config)])
        .args(["--dialect", "mysql"])
        .assert()
        .success()
        .stdout(contains("CREATE TABLE `companies` (\n  `id` INT,"))
        .stdout(contains("`active` TINYINT(1)\n);\n\nINSERT INTO `companies`"))
        .stdout(contains("(1, 'ACME', 1200.5, 1),\n(2, 'Globex', NULL, 0);"));
}

#[test]
fn generate_without_configuration_writes_output_files() {
    let ws = TestWorkspace::new();
    let input = ws.write("people.csv", "id,name\n1,Ada\n2,Grace\n");
    let create = ws.path().join("create.sql");
    let insert = ws.path().join("insert.sql");

    csv2sql()
        .args(["generate", "-i", path_arg(&input), "--table", "people"])
        .args(["--create-output", path_arg(&create)])
        .args(["--insert-output", path_arg(&insert)])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    assert_eq!(
        ws.read("create.sql"),
        "CREATE TABLE \"people\" (\n  \"id\" INTEGER,\n  \"name\" TEXT\n);\n"
    );
    assert_eq!(
        ws.read("insert.sql"),
        "INSERT INTO \"people\" (\"id\", \"name\")\nVALUES\n(1, 'Ada'),\n(2, 'Grace');\n"
    );
}

#[test]
fn generate_reads_tab_delimited_stdin() {
    csv2sql()
        .args(["generate", "-i", "-", "--delimiter", "tab", "--dialect", "sqlserver"])
        .write_stdin("code\tlabel\n7\tx\n")
        .assert()
        .success()
        .stdout(contains("CREATE TABLE [my_table]"))
        .stdout(contains("INSERT INTO [my_table] ([code], [label])\nVALUES\n(7, 'x');"));
}

#[test]
fn generate_rejects_configuration_with_bad_merge_source() {
    let ws = TestWorkspace::new();
    let input = ws.write("a.csv", "a\n1\n");
    let config = ws.write(
        "bad.yml",
        "table: t\ncolumns:\n  - name: a\n    merge:\n      sources: [5]\n",
    );

    csv2sql()
        .args(["generate", "-i", path_arg(&input), "-c", path_arg(&config)])
        .assert()
        .failure()
        .stderr(contains("error:"))
        .stderr(contains("merges source 5"));
}

#[test]
fn generate_rejects_configuration_for_other_file() {
    let ws = TestWorkspace::new();
    let input = ws.write("a.csv", "a,b\n1,2\n");
    let config = ws.write("one.yml", "table: t\ncolumns:\n  - name: a\n");

    csv2sql()
        .args(["generate", "-i", path_arg(&input), "-c", path_arg(&config)])
        .assert()
        .failure()
        .stderr(contains("lists 1 column(s) but the input has 2"));
}

#[test]
fn preview_shows_cleaned_values_and_duplicate_flags() {
    let ws = TestWorkspace::new();
    let input = ws.write("cities.csv", "city,country\n Paris[1] ,FR\nParis,FR\nRome,IT\n");
    let config = ws.write(
        "cities.yml",
        concat!(
            "table: cities\n",
            "columns:\n",
            "  - name: city\n",
            "    cleaning:\n",
            "      trim_whitespace: true\n",
            "    references:\n",
            "      enabled: true\n",
            "      column_name: city_refs\n",
            "    duplicate_key: true\n",
            "  - name: country\n",
        ),
    );

    csv2sql()
        .args(["preview", "-i", path_arg(&input), "-c", path_arg(&config)])
        .args(["--rows", "2"])
        .assert()
        .success()
        .stdout(contains("city"))
        .stdout(contains("city_refs"))
        .stdout(contains("[1]"))
        .stdout(contains("yes"))
        .stdout(contains("Rome").not());
}

#[test]
fn types_lists_dialect_catalog() {
    csv2sql()
        .args(["types", "--dialect", "sqlite"])
        .assert()
        .success()
        .stdout(contains("BLOB"))
        .stdout(contains("VARCHAR").not());

    csv2sql()
        .args(["types", "--dialect", "mysql", "--all"])
        .assert()
        .success()
        .stdout(contains("YEAR"))
        .stdout(contains("VARCHAR(n)"));
}

#[test]
fn types_lists_defaults_per_logical_type() {
    csv2sql()
        .args(["types", "--dialect", "mysql"])
        .assert()
        .success()
        .stdout(contains("suggested custom"))
        .stdout(contains("DECIMAL(38, 10)"))
        .stdout(contains("TINYINT(1)"))
        .stdout(contains("FLOAT(n)"));
}

#[test]
fn unknown_dialect_is_rejected() {
    csv2sql()
        .args(["types", "--dialect", "oracle"])
        .assert()
        .failure()
        .stderr(contains("invalid value 'oracle'"));
}
