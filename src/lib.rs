pub mod clean;
pub mod cli;
pub mod data;
pub mod duplicates;
pub mod emit;
pub mod generate_cmd;
pub mod impute;
pub mod infer;
pub mod io_utils;
pub mod preview;
pub mod probe;
pub mod schema;
pub mod sql;
pub mod table;
pub mod transform;
pub mod types_cmd;

use std::{env, sync::OnceLock};

use anyhow::Result;
use clap::Parser;
use log::LevelFilter;

use crate::cli::{Cli, Commands};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("csv2sql", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Probe(args) => probe::execute(&args),
        Commands::Generate(args) => generate_cmd::execute(&args),
        Commands::Preview(args) => preview::execute(&args),
        Commands::Types(args) => types_cmd::execute(&args),
    }
}

pub(crate) fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b',' => ",".to_string(),
        b'\t' => "\\t".to_string(),
        b'\n' => "\\n".to_string(),
        other => (other as char).to_string(),
    }
}
