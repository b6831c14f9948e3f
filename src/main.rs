//! dto-swagger - command-line tool for generating Swagger 2.0 documentation.
//!
//! Reads one or more manifests (route table, handler doc comments and DTO
//! declarations) and writes the assembled document.
//!
//! # Usage
//!
//! ```bash
//! dto-swagger [OPTIONS] <INPUT>
//! ```
//!
//! # Examples
//!
//! Generate JSON documentation from a directory of manifests:
//! ```bash
//! APP_URL=https://api.example.com dto-swagger ./docs/api -o public/swagger.json
//! ```
//!
//! Generate YAML with reproducible example values:
//! ```bash
//! dto-swagger ./docs/api.yaml -f yaml --seed 1 --host api.example.com
//! ```

use anyhow::Result;
use clap::Parser;
use dto_swagger::cli;
use log::info;

fn main() -> Result<()> {
    // Parse once to read the verbose flag before the logger exists
    let args = cli::CliArgs::parse();

    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .parse_default_env()
        .init();

    info!("dto-swagger starting...");

    let args = cli::parse_args_from_parsed(args)?;
    cli::run(args)?;

    info!("Swagger document generation completed successfully");

    Ok(())
}
