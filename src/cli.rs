//! Command-line arguments and the manifest-to-document workflow.

use crate::generator::{DocumentationGenerator, GeneratorConfig};
use crate::manifest::ManifestParser;
use crate::scanner::ManifestScanner;
use crate::serializer::{serialize_json, serialize_yaml, write_to_file};
use crate::swagger_builder::{host_from_url, Info};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{debug, info, warn};
use std::path::PathBuf;

/// Generate Swagger 2.0 documentation from a route table, handler doc comments and DTO declarations
#[derive(Parser, Debug)]
#[command(name = "dto-swagger")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Manifest file, or directory of .yaml/.yml/.json manifests
    #[arg(value_name = "INPUT")]
    pub input_path: PathBuf,

    /// Output format (json or yaml)
    #[arg(short = 'f', long = "format", value_enum, default_value = "json")]
    pub output_format: OutputFormat,

    /// Output file path (if not specified, outputs to stdout)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output_path: Option<PathBuf>,

    /// Literal URI prefix of the documented routes
    #[arg(long = "prefix", default_value = "api/v2/")]
    pub prefix: String,

    /// URI prefix of the documentation endpoint, excluded from the document.
    /// Defaults to `<PREFIX>documentation`; an empty value disables the exclusion
    #[arg(long = "docs-prefix")]
    pub docs_prefix: Option<String>,

    /// Application URL; the scheme is stripped to form the document host
    #[arg(long = "host", env = "APP_URL")]
    pub host: Option<String>,

    /// API version reported in the info section
    #[arg(long = "api-version", default_value = "v2")]
    pub api_version: String,

    /// API title reported in the info section
    #[arg(long = "title", default_value = "API Documentation")]
    pub title: String,

    /// API description reported in the info section
    #[arg(long = "description", default_value = "API v2 endpoints documentation")]
    pub description: String,

    /// Seed for generated example values, for reproducible output
    #[arg(long = "seed")]
    pub seed: Option<u64>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

/// Parse command line arguments
pub fn parse_args() -> Result<CliArgs> {
    let args = CliArgs::parse();
    parse_args_from_parsed(args)
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if !args.input_path.exists() {
        anyhow::bail!("Input path does not exist: {}", args.input_path.display());
    }

    info!("Input: {}", args.input_path.display());
    info!("Output format: {:?}", args.output_format);
    match &args.output_path {
        Some(output) => info!("Output file: {}", output.display()),
        None => info!("Output: stdout"),
    }
    info!("Route prefix: {}", args.prefix);

    Ok(args)
}

impl CliArgs {
    /// Build configuration from the arguments
    pub fn generator_config(&self) -> GeneratorConfig {
        let host = match &self.host {
            Some(url) => host_from_url(url),
            None => {
                warn!("No --host given and APP_URL is not set, using localhost");
                "localhost".to_string()
            }
        };

        GeneratorConfig {
            prefix: self.prefix.clone(),
            docs_prefix: self.docs_prefix.clone(),
            host,
            info: Info {
                version: self.api_version.clone(),
                title: self.title.clone(),
                description: self.description.clone(),
            },
            seed: self.seed,
        }
    }
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    info!("Starting Swagger document generation...");

    // Step 1: Find manifest files
    let scanner = ManifestScanner::new(args.input_path.clone());
    let scan_result = scanner.scan()?;
    info!("Found {} manifest files", scan_result.manifest_files.len());
    for warning in &scan_result.warnings {
        warn!("{}", warning);
    }
    if scan_result.manifest_files.is_empty() {
        anyhow::bail!("No manifest files found in {}", args.input_path.display());
    }

    // Step 2: Load and merge manifests
    let manifest = ManifestParser::load_all(&scan_result.manifest_files)
        .context("Failed to load manifests")?;
    info!(
        "Loaded {} routes, {} handler doc comments, {} types",
        manifest.routes.len(),
        manifest.handlers.len(),
        manifest.types.len()
    );

    // Step 3: Register structured types
    let types = manifest
        .type_registry()
        .context("Invalid structured type declarations")?;

    // Step 4: Generate the document
    let generator = DocumentationGenerator::new(args.generator_config(), &types);
    let document = generator
        .generate(&manifest.routes, &manifest.handler_docs())
        .context("Documentation build failed")?;

    // Step 5: Serialize to requested format
    info!("Serializing to {:?} format...", args.output_format);
    let content = match args.output_format {
        OutputFormat::Json => serialize_json(&document)?,
        OutputFormat::Yaml => serialize_yaml(&document)?,
    };

    // Step 6: Output to file or stdout
    if let Some(output_path) = &args.output_path {
        write_to_file(&content, output_path)?;
        info!("Successfully wrote Swagger document to {}", output_path.display());
    } else {
        println!("{}", content);
    }

    info!("Summary:");
    info!("  - Manifests: {}", scan_result.manifest_files.len());
    info!("  - Paths: {}", document.paths.len());
    info!("  - Definitions: {}", document.definitions.len());
    info!("  - Tags: {}", document.tags.len());

    Ok(())
}
