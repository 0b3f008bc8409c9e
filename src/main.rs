//! Harness Compiler CLI
//!
//! Usage:
//!   harness-compiler [OPTIONS] [FILES]...
//!
//! Options:
//!   -p, --prepend <FILE>     YAML snippets placed before every input (shared anchors)
//!   -c, --config <FILE>      Compiler configuration (TOML format)
//!   -f, --format <FORMAT>    Output formats: json, tsv, bom-json (default: json and tsv)
//!   -o, --output-dir <DIR>   Directory for output files
//!   -v, --verbose            Log resolution steps to stderr
//!   -h, --help               Print help

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use harness_compiler::bom::to_tsv;
use harness_compiler::parser::concat_sources;
use harness_compiler::{compile_with_config, CompileConfig, Harness};

#[derive(Parser)]
#[command(name = "harness-compiler")]
#[command(about = "Resolve wiring harness descriptions into a connected model and BOM")]
struct Cli {
    /// Input files (reads from stdin if none are given)
    inputs: Vec<PathBuf>,

    /// YAML files prepended to every input, e.g. shared templates
    #[arg(short, long)]
    prepend: Vec<PathBuf>,

    /// Compiler configuration (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output formats to generate
    #[arg(short, long, value_enum)]
    format: Vec<OutputFormat>,

    /// Directory for output files (defaults to each input's directory)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Log resolution steps to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Resolved harness model
    Json,
    /// BOM table as tab separated values
    Tsv,
    /// BOM items as JSON
    BomJson,
}

impl OutputFormat {
    fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Tsv => "tsv",
            OutputFormat::BomJson => "bom.json",
        }
    }

    fn render(self, harness: &Harness, config: &CompileConfig) -> Result<String, serde_json::Error> {
        match self {
            OutputFormat::Json => harness.to_json(),
            OutputFormat::Tsv => Ok(to_tsv(&harness.bom, &config.bom)),
            OutputFormat::BomJson => harness.bom.to_json(),
        }
    }
}

fn fail(message: String) -> ! {
    eprintln!("{message}");
    std::process::exit(1);
}

fn read_file(path: &Path) -> String {
    fs::read_to_string(path)
        .unwrap_or_else(|e| fail(format!("Error reading file '{}': {}", path.display(), e)))
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => CompileConfig::from_file(path).unwrap_or_else(|e| {
            fail(format!("Error loading config '{}': {}", path.display(), e))
        }),
        None => CompileConfig::default(),
    };

    let prepend: Vec<String> = cli.prepend.iter().map(|path| read_file(path)).collect();
    let formats = if cli.format.is_empty() {
        vec![OutputFormat::Json, OutputFormat::Tsv]
    } else {
        cli.format.clone()
    };

    if cli.inputs.is_empty() {
        let mut buffer = String::new();
        if let Err(e) = io::stdin().read_to_string(&mut buffer) {
            fail(format!("Error reading from stdin: {}", e));
        }
        let harness = compile(&concat_sources(&prepend, &buffer), "<stdin>", &config);
        match &cli.output_dir {
            Some(dir) => write_outputs(&harness, &formats, &dir.join("harness"), &config),
            None => {
                for format in &formats {
                    println!("{}", render(&harness, *format, &config));
                }
            }
        }
        return;
    }

    for input in &cli.inputs {
        let source = concat_sources(&prepend, &read_file(input));
        let harness = compile(&source, &input.display().to_string(), &config);
        let stem = input
            .file_stem()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("harness"));
        let base = match &cli.output_dir {
            Some(dir) => dir.join(stem),
            None => input.with_file_name(stem),
        };
        write_outputs(&harness, &formats, &base, &config);
    }
}

fn compile(source: &str, filename: &str, config: &CompileConfig) -> Harness {
    compile_with_config(source, config).unwrap_or_else(|e| fail(e.format(source, filename)))
}

fn render(harness: &Harness, format: OutputFormat, config: &CompileConfig) -> String {
    format
        .render(harness, config)
        .unwrap_or_else(|e| fail(format!("Error serializing output: {}", e)))
}

fn write_outputs(harness: &Harness, formats: &[OutputFormat], base: &Path, config: &CompileConfig) {
    if let Some(dir) = base.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        if let Err(e) = fs::create_dir_all(dir) {
            fail(format!("Error creating directory '{}': {}", dir.display(), e));
        }
    }
    for format in formats {
        let mut path = base.as_os_str().to_owned();
        path.push(".");
        path.push(format.extension());
        let path = PathBuf::from(path);
        if let Err(e) = fs::write(&path, render(harness, *format, config)) {
            fail(format!("Error writing '{}': {}", path.display(), e));
        }
        info!(path = %path.display(), "wrote output");
    }
}
