//! Iarkho CLI: dramaturgy statistics for annotated plays.
//!
//! Usage:
//!   iarkho analyze <FILE> --format <plain-text|tei> [--catalog TSV] [--output FILE]
//!   iarkho batch <INPUT_DIR> <OUTPUT_DIR> --format <plain-text|tei> [--catalog TSV] [--jobs N]

use clap::{Parser, Subcommand, ValueEnum};
use iarkho::{analyze_file, BatchDriver, Catalog, EngineConfig, PlayEngine, PLAIN_TEXT_KIND, TEI_KIND};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "iarkho", version, about = "Scene and speaker statistics for annotated plays")]
struct Cli {
    /// YAML configuration file (defaults to <config_dir>/iarkho/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    /// Annotated word-processor export
    PlainText,
    /// TEI XML (`.xml`)
    Tei,
}

impl Format {
    fn kind(self) -> &'static str {
        match self {
            Format::PlainText => PLAIN_TEXT_KIND,
            Format::Tei => TEI_KIND,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a single play
    Analyze {
        /// Play source file
        file: PathBuf,
        #[arg(long, value_enum)]
        format: Format,
        /// Tab-separated metadata catalog
        #[arg(long)]
        catalog: Option<PathBuf>,
        /// Write JSON here instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Analyze every play in a directory
    Batch {
        input_dir: PathBuf,
        output_dir: PathBuf,
        #[arg(long, value_enum)]
        format: Format,
        /// Tab-separated metadata catalog
        #[arg(long)]
        catalog: Option<PathBuf>,
        /// Plays processed concurrently (overrides config)
        #[arg(long, short)]
        jobs: Option<usize>,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load_catalog(path: Option<&Path>) -> Result<Option<Catalog>, String> {
    path.map(|p| {
        Catalog::from_file(p).map_err(|e| format!("Failed to load catalog {}: {}", p.display(), e))
    })
    .transpose()
}

fn cmd_analyze(
    engine: &PlayEngine,
    file: &Path,
    format: Format,
    catalog: Option<&Path>,
    output: Option<&Path>,
) -> i32 {
    let catalog = match load_catalog(catalog) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let router = engine.router();
    let json = match analyze_file(engine, &router, format.kind(), file, catalog.as_ref())
        .and_then(|play| play.to_json_pretty())
    {
        Ok(json) => json,
        Err(e) => {
            eprintln!("Error: {}: {}", file.display(), e);
            return 1;
        }
    };

    match output {
        Some(path) => match std::fs::write(path, json) {
            Ok(()) => {
                println!("Wrote {}", path.display());
                0
            }
            Err(e) => {
                eprintln!("Error: failed to write {}: {}", path.display(), e);
                1
            }
        },
        None => {
            println!("{}", json);
            0
        }
    }
}

fn cmd_batch(
    engine: PlayEngine,
    input_dir: &Path,
    output_dir: &Path,
    format: Format,
    catalog: Option<&Path>,
    jobs: Option<usize>,
) -> i32 {
    let catalog = match load_catalog(catalog) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let mut driver = BatchDriver::new(engine);
    if let Some(catalog) = catalog {
        driver = driver.with_catalog(catalog);
    }
    if let Some(jobs) = jobs {
        driver = driver.with_concurrency(jobs);
    }

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: failed to start runtime: {}", e);
            return 1;
        }
    };
    let summary = match rt.block_on(driver.run(input_dir, output_dir, format.kind())) {
        Ok(summary) => summary,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    for written in &summary.written {
        println!(
            "  {} -> {} ({} warnings)",
            written.input.display(),
            written.output.display(),
            written.warnings
        );
    }
    for failure in &summary.failures {
        eprintln!("  FAILED {}: {}", failure.input.display(), failure.error);
    }
    println!(
        "Processed {} plays: {} written, {} failed",
        summary.total(),
        summary.written.len(),
        summary.failures.len()
    );

    if summary.is_success() {
        0
    } else {
        1
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match EngineConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    let engine = PlayEngine::new(config);

    let code = match cli.command {
        Commands::Analyze {
            file,
            format,
            catalog,
            output,
        } => cmd_analyze(&engine, &file, format, catalog.as_deref(), output.as_deref()),
        Commands::Batch {
            input_dir,
            output_dir,
            format,
            catalog,
            jobs,
        } => cmd_batch(engine, &input_dir, &output_dir, format, catalog.as_deref(), jobs),
    };
    std::process::exit(code);
}
