//! Knockoff CLI
//!
//! Run tracking scenarios headless, classify single points, and emit the
//! default config or JSON schemas.

#[cfg(feature = "cli")]
use anyhow::Result;
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand, ValueEnum};
#[cfg(feature = "cli")]
use knockoff_cli::{OutputFormat, SchemaKind};
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "knockoff")]
#[command(about = "Platform membership tracker", long_about = None)]
struct Cli {
    /// Log at debug level (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
    Yaml,
}

#[cfg(feature = "cli")]
impl From<Format> for OutputFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Text => OutputFormat::Text,
            Format::Json => OutputFormat::Json,
            Format::Yaml => OutputFormat::Yaml,
        }
    }
}

#[cfg(feature = "cli")]
#[derive(Clone, Copy, ValueEnum)]
enum Schema {
    Config,
    Scenario,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Run one or more scenario files (JSON or YAML)
    Run {
        /// Scenario file paths
        #[arg(required = true)]
        scenarios: Vec<PathBuf>,

        /// Report format
        #[arg(long, value_enum, default_value = "text")]
        format: Format,

        /// Write the report here instead of stdout (single scenario only)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Classify a position against configured platform bounds
    Classify {
        #[arg(allow_hyphen_values = true)]
        x: f64,
        #[arg(allow_hyphen_values = true)]
        y: f64,
        #[arg(allow_hyphen_values = true)]
        z: f64,

        /// Tracker config file (defaults when omitted)
        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long, value_enum, default_value = "text")]
        format: Format,
    },

    /// Print the default tracker config
    Config {
        #[arg(long, value_enum, default_value = "yaml")]
        format: Format,

        /// Output file path
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Print a JSON schema
    Schema {
        #[arg(value_enum)]
        kind: Schema,

        /// Output file path
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[cfg(feature = "cli")]
fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match cli.command {
        Commands::Run {
            scenarios,
            format,
            out,
        } => {
            if out.is_some() && scenarios.len() > 1 {
                anyhow::bail!("--out takes a single scenario");
            }

            let mut failed = Vec::new();
            for path in &scenarios {
                let report = knockoff_cli::run_scenario_file(path)?;
                let rendered = knockoff_cli::render_report(&report, format.into())?;
                emit(out.as_ref(), &rendered)?;
                if !report.passed() {
                    failed.push(report.id);
                }
            }

            if !failed.is_empty() {
                anyhow::bail!("Scenario assertions failed: {}", failed.join(", "));
            }
        }

        Commands::Classify {
            x,
            y,
            z,
            config,
            format,
        } => {
            let config = knockoff_cli::load_config(config.as_deref())?;
            let result = knockoff_cli::classify_point(&config, [x, y, z])?;
            let text = knockoff_cli::render_classification(&result, format.into())?;
            println!("{}", text);
        }

        Commands::Config { format, out } => {
            let text = knockoff_cli::default_config_text(format.into())?;
            emit(out.as_ref(), &text)?;
        }

        Commands::Schema { kind, out } => {
            let kind = match kind {
                Schema::Config => SchemaKind::Config,
                Schema::Scenario => SchemaKind::Scenario,
            };
            emit(out.as_ref(), &knockoff_cli::schema_text(kind)?)?;
        }
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn emit(out: Option<&PathBuf>, text: &str) -> Result<()> {
    match out {
        Some(path) => {
            knockoff_cli::write_output(path, text)?;
            log::info!("Wrote {}", path.display());
        }
        None => println!("{}", text.trim_end()),
    }
    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("knockoff CLI is not available. Enable the 'cli' feature to use it.");
    std::process::exit(1);
}
