//! Command-line interface components.

use crate::config::KrmConfig;
use crate::models::ConversionStats;
use crate::processor::{ConversionJob, KrmProcessor};
use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use std::path::PathBuf;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "krm_processor")]
#[command(about = "Convert KRM fish silhouette .dat files into datastore TOML records")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    /// Path to the KRM silhouette (.dat) file
    #[arg(value_name = "DAT_FILE")]
    pub dat_file: PathBuf,

    /// Specimen metadata JSON file (aphia_id, anatomical_feature, shape_type, ...)
    #[arg(short, long, value_name = "JSON")]
    pub metadata: PathBuf,

    /// Datastore JSON Schema to validate against
    #[arg(short, long, value_name = "SCHEMA")]
    pub schema: Option<PathBuf>,

    /// Output TOML file (defaults to the metadata path with a .toml extension)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Configuration file (defaults to the user config directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Skip the WoRMS taxonomy lookup
    #[arg(long)]
    pub offline: bool,

    /// Language of the vernacular names to keep
    #[arg(long)]
    pub language: Option<String>,

    /// Reject coordinate rows whose field count differs from the first row
    #[arg(long)]
    pub strict: bool,

    /// Treat schema violations as errors
    #[arg(long)]
    pub fail_on_invalid: bool,

    /// Print a silhouette and conversion summary
    #[arg(long)]
    pub summary: bool,

    /// Enable verbose logging (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Args {
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "warn"
        } else {
            match self.verbose {
                0 => "info",
                1 => "debug",
                _ => "trace",
            }
        }
    }

    /// Layer command-line flags over a loaded configuration
    pub fn apply_overrides(&self, mut config: KrmConfig) -> KrmConfig {
        if self.offline {
            config = config.with_offline();
        }
        if let Some(language) = &self.language {
            config = config.with_language(language.clone());
        }
        if self.strict {
            config = config.with_strict_arity();
        }
        if self.fail_on_invalid {
            config = config.with_fail_on_invalid();
        }
        if self.summary {
            config = config.with_summary();
        }
        config
    }

    pub fn to_job(&self) -> ConversionJob {
        ConversionJob {
            dat_path: self.dat_file.clone(),
            metadata_path: self.metadata.clone(),
            schema_path: self.schema.clone(),
            output_path: self.output.clone(),
        }
    }
}

/// Set up structured logging on stderr
pub fn setup_logging(args: &Args) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("krm_processor={}", log_level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_timer(fmt::time::uptime())
                .with_writer(std::io::stderr),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// Resolve configuration and run one conversion
pub async fn run(args: Args) -> Result<ConversionStats> {
    setup_logging(&args)?;

    let config = KrmConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    let config = args.apply_overrides(config);
    let processor = KrmProcessor::new(config)?;

    let stats = processor.run(&args.to_job()).await?;
    Ok(stats)
}
