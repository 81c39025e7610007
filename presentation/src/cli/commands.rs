//! CLI command definitions

use clap::{Parser, Subcommand, ValueEnum};
use ratecard_domain::TaskKind;
use std::path::PathBuf;

/// Output format for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Colored human-readable text
    Text,
    /// JSON output
    Json,
}

impl From<OutputFormat> for ratecard_domain::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => ratecard_domain::OutputFormat::Text,
            OutputFormat::Json => ratecard_domain::OutputFormat::Json,
        }
    }
}

/// CLI arguments for ratecard-quorum
#[derive(Parser, Debug)]
#[command(name = "ratecard-quorum")]
#[command(author, version, about = "Crowdsourced parking rate-card transcription and consensus")]
#[command(long_about = r#"
ratecard-quorum turns crowd workers' judgments about parking-sign photos into
decisions: normalized rate transcriptions, category labels and photo-change
classifications. Every judgment is accepted or rejected with feedback.

Configuration files are loaded from (in priority order):
1. --config <path>                          Explicit config file
2. RATECARD_* environment variables
3. ./ratecard.toml                          Project-level config
4. ~/.config/ratecard-quorum/config.toml    Global config

Example:
  ratecard-quorum parse transcription.txt
  ratecard-quorum rates batch-2024-03-01
  ratecard-quorum -o json categories batch-2024-03-01
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Output format (overrides [output] format)
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<OutputFormat>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Parse a rate transcription and show the canonical form of every line
    Parse {
        /// Transcription file (reads stdin when omitted)
        file: Option<PathBuf>,
    },
    /// Decide a rate transcription batch
    Rates {
        batch_id: String,
    },
    /// Decide a categorization batch
    Categories {
        batch_id: String,
    },
    /// Decide a photo-change batch
    PhotoChange {
        batch_id: String,
    },
    /// Mark show-quality photos from a JSON list of categorized assets
    ShowQuality {
        assets: PathBuf,
    },
}

impl Command {
    /// Batch id and task kind for the batch subcommands
    pub fn batch(&self) -> Option<(&str, TaskKind)> {
        match self {
            Command::Rates { batch_id } => Some((batch_id, TaskKind::RateTranscription)),
            Command::Categories { batch_id } => Some((batch_id, TaskKind::Categorization)),
            Command::PhotoChange { batch_id } => Some((batch_id, TaskKind::PhotoChange)),
            Command::Parse { .. } | Command::ShowQuality { .. } => None,
        }
    }
}
