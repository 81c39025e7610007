//! CLI entrypoint for ratecard-quorum
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use ratecard_application::{
    AuditLogger, MarkShowQualityUseCase, NoAuditLogger, ProcessBatchInput, ProcessBatchUseCase,
};
use ratecard_domain::{CategorizedAsset, OutputFormat, parse_submission};
use ratecard_infrastructure::{
    ConfigLoader, FileConfig, FileMarketplace, JsonDecisionStore, JsonlAuditLogger,
};
use ratecard_presentation::{Cli, Command, ConsoleFormatter, ProgressReporter};
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        return Ok(());
    }

    let config: FileConfig = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow::anyhow!("Failed to load configuration: {e}"))?
    };

    for issue in config.validate() {
        warn!("{}", issue);
    }
    let processing = config.to_processing_config()?;

    let format: OutputFormat = cli
        .output
        .map(Into::into)
        .or(config.output.format)
        .unwrap_or_default();
    if !config.output.color {
        ConsoleFormatter::disable_color();
    }
    let show_progress = !cli.quiet && config.output.progress && format == OutputFormat::Text;

    let Some(command) = cli.command.clone() else {
        bail!("No command given. Run with --help for usage.");
    };

    info!("Starting ratecard-quorum");

    // === Dependency Injection ===
    let audit: Arc<dyn AuditLogger> = match &config.logging.audit_log {
        Some(path) => match JsonlAuditLogger::new(path) {
            Some(logger) => Arc::new(logger),
            None => Arc::new(NoAuditLogger),
        },
        None => Arc::new(NoAuditLogger),
    };

    if let Command::Parse { file } = &command {
        let text = match file {
            Some(path) => tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?,
            None => {
                let mut text = String::new();
                tokio::io::stdin()
                    .read_to_string(&mut text)
                    .await
                    .context("Failed to read stdin")?;
                text
            }
        };
        let source = file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "stdin".to_string());
        let result = parse_submission(source, &text);

        let output = match format {
            OutputFormat::Text => ConsoleFormatter::format_parse(&result),
            OutputFormat::Json => ConsoleFormatter::format_json(&result),
        };
        println!("{}", output);
        return Ok(());
    }

    let store = Arc::new(JsonDecisionStore::open(&config.storage.path).await?);

    if let Command::ShowQuality { assets } = &command {
        let json = tokio::fs::read_to_string(assets)
            .await
            .with_context(|| format!("Failed to read {}", assets.display()))?;
        let assets: Vec<CategorizedAsset> =
            serde_json::from_str(&json).context("Invalid asset list")?;

        let use_case = MarkShowQualityUseCase::new(store).with_audit_logger(audit);
        let report = use_case.execute(&assets).await?;

        let output = match format {
            OutputFormat::Text => ConsoleFormatter::format_show_quality(&report),
            OutputFormat::Json => ConsoleFormatter::format_json(&report),
        };
        println!("{}", output);
        return Ok(());
    }

    let Some((batch_id, kind)) = command.batch() else {
        bail!("Unsupported command");
    };

    let marketplace = Arc::new(FileMarketplace::new(&config.marketplace.path));
    let use_case = ProcessBatchUseCase::new(marketplace, store, processing).with_audit_logger(audit);
    let input = ProcessBatchInput::new(batch_id, kind);

    // Execute with or without progress reporting
    let report = if show_progress {
        let progress = ProgressReporter::new();
        use_case.execute_with_progress(input, &progress).await?
    } else {
        use_case.execute(input).await?
    };

    let output = match format {
        OutputFormat::Text => ConsoleFormatter::format_batch(&report),
        OutputFormat::Json => ConsoleFormatter::format_json(&report),
    };
    println!("{}", output);

    Ok(())
}
