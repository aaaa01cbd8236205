//! cvsift - LLM-assisted resume screening
//!
//! A CLI tool that scores resumes against a rubric with a local Ollama
//! model, then extracts the per-candidate evaluations into a ranked
//! Markdown summary and a CSV export.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (missing directory, bad config, unwritable output, etc.)

mod analysis;
mod cli;
mod config;
mod evaluator;
mod extract;
mod models;
mod report;
mod scanner;

use anyhow::{anyhow, Context, Result};
use cli::{Args, Command};
use config::Config;
use evaluator::{EvaluateOptions, OllamaClient};
use extract::FieldExtractor;
use std::path::Path;
use std::time::Instant;
use tracing::level_filters::LevelFilter;
use tracing::{debug, error, info, warn, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle init-config early (no logging needed)
    if matches!(args.command, Command::InitConfig) {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("cvsift v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run(args).await {
        error!("Run failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle init-config: generate a default .cvsift.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(config::CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            config::CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", config::CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", config::CONFIG_FILE_NAME);
    println!("   Edit it to customize the position, model, rubric and report outputs.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// `RUST_LOG` takes precedence over `--verbose` / `--quiet` when set.
fn init_logging(args: &Args) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(log_filter(args.log_level(), rust_log.as_deref()))
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Filter from `RUST_LOG` directives, falling back to `level`.
fn log_filter(level: Level, directives: Option<&str>) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .parse_lossy(directives.unwrap_or_default())
}

/// Dispatch the selected subcommand.
async fn run(args: Args) -> Result<()> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    match &args.command {
        Command::Evaluate(opts) => run_evaluate(&config, opts, args.quiet).await,
        Command::Summarize(_) => run_summarize(&config, args.quiet),
        Command::Run { evaluate, .. } => {
            run_evaluate(&config, evaluate, args.quiet).await?;
            if evaluate.dry_run {
                return Ok(());
            }
            run_summarize(&config, args.quiet)
        }
        Command::InitConfig => Ok(()),
    }
}

/// Evaluate resumes into evaluation documents.
async fn run_evaluate(config: &Config, opts: &cli::EvaluateArgs, quiet: bool) -> Result<()> {
    let start_time = Instant::now();
    let options = EvaluateOptions {
        limit: opts.limit,
        force: opts.force,
        show_progress: !quiet,
    };

    if opts.dry_run {
        return handle_dry_run(config, &options);
    }

    println!("🤖 Evaluating resumes...");
    println!("   Resumes: {}", config.general.resumes_dir);
    println!("   Model: {}", config.model.name);
    println!("   Ollama: {}", config.model.ollama_url);
    println!("   Timeout: {}s", config.model.timeout_seconds);

    let client = OllamaClient::new(config.model.clone()).context("Failed to build HTTP client")?;
    let outcome = evaluator::evaluate_resumes(&client, config, &options).await?;

    println!("\n📋 Evaluation Summary:");
    println!("   Resumes found: {}", outcome.found);
    println!("   Evaluated: {}", outcome.evaluated);
    println!("   Already evaluated: {}", outcome.skipped_existing);
    if outcome.failed > 0 {
        println!("   ⚠️  Failed: {}", outcome.failed);
    }
    println!("   Duration: {:.1}s", start_time.elapsed().as_secs_f64());
    println!(
        "\n✅ Evaluations saved to: {}",
        config.general.evaluations_dir
    );

    Ok(())
}

/// Handle --dry-run: list what would be evaluated, exit.
fn handle_dry_run(config: &Config, options: &EvaluateOptions) -> Result<()> {
    println!("\n🔍 Dry run: scanning resumes (no LLM call)...\n");

    let (pending, found, skipped) = evaluator::pending_resumes(
        Path::new(&config.general.resumes_dir),
        Path::new(&config.general.evaluations_dir),
        options,
    )?;

    if pending.is_empty() {
        println!("   Nothing to evaluate.");
    } else {
        println!("   {} resumes would be evaluated:\n", pending.len());
        for resume in &pending {
            println!("     📄 {} ({})", resume.candidate, resume.path.display());
        }
    }
    println!("\n   Found: {} | Already evaluated: {}", found, skipped);

    println!("\n✅ Dry run complete. No LLM calls were made.");
    Ok(())
}

/// Summarize evaluation documents into the report outputs.
fn run_summarize(config: &Config, quiet: bool) -> Result<()> {
    let source_dir = Path::new(&config.general.evaluations_dir);

    if !quiet {
        println!("\n📝 Summarizing evaluations in {}...", source_dir.display());
    }

    let extractor =
        FieldExtractor::new().map_err(|e| anyhow!("Failed to compile extraction rules: {}", e))?;
    let batch = analysis::load_batch(source_dir, &extractor, &config.rubric)?;

    if batch.records.is_empty() {
        warn!("No evaluation documents found in {}", source_dir.display());
    }

    let report = report::build_report(&batch, config, source_dir);

    let markdown = report::generate_markdown_report(&report, config);
    let markdown_path = Path::new(&config.report.markdown_output);
    std::fs::write(markdown_path, &markdown)
        .with_context(|| format!("Failed to write report to {}", markdown_path.display()))?;

    let ranked: Vec<_> = report.candidates.iter().collect();
    let csv_path = Path::new(&config.report.csv_output);
    report::table::write_csv_file(csv_path, &ranked, &config.rubric)?;

    if let Some(ref json_output) = config.report.json_output {
        let json = report::generate_json_report(&report)?;
        std::fs::write(json_output, json)
            .with_context(|| format!("Failed to write JSON report to {}", json_output))?;
    }

    println!("\n📊 Candidate Summary:");
    println!("   Candidates: {}", report.summary.total);
    for entry in &report.summary.by_recommendation {
        println!("   - {}: {}", entry.recommendation, entry.count);
    }
    if !report.skipped.is_empty() {
        println!("   ⚠️  Skipped documents: {}", report.skipped.len());
    }
    if let Some(top) = report.top_candidates.first() {
        println!(
            "   🏆 Top candidate: {} ({}/{})",
            top.name,
            models::format_score(top.total_score),
            models::format_score(config.rubric.max_total_score)
        );
    }
    println!("\n✅ Summary saved to: {}", markdown_path.display());
    println!("   CSV export: {}", csv_path.display());
    if let Some(ref json_output) = config.report.json_output {
        println!("   JSON report: {}", json_output);
    }

    Ok(())
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", config::CONFIG_FILE_NAME);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_filter_defaults_to_cli_level() {
        assert_eq!(log_filter(Level::DEBUG, None).to_string().to_lowercase(), "debug");
        assert_eq!(log_filter(Level::ERROR, Some("")).to_string().to_lowercase(), "error");
    }

    #[test]
    fn test_log_filter_honours_rust_log() {
        let filter = log_filter(Level::INFO, Some("cvsift=trace")).to_string().to_lowercase();
        assert!(filter.contains("cvsift=trace"));
    }
}
