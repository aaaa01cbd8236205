//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation. Options left unset fall back to the
//! configuration file.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// cvsift - LLM-assisted resume screening
///
/// Scores resumes against a fixed rubric with a local model and folds
/// the per-candidate evaluations into a ranked summary.
///
/// Examples:
///   cvsift evaluate --resumes ./PDF-RESUMES
///   cvsift summarize --top-n 5 --json summary.json
///   cvsift run --resumes ./PDF-RESUMES --model llama3.1:8b
///   cvsift init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file
    ///
    /// If not specified, looks for .cvsift.toml in the current directory
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Evaluate resumes with the model and write one document per candidate
    Evaluate(EvaluateArgs),

    /// Aggregate evaluation documents into ranked reports
    Summarize(SummarizeArgs),

    /// Evaluate, then summarize
    Run {
        #[command(flatten)]
        evaluate: EvaluateArgs,
        #[command(flatten)]
        summarize: SummarizeArgs,
    },

    /// Generate a default .cvsift.toml configuration file
    InitConfig,
}

/// Options for the evaluation stage.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct EvaluateArgs {
    /// Directory containing resumes (.pdf or .txt)
    #[arg(long, value_name = "DIR")]
    pub resumes: Option<PathBuf>,

    /// Directory evaluation documents are written to
    #[arg(long, value_name = "DIR")]
    pub evaluations_out: Option<PathBuf>,

    /// Ollama model to use for evaluation
    #[arg(short, long, env = "CVSIFT_MODEL")]
    pub model: Option<String>,

    /// Ollama API endpoint URL
    #[arg(long, env = "OLLAMA_URL")]
    pub ollama_url: Option<String>,

    /// Temperature for LLM responses (0.0 - 1.0)
    #[arg(long)]
    pub temperature: Option<f32>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Evaluate at most this many resumes
    #[arg(long, value_name = "COUNT")]
    pub limit: Option<usize>,

    /// Re-evaluate candidates whose evaluation document already exists
    #[arg(long)]
    pub force: bool,

    /// List the resumes that would be evaluated without calling the model
    #[arg(long)]
    pub dry_run: bool,
}

/// Options for the summary stage.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct SummarizeArgs {
    /// Directory containing *_evaluation.md documents
    #[arg(long, value_name = "DIR")]
    pub evaluations: Option<PathBuf>,

    /// Number of candidates in the ranked table
    #[arg(long, value_name = "N")]
    pub top_n: Option<usize>,

    /// Number of entries in the common strengths/improvements lists
    #[arg(long, value_name = "K")]
    pub top_k: Option<usize>,

    /// Markdown summary output path
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// CSV export output path
    #[arg(long, value_name = "FILE")]
    pub csv: Option<PathBuf>,

    /// Also write the full report as JSON to this path
    #[arg(long, value_name = "FILE")]
    pub json: Option<PathBuf>,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        match &self.command {
            Command::Evaluate(opts) => opts.validate(),
            Command::Summarize(opts) => opts.validate(),
            Command::Run {
                evaluate,
                summarize,
            } => {
                evaluate.validate()?;
                summarize.validate()
            }
            Command::InitConfig => Ok(()),
        }
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

impl EvaluateArgs {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref url) = self.ollama_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("Ollama URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if let Some(temperature) = self.temperature {
            if !(0.0..=1.0).contains(&temperature) {
                return Err("Temperature must be between 0.0 and 1.0".to_string());
            }
        }

        if self.timeout == Some(0) {
            return Err("Timeout must be at least 1 second".to_string());
        }

        if self.limit == Some(0) {
            return Err("Limit must be at least 1".to_string());
        }

        if let Some(ref dir) = self.resumes {
            if !dir.is_dir() {
                return Err(format!("Resume directory does not exist: {}", dir.display()));
            }
        }

        Ok(())
    }
}

impl SummarizeArgs {
    fn validate(&self) -> Result<(), String> {
        if self.top_n == Some(0) {
            return Err("--top-n must be at least 1".to_string());
        }
        if self.top_k == Some(0) {
            return Err("--top-k must be at least 1".to_string());
        }
        Ok(())
    }
}
