//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.cvsift.toml` files. The loaded value is passed explicitly to the
//! evaluator, aggregator, ranker and renderers.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".cvsift.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Model settings.
    #[serde(default)]
    pub model: ModelConfig,

    /// Scoring rubric the evaluation documents follow.
    #[serde(default)]
    pub rubric: RubricConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Position the candidates are screened for (used in prompts and titles).
    #[serde(default = "default_position")]
    pub position: String,

    /// Directory holding the resumes to evaluate.
    #[serde(default = "default_resumes_dir")]
    pub resumes_dir: String,

    /// Directory holding the per-candidate evaluation documents.
    #[serde(default = "default_evaluations_dir")]
    pub evaluations_dir: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            position: default_position(),
            resumes_dir: default_resumes_dir(),
            evaluations_dir: default_evaluations_dir(),
        }
    }
}

fn default_position() -> String {
    "Applied AI Researcher".to_string()
}

fn default_resumes_dir() -> String {
    "resumes".to_string()
}

fn default_evaluations_dir() -> String {
    "evaluations".to_string()
}

/// LLM model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model name.
    #[serde(default = "default_model")]
    pub name: String,

    /// Ollama API URL.
    #[serde(default = "default_ollama_url")]
    pub ollama_url: String,

    /// Temperature for generation.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Number of attempts per resume before giving up.
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Pause between consecutive model calls, in milliseconds.
    #[serde(default = "default_request_delay")]
    pub request_delay_ms: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: default_model(),
            ollama_url: default_ollama_url(),
            temperature: default_temperature(),
            timeout_seconds: default_timeout(),
            retries: default_retries(),
            request_delay_ms: default_request_delay(),
        }
    }
}

fn default_model() -> String {
    "llama3.1:8b".to_string()
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_temperature() -> f32 {
    0.2
}

fn default_timeout() -> u64 {
    300
}

fn default_retries() -> u32 {
    3
}

fn default_request_delay() -> u64 {
    1000
}

/// One scored criterion of the rubric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagConfig {
    /// Identifier as it appears in the first column of the flag table.
    pub id: u32,
    /// Category name shown to the model.
    pub name: String,
    /// Column header used in the tabular export.
    pub column: String,
    /// Whether the flag contributes to the critical score.
    #[serde(default)]
    pub critical: bool,
    /// Scoring guidance included in the evaluation prompt.
    #[serde(default)]
    pub guidance: String,
}

/// The rubric a batch is evaluated against.
///
/// Exactly one rubric applies per batch; documents scored on another scale
/// are excluded from the summary rather than averaged in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RubricConfig {
    /// Free-form version tag, shown in reports.
    #[serde(default = "default_rubric_version")]
    pub version: String,

    /// Recognized recommendation labels, in display order, best first.
    #[serde(default = "default_labels")]
    pub labels: Vec<String>,

    /// Upper bound of the total score.
    #[serde(default = "default_max_total")]
    pub max_total_score: f64,

    /// Upper bound of the critical score.
    #[serde(default = "default_max_critical")]
    pub max_critical_score: f64,

    /// Scored flags, in table order.
    #[serde(default = "default_flags")]
    pub flags: Vec<FlagConfig>,
}

impl Default for RubricConfig {
    fn default() -> Self {
        Self {
            version: default_rubric_version(),
            labels: default_labels(),
            max_total_score: default_max_total(),
            max_critical_score: default_max_critical(),
            flags: default_flags(),
        }
    }
}

impl RubricConfig {
    /// Returns true when `id` is one of the configured flags.
    pub fn has_flag(&self, id: u32) -> bool {
        self.flags.iter().any(|f| f.id == id)
    }
}

fn default_rubric_version() -> String {
    "flags-v4".to_string()
}

fn default_labels() -> Vec<String> {
    vec!["Strong Candidate", "Consider", "Reject"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_max_total() -> f64 {
    10.0
}

fn default_max_critical() -> f64 {
    6.0
}

fn default_flags() -> Vec<FlagConfig> {
    let flag = |id: u32, name: &str, column: &str, critical: bool, guidance: &str| FlagConfig {
        id,
        name: name.to_string(),
        column: column.to_string(),
        critical,
        guidance: guidance.to_string(),
    };

    vec![
        flag(
            1,
            "AI/ML Experience & Engineering",
            "AI/ML Score",
            true,
            "0: under 2 years or weak engineering; 1: 2+ years with some results; 2: 4+ years, senior title, promotion or awards",
        ),
        flag(
            2,
            "LLM/NLP Specialization & Engineering",
            "LLM/NLP Score",
            true,
            "0: no LLM/NLP experience; 1: 1+ year with some product impact; 2: 2+ years or significant product impact",
        ),
        flag(
            3,
            "Production-Grade RAG Implementation",
            "RAG Score",
            true,
            "0: no RAG experience; 1: some RAG experience, unclear impact; 2: built a production RAG system in a successful product team",
        ),
        flag(
            4,
            "Startup Mentality & Hands-on Ownership",
            "Startup Score",
            false,
            "0: no startup experience; 1: some startup or agile ownership; 2: 2+ years startup, founding role or strong ownership",
        ),
        flag(
            5,
            "STEM",
            "STEM Score",
            false,
            "0: no STEM degree; 1: STEM degree from an average university; 2: STEM degree from a top-tier university",
        ),
        flag(
            6,
            "Red Flags - negative points",
            "Red Flags",
            true,
            "-2..0: concerns that would prevent contribution (job-hopping, gaps, missing skills)",
        ),
    ]
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Number of candidates in the ranked table and detail sections.
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Number of entries in the strength/improvement frequency tables.
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Markdown summary output path.
    #[serde(default = "default_markdown_output")]
    pub markdown_output: String,

    /// CSV export output path.
    #[serde(default = "default_csv_output")]
    pub csv_output: String,

    /// Optional JSON export output path.
    #[serde(default)]
    pub json_output: Option<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
            top_k: default_top_k(),
            markdown_output: default_markdown_output(),
            csv_output: default_csv_output(),
            json_output: None,
        }
    }
}

fn default_top_n() -> usize {
    10
}

fn default_top_k() -> usize {
    5
}

fn default_markdown_output() -> String {
    "candidate_assessment_summary.md".to_string()
}

fn default_csv_output() -> String {
    "candidate_summary.csv".to_string()
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE_NAME);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// Only values the user passed explicitly override the file.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        use crate::cli::Command;

        match &args.command {
            Command::Evaluate(opts) => self.merge_evaluate(opts),
            Command::Summarize(opts) => self.merge_summarize(opts),
            Command::Run { evaluate, summarize } => {
                self.merge_evaluate(evaluate);
                self.merge_summarize(summarize);
            }
            Command::InitConfig => {}
        }
    }

    fn merge_evaluate(&mut self, opts: &crate::cli::EvaluateArgs) {
        if let Some(ref dir) = opts.resumes {
            self.general.resumes_dir = dir.display().to_string();
        }
        if let Some(ref dir) = opts.evaluations_out {
            self.general.evaluations_dir = dir.display().to_string();
        }
        if let Some(ref model) = opts.model {
            self.model.name = model.clone();
        }
        if let Some(ref url) = opts.ollama_url {
            self.model.ollama_url = url.clone();
        }
        if let Some(temperature) = opts.temperature {
            self.model.temperature = temperature;
        }
        if let Some(timeout) = opts.timeout {
            self.model.timeout_seconds = timeout;
        }
    }

    fn merge_summarize(&mut self, opts: &crate::cli::SummarizeArgs) {
        if let Some(ref dir) = opts.evaluations {
            self.general.evaluations_dir = dir.display().to_string();
        }
        if let Some(top_n) = opts.top_n {
            self.report.top_n = top_n;
        }
        if let Some(top_k) = opts.top_k {
            self.report.top_k = top_k;
        }
        if let Some(ref path) = opts.output {
            self.report.markdown_output = path.display().to_string();
        }
        if let Some(ref path) = opts.csv {
            self.report.csv_output = path.display().to_string();
        }
        if let Some(ref path) = opts.json {
            self.report.json_output = Some(path.display().to_string());
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
