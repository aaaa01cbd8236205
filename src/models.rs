//! Data models for candidate screening.
//!
//! This module contains the core data structures shared by the extractor,
//! the aggregation pipeline and the report renderers.

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Placeholder used for every text field that could not be recovered.
pub const UNKNOWN: &str = "Unknown";

/// Outcome label assigned to a candidate.
///
/// `Label` only ever holds one of the configured labels; anything else
/// the model wrote collapses into `Unknown`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Recommendation {
    Label(String),
    Unknown,
}

impl Recommendation {
    /// Match a raw label against the recognized set (exact, after trimming).
    pub fn from_label(raw: Option<&str>, recognized: &[String]) -> Self {
        match raw.map(str::trim) {
            Some(label) if recognized.iter().any(|l| l == label) => {
                Recommendation::Label(label.to_string())
            }
            _ => Recommendation::Unknown,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Recommendation::Label(label) => label,
            Recommendation::Unknown => UNKNOWN,
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Recommendation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One candidate's evaluation, recovered from an evaluation document.
///
/// Every field always holds a value; anything missing from the source
/// has already been replaced by its default.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationRecord {
    /// Candidate identifier.
    pub name: String,
    /// Current role, best effort.
    pub role: String,
    pub recommendation: Recommendation,
    pub total_score: f64,
    pub critical_score: f64,
    /// Share of positive points, 0-100.
    pub percentage: f64,
    /// Score per rubric flag id. Flags absent from the document read as 0.
    pub flag_scores: BTreeMap<u32, i32>,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    /// First LinkedIn profile URL in the document, or empty.
    pub linkedin_url: String,
    /// Document the record was extracted from.
    pub source: PathBuf,
}

impl EvaluationRecord {
    /// The record produced for a document with no recognizable content.
    pub fn unknown(source: PathBuf) -> Self {
        Self {
            name: UNKNOWN.to_string(),
            role: UNKNOWN.to_string(),
            recommendation: Recommendation::Unknown,
            total_score: 0.0,
            critical_score: 0.0,
            percentage: 0.0,
            flag_scores: BTreeMap::new(),
            strengths: Vec::new(),
            improvements: Vec::new(),
            linkedin_url: String::new(),
            source,
        }
    }

    /// Score for a flag, 0 when the document did not report it.
    pub fn flag_score(&self, id: u32) -> i32 {
        self.flag_scores.get(&id).copied().unwrap_or(0)
    }
}

/// A distinct strength or improvement and how many candidates share it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrequencyEntry {
    pub value: String,
    pub count: usize,
}

/// Number of candidates that received a recommendation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecommendationCount {
    pub recommendation: Recommendation,
    pub count: usize,
}

/// Batch-level statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchSummary {
    /// Number of candidates in the batch.
    pub total: usize,
    /// Counts per configured label, followed by `Unknown`.
    pub by_recommendation: Vec<RecommendationCount>,
    pub average_total_score: f64,
    pub average_critical_score: f64,
    pub top_strengths: Vec<FrequencyEntry>,
    pub top_improvements: Vec<FrequencyEntry>,
}

impl BatchSummary {
    /// Share of the batch holding a recommendation, in percent.
    pub fn share_of(&self, count: usize) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            count as f64 / self.total as f64 * 100.0
        }
    }
}

/// A document left out of the summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedDocument {
    pub source: PathBuf,
    pub reason: String,
}

/// Metadata about a generated summary.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    /// Position the batch was screened for.
    pub position: String,
    /// Directory the evaluation documents were read from.
    pub source_dir: PathBuf,
    /// Rubric version the batch was scored against.
    pub rubric_version: String,
    pub generated_at: DateTime<Utc>,
    /// Documents found in the source directory.
    pub documents_found: usize,
    /// Documents excluded from the summary.
    pub documents_skipped: usize,
}

/// Everything the renderers need for one batch.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    pub summary: BatchSummary,
    /// Top-N candidates in rank order.
    pub top_candidates: Vec<EvaluationRecord>,
    /// All candidates in rank order.
    pub candidates: Vec<EvaluationRecord>,
    pub skipped: Vec<SkippedDocument>,
}

/// Render a score without a trailing `.0` when it is integral.
pub fn format_score(score: f64) -> String {
    if score.fract() == 0.0 && score.is_finite() {
        format!("{}", score as i64)
    } else {
        let rendered = format!("{:.2}", score);
        rendered
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    }
}
