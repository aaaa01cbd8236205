//! Field extraction from evaluation documents.
//!
//! Evaluation documents are markdown written by the model. Single-value
//! fields are located through a declarative pattern table (first pattern
//! with a match wins, first match in document order within a pattern);
//! flag rows and bullet lists are collected with find-all scans.
//! Extraction never fails: a field without a match is simply `None`.

pub mod normalize;

pub use normalize::normalize;

use regex::Regex;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Failure to obtain the text of a single document.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Single-value fields recovered from a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Role,
    Recommendation,
    TotalScore,
    CriticalScore,
    Percentage,
    LinkedinUrl,
}

/// Pattern table: field, capture group holding the value, patterns in priority order.
///
/// `Name` and `Role` share the heading patterns and read different groups.
const SINGLE_FIELD_PATTERNS: &[(Field, usize, &[&str])] = &[
    (Field::Name, 1, &[r"(?m)^#[ \t]+(.+?)[ \t]+-[ \t]+(.+?)[ \t]*$"]),
    (Field::Role, 2, &[r"(?m)^#[ \t]+(.+?)[ \t]+-[ \t]+(.+?)[ \t]*$"]),
    (
        Field::Recommendation,
        1,
        &[
            r"(?m)^##[ \t]*(?:🏆[ \t]*)?RECOMMENDATION:[ \t]*(.+?)[ \t]*$",
            r"(?mi)^[ \t*-]*recommendation:\**[ \t]*(.+?)[ \t]*$",
        ],
    ),
    (
        Field::TotalScore,
        1,
        &[
            r"Sum of all positive flags:[^\n=]*=[ \t]*\*\*([^*\n]*)\*\*",
            r"CV Scoring:[ \t]*([-\d.]+)[ \t]*/",
        ],
    ),
    (
        Field::CriticalScore,
        1,
        &[r"Sum of positive critical flags:[^\n=]*=[ \t]*\*\*([^*\n]*)\*\*"],
    ),
    (
        Field::Percentage,
        1,
        &[r"Green Flag Percentage:(?:\*\*)?[ \t]*([^%\n]*?)[ \t]*%"],
    ),
    (
        Field::LinkedinUrl,
        0,
        &[r"https?://(?:www\.)?linkedin\.com/[^\s)\]|>]+"],
    ),
];

/// One row of the flag table:
/// `| id | category | flag text | criticality | score | confirmation |`.
const FLAG_ROW_PATTERN: &str = r"(?m)^\|[ \t]*(\d+)[ \t]*\|[ \t]*(?:\*\*)?([^|\n]*?)(?:\*\*)?[ \t]*\|[^|\n]*\|[ \t]*(Critical)?[ \t]*\|[ \t]*([^|\n]*?)[ \t]*\|[ \t]*([^|\n]*?)[ \t]*\|";

/// Bullet lines marked with the strength glyph.
const STRENGTH_PATTERN: &str = r"(?m)^[ \t]*[-*][ \t]+💪[ \t]*(.+?)[ \t]*$";

/// Bullet lines marked with one of the improvement glyphs.
const IMPROVEMENT_PATTERN: &str = r"(?m)^[ \t]*[-*][ \t]+(?:⚠\x{FE0F}?|🔍)[ \t]*(.+?)[ \t]*$";

/// Raw, string-typed values of a flag table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFlagRow {
    pub id: String,
    pub category: String,
    pub critical: bool,
    pub score: String,
    pub confirmation: String,
}

/// Everything found in one document, before typing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFields {
    pub name: Option<String>,
    pub role: Option<String>,
    pub recommendation: Option<String>,
    pub total_score: Option<String>,
    pub critical_score: Option<String>,
    pub percentage: Option<String>,
    pub linkedin_url: Option<String>,
    pub flag_rows: Vec<RawFlagRow>,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
}

struct SingleFieldRule {
    field: Field,
    group: usize,
    patterns: Vec<Regex>,
}

/// Compiled extraction rules, built once per batch.
pub struct FieldExtractor {
    single: Vec<SingleFieldRule>,
    flag_row: Regex,
    strength: Regex,
    improvement: Regex,
}

impl FieldExtractor {
    /// Compile the extraction rules.
    pub fn new() -> Result<Self, regex::Error> {
        let single = SINGLE_FIELD_PATTERNS
            .iter()
            .map(|(field, group, patterns)| {
                Ok(SingleFieldRule {
                    field: *field,
                    group: *group,
                    patterns: patterns
                        .iter()
                        .map(|p| Regex::new(p))
                        .collect::<Result<_, _>>()?,
                })
            })
            .collect::<Result<Vec<_>, regex::Error>>()?;

        Ok(Self {
            single,
            flag_row: Regex::new(FLAG_ROW_PATTERN)?,
            strength: Regex::new(STRENGTH_PATTERN)?,
            improvement: Regex::new(IMPROVEMENT_PATTERN)?,
        })
    }

    /// Extract all fields from a document's text.
    pub fn extract(&self, text: &str) -> RawFields {
        RawFields {
            name: self.find_first(Field::Name, text),
            role: self.find_first(Field::Role, text),
            recommendation: self.find_first(Field::Recommendation, text),
            total_score: self.find_first(Field::TotalScore, text),
            critical_score: self.find_first(Field::CriticalScore, text),
            percentage: self.find_first(Field::Percentage, text),
            linkedin_url: self.find_first(Field::LinkedinUrl, text),
            flag_rows: self.find_flag_rows(text),
            strengths: find_all(&self.strength, text),
            improvements: find_all(&self.improvement, text),
        }
    }

    /// Read a document from disk and extract it.
    pub fn extract_file(&self, path: &Path) -> Result<RawFields, DocumentError> {
        let text = std::fs::read_to_string(path).map_err(|source| DocumentError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(self.extract(&text))
    }

    /// Single-match strategy.
    fn find_first(&self, field: Field, text: &str) -> Option<String> {
        let rule = self.single.iter().find(|r| r.field == field)?;

        let found = rule.patterns.iter().find_map(|pattern| {
            pattern
                .captures(text)
                .and_then(|caps| caps.get(rule.group))
                .map(|m| m.as_str().trim().to_string())
        });

        if found.is_none() {
            debug!("No match for field {:?}", field);
        }
        found
    }

    /// Multi-match strategy over the flag table.
    fn find_flag_rows(&self, text: &str) -> Vec<RawFlagRow> {
        self.flag_row
            .captures_iter(text)
            .map(|caps| {
                let group = |i: usize| {
                    caps.get(i)
                        .map(|m| m.as_str().trim().to_string())
                        .unwrap_or_default()
                };
                RawFlagRow {
                    id: group(1),
                    category: group(2),
                    critical: caps.get(3).is_some(),
                    score: group(4),
                    confirmation: group(5),
                }
            })
            .collect()
    }
}

/// Multi-match strategy over marker-prefixed lines.
fn find_all(pattern: &Regex, text: &str) -> Vec<String> {
    pattern
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
