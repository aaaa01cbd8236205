//! Conversion of raw extracted strings into typed records.
//!
//! Every missing or malformed value is replaced by its default here, once;
//! nothing downstream sees an absent field.

use super::RawFields;
use crate::config::RubricConfig;
use crate::models::{EvaluationRecord, Recommendation, UNKNOWN};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::debug;

/// Build a typed record from raw fields.
///
/// Flag rows whose id is not part of `rubric` are ignored.
pub fn normalize(raw: &RawFields, rubric: &RubricConfig, source: PathBuf) -> EvaluationRecord {
    let mut flag_scores = BTreeMap::new();
    for row in &raw.flag_rows {
        let Ok(id) = row.id.parse::<u32>() else {
            continue;
        };
        if !rubric.has_flag(id) {
            debug!("Ignoring flag {} not in rubric {}", id, rubric.version);
            continue;
        }
        flag_scores.entry(id).or_insert_with(|| parse_int(&row.score));
    }

    EvaluationRecord {
        name: text_or_unknown(raw.name.as_deref()),
        role: text_or_unknown(raw.role.as_deref()),
        recommendation: Recommendation::from_label(raw.recommendation.as_deref(), &rubric.labels),
        total_score: parse_number(raw.total_score.as_deref()),
        critical_score: parse_number(raw.critical_score.as_deref()),
        percentage: parse_number(raw.percentage.as_deref()),
        flag_scores,
        strengths: clean_list(&raw.strengths),
        improvements: clean_list(&raw.improvements),
        linkedin_url: raw.linkedin_url.clone().unwrap_or_default(),
        source,
    }
}

/// Parse a decimal number: optional leading `-`, digits, at most one `.`.
///
/// Surrounding whitespace and markdown emphasis are ignored. Anything else,
/// including a missing value, reads as 0.
pub fn parse_number(raw: Option<&str>) -> f64 {
    let Some(raw) = raw else {
        return 0.0;
    };
    let value = raw.trim().trim_matches('*').trim();
    let digits = value.strip_prefix('-').unwrap_or(value);

    let well_formed = digits.chars().any(|c| c.is_ascii_digit())
        && digits.chars().all(|c| c.is_ascii_digit() || c == '.')
        && digits.matches('.').count() <= 1;

    if well_formed {
        value.parse().unwrap_or(0.0)
    } else {
        0.0
    }
}

/// Parse a signed integer score; anything non-numeric reads as 0.
pub fn parse_int(raw: &str) -> i32 {
    let value = raw.trim().trim_matches('*').trim();
    let digits = value.strip_prefix('-').unwrap_or(value);

    if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
        value.parse().unwrap_or(0)
    } else {
        0
    }
}

fn text_or_unknown(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => UNKNOWN.to_string(),
    }
}

fn clean_list(items: &[String]) -> Vec<String> {
    items
        .iter()
        .map(|item| item.trim())
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}
