//! Flat tabular export for spreadsheets.
//!
//! One row per candidate, in rank order, with a fixed column layout: the
//! core scalar fields, one column per rubric flag, then the joined lists.

use crate::config::RubricConfig;
use crate::models::{format_score, EvaluationRecord};
use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

/// Separator used when joining list fields into one cell.
const LIST_SEPARATOR: &str = "; ";

/// Column headers for a rubric.
pub fn headers(rubric: &RubricConfig) -> Vec<String> {
    let mut headers: Vec<String> = [
        "Name",
        "Current Role",
        "Recommendation",
        "Total Score",
        "Critical Score",
        "Percentage",
    ]
    .iter()
    .map(|h| h.to_string())
    .collect();

    headers.extend(rubric.flags.iter().map(|f| f.column.clone()));
    headers.extend(
        ["Key Strengths", "Areas for Improvement", "LinkedIn URL"]
            .iter()
            .map(|h| h.to_string()),
    );
    headers
}

/// Cells of one record, aligned with [`headers`].
pub fn row(record: &EvaluationRecord, rubric: &RubricConfig) -> Vec<String> {
    let mut row = vec![
        record.name.clone(),
        record.role.clone(),
        record.recommendation.to_string(),
        format_score(record.total_score),
        format_score(record.critical_score),
        format_score(record.percentage),
    ];

    row.extend(
        rubric
            .flags
            .iter()
            .map(|f| record.flag_score(f.id).to_string()),
    );
    row.push(record.strengths.join(LIST_SEPARATOR));
    row.push(record.improvements.join(LIST_SEPARATOR));
    row.push(record.linkedin_url.clone());
    row
}

/// Write ranked records as CSV.
pub fn write_csv<W: Write>(
    writer: W,
    ranked: &[&EvaluationRecord],
    rubric: &RubricConfig,
) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer.write_record(headers(rubric))?;
    for record in ranked {
        csv_writer.write_record(row(record, rubric))?;
    }
    csv_writer.flush()?;

    Ok(())
}

/// Write ranked records as CSV to a file.
pub fn write_csv_file(path: &Path, ranked: &[&EvaluationRecord], rubric: &RubricConfig) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    write_csv(file, ranked, rubric)
        .with_context(|| format!("Failed to write CSV export to {}", path.display()))
}
