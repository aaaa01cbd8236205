//! Batch loading: discovery, extraction and normalization of every
//! evaluation document in a directory.

use crate::config::RubricConfig;
use crate::extract::{normalize, FieldExtractor};
use crate::models::{EvaluationRecord, SkippedDocument};
use crate::scanner;
use anyhow::Result;
use std::path::Path;
use tracing::{debug, info, warn};

/// Records recovered from a directory, plus the documents left out.
#[derive(Debug, Clone, Default)]
pub struct Batch {
    /// Records in discovery order.
    pub records: Vec<EvaluationRecord>,
    pub skipped: Vec<SkippedDocument>,
    /// Number of documents discovered.
    pub found: usize,
}

/// Load every evaluation document in `dir`, one at a time.
///
/// Unreadable documents and documents scored on another rubric are
/// skipped; only an unreadable directory is an error.
pub fn load_batch(dir: &Path, extractor: &FieldExtractor, rubric: &RubricConfig) -> Result<Batch> {
    let documents = scanner::find_evaluations(dir)?;
    info!("Found {} evaluation documents in {}", documents.len(), dir.display());

    let mut batch = Batch {
        found: documents.len(),
        ..Default::default()
    };

    for path in documents {
        let raw = match extractor.extract_file(&path) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("{}", e);
                batch.skipped.push(SkippedDocument {
                    source: path,
                    reason: e.to_string(),
                });
                continue;
            }
        };

        let unknown_flags: Vec<&str> = raw
            .flag_rows
            .iter()
            .map(|row| row.id.as_str())
            .filter(|id| id.parse::<u32>().map_or(true, |id| !rubric.has_flag(id)))
            .collect();
        if !unknown_flags.is_empty() {
            warn!(
                "{}: ignoring flags [{}] not in rubric {}",
                path.display(),
                unknown_flags.join(", "),
                rubric.version
            );
        }

        let record = normalize(&raw, rubric, path.clone());

        if let Some(reason) = rubric_mismatch(&record, rubric) {
            warn!("Skipping {}: {}", path.display(), reason);
            batch.skipped.push(SkippedDocument { source: path, reason });
            continue;
        }

        debug!(
            "Loaded {} ({}, total {})",
            record.name, record.recommendation, record.total_score
        );
        batch.records.push(record);
    }

    Ok(batch)
}

/// Explain why a record was scored on another rubric, if it was.
///
/// Scores above the configured maxima are the signal; unknown flag ids
/// alone are not, since normalization already drops them.
fn rubric_mismatch(record: &EvaluationRecord, rubric: &RubricConfig) -> Option<String> {
    if record.total_score > rubric.max_total_score {
        return Some(format!(
            "total score {} exceeds rubric {} maximum of {}",
            record.total_score, rubric.version, rubric.max_total_score
        ));
    }
    if record.critical_score > rubric.max_critical_score {
        return Some(format!(
            "critical score {} exceeds rubric {} maximum of {}",
            record.critical_score, rubric.version, rubric.max_critical_score
        ));
    }
    None
}
