//! Report assembly and rendering.

pub mod generator;
pub mod table;

pub use generator::{generate_json_report, generate_markdown_report};

use crate::analysis::{aggregate, rank, top_n, Batch};
use crate::config::Config;
use crate::models::{Report, ReportMetadata};
use chrono::Utc;
use std::path::Path;

/// Assemble the report for a loaded batch.
pub fn build_report(batch: &Batch, config: &Config, source_dir: &Path) -> Report {
    let summary = aggregate(&batch.records, config);
    let candidates: Vec<_> = rank(&batch.records).into_iter().cloned().collect();
    let top_candidates = top_n(&batch.records, config.report.top_n)
        .into_iter()
        .cloned()
        .collect();

    Report {
        metadata: ReportMetadata {
            position: config.general.position.clone(),
            source_dir: source_dir.to_path_buf(),
            rubric_version: config.rubric.version.clone(),
            generated_at: Utc::now(),
            documents_found: batch.found,
            documents_skipped: batch.skipped.len(),
        },
        summary,
        top_candidates,
        candidates,
        skipped: batch.skipped.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EvaluationRecord;
    use std::path::PathBuf;

    fn record(name: &str, total: f64) -> EvaluationRecord {
        EvaluationRecord {
            name: name.to_string(),
            total_score: total,
            ..EvaluationRecord::unknown(PathBuf::from(name))
        }
    }

    #[test]
    fn test_build_report_ranks_and_cuts() {
        let batch = Batch {
            records: (0..12).map(|i| record(&format!("c{}", i), i as f64 / 2.0)).collect(),
            skipped: vec![],
            found: 12,
        };

        let report = build_report(&batch, &Config::default(), Path::new("evaluations"));

        assert_eq!(report.candidates.len(), 12);
        assert_eq!(report.top_candidates.len(), 10);
        assert_eq!(report.top_candidates[0].name, "c11");
        assert_eq!(report.summary.total, 12);
        assert_eq!(report.metadata.documents_found, 12);
    }

    #[test]
    fn test_build_report_for_empty_batch() {
        let report = build_report(&Batch::default(), &Config::default(), Path::new("e"));
        assert!(report.top_candidates.is_empty());
        assert_eq!(report.summary.total, 0);
    }
}
