//! Candidate ranking.

use crate::models::EvaluationRecord;
use std::cmp::Ordering;

/// Order records by total score, then critical score, both descending.
///
/// The sort is stable: full ties keep discovery order.
pub fn rank(records: &[EvaluationRecord]) -> Vec<&EvaluationRecord> {
    let mut ranked: Vec<&EvaluationRecord> = records.iter().collect();
    ranked.sort_by(|a, b| compare(a, b));
    ranked
}

/// The first `n` records in rank order, or all of them when there are fewer.
pub fn top_n(records: &[EvaluationRecord], n: usize) -> Vec<&EvaluationRecord> {
    let mut ranked = rank(records);
    ranked.truncate(n);
    ranked
}

fn compare(a: &EvaluationRecord, b: &EvaluationRecord) -> Ordering {
    b.total_score
        .total_cmp(&a.total_score)
        .then_with(|| b.critical_score.total_cmp(&a.critical_score))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn record(name: &str, total: f64, critical: f64) -> EvaluationRecord {
        EvaluationRecord {
            name: name.to_string(),
            total_score: total,
            critical_score: critical,
            ..EvaluationRecord::unknown(PathBuf::from(name))
        }
    }

    fn names(ranked: &[&EvaluationRecord]) -> Vec<String> {
        ranked.iter().map(|r| r.name.clone()).collect()
    }

    #[test]
    fn test_rank_is_stable_on_full_ties() {
        let records = vec![record("A", 8.0, 5.0), record("B", 8.0, 5.0), record("C", 9.0, 1.0)];
        assert_eq!(names(&rank(&records)), vec!["C", "A", "B"]);
    }

    #[test]
    fn test_critical_score_breaks_ties() {
        let records = vec![record("A", 7.0, 3.0), record("B", 7.0, 6.0), record("C", 6.0, 6.0)];
        assert_eq!(names(&rank(&records)), vec!["B", "A", "C"]);
    }

    #[test]
    fn test_top_n_without_padding() {
        let records = vec![record("A", 1.0, 0.0), record("B", 3.0, 0.0), record("C", 2.0, 0.0)];
        let top = top_n(&records, 10);
        assert_eq!(names(&top), vec!["B", "C", "A"]);
    }

    #[test]
    fn test_top_n_truncates() {
        let records = vec![record("A", 1.0, 0.0), record("B", 3.0, 0.0), record("C", 2.0, 0.0)];
        assert_eq!(names(&top_n(&records, 2)), vec!["B", "C"]);
        assert!(top_n(&[], 10).is_empty());
    }

    #[test]
    fn test_rank_does_not_touch_input() {
        let records = vec![record("A", 1.0, 0.0), record("B", 3.0, 0.0)];
        let _ = rank(&records);
        assert_eq!(records[0].name, "A");
    }
}
