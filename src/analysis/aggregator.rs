//! Batch statistics.
//!
//! This module folds a collection of evaluation records into summary
//! statistics: recommendation counts, score averages and the most common
//! strengths and improvements.

use crate::config::Config;
use crate::models::{
    BatchSummary, EvaluationRecord, FrequencyEntry, Recommendation, RecommendationCount,
};
use std::collections::HashMap;

/// Compute the summary of a batch.
///
/// Well defined for an empty batch: every count and average is 0.
pub fn aggregate(records: &[EvaluationRecord], config: &Config) -> BatchSummary {
    let top_k = config.report.top_k;

    BatchSummary {
        total: records.len(),
        by_recommendation: count_by_recommendation(records, &config.rubric.labels),
        average_total_score: mean(records.iter().map(|r| r.total_score)),
        average_critical_score: mean(records.iter().map(|r| r.critical_score)),
        top_strengths: top_frequencies(records.iter().flat_map(|r| &r.strengths), top_k),
        top_improvements: top_frequencies(records.iter().flat_map(|r| &r.improvements), top_k),
    }
}

/// Count records per label, in configured label order, with `Unknown` last.
pub fn count_by_recommendation(
    records: &[EvaluationRecord],
    labels: &[String],
) -> Vec<RecommendationCount> {
    labels
        .iter()
        .map(|label| Recommendation::Label(label.clone()))
        .chain(std::iter::once(Recommendation::Unknown))
        .map(|recommendation| RecommendationCount {
            count: records
                .iter()
                .filter(|r| r.recommendation == recommendation)
                .count(),
            recommendation,
        })
        .collect()
}

/// Arithmetic mean, 0 for no values.
pub fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Count exact occurrences and keep the `k` most frequent.
///
/// Ties keep the order in which values were first seen.
pub fn top_frequencies<'a>(
    values: impl Iterator<Item = &'a String>,
    k: usize,
) -> Vec<FrequencyEntry> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut entries: Vec<FrequencyEntry> = Vec::new();

    for value in values {
        match index.get(value.as_str()) {
            Some(&i) => entries[i].count += 1,
            None => {
                index.insert(value.as_str(), entries.len());
                entries.push(FrequencyEntry {
                    value: value.clone(),
                    count: 1,
                });
            }
        }
    }

    // Stable sort keeps first-seen order among equal counts.
    entries.sort_by_key(|e| std::cmp::Reverse(e.count));
    entries.truncate(k);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn create_test_record(
        name: &str,
        recommendation: Option<&str>,
        total: f64,
        critical: f64,
        strengths: &[&str],
    ) -> EvaluationRecord {
        EvaluationRecord {
            name: name.to_string(),
            recommendation: recommendation
                .map(|l| Recommendation::Label(l.to_string()))
                .unwrap_or(Recommendation::Unknown),
            total_score: total,
            critical_score: critical,
            strengths: strengths.iter().map(|s| s.to_string()).collect(),
            ..EvaluationRecord::unknown(PathBuf::from(format!("{}.md", name)))
        }
    }

    fn count_of(summary: &BatchSummary, label: Option<&str>) -> usize {
        let wanted = match label {
            Some(label) => Recommendation::Label(label.to_string()),
            None => Recommendation::Unknown,
        };
        summary
            .by_recommendation
            .iter()
            .find(|c| c.recommendation == wanted)
            .map(|c| c.count)
            .unwrap()
    }

    #[test]
    fn test_aggregate_counts_and_averages() {
        let records = vec![
            create_test_record("a", Some("Strong Candidate"), 9.0, 6.0, &[]),
            create_test_record("b", Some("Consider"), 6.0, 4.0, &[]),
            create_test_record("c", Some("Consider"), 7.0, 5.0, &[]),
            create_test_record("d", None, 2.0, 1.0, &[]),
        ];

        let summary = aggregate(&records, &Config::default());

        assert_eq!(summary.total, 4);
        assert_eq!(count_of(&summary, Some("Strong Candidate")), 1);
        assert_eq!(count_of(&summary, Some("Consider")), 2);
        assert_eq!(count_of(&summary, Some("Reject")), 0);
        assert_eq!(count_of(&summary, None), 1);
        assert_eq!(summary.average_total_score, 6.0);
        assert_eq!(summary.average_critical_score, 4.0);
    }

    #[test]
    fn test_unknown_is_listed_last() {
        let summary = aggregate(&[], &Config::default());
        let order: Vec<String> = summary
            .by_recommendation
            .iter()
            .map(|c| c.recommendation.to_string())
            .collect();
        assert_eq!(order, vec!["Strong Candidate", "Consider", "Reject", "Unknown"]);
    }

    #[test]
    fn test_empty_batch_is_all_zero() {
        let summary = aggregate(&[], &Config::default());

        assert_eq!(summary.total, 0);
        assert_eq!(summary.average_total_score, 0.0);
        assert_eq!(summary.average_critical_score, 0.0);
        assert!(summary.top_strengths.is_empty());
        assert!(summary.by_recommendation.iter().all(|c| c.count == 0));
    }

    #[test]
    fn test_frequency_counts_are_exact() {
        let records = vec![
            create_test_record("a", None, 0.0, 0.0, &["Strong coder", "Team player"]),
            create_test_record("b", None, 0.0, 0.0, &["Strong coder"]),
            create_test_record("c", None, 0.0, 0.0, &["strong coder"]),
        ];

        let mut config = Config::default();
        config.report.top_k = 1;
        let summary = aggregate(&records, &config);

        assert_eq!(
            summary.top_strengths,
            vec![FrequencyEntry {
                value: "Strong coder".to_string(),
                count: 2
            }]
        );
    }

    #[test]
    fn test_frequency_ties_keep_first_seen_order() {
        let values: Vec<String> = ["Python", "Leadership", "Rust", "Leadership", "Python", "Rust"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let top = top_frequencies(values.iter(), 5);
        let order: Vec<&str> = top.iter().map(|e| e.value.as_str()).collect();

        assert_eq!(order, vec!["Python", "Leadership", "Rust"]);
        assert!(top.iter().all(|e| e.count == 2));
    }

    #[test]
    fn test_mean_of_nothing() {
        assert_eq!(mean(std::iter::empty()), 0.0);
        assert_eq!(mean([1.0, 2.0].into_iter()), 1.5);
    }
}
