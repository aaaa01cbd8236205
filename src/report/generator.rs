//! Markdown report generation.
//!
//! This module renders the candidate summary: overall statistics, the
//! ranked table, per-candidate detail for the top candidates and the
//! patterns shared across the batch, always in that order.

use crate::config::Config;
use crate::models::{format_score, BatchSummary, EvaluationRecord, FrequencyEntry, Report};
use anyhow::Result;

/// Stock sentence the model writes when it has no improvement to list.
const NO_IMPROVEMENTS_SENTENCE: &str = "No significant areas for improvement";

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report, config: &Config) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "# Candidate Assessment: {}\n\n",
        report.metadata.position
    ));

    output.push_str(&generate_statistics_section(report, config));
    output.push_str(&generate_ranking_section(&report.top_candidates, config));
    output.push_str(&generate_details_section(&report.top_candidates, config));
    output.push_str(&generate_patterns_section(&report.summary));
    output.push_str(&generate_footer(report));

    output
}

/// Generate the overall statistics section.
fn generate_statistics_section(report: &Report, config: &Config) -> String {
    let summary = &report.summary;
    let rubric = &config.rubric;
    let mut section = String::new();

    section.push_str("## 📊 Overall Statistics\n\n");
    section.push_str(&format!(
        "- **Total Candidates Evaluated:** {}\n",
        summary.total
    ));

    for entry in &summary.by_recommendation {
        section.push_str(&format!(
            "- **{}:** {} ({:.1}%)\n",
            entry.recommendation,
            entry.count,
            summary.share_of(entry.count)
        ));
    }

    section.push_str(&format!(
        "- **Average Total Score:** {:.2}/{}\n",
        summary.average_total_score,
        format_score(rubric.max_total_score)
    ));
    section.push_str(&format!(
        "- **Average Critical Score:** {:.2}/{}\n",
        summary.average_critical_score,
        format_score(rubric.max_critical_score)
    ));

    if !report.skipped.is_empty() {
        section.push_str(&format!(
            "- **Documents Skipped:** {}\n",
            report.skipped.len()
        ));
        for skipped in &report.skipped {
            section.push_str(&format!(
                "  - `{}`: {}\n",
                skipped.source.display(),
                skipped.reason
            ));
        }
    }
    section.push('\n');

    section
}

/// Generate the ranked table of top candidates.
fn generate_ranking_section(top: &[EvaluationRecord], config: &Config) -> String {
    let rubric = &config.rubric;
    let mut section = String::new();

    section.push_str(&format!("## 🏆 Top {} Candidates\n\n", config.report.top_n));

    if top.is_empty() {
        section.push_str("No candidates were evaluated.\n\n");
        return section;
    }

    section.push_str(
        "| **Rank** | **Candidate** | **Current Role** | **Total Score** | **Critical Score** | **Recommendation** |\n",
    );
    section.push_str("|:---:|:---|:---|:---:|:---:|:---|\n");

    for (i, candidate) in top.iter().enumerate() {
        section.push_str(&format!(
            "| {} | {} | {} | {}/{} | {}/{} | {} |\n",
            i + 1,
            escape_cell(&candidate.name),
            escape_cell(&candidate.role),
            format_score(candidate.total_score),
            format_score(rubric.max_total_score),
            format_score(candidate.critical_score),
            format_score(rubric.max_critical_score),
            candidate.recommendation
        ));
    }
    section.push('\n');

    section
}

/// Generate detail blocks for the top candidates.
fn generate_details_section(top: &[EvaluationRecord], config: &Config) -> String {
    let mut section = String::new();

    section.push_str("## 🔍 Detailed Analysis of Top Candidates\n\n");

    if top.is_empty() {
        section.push_str("No candidates to analyze.\n\n");
        return section;
    }

    for (i, candidate) in top.iter().enumerate() {
        section.push_str(&generate_candidate_block(i + 1, candidate, config));
    }

    section
}

/// Generate a single candidate block.
fn generate_candidate_block(rank: usize, candidate: &EvaluationRecord, config: &Config) -> String {
    let rubric = &config.rubric;
    let mut block = String::new();

    block.push_str(&format!(
        "### {}. {} - {}\n\n",
        rank, candidate.name, candidate.role
    ));
    block.push_str(&format!(
        "**Recommendation:** {}\n\n",
        candidate.recommendation
    ));
    block.push_str(&format!(
        "**Total Score:** {}/{}\n\n",
        format_score(candidate.total_score),
        format_score(rubric.max_total_score)
    ));
    block.push_str(&format!(
        "**Critical Score:** {}/{}\n\n",
        format_score(candidate.critical_score),
        format_score(rubric.max_critical_score)
    ));

    if !candidate.linkedin_url.is_empty() {
        block.push_str(&format!("**LinkedIn:** {}\n\n", candidate.linkedin_url));
    }

    block.push_str("**Key Strengths:**\n\n");
    if candidate.strengths.is_empty() {
        block.push_str("- None listed\n");
    } else {
        for strength in &candidate.strengths {
            block.push_str(&format!("- {}\n", strength));
        }
    }

    if has_real_improvements(&candidate.improvements) {
        block.push_str("\n**Areas for Improvement:**\n\n");
        for improvement in &candidate.improvements {
            block.push_str(&format!("- {}\n", improvement));
        }
    } else {
        block.push_str("\n**Areas for Improvement:** None significant identified\n");
    }
    block.push('\n');

    block
}

fn has_real_improvements(improvements: &[String]) -> bool {
    match improvements {
        [] => false,
        [only] => !only.starts_with(NO_IMPROVEMENTS_SENTENCE),
        _ => true,
    }
}

/// Generate the common patterns section.
fn generate_patterns_section(summary: &BatchSummary) -> String {
    let mut section = String::new();

    section.push_str("## 📈 Common Patterns Across Candidates\n\n");

    section.push_str("### Most Common Strengths\n\n");
    section.push_str(&generate_frequency_list(&summary.top_strengths));

    section.push_str("### Most Common Areas for Improvement\n\n");
    section.push_str(&generate_frequency_list(&summary.top_improvements));

    section
}

fn generate_frequency_list(entries: &[FrequencyEntry]) -> String {
    if entries.is_empty() {
        return "- None recorded\n\n".to_string();
    }

    let mut list = String::new();
    for entry in entries {
        let noun = if entry.count == 1 { "candidate" } else { "candidates" };
        list.push_str(&format!(
            "- **{}** (found in {} {})\n",
            entry.value, entry.count, noun
        ));
    }
    list.push('\n');
    list
}

/// Generate the report footer.
fn generate_footer(report: &Report) -> String {
    let mut footer = String::new();

    footer.push_str("---\n\n");
    footer.push_str(&format!(
        "*Generated {} from {} document(s) in `{}` against rubric `{}`*\n",
        report.metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
        report.metadata.documents_found,
        report.metadata.source_dir.display(),
        report.metadata.rubric_version
    ));

    footer
}

/// Keep free text from breaking a markdown table row.
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}
