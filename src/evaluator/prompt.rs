//! Prompt construction for resume evaluation.
//!
//! The prompt is generated from the configured rubric so that the flag
//! table the model writes lines up with what the extractor reads back.

use crate::config::{Config, RubricConfig};
use crate::models::format_score;

/// System prompt for the evaluation model.
pub const SYSTEM_PROMPT: &str = "You are an expert technical recruiter. \
You evaluate resumes strictly against the scoring rubric you are given, \
cite evidence from the resume for every score and answer in the exact \
markdown format requested, with no preamble.";

/// Share of the maximum total score a top-tier candidate needs.
const STRONG_SHARE: f64 = 0.8;

/// Share of the maximum total score below which a candidate is rejected.
const REJECT_SHARE: f64 = 0.6;

/// Build the user prompt for one resume.
pub fn build_evaluation_prompt(config: &Config, candidate: &str, resume_text: &str) -> String {
    let rubric = &config.rubric;
    let mut prompt = String::new();

    prompt.push_str(&format!(
        "Evaluate the following resume for the position of {}.\n\n",
        config.general.position
    ));

    prompt.push_str("## Scoring Rubric\n\n");
    prompt.push_str(&rubric_section(rubric));

    prompt.push_str("## Recommendation Guidelines\n\n");
    prompt.push_str(&guidelines_section(rubric));

    prompt.push_str("## Required Output Format\n\n");
    prompt.push_str(&output_format_section(rubric, candidate));

    prompt.push_str("## Resume\n\n");
    prompt.push_str(resume_text.trim());
    prompt.push('\n');

    prompt
}

fn rubric_section(rubric: &RubricConfig) -> String {
    let mut section = String::new();

    for flag in &rubric.flags {
        let marker = if flag.critical { " (Critical)" } else { "" };
        section.push_str(&format!(
            "{}. **{}**{}: {}\n",
            flag.id, flag.name, marker, flag.guidance
        ));
    }
    section.push('\n');

    section
}

fn guidelines_section(rubric: &RubricConfig) -> String {
    let max_total = format_score(rubric.max_total_score);
    let max_critical = format_score(rubric.max_critical_score);
    let strong_at = format_score(rubric.max_total_score * STRONG_SHARE);
    let reject_below = format_score(rubric.max_total_score * REJECT_SHARE);

    let mut section = format!(
        "- Total score is the sum of all positive flags, out of {max_total}.\n\
         - Critical score is the sum of positive critical flags, out of {max_critical}.\n\
         - Red flags are negative and reported separately.\n\
         - Choose exactly one recommendation from: {}.\n",
        rubric.labels.join(", ")
    );

    // Labels run best to worst: the first is the top tier, the last rejects.
    match rubric.labels.as_slice() {
        [] | [_] => {}
        [best, middle @ .., worst] => {
            section.push_str(&format!(
                "- {worst} when the total score is below {reject_below} or any critical flag scores 0.\n"
            ));
            for label in middle {
                section.push_str(&format!(
                    "- {label} when the total score is at least {reject_below} and below {strong_at}.\n"
                ));
            }
            section.push_str(&format!(
                "- {best} requires a total score of {strong_at} or more and a critical score of {max_critical}.\n"
            ));
        }
    }
    section.push('\n');

    section
}

fn output_format_section(rubric: &RubricConfig, candidate: &str) -> String {
    let mut section = String::new();
    let first_label = rubric.labels.first().map(String::as_str).unwrap_or("Consider");

    section.push_str("Respond with exactly this structure:\n\n");
    section.push_str(&format!("# {} - <Current Role>\n\n", candidate));
    section.push_str(&format!("## 🏆 RECOMMENDATION: <{}|...>\n\n", first_label));
    section.push_str("| # | Category | Requirement | Critical | Score | Confirmation |\n");
    section.push_str("|---|---|---|---|---|---|\n");
    for flag in &rubric.flags {
        let critical = if flag.critical { "Critical" } else { "" };
        section.push_str(&format!(
            "| {} | **{}** | <requirement> | {} | <score> | <evidence> |\n",
            flag.id, flag.name, critical
        ));
    }

    section.push_str("\n## Summary Scores\n\n");
    section.push_str("- Sum of all positive flags: <a+b+...> = **<total>**\n");
    section.push_str("- Sum of positive critical flags: <a+b+...> = **<critical>**\n");
    section.push_str("- Green Flag Percentage: **<percent>%**\n");
    section.push_str(&format!(
        "- CV Scoring: <total>/{}\n",
        format_score(rubric.max_total_score)
    ));
    section.push_str("- LinkedIn: <profile URL if present>\n\n");
    section.push_str("## Key Strengths\n\n- 💪 <strength>\n\n");
    section.push_str("## Areas for Improvement\n\n- ⚠️ <gap>\n\n");

    section
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_contains_every_flag() {
        let config = Config::default();
        let prompt = build_evaluation_prompt(&config, "Jane Doe", "Resume text");

        for flag in &config.rubric.flags {
            assert!(prompt.contains(&flag.name), "missing flag {}", flag.name);
        }
        assert!(prompt.contains("position of Applied AI Researcher"));
        assert!(prompt.contains("# Jane Doe - <Current Role>"));
        assert!(prompt.ends_with("Resume text\n"));
    }

    #[test]
    fn test_critical_flags_are_marked() {
        let prompt = build_evaluation_prompt(&Config::default(), "Jane Doe", "");
        assert!(prompt.contains("1. **AI/ML Experience & Engineering** (Critical)"));
        assert!(prompt.contains("5. **STEM**:"));
    }

    #[test]
    fn test_default_rubric_thresholds() {
        let prompt = build_evaluation_prompt(&Config::default(), "Jane Doe", "");
        assert!(prompt.contains("- Reject when the total score is below 6 or any critical flag scores 0."));
        assert!(prompt.contains("- Consider when the total score is at least 6 and below 8."));
        assert!(prompt.contains("- Strong Candidate requires a total score of 8 or more and a critical score of 6."));
        assert!(prompt.contains("CV Scoring: <total>/10"));
    }

    #[test]
    fn test_guidelines_follow_configured_rubric() {
        let mut config = Config::default();
        config.rubric.max_total_score = 50.0;
        config.rubric.max_critical_score = 30.0;
        config.rubric.labels = vec!["Hire".to_string(), "Maybe".to_string(), "No".to_string()];

        let prompt = build_evaluation_prompt(&config, "Jane Doe", "");

        assert!(prompt.contains("- No when the total score is below 30"));
        assert!(prompt.contains("- Maybe when the total score is at least 30 and below 40."));
        assert!(prompt.contains("- Hire requires a total score of 40 or more and a critical score of 30."));
        assert!(prompt.contains("CV Scoring: <total>/50"));
        assert!(prompt.contains("## 🏆 RECOMMENDATION: <Hire|...>"));
        assert!(!prompt.contains("Strong Candidate"));
        assert!(!prompt.contains("/10"));
    }

    #[test]
    fn test_format_matches_extractor() {
        use crate::extract::FieldExtractor;

        // The template itself parses, so the model only has to fill it in.
        let prompt = build_evaluation_prompt(&Config::default(), "Jane Doe", "");
        let raw = FieldExtractor::new().unwrap().extract(&prompt);

        assert_eq!(raw.name.as_deref(), Some("Jane Doe"));
        assert_eq!(raw.flag_rows.len(), 6);
    }
}
