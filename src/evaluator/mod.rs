//! Resume evaluation stage.
//!
//! Turns each resume in a directory into one evaluation document by
//! asking the model to score it against the rubric. Candidates that
//! already have a document are skipped, so an interrupted batch can be
//! re-run without paying for the same calls twice.

mod client;
mod prompt;

pub use client::OllamaClient;

use client::{strip_code_fences, ChatModel, LlmError};
use prompt::{build_evaluation_prompt, SYSTEM_PROMPT};

use crate::config::Config;
use crate::scanner::{find_resumes, ResumeFile};
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Why a single resume produced no document.
#[derive(Debug, Error)]
pub enum ResumeError {
    #[error("Failed to extract text from {path}: {message}")]
    Extract { path: PathBuf, message: String },

    #[error("No text could be extracted from {0}")]
    EmptyText(PathBuf),

    #[error("Model call failed: {0}")]
    Model(#[from] LlmError),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Options for one evaluation batch.
#[derive(Debug, Clone, Default)]
pub struct EvaluateOptions {
    /// Evaluate at most this many resumes.
    pub limit: Option<usize>,
    /// Re-evaluate candidates that already have a document.
    pub force: bool,
    pub show_progress: bool,
}

/// Counts for one evaluation batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvaluationOutcome {
    pub found: usize,
    pub evaluated: usize,
    pub skipped_existing: usize,
    pub failed: usize,
}

/// Read the text of a resume.
pub fn read_resume_text(path: &Path) -> Result<String, ResumeError> {
    let is_pdf = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));

    let text = if is_pdf {
        pdf_extract::extract_text(path).map_err(|e| ResumeError::Extract {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
    } else {
        std::fs::read_to_string(path).map_err(|e| ResumeError::Extract {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
    };

    if text.trim().is_empty() {
        return Err(ResumeError::EmptyText(path.to_path_buf()));
    }

    Ok(text)
}

/// Resumes in `resumes_dir` that still need an evaluation, honoring
/// `--force` and `--limit`. Also returns how many were skipped.
pub fn pending_resumes(
    resumes_dir: &Path,
    evaluations_dir: &Path,
    options: &EvaluateOptions,
) -> Result<(Vec<ResumeFile>, usize, usize)> {
    let resumes = find_resumes(resumes_dir)?;
    let found = resumes.len();

    let mut skipped = 0;
    let mut pending = Vec::new();
    for resume in resumes {
        if !options.force && resume.evaluation_path(evaluations_dir).exists() {
            debug!("Evaluation exists for {}, skipping", resume.candidate);
            skipped += 1;
            continue;
        }
        pending.push(resume);
    }

    if let Some(limit) = options.limit {
        pending.truncate(limit);
    }

    Ok((pending, found, skipped))
}

/// Evaluate one resume and write its document. Returns the written path.
pub async fn evaluate_resume<M: ChatModel>(
    model: &M,
    config: &Config,
    resume: &ResumeFile,
    evaluations_dir: &Path,
) -> Result<PathBuf, ResumeError> {
    let text = read_resume_text(&resume.path)?;
    debug!(
        "Extracted {} characters from {}",
        text.len(),
        resume.path.display()
    );

    let prompt = build_evaluation_prompt(config, &resume.candidate, &text);
    let reply = model.complete(SYSTEM_PROMPT, &prompt).await?;
    let document = strip_code_fences(&reply);

    let output_path = resume.evaluation_path(evaluations_dir);
    std::fs::write(&output_path, format!("{}\n", document)).map_err(|source| {
        ResumeError::Write {
            path: output_path.clone(),
            source,
        }
    })?;

    Ok(output_path)
}

/// Evaluate every pending resume in the configured directories.
///
/// A failure on one resume is logged and counted; the batch continues.
pub async fn evaluate_resumes<M: ChatModel>(
    model: &M,
    config: &Config,
    options: &EvaluateOptions,
) -> Result<EvaluationOutcome> {
    let resumes_dir = Path::new(&config.general.resumes_dir);
    let evaluations_dir = Path::new(&config.general.evaluations_dir);

    std::fs::create_dir_all(evaluations_dir).with_context(|| {
        format!(
            "Failed to create evaluations directory {}",
            evaluations_dir.display()
        )
    })?;

    let (pending, found, skipped_existing) =
        pending_resumes(resumes_dir, evaluations_dir, options)?;
    info!(
        "Found {} resumes, {} already evaluated, {} to process",
        found,
        skipped_existing,
        pending.len()
    );

    let mut outcome = EvaluationOutcome {
        found,
        skipped_existing,
        ..Default::default()
    };

    let progress = if options.show_progress && !pending.is_empty() {
        let pb = ProgressBar::new(pending.len() as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        Some(pb)
    } else {
        None
    };

    let delay = Duration::from_millis(config.model.request_delay_ms);

    for (i, resume) in pending.iter().enumerate() {
        if let Some(ref pb) = progress {
            pb.set_message(resume.candidate.clone());
        }

        match evaluate_resume(model, config, resume, evaluations_dir).await {
            Ok(path) => {
                info!("Wrote {}", path.display());
                outcome.evaluated += 1;
            }
            Err(e) => {
                error!("Skipping {}: {}", resume.path.display(), e);
                outcome.failed += 1;
            }
        }

        if let Some(ref pb) = progress {
            pb.inc(1);
        }

        if i + 1 < pending.len() && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    if outcome.failed > 0 {
        warn!("{} resume(s) could not be evaluated", outcome.failed);
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use tempfile::TempDir;

    /// Model stub that records prompts and replies with a fixed document.
    struct StubModel {
        reply: Result<String, u16>,
        prompts: RefCell<Vec<String>>,
    }

    impl StubModel {
        fn replying(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                prompts: RefCell::new(Vec::new()),
            }
        }

        fn failing(status: u16) -> Self {
            Self {
                reply: Err(status),
                prompts: RefCell::new(Vec::new()),
            }
        }
    }

    impl ChatModel for StubModel {
        async fn complete(&self, _system: &str, prompt: &str) -> Result<String, LlmError> {
            self.prompts.borrow_mut().push(prompt.to_string());
            match &self.reply {
                Ok(reply) => Ok(reply.clone()),
                Err(status) => Err(LlmError::Api {
                    status: *status,
                    message: "stub".to_string(),
                }),
            }
        }
    }

    fn setup() -> (TempDir, Config) {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join("resumes")).unwrap();

        let mut config = Config::default();
        config.general.resumes_dir = temp.path().join("resumes").display().to_string();
        config.general.evaluations_dir = temp.path().join("evaluations").display().to_string();
        config.model.request_delay_ms = 0;
        (temp, config)
    }

    fn add_resume(temp: &TempDir, file: &str, text: &str) {
        std::fs::write(temp.path().join("resumes").join(file), text).unwrap();
    }

    #[test]
    fn test_writes_one_document_per_resume() {
        let (temp, config) = setup();
        add_resume(&temp, "Jane_Doe_resume.txt", "Five years of ML.");
        let model = StubModel::replying("```markdown\n# Jane Doe - ML Engineer\n```");

        let outcome =
            tokio_test::block_on(evaluate_resumes(&model, &config, &EvaluateOptions::default()))
                .unwrap();

        assert_eq!(outcome.evaluated, 1);
        let written = temp.path().join("evaluations/Jane_Doe_evaluation.md");
        let content = std::fs::read_to_string(written).unwrap();
        assert_eq!(content, "# Jane Doe - ML Engineer\n");
        assert!(model.prompts.borrow()[0].contains("Five years of ML."));
    }

    #[test]
    fn test_existing_evaluation_is_skipped() {
        let (temp, config) = setup();
        add_resume(&temp, "Jane_Doe_resume.txt", "text");
        std::fs::create_dir(temp.path().join("evaluations")).unwrap();
        std::fs::write(temp.path().join("evaluations/Jane_Doe_evaluation.md"), "old").unwrap();
        let model = StubModel::replying("# Jane Doe - New");

        let outcome =
            tokio_test::block_on(evaluate_resumes(&model, &config, &EvaluateOptions::default()))
                .unwrap();

        assert_eq!(outcome.skipped_existing, 1);
        assert_eq!(outcome.evaluated, 0);
        assert!(model.prompts.borrow().is_empty());

        let forced = EvaluateOptions {
            force: true,
            ..Default::default()
        };
        let outcome = tokio_test::block_on(evaluate_resumes(&model, &config, &forced)).unwrap();
        assert_eq!(outcome.evaluated, 1);
    }

    #[test]
    fn test_limit_caps_the_batch() {
        let (temp, config) = setup();
        add_resume(&temp, "Jane_Doe.txt", "a");
        add_resume(&temp, "John_Roe.txt", "b");
        add_resume(&temp, "Ann_Poe.txt", "c");
        let model = StubModel::replying("# X - Y");

        let options = EvaluateOptions {
            limit: Some(1),
            ..Default::default()
        };
        let outcome = tokio_test::block_on(evaluate_resumes(&model, &config, &options)).unwrap();

        assert_eq!(outcome.found, 3);
        assert_eq!(outcome.evaluated, 1);
        assert_eq!(model.prompts.borrow().len(), 1);
    }

    #[test]
    fn test_failures_do_not_stop_the_batch() {
        let (temp, config) = setup();
        add_resume(&temp, "Jane_Doe.txt", "a");
        add_resume(&temp, "Empty_File.txt", "   ");
        let model = StubModel::failing(400);

        let outcome =
            tokio_test::block_on(evaluate_resumes(&model, &config, &EvaluateOptions::default()))
                .unwrap();

        assert_eq!(outcome.failed, 2);
        assert_eq!(outcome.evaluated, 0);
        // The empty resume never reaches the model.
        assert_eq!(model.prompts.borrow().len(), 1);
    }

    #[test]
    fn test_missing_resume_dir_is_an_error() {
        let (temp, mut config) = setup();
        config.general.resumes_dir = temp.path().join("nope").display().to_string();
        let model = StubModel::replying("x");

        let result =
            tokio_test::block_on(evaluate_resumes(&model, &config, &EvaluateOptions::default()));
        assert!(result.is_err());
    }
}
