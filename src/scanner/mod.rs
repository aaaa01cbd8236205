//! Input discovery.
//!
//! Finds evaluation documents and resumes in a flat directory. Files are
//! returned in the order the filesystem yields them; ranking is the only
//! meaningful ordering downstream.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Suffix every evaluation document file name ends with.
pub const EVALUATION_SUFFIX: &str = "_evaluation.md";

/// Resume file types the evaluator can read.
pub const RESUME_EXTENSIONS: &[&str] = &["pdf", "txt"];

/// A resume waiting to be evaluated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeFile {
    pub path: PathBuf,
    /// Candidate identifier derived from the file name.
    pub candidate: String,
}

impl ResumeFile {
    pub fn new(path: PathBuf) -> Self {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        Self {
            candidate: candidate_name(&stem),
            path,
        }
    }

    /// Path of the evaluation document for this candidate inside `dir`.
    pub fn evaluation_path(&self, dir: &Path) -> PathBuf {
        dir.join(evaluation_file_name(&self.candidate))
    }
}

/// Candidate identifier: the first two `_`-separated parts of a file stem.
pub fn candidate_name(stem: &str) -> String {
    stem.split('_')
        .filter(|part| !part.is_empty())
        .take(2)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Deterministic evaluation document name for a candidate.
pub fn evaluation_file_name(candidate: &str) -> String {
    format!("{}{}", candidate.replace(' ', "_"), EVALUATION_SUFFIX)
}

/// List the evaluation documents in `dir`.
///
/// Fails only when the directory itself cannot be read.
pub fn find_evaluations(dir: &Path) -> Result<Vec<PathBuf>> {
    list_files(dir, |path| {
        path.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(EVALUATION_SUFFIX))
    })
}

/// List the resumes in `dir`.
pub fn find_resumes(dir: &Path) -> Result<Vec<ResumeFile>> {
    let paths = list_files(dir, |path| {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| RESUME_EXTENSIONS.contains(&e.to_lowercase().as_str()))
    })?;
    Ok(paths.into_iter().map(ResumeFile::new).collect())
}

fn list_files(dir: &Path, keep: impl Fn(&Path) -> bool) -> Result<Vec<PathBuf>> {
    std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory: {}", dir.display()))?;

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                debug!("Skipping unreadable entry in {}: {}", dir.display(), e);
                continue;
            }
        };

        let name = entry.file_name().to_string_lossy();
        if name.starts_with('.') || !entry.file_type().is_file() {
            continue;
        }

        if keep(entry.path()) {
            files.push(entry.into_path());
        }
    }

    debug!("Found {} matching files in {}", files.len(), dir.display());
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_candidate_name_from_stem() {
        assert_eq!(candidate_name("Jane_Doe_Resume_2024"), "Jane Doe");
        assert_eq!(candidate_name("Madonna"), "Madonna");
        assert_eq!(candidate_name("__Jane__Doe"), "Jane Doe");
    }

    #[test]
    fn test_evaluation_path() {
        let resume = ResumeFile::new(PathBuf::from("resumes/Jane_Doe_CV.pdf"));
        assert_eq!(resume.candidate, "Jane Doe");
        assert_eq!(
            resume.evaluation_path(Path::new("evaluations")),
            PathBuf::from("evaluations/Jane_Doe_evaluation.md")
        );
    }

    #[test]
    fn test_find_evaluations_filters_names() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Jane_Doe_evaluation.md"), "# Jane").unwrap();
        fs::write(dir.path().join("notes.md"), "ignore").unwrap();
        fs::write(dir.path().join(".hidden_evaluation.md"), "ignore").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested/Bob_Ray_evaluation.md"), "# Bob").unwrap();

        let found = find_evaluations(dir.path()).unwrap();
        assert_eq!(found, vec![dir.path().join("Jane_Doe_evaluation.md")]);
    }

    #[test]
    fn test_find_resumes_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Jane_Doe.PDF"), b"%PDF").unwrap();
        fs::write(dir.path().join("Bob_Ray_cv.txt"), "Bob").unwrap();
        fs::write(dir.path().join("photo.png"), b"png").unwrap();

        let mut found: Vec<String> = find_resumes(dir.path())
            .unwrap()
            .into_iter()
            .map(|r| r.candidate)
            .collect();
        found.sort();
        assert_eq!(found, vec!["Bob Ray", "Jane Doe"]);
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        assert!(find_evaluations(Path::new("/nonexistent/evaluations")).is_err());
    }
}
