//! Merge report types for tracking counts, drops and policy decisions.
//!
//! A merge either fails loudly or succeeds with a report; nothing is ever
//! dropped silently. The report carries stable issue codes so scripts can
//! consume the JSON form.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// A report generated by a completed merge.
#[derive(Clone, Debug, Default, Serialize)]
pub struct MergeReport {
    /// Counts of what went into the merged dataset.
    pub counts: MergeCounts,
    /// Where the merged descriptor was written.
    pub descriptor_path: PathBuf,
    /// Issues discovered while merging.
    pub issues: Vec<MergeIssue>,
}

impl MergeReport {
    /// Create a new empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an issue to the report.
    pub fn add(&mut self, issue: MergeIssue) {
        self.issues.push(issue);
    }

    /// Count of warning-level issues (data was dropped).
    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
            .count()
    }

    /// Count of info-level issues (policy decisions, notes).
    pub fn info_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Info)
            .count()
    }

    /// Returns true if the merge dropped any input data.
    pub fn is_lossy(&self) -> bool {
        self.warning_count() > 0
    }
}

impl fmt::Display for MergeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Merged {} dataset(s): {} images, {} annotations",
            self.counts.datasets, self.counts.images, self.counts.annotations
        )?;
        writeln!(f, "Descriptor written to {}", self.descriptor_path.display())?;

        if !self.issues.is_empty() {
            let warnings = self.warning_count();
            let infos = self.info_count();

            if warnings > 0 {
                writeln!(f)?;
                writeln!(f, "Warnings ({}):", warnings)?;
                for issue in self.issues.iter().filter(|i| i.severity == Severity::Warning) {
                    writeln!(f, "  - {}", issue.message)?;
                }
            }

            if infos > 0 {
                writeln!(f)?;
                writeln!(f, "Notes ({}):", infos)?;
                for issue in self.issues.iter().filter(|i| i.severity == Severity::Info) {
                    writeln!(f, "  - {}", issue.message)?;
                }
            }
        }

        Ok(())
    }
}

/// Counts of merged dataset elements.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MergeCounts {
    pub datasets: usize,
    pub images: usize,
    pub annotations: usize,
}

/// A single issue raised while merging.
#[derive(Clone, Debug, Serialize)]
pub struct MergeIssue {
    pub severity: Severity,
    pub code: MergeIssueCode,
    pub message: String,
}

impl MergeIssue {
    /// Create a warning-level issue (input data was dropped).
    pub fn warning(code: MergeIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
        }
    }

    /// Create an info-level issue (policy note).
    pub fn info(code: MergeIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            code,
            message: message.into(),
        }
    }
}

/// Severity level for merge issues.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Input data did not make it into the merged dataset.
    Warning,
    /// A policy decision worth surfacing; nothing was lost.
    Info,
}

/// Stable issue codes for programmatic consumption.
///
/// These codes are part of the JSON schema and should remain stable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeIssueCode {
    /// Annotations referencing a missing image were dropped
    /// (only under `--allow-dangling`).
    DanglingAnnotationsDropped,
    /// info/license defaulted to the first source dataset's values.
    MetadataFromFirstDataset,
    /// Categories always come from the first source dataset.
    CategoriesFromFirstDataset,
}
