//! Errors raised by the pipeline stages.
//!
//! They travel inside `anyhow::Error` and can be recovered with
//! `downcast_ref` when a caller needs to tell them apart.

use bp_wrap::ToolNotFoundError;
use itertools::Itertools;
use std::fmt;
use std::path::PathBuf;

/// A stage ran but its certifying artifacts are still absent.
#[derive(Debug, thiserror::Error)]
#[error(
    "{stage} did not complete for sample {sample}: missing {}",
    missing.iter().map(|p| p.display()).join(", ")
)]
pub struct StageIncompleteError {
    pub stage: String,
    pub sample: String,
    pub missing: Vec<PathBuf>,
}

/// One problem found while validating a batch.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PreconditionFailure {
    #[error("sample {sample}: the read {} does not exist", path.display())]
    MissingRead { sample: String, path: PathBuf },

    #[error("the {what} {} does not exist", path.display())]
    MissingFile { what: String, path: PathBuf },

    #[error("sample name {sample:?} is not usable as a folder name")]
    InvalidSampleName { sample: String },

    #[error("sample {sample} appears more than once in the batch")]
    DuplicateSample { sample: String },

    #[error(transparent)]
    ToolNotFound(#[from] ToolNotFoundError),
}

/// Every precondition failure found across a batch.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchValidationResult {
    pub failures: Vec<PreconditionFailure>,
}

impl BatchValidationResult {
    pub fn push(&mut self, failure: impl Into<PreconditionFailure>) {
        self.failures.push(failure.into());
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    /// Ok when nothing failed, otherwise the itemized error.
    pub fn into_result(self) -> Result<(), PreconditionError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(PreconditionError(self))
        }
    }
}

impl fmt::Display for BatchValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for failure in &self.failures {
            writeln!(f, "  - {failure}")?;
        }
        Ok(())
    }
}

/// The batch was rejected before anything was run.
#[derive(Debug, thiserror::Error)]
#[error("The batch failed validation with {} problem(s):\n{}", .0.len(), .0)]
pub struct PreconditionError(pub BatchValidationResult);

/// No known stage produced the contents of a folder.
#[derive(Debug, thiserror::Error)]
#[error("Cannot determine which stage produced the folder {}", folder.display())]
pub struct UnclassifiableFolderError {
    pub folder: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_validation_report_lists_every_failure() {
        let mut result = BatchValidationResult::default();
        assert!(result.clone().into_result().is_ok());

        result.push(PreconditionFailure::MissingRead {
            sample: "B".to_string(),
            path: PathBuf::from("/data/B/B_S2_R2_001.fastq"),
        });
        result.push(ToolNotFoundError {
            program: "shovill".to_string(),
            reason: "No such file or directory".to_string(),
        });
        let err = result.into_result().unwrap_err();
        assert_eq!(
            err.to_string(),
            "The batch failed validation with 2 problem(s):\n\
             \x20 - sample B: the read /data/B/B_S2_R2_001.fastq does not exist\n\
             \x20 - shovill cannot be found or failed its version check: No such file or directory\n"
        );
    }
}
