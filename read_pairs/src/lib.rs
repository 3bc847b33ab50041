//! Find the paired sequencing reads of a sample on disk.
//!
//! A `Sample` is a named pair of forward/reverse read files. Samples are
//! resolved from a folder of reads (`resolve_sample`), read from a tab
//! separated sample table (`read_sample_table`), or collected from every
//! sample folder underneath a parent folder (`scan_batch`).
#![deny(
    future_incompatible,
    nonstandard_style,
    rust_2018_compatibility,
    rust_2021_compatibility,
    rust_2018_idioms
)]

pub mod batch;
pub mod filenames;
pub mod resolve;
pub mod table;

pub use batch::{scan_batch, scan_folders, BatchScan, SkippedFolder};
pub use filenames::{sample_name_from_read, NamingConvention, ReadFile, ReadSide};
pub use resolve::{find_read_pair, resolve_sample, ResolveError};
pub use table::read_sample_table;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The paired reads of a single specimen plus its canonical name.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Sample {
    name: String,
    forward: PathBuf,
    reverse: PathBuf,
    source_folder: PathBuf,
}

impl Sample {
    /// Build a sample. The forward and reverse reads must be distinct files.
    pub fn new(
        name: impl Into<String>,
        forward: impl Into<PathBuf>,
        reverse: impl Into<PathBuf>,
        source_folder: impl Into<PathBuf>,
    ) -> Result<Sample, ResolveError> {
        let forward = forward.into();
        let reverse = reverse.into();
        if forward == reverse {
            return Err(ResolveError::SameReadFile { path: forward });
        }
        Ok(Sample {
            name: name.into(),
            forward,
            reverse,
            source_folder: source_folder.into(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn forward(&self) -> &Path {
        &self.forward
    }

    pub fn reverse(&self) -> &Path {
        &self.reverse
    }

    pub fn source_folder(&self) -> &Path {
        &self.source_folder
    }

    /// Both reads are present on disk.
    pub fn exists(&self) -> bool {
        self.forward.exists() && self.reverse.exists()
    }

    pub fn reads(&self) -> [&Path; 2] {
        [self.forward.as_path(), self.reverse.as_path()]
    }

    /// The reads of this sample which are not present on disk.
    pub fn missing_reads(&self) -> Vec<&Path> {
        self.reads().into_iter().filter(|p| !p.exists()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_rejects_identical_reads() {
        let err = Sample::new("A", "/x/A_R1.fastq", "/x/A_R1.fastq", "/x").unwrap_err();
        assert!(matches!(err, ResolveError::SameReadFile { .. }));
    }

    #[test]
    fn test_missing_reads() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let forward = dir.path().join("A_S1_R1_001.fastq");
        std::fs::write(&forward, "")?;
        let sample = Sample::new(
            "A",
            &forward,
            dir.path().join("A_S1_R2_001.fastq"),
            dir.path(),
        )?;
        assert!(!sample.exists());
        assert_eq!(sample.missing_reads(), vec![sample.reverse()]);
        Ok(())
    }
}
