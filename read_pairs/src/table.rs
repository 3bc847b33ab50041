//! Sample tables: a tab separated file listing one sample per row.
//!
//! ```text
//! sampleName	forwardRead	reverseRead
//! AU1234	reads/AU1234_S0_R1_001.fastq	reads/AU1234_S0_R2_001.fastq
//! ```
//! Relative read paths are resolved against the folder holding the table.

use crate::Sample;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct SampleRow {
    #[serde(rename = "sampleName")]
    sample_name: String,
    #[serde(rename = "forwardRead")]
    forward_read: PathBuf,
    #[serde(rename = "reverseRead")]
    reverse_read: PathBuf,
}

pub fn read_sample_table(path: &Path) -> Result<Vec<Sample>> {
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| path.display().to_string())?;

    let mut samples = Vec::new();
    for (index, row) in reader.deserialize::<SampleRow>().enumerate() {
        // Line 1 is the header.
        let line = index + 2;
        let row = row.with_context(|| format!("{} line {line}", path.display()))?;
        let forward = base.join(&row.forward_read);
        let reverse = base.join(&row.reverse_read);
        let source_folder = forward.parent().unwrap_or(base).to_path_buf();
        samples.push(
            Sample::new(row.sample_name, forward, reverse, source_folder)
                .with_context(|| format!("{} line {line}", path.display()))?,
        );
    }
    Ok(samples)
}
