//! Turn whatever the user points at into pipeline input.
//!
//! A sample folder may hold the reads straight from the sequencer or reads
//! trimmed by an earlier run. The folder is classified once, here, and from
//! then on the pipeline only sees a [`SampleInput`].

use crate::classifier::{classify, StageTag};
use crate::outputs::{StageOutput, TrimResult};
use anyhow::{bail, Result};
use read_pairs::{read_sample_table, resolve_sample, scan_folders, BatchScan, Sample};
use std::path::Path;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SampleInput {
    /// Reads as delivered by the sequencer.
    Raw(Sample),
    /// Reads that were already trimmed.
    Trimmed(TrimResult),
}

impl SampleInput {
    pub fn name(&self) -> &str {
        match self {
            SampleInput::Raw(sample) => sample.name(),
            SampleInput::Trimmed(trimmed) => trimmed.name(),
        }
    }

    /// The forward and reverse reads.
    pub fn reads(&self) -> [&Path; 2] {
        match self {
            SampleInput::Raw(sample) => sample.reads(),
            SampleInput::Trimmed(trimmed) => [trimmed.forward.as_path(), trimmed.reverse.as_path()],
        }
    }

    pub fn missing_reads(&self) -> Vec<&Path> {
        self.reads().into_iter().filter(|p| !p.is_file()).collect()
    }
}

impl From<Sample> for SampleInput {
    fn from(sample: Sample) -> Self {
        SampleInput::Raw(sample)
    }
}

impl From<TrimResult> for SampleInput {
    fn from(trimmed: TrimResult) -> Self {
        SampleInput::Trimmed(trimmed)
    }
}

/// Read the sample in `folder`, whether raw or already trimmed.
pub fn normalize_folder(folder: &Path) -> Result<SampleInput> {
    match classify(folder, true)? {
        Some(StageTag::RawReads) => Ok(resolve_sample(folder, None)?.into()),
        Some(StageTag::TrimmedReads) => Ok(TrimResult::from_folder(folder, None)?.into()),
        Some(tag) => bail!(
            "{} holds {tag}, not sequencing reads",
            folder.display()
        ),
        None => bail!("{} does not hold sequencing reads", folder.display()),
    }
}

/// Normalize every sample folder underneath `parent`. Folders that cannot be
/// read as a sample are reported, not fatal.
pub fn normalize_batch(parent: &Path) -> Result<BatchScan<SampleInput>> {
    scan_folders(parent, normalize_folder)
}

/// The raw samples listed in a sample table.
pub fn samples_from_table(path: &Path) -> Result<BatchScan<SampleInput>> {
    Ok(BatchScan {
        resolved: read_sample_table(path)?
            .into_iter()
            .map(SampleInput::from)
            .collect(),
        skipped: Vec::new(),
    })
}
