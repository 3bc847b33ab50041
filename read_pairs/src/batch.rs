//! Resolve every sample folder underneath a parent folder.

use crate::resolve::resolve_sample;
use crate::Sample;
use anyhow::{Context, Result};
use log::warn;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// A folder that could not be resolved, and why.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SkippedFolder {
    pub folder: PathBuf,
    pub reason: String,
}

/// The outcome of scanning a parent folder: every subfolder is either
/// resolved or reported as skipped.
#[derive(Debug)]
pub struct BatchScan<T> {
    pub resolved: Vec<T>,
    pub skipped: Vec<SkippedFolder>,
}

/// Apply `resolve` to every subdirectory of `parent`, in name order.
/// Plain files directly under `parent` are ignored.
pub fn scan_folders<T>(
    parent: &Path,
    mut resolve: impl FnMut(&Path) -> Result<T>,
) -> Result<BatchScan<T>> {
    let mut folders = Vec::new();
    for entry in std::fs::read_dir(parent).with_context(|| parent.display().to_string())? {
        let path = entry.with_context(|| parent.display().to_string())?.path();
        if path.is_dir() {
            folders.push(path);
        }
    }
    folders.sort();

    let mut scan = BatchScan {
        resolved: Vec::new(),
        skipped: Vec::new(),
    };
    for folder in folders {
        match resolve(&folder) {
            Ok(item) => scan.resolved.push(item),
            Err(err) => {
                warn!("Skipping {}: {err:#}", folder.display());
                scan.skipped.push(SkippedFolder {
                    folder,
                    reason: format!("{err:#}"),
                });
            }
        }
    }
    Ok(scan)
}

/// Resolve the raw samples stored one per subfolder of `parent`.
pub fn scan_batch(parent: &Path) -> Result<BatchScan<Sample>> {
    scan_folders(parent, |folder| resolve_sample(folder, None))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    #[test]
    fn test_scan_batch() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let parent = dir.path();
        for name in ["EF9012", "AB1234", "CD5678"] {
            let folder = parent.join(name);
            std::fs::create_dir(&folder)?;
            File::create(folder.join(format!("{name}_R1_001.fastq")))?;
            File::create(folder.join(format!("{name}_R2_001.fastq")))?;
        }
        std::fs::create_dir(parent.join("other_folder"))?;
        File::create(parent.join("ignored_file.txt"))?;

        let scan = scan_batch(parent)?;
        let names: Vec<_> = scan.resolved.iter().map(Sample::name).collect();
        assert_eq!(names, ["AB1234", "CD5678", "EF9012"]);
        assert!(scan.resolved.iter().all(Sample::exists));

        assert_eq!(scan.skipped.len(), 1);
        assert_eq!(scan.skipped[0].folder, parent.join("other_folder"));
        assert!(scan.skipped[0].reason.contains("Could not locate"));
        Ok(())
    }
}
