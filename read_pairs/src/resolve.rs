//! Turn a folder of reads into a `Sample`.

use crate::filenames::{sample_name_from_read, ReadFile, ReadSide};
use crate::Sample;
use anyhow::{Context, Result};
use itertools::Itertools;
use log::debug;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("{} is not a directory", folder.display())]
    NotADirectory { folder: PathBuf },

    #[error(
        "Could not locate the {} read(s) in folder {}. Read files present: [{}]",
        missing.iter().join(" and "),
        folder.display(),
        found.iter().map(|p| p.display()).join(", ")
    )]
    MissingRead {
        folder: PathBuf,
        missing: Vec<ReadSide>,
        found: Vec<PathBuf>,
    },

    #[error("Could not derive a sample name from the read file {}", path.display())]
    UnnamedSample { path: PathBuf },

    #[error("The forward and reverse reads are the same file: {}", path.display())]
    SameReadFile { path: PathBuf },
}

/// List the read files of `folder`, most trusted naming convention first and
/// then by path. Directories and files that are not reads are ignored.
fn list_read_files(folder: &Path) -> Result<Vec<ReadFile>> {
    let mut reads: Vec<ReadFile> = std::fs::read_dir(folder)
        .with_context(|| folder.display().to_string())?
        .map_ok(|entry| entry.path())
        .filter_ok(|path| path.is_file())
        .filter_map_ok(|path| ReadFile::new(&path))
        .collect::<Result<_, _>>()
        .with_context(|| folder.display().to_string())?;
    reads.sort_by(|a, b| (a.convention, &a.path).cmp(&(b.convention, &b.path)));
    Ok(reads)
}

/// Find the forward and reverse reads of `folder`.
///
/// Candidates are ranked by naming convention, then sorted lexicographically,
/// and the first candidate of each side is selected. The result does not
/// depend on directory listing order.
pub fn find_read_pair(folder: &Path) -> Result<(ReadFile, ReadFile)> {
    if !folder.is_dir() {
        return Err(ResolveError::NotADirectory {
            folder: folder.to_path_buf(),
        }
        .into());
    }

    let reads = list_read_files(folder)?;
    let forward = reads.iter().find(|r| r.side == ReadSide::Forward);
    let reverse = reads.iter().find(|r| r.side == ReadSide::Reverse);

    match (forward, reverse) {
        (Some(f), Some(r)) => Ok((f.clone(), r.clone())),
        (f, r) => {
            let missing = [(ReadSide::Forward, f), (ReadSide::Reverse, r)]
                .into_iter()
                .filter(|(_, found)| found.is_none())
                .map(|(side, _)| side)
                .collect();
            debug!("Folder contents of {}:", folder.display());
            for read in &reads {
                debug!("\t{}", read.path.display());
            }
            Err(ResolveError::MissingRead {
                folder: folder.to_path_buf(),
                missing,
                found: reads.into_iter().map(|r| r.path).collect(),
            }
            .into())
        }
    }
}

/// Resolve the sample stored in `folder`. When `sample_id` is not given, the
/// name is derived from the forward read's filename.
pub fn resolve_sample(folder: &Path, sample_id: Option<&str>) -> Result<Sample> {
    let (forward, reverse) = find_read_pair(folder)?;
    let name = match sample_id {
        Some(id) => id.to_string(),
        None => sample_name_from_read(&forward.path).ok_or_else(|| {
            ResolveError::UnnamedSample {
                path: forward.path.clone(),
            }
        })?,
    };
    Ok(Sample::new(name, forward.path, reverse.path, folder)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs::File;

    fn touch(folder: &Path, names: &[&str]) -> Result<()> {
        for name in names {
            File::create(folder.join(name))?;
        }
        Ok(())
    }

    #[test]
    fn test_resolve_raw_sample_ignores_unrelated_files() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let folder = dir.path();
        touch(
            folder,
            &["AU1234_S0_R1_001.fastq", "AU1234_S0_R2_001.fastq", "readme.txt"],
        )?;
        std::fs::create_dir(folder.join("fastqc"))?;

        let sample = resolve_sample(folder, None)?;
        assert_eq!(
            sample,
            Sample::new(
                "AU1234",
                folder.join("AU1234_S0_R1_001.fastq"),
                folder.join("AU1234_S0_R2_001.fastq"),
                folder,
            )?
        );
        Ok(())
    }

    #[test]
    fn test_resolve_trimmed_sample() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let folder = dir.path();
        touch(
            folder,
            &[
                "PA01.forward.trimmed.paired.fastq",
                "PA01.forward.trimmed.unpaired.fastq",
                "PA01.reverse.trimmed.paired.fastq",
                "PA01.reverse.trimmed.unpaired.fastq",
                "stderr.txt",
            ],
        )?;
        let sample = resolve_sample(folder, None)?;
        assert_eq!(sample.name(), "PA01");
        assert_eq!(
            sample.forward(),
            folder.join("PA01.forward.trimmed.paired.fastq")
        );
        assert_eq!(
            sample.reverse(),
            folder.join("PA01.reverse.trimmed.paired.fastq")
        );
        Ok(())
    }

    #[test]
    fn test_explicit_sample_id() -> Result<()> {
        let dir = tempfile::tempdir()?;
        touch(dir.path(), &["x_1P.fq.gz", "x_2P.fq.gz", "x_1U.fq.gz"])?;
        let sample = resolve_sample(dir.path(), Some("isolate7"))?;
        assert_eq!(sample.name(), "isolate7");
        assert_eq!(sample.forward(), dir.path().join("x_1P.fq.gz"));
        Ok(())
    }

    #[test]
    fn test_first_candidate_is_lexicographic() -> Result<()> {
        let dir = tempfile::tempdir()?;
        touch(
            dir.path(),
            &[
                "B_S1_R1_002.fastq",
                "B_S1_R1_001.fastq",
                "B_S1_R2_002.fastq",
                "B_S1_R2_001.fastq",
            ],
        )?;
        let (forward, reverse) = find_read_pair(dir.path())?;
        assert_eq!(forward.path, dir.path().join("B_S1_R1_001.fastq"));
        assert_eq!(reverse.path, dir.path().join("B_S1_R2_001.fastq"));
        Ok(())
    }

    #[test]
    fn test_sequencer_names_win_over_trimmed_names() -> Result<()> {
        let dir = tempfile::tempdir()?;
        touch(
            dir.path(),
            &[
                "AU1234.forward.trimmed.paired.fastq",
                "AU1234.reverse.trimmed.paired.fastq",
                "AU1234_S0_R1_001.fastq",
                "AU1234_S0_R2_001.fastq",
            ],
        )?;
        let (forward, reverse) = find_read_pair(dir.path())?;
        assert_eq!(forward.path, dir.path().join("AU1234_S0_R1_001.fastq"));
        assert_eq!(reverse.path, dir.path().join("AU1234_S0_R2_001.fastq"));
        Ok(())
    }

    fn missing_sides(folder: &Path) -> Vec<ReadSide> {
        let err = resolve_sample(folder, None).unwrap_err();
        match err.downcast_ref::<ResolveError>() {
            Some(ResolveError::MissingRead { missing, .. }) => missing.clone(),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_missing_reads() -> Result<()> {
        let dir = tempfile::tempdir()?;
        assert_eq!(
            missing_sides(dir.path()),
            vec![ReadSide::Forward, ReadSide::Reverse]
        );

        touch(dir.path(), &["A_S1_R1_001.fastq"])?;
        assert_eq!(missing_sides(dir.path()), vec![ReadSide::Reverse]);
        Ok(())
    }

    #[test]
    fn test_not_a_directory() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let file = dir.path().join("A_S1_R1_001.fastq");
        touch(dir.path(), &["A_S1_R1_001.fastq"])?;
        let err = resolve_sample(&file, None).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ResolveError>(),
            Some(ResolveError::NotADirectory { .. })
        ));
        Ok(())
    }
}
