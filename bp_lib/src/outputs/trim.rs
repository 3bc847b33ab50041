use super::{list_files, StageOutput};
use anyhow::{Context, Result};
use lazy_static::lazy_static;
use read_pairs::{find_read_pair, sample_name_from_read, ReadSide, ResolveError, Sample};
use regex::Regex;
use std::path::{Path, PathBuf};

lazy_static! {
    // Trimmomatic's own names for unpaired reads: `<base>_1U.fq.gz`
    static ref UNPAIRED_SUFFIX_REGEX: Regex = Regex::new(r"(?:^|[_.-])([12])U(?:[_.-]|$)").unwrap();
}

/// Reads left by the trimmer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrimResult {
    name: String,
    folder: PathBuf,
    pub forward: PathBuf,
    pub reverse: PathBuf,
    /// Reads whose mate was dropped. Not needed downstream.
    pub unpaired_forward: Option<PathBuf>,
    pub unpaired_reverse: Option<PathBuf>,
}

/// `<folder>/<name>.<side>.trimmed.<paired|unpaired>.fastq`
pub fn trimmed_read_path(folder: &Path, name: &str, side: ReadSide, paired: bool) -> PathBuf {
    let kind = if paired { "paired" } else { "unpaired" };
    folder.join(format!("{name}.{side}.trimmed.{kind}.fastq"))
}

impl TrimResult {
    pub fn expected(folder: &Path, name: &str) -> TrimResult {
        let read = |side: ReadSide, paired: bool| trimmed_read_path(folder, name, side, paired);
        TrimResult {
            name: name.to_string(),
            folder: folder.to_path_buf(),
            forward: read(ReadSide::Forward, true),
            reverse: read(ReadSide::Reverse, true),
            unpaired_forward: Some(read(ReadSide::Forward, false)),
            unpaired_reverse: Some(read(ReadSide::Reverse, false)),
        }
    }

    /// Find the trimmed reads in `folder`, named either by this pipeline or by
    /// the trimmer's defaults (`_1P`, `_2P`, `_1U`, `_2U`).
    pub fn from_folder(folder: &Path, name: Option<&str>) -> Result<TrimResult> {
        let (forward, reverse) = find_read_pair(folder)?;
        let name = match name {
            Some(name) => name.to_string(),
            None => sample_name_from_read(&forward.path).ok_or_else(|| {
                ResolveError::UnnamedSample {
                    path: forward.path.clone(),
                }
            })?,
        };

        let files = list_files(folder)?;
        Ok(TrimResult {
            name,
            folder: folder.to_path_buf(),
            forward: forward.path,
            reverse: reverse.path,
            unpaired_forward: find_unpaired(&files, ReadSide::Forward),
            unpaired_reverse: find_unpaired(&files, ReadSide::Reverse),
        })
    }

    /// The paired reads as a sample, to feed stages that take raw reads.
    pub fn as_sample(&self) -> Result<Sample> {
        Sample::new(&self.name, &self.forward, &self.reverse, &self.folder)
            .with_context(|| self.folder.display().to_string())
    }
}

fn find_unpaired(files: &[PathBuf], side: ReadSide) -> Option<PathBuf> {
    let digit = match side {
        ReadSide::Forward => "1",
        ReadSide::Reverse => "2",
    };
    files
        .iter()
        .find(|path| {
            let Some(filename) = path.file_name().and_then(|f| f.to_str()) else {
                return false;
            };
            if !read_pairs::filenames::is_read_file(filename) {
                return false;
            }
            let by_orientation =
                filename.contains("unpaired") && filename.contains(&side.to_string());
            let by_suffix = UNPAIRED_SUFFIX_REGEX
                .captures(filename)
                .map_or(false, |cap| &cap[1] == digit);
            by_orientation || by_suffix
        })
        .cloned()
}

impl StageOutput for TrimResult {
    fn name(&self) -> &str {
        &self.name
    }

    fn folder(&self) -> &Path {
        &self.folder
    }

    fn certifying(&self) -> Vec<&Path> {
        vec![&self.forward, &self.reverse]
    }
}
