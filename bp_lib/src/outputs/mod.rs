//! The artifacts each stage leaves behind.
//!
//! Every output type can be built two ways: `expected(folder, name)` computes
//! the paths a stage will write, and `from_folder(folder, name)` discovers
//! them in a folder whose naming is unknown. In both cases only the
//! certifying artifacts decide whether the stage is complete.

mod annotation;
mod assembly;
mod trim;
mod variants;

pub use annotation::{AnnotationResult, REQUIRED_EXTENSIONS};
pub use assembly::{AssemblyResult, CONTIGS_FILE};
pub use trim::{trimmed_read_path, TrimResult};
pub use variants::VariantCallResult;

use anyhow::{Context, Result};
use itertools::Itertools;
use std::path::{Path, PathBuf};

/// The declared output of one stage for one sample.
pub trait StageOutput {
    fn name(&self) -> &str;

    fn folder(&self) -> &Path;

    /// The artifacts whose presence proves the stage succeeded.
    /// Logs and other side files are never part of this set.
    fn certifying(&self) -> Vec<&Path>;

    fn exists(&self) -> bool {
        self.certifying().iter().all(|path| path.is_file())
    }

    /// The certifying artifacts that are absent.
    fn missing(&self) -> Vec<PathBuf> {
        self.certifying()
            .into_iter()
            .filter(|path| !path.is_file())
            .map(Path::to_path_buf)
            .collect()
    }
}

/// The files directly inside `folder`, sorted by name.
pub(crate) fn list_files(folder: &Path) -> Result<Vec<PathBuf>> {
    let files: Vec<PathBuf> = std::fs::read_dir(folder)
        .with_context(|| folder.display().to_string())?
        .map_ok(|entry| entry.path())
        .filter_ok(|path| path.is_file())
        .collect::<Result<_, _>>()
        .with_context(|| folder.display().to_string())?;
    Ok(files.into_iter().sorted().collect())
}

/// The only file of `files` with the extension `ext`, if exactly one exists.
pub(crate) fn unique_by_extension(files: &[PathBuf], ext: &str) -> Option<PathBuf> {
    files
        .iter()
        .filter(|path| path.extension().map_or(false, |e| e == ext))
        .exactly_one()
        .ok()
        .cloned()
}
