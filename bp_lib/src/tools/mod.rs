//! The external programs driven by the pipelines.
//!
//! A tool is only a program name, a way to build its command line, and the
//! output it promises. Everything else (skipping finished work, the audit
//! trail, checking the outputs) is handled by [`crate::step::Step`].

mod breseq;
mod prokka;
mod shovill;
mod trimmomatic;

pub use breseq::Breseq;
pub use prokka::Prokka;
pub use shovill::Shovill;
pub use trimmomatic::Trimmomatic;

use crate::errors::PreconditionFailure;
use crate::outputs::StageOutput;
use std::path::Path;

pub trait Tool {
    type Input;
    type Output: StageOutput;

    /// The executable.
    fn program(&self) -> &str;

    /// Arguments that make the program print its version.
    fn version_args(&self) -> Vec<String> {
        vec!["--version".to_string()]
    }

    /// The subfolder of a sample folder holding this tool's output.
    fn stage(&self) -> &'static str;

    /// Threads the tool is told to use, passed on to the resource broker.
    fn threads(&self) -> Option<usize> {
        None
    }

    fn sample_name<'a>(&self, input: &'a Self::Input) -> &'a str;

    fn expected(&self, folder: &Path, name: &str) -> Self::Output;

    fn command(&self, input: &Self::Input, output: &Self::Output) -> Vec<String>;

    /// Files the tool needs for every sample, such as a reference.
    fn preconditions(&self) -> Vec<PreconditionFailure> {
        Vec::new()
    }

    /// The output, when the input already is one and nothing needs to run.
    fn completed(&self, _input: &Self::Input) -> Option<Self::Output> {
        None
    }
}

/// A path as a command line argument.
pub(crate) fn arg(path: &Path) -> String {
    path.display().to_string()
}

/// Fail unless `path` is an existing file.
pub(crate) fn require_file(what: &str, path: &Path) -> Option<PreconditionFailure> {
    (!path.is_file()).then(|| PreconditionFailure::MissingFile {
        what: what.to_string(),
        path: path.to_path_buf(),
    })
}
