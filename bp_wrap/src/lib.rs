// Warning groups (as of rust 1.55)
#![deny(
    future_incompatible,
    nonstandard_style,
    rust_2018_compatibility,
    rust_2021_compatibility,
    rust_2018_idioms
)]

// running external tools and keeping their audit trail
pub mod broker;
pub mod probe;
pub mod runner;
pub mod transcript;
pub mod utils;

pub use broker::ResourceBroker;
pub use probe::{probe_version, ToolNotFoundError};
pub use runner::{
    AuditWriteError, CommandInvocation, CommandRunner, ExecError, COMMAND_FILE, STDERR_FILE,
    STDOUT_FILE,
};
pub use transcript::Transcript;

use anyhow::Result;
use std::path::Path;

/// Runs external programs on behalf of the pipeline stages.
///
/// `CommandRunner` is the real implementation. Stages only talk to this
/// trait, so tests can count or fake invocations.
pub trait Execute {
    /// Run the argument vector `args` to completion and persist its audit
    /// files (`command.txt`, `stdout.txt`, `stderr.txt`) into `output_folder`.
    /// `resource_hint` is the number of threads the tool was told to use.
    ///
    /// The exit status of the program is recorded but is not treated as
    /// success or failure.
    fn run(
        &self,
        args: &[String],
        output_folder: &Path,
        resource_hint: Option<usize>,
    ) -> Result<CommandInvocation>;

    /// Check that `program` is installed by running it with `version_args`.
    /// Returns the reported version text.
    fn probe(&self, program: &str, version_args: &[String]) -> Result<String>;

    /// True when commands are only written to the transcript, never executed.
    fn is_dry_run(&self) -> bool {
        false
    }
}
