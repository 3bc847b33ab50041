//! Run a chain of stages over a batch of samples.
//!
//! The whole batch is validated before anything runs. Once running, a
//! failing sample is recorded in the [`BatchReport`] and the batch moves on.

use crate::errors::{BatchValidationResult, PreconditionFailure};
use crate::normalize::SampleInput;
use crate::step::{Stage, Step};
use crate::tools::{Breseq, Prokka, Shovill, Trimmomatic};
use anyhow::{Context, Result};
use bp_wrap::{CommandRunner, ExecError, Execute, ResourceBroker, Transcript};
use log::{error, info, warn};
use parameters_toml::{Parameters, RunnerParameters};
use read_pairs::{BatchScan, SkippedFolder};
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

pub const REPORT_FILE: &str = "batch_report.json";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FailedSample {
    pub sample: String,
    pub reason: String,
}

/// What happened to every sample of a batch.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub completed: Vec<String>,
    pub failed: Vec<FailedSample>,
    /// Folders which could not be read as a sample.
    pub skipped: Vec<SkippedFolder>,
}

impl BatchReport {
    pub fn write(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path).with_context(|| path.display().to_string())?;
        serde_json::to_writer_pretty(file, self).with_context(|| path.display().to_string())?;
        Ok(())
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// A fixed sequence of stages applied to each sample in turn.
#[derive(Clone, Debug)]
pub struct Pipeline<S> {
    stages: S,
}

impl<S: Stage<SampleInput>> Pipeline<S> {
    pub fn new(stages: S) -> Self {
        Pipeline { stages }
    }

    /// Every reason the batch cannot run: missing reads of any sample,
    /// names that would leave the output folder, samples sharing a name,
    /// missing tools and shared files.
    pub fn validate(&self, samples: &[SampleInput], runner: &dyn Execute) -> BatchValidationResult {
        let mut report = BatchValidationResult::default();
        let mut names = HashSet::new();
        for sample in samples {
            for path in sample.missing_reads() {
                report.push(PreconditionFailure::MissingRead {
                    sample: sample.name().to_string(),
                    path: path.to_path_buf(),
                });
            }
            if !is_folder_name(sample.name()) {
                report.push(PreconditionFailure::InvalidSampleName {
                    sample: sample.name().to_string(),
                });
            }
            if !names.insert(sample.name()) {
                report.push(PreconditionFailure::DuplicateSample {
                    sample: sample.name().to_string(),
                });
            }
        }
        self.stages.preflight(runner, &mut report);
        report
    }

    /// Validate the batch, then run every sample into `parent/<sample name>`.
    /// The report is also written to `parent/batch_report.json`.
    pub fn run(
        &self,
        batch: BatchScan<SampleInput>,
        parent: &Path,
        runner: &dyn Execute,
    ) -> Result<BatchReport> {
        let samples = batch.resolved;
        let validation = self.validate(&samples, runner);
        for failure in &validation.failures {
            error!("{failure}");
        }
        validation.into_result()?;

        std::fs::create_dir_all(parent).with_context(|| parent.display().to_string())?;
        let mut report = BatchReport {
            skipped: batch.skipped,
            ..BatchReport::default()
        };
        let total = samples.len();
        for (index, sample) in samples.iter().enumerate() {
            let name = sample.name();
            info!("Processing sample {} of {total}: {name}", index + 1);
            match self.stages.run_sample(sample, &parent.join(name), runner) {
                Ok(_) => report.completed.push(name.to_string()),
                Err(err) => {
                    error!("Sample {name} failed: {err:#}");
                    let cancelled = matches!(
                        err.downcast_ref::<ExecError>(),
                        Some(ExecError::Cancelled { .. })
                    );
                    report.failed.push(FailedSample {
                        sample: name.to_string(),
                        reason: format!("{err:#}"),
                    });
                    if cancelled {
                        warn!("Run cancelled after {} of {total} samples", index + 1);
                        break;
                    }
                }
            }
        }

        if !runner.is_dry_run() {
            report.write(&parent.join(REPORT_FILE))?;
        }
        info!(
            "{} completed, {} failed, {} skipped",
            report.completed.len(),
            report.failed.len(),
            report.skipped.len()
        );
        Ok(report)
    }
}

/// A sample's name must be exactly one plain path component, so that its
/// output stays inside its own folder.
fn is_folder_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(first)), None) if first == name
    )
}

/// trim, assemble, annotate
pub fn assembly_pipeline(params: &Parameters) -> Pipeline<impl Stage<SampleInput>> {
    Pipeline::new(
        Step::new(Trimmomatic::new(params.trimmer.clone()))
            .then(Step::new(Shovill::new(params.assembler.clone())))
            .then(Step::new(Prokka::new(params.annotator.clone()))),
    )
}

/// trim, then call variants against `reference`
pub fn variant_pipeline(params: &Parameters, reference: &Path) -> Pipeline<impl Stage<SampleInput>> {
    Pipeline::new(
        Step::new(Trimmomatic::new(params.trimmer.clone())).then(Step::new(Breseq::new(
            reference,
            params.variant_caller.clone(),
        ))),
    )
}

/// The command runner for one pipeline run, writing its transcript to
/// `transcript`.
pub fn build_runner(params: &RunnerParameters, transcript: &Path) -> Result<CommandRunner> {
    let transcript = Transcript::open(transcript)?;
    info!("Writing commands to {}", transcript.path().display());
    let mut runner = CommandRunner::new()
        .with_transcript(Arc::new(transcript))
        .dry_run(params.dry_run);
    if params.use_broker {
        runner = runner.with_broker(ResourceBroker {
            program: params.broker.clone(),
            thread_flag: params.thread_flag.clone(),
            mem_per_cpu: params.mem_per_cpu,
        });
    }
    if let Some(seconds) = params.timeout_seconds {
        runner = runner.with_timeout(Duration::from_secs(seconds));
    }
    Ok(runner)
}

/// Where a sample's stage output lands.
pub fn stage_folder(parent: &Path, sample: &str, stage: &str) -> PathBuf {
    parent.join(sample).join(stage)
}
