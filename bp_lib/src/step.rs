//! Idempotent stages, and chaining them into a per-sample pipeline.

use crate::errors::{BatchValidationResult, StageIncompleteError};
use crate::outputs::StageOutput;
use crate::tools::Tool;
use anyhow::{Context, Result};
use bp_wrap::{Execute, ToolNotFoundError};
use log::{debug, info};
use std::path::Path;

/// One tool run at most once per output folder.
#[derive(Clone, Debug, Default)]
pub struct Step<T> {
    tool: T,
}

impl<T: Tool> Step<T> {
    pub fn new(tool: T) -> Self {
        Step { tool }
    }

    pub fn tool(&self) -> &T {
        &self.tool
    }

    /// Produce the tool's output for `input` in `output_folder`.
    ///
    /// Nothing is run when the output already exists. After running, the
    /// output must exist or a `StageIncompleteError` is raised; the exit
    /// status of the tool is not consulted.
    pub fn run(
        &self,
        input: &T::Input,
        output_folder: &Path,
        runner: &dyn Execute,
    ) -> Result<T::Output> {
        let program = self.tool.program();
        if let Some(done) = self.tool.completed(input) {
            info!(
                "{program} for sample {}: input is already processed",
                done.name()
            );
            return Ok(done);
        }

        let name = self.tool.sample_name(input);
        let expected = self.tool.expected(output_folder, name);
        if expected.exists() {
            info!("{program} for sample {name} skipped, already complete");
            return Ok(expected);
        }

        if !runner.is_dry_run() {
            std::fs::create_dir_all(output_folder)
                .with_context(|| output_folder.display().to_string())?;
        }
        let command = self.tool.command(input, &expected);
        runner
            .run(&command, output_folder, self.tool.threads())
            .with_context(|| format!("{program} failed for sample {name}"))?;

        if !runner.is_dry_run() {
            let missing = expected.missing();
            if !missing.is_empty() {
                return Err(StageIncompleteError {
                    stage: program.to_string(),
                    sample: name.to_string(),
                    missing,
                }
                .into());
            }
        }
        Ok(expected)
    }

    /// Check the tool is installed, and everything it needs is present.
    pub fn check(&self, runner: &dyn Execute, report: &mut BatchValidationResult) {
        let program = self.tool.program();
        if runner.is_dry_run() {
            debug!("dry run: not checking for {program}");
        } else {
            match runner.probe(program, &self.tool.version_args()) {
                Ok(version) => info!("Found {program}: {version}"),
                Err(err) => match err.downcast::<ToolNotFoundError>() {
                    Ok(err) => report.push(err),
                    Err(err) => report.push(ToolNotFoundError {
                        program: program.to_string(),
                        reason: format!("{err:#}"),
                    }),
                },
            }
        }
        for failure in self.tool.preconditions() {
            report.push(failure);
        }
    }
}

/// A unit of per-sample work taking an `I`.
pub trait Stage<I> {
    type Output;

    /// Run on one sample. `sample_folder` is the sample's own folder.
    fn run_sample(&self, input: &I, sample_folder: &Path, runner: &dyn Execute)
        -> Result<Self::Output>;

    /// Record every problem that would stop this stage, for any sample.
    fn preflight(&self, runner: &dyn Execute, report: &mut BatchValidationResult);

    /// Feed the output of this stage into `next`.
    fn then<S>(self, next: S) -> Chain<Self, S>
    where
        Self: Sized,
        S: Stage<Self::Output>,
    {
        Chain { first: self, next }
    }
}

impl<T: Tool> Stage<T::Input> for Step<T> {
    type Output = T::Output;

    fn run_sample(
        &self,
        input: &T::Input,
        sample_folder: &Path,
        runner: &dyn Execute,
    ) -> Result<T::Output> {
        self.run(input, &sample_folder.join(self.tool.stage()), runner)
    }

    fn preflight(&self, runner: &dyn Execute, report: &mut BatchValidationResult) {
        self.check(runner, report);
    }
}

/// Two stages run one after the other.
#[derive(Clone, Debug)]
pub struct Chain<A, B> {
    first: A,
    next: B,
}

impl<I, A, B> Stage<I> for Chain<A, B>
where
    A: Stage<I>,
    B: Stage<A::Output>,
{
    type Output = B::Output;

    fn run_sample(&self, input: &I, sample_folder: &Path, runner: &dyn Execute) -> Result<B::Output> {
        let intermediate = self.first.run_sample(input, sample_folder, runner)?;
        self.next.run_sample(&intermediate, sample_folder, runner)
    }

    fn preflight(&self, runner: &dyn Execute, report: &mut BatchValidationResult) {
        self.first.preflight(runner, report);
        self.next.preflight(runner, report);
    }
}
