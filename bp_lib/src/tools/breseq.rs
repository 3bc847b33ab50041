use super::{arg, require_file, Tool};
use crate::errors::PreconditionFailure;
use crate::outputs::{StageOutput, TrimResult, VariantCallResult};
use parameters_toml::VariantCallerParameters;
use std::path::{Path, PathBuf};

/// Variant calls of trimmed reads against a shared reference.
#[derive(Clone, Debug)]
pub struct Breseq {
    reference: PathBuf,
    params: VariantCallerParameters,
}

impl Breseq {
    pub fn new(reference: impl Into<PathBuf>, params: VariantCallerParameters) -> Self {
        Breseq {
            reference: reference.into(),
            params,
        }
    }

    pub fn reference(&self) -> &Path {
        &self.reference
    }
}

impl Tool for Breseq {
    type Input = TrimResult;
    type Output = VariantCallResult;

    fn program(&self) -> &str {
        "breseq"
    }

    fn stage(&self) -> &'static str {
        "variantcall"
    }

    fn threads(&self) -> Option<usize> {
        Some(self.params.threads)
    }

    fn sample_name<'a>(&self, input: &'a TrimResult) -> &'a str {
        input.name()
    }

    fn expected(&self, folder: &Path, name: &str) -> VariantCallResult {
        VariantCallResult::expected(folder, name)
    }

    fn command(&self, input: &TrimResult, output: &VariantCallResult) -> Vec<String> {
        let mut command = vec![self.program().to_string()];
        if self.params.population {
            command.push("-p".to_string());
        }
        command.extend([
            "-j".to_string(),
            self.params.threads.to_string(),
            "-o".to_string(),
            arg(output.folder()),
            "-r".to_string(),
            arg(&self.reference),
            arg(&input.forward),
            arg(&input.reverse),
        ]);
        command
    }

    fn preconditions(&self) -> Vec<PreconditionFailure> {
        require_file("reference", &self.reference)
            .into_iter()
            .collect()
    }
}
