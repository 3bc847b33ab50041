use super::{arg, Tool};
use crate::outputs::{AssemblyResult, StageOutput, TrimResult};
use parameters_toml::AssemblerParameters;
use std::path::Path;

/// De novo assembly of trimmed reads, with polishing.
#[derive(Clone, Debug, Default)]
pub struct Shovill {
    params: AssemblerParameters,
}

impl Shovill {
    pub fn new(params: AssemblerParameters) -> Self {
        Shovill { params }
    }
}

impl Tool for Shovill {
    type Input = TrimResult;
    type Output = AssemblyResult;

    fn program(&self) -> &str {
        "shovill"
    }

    fn stage(&self) -> &'static str {
        "assemble"
    }

    fn threads(&self) -> Option<usize> {
        Some(self.params.threads)
    }

    fn sample_name<'a>(&self, input: &'a TrimResult) -> &'a str {
        input.name()
    }

    fn expected(&self, folder: &Path, name: &str) -> AssemblyResult {
        AssemblyResult::expected(folder, name, &self.params.assembler)
    }

    fn command(&self, input: &TrimResult, output: &AssemblyResult) -> Vec<String> {
        vec![
            self.program().to_string(),
            "--minlen".to_string(),
            self.params.minlen.to_string(),
            "--assembler".to_string(),
            self.params.assembler.clone(),
            "--outdir".to_string(),
            arg(output.folder()),
            "--R1".to_string(),
            arg(&input.forward),
            "--R2".to_string(),
            arg(&input.reverse),
            // The stage folder exists before shovill starts.
            "--force".to_string(),
            "--cpus".to_string(),
            self.params.threads.to_string(),
        ]
    }
}
