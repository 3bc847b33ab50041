use super::{arg, require_file, Tool};
use crate::errors::PreconditionFailure;
use crate::normalize::SampleInput;
use crate::outputs::{trimmed_read_path, StageOutput, TrimResult};
use parameters_toml::TrimmerParameters;
use read_pairs::ReadSide;
use std::path::Path;

/// Adapter and quality trimming of paired reads.
#[derive(Clone, Debug, Default)]
pub struct Trimmomatic {
    params: TrimmerParameters,
}

impl Trimmomatic {
    pub fn new(params: TrimmerParameters) -> Self {
        Trimmomatic {
            params: params.resolved(),
        }
    }
}

impl Tool for Trimmomatic {
    type Input = SampleInput;
    type Output = TrimResult;

    fn program(&self) -> &str {
        "trimmomatic"
    }

    fn version_args(&self) -> Vec<String> {
        vec!["-version".to_string()]
    }

    fn stage(&self) -> &'static str {
        "trim"
    }

    fn threads(&self) -> Option<usize> {
        Some(self.params.threads)
    }

    fn sample_name<'a>(&self, input: &'a SampleInput) -> &'a str {
        input.name()
    }

    fn expected(&self, folder: &Path, name: &str) -> TrimResult {
        TrimResult::expected(folder, name)
    }

    fn command(&self, input: &SampleInput, output: &TrimResult) -> Vec<String> {
        let [forward, reverse] = input.reads();
        let unpaired =
            |side: ReadSide| arg(&trimmed_read_path(output.folder(), output.name(), side, false));
        let p = &self.params;
        vec![
            self.program().to_string(),
            "PE".to_string(),
            "-phred33".to_string(),
            "-threads".to_string(),
            p.threads.to_string(),
            arg(forward),
            arg(reverse),
            arg(&output.forward),
            unpaired(ReadSide::Forward),
            arg(&output.reverse),
            unpaired(ReadSide::Reverse),
            format!("ILLUMINACLIP:{}:2:30:10", p.adapters.display()),
            format!("LEADING:{}", p.leading),
            format!("TRAILING:{}", p.trailing),
            format!("SLIDINGWINDOW:{}", p.window),
            format!("MINLEN:{}", p.minimum),
        ]
    }

    fn preconditions(&self) -> Vec<PreconditionFailure> {
        require_file("adapter file", &self.params.adapters)
            .into_iter()
            .collect()
    }

    fn completed(&self, input: &SampleInput) -> Option<TrimResult> {
        match input {
            SampleInput::Raw(_) => None,
            SampleInput::Trimmed(trimmed) => Some(trimmed.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use read_pairs::Sample;

    #[test]
    fn test_command() -> anyhow::Result<()> {
        let sample = Sample::new(
            "AU1234",
            "/raw/AU1234/AU1234_S0_R1_001.fastq",
            "/raw/AU1234/AU1234_S0_R2_001.fastq",
            "/raw/AU1234",
        )?;
        let tool = Trimmomatic::new(TrimmerParameters {
            adapters: "/share/adapters.fa".into(),
            ..TrimmerParameters::stringent()
        });
        let input = SampleInput::Raw(sample);
        let output = tool.expected(Path::new("/out/AU1234/trim"), tool.sample_name(&input));
        assert_eq!(
            tool.command(&input, &output).join(" "),
            "trimmomatic PE -phred33 -threads 8 \
             /raw/AU1234/AU1234_S0_R1_001.fastq /raw/AU1234/AU1234_S0_R2_001.fastq \
             /out/AU1234/trim/AU1234.forward.trimmed.paired.fastq \
             /out/AU1234/trim/AU1234.forward.trimmed.unpaired.fastq \
             /out/AU1234/trim/AU1234.reverse.trimmed.paired.fastq \
             /out/AU1234/trim/AU1234.reverse.trimmed.unpaired.fastq \
             ILLUMINACLIP:/share/adapters.fa:2:30:10 LEADING:20 TRAILING:20 SLIDINGWINDOW:4:15 MINLEN:70"
        );
        assert_eq!(tool.completed(&input), None);
        Ok(())
    }

    #[test]
    fn test_missing_adapters() {
        let tool = Trimmomatic::new(TrimmerParameters {
            adapters: "/nonexistent/adapters.fa".into(),
            ..TrimmerParameters::default()
        });
        assert_eq!(tool.preconditions().len(), 1);
    }
}
