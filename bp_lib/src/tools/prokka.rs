use super::{arg, Tool};
use crate::outputs::{AnnotationResult, AssemblyResult, StageOutput};
use parameters_toml::AnnotatorParameters;
use std::path::Path;

/// Genome annotation of an assembly.
#[derive(Clone, Debug, Default)]
pub struct Prokka {
    params: AnnotatorParameters,
}

impl Prokka {
    pub fn new(params: AnnotatorParameters) -> Self {
        Prokka { params }
    }
}

impl Tool for Prokka {
    type Input = AssemblyResult;
    type Output = AnnotationResult;

    fn program(&self) -> &str {
        &self.params.program
    }

    fn stage(&self) -> &'static str {
        "annotate"
    }

    fn sample_name<'a>(&self, input: &'a AssemblyResult) -> &'a str {
        input.name()
    }

    fn expected(&self, folder: &Path, name: &str) -> AnnotationResult {
        AnnotationResult::expected(folder, name)
    }

    fn command(&self, input: &AssemblyResult, output: &AnnotationResult) -> Vec<String> {
        vec![
            self.program().to_string(),
            "--outdir".to_string(),
            arg(output.folder()),
            "--prefix".to_string(),
            output.name().to_string(),
            "--genus".to_string(),
            self.params.genus.clone(),
            "--species".to_string(),
            self.params.species.clone(),
            "--force".to_string(),
            arg(&input.contigs),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parameters_toml::AnnotatorParameters;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_command() {
        let tool = Prokka::new(AnnotatorParameters {
            genus: "Pseudomonas".to_string(),
            species: "aeruginosa".to_string(),
            ..AnnotatorParameters::default()
        });
        let assembly = AssemblyResult::expected(Path::new("/out/PA01/assemble"), "PA01", "spades");
        let output = tool.expected(Path::new("/out/PA01/annotate"), tool.sample_name(&assembly));
        assert_eq!(output.gff, Path::new("/out/PA01/annotate/PA01.gff"));
        assert_eq!(
            tool.command(&assembly, &output).join(" "),
            "prokka --outdir /out/PA01/annotate --prefix PA01 --genus Pseudomonas \
             --species aeruginosa --force /out/PA01/assemble/contigs.fa"
        );
    }
}
