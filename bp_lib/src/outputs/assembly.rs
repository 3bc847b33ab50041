use super::{list_files, StageOutput};
use anyhow::{bail, Context, Result};
use read_pairs::filenames::longest_common_prefix;
use std::path::{Path, PathBuf};

pub const CONTIGS_FILE: &str = "contigs.fa";
const GRAPH_FILE: &str = "contigs.gfa";
const CORRECTIONS_FILE: &str = "shovill.corrections";
const LOG_FILE: &str = "shovill.log";
const DEFAULT_ASSEMBLER: &str = "spades";

/// Contigs from the assembler.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssemblyResult {
    name: String,
    folder: PathBuf,
    pub contigs: PathBuf,
    pub contigs_gfa: PathBuf,
    /// The unpolished contigs of the underlying assembler, `<assembler>.fasta`.
    pub intermediate: PathBuf,
    pub corrections: PathBuf,
}

impl AssemblyResult {
    pub fn expected(folder: &Path, name: &str, assembler: &str) -> AssemblyResult {
        AssemblyResult {
            name: name.to_string(),
            folder: folder.to_path_buf(),
            contigs: folder.join(CONTIGS_FILE),
            contigs_gfa: folder.join(GRAPH_FILE),
            intermediate: folder.join(format!("{assembler}.fasta")),
            corrections: folder.join(CORRECTIONS_FILE),
        }
    }

    /// Describe an existing assembly folder. Without a name, the sample name
    /// is recovered from the read names recorded in the assembler log.
    pub fn from_folder(folder: &Path, name: Option<&str>) -> Result<AssemblyResult> {
        let intermediate = list_files(folder)?
            .into_iter()
            .find(|path| path.extension().map_or(false, |ext| ext == "fasta"));
        let name = match name {
            Some(name) => name.to_string(),
            None => sample_name_from_log(&folder.join(LOG_FILE))?,
        };
        let mut result = AssemblyResult::expected(folder, &name, DEFAULT_ASSEMBLER);
        if let Some(intermediate) = intermediate {
            result.intermediate = intermediate;
        }
        Ok(result)
    }
}

/// The second line of the log is the command line; the sample name is the
/// common prefix of the `--R1` and `--R2` read names.
fn sample_name_from_log(log: &Path) -> Result<String> {
    let contents = std::fs::read_to_string(log).with_context(|| log.display().to_string())?;
    let Some(command) = contents.lines().nth(1) else {
        bail!("{} does not record the assembler command", log.display());
    };
    let args: Vec<&str> = command.split_whitespace().collect();
    let read_stem = |flag: &str| -> Result<String> {
        let value = args
            .iter()
            .position(|arg| *arg == flag)
            .and_then(|i| args.get(i + 1))
            .with_context(|| format!("{} has no {flag} argument", log.display()))?;
        Ok(Path::new(value)
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default())
    };
    let name = longest_common_prefix(&read_stem("--R1")?, &read_stem("--R2")?);
    if name.is_empty() {
        bail!("the reads in {} share no common name", log.display());
    }
    Ok(name)
}

impl StageOutput for AssemblyResult {
    fn name(&self) -> &str {
        &self.name
    }

    fn folder(&self) -> &Path {
        &self.folder
    }

    fn certifying(&self) -> Vec<&Path> {
        vec![&self.contigs]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SHOVILL_LOG: &str = "\
[shovill] Hello cld100
[shovill] You ran: /opt/shovill/bin/shovill --minlen 500 --assembler spades --outdir /data/PA01/assemble --R1 /data/PA01/trim/PA01.forward.trimmed.paired.fastq --R2 /data/PA01/trim/PA01.reverse.trimmed.paired.fastq --force --cpus 8
[shovill] This is shovill 1.0.4
";

    #[test]
    fn test_only_contigs_certify() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let out = AssemblyResult::expected(dir.path(), "PA01", "skesa");
        assert_eq!(out.intermediate, dir.path().join("skesa.fasta"));
        std::fs::write(&out.contigs_gfa, "")?;
        std::fs::write(&out.intermediate, "")?;
        assert!(!out.exists());
        std::fs::write(&out.contigs, ">contig00001\n")?;
        assert!(out.exists());
        Ok(())
    }

    #[test]
    fn test_from_folder_reads_log() -> Result<()> {
        let dir = tempfile::tempdir()?;
        std::fs::write(dir.path().join(LOG_FILE), SHOVILL_LOG)?;
        std::fs::write(dir.path().join(CONTIGS_FILE), "")?;
        std::fs::write(dir.path().join("megahit.fasta"), "")?;

        let out = AssemblyResult::from_folder(dir.path(), None)?;
        assert_eq!(out.name(), "PA01");
        assert_eq!(out.intermediate, dir.path().join("megahit.fasta"));
        assert!(out.exists());

        let named = AssemblyResult::from_folder(dir.path(), Some("other"))?;
        assert_eq!(named.name(), "other");
        Ok(())
    }

    #[test]
    fn test_from_folder_without_log() -> Result<()> {
        let dir = tempfile::tempdir()?;
        assert!(AssemblyResult::from_folder(dir.path(), None).is_err());
        std::fs::write(dir.path().join(LOG_FILE), "[shovill] Hello\n")?;
        assert!(AssemblyResult::from_folder(dir.path(), None).is_err());
        Ok(())
    }
}
