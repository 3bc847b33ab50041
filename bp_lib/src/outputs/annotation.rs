use super::{list_files, unique_by_extension, StageOutput};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Extensions which together certify a finished annotation.
pub const REQUIRED_EXTENSIONS: [&str; 4] = ["gff", "gbk", "fna", "ffn"];

/// Annotation files, all named `<prefix>.<ext>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnnotationResult {
    name: String,
    folder: PathBuf,
    pub gff: PathBuf,
    pub gbk: PathBuf,
    pub fna: PathBuf,
    pub ffn: PathBuf,

    pub faa: Option<PathBuf>,
    pub sqn: Option<PathBuf>,
    pub fsa: Option<PathBuf>,
    pub tbl: Option<PathBuf>,
    pub err: Option<PathBuf>,
    pub log: Option<PathBuf>,
    pub txt: Option<PathBuf>,
    pub tsv: Option<PathBuf>,
}

impl AnnotationResult {
    pub fn expected(folder: &Path, name: &str) -> AnnotationResult {
        let file = |ext: &str| folder.join(format!("{name}.{ext}"));
        AnnotationResult {
            name: name.to_string(),
            folder: folder.to_path_buf(),
            gff: file("gff"),
            gbk: file("gbk"),
            fna: file("fna"),
            ffn: file("ffn"),
            faa: Some(file("faa")),
            sqn: Some(file("sqn")),
            fsa: Some(file("fsa")),
            tbl: Some(file("tbl")),
            err: Some(file("err")),
            log: Some(file("log")),
            txt: Some(file("txt")),
            tsv: Some(file("tsv")),
        }
    }

    /// Describe an annotation folder whose prefix is unknown. Each file is
    /// found by its extension, and only when it is the sole file with it.
    /// Without a name, the prefix of the nucleotide fasta is used.
    pub fn from_folder(folder: &Path, name: Option<&str>) -> Result<AnnotationResult> {
        let files = list_files(folder)?;
        let name = match name {
            Some(name) => name.to_string(),
            None => unique_by_extension(&files, "fna")
                .and_then(|fna| fna.file_stem().map(|s| s.to_string_lossy().into_owned()))
                .with_context(|| {
                    format!("The annotation folder is incomplete: {}", folder.display())
                })?,
        };

        let expected = AnnotationResult::expected(folder, &name);
        let required = |ext: &str, default: PathBuf| unique_by_extension(&files, ext).unwrap_or(default);
        let optional = |ext: &str| unique_by_extension(&files, ext);
        Ok(AnnotationResult {
            gff: required("gff", expected.gff),
            gbk: required("gbk", expected.gbk),
            fna: required("fna", expected.fna),
            ffn: required("ffn", expected.ffn),
            faa: optional("faa"),
            sqn: optional("sqn"),
            fsa: optional("fsa"),
            tbl: optional("tbl"),
            err: optional("err"),
            log: optional("log"),
            txt: optional("txt"),
            tsv: optional("tsv"),
            name,
            folder: folder.to_path_buf(),
        })
    }
}

impl StageOutput for AnnotationResult {
    fn name(&self) -> &str {
        &self.name
    }

    fn folder(&self) -> &Path {
        &self.folder
    }

    fn certifying(&self) -> Vec<&Path> {
        vec![&self.gff, &self.gbk, &self.fna, &self.ffn]
    }
}
