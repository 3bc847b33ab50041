//! Guess which stage produced an existing folder.
//!
//! Folders are recognised by file name signatures. The signatures overlap
//! (a polished assembly also holds the plain assembler's contigs file), so
//! the rules are tried in order and the first match wins.

use crate::errors::UnclassifiableFolderError;
use crate::outputs::{CONTIGS_FILE, REQUIRED_EXTENSIONS};
use anyhow::{Context, Result};
use lazy_static::lazy_static;
use read_pairs::{NamingConvention, ReadFile, ReadSide};
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::path::Path;

lazy_static! {
    // Trimmomatic's default output names: `<base>_1P.fq.gz`, `<base>_2U.fq.gz`, ...
    static ref TRIMMER_DEFAULT_REGEX: Regex = Regex::new(r"[12][PU]\.").unwrap();
}

/// Assemblers whose unpolished contigs sit next to the polished ones.
const INTERMEDIATE_ASSEMBLERS: [&str; 4] = ["spades", "skesa", "megahit", "velvet"];
const MANUAL_TRIMMED_TOKEN: &str = "forward.trimmed.paired";
const REPORT_INDEX: &str = "output/index.html";
const GENBANK_PREFIX: &str = "GCA_";
const REFSEQ_PREFIX: &str = "GCF_";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum StageTag {
    RawReads,
    TrimmedReads,
    PolishedAssembly,
    Assembly,
    VariantCalls,
    Annotation,
    GenbankReference,
    RefseqReference,
}

impl fmt::Display for StageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StageTag::RawReads => "raw reads",
            StageTag::TrimmedReads => "trimmed reads",
            StageTag::PolishedAssembly => "a polished assembly",
            StageTag::Assembly => "an assembly",
            StageTag::VariantCalls => "variant calls",
            StageTag::Annotation => "an annotation",
            StageTag::GenbankReference => "a GenBank reference",
            StageTag::RefseqReference => "a RefSeq reference",
        })
    }
}

/// The names in a folder, read once so the rules are pure functions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FolderListing {
    /// Regular files directly in the folder.
    pub files: Vec<String>,
    /// Subfolders directly in the folder.
    pub folders: Vec<String>,
    /// Files one level down, as `subfolder/name`.
    pub nested: Vec<String>,
}

impl FolderListing {
    pub fn read(folder: &Path) -> Result<FolderListing> {
        let mut listing = FolderListing::default();
        for entry in std::fs::read_dir(folder).with_context(|| folder.display().to_string())? {
            let entry = entry.with_context(|| folder.display().to_string())?;
            let name = entry.file_name().to_string_lossy().into_owned();
            let path = entry.path();
            if path.is_dir() {
                for inner in std::fs::read_dir(&path).with_context(|| path.display().to_string())? {
                    let inner = inner.with_context(|| path.display().to_string())?;
                    if inner.path().is_file() {
                        listing
                            .nested
                            .push(format!("{name}/{}", inner.file_name().to_string_lossy()));
                    }
                }
                listing.folders.push(name);
            } else if path.is_file() {
                listing.files.push(name);
            }
        }
        listing.files.sort();
        listing.folders.sort();
        listing.nested.sort();
        Ok(listing)
    }

    fn has_file(&self, name: &str) -> bool {
        self.files.iter().any(|f| f == name)
    }

    fn entries(&self) -> impl Iterator<Item = &String> {
        self.files.iter().chain(&self.folders)
    }
}

pub type Rule = fn(&FolderListing) -> bool;

/// The signatures, most specific first.
pub const RULES: [(StageTag, Rule); 8] = [
    (StageTag::RawReads, is_raw_reads),
    (StageTag::TrimmedReads, is_trimmed_reads),
    (StageTag::PolishedAssembly, is_polished_assembly),
    (StageTag::Assembly, is_assembly),
    (StageTag::VariantCalls, is_variant_calls),
    (StageTag::Annotation, is_annotation),
    (StageTag::GenbankReference, is_genbank_reference),
    (StageTag::RefseqReference, is_refseq_reference),
];

/// A forward read named by the sequencer.
fn is_raw_reads(listing: &FolderListing) -> bool {
    listing.files.iter().any(|name| {
        ReadFile::new(name).map_or(false, |read| {
            read.convention == NamingConvention::Platform && read.side == ReadSide::Forward
        })
    })
}

fn is_trimmed_reads(listing: &FolderListing) -> bool {
    let default_names = listing
        .files
        .iter()
        .filter(|name| TRIMMER_DEFAULT_REGEX.is_match(name))
        .count();
    default_names == 4
        || listing
            .files
            .iter()
            .any(|name| name.contains(MANUAL_TRIMMED_TOKEN))
}

fn is_polished_assembly(listing: &FolderListing) -> bool {
    is_assembly(listing)
        && INTERMEDIATE_ASSEMBLERS
            .iter()
            .any(|assembler| listing.has_file(&format!("{assembler}.fasta")))
}

fn is_assembly(listing: &FolderListing) -> bool {
    listing.has_file(CONTIGS_FILE)
}

fn is_variant_calls(listing: &FolderListing) -> bool {
    listing.nested.iter().any(|name| name == REPORT_INDEX)
}

fn is_annotation(listing: &FolderListing) -> bool {
    REQUIRED_EXTENSIONS.iter().all(|ext| {
        listing
            .files
            .iter()
            .any(|name| Path::new(name).extension().map_or(false, |e| e == *ext))
    })
}

fn is_genbank_reference(listing: &FolderListing) -> bool {
    listing.entries().any(|name| name.starts_with(GENBANK_PREFIX))
}

fn is_refseq_reference(listing: &FolderListing) -> bool {
    listing.entries().any(|name| name.starts_with(REFSEQ_PREFIX))
}

/// The first rule matching `listing`.
pub fn classify_listing(listing: &FolderListing) -> Option<StageTag> {
    RULES
        .iter()
        .find(|(_, rule)| rule(listing))
        .map(|(tag, _)| *tag)
}

/// Classify the contents of `folder`. An unrecognised folder is an
/// `UnclassifiableFolderError` when `strict`, and `None` otherwise.
pub fn classify(folder: &Path, strict: bool) -> Result<Option<StageTag>> {
    let tag = classify_listing(&FolderListing::read(folder)?);
    if tag.is_none() && strict {
        return Err(UnclassifiableFolderError {
            folder: folder.to_path_buf(),
        }
        .into());
    }
    Ok(tag)
}
