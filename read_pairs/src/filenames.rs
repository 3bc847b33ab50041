//! Naming conventions of paired read files.
//!
//! Three conventions are recognised, in order of precedence:
//! - the sequencer's first/second-of-pair token, e.g. `AU1234_S0_R1_001.fastq`
//! - a `forward`/`reverse` token, e.g. `PA01.forward.trimmed.paired.fastq`.
//!   Files also tagged `unpaired` are never candidates.
//! - the trimmer's default paired suffix, e.g. `PA01_1P.fastq.gz`

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

lazy_static! {
    static ref READ_FILE_REGEX: Regex =
        Regex::new(r"\.(fastq|fq)(\.gz|\.bz2|\.lz4)?$").unwrap();
    static ref PLATFORM_TOKEN_REGEX: Regex = Regex::new(r"(?:^|[_.-])R([12])(?:[_.-]|$)").unwrap();
    static ref TRIMMER_SUFFIX_REGEX: Regex = Regex::new(r"(?:^|[_.-])([12])P(?:[_.-]|$)").unwrap();
    static ref SAMPLE_NUMBER_REGEX: Regex = Regex::new(r"^S[0-9]+$").unwrap();
    static ref LANE_REGEX: Regex = Regex::new(r"^L[0-9]{3}$").unwrap();
}

const FORWARD_TOKEN: &str = "forward";
const REVERSE_TOKEN: &str = "reverse";
const UNPAIRED_TOKEN: &str = "unpaired";

/// Which mate of the pair a read file holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ReadSide {
    Forward,
    Reverse,
}

impl ReadSide {
    fn from_digit(digit: &str) -> Option<ReadSide> {
        match digit {
            "1" => Some(ReadSide::Forward),
            "2" => Some(ReadSide::Reverse),
            _ => None,
        }
    }
}

impl fmt::Display for ReadSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadSide::Forward => write!(f, "forward"),
            ReadSide::Reverse => write!(f, "reverse"),
        }
    }
}

/// The convention that identified the side of a read file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum NamingConvention {
    /// `_R1_` / `_R2_` as written by the sequencer.
    Platform,
    /// `forward` / `reverse`, as written by the manual trimming setup.
    Orientation,
    /// `_1P` / `_2P`, the trimmer's default output names.
    TrimmerSuffix,
}

/// A parsed read file.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct ReadFile {
    pub path: PathBuf,
    pub side: ReadSide,
    pub convention: NamingConvention,
}

impl ReadFile {
    /// Attempt to parse `path` as one mate of a read pair. Returns None for
    /// files that are not reads, or are reads of neither side.
    pub fn new(path: impl AsRef<Path>) -> Option<ReadFile> {
        let path = path.as_ref();
        let filename = path.file_name()?.to_str()?;
        if !is_read_file(filename) {
            return None;
        }
        let (side, convention) = classify_filename(filename)?;
        Some(ReadFile {
            path: path.to_path_buf(),
            side,
            convention,
        })
    }
}

/// True when the filename carries a recognised read extension, plain or compressed.
pub fn is_read_file(filename: &str) -> bool {
    READ_FILE_REGEX.is_match(filename)
}

fn strip_read_extension(filename: &str) -> &str {
    match READ_FILE_REGEX.find(filename) {
        Some(m) => &filename[..m.start()],
        None => filename,
    }
}

fn classify_filename(filename: &str) -> Option<(ReadSide, NamingConvention)> {
    let stem = strip_read_extension(filename);

    if let Some(cap) = PLATFORM_TOKEN_REGEX.captures(stem) {
        return ReadSide::from_digit(&cap[1]).map(|side| (side, NamingConvention::Platform));
    }

    if !stem.contains(UNPAIRED_TOKEN) {
        let forward = stem.contains(FORWARD_TOKEN);
        let reverse = stem.contains(REVERSE_TOKEN);
        match (forward, reverse) {
            (true, false) => return Some((ReadSide::Forward, NamingConvention::Orientation)),
            (false, true) => return Some((ReadSide::Reverse, NamingConvention::Orientation)),
            _ => (),
        }
    }

    let cap = TRIMMER_SUFFIX_REGEX.captures(stem)?;
    ReadSide::from_digit(&cap[1]).map(|side| (side, NamingConvention::TrimmerSuffix))
}

/// Derive the canonical sample name from the filename of one of its reads.
///
/// Sequencer names keep the tokens in front of the `R1`/`R2` token, minus the
/// sample number and lane tokens: `M64_123_S50_R1_001.fastq` gives `M64_123`.
/// Trimmed reads keep everything before the first period:
/// `PA01.forward.trimmed.paired.fastq` gives `PA01`.
pub fn sample_name_from_read(path: impl AsRef<Path>) -> Option<String> {
    let filename = path.as_ref().file_name()?.to_str()?;
    let stem = strip_read_extension(filename);

    let name = if PLATFORM_TOKEN_REGEX.is_match(stem) {
        platform_sample_name(stem)
    } else if stem.contains(FORWARD_TOKEN) || stem.contains(REVERSE_TOKEN) {
        stem.split('.').next().unwrap_or_default().to_string()
    } else if let Some(m) = TRIMMER_SUFFIX_REGEX.find(stem) {
        stem[..m.start()].to_string()
    } else {
        return None;
    };

    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

fn platform_sample_name(stem: &str) -> String {
    let tokens: Vec<&str> = stem.split('_').collect();
    let Some(pos) = tokens.iter().position(|t| *t == "R1" || *t == "R2") else {
        // The pair token is delimited by something other than '_', e.g. `A.R1.fastq`.
        return stem.split('.').next().unwrap_or_default().to_string();
    };
    let mut prefix = &tokens[..pos];
    if let Some((last, rest)) = prefix.split_last() {
        if LANE_REGEX.is_match(last) {
            prefix = rest;
        }
    }
    if let Some((last, rest)) = prefix.split_last() {
        if SAMPLE_NUMBER_REGEX.is_match(last) {
            prefix = rest;
        }
    }
    prefix.join("_")
}

/// The longest common prefix of two strings, with a trailing '.' removed.
/// Used to recover a sample name from the two read names it was run with.
pub fn longest_common_prefix(left: &str, right: &str) -> String {
    let prefix: String = left
        .chars()
        .zip(right.chars())
        .take_while(|(l, r)| l == r)
        .map(|(l, _)| l)
        .collect();
    prefix.strip_suffix('.').unwrap_or(&prefix).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const READ_FILENAMES: [&str; 6] = [
        "AU1234_S0_R1_001.fastq",
        "AU1234_S0_R2_001.fastq",
        "PA01.forward.trimmed.paired.fastq",
        "PA01.forward.trimmed.unpaired.fastq",
        "PA01.reverse.trimmed.paired.fastq",
        "PA01.reverse.trimmed.unpaired.fastq",
    ];

    fn side(filename: &str) -> Option<ReadSide> {
        ReadFile::new(filename).map(|r| r.side)
    }

    #[test]
    fn test_read_sides() {
        let sides: Vec<_> = READ_FILENAMES.iter().map(|f| side(f)).collect();
        assert_eq!(
            sides,
            vec![
                Some(ReadSide::Forward),
                Some(ReadSide::Reverse),
                Some(ReadSide::Forward),
                None,
                Some(ReadSide::Reverse),
                None,
            ]
        );
    }

    #[test]
    fn test_conventions() {
        let r = ReadFile::new("x/AU1234_S0_L001_R2_001.fastq.gz").unwrap();
        assert_eq!(r.convention, NamingConvention::Platform);
        assert_eq!(r.side, ReadSide::Reverse);

        let r = ReadFile::new("PA01_1P.fq.gz").unwrap();
        assert_eq!(r.convention, NamingConvention::TrimmerSuffix);
        assert_eq!(r.side, ReadSide::Forward);

        assert_eq!(side("PA01_1U.fq.gz"), None);
        assert_eq!(side("readme.txt"), None);
        assert_eq!(side("AU1234_S0_R1_001.bam"), None);
    }

    #[test]
    fn test_platform_token_precedes_orientation() {
        // `forward` appears in the name, but the pair token wins.
        assert_eq!(side("forward_strain_S1_R2_001.fastq"), Some(ReadSide::Reverse));
    }

    #[test]
    fn test_patterns_compile() {
        lazy_static::initialize(&READ_FILE_REGEX);
        lazy_static::initialize(&PLATFORM_TOKEN_REGEX);
        lazy_static::initialize(&TRIMMER_SUFFIX_REGEX);
        lazy_static::initialize(&SAMPLE_NUMBER_REGEX);
        lazy_static::initialize(&LANE_REGEX);
        assert!(SAMPLE_NUMBER_REGEX.is_match("S52"));
        assert!(LANE_REGEX.is_match("L001"));
        assert!(!LANE_REGEX.is_match("L01"));
    }

    #[test]
    fn test_pair_token_is_not_matched_inside_names() {
        assert_eq!(side("AR12_S1_R2_001.fastq"), Some(ReadSide::Reverse));
        assert_eq!(side("AR1.fastq"), None);
    }

    #[test]
    fn test_sample_name_from_read() {
        let names: Vec<_> = READ_FILENAMES
            .iter()
            .map(|f| sample_name_from_read(f).unwrap())
            .collect();
        assert_eq!(names, vec!["AU1234", "AU1234", "PA01", "PA01", "PA01", "PA01"]);

        assert_eq!(
            sample_name_from_read("M64_123_S50_R1_001.fastq").as_deref(),
            Some("M64_123")
        );
        assert_eq!(
            sample_name_from_read(
                "/home/lab/051919_52/630_dErm_S52_R1_001.fastq.gz"
            )
            .as_deref(),
            Some("630_dErm")
        );
        assert_eq!(
            sample_name_from_read("AB1234_R1_001.fastq").as_deref(),
            Some("AB1234")
        );
        assert_eq!(
            sample_name_from_read("AB1234_S3_L002_R1_001.fastq").as_deref(),
            Some("AB1234")
        );
        assert_eq!(sample_name_from_read("PA01_2P.fastq").as_deref(), Some("PA01"));
        assert_eq!(sample_name_from_read("notes.txt"), None);
    }

    #[test]
    fn test_longest_common_prefix() {
        assert_eq!(longest_common_prefix("PA01.forward", "PA01.reverse"), "PA01");
        assert_eq!(longest_common_prefix("abc", "xyz"), "");
    }
}
