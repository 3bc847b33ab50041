// Warning groups (as of rust 1.55)
#![deny(
    future_incompatible,
    nonstandard_style,
    rust_2018_compatibility,
    rust_2021_compatibility,
    rust_2018_idioms
)]

//! Tool parameters for the pipelines, read from a `parameters.toml` file.
//!
//! Every field has a default, so a file only needs to name what it changes.
//! Values that differ from the defaults are logged as warnings.

use anyhow::{Context, Result};
use log::warn;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// The adapter file shipped with trimmomatic for TruSeq paired-end libraries.
pub const DEFAULT_ADAPTERS: &str = "TruSeq3-PE.fa";

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct TrimmerParameters {
    /// Remove leading bases below this quality.
    pub leading: usize,
    /// Remove trailing bases below this quality.
    pub trailing: usize,
    /// `<window size>:<required quality>` for the sliding window.
    pub window: String,
    /// Drop reads shorter than this.
    pub minimum: usize,
    /// Adapter sequences for ILLUMINACLIP.
    pub adapters: PathBuf,
    pub threads: usize,
    /// Overrides leading, trailing and minimum with stricter values.
    pub stringent: bool,
}

impl Default for TrimmerParameters {
    fn default() -> Self {
        TrimmerParameters {
            leading: 3,
            trailing: 3,
            window: "4:15".to_string(),
            minimum: 36,
            adapters: PathBuf::from(DEFAULT_ADAPTERS),
            threads: 8,
            stringent: false,
        }
    }
}

impl TrimmerParameters {
    /// The stricter trimming used for low quality runs.
    pub fn stringent() -> Self {
        TrimmerParameters {
            stringent: true,
            ..Self::default()
        }
        .resolved()
    }

    /// Apply the `stringent` override.
    pub fn resolved(self) -> Self {
        if self.stringent {
            TrimmerParameters {
                leading: 20,
                trailing: 20,
                minimum: 70,
                ..self
            }
        } else {
            self
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct AssemblerParameters {
    /// Minimum contig length to keep.
    pub minlen: usize,
    /// The assembler shovill drives, which also names its intermediate file.
    pub assembler: String,
    pub threads: usize,
}

impl Default for AssemblerParameters {
    fn default() -> Self {
        AssemblerParameters {
            minlen: 500,
            assembler: "spades".to_string(),
            threads: 8,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct AnnotatorParameters {
    /// The annotator executable, for installs that rename it.
    pub program: String,
    pub genus: String,
    pub species: String,
}

impl Default for AnnotatorParameters {
    fn default() -> Self {
        AnnotatorParameters {
            program: "prokka".to_string(),
            genus: "Genus".to_string(),
            species: "species".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct VariantCallerParameters {
    pub threads: usize,
    /// Call variants in polymorphism (population) mode.
    pub population: bool,
}

impl Default for VariantCallerParameters {
    fn default() -> Self {
        VariantCallerParameters {
            threads: 8,
            population: false,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct RunnerParameters {
    /// Wrap every command with the cluster resource broker.
    pub use_broker: bool,
    pub broker: String,
    pub thread_flag: String,
    /// Memory per cpu in MB, passed to the broker.
    pub mem_per_cpu: Option<usize>,
    /// Kill any single command running longer than this.
    pub timeout_seconds: Option<u64>,
    /// Write the commands to the transcript without running them.
    pub dry_run: bool,
}

impl Default for RunnerParameters {
    fn default() -> Self {
        RunnerParameters {
            use_broker: false,
            broker: "srun".to_string(),
            thread_flag: "--cpus-per-task".to_string(),
            mem_per_cpu: Some(27000),
            timeout_seconds: None,
            dry_run: false,
        }
    }
}

#[derive(Debug, Default, Deserialize, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Parameters {
    pub trimmer: TrimmerParameters,
    pub assembler: AssemblerParameters,
    pub annotator: AnnotatorParameters,
    pub variant_caller: VariantCallerParameters,
    pub runner: RunnerParameters,
}

macro_rules! warn_non_default {
    ($params:expr, $defaults:expr, $section:ident, [$($field:ident),+ $(,)?]) => {
        $(
            if $defaults.$section.$field != $params.$section.$field {
                warn!(
                    "using non-default {}.{} = {:?}",
                    stringify!($section),
                    stringify!($field),
                    $params.$section.$field
                );
            }
        )+
    };
}

impl Parameters {
    /// Parse parameters from TOML text.
    pub fn from_toml(text: &str) -> Result<Parameters> {
        let mut params: Parameters = toml::from_str(text)?;
        params.trimmer = params.trimmer.resolved();
        Ok(params)
    }

    /// Load parameters from `path`. A missing file falls back to the defaults.
    pub fn load(path: &Path) -> Result<Parameters> {
        if !path.exists() {
            warn!(
                "could not find {}, falling back to defaults",
                path.display()
            );
            return Ok(Parameters::default());
        }
        let text = std::fs::read_to_string(path).with_context(|| path.display().to_string())?;
        let params = Parameters::from_toml(&text).with_context(|| path.display().to_string())?;
        params.warn_non_default();
        Ok(params)
    }

    /// Load from `path` when given, otherwise use the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Parameters> {
        path.map_or_else(|| Ok(Parameters::default()), Parameters::load)
    }

    fn warn_non_default(&self) {
        let defaults = Parameters::default();
        warn_non_default!(
            self,
            defaults,
            trimmer,
            [leading, trailing, window, minimum, adapters, threads, stringent]
        );
        warn_non_default!(self, defaults, assembler, [minlen, assembler, threads]);
        warn_non_default!(self, defaults, annotator, [program, genus, species]);
        warn_non_default!(self, defaults, variant_caller, [threads, population]);
        warn_non_default!(
            self,
            defaults,
            runner,
            [use_broker, broker, thread_flag, mem_per_cpu, timeout_seconds, dry_run]
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let params = Parameters::from_toml("").unwrap();
        assert_eq!(params, Parameters::default());
        assert_eq!(params.trimmer.leading, 3);
        assert_eq!(params.assembler.assembler, "spades");
        assert!(!params.runner.use_broker);
    }

    #[test]
    fn test_partial_section() {
        let params = Parameters::from_toml(
            r#"
            [assembler]
            minlen = 1000

            [runner]
            timeout_seconds = 3600
            "#,
        )
        .unwrap();
        assert_eq!(params.assembler.minlen, 1000);
        assert_eq!(params.assembler.threads, 8);
        assert_eq!(params.runner.timeout_seconds, Some(3600));
        assert_eq!(params.trimmer, TrimmerParameters::default());
    }

    #[test]
    fn test_stringent() {
        let params = Parameters::from_toml("[trimmer]\nstringent = true\nleading = 5\n").unwrap();
        assert_eq!(params.trimmer.leading, 20);
        assert_eq!(params.trimmer.trailing, 20);
        assert_eq!(params.trimmer.minimum, 70);
        assert_eq!(params.trimmer.window, "4:15");
        assert_eq!(TrimmerParameters::stringent(), params.trimmer.clone());
    }

    #[test]
    fn test_unknown_field() {
        assert!(Parameters::from_toml("[trimmer]\nleadin = 5\n").is_err());
    }

    #[test]
    fn test_load() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let missing = dir.path().join("parameters.toml");
        assert_eq!(Parameters::load(&missing)?, Parameters::default());
        assert_eq!(Parameters::load_or_default(None)?, Parameters::default());

        let mut file = std::fs::File::create(&missing)?;
        writeln!(file, "[annotator]\ngenus = \"Pseudomonas\"")?;
        drop(file);
        let params = Parameters::load(&missing)?;
        assert_eq!(params.annotator.genus, "Pseudomonas");

        std::fs::write(&missing, "[annotator\n")?;
        let err = Parameters::load(&missing).unwrap_err();
        assert!(format!("{err}").contains("parameters.toml"));
        Ok(())
    }
}
