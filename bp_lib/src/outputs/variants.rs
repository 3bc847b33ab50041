use super::StageOutput;
use lazy_static::lazy_static;
use log::warn;
use regex::Regex;
use std::path::{Path, PathBuf};

lazy_static! {
    static ref CALIBRATION_REGEX: Regex =
        Regex::new(r#"href="calibration/(?P<name>.+?)[.]error_rates.pdf""#).unwrap();
}

/// The variant caller's html report.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VariantCallResult {
    name: String,
    folder: PathBuf,
    pub index: PathBuf,
    pub summary: PathBuf,
}

impl VariantCallResult {
    pub fn expected(folder: &Path, name: &str) -> VariantCallResult {
        let report = folder.join("output");
        VariantCallResult {
            name: name.to_string(),
            folder: folder.to_path_buf(),
            index: report.join("index.html"),
            summary: report.join("summary.html"),
        }
    }

    /// Without a name, the sample is recovered from the calibration plots
    /// linked in the summary, falling back to the folder name.
    pub fn from_folder(folder: &Path, name: Option<&str>) -> VariantCallResult {
        let mut result = VariantCallResult::expected(folder, name.unwrap_or_default());
        if name.is_none() {
            result.name = sample_name_from_summary(&result.summary).unwrap_or_else(|| {
                warn!(
                    "Could not extract the sample name from {}",
                    result.summary.display()
                );
                folder
                    .file_name()
                    .map(|f| f.to_string_lossy().into_owned())
                    .unwrap_or_default()
            });
        }
        result
    }
}

fn sample_name_from_summary(summary: &Path) -> Option<String> {
    let contents = std::fs::read_to_string(summary).ok()?;
    let cap = CALIBRATION_REGEX.captures(&contents)?;
    let name = cap["name"].split('.').next().unwrap_or_default();
    (!name.is_empty()).then(|| name.to_string())
}

impl StageOutput for VariantCallResult {
    fn name(&self) -> &str {
        &self.name
    }

    fn folder(&self) -> &Path {
        &self.folder
    }

    fn certifying(&self) -> Vec<&Path> {
        vec![&self.index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_index_certifies() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let out = VariantCallResult::expected(dir.path(), "PA01");
        assert_eq!(out.index, dir.path().join("output").join("index.html"));
        std::fs::create_dir(dir.path().join("output"))?;
        std::fs::write(&out.summary, "")?;
        assert!(!out.exists());
        std::fs::write(&out.index, "")?;
        assert!(out.exists());
        Ok(())
    }

    #[test]
    fn test_from_folder() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let out = VariantCallResult::from_folder(dir.path(), Some("given"));
        assert_eq!(out.name(), "given");

        std::fs::create_dir(dir.path().join("output"))?;
        std::fs::write(
            dir.path().join("output").join("summary.html"),
            r#"<a href="calibration/PA01.forward.trimmed.paired.error_rates.pdf">plot</a>"#,
        )?;
        let out = VariantCallResult::from_folder(dir.path(), None);
        assert_eq!(out.name(), "PA01");
        Ok(())
    }

    #[test]
    fn test_from_folder_falls_back_to_folder_name() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let folder = dir.path().join("AU1234");
        std::fs::create_dir(&folder)?;
        let out = VariantCallResult::from_folder(&folder, None);
        assert_eq!(out.name(), "AU1234");
        Ok(())
    }
}
