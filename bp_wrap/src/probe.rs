use log::debug;
use std::process::Command;

/// A required external program is missing, or failed its version check.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{program} cannot be found or failed its version check: {reason}")]
pub struct ToolNotFoundError {
    pub program: String,
    pub reason: String,
}

/// Run `program version_args...` and return what it printed.
pub fn probe_version(program: &str, version_args: &[String]) -> Result<String, ToolNotFoundError> {
    debug!("Checking {program} {}", version_args.join(" "));
    let output = Command::new(program)
        .args(version_args)
        .output()
        .map_err(|err| ToolNotFoundError {
            program: program.to_string(),
            reason: crate::utils::io_error_to_string(&err),
        })?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !output.status.success() {
        return Err(ToolNotFoundError {
            program: program.to_string(),
            reason: format!("{}: {}", output.status, stderr.trim()),
        });
    }

    // Some tools report their version on stderr.
    let version = if stdout.trim().is_empty() {
        stderr.trim()
    } else {
        stdout.trim()
    };
    Ok(version.to_string())
}
