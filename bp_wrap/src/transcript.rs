//! The append-only transcript of every command run by a pipeline.
//!
//! Each command is written as one shell-escaped line, followed by a comment
//! holding its duration, so the file can be replayed with `sh`.

use crate::runner::AuditWriteError;
use shell_escape::escape;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// Default transcript filename when a folder is given.
pub const TRANSCRIPT_FILE: &str = "commands.sh";

#[derive(Debug)]
pub struct Transcript {
    path: PathBuf,
    // Writes are serialised so stages may share one transcript.
    file: Mutex<File>,
}

impl Transcript {
    /// Open `path` for appending, creating it when absent. When `path` is an
    /// existing folder the transcript is `path/commands.sh`.
    pub fn open(path: impl AsRef<Path>) -> Result<Transcript, AuditWriteError> {
        let path = path.as_ref();
        let path = if path.is_dir() {
            path.join(TRANSCRIPT_FILE)
        } else {
            path.to_path_buf()
        };
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| AuditWriteError {
                path: path.clone(),
                source,
            })?;
        Ok(Transcript {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append the command line `argv`.
    pub fn append_command(&self, argv: &[String]) -> Result<(), AuditWriteError> {
        let line: Vec<_> = argv.iter().map(|a| escape(a.as_str().into())).collect();
        self.append_line(&line.join(" "))
    }

    /// Append `# comment`.
    pub fn append_comment(&self, comment: &str) -> Result<(), AuditWriteError> {
        self.append_line(&format!("# {comment}"))
    }

    pub fn append_line(&self, line: &str) -> Result<(), AuditWriteError> {
        let mut file = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        writeln!(file, "{line}")
            .and_then(|()| file.flush())
            .map_err(|source| AuditWriteError {
                path: self.path.clone(),
                source,
            })
    }
}
