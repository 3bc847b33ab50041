//! A stand-in for the command runner that records commands instead of
//! running them.

use anyhow::Result;
use bp_wrap::{CommandInvocation, ExecError, Execute, ToolNotFoundError};
use chrono::Local;
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Default)]
pub(crate) struct StubRunner {
    commands: RefCell<Vec<Vec<String>>>,
    /// Write the files each known tool would have written.
    produce_outputs: bool,
    dry_run: bool,
    /// Fail every command as if the run had been cancelled.
    cancelled: bool,
    missing_tools: Vec<String>,
}

impl StubRunner {
    pub(crate) fn producing_outputs() -> Self {
        StubRunner {
            produce_outputs: true,
            ..StubRunner::default()
        }
    }

    pub(crate) fn dry_run() -> Self {
        StubRunner {
            dry_run: true,
            ..StubRunner::default()
        }
    }

    pub(crate) fn cancelled() -> Self {
        StubRunner {
            cancelled: true,
            ..StubRunner::default()
        }
    }

    pub(crate) fn without_tool(mut self, program: &str) -> Self {
        self.missing_tools.push(program.to_string());
        self
    }

    pub(crate) fn count(&self) -> usize {
        self.commands.borrow().len()
    }

    pub(crate) fn commands(&self) -> Vec<Vec<String>> {
        self.commands.borrow().clone()
    }
}

/// The certifying files the real tool would leave in `folder`.
fn fake_outputs(args: &[String], folder: &Path) -> Vec<PathBuf> {
    let flag_value = |flag: &str| {
        args.iter()
            .position(|a| a == flag)
            .and_then(|i| args.get(i + 1))
            .cloned()
            .unwrap_or_default()
    };
    match args[0].as_str() {
        "trimmomatic" => args
            .iter()
            .map(PathBuf::from)
            .filter(|p| p.parent() == Some(folder))
            .collect(),
        "shovill" => vec![folder.join("contigs.fa")],
        "prokka" => {
            let prefix = flag_value("--prefix");
            ["gff", "gbk", "fna", "ffn"]
                .iter()
                .map(|ext| folder.join(format!("{prefix}.{ext}")))
                .collect()
        }
        "breseq" => vec![folder.join("output").join("index.html")],
        _ => Vec::new(),
    }
}

impl Execute for StubRunner {
    fn run(
        &self,
        args: &[String],
        output_folder: &Path,
        _resource_hint: Option<usize>,
    ) -> Result<CommandInvocation> {
        self.commands.borrow_mut().push(args.to_vec());
        if self.cancelled {
            return Err(ExecError::Cancelled {
                program: args[0].clone(),
            }
            .into());
        }
        if self.produce_outputs {
            for path in fake_outputs(args, output_folder) {
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(path, "")?;
            }
        }
        let now = Local::now();
        Ok(CommandInvocation {
            program: args[0].clone(),
            args: args[1..].to_vec(),
            working_dir: output_folder.to_path_buf(),
            stdout: String::new(),
            stderr: String::new(),
            start_time: now,
            end_time: now,
            exit_code: Some(0),
        })
    }

    fn probe(&self, program: &str, _version_args: &[String]) -> Result<String> {
        if self.missing_tools.iter().any(|p| p == program) {
            return Err(ToolNotFoundError {
                program: program.to_string(),
                reason: "No such file or directory".to_string(),
            }
            .into());
        }
        Ok(format!("{program} 1.0"))
    }

    fn is_dry_run(&self) -> bool {
        self.dry_run
    }
}
