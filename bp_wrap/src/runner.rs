//! Run one external program to completion and keep its audit trail.

use crate::broker::ResourceBroker;
use crate::transcript::Transcript;
use crate::Execute;
use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Local};
use log::{debug, info};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// The argument vector, joined by single spaces.
pub const COMMAND_FILE: &str = "command.txt";
/// Captured standard output.
pub const STDOUT_FILE: &str = "stdout.txt";
/// Captured standard error.
pub const STDERR_FILE: &str = "stderr.txt";

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// The audit trail of a command could not be written.
#[derive(Debug, thiserror::Error)]
#[error("unable to write the audit trail to {}", path.display())]
pub struct AuditWriteError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// The external program could not be run to completion.
#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    #[error("failed to start {program}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("{program} was killed after running for longer than {timeout:?}")]
    TimedOut { program: String, timeout: Duration },
    #[error("{program} was killed because the run was cancelled")]
    Cancelled { program: String },
}

/// One executed command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandInvocation {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
    pub stdout: String,
    pub stderr: String,
    pub start_time: DateTime<Local>,
    pub end_time: DateTime<Local>,
    /// None when the process was killed by a signal, or never ran.
    pub exit_code: Option<i32>,
}

impl CommandInvocation {
    /// The program followed by its arguments.
    pub fn argv(&self) -> Vec<String> {
        std::iter::once(self.program.clone())
            .chain(self.args.iter().cloned())
            .collect()
    }

    pub fn duration(&self) -> Duration {
        (self.end_time - self.start_time)
            .to_std()
            .unwrap_or_default()
    }

    /// Write `command.txt`, `stdout.txt` and `stderr.txt` into the working
    /// directory.
    pub fn write_audit_files(&self) -> Result<(), AuditWriteError> {
        for (filename, contents) in [
            (COMMAND_FILE, self.argv().join(" ")),
            (STDOUT_FILE, self.stdout.clone()),
            (STDERR_FILE, self.stderr.clone()),
        ] {
            let path = self.working_dir.join(filename);
            fs::write(&path, contents).map_err(|source| AuditWriteError { path, source })?;
        }
        Ok(())
    }
}

/// Runs commands synchronously, one at a time.
///
/// Construct one per pipeline run and pass it to every stage.
#[derive(Debug, Default)]
pub struct CommandRunner {
    broker: Option<ResourceBroker>,
    transcript: Option<Arc<Transcript>>,
    timeout: Option<Duration>,
    dry_run: bool,
    cancelled: Arc<AtomicBool>,
}

impl CommandRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append every command to `transcript`.
    pub fn with_transcript(mut self, transcript: Arc<Transcript>) -> Self {
        self.transcript = Some(transcript);
        self
    }

    /// Prefix every command with `broker`.
    pub fn with_broker(mut self, broker: ResourceBroker) -> Self {
        self.broker = Some(broker);
        self
    }

    /// Kill any command running for longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Only write commands to the transcript, never execute them.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Setting the returned flag kills the running command and refuses to
    /// start any further ones.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    pub fn transcript(&self) -> Option<&Transcript> {
        self.transcript.as_deref()
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    fn build_argv(&self, args: &[String], resource_hint: Option<usize>) -> Vec<String> {
        match &self.broker {
            Some(broker) => broker.wrap(args, resource_hint),
            None => args.to_vec(),
        }
    }

    /// Wait for `child`, killing it on timeout or cancellation.
    fn wait(&self, child: &mut Child, program: &str) -> Result<Option<i32>> {
        let started = Instant::now();
        loop {
            if let Some(status) = child
                .try_wait()
                .with_context(|| format!("failed waiting on {program}"))?
            {
                return Ok(status.code());
            }
            let killed_by = if self.is_cancelled() {
                Some(ExecError::Cancelled {
                    program: program.to_string(),
                })
            } else {
                match self.timeout {
                    Some(timeout) if started.elapsed() > timeout => Some(ExecError::TimedOut {
                        program: program.to_string(),
                        timeout,
                    }),
                    _ => None,
                }
            };
            if let Some(err) = killed_by {
                kill_process_group(child);
                return Err(err.into());
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

/// Start `command` as the leader of a new process group, so that it can be
/// killed together with everything it starts.
#[cfg(unix)]
fn spawn_in_own_group(command: &mut Command) -> io::Result<Child> {
    use std::os::unix::process::CommandExt;
    command.process_group(0).spawn()
}
#[cfg(not(unix))]
fn spawn_in_own_group(command: &mut Command) -> io::Result<Child> {
    command.spawn()
}

/// Kill `child` and its descendants. Descendants keep the output pipes open,
/// so reading the output would otherwise wait for them to exit.
#[cfg(unix)]
fn kill_process_group(child: &mut Child) {
    if let Ok(pgid) = libc::pid_t::try_from(child.id()) {
        // Fails only when the whole group has exited already.
        let _ = unsafe { libc::killpg(pgid, libc::SIGKILL) };
    }
    let _ = child.kill();
    let _ = child.wait();
}
#[cfg(not(unix))]
fn kill_process_group(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

fn read_to_string_in_thread<R: Read + Send + 'static>(
    stream: Option<R>,
) -> JoinHandle<io::Result<String>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut stream) = stream {
            stream.read_to_end(&mut buf)?;
        }
        Ok(String::from_utf8_lossy(&buf).into_owned())
    })
}

fn join_reader(handle: JoinHandle<io::Result<String>>, program: &str) -> Result<String> {
    handle
        .join()
        .map_err(|_| anyhow!("output reader for {program} panicked"))?
        .with_context(|| format!("failed reading the output of {program}"))
}

impl Execute for CommandRunner {
    fn run(
        &self,
        args: &[String],
        output_folder: &Path,
        resource_hint: Option<usize>,
    ) -> Result<CommandInvocation> {
        let argv = self.build_argv(args, resource_hint);
        let Some((program, program_args)) = argv.split_first() else {
            return Err(ExecError::Spawn {
                program: String::new(),
                source: io::Error::new(io::ErrorKind::InvalidInput, "empty command"),
            }
            .into());
        };

        if !self.dry_run && !output_folder.is_dir() {
            return Err(AuditWriteError {
                path: output_folder.to_path_buf(),
                source: io::Error::new(io::ErrorKind::NotFound, "output folder does not exist"),
            }
            .into());
        }
        if self.is_cancelled() {
            return Err(ExecError::Cancelled {
                program: program.clone(),
            }
            .into());
        }

        if let Some(transcript) = &self.transcript {
            transcript.append_command(&argv)?;
        }
        info!("Running {}", argv.join(" "));

        let start_time = Local::now();
        if self.dry_run {
            return Ok(CommandInvocation {
                program: program.clone(),
                args: program_args.to_vec(),
                working_dir: output_folder.to_path_buf(),
                stdout: String::new(),
                stderr: String::new(),
                start_time,
                end_time: start_time,
                exit_code: None,
            });
        }

        let mut child = spawn_in_own_group(
            Command::new(program)
                .args(program_args)
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped()),
        )
        .map_err(|source| ExecError::Spawn {
                program: program.clone(),
                source,
            })?;
        let stdout_reader = read_to_string_in_thread(child.stdout.take());
        let stderr_reader = read_to_string_in_thread(child.stderr.take());

        let waited = self.wait(&mut child, program);
        let invocation = CommandInvocation {
            program: program.clone(),
            args: program_args.to_vec(),
            working_dir: output_folder.to_path_buf(),
            stdout: join_reader(stdout_reader, program)?,
            stderr: join_reader(stderr_reader, program)?,
            start_time,
            end_time: Local::now(),
            exit_code: waited.as_ref().ok().copied().flatten(),
        };

        // A killed command still leaves its audit trail behind.
        invocation.write_audit_files()?;
        if let Some(transcript) = &self.transcript {
            transcript.append_comment(&format!(
                "Duration: {:.2} seconds.",
                invocation.duration().as_secs_f64()
            ))?;
            transcript.append_line("")?;
        }
        debug!(
            "{program} exited with {:?} after {:.2} seconds",
            invocation.exit_code,
            invocation.duration().as_secs_f64()
        );

        waited?;
        Ok(invocation)
    }

    fn probe(&self, program: &str, version_args: &[String]) -> Result<String> {
        Ok(crate::probe_version(program, version_args)?)
    }

    fn is_dry_run(&self) -> bool {
        self.dry_run
    }
}
