use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::ScanSettings;
use crate::utils::truncation::truncate_command;
use super::buffer::OutputBuffer;
use super::signal;

/// A program and its arguments. Executed directly, never through a shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Printable form for log fields.
    pub fn display(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

/// Result of one invocation. Always produced, whatever happened to the child.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProcessOutput {
    /// Combined stdout and stderr, lossily decoded.
    pub output: String,
    /// The child exited on its own before the deadline.
    pub completed: bool,
    pub exit_code: Option<i32>,
    pub truncated: bool,
    pub duration_ms: u64,
}

/// Runs one external capability invocation to completion or deadline.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn execute(&self, spec: &CommandSpec, timeout: Duration) -> ProcessOutput;
}

enum Outcome {
    Exited(Option<i32>),
    WaitFailed,
    TimedOut,
    Cancelled,
}

pub struct ProcessRunner {
    extra_path: Vec<PathBuf>,
    kill_grace: Duration,
    output_limit: usize,
    shutdown: CancellationToken,
}

impl ProcessRunner {
    pub fn new(settings: &ScanSettings, shutdown: CancellationToken) -> Self {
        Self {
            extra_path: settings.extra_path.clone(),
            kill_grace: settings.kill_grace,
            output_limit: settings.output_limit_bytes,
            shutdown,
        }
    }

    pub fn with_kill_grace(mut self, grace: Duration) -> Self {
        self.kill_grace = grace;
        self
    }

    /// `PATH` with the configured tool directories in front, if any.
    fn search_path(&self) -> Option<OsString> {
        if self.extra_path.is_empty() {
            return None;
        }
        let current = std::env::var_os("PATH").unwrap_or_default();
        let dirs = self
            .extra_path
            .iter()
            .cloned()
            .chain(std::env::split_paths(&current));
        std::env::join_paths(dirs).ok()
    }

    fn build_command(&self, spec: &CommandSpec) -> Command {
        let mut command = Command::new(&spec.program);
        command
            .args(&spec.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(path) = self.search_path() {
            command.env("PATH", path);
        }
        #[cfg(unix)]
        command.process_group(0);
        command
    }

    /// SIGTERM, wait out the grace window, then SIGKILL. Never waits past
    /// the grace window.
    async fn terminate(&self, child: &mut Child) {
        signal::graceful_terminate(child);
        match tokio::time::timeout(self.kill_grace, child.wait()).await {
            Ok(_) => debug!("Child exited after graceful termination"),
            Err(_) => {
                warn!(grace_ms = self.kill_grace.as_millis() as u64, "Child ignored termination, killing");
                signal::force_terminate(child);
            }
        }
    }
}

async fn drain<R>(reader: Option<R>, buffer: &Mutex<OutputBuffer>)
where
    R: AsyncRead + Unpin,
{
    let Some(mut reader) = reader else { return };
    let mut chunk = [0u8; 8192];
    loop {
        match reader.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => buffer.lock().await.push(&chunk[..n]),
            Err(e) => {
                debug!(error = %e, "Output stream closed");
                break;
            }
        }
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn execute(&self, spec: &CommandSpec, timeout: Duration) -> ProcessOutput {
        let started = Instant::now();
        let line = spec.display();
        debug!(command = %truncate_command(&line), timeout_secs = timeout.as_secs(), "Executing tool");

        let mut child = match self.build_command(spec).spawn() {
            Ok(child) => child,
            Err(e) => {
                warn!(program = %spec.program, error = %e, "Failed to launch tool");
                return ProcessOutput {
                    duration_ms: started.elapsed().as_millis() as u64,
                    ..Default::default()
                };
            }
        };

        let buffer = Mutex::new(OutputBuffer::new(self.output_limit));
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let outcome = {
            let run = async {
                let (_, _, status) =
                    tokio::join!(drain(stdout, &buffer), drain(stderr, &buffer), child.wait());
                status
            };
            tokio::select! {
                res = tokio::time::timeout(timeout, run) => match res {
                    Ok(Ok(status)) => Outcome::Exited(status.code()),
                    Ok(Err(e)) => {
                        warn!(program = %spec.program, error = %e, "Failed waiting on tool");
                        Outcome::WaitFailed
                    }
                    Err(_) => Outcome::TimedOut,
                },
                _ = self.shutdown.cancelled() => Outcome::Cancelled,
            }
        };

        let (completed, exit_code) = match outcome {
            Outcome::Exited(code) => (true, code),
            Outcome::WaitFailed => {
                self.terminate(&mut child).await;
                (false, None)
            }
            Outcome::TimedOut => {
                warn!(
                    command = %truncate_command(&line),
                    timeout_secs = timeout.as_secs(),
                    "Tool timed out, terminating"
                );
                self.terminate(&mut child).await;
                (false, None)
            }
            Outcome::Cancelled => {
                warn!(command = %truncate_command(&line), "Shutdown requested, terminating tool");
                self.terminate(&mut child).await;
                (false, None)
            }
        };

        let buffer = buffer.into_inner();
        ProcessOutput {
            output: buffer.to_text(),
            completed,
            exit_code,
            truncated: buffer.is_truncated(),
            duration_ms: started.elapsed().as_millis() as u64,
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn runner() -> ProcessRunner {
        ProcessRunner {
            extra_path: Vec::new(),
            kill_grace: Duration::from_millis(500),
            output_limit: 1024,
            shutdown: CancellationToken::new(),
        }
    }

    fn sh(script: &str) -> CommandSpec {
        CommandSpec::new("sh", ["-c", script])
    }

    #[test]
    fn test_command_spec_display() {
        let spec = CommandSpec::new("nmap", ["-A", "-Pn", "example.com"]);
        assert_eq!(spec.display(), "nmap -A -Pn example.com");
    }

    #[tokio::test]
    async fn test_captures_stdout_and_stderr() {
        let out = runner()
            .execute(&sh("echo out; echo err 1>&2"), Duration::from_secs(5))
            .await;
        assert!(out.completed);
        assert_eq!(out.exit_code, Some(0));
        assert!(out.output.contains("out"));
        assert!(out.output.contains("err"));
    }

    #[tokio::test]
    async fn test_nonzero_exit_still_completed() {
        let out = runner().execute(&sh("exit 3"), Duration::from_secs(5)).await;
        assert!(out.completed);
        assert_eq!(out.exit_code, Some(3));
    }

    #[tokio::test]
    async fn test_missing_program_never_raises() {
        let spec = CommandSpec::new("definitely-not-a-real-tool-xyz", Vec::<String>::new());
        let out = runner().execute(&spec, Duration::from_secs(1)).await;
        assert!(!out.completed);
        assert!(out.output.is_empty());
        assert_eq!(out.exit_code, None);
    }

    #[tokio::test]
    async fn test_timeout_keeps_partial_output() {
        let started = Instant::now();
        let out = runner()
            .execute(&sh("echo partial; sleep 30"), Duration::from_millis(500))
            .await;
        assert!(!out.completed);
        assert!(out.output.contains("partial"));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_sigterm_ignored_resolves_within_grace() {
        let started = Instant::now();
        let out = runner()
            .execute(&sh("trap '' TERM; sleep 30"), Duration::from_millis(300))
            .await;
        assert!(!out.completed);
        // timeout + grace, with slack for a loaded machine
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_output_is_bounded() {
        let out = runner()
            .execute(&sh("i=0; while [ $i -lt 200 ]; do echo 0123456789; i=$((i+1)); done"), Duration::from_secs(5))
            .await;
        assert!(out.completed);
        assert!(out.truncated);
        assert_eq!(out.output.len(), 1024);
    }

    #[tokio::test]
    async fn test_shutdown_cancels_in_flight_tool() {
        let token = CancellationToken::new();
        let runner = ProcessRunner { shutdown: token.clone(), ..runner() };
        let cancel = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            token.cancel();
        });
        let out = runner.execute(&sh("sleep 30"), Duration::from_secs(30)).await;
        cancel.await.unwrap();
        assert!(!out.completed);
        assert!(out.duration_ms < 5_000);
    }
}
