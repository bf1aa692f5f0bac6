use async_trait::async_trait;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::AsyncWriteExt;
use tokio::process::{Child, ChildStdin, Command};
use tracing::{debug, trace, warn};

use super::command::ProcessCommand;
use super::error::ProcessError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessStatus {
    Success,
    Exited(i32),
    Signaled(i32),
}

impl ProcessStatus {
    pub fn success(self) -> bool {
        self == ProcessStatus::Success
    }

    /// Exit code, if the process exited on its own
    pub fn code(self) -> Option<i32> {
        match self {
            ProcessStatus::Success => Some(0),
            ProcessStatus::Exited(code) => Some(code),
            ProcessStatus::Signaled(_) => None,
        }
    }

    pub fn check(self) -> Result<(), ProcessError> {
        match self {
            ProcessStatus::Success => Ok(()),
            ProcessStatus::Exited(code) => Err(ProcessError::Exited(code)),
            ProcessStatus::Signaled(signal) => Err(ProcessError::Signaled(signal)),
        }
    }

    fn from_std(status: std::process::ExitStatus) -> Self {
        if status.success() {
            return ProcessStatus::Success;
        }
        if let Some(code) = status.code() {
            return ProcessStatus::Exited(code);
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return ProcessStatus::Signaled(signal);
            }
        }
        ProcessStatus::Exited(1)
    }
}

#[derive(Debug, Clone)]
pub struct ProcessOutput {
    pub status: ProcessStatus,
    pub stdout: String,
    pub stderr: String,
    pub elapsed: Duration,
}

#[async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn run(&self, command: ProcessCommand) -> Result<ProcessOutput, ProcessError>;
}

/// Runs commands as real child processes
pub struct TokioProcessRunner;

impl TokioProcessRunner {
    fn spawn(command: &ProcessCommand) -> Result<Child, ProcessError> {
        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args)
            .envs(&command.env)
            .stdin(if command.input.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        cmd.spawn().map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ProcessError::NotFound(command.program.clone()),
            _ => ProcessError::Io(e),
        })
    }

    /// Write the whole input and close stdin
    ///
    /// A child may exit without reading its input. The resulting broken
    /// pipe is left to show up in its exit status.
    async fn feed(stdin: Option<ChildStdin>, input: Option<&str>) -> Result<(), ProcessError> {
        let (Some(mut stdin), Some(input)) = (stdin, input) else {
            return Ok(());
        };
        let result = match stdin.write_all(input.as_bytes()).await {
            Ok(()) => stdin.shutdown().await,
            Err(e) => Err(e),
        };
        match result {
            Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {
                debug!("Child closed stdin after {} byte input was offered", input.len());
                Ok(())
            }
            other => other.map_err(ProcessError::Io),
        }
    }

    /// Feed stdin while draining stdout and stderr, until the child exits
    async fn exchange(
        mut child: Child,
        input: Option<&str>,
    ) -> Result<std::process::Output, ProcessError> {
        let stdin = child.stdin.take();
        let (fed, output) = tokio::join!(Self::feed(stdin, input), child.wait_with_output());
        fed?;
        output.map_err(ProcessError::Io)
    }
}

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run(&self, command: ProcessCommand) -> Result<ProcessOutput, ProcessError> {
        debug!("Spawning: {}", command);
        if !command.env.is_empty() {
            trace!("Extra environment: {:?}", command.env);
        }

        let started = Instant::now();
        let child = Self::spawn(&command)?;
        // Dropping the exchange on timeout kills the child
        let exchange = Self::exchange(child, command.input.as_deref());
        let output = match command.timeout {
            Some(limit) => tokio::time::timeout(limit, exchange)
                .await
                .map_err(|_| ProcessError::TimedOut(limit))??,
            None => exchange.await?,
        };

        let result = ProcessOutput {
            status: ProcessStatus::from_std(output.status),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            elapsed: started.elapsed(),
        };

        if result.status.success() {
            debug!("{} succeeded after {:?}", command.program, result.elapsed);
        } else if let Some(code) = result.status.code() {
            debug!("{} exited with code {} after {:?}", command.program, code, result.elapsed);
        } else {
            warn!("{} {:?} after {:?}", command.program, result.status, result.elapsed);
        }
        Ok(result)
    }
}
