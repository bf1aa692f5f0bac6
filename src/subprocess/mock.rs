use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::command::ProcessCommand;
use super::error::ProcessError;
use super::runner::{ProcessOutput, ProcessRunner, ProcessStatus};

type ArgsMatcher = Box<dyn Fn(&[String]) -> bool + Send + Sync>;

/// Answers registered programs with canned output and records every call
#[derive(Clone, Default)]
pub struct MockProcessRunner {
    responses: Arc<Mutex<Vec<MockResponse>>>,
    calls: Arc<Mutex<Vec<ProcessCommand>>>,
}

struct MockResponse {
    program: String,
    matcher: Option<ArgsMatcher>,
    output: ProcessOutput,
    remaining: Option<usize>,
}

impl MockResponse {
    fn matches(&self, command: &ProcessCommand) -> bool {
        self.program == command.program
            && self.remaining != Some(0)
            && self.matcher.as_ref().map_or(true, |m| m(&command.args))
    }
}

/// Builder returned by [`MockProcessRunner::on`]; nothing is registered
/// until [`MockResponseBuilder::register`] is called
pub struct MockResponseBuilder {
    responses: Arc<Mutex<Vec<MockResponse>>>,
    response: MockResponse,
}

impl MockProcessRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start describing how `program` responds; by default it succeeds
    /// silently any number of times
    pub fn on(&self, program: &str) -> MockResponseBuilder {
        MockResponseBuilder {
            responses: Arc::clone(&self.responses),
            response: MockResponse {
                program: program.to_string(),
                matcher: None,
                output: ProcessOutput {
                    status: ProcessStatus::Success,
                    stdout: String::new(),
                    stderr: String::new(),
                    elapsed: Duration::ZERO,
                },
                remaining: None,
            },
        }
    }

    pub fn calls(&self) -> Vec<ProcessCommand> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, program: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.program == program)
            .count()
    }
}

#[async_trait]
impl ProcessRunner for MockProcessRunner {
    async fn run(&self, command: ProcessCommand) -> Result<ProcessOutput, ProcessError> {
        self.calls.lock().unwrap().push(command.clone());

        let mut responses = self.responses.lock().unwrap();
        let response = responses
            .iter_mut()
            .find(|r| r.matches(&command))
            .ok_or_else(|| ProcessError::Unexpected(command.to_string()))?;
        if let Some(remaining) = response.remaining.as_mut() {
            *remaining -= 1;
        }
        Ok(response.output.clone())
    }
}

impl MockResponseBuilder {
    pub fn with_args<F>(mut self, matcher: F) -> Self
    where
        F: Fn(&[String]) -> bool + Send + Sync + 'static,
    {
        self.response.matcher = Some(Box::new(matcher));
        self
    }

    pub fn stdout(mut self, stdout: &str) -> Self {
        self.response.output.stdout = stdout.to_string();
        self
    }

    pub fn stderr(mut self, stderr: &str) -> Self {
        self.response.output.stderr = stderr.to_string();
        self
    }

    pub fn exit_code(mut self, code: i32) -> Self {
        self.response.output.status = match code {
            0 => ProcessStatus::Success,
            code => ProcessStatus::Exited(code),
        };
        self
    }

    pub fn signal(mut self, signal: i32) -> Self {
        self.response.output.status = ProcessStatus::Signaled(signal);
        self
    }

    /// Answer only the first matching call
    pub fn once(mut self) -> Self {
        self.response.remaining = Some(1);
        self
    }

    pub fn register(self) {
        self.responses.lock().unwrap().push(self.response);
    }
}
