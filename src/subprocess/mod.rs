//! Subprocess execution
//!
//! External collaborators run as child processes. Everything that spawns
//! a process goes through [`ProcessRunner`] so tests can substitute
//! [`MockProcessRunner`].

pub mod command;
pub mod error;
pub mod mock;
pub mod runner;

#[cfg(test)]
mod tests;

pub use command::ProcessCommand;
pub use error::ProcessError;
pub use mock::{MockProcessRunner, MockResponseBuilder};
pub use runner::{ProcessOutput, ProcessRunner, ProcessStatus, TokioProcessRunner};

use std::sync::Arc;

/// Shared handle to the runner collaborators spawn through
#[derive(Clone)]
pub struct SubprocessManager {
    runner: Arc<dyn ProcessRunner>,
}

impl SubprocessManager {
    pub fn new(runner: Arc<dyn ProcessRunner>) -> Self {
        Self { runner }
    }

    pub fn production() -> Self {
        Self::new(Arc::new(TokioProcessRunner))
    }

    pub fn mock() -> (Self, MockProcessRunner) {
        let mock = MockProcessRunner::new();
        (Self::new(Arc::new(mock.clone())), mock)
    }

    pub async fn run(&self, command: ProcessCommand) -> Result<ProcessOutput, ProcessError> {
        self.runner.run(command).await
    }
}
