use crate::error::{ErrorCode, PreprocessError};
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("Command not found: {0}")]
    NotFound(String),

    #[error("Process timed out after {0:?}")]
    TimedOut(Duration),

    #[error("Process exited with code {0}")]
    Exited(i32),

    #[error("Process terminated by signal {0}")]
    Signaled(i32),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised by the mock runner for calls nobody registered
    #[error("Unexpected command: {0}")]
    Unexpected(String),
}

impl From<ProcessError> for PreprocessError {
    fn from(err: ProcessError) -> Self {
        let code = match &err {
            ProcessError::NotFound(_) => ErrorCode::EXEC_COMMAND_NOT_FOUND,
            ProcessError::TimedOut(_) => ErrorCode::EXEC_TIMEOUT,
            ProcessError::Exited(_) => ErrorCode::EXEC_SUBPROCESS_FAILED,
            ProcessError::Signaled(_) => ErrorCode::EXEC_SIGNAL_RECEIVED,
            ProcessError::Io(_) => ErrorCode::EXEC_SPAWN_FAILED,
            ProcessError::Unexpected(_) => ErrorCode::EXEC_GENERIC,
        };
        let exit_code = match &err {
            ProcessError::Exited(code) | ProcessError::Signaled(code) => Some(*code),
            _ => None,
        };

        let error = PreprocessError::execution_with_code(code, err.to_string(), None);
        match exit_code {
            Some(exit_code) => error.with_exit_code(exit_code),
            None => error,
        }
        .with_source(err)
    }
}
