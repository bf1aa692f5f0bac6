use super::*;
use std::time::Duration;

#[cfg(unix)]
#[tokio::test]
async fn test_runner_captures_stdout() {
    let output = TokioProcessRunner
        .run(ProcessCommand::new("echo").arg("hello world"))
        .await
        .unwrap();

    assert!(output.status.success());
    assert_eq!(output.stdout.trim(), "hello world");
    assert!(output.stderr.is_empty());
}

#[cfg(unix)]
#[tokio::test]
async fn test_runner_feeds_input_to_stdin() {
    let payload = r#"{"operation":"tile"}"#;
    let output = TokioProcessRunner
        .run(ProcessCommand::new("cat").input(payload))
        .await
        .unwrap();

    assert_eq!(output.stdout, payload);
}

#[cfg(unix)]
#[tokio::test]
async fn test_runner_reports_exit_code() {
    let output = TokioProcessRunner
        .run(ProcessCommand::new("sh").args(["-c", "echo oops >&2; exit 3"]))
        .await
        .unwrap();

    assert_eq!(output.status, ProcessStatus::Exited(3));
    assert_eq!(output.status.code(), Some(3));
    assert_eq!(output.stderr.trim(), "oops");
    assert!(matches!(output.status.check(), Err(ProcessError::Exited(3))));
}

#[cfg(unix)]
#[tokio::test]
async fn test_runner_tolerates_unread_input() {
    let output = TokioProcessRunner
        .run(ProcessCommand::new("true").input("x".repeat(1 << 20)))
        .await
        .unwrap();

    assert!(output.status.success());
}

#[cfg(unix)]
#[tokio::test]
async fn test_runner_adds_env_to_inherited_environment() {
    let output = TokioProcessRunner
        .run(
            ProcessCommand::new("sh")
                .args(["-c", "echo \"$STACKPREP_TEST\"; test -n \"$PATH\" && echo inherited"])
                .env("STACKPREP_TEST", "value"),
        )
        .await
        .unwrap();

    let lines: Vec<&str> = output.stdout.lines().collect();
    assert_eq!(lines, vec!["value", "inherited"]);
}

#[tokio::test]
async fn test_runner_command_not_found() {
    let result = TokioProcessRunner
        .run(ProcessCommand::new("stackprep-no-such-program-12345"))
        .await;

    assert!(matches!(result, Err(ProcessError::NotFound(p)) if p == "stackprep-no-such-program-12345"));
}

#[cfg(unix)]
#[tokio::test]
async fn test_runner_timeout() {
    let result = TokioProcessRunner
        .run(
            ProcessCommand::new("sleep")
                .arg("5")
                .timeout(Some(Duration::from_millis(100))),
        )
        .await;

    assert!(matches!(result, Err(ProcessError::TimedOut(_))));
}

#[cfg(unix)]
#[tokio::test]
async fn test_runner_timeout_covers_unread_input() {
    // The input exceeds the pipe buffer and the child never reads it
    let started = std::time::Instant::now();
    let result = TokioProcessRunner
        .run(
            ProcessCommand::new("sleep")
                .arg("3")
                .input("x".repeat(1 << 20))
                .timeout(Some(Duration::from_millis(200))),
        )
        .await;

    assert!(matches!(result, Err(ProcessError::TimedOut(_))));
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[cfg(unix)]
#[tokio::test]
async fn test_runner_echoes_input_larger_than_pipe_buffer() {
    let payload = "y".repeat(1 << 20);
    let output = TokioProcessRunner
        .run(ProcessCommand::new("cat").input(payload.clone()))
        .await
        .unwrap();

    assert!(output.status.success());
    assert_eq!(output.stdout.len(), payload.len());
}

#[test]
fn test_command_display_quotes_spaced_args() {
    let command = ProcessCommand::new("python").args(["-m", "tiler", "my stack", ""]);
    assert_eq!(command.to_string(), "python -m tiler 'my stack' ''");
}

#[tokio::test]
async fn test_mock_answers_registered_program_once() {
    let mock = MockProcessRunner::new();
    mock.on("stackprep-masks")
        .with_args(|args| args == ["--verbose"])
        .stdout("done\n")
        .once()
        .register();

    let command = ProcessCommand::new("stackprep-masks").arg("--verbose");
    let output = mock.run(command.clone()).await.unwrap();
    assert_eq!(output.stdout, "done\n");
    assert_eq!(mock.call_count("stackprep-masks"), 1);

    let second = mock.run(command).await;
    assert!(matches!(second, Err(ProcessError::Unexpected(_))));
}

#[tokio::test]
async fn test_mock_rejects_unregistered_program() {
    let mock = MockProcessRunner::new();
    let result = mock.run(ProcessCommand::new("stackprep-tile")).await;

    assert!(result.is_err());
    assert_eq!(mock.calls().len(), 1);
}

#[tokio::test]
async fn test_manager_routes_through_runner() {
    let (manager, mock) = SubprocessManager::mock();
    mock.on("stackprep-tile").exit_code(4).register();

    let output = manager
        .run(ProcessCommand::new("stackprep-tile"))
        .await
        .unwrap();
    assert_eq!(output.status, ProcessStatus::Exited(4));
}

#[test]
fn test_process_error_conversion() {
    use crate::error::{ErrorCode, PreprocessError};

    let err: PreprocessError = ProcessError::Exited(3).into();
    assert_eq!(err.code(), ErrorCode::EXEC_SUBPROCESS_FAILED);
    assert!(matches!(
        err,
        PreprocessError::Execution {
            exit_code: Some(3),
            ..
        }
    ));

    let err: PreprocessError = ProcessError::NotFound("tiler".into()).into();
    assert_eq!(err.code(), ErrorCode::EXEC_COMMAND_NOT_FOUND);

    let err: PreprocessError = ProcessError::TimedOut(Duration::from_secs(1)).into();
    assert_eq!(err.code(), ErrorCode::EXEC_TIMEOUT);
}
