//! Error handling utilities

use crate::error::PreprocessError;
use tracing::error;

/// Exit code for an error reaching the top of the binary
pub fn exit_code_for(error: &anyhow::Error) -> i32 {
    error
        .downcast_ref::<PreprocessError>()
        .map(PreprocessError::exit_code)
        .unwrap_or(1)
}

/// Handle fatal errors and exit with appropriate status code
///
/// - `verbose = 0`: user-facing message only
/// - `verbose >= 1`: adds the full cause chain
pub fn handle_fatal_error(error: anyhow::Error, verbose: u8) -> ! {
    error!("Fatal error: {}", error);

    if let Some(preprocess_err) = error.downcast_ref::<PreprocessError>() {
        eprintln!("Error: {}", preprocess_err.user_message());

        if verbose >= 1 {
            eprintln!("\nContext Chain:\n{}", preprocess_err.developer_message());
        }
    } else {
        eprintln!("Error: {error}");

        if verbose >= 1 {
            eprintln!("\nError chain:");
            for (i, cause) in error.chain().enumerate() {
                eprintln!("  {}: {}", i, cause);
            }
        }
    }

    std::process::exit(exit_code_for(&error))
}
