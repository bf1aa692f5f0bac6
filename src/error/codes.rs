/// Error code registry for stackprep
///
/// Error codes are organized by category:
/// - 1000-1999: Configuration errors
/// - 3000-3999: Storage errors
/// - 4000-4999: Execution errors
/// - 7000-7999: Validation errors
/// - 9000-9999: Other errors
pub struct ErrorCode;

impl ErrorCode {
    // Configuration errors (1000-1999)
    pub const CONFIG_GENERIC: u16 = 1000;
    pub const CONFIG_NOT_FOUND: u16 = 1001;
    pub const CONFIG_INVALID_YAML: u16 = 1002;
    pub const CONFIG_INVALID_VALUE: u16 = 1003;
    pub const CONFIG_MISSING_REQUIRED: u16 = 1004;

    // Storage errors (3000-3999)
    pub const STORAGE_GENERIC: u16 = 3000;
    pub const STORAGE_IO_ERROR: u16 = 3001;
    pub const STORAGE_PERMISSION_DENIED: u16 = 3002;
    pub const STORAGE_SERIALIZATION_ERROR: u16 = 3011;

    // Execution errors (4000-4999)
    pub const EXEC_GENERIC: u16 = 4000;
    pub const EXEC_COMMAND_NOT_FOUND: u16 = 4001;
    pub const EXEC_TIMEOUT: u16 = 4002;
    pub const EXEC_SUBPROCESS_FAILED: u16 = 4003;
    pub const EXEC_SIGNAL_RECEIVED: u16 = 4005;
    pub const EXEC_SPAWN_FAILED: u16 = 4006;

    // Validation errors (7000-7999)
    pub const VALIDATION_GENERIC: u16 = 7000;

    // Other errors (9000-9999)
    pub const OTHER_GENERIC: u16 = 9000;
}

/// Get a human-readable description for an error code
pub fn describe_error_code(code: u16) -> &'static str {
    match code {
        ErrorCode::CONFIG_GENERIC => "General configuration error",
        ErrorCode::CONFIG_NOT_FOUND => "Configuration file not found",
        ErrorCode::CONFIG_INVALID_YAML => "Configuration is not valid YAML",
        ErrorCode::CONFIG_INVALID_VALUE => "Configuration field has an invalid value",
        ErrorCode::CONFIG_MISSING_REQUIRED => "Required configuration field is missing",

        ErrorCode::STORAGE_GENERIC => "General storage error",
        ErrorCode::STORAGE_IO_ERROR => "Filesystem I/O error",
        ErrorCode::STORAGE_PERMISSION_DENIED => "Permission denied",
        ErrorCode::STORAGE_SERIALIZATION_ERROR => "Failed to serialize data",

        ErrorCode::EXEC_GENERIC => "General execution error",
        ErrorCode::EXEC_COMMAND_NOT_FOUND => "Collaborator command not found",
        ErrorCode::EXEC_TIMEOUT => "Collaborator timed out",
        ErrorCode::EXEC_SUBPROCESS_FAILED => "Collaborator exited with an error",
        ErrorCode::EXEC_SIGNAL_RECEIVED => "Collaborator terminated by signal",
        ErrorCode::EXEC_SPAWN_FAILED => "Failed to spawn collaborator",

        ErrorCode::VALIDATION_GENERIC => "Configuration validation failed",

        _ => "Unknown error",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes_have_descriptions() {
        assert_eq!(
            describe_error_code(ErrorCode::CONFIG_NOT_FOUND),
            "Configuration file not found"
        );
        assert_eq!(
            describe_error_code(ErrorCode::EXEC_TIMEOUT),
            "Collaborator timed out"
        );
    }

    #[test]
    fn test_unknown_code() {
        assert_eq!(describe_error_code(12345), "Unknown error");
    }
}
