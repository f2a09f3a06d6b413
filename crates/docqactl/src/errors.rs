//! Exit codes for one-shot commands

use docqa_common::{ClientError, ErrorKind};

/// Exit code for success
pub const EXIT_SUCCESS: i32 = 0;

/// Exit code for general errors (server-side failures, bad config)
pub const EXIT_GENERAL_ERROR: i32 = 1;

/// Exit code when a client-side precondition failed or the user declined
pub const EXIT_VALIDATION: i32 = 64;

/// Exit code when the server is unavailable/unreachable
pub const EXIT_SERVER_UNAVAILABLE: i32 = 70;

pub fn exit_code_for(err: &ClientError) -> i32 {
    match err.kind() {
        ErrorKind::Transport => EXIT_SERVER_UNAVAILABLE,
        ErrorKind::Protocol => EXIT_GENERAL_ERROR,
        ErrorKind::Validation => EXIT_VALIDATION,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_follow_error_kind() {
        assert_eq!(
            exit_code_for(&ClientError::Transport("refused".into())),
            EXIT_SERVER_UNAVAILABLE
        );
        assert_eq!(
            exit_code_for(&ClientError::Protocol { status: 500, detail: "boom".into() }),
            EXIT_GENERAL_ERROR
        );
    }
}
