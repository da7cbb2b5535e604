//! CLI error types.

use thiserror::Error;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// The API returned an error or the request failed in transit.
    #[error(transparent)]
    Api(#[from] stratus_api::Error),

    /// Invalid configuration or config file problem.
    #[error("configuration error: {0}")]
    Config(String),

    /// Invalid command-line argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A key expected by a table renderer was absent from the response.
    #[error("missing key in response: {0}")]
    MissingField(String),

    /// Output formatting error.
    #[error("format error: {0}")]
    Format(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The user declined a confirmation prompt.
    #[error("aborted by user")]
    Aborted,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_error_display_config() {
        let err = CliError::Config("no such profile: staging".into());
        assert_eq!(
            err.to_string(),
            "configuration error: no such profile: staging"
        );
    }

    #[test]
    fn cli_error_display_missing_field() {
        let err = CliError::MissingField("server.id".into());
        assert_eq!(err.to_string(), "missing key in response: server.id");
    }

    #[test]
    fn cli_error_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let cli_err = CliError::from(io_err);
        assert!(matches!(cli_err, CliError::Io(_)));
    }

    #[test]
    fn cli_error_wraps_api_error() {
        let api_err = stratus_api::Error::from_response(401, "");
        let cli_err = CliError::from(api_err);
        assert_eq!(cli_err.to_string(), "401 Unauthorized");
    }
}
