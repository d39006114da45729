//! CLI-specific error types and exit code mapping

use scanoss_core::error::ScanossError;
use scanoss_scanner::ScannerError;

/// CLI-specific error type.
///
/// The `exit_code()` method maps errors to process exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Missing or conflicting command-line arguments.
    #[error("{0}")]
    Usage(String),

    /// Configuration loading or validation failure, including filter files.
    #[error("configuration error: {0}")]
    Config(String),

    /// The scan target cannot be accessed.
    #[error("{0}")]
    Target(String),

    /// The scan itself failed.
    #[error("scan error: {0}")]
    Scan(String),

    /// IO error (stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from scanoss-core.
    #[error("{0}")]
    Core(#[from] ScanossError),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                         |
    /// |------|---------------------------------|
    /// | 0    | Success                         |
    /// | 1    | Usage / general error           |
    /// | 2    | Configuration error             |
    /// | 3    | Target not accessible           |
    /// | 4    | Scan failed                     |
    /// | 10   | IO error                        |
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) | Self::Core(ScanossError::Config(_)) => 2,
            Self::Target(_) => 3,
            Self::Scan(_) | Self::Core(ScanossError::Scan(_) | ScanossError::Store(_)) => 4,
            Self::Io(_) | Self::Core(ScanossError::Io(_)) => 10,
            Self::Usage(_) => 1,
        }
    }
}

impl From<ScannerError> for CliError {
    fn from(e: ScannerError) -> Self {
        match e {
            ScannerError::Config { .. } | ScannerError::Filter { .. } => Self::Config(e.to_string()),
            ScannerError::TargetAccess { .. } => Self::Target(e.to_string()),
            _ => Self::Scan(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scanoss_core::error::ConfigError;

    #[test]
    fn test_exit_code_usage_error() {
        let err = CliError::Usage("Missing parameters. Please use -h".to_owned());
        assert_eq!(err.exit_code(), 1);
        assert_eq!(err.to_string(), "Missing parameters. Please use -h");
    }

    #[test]
    fn test_exit_code_config_error() {
        let err = CliError::Config("bad".to_owned());
        assert_eq!(err.exit_code(), 2, "config error should return exit code 2");
    }

    #[test]
    fn test_exit_code_core_config_error() {
        let err = CliError::Core(ScanossError::Config(ConfigError::FileNotFound {
            path: "scanoss.toml".to_owned(),
        }));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_exit_code_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err = CliError::Io(io_err);
        assert_eq!(err.exit_code(), 10, "io error should return exit code 10");
    }

    #[test]
    fn test_from_scanner_target_access() {
        let err: CliError = ScannerError::TargetAccess {
            path: "/missing".to_owned(),
        }
        .into();
        assert_eq!(err.exit_code(), 3);
        assert!(err.to_string().contains("/missing"));
    }

    #[test]
    fn test_from_scanner_filter_is_config() {
        let err: CliError = ScannerError::Filter {
            path: "sbom.json".to_owned(),
            reason: "not found".to_owned(),
        }
        .into();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_from_scanner_report_is_scan() {
        let err: CliError = ScannerError::Report("write failed".to_owned()).into();
        assert_eq!(err.exit_code(), 4);
        assert!(err.to_string().starts_with("scan error"));
    }
}
