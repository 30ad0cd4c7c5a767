//! Application error type and process exit codes.
//!
//! Every fallible operation returns `Result<_, AppError>`; `main` turns the
//! error into a process exit code so automation can tell failures apart.

/// Visualizer failures: missing/empty CSV, rendering errors.
pub const EXIT_VISUALIZE: u8 = 1;
/// Configuration errors: missing token, invalid options, client setup.
pub const EXIT_CONFIG: u8 = 2;
/// Every series failed and `--strict` was requested.
pub const EXIT_NO_DATA: u8 = 3;
/// Fetch-stage failures: per-series HTTP/payload errors, CSV write errors.
pub const EXIT_FETCH: u8 = 4;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(EXIT_CONFIG, message)
    }

    pub fn fetch(message: impl Into<String>) -> Self {
        Self::new(EXIT_FETCH, message)
    }

    pub fn visualize(message: impl Into<String>) -> Self {
        Self::new(EXIT_VISUALIZE, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// Render an error and its `source()` chain on one line.
///
/// Used when logging failures that wrap lower-level errors (reqwest, csv,
/// plotters) so the root cause shows up in CI output.
pub fn error_chain(err: &dyn std::error::Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Inner;

    impl std::fmt::Display for Inner {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "connection reset")
        }
    }

    impl std::error::Error for Inner {}

    #[derive(Debug)]
    struct Outer(Inner);

    impl std::fmt::Display for Outer {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "request failed")
        }
    }

    impl std::error::Error for Outer {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn error_chain_joins_sources() {
        assert_eq!(error_chain(&Outer(Inner)), "request failed: connection reset");
    }

    #[test]
    fn constructors_carry_exit_codes() {
        assert_eq!(AppError::config("x").exit_code(), EXIT_CONFIG);
        assert_eq!(AppError::fetch("x").exit_code(), EXIT_FETCH);
        assert_eq!(AppError::visualize("x").exit_code(), EXIT_VISUALIZE);
        assert_eq!(AppError::new(EXIT_NO_DATA, "none").to_string(), "none");
    }
}
