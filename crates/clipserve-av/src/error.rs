//! Error types for clipserve-av.

use std::path::PathBuf;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during media fetching and processing.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required external tool is not available.
    #[error("tool not found: {tool}")]
    ToolNotFound { tool: String },

    /// An external tool exited with a nonzero status.
    #[error("{tool} failed ({}): {stderr}", code.map(|c| c.to_string()).unwrap_or_else(|| "killed".to_string()))]
    ProcessFailed {
        tool: String,
        code: Option<i32>,
        stderr: String,
    },

    /// An external tool exceeded the configured timeout and was killed.
    #[error("{tool} timed out after {seconds}s")]
    Timeout { tool: String, seconds: u64 },

    /// Both the primary and fallback download attempts were exhausted.
    #[error("failed to fetch {url}: {message}")]
    FetchFailed { url: String, message: String },

    /// The configured credential file is required but missing.
    #[error("credential file not found: {}", path.display())]
    MissingCredentials { path: PathBuf },

    /// Failed to parse tool output.
    #[error("failed to parse {tool} output: {message}")]
    ParseError { tool: String, message: String },

    /// The specified file was not found.
    #[error("file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// Invalid input provided.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a tool not found error.
    pub fn tool_not_found(tool: impl Into<String>) -> Self {
        Self::ToolNotFound { tool: tool.into() }
    }

    /// Create a process failed error from a captured exit.
    pub fn process_failed(
        tool: impl Into<String>,
        code: Option<i32>,
        stderr: impl Into<String>,
    ) -> Self {
        Self::ProcessFailed {
            tool: tool.into(),
            code,
            stderr: stderr.into(),
        }
    }

    /// Create a fetch failed error.
    pub fn fetch_failed(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::FetchFailed {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create a parse error.
    pub fn parse_error(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ParseError {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Create a file not found error.
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// True for errors caused by the request rather than the service.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_) | Self::FileNotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn process_failed_displays_exit_code() {
        let err = Error::process_failed("ffmpeg", Some(1), "moov atom not found");
        assert_eq!(err.to_string(), "ffmpeg failed (1): moov atom not found");
    }

    #[test]
    fn process_failed_without_code_displays_killed() {
        let err = Error::process_failed("yt-dlp", None, "");
        assert!(err.to_string().contains("killed"));
    }

    #[test]
    fn client_errors_classified() {
        assert!(Error::InvalidInput("no source".into()).is_client_error());
        assert!(!Error::fetch_failed("http://x", "nope").is_client_error());
    }
}
