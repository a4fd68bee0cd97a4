use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExporterError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Invalid Reddit URL '{url}': {reason}")]
    InvalidUrlError { url: String, reason: String },

    #[error("Reddit rate limit exceeded")]
    RateLimitedError,

    #[error("Reddit responded with HTTP {status} for {url}")]
    HttpStatusError { status: u16, url: String },

    #[error("Invalid data format received from Reddit: {message}")]
    InvalidDataError { message: String },

    #[error("Setup step '{step}' failed with exit code {code}")]
    StepFailedError { step: String, code: i32 },

    #[error("Cannot enter tool directory {path}: {reason}")]
    RootUnavailableError { path: String, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Configuration,
    Data,
    FileSystem,
    Environment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    /// Process exit code for a failure of this severity. Never 0.
    pub fn exit_code(&self) -> i32 {
        match self {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl ExporterError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ExporterError::ApiError(_)
            | ExporterError::RateLimitedError
            | ExporterError::HttpStatusError { .. } => ErrorCategory::Network,
            ExporterError::ConfigError { .. }
            | ExporterError::ConfigValidationError { .. }
            | ExporterError::InvalidConfigValueError { .. }
            | ExporterError::InvalidUrlError { .. } => ErrorCategory::Configuration,
            ExporterError::SerializationError(_) | ExporterError::InvalidDataError { .. } => {
                ErrorCategory::Data
            }
            ExporterError::IoError(_) => ErrorCategory::FileSystem,
            ExporterError::StepFailedError { .. } | ExporterError::RootUnavailableError { .. } => {
                ErrorCategory::Environment
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 重試可能成功
            ExporterError::RateLimitedError | ExporterError::ApiError(_) => ErrorSeverity::Medium,
            ExporterError::HttpStatusError { status, .. } if *status >= 500 => {
                ErrorSeverity::Medium
            }
            ExporterError::IoError(_) | ExporterError::RootUnavailableError { .. } => {
                ErrorSeverity::Critical
            }
            _ => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            ExporterError::ApiError(_) => {
                "Check your network connection and try again".to_string()
            }
            ExporterError::RateLimitedError => {
                "Wait a few minutes before exporting again".to_string()
            }
            ExporterError::HttpStatusError { status, .. } => match status {
                403 => "The thread may be private or quarantined".to_string(),
                404 => "Check that the thread still exists".to_string(),
                _ => "Try again later".to_string(),
            },
            ExporterError::InvalidUrlError { .. } => {
                "Use a thread URL such as https://www.reddit.com/r/rust/comments/abc123/title/"
                    .to_string()
            }
            ExporterError::InvalidDataError { .. } | ExporterError::SerializationError(_) => {
                "Make sure the URL points to a thread, not a subreddit or user page".to_string()
            }
            ExporterError::ConfigError { .. }
            | ExporterError::ConfigValidationError { .. }
            | ExporterError::InvalidConfigValueError { .. } => {
                "Review the configuration file and command line flags".to_string()
            }
            ExporterError::IoError(_) => {
                "Check permissions and free space in the output directory".to_string()
            }
            ExporterError::StepFailedError { step, .. } => {
                format!("Inspect the output of the '{}' step above", step)
            }
            ExporterError::RootUnavailableError { .. } => {
                "Pass --root with the directory that holds the manifest".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ExporterError::ApiError(e) => format!("Network error: {}", e),
            ExporterError::RateLimitedError => {
                "Error: Reddit rate limit exceeded. Please try again later.".to_string()
            }
            ExporterError::InvalidUrlError { .. } => format!("Value error: {}", self),
            ExporterError::InvalidDataError { .. } => {
                "Error: Invalid data format received from Reddit.".to_string()
            }
            _ => format!("Error: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, ExporterError>;
