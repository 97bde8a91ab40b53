use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Template rendering failed: {0}")]
    RenderError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Path escapes the project root: {}", path.display())]
    PathEscapeError { path: PathBuf },

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("Archive stream failed: {0}")]
    ArchiveIoError(#[source] std::io::Error),

    #[error("Illegal export stage transition: {from} -> {to}")]
    StageError { from: String, to: String },

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

    #[error("Invalid export request: {message}")]
    InvalidRequestError { message: String },
}

/// Coarse classification used by the error boundary to decide logging and
/// response mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Render,
    Io,
    Archive,
    Config,
    Request,
}

impl ExportError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExportError::RenderError(_) | ExportError::SerializationError(_) => ErrorKind::Render,
            ExportError::IoError(_) | ExportError::PathEscapeError { .. } => ErrorKind::Io,
            ExportError::ZipError(_)
            | ExportError::ArchiveIoError(_)
            | ExportError::StageError { .. } => ErrorKind::Archive,
            ExportError::ConfigError { .. }
            | ExportError::ConfigValidationError { .. }
            | ExportError::InvalidConfigValueError { .. } => ErrorKind::Config,
            ExportError::InvalidRequestError { .. } => ErrorKind::Request,
        }
    }

    /// Whether the failure happened inside the export pipeline itself, as
    /// opposed to a bad request or bad configuration.
    pub fn is_pipeline_failure(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Render | ErrorKind::Io | ErrorKind::Archive
        )
    }

    pub fn user_friendly_message(&self) -> String {
        match self.kind() {
            ErrorKind::Render | ErrorKind::Io | ErrorKind::Archive => {
                "Failed to generate ZIP".to_string()
            }
            ErrorKind::Config => format!("Invalid configuration: {}", self),
            ErrorKind::Request => "Invalid export request".to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.kind() {
            ErrorKind::Render => "Check the layout for unsupported values and try again",
            ErrorKind::Io => "Check that the temporary directory exists, is writable and has free space",
            ErrorKind::Archive => "Retry the export; if it keeps failing check disk space and the client connection",
            ErrorKind::Config => "Fix the configuration file or command line flags",
            ErrorKind::Request => "Send a JSON body of the form {\"components\": [...]}",
        }
    }

    pub(crate) fn archive_io(err: std::io::Error) -> Self {
        ExportError::ArchiveIoError(err)
    }
}

pub type Result<T> = std::result::Result<T, ExportError>;
