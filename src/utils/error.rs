use crate::domain::model::PipelineError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenError {
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Network request failed: {0}")]
    TransportFailure(#[from] reqwest::Error),

    // 直接使用服務端回傳的錯誤訊息
    #[error("{message}")]
    ApiRejected { status: u16, message: String },

    #[error("The response was blocked by the content safety filter")]
    SafetyBlocked,

    #[error("The API returned no usable content")]
    EmptyResponse,

    #[error("Malformed response: {message}")]
    MalformedResponse { message: String },

    #[error("Another generation is already in progress")]
    CommandInFlight,

    #[error("The session changed while the request was in flight")]
    Superseded,

    #[error("{0}")]
    StageFailed(PipelineError),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Clipboard error: {message}")]
    Clipboard { message: String },
}

/// Taxonomy tag carried by a stored pipeline error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum ErrorKind {
    InvalidInput,
    TransportFailure,
    ApiRejected,
    SafetyBlocked,
    EmptyResponse,
    MalformedResponse,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl GenError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput { .. } => ErrorKind::InvalidInput,
            Self::TransportFailure(_) => ErrorKind::TransportFailure,
            Self::ApiRejected { .. } => ErrorKind::ApiRejected,
            Self::SafetyBlocked => ErrorKind::SafetyBlocked,
            Self::EmptyResponse => ErrorKind::EmptyResponse,
            Self::MalformedResponse { .. } => ErrorKind::MalformedResponse,
            Self::StageFailed(error) => error.kind,
            _ => ErrorKind::Other,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::CommandInFlight | Self::Superseded => ErrorSeverity::Low,
            Self::StageFailed(error) => match error.kind {
                ErrorKind::TransportFailure | ErrorKind::ApiRejected | ErrorKind::SafetyBlocked => {
                    ErrorSeverity::Medium
                }
                _ => ErrorSeverity::High,
            },
            Self::TransportFailure(_) | Self::ApiRejected { .. } | Self::SafetyBlocked => {
                ErrorSeverity::Medium
            }
            Self::InvalidInput { .. }
            | Self::EmptyResponse
            | Self::MalformedResponse { .. }
            | Self::SerializationError(_)
            | Self::Clipboard { .. } => ErrorSeverity::High,
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. }
            | Self::IoError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::TransportFailure(_) => "Could not reach the generation service".to_string(),
            Self::SafetyBlocked => {
                "The request was blocked by the service's safety policy".to_string()
            }
            Self::EmptyResponse | Self::MalformedResponse { .. } => {
                "The generation service returned an unexpected response".to_string()
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::InvalidInput { .. } => "Provide a non-empty product name",
            Self::TransportFailure(_) => "Check your network connection and try again",
            Self::ApiRejected { status: 401 | 403, .. } => "Check that the API key is valid",
            Self::ApiRejected { status: 429, .. } => "Wait a moment before trying again",
            Self::ApiRejected { .. } => "Check the API base URL and model name",
            Self::SafetyBlocked => "Try a different product name or description",
            Self::EmptyResponse | Self::MalformedResponse { .. } => "Run the generation again",
            Self::CommandInFlight | Self::Superseded => {
                "Wait for the running generation to finish"
            }
            Self::StageFailed(error) => match error.kind {
                ErrorKind::InvalidInput => "Provide a non-empty product name",
                ErrorKind::TransportFailure => "Check your network connection and try again",
                ErrorKind::ApiRejected => "Check the API key, model name and quota",
                ErrorKind::SafetyBlocked => "Try a different product name or description",
                _ => "Run the generation again",
            },
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => "Fix the configuration file or CLI arguments",
            Self::IoError(_) => "Check that the output path is writable",
            Self::SerializationError(_) => "Report this as a bug",
            Self::Clipboard { .. } => "Copy the text manually",
        }
    }
}

pub type Result<T> = std::result::Result<T, GenError>;
