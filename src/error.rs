use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Chatwoot API error ({status}): {message}")]
    ChatwootApi {
        status: reqwest::StatusCode,
        message: String,
    },

    #[error("Completion API error ({status}): {message}")]
    CompletionApi {
        status: reqwest::StatusCode,
        message: String,
    },

    #[error("Completion response error: {0}")]
    CompletionResponse(String),

    #[error("Reply stream error: {0}")]
    Stream(String),

    #[error("HTTP request error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0} reply provider is already registered")]
    AlreadyRegistered(&'static str),
}

impl RelayError {
    /// Returns a short description that is safe to show to a support operator
    pub fn user_message(&self) -> String {
        match self {
            RelayError::Config(_) | RelayError::AlreadyRegistered(_) => {
                "The reply service is misconfigured. Please contact the administrator.".to_string()
            }
            RelayError::ChatwootApi { .. } => {
                "Chatwoot rejected the message. Please try again later.".to_string()
            }
            RelayError::CompletionApi { status, .. } => match *status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    "The AI service rejected our credentials. Please contact the administrator."
                        .to_string()
                }
                StatusCode::TOO_MANY_REQUESTS => {
                    "The AI service is rate limiting us. Please try again in a few moments."
                        .to_string()
                }
                status if status.is_server_error() => {
                    "The AI service is experiencing issues right now. Please try again later."
                        .to_string()
                }
                _ => "The AI service could not handle the request.".to_string(),
            },
            RelayError::CompletionResponse(_) | RelayError::Stream(_) | RelayError::Json(_) => {
                "The AI service returned an unexpected response. Please try again.".to_string()
            }
            RelayError::Reqwest(_) | RelayError::Io(_) => {
                "Network issues while contacting the AI service. Please try again in a moment."
                    .to_string()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, RelayError>;
