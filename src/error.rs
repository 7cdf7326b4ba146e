//! Error type shared by every stage of a derivation.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Key generation failed: {0}")]
    InternalGeneration(String),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Key provider error: {0}")]
    Provider(String),

    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid signature format")]
    InvalidSignature,
}

impl Error {
    /// Machine-readable code for the error kind.
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::InvalidParameter(_) | Error::Json(_) => ErrorCode::InvalidParameter,
            Error::InternalGeneration(_) => ErrorCode::InternalGeneration,
            Error::Encoding(_) => ErrorCode::Encoding,
            Error::Provider(_) | Error::Base64(_) | Error::InvalidSignature => {
                ErrorCode::Provider
            }
        }
    }
}

impl From<der::Error> for Error {
    fn from(err: der::Error) -> Self {
        Error::Encoding(err.to_string())
    }
}

/// Error codes grouping [`Error`] variants by the stage that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ErrorCode {
    #[serde(rename = "INVALID_PARAMETER")]
    InvalidParameter,
    #[serde(rename = "INTERNAL_GENERATION_ERROR")]
    InternalGeneration,
    #[serde(rename = "ENCODING_ERROR")]
    Encoding,
    #[serde(rename = "PROVIDER_ERROR")]
    Provider,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorCode::InvalidParameter => "INVALID_PARAMETER",
            ErrorCode::InternalGeneration => "INTERNAL_GENERATION_ERROR",
            ErrorCode::Encoding => "ENCODING_ERROR",
            ErrorCode::Provider => "PROVIDER_ERROR",
        };
        write!(f, "{}", s)
    }
}
