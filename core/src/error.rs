//! Crate error handling

use getrandom;
pub use std::result::Result;
use thiserror::Error as ThisError;
pub type GenericError = Box<dyn std::error::Error + Send + Sync>;

/// Error enum that rolls-up all error messages in this crate
#[derive(Debug, ThisError)]
pub enum Error {
    #[error("Error: {0}")]
    GenericError(#[from] GenericError),

    #[error("IO error: {0}")]
    IOError(std::io::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Encryption error: {0}")]
    Encryption(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Store key already exists: {0}")]
    AlreadyExists(String),

    #[error("Store key not found: {0}")]
    NotFound(String),

    #[error("Response dispatch error: {0}")]
    Dispatch(String),

    #[error("Missing environment setting: {0}")]
    MissingEnv(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Random generation error: {0}")]
    Random(String),

    #[error("(De)Serialization error {0}")]
    SerializationError(String),

    #[error("Error: {0}")]
    OtherError(String),
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Error {
        Error::IOError(e)
    }
}

impl From<getrandom::Error> for Error {
    fn from(_: getrandom::Error) -> Error {
        Error::Random(String::from("out of entropy"))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Error {
        Error::SerializationError(e.to_string())
    }
}
