//! Client side of the letter generation service.

pub mod client;
pub mod models;

use thiserror::Error;

pub use client::LetterClient;
pub use models::{DemandLetterRequest, GenerationResponse, LetterMetadata};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("malformed response body: {0}")]
    Decode(String),
    #[error("letter generation failed: {0}")]
    Rejected(String),
    #[error("service reported success without a letter")]
    MissingLetter,
}

impl From<reqwest::Error> for ServiceError {
    fn from(value: reqwest::Error) -> Self {
        ServiceError::Network(value.to_string())
    }
}
