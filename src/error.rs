//! Crate-wide error type.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("corruption: {0}")]
    Corruption(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("tokenizer reported an invalid field location: {0}")]
    Tokenizer(String),
}

impl EngineError {
    pub fn corruption<S: Into<String>>(msg: S) -> Self {
        EngineError::Corruption(msg.into())
    }

    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        EngineError::Configuration(msg.into())
    }
}
