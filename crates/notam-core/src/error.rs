use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unknown review status: {0}")]
    UnknownStatus(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
