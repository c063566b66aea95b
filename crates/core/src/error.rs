use thiserror::Error;

pub type BanditResult<T> = Result<T, BanditError>;

#[derive(Error, Debug)]
pub enum BanditError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Counter store error: {0}")]
    Store(String),

    #[error("Event sink error: {0}")]
    EventSink(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
