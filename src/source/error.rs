use thiserror::Error;

use crate::block::BlockError;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read from source")]
    Io(#[from] std::io::Error),
    #[error("decode failed: {message}")]
    Decode { message: String },
    #[error("stream ended inside a sample frame ({leftover} stray bytes)")]
    TruncatedFrame { leftover: usize },
    #[error("read size must be at least 1 byte")]
    InvalidReadSize,
    #[error("source produced an invalid block")]
    Block(#[from] BlockError),
}
