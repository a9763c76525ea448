use thiserror::Error;

use crate::block::BlockError;
use crate::source::SourceError;

#[derive(Debug, Error)]
pub enum ResegmentError {
    #[error("required block size must be at least 1 sample (got {0})")]
    InvalidRequiredSize(usize),
    #[error("required block size {0} is not a power of two")]
    NotPowerOfTwo(usize),
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error("malformed block from source")]
    Block(#[from] BlockError),
}
