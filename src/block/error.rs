use thiserror::Error;

use super::SampleFormat;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlockError {
    #[error("unsupported sample format: {bits_per_sample} bits, {channels} channels, {sample_rate_hz} Hz")]
    UnsupportedFormat {
        bits_per_sample: u16,
        channels: u16,
        sample_rate_hz: u32,
    },
    #[error("payload of {len} bytes is not a multiple of the {width}-byte sample width")]
    MisalignedPayload { len: usize, width: usize },
    #[error("sample range {start}+{len} exceeds block of {available} samples")]
    OutOfRange {
        start: usize,
        len: usize,
        available: usize,
    },
    #[error("cannot combine blocks of different formats ({left:?} vs {right:?})")]
    FormatMismatch {
        left: SampleFormat,
        right: SampleFormat,
    },
}
