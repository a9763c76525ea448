//! サンプルブロック
//!
//! `SampleBlock` は連続したPCMサンプル列（`Bytes`）とフォーマットを保持する不変ハンドル。
//! 連結・切り出しはいずれも新しいブロックを返し、受け手を変更しない。
//!
//! - `slice` は元バッファを共有する（コピーなし）
//! - `append` / `prepend` は片方が空ならコピーせずにもう片方を返す
mod error;
mod format;

use std::time::Duration;

use bytes::{Bytes, BytesMut};

pub use error::BlockError;
pub use format::SampleFormat;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleBlock {
    format: SampleFormat,
    data: Bytes,
}

impl SampleBlock {
    /// フォーマットとペイロードからブロックを作成（ペイロード長はサンプル幅の整数倍であること）
    pub fn new(format: SampleFormat, data: impl Into<Bytes>) -> Result<Self, BlockError> {
        format.validate()?;
        let data = data.into();
        let width = format.bytes_per_sample();
        if data.len() % width != 0 {
            return Err(BlockError::MisalignedPayload {
                len: data.len(),
                width,
            });
        }
        Ok(Self { format, data })
    }

    pub fn format(&self) -> SampleFormat {
        self.format
    }

    pub fn num_samples(&self) -> usize {
        self.data.len() / self.format.bytes_per_sample()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn duration(&self) -> Duration {
        self.format.duration_of(self.num_samples())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Bytes {
        self.data
    }

    /// 自身の後ろに `other` を連結したブロックを返す
    pub fn append(&self, other: &SampleBlock) -> Result<SampleBlock, BlockError> {
        self.ensure_same_format(other)?;
        if other.is_empty() {
            return Ok(self.clone());
        }
        if self.is_empty() {
            return Ok(other.clone());
        }

        let mut joined = BytesMut::with_capacity(self.data.len() + other.data.len());
        joined.extend_from_slice(&self.data);
        joined.extend_from_slice(&other.data);
        Ok(Self {
            format: self.format,
            data: joined.freeze(),
        })
    }

    /// `other` の後ろに自身を連結したブロックを返す
    pub fn prepend(&self, other: &SampleBlock) -> Result<SampleBlock, BlockError> {
        other.append(self)
    }

    /// `start` から `len` サンプル分を切り出す（バッファ共有）
    pub fn slice(&self, start: usize, len: usize) -> Result<SampleBlock, BlockError> {
        let available = self.num_samples();
        let end = start
            .checked_add(len)
            .filter(|end| *end <= available)
            .ok_or(BlockError::OutOfRange {
                start,
                len,
                available,
            })?;

        let width = self.format.bytes_per_sample();
        Ok(Self {
            format: self.format,
            data: self.data.slice(start * width..end * width),
        })
    }

    fn ensure_same_format(&self, other: &SampleBlock) -> Result<(), BlockError> {
        if self.format != other.format {
            return Err(BlockError::FormatMismatch {
                left: self.format,
                right: other.format,
            });
        }
        Ok(())
    }
}
