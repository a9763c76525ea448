//! ブロック供給元（デコーダ・リーダ等）の抽象化
//!
//! `BlockSource` は任意サイズの `SampleBlock` を順に返し、終端で `Ok(None)` を返す。
//! 一度 `None` を返したソースはその後も `None` を返し続けること。
mod decoder;
mod error;
mod memory;
mod pcm_reader;

use crate::block::SampleBlock;

pub use decoder::DecoderSource;
pub use error::SourceError;
pub use memory::MemorySource;
pub use pcm_reader::PcmReaderSource;

pub trait BlockSource {
    /// 次のブロックを取得（終端なら `None`）
    fn pull(&mut self) -> Result<Option<SampleBlock>, SourceError>;
}

impl<S> BlockSource for &mut S
where
    S: BlockSource + ?Sized,
{
    fn pull(&mut self) -> Result<Option<SampleBlock>, SourceError> {
        (**self).pull()
    }
}

impl<S> BlockSource for Box<S>
where
    S: BlockSource + ?Sized,
{
    fn pull(&mut self) -> Result<Option<SampleBlock>, SourceError> {
        (**self).pull()
    }
}
