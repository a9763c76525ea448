use std::io::{ErrorKind, Read};

use bytes::BytesMut;
use tracing::trace;

use crate::block::{SampleBlock, SampleFormat};
use crate::config::SourceConfig;

use super::{BlockSource, SourceError};

/// 生のインターリーブPCMを `Read` から読み出すソース
///
/// 1回の `read` で得られた分をそのまま1ブロックにするため、ブロックサイズは不定。
/// フレーム途中で読み取りが切れた場合、端数バイトは次回に持ち越す。
#[derive(Debug)]
pub struct PcmReaderSource<R> {
    reader: R,
    format: SampleFormat,
    read_buf: Vec<u8>,
    carry: BytesMut,
    finished: bool,
}

impl<R: Read> PcmReaderSource<R> {
    pub fn new(reader: R, format: SampleFormat, read_size_bytes: usize) -> Result<Self, SourceError> {
        format.validate()?;
        if read_size_bytes == 0 {
            return Err(SourceError::InvalidReadSize);
        }
        Ok(Self {
            reader,
            format,
            read_buf: vec![0; read_size_bytes],
            carry: BytesMut::new(),
            finished: false,
        })
    }

    pub fn from_config(reader: R, config: &SourceConfig) -> Result<Self, SourceError> {
        Self::new(reader, config.pcm, config.read_size_bytes)
    }

    pub fn format(&self) -> SampleFormat {
        self.format
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: Read> BlockSource for PcmReaderSource<R> {
    fn pull(&mut self) -> Result<Option<SampleBlock>, SourceError> {
        if self.finished {
            return Ok(None);
        }

        let width = self.format.bytes_per_sample();
        loop {
            let read = match self.reader.read(&mut self.read_buf) {
                Ok(read) => read,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(err.into()),
            };

            if read == 0 {
                self.finished = true;
                if !self.carry.is_empty() {
                    let leftover = self.carry.len();
                    self.carry.clear();
                    return Err(SourceError::TruncatedFrame { leftover });
                }
                return Ok(None);
            }

            self.carry.extend_from_slice(&self.read_buf[..read]);
            let aligned = self.carry.len() - self.carry.len() % width;
            if aligned == 0 {
                continue;
            }

            let data = self.carry.split_to(aligned).freeze();
            trace!(bytes = data.len(), carried = self.carry.len(), "pcm read");
            return Ok(Some(SampleBlock::new(self.format, data)?));
        }
    }
}
