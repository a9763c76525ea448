//! symphonia によるメディアファイルのデコードソース
//!
//! デコードしたパケットごとに、16bit符号付きリトルエンディアンのインターリーブPCMブロックを返す。
//! パケット長はコーデック・コンテナ次第で不定。
use std::fs::File;
use std::path::Path;

use bytes::{BufMut, BytesMut};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{Decoder, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::{MediaSource, MediaSourceStream};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, warn};

use crate::block::{SampleBlock, SampleFormat};

use super::{BlockSource, SourceError};

pub struct DecoderSource {
    reader: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
    track_id: u32,
    finished: bool,
}

impl DecoderSource {
    /// ファイルを開き、最初の音声トラックのデコーダを準備
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let file = File::open(path)?;

        let mut hint = Hint::new();
        if let Some(extension) = path.extension().and_then(|ext| ext.to_str()) {
            hint.with_extension(extension);
        }

        Self::from_media_source(Box::new(file), hint)
    }

    /// 任意の `MediaSource`（`Cursor<Vec<u8>>` 等）から作成
    pub fn from_media_source(source: Box<dyn MediaSource>, hint: Hint) -> Result<Self, SourceError> {
        let mss = MediaSourceStream::new(source, Default::default());
        let fmt_opts: FormatOptions = Default::default();
        let meta_opts: MetadataOptions = Default::default();

        let probed = symphonia::default::get_probe()
            .format(&hint, mss, &fmt_opts, &meta_opts)
            .map_err(decode_error)?;
        let reader = probed.format;

        let (track_id, codec_params) = {
            let track = reader
                .tracks()
                .iter()
                .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
                .ok_or_else(|| SourceError::Decode {
                    message: "no audio track found".to_string(),
                })?;
            (track.id, track.codec_params.clone())
        };

        let dec_opts: DecoderOptions = Default::default();
        let decoder = symphonia::default::get_codecs()
            .make(&codec_params, &dec_opts)
            .map_err(decode_error)?;

        debug!(
            track_id,
            sample_rate = ?codec_params.sample_rate,
            channels = ?codec_params.channels.map(|c| c.count()),
            "decoder opened"
        );

        Ok(Self {
            reader,
            decoder,
            track_id,
            finished: false,
        })
    }
}

impl BlockSource for DecoderSource {
    fn pull(&mut self) -> Result<Option<SampleBlock>, SourceError> {
        if self.finished {
            return Ok(None);
        }

        loop {
            let packet = match self.reader.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::ResetRequired) => {
                    self.finished = true;
                    return Ok(None);
                }
                Err(SymphoniaError::IoError(ref err))
                    if err.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    self.finished = true;
                    return Ok(None);
                }
                Err(err) => return Err(decode_error(err)),
            };

            if packet.track_id() != self.track_id {
                continue;
            }

            match self.decoder.decode(&packet) {
                Ok(decoded) => {
                    if decoded.frames() == 0 {
                        continue;
                    }
                    let spec = *decoded.spec();
                    let channels = u16::try_from(spec.channels.count()).map_err(|_| {
                        SourceError::Decode {
                            message: format!("too many channels: {}", spec.channels.count()),
                        }
                    })?;
                    let format = SampleFormat::pcm16(channels, spec.rate)?;

                    let mut samples = SampleBuffer::<i16>::new(decoded.capacity() as u64, spec);
                    samples.copy_interleaved_ref(decoded);

                    let mut data = BytesMut::with_capacity(samples.len() * 2);
                    for sample in samples.samples() {
                        data.put_i16_le(*sample);
                    }
                    return Ok(Some(SampleBlock::new(format, data.freeze())?));
                }
                Err(SymphoniaError::DecodeError(message)) => {
                    warn!(reason = message, "skipping undecodable packet");
                    continue;
                }
                Err(SymphoniaError::IoError(ref err))
                    if err.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    self.finished = true;
                    return Ok(None);
                }
                Err(err) => return Err(decode_error(err)),
            }
        }
    }
}

fn decode_error(err: SymphoniaError) -> SourceError {
    SourceError::Decode {
        message: err.to_string(),
    }
}
