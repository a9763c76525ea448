//! サンプルフォーマット記述子
use std::time::Duration;

use serde::Deserialize;

use super::BlockError;

/// PCMサンプルのフォーマット（ビット深度・チャネル数・サンプルレート）
///
/// 1サンプルはインターリーブされた1フレーム（全チャネル分）として数える。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub struct SampleFormat {
    pub bits_per_sample: u16,
    pub channels: u16,
    pub sample_rate_hz: u32,
}

impl SampleFormat {
    /// 検証済みのフォーマットを作成
    pub fn new(bits_per_sample: u16, channels: u16, sample_rate_hz: u32) -> Result<Self, BlockError> {
        let format = Self {
            bits_per_sample,
            channels,
            sample_rate_hz,
        };
        format.validate()?;
        Ok(format)
    }

    /// 16bit符号付きPCM
    pub fn pcm16(channels: u16, sample_rate_hz: u32) -> Result<Self, BlockError> {
        Self::new(16, channels, sample_rate_hz)
    }

    /// バイト単位のビット深度（8/16/24/32）と1以上のチャネル数のみ受け付ける
    pub fn validate(&self) -> Result<(), BlockError> {
        let whole_bytes = matches!(self.bits_per_sample, 8 | 16 | 24 | 32);
        if !whole_bytes || self.channels == 0 || self.sample_rate_hz == 0 {
            return Err(BlockError::UnsupportedFormat {
                bits_per_sample: self.bits_per_sample,
                channels: self.channels,
                sample_rate_hz: self.sample_rate_hz,
            });
        }
        Ok(())
    }

    /// 1チャネル1サンプルあたりのバイト数
    pub fn bytes_per_channel_sample(&self) -> usize {
        usize::from(self.bits_per_sample / 8)
    }

    /// 1フレーム（全チャネル）あたりのバイト数
    pub fn bytes_per_sample(&self) -> usize {
        self.bytes_per_channel_sample() * usize::from(self.channels)
    }

    /// サンプル数を再生時間へ換算
    pub fn duration_of(&self, samples: usize) -> Duration {
        Duration::from_secs_f64(samples as f64 / f64::from(self.sample_rate_hz))
    }
}
