//! 入力ソースに関する設定値
use serde::Deserialize;

use crate::block::SampleFormat;

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// 生PCMを読む際の1回あたりの読み取りバイト数
    pub read_size_bytes: usize,
    /// 生PCM入力のフォーマット
    pub pcm: SampleFormat,
}
