//! 再分割に関する設定値
use serde::Deserialize;

use crate::resegment::TailPolicy;

#[derive(Debug, Clone, Deserialize)]
pub struct ResegmentConfig {
    /// 出力1ブロックあたりのサンプル数
    pub required_size: usize,
    #[serde(default)]
    pub tail_policy: TailPolicy,
    /// FFT等のために2の冪を強制するか
    #[serde(default)]
    pub require_power_of_two: bool,
}
