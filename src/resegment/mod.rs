//! 固定サイズ再分割（リセグメンテーション）
//!
//! `FixedSizeResegmenter` は任意サイズのブロックを返す `BlockSource` の上に立ち、
//! 常にちょうど `required_size` サンプルのブロックを返すプル型の変換器。
//! 終端では `required_size` 未満の最終ブロックを1つだけ返しうる（`TailPolicy` で破棄も可）。
//!
//! - 前回の分割で生じた余剰が `required_size` を超えていれば、ソースから取得せずに再利用
//! - 分割・連結が不要な場合はブロックをそのまま返す（コピーなし）
//! - ソースの取得失敗は呼び出し元へそのまま返し、保留中のサンプルは失わない
mod error;
mod stats;

use serde::Deserialize;
use tracing::{debug, trace};

use crate::block::SampleBlock;
use crate::config::ResegmentConfig;
use crate::source::BlockSource;

pub use error::ResegmentError;
pub use stats::ResegmentStats;

/// 終端で `required_size` に満たない残りをどう扱うか
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TailPolicy {
    /// 短い最終ブロックとして出力
    #[default]
    Emit,
    /// 破棄して終端とする
    Drop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// ソースはまだ終端に達していない
    Active,
    /// ソースが終端に達し、保留中の残りを出力中
    ///
    /// 残りの出力は同じ呼び出し内で完了するため `phase()` からは観測されず、
    /// 末尾出力時のデバッグログにのみ現れる。
    Draining,
    /// 以降の呼び出しは常に終端を返す
    Terminated,
}

#[derive(Debug)]
pub struct FixedSizeResegmenter<S> {
    source: S,
    required_size: usize,
    tail_policy: TailPolicy,
    pending: Option<SampleBlock>,
    phase: Phase,
    stats: ResegmentStats,
}

impl<S: BlockSource> FixedSizeResegmenter<S> {
    /// 1ブロックあたりのサンプル数とソースを指定して作成
    pub fn new(required_size: usize, source: S) -> Result<Self, ResegmentError> {
        if required_size == 0 {
            return Err(ResegmentError::InvalidRequiredSize(required_size));
        }

        Ok(Self {
            source,
            required_size,
            tail_policy: TailPolicy::default(),
            pending: None,
            phase: Phase::Active,
            stats: ResegmentStats::default(),
        })
    }

    /// 設定値（サイズ・末尾ポリシー・2の冪制約）から作成
    pub fn from_config(config: &ResegmentConfig, source: S) -> Result<Self, ResegmentError> {
        if config.require_power_of_two
            && config.required_size > 0
            && !config.required_size.is_power_of_two()
        {
            return Err(ResegmentError::NotPowerOfTwo(config.required_size));
        }
        Ok(Self::new(config.required_size, source)?.with_tail_policy(config.tail_policy))
    }

    pub fn with_tail_policy(mut self, tail_policy: TailPolicy) -> Self {
        self.tail_policy = tail_policy;
        self
    }

    pub fn required_size(&self) -> usize {
        self.required_size
    }

    pub fn tail_policy(&self) -> TailPolicy {
        self.tail_policy
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn stats(&self) -> ResegmentStats {
        self.stats
    }

    /// 保留中（未出力）のサンプル数
    pub fn pending_samples(&self) -> usize {
        self.pending.as_ref().map_or(0, SampleBlock::num_samples)
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// ソースを取り出す（保留中のサンプルは破棄される）
    pub fn into_inner(self) -> S {
        self.source
    }

    /// 次の固定サイズブロックを取得（終端なら `None`）
    pub fn next_block(&mut self) -> Result<Option<SampleBlock>, ResegmentError> {
        if self.phase == Phase::Terminated {
            return Ok(None);
        }

        let mut working = match self.pending.take() {
            Some(surplus) if surplus.num_samples() > self.required_size => {
                self.stats.surplus_reuses += 1;
                trace!(pending = surplus.num_samples(), "reusing surplus without pulling");
                surplus
            }
            leftover => {
                self.pending = leftover;
                match self.pull()? {
                    Some(pulled) => self.merge_pending(pulled)?,
                    None => {
                        let remainder = self.pending.take();
                        return Ok(self.finish(remainder));
                    }
                }
            }
        };

        while working.num_samples() < self.required_size {
            let next = match self.pull() {
                Ok(next) => next,
                Err(err) => {
                    self.stash(working);
                    return Err(err);
                }
            };
            let Some(next) = next else {
                return Ok(self.finish(Some(working)));
            };
            working = match working.append(&next) {
                Ok(grown) => grown,
                Err(err) => {
                    self.stash(working);
                    return Err(err.into());
                }
            };
            self.stats.merges += 1;
        }

        if working.num_samples() == self.required_size {
            return Ok(Some(self.emit(working)));
        }

        let (head, tail) = match split_at(&working, self.required_size) {
            Ok(parts) => parts,
            Err(err) => {
                self.stash(working);
                return Err(err.into());
            }
        };
        self.stats.splits += 1;
        trace!(surplus = tail.num_samples(), "split surplus into pending");
        self.pending = Some(tail);
        Ok(Some(self.emit(head)))
    }

    fn pull(&mut self) -> Result<Option<SampleBlock>, ResegmentError> {
        let pulled = self.source.pull()?;
        self.stats.pulls += 1;
        match &pulled {
            Some(block) => trace!(samples = block.num_samples(), "pulled block"),
            None => trace!("source exhausted"),
        }
        Ok(pulled)
    }

    /// 保留中のサンプルを取得したブロックの前に連結
    fn merge_pending(&mut self, pulled: SampleBlock) -> Result<SampleBlock, ResegmentError> {
        match self.pending.take() {
            Some(leftover) if !leftover.is_empty() => match pulled.prepend(&leftover) {
                Ok(merged) => {
                    self.stats.merges += 1;
                    Ok(merged)
                }
                Err(err) => {
                    self.pending = Some(leftover);
                    Err(err.into())
                }
            },
            _ => Ok(pulled),
        }
    }

    fn stash(&mut self, working: SampleBlock) {
        self.pending = (!working.is_empty()).then_some(working);
    }

    fn emit(&mut self, block: SampleBlock) -> SampleBlock {
        self.stats.blocks_emitted += 1;
        self.stats.samples_emitted += block.num_samples() as u64;
        trace!(samples = block.num_samples(), "emitting block");
        block
    }

    /// ソース終端時の処理：残りを出力（または破棄）して終了状態へ
    fn finish(&mut self, remainder: Option<SampleBlock>) -> Option<SampleBlock> {
        let remainder = remainder.filter(|block| !block.is_empty());
        let tail = match remainder {
            Some(block) => {
                self.phase = Phase::Draining;
                self.flush_tail(block)
            }
            None => None,
        };

        self.phase = Phase::Terminated;
        debug!(
            blocks = self.stats.blocks_emitted,
            samples = self.stats.samples_emitted,
            pulls = self.stats.pulls,
            "resegmenter reached end of stream"
        );
        tail
    }

    /// 終端の残りを出力する。ちょうど `required_size` のブロックはポリシーに関係なく出力
    fn flush_tail(&mut self, block: SampleBlock) -> Option<SampleBlock> {
        let short = block.num_samples() < self.required_size;
        match self.tail_policy {
            TailPolicy::Drop if short => {
                debug!(samples = block.num_samples(), phase = ?self.phase, "dropping short final block");
                self.stats.samples_dropped += block.num_samples() as u64;
                None
            }
            _ => {
                debug!(samples = block.num_samples(), phase = ?self.phase, "flushing final block");
                Some(self.emit(block))
            }
        }
    }
}

impl<S: BlockSource> Iterator for FixedSizeResegmenter<S> {
    type Item = Result<SampleBlock, ResegmentError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_block().transpose()
    }
}

fn split_at(
    block: &SampleBlock,
    at: usize,
) -> Result<(SampleBlock, SampleBlock), crate::block::BlockError> {
    let head = block.slice(0, at)?;
    let tail = block.slice(at, block.num_samples() - at)?;
    Ok((head, tail))
}
