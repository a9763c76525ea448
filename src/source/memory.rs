use std::collections::VecDeque;

use crate::block::SampleBlock;

use super::{BlockSource, SourceError};

/// 事前に用意したブロック列を順に返すソース
#[derive(Debug, Default, Clone)]
pub struct MemorySource {
    blocks: VecDeque<SampleBlock>,
}

impl MemorySource {
    pub fn new(blocks: impl IntoIterator<Item = SampleBlock>) -> Self {
        Self {
            blocks: blocks.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.blocks.len()
    }
}

impl BlockSource for MemorySource {
    fn pull(&mut self) -> Result<Option<SampleBlock>, SourceError> {
        Ok(self.blocks.pop_front())
    }
}
