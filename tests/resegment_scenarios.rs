use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use sample_rechunker::resegment::{FixedSizeResegmenter, Phase};
use sample_rechunker::source::{BlockSource, MemorySource, SourceError};
use sample_rechunker::{SampleBlock, SampleFormat};

fn mono16() -> SampleFormat {
    SampleFormat::pcm16(1, 44_100).expect("format")
}

/// 通し番号入りのブロック列（連結すれば 0,1,2,... の並びになる）
fn numbered_blocks(format: SampleFormat, sizes: &[usize]) -> Vec<SampleBlock> {
    let width = format.bytes_per_sample();
    let mut counter = 0_u32;
    sizes
        .iter()
        .map(|&size| {
            let mut data = Vec::with_capacity(size * width);
            for _ in 0..size * width {
                data.push((counter % 251) as u8);
                counter += 1;
            }
            SampleBlock::new(format, data).expect("block")
        })
        .collect()
}

fn concat(blocks: &[SampleBlock]) -> Vec<u8> {
    blocks.iter().flat_map(|b| b.as_bytes().to_vec()).collect()
}

fn drain<S: BlockSource>(resegmenter: &mut FixedSizeResegmenter<S>) -> Vec<SampleBlock> {
    let mut out = Vec::new();
    while let Some(block) = resegmenter.next_block().expect("next block") {
        out.push(block);
    }
    out
}

/// 取得回数を数えるソース
struct CountingSource {
    inner: MemorySource,
    pulls: usize,
}

impl BlockSource for CountingSource {
    fn pull(&mut self) -> Result<Option<SampleBlock>, SourceError> {
        self.pulls += 1;
        self.inner.pull()
    }
}

#[test]
fn three_short_blocks_become_one_full_and_one_tail() {
    let source = MemorySource::new(numbered_blocks(mono16(), &[200, 200, 200]));
    let mut resegmenter = FixedSizeResegmenter::new(512, source).expect("resegmenter");

    let first = resegmenter.next_block().unwrap().expect("first block");
    assert_eq!(first.num_samples(), 512);
    assert_eq!(resegmenter.pending_samples(), 88);

    let second = resegmenter.next_block().unwrap().expect("tail block");
    assert_eq!(second.num_samples(), 88);

    assert!(resegmenter.next_block().unwrap().is_none());
}

#[test]
fn exactly_sized_block_is_returned_as_is() {
    let blocks = numbered_blocks(mono16(), &[512]);
    let expected = blocks[0].clone();
    let mut resegmenter =
        FixedSizeResegmenter::new(512, MemorySource::new(blocks)).expect("resegmenter");

    assert_eq!(resegmenter.next_block().unwrap(), Some(expected));
    assert!(resegmenter.next_block().unwrap().is_none());
}

#[test]
fn immediately_exhausted_source_ends_stream() {
    let mut resegmenter =
        FixedSizeResegmenter::new(512, MemorySource::default()).expect("resegmenter");
    assert!(resegmenter.next_block().unwrap().is_none());
}

#[test]
fn oversized_block_is_split_across_calls() {
    let mut source = CountingSource {
        inner: MemorySource::new(numbered_blocks(mono16(), &[700])),
        pulls: 0,
    };
    let mut resegmenter = FixedSizeResegmenter::new(256, &mut source).expect("resegmenter");

    let sizes: Vec<usize> = drain(&mut resegmenter)
        .iter()
        .map(SampleBlock::num_samples)
        .collect();
    assert_eq!(sizes, vec![256, 256, 188]);
    assert!(resegmenter.next_block().unwrap().is_none());
    drop(resegmenter);

    // 700 の取得と終端通知の2回のみ
    assert_eq!(source.pulls, 2);
}

#[test]
fn source_ending_inside_growth_loop_emits_short_tail() {
    // 3 + 2 = 5 < 8 の時点で終端：成長ループ中の終端は短い最終ブロックとして扱う
    let blocks = numbered_blocks(mono16(), &[3, 2]);
    let expected = concat(&blocks);
    let mut resegmenter =
        FixedSizeResegmenter::new(8, MemorySource::new(blocks)).expect("resegmenter");

    let tail = resegmenter.next_block().unwrap().expect("short tail");
    assert_eq!(tail.num_samples(), 5);
    assert_eq!(tail.as_bytes(), expected.as_slice());
    assert_eq!(resegmenter.phase(), Phase::Terminated);
    assert!(resegmenter.next_block().unwrap().is_none());
}

#[test]
fn random_streams_keep_size_order_and_content() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let stereo24 = SampleFormat::new(24, 2, 48_000).expect("format");

    for round in 0..200 {
        let required = rng.random_range(1..=64);
        let count = rng.random_range(0..12);
        let sizes: Vec<usize> = (0..count).map(|_| rng.random_range(0..150)).collect();
        let blocks = numbered_blocks(stereo24, &sizes);
        let expected = concat(&blocks);
        let total: usize = sizes.iter().sum();

        let mut resegmenter =
            FixedSizeResegmenter::new(required, MemorySource::new(blocks)).expect("resegmenter");
        let emitted = drain(&mut resegmenter);

        let (last, body) = match emitted.split_last() {
            Some(parts) => parts,
            None => {
                assert_eq!(total, 0, "round {round}: nothing emitted for non-empty stream");
                continue;
            }
        };
        for block in body {
            assert_eq!(block.num_samples(), required, "round {round}");
        }
        assert!(
            (1..=required).contains(&last.num_samples()),
            "round {round}: tail of {} samples",
            last.num_samples()
        );
        assert_eq!(concat(&emitted), expected, "round {round}");
        assert_eq!(body.len() + 1, total.div_ceil(required), "round {round}");

        for _ in 0..3 {
            assert!(resegmenter.next_block().unwrap().is_none());
        }
    }
}

#[test]
fn split_head_and_pending_tail_reassemble_source_block() {
    let blocks = numbered_blocks(mono16(), &[10]);
    let original = blocks[0].as_bytes().to_vec();
    let mut resegmenter =
        FixedSizeResegmenter::new(4, MemorySource::new(blocks)).expect("resegmenter");

    let head = resegmenter.next_block().unwrap().expect("head");
    assert_eq!(resegmenter.pending_samples(), 6);

    let rest: Vec<u8> = drain(&mut resegmenter)
        .iter()
        .flat_map(|b| b.as_bytes().to_vec())
        .collect();
    let mut reassembled = head.as_bytes().to_vec();
    reassembled.extend_from_slice(&rest);
    assert_eq!(reassembled, original);
}

#[test]
fn iterator_adapter_yields_same_blocks() {
    let sizes = [5, 9, 1, 17, 3];
    let via_iter: Vec<usize> =
        FixedSizeResegmenter::new(8, MemorySource::new(numbered_blocks(mono16(), &sizes)))
            .expect("resegmenter")
            .map(|block| block.expect("block").num_samples())
            .collect();
    assert_eq!(via_iter, vec![8, 8, 8, 8, 3]);
}

#[test]
fn retry_after_source_error_loses_nothing() {
    struct Flaky {
        script: VecDeque<Result<SampleBlock, SourceError>>,
    }

    impl BlockSource for Flaky {
        fn pull(&mut self) -> Result<Option<SampleBlock>, SourceError> {
            self.script.pop_front().transpose()
        }
    }

    let blocks = numbered_blocks(mono16(), &[3, 3, 3, 3]);
    let expected = concat(&blocks);
    let mut script: VecDeque<Result<SampleBlock, SourceError>> = VecDeque::new();
    for (i, block) in blocks.into_iter().enumerate() {
        if i % 2 == 1 {
            script.push_back(Err(SourceError::Decode {
                message: format!("glitch {i}"),
            }));
        }
        script.push_back(Ok(block));
    }

    let mut resegmenter = FixedSizeResegmenter::new(4, Flaky { script }).expect("resegmenter");
    let mut emitted = Vec::new();
    let mut failures = 0;
    loop {
        match resegmenter.next_block() {
            Ok(Some(block)) => emitted.push(block),
            Ok(None) => break,
            Err(_) => failures += 1,
        }
    }

    assert_eq!(failures, 2);
    assert_eq!(
        emitted.iter().map(SampleBlock::num_samples).collect::<Vec<_>>(),
        vec![4, 4, 4]
    );
    assert_eq!(concat(&emitted), expected);
}
