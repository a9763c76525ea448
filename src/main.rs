use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use sample_rechunker::config::ConfigSet;
use sample_rechunker::resegment::{FixedSizeResegmenter, ResegmentError};
use sample_rechunker::source::{BlockSource, DecoderSource, PcmReaderSource, SourceError};

fn main() {
    init_tracing();

    let Some(input) = std::env::args_os().nth(1).map(PathBuf::from) else {
        error!("usage: sample_rechunker <audio-file>");
        std::process::exit(2);
    };

    let config = match ConfigSet::load_from_env() {
        Ok(config) => config,
        Err(err) => {
            error!(error = ?err, "failed to load configuration");
            std::process::exit(1);
        }
    };
    info!(root = ?config.root(), "configuration loaded");

    let result = if is_raw_pcm(&input) {
        open_raw(&input, &config).and_then(|source| run(source, &config))
    } else {
        DecoderSource::open(&input)
            .map_err(ResegmentError::from)
            .and_then(|source| run(source, &config))
    };

    if let Err(err) = result {
        error!(error = ?err, input = %input.display(), "resegmentation failed");
        std::process::exit(1);
    }
}

/// 拡張子 `.raw` / `.pcm` は設定のフォーマットに従う生PCMとして扱う
fn is_raw_pcm(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("raw") || ext.eq_ignore_ascii_case("pcm"))
        .unwrap_or(false)
}

fn open_raw(
    path: &Path,
    config: &ConfigSet,
) -> Result<PcmReaderSource<BufReader<File>>, ResegmentError> {
    let file = File::open(path).map_err(SourceError::from)?;
    Ok(PcmReaderSource::from_config(BufReader::new(file), &config.source)?)
}

fn run<S: BlockSource>(source: S, config: &ConfigSet) -> Result<(), ResegmentError> {
    let mut resegmenter = FixedSizeResegmenter::from_config(&config.resegmenter, source)?;
    info!(
        required_size = resegmenter.required_size(),
        tail_policy = ?resegmenter.tail_policy(),
        "resegmenting"
    );

    let mut index = 0_u64;
    while let Some(block) = resegmenter.next_block()? {
        debug!(
            index,
            samples = block.num_samples(),
            duration_ms = block.duration().as_millis() as u64,
            "block"
        );
        index += 1;
    }

    let stats = resegmenter.stats();
    info!(
        blocks = stats.blocks_emitted,
        samples = stats.samples_emitted,
        dropped = stats.samples_dropped,
        pulls = stats.pulls,
        splits = stats.splits,
        "resegmentation complete"
    );
    Ok(())
}

fn init_tracing() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .finish();

    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to install tracing subscriber: {err}");
    }
}
