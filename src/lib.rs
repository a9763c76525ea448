pub mod block;
pub mod config;
pub mod resegment;
pub mod source;

pub use block::{BlockError, SampleBlock, SampleFormat};
pub use config::ConfigSet;
pub use resegment::{FixedSizeResegmenter, ResegmentError, TailPolicy};
pub use source::{BlockSource, SourceError};
