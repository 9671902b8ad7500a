//! The executor.

pub use matcher::{MatchOptions, Matcher, Progress};
pub use sink::{CountSink, Embedding, EmbeddingSink, WriterSink};

mod matcher;
mod sink;
