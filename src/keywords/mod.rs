mod pipeline;
mod ranker;
mod stopwords;
mod tokenizer;

pub use pipeline::KeywordPipeline;
pub use ranker::DEFAULT_TOP_K;
pub use stopwords::{StopwordFilter, DEFAULT_MIN_CHARS};
pub use tokenizer::TokenizerKind;
