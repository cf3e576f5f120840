//! Document ingestion: text extraction, chunking and the embed-then-replace pipeline

mod chunker;
mod parser;
mod processor;

pub use chunker::{chunk, TextChunker, TextSpan};
pub use parser::{ExtractedText, FileParser, TextExtractor};
pub use processor::IngestPipeline;
