//! Answer synthesis, single-turn chat and the fragment stream they share

pub mod chat;
pub mod prompt;
pub mod stream;
pub mod synthesizer;

pub use chat::ChatPipeline;
pub use prompt::PromptBuilder;
pub use stream::{StreamOutcome, TextStream};
pub use synthesizer::AnswerSynthesizer;
