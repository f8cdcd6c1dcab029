//! Answer synthesis over retrieved chunks.

pub mod synthesizer;

pub use synthesizer::AnswerSynthesizer;
