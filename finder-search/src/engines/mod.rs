//! Concrete extraction backends.

pub mod gemini;

pub use gemini::GeminiExtractor;
