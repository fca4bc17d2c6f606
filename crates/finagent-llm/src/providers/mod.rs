//! Concrete generator implementations
//!
//! Each provider is enabled by its feature flag:
//! - `gemini` - Google Gemini via the generateContent REST API

#[cfg(feature = "gemini")]
mod gemini;

#[cfg(feature = "gemini")]
pub use gemini::{GeminiConfig, GeminiGenerator};
