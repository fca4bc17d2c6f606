//! Text generation abstraction for finagent-rs
//!
//! This crate separates the agents from the generative backend. It
//! includes:
//!
//! - The [`TextGenerator`] trait and [`GenerationRequest`] type
//! - Interpretation of generator output as structured records, with the
//!   [`Interpreted`] sum type keeping degraded results distinguishable
//! - Concrete provider implementations (behind feature flags)

pub mod error;
pub mod generator;
pub mod interpret;

// Re-export main types
pub use error::{GeneratorError, Result};
pub use generator::{GenerationRequest, GenerationRequestBuilder, TextGenerator};
pub use interpret::{Interpreted, parse_json_block};

// Provider implementations (feature-gated)
#[cfg(feature = "gemini")]
pub mod providers;
