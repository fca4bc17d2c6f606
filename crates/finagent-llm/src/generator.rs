//! Text generator trait and request type

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

/// A single prompt-in, text-out generation request.
///
/// The whole system talks to its generative backend through this one
/// shape: a model id, a prompt, and a temperature chosen by the caller
/// for the task at hand (low for calculations, higher for free-form
/// text).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Model identifier (provider-specific)
    pub model: String,

    /// The full prompt text
    pub prompt: String,

    /// Sampling temperature (0.0-1.0)
    pub temperature: f32,

    /// Maximum tokens to generate
    pub max_output_tokens: usize,
}

impl GenerationRequest {
    /// Create a builder for generation requests
    pub fn builder(model: impl Into<String>) -> GenerationRequestBuilder {
        GenerationRequestBuilder::new(model)
    }
}

/// Builder for GenerationRequest
pub struct GenerationRequestBuilder {
    model: String,
    prompt: String,
    temperature: f32,
    max_output_tokens: usize,
}

impl GenerationRequestBuilder {
    /// Create a new builder
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: String::new(),
            temperature: 0.7,
            max_output_tokens: 1024,
        }
    }

    /// Set the prompt text
    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Set the sampling temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the output token ceiling
    pub fn max_output_tokens(mut self, max_output_tokens: usize) -> Self {
        self.max_output_tokens = max_output_tokens;
        self
    }

    /// Build the request
    pub fn build(self) -> GenerationRequest {
        GenerationRequest {
            model: self.model,
            prompt: self.prompt,
            temperature: self.temperature,
            max_output_tokens: self.max_output_tokens,
        }
    }
}

/// Trait for text generators
///
/// Implementations provide access to a generative backend. Callers must
/// treat every response as fallible-to-parse: the returned text may or
/// may not be the structured record the prompt asked for.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate text for the given request
    async fn generate(&self, request: GenerationRequest) -> Result<String>;

    /// Get the generator name (e.g., "gemini")
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_applies_defaults() {
        let request = GenerationRequest::builder("gemini-2.0-flash")
            .prompt("hola")
            .build();
        assert_eq!(request.model, "gemini-2.0-flash");
        assert_eq!(request.prompt, "hola");
        assert!((request.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(request.max_output_tokens, 1024);
    }

    #[test]
    fn builder_overrides_defaults() {
        let request = GenerationRequest::builder("gemini-2.5-flash")
            .prompt("calcula")
            .temperature(0.2)
            .max_output_tokens(2048)
            .build();
        assert!((request.temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(request.max_output_tokens, 2048);
    }
}
