//! Decoding parameters sent with every prompt

use serde::{Deserialize, Serialize};

/// Sampling configuration shared by all analysis kinds
///
/// Serializes with the camelCase names the model API expects for its
/// `generationConfig` object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerationParams {
    /// Sampling temperature
    pub temperature: f32,
    /// Top-k cutoff
    pub top_k: u32,
    /// Nucleus sampling mass
    pub top_p: f32,
    /// Reply length ceiling
    pub max_output_tokens: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_k: 40,
            top_p: 0.95,
            max_output_tokens: 8192,
        }
    }
}

impl GenerationParams {
    /// Set temperature
    #[inline]
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set reply length ceiling
    #[inline]
    #[must_use]
    pub fn with_max_output_tokens(mut self, tokens: u32) -> Self {
        self.max_output_tokens = tokens;
        self
    }
}
