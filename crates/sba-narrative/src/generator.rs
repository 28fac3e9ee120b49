//! Narrative generator

use crate::client::ModelClient;
use crate::decode::decode_reply;
use crate::error::NarrativeError;
use crate::kind::AnalysisKind;
use crate::params::GenerationParams;
use crate::prompt::render_prompt;
use crate::result::NarrativeResult;
use sba_dataset::DatasetSample;
use std::sync::Arc;

/// Most rows ever embedded in a prompt
pub const DEFAULT_SAMPLE_CAP: usize = 100;

/// Prompts the model for one analysis and normalizes the reply
///
/// Holds no per-request state; share it behind `Arc` across requests.
#[derive(Clone)]
pub struct NarrativeGenerator {
    client: Arc<dyn ModelClient>,
    params: GenerationParams,
    sample_cap: usize,
}

impl std::fmt::Debug for NarrativeGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NarrativeGenerator")
            .field("params", &self.params)
            .field("sample_cap", &self.sample_cap)
            .finish_non_exhaustive()
    }
}

impl NarrativeGenerator {
    /// Create generator with default parameters and sample cap
    #[must_use]
    pub fn new(client: Arc<dyn ModelClient>) -> Self {
        Self {
            client,
            params: GenerationParams::default(),
            sample_cap: DEFAULT_SAMPLE_CAP,
        }
    }

    /// Set decoding parameters
    #[inline]
    #[must_use]
    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }

    /// Set sample cap
    #[inline]
    #[must_use]
    pub fn with_sample_cap(mut self, cap: usize) -> Self {
        self.sample_cap = cap;
        self
    }

    /// Decoding parameters
    #[inline]
    #[must_use]
    pub fn params(&self) -> &GenerationParams {
        &self.params
    }

    /// Sample cap
    #[inline]
    #[must_use]
    pub fn sample_cap(&self) -> usize {
        self.sample_cap
    }

    /// Generate an analysis for a kind given by its wire label
    ///
    /// # Errors
    /// `UnsupportedKind` for an unknown label, before the model is called;
    /// otherwise as [`generate`](Self::generate).
    pub async fn generate_for_label(
        &self,
        sample: &DatasetSample,
        label: &str,
    ) -> Result<NarrativeResult, NarrativeError> {
        let kind = label.parse::<AnalysisKind>().map_err(|e| {
            tracing::warn!("Rejecting narrative request: {}", e);
            e
        })?;
        self.generate(sample, kind).await
    }

    /// Generate an analysis
    ///
    /// Rows beyond the cap are dropped even if the caller sampled more.
    ///
    /// # Errors
    /// `ModelInvocation` when the model cannot be reached or returns no
    /// text. An undecodable reply is a degraded success.
    pub async fn generate(
        &self,
        sample: &DatasetSample,
        kind: AnalysisKind,
    ) -> Result<NarrativeResult, NarrativeError> {
        let rows_json = if sample.len() > self.sample_cap {
            let mut capped = sample.clone();
            capped.truncate(self.sample_cap);
            capped.rows_json()
        } else {
            sample.rows_json()
        };
        let prompt = render_prompt(kind, &rows_json);
        tracing::info!(
            "Generating {} analysis from {} rows",
            kind,
            sample.len().min(self.sample_cap)
        );

        let reply = self.client.complete(&prompt, &self.params).await.map_err(|e| {
            tracing::error!("Model call for {} failed: {}", kind, e);
            NarrativeError::ModelInvocation(e)
        })?;
        tracing::debug!("Model replied with {} bytes for {}", reply.len(), kind);

        let result = NarrativeResult::from(decode_reply(&reply));
        if result.is_degraded() {
            tracing::warn!("Model reply for {} had no decodable JSON", kind);
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockModelClient;
    use crate::error::ModelError;
    use serde_json::{json, Map, Value};

    fn sample(rows: usize) -> DatasetSample {
        let rows = (0..rows)
            .map(|i| {
                let mut row = Map::new();
                row.insert("Product".into(), Value::String(format!("item-{i}")));
                row
            })
            .collect();
        DatasetSample::from_rows(vec!["Product".into()], rows)
    }

    #[tokio::test]
    async fn unsupported_label_never_calls_model() {
        let mut client = MockModelClient::new();
        client.expect_complete().times(0);
        let generator = NarrativeGenerator::new(Arc::new(client));

        let err = generator.generate_for_label(&sample(1), "swot").await.unwrap_err();
        assert!(matches!(err, NarrativeError::UnsupportedKind(_)));
    }

    #[tokio::test]
    async fn prompt_is_capped() {
        let mut client = MockModelClient::new();
        client
            .expect_complete()
            .withf(|prompt, params| {
                prompt.contains("item-2") && !prompt.contains("item-3") && params.top_k == 40
            })
            .times(1)
            .returning(|_, _| Ok("{\"summary\":\"ok\"}".to_string()));
        let generator = NarrativeGenerator::new(Arc::new(client)).with_sample_cap(3);

        let result = generator
            .generate(&sample(10), AnalysisKind::ProductPrototype)
            .await
            .unwrap();
        assert_eq!(result, NarrativeResult::Structured(json!({"summary": "ok"})));
    }

    #[tokio::test]
    async fn unreadable_reply_degrades() {
        let mut client = MockModelClient::new();
        client
            .expect_complete()
            .returning(|_, _| Ok("The data looks great!".to_string()));
        let generator = NarrativeGenerator::new(Arc::new(client));

        let result = generator
            .generate_for_label(&sample(2), "niche_market")
            .await
            .unwrap();
        assert_eq!(result, NarrativeResult::degraded("The data looks great!"));
    }

    #[tokio::test]
    async fn model_failure_is_hard_error() {
        let mut client = MockModelClient::new();
        client
            .expect_complete()
            .returning(|_, _| Err(ModelError::EmptyResponse));
        let generator = NarrativeGenerator::new(Arc::new(client));

        let err = generator
            .generate(&sample(2), AnalysisKind::QuestionToStar)
            .await
            .unwrap_err();
        assert!(matches!(err, NarrativeError::ModelInvocation(ModelError::EmptyResponse)));
        assert!(err.to_string().starts_with("Failed to analyze data with AI: "));
    }
}
