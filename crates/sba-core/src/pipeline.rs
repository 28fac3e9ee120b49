//! Analysis pipeline facade
//!
//! ```text
//! request ─> resolve kind/route ─> validate dataset
//!              ├─ statistical: analyzer process ─> artifact reader
//!              └─ narrative:   row sampler ─> narrative generator
//!            ─> envelope
//! ```

use crate::config::PipelineConfig;
use crate::envelope::{AnalysisEnvelope, AnalysisOutcome, AnalysisPayload};
use crate::error::PipelineError;
use crate::request::{AnalysisRequest, AnalyzerRoute};
use sba_artifact::{ArtifactReader, MatrixArtifacts};
use sba_dataset::{sample_rows, DatasetHandle, DatasetValidator};
use sba_narrative::{AnalysisKind, GeminiClient, ModelClient, NarrativeGenerator, NarrativeResult};
use sba_process::{ProcessOrchestrator, StatisticalRunner};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use ulid::Ulid;

/// Routes requests to the statistical analyzer or the model and wraps the
/// result in an envelope
///
/// Holds no per-request state and is safe to share behind `Arc`.
pub struct AnalysisPipeline {
    validator: DatasetValidator,
    runner: Arc<dyn StatisticalRunner>,
    artifacts: ArtifactReader,
    generator: NarrativeGenerator,
    output_dir: PathBuf,
    timeout: Duration,
    limiter: Option<Arc<Semaphore>>,
}

impl std::fmt::Debug for AnalysisPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisPipeline")
            .field("validator", &self.validator)
            .field("generator", &self.generator)
            .field("output_dir", &self.output_dir)
            .field("timeout", &self.timeout)
            .field("max_concurrent_runs", &self.limiter.as_ref().map(|_| "bounded"))
            .finish_non_exhaustive()
    }
}

impl AnalysisPipeline {
    /// Build the production pipeline: local analyzer process and Gemini
    #[must_use]
    pub fn from_config(config: &PipelineConfig) -> Self {
        let runner = ProcessOrchestrator::new(config.analyzer.command());
        let model = GeminiClient::new(config.model.gemini());
        Self::with_components(config, Arc::new(runner), Arc::new(model))
    }

    /// Build a pipeline over caller-supplied analyzer backends
    #[must_use]
    pub fn with_components(
        config: &PipelineConfig,
        runner: Arc<dyn StatisticalRunner>,
        model: Arc<dyn ModelClient>,
    ) -> Self {
        let generator = NarrativeGenerator::new(model)
            .with_params(config.model.generation)
            .with_sample_cap(config.dataset.sample_cap);
        Self {
            validator: DatasetValidator::new(config.dataset.probe_bytes),
            runner,
            artifacts: ArtifactReader::new(),
            generator,
            output_dir: config.analyzer.output_dir.clone(),
            timeout: config.analyzer.timeout(),
            limiter: config
                .analyzer
                .max_concurrent_runs
                .map(|max| Arc::new(Semaphore::new(max.max(1)))),
        }
    }

    /// Directory receiving analyzer artifacts
    #[inline]
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Analyzer time budget
    #[inline]
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Image path the analyzer is asked to write for a run
    #[must_use]
    pub fn image_path(&self, run_id: Ulid) -> PathBuf {
        self.output_dir.join(format!("positioning_matrix_{run_id}.png"))
    }

    /// Run one request and wrap the result
    ///
    /// Never fails; every failure becomes an `ok: false` envelope.
    pub async fn analyze(&self, request: &AnalysisRequest) -> AnalysisEnvelope {
        AnalysisEnvelope::from_result(self.run(request).await)
    }

    /// Run one request
    ///
    /// # Errors
    /// Any `PipelineError`; see `ErrorKind` for the categories.
    pub async fn run(&self, request: &AnalysisRequest) -> Result<AnalysisOutcome, PipelineError> {
        let run_id = Ulid::new();
        let (kind, route) = request.resolve().map_err(|e| {
            tracing::warn!("[{}] Rejecting request for `{}`: {}", run_id, request.kind, e);
            e
        })?;
        tracing::info!(
            "[{}] Starting {} analysis of {} via {} analyzer",
            run_id,
            kind,
            request.dataset.path().display(),
            route
        );

        let result = match route {
            AnalyzerRoute::Statistical => self
                .run_statistical(run_id, &request.dataset)
                .await
                .map(AnalysisPayload::Matrix),
            AnalyzerRoute::Narrative => self
                .run_narrative(&request.dataset, kind)
                .await
                .map(AnalysisPayload::Narrative),
        };

        match result {
            Ok(payload) => {
                tracing::info!("[{}] {} analysis complete", run_id, kind);
                Ok(AnalysisOutcome {
                    run_id,
                    kind,
                    route,
                    payload,
                })
            }
            Err(e) => {
                tracing::warn!("[{}] {} analysis failed ({}): {}", run_id, kind, e.kind(), e);
                Err(e)
            }
        }
    }

    async fn run_statistical(
        &self,
        run_id: Ulid,
        dataset: &DatasetHandle,
    ) -> Result<MatrixArtifacts, PipelineError> {
        let validated = self.validator.validate(dataset).await?;

        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|source| PipelineError::OutputDir {
                path: self.output_dir.clone(),
                source,
            })?;
        let image_path = self.image_path(run_id);

        let _permit = match &self.limiter {
            Some(limiter) => limiter.acquire().await.ok(),
            None => None,
        };
        let exit = self
            .runner
            .run(validated.path(), &image_path, self.timeout)
            .await?;
        tracing::debug!(
            "[{}] Analyzer finished in {}ms",
            run_id,
            exit.elapsed.as_millis()
        );

        Ok(self.artifacts.read(&image_path).await?)
    }

    async fn run_narrative(
        &self,
        dataset: &DatasetHandle,
        kind: AnalysisKind,
    ) -> Result<NarrativeResult, PipelineError> {
        let validated = self.validator.validate(dataset).await?;
        let sample = sample_rows(&validated, self.generator.sample_cap()).await?;
        tracing::debug!(
            "Sampled {} rows (truncated: {}) from {}",
            sample.len(),
            sample.truncated,
            validated.path().display()
        );
        Ok(self.generator.generate(&sample, kind).await?)
    }
}
