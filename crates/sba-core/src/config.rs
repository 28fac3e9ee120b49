//! Pipeline configuration
//!
//! Defaults carry the canonical policy constants. A TOML file may override
//! any subset of them, and environment variables override the file.

use sba_dataset::DEFAULT_PROBE_BYTES;
use sba_narrative::{GeminiConfig, GenerationParams, DEFAULT_GEMINI_MODEL, DEFAULT_SAMPLE_CAP};
use sba_process::{AnalyzerCommand, DEFAULT_TIMEOUT};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("cannot read config file {}: {source}", .path.display())]
    Io {
        /// File that was requested
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Config text is not valid TOML for this schema
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// An environment override could not be parsed
    #[error("invalid value for {var}: {value:?}")]
    InvalidEnv {
        /// Variable name
        var: &'static str,
        /// Offending value
        value: String,
    },
}

/// Statistical analyzer settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Interpreter executable
    pub interpreter: PathBuf,
    /// Analyzer script
    pub script: PathBuf,
    /// Directory receiving images and summaries
    pub output_dir: PathBuf,
    /// Time budget per run
    pub timeout_ms: u64,
    /// Upper bound on simultaneous analyzer processes; unbounded if unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_concurrent_runs: Option<usize>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        let command = AnalyzerCommand::default();
        Self {
            interpreter: command.interpreter,
            script: command.script,
            output_dir: PathBuf::from("output"),
            timeout_ms: u64::try_from(DEFAULT_TIMEOUT.as_millis()).unwrap_or(60_000),
            max_concurrent_runs: None,
        }
    }
}

impl AnalyzerConfig {
    /// Command line for the analyzer
    #[must_use]
    pub fn command(&self) -> AnalyzerCommand {
        AnalyzerCommand::new(&self.interpreter, &self.script)
    }

    /// Time budget
    #[inline]
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Dataset handling settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// Bytes inspected for the delimiter check
    pub probe_bytes: usize,
    /// Most rows embedded in a prompt
    pub sample_cap: usize,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            probe_bytes: DEFAULT_PROBE_BYTES,
            sample_cap: DEFAULT_SAMPLE_CAP,
        }
    }
}

/// Generative model settings
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// API key; normally supplied through `GEMINI_API_KEY`
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Model name
    pub model: String,
    /// API root
    pub base_url: String,
    /// HTTP timeout
    pub timeout_ms: u64,
    /// Decoding parameters
    pub generation: GenerationParams,
}

impl Default for ModelConfig {
    fn default() -> Self {
        let gemini = GeminiConfig::default();
        Self {
            api_key: None,
            model: DEFAULT_GEMINI_MODEL.to_string(),
            base_url: gemini.base_url,
            timeout_ms: gemini.timeout_ms,
            generation: GenerationParams::default(),
        }
    }
}

impl std::fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout_ms", &self.timeout_ms)
            .field("generation", &self.generation)
            .finish()
    }
}

impl ModelConfig {
    /// Client settings for the Gemini backend
    #[must_use]
    pub fn gemini(&self) -> GeminiConfig {
        let config = GeminiConfig::default()
            .with_model(&self.model)
            .with_base_url(&self.base_url)
            .with_timeout_ms(self.timeout_ms);
        match &self.api_key {
            Some(key) => config.with_api_key(key),
            None => config,
        }
    }
}

/// Whole-pipeline configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Statistical analyzer
    pub analyzer: AnalyzerConfig,
    /// Dataset handling
    pub dataset: DatasetConfig,
    /// Generative model
    pub model: ModelConfig,
}

impl PipelineConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With analyzer command
    #[inline]
    #[must_use]
    pub fn with_analyzer(mut self, interpreter: impl Into<PathBuf>, script: impl Into<PathBuf>) -> Self {
        self.analyzer.interpreter = interpreter.into();
        self.analyzer.script = script.into();
        self
    }

    /// With output directory
    #[inline]
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.analyzer.output_dir = dir.into();
        self
    }

    /// With analyzer time budget
    #[inline]
    #[must_use]
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.analyzer.timeout_ms = timeout_ms;
        self
    }

    /// With analyzer concurrency bound
    #[inline]
    #[must_use]
    pub fn with_max_concurrent_runs(mut self, max: usize) -> Self {
        self.analyzer.max_concurrent_runs = Some(max);
        self
    }

    /// With prompt sample cap
    #[inline]
    #[must_use]
    pub fn with_sample_cap(mut self, cap: usize) -> Self {
        self.dataset.sample_cap = cap;
        self
    }

    /// With model API key
    #[inline]
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.model.api_key = Some(key.into());
        self
    }

    /// Parse TOML text
    ///
    /// # Errors
    /// `ConfigError::Parse` when the text is not valid for this schema.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load a TOML file
    ///
    /// # Errors
    /// `ConfigError::Io` or `ConfigError::Parse`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Apply overrides from the process environment
    ///
    /// # Errors
    /// `ConfigError::InvalidEnv` for an unparseable numeric override.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env_from(|var| std::env::var(var).ok())
    }

    /// Apply overrides from an arbitrary variable source
    ///
    /// Recognized: `GEMINI_API_KEY`, `SBA_MODEL`,
    /// `SBA_ANALYZER_INTERPRETER`, `SBA_ANALYZER_SCRIPT`, `SBA_OUTPUT_DIR`,
    /// `SBA_TIMEOUT_MS`. Empty values are ignored.
    ///
    /// # Errors
    /// `ConfigError::InvalidEnv` for an unparseable numeric override.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|value| !value.trim().is_empty());

        if let Some(key) = get("GEMINI_API_KEY") {
            self.model.api_key = Some(key);
        }
        if let Some(model) = get("SBA_MODEL") {
            self.model.model = model;
        }
        if let Some(interpreter) = get("SBA_ANALYZER_INTERPRETER") {
            self.analyzer.interpreter = interpreter.into();
        }
        if let Some(script) = get("SBA_ANALYZER_SCRIPT") {
            self.analyzer.script = script.into();
        }
        if let Some(dir) = get("SBA_OUTPUT_DIR") {
            self.analyzer.output_dir = dir.into();
        }
        if let Some(value) = get("SBA_TIMEOUT_MS") {
            self.analyzer.timeout_ms = value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                var: "SBA_TIMEOUT_MS",
                value,
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_are_canonical() {
        let config = PipelineConfig::default();
        assert_eq!(config.analyzer.timeout(), Duration::from_millis(60_000));
        assert_eq!(config.analyzer.max_concurrent_runs, None);
        assert_eq!(config.dataset.probe_bytes, 500);
        assert_eq!(config.dataset.sample_cap, 100);
        assert_eq!(config.model.timeout_ms, 30_000);
        assert_eq!(config.model.generation.max_output_tokens, 8192);
        assert!(config.model.api_key.is_none());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = PipelineConfig::from_toml_str(
            r#"
            [analyzer]
            interpreter = "python3"
            timeout_ms = 5000
            max_concurrent_runs = 2

            [model.generation]
            temperature = 0.2
            "#,
        )
        .unwrap();
        assert_eq!(config.analyzer.interpreter, PathBuf::from("python3"));
        assert_eq!(config.analyzer.script, AnalyzerCommand::default().script);
        assert_eq!(config.analyzer.timeout_ms, 5000);
        assert_eq!(config.analyzer.max_concurrent_runs, Some(2));
        assert_eq!(config.model.generation.top_k, 40);
        assert_eq!(config.dataset.sample_cap, 100);
    }

    #[test]
    fn malformed_toml_is_rejected() {
        let err = PipelineConfig::from_toml_str("[analyzer]\ntimeout_ms = \"soon\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn env_overrides_file() {
        let vars: HashMap<&str, &str> = [
            ("GEMINI_API_KEY", "k-123"),
            ("SBA_MODEL", "gemini-1.5-pro"),
            ("SBA_OUTPUT_DIR", "/tmp/matrices"),
            ("SBA_TIMEOUT_MS", "1500"),
            ("SBA_ANALYZER_SCRIPT", ""),
        ]
        .into_iter()
        .collect();
        let mut config = PipelineConfig::default();
        config
            .apply_env_from(|var| vars.get(var).map(ToString::to_string))
            .unwrap();

        assert_eq!(config.model.api_key.as_deref(), Some("k-123"));
        assert_eq!(config.model.gemini().model, "gemini-1.5-pro");
        assert_eq!(config.analyzer.output_dir, PathBuf::from("/tmp/matrices"));
        assert_eq!(config.analyzer.timeout_ms, 1500);
        assert_eq!(config.analyzer.script, AnalyzerCommand::default().script);
    }

    #[test]
    fn bad_numeric_env_is_reported() {
        let mut config = PipelineConfig::default();
        let err = config
            .apply_env_from(|var| (var == "SBA_TIMEOUT_MS").then(|| "ten".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { var: "SBA_TIMEOUT_MS", .. }));
    }

    #[test]
    fn key_is_not_serialized_or_debugged() {
        let config = PipelineConfig::default().with_api_key("secret");
        let text = toml::to_string(&config).unwrap();
        assert!(!text.contains("secret"));
        assert!(!format!("{config:?}").contains("secret"));
    }
}
