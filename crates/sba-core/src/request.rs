//! Analysis requests and routing

use crate::error::PipelineError;
use sba_dataset::DatasetHandle;
use sba_narrative::{AnalysisKind, NarrativeError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which analyzer serves a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalyzerRoute {
    /// Deterministic subprocess producing an image and a summary
    Statistical,
    /// Generative model producing a structured write-up
    Narrative,
}

impl AnalyzerRoute {
    /// Route used when the request does not name one
    #[must_use]
    pub fn default_for(kind: AnalysisKind) -> Self {
        match kind {
            AnalysisKind::PositioningMatrix => Self::Statistical,
            AnalysisKind::NicheMarket | AnalysisKind::ProductPrototype | AnalysisKind::QuestionToStar => {
                Self::Narrative
            }
        }
    }

    /// Whether `kind` can be served on this route
    #[must_use]
    pub fn supports(self, kind: AnalysisKind) -> bool {
        match self {
            Self::Statistical => kind == AnalysisKind::PositioningMatrix,
            Self::Narrative => true,
        }
    }

    /// Wire label
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Statistical => "statistical",
            Self::Narrative => "narrative",
        }
    }
}

impl fmt::Display for AnalyzerRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalyzerRoute {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "statistical" => Ok(Self::Statistical),
            "narrative" => Ok(Self::Narrative),
            other => Err(format!("unknown analyzer route `{other}` (expected statistical or narrative)")),
        }
    }
}

/// One analysis request
///
/// The kind is kept as the raw label so that unknown labels reach the
/// pipeline and come back as a typed `UnsupportedKind` failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// Dataset to analyze
    pub dataset: DatasetHandle,
    /// Requested analysis label
    pub kind: String,
    /// Forced route, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<AnalyzerRoute>,
}

impl AnalysisRequest {
    /// Create request on the default route for its kind
    #[must_use]
    pub fn new(dataset: DatasetHandle, kind: impl Into<String>) -> Self {
        Self {
            dataset,
            kind: kind.into(),
            route: None,
        }
    }

    /// Force a route
    #[inline]
    #[must_use]
    pub fn with_route(mut self, route: AnalyzerRoute) -> Self {
        self.route = Some(route);
        self
    }

    /// Parse the kind and settle the route
    ///
    /// # Errors
    /// `UnsupportedKind` for an unknown label or a kind the forced route
    /// cannot serve.
    pub fn resolve(&self) -> Result<(AnalysisKind, AnalyzerRoute), PipelineError> {
        let kind = self
            .kind
            .parse::<AnalysisKind>()
            .map_err(|e| PipelineError::Narrative(NarrativeError::UnsupportedKind(e)))?;
        let route = self.route.unwrap_or_else(|| AnalyzerRoute::default_for(kind));
        if !route.supports(kind) {
            return Err(PipelineError::NoStatisticalAnalyzer { kind });
        }
        Ok((kind, route))
    }
}
