//! Supported analysis kinds

use crate::error::ParseKindError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Analysis requested for a dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    /// Growth/share quadrant placement of each product
    PositioningMatrix,
    /// Underserved segments worth entering
    NicheMarket,
    /// New product concepts for market gaps
    ProductPrototype,
    /// Plans for turning question-mark products into stars
    QuestionToStar,
}

impl AnalysisKind {
    /// Every supported kind, in display order
    #[must_use]
    pub const fn all() -> [Self; 4] {
        [
            Self::PositioningMatrix,
            Self::NicheMarket,
            Self::ProductPrototype,
            Self::QuestionToStar,
        ]
    }

    /// Wire label
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PositioningMatrix => "positioning_matrix",
            Self::NicheMarket => "niche_market",
            Self::ProductPrototype => "product_prototype",
            Self::QuestionToStar => "question_to_star",
        }
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalysisKind {
    type Err = ParseKindError;

    fn from_str(label: &str) -> Result<Self, Self::Err> {
        Self::all()
            .into_iter()
            .find(|kind| kind.as_str() == label)
            .ok_or_else(|| ParseKindError {
                label: label.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_round_trip() {
        for kind in AnalysisKind::all() {
            assert_eq!(kind.as_str().parse::<AnalysisKind>().unwrap(), kind);
            assert_eq!(
                serde_json::to_value(kind).unwrap(),
                serde_json::Value::String(kind.to_string())
            );
        }
    }

    #[test]
    fn unknown_labels_are_rejected() {
        let err = "swot".parse::<AnalysisKind>().unwrap_err();
        assert_eq!(err.label, "swot");
        assert_eq!(err.to_string(), "Unsupported analysis type: swot");
        assert!("Niche_Market".parse::<AnalysisKind>().is_err());
    }
}
