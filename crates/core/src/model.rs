//! Inference model selection.

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which inference algorithm the depth service should run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ModelChoice {
    /// Vision transformer based depth estimation.
    #[default]
    #[serde(rename = "deeplearning")]
    DeepLearning,
    /// Cheap non-learned baseline.
    #[serde(rename = "naive")]
    NaiveBaseline,
}

/// Every model the service accepts, in display order.
pub const AVAILABLE_MODELS: &[ModelChoice] = &[ModelChoice::DeepLearning, ModelChoice::NaiveBaseline];

impl ModelChoice {
    /// Identifier sent in the `model` field of the upload.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DeepLearning => "deeplearning",
            Self::NaiveBaseline => "naive",
        }
    }

    /// Human readable label for selectors.
    pub fn label(self) -> &'static str {
        match self {
            Self::DeepLearning => "Deep Learning (ViT)",
            Self::NaiveBaseline => "Naive Baseline",
        }
    }
}

impl fmt::Display for ModelChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelChoice {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AVAILABLE_MODELS
            .iter()
            .copied()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                AppError::config(format!(
                    "Unknown model '{}', expected one of: deeplearning, naive",
                    s
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_deep_learning() {
        assert_eq!(ModelChoice::default(), ModelChoice::DeepLearning);
    }

    #[test]
    fn parses_wire_identifiers() {
        assert_eq!("naive".parse::<ModelChoice>().unwrap(), ModelChoice::NaiveBaseline);
        assert_eq!(" DeepLearning ".parse::<ModelChoice>().unwrap(), ModelChoice::DeepLearning);
        assert!("vit".parse::<ModelChoice>().is_err());
    }

    #[test]
    fn serializes_as_wire_identifier() {
        let json = serde_json::to_string(&ModelChoice::NaiveBaseline).unwrap();
        assert_eq!(json, "\"naive\"");
    }
}
