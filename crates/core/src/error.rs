use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Names the capability responsible for a failure so user-visible errors can
/// identify the stage that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Classification,
    Extraction,
    Research,
    FlightSearch,
    LodgingSearch,
    ActivityCuration,
    Synthesis,
    Review,
    Improve,
    QuickAnswer,
    FamilyAnalysis,
    HolidayResearch,
    DateSuggestion,
}

impl Capability {
    pub fn as_code(self) -> &'static str {
        match self {
            Self::Classification => "classification",
            Self::Extraction => "extraction",
            Self::Research => "research",
            Self::FlightSearch => "flight_search",
            Self::LodgingSearch => "lodging_search",
            Self::ActivityCuration => "activity_curation",
            Self::Synthesis => "synthesis",
            Self::Review => "review",
            Self::Improve => "improve",
            Self::QuickAnswer => "quick_answer",
            Self::FamilyAnalysis => "family_analysis",
            Self::HolidayResearch => "holiday_research",
            Self::DateSuggestion => "date_suggestion",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_code())
    }
}

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("request text is empty")]
    EmptyRequest,

    #[error("intent classification failed: {0}")]
    Classification(String),

    #[error("trip detail extraction failed: {0}")]
    Extraction(String),

    #[error("{capability} capability failed: {reason}")]
    Provider { capability: Capability, reason: String },

    #[error("planning aborted: {capability} failed during fan-out: {reason}")]
    Planning { capability: Capability, reason: String },
}

impl PlanError {
    pub fn provider(capability: Capability, reason: impl Into<String>) -> Self {
        Self::Provider {
            capability,
            reason: reason.into(),
        }
    }

    /// Reframes a provider failure as a fan-out aggregate failure. Other
    /// variants pass through unchanged.
    pub fn into_planning(self) -> Self {
        match self {
            Self::Provider { capability, reason } => Self::Planning { capability, reason },
            other => other,
        }
    }

    /// Stage tag for user-visible failure messages and logs.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::EmptyRequest => "input",
            Self::Classification(_) => "classification",
            Self::Extraction(_) => "extraction",
            Self::Provider { capability, .. } => capability.as_code(),
            Self::Planning { capability, .. } => capability.as_code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_failure_converts_to_planning() {
        let err = PlanError::provider(Capability::LodgingSearch, "timeout").into_planning();
        match err {
            PlanError::Planning { capability, .. } => {
                assert_eq!(capability, Capability::LodgingSearch);
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn classification_stage_is_stable() {
        let err = PlanError::Classification("schema mismatch".to_string());
        assert_eq!(err.stage(), "classification");
    }
}
