use serde::{Deserialize, Serialize};

use crate::models::{Intent, TravelContext};

/// Execution path chosen for a request. Every context maps to exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TravelPath {
    QuickAnswer,
    DateSuggestionOnly,
    FullPlanning,
}

impl TravelPath {
    pub fn as_code(self) -> &'static str {
        match self {
            Self::QuickAnswer => "quick_answer",
            Self::DateSuggestionOnly => "date_suggestion_only",
            Self::FullPlanning => "full_planning",
        }
    }
}

/// Pure routing decision over the planning context.
///
/// A quick question short-circuits everything else. A date question with no
/// destination does not warrant full planning; a date question with a known
/// destination folds into full planning instead.
pub fn route(context: &TravelContext) -> TravelPath {
    if context.is_quick_question {
        return TravelPath::QuickAnswer;
    }

    if context.has_intent(Intent::DateSuggestion) && context.destination.is_empty() {
        return TravelPath::DateSuggestionOnly;
    }

    TravelPath::FullPlanning
}
