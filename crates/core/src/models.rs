use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::route::TravelPath;

/// Review scores at or above this value terminate the refinement loop.
pub const ACCEPTABLE_SCORE: u8 = 7;

/// Upper bound on improve calls inside the refinement loop.
pub const MAX_REFLECTION_ITERATIONS: usize = 2;

/// Assumed trip length when dates are missing or inconsistent.
pub const DEFAULT_TRIP_DAYS: i64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    BasicTrip,
    FamilyTrip,
    HolidayResearch,
    DateSuggestion,
    #[serde(rename = "inquiry")]
    DestinationInquiry,
    #[serde(rename = "budget")]
    BudgetOptimization,
}

impl Intent {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "basic_trip" => Some(Self::BasicTrip),
            "family_trip" => Some(Self::FamilyTrip),
            "holiday_research" => Some(Self::HolidayResearch),
            "date_suggestion" => Some(Self::DateSuggestion),
            "inquiry" | "destination_inquiry" => Some(Self::DestinationInquiry),
            "budget" | "budget_optimization" => Some(Self::BudgetOptimization),
            _ => None,
        }
    }

    pub fn as_code(self) -> &'static str {
        match self {
            Self::BasicTrip => "basic_trip",
            Self::FamilyTrip => "family_trip",
            Self::HolidayResearch => "holiday_research",
            Self::DateSuggestion => "date_suggestion",
            Self::DestinationInquiry => "inquiry",
            Self::BudgetOptimization => "budget",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetTier {
    Budget,
    #[default]
    Moderate,
    Luxury,
}

impl BudgetTier {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "budget" | "cheap" | "low" => Some(Self::Budget),
            "moderate" | "mid" | "medium" => Some(Self::Moderate),
            "luxury" | "premium" | "high" => Some(Self::Luxury),
            _ => None,
        }
    }

    pub fn as_code(self) -> &'static str {
        match self {
            Self::Budget => "budget",
            Self::Moderate => "moderate",
            Self::Luxury => "luxury",
        }
    }
}

/// Age banding used to filter activities and lodging preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeGroup {
    Infant,
    Toddler,
    Child,
    Teen,
    /// Kids are present but no ages were extracted; age-banded filters are skipped.
    Unknown,
}

impl AgeGroup {
    pub fn as_code(self) -> &'static str {
        match self {
            Self::Infant => "infant",
            Self::Toddler => "toddler",
            Self::Child => "child",
            Self::Teen => "teen",
            Self::Unknown => "unknown",
        }
    }
}

/// Output of the intent classification capability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectedIntents {
    pub intents: Vec<Intent>,
    pub confidence: f32,
    pub reasoning: String,
    #[serde(default)]
    pub has_kids: bool,
    #[serde(default)]
    pub kid_ages: Vec<u8>,
    #[serde(default = "default_family_size")]
    pub family_size: u32,
    #[serde(default)]
    pub wants_holiday_alignment: bool,
    #[serde(default = "default_origin_country")]
    pub origin_country: String,
    #[serde(default)]
    pub flexible_dates: bool,
    #[serde(default)]
    pub is_quick_question: bool,
}

fn default_family_size() -> u32 {
    1
}

fn default_origin_country() -> String {
    "Malaysia".to_string()
}

/// Output of the structured trip-detail extraction capability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedTripDetails {
    pub destination: String,
    #[serde(default)]
    pub origin: String,
    pub departure_date: Option<NaiveDate>,
    pub return_date: Option<NaiveDate>,
    #[serde(default = "default_family_size")]
    pub travelers: u32,
    #[serde(default)]
    pub budget: BudgetTier,
    #[serde(default)]
    pub interests: String,
    #[serde(default)]
    pub needs_clarification: bool,
    #[serde(default)]
    pub clarification_needed: String,
}

/// Shared per-request planning state, owned and mutated by the pipeline
/// controller only. Fan-out branches read an immutable snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TravelContext {
    pub raw_request: String,
    pub intents: Vec<Intent>,

    pub destination: String,
    pub origin: String,
    pub departure_date: Option<NaiveDate>,
    pub return_date: Option<NaiveDate>,
    pub travelers: u32,
    pub budget: BudgetTier,
    pub interests: String,

    pub has_kids: bool,
    pub kid_ages: Vec<u8>,
    pub family_constraints: Vec<String>,
    pub family_recommendations: String,

    pub origin_country: String,
    pub check_origin_holidays: bool,
    pub flexible_dates: bool,
    pub holiday_info: String,

    pub is_quick_question: bool,

    pub destination_research: String,
}

impl TravelContext {
    pub fn has_intent(&self, intent: Intent) -> bool {
        self.intents.contains(&intent)
    }

    /// Trip length in days, defaulting when dates are missing or the return
    /// date precedes departure.
    pub fn duration_days(&self) -> i64 {
        match (self.departure_date, self.return_date) {
            (Some(dep), Some(ret)) if ret >= dep => (ret - dep).num_days(),
            _ => DEFAULT_TRIP_DAYS,
        }
    }

    pub fn needs_family_planning(&self) -> bool {
        self.has_intent(Intent::FamilyTrip) || self.has_kids
    }

    pub fn needs_holiday_research(&self) -> bool {
        self.has_intent(Intent::HolidayResearch)
            || self.has_intent(Intent::DateSuggestion)
            || self.check_origin_holidays
            || self.flexible_dates
    }

    pub fn needs_full_itinerary(&self) -> bool {
        !self.is_quick_question && self.has_intent(Intent::BasicTrip)
    }

    /// Band for the youngest traveling child.
    pub fn kid_age_group(&self) -> AgeGroup {
        match self.kid_ages.iter().min() {
            None => AgeGroup::Unknown,
            Some(&age) if age <= 2 => AgeGroup::Infant,
            Some(&age) if age <= 5 => AgeGroup::Toddler,
            Some(&age) if age <= 12 => AgeGroup::Child,
            Some(_) => AgeGroup::Teen,
        }
    }

    /// Human-readable travel window for capability inputs.
    pub fn travel_window(&self) -> String {
        match (self.departure_date, self.return_date) {
            (Some(dep), Some(ret)) => format!("{dep} to {ret}"),
            (Some(dep), None) => format!("from {dep}"),
            _ => "dates not fixed".to_string(),
        }
    }
}

/// Structured output of the review capability. Acceptability is derived from
/// the score, never trusted from the provider payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewResult {
    pub score: u8,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub improvements: Vec<String>,
    #[serde(default)]
    pub summary: String,
}

impl ReviewResult {
    pub fn is_acceptable(&self) -> bool {
        self.score >= ACCEPTABLE_SCORE
    }
}

/// Structured output of the family-needs analysis capability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FamilyNeeds {
    pub age_group: AgeGroup,
    #[serde(default)]
    pub activity_constraints: Vec<String>,
    #[serde(default)]
    pub activity_preferences: Vec<String>,
    #[serde(default)]
    pub hotel_requirements: Vec<String>,
    #[serde(default)]
    pub schedule_constraints: Vec<String>,
    #[serde(default)]
    pub dining_needs: Vec<String>,
    #[serde(default)]
    pub safety_notes: Vec<String>,
    #[serde(default)]
    pub packing_suggestions: Vec<String>,
}

/// Final output of the full-planning path. Intermediate blocks are kept for
/// traceability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanningResult {
    pub itinerary: String,
    pub review_score: u8,
    pub research_summary: String,
    pub flight_options: String,
    pub hotel_options: String,
    pub activity_options: String,
}

/// Tagged outbound result covering all three execution paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlannerReply {
    QuickAnswer {
        response: String,
        context: TravelContext,
    },
    DateSuggestion {
        response: String,
        holiday_info: String,
        context: TravelContext,
    },
    FullItinerary {
        result: PlanningResult,
        context: TravelContext,
    },
}

impl PlannerReply {
    pub fn path_taken(&self) -> TravelPath {
        match self {
            Self::QuickAnswer { .. } => TravelPath::QuickAnswer,
            Self::DateSuggestion { .. } => TravelPath::DateSuggestionOnly,
            Self::FullItinerary { .. } => TravelPath::FullPlanning,
        }
    }

    pub fn response_text(&self) -> &str {
        match self {
            Self::QuickAnswer { response, .. } => response,
            Self::DateSuggestion { response, .. } => response,
            Self::FullItinerary { result, .. } => &result.itinerary,
        }
    }

    pub fn context(&self) -> &TravelContext {
        match self {
            Self::QuickAnswer { context, .. } => context,
            Self::DateSuggestion { context, .. } => context,
            Self::FullItinerary { context, .. } => context,
        }
    }
}
