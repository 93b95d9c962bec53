use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use wayfinder_core::{
    BudgetTier, DetectedIntents, FamilyNeeds, ParsedTripDetails, PlanError, ReviewResult,
};

use crate::ledger::SearchLedger;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchInput {
    pub destination: String,
    pub travel_window: String,
    pub preferences: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightInput {
    pub origin: String,
    pub destination: String,
    pub departure_date: Option<NaiveDate>,
    pub return_date: Option<NaiveDate>,
    pub travelers: u32,
    pub budget: BudgetTier,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LodgingInput {
    pub destination: String,
    pub check_in: Option<NaiveDate>,
    pub check_out: Option<NaiveDate>,
    pub travelers: u32,
    pub budget: BudgetTier,
    pub preferences: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityInput {
    pub destination: String,
    pub duration_days: i64,
    pub interests: String,
    pub budget: BudgetTier,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisInput {
    pub research: String,
    pub flights: String,
    pub lodging: String,
    pub activities: String,
    pub request: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewInput {
    pub itinerary: String,
    pub request: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImproveInput {
    pub itinerary: String,
    pub score: u8,
    pub summary: String,
    pub improvements: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuickAnswerInput {
    pub question: String,
    pub has_kids: bool,
    pub kid_ages: Vec<u8>,
    pub origin_country: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FamilyAnalysisInput {
    pub kid_ages: Vec<u8>,
    pub destination: String,
    pub duration_days: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FamilyRecommendationInput {
    pub destination: String,
    pub kid_ages: Vec<u8>,
    pub duration_days: i64,
    pub budget: BudgetTier,
    pub interests: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateWindowInput {
    pub destination: String,
    pub origin_country: String,
    pub duration_days: i64,
    pub kid_ages: Vec<u8>,
    pub flexible: bool,
}

/// Uniform contract every content-producing capability satisfies.
///
/// Error convention: `classify` fails with `PlanError::Classification`,
/// `parse_trip` with `PlanError::Extraction`, every other method with
/// `PlanError::Provider` naming its capability. Search-backed methods take
/// the per-request ledger so provider attempts stay request-local.
pub trait CapabilitySuite: Send + Sync {
    async fn classify(&self, request: &str) -> Result<DetectedIntents, PlanError>;

    async fn parse_trip(&self, request: &str) -> Result<ParsedTripDetails, PlanError>;

    async fn research(
        &self,
        input: &ResearchInput,
        ledger: &SearchLedger,
    ) -> Result<String, PlanError>;

    async fn flights(&self, input: &FlightInput, ledger: &SearchLedger)
        -> Result<String, PlanError>;

    async fn lodging(&self, input: &LodgingInput, ledger: &SearchLedger)
        -> Result<String, PlanError>;

    async fn activities(
        &self,
        input: &ActivityInput,
        ledger: &SearchLedger,
    ) -> Result<String, PlanError>;

    async fn synthesize(&self, input: &SynthesisInput) -> Result<String, PlanError>;

    async fn review(&self, input: &ReviewInput) -> Result<ReviewResult, PlanError>;

    async fn improve(&self, input: &ImproveInput) -> Result<String, PlanError>;

    async fn quick_answer(
        &self,
        input: &QuickAnswerInput,
        ledger: &SearchLedger,
    ) -> Result<String, PlanError>;

    async fn analyze_family(&self, input: &FamilyAnalysisInput) -> Result<FamilyNeeds, PlanError>;

    async fn family_recommendations(
        &self,
        input: &FamilyRecommendationInput,
    ) -> Result<String, PlanError>;

    async fn origin_holidays(
        &self,
        country: &str,
        year: i32,
        ledger: &SearchLedger,
    ) -> Result<String, PlanError>;

    async fn destination_events(
        &self,
        destination: &str,
        window: &str,
        ledger: &SearchLedger,
    ) -> Result<String, PlanError>;

    async fn suggest_dates(
        &self,
        input: &DateWindowInput,
        ledger: &SearchLedger,
    ) -> Result<String, PlanError>;
}
