pub mod ledger;
pub mod scripted;
pub mod search;
pub mod suite;

pub use ledger::{SearchLedger, SearchOutcome, SearchRecord};
pub use scripted::ScriptedSuite;
pub use search::{FallbackSearch, MemoryIndexProvider, SearchProvider, SEARCH_DISCLAIMER};
pub use suite::{
    ActivityInput, CapabilitySuite, DateWindowInput, FamilyAnalysisInput,
    FamilyRecommendationInput, FlightInput, ImproveInput, LodgingInput, QuickAnswerInput,
    ResearchInput, ReviewInput, SynthesisInput,
};
