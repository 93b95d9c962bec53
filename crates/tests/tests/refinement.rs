use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use parking_lot::Mutex;
use wayfinder_core::{
    AgeGroup, BudgetTier, Capability, DetectedIntents, FamilyNeeds, Intent, ParsedTripDetails,
    PlanError, ReviewResult,
};
use wayfinder_engine::{review_and_refine, TripPlanner};
use wayfinder_observability::PlannerMetrics;
use wayfinder_providers::{
    ActivityInput, CapabilitySuite, DateWindowInput, FamilyAnalysisInput,
    FamilyRecommendationInput, FlightInput, ImproveInput, LodgingInput, QuickAnswerInput,
    ResearchInput, ReviewInput, SearchLedger, SynthesisInput,
};

/// Capability suite with scripted review scores and per-method call counters.
#[derive(Default)]
struct MockSuite {
    review_scores: Mutex<Vec<u8>>,
    fail_lodging: bool,
    fail_review: bool,
    reviews: AtomicUsize,
    improves: AtomicUsize,
    synth_calls: AtomicUsize,
    lodging_calls: AtomicUsize,
}

impl MockSuite {
    fn with_scores(scores: Vec<u8>) -> Self {
        Self {
            review_scores: Mutex::new(scores),
            ..Self::default()
        }
    }

    fn next_score(&self) -> u8 {
        let mut scores = self.review_scores.lock();
        if scores.len() > 1 {
            scores.remove(0)
        } else {
            scores.first().copied().unwrap_or(5)
        }
    }
}

impl CapabilitySuite for MockSuite {
    async fn classify(&self, _request: &str) -> Result<DetectedIntents, PlanError> {
        Ok(DetectedIntents {
            intents: vec![Intent::BasicTrip],
            confidence: 1.0,
            reasoning: "scripted".to_string(),
            has_kids: false,
            kid_ages: Vec::new(),
            family_size: 2,
            wants_holiday_alignment: false,
            origin_country: "Malaysia".to_string(),
            flexible_dates: false,
            is_quick_question: false,
        })
    }

    async fn parse_trip(&self, _request: &str) -> Result<ParsedTripDetails, PlanError> {
        Ok(ParsedTripDetails {
            destination: "Tokyo".to_string(),
            origin: String::new(),
            departure_date: NaiveDate::from_ymd_opt(2026, 4, 10),
            return_date: NaiveDate::from_ymd_opt(2026, 4, 15),
            travelers: 2,
            budget: BudgetTier::Moderate,
            interests: String::new(),
            needs_clarification: false,
            clarification_needed: String::new(),
        })
    }

    async fn research(
        &self,
        _input: &ResearchInput,
        _ledger: &SearchLedger,
    ) -> Result<String, PlanError> {
        Ok("research".to_string())
    }

    async fn flights(
        &self,
        _input: &FlightInput,
        _ledger: &SearchLedger,
    ) -> Result<String, PlanError> {
        Ok("flights".to_string())
    }

    async fn lodging(
        &self,
        _input: &LodgingInput,
        _ledger: &SearchLedger,
    ) -> Result<String, PlanError> {
        self.lodging_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_lodging {
            return Err(PlanError::provider(
                Capability::LodgingSearch,
                "inventory backend timed out",
            ));
        }
        Ok("lodging".to_string())
    }

    async fn activities(
        &self,
        _input: &ActivityInput,
        _ledger: &SearchLedger,
    ) -> Result<String, PlanError> {
        Ok("activities".to_string())
    }

    async fn synthesize(&self, _input: &SynthesisInput) -> Result<String, PlanError> {
        self.synth_calls.fetch_add(1, Ordering::SeqCst);
        Ok("draft itinerary".to_string())
    }

    async fn review(&self, _input: &ReviewInput) -> Result<ReviewResult, PlanError> {
        self.reviews.fetch_add(1, Ordering::SeqCst);
        if self.fail_review {
            return Err(PlanError::provider(Capability::Review, "reviewer offline"));
        }
        let score = self.next_score();
        Ok(ReviewResult {
            score,
            strengths: Vec::new(),
            improvements: vec!["tighten day 2".to_string()],
            summary: format!("scored {score}/10"),
        })
    }

    async fn improve(&self, input: &ImproveInput) -> Result<String, PlanError> {
        self.improves.fetch_add(1, Ordering::SeqCst);
        Ok(format!("{} (revised)", input.itinerary))
    }

    async fn quick_answer(
        &self,
        _input: &QuickAnswerInput,
        _ledger: &SearchLedger,
    ) -> Result<String, PlanError> {
        Ok("answer".to_string())
    }

    async fn analyze_family(&self, _input: &FamilyAnalysisInput) -> Result<FamilyNeeds, PlanError> {
        Ok(FamilyNeeds {
            age_group: AgeGroup::Unknown,
            activity_constraints: Vec::new(),
            activity_preferences: Vec::new(),
            hotel_requirements: Vec::new(),
            schedule_constraints: Vec::new(),
            dining_needs: Vec::new(),
            safety_notes: Vec::new(),
            packing_suggestions: Vec::new(),
        })
    }

    async fn family_recommendations(
        &self,
        _input: &FamilyRecommendationInput,
    ) -> Result<String, PlanError> {
        Ok("recommendations".to_string())
    }

    async fn origin_holidays(
        &self,
        _country: &str,
        _year: i32,
        _ledger: &SearchLedger,
    ) -> Result<String, PlanError> {
        Ok("holidays".to_string())
    }

    async fn destination_events(
        &self,
        _destination: &str,
        _window: &str,
        _ledger: &SearchLedger,
    ) -> Result<String, PlanError> {
        Ok("events".to_string())
    }

    async fn suggest_dates(
        &self,
        _input: &DateWindowInput,
        _ledger: &SearchLedger,
    ) -> Result<String, PlanError> {
        Ok("dates".to_string())
    }
}

#[tokio::test]
async fn acceptable_first_review_ends_the_loop() {
    let suite = MockSuite::with_scores(vec![9]);
    let metrics = PlannerMetrics::default();

    let (itinerary, review) = review_and_refine(&suite, &metrics, "draft".to_string(), "plan")
        .await
        .unwrap();

    assert_eq!(itinerary, "draft");
    assert_eq!(review.score, 9);
    assert!(review.is_acceptable());
    assert_eq!(suite.reviews.load(Ordering::SeqCst), 1);
    assert_eq!(suite.improves.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn rejecting_reviewer_exhausts_the_iteration_budget() {
    let suite = MockSuite::with_scores(vec![3]);
    let metrics = PlannerMetrics::default();

    let (itinerary, review) = review_and_refine(&suite, &metrics, "draft".to_string(), "plan")
        .await
        .unwrap();

    // Two loop reviews, two improves, then the final review.
    assert_eq!(suite.reviews.load(Ordering::SeqCst), 3);
    assert_eq!(suite.improves.load(Ordering::SeqCst), 2);
    assert_eq!(itinerary, "draft (revised) (revised)");
    assert!(!review.is_acceptable());
    assert_eq!(metrics.snapshot().improve_iterations_total, 2);
}

#[tokio::test]
async fn converging_reviewer_stops_at_acceptance() {
    let suite = MockSuite::with_scores(vec![5, 8]);
    let metrics = PlannerMetrics::default();

    let (itinerary, review) = review_and_refine(&suite, &metrics, "draft".to_string(), "plan")
        .await
        .unwrap();

    assert_eq!(suite.reviews.load(Ordering::SeqCst), 2);
    assert_eq!(suite.improves.load(Ordering::SeqCst), 1);
    assert_eq!(itinerary, "draft (revised)");
    assert!(review.is_acceptable());
}

#[tokio::test]
async fn review_failure_aborts_the_loop() {
    let suite = MockSuite {
        fail_review: true,
        ..MockSuite::default()
    };
    let metrics = PlannerMetrics::default();

    let err = review_and_refine(&suite, &metrics, "draft".to_string(), "plan")
        .await
        .unwrap_err();

    match err {
        PlanError::Provider { capability, .. } => assert_eq!(capability, Capability::Review),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(suite.improves.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn lodging_failure_aborts_planning_before_synthesis() {
    let suite = Arc::new(MockSuite {
        fail_lodging: true,
        review_scores: Mutex::new(vec![9]),
        ..MockSuite::default()
    });
    let planner = TripPlanner::new(suite.clone(), PlannerMetrics::shared());

    let err = planner
        .process("Plan a trip to Tokyo, 2026-04-10 to 2026-04-15")
        .await
        .unwrap_err();

    match err {
        PlanError::Planning { capability, .. } => {
            assert_eq!(capability, Capability::LodgingSearch);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(suite.lodging_calls.load(Ordering::SeqCst), 1);
    assert_eq!(suite.synth_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn successful_pipeline_reaches_review_once() {
    let suite = Arc::new(MockSuite::with_scores(vec![8]));
    let planner = TripPlanner::new(suite.clone(), PlannerMetrics::shared());

    let reply = planner
        .process("Plan a trip to Tokyo, 2026-04-10 to 2026-04-15")
        .await
        .unwrap();

    assert_eq!(suite.synth_calls.load(Ordering::SeqCst), 1);
    assert_eq!(suite.reviews.load(Ordering::SeqCst), 1);
    assert_eq!(suite.improves.load(Ordering::SeqCst), 0);
    assert!(reply.response_text().contains("draft itinerary"));
}
