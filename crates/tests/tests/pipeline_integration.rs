use std::sync::Arc;

use parking_lot::Mutex;
use wayfinder_core::{PlanError, PlannerReply, TravelPath};
use wayfinder_engine::{ProgressSink, Stage, TripPlanner};
use wayfinder_observability::PlannerMetrics;
use wayfinder_providers::ScriptedSuite;

struct RecordingSink {
    stages: Mutex<Vec<Stage>>,
}

impl RecordingSink {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            stages: Mutex::new(Vec::new()),
        })
    }

    fn stages(&self) -> Vec<Stage> {
        self.stages.lock().clone()
    }
}

impl ProgressSink for RecordingSink {
    fn report(&self, stage: Stage, _message: &str) {
        self.stages.lock().push(stage);
    }
}

fn planner() -> (TripPlanner<ScriptedSuite>, Arc<PlannerMetrics>, Arc<RecordingSink>) {
    let metrics = PlannerMetrics::shared();
    let sink = RecordingSink::new();
    let planner = TripPlanner::new(
        Arc::new(ScriptedSuite::with_default_index("Malaysia")),
        metrics.clone(),
    )
    .with_sink(sink.clone());
    (planner, metrics, sink)
}

#[tokio::test]
async fn family_holiday_request_gets_a_full_itinerary() {
    let (planner, metrics, _sink) = planner();

    let reply = planner
        .process(
            "Plan a 5-day trip to Tokyo with my 3 and 7 year old in April, \
             considering Malaysian school holidays",
        )
        .await
        .unwrap();

    assert_eq!(reply.path_taken(), TravelPath::FullPlanning);
    let PlannerReply::FullItinerary { result, context } = reply else {
        panic!("expected a full itinerary");
    };

    assert_eq!(context.destination, "Tokyo");
    assert!(context.has_kids);
    assert_eq!(context.kid_ages, vec![3, 7]);
    assert_eq!(context.origin_country, "Malaysia");
    assert!(context.needs_family_planning());
    assert!(context.needs_holiday_research());
    assert!(context.holiday_info.contains("Malaysia holidays"));
    assert!(!context.family_constraints.is_empty());
    assert!(!context.family_recommendations.is_empty());

    assert!(result.itinerary.contains("## Flights"));
    assert!(result.itinerary.contains("## Accommodation"));
    assert!(result.itinerary.contains("## Daily Activities"));
    assert!(result.review_score >= 7);

    let snapshot = metrics.snapshot();
    assert_eq!(snapshot.requests_total, 1);
    assert_eq!(snapshot.full_plans_total, 1);
    assert_eq!(snapshot.improve_iterations_total, 0);
}

#[tokio::test]
async fn quick_question_skips_planning() {
    let (planner, metrics, sink) = planner();

    let reply = planner
        .process("Is April good for visiting Tokyo?")
        .await
        .unwrap();

    assert_eq!(reply.path_taken(), TravelPath::QuickAnswer);
    assert!(reply.response_text().contains("Question"));

    let stages = sink.stages();
    assert!(stages.contains(&Stage::QuickAnswer));
    assert!(!stages.contains(&Stage::Research));
    assert!(!stages.contains(&Stage::Extract));

    assert_eq!(metrics.snapshot().quick_answers_total, 1);
    assert_eq!(metrics.snapshot().full_plans_total, 0);
}

#[tokio::test]
async fn date_question_without_destination_suggests_windows() {
    let (planner, metrics, _sink) = planner();

    let reply = planner
        .process("When should I go for a longer break with the kids?")
        .await
        .unwrap();

    assert_eq!(reply.path_taken(), TravelPath::DateSuggestionOnly);
    let PlannerReply::DateSuggestion {
        response,
        holiday_info,
        context,
    } = reply
    else {
        panic!("expected a date suggestion");
    };

    assert!(context.destination.is_empty());
    assert!(response.contains("Suggested travel windows"));
    assert!(holiday_info.contains("Malaysia holidays"));
    assert_eq!(metrics.snapshot().date_suggestions_total, 1);
}

#[tokio::test]
async fn date_question_with_destination_folds_into_full_planning() {
    let (planner, _metrics, _sink) = planner();

    let reply = planner
        .process("When should I visit Tokyo? I want a trip plan too.")
        .await
        .unwrap();

    assert_eq!(reply.path_taken(), TravelPath::FullPlanning);
}

#[tokio::test]
async fn blank_requests_are_rejected() {
    let (planner, metrics, _sink) = planner();

    for request in ["", "   ", "\n\t"] {
        let err = planner.process(request).await.unwrap_err();
        assert!(matches!(err, PlanError::EmptyRequest));
    }

    // Rejected before any pipeline work is counted.
    assert_eq!(metrics.snapshot().requests_total, 0);
}

#[tokio::test]
async fn full_planning_reports_stages_in_order() {
    let (planner, _metrics, sink) = planner();

    planner
        .process("Plan a trip to Tokyo from Singapore, 2026-04-10 to 2026-04-15")
        .await
        .unwrap();

    let stages = sink.stages();
    assert_eq!(stages.first(), Some(&Stage::Intent));
    assert_eq!(stages.last(), Some(&Stage::Complete));

    for stage in [
        Stage::Extract,
        Stage::Research,
        Stage::Flights,
        Stage::Lodging,
        Stage::Activities,
        Stage::Synthesis,
        Stage::Review,
    ] {
        assert!(stages.contains(&stage), "missing stage {:?}", stage);
    }

    let research_at = stages.iter().position(|s| *s == Stage::Research).unwrap();
    let synthesis_at = stages.iter().position(|s| *s == Stage::Synthesis).unwrap();
    assert!(research_at < synthesis_at);
}

#[tokio::test]
async fn paths_are_counted_independently() {
    let (planner, metrics, _sink) = planner();

    planner
        .process("Plan a trip to Tokyo, 2026-04-10 to 2026-04-15")
        .await
        .unwrap();
    planner
        .process("Is April good for visiting Tokyo?")
        .await
        .unwrap();
    planner
        .process("When should I go for a break with the kids?")
        .await
        .unwrap();

    let snapshot = metrics.snapshot();
    assert_eq!(snapshot.requests_total, 3);
    assert_eq!(snapshot.full_plans_total, 1);
    assert_eq!(snapshot.quick_answers_total, 1);
    assert_eq!(snapshot.date_suggestions_total, 1);
}
