//! Planning pipeline: classification, context assembly, routing, and the
//! three execution paths (quick answer, date suggestion, full planning).

pub mod enrich;
pub mod progress;
pub mod refine;

use std::sync::Arc;
use std::time::Instant;

use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;
use wayfinder_core::{
    build_context, merge_trip_details, route, PlanError, PlannerReply, PlanningResult,
    TravelContext, TravelPath,
};
use wayfinder_observability::PlannerMetrics;
use wayfinder_providers::{
    ActivityInput, CapabilitySuite, DateWindowInput, FlightInput, LodgingInput, QuickAnswerInput,
    ResearchInput, SearchLedger, SynthesisInput,
};

pub use enrich::{
    build_activity_interests, build_enhanced_request, build_hotel_preferences, build_preferences,
    family_activity_filter, update_context_with_family_needs, update_context_with_holidays,
};
pub use progress::{NullSink, ProgressSink, Stage, TracingSink};
pub use refine::review_and_refine;

/// Pipeline controller. Owns the capability suite and drives one request at a
/// time through classify, extract, enrich, route, and execute.
pub struct TripPlanner<C> {
    caps: Arc<C>,
    sink: Arc<dyn ProgressSink>,
    metrics: Arc<PlannerMetrics>,
}

impl<C: CapabilitySuite> TripPlanner<C> {
    pub fn new(caps: Arc<C>, metrics: Arc<PlannerMetrics>) -> Self {
        Self {
            caps,
            sink: Arc::new(NullSink),
            metrics,
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn metrics(&self) -> &PlannerMetrics {
        &self.metrics
    }

    /// Runs the full pipeline for one request.
    pub async fn process(&self, request: &str) -> Result<PlannerReply, PlanError> {
        let request = request.trim();
        if request.is_empty() {
            return Err(PlanError::EmptyRequest);
        }

        let request_id = Uuid::new_v4();
        let span = info_span!("plan_request", request_id = %request_id);

        self.process_inner(request, request_id).instrument(span).await
    }

    async fn process_inner(
        &self,
        request: &str,
        request_id: Uuid,
    ) -> Result<PlannerReply, PlanError> {
        self.metrics.inc_request();
        let started = Instant::now();

        self.sink.report(Stage::Intent, "analyzing your request");
        self.metrics.inc_capability_call();
        let detected = self.caps.classify(request).await?;

        info!(
            intents = ?detected.intents.iter().map(|i| i.as_code()).collect::<Vec<_>>(),
            confidence = detected.confidence,
            has_kids = detected.has_kids,
            "intents detected"
        );

        let mut context = build_context(request, &detected);
        let ledger = SearchLedger::for_request(request_id);

        if context.needs_full_itinerary() || context.needs_holiday_research() {
            self.sink.report(Stage::Extract, "extracting trip details");
            self.metrics.inc_capability_call();
            let parsed = self.caps.parse_trip(request).await?;
            if parsed.needs_clarification {
                warn!(
                    clarification = %parsed.clarification_needed,
                    "trip details incomplete, proceeding with defaults"
                );
            }
            merge_trip_details(&mut context, parsed);
        }

        let path = route(&context);
        info!(path = path.as_code(), destination = %context.destination, "request routed");

        let reply = match path {
            TravelPath::QuickAnswer => {
                self.metrics.inc_quick_answer();
                self.handle_quick(context, &ledger).await?
            }
            TravelPath::DateSuggestionOnly => {
                self.metrics.inc_date_suggestion();
                self.handle_date_suggestion(context, &ledger).await?
            }
            TravelPath::FullPlanning => {
                self.metrics.inc_full_plan();
                self.handle_full_planning(context, &ledger).await?
            }
        };

        self.metrics.add_search_defaults(ledger.defaulted_searches());
        self.metrics.observe_latency(started.elapsed());
        info!(
            path = reply.path_taken().as_code(),
            searches = %ledger.summary(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "request complete"
        );

        Ok(reply)
    }

    async fn handle_quick(
        &self,
        context: TravelContext,
        ledger: &SearchLedger,
    ) -> Result<PlannerReply, PlanError> {
        self.sink
            .report(Stage::QuickAnswer, "answering your question");

        self.metrics.inc_capability_call();
        let response = self
            .caps
            .quick_answer(
                &QuickAnswerInput {
                    question: context.raw_request.clone(),
                    has_kids: context.has_kids,
                    kid_ages: context.kid_ages.clone(),
                    origin_country: context.origin_country.clone(),
                },
                ledger,
            )
            .await?;

        self.sink.report(Stage::Complete, "done");
        Ok(PlannerReply::QuickAnswer { response, context })
    }

    async fn handle_date_suggestion(
        &self,
        mut context: TravelContext,
        ledger: &SearchLedger,
    ) -> Result<PlannerReply, PlanError> {
        self.sink
            .report(Stage::Holiday, "checking holiday calendars");
        update_context_with_holidays(self.caps.as_ref(), &self.metrics, &mut context, ledger)
            .await?;

        let destination = if context.destination.is_empty() {
            "general travel".to_string()
        } else {
            context.destination.clone()
        };

        self.metrics.inc_capability_call();
        let response = self
            .caps
            .suggest_dates(
                &DateWindowInput {
                    destination,
                    origin_country: context.origin_country.clone(),
                    duration_days: context.duration_days(),
                    kid_ages: context.kid_ages.clone(),
                    flexible: context.flexible_dates,
                },
                ledger,
            )
            .await?;

        self.sink.report(Stage::Complete, "done");
        Ok(PlannerReply::DateSuggestion {
            response,
            holiday_info: context.holiday_info.clone(),
            context,
        })
    }

    async fn handle_full_planning(
        &self,
        mut context: TravelContext,
        ledger: &SearchLedger,
    ) -> Result<PlannerReply, PlanError> {
        if context.needs_holiday_research() {
            self.sink
                .report(Stage::Holiday, "checking holiday calendars");
            update_context_with_holidays(self.caps.as_ref(), &self.metrics, &mut context, ledger)
                .await?;
        }

        if context.needs_family_planning() {
            self.sink
                .report(Stage::Family, "analyzing family travel needs");
            update_context_with_family_needs(self.caps.as_ref(), &self.metrics, &mut context)
                .await?;
        }

        self.sink
            .report(Stage::Research, "researching your destination");
        self.metrics.inc_capability_call();
        context.destination_research = self
            .caps
            .research(
                &ResearchInput {
                    destination: context.destination.clone(),
                    travel_window: context.travel_window(),
                    preferences: build_preferences(&context),
                },
                ledger,
            )
            .await?;

        self.sink.report(Stage::Flights, "searching flights");
        self.sink.report(Stage::Lodging, "searching accommodation");
        self.sink.report(Stage::Activities, "curating activities");

        // Context is frozen here; the three branches read it concurrently.
        let flight_input = FlightInput {
            origin: context.origin.clone(),
            destination: context.destination.clone(),
            departure_date: context.departure_date,
            return_date: context.return_date,
            travelers: context.travelers,
            budget: context.budget,
        };
        let lodging_input = LodgingInput {
            destination: context.destination.clone(),
            check_in: context.departure_date,
            check_out: context.return_date,
            travelers: context.travelers,
            budget: context.budget,
            preferences: build_hotel_preferences(&context),
        };
        let activity_input = ActivityInput {
            destination: context.destination.clone(),
            duration_days: context.duration_days(),
            interests: build_activity_interests(&context),
            budget: context.budget,
        };

        self.metrics.inc_capability_call();
        self.metrics.inc_capability_call();
        self.metrics.inc_capability_call();

        let (flights, lodging, activities) = futures::try_join!(
            async {
                self.caps
                    .flights(&flight_input, ledger)
                    .await
                    .map_err(PlanError::into_planning)
            },
            async {
                self.caps
                    .lodging(&lodging_input, ledger)
                    .await
                    .map_err(PlanError::into_planning)
            },
            async {
                self.caps
                    .activities(&activity_input, ledger)
                    .await
                    .map_err(PlanError::into_planning)
            },
        )?;

        self.sink
            .report(Stage::Synthesis, "assembling your itinerary");
        self.metrics.inc_capability_call();
        let draft = self
            .caps
            .synthesize(&SynthesisInput {
                research: context.destination_research.clone(),
                flights: flights.clone(),
                lodging: lodging.clone(),
                activities: activities.clone(),
                request: build_enhanced_request(&context),
            })
            .await?;

        self.sink.report(Stage::Review, "reviewing the draft");
        let (itinerary, review) =
            review_and_refine(self.caps.as_ref(), &self.metrics, draft, &context.raw_request)
                .await?;

        info!(score = review.score, acceptable = review.is_acceptable(), "itinerary finalized");
        self.sink.report(Stage::Complete, "done");

        Ok(PlannerReply::FullItinerary {
            result: PlanningResult {
                itinerary,
                review_score: review.score,
                research_summary: context.destination_research.clone(),
                flight_options: flights,
                hotel_options: lodging,
                activity_options: activities,
            },
            context,
        })
    }
}
