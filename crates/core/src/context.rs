use crate::models::{DetectedIntents, Intent, ParsedTripDetails, TravelContext};

/// Builds the initial planning context from classifier output.
///
/// A planning request must never be left with zero actionable intent: when
/// the classifier returns nothing and the request is not a quick question,
/// the context defaults to `BasicTrip`.
pub fn build_context(request: &str, detected: &DetectedIntents) -> TravelContext {
    let mut intents = Vec::new();
    for intent in &detected.intents {
        if !intents.contains(intent) {
            intents.push(*intent);
        }
    }

    if intents.is_empty() && !detected.is_quick_question {
        intents.push(Intent::BasicTrip);
    }

    TravelContext {
        raw_request: request.to_string(),
        intents,
        destination: String::new(),
        origin: String::new(),
        departure_date: None,
        return_date: None,
        travelers: merged_travelers(detected),
        budget: Default::default(),
        interests: String::new(),
        has_kids: detected.has_kids,
        kid_ages: detected.kid_ages.clone(),
        family_constraints: Vec::new(),
        family_recommendations: String::new(),
        origin_country: detected.origin_country.clone(),
        check_origin_holidays: detected.wants_holiday_alignment,
        flexible_dates: detected.flexible_dates,
        holiday_info: String::new(),
        is_quick_question: detected.is_quick_question,
        destination_research: String::new(),
    }
}

fn merged_travelers(detected: &DetectedIntents) -> u32 {
    detected
        .family_size
        .max(1 + detected.kid_ages.len() as u32)
}

/// Merges the structured-extraction pass into the context.
///
/// Intent detection and trip-detail extraction are independent capabilities
/// that may disagree; these precedence rules keep resolution deterministic:
/// destination, dates, budget, and interests come verbatim from the parsed
/// details; origin only overrides when non-empty; the traveler count from
/// parsing is ignored when the context already knows about children.
pub fn merge_trip_details(context: &mut TravelContext, parsed: ParsedTripDetails) {
    context.destination = parsed.destination;
    if !parsed.origin.is_empty() {
        context.origin = parsed.origin;
    }
    context.departure_date = parsed.departure_date;
    context.return_date = parsed.return_date;
    context.budget = parsed.budget;
    context.interests = parsed.interests;

    if !context.has_kids {
        context.travelers = parsed.travelers.max(1);
    }
}
