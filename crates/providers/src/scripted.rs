use chrono::{Duration, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use wayfinder_core::{
    AgeGroup, BudgetTier, DetectedIntents, FamilyNeeds, Intent, ParsedTripDetails, PlanError,
    ReviewResult,
};

use crate::ledger::SearchLedger;
use crate::search::{FallbackSearch, MemoryIndexProvider};
use crate::suite::{
    ActivityInput, CapabilitySuite, DateWindowInput, FamilyAnalysisInput,
    FamilyRecommendationInput, FlightInput, ImproveInput, LodgingInput, QuickAnswerInput,
    ResearchInput, ReviewInput, SynthesisInput,
};

static AGE_LIST_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bages?[:\s]+(\d{1,2}(?:\s*(?:,|and|&)\s*\d{1,2})*)").unwrap()
});
static YEAR_OLD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(\d{1,2}(?:\s*(?:,|and|&)\s*\d{1,2})*)\s*-?\s*years?[\s-]old").unwrap()
});
static NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{1,2}").unwrap());
static DESTINATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:to|in|visit|visiting)\s+([A-Z][a-zA-Z]+(?:\s+[A-Z][a-zA-Z]+)?)").unwrap()
});
static ORIGIN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bfrom\s+([A-Z][a-zA-Z]+(?:\s+[A-Z][a-zA-Z]+)?)").unwrap());
static ISO_DATE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\d{4}-\d{2}-\d{2}\b").unwrap());
static DURATION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b(\d{1,2})[-\s]days?\b").unwrap());
static TRAVELERS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(\d{1,2})\s*(?:people|persons|adults|travelers|travellers|pax)\b").unwrap()
});

const MONTHS: &[&str] = &[
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];

const COUNTRY_ADJECTIVES: &[(&str, &str)] = &[
    ("malaysian", "Malaysia"),
    ("singaporean", "Singapore"),
    ("indonesian", "Indonesia"),
    ("australian", "Australia"),
    ("thai", "Thailand"),
];

const INTEREST_KEYWORDS: &[&str] = &[
    "food", "culinary", "culture", "museums", "beach", "beaches", "hiking", "nature", "shopping",
    "temples", "nightlife", "art", "theme parks", "history",
];

/// Deterministic, offline capability suite driven by keyword rules and
/// templates. Stands in for hosted model providers so the pipeline runs
/// end to end without network access.
pub struct ScriptedSuite {
    search: FallbackSearch,
    default_origin_country: String,
}

impl ScriptedSuite {
    pub fn new(search: FallbackSearch, default_origin_country: impl Into<String>) -> Self {
        Self {
            search,
            default_origin_country: default_origin_country.into(),
        }
    }

    /// Suite backed by a small built-in travel index ahead of the disclaimer
    /// default.
    pub fn with_default_index(default_origin_country: impl Into<String>) -> Self {
        let index = MemoryIndexProvider::new("travel-notes")
            .with_doc(
                &["tokyo", "japan"],
                "Japan notes: spring (late March to early April) is cherry blossom peak; \
                 book lodging early. The JR Pass pays off for intercity travel.",
            )
            .with_doc(
                &["bali", "indonesia"],
                "Bali notes: dry season runs April to October. Family villas around Sanur \
                 are calmer than Seminyak.",
            )
            .with_doc(
                &["malaysia holidays", "malaysia public holidays"],
                "Malaysia school terms break in March, late May to early June, August, and \
                 mid November through December.",
            );

        Self::new(FallbackSearch::new(vec![Box::new(index)]), default_origin_country)
    }
}

fn contains_any(input: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| input.contains(needle))
}

fn extract_kid_ages(text: &str) -> Vec<u8> {
    let mut ages = Vec::new();
    for re in [&*AGE_LIST_RE, &*YEAR_OLD_RE] {
        for caps in re.captures_iter(text) {
            for number in NUMBER_RE.find_iter(&caps[1]) {
                if let Ok(age) = number.as_str().parse::<u8>() {
                    if age <= 17 && !ages.contains(&age) {
                        ages.push(age);
                    }
                }
            }
        }
    }
    ages
}

fn detect_origin_country(lower: &str, default: &str) -> String {
    for (adjective, country) in COUNTRY_ADJECTIVES {
        if lower.contains(adjective) && (lower.contains("holiday") || lower.contains("school")) {
            return country.to_string();
        }
        if lower.contains(&format!("from {}", country.to_lowercase())) {
            return country.to_string();
        }
    }
    default.to_string()
}

fn first_place_capture(re: &Regex, text: &str) -> String {
    for caps in re.captures_iter(text) {
        let candidate = caps[1].trim().to_string();
        let head = candidate.split_whitespace().next().unwrap_or_default();
        if !MONTHS.contains(&head) {
            return candidate;
        }
    }
    String::new()
}

fn budget_from_keywords(lower: &str) -> BudgetTier {
    if contains_any(lower, &["luxury", "splurge", "5-star", "five star", "premium"]) {
        BudgetTier::Luxury
    } else if contains_any(lower, &["cheap", "budget", "affordable", "save money", "low cost"]) {
        BudgetTier::Budget
    } else {
        BudgetTier::Moderate
    }
}

fn dates_or_window(departure: Option<NaiveDate>, ret: Option<NaiveDate>) -> String {
    match (departure, ret) {
        (Some(dep), Some(ret)) => format!("{dep} to {ret}"),
        (Some(dep), None) => format!("from {dep}"),
        _ => "flexible dates".to_string(),
    }
}

fn or_unnamed(destination: &str) -> &str {
    if destination.is_empty() {
        "your destination"
    } else {
        destination
    }
}

impl CapabilitySuite for ScriptedSuite {
    async fn classify(&self, request: &str) -> Result<DetectedIntents, PlanError> {
        let lower = request.to_lowercase();
        let mut intents = Vec::new();
        let mut triggers = Vec::new();

        let wants_plan = contains_any(
            &lower,
            &["plan a trip", "plan a", "itinerary", "traveling to", "travel to"],
        ) || (lower.contains("plan") && lower.contains("trip"));

        let inquiry = contains_any(
            &lower,
            &[
                "is it safe",
                "good for",
                "how is",
                "what's the weather",
                "what is the weather",
                "weather like",
                "do i need a visa",
                "how expensive",
                "compared to",
            ],
        ) || lower.starts_with("is ");

        let date_suggestion = contains_any(
            &lower,
            &[
                "when should i",
                "when should we",
                "suggest dates",
                "best time to visit",
                "best time to go",
                "what dates",
            ],
        );

        let kid_ages = extract_kid_ages(request);
        let has_kids = !kid_ages.is_empty()
            || contains_any(
                &lower,
                &["kids", "children", "family trip", "my son", "my daughter", "toddler"],
            );

        let holiday = contains_any(
            &lower,
            &[
                "public holiday",
                "school holiday",
                "school break",
                "long weekend",
                "chinese new year",
                "cny",
                "hari raya",
                "deepavali",
            ],
        );

        let budget_focus = contains_any(
            &lower,
            &["cheap", "budget", "affordable", "save money", "low cost"],
        );

        if wants_plan {
            intents.push(Intent::BasicTrip);
            triggers.push("planning language");
        }
        if has_kids {
            intents.push(Intent::FamilyTrip);
            triggers.push("family indicators");
        }
        if holiday {
            intents.push(Intent::HolidayResearch);
            triggers.push("holiday keywords");
        }
        if date_suggestion {
            intents.push(Intent::DateSuggestion);
            triggers.push("date flexibility");
        }
        if budget_focus {
            intents.push(Intent::BudgetOptimization);
            triggers.push("budget keywords");
        }

        let is_quick_question = inquiry && !wants_plan && !date_suggestion;
        if inquiry && !wants_plan {
            intents.push(Intent::DestinationInquiry);
            triggers.push("inquiry phrasing");
        }

        let mut family_size = 1 + kid_ages.len() as u32;
        if contains_any(&lower, &["wife", "husband", "partner", "spouse"]) {
            family_size += 1;
        }
        if let Some(caps) = TRAVELERS_RE.captures(request) {
            if let Ok(count) = caps[1].parse::<u32>() {
                family_size = family_size.max(count);
            }
        }

        let confidence = if intents.is_empty() { 0.4 } else { 0.92 };
        let reasoning = if triggers.is_empty() {
            "no keyword triggers matched".to_string()
        } else {
            format!("matched: {}", triggers.join(", "))
        };

        Ok(DetectedIntents {
            intents,
            confidence,
            reasoning,
            has_kids,
            kid_ages,
            family_size,
            wants_holiday_alignment: holiday,
            origin_country: detect_origin_country(&lower, &self.default_origin_country),
            flexible_dates: date_suggestion,
            is_quick_question,
        })
    }

    async fn parse_trip(&self, request: &str) -> Result<ParsedTripDetails, PlanError> {
        let lower = request.to_lowercase();

        let destination = first_place_capture(&DESTINATION_RE, request);
        let origin = first_place_capture(&ORIGIN_RE, request);

        let mut dates = ISO_DATE_RE
            .find_iter(request)
            .filter_map(|m| NaiveDate::parse_from_str(m.as_str(), "%Y-%m-%d").ok());
        let departure_date = dates.next();
        let mut return_date = dates.next();

        if return_date.is_none() {
            if let (Some(dep), Some(caps)) = (departure_date, DURATION_RE.captures(request)) {
                if let Ok(days) = caps[1].parse::<i64>() {
                    return_date = Some(dep + Duration::days(days));
                }
            }
        }

        let travelers = TRAVELERS_RE
            .captures(request)
            .and_then(|caps| caps[1].parse::<u32>().ok())
            .unwrap_or(1)
            .max(1);

        let interests: Vec<&str> = INTEREST_KEYWORDS
            .iter()
            .filter(|keyword| lower.contains(*keyword))
            .copied()
            .collect();

        let mut missing = Vec::new();
        if destination.is_empty() {
            missing.push("destination");
        }
        if departure_date.is_none() || return_date.is_none() {
            missing.push("travel dates");
        }

        Ok(ParsedTripDetails {
            destination,
            origin,
            departure_date,
            return_date,
            travelers,
            budget: budget_from_keywords(&lower),
            interests: interests.join(", "),
            needs_clarification: !missing.is_empty(),
            clarification_needed: if missing.is_empty() {
                String::new()
            } else {
                format!("missing: {}", missing.join(", "))
            },
        })
    }

    async fn research(
        &self,
        input: &ResearchInput,
        ledger: &SearchLedger,
    ) -> Result<String, PlanError> {
        let destination = or_unnamed(&input.destination);
        let found = self
            .search
            .search(&format!("{destination} travel guide"), ledger)
            .await;

        Ok(format!(
            "## Destination Research: {destination}\n\n\
             **Travel window:** {}\n\
             **Preferences:** {}\n\n\
             ### Orientation\n\
             - Stay central for the first visit; day trips are easier from a hub.\n\
             - Check opening days for key sights inside the travel window.\n\n\
             ### Notes from search\n{found}",
            input.travel_window,
            if input.preferences.is_empty() {
                "none specified"
            } else {
                &input.preferences
            },
        ))
    }

    async fn flights(
        &self,
        input: &FlightInput,
        ledger: &SearchLedger,
    ) -> Result<String, PlanError> {
        let destination = or_unnamed(&input.destination);
        let origin = if input.origin.is_empty() {
            "your city"
        } else {
            &input.origin
        };
        let window = dates_or_window(input.departure_date, input.return_date);

        self.search
            .search(&format!("flights {origin} to {destination}"), ledger)
            .await;

        let (cabin, note) = match input.budget {
            BudgetTier::Budget => (
                "economy on low-cost carriers",
                "lowest fares; expect early or late departures",
            ),
            BudgetTier::Moderate => (
                "economy on full-service airlines",
                "balance of price and schedule",
            ),
            BudgetTier::Luxury => (
                "premium economy or business",
                "comfort-first schedule, flexible tickets",
            ),
        };

        Ok(format!(
            "### Flight options: {origin} -> {destination}\n\n\
             **Window:** {window} | **Travelers:** {}\n\n\
             1. Morning direct, {cabin} - {note}.\n\
             2. Midday one-stop alternative - usually cheaper, adds 3-5 hours.\n",
            input.travelers,
        ))
    }

    async fn lodging(
        &self,
        input: &LodgingInput,
        ledger: &SearchLedger,
    ) -> Result<String, PlanError> {
        let destination = or_unnamed(&input.destination);
        let window = dates_or_window(input.check_in, input.check_out);

        self.search
            .search(&format!("hotels in {destination}"), ledger)
            .await;

        let tiers = match input.budget {
            BudgetTier::Budget => "guesthouse or 3-star near transit",
            BudgetTier::Moderate => "well-rated 4-star in a central district",
            BudgetTier::Luxury => "5-star property with club access",
        };

        let mut text = format!(
            "### Lodging options in {destination}\n\n\
             **Stay:** {window} | **Travelers:** {}\n\n\
             1. {tiers}.\n\
             2. Serviced apartment alternative for longer stays.\n",
            input.travelers,
        );
        if !input.preferences.is_empty() {
            text.push_str(&format!("\n**Requested:** {}\n", input.preferences));
        }

        Ok(text)
    }

    async fn activities(
        &self,
        input: &ActivityInput,
        ledger: &SearchLedger,
    ) -> Result<String, PlanError> {
        let destination = or_unnamed(&input.destination);
        let days = input.duration_days.clamp(1, 10);

        self.search
            .search(&format!("things to do in {destination}"), ledger)
            .await;

        let themes: Vec<&str> = if input.interests.is_empty() {
            vec!["landmarks", "local food", "neighborhood walk"]
        } else {
            input.interests.split(", ").collect()
        };

        let mut text = format!("### Activities in {destination} ({days} days)\n\n");
        for day in 1..=days {
            let theme = themes[(day as usize - 1) % themes.len()];
            text.push_str(&format!(
                "- Day {day}: focus on {theme}; keep the afternoon unscheduled.\n"
            ));
        }

        Ok(text)
    }

    async fn synthesize(&self, input: &SynthesisInput) -> Result<String, PlanError> {
        let request_line = input.request.lines().next().unwrap_or_default();

        Ok(format!(
            "# Trip Itinerary\n\n\
             _Request: {request_line}_\n\n\
             ## Overview\n{}\n\n\
             ## Flights\n{}\n\
             ## Accommodation\n{}\n\
             ## Daily Activities\n{}\n\
             ## Notes\n\
             - Prices and times are estimates; confirm before booking.\n\
             - Keep one rest block per day.\n",
            input.research, input.flights, input.lodging, input.activities,
        ))
    }

    async fn review(&self, input: &ReviewInput) -> Result<ReviewResult, PlanError> {
        let mut score: u8 = 3;
        let mut strengths = Vec::new();
        let mut improvements = Vec::new();

        for (header, weight) in [
            ("## Flights", 2),
            ("## Accommodation", 2),
            ("## Daily Activities", 2),
            ("## Notes", 1),
        ] {
            if input.itinerary.contains(header) {
                score += weight;
                strengths.push(format!("{} section present", header.trim_start_matches('#').trim()));
            } else {
                improvements.push(format!("Add a section: {header}"));
            }
        }

        let score = score.min(10);
        Ok(ReviewResult {
            score,
            strengths,
            improvements,
            summary: format!("Structural review against the request scored {score}/10."),
        })
    }

    async fn improve(&self, input: &ImproveInput) -> Result<String, PlanError> {
        let mut improved = input.itinerary.clone();
        for improvement in &input.improvements {
            if let Some(header) = improvement.strip_prefix("Add a section: ") {
                improved.push_str(&format!(
                    "\n\n{header}\n- Added during refinement based on reviewer feedback.\n"
                ));
            }
        }
        Ok(improved)
    }

    async fn quick_answer(
        &self,
        input: &QuickAnswerInput,
        ledger: &SearchLedger,
    ) -> Result<String, PlanError> {
        let found = self.search.search(&input.question, ledger).await;

        let family_note = if input.has_kids {
            let ages = input
                .kid_ages
                .iter()
                .map(u8::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            if ages.is_empty() {
                "\n\n**Traveling with kids:** favor short transit legs and flexible bookings."
                    .to_string()
            } else {
                format!(
                    "\n\n**Traveling with kids (ages {ages}):** favor short transit legs, \
                     early dinners, and flexible bookings."
                )
            }
        } else {
            String::new()
        };

        Ok(format!(
            "**Question:** {}\n\n{found}{family_note}\n\n\
             _Want a full itinerary? Ask for one._",
            input.question,
        ))
    }

    async fn analyze_family(&self, input: &FamilyAnalysisInput) -> Result<FamilyNeeds, PlanError> {
        let age_group = match input.kid_ages.iter().min() {
            None => AgeGroup::Unknown,
            Some(&age) if age <= 2 => AgeGroup::Infant,
            Some(&age) if age <= 5 => AgeGroup::Toddler,
            Some(&age) if age <= 12 => AgeGroup::Child,
            Some(_) => AgeGroup::Teen,
        };

        let mut needs = FamilyNeeds {
            age_group,
            activity_constraints: vec!["avoid adult-only venues".to_string()],
            activity_preferences: Vec::new(),
            hotel_requirements: vec![
                "family rooms or connecting rooms".to_string(),
                "safe neighborhood".to_string(),
            ],
            schedule_constraints: vec!["shorter travel days than an adult trip".to_string()],
            dining_needs: vec!["kid-friendly restaurants".to_string()],
            safety_notes: vec!["note the nearest clinic to the hotel".to_string()],
            packing_suggestions: vec!["entertainment for transit and waiting times".to_string()],
        };

        match age_group {
            AgeGroup::Infant => {
                needs
                    .activity_constraints
                    .push("no long walking tours".to_string());
                needs
                    .schedule_constraints
                    .push("plan around nap times".to_string());
                needs
                    .hotel_requirements
                    .push("baby crib available".to_string());
            }
            AgeGroup::Toddler => {
                needs
                    .activity_preferences
                    .push("playgrounds and interactive exhibits".to_string());
                needs
                    .schedule_constraints
                    .push("early bedtimes; cap outings at 2-3 hours".to_string());
                needs
                    .dining_needs
                    .push("high chairs and kids menu".to_string());
            }
            AgeGroup::Child => {
                needs
                    .activity_preferences
                    .push("interactive museums and science centers".to_string());
            }
            AgeGroup::Teen => {
                needs
                    .activity_preferences
                    .push("age-appropriate adventure activities".to_string());
                needs
                    .schedule_constraints
                    .push("allow some independent time".to_string());
            }
            AgeGroup::Unknown => {
                // Ages were not extracted; keep constraints generic instead of
                // guessing a band.
                needs
                    .activity_preferences
                    .push("broadly family-friendly attractions".to_string());
            }
        }

        if input.duration_days > 7 {
            needs
                .schedule_constraints
                .push("schedule a low-key recovery day mid-trip".to_string());
        }

        Ok(needs)
    }

    async fn family_recommendations(
        &self,
        input: &FamilyRecommendationInput,
    ) -> Result<String, PlanError> {
        let ages = if input.kid_ages.is_empty() {
            "not specified".to_string()
        } else {
            input
                .kid_ages
                .iter()
                .map(u8::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        };

        Ok(format!(
            "### Family recommendations for {}\n\n\
             **Kid ages:** {ages} | **Duration:** {} days | **Budget:** {}\n\n\
             - Daily rhythm: one anchor activity in the morning, downtime after lunch.\n\
             - Book lodging near a park or open space.\n\
             - Carry snacks and a small first-aid kit everywhere.\n\
             - Look for family tickets and free-entry days for kids.\n",
            or_unnamed(&input.destination),
            input.duration_days,
            input.budget.as_code(),
        ))
    }

    async fn origin_holidays(
        &self,
        country: &str,
        year: i32,
        ledger: &SearchLedger,
    ) -> Result<String, PlanError> {
        if country.eq_ignore_ascii_case("malaysia") {
            return Ok(format!(
                "## Malaysia holidays {year}\n\n\
                 - Major festivals: Chinese New Year, Hari Raya Aidilfitri, Deepavali, Christmas.\n\
                 - School holiday periods: March, late May to early June, August, \
                   mid November to end December.\n\
                 - Long-weekend windows: federal holidays falling on Tuesday or Thursday.\n"
            ));
        }

        let found = self
            .search
            .search(&format!("{country} public holidays {year}"), ledger)
            .await;
        Ok(format!("## {country} holidays {year}\n\n{found}"))
    }

    async fn destination_events(
        &self,
        destination: &str,
        window: &str,
        ledger: &SearchLedger,
    ) -> Result<String, PlanError> {
        let found = self
            .search
            .search(&format!("{destination} events {window}"), ledger)
            .await;

        Ok(format!(
            "Local holidays can mean closures; festivals can mean crowds. \
             Window checked: {window}.\n\n{found}"
        ))
    }

    async fn suggest_dates(
        &self,
        input: &DateWindowInput,
        ledger: &SearchLedger,
    ) -> Result<String, PlanError> {
        let destination = or_unnamed(&input.destination);
        self.search
            .search(&format!("best time to visit {destination}"), ledger)
            .await;

        let family_line = if input.kid_ages.is_empty() {
            String::new()
        } else {
            "\n3. **Family option** - align with school holiday periods at home.".to_string()
        };

        Ok(format!(
            "### Suggested travel windows for {destination} ({} days, from {})\n\n\
             1. **Best option** - shoulder season, good weather, moderate crowds.\n\
             2. **Budget option** - off-peak weeks right after local holidays end.{family_line}\n\n\
             Dates are {}; firm them up once leave is approved.\n",
            input.duration_days,
            input.origin_country,
            if input.flexible { "flexible" } else { "fixed" },
        ))
    }
}
