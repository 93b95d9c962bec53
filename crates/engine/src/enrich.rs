use chrono::{Datelike, Utc};
use tracing::debug;
use wayfinder_core::{PlanError, TravelContext};
use wayfinder_observability::PlannerMetrics;
use wayfinder_providers::{
    CapabilitySuite, FamilyAnalysisInput, FamilyRecommendationInput, SearchLedger,
};

/// How many family constraints make it into the synthesis request.
const MAX_CONSTRAINTS_IN_REQUEST: usize = 5;

/// How much holiday context is quoted in the synthesis request.
const HOLIDAY_EXCERPT_CHARS: usize = 500;

/// Age-banded activity filter lines derived from the youngest and oldest kid.
///
/// An empty age list means kids are present but their ages are unknown; the
/// filter stays generic instead of assuming a band.
pub fn family_activity_filter(kid_ages: &[u8]) -> String {
    let (Some(&min_age), Some(&max_age)) = (kid_ages.iter().min(), kid_ages.iter().max()) else {
        return "- keep venues broadly family-friendly (kid ages unknown)".to_string();
    };

    let mut filters: Vec<&str> = Vec::new();

    if min_age <= 2 {
        filters.extend([
            "must have stroller accessibility",
            "avoid walking tours longer than an hour",
            "prioritize morning activities before nap time",
        ]);
    }
    if min_age <= 5 {
        filters.extend([
            "skip museums with no-touching policies",
            "include playgrounds and interactive exhibits",
            "limit outings to 2-3 hours",
        ]);
    }
    if kid_ages.iter().any(|&age| (6..=12).contains(&age)) {
        filters.extend([
            "include educational but fun stops",
            "consider science centers and theme parks",
        ]);
    }
    if max_age >= 13 {
        filters.extend([
            "include age-appropriate adventure options",
            "allow teens some independent time",
        ]);
    }

    filters
        .iter()
        .map(|filter| format!("- {filter}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Preference string for destination research.
pub fn build_preferences(context: &TravelContext) -> String {
    let mut prefs = Vec::new();

    if !context.interests.is_empty() {
        prefs.push(context.interests.clone());
    }

    if context.has_kids {
        if context.kid_ages.is_empty() {
            prefs.push("traveling with kids (ages unknown)".to_string());
        } else {
            prefs.push(format!(
                "traveling with kids (ages: {})",
                join_ages(&context.kid_ages)
            ));
        }
        prefs.push("need kid-friendly options".to_string());
    }

    if context.check_origin_holidays {
        prefs.push(format!("considering {} holidays", context.origin_country));
    }

    prefs.join("; ")
}

/// Lodging preference string; age-specific lines are skipped when ages are
/// unknown.
pub fn build_hotel_preferences(context: &TravelContext) -> String {
    if !context.has_kids {
        return String::new();
    }

    let mut prefs = vec!["family rooms or connecting rooms".to_string()];
    if context.kid_ages.iter().min().is_some_and(|&age| age <= 5) {
        prefs.push("baby crib available".to_string());
    }
    prefs.push("safe neighborhood".to_string());
    prefs.push("near family attractions".to_string());

    prefs.join(", ")
}

/// Activity interests with age-group annotations.
pub fn build_activity_interests(context: &TravelContext) -> String {
    let mut interests = Vec::new();

    if !context.interests.is_empty() {
        interests.push(context.interests.clone());
    }

    if context.has_kids {
        interests.push(format!(
            "{}-appropriate activities",
            context.kid_age_group().as_code()
        ));

        if context.kid_ages.iter().min().is_some_and(|&age| age <= 5) {
            interests.push("playgrounds, parks".to_string());
        }
        if context.kid_ages.iter().any(|&age| (6..=12).contains(&age)) {
            interests.push("interactive museums, educational fun".to_string());
        }
        if context.kid_ages.iter().any(|&age| age >= 13) {
            interests.push("adventure activities for teens".to_string());
        }
    }

    interests.join(", ")
}

/// Synthesis request carrying the raw request plus family and holiday
/// annotations gathered during enrichment.
pub fn build_enhanced_request(context: &TravelContext) -> String {
    let mut parts = vec![context.raw_request.clone()];

    if context.has_kids {
        let ages = if context.kid_ages.is_empty() {
            "unknown".to_string()
        } else {
            join_ages(&context.kid_ages)
        };
        parts.push(format!(
            "\n**Family info:** traveling with {} kids (ages: {ages})",
            context.kid_ages.len().max(1)
        ));

        if !context.family_constraints.is_empty() {
            let constraints: Vec<&str> = context
                .family_constraints
                .iter()
                .take(MAX_CONSTRAINTS_IN_REQUEST)
                .map(String::as_str)
                .collect();
            parts.push(format!("Constraints: {}", constraints.join("; ")));
        }

        parts.push(format!(
            "Activity filters:\n{}",
            family_activity_filter(&context.kid_ages)
        ));
    }

    if !context.holiday_info.is_empty() {
        let excerpt: String = context
            .holiday_info
            .chars()
            .take(HOLIDAY_EXCERPT_CHARS)
            .collect();
        parts.push(format!("\n**Holiday context:**\n{excerpt}"));
    }

    parts.join("\n")
}

/// Researches holidays and folds the findings into the context.
pub async fn update_context_with_holidays<C: CapabilitySuite>(
    caps: &C,
    metrics: &PlannerMetrics,
    context: &mut TravelContext,
    ledger: &SearchLedger,
) -> Result<(), PlanError> {
    if context.check_origin_holidays || context.flexible_dates {
        metrics.inc_capability_call();
        context.holiday_info = caps
            .origin_holidays(&context.origin_country, Utc::now().year(), ledger)
            .await?;
    }

    if !context.destination.is_empty() && context.departure_date.is_some() {
        metrics.inc_capability_call();
        let events = caps
            .destination_events(&context.destination, &context.travel_window(), ledger)
            .await?;
        if !context.holiday_info.is_empty() {
            context.holiday_info.push_str("\n\n");
        }
        context.holiday_info.push_str("## Destination Events\n");
        context.holiday_info.push_str(&events);
    }

    Ok(())
}

/// Analyzes family needs and stores constraints and recommendations on the
/// context.
pub async fn update_context_with_family_needs<C: CapabilitySuite>(
    caps: &C,
    metrics: &PlannerMetrics,
    context: &mut TravelContext,
) -> Result<(), PlanError> {
    if !context.needs_family_planning() {
        return Ok(());
    }

    metrics.inc_capability_call();
    let needs = caps
        .analyze_family(&FamilyAnalysisInput {
            kid_ages: context.kid_ages.clone(),
            destination: context.destination.clone(),
            duration_days: context.duration_days(),
        })
        .await?;

    debug!(age_group = needs.age_group.as_code(), "family needs analyzed");

    let mut constraints = needs.activity_constraints;
    constraints.extend(needs.schedule_constraints);
    constraints.extend(needs.safety_notes);
    context.family_constraints = constraints;

    metrics.inc_capability_call();
    context.family_recommendations = caps
        .family_recommendations(&FamilyRecommendationInput {
            destination: context.destination.clone(),
            kid_ages: context.kid_ages.clone(),
            duration_days: context.duration_days(),
            budget: context.budget,
            interests: context.interests.clone(),
        })
        .await?;

    Ok(())
}

fn join_ages(ages: &[u8]) -> String {
    ages.iter()
        .map(u8::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use wayfinder_core::{build_context, DetectedIntents, Intent};

    fn family_context(kid_ages: Vec<u8>) -> TravelContext {
        build_context(
            "family trip",
            &DetectedIntents {
                intents: vec![Intent::BasicTrip, Intent::FamilyTrip],
                confidence: 0.9,
                reasoning: String::new(),
                has_kids: true,
                kid_ages,
                family_size: 1,
                wants_holiday_alignment: false,
                origin_country: "Malaysia".to_string(),
                flexible_dates: false,
                is_quick_question: false,
            },
        )
    }

    #[test]
    fn filter_covers_toddler_and_teen_bands() {
        let filter = family_activity_filter(&[3, 14]);
        assert!(filter.contains("playgrounds"));
        assert!(filter.contains("teens"));
        assert!(!filter.contains("stroller"));
    }

    #[test]
    fn filter_stays_generic_without_ages() {
        let filter = family_activity_filter(&[]);
        assert!(filter.contains("ages unknown"));
    }

    #[test]
    fn hotel_preferences_include_crib_for_young_kids() {
        let ctx = family_context(vec![3, 7]);
        let prefs = build_hotel_preferences(&ctx);
        assert!(prefs.contains("baby crib"));
        assert!(prefs.contains("family rooms"));
    }

    #[test]
    fn hotel_preferences_skip_crib_when_ages_unknown() {
        let ctx = family_context(Vec::new());
        let prefs = build_hotel_preferences(&ctx);
        assert!(!prefs.contains("crib"));
        assert!(prefs.contains("family rooms"));
    }

    #[test]
    fn activity_interests_carry_age_group() {
        let mut ctx = family_context(vec![3, 7]);
        ctx.interests = "food".to_string();
        let interests = build_activity_interests(&ctx);
        assert!(interests.starts_with("food"));
        assert!(interests.contains("toddler-appropriate"));
        assert!(interests.contains("interactive museums"));
    }

    #[test]
    fn enhanced_request_caps_constraints() {
        let mut ctx = family_context(vec![4]);
        ctx.family_constraints = (0..8).map(|i| format!("constraint {i}")).collect();
        let request = build_enhanced_request(&ctx);
        assert!(request.contains("constraint 4"));
        assert!(!request.contains("constraint 5"));
    }

    #[test]
    fn enhanced_request_truncates_holiday_context() {
        let mut ctx = family_context(Vec::new());
        ctx.holiday_info = "h".repeat(2000);
        let request = build_enhanced_request(&ctx);
        let holiday_block = request.split("**Holiday context:**").nth(1).unwrap();
        assert!(holiday_block.trim().len() <= HOLIDAY_EXCERPT_CHARS);
    }
}
