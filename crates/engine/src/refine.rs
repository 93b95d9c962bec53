use tracing::debug;
use wayfinder_core::{PlanError, ReviewResult, MAX_REFLECTION_ITERATIONS};
use wayfinder_observability::PlannerMetrics;
use wayfinder_providers::{CapabilitySuite, ImproveInput, ReviewInput};

/// Bounded review/improve cycle over a drafted itinerary.
///
/// A low score is policy input, not an error: the draft is improved and
/// re-reviewed up to `MAX_REFLECTION_ITERATIONS` times, then reviewed once
/// more and returned regardless of acceptability. Only an outright capability
/// failure aborts the loop.
pub async fn review_and_refine<C: CapabilitySuite>(
    caps: &C,
    metrics: &PlannerMetrics,
    itinerary: String,
    request: &str,
) -> Result<(String, ReviewResult), PlanError> {
    let mut current = itinerary;

    for iteration in 0..MAX_REFLECTION_ITERATIONS {
        metrics.inc_capability_call();
        let review = caps
            .review(&ReviewInput {
                itinerary: current.clone(),
                request: request.to_string(),
            })
            .await?;

        if review.is_acceptable() {
            debug!(iteration, score = review.score, "draft accepted");
            return Ok((current, review));
        }

        debug!(iteration, score = review.score, "draft rejected, improving");
        metrics.inc_capability_call();
        metrics.inc_improve_iteration();

        let input = ImproveInput {
            itinerary: current,
            score: review.score,
            summary: review.summary,
            improvements: review.improvements,
        };
        current = caps.improve(&input).await?;
    }

    // Iteration budget exhausted: one final review, returned as-is.
    metrics.inc_capability_call();
    let final_review = caps
        .review(&ReviewInput {
            itinerary: current.clone(),
            request: request.to_string(),
        })
        .await?;

    Ok((current, final_review))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wayfinder_providers::ScriptedSuite;

    #[tokio::test]
    async fn incomplete_draft_is_improved_until_acceptable() {
        let suite = ScriptedSuite::with_default_index("Malaysia");
        let metrics = PlannerMetrics::default();

        let (itinerary, review) =
            review_and_refine(&suite, &metrics, "# Trip Itinerary\n".to_string(), "plan")
                .await
                .unwrap();

        assert!(review.is_acceptable());
        assert!(itinerary.contains("## Flights"));
        assert!(itinerary.contains("## Accommodation"));
        assert_eq!(metrics.snapshot().improve_iterations_total, 1);
    }

    #[tokio::test]
    async fn complete_draft_passes_without_improvement() {
        let suite = ScriptedSuite::with_default_index("Malaysia");
        let metrics = PlannerMetrics::default();

        let draft = "# Trip Itinerary\n\n## Flights\n## Accommodation\n\
                     ## Daily Activities\n## Notes\n"
            .to_string();
        let (itinerary, review) = review_and_refine(&suite, &metrics, draft.clone(), "plan")
            .await
            .unwrap();

        assert_eq!(itinerary, draft);
        assert!(review.is_acceptable());
        assert_eq!(metrics.snapshot().improve_iterations_total, 0);
    }
}
