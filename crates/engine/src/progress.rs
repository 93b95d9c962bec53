use serde::Serialize;
use tracing::info;

/// Named pipeline stage attached to every progress event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Intent,
    Extract,
    Holiday,
    Family,
    QuickAnswer,
    Research,
    Flights,
    Lodging,
    Activities,
    Synthesis,
    Review,
    Complete,
}

impl Stage {
    pub fn as_code(self) -> &'static str {
        match self {
            Self::Intent => "intent",
            Self::Extract => "extract",
            Self::Holiday => "holiday",
            Self::Family => "family",
            Self::QuickAnswer => "quick_answer",
            Self::Research => "research",
            Self::Flights => "flights",
            Self::Lodging => "lodging",
            Self::Activities => "activities",
            Self::Synthesis => "synthesis",
            Self::Review => "review",
            Self::Complete => "complete",
        }
    }
}

/// Fire-and-forget progress reporting. Implementations must swallow their own
/// failures; a broken sink never aborts planning.
pub trait ProgressSink: Send + Sync {
    fn report(&self, stage: Stage, message: &str);
}

/// Discards all progress events.
pub struct NullSink;

impl ProgressSink for NullSink {
    fn report(&self, _stage: Stage, _message: &str) {}
}

/// Forwards progress events to the tracing pipeline.
pub struct TracingSink;

impl ProgressSink for TracingSink {
    fn report(&self, stage: Stage, message: &str) {
        info!(stage = stage.as_code(), message, "progress");
    }
}
