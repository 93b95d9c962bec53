use parking_lot::Mutex;
use serde::Serialize;
use uuid::Uuid;

/// What a single provider attempt produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchOutcome {
    Hit,
    Empty,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchRecord {
    pub provider: String,
    pub query: String,
    pub outcome: SearchOutcome,
}

/// Per-request accumulator of search activity.
///
/// One ledger is created per planning request and passed to every
/// search-backed capability call, so concurrent fan-out branches record into
/// request-local state instead of a process-wide tracker.
#[derive(Debug)]
pub struct SearchLedger {
    request_id: Uuid,
    records: Mutex<Vec<SearchRecord>>,
}

impl SearchLedger {
    pub fn new() -> Self {
        Self::for_request(Uuid::new_v4())
    }

    pub fn for_request(request_id: Uuid) -> Self {
        Self {
            request_id,
            records: Mutex::new(Vec::new()),
        }
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn record(&self, provider: &str, query: &str, outcome: SearchOutcome) {
        self.records.lock().push(SearchRecord {
            provider: provider.to_string(),
            query: query.to_string(),
            outcome,
        });
    }

    pub fn records(&self) -> Vec<SearchRecord> {
        self.records.lock().clone()
    }

    /// Number of queries that ended on the disclaimer default.
    pub fn defaulted_searches(&self) -> usize {
        self.records
            .lock()
            .iter()
            .filter(|record| record.provider == crate::search::DEFAULT_PROVIDER_NAME)
            .count()
    }

    pub fn summary(&self) -> String {
        let records = self.records.lock();
        let hits = records
            .iter()
            .filter(|record| record.outcome == SearchOutcome::Hit)
            .count();
        format!("{} search attempts, {} hits", records.len(), hits)
    }
}

impl Default for SearchLedger {
    fn default() -> Self {
        Self::new()
    }
}
