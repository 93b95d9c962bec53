use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::OnceCell;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

static TRACING_INIT: OnceCell<()> = OnceCell::new();

#[derive(Debug, Default)]
pub struct PlannerMetrics {
    requests_total: AtomicU64,
    quick_answers_total: AtomicU64,
    date_suggestions_total: AtomicU64,
    full_plans_total: AtomicU64,
    capability_calls_total: AtomicU64,
    search_defaults_total: AtomicU64,
    improve_iterations_total: AtomicU64,
    total_latency_millis: AtomicU64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub requests_total: u64,
    pub quick_answers_total: u64,
    pub date_suggestions_total: u64,
    pub full_plans_total: u64,
    pub capability_calls_total: u64,
    pub search_defaults_total: u64,
    pub improve_iterations_total: u64,
    pub avg_latency_millis: f64,
}

impl PlannerMetrics {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn inc_request(&self) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_quick_answer(&self) {
        self.quick_answers_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_date_suggestion(&self) {
        self.date_suggestions_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_full_plan(&self) {
        self.full_plans_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_capability_call(&self) {
        self.capability_calls_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_search_defaults(&self, count: usize) {
        self.search_defaults_total
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn inc_improve_iteration(&self) {
        self.improve_iterations_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn observe_latency(&self, duration: Duration) {
        self.total_latency_millis
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let requests = self.requests_total.load(Ordering::Relaxed);
        let latency = self.total_latency_millis.load(Ordering::Relaxed);

        MetricsSnapshot {
            requests_total: requests,
            quick_answers_total: self.quick_answers_total.load(Ordering::Relaxed),
            date_suggestions_total: self.date_suggestions_total.load(Ordering::Relaxed),
            full_plans_total: self.full_plans_total.load(Ordering::Relaxed),
            capability_calls_total: self.capability_calls_total.load(Ordering::Relaxed),
            search_defaults_total: self.search_defaults_total.load(Ordering::Relaxed),
            improve_iterations_total: self.improve_iterations_total.load(Ordering::Relaxed),
            avg_latency_millis: if requests == 0 {
                0.0
            } else {
                latency as f64 / requests as f64
            },
        }
    }
}

pub fn init_tracing(service_name: &str) {
    TRACING_INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}=info,wayfinder_engine=info,wayfinder_providers=info",
                service_name
            ))
        });

        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(true)
            .with_span_list(true)
            .init();
    });
}
