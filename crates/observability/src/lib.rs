use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::OnceCell;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

static TRACING_INIT: OnceCell<()> = OnceCell::new();

#[derive(Debug, Default)]
pub struct AppMetrics {
    interpretations_total: AtomicU64,
    invalid_queries_total: AtomicU64,
    summaries_total: AtomicU64,
    fragments_relayed_total: AtomicU64,
    upstream_failures_total: AtomicU64,
    protocol_errors_total: AtomicU64,
    total_latency_millis: AtomicU64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub interpretations_total: u64,
    pub invalid_queries_total: u64,
    pub summaries_total: u64,
    pub fragments_relayed_total: u64,
    pub upstream_failures_total: u64,
    pub protocol_errors_total: u64,
    pub avg_interpret_latency_millis: f64,
}

impl AppMetrics {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn inc_interpretation(&self) {
        self.interpretations_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_invalid_query(&self) {
        self.invalid_queries_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_summary(&self) {
        self.summaries_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_fragment(&self) {
        self.fragments_relayed_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_upstream_failure(&self) {
        self.upstream_failures_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_protocol_error(&self) {
        self.protocol_errors_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Only interpretation round trips are timed; summaries are open-ended streams.
    pub fn observe_latency(&self, duration: Duration) {
        self.total_latency_millis
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let interpretations = self.interpretations_total.load(Ordering::Relaxed);
        let latency = self.total_latency_millis.load(Ordering::Relaxed);

        MetricsSnapshot {
            interpretations_total: interpretations,
            invalid_queries_total: self.invalid_queries_total.load(Ordering::Relaxed),
            summaries_total: self.summaries_total.load(Ordering::Relaxed),
            fragments_relayed_total: self.fragments_relayed_total.load(Ordering::Relaxed),
            upstream_failures_total: self.upstream_failures_total.load(Ordering::Relaxed),
            protocol_errors_total: self.protocol_errors_total.load(Ordering::Relaxed),
            avg_interpret_latency_millis: if interpretations == 0 {
                0.0
            } else {
                latency as f64 / interpretations as f64
            },
        }
    }
}

pub fn init_tracing(service_name: &str) {
    TRACING_INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}=info,routewise_api=info,routewise_agents=info,tower_http=info",
                service_name
            ))
        });

        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(true)
            .with_span_list(true)
            .with_writer(std::io::stderr)
            .init();
    });
}
