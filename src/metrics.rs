use crate::entity::EntityKind;
use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use std::time::Instant;

/// Install the Prometheus recorder and describe the metrics emitted by the backend client
pub fn register_metrics() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    describe_metrics();

    Ok(handle)
}

fn describe_metrics() {
    // Count of portal requests. Labeled with the entity, method and status (success or failure).
    describe_counter!("portal_requests_total", "Total number of portal API requests");

    // Latency of portal requests, labeled with the entity and method.
    describe_histogram!(
        "portal_request_duration_seconds",
        "Duration of portal API requests in seconds"
    );
}

/// Record a finished portal request
pub fn record_request(kind: EntityKind, method: Method, status: Status) {
    counter!(
        "portal_requests_total",
        "entity" => kind.collection(),
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Create a timer for a portal request
pub fn request_timer(kind: EntityKind, method: Method) -> Timer {
    Timer {
        kind,
        method,
        start_time: Instant::now(),
    }
}

pub struct Timer {
    kind: EntityKind,
    method: Method,
    start_time: Instant,
}

impl Drop for Timer {
    fn drop(&mut self) {
        let duration = self.start_time.elapsed().as_secs_f64();

        histogram!(
            "portal_request_duration_seconds",
            "entity" => self.kind.collection(),
            "method" => self.method.to_string()
        )
        .record(duration);
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Method {
    Get,
    Query,
    Upsert,
    Delete,
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Method::Get => write!(f, "get"),
            Method::Query => write!(f, "query"),
            Method::Upsert => write!(f, "upsert"),
            Method::Delete => write!(f, "delete"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Status {
    Success,
    Failure,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Success => write!(f, "success"),
            Status::Failure => write!(f, "failure"),
        }
    }
}
