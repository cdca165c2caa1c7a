//! Metrics definitions for the gateway.

use shared::metrics_defs::{MetricDef, MetricType};

pub const REQUESTS_FORWARDED: MetricDef = MetricDef {
    name: "gateway.requests.forwarded",
    metric_type: MetricType::Counter,
    description: "Requests rewritten to the versioned backend path and forwarded",
};

pub const REQUESTS_REJECTED: MetricDef = MetricDef {
    name: "gateway.requests.rejected",
    metric_type: MetricType::Counter,
    description: "Requests outside the /api prefix, answered with 404",
};

pub const UPSTREAM_ERRORS: MetricDef = MetricDef {
    name: "gateway.upstream.errors",
    metric_type: MetricType::Counter,
    description: "Forwarded requests that failed at the upstream, answered with 502",
};

pub const REQUESTS_INFLIGHT: MetricDef = MetricDef {
    name: "gateway.requests.inflight",
    metric_type: MetricType::Gauge,
    description: "Requests currently being forwarded",
};

pub const ALL_METRICS: &[MetricDef] = &[
    REQUESTS_FORWARDED,
    REQUESTS_REJECTED,
    UPSTREAM_ERRORS,
    REQUESTS_INFLIGHT,
];
