//! Metrics definitions for the aggregator.

use shared::metrics_defs::{MetricDef, MetricType};

pub const REFRESH_SUCCESS: MetricDef = MetricDef {
    name: "aggregator.refresh.success",
    metric_type: MetricType::Counter,
    description: "Refreshes that replaced the cached dashboard snapshot",
};

pub const REFRESH_FAILURE: MetricDef = MetricDef {
    name: "aggregator.refresh.failure",
    metric_type: MetricType::Counter,
    description: "Refreshes that failed and left the previous snapshot in place",
};

pub const REFRESH_COALESCED: MetricDef = MetricDef {
    name: "aggregator.refresh.coalesced",
    metric_type: MetricType::Counter,
    description: "Refresh triggers dropped because one was already in flight",
};

pub const REFRESH_DURATION: MetricDef = MetricDef {
    name: "aggregator.refresh.duration",
    metric_type: MetricType::Histogram,
    description: "Time to fetch and store a dashboard snapshot in seconds",
};

pub const SERVED_STALE: MetricDef = MetricDef {
    name: "aggregator.cache.served_stale",
    metric_type: MetricType::Counter,
    description: "Reads served from a snapshot older than the refresh period",
};

pub const ALL_METRICS: &[MetricDef] = &[
    REFRESH_SUCCESS,
    REFRESH_FAILURE,
    REFRESH_COALESCED,
    REFRESH_DURATION,
    SERVED_STALE,
];
