//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Media probing (attempts by result)
//! - Conversions (outcomes, wall-clock duration, active job)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts};

// =============================================================================
// Probe Metrics
// =============================================================================

/// Probe attempts total by result.
pub static PROBES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("convertify_probes_total", "Total media probe attempts"),
        &["result"], // "ok", "not_found", "engine_missing", "failed"
    )
    .unwrap()
});

// =============================================================================
// Conversion Metrics
// =============================================================================

/// Conversions total by terminal outcome.
pub static CONVERSIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("convertify_conversions_total", "Total finished conversions"),
        &["outcome"], // "completed", "failed", "cancelled"
    )
    .unwrap()
});

/// Conversion wall-clock duration in seconds.
pub static CONVERSION_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "convertify_conversion_duration_seconds",
            "Wall-clock duration of conversions",
        )
        .buckets(vec![1.0, 5.0, 15.0, 30.0, 60.0, 120.0, 300.0, 900.0, 1800.0, 3600.0]),
        &["outcome"],
    )
    .unwrap()
});

/// Whether a conversion is currently running (0 or 1).
pub static CONVERSION_ACTIVE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "convertify_conversion_active",
        "Whether a conversion is currently running",
    )
    .unwrap()
});

/// Returns all core metrics for registration.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(PROBES_TOTAL.clone()),
        Box::new(CONVERSIONS_TOTAL.clone()),
        Box::new(CONVERSION_DURATION.clone()),
        Box::new(CONVERSION_ACTIVE.clone()),
    ]
}
