//! View render metrics.
//!
//! | Metric | Type | Labels |
//! |--------|------|--------|
//! | `vista_view_renders_total` | Counter | `outcome` |
//! | `vista_view_render_duration_seconds` | Histogram | `outcome` |
//!
//! `outcome` is `rendered`, `error` or `skipped` (the handler responded
//! itself). Nothing is exported unless a recorder is installed, see
//! `vista-telemetry`.

use metrics::{counter, histogram};
use std::time::Duration;

/// Counter of view middleware invocations.
pub const RENDERS_TOTAL: &str = "vista_view_renders_total";

/// Histogram of time spent rendering.
pub const RENDER_DURATION_SECONDS: &str = "vista_view_render_duration_seconds";

/// How a view invocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    Rendered,
    Error,
    Skipped,
}

impl Outcome {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Rendered => "rendered",
            Self::Error => "error",
            Self::Skipped => "skipped",
        }
    }
}

pub(crate) fn record_skipped() {
    counter!(RENDERS_TOTAL, "outcome" => Outcome::Skipped.as_str()).increment(1);
}

pub(crate) fn record_render(outcome: Outcome, duration: Duration) {
    counter!(RENDERS_TOTAL, "outcome" => outcome.as_str()).increment(1);
    histogram!(RENDER_DURATION_SECONDS, "outcome" => outcome.as_str())
        .record(duration.as_secs_f64());
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrics_exporter_prometheus::PrometheusBuilder;

    #[test]
    fn test_outcomes_are_labelled() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            record_skipped();
            record_render(Outcome::Rendered, Duration::from_millis(3));
            record_render(Outcome::Rendered, Duration::from_millis(5));
            record_render(Outcome::Error, Duration::ZERO);
        });

        let output = handle.render();
        assert!(output.contains("vista_view_renders_total{outcome=\"skipped\"} 1"));
        assert!(output.contains("vista_view_renders_total{outcome=\"rendered\"} 2"));
        assert!(output.contains("vista_view_renders_total{outcome=\"error\"} 1"));
        assert!(output.contains("vista_view_render_duration_seconds_count{outcome=\"rendered\"} 2"));
        assert!(!output.contains("vista_view_render_duration_seconds_count{outcome=\"skipped\"}"));
    }
}
