use std::sync::Mutex;

use serde::Serialize;

/// Counter snapshot served by the dashboard bridge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub simulations: usize,
    pub fit_runs: usize,
    pub errors: usize,
}

pub struct MetricsRecorder {
    inner: Mutex<MetricsSnapshot>,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MetricsSnapshot::default()),
        }
    }

    pub fn record_simulation(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.simulations += 1;
        }
    }

    pub fn record_fit_run(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.fit_runs += 1;
        }
    }

    pub fn record_error(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.errors += 1;
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        self.inner
            .lock()
            .map(|metrics| *metrics)
            .unwrap_or_default()
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate_independently() {
        let recorder = MetricsRecorder::new();
        recorder.record_simulation();
        recorder.record_simulation();
        recorder.record_fit_run();
        recorder.record_error();
        let snapshot = recorder.snapshot();
        assert_eq!(snapshot.simulations, 2);
        assert_eq!(snapshot.fit_runs, 1);
        assert_eq!(snapshot.errors, 1);
    }
}
