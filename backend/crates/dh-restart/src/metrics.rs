use std::time::Duration;

use metrics::{counter, gauge, histogram};

/// Metrics collector for restarts
#[derive(Clone)]
pub struct Metrics {
    prefix: &'static str,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            prefix: "dh_restart",
        }
    }

    pub fn accepted(&self) {
        counter!(format!("{}.requests.accepted", self.prefix)).increment(1);
    }

    pub fn rejected(&self, reason: &str) {
        counter!(format!("{}.requests.rejected.{}", self.prefix, reason)).increment(1);
    }

    pub fn in_flight(&self, count: usize) {
        gauge!(format!("{}.in_flight", self.prefix)).set(count as f64);
    }

    /// Record how a restart ended and how long it took
    pub fn finished(&self, outcome: &str, duration: Duration) {
        counter!(format!("{}.outcomes.{}", self.prefix, outcome)).increment(1);
        histogram!(format!("{}.duration_seconds", self.prefix)).record(duration.as_secs_f64());
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
