use metrics::{counter, gauge, histogram};

/// Metrics collector for status delivery
#[derive(Clone)]
pub struct Metrics {
    prefix: &'static str,
}

impl Metrics {
    pub fn new() -> Self {
        Self { prefix: "dh_sse" }
    }

    /// Gateway connection registered or replaced
    pub fn gateway_connected(&self) {
        counter!(format!("{}.gateway.connections.connect", self.prefix)).increment(1);
    }

    pub fn gateway_disconnected(&self) {
        counter!(format!("{}.gateway.connections.disconnect", self.prefix)).increment(1);
    }

    pub fn active_connections(&self, count: usize) {
        gauge!(format!("{}.gateway.connections.active", self.prefix)).set(count as f64);
    }

    /// Record one gateway push by event name and outcome
    pub fn event_sent(&self, event_name: &str, status: &str) {
        counter!(format!("{}.gateway.events.sent", self.prefix)).increment(1);
        counter!(format!(
            "{}.gateway.events.{}.{}",
            self.prefix, event_name, status
        ))
        .increment(1);
    }

    pub fn send_latency(&self, duration: std::time::Duration) {
        histogram!(format!("{}.gateway.send.duration_seconds", self.prefix))
            .record(duration.as_secs_f64());
    }

    pub fn identity_binding(&self, status: &str) {
        counter!(format!("{}.identity.binding.{}", self.prefix, status)).increment(1);
    }

    pub fn status_emitted(&self, state: &str) {
        counter!(format!("{}.status.emitted.{}", self.prefix, state)).increment(1);
    }

    pub fn stream_opened(&self) {
        counter!(format!("{}.streams.opened", self.prefix)).increment(1);
        gauge!(format!("{}.streams.active", self.prefix)).increment(1.0);
    }

    pub fn stream_closed(&self) {
        gauge!(format!("{}.streams.active", self.prefix)).decrement(1.0);
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
