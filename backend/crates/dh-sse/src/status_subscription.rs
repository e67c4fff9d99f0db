use crate::{LocalFanout, Metrics, ShutdownGuard, StreamFrame, TabStatusUpdate};

use std::sync::Arc;
use std::time::Duration;

use futures::Stream;
use futures::stream;
use tokio::sync::mpsc;

/// One direct-stream subscriber for a single tab.
///
/// The first queued update is always the tab's value at subscribe time.
/// Dropping the subscription detaches it from the fan-out.
pub struct StatusSubscription {
    id: String,
    tab_index: usize,
    rx: mpsc::UnboundedReceiver<TabStatusUpdate>,
    fanout: Arc<LocalFanout>,
    metrics: Metrics,
}

impl StatusSubscription {
    pub(crate) fn new(
        id: String,
        tab_index: usize,
        rx: mpsc::UnboundedReceiver<TabStatusUpdate>,
        fanout: Arc<LocalFanout>,
        metrics: Metrics,
    ) -> Self {
        metrics.stream_opened();
        Self {
            id,
            tab_index,
            rx,
            fanout,
            metrics,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn tab_index(&self) -> usize {
        self.tab_index
    }

    /// Next update in emission order, or `None` once detached.
    pub async fn next(&mut self) -> Option<TabStatusUpdate> {
        self.rx.recv().await
    }

    /// Turn the subscription into SSE frames.
    ///
    /// Yields a heartbeat after `heartbeat` of silence; the timer restarts
    /// after every frame. Ends when `guard` observes shutdown.
    pub fn into_stream(
        self,
        heartbeat: Duration,
        guard: ShutdownGuard,
    ) -> impl Stream<Item = StreamFrame> + Send + 'static {
        stream::unfold((self, guard), move |(mut sub, mut guard)| async move {
            let frame = tokio::select! {
                biased;
                _ = guard.wait() => None,
                next = tokio::time::timeout(heartbeat, sub.next()) => match next {
                    Ok(Some(update)) => Some(StreamFrame::Status(update.payload())),
                    Ok(None) => None,
                    Err(_) => Some(StreamFrame::Heartbeat),
                },
            };
            frame.map(|frame| (frame, (sub, guard)))
        })
    }
}

impl Drop for StatusSubscription {
    fn drop(&mut self) {
        self.fanout.remove(&self.id);
        self.metrics.stream_closed();
    }
}
