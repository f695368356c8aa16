//! Request pacing for tracked telemetry items.
//!
//! At most one request per item is outstanding. When a tick finds an item
//! still waiting for its answer, the item is marked [`RequestState::StillPending`]
//! instead of being requested again.

use super::sample::TelemetryItem;
use super::TelemetrySource;

/// Identifier of a tracked item's request, stable for the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(pub u32);

impl RequestId {
    /// Id assigned to `item`.
    pub fn for_item(item: TelemetryItem) -> Self {
        let index = TelemetryItem::all()
            .iter()
            .position(|candidate| *candidate == item)
            .unwrap_or_default();
        Self(index as u32)
    }

    /// Item this id refers to.
    pub fn item(&self) -> Option<TelemetryItem> {
        TelemetryItem::all().get(self.0 as usize).copied()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "req#{}", self.0)
    }
}

/// Request lifecycle of one tracked item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    /// Answer received (or freshly registered); a new request may be issued.
    Ready,
    /// A request is outstanding.
    Pending,
    /// A tick passed without an answer, or the source is disconnected.
    StillPending,
}

#[derive(Debug, Clone, Copy)]
struct TrackedRequest {
    item: TelemetryItem,
    state: RequestState,
}

/// Result of one polling pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollSummary {
    /// Requests issued this pass.
    pub issued: usize,
    /// Items whose previous request is still unanswered.
    pub still_pending: usize,
}

/// Tracks the outstanding request of every telemetry item.
#[derive(Debug, Clone)]
pub struct RequestTracker {
    requests: Vec<TrackedRequest>,
}

impl RequestTracker {
    /// Track the given items. Nothing is requested until [`on_connect`](Self::on_connect).
    pub fn new(items: &[TelemetryItem]) -> Self {
        Self {
            requests: items
                .iter()
                .map(|item| TrackedRequest {
                    item: *item,
                    state: RequestState::StillPending,
                })
                .collect(),
        }
    }

    /// Track every known item.
    pub fn with_all_items() -> Self {
        Self::new(TelemetryItem::all())
    }

    /// The source is connected and the data definitions are registered.
    pub fn on_connect(&mut self) {
        for request in &mut self.requests {
            request.state = RequestState::Ready;
        }
    }

    /// The source went away; everything waits for the next connection.
    pub fn on_disconnect(&mut self) {
        for request in &mut self.requests {
            request.state = RequestState::StillPending;
        }
    }

    /// Issue requests for all ready items and age the pending ones.
    pub fn poll_all(&mut self, source: &mut dyn TelemetrySource) -> PollSummary {
        let mut summary = PollSummary::default();

        for request in &mut self.requests {
            match request.state {
                RequestState::Ready => {
                    source.poll(RequestId::for_item(request.item));
                    request.state = RequestState::Pending;
                    summary.issued += 1;
                }
                RequestState::Pending | RequestState::StillPending => {
                    request.state = RequestState::StillPending;
                    summary.still_pending += 1;
                }
            }
        }

        if summary.still_pending > 0 {
            tracing::trace!(
                issued = summary.issued,
                still_pending = summary.still_pending,
                "Telemetry requests still pending"
            );
        }

        summary
    }

    /// An answer for `item` arrived.
    pub fn on_reading(&mut self, item: TelemetryItem) {
        if let Some(request) = self.requests.iter_mut().find(|r| r.item == item) {
            request.state = RequestState::Ready;
        }
    }

    /// Current state of `item`, if tracked.
    pub fn state(&self, item: TelemetryItem) -> Option<RequestState> {
        self.requests
            .iter()
            .find(|r| r.item == item)
            .map(|r| r.state)
    }

    /// Number of items still waiting for an answer.
    pub fn still_pending_count(&self) -> usize {
        self.requests
            .iter()
            .filter(|r| r.state == RequestState::StillPending)
            .count()
    }
}

impl Default for RequestTracker {
    fn default() -> Self {
        Self::with_all_items()
    }
}
