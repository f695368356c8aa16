//! Telemetry intake: samples, the current/previous pair, and request pacing.
//!
//! The simulator transport is external. It answers fire-and-forget requests
//! issued through [`TelemetrySource`] by delivering [`TelemetryReading`]s,
//! either by direct calls into the session or through the channel pair from
//! [`channel()`].
//!
//! # Architecture
//!
//! ```text
//! RequestTracker ──poll──► TelemetrySource (external)
//!                                 │
//!        TelemetryReading ◄───────┘
//!               │
//!               ▼
//!        TelemetrySample (assembled) ──tick──► SampleBuffer (previous, current)
//! ```

mod buffer;
mod channel;
mod request;
mod sample;

pub use buffer::SampleBuffer;
pub use channel::{channel, TelemetryFeed, TelemetrySender};
pub use request::{PollSummary, RequestId, RequestState, RequestTracker};
pub use sample::{TelemetryItem, TelemetryReading, TelemetrySample};

/// Fire-and-forget request interface of the simulator transport.
///
/// Implementations must not block. The answer arrives later as a
/// [`TelemetryReading`] for the item identified by the request.
pub trait TelemetrySource {
    /// Request the next value for the tracked item behind `request`.
    fn poll(&mut self, request: RequestId);
}
