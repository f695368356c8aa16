//! Current/previous sample pair.

use super::sample::TelemetrySample;

/// Holds the two most recent samples and nothing older.
///
/// Derivations need exactly one pair, so the buffer is a pair of owned
/// slots passed from tick to tick rather than a history.
#[derive(Debug, Clone, Default)]
pub struct SampleBuffer {
    previous: Option<TelemetrySample>,
    current: Option<TelemetrySample>,
}

impl SampleBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a new sample, shifting the current one into the previous slot.
    pub fn push(&mut self, sample: TelemetrySample) {
        self.previous = self.current.replace(sample);
    }

    pub fn current(&self) -> Option<&TelemetrySample> {
        self.current.as_ref()
    }

    pub fn previous(&self) -> Option<&TelemetrySample> {
        self.previous.as_ref()
    }

    /// Both samples, oldest first.
    pub fn pair(&self) -> Option<(&TelemetrySample, &TelemetrySample)> {
        Some((self.previous.as_ref()?, self.current.as_ref()?))
    }

    /// Seconds between the previous and current sample.
    ///
    /// `None` until two samples exist or when the clock did not advance.
    pub fn elapsed_s(&self) -> Option<f64> {
        let (previous, current) = self.pair()?;
        let elapsed = current.timestamp_s - previous.timestamp_s;
        (elapsed.is_finite() && elapsed > 0.0).then_some(elapsed)
    }

    /// Drop both samples.
    pub fn clear(&mut self) {
        self.previous = None;
        self.current = None;
    }
}
