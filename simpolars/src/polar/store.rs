//! Smoothed polar accumulation.

use super::{FlapIndex, PolarMap, FLAP_SLOTS};
use crate::config::Settings;
use crate::performance::bucket_for;
use crate::MS_TO_KPH;

/// Default weight of the stored value when blending in a new capture.
pub const DEFAULT_SMOOTHING_ALPHA: f64 = 0.5;

/// Why a capture was not stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Airspeed outside the configured km/h range.
    AirspeedOutOfRange,
    /// Sink outside the configured display range.
    SinkOutOfRange,
}

/// Result of [`PolarStore::capture`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CaptureOutcome {
    /// The bucket now holds `value`; `blended` is false for a first capture.
    Stored {
        flap: FlapIndex,
        bucket: u32,
        value: f64,
        blended: bool,
    },
    /// Filtered out by the display range.
    Rejected(RejectReason),
}

/// One smoothed polar per flap setting.
///
/// A stored value only changes by blending with a new capture, by removal,
/// or by reset; nothing is pruned implicitly.
#[derive(Debug, Clone, PartialEq)]
pub struct PolarStore {
    slots: Vec<PolarMap>,
    alpha: f64,
}

impl PolarStore {
    /// Create an empty store blending with weight `alpha` (clamped to `[0, 1)`).
    pub fn new(alpha: f64) -> Self {
        Self {
            slots: vec![PolarMap::new(); FLAP_SLOTS],
            alpha: sanitize_alpha(alpha),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_SMOOTHING_ALPHA)
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn set_alpha(&mut self, alpha: f64) {
        self.alpha = sanitize_alpha(alpha);
    }

    /// Fold one observation into the polar of `flap`.
    ///
    /// Rejected when the airspeed (as km/h) or the displayed sink
    /// (`-sink_rate_ms`) falls outside the configured ranges. Otherwise the
    /// bucket becomes `α·existing + (1−α)·raw`, or `raw` when empty.
    pub fn capture(
        &mut self,
        flap: FlapIndex,
        airspeed_ms: f64,
        sink_rate_ms: f64,
        settings: &Settings,
    ) -> CaptureOutcome {
        let airspeed_kph = airspeed_ms * MS_TO_KPH;
        if !(settings.airspeed_min_kph..=settings.airspeed_max_kph).contains(&airspeed_kph) {
            tracing::debug!(flap = %flap, airspeed_kph, "Capture rejected: airspeed out of range");
            return CaptureOutcome::Rejected(RejectReason::AirspeedOutOfRange);
        }

        let display_sink = -sink_rate_ms;
        if !(settings.sink_min_ms..=settings.sink_max_ms).contains(&display_sink) {
            tracing::debug!(flap = %flap, display_sink, "Capture rejected: sink out of range");
            return CaptureOutcome::Rejected(RejectReason::SinkOutOfRange);
        }

        let bucket = bucket_for(airspeed_ms, settings.precision);
        let alpha = self.alpha;
        let slot = &mut self.slots[flap.get()];

        let (value, blended) = match slot.get(&bucket) {
            Some(existing) => (alpha * existing + (1.0 - alpha) * sink_rate_ms, true),
            None => (sink_rate_ms, false),
        };
        slot.insert(bucket, value);

        tracing::trace!(flap = %flap, bucket, value, blended, "Captured polar point");

        CaptureOutcome::Stored {
            flap,
            bucket,
            value,
            blended,
        }
    }

    /// Delete one bucket. Absent buckets are a no-op.
    pub fn remove_point(&mut self, flap: FlapIndex, bucket: u32) -> Option<f64> {
        self.slots[flap.get()].remove(&bucket)
    }

    /// Clear the polar of one flap setting.
    pub fn reset_flap(&mut self, flap: FlapIndex) {
        self.slots[flap.get()].clear();
        tracing::info!(flap = %flap, "Polar reset");
    }

    /// Clear every polar.
    pub fn reset_all(&mut self) {
        for slot in &mut self.slots {
            slot.clear();
        }
        tracing::info!("All polars reset");
    }

    /// Average several datasets bucket by bucket.
    ///
    /// Each bucket present in at least one dataset gets the mean over the
    /// datasets that contain it.
    pub fn merge_average(datasets: &[PolarMap]) -> PolarMap {
        let mut sums: std::collections::BTreeMap<u32, (f64, u32)> = Default::default();
        for dataset in datasets {
            for (bucket, value) in dataset {
                let entry = sums.entry(*bucket).or_insert((0.0, 0));
                entry.0 += value;
                entry.1 += 1;
            }
        }
        sums.into_iter()
            .map(|(bucket, (sum, count))| (bucket, sum / count as f64))
            .collect()
    }

    /// Replace the polar of `flap` with the average of `datasets`.
    ///
    /// Returns the number of buckets imported.
    pub fn import_average(&mut self, flap: FlapIndex, datasets: &[PolarMap]) -> usize {
        let merged = Self::merge_average(datasets);
        let count = merged.len();
        self.slots[flap.get()] = merged;
        tracing::info!(
            flap = %flap,
            datasets = datasets.len(),
            buckets = count,
            "Imported polar data"
        );
        count
    }

    /// Polar of one flap setting, ordered by bucket.
    pub fn flap(&self, flap: FlapIndex) -> &PolarMap {
        &self.slots[flap.get()]
    }

    /// Flap settings that hold data.
    pub fn non_empty(&self) -> impl Iterator<Item = (FlapIndex, &PolarMap)> {
        FlapIndex::all()
            .zip(self.slots.iter())
            .filter(|(_, map)| !map.is_empty())
    }

    /// Read-only copy of every non-empty polar for collaborators.
    pub fn snapshot(&self) -> Vec<(FlapIndex, PolarMap)> {
        self.non_empty()
            .map(|(flap, map)| (flap, map.clone()))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(|slot| slot.is_empty())
    }

    /// Number of stored buckets across all flap settings.
    pub fn total_points(&self) -> usize {
        self.slots.iter().map(|slot| slot.len()).sum()
    }
}

impl Default for PolarStore {
    fn default() -> Self {
        Self::with_defaults()
    }
}

fn sanitize_alpha(alpha: f64) -> f64 {
    if alpha.is_finite() {
        alpha.clamp(0.0, 0.999)
    } else {
        DEFAULT_SMOOTHING_ALPHA
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn flap(i: usize) -> FlapIndex {
        FlapIndex::new(i).unwrap()
    }

    fn wide_settings() -> Settings {
        Settings {
            airspeed_min_kph: 0.0,
            airspeed_max_kph: 400.0,
            sink_min_ms: -20.0,
            sink_max_ms: 20.0,
            ..Settings::default()
        }
    }

    #[test]
    fn test_first_capture_stores_raw() {
        let mut store = PolarStore::with_defaults();
        let outcome = store.capture(flap(0), 25.4, -0.8, &wide_settings());

        assert_eq!(
            outcome,
            CaptureOutcome::Stored {
                flap: flap(0),
                bucket: 25,
                value: -0.8,
                blended: false
            }
        );
        assert_eq!(store.flap(flap(0)).get(&25), Some(&-0.8));
    }

    #[test]
    fn test_second_capture_blends() {
        let mut store = PolarStore::with_defaults();
        let settings = wide_settings();
        store.capture(flap(1), 25.0, -1.0, &settings);
        let outcome = store.capture(flap(1), 25.5, -2.0, &settings);

        assert!(matches!(
            outcome,
            CaptureOutcome::Stored { blended: true, .. }
        ));
        assert!((store.flap(flap(1))[&25] - (-1.5)).abs() < 1e-12);
    }

    #[test]
    fn test_alpha_is_configurable() {
        let mut store = PolarStore::new(0.9);
        let settings = wide_settings();
        store.capture(flap(0), 30.0, -1.0, &settings);
        store.capture(flap(0), 30.0, -2.0, &settings);

        assert!((store.flap(flap(0))[&30] - (-1.1)).abs() < 1e-12);
    }

    #[test]
    fn test_alpha_is_sanitized() {
        assert_eq!(PolarStore::new(f64::NAN).alpha(), DEFAULT_SMOOTHING_ALPHA);
        assert_eq!(PolarStore::new(-1.0).alpha(), 0.0);
        assert!(PolarStore::new(5.0).alpha() < 1.0);
    }

    #[test]
    fn test_out_of_range_rejected() {
        let mut store = PolarStore::with_defaults();
        let settings = Settings::default(); // 40..200 kph, sink -1..5

        // 10 m/s = 36 kph, below range
        assert_eq!(
            store.capture(flap(0), 10.0, -1.0, &settings),
            CaptureOutcome::Rejected(RejectReason::AirspeedOutOfRange)
        );
        // 8 m/s displayed sink, above range
        assert_eq!(
            store.capture(flap(0), 25.0, -8.0, &settings),
            CaptureOutcome::Rejected(RejectReason::SinkOutOfRange)
        );
        // NaN never passes
        assert!(matches!(
            store.capture(flap(0), 25.0, f64::NAN, &settings),
            CaptureOutcome::Rejected(_)
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn test_bucket_uses_precision() {
        let mut store = PolarStore::with_defaults();
        let settings = Settings {
            precision: 2.0,
            ..wide_settings()
        };
        store.capture(flap(0), 25.9, -1.0, &settings);
        assert!(store.flap(flap(0)).contains_key(&12));
    }

    #[test]
    fn test_remove_then_capture_stores_raw() {
        let mut store = PolarStore::with_defaults();
        let settings = wide_settings();
        store.capture(flap(2), 30.0, -1.0, &settings);

        assert_eq!(store.remove_point(flap(2), 30), Some(-1.0));
        store.capture(flap(2), 30.0, -3.0, &settings);

        assert_eq!(store.flap(flap(2))[&30], -3.0);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut store = PolarStore::with_defaults();
        assert_eq!(store.remove_point(flap(3), 42), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_reset_flap_only_clears_one_slot() {
        let mut store = PolarStore::with_defaults();
        let settings = wide_settings();
        store.capture(flap(0), 30.0, -1.0, &settings);
        store.capture(flap(1), 30.0, -1.0, &settings);

        store.reset_flap(flap(0));

        assert!(store.flap(flap(0)).is_empty());
        assert_eq!(store.flap(flap(1)).len(), 1);
    }

    #[test]
    fn test_reset_all_is_idempotent() {
        let mut store = PolarStore::with_defaults();
        store.capture(flap(0), 30.0, -1.0, &wide_settings());

        store.reset_all();
        assert!(store.is_empty());
        store.reset_all();
        assert!(store.is_empty());
        assert_eq!(store.total_points(), 0);
    }

    #[test]
    fn test_merge_average() {
        let a: PolarMap = [(20, -1.0), (21, -2.0)].into_iter().collect();
        let b: PolarMap = [(21, -4.0), (22, -5.0)].into_iter().collect();

        let merged = PolarStore::merge_average(&[a, b]);

        assert_eq!(merged[&20], -1.0);
        assert_eq!(merged[&21], -3.0);
        assert_eq!(merged[&22], -5.0);
        assert_eq!(merged.len(), 3);
    }

    #[test]
    fn test_merge_average_of_nothing_is_empty() {
        assert!(PolarStore::merge_average(&[]).is_empty());
    }

    #[test]
    fn test_import_replaces_selected_slot() {
        let mut store = PolarStore::with_defaults();
        store.capture(flap(4), 30.0, -1.0, &wide_settings());

        let imported: PolarMap = [(40, -2.0)].into_iter().collect();
        let count = store.import_average(flap(4), &[imported]);

        assert_eq!(count, 1);
        assert!(!store.flap(flap(4)).contains_key(&30));
        assert_eq!(store.flap(flap(4))[&40], -2.0);
    }

    #[test]
    fn test_snapshot_only_lists_non_empty() {
        let mut store = PolarStore::with_defaults();
        store.capture(flap(7), 30.0, -1.0, &wide_settings());

        let snapshot = store.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].0, flap(7));
    }

    proptest! {
        /// Repeated captures of the same raw value approach it monotonically.
        #[test]
        fn prop_smoothing_converges_without_overshoot(
            start in -10.0f64..10.0,
            raw in -10.0f64..10.0,
            repeats in 1usize..40,
        ) {
            let mut store = PolarStore::with_defaults();
            let settings = wide_settings();
            store.capture(flap(0), 30.0, start, &settings);

            let mut distance = (start - raw).abs();
            for _ in 0..repeats {
                store.capture(flap(0), 30.0, raw, &settings);
                let value = store.flap(flap(0))[&30];
                let next = (value - raw).abs();
                prop_assert!(next <= distance + 1e-12);
                // never crosses over to the other side of raw
                prop_assert!((value - raw) * (start - raw) >= -1e-12);
                distance = next;
            }
        }
    }
}
