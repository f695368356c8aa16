//! Derivation of a performance sample from a telemetry pair.

use super::{SpeedMeasurement, GLIDE_SINK_THRESHOLD, NO_GLIDE, STANDARD_GRAVITY};
use crate::config::Settings;
use crate::telemetry::TelemetrySample;

/// Performance derived from one pair of samples.
///
/// Transient: computed every valid tick and folded into the polar store.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerformanceSample {
    /// Airspeed the polar is keyed by (true or indicated, m/s).
    pub airspeed_ms: f64,
    /// Altitude rate over the interval (m/s, negative down).
    pub vertical_speed_ms: f64,
    /// Kinetic energy change expressed as climb rate (m/s).
    pub te_compensation_ms: f64,
    /// Compensated sink rate (m/s, negative down).
    pub sink_rate_ms: f64,
    /// Airspeed over sink, or [`NO_GLIDE`].
    pub glide_ratio: f64,
    /// Airspeed bucket for the estimator's precision.
    pub airspeed_bucket: u32,
}

/// Pure derivation of sink rate and glide ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerformanceEstimator {
    measurement: SpeedMeasurement,
    precision: f64,
}

impl PerformanceEstimator {
    pub fn new(measurement: SpeedMeasurement, precision: f64) -> Self {
        Self {
            measurement,
            precision,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.speed_measurement, settings.precision)
    }

    pub fn measurement(&self) -> SpeedMeasurement {
        self.measurement
    }

    /// Derive performance from `previous` → `current` over `elapsed_s`.
    ///
    /// Returns `None` when the pair is not usable: a missing or zero
    /// altitude/true airspeed in either sample, identical airspeeds (a frozen
    /// feed repeating frames), a non-positive interval, or a missing
    /// indicated airspeed in indicated mode.
    pub fn estimate(
        &self,
        previous: &TelemetrySample,
        current: &TelemetrySample,
        elapsed_s: f64,
    ) -> Option<PerformanceSample> {
        if !(elapsed_s.is_finite() && elapsed_s > 0.0) {
            return None;
        }

        let altitude_prev = previous.altitude_m.filter(|v| *v != 0.0)?;
        let altitude = current.altitude_m.filter(|v| *v != 0.0)?;
        let tas_prev = previous.airspeed_true_ms.filter(|v| *v != 0.0)?;
        let tas = current.airspeed_true_ms.filter(|v| *v != 0.0)?;

        if tas == tas_prev {
            return None;
        }

        let vertical_speed = (altitude - altitude_prev) / elapsed_s;
        let te_compensation = (tas * tas - tas_prev * tas_prev) / (2.0 * elapsed_s * STANDARD_GRAVITY);
        let mut sink_rate = vertical_speed + te_compensation;

        let airspeed = match self.measurement {
            SpeedMeasurement::True => tas,
            SpeedMeasurement::Indicated => {
                let ias = current.airspeed_indicated_ms?;
                sink_rate *= ias / tas;
                ias
            }
        };

        let glide_ratio = if sink_rate < GLIDE_SINK_THRESHOLD {
            airspeed / -sink_rate
        } else {
            NO_GLIDE
        };

        Some(PerformanceSample {
            airspeed_ms: airspeed,
            vertical_speed_ms: vertical_speed,
            te_compensation_ms: te_compensation,
            sink_rate_ms: sink_rate,
            glide_ratio,
            airspeed_bucket: bucket_for(airspeed, self.precision),
        })
    }
}

/// Quantize an airspeed (m/s) into its bucket: `floor(airspeed / precision)`.
///
/// Negative and non-finite inputs land in bucket 0.
pub fn bucket_for(airspeed_ms: f64, precision: f64) -> u32 {
    let bucket = (airspeed_ms / precision).floor();
    if bucket.is_finite() && bucket > 0.0 {
        bucket.min(u32::MAX as f64) as u32
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::TelemetryItem;

    fn sample(t: f64, altitude: f64, tas: f64) -> TelemetrySample {
        TelemetrySample::new(t)
            .with(TelemetryItem::Altitude, altitude)
            .with(TelemetryItem::AirspeedTrue, tas)
    }

    fn estimator() -> PerformanceEstimator {
        PerformanceEstimator::new(SpeedMeasurement::True, 1.0)
    }

    #[test]
    fn test_worked_example() {
        let previous = sample(0.0, 1000.0, 50.0);
        let current = sample(0.3, 990.0, 51.0);

        let perf = estimator().estimate(&previous, &current, 0.3).unwrap();

        assert!((perf.vertical_speed_ms - (-33.333)).abs() < 0.001);
        assert!((perf.te_compensation_ms - 17.165).abs() < 0.001);
        assert!((perf.sink_rate_ms - (-16.168)).abs() < 0.001);
        assert_eq!(
            perf.sink_rate_ms,
            perf.vertical_speed_ms + perf.te_compensation_ms
        );
        assert_eq!(perf.airspeed_bucket, 51);
    }

    #[test]
    fn test_glide_ratio() {
        // Steady 1 m/s descent at 30 m/s, tiny speed change
        let previous = sample(0.0, 1000.0, 30.0);
        let current = sample(1.0, 999.0, 30.0001);

        let perf = estimator().estimate(&previous, &current, 1.0).unwrap();

        assert!((perf.glide_ratio - 30.0).abs() < 0.05);
    }

    #[test]
    fn test_no_glide_when_climbing() {
        let previous = sample(0.0, 1000.0, 30.0);
        let current = sample(1.0, 1002.0, 30.1);

        let perf = estimator().estimate(&previous, &current, 1.0).unwrap();

        assert!(perf.sink_rate_ms > 0.0);
        assert_eq!(perf.glide_ratio, NO_GLIDE);
    }

    #[test]
    fn test_no_glide_at_threshold() {
        // roughly 0.05 m/s of sink is not a meaningful glide
        let previous = sample(0.0, 1000.0, 30.0);
        let current = sample(1.0, 999.95, 30.0000001);

        let perf = estimator().estimate(&previous, &current, 1.0).unwrap();
        assert_eq!(perf.glide_ratio, NO_GLIDE);
    }

    #[test]
    fn test_identical_airspeeds_rejected() {
        let previous = sample(0.0, 1000.0, 30.0);
        let current = sample(1.0, 999.0, 30.0);
        assert!(estimator().estimate(&previous, &current, 1.0).is_none());
    }

    #[test]
    fn test_missing_or_zero_fields_rejected() {
        let good = sample(0.0, 1000.0, 30.0);
        let zero_altitude = sample(1.0, 0.0, 31.0);
        let missing_speed = TelemetrySample::new(1.0).with(TelemetryItem::Altitude, 999.0);

        assert!(estimator().estimate(&good, &zero_altitude, 1.0).is_none());
        assert!(estimator().estimate(&good, &missing_speed, 1.0).is_none());
        assert!(estimator().estimate(&missing_speed, &good, 1.0).is_none());
    }

    #[test]
    fn test_non_positive_interval_rejected() {
        let previous = sample(0.0, 1000.0, 30.0);
        let current = sample(1.0, 999.0, 31.0);
        assert!(estimator().estimate(&previous, &current, 0.0).is_none());
        assert!(estimator().estimate(&previous, &current, -0.1).is_none());
        assert!(estimator()
            .estimate(&previous, &current, f64::NAN)
            .is_none());
    }

    #[test]
    fn test_indicated_mode_scales_sink() {
        let previous = sample(0.0, 1000.0, 30.0).with(TelemetryItem::AirspeedIndicated, 27.0);
        let current = sample(1.0, 999.0, 30.0001).with(TelemetryItem::AirspeedIndicated, 27.0);

        let true_perf = estimator().estimate(&previous, &current, 1.0).unwrap();
        let ias_perf = PerformanceEstimator::new(SpeedMeasurement::Indicated, 1.0)
            .estimate(&previous, &current, 1.0)
            .unwrap();

        let ratio = 27.0 / 30.0001;
        assert!((ias_perf.sink_rate_ms - true_perf.sink_rate_ms * ratio).abs() < 1e-9);
        assert_eq!(ias_perf.airspeed_ms, 27.0);
        assert_eq!(ias_perf.airspeed_bucket, 27);
    }

    #[test]
    fn test_indicated_mode_requires_ias() {
        let previous = sample(0.0, 1000.0, 30.0);
        let current = sample(1.0, 999.0, 31.0);
        let estimator = PerformanceEstimator::new(SpeedMeasurement::Indicated, 1.0);
        assert!(estimator.estimate(&previous, &current, 1.0).is_none());
    }

    #[test]
    fn test_bucket_for() {
        assert_eq!(bucket_for(51.9, 1.0), 51);
        assert_eq!(bucket_for(51.9, 2.0), 25);
        assert_eq!(bucket_for(51.9, 0.5), 103);
        assert_eq!(bucket_for(-4.0, 1.0), 0);
        assert_eq!(bucket_for(f64::NAN, 1.0), 0);
    }
}
