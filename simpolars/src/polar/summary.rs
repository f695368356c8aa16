//! Best glide and minimum sink of a captured polar.

use super::{bucket_airspeed_ms, FlapIndex, PolarMap};
use crate::performance::GLIDE_SINK_THRESHOLD;
use crate::MS_TO_KPH;

/// Headline figures for one captured polar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolarSummary {
    pub flap: FlapIndex,
    pub points: usize,
    /// `(airspeed_kph, sink_ms)` of the bucket with the least sink.
    pub min_sink: Option<(f64, f64)>,
    /// `(airspeed_kph, glide_ratio)` of the flattest bucket.
    pub best_glide: Option<(f64, f64)>,
}

impl PolarSummary {
    pub fn from_map(flap: FlapIndex, map: &PolarMap, precision: f64) -> Self {
        let descending = map
            .iter()
            .filter(|(_, sink)| **sink < GLIDE_SINK_THRESHOLD)
            .map(|(bucket, sink)| (bucket_airspeed_ms(*bucket, precision), *sink));

        let mut min_sink: Option<(f64, f64)> = None;
        let mut best_glide: Option<(f64, f64)> = None;

        for (airspeed_ms, sink) in descending {
            let kph = airspeed_ms * MS_TO_KPH;
            if min_sink.map_or(true, |(_, best)| sink > best) {
                min_sink = Some((kph, sink));
            }
            let glide = airspeed_ms / -sink;
            if best_glide.map_or(true, |(_, best)| glide > best) {
                best_glide = Some((kph, glide));
            }
        }

        Self {
            flap,
            points: map.len(),
            min_sink,
            best_glide,
        }
    }
}

impl std::fmt::Display for PolarSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "flaps {}: {} points", self.flap, self.points)?;
        if let Some((kph, glide)) = self.best_glide {
            write!(f, ", best glide {glide:.1} at {kph:.0} km/h")?;
        }
        if let Some((kph, sink)) = self.min_sink {
            write!(f, ", min sink {:.2} m/s at {kph:.0} km/h", -sink)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_of_simple_polar() {
        let map: PolarMap = [(20, -0.7), (25, -0.8), (30, -1.2), (40, -2.5)]
            .into_iter()
            .collect();
        let summary = PolarSummary::from_map(FlapIndex::default(), &map, 1.0);

        assert_eq!(summary.points, 4);
        let (sink_kph, sink) = summary.min_sink.unwrap();
        assert_eq!(sink, -0.7);
        assert!((sink_kph - 72.0).abs() < 1e-9);

        let (glide_kph, glide) = summary.best_glide.unwrap();
        assert!((glide - 31.25).abs() < 1e-9);
        assert!((glide_kph - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_summary_ignores_climb() {
        let map: PolarMap = [(20, 0.5), (25, -0.05)].into_iter().collect();
        let summary = PolarSummary::from_map(FlapIndex::default(), &map, 1.0);

        assert_eq!(summary.points, 2);
        assert!(summary.min_sink.is_none());
        assert!(summary.best_glide.is_none());
    }

    #[test]
    fn test_display() {
        let map: PolarMap = [(25, -1.0)].into_iter().collect();
        let text = PolarSummary::from_map(FlapIndex::new(2).unwrap(), &map, 1.0).to_string();
        assert!(text.starts_with("flaps #2: 1 points"));
        assert!(text.contains("best glide 25.0 at 90 km/h"));
    }
}
