//! Normalized graph space for polar plots.
//!
//! `x` runs from the minimum to the maximum airspeed (km/h), `y` from the
//! minimum to the maximum displayed sink (m/s, positive down), so sink grows
//! towards `y = 1`. Mapping to pixels is left to the [`Renderer`].

use super::{CurveFitter, CurvePoint};
use crate::config::Settings;
use crate::polar::{bucket_airspeed_ms, FlapIndex, PolarMap, PolarStore};
use crate::MS_TO_KPH;

/// 8-bit colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl std::fmt::Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

/// Colour of a flap setting's series. Channels wrap modulo 256.
pub fn flap_color(flap: FlapIndex) -> Rgb {
    let i = flap.get() as i32 + 1;
    let channel = |v: i32| (255 - v * 127) as u8;
    Rgb(channel(i % 4), channel((i + 1) % 3), channel((i + 2) % 3))
}

/// Legend text for a flap setting at the given aircraft weight.
pub fn legend_label(flap: FlapIndex, weight_kg: Option<f64>) -> String {
    match weight_kg {
        Some(w) if w.is_finite() => format!("Flaps position #{} {} kg", flap.get(), w.trunc() as i64),
        _ => format!("Flaps position #{}", flap.get()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Constant airspeed.
    Vertical,
    /// Constant sink.
    Horizontal,
}

/// Background grid line at a normalized position.
#[derive(Debug, Clone, PartialEq)]
pub struct GridLine {
    pub orientation: Orientation,
    pub position: f64,
    pub label: String,
}

/// Everything drawn for one flap setting.
#[derive(Debug, Clone, PartialEq)]
pub struct FlapSeries {
    pub flap: FlapIndex,
    pub color: Rgb,
    pub label: String,
    /// Empty when points are hidden.
    pub raw_points: Vec<CurvePoint>,
    /// `None` when the curve is disabled.
    pub curve: Option<Vec<CurvePoint>>,
}

/// A complete set of drawing instructions.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RenderFrame {
    pub grid: Vec<GridLine>,
    pub series: Vec<FlapSeries>,
}

/// Drawing collaborator.
pub trait Renderer {
    fn draw_curve(&mut self, flap: FlapIndex, points: &[CurvePoint]);

    fn draw_raw_points(&mut self, flap: FlapIndex, points: &[CurvePoint]);

    fn draw_grid(&mut self, _lines: &[GridLine]) {}

    fn draw_legend(&mut self, _flap: FlapIndex, _color: Rgb, _label: &str) {}
}

/// Replay a frame into a renderer.
pub fn render_frame(frame: &RenderFrame, renderer: &mut dyn Renderer) {
    renderer.draw_grid(&frame.grid);
    for series in &frame.series {
        renderer.draw_legend(series.flap, series.color, &series.label);
        if !series.raw_points.is_empty() {
            renderer.draw_raw_points(series.flap, &series.raw_points);
        }
        if let Some(curve) = &series.curve {
            renderer.draw_curve(series.flap, curve);
        }
    }
}

/// Display ranges taken from the settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraphSpace {
    pub airspeed_min_kph: f64,
    pub airspeed_max_kph: f64,
    pub sink_min_ms: f64,
    pub sink_max_ms: f64,
    pub precision: f64,
}

impl GraphSpace {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            airspeed_min_kph: settings.airspeed_min_kph,
            airspeed_max_kph: settings.airspeed_max_kph,
            sink_min_ms: settings.sink_min_ms,
            sink_max_ms: settings.sink_max_ms,
            precision: settings.precision,
        }
    }

    pub fn contains(&self, airspeed_kph: f64, sink_ms: f64) -> bool {
        (self.airspeed_min_kph..=self.airspeed_max_kph).contains(&airspeed_kph)
            && (self.sink_min_ms..=self.sink_max_ms).contains(&sink_ms)
    }

    /// Map `(km/h, displayed sink)` into `[0, 1]²`, or `None` outside the ranges.
    pub fn normalize(&self, airspeed_kph: f64, sink_ms: f64) -> Option<CurvePoint> {
        if !self.contains(airspeed_kph, sink_ms) {
            return None;
        }
        Some(CurvePoint {
            x: (airspeed_kph - self.airspeed_min_kph) / (self.airspeed_max_kph - self.airspeed_min_kph),
            y: (sink_ms - self.sink_min_ms) / (self.sink_max_ms - self.sink_min_ms),
        })
    }

    /// Grid lines every 10 km/h and every 1 m/s.
    pub fn grid(&self) -> Vec<GridLine> {
        let mut lines = Vec::new();

        let mut kph = (self.airspeed_min_kph / 10.0).ceil() * 10.0;
        while kph <= self.airspeed_max_kph {
            if let Some(p) = self.normalize(kph, self.sink_min_ms) {
                lines.push(GridLine {
                    orientation: Orientation::Vertical,
                    position: p.x,
                    label: format!("{kph}"),
                });
            }
            kph += 10.0;
        }

        let mut sink = self.sink_min_ms.ceil();
        while sink <= self.sink_max_ms {
            if let Some(p) = self.normalize(self.airspeed_min_kph, sink) {
                lines.push(GridLine {
                    orientation: Orientation::Horizontal,
                    position: p.y,
                    label: format!("{sink}"),
                });
            }
            sink += 1.0;
        }

        lines
    }

    /// In-range points of one polar, in bucket order.
    pub fn polar_points(&self, map: &PolarMap) -> Vec<CurvePoint> {
        map.iter()
            .filter_map(|(bucket, sink_rate)| {
                let kph = bucket_airspeed_ms(*bucket, self.precision) * MS_TO_KPH;
                self.normalize(kph, -sink_rate)
            })
            .collect()
    }

    /// Build the drawing instructions for every non-empty polar.
    pub fn frame(&self, store: &PolarStore, settings: &Settings, weight_kg: Option<f64>) -> RenderFrame {
        let fitter = CurveFitter::new(settings.curve_resolution);
        let series = store
            .non_empty()
            .map(|(flap, map)| {
                let points = self.polar_points(map);
                let curve = settings.show_curve.then(|| fitter.fit(&points));
                FlapSeries {
                    flap,
                    color: flap_color(flap),
                    label: legend_label(flap, weight_kg),
                    raw_points: if settings.hide_points { Vec::new() } else { points },
                    curve,
                }
            })
            .collect();

        RenderFrame {
            grid: self.grid(),
            series,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flap(i: usize) -> FlapIndex {
        FlapIndex::new(i).unwrap()
    }

    #[derive(Default)]
    struct RecordingRenderer {
        calls: Vec<String>,
    }

    impl Renderer for RecordingRenderer {
        fn draw_curve(&mut self, flap: FlapIndex, points: &[CurvePoint]) {
            self.calls.push(format!("curve {} {}", flap, points.len()));
        }

        fn draw_raw_points(&mut self, flap: FlapIndex, points: &[CurvePoint]) {
            self.calls.push(format!("points {} {}", flap, points.len()));
        }

        fn draw_legend(&mut self, _flap: FlapIndex, _color: Rgb, label: &str) {
            self.calls.push(label.to_string());
        }
    }

    #[test]
    fn test_flap_colors() {
        // flap 0 → i = 1: 255−127, 255−254, 255−0
        assert_eq!(flap_color(flap(0)), Rgb(128, 1, 255));
        // flap 2 → i = 3: 255−381 wraps to 130
        assert_eq!(flap_color(flap(2)), Rgb(130, 128, 1));
        assert_eq!(flap_color(flap(0)).to_string(), "#8001ff");
    }

    #[test]
    fn test_legend_label() {
        assert_eq!(legend_label(flap(1), Some(512.9)), "Flaps position #1 512 kg");
        assert_eq!(legend_label(flap(1), None), "Flaps position #1");
    }

    #[test]
    fn test_normalize() {
        let space = GraphSpace::from_settings(&Settings::default()); // 40..200, −1..5
        let p = space.normalize(120.0, 2.0).unwrap();
        assert!((p.x - 0.5).abs() < 1e-12);
        assert!((p.y - 0.5).abs() < 1e-12);

        assert!(space.normalize(30.0, 1.0).is_none());
        assert!(space.normalize(100.0, 6.0).is_none());
    }

    #[test]
    fn test_grid_lines() {
        let space = GraphSpace::from_settings(&Settings {
            airspeed_min_kph: 45.0,
            airspeed_max_kph: 80.0,
            ..Settings::default()
        });
        let grid = space.grid();

        let vertical: Vec<_> = grid
            .iter()
            .filter(|l| l.orientation == Orientation::Vertical)
            .map(|l| l.label.as_str())
            .collect();
        assert_eq!(vertical, vec!["50", "60", "70", "80"]);

        let horizontal = grid
            .iter()
            .filter(|l| l.orientation == Orientation::Horizontal)
            .count();
        // −1 through 5
        assert_eq!(horizontal, 7);
        assert_eq!(grid.last().unwrap().position, 1.0);
    }

    #[test]
    fn test_polar_points_skip_out_of_range() {
        let space = GraphSpace::from_settings(&Settings::default());
        // 5 m/s = 18 km/h is below the range
        let map: PolarMap = [(5, -1.0), (25, -1.0), (30, -9.0)].into_iter().collect();
        let points = space.polar_points(&map);

        assert_eq!(points.len(), 1);
        assert!((points[0].x - (90.0 - 40.0) / 160.0).abs() < 1e-12);
    }

    #[test]
    fn test_frame_honours_toggles() {
        let mut settings = Settings {
            curve_resolution: 8,
            ..Settings::default()
        };
        let mut store = PolarStore::with_defaults();
        store.capture(flap(1), 20.0, -0.8, &settings);
        store.capture(flap(1), 25.0, -1.0, &settings);

        let space = GraphSpace::from_settings(&settings);
        let frame = space.frame(&store, &settings, Some(600.0));
        assert_eq!(frame.series.len(), 1);
        let series = &frame.series[0];
        assert_eq!(series.raw_points.len(), 2);
        assert_eq!(series.curve.as_ref().map(Vec::len), Some(9));
        assert_eq!(series.label, "Flaps position #1 600 kg");

        settings.hide_points = true;
        settings.show_curve = false;
        let frame = space.frame(&store, &settings, None);
        assert!(frame.series[0].raw_points.is_empty());
        assert!(frame.series[0].curve.is_none());
    }

    #[test]
    fn test_render_frame_order() {
        let settings = Settings {
            curve_resolution: 4,
            ..Settings::default()
        };
        let mut store = PolarStore::with_defaults();
        store.capture(flap(0), 25.0, -1.0, &settings);

        let frame = GraphSpace::from_settings(&settings).frame(&store, &settings, None);
        let mut renderer = RecordingRenderer::default();
        render_frame(&frame, &mut renderer);

        assert_eq!(
            renderer.calls,
            vec!["Flaps position #0", "points #0 1", "curve #0 5"]
        );
    }
}
