//! Curve fitting and graph-space rendering instructions.
//!
//! [`CurveFitter`] evaluates one Bézier curve whose control points are the
//! captured polar points. [`GraphSpace`] maps captured data into the
//! normalized `[0, 1] × [0, 1]` plane handed to a [`Renderer`].

mod bezier;
mod graph;

pub use bezier::{CurveFitter, CurvePoint, DEFAULT_RESOLUTION, MAX_RESOLUTION};
pub use graph::{
    flap_color, legend_label, render_frame, FlapSeries, GraphSpace, GridLine, Orientation,
    RenderFrame, Renderer, Rgb,
};
