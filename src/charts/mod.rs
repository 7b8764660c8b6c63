//! Charts module - Chart descriptions, interactive plotting and static rendering

mod builder;
mod plotter;
mod renderer;
mod spec;

pub use builder::{ChartBuilder, HEATMAP_FOOTNOTE};
pub use plotter::{color32, ChartPlotter, PLOT_HEIGHT};
pub use renderer::{ChartRenderer, RenderError};
pub use spec::{
    BarSeries, ChartBody, ChartId, ChartKind, ChartSpec, ColorScale, GraphEdge, GraphNode,
    LinePoint, Rgb, TreemapTile, PALETTE,
};
