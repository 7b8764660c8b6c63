//! Declarative chart descriptions.
//!
//! A `ChartSpec` carries everything a presenter needs: kind, axis titles,
//! color encoding and the already-aggregated values. Both the interactive
//! plotter and the PNG renderer draw from it without further computation.

use chrono::NaiveDate;
use serde::Serialize;

/// An sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

pub const SELECTED_COLOR: Rgb = Rgb(231, 76, 60); // Red
pub const OTHER_COLOR: Rgb = Rgb(52, 152, 219); // Blue
pub const LINE_COLOR: Rgb = Rgb(52, 152, 219);
pub const EDGE_COLOR: Rgb = Rgb(136, 136, 136);

/// Color palette for categorical series
pub const PALETTE: [Rgb; 10] = [
    Rgb(231, 76, 60),  // Red
    Rgb(46, 204, 113), // Green
    Rgb(155, 89, 182), // Purple
    Rgb(243, 156, 18), // Orange
    Rgb(26, 188, 156), // Teal
    Rgb(233, 30, 99),  // Pink
    Rgb(0, 188, 212),  // Cyan
    Rgb(255, 87, 34),  // Deep Orange
    Rgb(121, 85, 72),  // Brown
    Rgb(96, 125, 139), // Blue Grey
];

/// Sequential color scales (ColorBrewer, 9 classes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColorScale {
    YlOrRd,
    YlGnBu,
}

const YL_OR_RD: [Rgb; 9] = [
    Rgb(255, 255, 204),
    Rgb(255, 237, 160),
    Rgb(254, 217, 118),
    Rgb(254, 178, 76),
    Rgb(253, 141, 60),
    Rgb(252, 78, 42),
    Rgb(227, 26, 28),
    Rgb(189, 0, 38),
    Rgb(128, 0, 38),
];

const YL_GN_BU: [Rgb; 9] = [
    Rgb(255, 255, 217),
    Rgb(237, 248, 177),
    Rgb(199, 233, 180),
    Rgb(127, 205, 187),
    Rgb(65, 182, 196),
    Rgb(29, 145, 192),
    Rgb(34, 94, 168),
    Rgb(37, 52, 148),
    Rgb(8, 29, 88),
];

impl ColorScale {
    fn stops(&self) -> &'static [Rgb] {
        match self {
            ColorScale::YlOrRd => &YL_OR_RD,
            ColorScale::YlGnBu => &YL_GN_BU,
        }
    }

    /// Linearly interpolated color at `t` in [0, 1]; out-of-range and NaN clamp.
    pub fn sample(&self, t: f64) -> Rgb {
        let stops = self.stops();
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };

        let scaled = t * (stops.len() - 1) as f64;
        let lower = scaled.floor() as usize;
        let upper = (lower + 1).min(stops.len() - 1);
        let frac = scaled - lower as f64;

        let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * frac).round() as u8;
        let (a, b) = (stops[lower], stops[upper]);
        Rgb(lerp(a.0, b.0), lerp(a.1, b.1), lerp(a.2, b.2))
    }
}

/// The seven dashboard charts, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartId {
    SeverityHeatmap,
    MonthlyHistogram,
    DailyFatalities,
    CountryWeapon,
    TimeSeries,
    Network,
    Treemap,
}

impl ChartId {
    pub const ALL: [ChartId; 7] = [
        ChartId::SeverityHeatmap,
        ChartId::MonthlyHistogram,
        ChartId::DailyFatalities,
        ChartId::CountryWeapon,
        ChartId::TimeSeries,
        ChartId::Network,
        ChartId::Treemap,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            ChartId::SeverityHeatmap => "severity_heatmap",
            ChartId::MonthlyHistogram => "monthly_histogram",
            ChartId::DailyFatalities => "daily_fatalities",
            ChartId::CountryWeapon => "country_weapon",
            ChartId::TimeSeries => "time_series",
            ChartId::Network => "network",
            ChartId::Treemap => "treemap",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChartKind {
    Histogram,
    Bar,
    Line,
    Network,
    Treemap,
    Heatmap,
}

/// One colored series of a stacked bar chart, aligned with its categories.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarSeries {
    pub name: String,
    pub color: Rgb,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinePoint {
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphNode {
    pub label: String,
    pub position: [f64; 2],
    pub degree: usize,
    pub color: Rgb,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphEdge {
    pub from: [f64; 2],
    pub to: [f64; 2],
    pub weight: u32,
}

/// A treemap rectangle in unit coordinates, `[x0, y0, x1, y1]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreemapTile {
    pub id: String,
    pub label: String,
    pub parent: Option<String>,
    pub value: f64,
    pub rect: [f64; 4],
    pub color: Rgb,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartBody {
    /// Stacked bars over numeric bins.
    Histogram {
        bins: Vec<u32>,
        series: Vec<BarSeries>,
    },
    /// Stacked bars over named categories.
    Bar {
        categories: Vec<String>,
        series: Vec<BarSeries>,
    },
    Line {
        points: Vec<LinePoint>,
        color: Rgb,
    },
    Network {
        nodes: Vec<GraphNode>,
        edges: Vec<GraphEdge>,
        color_scale: ColorScale,
    },
    /// Parents are listed before their children.
    Treemap { tiles: Vec<TreemapTile> },
    Heatmap {
        columns: Vec<String>,
        rows: Vec<String>,
        /// `values[row][column]`
        values: Vec<Vec<f64>>,
        color_scale: ColorScale,
        footnote: String,
    },
}

impl ChartBody {
    pub fn kind(&self) -> ChartKind {
        match self {
            ChartBody::Histogram { .. } => ChartKind::Histogram,
            ChartBody::Bar { .. } => ChartKind::Bar,
            ChartBody::Line { .. } => ChartKind::Line,
            ChartBody::Network { .. } => ChartKind::Network,
            ChartBody::Treemap { .. } => ChartKind::Treemap,
            ChartBody::Heatmap { .. } => ChartKind::Heatmap,
        }
    }

    /// True when there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        match self {
            ChartBody::Histogram { series, .. } | ChartBody::Bar { series, .. } => {
                series.iter().all(|s| s.values.is_empty())
            }
            ChartBody::Line { points, .. } => points.is_empty(),
            ChartBody::Network { nodes, .. } => nodes.is_empty(),
            ChartBody::Treemap { tiles } => tiles.is_empty(),
            ChartBody::Heatmap { rows, columns, .. } => rows.is_empty() || columns.is_empty(),
        }
    }

    /// Every numeric measure carried by the chart.
    pub fn measures(&self) -> Vec<f64> {
        match self {
            ChartBody::Histogram { series, .. } | ChartBody::Bar { series, .. } => series
                .iter()
                .flat_map(|s| s.values.iter().copied())
                .collect(),
            ChartBody::Line { points, .. } => points.iter().map(|p| p.value).collect(),
            ChartBody::Network { nodes, edges, .. } => nodes
                .iter()
                .flat_map(|n| n.position)
                .chain(edges.iter().flat_map(|e| e.from.into_iter().chain(e.to)))
                .collect(),
            ChartBody::Treemap { tiles } => tiles
                .iter()
                .flat_map(|t| std::iter::once(t.value).chain(t.rect))
                .collect(),
            ChartBody::Heatmap { values, .. } => values.iter().flatten().copied().collect(),
        }
    }
}

/// A complete chart description.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub id: ChartId,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub body: ChartBody,
}

impl ChartSpec {
    pub fn kind(&self) -> ChartKind {
        self.body.kind()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}
