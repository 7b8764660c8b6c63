//! Stats module - Numeric reductions and graph layout

mod calculator;
mod network;

pub use calculator::{SeverityHeatmap, StatsCalculator};
pub use network::{LayoutSettings, NetworkBuilder, NetworkEdge, NetworkGraph, NetworkNode, NodeKind};
