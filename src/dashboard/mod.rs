//! Dashboard module - Pipeline and reactive recomputation

mod binder;
mod pipeline;

pub use binder::{BinderState, ReactiveBinder};
pub use pipeline::{DashboardFigures, Pipeline, PipelineSettings};
