//! Dashboard pipeline: selection in, all seven charts out.

use crate::charts::{ChartBuilder, ChartId, ChartSpec};
use crate::data::{DataProcessor, IncidentTable, Selection};
use crate::stats::{LayoutSettings, NetworkBuilder, StatsCalculator};
use rayon::prelude::*;
use serde::Serialize;
use std::time::Instant;
use tracing::debug;

/// Knobs of the aggregations that are not part of the selection.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSettings {
    pub rolling_window: usize,
    pub layout: LayoutSettings,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            rolling_window: 7,
            layout: LayoutSettings::default(),
        }
    }
}

/// One complete dashboard update.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardFigures {
    pub selection: Selection,
    /// One chart per `ChartId`, in `ChartId::ALL` order.
    pub charts: Vec<ChartSpec>,
}

impl DashboardFigures {
    pub fn chart(&self, id: ChartId) -> Option<&ChartSpec> {
        self.charts.iter().find(|c| c.id == id)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

pub struct Pipeline;

impl Pipeline {
    /// Recompute every chart from scratch for `selection`.
    pub fn compute(
        table: &IncidentTable,
        selection: &Selection,
        settings: &PipelineSettings,
    ) -> DashboardFigures {
        let started = Instant::now();

        let charts: Vec<ChartSpec> = ChartId::ALL
            .par_iter()
            .map(|id| Self::chart(*id, table, selection, settings))
            .collect();

        debug!(
            region = %selection.region,
            month = selection.month,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "dashboard recomputed"
        );

        DashboardFigures {
            selection: selection.clone(),
            charts,
        }
    }

    /// Aggregate and describe a single chart.
    pub fn chart(
        id: ChartId,
        table: &IncidentTable,
        selection: &Selection,
        settings: &PipelineSettings,
    ) -> ChartSpec {
        match id {
            ChartId::MonthlyHistogram => {
                ChartBuilder::monthly_histogram(&DataProcessor::monthly_histogram(table, selection))
            }
            ChartId::DailyFatalities => ChartBuilder::daily_fatalities(
                &DataProcessor::daily_fatalities(table, selection),
                selection,
            ),
            ChartId::CountryWeapon => ChartBuilder::country_weapon(
                &DataProcessor::country_weapon(table, selection),
                table.weapon_types(),
                selection,
            ),
            ChartId::TimeSeries => ChartBuilder::time_series(
                &DataProcessor::time_series(table, &selection.region, settings.rolling_window),
                &selection.region,
                settings.rolling_window,
            ),
            ChartId::Network => ChartBuilder::network(
                &NetworkBuilder::build(table, selection, &settings.layout),
                selection,
            ),
            ChartId::Treemap => {
                ChartBuilder::treemap(&DataProcessor::treemap(table, selection), selection)
            }
            ChartId::SeverityHeatmap => {
                ChartBuilder::severity_heatmap(&StatsCalculator::severity_heatmap(table))
            }
        }
    }
}
