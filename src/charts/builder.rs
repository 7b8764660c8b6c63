//! Chart Builder Module
//! Maps aggregated tables to declarative chart descriptions.

use super::spec::{
    BarSeries, ChartBody, ChartId, ChartSpec, ColorScale, GraphEdge, GraphNode, LinePoint,
    TreemapTile, LINE_COLOR, OTHER_COLOR, PALETTE, SELECTED_COLOR,
};
use crate::data::{
    CountryWeaponRow, DayTotal, MonthLabel, MonthlyHistogram, Selection, TimeSeriesPoint,
    TreemapRow,
};
use crate::stats::{NetworkGraph, SeverityHeatmap};
use std::collections::BTreeMap;

pub const HEATMAP_FOOTNOTE: &str = "Higher values indicate more severe attacks";

/// Builds one `ChartSpec` per aggregation. Titles embed the selection.
pub struct ChartBuilder;

impl ChartBuilder {
    pub fn monthly_histogram(histogram: &MonthlyHistogram) -> ChartSpec {
        let bins: Vec<u32> = histogram.buckets.iter().map(|b| b.month).collect();
        let series = [
            (MonthLabel::Selected, SELECTED_COLOR),
            (MonthLabel::Other, OTHER_COLOR),
        ]
        .into_iter()
        .map(|(label, color)| BarSeries {
            name: label.as_str().to_string(),
            color,
            values: histogram
                .buckets
                .iter()
                .map(|b| if b.label == label { b.fatalities } else { 0.0 })
                .collect(),
        })
        .collect();

        ChartSpec {
            id: ChartId::MonthlyHistogram,
            title: format!("Incidents Per Month in {}", histogram.region),
            x_label: "Month".to_string(),
            y_label: "Number of Fatalities".to_string(),
            body: ChartBody::Histogram { bins, series },
        }
    }

    pub fn daily_fatalities(days: &[DayTotal], selection: &Selection) -> ChartSpec {
        let series = if days.is_empty() {
            Vec::new()
        } else {
            vec![BarSeries {
                name: "nkill".to_string(),
                color: OTHER_COLOR,
                values: days.iter().map(|d| d.fatalities).collect(),
            }]
        };

        ChartSpec {
            id: ChartId::DailyFatalities,
            title: format!(
                "Incidents Per Day in {}, Month: {}",
                selection.region, selection.month
            ),
            x_label: "Day of the Month".to_string(),
            y_label: "nkill".to_string(),
            body: ChartBody::Bar {
                categories: days.iter().map(|d| d.day.to_string()).collect(),
                series,
            },
        }
    }

    /// Countries on the x axis, one stacked series per weapon type.
    ///
    /// A weapon's color is picked by its position in `weapon_types`, so the
    /// same weapon keeps its color across selections.
    pub fn country_weapon(
        rows: &[CountryWeaponRow],
        weapon_types: &[String],
        selection: &Selection,
    ) -> ChartSpec {
        let mut categories: Vec<String> = rows.iter().map(|r| r.country.clone()).collect();
        categories.dedup();

        let mut by_weapon: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
        for row in rows {
            let values = by_weapon
                .entry(row.weapon_type.as_str())
                .or_insert_with(|| vec![0.0; categories.len()]);
            if let Some(idx) = categories.iter().position(|c| *c == row.country) {
                values[idx] += row.fatalities;
            }
        }

        let series = by_weapon
            .into_iter()
            .map(|(weapon, values)| {
                let slot = weapon_types
                    .iter()
                    .position(|w| w == weapon)
                    .unwrap_or(weapon_types.len());
                BarSeries {
                    name: weapon.to_string(),
                    color: PALETTE[slot % PALETTE.len()],
                    values,
                }
            })
            .collect();

        ChartSpec {
            id: ChartId::CountryWeapon,
            title: format!(
                "Country vs Number of People Killed in {}, Month: {}",
                selection.region, selection.month
            ),
            x_label: "Country".to_string(),
            y_label: "Number of People Killed".to_string(),
            body: ChartBody::Bar { categories, series },
        }
    }

    /// Rolling mean line; `window` names the averaging span in the labels.
    pub fn time_series(points: &[TimeSeriesPoint], region: &str, window: usize) -> ChartSpec {
        ChartSpec {
            id: ChartId::TimeSeries,
            title: format!(
                "Time Series of Fatalities in {} ({}-day Avg)",
                region, window
            ),
            x_label: "Date".to_string(),
            y_label: format!("Number of People Killed ({}-day Avg)", window),
            body: ChartBody::Line {
                points: points
                    .iter()
                    .map(|p| LinePoint {
                        date: p.date,
                        value: p.smoothed,
                    })
                    .collect(),
                color: LINE_COLOR,
            },
        }
    }

    /// Node colors encode the number of connections.
    pub fn network(graph: &NetworkGraph, selection: &Selection) -> ChartSpec {
        let color_scale = ColorScale::YlGnBu;
        let max_degree = graph.nodes.iter().map(|n| n.degree).max().unwrap_or(0);

        let nodes = graph
            .nodes
            .iter()
            .map(|node| GraphNode {
                label: node.label.clone(),
                position: node.position,
                degree: node.degree,
                color: color_scale.sample(if max_degree > 0 {
                    node.degree as f64 / max_degree as f64
                } else {
                    0.0
                }),
            })
            .collect();

        let edges = graph
            .edges
            .iter()
            .map(|edge| GraphEdge {
                from: graph.nodes[edge.source].position,
                to: graph.nodes[edge.target].position,
                weight: edge.weight,
            })
            .collect();

        ChartSpec {
            id: ChartId::Network,
            title: format!(
                "Country and Target Type Network in {}, Month: {}",
                selection.region, selection.month
            ),
            x_label: String::new(),
            y_label: String::new(),
            body: ChartBody::Network {
                nodes,
                edges,
                color_scale,
            },
        }
    }

    pub fn treemap(rows: &[TreemapRow], selection: &Selection) -> ChartSpec {
        ChartSpec {
            id: ChartId::Treemap,
            title: format!(
                "Total Casualties by Country and Attack Type in {}, Month: {}",
                selection.region, selection.month
            ),
            x_label: String::new(),
            y_label: "Total Casualties".to_string(),
            body: ChartBody::Treemap {
                tiles: Self::treemap_tiles(rows),
            },
        }
    }

    pub fn severity_heatmap(heatmap: &SeverityHeatmap) -> ChartSpec {
        ChartSpec {
            id: ChartId::SeverityHeatmap,
            title: "Attack Severity Heatmap: Regions vs Attack Types".to_string(),
            x_label: "Attack Types".to_string(),
            y_label: "Regions".to_string(),
            body: ChartBody::Heatmap {
                columns: heatmap.attack_types.clone(),
                rows: heatmap.regions.clone(),
                values: heatmap.cells.clone(),
                color_scale: ColorScale::YlOrRd,
                footnote: HEATMAP_FOOTNOTE.to_string(),
            },
        }
    }

    /// Slice-and-dice layout: countries split the width by total, attack
    /// types split each country's height. Zero-valued groups get no area.
    fn treemap_tiles(rows: &[TreemapRow]) -> Vec<TreemapTile> {
        let mut countries: BTreeMap<&str, Vec<&TreemapRow>> = BTreeMap::new();
        for row in rows {
            countries.entry(row.country.as_str()).or_default().push(row);
        }

        let grand_total: f64 = rows.iter().map(|r| r.casualties).sum();
        let share = |value: f64, total: f64| if total > 0.0 { value / total } else { 0.0 };

        let mut tiles = Vec::with_capacity(rows.len() + countries.len());
        let mut x = 0.0;

        for (i, (country, children)) in countries.into_iter().enumerate() {
            let total: f64 = children.iter().map(|r| r.casualties).sum();
            let width = share(total, grand_total);
            let color = PALETTE[i % PALETTE.len()];

            tiles.push(TreemapTile {
                id: country.to_string(),
                label: country.to_string(),
                parent: None,
                value: total,
                rect: [x, 0.0, x + width, 1.0],
                color,
            });

            let mut y = 0.0;
            for child in children {
                let height = share(child.casualties, total);
                tiles.push(TreemapTile {
                    id: format!("{}/{}", country, child.attack_type),
                    label: child.attack_type.clone(),
                    parent: Some(country.to_string()),
                    value: child.casualties,
                    rect: [x, y, x + width, y + height],
                    color,
                });
                y += height;
            }

            x += width;
        }

        tiles
    }
}
